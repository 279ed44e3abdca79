//! Transition bookkeeping.
//!
//! Every state change mints a new generation number. Scenes carry the
//! handle of the generation that produced them, and a frontend animating
//! a scene checks [`TransitionController::is_superseded`] before each
//! frame: when a newer gesture has landed, the older animation stops
//! instead of fighting the new one for the same elements.

use serde::{Deserialize, Serialize};

/// A claim ticket for one animated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionHandle {
    /// Generation this handle belongs to.
    pub generation: u64,
    /// Animation length, zero for instant updates.
    pub duration_ms: u64,
}

/// Mints transition handles and remembers the newest generation.
#[derive(Debug, Clone)]
pub struct TransitionController {
    generation: u64,
    default_duration_ms: u64,
}

impl TransitionController {
    pub fn new(default_duration_ms: u64) -> Self {
        Self {
            generation: 0,
            default_duration_ms,
        }
    }

    /// The newest generation number.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start an animated transition, superseding all earlier handles.
    pub fn begin(&mut self) -> TransitionHandle {
        self.generation += 1;
        TransitionHandle {
            generation: self.generation,
            duration_ms: self.default_duration_ms,
        }
    }

    /// Start an instant transition, superseding all earlier handles.
    pub fn begin_instant(&mut self) -> TransitionHandle {
        self.generation += 1;
        TransitionHandle {
            generation: self.generation,
            duration_ms: 0,
        }
    }

    /// A handle for the current generation without starting anything.
    /// Used by gestures that turn out to change nothing.
    pub fn current(&self) -> TransitionHandle {
        TransitionHandle {
            generation: self.generation,
            duration_ms: 0,
        }
    }

    /// Whether a newer transition has started since this handle was
    /// minted.
    pub fn is_superseded(&self, handle: TransitionHandle) -> bool {
        handle.generation < self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_bumps_the_generation() {
        let mut controller = TransitionController::new(250);
        let first = controller.begin();
        let second = controller.begin();
        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(first.duration_ms, 250);
    }

    #[test]
    fn test_older_handles_are_superseded() {
        let mut controller = TransitionController::new(250);
        let old = controller.begin();
        assert!(!controller.is_superseded(old));
        let new = controller.begin_instant();
        assert!(controller.is_superseded(old));
        assert!(!controller.is_superseded(new));
        assert_eq!(new.duration_ms, 0);
    }

    #[test]
    fn test_current_does_not_advance() {
        let mut controller = TransitionController::new(250);
        controller.begin();
        let a = controller.current();
        let b = controller.current();
        assert_eq!(a, b);
        assert!(!controller.is_superseded(a));
        assert_eq!(a.duration_ms, 0);
    }

    #[test]
    fn test_handle_serializes() {
        let handle = TransitionHandle {
            generation: 9,
            duration_ms: 250,
        };
        let json = serde_json::to_string(&handle).expect("handle serializes");
        let back: TransitionHandle = serde_json::from_str(&json).expect("handle deserializes");
        assert_eq!(back, handle);
    }
}
