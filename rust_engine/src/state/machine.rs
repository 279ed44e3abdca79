//! Gesture interpretation.
//!
//! The [`StateMachine`] is the only writer of [`ViewState`]. Every user
//! gesture comes in as a method call, and every call answers with a
//! [`GestureOutcome`] telling the caller which charts to re-render and
//! with which transition. Gestures that change nothing answer with an
//! empty plan and no new generation, which is what keeps the
//! brush-updates-charts-updates-brush feedback loop from oscillating.

use crate::models::datapoint::EventCategory;
use crate::models::dates::DateRange;
use crate::models::subject::SubjectId;
use crate::models::view_state::{GroupingCriterion, OrderingCriterion, ViewState};
use crate::state::transitions::{TransitionController, TransitionHandle};

/// Where a visible-range change came from.
///
/// The origin decides the refresh plan. A change the brush itself made
/// must not be pushed back into the brush, or every drag would echo
/// forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeChangeOrigin {
    /// Dragging the range selector under the linear chart.
    Brush,
    /// Zoom or pan gesture on the radial chart.
    Zoom,
    /// Restore, reset, or any other non-gesture source.
    Programmatic,
}

/// Which of the three coordinated surfaces need re-rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPlan {
    pub radial: bool,
    pub linear: bool,
    pub brush: bool,
}

impl RefreshPlan {
    pub fn all() -> Self {
        Self {
            radial: true,
            linear: true,
            brush: true,
        }
    }

    pub fn none() -> Self {
        Self {
            radial: false,
            linear: false,
            brush: false,
        }
    }

    /// Both charts, leaving the brush alone.
    pub fn charts() -> Self {
        Self {
            radial: true,
            linear: true,
            brush: false,
        }
    }

    pub fn radial_only() -> Self {
        Self {
            radial: true,
            linear: false,
            brush: false,
        }
    }

    pub fn brush_only() -> Self {
        Self {
            radial: false,
            linear: false,
            brush: true,
        }
    }

    /// Whether anything needs re-rendering at all.
    pub fn any(&self) -> bool {
        self.radial || self.linear || self.brush
    }
}

/// What one gesture asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutcome {
    pub plan: RefreshPlan,
    pub transition: TransitionHandle,
    /// Angular slots must be redistributed before rendering.
    pub reassign_angles: bool,
    /// The group assignment must be recomputed before rendering.
    pub regroup: bool,
}

/// The single writer of the shared view state.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: ViewState,
    domain: DateRange,
    transitions: TransitionController,
}

impl StateMachine {
    pub fn new(initial: ViewState, domain: DateRange, transition_ms: u64) -> Self {
        let mut state = initial;
        state.visible = state.visible.intersect(domain).unwrap_or(domain);
        Self {
            state,
            domain,
            transitions: TransitionController::new(transition_ms),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn domain(&self) -> DateRange {
        self.domain
    }

    /// Whether a newer gesture has landed since this handle was minted.
    pub fn is_superseded(&self, handle: TransitionHandle) -> bool {
        self.transitions.is_superseded(handle)
    }

    pub fn generation(&self) -> u64 {
        self.transitions.generation()
    }

    /// A handle at the current generation, for renders not driven by a
    /// gesture.
    pub fn current_transition(&self) -> TransitionHandle {
        self.transitions.current()
    }

    fn animated(&mut self, plan: RefreshPlan) -> GestureOutcome {
        GestureOutcome {
            plan,
            transition: self.transitions.begin(),
            reassign_angles: false,
            regroup: false,
        }
    }

    fn instant(&mut self, plan: RefreshPlan) -> GestureOutcome {
        GestureOutcome {
            plan,
            transition: self.transitions.begin_instant(),
            reassign_angles: false,
            regroup: false,
        }
    }

    fn unchanged(&self) -> GestureOutcome {
        GestureOutcome {
            plan: RefreshPlan::none(),
            transition: self.transitions.current(),
            reassign_angles: false,
            regroup: false,
        }
    }

    /// Restrict post-life markers to one category, `None` lifts the
    /// filter.
    pub fn filter_events_by_type(&mut self, category: Option<EventCategory>) -> GestureOutcome {
        if self.state.category_filter == category {
            return self.unchanged();
        }
        self.state.category_filter = category;
        self.animated(RefreshPlan::charts())
    }

    /// Enter detail mode on one subject.
    pub fn highlight_subject(&mut self, subject: SubjectId) -> GestureOutcome {
        if self.state.highlighted == Some(subject) {
            return self.unchanged();
        }
        self.state.highlighted = Some(subject);
        self.animated(RefreshPlan::all())
    }

    /// Leave detail mode.
    pub fn close_subject_details(&mut self) -> GestureOutcome {
        if self.state.highlighted.is_none() {
            return self.unchanged();
        }
        self.state.highlighted = None;
        self.animated(RefreshPlan::all())
    }

    /// Change the visible date window.
    ///
    /// The window is clamped to the data domain; a request entirely
    /// outside it falls back to the full domain. A request that lands on
    /// the current window answers with an empty plan and no new
    /// generation.
    pub fn update_range(&mut self, range: DateRange, origin: RangeChangeOrigin) -> GestureOutcome {
        let clamped = range.intersect(self.domain).unwrap_or(self.domain);
        if clamped == self.state.visible {
            return self.unchanged();
        }
        self.state.visible = clamped;
        let plan = match origin {
            RangeChangeOrigin::Brush => RefreshPlan::charts(),
            RangeChangeOrigin::Zoom | RangeChangeOrigin::Programmatic => RefreshPlan::all(),
        };
        self.animated(plan)
    }

    /// Reset the visible window to the full domain.
    pub fn clear_time_selection(&mut self) -> GestureOutcome {
        self.update_range(self.domain, RangeChangeOrigin::Programmatic)
    }

    /// Switch the angular ordering criterion.
    pub fn set_ordering(&mut self, criterion: OrderingCriterion) -> GestureOutcome {
        if self.state.ordering == criterion {
            return self.unchanged();
        }
        self.state.ordering = criterion;
        let mut outcome = self.animated(RefreshPlan::radial_only());
        outcome.reassign_angles = true;
        outcome
    }

    /// Switch the grouping criterion.
    pub fn set_grouping(&mut self, criterion: GroupingCriterion) -> GestureOutcome {
        if self.state.grouping == criterion {
            return self.unchanged();
        }
        self.state.grouping = criterion;
        let mut outcome = self.animated(RefreshPlan::radial_only());
        outcome.reassign_angles = true;
        outcome.regroup = true;
        outcome
    }

    /// Flip the radial time axis between inside-out and outside-in.
    pub fn invert_time(&mut self) -> GestureOutcome {
        self.state.inverted = !self.state.inverted;
        self.animated(RefreshPlan::radial_only())
    }

    pub fn set_show_names(&mut self, show: bool) -> GestureOutcome {
        if self.state.show_names == show {
            return self.unchanged();
        }
        self.state.show_names = show;
        self.instant(RefreshPlan::radial_only())
    }

    pub fn set_show_mouse_grid(&mut self, show: bool) -> GestureOutcome {
        if self.state.show_mouse_grid == show {
            return self.unchanged();
        }
        self.state.show_mouse_grid = show;
        self.instant(RefreshPlan::radial_only())
    }

    pub fn set_show_brush(&mut self, show: bool) -> GestureOutcome {
        if self.state.show_brush == show {
            return self.unchanged();
        }
        self.state.show_brush = show;
        self.instant(RefreshPlan::brush_only())
    }

    /// Replace the whole state, clamping the window to the data domain.
    /// Used when restoring snapshots.
    pub fn restore(&mut self, state: ViewState) -> GestureOutcome {
        self.state = state;
        self.state.visible = self.state.visible.intersect(self.domain).unwrap_or(self.domain);
        let mut outcome = self.animated(RefreshPlan::all());
        outcome.reassign_angles = true;
        outcome.regroup = true;
        outcome
    }
}
