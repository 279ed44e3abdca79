//! View state lifecycle.
//!
//! Gestures enter through the [`machine::StateMachine`], which owns the
//! shared [`crate::models::view_state::ViewState`] and mints transition
//! generations through [`transitions::TransitionController`].

pub mod machine;
pub mod transitions;

pub use machine::{GestureOutcome, RangeChangeOrigin, RefreshPlan, StateMachine};
pub use transitions::{TransitionController, TransitionHandle};
