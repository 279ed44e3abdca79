//! Computation engine for coordinated biographical timeline views.
//!
//! The engine loads subjects and their dated events from an archive,
//! prepares them once, and renders two coordinated charts plus a range
//! selector from a single shared view state:
//!
//! - a radial chart with one angular slot per subject and time on the
//!   radius,
//! - a linear aggregate chart of all honoring events over the full
//!   domain,
//! - a brush controlling the visible date window.
//!
//! Layers, bottom up: [`models`] holds the domain types, [`db`] the
//! repository traits and the in-memory archive, [`pipeline`] turns raw
//! records into prepared points, [`classify`] sorts events into color
//! categories, [`ordering`] decides angular order and grouping,
//! [`geometry`] does scales and slots, [`state`] interprets gestures,
//! [`render`] emits [`scene`] values, and [`snapshot`] persists view
//! states. [`engine`] is the facade over all of it.

pub mod classify;
pub mod config;
pub mod db;
pub mod engine;
pub mod geometry;
pub mod models;
pub mod ordering;
pub mod pipeline;
pub mod render;
pub mod scene;
pub mod snapshot;
pub mod state;

pub use engine::{EngineError, RenderUpdate, VisualizationEngine};
pub use pipeline::prepare::{PrepareRequest, SubjectView};
