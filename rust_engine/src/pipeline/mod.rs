//! Data preparation pipeline.
//!
//! Turns raw archive records into the [`prepare::PreparedData`] bundle the
//! renderers consume. See [`prepare`] for the step-by-step pipeline.

pub mod prepare;

pub use prepare::{
    prepare_view, PipelineError, PrepareRequest, PreparedData, PreparedSubject, PreparePipeline,
    SubjectView,
};
