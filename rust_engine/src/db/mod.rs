//! Archive access layer.
//!
//! Trait definitions live in [`repository`], the in-memory implementation
//! in [`local`], and the bundled demo corpus in [`fixtures`].

pub mod error;
pub mod fixtures;
pub mod local;
pub mod repository;

pub use error::{RepositoryError, RepositoryResult};
pub use local::LocalRepository;
pub use repository::{EventRepository, FullRepository, SnapshotRepository, SubjectRepository};
