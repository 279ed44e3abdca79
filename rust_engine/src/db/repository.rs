//! Repository trait definitions for archive access.
//!
//! The engine never talks to a concrete backend directly. Access is split
//! across focused traits so implementations stay small and tests can stub
//! exactly the surface they need:
//!
//! - [`SubjectRepository`]: themes and the subjects curated under them
//! - [`EventRepository`]: honoring events and relation lookups
//! - [`SnapshotRepository`]: persisted view snapshots for shareable links
//!
//! A complete backend implements all three; the [`FullRepository`] bound
//! is implemented automatically for such types.

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::RepositoryResult;
use crate::models::subject::{Event, EventId, Subject, SubjectId, Theme, ThemeId};
use crate::snapshot::ViewSnapshot;

/// Repository trait for subject and theme queries.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the connection is healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Themes ====================

    /// List all curated themes.
    async fn list_themes(&self) -> RepositoryResult<Vec<Theme>>;

    /// Retrieve a single theme.
    ///
    /// # Returns
    /// * `Ok(Theme)` if it exists
    /// * `Err(RepositoryError::NotFound)` otherwise
    async fn fetch_theme(&self, theme_id: ThemeId) -> RepositoryResult<Theme>;

    // ==================== Subjects ====================

    /// Fetch the subjects curated under a theme.
    ///
    /// # Arguments
    /// * `theme_id` - Restrict to one theme, or `None` for the whole archive
    ///
    /// # Returns
    /// * `Ok(Vec<Subject>)` in stable id order, possibly empty
    async fn fetch_subjects_by_theme(
        &self,
        theme_id: Option<ThemeId>,
    ) -> RepositoryResult<Vec<Subject>>;

    /// Retrieve a single subject by id.
    ///
    /// # Returns
    /// * `Ok(Subject)` if it exists
    /// * `Err(RepositoryError::NotFound)` otherwise
    async fn fetch_subject(&self, subject_id: SubjectId) -> RepositoryResult<Subject>;
}

/// Repository trait for honoring events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Fetch all events related to a subject, in stable id order.
    async fn fetch_events_for_subject(
        &self,
        subject_id: SubjectId,
    ) -> RepositoryResult<Vec<Event>>;

    /// Fetch the events of every location subject in one call, grouped
    /// by location. Backends answer this from a single query, which is
    /// why the location view prefers it over per-subject fetches.
    async fn fetch_events_by_location_group(
        &self,
    ) -> RepositoryResult<HashMap<SubjectId, Vec<Event>>>;

    /// Resolve a single event by id, including its relation count.
    ///
    /// # Returns
    /// * `Ok(Event)` if it exists
    /// * `Err(RepositoryError::NotFound)` otherwise
    async fn resolve_event(&self, event_id: EventId) -> RepositoryResult<Event>;
}

/// Repository trait for persisted view snapshots.
///
/// Snapshot ids are content derived, so storing the same state twice
/// yields the same id and storage stays idempotent.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Persist a snapshot and return its id.
    async fn store_snapshot(&self, snapshot: &ViewSnapshot) -> RepositoryResult<String>;

    /// Load a snapshot by id.
    ///
    /// # Returns
    /// * `Ok(ViewSnapshot)` if it exists and parses
    /// * `Err(RepositoryError::NotFound)` if the id is unknown
    /// * `Err(RepositoryError::ValidationError)` if the stored payload is malformed
    async fn load_snapshot(&self, id: &str) -> RepositoryResult<ViewSnapshot>;

    /// List the ids of all stored snapshots.
    async fn list_snapshots(&self) -> RepositoryResult<Vec<String>>;
}

/// Composite trait bound for a complete repository implementation.
///
/// Implemented automatically for any type that implements all three
/// repository traits. Use this as the bound when a function needs the
/// whole archive surface:
///
/// ```ignore
/// async fn load_everything<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
///     let themes = repo.list_themes().await?;
///     let subjects = repo.fetch_subjects_by_theme(None).await?;
///     Ok(())
/// }
/// ```
pub trait FullRepository: SubjectRepository + EventRepository + SnapshotRepository {}

impl<T> FullRepository for T where T: SubjectRepository + EventRepository + SnapshotRepository {}
