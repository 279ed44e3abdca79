//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::db::error::{RepositoryError, RepositoryResult};
use crate::db::repository::{EventRepository, SnapshotRepository, SubjectRepository};
use crate::models::subject::{Event, EventId, Subject, SubjectId, SubjectKind, Theme, ThemeId};
use crate::snapshot::{self, ViewSnapshot};

/// In-memory local repository.
///
/// Stores the whole archive in HashMaps behind one lock, which is ideal
/// for unit tests and for the bundled demo corpus. Cloning is cheap and
/// clones share the same data.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    themes: HashMap<ThemeId, Theme>,
    subjects: HashMap<SubjectId, Subject>,
    events: HashMap<EventId, Event>,
    subject_events: HashMap<SubjectId, Vec<EventId>>,

    // Persisted snapshots, id to serialized payload
    snapshots: HashMap<String, String>,

    // ID counters
    next_theme_id: i64,
    next_subject_id: i64,
    next_event_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            themes: HashMap::new(),
            subjects: HashMap::new(),
            events: HashMap::new(),
            subject_events: HashMap::new(),
            snapshots: HashMap::new(),
            next_theme_id: 1,
            next_subject_id: 1,
            next_event_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Add a theme to the repository.
    ///
    /// # Returns
    /// The id assigned to the theme
    pub fn store_theme_impl(&self, name: impl Into<String>) -> ThemeId {
        let mut data = self.data.write().unwrap();
        let theme_id = ThemeId(data.next_theme_id);
        data.next_theme_id += 1;
        data.themes.insert(theme_id, Theme::new(theme_id, name));
        theme_id
    }

    /// Add a subject to the repository.
    ///
    /// This is a helper method for setting up data. The subject will be
    /// assigned an id automatically, overwriting the one it carries.
    ///
    /// # Returns
    /// The id assigned to the subject
    pub fn store_subject_impl(&self, mut subject: Subject) -> SubjectId {
        let mut data = self.data.write().unwrap();
        let subject_id = SubjectId(data.next_subject_id);
        data.next_subject_id += 1;
        subject.id = subject_id;
        data.subjects.insert(subject_id, subject);
        data.subject_events.entry(subject_id).or_default();
        subject_id
    }

    /// Add an event and relate it to the given subjects.
    ///
    /// The event is assigned a fresh id. When the event carries no
    /// explicit relation count, it is derived from the number of subject
    /// and theme relations.
    ///
    /// # Returns
    /// The id assigned to the event
    pub fn store_event_impl(&self, mut event: Event, subjects: &[SubjectId]) -> EventId {
        let mut data = self.data.write().unwrap();
        let event_id = EventId(data.next_event_id);
        data.next_event_id += 1;
        event.id = event_id;
        if event.relation_count == 0 {
            event.relation_count = subjects.len() + event.theme_ids.len();
        }
        for subject_id in subjects {
            data.subject_events
                .entry(*subject_id)
                .or_default()
                .push(event_id);
        }
        data.events.insert(event_id, event);
        event_id
    }

    /// Insert a raw snapshot payload under an arbitrary id.
    ///
    /// Bypasses serialization, which makes it possible to test how loads
    /// handle corrupted storage.
    pub fn inject_snapshot_impl(&self, id: impl Into<String>, payload: impl Into<String>) {
        let mut data = self.data.write().unwrap();
        data.snapshots.insert(id.into(), payload.into());
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of subjects stored.
    pub fn subject_count(&self) -> usize {
        self.data.read().unwrap().subjects.len()
    }

    /// Get the number of events stored.
    pub fn event_count(&self) -> usize {
        self.data.read().unwrap().events.len()
    }

    /// Check if a subject exists.
    pub fn has_subject(&self, subject_id: SubjectId) -> bool {
        self.data
            .read()
            .unwrap()
            .subjects
            .contains_key(&subject_id)
    }

    /// Helper to check health and return an error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::ConnectionError(
                "Repository is not healthy".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether any event of the subject matches the theme.
    fn subject_in_theme(data: &LocalData, subject_id: SubjectId, theme_id: ThemeId) -> bool {
        data.subject_events
            .get(&subject_id)
            .map(|event_ids| {
                event_ids.iter().any(|id| {
                    data.events
                        .get(id)
                        .is_some_and(|event| event.matches_theme(theme_id))
                })
            })
            .unwrap_or(false)
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubjectRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.is_healthy)
    }

    async fn list_themes(&self) -> RepositoryResult<Vec<Theme>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        let mut themes: Vec<Theme> = data.themes.values().cloned().collect();
        themes.sort_by_key(|t| t.id);
        Ok(themes)
    }

    async fn fetch_theme(&self, theme_id: ThemeId) -> RepositoryResult<Theme> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        data.themes
            .get(&theme_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Theme {} not found", theme_id)))
    }

    async fn fetch_subjects_by_theme(
        &self,
        theme_id: Option<ThemeId>,
    ) -> RepositoryResult<Vec<Subject>> {
        self.check_health()?;
        let data = self.data.read().unwrap();

        let mut subjects: Vec<Subject> = match theme_id {
            None => data.subjects.values().cloned().collect(),
            Some(theme_id) => {
                if !data.themes.contains_key(&theme_id) {
                    return Err(RepositoryError::NotFound(format!(
                        "Theme {} not found",
                        theme_id
                    )));
                }
                data.subjects
                    .values()
                    .filter(|s| Self::subject_in_theme(&data, s.id, theme_id))
                    .cloned()
                    .collect()
            }
        };

        subjects.sort_by_key(|s| s.id);
        Ok(subjects)
    }

    async fn fetch_subject(&self, subject_id: SubjectId) -> RepositoryResult<Subject> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        data.subjects
            .get(&subject_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Subject {} not found", subject_id)))
    }
}

#[async_trait]
impl EventRepository for LocalRepository {
    async fn fetch_events_for_subject(
        &self,
        subject_id: SubjectId,
    ) -> RepositoryResult<Vec<Event>> {
        self.check_health()?;
        let data = self.data.read().unwrap();

        if !data.subjects.contains_key(&subject_id) {
            return Err(RepositoryError::NotFound(format!(
                "Subject {} not found",
                subject_id
            )));
        }

        let mut events: Vec<Event> = data
            .subject_events
            .get(&subject_id)
            .map(|event_ids| {
                event_ids
                    .iter()
                    .filter_map(|id| data.events.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();

        events.sort_by_key(|e| e.id);
        Ok(events)
    }

    async fn fetch_events_by_location_group(
        &self,
    ) -> RepositoryResult<HashMap<SubjectId, Vec<Event>>> {
        self.check_health()?;
        let data = self.data.read().unwrap();

        let mut groups = HashMap::new();
        for subject in data.subjects.values() {
            if subject.kind != SubjectKind::Location {
                continue;
            }
            let mut events: Vec<Event> = data
                .subject_events
                .get(&subject.id)
                .map(|event_ids| {
                    event_ids
                        .iter()
                        .filter_map(|id| data.events.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default();
            events.sort_by_key(|e| e.id);
            groups.insert(subject.id, events);
        }
        Ok(groups)
    }

    async fn resolve_event(&self, event_id: EventId) -> RepositoryResult<Event> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        data.events
            .get(&event_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Event {} not found", event_id)))
    }
}

#[async_trait]
impl SnapshotRepository for LocalRepository {
    async fn store_snapshot(&self, snapshot: &ViewSnapshot) -> RepositoryResult<String> {
        self.check_health()?;
        let json = snapshot
            .to_json()
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let id = snapshot::content_id(&json);

        let mut data = self.data.write().unwrap();
        data.snapshots.insert(id.clone(), json);
        Ok(id)
    }

    async fn load_snapshot(&self, id: &str) -> RepositoryResult<ViewSnapshot> {
        self.check_health()?;
        let payload = {
            let data = self.data.read().unwrap();
            data.snapshots.get(id).cloned()
        };
        let payload = payload
            .ok_or_else(|| RepositoryError::NotFound(format!("Snapshot {} not found", id)))?;

        ViewSnapshot::from_json(&payload)
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))
    }

    async fn list_snapshots(&self) -> RepositoryResult<Vec<String>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        let mut ids: Vec<String> = data.snapshots.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dates::DateRange;
    use crate::models::view_state::ViewState;

    fn subject(name: &str) -> Subject {
        Subject::new(SubjectId(0), name, SubjectKind::Person)
    }

    #[tokio::test]
    async fn test_store_and_fetch_subject() {
        let repo = LocalRepository::new();
        let id = repo.store_subject_impl(subject("Stella Kadmon"));

        let fetched = repo.fetch_subject(id).await.unwrap();
        assert_eq!(fetched.name, "Stella Kadmon");
        assert_eq!(repo.subject_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing_subject_is_not_found() {
        let repo = LocalRepository::new();
        let result = repo.fetch_subject(SubjectId(99)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_theme_membership_is_derived_from_events() {
        let repo = LocalRepository::new();
        let theme = repo.store_theme_impl("Vertrieben 1938");
        let in_theme = repo.store_subject_impl(subject("A"));
        let outside = repo.store_subject_impl(subject("B"));

        repo.store_event_impl(
            Event::new(EventId(0), "Gedenktafel").with_themes([theme]),
            &[in_theme],
        );
        repo.store_event_impl(Event::new(EventId(0), "Preis"), &[outside]);

        let subjects = repo.fetch_subjects_by_theme(Some(theme)).await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].id, in_theme);

        let all = repo.fetch_subjects_by_theme(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_theme_is_not_found() {
        let repo = LocalRepository::new();
        let result = repo.fetch_subjects_by_theme(Some(ThemeId(7))).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_events_for_subject_in_id_order() {
        let repo = LocalRepository::new();
        let id = repo.store_subject_impl(subject("C"));
        let e1 = repo.store_event_impl(Event::new(EventId(0), "Zweite"), &[id]);
        let e2 = repo.store_event_impl(Event::new(EventId(0), "Dritte"), &[id]);

        let events = repo.fetch_events_for_subject(id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, e1);
        assert_eq!(events[1].id, e2);
    }

    #[tokio::test]
    async fn test_location_group_fetch_covers_only_locations() {
        let repo = LocalRepository::new();
        let person = repo.store_subject_impl(subject("A"));
        let place = repo.store_subject_impl(Subject::new(
            SubjectId(0),
            "Judenplatz",
            SubjectKind::Location,
        ));
        let empty_place = repo.store_subject_impl(Subject::new(
            SubjectId(0),
            "Heldenplatz",
            SubjectKind::Location,
        ));

        repo.store_event_impl(Event::new(EventId(0), "Lesung"), &[person]);
        let e1 = repo.store_event_impl(Event::new(EventId(0), "Mahnmal enthüllt"), &[place]);

        let groups = repo.fetch_events_by_location_group().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&place].len(), 1);
        assert_eq!(groups[&place][0].id, e1);
        assert!(groups[&empty_place].is_empty());
        assert!(!groups.contains_key(&person));
    }

    #[tokio::test]
    async fn test_relation_count_defaults_to_relation_total() {
        let repo = LocalRepository::new();
        let theme = repo.store_theme_impl("T");
        let a = repo.store_subject_impl(subject("A"));
        let b = repo.store_subject_impl(subject("B"));

        let event_id = repo.store_event_impl(
            Event::new(EventId(0), "Ausstellung").with_themes([theme]),
            &[a, b],
        );

        let event = repo.resolve_event(event_id).await.unwrap();
        assert_eq!(event.relation_count, 3);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_refuses_queries() {
        let repo = LocalRepository::new();
        repo.store_subject_impl(subject("D"));
        repo.set_healthy(false);

        assert!(!repo.health_check().await.unwrap());
        let result = repo.fetch_subjects_by_theme(None).await;
        assert!(matches!(result, Err(RepositoryError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_and_idempotent_id() {
        let repo = LocalRepository::new();
        let state = ViewState::spanning(DateRange::from_ymd(1850, 1, 1, 2020, 12, 31));
        let snap = ViewSnapshot::new(None, state);

        let id1 = repo.store_snapshot(&snap).await.unwrap();
        let id2 = repo.store_snapshot(&snap).await.unwrap();
        assert_eq!(id1, id2);

        let loaded = repo.load_snapshot(&id1).await.unwrap();
        assert_eq!(loaded, snap);
        assert_eq!(repo.list_snapshots().await.unwrap(), vec![id1]);
    }

    #[tokio::test]
    async fn test_corrupted_snapshot_fails_validation() {
        let repo = LocalRepository::new();
        repo.inject_snapshot_impl("deadbeef", r#"{"version": 1, "state": {"ordering": 17}}"#);

        let result = repo.load_snapshot("deadbeef").await;
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let repo = LocalRepository::new();
        repo.store_subject_impl(subject("E"));
        repo.set_healthy(false);
        repo.clear();

        assert_eq!(repo.subject_count(), 0);
        assert!(!repo.health_check().await.unwrap());
    }
}
