//! Data preparation pipeline.
//!
//! Turns raw archive records into the prepared point set both charts
//! render from: fetches the subjects of a theme, batches the per-subject
//! event fetches, resolves partial dates, classifies events into color
//! categories and computes the per-subject aggregates the ordering
//! criteria need. Fetch failures for single subjects degrade to an empty
//! event list instead of aborting the batch, so one flaky record never
//! takes down the whole view.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::classify::EventClassifier;
use crate::config::EngineConfig;
use crate::db::error::RepositoryError;
use crate::db::repository::{EventRepository, SubjectRepository};
use crate::models::datapoint::{DataPoint, EventCategory, PointKind};
use crate::models::dates::{resolve_opt, DateRange};
use crate::models::subject::{
    Event, GeoPoint, Subject, SubjectId, SubjectKind, Theme, ThemeId,
};
use crate::models::view_state::ViewState;

/// Errors that abort a preparation run.
///
/// Only the subject list is fatal. Every later fetch degrades per record
/// and never surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to fetch subjects: {0}")]
    SubjectFetch(#[source] RepositoryError),
}

/// Which slice of the archive a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectView {
    /// People and organizations.
    #[default]
    People,
    /// Named places.
    Locations,
}

impl SubjectView {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectView::People => "people",
            SubjectView::Locations => "locations",
        }
    }

    fn includes(&self, kind: SubjectKind) -> bool {
        match self {
            SubjectView::People => {
                matches!(kind, SubjectKind::Person | SubjectKind::Organization)
            }
            SubjectView::Locations => kind == SubjectKind::Location,
        }
    }
}

/// What to load: a theme restriction and the subject slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrepareRequest {
    /// Restrict to one curated theme, `None` for the whole archive.
    pub theme: Option<ThemeId>,
    pub view: SubjectView,
}

impl PrepareRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_theme(theme: ThemeId) -> Self {
        Self {
            theme: Some(theme),
            view: SubjectView::People,
        }
    }

    pub fn locations() -> Self {
        Self {
            theme: None,
            view: SubjectView::Locations,
        }
    }
}

/// One subject with everything preparation derived for it.
#[derive(Debug, Clone)]
pub struct PreparedSubject {
    pub subject: Subject,
    /// Resolved birth date, `None` when the record has none.
    pub birth: Option<NaiveDate>,
    /// Resolved death date, `None` for living subjects and gaps.
    pub death: Option<NaiveDate>,
    /// Where the drawn life span ends: death, or today when unknown.
    pub span_end: NaiveDate,
    /// Date of the earliest honoring event.
    pub first_honor: Option<NaiveDate>,
    /// Number of honoring events with resolvable dates.
    pub honor_count: usize,
    /// Distance of the primary coordinate from the city center.
    pub center_distance_m: Option<f64>,
    /// All renderable points of this subject.
    pub points: Vec<DataPoint>,
}

impl PreparedSubject {
    pub fn id(&self) -> SubjectId {
        self.subject.id
    }

    /// Start of the drawn life span, falling back to the earliest point.
    pub fn span_start(&self) -> Option<NaiveDate> {
        self.birth
            .or_else(|| self.points.iter().map(|p| p.date).min())
    }
}

/// Result of a preparation run.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// The requested theme, when it resolved.
    pub theme: Option<Theme>,
    pub view: SubjectView,
    pub subjects: Vec<PreparedSubject>,
    /// Smallest and largest date seen across all points and spans.
    pub domain: DateRange,
    /// Largest relation count seen, at least 1. Domain of the marker
    /// size scale.
    pub max_relation_count: usize,
    pub today: NaiveDate,
    /// Events and functions skipped for lack of a resolvable date.
    pub unresolved_dates: usize,
}

impl PreparedData {
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn subject_ids(&self) -> Vec<SubjectId> {
        self.subjects.iter().map(|s| s.id()).collect()
    }

    pub fn subject(&self, id: SubjectId) -> Option<&PreparedSubject> {
        self.subjects.iter().find(|s| s.id() == id)
    }

    /// All points across all subjects.
    pub fn iter_points(&self) -> impl Iterator<Item = &DataPoint> {
        self.subjects.iter().flat_map(|s| s.points.iter())
    }

    pub fn point_count(&self) -> usize {
        self.subjects.iter().map(|s| s.points.len()).sum()
    }

    /// The view state a fresh session starts from.
    pub fn initial_view_state(&self) -> ViewState {
        ViewState::spanning(self.domain)
    }
}

/// The preparation pipeline with its resolved configuration.
pub struct PreparePipeline {
    classifier: EventClassifier,
    center: GeoPoint,
    today: NaiveDate,
}

impl PreparePipeline {
    /// Create a pipeline from engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            classifier: EventClassifier::new(&config.classifier),
            center: config.city.center(),
            today: chrono::Utc::now().date_naive(),
        }
    }

    /// Pin "today" to a fixed date, for reproducible runs and tests.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Load and prepare everything a view needs.
    ///
    /// The subject list fetch is fatal on failure since there is nothing
    /// to show without it. Everything after degrades per record.
    pub async fn process<R>(
        &self,
        repo: Arc<R>,
        request: PrepareRequest,
    ) -> Result<PreparedData, PipelineError>
    where
        R: SubjectRepository + EventRepository + 'static,
    {
        // Step 1: Resolve the theme, tolerating a stale id.
        let theme = match request.theme {
            Some(theme_id) => match repo.fetch_theme(theme_id).await {
                Ok(theme) => Some(theme),
                Err(e) if e.is_not_found() => {
                    log::debug!("Theme {} not in archive: {}", theme_id, e);
                    None
                }
                Err(e) => {
                    log::warn!("Theme {} lookup failed: {}", theme_id, e);
                    None
                }
            },
            None => None,
        };

        // Step 2: Fetch the subject list. Fatal on failure.
        let subjects = repo
            .fetch_subjects_by_theme(request.theme)
            .await
            .map_err(PipelineError::SubjectFetch)?;
        let subjects: Vec<Subject> = subjects
            .into_iter()
            .filter(|s| request.view.includes(s.kind))
            .collect();

        // Step 3: Theme names, used to classify location events.
        let theme_names: HashMap<ThemeId, String> = match repo.list_themes().await {
            Ok(themes) => themes.into_iter().map(|t| (t.id, t.name)).collect(),
            Err(e) => {
                log::warn!("Theme list fetch failed, classifying by event name: {}", e);
                HashMap::new()
            }
        };

        // Step 4: Fetch events. The location view gets them all in one
        // grouped call; the people view batches per-subject fetches.
        let mut events_by_subject = match request.view {
            SubjectView::Locations => match repo.fetch_events_by_location_group().await {
                Ok(groups) => groups,
                Err(e) => {
                    log::warn!(
                        "Location group fetch failed, falling back to per-subject fetches: {}",
                        e
                    );
                    self.fetch_events_batch(&repo, &subjects).await
                }
            },
            SubjectView::People => self.fetch_events_batch(&repo, &subjects).await,
        };

        // Step 5: Flatten every subject into prepared points.
        let mut prepared = Vec::with_capacity(subjects.len());
        let mut unresolved = 0usize;
        for subject in subjects {
            let events = events_by_subject.remove(&subject.id).unwrap_or_default();
            prepared.push(self.prepare_subject(
                subject,
                events,
                request,
                &theme_names,
                &mut unresolved,
            ));
        }

        // Step 6: Derive the shared scales' domains.
        let domain = compute_domain(&prepared, self.today);
        let max_relation_count = prepared
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|p| p.is_honoring())
            .map(|p| p.relation_count)
            .max()
            .unwrap_or(1)
            .max(1);

        log::info!(
            "Prepared {} subjects, {} points ({} unresolved dates) for view '{}'",
            prepared.len(),
            prepared.iter().map(|s| s.points.len()).sum::<usize>(),
            unresolved,
            request.view.as_str(),
        );

        Ok(PreparedData {
            theme,
            view: request.view,
            subjects: prepared,
            domain,
            max_relation_count,
            today: self.today,
            unresolved_dates: unresolved,
        })
    }

    /// Fetch events for every subject concurrently.
    ///
    /// A failed or panicked fetch degrades to an empty event list for
    /// that subject.
    async fn fetch_events_batch<R>(
        &self,
        repo: &Arc<R>,
        subjects: &[Subject],
    ) -> HashMap<SubjectId, Vec<Event>>
    where
        R: SubjectRepository + EventRepository + 'static,
    {
        let mut set = JoinSet::new();
        for subject in subjects {
            let repo = Arc::clone(repo);
            let id = subject.id;
            set.spawn(async move { (id, repo.fetch_events_for_subject(id).await) });
        }

        let mut events_by_subject = HashMap::with_capacity(subjects.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((id, Ok(events))) => {
                    events_by_subject.insert(id, events);
                }
                Ok((id, Err(e))) => {
                    if e.is_not_found() {
                        log::debug!("No events for subject {}: {}", id, e);
                    } else {
                        log::warn!("Event fetch for subject {} failed: {}", id, e);
                    }
                    events_by_subject.insert(id, Vec::new());
                }
                Err(e) => {
                    log::warn!("Event fetch task failed: {}", e);
                }
            }
        }
        events_by_subject
    }

    /// Flatten one subject and its events into points and aggregates.
    fn prepare_subject(
        &self,
        subject: Subject,
        events: Vec<Event>,
        request: PrepareRequest,
        theme_names: &HashMap<ThemeId, String>,
        unresolved: &mut usize,
    ) -> PreparedSubject {
        let birth = resolve_opt(subject.birth.as_deref());
        let death = resolve_opt(subject.death.as_deref());
        let span_end = death.unwrap_or(self.today);

        let mut points = Vec::new();

        // Boundary points carry the neutral category; renderers color
        // them by kind, never by category.
        if let Some(date) = birth {
            points.push(DataPoint::new(
                subject.id,
                "Geburt",
                PointKind::Boundary,
                date,
                EventCategory::Other,
            ));
        }
        if let Some(date) = death {
            points.push(DataPoint::new(
                subject.id,
                "Tod",
                PointKind::Boundary,
                date,
                EventCategory::Other,
            ));
        }

        // Life functions, classified by their label so an exile function
        // shows in the exile color.
        for function in &subject.functions {
            let Some(start) = resolve_opt(function.start.as_deref()) else {
                *unresolved += 1;
                continue;
            };
            let mut point = DataPoint::new(
                subject.id,
                function.label.clone(),
                PointKind::Life,
                start,
                self.classifier.classify(&function.label),
            );
            if let Some(end) = resolve_opt(function.end.as_deref()) {
                point = point.with_end_date(end);
            }
            points.push(point);
        }

        // Honoring events. Only theme-matching events count when a theme
        // is loaded.
        let event_kind = match request.view {
            SubjectView::People => PointKind::PostLife,
            SubjectView::Locations => PointKind::LocationEvent,
        };
        for event in &events {
            if let Some(theme_id) = request.theme {
                if !event.matches_theme(theme_id) {
                    continue;
                }
            }
            let Some(start) = resolve_opt(event.start.as_deref()) else {
                *unresolved += 1;
                continue;
            };

            let category = self.classify_event(event, request.view, theme_names);
            let mut point = DataPoint::new(subject.id, event.name.clone(), event_kind, start, category)
                .with_event_id(event.id)
                .with_relation_count(event.relation_count.max(1));
            if let Some(end) = resolve_opt(event.end.as_deref()) {
                point = point.with_end_date(end);
            }
            points.push(point);
        }

        let first_honor = points
            .iter()
            .filter(|p| p.is_honoring())
            .map(|p| p.date)
            .min();
        let honor_count = points.iter().filter(|p| p.is_honoring()).count();
        let center_distance_m = subject
            .primary_coordinate()
            .map(|coord| coord.distance_m(&self.center));

        PreparedSubject {
            birth,
            death,
            span_end,
            first_honor,
            honor_count,
            center_distance_m,
            points,
            subject,
        }
    }

    /// Color category of an event.
    ///
    /// The location view colors by the event's main theme; everything
    /// else classifies the event name.
    fn classify_event(
        &self,
        event: &Event,
        view: SubjectView,
        theme_names: &HashMap<ThemeId, String>,
    ) -> EventCategory {
        if view == SubjectView::Locations {
            if let Some(name) = event.theme_ids.first().and_then(|id| theme_names.get(id)) {
                let category = self.classifier.classify(name);
                if category != EventCategory::Other {
                    return category;
                }
            }
        }
        self.classifier.classify(&event.name)
    }
}

/// Smallest and largest date over all points and life spans.
fn compute_domain(subjects: &[PreparedSubject], today: NaiveDate) -> DateRange {
    let mut min: Option<NaiveDate> = None;
    let mut max: Option<NaiveDate> = None;
    let mut observe = |date: NaiveDate| {
        min = Some(min.map_or(date, |m| m.min(date)));
        max = Some(max.map_or(date, |m| m.max(date)));
    };

    for subject in subjects {
        for point in &subject.points {
            observe(point.date);
            if let Some(end) = point.end_date {
                observe(end);
            }
        }
        if let Some(start) = subject.span_start() {
            observe(start);
            // Undead subjects stretch the domain to today.
            observe(subject.span_end);
        }
    }

    match (min, max) {
        (Some(min), Some(max)) => DateRange::new(min, max),
        _ => DateRange::new(today, today),
    }
}

/// Convenience function to prepare a view in one call.
pub async fn prepare_view<R>(
    repo: Arc<R>,
    config: &EngineConfig,
    request: PrepareRequest,
) -> Result<PreparedData, PipelineError>
where
    R: SubjectRepository + EventRepository + 'static,
{
    PreparePipeline::new(config).process(repo, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::db::local::LocalRepository;
    use crate::models::subject::{LifeFunction, Subject, SubjectKind};

    fn pipeline() -> PreparePipeline {
        PreparePipeline::new(&EngineConfig::default())
            .with_today(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap())
    }

    #[tokio::test]
    async fn test_prepare_demo_archive() {
        let (repo, _) = fixtures::demo_repository();
        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await
            .unwrap();

        // People view keeps people and organizations, drops locations.
        assert_eq!(data.len(), 8);
        assert!(data.point_count() > 0);
        // The Mahler memorial concert has no date and is skipped.
        assert!(data.unresolved_dates >= 1);
        assert!(data.max_relation_count >= 2);
    }

    #[tokio::test]
    async fn test_unreachable_backend_aborts_preparation() {
        let repo = LocalRepository::new();
        repo.store_subject_impl(Subject::new(SubjectId(0), "A", SubjectKind::Person));
        repo.set_healthy(false);

        let result = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await;
        assert!(matches!(result, Err(PipelineError::SubjectFetch(_))));
    }

    #[tokio::test]
    async fn test_boundary_points_and_span() {
        let repo = LocalRepository::new();
        let id = repo.store_subject_impl(
            Subject::new(SubjectId(0), "A", SubjectKind::Person)
                .with_birth("1881-11-28")
                .with_death("1942-02-22"),
        );

        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await
            .unwrap();
        let prepared = data.subject(id).unwrap();

        assert_eq!(prepared.points.len(), 2);
        assert!(prepared
            .points
            .iter()
            .all(|p| p.kind == PointKind::Boundary));
        assert_eq!(prepared.span_end, prepared.death.unwrap());
    }

    #[tokio::test]
    async fn test_undead_subject_spans_to_today() {
        let repo = LocalRepository::new();
        let id = repo.store_subject_impl(
            Subject::new(SubjectId(0), "Orchester", SubjectKind::Organization)
                .with_birth("1842-03-28"),
        );

        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await
            .unwrap();
        let prepared = data.subject(id).unwrap();

        assert!(prepared.death.is_none());
        assert_eq!(prepared.span_end, data.today);
        assert_eq!(data.domain.end, data.today);
    }

    #[tokio::test]
    async fn test_subject_without_any_dates_keeps_slot() {
        let repo = LocalRepository::new();
        let with_dates = repo.store_subject_impl(
            Subject::new(SubjectId(0), "A", SubjectKind::Person).with_birth("1900"),
        );
        let without = repo.store_subject_impl(
            Subject::new(SubjectId(0), "B", SubjectKind::Person).with_birth("ca. 1890"),
        );

        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await
            .unwrap();

        assert!(data.subject(with_dates).is_some());
        let bare = data.subject(without).unwrap();
        assert!(bare.points.is_empty());
        assert!(bare.birth.is_none());
    }

    #[tokio::test]
    async fn test_theme_restriction_filters_events() {
        let (repo, archive) = fixtures::demo_repository();
        let data = pipeline()
            .process(
                Arc::new(repo),
                PrepareRequest::for_theme(archive.music_theme),
            )
            .await
            .unwrap();

        assert_eq!(data.theme.as_ref().unwrap().id, archive.music_theme);
        // Every honoring point stems from a music-themed event.
        for subject in &data.subjects {
            for point in subject.points.iter().filter(|p| p.is_honoring()) {
                assert!(point.event_id.is_some(), "{}", point.label);
            }
        }
        // Zweig has no music events, so he is not part of the load.
        assert!(data
            .subjects
            .iter()
            .all(|s| s.subject.name != "Stefan Zweig"));
    }

    #[tokio::test]
    async fn test_life_functions_become_classified_points() {
        let repo = LocalRepository::new();
        let id = repo.store_subject_impl(
            Subject::new(SubjectId(0), "A", SubjectKind::Person)
                .with_birth("1874-09-13")
                .with_death("1951-07-13")
                .with_functions([LifeFunction {
                    label: "Exil".to_string(),
                    start: Some("1933-05".to_string()),
                    end: Some("1951".to_string()),
                }]),
        );

        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await
            .unwrap();
        let prepared = data.subject(id).unwrap();

        let life: Vec<_> = prepared
            .points
            .iter()
            .filter(|p| p.kind == PointKind::Life)
            .collect();
        assert_eq!(life.len(), 1);
        assert_eq!(life[0].category, EventCategory::Exile);
        assert_eq!(
            life[0].date,
            NaiveDate::from_ymd_opt(1933, 5, 1).unwrap()
        );
        assert!(life[0].end_date.is_some());
    }

    #[tokio::test]
    async fn test_locations_view_uses_location_kind() {
        let (repo, _) = fixtures::demo_repository();
        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::locations())
            .await
            .unwrap();

        assert_eq!(data.len(), 2);
        for subject in &data.subjects {
            assert_eq!(subject.subject.kind, SubjectKind::Location);
            assert!(subject
                .points
                .iter()
                .filter(|p| p.event_id.is_some())
                .all(|p| p.kind == PointKind::LocationEvent));
            assert!(subject.center_distance_m.is_some());
        }
    }

    #[tokio::test]
    async fn test_honoring_aggregates() {
        let (repo, archive) = fixtures::demo_repository();
        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await
            .unwrap();

        let mahler = data.subject(archive.subjects[2]).unwrap();
        assert_eq!(mahler.honor_count, 3);
        assert_eq!(
            mahler.first_honor,
            NaiveDate::from_ymd_opt(1919, 1, 1)
        );
    }

    #[tokio::test]
    async fn test_first_render_scale_is_globally_consistent() {
        // All event fetches complete before the size scale is fixed, so
        // the maximum is over the whole batch.
        let repo = fixtures::synthetic_archive(40, 3);
        let data = pipeline()
            .process(Arc::new(repo), PrepareRequest::all())
            .await
            .unwrap();

        let observed_max = data
            .iter_points()
            .filter(|p| p.is_honoring())
            .map(|p| p.relation_count)
            .max()
            .unwrap();
        assert_eq!(data.max_relation_count, observed_max);
    }
}
