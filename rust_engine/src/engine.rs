//! The engine facade.
//!
//! [`VisualizationEngine`] wires the layers together: it loads and
//! prepares data once, owns the state machine, the ordering table, the
//! grouping registry and the current angle assignment, and turns every
//! gesture into freshly rendered scenes. Frontends talk to this type
//! and nothing below it.

use std::sync::Arc;

use chrono::Datelike;

use crate::config::EngineConfig;
use crate::db::repository::{EventRepository, SnapshotRepository, SubjectRepository};
use crate::db::RepositoryError;
use crate::geometry::AngleAssignment;
use crate::models::datapoint::EventCategory;
use crate::models::dates::DateRange;
use crate::models::subject::SubjectId;
use crate::models::view_state::{GroupingCriterion, OrderingCriterion, ViewState};
use crate::ordering::grouping::{
    category_major_order, GroupAssignment, GroupingContext, GroupingRegistry,
};
use crate::ordering::OrderingTable;
use crate::pipeline::prepare::{
    PipelineError, PrepareRequest, PreparedData, PreparedSubject, PreparePipeline,
};
use crate::render::{compute_brush_geometry, compute_linear_scene, compute_radial_scene};
use crate::scene::{BrushGeometry, LinearScene, RadialScene, SceneBundle, TooltipPayload};
use crate::snapshot::{SnapshotError, ViewSnapshot};
use crate::state::machine::{GestureOutcome, RangeChangeOrigin, StateMachine};
use crate::state::transitions::TransitionHandle;

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Prepare(#[from] PipelineError),
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Scenes re-rendered after one gesture, following its refresh plan.
/// Surfaces the gesture left alone are `None`.
#[derive(Debug, Clone)]
pub struct RenderUpdate {
    pub outcome: GestureOutcome,
    pub radial: Option<RadialScene>,
    pub linear: Option<LinearScene>,
    pub brush: Option<BrushGeometry>,
}

/// One loaded dataset and everything needed to interact with it.
pub struct VisualizationEngine<R> {
    repo: Arc<R>,
    config: EngineConfig,
    data: PreparedData,
    ordering: OrderingTable,
    grouping: GroupingRegistry,
    groups: GroupAssignment,
    angles: AngleAssignment,
    machine: StateMachine,
}

impl<R> VisualizationEngine<R>
where
    R: SubjectRepository + EventRepository + SnapshotRepository + 'static,
{
    /// Load a dataset from the repository and start a fresh session
    /// spanning its full domain.
    pub async fn load(
        repo: Arc<R>,
        config: EngineConfig,
        request: PrepareRequest,
    ) -> Result<Self, EngineError> {
        let pipeline = PreparePipeline::new(&config);
        let data = pipeline.process(Arc::clone(&repo), request).await?;
        Ok(Self::from_prepared(repo, config, data))
    }

    /// Start a session over already prepared data. Deterministic entry
    /// point for tests and replays, no repository access involved.
    pub fn from_prepared(repo: Arc<R>, config: EngineConfig, data: PreparedData) -> Self {
        let ordering = OrderingTable::from_prepared(&data);
        let machine = StateMachine::new(
            data.initial_view_state(),
            data.domain,
            config.geometry.transition_ms,
        );
        let mut engine = Self {
            repo,
            config,
            data,
            ordering,
            grouping: GroupingRegistry::with_builtins(),
            groups: GroupAssignment::empty(),
            angles: AngleAssignment::distribute(&[]),
            machine,
        };
        engine.regroup();
        engine.reassign_angles();
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn data(&self) -> &PreparedData {
        &self.data
    }

    pub fn state(&self) -> &ViewState {
        self.machine.state()
    }

    pub fn angles(&self) -> &AngleAssignment {
        &self.angles
    }

    pub fn groups(&self) -> &GroupAssignment {
        &self.groups
    }

    /// Whether a newer gesture has landed since this handle was minted.
    pub fn is_superseded(&self, handle: TransitionHandle) -> bool {
        self.machine.is_superseded(handle)
    }

    // ==================== rendering ====================

    /// Render all surfaces at the current state.
    pub fn render(&self) -> SceneBundle {
        SceneBundle {
            radial: self.render_radial(),
            linear: self.render_linear(),
            brush: self.render_brush(),
            tooltips: self.render_tooltips(),
        }
    }

    pub fn render_radial(&self) -> RadialScene {
        self.radial_scene(self.machine.current_transition())
    }

    pub fn render_linear(&self) -> LinearScene {
        self.linear_scene(self.machine.current_transition())
    }

    pub fn render_brush(&self) -> BrushGeometry {
        compute_brush_geometry(&self.data, self.machine.state(), &self.config)
    }

    /// Hover payloads for every subject, in preparation order.
    pub fn render_tooltips(&self) -> Vec<TooltipPayload> {
        self.data
            .subjects
            .iter()
            .map(|prepared| TooltipPayload {
                subject_id: prepared.id(),
                title: prepared.subject.name.clone(),
                life: life_label(prepared),
                honor_count: prepared.honor_count,
            })
            .collect()
    }

    // ==================== gestures ====================

    /// Restrict post-life markers to one category, `None` lifts the
    /// filter.
    pub fn filter_events_by_type(&mut self, category: Option<EventCategory>) -> RenderUpdate {
        let outcome = self.machine.filter_events_by_type(category);
        self.apply(outcome)
    }

    /// Open the detail mode of a subject referenced by name. Alternate
    /// names resolve too.
    pub fn display_subject_details(&mut self, name: &str) -> Result<RenderUpdate, EngineError> {
        let subject = self
            .resolve_subject(name)
            .ok_or_else(|| EngineError::UnknownSubject(name.to_string()))?;
        let outcome = self.machine.highlight_subject(subject);
        Ok(self.apply(outcome))
    }

    /// Open the detail mode of a subject by id.
    pub fn highlight_subject(&mut self, subject: SubjectId) -> Result<RenderUpdate, EngineError> {
        if self.data.subject(subject).is_none() {
            return Err(EngineError::UnknownSubject(subject.to_string()));
        }
        let outcome = self.machine.highlight_subject(subject);
        Ok(self.apply(outcome))
    }

    /// Leave detail mode.
    pub fn close_subject_details(&mut self) -> RenderUpdate {
        let outcome = self.machine.close_subject_details();
        self.apply(outcome)
    }

    /// The brush moved or resized.
    pub fn brush_range(&mut self, range: DateRange) -> RenderUpdate {
        let outcome = self.machine.update_range(range, RangeChangeOrigin::Brush);
        self.apply(outcome)
    }

    /// Zoom or pan on the radial chart changed the window.
    pub fn rescale_time(&mut self, range: DateRange) -> RenderUpdate {
        let outcome = self.machine.update_range(range, RangeChangeOrigin::Zoom);
        self.apply(outcome)
    }

    /// Set the window from outside any chart gesture.
    pub fn set_range(&mut self, range: DateRange) -> RenderUpdate {
        let outcome = self
            .machine
            .update_range(range, RangeChangeOrigin::Programmatic);
        self.apply(outcome)
    }

    /// Reset the window to the full domain.
    pub fn clear_time_selection(&mut self) -> RenderUpdate {
        let outcome = self.machine.clear_time_selection();
        self.apply(outcome)
    }

    /// Flip the radial time axis direction.
    pub fn invert_time(&mut self) -> RenderUpdate {
        let outcome = self.machine.invert_time();
        self.apply(outcome)
    }

    /// Switch the angular ordering criterion.
    pub fn update_order(&mut self, criterion: OrderingCriterion) -> RenderUpdate {
        let outcome = self.machine.set_ordering(criterion);
        self.apply(outcome)
    }

    /// Switch the grouping criterion.
    pub fn update_group(&mut self, criterion: GroupingCriterion) -> RenderUpdate {
        let outcome = self.machine.set_grouping(criterion);
        self.apply(outcome)
    }

    pub fn set_show_names(&mut self, show: bool) -> RenderUpdate {
        let outcome = self.machine.set_show_names(show);
        self.apply(outcome)
    }

    pub fn set_show_mouse_grid(&mut self, show: bool) -> RenderUpdate {
        let outcome = self.machine.set_show_mouse_grid(show);
        self.apply(outcome)
    }

    pub fn set_show_brush(&mut self, show: bool) -> RenderUpdate {
        let outcome = self.machine.set_show_brush(show);
        self.apply(outcome)
    }

    /// Register or replace a grouping criterion. When the criterion is
    /// already active the partition is recomputed right away; the next
    /// render reflects it.
    pub fn register_grouping<F>(&mut self, criterion: GroupingCriterion, classifier: F)
    where
        F: Fn(&PreparedSubject, &GroupingContext) -> Option<String> + Send + Sync + 'static,
    {
        self.grouping.register(criterion, classifier);
        if self.machine.state().grouping == criterion {
            self.regroup();
            self.reassign_angles();
        }
    }

    // ==================== snapshots ====================

    /// Persist the current view state, returning its content id.
    pub async fn save_snapshot(&self) -> Result<String, EngineError> {
        let snapshot = ViewSnapshot::new(self.theme_id(), self.machine.state().clone());
        let id = self.repo.store_snapshot(&snapshot).await?;
        Ok(id)
    }

    /// Restore a stored view state over the loaded dataset.
    ///
    /// The stored window is clamped to the current domain and a
    /// highlighted subject missing from this dataset is dropped, so a
    /// snapshot taken against older data still replays.
    pub async fn restore_snapshot(&mut self, id: &str) -> Result<RenderUpdate, EngineError> {
        let snapshot = self.repo.load_snapshot(id).await?;
        if snapshot.theme != self.theme_id() {
            log::warn!(
                "Snapshot {} was taken under theme {:?}, current session runs {:?}",
                id,
                snapshot.theme,
                self.theme_id()
            );
        }
        let mut state = snapshot.state;
        if let Some(subject) = state.highlighted {
            if self.data.subject(subject).is_none() {
                log::debug!(
                    "Snapshot highlights subject {} which is not in this dataset, dropping it",
                    subject
                );
                state.highlighted = None;
            }
        }
        let outcome = self.machine.restore(state);
        Ok(self.apply(outcome))
    }

    // ==================== internals ====================

    fn theme_id(&self) -> Option<crate::models::subject::ThemeId> {
        self.data.theme.as_ref().map(|t| t.id)
    }

    fn resolve_subject(&self, name: &str) -> Option<SubjectId> {
        self.data
            .subjects
            .iter()
            .find(|p| {
                p.subject.name.eq_ignore_ascii_case(name)
                    || p.subject
                        .alternate_names
                        .iter()
                        .any(|alt| alt.eq_ignore_ascii_case(name))
            })
            .map(|p| p.id())
    }

    /// Recompute derived state per the outcome flags, then render what
    /// the plan asks for.
    fn apply(&mut self, outcome: GestureOutcome) -> RenderUpdate {
        if outcome.regroup {
            self.regroup();
        }
        if outcome.reassign_angles {
            self.reassign_angles();
        }
        let radial = outcome
            .plan
            .radial
            .then(|| self.radial_scene(outcome.transition));
        let linear = outcome
            .plan
            .linear
            .then(|| self.linear_scene(outcome.transition));
        let brush = outcome.plan.brush.then(|| self.render_brush());
        RenderUpdate {
            outcome,
            radial,
            linear,
            brush,
        }
    }

    fn regroup(&mut self) {
        let context = GroupingContext::from_config(&self.config);
        self.groups = self
            .grouping
            .assign(self.machine.state().grouping, &self.data, &context);
    }

    /// Redistribute angular slots under the active ordering. With a
    /// non-default grouping the order becomes category-major first, so
    /// each donut category forms one contiguous arc.
    fn reassign_angles(&mut self) {
        let state = self.machine.state();
        let base = self.ordering.order_for(state.ordering, &self.data.subject_ids());
        let ordered = if state.grouping != GroupingCriterion::default() {
            category_major_order(&base, &self.groups)
        } else {
            base
        };
        self.angles = AngleAssignment::distribute(&ordered);
    }

    fn radial_scene(&self, transition: TransitionHandle) -> RadialScene {
        compute_radial_scene(
            &self.data,
            self.machine.state(),
            &self.angles,
            &self.groups,
            &self.config,
            transition,
        )
    }

    fn linear_scene(&self, transition: TransitionHandle) -> LinearScene {
        compute_linear_scene(&self.data, self.machine.state(), &self.config, transition)
    }
}

/// Formatted life span for tooltips, years only.
fn life_label(prepared: &PreparedSubject) -> String {
    match (prepared.birth, prepared.death) {
        (Some(birth), Some(death)) => format!("{}-{}", birth.year(), death.year()),
        (Some(birth), None) => format!("{}-", birth.year()),
        (None, Some(death)) => format!("-{}", death.year()),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::db::LocalRepository;
    use crate::models::subject::{Subject, SubjectKind};
    use crate::pipeline::prepare::SubjectView;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn prepared_person(id: i64, name: &str, alternates: &[&str]) -> PreparedSubject {
        let mut subject = Subject::new(SubjectId(id), name, SubjectKind::Person);
        subject.alternate_names = alternates.iter().map(|s| s.to_string()).collect();
        PreparedSubject {
            subject,
            birth: Some(date(1881, 11, 28)),
            death: Some(date(1942, 2, 22)),
            span_end: date(1942, 2, 22),
            first_honor: None,
            honor_count: 0,
            center_distance_m: None,
            points: Vec::new(),
        }
    }

    fn engine_with(subjects: Vec<PreparedSubject>) -> VisualizationEngine<LocalRepository> {
        let data = PreparedData {
            theme: None,
            view: SubjectView::People,
            subjects,
            domain: DateRange::from_ymd(1850, 1, 1, 2020, 12, 31),
            max_relation_count: 1,
            today: date(2020, 6, 1),
            unresolved_dates: 0,
        };
        VisualizationEngine::from_prepared(
            Arc::new(LocalRepository::new()),
            EngineConfig::default(),
            data,
        )
    }

    #[test]
    fn test_subjects_resolve_by_name_and_alternate_name() {
        let mut engine = engine_with(vec![prepared_person(1, "Stefan Zweig", &["Zweig, Stefan"])]);
        assert!(engine.display_subject_details("stefan zweig").is_ok());
        engine.close_subject_details();
        assert!(engine.display_subject_details("Zweig, Stefan").is_ok());
        let err = engine.display_subject_details("Unbekannt");
        assert!(matches!(err, Err(EngineError::UnknownSubject(_))));
    }

    #[test]
    fn test_life_label_handles_open_ends() {
        let full = prepared_person(1, "A", &[]);
        assert_eq!(life_label(&full), "1881-1942");

        let mut undead = prepared_person(2, "B", &[]);
        undead.death = None;
        undead.span_end = date(2020, 6, 1);
        assert_eq!(life_label(&undead), "1881-");

        let mut unknown_birth = prepared_person(3, "C", &[]);
        unknown_birth.birth = None;
        assert_eq!(life_label(&unknown_birth), "-1942");
    }

    #[test]
    fn test_unknown_highlight_id_is_an_error() {
        let mut engine = engine_with(vec![prepared_person(1, "A", &[])]);
        assert!(engine.highlight_subject(SubjectId(1)).is_ok());
        assert!(matches!(
            engine.highlight_subject(SubjectId(42)),
            Err(EngineError::UnknownSubject(_))
        ));
    }
}
