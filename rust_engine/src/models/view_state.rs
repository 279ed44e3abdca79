//! Shared view state for the coordinated charts.
//!
//! Both renderers read the same [`ViewState`] value. It is a plain data
//! object: gestures are interpreted by the state machine, which produces
//! the next state, and renderers receive the result without ever mutating
//! it. The whole struct serializes, which is what makes snapshots work.

use serde::{Deserialize, Serialize};

use crate::models::datapoint::EventCategory;
use crate::models::dates::DateRange;
use crate::models::subject::SubjectId;

/// Criterion deciding the angular order of subjects on the radial chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingCriterion {
    /// Birth date, earliest first.
    #[default]
    Birth,
    /// Death date, earliest first.
    Death,
    /// Days between death and the first honoring event, shortest first.
    HonoringTime,
    /// Number of post-life events, fewest first.
    EventCount,
    /// Distance of the subject's primary coordinate from the city center.
    CenterProximity,
}

impl OrderingCriterion {
    pub const ALL: [OrderingCriterion; 5] = [
        OrderingCriterion::Birth,
        OrderingCriterion::Death,
        OrderingCriterion::HonoringTime,
        OrderingCriterion::EventCount,
        OrderingCriterion::CenterProximity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingCriterion::Birth => "birth",
            OrderingCriterion::Death => "death",
            OrderingCriterion::HonoringTime => "honoring_time",
            OrderingCriterion::EventCount => "event_count",
            OrderingCriterion::CenterProximity => "center_proximity",
        }
    }
}

impl std::fmt::Display for OrderingCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criterion partitioning subjects into colored categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingCriterion {
    /// Primary role with a fixed precedence between overlapping roles.
    #[default]
    Role,
    /// Exiled versus not exiled.
    Exiled,
    /// Born after 1945 versus before versus unknown.
    BornAfter1945,
    /// Died before the March 1938 annexation versus after versus unknown.
    DiedBefore1938,
    /// Recorded gender.
    Gender,
    /// Place type of location subjects.
    LocationType,
    /// Municipal district of location subjects.
    District,
}

impl GroupingCriterion {
    pub const ALL: [GroupingCriterion; 7] = [
        GroupingCriterion::Role,
        GroupingCriterion::Exiled,
        GroupingCriterion::BornAfter1945,
        GroupingCriterion::DiedBefore1938,
        GroupingCriterion::Gender,
        GroupingCriterion::LocationType,
        GroupingCriterion::District,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingCriterion::Role => "role",
            GroupingCriterion::Exiled => "exiled",
            GroupingCriterion::BornAfter1945 => "born_after_1945",
            GroupingCriterion::DiedBefore1938 => "died_before_1938",
            GroupingCriterion::Gender => "gender",
            GroupingCriterion::LocationType => "location_type",
            GroupingCriterion::District => "district",
        }
    }
}

impl std::fmt::Display for GroupingCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete shared state both charts render from.
///
/// # Examples
///
/// ```
/// use btv_rust::models::view_state::ViewState;
/// use btv_rust::models::dates::DateRange;
///
/// let domain = DateRange::from_ymd(1850, 1, 1, 2020, 12, 31);
/// let state = ViewState::spanning(domain);
/// assert_eq!(state.visible, domain);
/// assert!(state.highlighted.is_none());
/// assert!(state.show_names);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Currently displayed date window.
    pub visible: DateRange,
    pub ordering: OrderingCriterion,
    pub grouping: GroupingCriterion,
    /// Restrict post-life markers to one category, `None` shows all.
    #[serde(default)]
    pub category_filter: Option<EventCategory>,
    /// Subject whose detail mode is active.
    #[serde(default)]
    pub highlighted: Option<SubjectId>,
    #[serde(default = "default_true")]
    pub show_names: bool,
    #[serde(default)]
    pub show_mouse_grid: bool,
    #[serde(default = "default_true")]
    pub show_brush: bool,
    /// Radial time axis runs outside-in instead of inside-out.
    #[serde(default)]
    pub inverted: bool,
}

fn default_true() -> bool {
    true
}

impl ViewState {
    /// Initial state showing the full data domain with defaults applied.
    pub fn spanning(domain: DateRange) -> Self {
        Self {
            visible: domain,
            ordering: OrderingCriterion::default(),
            grouping: GroupingCriterion::default(),
            category_filter: None,
            highlighted: None,
            show_names: true,
            show_mouse_grid: false,
            show_brush: true,
            inverted: false,
        }
    }

    /// Whether a category passes the active filter.
    pub fn category_visible(&self, category: EventCategory) -> bool {
        match self.category_filter {
            None => true,
            Some(active) => active == category,
        }
    }

    pub fn is_highlighting(&self, subject: SubjectId) -> bool {
        self.highlighted == Some(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> DateRange {
        DateRange::from_ymd(1850, 1, 1, 2020, 12, 31)
    }

    #[test]
    fn test_defaults() {
        let state = ViewState::spanning(domain());
        assert_eq!(state.ordering, OrderingCriterion::Birth);
        assert_eq!(state.grouping, GroupingCriterion::Role);
        assert!(state.category_filter.is_none());
        assert!(!state.inverted);
    }

    #[test]
    fn test_category_filter() {
        let mut state = ViewState::spanning(domain());
        assert!(state.category_visible(EventCategory::Street));

        state.category_filter = Some(EventCategory::Memorial);
        assert!(state.category_visible(EventCategory::Memorial));
        assert!(!state.category_visible(EventCategory::Street));
    }

    #[test]
    fn test_roundtrips_through_json() {
        let mut state = ViewState::spanning(domain());
        state.ordering = OrderingCriterion::EventCount;
        state.highlighted = Some(SubjectId(42));
        state.inverted = true;

        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        // Old snapshots may predate newer toggles.
        let json = r#"{
            "visible": { "start": "1850-01-01", "end": "2020-12-31" },
            "ordering": "death",
            "grouping": "gender"
        }"#;
        let state: ViewState = serde_json::from_str(json).unwrap();
        assert_eq!(state.ordering, OrderingCriterion::Death);
        assert!(state.show_names);
        assert!(state.show_brush);
        assert!(!state.show_mouse_grid);
    }
}
