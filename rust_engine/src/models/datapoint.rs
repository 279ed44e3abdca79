//! Prepared chart points.
//!
//! The preparation pipeline flattens subjects and their events into a
//! single vector of [`DataPoint`] values. Everything downstream, from
//! ordering to both renderers, consumes points and never goes back to the
//! raw records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::subject::{EventId, SubjectId};

/// What a point marks on a subject's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// Birth or death of the subject.
    Boundary,
    /// A role or function held during the subject's life.
    Life,
    /// An honoring event after the subject's death.
    PostLife,
    /// An event tied to a location subject.
    LocationEvent,
}

impl PointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointKind::Boundary => "boundary",
            PointKind::Life => "life",
            PointKind::PostLife => "post_life",
            PointKind::LocationEvent => "location_event",
        }
    }
}

/// Color category of an honoring event, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Memorial,
    Street,
    Prize,
    Conference,
    Anniversary,
    Exhibition,
    Exile,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 8] = [
        EventCategory::Memorial,
        EventCategory::Street,
        EventCategory::Prize,
        EventCategory::Conference,
        EventCategory::Anniversary,
        EventCategory::Exhibition,
        EventCategory::Exile,
        EventCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Memorial => "memorial",
            EventCategory::Street => "street",
            EventCategory::Prize => "prize",
            EventCategory::Conference => "conference",
            EventCategory::Anniversary => "anniversary",
            EventCategory::Exhibition => "exhibition",
            EventCategory::Exile => "exile",
            EventCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved, renderable point on a subject's timeline.
///
/// The boundary kind covers birth and death markers; life points carry a
/// function held during the subject's lifetime; post-life points are the
/// honoring events the views exist for. Points without a resolvable start
/// date never become a `DataPoint` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub subject_id: SubjectId,
    /// Source event id for post-life points, `None` for boundary and life
    /// points synthesized from the subject record itself.
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub label: String,
    pub kind: PointKind,
    pub date: NaiveDate,
    /// End of an interval point, e.g. a function held for years.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub category: EventCategory,
    /// Total archive relations of the source event, drives marker size.
    #[serde(default)]
    pub relation_count: usize,
}

impl DataPoint {
    pub fn new(
        subject_id: SubjectId,
        label: impl Into<String>,
        kind: PointKind,
        date: NaiveDate,
        category: EventCategory,
    ) -> Self {
        Self {
            subject_id,
            event_id: None,
            label: label.into(),
            kind,
            date,
            end_date: None,
            category,
            relation_count: 0,
        }
    }

    pub fn with_event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_relation_count(mut self, count: usize) -> Self {
        self.relation_count = count;
        self
    }

    pub fn year(&self) -> i32 {
        use chrono::Datelike;
        self.date.year()
    }

    pub fn is_post_life(&self) -> bool {
        self.kind == PointKind::PostLife
    }

    /// Post-life and location events both count as honors for ordering
    /// and sizing purposes.
    pub fn is_honoring(&self) -> bool {
        matches!(self.kind, PointKind::PostLife | PointKind::LocationEvent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_year() {
        let date = NaiveDate::from_ymd_opt(1947, 5, 9).unwrap();
        let point = DataPoint::new(
            SubjectId(1),
            "Zweiggasse benannt",
            PointKind::PostLife,
            date,
            EventCategory::Street,
        );
        assert_eq!(point.year(), 1947);
        assert!(point.is_post_life());
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&EventCategory::Memorial).unwrap();
        assert_eq!(json, "\"memorial\"");
        let back: EventCategory = serde_json::from_str("\"street\"").unwrap();
        assert_eq!(back, EventCategory::Street);
    }

    #[test]
    fn test_all_lists_every_category_once() {
        let mut seen = std::collections::HashSet::new();
        for category in EventCategory::ALL {
            assert!(seen.insert(category), "duplicate {category}");
        }
        assert_eq!(seen.len(), 8);
    }
}
