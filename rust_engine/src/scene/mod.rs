//! Renderable scene descriptions.
//!
//! A scene is the complete, resolution-independent drawing plan of one
//! chart: every position, radius, color and opacity already computed.
//! Renderers emit scenes, frontends rasterize them. Scenes serialize to
//! JSON so a browser client can consume them directly, and they carry the
//! [`TransitionHandle`] of the gesture that produced them so stale
//! animations can be dropped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::datapoint::{EventCategory, PointKind};
use crate::models::dates::DateRange;
use crate::models::subject::SubjectId;
use crate::state::transitions::TransitionHandle;

/// A point in chart coordinates, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
}

impl ScenePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The ring marking the reference instant, drawn when that instant falls
/// inside the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideRing {
    pub radius: f64,
    pub year: i32,
}

/// One ring of the radial year grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRing {
    pub radius: f64,
    pub year: i32,
}

/// A radial line segment along a spoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanSegment {
    pub start_radius: f64,
    pub end_radius: f64,
    pub color: String,
    pub opacity: f64,
}

/// One event marker on a spoke.
///
/// `position` is `None` when the marker's date falls outside the visible
/// window. Such markers stay in the scene at opacity zero, so tooltip
/// indices and enter/exit animations line up across window changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialMarker {
    pub label: String,
    pub kind: PointKind,
    pub category: EventCategory,
    pub date: NaiveDate,
    pub position: Option<ScenePoint>,
    pub radius: f64,
    pub color: String,
    pub opacity: f64,
}

/// A subject's category arc on the outer donut ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutSegment {
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub color: String,
    pub opacity: f64,
}

/// Which end of the text sits on the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAnchor {
    Start,
    End,
}

/// A subject name label outside the donut ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokeLabel {
    pub text: String,
    /// Angle of the spoke after rotation, normalized to [0, 2π).
    pub angle: f64,
    pub radius: f64,
    /// Rotated 180° so the text reads left to right on the lower half.
    pub flipped: bool,
    pub anchor: LabelAnchor,
    pub opacity: f64,
}

/// One subject's spoke: life span, post-life ray, markers, donut arc and
/// label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialSpoke {
    pub subject_id: SubjectId,
    pub name: String,
    /// Slot angle before rotation, clockwise from twelve o'clock.
    pub angle: f64,
    /// Category under the active grouping, `None` when uncategorized.
    pub group: Option<String>,
    pub life_span: Option<SpanSegment>,
    /// Dashed continuation from death to the end of the window.
    pub post_life_ray: Option<SpanSegment>,
    pub markers: Vec<RadialMarker>,
    pub donut: Option<DonutSegment>,
    pub label: Option<SpokeLabel>,
}

/// The complete radial chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialScene {
    pub center: ScenePoint,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Rotation applied to all spokes, radians clockwise.
    pub rotation: f64,
    pub visible: DateRange,
    pub inverted: bool,
    pub transition: TransitionHandle,
    pub guide_ring: Option<GuideRing>,
    pub grid_rings: Vec<GridRing>,
    pub spokes: Vec<RadialSpoke>,
}

impl RadialScene {
    pub fn spoke(&self, subject: SubjectId) -> Option<&RadialSpoke> {
        self.spokes.iter().find(|s| s.subject_id == subject)
    }
}

/// A historic period drawn as a background band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricBand {
    pub label: String,
    pub x_start: f64,
    pub x_end: f64,
    pub color: String,
    pub opacity: f64,
}

/// One labeled year tick on the linear axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub x: f64,
    pub year: i32,
}

/// One event dot in the aggregate chart, stacked above the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedDot {
    pub subject_id: SubjectId,
    pub label: String,
    pub kind: PointKind,
    pub category: EventCategory,
    pub year: i32,
    pub position: ScenePoint,
    pub radius: f64,
    pub color: String,
    pub opacity: f64,
}

/// The complete linear aggregate chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScene {
    pub width: f64,
    pub height: f64,
    /// Full data domain. The linear chart never zooms.
    pub domain: DateRange,
    pub baseline_y: f64,
    pub transition: TransitionHandle,
    pub bands: Vec<HistoricBand>,
    pub ticks: Vec<AxisTick>,
    pub dots: Vec<StackedDot>,
}

/// Position of the time range selector on the linear axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushGeometry {
    pub track_width: f64,
    pub x_start: f64,
    pub x_end: f64,
    pub visible: bool,
}

/// Hover details for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipPayload {
    pub subject_id: SubjectId,
    pub title: String,
    /// Formatted life span, e.g. "1881-1942".
    pub life: String,
    pub honor_count: usize,
}

/// Everything one render pass produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneBundle {
    pub radial: RadialScene,
    pub linear: LinearScene,
    pub brush: BrushGeometry,
    pub tooltips: Vec<TooltipPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> TransitionHandle {
        TransitionHandle {
            generation: 3,
            duration_ms: 250,
        }
    }

    #[test]
    fn test_radial_scene_roundtrips_through_json() {
        let scene = RadialScene {
            center: ScenePoint::new(380.0, 380.0),
            inner_radius: 45.6,
            outer_radius: 334.4,
            rotation: 0.0,
            visible: DateRange::from_ymd(1850, 1, 1, 2020, 12, 31),
            inverted: false,
            transition: handle(),
            guide_ring: Some(GuideRing {
                radius: 200.0,
                year: 1938,
            }),
            grid_rings: vec![GridRing {
                radius: 120.0,
                year: 1900,
            }],
            spokes: vec![RadialSpoke {
                subject_id: SubjectId(7),
                name: "Stefan Zweig".to_string(),
                angle: 0.0,
                group: Some("Author".to_string()),
                life_span: Some(SpanSegment {
                    start_radius: 60.0,
                    end_radius: 200.0,
                    color: "#1b9e77".to_string(),
                    opacity: 1.0,
                }),
                post_life_ray: None,
                markers: vec![RadialMarker {
                    label: "Gedenktafel".to_string(),
                    kind: PointKind::PostLife,
                    category: EventCategory::Memorial,
                    date: NaiveDate::from_ymd_opt(1962, 5, 1).expect("valid date"),
                    position: None,
                    radius: 3.0,
                    color: "#66c2a5".to_string(),
                    opacity: 0.0,
                }],
                donut: None,
                label: Some(SpokeLabel {
                    text: "Stefan Zweig".to_string(),
                    angle: 0.0,
                    radius: 382.6,
                    flipped: false,
                    anchor: LabelAnchor::Start,
                    opacity: 1.0,
                }),
            }],
        };

        let json = serde_json::to_string(&scene).expect("scene serializes");
        let back: RadialScene = serde_json::from_str(&json).expect("scene deserializes");
        assert_eq!(back, scene);
        assert!(json.contains("\"post_life\""));
        assert!(json.contains("\"memorial\""));
    }

    #[test]
    fn test_spoke_lookup_by_subject() {
        let scene = RadialScene {
            center: ScenePoint::new(0.0, 0.0),
            inner_radius: 1.0,
            outer_radius: 2.0,
            rotation: 0.0,
            visible: DateRange::from_ymd(1900, 1, 1, 2000, 1, 1),
            inverted: false,
            transition: handle(),
            guide_ring: None,
            grid_rings: Vec::new(),
            spokes: vec![RadialSpoke {
                subject_id: SubjectId(1),
                name: "A".to_string(),
                angle: 0.0,
                group: None,
                life_span: None,
                post_life_ray: None,
                markers: Vec::new(),
                donut: None,
                label: None,
            }],
        };
        assert!(scene.spoke(SubjectId(1)).is_some());
        assert!(scene.spoke(SubjectId(2)).is_none());
    }
}
