//! Radial chart renderer.
//!
//! The radial chart puts time on the radius and one subject per angular
//! slot. Every spoke carries the subject's life span, a dashed post-life
//! ray, one marker per prepared point, the donut arc of its group and
//! the name label outside the rim. Highlighting rotates the whole chart
//! so the focused spoke lands on the configured reference direction.

use chrono::Datelike;

use crate::config::EngineConfig;
use crate::geometry::{
    label_flipped, normalize_angle, polar_to_cartesian, AngleAssignment, AngularSlot, MarkerScale,
    RadialScale,
};
use crate::models::datapoint::DataPoint;
use crate::models::dates::DateRange;
use crate::models::subject::SubjectId;
use crate::models::view_state::ViewState;
use crate::ordering::grouping::GroupAssignment;
use crate::pipeline::prepare::{PreparedData, PreparedSubject};
use crate::render::{filter_opacity, marker_color};
use crate::scene::{
    DonutSegment, GridRing, GuideRing, LabelAnchor, RadialMarker, RadialScene, RadialSpoke,
    ScenePoint, SpanSegment, SpokeLabel,
};
use crate::state::transitions::TransitionHandle;

/// Upper bound of labeled year rings.
const GRID_RING_BUDGET: usize = 8;

/// Render the radial chart for one state.
///
/// Pure: the same inputs always produce the same scene. Markers whose
/// date falls outside the visible window keep their slot in the output
/// with no position and opacity zero, so marker identity is stable
/// across window changes.
pub fn compute_radial_scene(
    data: &PreparedData,
    state: &ViewState,
    angles: &AngleAssignment,
    groups: &GroupAssignment,
    config: &EngineConfig,
    transition: TransitionHandle,
) -> RadialScene {
    // Step 1: Resolve the frame geometry and scales.
    let frame = Frame::new(data, state, angles, config);

    // Step 2: Year grid, plus the reference ring when its instant is in
    // the window.
    let grid_rings = frame
        .scale
        .year_ticks(GRID_RING_BUDGET)
        .into_iter()
        .map(|year| GridRing {
            radius: frame.scale.project_year(year),
            year,
        })
        .collect();
    let reference = config.timeline.reference_instant;
    let guide_ring = if state.visible.contains(reference) {
        Some(GuideRing {
            radius: frame.scale.project(reference),
            year: reference.year(),
        })
    } else {
        None
    };

    // Step 3: One spoke per subject, in slot order.
    let mut spokes = Vec::with_capacity(angles.len());
    for &subject_id in angles.order() {
        let Some(prepared) = data.subject(subject_id) else {
            log::debug!("Subject {} has a slot but no prepared record", subject_id);
            continue;
        };
        let Some(slot) = angles.slot_of(subject_id) else {
            continue;
        };
        spokes.push(frame.build_spoke(prepared, slot, groups));
    }

    RadialScene {
        center: frame.center,
        inner_radius: frame.inner_radius,
        outer_radius: frame.ring_outer,
        rotation: frame.rotation,
        visible: state.visible,
        inverted: state.inverted,
        transition,
        guide_ring,
        grid_rings,
        spokes,
    }
}

/// Shared per-render geometry.
struct Frame<'a> {
    state: &'a ViewState,
    config: &'a EngineConfig,
    center: ScenePoint,
    inner_radius: f64,
    ring_outer: f64,
    donut_inner: f64,
    donut_outer: f64,
    label_radius: f64,
    rotation: f64,
    scale: RadialScale,
    markers: MarkerScale,
}

impl<'a> Frame<'a> {
    fn new(
        data: &PreparedData,
        state: &'a ViewState,
        angles: &AngleAssignment,
        config: &'a EngineConfig,
    ) -> Self {
        let g = &config.geometry;
        let total = g.radial_diameter / 2.0;
        let inner = total * g.inner_hole_ratio;
        let ring_outer = total * g.donut_inner_ratio;
        // Inversion swaps the radial range, not the geometry.
        let scale = if state.inverted {
            RadialScale::new(state.visible, ring_outer, inner)
        } else {
            RadialScale::new(state.visible, inner, ring_outer)
        };
        let rotation = state
            .highlighted
            .and_then(|subject| angles.rotation_to(subject, g.reference_direction_rad))
            .unwrap_or(0.0);
        Self {
            state,
            config,
            center: ScenePoint::new(total, total),
            inner_radius: inner,
            ring_outer,
            donut_inner: ring_outer,
            donut_outer: total * g.donut_outer_ratio,
            label_radius: total * g.donut_outer_ratio + g.label_offset,
            rotation,
            scale,
            markers: MarkerScale::new(
                g.marker_radius_min,
                g.marker_radius_max,
                data.max_relation_count,
            ),
        }
    }

    fn build_spoke(
        &self,
        prepared: &PreparedSubject,
        slot: AngularSlot,
        groups: &GroupAssignment,
    ) -> RadialSpoke {
        let opacity = &self.config.opacity;
        let muted = match self.state.highlighted {
            Some(focused) => focused != prepared.id(),
            None => false,
        };
        let level = if muted { opacity.hidden } else { opacity.full };
        let visible = self.state.visible;

        // Life span clipped to the window.
        let life_span = prepared.span_start().and_then(|start| {
            DateRange::new(start, prepared.span_end)
                .intersect(visible)
                .map(|clipped| SpanSegment {
                    start_radius: self.scale.project(clipped.start),
                    end_radius: self.scale.project(clipped.end),
                    color: self.span_color(prepared.id(), groups),
                    opacity: level,
                })
        });

        // Dashed ray from the end of the life span to the window edge.
        // Zero length for subjects whose span runs to today.
        let post_life_ray = match prepared.span_start() {
            Some(_) if prepared.span_end <= visible.end => {
                let start = prepared.span_end.max(visible.start);
                Some(SpanSegment {
                    start_radius: self.scale.project(start),
                    end_radius: self.scale.project(visible.end),
                    color: self.config.palette.boundary_color.clone(),
                    opacity: if muted { opacity.hidden } else { opacity.dimmed },
                })
            }
            _ => None,
        };

        let markers = prepared
            .points
            .iter()
            .map(|point| self.build_marker(point, slot, muted))
            .collect();

        let group = groups.category_of(prepared.id()).map(str::to_string);
        let donut = group.as_deref().map(|category| DonutSegment {
            start_angle: slot.start + self.rotation,
            end_angle: slot.end + self.rotation,
            inner_radius: self.donut_inner,
            outer_radius: self.donut_outer,
            color: self
                .config
                .palette
                .group_color(groups.color_slot(category).unwrap_or(0))
                .to_string(),
            opacity: level,
        });

        let label = if self.state.show_names {
            let effective = normalize_angle(slot.angle + self.rotation);
            let flipped = label_flipped(effective);
            Some(SpokeLabel {
                text: prepared.subject.name.clone(),
                angle: effective,
                radius: self.label_radius,
                flipped,
                anchor: if flipped {
                    LabelAnchor::End
                } else {
                    LabelAnchor::Start
                },
                opacity: level,
            })
        } else {
            None
        };

        RadialSpoke {
            subject_id: prepared.id(),
            name: prepared.subject.name.clone(),
            angle: slot.angle,
            group,
            life_span,
            post_life_ray,
            markers,
            donut,
            label,
        }
    }

    fn build_marker(&self, point: &DataPoint, slot: AngularSlot, muted: bool) -> RadialMarker {
        let opacity = &self.config.opacity;
        let in_window = self.state.visible.contains(point.date);
        let position = if in_window {
            let radius = self.scale.project(point.date);
            let (x, y) = polar_to_cartesian(
                self.center.x,
                self.center.y,
                radius,
                slot.angle + self.rotation,
            );
            Some(ScenePoint::new(x, y))
        } else {
            None
        };
        let level = if muted || !in_window {
            opacity.hidden
        } else {
            filter_opacity(point, self.state, opacity)
        };
        RadialMarker {
            label: point.label.clone(),
            kind: point.kind,
            category: point.category,
            date: point.date,
            position,
            radius: self.markers.project(point.relation_count),
            color: marker_color(point, &self.config.palette),
            opacity: level,
        }
    }

    /// Spoke line color: the group color when categorized, neutral
    /// otherwise.
    fn span_color(&self, subject: SubjectId, groups: &GroupAssignment) -> String {
        groups
            .category_of(subject)
            .and_then(|category| groups.color_slot(category))
            .map(|slot| self.config.palette.group_color(slot).to_string())
            .unwrap_or_else(|| self.config.palette.boundary_color.clone())
    }
}
