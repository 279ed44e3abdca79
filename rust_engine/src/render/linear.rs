//! Linear aggregate chart renderer.
//!
//! The linear chart shows every data point over the full data domain,
//! one column per year, same-year points stacked upward from the
//! baseline. It never zooms: the visible window only drives the brush
//! position and dims dots outside the selection, so the user always
//! sees where the selection sits in the whole timeline.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::geometry::{LinearScale, MarkerScale};
use crate::models::datapoint::DataPoint;
use crate::models::view_state::ViewState;
use crate::pipeline::prepare::PreparedData;
use crate::render::{filter_opacity, marker_color};
use crate::scene::{AxisTick, BrushGeometry, HistoricBand, LinearScene, ScenePoint, StackedDot};
use crate::state::transitions::TransitionHandle;

/// Horizontal and vertical space reserved around the axis.
const AXIS_MARGIN: f64 = 24.0;
/// Target pixel spacing between year ticks.
const TICK_SPACING_PX: f64 = 80.0;

/// Chart width under the current state. The side panel takes its width
/// from the chart while a subject is highlighted.
fn effective_width(state: &ViewState, config: &EngineConfig) -> f64 {
    let g = &config.geometry;
    if state.highlighted.is_some() {
        g.linear_width - g.side_panel_width
    } else {
        g.linear_width
    }
}

fn axis_scale(data: &PreparedData, width: f64) -> LinearScale {
    LinearScale::new(data.domain, AXIS_MARGIN, width - AXIS_MARGIN)
}

/// Render the linear aggregate chart for one state.
pub fn compute_linear_scene(
    data: &PreparedData,
    state: &ViewState,
    config: &EngineConfig,
    transition: TransitionHandle,
) -> LinearScene {
    // Step 1: Axis geometry over the full domain.
    let width = effective_width(state, config);
    let height = config.geometry.linear_height;
    let baseline_y = height - AXIS_MARGIN;
    let scale = axis_scale(data, width);

    // Step 2: Historic background bands, clipped to the domain.
    let bands = config
        .timeline
        .historic_intervals
        .iter()
        .filter_map(|interval| {
            interval.range().intersect(data.domain).map(|clipped| HistoricBand {
                label: interval.label.clone(),
                x_start: scale.project(clipped.start),
                x_end: scale.project(clipped.end),
                color: config.palette.historic_band_color.clone(),
                opacity: config.opacity.dimmed,
            })
        })
        .collect();

    // Step 3: Year ticks sized to the width.
    let max_ticks = ((width / TICK_SPACING_PX) as usize).max(2);
    let ticks = scale
        .year_ticks(max_ticks)
        .into_iter()
        .map(|year| AxisTick {
            x: scale.project_year(year),
            year,
        })
        .collect();

    // Step 4: Stack the data points year by year.
    let dots = stack_dots(data, state, config, &scale, baseline_y);

    LinearScene {
        width,
        height,
        domain: data.domain,
        baseline_y,
        transition,
        bands,
        ticks,
        dots,
    }
}

/// One dot per data point, same-year points stacked bottom-up in
/// category order, ties broken by date. Dots share the radial chart's
/// marker size scale.
fn stack_dots(
    data: &PreparedData,
    state: &ViewState,
    config: &EngineConfig,
    scale: &LinearScale,
    baseline_y: f64,
) -> Vec<StackedDot> {
    let markers = MarkerScale::new(
        config.geometry.marker_radius_min,
        config.geometry.marker_radius_max,
        data.max_relation_count,
    );
    let gap = config.geometry.dot_gap;
    let mut by_year: BTreeMap<i32, Vec<&DataPoint>> = BTreeMap::new();
    for point in data.iter_points() {
        by_year.entry(point.year()).or_default().push(point);
    }

    let mut dots = Vec::new();
    for (year, mut points) in by_year {
        points.sort_by(|a, b| a.category.cmp(&b.category).then(a.date.cmp(&b.date)));
        let x = scale.project_year(year);
        let mut stack_top = baseline_y;
        for point in points {
            let radius = markers.project(point.relation_count);
            let center_y = stack_top - radius;
            stack_top = center_y - radius - gap;
            dots.push(StackedDot {
                subject_id: point.subject_id,
                label: point.label.clone(),
                kind: point.kind,
                category: point.category,
                year,
                position: ScenePoint::new(x, center_y),
                radius,
                color: marker_color(point, &config.palette),
                opacity: dot_opacity(point, state, config),
            });
        }
    }
    dots
}

/// Dot opacity: the category filter comes first, then highlight and the
/// visible window each dim non-matching dots. Dots never vanish here,
/// the aggregate keeps its shape.
fn dot_opacity(point: &DataPoint, state: &ViewState, config: &EngineConfig) -> f64 {
    let opacity = &config.opacity;
    let mut level = filter_opacity(point, state, opacity);
    if let Some(focused) = state.highlighted {
        if point.subject_id != focused {
            level = level.min(opacity.dimmed);
        }
    }
    if !state.visible.contains(point.date) {
        level = level.min(opacity.dimmed);
    }
    level
}

/// Position of the range selector on the linear axis.
pub fn compute_brush_geometry(
    data: &PreparedData,
    state: &ViewState,
    config: &EngineConfig,
) -> BrushGeometry {
    let width = effective_width(state, config);
    let scale = axis_scale(data, width);
    BrushGeometry {
        track_width: width,
        x_start: scale.project(state.visible.start),
        x_end: scale.project(state.visible.end),
        visible: state.show_brush,
    }
}
