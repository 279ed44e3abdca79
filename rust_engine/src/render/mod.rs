//! Pure scene renderers.
//!
//! Both renderers are plain functions from prepared data plus view state
//! to a [`crate::scene`] value. They hold no state of their own, never
//! touch the repository and never mutate their inputs, so rendering the
//! same inputs twice yields byte-identical scenes. All interactivity
//! lives upstream in the state machine.

pub mod linear;
pub mod radial;

pub use linear::{compute_brush_geometry, compute_linear_scene};
pub use radial::compute_radial_scene;

use crate::config::{OpacitySettings, PaletteSettings};
use crate::models::datapoint::{DataPoint, EventCategory, PointKind};
use crate::models::view_state::ViewState;

/// Marker color for one point. Boundary markers keep the neutral color
/// under every grouping and filter.
pub(crate) fn marker_color(point: &DataPoint, palette: &PaletteSettings) -> String {
    if point.kind == PointKind::Boundary {
        palette.boundary_color.clone()
    } else {
        palette.category_color(point.category).to_string()
    }
}

/// Opacity of one point under the active category filter.
///
/// With a filter active, matching markers stay at full strength,
/// non-matching named categories dim, and `Other` drops to near zero.
/// Boundary markers dim rather than vanish so the life spans stay
/// anchored. Without a filter everything is full.
pub(crate) fn filter_opacity(
    point: &DataPoint,
    state: &ViewState,
    opacity: &OpacitySettings,
) -> f64 {
    let Some(active) = state.category_filter else {
        return opacity.full;
    };
    if point.kind == PointKind::Boundary {
        opacity.dimmed
    } else if point.category == active {
        opacity.full
    } else if point.category == EventCategory::Other {
        opacity.near_zero
    } else {
        opacity.dimmed
    }
}
