//! Engine configuration file support.
//!
//! All tunables of the visualization engine live here: geometry constants,
//! the reference instant and historic interval bands, the city center used
//! for proximity ordering, the keyword table driving event classification,
//! and the color palette. Everything has a built-in default so the engine
//! runs without any file; a TOML file overrides selectively.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::datapoint::EventCategory;
use crate::models::dates::DateRange;
use crate::models::subject::GeoPoint;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(String),
    #[error("Failed to parse config file: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub geometry: GeometrySettings,
    #[serde(default)]
    pub timeline: TimelineSettings,
    #[serde(default)]
    pub city: CitySettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub palette: PaletteSettings,
    #[serde(default)]
    pub opacity: OpacitySettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geometry: GeometrySettings::default(),
            timeline: TimelineSettings::default(),
            city: CitySettings::default(),
            classifier: ClassifierSettings::default(),
            palette: PaletteSettings::default(),
            opacity: OpacitySettings::default(),
        }
    }
}

/// Layout constants shared by both charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometrySettings {
    /// Diameter of the radial chart container in pixels.
    #[serde(default = "default_radial_diameter")]
    pub radial_diameter: f64,
    /// Width of the linear chart container in pixels, at full width.
    #[serde(default = "default_linear_width")]
    pub linear_width: f64,
    /// Height of the linear chart container in pixels.
    #[serde(default = "default_linear_height")]
    pub linear_height: f64,
    /// Vertical gap between stacked dots in the linear chart.
    #[serde(default = "default_dot_gap")]
    pub dot_gap: f64,
    /// Radial offset of name labels past the donut.
    #[serde(default = "default_label_offset")]
    pub label_offset: f64,
    /// Radius of the empty center of the radial chart, as a fraction of
    /// the outer radius. Must stay above zero so markers near the start
    /// of the domain do not collapse onto the center point.
    #[serde(default = "default_inner_hole_ratio")]
    pub inner_hole_ratio: f64,
    /// Fraction of the outer radius where the category donut begins.
    #[serde(default = "default_donut_inner_ratio")]
    pub donut_inner_ratio: f64,
    /// Fraction of the outer radius where the category donut ends.
    #[serde(default = "default_donut_outer_ratio")]
    pub donut_outer_ratio: f64,
    /// Width in pixels reserved for the detail panel while a subject is
    /// highlighted. The linear chart shrinks by this amount.
    #[serde(default = "default_side_panel_width")]
    pub side_panel_width: f64,
    /// Smallest marker radius in pixels.
    #[serde(default = "default_marker_radius_min")]
    pub marker_radius_min: f64,
    /// Largest marker radius in pixels.
    #[serde(default = "default_marker_radius_max")]
    pub marker_radius_max: f64,
    /// Duration of animated transitions in milliseconds.
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
    /// Angle a highlighted subject's spoke rotates onto, in radians
    /// clockwise from twelve o'clock. Nine o'clock by default, clear of
    /// the detail panel on the right.
    #[serde(default = "default_reference_direction")]
    pub reference_direction_rad: f64,
}

fn default_radial_diameter() -> f64 {
    760.0
}

fn default_linear_width() -> f64 {
    960.0
}

fn default_linear_height() -> f64 {
    220.0
}

fn default_dot_gap() -> f64 {
    2.0
}

fn default_label_offset() -> f64 {
    14.0
}

fn default_inner_hole_ratio() -> f64 {
    0.12
}

fn default_donut_inner_ratio() -> f64 {
    0.88
}

fn default_donut_outer_ratio() -> f64 {
    0.97
}

fn default_side_panel_width() -> f64 {
    300.0
}

fn default_marker_radius_min() -> f64 {
    2.0
}

fn default_marker_radius_max() -> f64 {
    9.0
}

fn default_transition_ms() -> u64 {
    250
}

fn default_reference_direction() -> f64 {
    -std::f64::consts::FRAC_PI_2
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            radial_diameter: default_radial_diameter(),
            linear_width: default_linear_width(),
            linear_height: default_linear_height(),
            dot_gap: default_dot_gap(),
            label_offset: default_label_offset(),
            inner_hole_ratio: default_inner_hole_ratio(),
            donut_inner_ratio: default_donut_inner_ratio(),
            donut_outer_ratio: default_donut_outer_ratio(),
            side_panel_width: default_side_panel_width(),
            marker_radius_min: default_marker_radius_min(),
            marker_radius_max: default_marker_radius_max(),
            transition_ms: default_transition_ms(),
            reference_direction_rad: default_reference_direction(),
        }
    }
}

/// A labelled historic period drawn as a band across both charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricInterval {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoricInterval {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

/// Temporal anchors of the visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// The instant the died-before grouping and the reference tick mark
    /// refer to. The March 1938 annexation by default.
    #[serde(default = "default_reference_instant")]
    pub reference_instant: NaiveDate,
    /// Historic periods rendered as background bands.
    #[serde(default = "default_historic_intervals")]
    pub historic_intervals: Vec<HistoricInterval>,
    /// Year splitting the born-after grouping.
    #[serde(default = "default_postwar_year")]
    pub postwar_year: i32,
}

fn default_reference_instant() -> NaiveDate {
    // 1938-03-12 is in range, so the fallback never triggers.
    NaiveDate::from_ymd_opt(1938, 3, 12).unwrap_or_default()
}

fn default_historic_intervals() -> Vec<HistoricInterval> {
    vec![
        HistoricInterval {
            label: "First World War".to_string(),
            start: NaiveDate::from_ymd_opt(1914, 7, 28).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(1918, 11, 11).unwrap_or_default(),
        },
        HistoricInterval {
            label: "Nazi rule".to_string(),
            start: NaiveDate::from_ymd_opt(1938, 3, 12).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(1945, 5, 8).unwrap_or_default(),
        },
    ]
}

fn default_postwar_year() -> i32 {
    1945
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            reference_instant: default_reference_instant(),
            historic_intervals: default_historic_intervals(),
            postwar_year: default_postwar_year(),
        }
    }
}

/// City geometry for the proximity ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySettings {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,
}

fn default_center_lat() -> f64 {
    // Stephansplatz.
    48.2086
}

fn default_center_lon() -> f64 {
    16.3731
}

impl Default for CitySettings {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
        }
    }
}

impl CitySettings {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lon)
    }
}

/// One classification rule: the first rule whose keyword occurs in the
/// lowercased event name decides the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: EventCategory,
    pub keywords: Vec<String>,
}

/// Keyword table for event classification.
///
/// The archive names events in German, so the default keywords are
/// German. Deployments against other corpora replace the table wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_classifier_rules")]
    pub rules: Vec<CategoryRule>,
}

fn default_classifier_rules() -> Vec<CategoryRule> {
    fn rule(category: EventCategory, keywords: &[&str]) -> CategoryRule {
        CategoryRule {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    vec![
        rule(EventCategory::Memorial, &["denkmal", "gedenktafel", "büste"]),
        rule(
            EventCategory::Street,
            &["gasse", "straße", "strasse", "platz", "weg", "hof"],
        ),
        rule(EventCategory::Prize, &["preis", "stipendium"]),
        rule(
            EventCategory::Conference,
            &["konferenz", "symposium", "tagung"],
        ),
        rule(
            EventCategory::Anniversary,
            &["jubiläum", "jahrestag", "gedenkjahr"],
        ),
        rule(EventCategory::Exhibition, &["ausstellung"]),
        rule(EventCategory::Exile, &["exil"]),
    ]
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            rules: default_classifier_rules(),
        }
    }
}

/// Colors for categories, groups and chart furniture, as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteSettings {
    /// Cycle assigned to grouping categories in first-seen order.
    #[serde(default = "default_group_cycle")]
    pub group_cycle: Vec<String>,
    /// Fixed colors per event category.
    #[serde(default = "default_category_colors")]
    pub category_colors: Vec<CategoryColor>,
    /// Neutral color for birth and death markers. Boundary markers keep
    /// this color under every grouping.
    #[serde(default = "default_boundary_color")]
    pub boundary_color: String,
    #[serde(default = "default_band_color")]
    pub historic_band_color: String,
    #[serde(default = "default_grid_color")]
    pub grid_color: String,
}

/// A category and its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryColor {
    pub category: EventCategory,
    pub color: String,
}

fn default_group_cycle() -> Vec<String> {
    [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
        "#bcbd22", "#17becf",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn default_category_colors() -> Vec<CategoryColor> {
    fn color(category: EventCategory, color: &str) -> CategoryColor {
        CategoryColor {
            category,
            color: color.to_string(),
        }
    }

    vec![
        color(EventCategory::Memorial, "#8c564b"),
        color(EventCategory::Street, "#1f77b4"),
        color(EventCategory::Prize, "#e6b800"),
        color(EventCategory::Conference, "#2ca02c"),
        color(EventCategory::Anniversary, "#9467bd"),
        color(EventCategory::Exhibition, "#ff7f0e"),
        color(EventCategory::Exile, "#d62728"),
        color(EventCategory::Other, "#7f7f7f"),
    ]
}

fn default_boundary_color() -> String {
    "#888888".to_string()
}

fn default_band_color() -> String {
    "#d9d9d9".to_string()
}

fn default_grid_color() -> String {
    "#cccccc".to_string()
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            group_cycle: default_group_cycle(),
            category_colors: default_category_colors(),
            boundary_color: default_boundary_color(),
            historic_band_color: default_band_color(),
            grid_color: default_grid_color(),
        }
    }
}

impl PaletteSettings {
    /// Color for an event category, falling back to the `Other` color and
    /// finally to the boundary color if the table is incomplete.
    pub fn category_color(&self, category: EventCategory) -> &str {
        self.category_colors
            .iter()
            .find(|c| c.category == category)
            .or_else(|| {
                self.category_colors
                    .iter()
                    .find(|c| c.category == EventCategory::Other)
            })
            .map(|c| c.color.as_str())
            .unwrap_or(&self.boundary_color)
    }

    /// Color for the n-th grouping category, cycling when exhausted.
    pub fn group_color(&self, index: usize) -> &str {
        if self.group_cycle.is_empty() {
            return &self.boundary_color;
        }
        &self.group_cycle[index % self.group_cycle.len()]
    }
}

/// Marker opacities for the four visibility levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpacitySettings {
    #[serde(default = "default_opacity_full")]
    pub full: f64,
    /// Markers outside the active focus, still readable.
    #[serde(default = "default_opacity_dimmed")]
    pub dimmed: f64,
    /// Markers excluded by the category filter. Kept barely visible so
    /// the overall shape of the data never disappears.
    #[serde(default = "default_opacity_near_zero")]
    pub near_zero: f64,
    #[serde(default = "default_opacity_hidden")]
    pub hidden: f64,
}

fn default_opacity_full() -> f64 {
    1.0
}

fn default_opacity_dimmed() -> f64 {
    0.2
}

fn default_opacity_near_zero() -> f64 {
    0.02
}

fn default_opacity_hidden() -> f64 {
    0.0
}

impl Default for OpacitySettings {
    fn default() -> Self {
        Self {
            full: default_opacity_full(),
            dimmed: default_opacity_dimmed(),
            near_zero: default_opacity_near_zero(),
            hidden: default_opacity_hidden(),
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;

        let config: EngineConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `engine.toml` in the current directory, the
    /// `rust_engine/` directory and the parent directory. Falls back to
    /// built-in defaults when no file exists.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = vec![
            PathBuf::from("engine.toml"),
            PathBuf::from("rust_engine/engine.toml"),
            PathBuf::from("../engine.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        if !(g.inner_hole_ratio > 0.0 && g.inner_hole_ratio < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "geometry.inner_hole_ratio must be in (0, 1), got {}",
                g.inner_hole_ratio
            )));
        }
        if g.donut_inner_ratio <= g.inner_hole_ratio {
            return Err(ConfigError::Invalid(
                "geometry.donut_inner_ratio must exceed inner_hole_ratio".to_string(),
            ));
        }
        if g.donut_outer_ratio <= g.donut_inner_ratio || g.donut_outer_ratio > 1.0 {
            return Err(ConfigError::Invalid(
                "geometry.donut_outer_ratio must lie in (donut_inner_ratio, 1]".to_string(),
            ));
        }
        if g.marker_radius_min <= 0.0 || g.marker_radius_max < g.marker_radius_min {
            return Err(ConfigError::Invalid(
                "marker radius bounds must satisfy 0 < min <= max".to_string(),
            ));
        }
        if g.radial_diameter <= 0.0 || g.linear_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "chart container sizes must be positive".to_string(),
            ));
        }
        if g.linear_width <= g.side_panel_width {
            return Err(ConfigError::Invalid(format!(
                "geometry.linear_width ({}) must exceed side_panel_width ({})",
                g.linear_width, g.side_panel_width
            )));
        }
        if self.classifier.rules.is_empty() {
            return Err(ConfigError::Invalid(
                "classifier.rules must not be empty".to_string(),
            ));
        }
        for interval in &self.timeline.historic_intervals {
            if interval.end < interval.start {
                return Err(ConfigError::Invalid(format!(
                    "historic interval '{}' ends before it starts",
                    interval.label
                )));
            }
        }
        Ok(())
    }
}
