//! Archive records for honored subjects.
//!
//! A subject is the unit the radial chart assigns an angular slot to. Most
//! subjects are people, but organizations and named locations appear in the
//! same archive and flow through the same pipeline. Records keep their date
//! fields as the raw strings found in the source documents; resolution to
//! calendar dates happens during data preparation so that partially dated
//! records degrade instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Identifiers ====================

/// Stable archive identifier of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub i64);

impl SubjectId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable archive identifier of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub i64);

impl EventId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a curated theme grouping events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThemeId(pub i64);

impl ThemeId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==================== Subjects ====================

/// What kind of entity a subject record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Person,
    Organization,
    Location,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Person => "person",
            SubjectKind::Organization => "organization",
            SubjectKind::Location => "location",
        }
    }
}

/// A role or function a subject held during their life, with the raw
/// date strings attached in the archive.
///
/// Functions carry grouping signal beyond their dates. A function labelled
/// `"Exil"` (any casing) marks the subject as exiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeFunction {
    pub label: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl LifeFunction {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: None,
            end: None,
        }
    }

    /// Case-insensitive exile marker check.
    pub fn is_exile(&self) -> bool {
        self.label.trim().eq_ignore_ascii_case("exil")
    }
}

/// A geographic point attached to a location subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    /// Municipal district number, when the archive records one.
    #[serde(default)]
    pub district: Option<u8>,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            district: None,
        }
    }

    /// Great-circle distance to another point in meters.
    ///
    /// Haversine on a spherical earth, which is accurate to well under a
    /// percent at city scale.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// One honored subject as loaded from the archive.
///
/// # Examples
///
/// ```
/// use btv_rust::models::subject::{Subject, SubjectId, SubjectKind};
///
/// let subject = Subject::new(SubjectId(17), "Stefan Zweig", SubjectKind::Person)
///     .with_birth("1881-11-28")
///     .with_death("1942-02-22")
///     .with_roles(["Schriftsteller"]);
///
/// assert_eq!(subject.id.value(), 17);
/// assert_eq!(subject.birth.as_deref(), Some("1881-11-28"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// Alternate spellings and pseudonyms used in the archive.
    #[serde(default)]
    pub alternate_names: Vec<String>,
    pub kind: SubjectKind,
    /// Professions for people, institution types for organizations.
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Raw birth date string, resolved during preparation.
    #[serde(default)]
    pub birth: Option<String>,
    /// Raw death date string, resolved during preparation.
    #[serde(default)]
    pub death: Option<String>,
    /// Roles and functions held during the subject's life.
    #[serde(default)]
    pub functions: Vec<LifeFunction>,
    /// Place types for location subjects, e.g. `"Gemeindebau"`.
    #[serde(default)]
    pub location_types: Vec<String>,
    /// Geographic points for location subjects.
    #[serde(default)]
    pub coordinates: Vec<GeoPoint>,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>, kind: SubjectKind) -> Self {
        Self {
            id,
            name: name.into(),
            alternate_names: Vec::new(),
            kind,
            roles: Vec::new(),
            gender: None,
            birth: None,
            death: None,
            functions: Vec::new(),
            location_types: Vec::new(),
            coordinates: Vec::new(),
        }
    }

    pub fn with_birth(mut self, raw: impl Into<String>) -> Self {
        self.birth = Some(raw.into());
        self
    }

    pub fn with_death(mut self, raw: impl Into<String>) -> Self {
        self.death = Some(raw.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_functions<I>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = LifeFunction>,
    {
        self.functions = functions.into_iter().collect();
        self
    }

    pub fn with_location_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_coordinates<I>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        self.coordinates = points.into_iter().collect();
        self
    }

    /// Whether any archived function marks the subject as exiled.
    pub fn was_exiled(&self) -> bool {
        self.functions.iter().any(LifeFunction::is_exile)
    }

    /// First recorded coordinate, if the subject has any.
    pub fn primary_coordinate(&self) -> Option<&GeoPoint> {
        self.coordinates.first()
    }
}

// ==================== Events and themes ====================

/// An honoring event attached to one or more subjects.
///
/// Events are what the archive records about remembrance: a street naming,
/// a memorial unveiling, a prize, an exhibition. The `relation_count` is
/// the total number of archive relations the event participates in and
/// drives marker sizing in both charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Raw start date string, resolved during preparation.
    #[serde(default)]
    pub start: Option<String>,
    /// Raw end date string for events spanning an interval.
    #[serde(default)]
    pub end: Option<String>,
    /// Themes the event is curated under.
    #[serde(default)]
    pub theme_ids: Vec<ThemeId>,
    #[serde(default)]
    pub relation_count: usize,
}

impl Event {
    pub fn new(id: EventId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            start: None,
            end: None,
            theme_ids: Vec::new(),
            relation_count: 0,
        }
    }

    pub fn with_start(mut self, raw: impl Into<String>) -> Self {
        self.start = Some(raw.into());
        self
    }

    pub fn with_end(mut self, raw: impl Into<String>) -> Self {
        self.end = Some(raw.into());
        self
    }

    pub fn with_themes<I>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = ThemeId>,
    {
        self.theme_ids = themes.into_iter().collect();
        self
    }

    pub fn with_relation_count(mut self, count: usize) -> Self {
        self.relation_count = count;
        self
    }

    pub fn matches_theme(&self, theme: ThemeId) -> bool {
        self.theme_ids.contains(&theme)
    }
}

/// A curated theme, e.g. an exhibition cycle the events were collected for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
}

impl Theme {
    pub fn new(id: ThemeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exile_marker_is_case_insensitive() {
        let subject = Subject::new(SubjectId(1), "A", SubjectKind::Person)
            .with_functions([LifeFunction::new("EXIL")]);
        assert!(subject.was_exiled());

        let subject = Subject::new(SubjectId(2), "B", SubjectKind::Person)
            .with_functions([LifeFunction::new("Komponist")]);
        assert!(!subject.was_exiled());
    }

    #[test]
    fn test_exile_marker_requires_exact_label() {
        // "Exilforschung" is a research field, not an exile record.
        let subject = Subject::new(SubjectId(3), "C", SubjectKind::Person)
            .with_functions([LifeFunction::new("Exilforschung")]);
        assert!(!subject.was_exiled());
    }

    #[test]
    fn test_distance_between_known_points() {
        // Stephansplatz to Schoenbrunn, roughly 5.4 km.
        let a = GeoPoint::new(48.2086, 16.3731);
        let b = GeoPoint::new(48.1845, 16.3122);
        let d = a.distance_m(&b);
        assert!((5_000.0..6_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_event_theme_match() {
        let event = Event::new(EventId(9), "Gedenktafel enthüllt").with_themes([ThemeId(3)]);
        assert!(event.matches_theme(ThemeId(3)));
        assert!(!event.matches_theme(ThemeId(4)));
    }
}
