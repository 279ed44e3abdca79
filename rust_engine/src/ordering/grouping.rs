//! Subject grouping for the donut ring.
//!
//! A grouping criterion partitions the subjects into named categories,
//! drawn as colored arcs at the rim of the radial chart. Criteria are
//! plain functions over prepared subjects, held in a [`GroupingRegistry`]
//! so a deployment can swap or extend the partitioning logic without
//! touching the renderers.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::config::EngineConfig;
use crate::models::subject::SubjectId;
use crate::models::view_state::GroupingCriterion;
use crate::pipeline::prepare::{PreparedData, PreparedSubject};

/// Role labels in precedence order. A subject holding roles from several
/// lists lands in the first list that matches.
const ROLE_PRIORITY: [(&str, &[&str]); 4] = [
    ("Musician", &["musiker", "musikerin", "musician"]),
    (
        "Author",
        &[
            "schriftsteller",
            "schriftstellerin",
            "autor",
            "autorin",
            "author",
        ],
    ),
    ("Composer", &["komponist", "komponistin", "composer"]),
    ("Conductor", &["dirigent", "dirigentin", "conductor"]),
];

/// Shared inputs the builtin criteria read.
#[derive(Debug, Clone, Copy)]
pub struct GroupingContext {
    /// Cutoff instant of the died-before partition.
    pub reference_instant: NaiveDate,
    /// Cutoff year of the born-after partition.
    pub postwar_year: i32,
}

impl GroupingContext {
    pub fn new(reference_instant: NaiveDate, postwar_year: i32) -> Self {
        Self {
            reference_instant,
            postwar_year,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.timeline.reference_instant,
            config.timeline.postwar_year,
        )
    }
}

/// A grouping criterion implementation.
///
/// Returns the category label of one subject, or `None` when the subject
/// does not belong to any category under this criterion. Uncategorized
/// subjects render without a donut arc.
pub type ClassifierFn = Box<dyn Fn(&PreparedSubject, &GroupingContext) -> Option<String> + Send + Sync>;

/// The set of available grouping criteria.
pub struct GroupingRegistry {
    classifiers: HashMap<GroupingCriterion, ClassifierFn>,
}

impl GroupingRegistry {
    /// A registry with no criteria registered.
    pub fn empty() -> Self {
        Self {
            classifiers: HashMap::new(),
        }
    }

    /// A registry with all builtin criteria.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(GroupingCriterion::Role, classify_role);
        registry.register(GroupingCriterion::Exiled, classify_exiled);
        registry.register(GroupingCriterion::BornAfter1945, classify_born_after);
        registry.register(GroupingCriterion::DiedBefore1938, classify_died_before);
        registry.register(GroupingCriterion::Gender, classify_gender);
        registry.register(GroupingCriterion::LocationType, classify_location_type);
        registry.register(GroupingCriterion::District, classify_district);
        registry
    }

    /// Register a criterion, replacing any previous registration.
    pub fn register<F>(&mut self, criterion: GroupingCriterion, classifier: F)
    where
        F: Fn(&PreparedSubject, &GroupingContext) -> Option<String> + Send + Sync + 'static,
    {
        self.classifiers.insert(criterion, Box::new(classifier));
    }

    /// Partition a prepared dataset under one criterion.
    ///
    /// Color slots are handed out in first-seen subject order, so the
    /// same dataset always maps categories to the same palette entries.
    pub fn assign(
        &self,
        criterion: GroupingCriterion,
        data: &PreparedData,
        context: &GroupingContext,
    ) -> GroupAssignment {
        let mut categories: HashMap<SubjectId, String> = HashMap::new();
        let mut color_slots: HashMap<String, usize> = HashMap::new();
        match self.classifiers.get(&criterion) {
            Some(classifier) => {
                for prepared in &data.subjects {
                    if let Some(category) = classifier(prepared, context) {
                        if !color_slots.contains_key(&category) {
                            color_slots.insert(category.clone(), color_slots.len());
                        }
                        categories.insert(prepared.id(), category);
                    }
                }
            }
            None => {
                log::warn!("No classifier registered for grouping '{}'", criterion);
            }
        }
        GroupAssignment {
            criterion,
            categories,
            color_slots,
        }
    }
}

impl Default for GroupingRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The result of partitioning one dataset under one criterion.
#[derive(Debug, Clone, Default)]
pub struct GroupAssignment {
    criterion: GroupingCriterion,
    categories: HashMap<SubjectId, String>,
    color_slots: HashMap<String, usize>,
}

impl GroupAssignment {
    /// An assignment that categorizes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn criterion(&self) -> GroupingCriterion {
        self.criterion
    }

    /// The category of one subject, if it has any.
    pub fn category_of(&self, subject: SubjectId) -> Option<&str> {
        self.categories.get(&subject).map(String::as_str)
    }

    /// The palette slot of a category.
    pub fn color_slot(&self, category: &str) -> Option<usize> {
        self.color_slots.get(category).copied()
    }

    /// Number of distinct categories in the assignment.
    pub fn category_count(&self) -> usize {
        self.color_slots.len()
    }
}

/// Reorder `base` so same-category subjects sit side by side.
///
/// Categories come alphabetically, uncategorized subjects last. Within a
/// category the relative order of `base` survives, so the angular sort
/// still decides who precedes whom inside each arc.
pub fn category_major_order(base: &[SubjectId], assignment: &GroupAssignment) -> Vec<SubjectId> {
    let mut ordered: Vec<SubjectId> = base.to_vec();
    ordered.sort_by(|a, b| {
        match (assignment.category_of(*a), assignment.category_of(*b)) {
            (Some(ca), Some(cb)) => ca.cmp(cb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
    ordered
}

// ==================== builtin criteria ====================

fn classify_role(prepared: &PreparedSubject, _: &GroupingContext) -> Option<String> {
    for (label, members) in ROLE_PRIORITY {
        let held = prepared
            .subject
            .roles
            .iter()
            .any(|role| members.iter().any(|member| role.eq_ignore_ascii_case(member)));
        if held {
            return Some(label.to_string());
        }
    }
    None
}

fn classify_exiled(prepared: &PreparedSubject, _: &GroupingContext) -> Option<String> {
    if prepared.subject.was_exiled() {
        Some("Exiled".to_string())
    } else {
        Some("Not-Exiled".to_string())
    }
}

fn classify_born_after(prepared: &PreparedSubject, context: &GroupingContext) -> Option<String> {
    match prepared.birth {
        Some(birth) if birth.year() > context.postwar_year => {
            Some(format!("Born after {}", context.postwar_year))
        }
        Some(_) => Some(format!("Born {} or earlier", context.postwar_year)),
        None => Some("Unknown".to_string()),
    }
}

fn classify_died_before(prepared: &PreparedSubject, context: &GroupingContext) -> Option<String> {
    let year = context.reference_instant.year();
    match prepared.death {
        Some(death) if death < context.reference_instant => Some(format!("Died before {year}")),
        Some(_) => Some(format!("Died {year} or later")),
        None => Some("Unknown".to_string()),
    }
}

fn classify_gender(prepared: &PreparedSubject, _: &GroupingContext) -> Option<String> {
    prepared.subject.gender.clone()
}

fn classify_location_type(prepared: &PreparedSubject, _: &GroupingContext) -> Option<String> {
    prepared.subject.location_types.first().cloned()
}

fn classify_district(prepared: &PreparedSubject, _: &GroupingContext) -> Option<String> {
    prepared
        .subject
        .primary_coordinate()
        .and_then(|point| point.district)
        .map(|district| format!("District {district}"))
}
