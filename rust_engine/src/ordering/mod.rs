//! Angular ordering of subjects.
//!
//! The radial chart assigns one angular slot per subject, and the order
//! of those slots is decided here. Every [`OrderingCriterion`] reduces a
//! subject to a single sort key; subjects without a key keep their input
//! position at the end of the order, so switching criteria never drops
//! anyone from the chart.

pub mod grouping;

use std::collections::HashMap;

use chrono::Datelike;

use crate::models::dates::days_between;
use crate::models::subject::SubjectId;
use crate::models::view_state::OrderingCriterion;
use crate::pipeline::prepare::PreparedData;

/// Precomputed sort keys for every subject and criterion.
///
/// Built once per prepared dataset. Reordering after a gesture is then a
/// single stable sort, with no repository access.
#[derive(Debug, Clone, Default)]
pub struct OrderingTable {
    keys: HashMap<SubjectId, SortKeys>,
}

/// One subject's sort key per criterion. `None` means the underlying
/// record lacks the data, not that the value is zero.
#[derive(Debug, Clone, Copy, Default)]
struct SortKeys {
    birth: Option<f64>,
    death: Option<f64>,
    honoring_time: Option<f64>,
    event_count: Option<f64>,
    center_proximity: Option<f64>,
}

impl SortKeys {
    fn get(&self, criterion: OrderingCriterion) -> Option<f64> {
        match criterion {
            OrderingCriterion::Birth => self.birth,
            OrderingCriterion::Death => self.death,
            OrderingCriterion::HonoringTime => self.honoring_time,
            OrderingCriterion::EventCount => self.event_count,
            OrderingCriterion::CenterProximity => self.center_proximity,
        }
    }
}

fn date_key(date: chrono::NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

impl OrderingTable {
    /// Derive sort keys from a prepared dataset.
    pub fn from_prepared(data: &PreparedData) -> Self {
        let mut keys = HashMap::with_capacity(data.len());
        for prepared in &data.subjects {
            let honoring_time = match (prepared.death, prepared.first_honor) {
                (Some(death), Some(honor)) => Some(days_between(death, honor) as f64),
                _ => None,
            };
            keys.insert(
                prepared.id(),
                SortKeys {
                    birth: prepared.birth.map(date_key),
                    death: prepared.death.map(date_key),
                    honoring_time,
                    event_count: Some(prepared.honor_count as f64),
                    center_proximity: prepared.center_distance_m,
                },
            );
        }
        Self { keys }
    }

    /// The raw sort key of one subject under one criterion.
    pub fn value_of(&self, criterion: OrderingCriterion, subject: SubjectId) -> Option<f64> {
        self.keys.get(&subject).and_then(|keys| keys.get(criterion))
    }

    /// Reorder `base` by the given criterion.
    ///
    /// The sort is stable: equal keys keep their relative input order,
    /// and subjects without a key follow at the end in input order. The
    /// result is therefore a permutation of `base`, never a subset.
    pub fn order_for(&self, criterion: OrderingCriterion, base: &[SubjectId]) -> Vec<SubjectId> {
        let mut keyed: Vec<(SubjectId, f64)> = Vec::with_capacity(base.len());
        let mut keyless: Vec<SubjectId> = Vec::new();
        for &id in base {
            match self.value_of(criterion, id) {
                Some(value) => keyed.push((id, value)),
                None => keyless.push(id),
            }
        }
        keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
        keyed.into_iter().map(|(id, _)| id).chain(keyless).collect()
    }
}

pub use grouping::{category_major_order, GroupAssignment, GroupingContext, GroupingRegistry};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::dates::DateRange;
    use crate::models::subject::{Subject, SubjectId, SubjectKind};
    use crate::pipeline::prepare::{PreparedData, PreparedSubject, SubjectView};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn prepared_subject(id: i64, birth: Option<NaiveDate>) -> PreparedSubject {
        PreparedSubject {
            subject: Subject::new(SubjectId(id), format!("Subject {id}"), SubjectKind::Person),
            birth,
            death: None,
            span_end: date(2020, 1, 1),
            first_honor: None,
            honor_count: 0,
            center_distance_m: None,
            points: Vec::new(),
        }
    }

    fn prepared_data(subjects: Vec<PreparedSubject>) -> PreparedData {
        PreparedData {
            theme: None,
            view: SubjectView::People,
            subjects,
            domain: DateRange::from_ymd(1800, 1, 1, 2020, 12, 31),
            max_relation_count: 1,
            today: date(2020, 1, 1),
            unresolved_dates: 0,
        }
    }

    #[test]
    fn test_birth_order_is_ascending() {
        let data = prepared_data(vec![
            prepared_subject(1, Some(date(1910, 5, 1))),
            prepared_subject(2, Some(date(1900, 1, 1))),
            prepared_subject(3, Some(date(1905, 7, 20))),
        ]);
        let table = OrderingTable::from_prepared(&data);
        let order = table.order_for(OrderingCriterion::Birth, &data.subject_ids());
        assert_eq!(order, vec![SubjectId(2), SubjectId(3), SubjectId(1)]);
    }

    #[test]
    fn test_missing_keys_keep_input_order_at_the_end() {
        let data = prepared_data(vec![
            prepared_subject(1, None),
            prepared_subject(2, Some(date(1950, 1, 1))),
            prepared_subject(3, None),
            prepared_subject(4, Some(date(1900, 1, 1))),
        ]);
        let table = OrderingTable::from_prepared(&data);
        let order = table.order_for(OrderingCriterion::Birth, &data.subject_ids());
        assert_eq!(
            order,
            vec![SubjectId(4), SubjectId(2), SubjectId(1), SubjectId(3)]
        );
    }

    #[test]
    fn test_event_count_orders_ascending() {
        let mut a = prepared_subject(1, None);
        a.honor_count = 2;
        let mut b = prepared_subject(2, None);
        b.honor_count = 7;
        let mut c = prepared_subject(3, None);
        c.honor_count = 0;
        let data = prepared_data(vec![a, b, c]);
        let table = OrderingTable::from_prepared(&data);
        let order = table.order_for(OrderingCriterion::EventCount, &data.subject_ids());
        assert_eq!(order, vec![SubjectId(3), SubjectId(1), SubjectId(2)]);
    }

    #[test]
    fn test_honoring_time_needs_death_and_honor() {
        let mut quick = prepared_subject(1, None);
        quick.death = Some(date(1940, 1, 1));
        quick.first_honor = Some(date(1941, 1, 1));
        let mut slow = prepared_subject(2, None);
        slow.death = Some(date(1940, 1, 1));
        slow.first_honor = Some(date(1990, 1, 1));
        let mut living = prepared_subject(3, None);
        living.first_honor = Some(date(1980, 1, 1));
        let data = prepared_data(vec![slow, living, quick]);
        let table = OrderingTable::from_prepared(&data);
        let order = table.order_for(OrderingCriterion::HonoringTime, &data.subject_ids());
        // Shortest wait first, the living subject has no key at all.
        assert_eq!(order, vec![SubjectId(1), SubjectId(2), SubjectId(3)]);
        assert!(table
            .value_of(OrderingCriterion::HonoringTime, SubjectId(3))
            .is_none());
    }

    #[test]
    fn test_ties_are_stable() {
        let same_day = Some(date(1900, 6, 1));
        let data = prepared_data(vec![
            prepared_subject(5, same_day),
            prepared_subject(3, same_day),
            prepared_subject(9, same_day),
        ]);
        let table = OrderingTable::from_prepared(&data);
        let order = table.order_for(OrderingCriterion::Birth, &data.subject_ids());
        assert_eq!(order, vec![SubjectId(5), SubjectId(3), SubjectId(9)]);
    }

    #[test]
    fn test_reordering_is_idempotent() {
        let data = prepared_data(vec![
            prepared_subject(1, Some(date(1910, 5, 1))),
            prepared_subject(2, None),
            prepared_subject(3, Some(date(1905, 7, 20))),
        ]);
        let table = OrderingTable::from_prepared(&data);
        let once = table.order_for(OrderingCriterion::Birth, &data.subject_ids());
        let twice = table.order_for(OrderingCriterion::Birth, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_subject_counts_as_keyless() {
        let data = prepared_data(vec![prepared_subject(1, Some(date(1900, 1, 1)))]);
        let table = OrderingTable::from_prepared(&data);
        let order = table.order_for(OrderingCriterion::Birth, &[SubjectId(99), SubjectId(1)]);
        assert_eq!(order, vec![SubjectId(1), SubjectId(99)]);
    }
}
