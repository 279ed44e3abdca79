//! Property tests for the geometric foundations and the ordering table,
//! plus serde round trips of the persisted view state.

use std::f64::consts::TAU;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use btv_rust::geometry::{
    label_flipped, normalize_angle, AngleAssignment, LinearScale, MarkerScale, RadialScale,
};
use btv_rust::models::{
    DateRange, EventCategory, GroupingCriterion, OrderingCriterion, Subject, SubjectId,
    SubjectKind, ViewState,
};
use btv_rust::ordering::OrderingTable;
use btv_rust::pipeline::{PreparedData, PreparedSubject, SubjectView};

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(1800, 1, 1).unwrap() + Duration::days(offset)
}

fn prepared_subject(id: i64, birth: Option<NaiveDate>) -> PreparedSubject {
    PreparedSubject {
        subject: Subject::new(SubjectId(id), format!("Subject {id}"), SubjectKind::Person),
        birth,
        death: None,
        span_end: day(80_000),
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
        domain: DateRange::new(day(0), day(80_000)),
        max_relation_count: 1,
        today: day(80_000),
        unresolved_dates: 0,
    }
}

fn view_state_strategy() -> impl Strategy<Value = ViewState> {
    (
        (0i64..60_000, 1i64..20_000),
        prop::sample::select(OrderingCriterion::ALL.to_vec()),
        prop::sample::select(GroupingCriterion::ALL.to_vec()),
        prop_oneof![
            Just(None),
            prop::sample::select(EventCategory::ALL.to_vec()).prop_map(Some)
        ],
        prop_oneof![Just(None), (0i64..500).prop_map(|id| Some(SubjectId(id)))],
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(
                (start, len),
                ordering,
                grouping,
                category_filter,
                highlighted,
                show_names,
                show_mouse_grid,
                show_brush,
                inverted,
            )| ViewState {
                visible: DateRange::new(day(start), day(start + len)),
                ordering,
                grouping,
                category_filter,
                highlighted,
                show_names,
                show_mouse_grid,
                show_brush,
                inverted,
            },
        )
}

proptest! {
    #[test]
    fn prop_angles_partition_the_circle(n in 1i64..120) {
        let subjects: Vec<SubjectId> = (1..=n).map(SubjectId).collect();
        let angles = AngleAssignment::distribute(&subjects);

        prop_assert!((angles.step() * n as f64 - TAU).abs() < 1e-9);
        for (i, id) in angles.order().iter().enumerate() {
            let angle = angles.angle_of(*id).unwrap();
            prop_assert!((angle - i as f64 * angles.step()).abs() < 1e-9);
            prop_assert!((0.0..TAU).contains(&angle));
            // A slot center hit-tests back to its own subject.
            prop_assert_eq!(angles.subject_at(angle), Some(*id));
        }
    }

    #[test]
    fn prop_normalize_angle_wraps_into_one_turn(angle in -1e6f64..1e6) {
        let wrapped = normalize_angle(angle);
        prop_assert!(wrapped >= 0.0);
        prop_assert!(wrapped < TAU);
        // Whole turns are invisible, modulo float noise at the seam.
        let again = normalize_angle(angle + TAU);
        let diff = (again - wrapped).abs();
        prop_assert!(diff < 1e-6 || (TAU - diff) < 1e-6);
    }

    #[test]
    fn prop_labels_flip_exactly_in_the_lower_half(angle in 0.0f64..TAU) {
        prop_assert_eq!(label_flipped(angle), angle.cos() < 0.0);
    }

    #[test]
    fn prop_linear_projection_round_trips(
        start in 0i64..50_000,
        len in 1i64..20_000,
        frac in 0.0f64..1.0,
    ) {
        let domain = DateRange::new(day(start), day(start + len));
        let scale = LinearScale::new(domain, 24.0, 936.0);
        let date = day(start + (len as f64 * frac) as i64);
        let back = scale.unproject(scale.project(date));
        prop_assert!((back - date).num_days().abs() <= 1);
    }

    #[test]
    fn prop_linear_projection_is_monotone(
        start in 0i64..50_000,
        len in 1i64..20_000,
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let domain = DateRange::new(day(start), day(start + len));
        let scale = LinearScale::new(domain, 24.0, 936.0);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let earlier = day(start + (len as f64 * lo) as i64);
        let later = day(start + (len as f64 * hi) as i64);
        prop_assert!(scale.project(earlier) <= scale.project(later));
    }

    #[test]
    fn prop_inverted_projection_mirrors_the_normal_one(
        start in 0i64..50_000,
        len in 1i64..20_000,
        frac in 0.0f64..1.0,
    ) {
        let domain = DateRange::new(day(start), day(start + len));
        let date = day(start + (len as f64 * frac) as i64);
        let outward = RadialScale::new(domain, 45.0, 334.0);
        let inward = RadialScale::new(domain, 334.0, 45.0);
        // The two projections mirror around the band midpoint, so their
        // sum is the constant inner + outer.
        let sum = outward.project(date) + inward.project(date);
        prop_assert!((sum - (45.0 + 334.0)).abs() < 1e-6);
    }

    #[test]
    fn prop_marker_radii_stay_in_bounds(
        min in 1.0f64..5.0,
        spread in 0.0f64..10.0,
        max_count in 1usize..500,
        count in 0usize..2000,
    ) {
        let scale = MarkerScale::new(min, min + spread, max_count);
        let radius = scale.project(count);
        prop_assert!(radius >= min - 1e-9);
        prop_assert!(radius <= min + spread + 1e-9);
        prop_assert!(scale.project(count) <= scale.project(count + 1) + 1e-12);
    }

    #[test]
    fn prop_ordering_is_a_stable_permutation(
        births in prop::collection::vec(prop::option::of(0i64..80_000), 1..40),
    ) {
        let subjects: Vec<PreparedSubject> = births
            .iter()
            .enumerate()
            .map(|(i, birth)| prepared_subject(i as i64 + 1, birth.map(day)))
            .collect();
        let data = prepared_data(subjects);
        let table = OrderingTable::from_prepared(&data);
        let base = data.subject_ids();
        let order = table.order_for(OrderingCriterion::Birth, &base);

        // Same population, just rearranged.
        prop_assert_eq!(order.len(), base.len());
        let mut lhs = order.clone();
        lhs.sort_by_key(|id| id.0);
        let mut rhs = base.clone();
        rhs.sort_by_key(|id| id.0);
        prop_assert_eq!(lhs, rhs);

        // Dated subjects ascend, undated ones sit at the end in input
        // order.
        let split = order
            .iter()
            .position(|id| table.value_of(OrderingCriterion::Birth, *id).is_none())
            .unwrap_or(order.len());
        let (keyed, keyless) = order.split_at(split);
        for pair in keyed.windows(2) {
            let a = table.value_of(OrderingCriterion::Birth, pair[0]).unwrap();
            let b = table.value_of(OrderingCriterion::Birth, pair[1]).unwrap();
            prop_assert!(a <= b);
        }
        let expected_keyless: Vec<SubjectId> = base
            .iter()
            .copied()
            .filter(|id| table.value_of(OrderingCriterion::Birth, *id).is_none())
            .collect();
        prop_assert_eq!(keyless.to_vec(), expected_keyless);

        // Reordering an already ordered list changes nothing.
        prop_assert_eq!(table.order_for(OrderingCriterion::Birth, &order), order.clone());
    }

    #[test]
    fn prop_event_count_orders_ascending(
        counts in prop::collection::vec(0usize..50, 1..30),
    ) {
        let subjects: Vec<PreparedSubject> = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let mut subject = prepared_subject(i as i64 + 1, None);
                subject.honor_count = count;
                subject
            })
            .collect();
        let data = prepared_data(subjects);
        let table = OrderingTable::from_prepared(&data);
        let order = table.order_for(OrderingCriterion::EventCount, &data.subject_ids());
        for pair in order.windows(2) {
            let a = table.value_of(OrderingCriterion::EventCount, pair[0]).unwrap();
            let b = table.value_of(OrderingCriterion::EventCount, pair[1]).unwrap();
            prop_assert!(a <= b);
        }
    }

    #[test]
    fn prop_view_state_survives_json(state in view_state_strategy()) {
        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, state);
    }
}
