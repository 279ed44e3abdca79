//! Angular slot assignment for the radial chart.
//!
//! Every subject owns one fixed direction: with N subjects the circle is
//! cut into N equal slots of 2π/N radians, and a subject keeps its slot
//! until the ordering changes. Slots are what makes the radial chart
//! readable under animation, since markers only ever move along their
//! ray or rotate with the whole chart.

use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::models::subject::SubjectId;

/// Angle bounds of one slot, used for donut segments and hover arcs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularSlot {
    pub angle: f64,
    pub start: f64,
    pub end: f64,
}

/// The circle split into equal slots, one per subject.
///
/// Angles are radians measured clockwise from twelve o'clock. The first
/// subject of the ordering sits at angle zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleAssignment {
    order: Vec<SubjectId>,
    slots: HashMap<SubjectId, f64>,
    step: f64,
}

impl AngleAssignment {
    /// Distribute slots over an ordered subject list.
    pub fn distribute(ordered: &[SubjectId]) -> Self {
        let n = ordered.len();
        let step = if n == 0 { TAU } else { TAU / n as f64 };
        let slots = ordered
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i as f64 * step))
            .collect();
        Self {
            order: ordered.to_vec(),
            slots,
            step,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Slot width in radians.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Subjects in slot order.
    pub fn order(&self) -> &[SubjectId] {
        &self.order
    }

    /// The direction a subject renders along, if it has a slot.
    pub fn angle_of(&self, subject: SubjectId) -> Option<f64> {
        self.slots.get(&subject).copied()
    }

    /// Full slot of a subject, spanning half a step to either side.
    pub fn slot_of(&self, subject: SubjectId) -> Option<AngularSlot> {
        self.angle_of(subject).map(|angle| AngularSlot {
            angle,
            start: angle - self.step / 2.0,
            end: angle + self.step / 2.0,
        })
    }

    /// Rotation that brings a subject's slot onto the reference
    /// direction, for the highlight animation.
    pub fn rotation_to(&self, subject: SubjectId, reference: f64) -> Option<f64> {
        self.angle_of(subject)
            .map(|angle| normalize_angle(reference - angle))
    }

    /// The subject whose slot contains the given direction.
    pub fn subject_at(&self, angle: f64) -> Option<SubjectId> {
        if self.order.is_empty() {
            return None;
        }
        let normalized = normalize_angle(angle + self.step / 2.0);
        let index = (normalized / self.step) as usize % self.order.len();
        Some(self.order[index])
    }
}

/// Wrap an angle into [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle % TAU;
    if wrapped < 0.0 {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Whether a label at this direction would render upside down and needs
/// flipping. True strictly between 90° and 270°.
pub fn label_flipped(angle: f64) -> bool {
    let normalized = normalize_angle(angle);
    let quarter = TAU / 4.0;
    normalized > quarter && normalized < 3.0 * quarter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: i64) -> Vec<SubjectId> {
        (1..=n).map(SubjectId).collect()
    }

    #[test]
    fn test_slots_are_distinct_multiples_of_step() {
        let ordered = ids(7);
        let assignment = AngleAssignment::distribute(&ordered);
        let step = assignment.step();
        assert!((step - TAU / 7.0).abs() < 1e-12);

        let mut seen = Vec::new();
        for (i, id) in ordered.iter().enumerate() {
            let angle = assignment.angle_of(*id).unwrap();
            assert!((angle - i as f64 * step).abs() < 1e-12);
            assert!(!seen.iter().any(|s: &f64| (s - angle).abs() < 1e-12));
            seen.push(angle);
        }
    }

    #[test]
    fn test_single_subject_owns_the_circle() {
        let assignment = AngleAssignment::distribute(&ids(1));
        assert_eq!(assignment.angle_of(SubjectId(1)), Some(0.0));
        assert!((assignment.step() - TAU).abs() < 1e-12);
    }

    #[test]
    fn test_empty_assignment() {
        let assignment = AngleAssignment::distribute(&[]);
        assert!(assignment.is_empty());
        assert_eq!(assignment.angle_of(SubjectId(1)), None);
        assert_eq!(assignment.subject_at(1.0), None);
    }

    #[test]
    fn test_slot_spans_half_step_each_side() {
        let assignment = AngleAssignment::distribute(&ids(4));
        let slot = assignment.slot_of(SubjectId(2)).unwrap();
        let step = TAU / 4.0;
        assert!((slot.angle - step).abs() < 1e-12);
        assert!((slot.start - step / 2.0).abs() < 1e-12);
        assert!((slot.end - 3.0 * step / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_brings_subject_to_reference() {
        let assignment = AngleAssignment::distribute(&ids(4));
        let reference = -std::f64::consts::FRAC_PI_2;
        let rotation = assignment.rotation_to(SubjectId(3), reference).unwrap();
        let angle = assignment.angle_of(SubjectId(3)).unwrap();
        let arrived = normalize_angle(angle + rotation);
        assert!((arrived - normalize_angle(reference)).abs() < 1e-9);
    }

    #[test]
    fn test_subject_at_inverts_angle_of() {
        let ordered = ids(5);
        let assignment = AngleAssignment::distribute(&ordered);
        for id in &ordered {
            let angle = assignment.angle_of(*id).unwrap();
            assert_eq!(assignment.subject_at(angle), Some(*id));
            // Still the same subject just inside the slot edges.
            let nudge = assignment.step() * 0.49;
            assert_eq!(assignment.subject_at(angle + nudge), Some(*id));
            assert_eq!(assignment.subject_at(angle - nudge), Some(*id));
        }
    }

    #[test]
    fn test_label_flip_interval_is_open() {
        let quarter = TAU / 4.0;
        assert!(!label_flipped(0.0));
        assert!(!label_flipped(quarter));
        assert!(label_flipped(quarter + 0.01));
        assert!(label_flipped(TAU / 2.0));
        assert!(label_flipped(3.0 * quarter - 0.01));
        assert!(!label_flipped(3.0 * quarter));
        assert!(!label_flipped(TAU - 0.01));
    }

    #[test]
    fn test_normalize_angle_wraps_negatives() {
        assert!((normalize_angle(-TAU / 4.0) - 3.0 * TAU / 4.0).abs() < 1e-12);
        assert!(normalize_angle(TAU) < 1e-12);
        assert!((normalize_angle(2.5 * TAU) - TAU / 2.0).abs() < 1e-9);
    }
}
