//! Hit-reaction evaluation: partial reaction or escalation to full ragdoll.

use engine_core::Vec3;

/// Decision for an incoming hit below the controller's acceptance gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReactionOutcome {
    /// Escalate to full ragdoll (hit too strong, or swoop rule).
    Escalate,
    /// Localized reaction lasting `duration` seconds.
    Partial { duration: f32 },
}

/// The swoop rule: true iff every hit part is constrained. A hit that
/// lands only on load-bearing constrained parts (the knees) cannot be
/// absorbed as a partial reaction.
pub fn is_swoop(hit_parts: &[usize], constrained: &[usize]) -> bool {
    !hit_parts.is_empty() && hit_parts.iter().all(|p| constrained.contains(p))
}

/// Duration of a partial reaction for a given impact magnitude.
pub fn reaction_duration(velocity_magnitude: f32, weight: f32, hit_resistance: f32) -> f32 {
    velocity_magnitude / (weight * hit_resistance)
}

/// Evaluate an incoming hit against the swoop rule and the reaction
/// tolerance.
pub fn evaluate(
    hit_parts: &[usize],
    hit_velocity: Vec3,
    constrained: &[usize],
    tolerance: f32,
    weight: f32,
    hit_resistance: f32,
) -> ReactionOutcome {
    if is_swoop(hit_parts, constrained) {
        return ReactionOutcome::Escalate;
    }
    let magnitude = hit_velocity.length();
    if magnitude > tolerance {
        ReactionOutcome::Escalate
    } else {
        ReactionOutcome::Partial {
            duration: reaction_duration(magnitude, weight, hit_resistance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNEES: [usize; 2] = [9, 10];

    #[test]
    fn swoop_when_only_constrained_parts_hit() {
        assert!(is_swoop(&[9, 10], &KNEES));
        assert!(is_swoop(&[9], &KNEES));
        assert!(!is_swoop(&[2, 9, 10], &KNEES));
        assert!(!is_swoop(&[2], &KNEES));
        assert!(!is_swoop(&[], &KNEES));
    }

    #[test]
    fn no_constrained_set_never_swoops() {
        assert!(!is_swoop(&[0, 1, 2], &[]));
    }

    #[test]
    fn strong_hit_escalates_regardless_of_part() {
        let v = Vec3::new(0.0, 0.0, 25.0);
        assert_eq!(
            evaluate(&[2], v, &KNEES, 20.0, 32.0, 8.0),
            ReactionOutcome::Escalate
        );
    }

    #[test]
    fn swoop_escalates_below_tolerance() {
        // Magnitude 3 is well under tolerance 20, but both knees were hit.
        let v = Vec3::new(3.0, 0.0, 0.0);
        assert_eq!(
            evaluate(&[9, 10], v, &KNEES, 20.0, 32.0, 8.0),
            ReactionOutcome::Escalate
        );
    }

    #[test]
    fn weak_hit_on_head_is_partial_with_expected_duration() {
        // |v| = 5, weight 32, resistance 8 -> 5 / 256 s.
        let v = Vec3::new(0.0, 0.0, 5.0);
        match evaluate(&[2], v, &KNEES, 20.0, 32.0, 8.0) {
            ReactionOutcome::Partial { duration } => {
                assert!((duration - 5.0 / 256.0).abs() < 1e-6);
            }
            other => panic!("expected partial, got {:?}", other),
        }
    }

    #[test]
    fn tolerance_boundary_stays_partial() {
        // Exactly at tolerance does not escalate (strictly greater does).
        let v = Vec3::new(20.0, 0.0, 0.0);
        assert!(matches!(
            evaluate(&[2], v, &KNEES, 20.0, 32.0, 8.0),
            ReactionOutcome::Partial { .. }
        ));
    }
}
