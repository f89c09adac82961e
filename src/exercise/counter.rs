//! Hysteresis state machine driving the per-session repetition counter.

use super::angle::AngleSample;
use super::{ExerciseKind, ExerciseProfile, Phase};

/// Emitted once per completed repetition.
#[derive(Debug, Clone, Copy)]
pub struct RepEvent {
    pub kind: ExerciseKind,
    pub count: u32,
    pub stage: &'static str,
}

/// Two-stage counter with a dead zone between the enter and exit thresholds.
/// Once in a stage, the angle must cross the opposite threshold before a
/// transition is accepted; frames lingering past a threshold never re-fire
/// because transitions are edge-triggered on a stage change.
pub struct RepCounter {
    profile: &'static ExerciseProfile,
    phase: Phase,
    count: u32,
}

impl RepCounter {
    pub fn new(kind: ExerciseKind) -> Self {
        let profile = kind.profile();
        Self {
            profile,
            phase: profile.initial,
            count: 0,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stage_label(&self) -> &'static str {
        self.profile.label(self.phase)
    }

    /// Feed one angle measurement. Returns a `RepEvent` when this frame
    /// completes a repetition. Unreliable samples leave state untouched.
    pub fn observe(&mut self, sample: AngleSample) -> Option<RepEvent> {
        if !sample.reliable {
            return None;
        }

        let target = if sample.degrees < self.profile.enter_below {
            Phase::Contracted
        } else if sample.degrees > self.profile.exit_above {
            Phase::Extended
        } else {
            // Dead zone: no stage change either way.
            return None;
        };

        if target == self.phase {
            return None;
        }

        self.phase = target;
        if target != self.profile.counts_on {
            return None;
        }

        self.count += 1;
        Some(RepEvent {
            kind: self.profile.kind,
            count: self.count,
            stage: self.profile.label(target),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::angle::AngleSample;

    fn reliable(degrees: f32) -> AngleSample {
        AngleSample {
            degrees,
            reliable: true,
        }
    }

    fn run(kind: ExerciseKind, angles: &[f32]) -> u32 {
        let mut counter = RepCounter::new(kind);
        for &a in angles {
            counter.observe(reliable(a));
        }
        counter.count()
    }

    #[test]
    fn dead_zone_oscillation_counts_nothing() {
        // Strictly between enter (100) and exit (160) for the squat profile.
        assert_eq!(run(ExerciseKind::Squat, &[120.0, 150.0, 110.0, 155.0, 105.0]), 0);
    }

    #[test]
    fn one_full_cycle_counts_exactly_once() {
        // Frames lingering at either extreme must not re-trigger.
        assert_eq!(
            run(ExerciseKind::Squat, &[170.0, 170.0, 170.0, 20.0, 20.0, 170.0]),
            1
        );
    }

    #[test]
    fn oscillation_at_one_extreme_counts_nothing() {
        assert_eq!(run(ExerciseKind::Squat, &[170.0, 165.0, 170.0, 165.0, 170.0]), 0);
    }

    #[test]
    fn unreliable_samples_do_not_disturb_a_cycle() {
        let mut counter = RepCounter::new(ExerciseKind::Squat);
        for &a in &[170.0, 20.0] {
            counter.observe(reliable(a));
            counter.observe(AngleSample::unreliable());
        }
        counter.observe(AngleSample::unreliable());
        counter.observe(reliable(170.0));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn squat_counts_on_the_return_to_stand() {
        let mut counter = RepCounter::new(ExerciseKind::Squat);
        assert!(counter.observe(reliable(170.0)).is_none());
        assert!(counter.observe(reliable(20.0)).is_none());
        let event = counter.observe(reliable(170.0)).expect("rep on return");
        assert_eq!(event.count, 1);
        assert_eq!(event.stage, "straight");
    }

    #[test]
    fn pushup_counts_on_the_descent() {
        let mut counter = RepCounter::new(ExerciseKind::Pushup);
        assert!(counter.observe(reliable(170.0)).is_none());
        let event = counter.observe(reliable(45.0)).expect("rep on reaching up stage");
        assert_eq!(event.count, 1);
        assert_eq!(event.stage, "up");
        assert!(counter.observe(reliable(170.0)).is_none());
    }

    #[test]
    fn bicep_curl_end_to_end_scenario() {
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl);
        let expectations = [
            (170.0, Phase::Extended, 0),
            (165.0, Phase::Extended, 0),
            (20.0, Phase::Contracted, 1),
            (25.0, Phase::Contracted, 1),
            (170.0, Phase::Extended, 1),
        ];
        for (angle, phase, count) in expectations {
            counter.observe(reliable(angle));
            assert_eq!(counter.phase(), phase, "after angle {angle}");
            assert_eq!(counter.count(), count, "after angle {angle}");
        }
    }

    #[test]
    fn repeated_cycles_keep_counting() {
        let mut angles = Vec::new();
        for _ in 0..5 {
            angles.extend_from_slice(&[170.0, 20.0]);
        }
        angles.push(170.0);
        assert_eq!(run(ExerciseKind::Squat, &angles), 5);
        assert_eq!(run(ExerciseKind::BicepCurl, &angles), 5);
    }
}
