pub mod angle;
pub mod counter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::pose::Joint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    Pushup,
    Pullup,
    Crunch,
    BicepCurl,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 5] = [
        ExerciseKind::Squat,
        ExerciseKind::Pushup,
        ExerciseKind::Pullup,
        ExerciseKind::Crunch,
        ExerciseKind::BicepCurl,
    ];

    /// Canonical wire token, also used in the `last_<slug>_session` fields
    /// and the `<slug>_count_update` event names.
    pub fn slug(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
            ExerciseKind::Pullup => "pullup",
            ExerciseKind::Crunch => "crunch",
            ExerciseKind::BicepCurl => "curl",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "Squat",
            ExerciseKind::Pushup => "Pushup",
            ExerciseKind::Pullup => "Pull-up",
            ExerciseKind::Crunch => "Crunch",
            ExerciseKind::BicepCurl => "Bicep curl",
        }
    }

    pub fn profile(self) -> &'static ExerciseProfile {
        &PROFILES[self as usize]
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ExerciseKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "squat" => Ok(ExerciseKind::Squat),
            "pushup" | "push-up" => Ok(ExerciseKind::Pushup),
            "pullup" | "pull-up" => Ok(ExerciseKind::Pullup),
            "crunch" => Ok(ExerciseKind::Crunch),
            "curl" | "bicep_curl" | "bicep-curl" => Ok(ExerciseKind::BicepCurl),
            other => Err(SessionError::UnknownExercise(other.to_string())),
        }
    }
}

/// The two logical stages of any tracked movement. `Extended` is the at-rest
/// pose with a large joint angle, `Contracted` the low-angle pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extended,
    Contracted,
}

/// Immutable per-exercise configuration, created once at process start.
#[derive(Debug, Clone)]
pub struct ExerciseProfile {
    pub kind: ExerciseKind,
    /// Joints read each frame, in (proximal, vertex, distal) order.
    pub joints: [Joint; 3],
    /// Angle below this enters `Contracted`.
    pub enter_below: f32,
    /// Angle above this returns to `Extended`. Always greater than
    /// `enter_below`, leaving a dead zone between the two.
    pub exit_above: f32,
    /// Which arrival increments the counter.
    pub counts_on: Phase,
    pub initial: Phase,
    extended_label: &'static str,
    contracted_label: &'static str,
}

impl ExerciseProfile {
    pub fn label(&self, phase: Phase) -> &'static str {
        match phase {
            Phase::Extended => self.extended_label,
            Phase::Contracted => self.contracted_label,
        }
    }
}

static PROFILES: [ExerciseProfile; 5] = [
    ExerciseProfile {
        kind: ExerciseKind::Squat,
        joints: [Joint::Ankle, Joint::Knee, Joint::Hip],
        enter_below: 100.0,
        exit_above: 160.0,
        counts_on: Phase::Extended,
        initial: Phase::Extended,
        extended_label: "straight",
        contracted_label: "bend",
    },
    ExerciseProfile {
        kind: ExerciseKind::Pushup,
        joints: [Joint::Elbow, Joint::Shoulder, Joint::Hip],
        enter_below: 90.0,
        exit_above: 160.0,
        counts_on: Phase::Contracted,
        initial: Phase::Extended,
        extended_label: "down",
        contracted_label: "up",
    },
    ExerciseProfile {
        kind: ExerciseKind::Pullup,
        joints: [Joint::Wrist, Joint::Elbow, Joint::Shoulder],
        enter_below: 40.0,
        exit_above: 160.0,
        counts_on: Phase::Extended,
        initial: Phase::Extended,
        extended_label: "down",
        contracted_label: "up",
    },
    ExerciseProfile {
        kind: ExerciseKind::Crunch,
        joints: [Joint::Hip, Joint::Knee, Joint::Shoulder],
        enter_below: 50.0,
        exit_above: 160.0,
        counts_on: Phase::Extended,
        initial: Phase::Extended,
        extended_label: "down",
        contracted_label: "up",
    },
    ExerciseProfile {
        kind: ExerciseKind::BicepCurl,
        joints: [Joint::Wrist, Joint::Elbow, Joint::Shoulder],
        enter_below: 30.0,
        exit_above: 160.0,
        counts_on: Phase::Contracted,
        initial: Phase::Extended,
        extended_label: "down",
        contracted_label: "up",
    },
];
