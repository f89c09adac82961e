//! Joint angle computation over normalized 2-D landmark coordinates.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An angle measurement with an explicit validity flag. Degenerate geometry
/// (duplicate or missing points) yields `reliable: false` and the state
/// machine treats the frame as carrying no angle at all.
#[derive(Debug, Clone, Copy)]
pub struct AngleSample {
    pub degrees: f32,
    pub reliable: bool,
}

impl AngleSample {
    pub fn unreliable() -> Self {
        Self {
            degrees: 0.0,
            reliable: false,
        }
    }
}

/// Angle in degrees at `vertex`, formed by the rays toward `proximal` and
/// `distal`. Always in [0, 180] for well-formed input; the cosine is clamped
/// so collinear points with rounding error never produce NaN.
pub fn joint_angle(proximal: Point, vertex: Point, distal: Point) -> AngleSample {
    let ba = (proximal.x - vertex.x, proximal.y - vertex.y);
    let bc = (distal.x - vertex.x, distal.y - vertex.y);

    let norm_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let norm_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();
    if norm_ba == 0.0 || norm_bc == 0.0 {
        return AngleSample::unreliable();
    }

    let cosine = (ba.0 * bc.0 + ba.1 * bc.1) / (norm_ba * norm_bc);
    if !cosine.is_finite() {
        return AngleSample::unreliable();
    }

    AngleSample {
        degrees: cosine.clamp(-1.0, 1.0).acos().to_degrees(),
        reliable: true,
    }
}
