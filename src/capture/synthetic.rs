//! Synthetic capture/pose rig: a scripted angle wave standing in for the
//! camera and the pose model. Default backend for the binary, and the demo
//! payload for the video feed when no real backend is wired in.

use std::time::Duration;

use image::{DynamicImage, ImageBuffer, Rgb};

use crate::capture::{CapturedFrame, VideoSource};
use crate::config::Configuration;
use crate::error::{CaptureError, PoseError};
use crate::exercise::angle::Point;
use crate::exercise::ExerciseKind;
use crate::pose::{LandmarkSet, PoseEstimator};
use crate::session::SessionBackend;

const SWEEP_LOW: f32 = 15.0;
const SWEEP_HIGH: f32 = 175.0;

#[derive(Debug, Clone)]
pub struct SyntheticBackend {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Frames per full extend/contract cycle.
    pub period_frames: u32,
    pub frame_interval: Duration,
}

impl SyntheticBackend {
    pub fn from_config(configuration: &Configuration) -> Self {
        Self {
            frame_width: configuration.frame_width,
            frame_height: configuration.frame_height,
            period_frames: configuration.synthetic_period_frames.max(2),
            frame_interval: Duration::from_millis(configuration.synthetic_frame_interval_ms),
        }
    }
}

impl SessionBackend for SyntheticBackend {
    fn open_video(&self, _kind: ExerciseKind) -> Result<Box<dyn VideoSource>, CaptureError> {
        Ok(Box::new(SyntheticCamera {
            width: self.frame_width,
            height: self.frame_height,
            frame_interval: self.frame_interval,
        }))
    }

    fn open_estimator(&self, kind: ExerciseKind) -> Result<Box<dyn PoseEstimator>, PoseError> {
        Ok(Box::new(SyntheticPose {
            kind,
            period: self.period_frames,
            tick: 0,
        }))
    }
}

struct SyntheticCamera {
    width: u32,
    height: u32,
    frame_interval: Duration,
}

impl VideoSource for SyntheticCamera {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError> {
        if !self.frame_interval.is_zero() {
            std::thread::sleep(self.frame_interval);
        }
        let image = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            self.width,
            self.height,
            Rgb([24, 24, 32]),
        );
        Ok(Some(CapturedFrame::new(DynamicImage::ImageRgb8(image))))
    }
}

struct SyntheticPose {
    kind: ExerciseKind,
    period: u32,
    tick: u32,
}

impl SyntheticPose {
    /// Triangle wave over one period, starting at the extended extreme.
    fn current_angle(&self) -> f32 {
        let phase = self.tick % self.period;
        let half = (self.period / 2).max(1);
        let fraction = if phase < half {
            phase as f32 / half as f32
        } else {
            (self.period - phase) as f32 / half as f32
        };
        SWEEP_HIGH - (SWEEP_HIGH - SWEEP_LOW) * fraction
    }

    fn landmarks_for(&self, degrees: f32) -> LandmarkSet {
        // Neutral standing pose; only the profile's triplet moves.
        let mut set = LandmarkSet {
            wrist: Point::new(0.60, 0.38),
            elbow: Point::new(0.58, 0.30),
            shoulder: Point::new(0.55, 0.22),
            hip: Point::new(0.52, 0.48),
            knee: Point::new(0.50, 0.66),
            ankle: Point::new(0.50, 0.86),
        };

        let joints = self.kind.profile().joints;
        let radians = degrees.to_radians();
        let vertex = Point::new(0.5, 0.5);
        let reach = 0.18;
        set.set(joints[1], vertex);
        set.set(joints[0], Point::new(vertex.x, vertex.y + reach));
        set.set(
            joints[2],
            Point::new(
                vertex.x + reach * radians.sin(),
                vertex.y + reach * radians.cos(),
            ),
        );
        set
    }
}

impl PoseEstimator for SyntheticPose {
    fn detect(&mut self, _frame: &CapturedFrame) -> Result<Option<LandmarkSet>, PoseError> {
        let degrees = self.current_angle();
        self.tick = self.tick.wrapping_add(1);
        Ok(Some(self.landmarks_for(degrees)))
    }
}
