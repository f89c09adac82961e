pub mod annotate;
pub mod capture;
pub mod config;
pub mod error;
pub mod exercise;
pub mod http;
pub mod notify;
pub mod pose;
pub mod session;

pub use config::Configuration;
pub use error::{AppError, CaptureError, PoseError, SessionError};
pub use exercise::{ExerciseKind, Phase};
pub use session::{SessionBackend, SessionController, StartOutcome};
