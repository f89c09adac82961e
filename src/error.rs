use thiserror::Error;

// Main application error type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Capture Error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Pose Error: {0}")]
    Pose(#[from] PoseError),
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),
    #[error("Config Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Server Error: {0}")]
    Server(#[from] std::io::Error),
}

// Fatal-to-session failures from the video source
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open video source: {0}")]
    Open(String),
    #[error("Failed to read frame: {0}")]
    Read(String),
}

// Pose backend failures; inference faults are recoverable per frame
#[derive(Error, Debug)]
pub enum PoseError {
    #[error("Failed to initialize pose backend: {0}")]
    Init(String),
    #[error("Pose inference failed: {0}")]
    Inference(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),
    #[error("Failed to spawn session worker: {0}")]
    Spawn(std::io::Error),
}
