//! Error types for field computation and frame storage

use std::path::PathBuf;

use thiserror::Error;

use crate::grid::Axis;

/// Result type for coilfield operations
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors surfaced by the coil model, solver, and frame store
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("Invalid coil geometry: {points} point(s), at least 2 required")]
    InvalidGeometry { points: usize },

    #[error("Invalid {axis} range: min {min} must be finite and below max {max}")]
    InvalidRange { axis: Axis, min: f64, max: f64 },

    #[error("Invalid grid resolution: {0}, at least 1 sample per axis required")]
    InvalidResolution(usize),

    #[error("No coils to solve")]
    NoCoils,

    #[error("Frame not found: {0:?}")]
    FrameNotFound(PathBuf),

    #[error("Invalid frame key {0:?}")]
    InvalidKey(String),

    #[error("Frame index {index} out of range, {len} frame(s) available")]
    FrameIndexOutOfRange { index: usize, len: usize },

    #[error("Corrupt frame {path:?}: {reason}")]
    CorruptFrame { path: PathBuf, reason: String },

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: [usize; 3], found: [usize; 3] },

    #[error("Length mismatch: expected {expected} samples, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene error: {0}")]
    Scene(#[from] serde_json::Error),
}

impl FieldError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FieldError::CorruptFrame {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
