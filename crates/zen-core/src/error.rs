//! Error types shared by the core and both frontends.

use thiserror::Error;

/// Invalid configuration input (shape names, colour strings).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown shape `{0}` (expected sphere, heart, flower, saturn, buddha or fireworks)")]
    UnknownShape(String),
    #[error("invalid colour `{0}` (expected #rrggbb or #rgb)")]
    InvalidColor(String),
}

/// A single gesture sample could not be produced.
///
/// These are transient: the frame is treated as carrying no new sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    #[error("expected {expected} landmark coordinates, got {found}")]
    LandmarkCount { expected: usize, found: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("hand detection failed: {0}")]
    Detection(String),
}

/// The rendering context or gesture source could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create rendering surface: {0}")]
    Surface(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("gesture source unavailable: {0}")]
    GestureSource(String),
}

/// A frame could not be presented.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("surface lost")]
    Lost,
    #[error("surface outdated")]
    Outdated,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("{0}")]
    Other(String),
}

impl RenderError {
    /// Whether the visualization must be torn down after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::OutOfMemory | RenderError::Other(_))
    }
}
