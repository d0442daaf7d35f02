pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod evolver;
pub mod field;
pub mod gesture;
pub mod lifecycle;
pub mod sampler;
pub mod shading;
pub mod trail;

#[cfg(feature = "gpu")]
pub mod gpu;

#[cfg(feature = "gpu")]
pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");

pub use camera::Camera;
pub use config::{FieldConfig, Rgb, Shape};
pub use error::{AcquireError, ConfigError, GestureError, RenderError};
pub use evolver::{EvolvedVertex, FieldEvolver, NoiseField};
pub use field::FieldState;
pub use gesture::{ClapDetector, GestureInbox, GestureSample, HandLandmarks};
pub use lifecycle::{
    AdapterTier, FrameView, RenderSurface, Status, TickOutcome, Viewport, Visualization,
};
pub use sampler::{sample_shape, sample_shape_random};
pub use trail::ParticleBuffers;
