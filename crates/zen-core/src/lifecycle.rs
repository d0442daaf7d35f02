//! Mount/unmount lifecycle and the per-frame tick.
//!
//! A [`Visualization`] is either Idle (no rendering context) or Running (it
//! owns a [`RenderSurface`], the particle buffers and the field state).
//! Frontends acquire the surface asynchronously, hand it to
//! [`Visualization::mount`] and then call [`Visualization::tick`] from their
//! frame callback until it reports [`TickOutcome::Stopped`].

use std::fmt;
use std::time::Duration;

use glam::Mat4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::config::{FieldConfig, Rgb, Shape};
use crate::constants::{BASE_PARTICLE_COUNT, MAX_PIXEL_RATIO, SHAPE_RADIUS, TRAIL_LENGTH};
use crate::error::{AcquireError, GestureError, RenderError};
use crate::evolver::{EvolvedVertex, FieldEvolver, NoiseField};
use crate::field::FieldState;
use crate::gesture::{GestureInbox, GestureSample};
use crate::sampler::sample_shape;
use crate::trail::ParticleBuffers;

/// Size of the drawable area in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio,
        }
    }
}

/// Everything a surface needs to draw one frame.
#[derive(Debug)]
pub struct FrameView<'a> {
    pub vertices: &'a [EvolvedVertex],
    /// Projection * view * model.
    pub view_proj: Mat4,
    pub color: Rgb,
    pub explosion: f32,
    pub viewport: Viewport,
}

/// A rendering context owned by a running visualization.
pub trait RenderSurface {
    /// Reconfigure for a new viewport. Also used to recover a lost surface.
    fn resize(&mut self, viewport: Viewport);
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;
    /// Release GPU buffers and the context. Consumes the surface, so it can
    /// only happen once.
    fn release(self)
    where
        Self: Sized;
}

/// Which adapter the rendering context ended up on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterTier {
    Preferred,
    Fallback,
}

/// User-visible state of the visualization.
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Idle,
    Loading,
    Running { degraded: bool },
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("idle"),
            Status::Loading => f.write_str("loading"),
            Status::Running { degraded: false } => f.write_str("running"),
            Status::Running { degraded: true } => f.write_str("running (degraded)"),
            Status::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was drawn; schedule the next one.
    Drawn,
    /// The surface could not present this frame but will recover.
    Skipped,
    /// Not running; do not schedule another frame.
    Stopped,
}

struct Running<S> {
    surface: S,
    particles: ParticleBuffers,
    field: FieldState,
    evolver: FieldEvolver,
    camera: Camera,
    viewport: Viewport,
    vertices: Vec<EvolvedVertex>,
    last_tick: Duration,
}

pub struct Visualization<S: RenderSurface> {
    config: FieldConfig,
    status: Status,
    running: Option<Running<S>>,
    inbox: GestureInbox,
    pending_shape: Option<Shape>,
    pending_explosion: bool,
    base_count: usize,
    trail_length: usize,
    rng: StdRng,
}

impl<S: RenderSurface> Visualization<S> {
    pub fn new(config: FieldConfig) -> Self {
        Self::with_counts(config, BASE_PARTICLE_COUNT, TRAIL_LENGTH)
    }

    pub fn with_counts(config: FieldConfig, base_count: usize, trail_length: usize) -> Self {
        Self {
            config,
            status: Status::Idle,
            running: None,
            inbox: GestureInbox::default(),
            pending_shape: None,
            pending_explosion: false,
            base_count,
            trail_length,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed for sampling and noise.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> FieldConfig {
        self.config
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Enter Loading before an acquisition attempt. Also the retry path after
    /// a failure. Returns false when already running.
    pub fn begin_mount(&mut self) -> bool {
        if self.running.is_some() {
            return false;
        }
        self.status = Status::Loading;
        true
    }

    /// Record a failed acquisition; the user may retry with [`begin_mount`].
    ///
    /// [`begin_mount`]: Visualization::begin_mount
    pub fn fail(&mut self, err: &AcquireError) {
        log::error!("[lifecycle] acquisition failed: {err}");
        self.status = Status::Failed(err.to_string());
    }

    /// Idle -> Running: build the particle buffers and take ownership of the
    /// surface. `now` is the timestamp the first tick measures from.
    pub fn mount(&mut self, surface: S, viewport: Viewport, tier: AdapterTier, now: Duration) {
        if self.running.is_some() {
            log::warn!("[lifecycle] mount while running; releasing previous surface");
            self.unmount();
        }
        let points = sample_shape(self.config.shape, self.base_count, SHAPE_RADIUS, &mut self.rng);
        let particles = ParticleBuffers::expand(&points, self.trail_length, &mut self.rng);
        let evolver = FieldEvolver::new(NoiseField::new(self.rng.gen()));
        let mut camera = Camera::new(1.0);
        camera.set_viewport(viewport.width, viewport.height);
        let degraded = tier == AdapterTier::Fallback;
        if degraded {
            log::warn!("[lifecycle] running on fallback adapter");
        }
        log::info!(
            "[lifecycle] mounted: shape={} particles={} viewport={}x{}",
            self.config.shape,
            particles.len(),
            viewport.width,
            viewport.height
        );
        self.running = Some(Running {
            surface,
            vertices: Vec::with_capacity(particles.len()),
            particles,
            field: FieldState::new(),
            evolver,
            camera,
            viewport,
            last_tick: now,
        });
        self.pending_shape = None;
        self.pending_explosion = false;
        self.status = Status::Running { degraded };
    }

    /// Running -> Idle: release the surface. Returns false when nothing was
    /// mounted.
    pub fn unmount(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            // Cancels an acquisition still in flight
            if self.status == Status::Loading {
                self.status = Status::Idle;
            }
            return false;
        };
        running.surface.release();
        self.pending_shape = None;
        self.pending_explosion = false;
        self.inbox.clear();
        self.status = Status::Idle;
        log::info!("[lifecycle] unmounted");
        true
    }

    /// Observe a new viewport without touching the field state.
    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(run) = &mut self.running {
            if run.viewport == viewport {
                return;
            }
            run.viewport = viewport;
            run.camera.set_viewport(viewport.width, viewport.height);
            run.surface.resize(viewport);
        }
    }

    /// Select a shape; a running field re-samples at the start of the next tick.
    pub fn set_shape(&mut self, shape: Shape) {
        self.config.shape = shape;
        if self.running.is_some() {
            self.pending_shape = Some(shape);
        }
    }

    /// Takes effect on the next drawn frame; no re-sampling.
    pub fn set_color(&mut self, color: Rgb) {
        self.config.color = color;
    }

    /// Queue an explosion for the next tick. Repeated calls collapse into one.
    pub fn trigger_explosion(&mut self) {
        if self.running.is_some() {
            self.pending_explosion = true;
        }
    }

    pub fn submit_gesture(&mut self, sample: Result<GestureSample, GestureError>) {
        self.inbox.submit(sample);
    }

    pub fn latest_gesture(&self) -> GestureSample {
        self.inbox.latest()
    }

    pub fn field(&self) -> Option<&FieldState> {
        self.running.as_ref().map(|r| &r.field)
    }

    pub fn particles(&self) -> Option<&ParticleBuffers> {
        self.running.as_ref().map(|r| &r.particles)
    }

    pub fn vertices(&self) -> &[EvolvedVertex] {
        self.running.as_ref().map_or(&[], |r| r.vertices.as_slice())
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.running.as_ref().map(|r| r.viewport)
    }

    pub fn smoothed_tension(&self) -> f32 {
        self.field().map_or(0.0, |f| f.smoothed_tension)
    }

    /// Advance the field to `now` and draw one frame.
    ///
    /// Idle visualizations return [`TickOutcome::Stopped`] without drawing, so a
    /// frame callback that fires after teardown is harmless. Fatal surface
    /// errors tear the visualization down and surface `Status::Failed`.
    pub fn tick(&mut self, now: Duration) -> Result<TickOutcome, RenderError> {
        let Some(run) = self.running.as_mut() else {
            return Ok(TickOutcome::Stopped);
        };

        if let Some(shape) = self.pending_shape.take() {
            let points = sample_shape(shape, self.base_count, SHAPE_RADIUS, &mut self.rng);
            run.particles.retarget(&points);
            log::info!("[field] shape -> {shape}");
        }
        if std::mem::take(&mut self.pending_explosion) {
            run.field.trigger_explosion();
        }

        let dt = now.saturating_sub(run.last_tick).as_secs_f32();
        run.last_tick = now;
        run.field.update(dt, &self.inbox.latest());

        let model = run.field.model_matrix();
        let view = run.camera.view_matrix();
        let model_view = view * model;
        run.evolver.evolve_into(
            &run.particles,
            &run.field,
            &model_view,
            run.viewport.pixel_ratio,
            &mut run.vertices,
        );

        let frame = FrameView {
            vertices: &run.vertices,
            view_proj: run.camera.projection_matrix() * model_view,
            color: self.config.color,
            explosion: run.field.explosion_impulse,
            viewport: run.viewport,
        };
        match run.surface.draw(&frame) {
            Ok(()) => Ok(TickOutcome::Drawn),
            Err(RenderError::Lost | RenderError::Outdated) => {
                let viewport = run.viewport;
                run.surface.resize(viewport);
                Ok(TickOutcome::Skipped)
            }
            Err(RenderError::Timeout) => Ok(TickOutcome::Skipped),
            Err(e) => {
                log::error!("[lifecycle] fatal render error: {e}");
                self.unmount();
                self.status = Status::Failed(e.to_string());
                Err(e)
            }
        }
    }
}

impl<S: RenderSurface> Drop for Visualization<S> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.surface.release();
        }
    }
}
