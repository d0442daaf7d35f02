//! Per-visualization field state, advanced once per frame.
//!
//! The state is an explicitly owned value: the frame loop updates it and then
//! hands it by reference to the evolver and the renderer.

use glam::{EulerRot, Mat4};

use crate::constants::{
    EXPLOSION_DECAY_RATE, RESTING_TENSION, SPIN_RATE, TENSION_SMOOTHING_RATE, TILT_GAIN, TILT_RATE,
};
use crate::gesture::GestureSample;

#[derive(Clone, Debug, PartialEq)]
pub struct FieldState {
    /// Low-passed hand tension in `0..=1`.
    pub smoothed_tension: f32,
    /// Explosion impulse in `0..=1`; jumps to 1 on trigger and decays linearly.
    pub explosion_impulse: f32,
    /// Seconds since the visualization mounted.
    pub elapsed: f32,
    pub tilt_x: f32,
    pub tilt_z: f32,
    pub smoothing_rate: f32,
    pub decay_rate: f32,
}

impl Default for FieldState {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldState {
    pub fn new() -> Self {
        Self {
            smoothed_tension: 0.0,
            explosion_impulse: 0.0,
            elapsed: 0.0,
            tilt_x: 0.0,
            tilt_z: 0.0,
            smoothing_rate: TENSION_SMOOTHING_RATE,
            decay_rate: EXPLOSION_DECAY_RATE,
        }
    }

    /// Advance by `dt` seconds using the latest gesture sample.
    pub fn update(&mut self, dt: f32, gesture: &GestureSample) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        self.smooth_toward(raw_tension(gesture), dt);
        self.decay_explosion(dt);

        let (hx, hy) = if gesture.is_present {
            (gesture.x, gesture.y)
        } else {
            (0.5, 0.5)
        };
        let approach = (TILT_RATE * dt).min(1.0);
        self.tilt_x += ((hy - 0.5) * TILT_GAIN - self.tilt_x) * approach;
        self.tilt_z += ((hx - 0.5) * TILT_GAIN - self.tilt_z) * approach;
    }

    /// First-order low-pass toward `raw`.
    ///
    /// Uses the exact exponential step `1 - e^(-rate*dt)`, which equals
    /// `rate*dt` for small steps and never overshoots on long frames.
    pub fn smooth_toward(&mut self, raw: f32, dt: f32) {
        let alpha = 1.0 - (-self.smoothing_rate * dt).exp();
        self.smoothed_tension += (raw - self.smoothed_tension) * alpha;
        self.smoothed_tension = self.smoothed_tension.clamp(0.0, 1.0);
    }

    pub fn decay_explosion(&mut self, dt: f32) {
        if self.explosion_impulse > 0.0 {
            self.explosion_impulse = (self.explosion_impulse - self.decay_rate * dt).max(0.0);
        }
    }

    /// Reset the impulse to full strength. Repeated triggers never stack.
    pub fn trigger_explosion(&mut self) {
        self.explosion_impulse = 1.0;
    }

    /// Rotation of the whole field: slow spin plus hand-driven tilt.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(
            EulerRot::XYZ,
            self.tilt_x,
            self.elapsed * SPIN_RATE,
            self.tilt_z,
        )
    }
}

/// Tension the field is pulled toward; a missing hand rests slightly closed.
#[inline]
pub fn raw_tension(gesture: &GestureSample) -> f32 {
    if gesture.is_present {
        gesture.tension
    } else {
        RESTING_TENSION
    }
}
