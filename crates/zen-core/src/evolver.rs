//! Field evolver: the per-vertex transform evaluated for every trail copy on
//! every frame.
//!
//! The steps run in a fixed order and each one adds to (or scales) the
//! position produced so far:
//!
//! 1. trail time lag
//! 2. density repulsion (grows with tension squared)
//! 3. explosion bounce along a noise-derived direction
//! 4. repulsion and bounce applied to the target
//! 5. breathing, desynchronized per particle
//! 6. noise turbulence, calmer when the hand is closed
//! 7. radial expansion from 2.5 (open) to 0.5 (closed)
//! 8. explosion blast along the target direction
//! 9. downward drift of trailing copies
//!
//! Breathing and expansion scale the displaced position; the turbulence
//! displacement is added after scaling, so it is not amplified by expansion.

use glam::{Mat4, Vec3};
use noise::{NoiseFn, OpenSimplex};
use rand::Rng;

use crate::constants::*;
use crate::field::FieldState;
use crate::trail::ParticleBuffers;

/// Smooth 3D gradient noise in roughly `-1..=1`.
#[derive(Clone, Debug)]
pub struct NoiseField {
    simplex: OpenSimplex,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
        }
    }

    /// Noise with a seed from the thread-local RNG.
    pub fn unseeded() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    #[inline]
    pub fn sample(&self, p: Vec3) -> f32 {
        let n = self.simplex.get([p.x as f64, p.y as f64, p.z as f64]) as f32;
        n.clamp(-1.0, 1.0)
    }
}

/// Frame-global inputs of the transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldUniforms {
    pub time: f32,
    pub tension: f32,
    pub explosion: f32,
}

impl From<&FieldState> for FieldUniforms {
    fn from(state: &FieldState) -> Self {
        Self {
            time: state.elapsed,
            tension: state.smoothed_tension,
            explosion: state.explosion_impulse,
        }
    }
}

/// Per-vertex inputs of the transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexInput {
    pub target: Vec3,
    pub randomness: f32,
    pub trail_index: u32,
}

/// One rendered trail copy after evolution.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EvolvedVertex {
    /// Model-space position.
    pub position: Vec3,
    /// Point diameter in physical pixels.
    pub size: f32,
    pub alpha: f32,
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Evaluate steps 1 to 9 for one vertex and return its model-space position.
pub fn evolve_position(noise: &NoiseField, v: &VertexInput, u: &FieldUniforms) -> Vec3 {
    let trail = v.trail_index as f32;
    let t = u.time - trail * TRAIL_LAG_SEC;

    let mut pos = v.target;
    let safe = if v.target.length() < ORIGIN_EPSILON {
        Vec3::new(ORIGIN_EPSILON, 0.0, 0.0)
    } else {
        v.target
    };
    let center_dir = safe.normalize();

    let pressure = u.tension * u.tension * REPULSION_STRENGTH;
    let neighbor_push = noise.sample(pos * REPULSION_NOISE_FREQ + Vec3::splat(t));
    let repulsion = center_dir * pressure * (0.5 + neighbor_push * 0.5);

    let bounce_dir = Vec3::new(
        noise.sample(pos + Vec3::splat(BOUNCE_OFFSETS[0])),
        noise.sample(pos + Vec3::splat(BOUNCE_OFFSETS[1])),
        noise.sample(pos + Vec3::splat(BOUNCE_OFFSETS[2])),
    )
    .normalize_or_zero();
    let bounce = bounce_dir * u.explosion * BOUNCE_STRENGTH;

    pos += repulsion + bounce;

    let breathe = (t * BREATHE_RATE + v.randomness * BREATHE_PHASE_SPREAD).sin() * BREATHE_AMPLITUDE;
    let turbulence_noise = noise.sample(pos * TURBULENCE_FREQ + Vec3::splat(t * TURBULENCE_DRIFT));
    let turbulence = mix(TURBULENCE_OPEN, TURBULENCE_CLOSED, u.tension);
    let expansion = mix(EXPANSION_OPEN, EXPANSION_CLOSED, u.tension);

    let mut out = pos * (1.0 + breathe) * expansion + center_dir * turbulence_noise * turbulence;

    out += center_dir * (1.0 + v.randomness) * u.explosion * BLAST_STRENGTH;
    out.y -= trail * TRAIL_GRAVITY * (1.0 - u.tension);
    out
}

/// Linear fade along the trail: the lead copy is opaque.
#[inline]
pub fn trail_alpha(trail_index: u32, trail_length: usize) -> f32 {
    if trail_length == 0 {
        return 1.0;
    }
    1.0 - trail_index as f32 / trail_length as f32
}

/// Perspective size attenuation: `base * scale * pixel_ratio / depth`.
#[inline]
pub fn point_size(scale: f32, view_depth: f32, pixel_ratio: f32) -> f32 {
    POINT_BASE_SIZE * scale * pixel_ratio / view_depth.max(CAMERA_ZNEAR)
}

/// Evaluates the transform for whole particle buffers.
#[derive(Clone, Debug)]
pub struct FieldEvolver {
    noise: NoiseField,
}

impl Default for FieldEvolver {
    fn default() -> Self {
        Self::new(NoiseField::unseeded())
    }
}

impl FieldEvolver {
    pub fn new(noise: NoiseField) -> Self {
        Self { noise }
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Evolve every vertex into `out`, reusing its allocation.
    ///
    /// `model_view` maps model space to view space and only feeds the size
    /// attenuation; positions stay in model space.
    pub fn evolve_into(
        &self,
        particles: &ParticleBuffers,
        state: &FieldState,
        model_view: &Mat4,
        pixel_ratio: f32,
        out: &mut Vec<EvolvedVertex>,
    ) {
        let uniforms = FieldUniforms::from(state);
        let trail_length = particles.trail_length();
        out.clear();
        out.reserve(particles.len());
        let attrs = particles
            .target_positions
            .iter()
            .zip(&particles.randomness)
            .zip(&particles.scale)
            .zip(&particles.trail_index);
        for (((&target, &randomness), &scale), &trail_index) in attrs {
            let input = VertexInput {
                target,
                randomness,
                trail_index,
            };
            let position = evolve_position(&self.noise, &input, &uniforms);
            let depth = -model_view.transform_point3(position).z;
            out.push(EvolvedVertex {
                position,
                size: point_size(scale, depth, pixel_ratio),
                alpha: trail_alpha(trail_index, trail_length),
            });
        }
    }
}
