//! Trail expansion: every base particle becomes a short chain of copies.
//!
//! Vertex `i * trail_length + t` is trail slot `t` of base particle `i`. All
//! copies of one base particle share its target position and randomness; only
//! the trail-index-derived size differs.

use glam::Vec3;
use rand::Rng;

use crate::constants::{BASE_SCALE_MIN, BASE_SCALE_SPAN, TRAIL_SCALE_FLOOR, TRAIL_SCALE_STEP};

/// Size multiplier applied to trail slot `trail_index`.
///
/// Falls linearly by `TRAIL_SCALE_STEP` per slot. Slots that would drop to or
/// below `TRAIL_SCALE_FLOOR` start at the floor and halve from there, so the
/// multiplier stays positive and strictly decreasing for any trail length.
#[inline]
pub fn trail_scale_multiplier(trail_index: usize) -> f32 {
    let linear = 1.0 - TRAIL_SCALE_STEP * trail_index as f32;
    if linear > TRAIL_SCALE_FLOOR {
        return linear;
    }
    let first_floored = ((1.0 - TRAIL_SCALE_FLOOR) / TRAIL_SCALE_STEP).ceil() as usize;
    let halvings = trail_index.saturating_sub(first_floored).min(i32::MAX as usize) as i32;
    TRAIL_SCALE_FLOOR * 0.5_f32.powi(halvings)
}

/// Per-vertex attribute arrays for the whole field.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleBuffers {
    pub target_positions: Vec<Vec3>,
    pub randomness: Vec<f32>,
    pub scale: Vec<f32>,
    pub trail_index: Vec<u32>,
    base_count: usize,
    trail_length: usize,
}

impl ParticleBuffers {
    /// Expand `base_points` into `base_points.len() * trail_length` vertices,
    /// drawing a fresh randomness seed and base size for every base particle.
    pub fn expand<R: Rng + ?Sized>(base_points: &[Vec3], trail_length: usize, rng: &mut R) -> Self {
        let base_count = base_points.len();
        let total = base_count * trail_length;
        let mut target_positions = Vec::with_capacity(total);
        let mut randomness = Vec::with_capacity(total);
        let mut scale = Vec::with_capacity(total);
        let mut trail_index = Vec::with_capacity(total);

        for &point in base_points {
            let seed: f32 = rng.gen();
            let base_scale = BASE_SCALE_MIN + rng.gen::<f32>() * BASE_SCALE_SPAN;
            for t in 0..trail_length {
                target_positions.push(point);
                randomness.push(seed);
                scale.push(base_scale * trail_scale_multiplier(t));
                trail_index.push(t as u32);
            }
        }

        Self {
            target_positions,
            randomness,
            scale,
            trail_index,
            base_count,
            trail_length,
        }
    }

    /// Rewrite target positions in place for a new shape.
    ///
    /// Randomness, scale and trail indices stay untouched. If fewer points than
    /// base particles are supplied, the remaining particles keep their old
    /// targets; extra points are ignored.
    pub fn retarget(&mut self, base_points: &[Vec3]) {
        if base_points.len() != self.base_count {
            log::warn!(
                "retarget: {} points for {} base particles",
                base_points.len(),
                self.base_count
            );
        }
        let trail_length = self.trail_length;
        for (chain, &point) in self
            .target_positions
            .chunks_mut(trail_length.max(1))
            .zip(base_points)
        {
            chain.fill(point);
        }
    }

    pub fn base_count(&self) -> usize {
        self.base_count
    }

    pub fn trail_length(&self) -> usize {
        self.trail_length
    }

    /// Total number of trail copies.
    pub fn len(&self) -> usize {
        self.target_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target_positions.is_empty()
    }

    /// Target position of base particle `base_index`.
    pub fn base_target(&self, base_index: usize) -> Option<Vec3> {
        self.target_positions
            .get(base_index * self.trail_length)
            .copied()
    }
}
