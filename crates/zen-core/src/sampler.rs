//! Shape sampler: point clouds drawn from each shape's surface or volume.
//!
//! Every branch is independent and draws from the supplied random source, so
//! callers that need repeatable output pass a seeded RNG. Nothing here keeps
//! state between calls.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::config::Shape;

// Saturn: share of points on the ring and its radial band (multiples of radius)
pub const SATURN_RING_SHARE: f32 = 0.6;
pub const SATURN_RING_INNER: f32 = 1.2;
pub const SATURN_RING_OUTER: f32 = 2.0;
pub const SATURN_RING_THICKNESS: f32 = 0.1;
pub const SATURN_PLANET_RADIUS: f32 = 0.6;

// Buddha: cumulative part weights (head 20%, body 50%, base 30%)
const BUDDHA_HEAD_CUTOFF: f32 = 0.2;
const BUDDHA_BODY_CUTOFF: f32 = 0.7;

// Fireworks radial range (multiples of radius)
pub const FIREWORKS_MIN: f32 = 0.1;
pub const FIREWORKS_SPAN: f32 = 2.0;

/// Sample `count` points from `shape` scaled by `radius`.
pub fn sample_shape<R: Rng + ?Sized>(
    shape: Shape,
    count: usize,
    radius: f32,
    rng: &mut R,
) -> Vec<Vec3> {
    (0..count)
        .map(|i| match shape {
            Shape::Sphere => sphere_volume(radius, rng),
            Shape::Heart => heart(radius, rng),
            Shape::Flower => flower(i, radius),
            Shape::Saturn => saturn(radius, rng),
            Shape::Buddha => buddha(radius, rng),
            Shape::Fireworks => fireworks(radius, rng),
        })
        .collect()
}

/// Sample with the thread-local RNG.
pub fn sample_shape_random(shape: Shape, count: usize, radius: f32) -> Vec<Vec3> {
    sample_shape(shape, count, radius, &mut rand::thread_rng())
}

/// Uniform direction on the unit sphere. `acos(2u - 1)` avoids pole clustering.
#[inline]
fn unit_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (rng.gen::<f32>() * 2.0 - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

fn sphere_volume<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let dir = unit_direction(rng);
    dir * radius * rng.gen::<f32>().cbrt()
}

fn heart<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let t = rng.gen::<f32>() * TAU;
    let unit = radius * 0.1;
    let thickness = (rng.gen::<f32>() - 0.5) * radius * 0.5;
    let x = 16.0 * t.sin().powi(3);
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    Vec3::new(x * unit, y * unit, thickness)
}

/// Phyllotaxis spiral bent into a cup; depends only on the point index.
fn flower(index: usize, radius: f32) -> Vec3 {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let r = radius * 0.05 * (index as f32).sqrt();
    let theta = index as f32 * golden_angle;
    Vec3::new(r * theta.cos(), r.sqrt() * 1.5 - radius, r * theta.sin())
}

fn saturn<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    if rng.gen::<f32>() < SATURN_RING_SHARE {
        let angle = rng.gen::<f32>() * TAU;
        let span = SATURN_RING_OUTER - SATURN_RING_INNER;
        let dist = radius * (SATURN_RING_INNER + rng.gen::<f32>() * span);
        let y = (rng.gen::<f32>() - 0.5) * SATURN_RING_THICKNESS;
        Vec3::new(dist * angle.cos(), y, dist * angle.sin())
    } else {
        sphere_volume(radius * SATURN_PLANET_RADIUS, rng)
    }
}

fn buddha<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let part = rng.gen::<f32>();
    if part < BUDDHA_HEAD_CUTOFF {
        unit_direction(rng) * radius * 0.35 + Vec3::Y * radius * 0.6
    } else if part < BUDDHA_BODY_CUTOFF {
        // ellipsoid stretched along Y
        let dir = unit_direction(rng);
        let r = radius * 0.6;
        Vec3::new(dir.x * r, dir.y * r * 1.2 - radius * 0.2, dir.z * r)
    } else {
        // torus section under the body
        let u = rng.gen::<f32>() * TAU;
        let v = rng.gen::<f32>() * TAU;
        let ring = radius * 0.5;
        let tube = radius * 0.2;
        let reach = ring + tube * v.cos();
        Vec3::new(
            reach * u.cos(),
            tube * v.sin() - radius * 0.8,
            reach * u.sin(),
        )
    }
}

fn fireworks<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let dir = unit_direction(rng);
    dir * radius * (FIREWORKS_MIN + rng.gen::<f32>() * FIREWORKS_SPAN)
}
