use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use zen_core::constants::{TRAIL_GRAVITY, TRAIL_LAG_SEC};
use zen_core::evolver::*;
use zen_core::shading::{flash_color, sprite_fragment, sprite_strength};
use zen_core::{sample_shape, Camera, FieldState, ParticleBuffers, Shape};

fn noise() -> NoiseField {
    NoiseField::new(42)
}

fn uniforms(time: f32, tension: f32, explosion: f32) -> FieldUniforms {
    FieldUniforms {
        time,
        tension,
        explosion,
    }
}

fn vertex(target: Vec3, trail_index: u32) -> VertexInput {
    VertexInput {
        target,
        randomness: 0.0,
        trail_index,
    }
}

#[test]
fn noise_is_continuous_and_unit_range() {
    let n = noise();
    let mut p = Vec3::new(-3.0, 0.5, 1.0);
    let mut prev = n.sample(p);
    for _ in 0..1000 {
        p += Vec3::splat(0.001);
        let v = n.sample(p);
        assert!((-1.0..=1.0).contains(&v));
        assert!((v - prev).abs() < 0.05, "noise jumped");
        prev = v;
    }
}

#[test]
fn target_at_origin_stays_finite() {
    let n = noise();
    for explosion in [0.0, 1.0] {
        for tension in [0.0, 0.5, 1.0] {
            let out = evolve_position(&n, &vertex(Vec3::ZERO, 3), &uniforms(2.0, tension, explosion));
            assert!(out.is_finite(), "NaN at tension {tension} explosion {explosion}");
        }
    }
}

#[test]
fn open_hand_expands_and_fist_contracts() {
    let n = noise();
    let target = Vec3::new(0.0, 0.0, 2.0);
    for time in [0.0, 1.3, 7.9] {
        let open = evolve_position(&n, &vertex(target, 0), &uniforms(time, 0.0, 0.0));
        let closed = evolve_position(&n, &vertex(target, 0), &uniforms(time, 1.0, 0.0));
        // |target| = 2: open scales by 2.5 with +-10% breathing and 0.5 turbulence
        assert!((4.0..=6.0).contains(&open.length()), "open {}", open.length());
        // closed: repulsion up to 0.8, scale 0.5, turbulence 0.1
        assert!((0.8..=1.65).contains(&closed.length()), "closed {}", closed.length());
    }
}

#[test]
fn explosion_blasts_outward_along_the_target() {
    let n = noise();
    let target = Vec3::new(1.0, 1.0, 0.0);
    let dir = target.normalize();
    for time in [0.2, 3.0] {
        let calm = evolve_position(&n, &vertex(target, 0), &uniforms(time, 1.0, 0.0));
        let blast = evolve_position(&n, &vertex(target, 0), &uniforms(time, 1.0, 1.0));
        assert!(blast.dot(dir) - calm.dot(dir) > 3.0);
    }
}

#[test]
fn trail_copies_lag_in_time_and_sag() {
    let n = noise();
    let target = Vec3::new(0.3, -1.2, 0.8);
    let time = 5.0;
    let tension = 0.25;
    for k in 1..5u32 {
        let lagged = evolve_position(&n, &vertex(target, k), &uniforms(time, tension, 0.0));
        let lead_then = evolve_position(
            &n,
            &vertex(target, 0),
            &uniforms(time - k as f32 * TRAIL_LAG_SEC, tension, 0.0),
        );
        let sag = k as f32 * TRAIL_GRAVITY * (1.0 - tension);
        assert!((lagged.x - lead_then.x).abs() < 1e-4);
        assert!((lagged.z - lead_then.z).abs() < 1e-4);
        assert!((lead_then.y - lagged.y - sag).abs() < 1e-4);
    }
}

#[test]
fn same_seed_same_field() {
    let a = NoiseField::new(7);
    let b = NoiseField::new(7);
    let v = VertexInput {
        target: Vec3::new(1.0, 2.0, -0.5),
        randomness: 0.37,
        trail_index: 2,
    };
    let u = uniforms(4.2, 0.6, 0.3);
    assert_eq!(evolve_position(&a, &v, &u), evolve_position(&b, &v, &u));
}

#[test]
fn alpha_fades_linearly_along_the_trail() {
    assert_eq!(trail_alpha(0, 5), 1.0);
    assert!((trail_alpha(1, 5) - 0.8).abs() < 1e-6);
    assert!((trail_alpha(4, 5) - 0.2).abs() < 1e-6);
    assert_eq!(trail_alpha(0, 0), 1.0);
}

#[test]
fn point_size_attenuates_with_depth() {
    let near = point_size(1.0, 4.0, 1.0);
    let far = point_size(1.0, 8.0, 1.0);
    assert!((near - 10.0).abs() < 1e-5);
    assert!((far - 5.0).abs() < 1e-5);
    assert!((point_size(1.0, 4.0, 2.0) - 20.0).abs() < 1e-5);
    // behind the camera is clamped rather than negative
    assert!(point_size(1.0, -3.0, 1.0) > 0.0);
}

#[test]
fn evolve_into_fills_one_vertex_per_trail_copy() {
    let mut rng = StdRng::seed_from_u64(11);
    let pts = sample_shape(Shape::Sphere, 300, 2.0, &mut rng);
    let particles = ParticleBuffers::expand(&pts, 5, &mut rng);
    let evolver = FieldEvolver::new(noise());
    let camera = Camera::new(16.0 / 9.0);
    let mut state = FieldState::new();
    state.update(0.5, &Default::default());

    let mut out = vec![EvolvedVertex::default(); 3];
    evolver.evolve_into(&particles, &state, &camera.view_matrix(), 1.0, &mut out);
    assert_eq!(out.len(), particles.len());
    for (v, &t) in out.iter().zip(&particles.trail_index) {
        assert!(v.position.is_finite());
        assert!(v.size.is_finite() && v.size > 0.0);
        assert_eq!(v.alpha, trail_alpha(t, 5));
    }

    // buffer is reused, not appended to
    evolver.evolve_into(&particles, &state, &Mat4::IDENTITY, 1.0, &mut out);
    assert_eq!(out.len(), particles.len());
}

#[test]
fn sprite_is_a_soft_disk() {
    assert_eq!(sprite_strength(0.0), Some(1.0));
    assert_eq!(sprite_strength(0.5), Some(0.0));
    assert_eq!(sprite_strength(0.51), None);
    let half = sprite_strength(0.25).unwrap_or_default();
    assert!((half - 0.5_f32.powf(1.5)).abs() < 1e-6);
}

#[test]
fn explosion_flashes_toward_white() {
    let theme = Vec3::new(0.0, 0.5, 1.0);
    assert_eq!(flash_color(theme, 0.0), theme);
    let flashed = flash_color(theme, 1.0);
    assert!(flashed.abs_diff_eq(Vec3::new(0.8, 0.9, 1.0), 1e-6));

    let edge = sprite_fragment(theme, 0.0, 0.5, 1.0).unwrap_or_default();
    assert_eq!(edge[3], 0.0);
    let centre = sprite_fragment(theme, 0.0, 0.0, 0.5).unwrap_or_default();
    assert!((centre[0] - 0.5).abs() < 1e-6);
    assert!((centre[3] - 0.5).abs() < 1e-6);
    assert!(sprite_fragment(theme, 0.0, 0.7, 1.0).is_none());
}
