//! Fragment stage of the particle sprites.
//!
//! The WGSL shader evaluates the same formulas per pixel; these functions are
//! the host-side reference used to keep the two in agreement.

use glam::Vec3;

use crate::constants::{CORE_WHITE_MIX, FLASH_MIX, SPRITE_FALLOFF};

/// Glow strength at `dist` from the sprite centre, where the sprite spans
/// `-0.5..=0.5`. Returns `None` for discarded fragments outside the disk.
#[inline]
pub fn sprite_strength(dist: f32) -> Option<f32> {
    if !(0.0..=0.5).contains(&dist) {
        return None;
    }
    Some((1.0 - dist * 2.0).powf(SPRITE_FALLOFF))
}

/// Theme colour pushed toward white while an explosion is active.
#[inline]
pub fn flash_color(theme: Vec3, explosion: f32) -> Vec3 {
    theme.lerp(Vec3::ONE, explosion * FLASH_MIX)
}

/// Straight (non-premultiplied) RGBA of one sprite fragment.
pub fn sprite_fragment(theme: Vec3, explosion: f32, dist: f32, alpha: f32) -> Option<[f32; 4]> {
    let strength = sprite_strength(dist)?;
    let rgb = flash_color(theme, explosion).lerp(Vec3::ONE, strength * CORE_WHITE_MIX);
    Some([rgb.x, rgb.y, rgb.z, strength * alpha])
}
