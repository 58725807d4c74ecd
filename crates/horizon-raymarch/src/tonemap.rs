//! Exponential tone mapping and the optional contrast curve.

use glam::Vec3;

/// Maps unbounded radiance into `[0, 1)` with `1 - exp(-x·exposure)`.
pub fn tone_map(color: Vec3, exposure: f32) -> Vec3 {
    Vec3::ONE - (-color * exposure).exp()
}

/// Component-wise power curve applied before tone mapping.
pub fn apply_contrast(color: Vec3, power: f32) -> Vec3 {
    color.powf(power)
}
