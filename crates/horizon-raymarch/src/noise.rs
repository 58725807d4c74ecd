//! Deterministic value-noise field library.
//!
//! CPU mirror of the `hash`/`noise`/`fbm`/`warp` functions in [`COMMON_WGSL`](crate::COMMON_WGSL).
//! All functions are pure and branch-free, so every pixel can evaluate them
//! independently.

use glam::Vec3;

use crate::math::{fract, fract3, mix};

/// Number of octaves summed by [`fbm`].
pub const FBM_OCTAVES: usize = 5;

/// Amplitude of the first [`fbm`] octave; each following octave halves it.
pub const FBM_BASE_AMPLITUDE: f32 = 0.5;

/// Phase offsets for the second and third [`warp`] displacement channels.
pub const WARP_OFFSET_Y: Vec3 = Vec3::new(5.2, 1.3, 2.8);
pub const WARP_OFFSET_Z: Vec3 = Vec3::new(1.8, 9.2, 5.5);

/// Displacement strength applied to the warp offset vector.
pub const WARP_STRENGTH: f32 = 4.0;

/// Maps a point to a pseudo-random value in `[0, 1)`.
///
/// Fractional-part hash without trigonometry, so it has no visible period at
/// the scales the scenes sample it.
pub fn hash(p: Vec3) -> f32 {
    let mut p3 = fract3(p * 0.1031);
    let yzx = Vec3::new(p3.y, p3.z, p3.x);
    p3 += Vec3::splat(p3.dot(yzx + 33.33));
    fract((p3.x + p3.y) * p3.z)
}

/// Trilinear value noise over the integer lattice with a `3t² - 2t³` kernel.
pub fn noise(p: Vec3) -> f32 {
    let i = p.floor();
    let f = fract3(p);
    let u = f * f * (Vec3::splat(3.0) - 2.0 * f);

    let corner = |x: f32, y: f32, z: f32| hash(i + Vec3::new(x, y, z));

    mix(
        mix(
            mix(corner(0.0, 0.0, 0.0), corner(1.0, 0.0, 0.0), u.x),
            mix(corner(0.0, 1.0, 0.0), corner(1.0, 1.0, 0.0), u.x),
            u.y,
        ),
        mix(
            mix(corner(0.0, 0.0, 1.0), corner(1.0, 0.0, 1.0), u.x),
            mix(corner(0.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), u.x),
            u.y,
        ),
        u.z,
    )
}

/// Five octaves of [`noise`] at doubling frequency and halving amplitude.
///
/// The result lies in `[0, 0.96875)`.
pub fn fbm(p: Vec3) -> f32 {
    let mut value = 0.0;
    let mut amplitude = FBM_BASE_AMPLITUDE;
    let mut st = p;
    for _ in 0..FBM_OCTAVES {
        value += amplitude * noise(st);
        st *= 2.0;
        amplitude *= 0.5;
    }
    value
}

/// Domain-warped fbm: displaces `p` by three phase-shifted fbm samples and
/// evaluates fbm again at the displaced point.
pub fn warp(p: Vec3) -> f32 {
    let q = Vec3::new(fbm(p), fbm(p + WARP_OFFSET_Y), fbm(p + WARP_OFFSET_Z));
    fbm(p + WARP_STRENGTH * q)
}
