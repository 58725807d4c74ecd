//! Scalar and vector helpers with WGSL builtin semantics.
//!
//! `glam` and `std` follow Rust conventions (e.g. `fract` relative to `trunc`),
//! so the shading code uses these instead to stay bit-compatible in spirit with
//! the fragment program.

use glam::Vec3;

/// WGSL `fract`: `x - floor(x)`, always in `[0, 1)` for finite input.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Component-wise WGSL `fract`.
#[inline]
pub fn fract3(v: Vec3) -> Vec3 {
    v - v.floor()
}

/// WGSL `smoothstep`. Reversed edges (`edge0 > edge1`) produce a falling ramp.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// WGSL scalar `mix`.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// WGSL vector `mix` with a scalar blend factor.
#[inline]
pub fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fract_is_floor_based() {
        assert!((fract(1.25) - 0.25).abs() < 1e-6);
        // Negative inputs wrap upward, unlike `f32::fract`.
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert_eq!(fract(3.0), 0.0);
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_reversed_edges_fall() {
        assert_eq!(smoothstep(4.0, 0.0, 0.0), 1.0);
        assert_eq!(smoothstep(4.0, 0.0, 5.0), 0.0);
        assert!(smoothstep(4.0, 0.0, 1.0) > smoothstep(4.0, 0.0, 3.0));
    }

    #[test]
    fn test_mix_interpolates() {
        assert_eq!(mix(2.0, 4.0, 0.0), 2.0);
        assert_eq!(mix(2.0, 4.0, 1.0), 4.0);
        let v = mix3(Vec3::ZERO, Vec3::ONE, 0.25);
        assert!((v - Vec3::splat(0.25)).length() < 1e-6);
    }
}
