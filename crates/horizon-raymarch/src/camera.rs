//! Screen mapping and the orbiting look-at camera.

use glam::{Vec2, Vec3};

use crate::config::CameraConfig;

/// World up axis used to build the camera basis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Maps a `uv` in `[0, 1]²` to centred, aspect-corrected screen coordinates.
///
/// The vertical axis spans `[-1, 1]`; the horizontal axis is widened by the
/// aspect ratio, so the result depends only on the ratio of `resolution`.
pub fn screen_coords(uv: Vec2, resolution: Vec2) -> Vec2 {
    let aspect = resolution.x / resolution.y;
    (uv - 0.5) * 2.0 * Vec2::new(aspect, 1.0)
}

/// Orthonormal camera basis at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub origin: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub focal_length: f32,
}

impl CameraFrame {
    /// Camera on its orbit at `animation_time`, looking at the origin.
    pub fn orbit(config: &CameraConfig, animation_time: f32) -> Self {
        let angle = animation_time * config.orbit_rate;
        let origin = Vec3::new(
            config.distance * angle.cos(),
            config.height(),
            config.distance * angle.sin(),
        );
        let forward = (Vec3::ZERO - origin).normalize();
        let right = forward.cross(WORLD_UP).normalize();
        let up = right.cross(forward);
        Self {
            origin,
            forward,
            right,
            up,
            focal_length: config.focal_length,
        }
    }

    /// Normalised primary ray direction through screen point `p`.
    pub fn ray_direction(&self, p: Vec2) -> Vec3 {
        (p.x * self.right + p.y * self.up + self.focal_length * self.forward).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaymarchConfig;
    use crate::mode::SceneMode;

    #[test]
    fn test_screen_center_maps_to_origin() {
        let p = screen_coords(Vec2::splat(0.5), Vec2::new(1920.0, 1080.0));
        assert_eq!(p, Vec2::ZERO);
    }

    #[test]
    fn test_screen_coords_aspect_corrected() {
        let p = screen_coords(Vec2::new(1.0, 1.0), Vec2::new(200.0, 100.0));
        assert!((p.x - 2.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_coords_scale_invariant() {
        let sizes = [(1u32, 1u32), (3, 7), (640, 480), (1920, 1080), (4096, 17)];
        for (w, h) in sizes {
            let base = Vec2::new(w as f32, h as f32);
            for i in 0..=10 {
                for j in 0..=10 {
                    let uv = Vec2::new(i as f32 / 10.0, j as f32 / 10.0);
                    let a = screen_coords(uv, base);
                    let b = screen_coords(uv, base * 2.0);
                    assert!(
                        (a - b).length() < 1e-6,
                        "doubling {w}x{h} changed {uv}: {a} vs {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_camera_basis_is_orthonormal() {
        for mode in SceneMode::ALL {
            let config = RaymarchConfig::for_mode(mode).camera;
            for t in [0.0_f32, 1.0, 17.5, 300.0] {
                let frame = CameraFrame::orbit(&config, t);
                assert!((frame.forward.length() - 1.0).abs() < 1e-5);
                assert!((frame.right.length() - 1.0).abs() < 1e-5);
                assert!((frame.up.length() - 1.0).abs() < 1e-5);
                assert!(frame.forward.dot(frame.right).abs() < 1e-5);
                assert!(frame.forward.dot(frame.up).abs() < 1e-5);
                assert!(frame.right.dot(frame.up).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_camera_starts_on_positive_x() {
        let config = RaymarchConfig::black_hole().camera;
        let frame = CameraFrame::orbit(&config, 0.0);
        assert!((frame.origin - Vec3::new(11.0, 1.1, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_center_ray_looks_at_origin() {
        let config = RaymarchConfig::agn().camera;
        let frame = CameraFrame::orbit(&config, 3.0);
        let dir = frame.ray_direction(Vec2::ZERO);
        let to_origin = (-frame.origin).normalize();
        assert!((dir - to_origin).length() < 1e-5);
    }
}
