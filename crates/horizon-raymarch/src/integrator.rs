//! CPU reference integrator.
//!
//! Follows the fragment program in [`RAYMARCH_WGSL`](crate::RAYMARCH_WGSL)
//! step for step: deflect, accumulate features, advance, then test for escape.
//! The renderer never calls this per pixel; it exists so the march can be
//! inspected and tested without a GPU.

use glam::{Mat3, Vec2, Vec3};

use crate::camera::{CameraFrame, screen_coords};
use crate::config::{
    CoreConfig, DiskConfig, GlowConfig, GravityConfig, JetConfig, NebulaDisk, PhotonRingConfig,
    RaymarchConfig, StarFieldConfig, TorusConfig, TurbulentDisk,
};
use crate::math::{mix3, smoothstep};
use crate::noise::{fbm, noise, warp};
use crate::tonemap::{apply_contrast, tone_map};

/// Position and direction of a ray during the march.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayState {
    pub position: Vec3,
    pub direction: Vec3,
}

/// How a march ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Fell inside the event horizon; accumulated radiance is discarded.
    Captured,
    /// Left the scene and picked up a star-field sample.
    Escaped,
    /// Ran out of steps; whatever was accumulated is kept.
    BudgetExhausted,
}

/// State observed at the end of one march step.
#[derive(Clone, Copy, Debug)]
pub struct StepSample {
    pub step: u32,
    /// Distance from the centre before the ray advanced.
    pub radius: f32,
    /// Ray after deflection and advance.
    pub ray: RayState,
    pub radiance: Vec3,
    pub glow: f32,
}

/// Result of marching one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchOutcome {
    pub termination: Termination,
    /// Number of steps taken, including the terminating one.
    pub steps: u32,
    /// Accumulated feature radiance, before glow and tone mapping.
    pub radiance: Vec3,
    pub glow: f32,
    /// Star-field sample picked up on escape.
    pub star: Option<f32>,
}

impl MarchOutcome {
    /// Radiance with the glow halo added, before the tone curve.
    pub fn composite(&self, glow: Option<&GlowConfig>) -> Vec3 {
        match glow {
            Some(glow) => self.radiance + glow.color * self.glow * glow.scale,
            None => self.radiance,
        }
    }

    /// Final display color in `[0, 1)`.
    pub fn color(&self, config: &RaymarchConfig) -> Vec3 {
        let mut color = self.composite(config.glow.as_ref());
        if let Some(power) = config.tone.contrast {
            color = apply_contrast(color, power);
        }
        tone_map(color, config.tone.exposure)
    }
}

/// Rotation applied to march positions for tilted scenes.
fn tilt_matrix(angle: f32) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::from_cols(Vec3::new(c, -s, 0.0), Vec3::new(s, c, 0.0), Vec3::Z)
}

/// Marches `ray` through the scene.
///
/// `view` is the camera forward axis (used for Doppler beaming) and
/// `animation_time` is shader time already scaled by the camera's time scale.
/// `observer` sees every completed step.
pub fn march<F>(
    config: &RaymarchConfig,
    ray: RayState,
    view: Vec3,
    animation_time: f32,
    mut observer: F,
) -> MarchOutcome
where
    F: FnMut(&StepSample),
{
    let step_size = config.march.step_size;
    let tilt = config.camera.tilt.map(tilt_matrix);
    let (disk_inner, disk_outer) = config.disk_radii();

    let mut ray = ray;
    let mut radiance = Vec3::ZERO;
    let mut glow = 0.0_f32;

    for step in 0..config.march.steps {
        let pos = match tilt {
            Some(m) => m * ray.position,
            None => ray.position,
        };
        let r = pos.length();

        if let Some(gravity) = &config.gravity {
            if r < gravity.event_horizon() {
                return MarchOutcome {
                    termination: Termination::Captured,
                    steps: step + 1,
                    radiance: Vec3::ZERO,
                    glow,
                    star: None,
                };
            }
            ray.direction = deflect(gravity, ray.direction, pos, r, step_size);
        }

        if let Some(core) = &config.core {
            radiance += core_emission(core, r, step_size);
        }
        if let (Some(ring), Some(gravity)) = (&config.photon_ring, &config.gravity) {
            radiance += photon_ring(ring, r - gravity.event_horizon());
        }
        if let Some(jet) = &config.jet {
            radiance += jet_emission(jet, pos, view, animation_time, step_size);
        }
        radiance += match &config.disk {
            DiskConfig::Turbulent(disk) => turbulent_disk(
                disk,
                pos,
                r,
                (disk_inner, disk_outer),
                animation_time,
                step_size,
            ),
            DiskConfig::Nebula(disk) => nebula_disk(disk, pos, r, animation_time, step_size),
        };
        if let Some(torus) = &config.torus {
            radiance = torus_absorb(torus, radiance, pos, r, disk_outer, step_size);
        }
        if let Some(halo) = &config.glow {
            glow += halo.intensity / (r * r + halo.softening);
        }

        ray.position += ray.direction * step_size;

        let escaped = r > config.march.escape_radius;
        let star = escaped.then(|| star_sample(&config.stars, ray.direction));
        if let Some(star) = star {
            radiance += Vec3::splat(star * config.stars.brightness);
        }

        observer(&StepSample {
            step,
            radius: r,
            ray,
            radiance,
            glow,
        });

        if escaped {
            return MarchOutcome {
                termination: Termination::Escaped,
                steps: step + 1,
                radiance,
                glow,
                star,
            };
        }
    }

    MarchOutcome {
        termination: Termination::BudgetExhausted,
        steps: config.march.steps,
        radiance,
        glow,
        star: None,
    }
}

/// Shades the pixel at `uv` for a frame at `time_seconds`.
pub fn shade_pixel(config: &RaymarchConfig, uv: Vec2, resolution: Vec2, time_seconds: f32) -> Vec3 {
    let animation_time = time_seconds * config.camera.time_scale;
    let frame = CameraFrame::orbit(&config.camera, animation_time);
    let ray = RayState {
        position: frame.origin,
        direction: frame.ray_direction(screen_coords(uv, resolution)),
    };
    march(config, ray, frame.forward, animation_time, |_| {}).color(config)
}

/// Bends `direction` toward the centre and renormalises it.
fn deflect(gravity: &GravityConfig, direction: Vec3, pos: Vec3, r: f32, step_size: f32) -> Vec3 {
    let force = (gravity.mass * gravity.lensing_strength) / (r * r + gravity.softening);
    (direction - pos.normalize() * force * step_size).normalize()
}

fn core_emission(core: &CoreConfig, r: f32, step_size: f32) -> Vec3 {
    let density = 1.0 / (r * r * core.concentration + core.softening);
    core.color * density * step_size * core.gain
}

fn photon_ring(ring: &PhotonRingConfig, dist_to_horizon: f32) -> Vec3 {
    if dist_to_horizon < ring.width && dist_to_horizon > 0.0 {
        ring.color * (ring.intensity / (dist_to_horizon + ring.intensity))
    } else {
        Vec3::ZERO
    }
}

fn jet_emission(jet: &JetConfig, pos: Vec3, view: Vec3, time: f32, step_size: f32) -> Vec3 {
    let dist_to_axis = Vec2::new(pos.x, pos.z).length();
    let along = pos.y.abs();
    if along >= jet.length || dist_to_axis >= jet.gate_radius(along) {
        return Vec3::ZERO;
    }

    let beaming = if jet.doppler != 0.0 {
        1.0 + jet.doppler * pos.normalize().dot(view)
    } else {
        1.0
    };
    let turbulence = fbm(pos * jet.turbulence_scale - Vec3::new(0.0, time * jet.flow_speed, 0.0));
    let structure = jet.noise_bias + jet.noise_gain * turbulence;
    let density = smoothstep(jet.profile_radius(along), 0.0, dist_to_axis)
        * structure
        * (-along * jet.falloff).exp();
    let color = jet.color + jet.color_noise * turbulence;
    color * density * step_size * beaming * jet.gain
}

fn turbulent_disk(
    disk: &TurbulentDisk,
    pos: Vec3,
    r: f32,
    (inner, outer): (f32, f32),
    time: f32,
    step_size: f32,
) -> Vec3 {
    let dist_to_plane = pos.y.abs();
    if dist_to_plane >= disk.half_thickness || r <= inner || r >= outer {
        return Vec3::ZERO;
    }

    let angle = pos.z.atan2(pos.x);
    let rotated = angle + time * (disk.spin / r.sqrt());
    let turbulence = warp(Vec3::new(r, rotated, pos.y) * disk.warp_scale);
    let rings = disk
        .ring_frequency
        .map_or(1.0, |frequency| 0.5 + 0.5 * (r * frequency).sin());

    let radial_fade = smoothstep(inner, inner + disk.inner_ramp, r)
        * (1.0 - smoothstep(outer - disk.outer_ramp, outer, r));
    let vertical_fade = 1.0 - smoothstep(0.0, disk.vertical_falloff, dist_to_plane);
    let density = turbulence * rings * radial_fade * vertical_fade * disk.density_scale;

    let temperature = (outer - r) / (outer - inner);
    let color = mix3(
        disk.outer_color,
        disk.inner_color,
        temperature.powf(disk.temperature_exponent),
    ) + Vec3::splat(temperature * disk.white_point);
    color * density * step_size * disk.gain
}

fn nebula_disk(disk: &NebulaDisk, pos: Vec3, r: f32, time: f32, step_size: f32) -> Vec3 {
    let dist_to_plane = pos.y.abs();
    if dist_to_plane >= disk.half_thickness || r >= disk.radius {
        return Vec3::ZERO;
    }

    let angle = pos.z.atan2(pos.x);
    let spiral = angle + r * disk.twist + time * disk.spin;
    let swirl = Vec3::new(
        (spiral * disk.arms).sin(),
        pos.y * disk.vertical_swirl,
        (spiral * disk.arms).cos(),
    );
    let cloud = fbm(pos * disk.noise_scale + swirl + Vec3::new(0.0, time, 0.0));
    let density = smoothstep(disk.half_thickness, 0.0, dist_to_plane)
        * smoothstep(disk.radius, disk.core_radius, r)
        * cloud;

    let palette = (r / disk.palette_radius).clamp(0.0, 1.0);
    let color = mix3(disk.inner_color, disk.outer_color, palette);
    color * density * step_size * disk.gain
}

/// Blends accumulated radiance toward the dust color inside the torus band.
fn torus_absorb(
    torus: &TorusConfig,
    radiance: Vec3,
    pos: Vec3,
    r: f32,
    disk_outer: f32,
    step_size: f32,
) -> Vec3 {
    if r <= disk_outer || r >= disk_outer * torus.extent || pos.y.abs() >= r * torus.opening {
        return radiance;
    }
    let density = fbm(pos * torus.noise_scale) * torus.density;
    mix3(radiance, torus.color, density * step_size * torus.absorption)
}

fn star_sample(stars: &StarFieldConfig, direction: Vec3) -> f32 {
    noise(direction * stars.frequency).powf(stars.sharpness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::SceneMode;

    fn pixel_grid() -> impl Iterator<Item = Vec2> {
        (0..8).flat_map(|i| (0..6).map(move |j| Vec2::new(i as f32 / 7.0, j as f32 / 5.0)))
    }

    fn primary_ray(config: &RaymarchConfig, uv: Vec2, time_seconds: f32) -> (RayState, Vec3, f32) {
        let animation_time = time_seconds * config.camera.time_scale;
        let frame = CameraFrame::orbit(&config.camera, animation_time);
        let direction = frame.ray_direction(screen_coords(uv, Vec2::new(1280.0, 720.0)));
        (
            RayState {
                position: frame.origin,
                direction,
            },
            frame.forward,
            animation_time,
        )
    }

    #[test]
    fn test_direction_stays_unit_length() {
        for mode in SceneMode::ALL {
            let config = RaymarchConfig::for_mode(mode);
            for uv in pixel_grid() {
                let (ray, view, t) = primary_ray(&config, uv, 12.0);
                march(&config, ray, view, t, |sample| {
                    let len = sample.ray.direction.length();
                    assert!(
                        (len - 1.0).abs() < 1e-4,
                        "{mode} step {}: |direction| = {len}",
                        sample.step
                    );
                });
            }
        }
    }

    #[test]
    fn test_accumulators_non_negative() {
        for mode in SceneMode::ALL {
            let config = RaymarchConfig::for_mode(mode);
            for uv in pixel_grid() {
                let (ray, view, t) = primary_ray(&config, uv, 40.0);
                let mut previous_glow = 0.0_f32;
                march(&config, ray, view, t, |sample| {
                    assert!(
                        sample.radiance.min_element() >= 0.0,
                        "{mode} step {}: negative radiance {}",
                        sample.step,
                        sample.radiance
                    );
                    assert!(sample.glow >= previous_glow, "{mode}: glow decreased");
                    previous_glow = sample.glow;
                });
            }
        }
    }

    #[test]
    fn test_center_ray_is_captured() {
        let config = RaymarchConfig::black_hole();
        let frame = CameraFrame::orbit(&config.camera, 0.0);
        let ray = RayState {
            position: frame.origin,
            direction: (-frame.origin).normalize(),
        };
        let outcome = march(&config, ray, frame.forward, 0.0, |_| {});
        assert_eq!(outcome.termination, Termination::Captured);
        assert!(outcome.steps <= config.march.steps);
        assert_eq!(outcome.radiance, Vec3::ZERO);
        assert!(outcome.star.is_none());
    }

    #[test]
    fn test_outward_ray_escapes_with_bounded_star() {
        for mode in [SceneMode::BlackHole, SceneMode::Agn] {
            let config = RaymarchConfig::for_mode(mode);
            let start = Vec3::new(0.0, 0.0, config.march.escape_radius + 5.0);
            let ray = RayState {
                position: start,
                direction: Vec3::Z,
            };
            let outcome = march(&config, ray, -Vec3::Z, 0.0, |_| {});
            assert_eq!(outcome.termination, Termination::Escaped, "{mode}");
            assert_eq!(outcome.steps, 1);
            let star = outcome.star.expect("escaped rays sample the star field");
            assert!((0.0..=1.0).contains(&star));
            assert!(outcome.radiance.min_element() >= 0.0);
            assert!(outcome.radiance.max_element() <= 1.0);
        }
    }

    #[test]
    fn test_far_away_never_captures() {
        let config = RaymarchConfig::far_away();
        for uv in pixel_grid() {
            let (ray, view, t) = primary_ray(&config, uv, 5.0);
            let outcome = march(&config, ray, view, t, |_| {});
            assert_ne!(outcome.termination, Termination::Captured);
        }
    }

    #[test]
    fn test_budget_exhaustion_keeps_radiance() {
        let mut config = RaymarchConfig::far_away();
        config.march.steps = 3;
        let (ray, view, t) = primary_ray(&config, Vec2::splat(0.5), 0.0);
        let outcome = march(&config, ray, view, t, |_| {});
        assert_eq!(outcome.termination, Termination::BudgetExhausted);
        assert_eq!(outcome.steps, 3);
        // The core always emits, so three steps leave some light behind.
        assert!(outcome.radiance.max_element() > 0.0);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let config = RaymarchConfig::black_hole();
        let (ray, view, t) = primary_ray(&config, Vec2::new(0.05, 0.95), 0.0);
        let mut seen = 0u32;
        let outcome = march(&config, ray, view, t, |sample| {
            assert_eq!(sample.step, seen);
            seen += 1;
        });
        match outcome.termination {
            // The capturing step returns before the observer runs.
            Termination::Captured => assert_eq!(seen + 1, outcome.steps),
            _ => assert_eq!(seen, outcome.steps),
        }
    }

    #[test]
    fn test_shaded_pixels_are_displayable() {
        for mode in SceneMode::ALL {
            let config = RaymarchConfig::for_mode(mode);
            for uv in pixel_grid() {
                let color = shade_pixel(&config, uv, Vec2::new(800.0, 600.0), 7.5);
                assert!(color.is_finite(), "{mode}: non-finite color at {uv}");
                // Saturated f32 output may round up to exactly one.
                assert!(color.min_element() >= 0.0 && color.max_element() <= 1.0);
            }
        }
    }

    #[test]
    fn test_shading_is_deterministic() {
        let config = RaymarchConfig::agn();
        let uv = Vec2::new(0.3, 0.6);
        let res = Vec2::new(1024.0, 768.0);
        assert_eq!(
            shade_pixel(&config, uv, res, 3.25),
            shade_pixel(&config, uv, res, 3.25)
        );
    }

    #[test]
    fn test_photon_ring_only_outside_horizon() {
        let ring = RaymarchConfig::black_hole().photon_ring.unwrap();
        assert_eq!(photon_ring(&ring, -0.1), Vec3::ZERO);
        assert_eq!(photon_ring(&ring, 0.0), Vec3::ZERO);
        assert_eq!(photon_ring(&ring, 0.25), Vec3::ZERO);
        assert!(photon_ring(&ring, 0.05).min_element() > 0.0);
    }

    #[test]
    fn test_torus_leaves_light_outside_band() {
        let config = RaymarchConfig::agn();
        let torus = config.torus.unwrap();
        let (_, outer) = config.disk_radii();
        let light = Vec3::new(0.5, 0.4, 0.3);
        let inside_disk = Vec3::new(outer * 0.5, 0.0, 0.0);
        assert_eq!(
            torus_absorb(&torus, light, inside_disk, inside_disk.length(), outer, 0.15),
            light
        );
        let in_band = Vec3::new(outer * 1.5, 0.0, 0.0);
        let absorbed = torus_absorb(&torus, light, in_band, in_band.length(), outer, 0.15);
        assert!(absorbed.x <= light.x);
    }
}
