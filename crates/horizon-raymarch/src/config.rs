//! Physical and visual constants for each scene mode.
//!
//! One [`RaymarchConfig`] drives both the CPU reference integrator and the
//! generated WGSL program, so the three scenes share a single integrator and
//! differ only in the values below.

use glam::Vec3;

use crate::mode::SceneMode;

/// Orbiting camera parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Multiplier from shader time (seconds) to animation time.
    pub time_scale: f32,
    /// Orbit angle per unit of animation time.
    pub orbit_rate: f32,
    /// Radius of the orbit circle.
    pub distance: f32,
    /// Camera height as a fraction of `distance`.
    pub height_ratio: f32,
    /// Weight of the forward axis in the ray direction (larger = narrower view).
    pub focal_length: f32,
    /// Rotation of the scene about the Z axis, in radians.
    pub tilt: Option<f32>,
}

impl CameraConfig {
    /// Camera height above the disk plane.
    pub fn height(&self) -> f32 {
        self.distance * self.height_ratio
    }

    /// Effective orbit angular speed relative to shader time.
    pub fn angular_speed(&self) -> f32 {
        self.time_scale * self.orbit_rate
    }
}

/// March loop budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchConfig {
    /// Maximum number of steps per pixel.
    pub steps: u32,
    /// Fixed distance advanced per step.
    pub step_size: f32,
    /// Radius beyond which a ray is treated as escaped to the star field.
    pub escape_radius: f32,
}

/// Central mass with an absorbing horizon and lensing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityConfig {
    pub mass: f32,
    /// Horizon radius in units of `mass`.
    pub horizon_factor: f32,
    /// Lensing force numerator multiplier (`k` in `k·mass / (r² + ε)`).
    pub lensing_strength: f32,
    /// `ε` in the lensing denominator.
    pub softening: f32,
}

impl GravityConfig {
    pub const DISABLED: Self = Self {
        mass: 0.0,
        horizon_factor: 0.0,
        lensing_strength: 0.0,
        softening: 1.0,
    };

    /// Radius below which rays are captured.
    pub fn event_horizon(&self) -> f32 {
        self.horizon_factor * self.mass
    }
}

/// Thin bright shell just outside the horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhotonRingConfig {
    pub width: f32,
    pub intensity: f32,
    pub color: Vec3,
}

impl PhotonRingConfig {
    pub const DISABLED: Self = Self {
        width: 0.0,
        intensity: 1.0,
        color: Vec3::ZERO,
    };
}

/// Soft star-like emission from the centre, used when there is no hard horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreConfig {
    pub concentration: f32,
    pub softening: f32,
    pub color: Vec3,
    pub gain: f32,
}

impl CoreConfig {
    pub const DISABLED: Self = Self {
        concentration: 0.0,
        softening: 1.0,
        color: Vec3::ZERO,
        gain: 0.0,
    };
}

/// Relativistic jets along the polar (Y) axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JetConfig {
    /// Axial extent on each side of the disk plane.
    pub length: f32,
    /// Gate radius at the base of the jet.
    pub width: f32,
    /// Gate radius growth per unit of axial distance.
    pub flare: f32,
    /// Density profile radius is `(profile_base + along · profile_spread) · profile_scale`.
    pub profile_base: f32,
    pub profile_spread: f32,
    pub profile_scale: f32,
    /// Spatial frequency of the fbm turbulence.
    pub turbulence_scale: f32,
    /// Axial flow speed of the turbulence per unit of animation time.
    pub flow_speed: f32,
    /// Turbulence shaping: `noise_bias + noise_gain · fbm`.
    pub noise_bias: f32,
    pub noise_gain: f32,
    /// Exponential decay rate with axial distance.
    pub falloff: f32,
    pub color: Vec3,
    /// Per-channel color added in proportion to the turbulence sample.
    pub color_noise: Vec3,
    /// Doppler beaming factor `k` in `1 + k·(view·axis)`; zero disables beaming.
    pub doppler: f32,
    pub gain: f32,
}

impl JetConfig {
    pub const DISABLED: Self = Self {
        length: 0.0,
        width: 0.0,
        flare: 0.0,
        profile_base: 1.0,
        profile_spread: 0.0,
        profile_scale: 1.0,
        turbulence_scale: 0.0,
        flow_speed: 0.0,
        noise_bias: 0.0,
        noise_gain: 0.0,
        falloff: 0.0,
        color: Vec3::ZERO,
        color_noise: Vec3::ZERO,
        doppler: 0.0,
        gain: 0.0,
    };

    /// Gate radius at axial distance `along`.
    pub fn gate_radius(&self, along: f32) -> f32 {
        self.width * (1.0 + along * self.flare)
    }

    /// Radius where the density profile reaches zero at axial distance `along`.
    pub fn profile_radius(&self, along: f32) -> f32 {
        (self.profile_base + along * self.profile_spread) * self.profile_scale
    }
}

/// Thin, differentially rotating accretion disk bounded by horizon multiples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurbulentDisk {
    /// Inner radius in units of the event horizon.
    pub inner_factor: f32,
    /// Outer radius in units of the event horizon.
    pub outer_factor: f32,
    pub half_thickness: f32,
    /// Angular speed numerator; the disk rotates at `spin / sqrt(r)`.
    pub spin: f32,
    /// Scales applied to `(r, angle, y)` before the warp lookup.
    pub warp_scale: Vec3,
    /// Frequency of concentric ring modulation, if any.
    pub ring_frequency: Option<f32>,
    pub inner_ramp: f32,
    pub outer_ramp: f32,
    pub vertical_falloff: f32,
    pub density_scale: f32,
    pub outer_color: Vec3,
    pub inner_color: Vec3,
    /// Exponent applied to the normalised temperature before the color ramp.
    pub temperature_exponent: f32,
    /// White added in proportion to temperature.
    pub white_point: f32,
    pub gain: f32,
}

impl TurbulentDisk {
    /// Inner and outer disk radii for a given event horizon.
    pub fn radii(&self, event_horizon: f32) -> (f32, f32) {
        (
            event_horizon * self.inner_factor,
            event_horizon * self.outer_factor,
        )
    }
}

/// Thick spiral nebula cloud centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NebulaDisk {
    pub radius: f32,
    /// Radius inside which the cloud reaches full density.
    pub core_radius: f32,
    pub half_thickness: f32,
    /// Spiral winding per unit radius.
    pub twist: f32,
    pub spin: f32,
    /// Number of spiral arms.
    pub arms: f32,
    pub vertical_swirl: f32,
    pub noise_scale: f32,
    /// Radius at which the palette reaches `outer_color`.
    pub palette_radius: f32,
    pub inner_color: Vec3,
    pub outer_color: Vec3,
    pub gain: f32,
}

/// The disk model of a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DiskConfig {
    Turbulent(TurbulentDisk),
    Nebula(NebulaDisk),
}

/// Obscuring dust band just outside the accretion disk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorusConfig {
    /// Outer edge in units of the disk's outer radius.
    pub extent: f32,
    /// Half-opening of the band as a fraction of radius.
    pub opening: f32,
    pub noise_scale: f32,
    pub density: f32,
    pub absorption: f32,
    pub color: Vec3,
}

impl TorusConfig {
    pub const DISABLED: Self = Self {
        extent: 0.0,
        opening: 0.0,
        noise_scale: 0.0,
        density: 0.0,
        absorption: 0.0,
        color: Vec3::ZERO,
    };
}

/// Ambient halo accumulated on every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowConfig {
    pub intensity: f32,
    pub softening: f32,
    pub color: Vec3,
    pub scale: f32,
}

impl GlowConfig {
    pub const DISABLED: Self = Self {
        intensity: 0.0,
        softening: 1.0,
        color: Vec3::ZERO,
        scale: 0.0,
    };
}

/// Background stars sampled when a ray escapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarFieldConfig {
    pub frequency: f32,
    pub sharpness: f32,
    pub brightness: f32,
}

/// Final tone curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneConfig {
    pub exposure: f32,
    /// Power curve applied before tone mapping.
    pub contrast: Option<f32>,
}

/// Complete parameter set for one scene mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaymarchConfig {
    pub mode: SceneMode,
    pub camera: CameraConfig,
    pub march: MarchConfig,
    pub gravity: Option<GravityConfig>,
    pub photon_ring: Option<PhotonRingConfig>,
    pub core: Option<CoreConfig>,
    pub jet: Option<JetConfig>,
    pub disk: DiskConfig,
    pub torus: Option<TorusConfig>,
    pub glow: Option<GlowConfig>,
    pub stars: StarFieldConfig,
    pub tone: ToneConfig,
}

impl RaymarchConfig {
    /// Configuration for `mode`.
    pub fn for_mode(mode: SceneMode) -> Self {
        match mode {
            SceneMode::BlackHole => Self::black_hole(),
            SceneMode::Agn => Self::agn(),
            SceneMode::FarAway => Self::far_away(),
        }
    }

    /// Close-up black hole: mass 1.2, disk from 1.2 to 4.5 horizons.
    pub fn black_hole() -> Self {
        Self {
            mode: SceneMode::BlackHole,
            camera: CameraConfig {
                time_scale: 0.05,
                orbit_rate: 1.0,
                distance: 11.0,
                height_ratio: 0.1,
                focal_length: 1.0,
                tilt: None,
            },
            march: MarchConfig {
                steps: 500,
                step_size: 0.1,
                escape_radius: 25.0,
            },
            gravity: Some(GravityConfig {
                mass: 1.2,
                horizon_factor: 2.0,
                lensing_strength: 3.0,
                softening: 0.01,
            }),
            photon_ring: Some(PhotonRingConfig {
                width: 0.2,
                intensity: 0.01,
                color: Vec3::new(0.7, 0.8, 1.0),
            }),
            core: None,
            jet: None,
            disk: DiskConfig::Turbulent(TurbulentDisk {
                inner_factor: 1.2,
                outer_factor: 4.5,
                half_thickness: 0.6,
                spin: 4.0,
                warp_scale: Vec3::new(1.5, 2.0, 2.0),
                ring_frequency: None,
                inner_ramp: 0.5,
                outer_ramp: 1.0,
                vertical_falloff: 0.3,
                density_scale: 0.6,
                outer_color: Vec3::new(0.05, 0.2, 0.7),
                inner_color: Vec3::new(1.0, 0.9, 0.6),
                temperature_exponent: 0.7,
                white_point: 0.6,
                gain: 4.0,
            }),
            torus: None,
            glow: Some(GlowConfig {
                intensity: 0.01,
                softening: 0.1,
                color: Vec3::new(0.1, 0.3, 0.6),
                scale: 0.08,
            }),
            stars: StarFieldConfig {
                frequency: 300.0,
                sharpness: 20.0,
                brightness: 1.0,
            },
            tone: ToneConfig {
                exposure: 1.2,
                contrast: None,
            },
        }
    }

    /// Active galactic nucleus: heavier mass, jets, ringed disk and dusty torus.
    pub fn agn() -> Self {
        Self {
            mode: SceneMode::Agn,
            camera: CameraConfig {
                time_scale: 0.05,
                orbit_rate: 0.5,
                distance: 18.0,
                height_ratio: 0.3,
                focal_length: 1.0,
                tilt: None,
            },
            march: MarchConfig {
                steps: 400,
                step_size: 0.15,
                escape_radius: 30.0,
            },
            gravity: Some(GravityConfig {
                mass: 1.5,
                horizon_factor: 2.0,
                lensing_strength: 4.0,
                softening: 0.01,
            }),
            photon_ring: None,
            core: None,
            jet: Some(JetConfig {
                length: 15.0,
                width: 0.8,
                flare: 0.1,
                profile_base: 0.8,
                profile_spread: 0.0,
                profile_scale: 1.0,
                turbulence_scale: 2.0,
                flow_speed: 10.0,
                noise_bias: 0.0,
                noise_gain: 1.0,
                falloff: 0.1,
                color: Vec3::new(0.4, 0.6, 1.0) * 2.0,
                color_noise: Vec3::ZERO,
                doppler: 0.5,
                gain: 0.5,
            }),
            disk: DiskConfig::Turbulent(TurbulentDisk {
                inner_factor: 1.1,
                outer_factor: 6.0,
                half_thickness: 0.8,
                spin: 6.0,
                warp_scale: Vec3::new(2.0, 3.0, 4.0),
                ring_frequency: Some(10.0),
                inner_ramp: 0.5,
                outer_ramp: 2.0,
                vertical_falloff: 0.4,
                density_scale: 1.0,
                outer_color: Vec3::new(0.8, 0.1, 0.1),
                inner_color: Vec3::new(0.8, 0.9, 1.0),
                temperature_exponent: 0.5,
                white_point: 0.0,
                gain: 3.0,
            }),
            torus: Some(TorusConfig {
                extent: 2.5,
                opening: 0.4,
                noise_scale: 0.5,
                density: 0.1,
                absorption: 5.0,
                color: Vec3::new(0.05, 0.02, 0.0),
            }),
            glow: Some(GlowConfig {
                intensity: 0.01,
                softening: 0.1,
                color: Vec3::new(0.2, 0.1, 0.3),
                scale: 0.1,
            }),
            stars: StarFieldConfig {
                frequency: 300.0,
                sharpness: 20.0,
                brightness: 1.0,
            },
            tone: ToneConfig {
                exposure: 1.5,
                contrast: None,
            },
        }
    }

    /// Distant lighthouse: no horizon, a bright core, long beamed jets and a
    /// tilted nebula disk seen from far away.
    pub fn far_away() -> Self {
        Self {
            mode: SceneMode::FarAway,
            camera: CameraConfig {
                time_scale: 0.1,
                orbit_rate: 0.15,
                distance: 80.0,
                height_ratio: 0.5,
                focal_length: 1.8,
                tilt: Some(0.5),
            },
            march: MarchConfig {
                steps: 250,
                step_size: 2.0,
                escape_radius: 200.0,
            },
            gravity: None,
            photon_ring: None,
            core: Some(CoreConfig {
                concentration: 2.0,
                softening: 0.1,
                color: Vec3::new(1.0, 0.95, 0.8),
                gain: 0.8,
            }),
            jet: Some(JetConfig {
                length: 50.0,
                width: 4.0,
                flare: 0.0,
                profile_base: 0.5,
                profile_spread: 0.02,
                profile_scale: 4.0,
                turbulence_scale: 0.5,
                flow_speed: 15.0,
                noise_bias: 0.5,
                noise_gain: 0.5,
                falloff: 0.05,
                color: Vec3::new(0.2, 0.6, 1.0),
                color_noise: Vec3::splat(0.5),
                doppler: 0.0,
                gain: 0.15,
            }),
            disk: DiskConfig::Nebula(NebulaDisk {
                radius: 45.0,
                core_radius: 5.0,
                half_thickness: 15.0,
                twist: 0.3,
                spin: 2.0,
                arms: 3.0,
                vertical_swirl: 0.5,
                noise_scale: 0.2,
                palette_radius: 40.0,
                inner_color: Vec3::new(0.8, 0.2, 0.1),
                outer_color: Vec3::new(0.3, 0.0, 0.4),
                gain: 0.1,
            }),
            torus: None,
            glow: None,
            stars: StarFieldConfig {
                frequency: 400.0,
                sharpness: 40.0,
                brightness: 0.3,
            },
            tone: ToneConfig {
                exposure: 1.5,
                contrast: Some(1.2),
            },
        }
    }

    /// Event horizon radius, or `None` for scenes without a hard horizon.
    pub fn event_horizon(&self) -> Option<f32> {
        self.gravity.as_ref().map(GravityConfig::event_horizon)
    }

    /// Inner and outer radius of a turbulent disk; `(0, 0)` for other disk models.
    pub fn disk_radii(&self) -> (f32, f32) {
        match (&self.disk, self.event_horizon()) {
            (DiskConfig::Turbulent(disk), Some(horizon)) => disk.radii(horizon),
            _ => (0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_mode_matches_mode() {
        for mode in SceneMode::ALL {
            assert_eq!(RaymarchConfig::for_mode(mode).mode, mode);
        }
    }

    #[test]
    fn test_black_hole_table() {
        let config = RaymarchConfig::black_hole();
        let gravity = config.gravity.unwrap();
        assert_eq!(gravity.mass, 1.2);
        assert!((config.event_horizon().unwrap() - 2.4).abs() < 1e-6);
        let (inner, outer) = config.disk_radii();
        assert!((inner - 2.4 * 1.2).abs() < 1e-5);
        assert!((outer - 2.4 * 4.5).abs() < 1e-5);
        assert!(config.jet.is_none());
        assert_eq!(config.camera.distance, 11.0);
        assert!((config.camera.height() - 1.1).abs() < 1e-6);
        assert!((config.camera.angular_speed() - 0.05).abs() < 1e-7);
        assert_eq!(config.march.steps, 500);
        assert_eq!(config.march.step_size, 0.1);
    }

    #[test]
    fn test_agn_table() {
        let config = RaymarchConfig::agn();
        assert_eq!(config.gravity.unwrap().mass, 1.5);
        let (inner, outer) = config.disk_radii();
        assert!((inner - 3.0 * 1.1).abs() < 1e-5);
        assert!((outer - 3.0 * 6.0).abs() < 1e-5);
        let jet = config.jet.unwrap();
        assert_eq!(jet.length, 15.0);
        assert_eq!(jet.width, 0.8);
        assert!((config.camera.height() - 5.4).abs() < 1e-5);
        assert!((config.camera.angular_speed() - 0.025).abs() < 1e-7);
        assert_eq!(config.march.steps, 400);
        assert_eq!(config.march.step_size, 0.15);
        assert!(config.torus.is_some());
    }

    #[test]
    fn test_far_away_table() {
        let config = RaymarchConfig::far_away();
        assert!(config.gravity.is_none());
        assert!(config.event_horizon().is_none());
        assert_eq!(config.disk_radii(), (0.0, 0.0));
        let DiskConfig::Nebula(disk) = config.disk else {
            panic!("far-away scene uses a nebula disk");
        };
        assert_eq!(disk.radius, 45.0);
        let jet = config.jet.unwrap();
        assert_eq!(jet.length, 50.0);
        assert_eq!(jet.width, 4.0);
        assert_eq!(config.camera.distance, 80.0);
        assert!((config.camera.height() - 40.0).abs() < 1e-5);
        assert!((config.camera.angular_speed() - 0.015).abs() < 1e-7);
        assert!(config.camera.tilt.is_some());
        assert_eq!(config.march.steps, 250);
        assert_eq!(config.march.step_size, 2.0);
    }

    #[test]
    fn test_step_budgets_in_range() {
        for mode in SceneMode::ALL {
            let steps = RaymarchConfig::for_mode(mode).march.steps;
            assert!((250..=500).contains(&steps), "{mode}: {steps} steps");
        }
    }

    #[test]
    fn test_escape_radius_beyond_camera() {
        for mode in SceneMode::ALL {
            let config = RaymarchConfig::for_mode(mode);
            let camera_radius = config.camera.distance.hypot(config.camera.height());
            assert!(
                config.march.escape_radius > camera_radius,
                "{mode}: escape radius must enclose the camera orbit"
            );
        }
    }

    #[test]
    fn test_jet_profile_radius() {
        let far = RaymarchConfig::far_away().jet.unwrap();
        assert!((far.profile_radius(0.0) - 2.0).abs() < 1e-6);
        assert!((far.profile_radius(10.0) - 2.8).abs() < 1e-5);
        let agn = RaymarchConfig::agn().jet.unwrap();
        assert_eq!(agn.profile_radius(7.0), 0.8);
        assert!((agn.gate_radius(10.0) - 1.6).abs() < 1e-6);
    }
}
