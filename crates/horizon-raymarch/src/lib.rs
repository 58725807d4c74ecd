//! Raymarched black hole, AGN and distant-lighthouse scenes.
//!
//! Everything in this crate is GPU-agnostic: the value-noise field library, the
//! per-mode [`RaymarchConfig`] table, the orbiting camera, a CPU reference
//! integrator that mirrors the fragment program step for step, and the WGSL
//! generator that turns a config into the program the device actually runs.

pub mod camera;
pub mod config;
pub mod integrator;
pub mod math;
pub mod mode;
pub mod noise;
pub mod tonemap;
pub mod wgsl;

pub use camera::{CameraFrame, screen_coords};
pub use config::{
    CameraConfig, CoreConfig, DiskConfig, GlowConfig, GravityConfig, JetConfig, MarchConfig,
    NebulaDisk, PhotonRingConfig, RaymarchConfig, StarFieldConfig, ToneConfig, TorusConfig,
    TurbulentDisk,
};
pub use integrator::{MarchOutcome, RayState, StepSample, Termination, march, shade_pixel};
pub use mode::{ParseSceneModeError, SceneMode};
pub use noise::{fbm, hash, noise, warp};
pub use tonemap::{apply_contrast, tone_map};
pub use wgsl::{COMMON_WGSL, RAYMARCH_WGSL, const_header, fragment_source, program_source};
