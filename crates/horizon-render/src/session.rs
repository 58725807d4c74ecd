//! The per-frame render session.
//!
//! A [`RenderSession`] owns the compiled programs, the uniform buffer and the
//! active [`BindSet`]. The host calls [`tick`](RenderSession::tick) once per
//! display refresh; mode switches and resizes happen between ticks.

use std::sync::Arc;

use horizon_raymarch::SceneMode;
use log::info;

use crate::gpu::SurfaceError;
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::program::{BindSet, ProgramCache, ShaderCompileError};
use crate::surface::{SurfaceExtent, SurfaceSizeManager};
use crate::target::FrameTarget;
use crate::uniforms::UniformPacket;

/// Vertices in the full-screen triangle pair.
const FULLSCREEN_VERTICES: u32 = 6;

/// Failure creating or ticking a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    ShaderCompile(#[from] ShaderCompileError),

    #[error("frame acquisition failed: {0}")]
    Surface(#[from] SurfaceError),
}

pub struct RenderSession {
    device: wgpu::Device,
    queue: wgpu::Queue,
    programs: ProgramCache,
    uniform_buffer: wgpu::Buffer,
    bind_set: BindSet,
    mode: SceneMode,
    sizes: Arc<SurfaceSizeManager>,
    last_uniforms: Option<UniformPacket>,
    frames_submitted: u64,
}

impl RenderSession {
    /// Compiles all three programs and binds `mode`.
    ///
    /// The size manager clamps against the device's `max_texture_dimension_2d`
    /// and starts at `initial_extent`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        mode: SceneMode,
        initial_extent: SurfaceExtent,
    ) -> Result<Self, SessionError> {
        let programs = ProgramCache::compile_all(device, surface_format)?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: UniformPacket::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_set = BindSet::new(device, programs.get(mode), &uniform_buffer);

        let max_dimension = device.limits().max_texture_dimension_2d;
        let sizes = Arc::new(SurfaceSizeManager::new(
            initial_extent.width,
            initial_extent.height,
            max_dimension,
        ));
        info!(
            "Render session ready: mode {}, max dimension {}",
            mode, max_dimension
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            programs,
            uniform_buffer,
            bind_set,
            mode,
            sizes,
            last_uniforms: None,
            frames_submitted: 0,
        })
    }

    /// Renders one frame at `timestamp_ms` into `target`.
    ///
    /// The extent is read once at the start; a resize published during the
    /// tick applies to the next one.
    pub fn tick(
        &mut self,
        timestamp_ms: f64,
        target: &mut impl FrameTarget,
    ) -> Result<(), SessionError> {
        let extent = self.sizes.snapshot();
        if target.extent() != extent {
            target.resize(extent);
        }

        let packet = UniformPacket::new(timestamp_ms, extent);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&packet));
        self.last_uniforms = Some(packet);

        let frame = target.acquire()?;
        let program = self.programs.get(self.mode);
        let mut encoder = FrameEncoder::new(&self.device, frame);
        {
            let builder = RenderPassBuilder::new().label("raymarch-pass");
            let mut pass = encoder.begin_render_pass(&builder);
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &self.bind_set.bind_group, &[]);
            pass.draw(0..FULLSCREEN_VERTICES, 0..1);
        }
        encoder.submit(&self.queue);

        self.frames_submitted += 1;
        Ok(())
    }

    /// Switches to `mode`, rebuilding the bind set against its program's layout.
    /// The uniform buffer is left untouched.
    pub fn set_mode(&mut self, mode: SceneMode) {
        if mode == self.mode {
            return;
        }
        self.bind_set = BindSet::new(&self.device, self.programs.get(mode), &self.uniform_buffer);
        info!("Scene mode {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    /// Advances to the next mode and returns it.
    pub fn cycle_mode(&mut self) -> SceneMode {
        let next = self.mode.next();
        self.set_mode(next);
        next
    }

    /// Publishes a resize for the next tick; returns the clamped extent.
    pub fn resize(&self, width: u32, height: u32) -> SurfaceExtent {
        self.sizes.on_resize(width, height)
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn extent(&self) -> SurfaceExtent {
        self.sizes.snapshot()
    }

    /// Shared handle for publishing resizes from another thread.
    pub fn size_manager(&self) -> Arc<SurfaceSizeManager> {
        Arc::clone(&self.sizes)
    }

    pub fn bind_set(&self) -> &BindSet {
        &self.bind_set
    }

    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }

    /// Uniforms written by the most recent tick.
    pub fn last_uniforms(&self) -> Option<UniformPacket> {
        self.last_uniforms
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::OffscreenTarget;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    force_fallback_adapter: false,
                    compatible_surface: None,
                })
                .await
                .ok()?;

            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    fn create_test_session(mode: SceneMode) -> Option<(RenderSession, OffscreenTarget)> {
        let (device, queue) = create_test_device()?;
        let extent = SurfaceExtent {
            width: 32,
            height: 24,
        };
        let session = RenderSession::new(&device, &queue, FORMAT, mode, extent)
            .expect("built-in programs compile");
        let target = OffscreenTarget::new(&device, FORMAT, extent);
        Some((session, target))
    }

    #[test]
    fn test_switch_round_trip_restores_layout() {
        let Some((mut session, _target)) = create_test_session(SceneMode::BlackHole) else {
            return;
        };
        let before = Arc::clone(&session.bind_set().layout);

        session.set_mode(SceneMode::Agn);
        assert_eq!(session.bind_set().mode, SceneMode::Agn);
        assert!(!Arc::ptr_eq(&before, &session.bind_set().layout));

        session.set_mode(SceneMode::BlackHole);
        assert_eq!(session.bind_set().mode, SceneMode::BlackHole);
        assert!(Arc::ptr_eq(&before, &session.bind_set().layout));
    }

    #[test]
    fn test_cycle_mode_wraps() {
        let Some((mut session, _target)) = create_test_session(SceneMode::BlackHole) else {
            return;
        };
        assert_eq!(session.cycle_mode(), SceneMode::Agn);
        assert_eq!(session.cycle_mode(), SceneMode::FarAway);
        assert_eq!(session.cycle_mode(), SceneMode::BlackHole);
        assert_eq!(session.mode(), SceneMode::BlackHole);
    }

    #[test]
    fn test_tick_submits_frames() {
        let Some((mut session, mut target)) = create_test_session(SceneMode::FarAway) else {
            return;
        };
        for i in 0..3 {
            session
                .tick(f64::from(i) * 16.0, &mut target)
                .expect("offscreen frames never fail");
        }
        assert_eq!(session.frames_submitted(), 3);
        let packet = session.last_uniforms().unwrap();
        assert!((packet.time - 0.032).abs() < 1e-6);
        assert_eq!(packet.resolution, [32.0, 24.0]);
    }

    #[test]
    fn test_resize_applies_on_next_tick() {
        let Some((mut session, mut target)) = create_test_session(SceneMode::BlackHole) else {
            return;
        };
        let published = session.resize(0, 40);
        assert_eq!(published, SurfaceExtent { width: 1, height: 40 });
        assert_eq!(target.extent().width, 32);

        session.tick(0.0, &mut target).unwrap();
        assert_eq!(target.extent(), published);
        assert_eq!(session.last_uniforms().unwrap().resolution, [1.0, 40.0]);
    }

    #[test]
    fn test_set_mode_keeps_uniforms() {
        let Some((mut session, mut target)) = create_test_session(SceneMode::BlackHole) else {
            return;
        };
        session.tick(1000.0, &mut target).unwrap();
        let before = session.last_uniforms();
        session.set_mode(SceneMode::Agn);
        assert_eq!(session.last_uniforms(), before);
        session.tick(1016.0, &mut target).unwrap();
        assert_eq!(session.frames_submitted(), 2);
    }
}
