//! Device acquisition and the window surface.
//!
//! [`RenderContext`] is the window-backed [`FrameTarget`]: it owns the
//! instance, adapter, device, queue and the configured surface. Everything a
//! scene needs beyond that lives in [`RenderSession`](crate::RenderSession).

use std::sync::Arc;
use winit::window::Window;

use crate::surface::SurfaceExtent;
use crate::target::{AcquiredFrame, FrameTarget};

/// Startup failures. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    /// The adapter offers no format this window's surface can present.
    #[error("no supported surface format on this platform")]
    PlatformUnsupported,

    #[error("no compatible GPU adapter found")]
    AdapterUnavailable,

    #[error("failed to request GPU device: {0}")]
    DeviceUnavailable(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
}

/// Per-frame acquisition failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Still lost or outdated after one reconfigure.
    #[error("surface lost")]
    Lost,

    #[error("out of memory")]
    OutOfMemory,

    /// Skip the frame and try again on the next redraw.
    #[error("timeout")]
    Timeout,
}

impl SurfaceError {
    /// Whether reconfiguring the surface may help.
    fn is_recoverable(error: &wgpu::SurfaceError) -> bool {
        matches!(error, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
    }
}

impl From<wgpu::SurfaceError> for SurfaceError {
    fn from(error: wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Timeout => Self::Timeout,
            wgpu::SurfaceError::OutOfMemory => Self::OutOfMemory,
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Lost,
            wgpu::SurfaceError::Other => {
                log::error!("Unrecognised surface error");
                Self::Lost
            }
        }
    }
}

pub struct RenderContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl RenderContext {
    /// Creates a surface for `window` and a device able to present to it.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // `create_surface` takes the window, so read its size first.
        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderContextError::AdapterUnavailable)?;

        let info = adapter.get_info();
        log::info!(
            "Using adapter {} ({:?} via {:?})",
            info.name,
            info.device_type,
            info.backend
        );

        let (device, queue) = request_device(&adapter).await?;
        let caps = surface.get_capabilities(&adapter);
        let surface_config = surface_configuration(
            SurfaceModes {
                formats: &caps.formats,
                alpha_modes: &caps.alpha_modes,
                present_modes: &caps.present_modes,
            },
            SurfaceExtent::clamped(size.width, size.height, device.limits().max_texture_dimension_2d),
            vsync,
        )?;
        surface.configure(&device, &surface_config);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_format: surface_config.format,
            surface_config,
        })
    }

    /// Reconfigures the surface at `width` x `height`, each at least 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Next swapchain texture. A lost or outdated surface is reconfigured and
    /// retried once.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(error) if SurfaceError::is_recoverable(&error) => {
                log::warn!("Surface {error}, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface.get_current_texture().map_err(|retry| {
                    log::error!("Surface still unusable after reconfigure: {retry}");
                    SurfaceError::Lost
                })
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl FrameTarget for RenderContext {
    fn extent(&self) -> SurfaceExtent {
        SurfaceExtent {
            width: self.surface_config.width,
            height: self.surface_config.height,
        }
    }

    fn resize(&mut self, extent: SurfaceExtent) {
        RenderContext::resize(self, extent.width, extent.height);
    }

    fn acquire(&mut self) -> Result<AcquiredFrame, SurfaceError> {
        self.get_current_texture().map(AcquiredFrame::from_surface)
    }
}

/// Blocks on [`RenderContext::new`] with `pollster`.
pub fn init_render_context_blocking(
    window: Arc<Window>,
    vsync: bool,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, vsync))
}

async fn request_device(
    adapter: &wgpu::Adapter,
) -> Result<(wgpu::Device, wgpu::Queue), RenderContextError> {
    let device = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("horizon-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        })
        .await?;
    Ok(device)
}

/// What the surface advertises for this adapter.
struct SurfaceModes<'a> {
    formats: &'a [wgpu::TextureFormat],
    alpha_modes: &'a [wgpu::CompositeAlphaMode],
    present_modes: &'a [wgpu::PresentMode],
}

fn surface_configuration(
    modes: SurfaceModes<'_>,
    extent: SurfaceExtent,
    vsync: bool,
) -> Result<wgpu::SurfaceConfiguration, RenderContextError> {
    let format = select_preferred_srgb_format(modes.formats)
        .ok_or(RenderContextError::PlatformUnsupported)?;
    let alpha_mode = select_alpha_mode(modes.alpha_modes);
    let present_mode = select_present_mode(modes.present_modes, vsync);
    log::info!(
        "Surface {:?}, alpha {:?}, present {:?}",
        format,
        alpha_mode,
        present_mode
    );

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: extent.width,
        height: extent.height,
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}

/// sRGB first (BGRA, then RGBA, then any), else the first advertised format.
fn select_preferred_srgb_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    const PREFERRED: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    PREFERRED
        .into_iter()
        .find(|format| formats.contains(format))
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| formats.first().copied())
}

/// Premultiplied alpha when offered, else whatever the surface lists first.
fn select_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    if modes.contains(&wgpu::CompositeAlphaMode::PreMultiplied) {
        wgpu::CompositeAlphaMode::PreMultiplied
    } else {
        modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

fn select_present_mode(modes: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    let preferred: &[wgpu::PresentMode] = if vsync {
        &[wgpu::PresentMode::Fifo]
    } else {
        &[wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
    };
    preferred
        .iter()
        .copied()
        .find(|mode| modes.contains(mode))
        // Fifo is guaranteed to be supported.
        .unwrap_or(wgpu::PresentMode::Fifo)
}
