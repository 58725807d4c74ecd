//! Render targets a session can draw into.
//!
//! The window surface ([`RenderContext`](crate::RenderContext)) and an
//! [`OffscreenTarget`] share the [`FrameTarget`] trait, so a
//! [`RenderSession`](crate::RenderSession) renders the same way with or
//! without a window.

use crate::gpu::SurfaceError;
use crate::surface::SurfaceExtent;

/// A color view ready to be drawn into, plus the surface texture to present.
pub struct AcquiredFrame {
    view: wgpu::TextureView,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl AcquiredFrame {
    /// Frame backed by a swapchain texture; presented on [`present`](Self::present).
    pub fn from_surface(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            surface_texture: Some(surface_texture),
        }
    }

    /// Frame backed by a plain texture view; presenting is a no-op.
    pub fn from_view(view: wgpu::TextureView) -> Self {
        Self {
            view,
            surface_texture: None,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Queues the frame for display. Call after the frame's commands are submitted.
    pub fn present(self) {
        if let Some(surface_texture) = self.surface_texture {
            surface_texture.present();
        }
    }
}

/// Something a frame can be rendered into.
pub trait FrameTarget {
    /// Current size of the target in physical pixels.
    fn extent(&self) -> SurfaceExtent;

    /// Reallocates or reconfigures the target at `extent`.
    fn resize(&mut self, extent: SurfaceExtent);

    /// Acquires the next frame to draw into.
    fn acquire(&mut self) -> Result<AcquiredFrame, SurfaceError>;
}

/// Headless render-attachment texture.
pub struct OffscreenTarget {
    device: wgpu::Device,
    texture: wgpu::Texture,
    format: wgpu::TextureFormat,
    extent: SurfaceExtent,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, extent: SurfaceExtent) -> Self {
        Self {
            device: device.clone(),
            texture: create_target_texture(device, format, extent),
            format,
            extent,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

impl FrameTarget for OffscreenTarget {
    fn extent(&self) -> SurfaceExtent {
        self.extent
    }

    fn resize(&mut self, extent: SurfaceExtent) {
        if extent == self.extent {
            return;
        }
        self.texture = create_target_texture(&self.device, self.format, extent);
        self.extent = extent;
    }

    fn acquire(&mut self) -> Result<AcquiredFrame, SurfaceError> {
        let view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(AcquiredFrame::from_view(view))
    }
}

fn create_target_texture(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    extent: SurfaceExtent,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen-target"),
        size: wgpu::Extent3d {
            width: extent.width,
            height: extent.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}
