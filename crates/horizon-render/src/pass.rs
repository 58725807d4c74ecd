//! Per-frame command recording.
//!
//! A [`FrameEncoder`] pairs a command encoder with the [`AcquiredFrame`] it
//! draws into; [`RenderPassBuilder`] describes the single clearing pass.

use crate::target::AcquiredFrame;

/// Opaque black; every frame starts from it.
pub const CLEAR_BLACK: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// One color-only pass that clears its target before drawing.
#[derive(Debug, Clone)]
pub struct RenderPassBuilder {
    clear: wgpu::Color,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    pub fn new() -> Self {
        Self {
            clear: CLEAR_BLACK,
            label: None,
        }
    }

    pub fn clear_color(self, clear: wgpu::Color) -> Self {
        Self { clear, ..self }
    }

    pub fn label(self, label: &'static str) -> Self {
        Self {
            label: Some(label),
            ..self
        }
    }

    fn begin<'a>(
        &self,
        encoder: &'a mut wgpu::CommandEncoder,
        target: &'a wgpu::TextureView,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Records one frame's commands against an acquired frame.
///
/// Consumed by [`submit`](Self::submit), which submits and then presents, so a
/// frame can be neither submitted twice nor presented before its commands.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    frame: AcquiredFrame,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, frame: AcquiredFrame) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("horizon-frame"),
        });
        Self { encoder, frame }
    }

    /// Opens `pass` on the frame's color view.
    pub fn begin_render_pass(&mut self, pass: &RenderPassBuilder) -> wgpu::RenderPass<'_> {
        pass.begin(&mut self.encoder, self.frame.view())
    }

    pub fn submit(self, queue: &wgpu::Queue) {
        queue.submit(std::iter::once(self.encoder.finish()));
        self.frame.present();
    }
}
