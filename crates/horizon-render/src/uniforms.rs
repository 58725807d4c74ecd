//! The per-frame uniform block shared by every scene program.

use bytemuck::{Pod, Zeroable};

use crate::surface::SurfaceExtent;

/// Host mirror of the WGSL `Uniforms` struct.
///
/// `resolution` is a `vec2f`, which WGSL aligns to 8 bytes, hence the padding
/// word after `time`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct UniformPacket {
    /// Elapsed time in seconds.
    pub time: f32,
    _padding: f32,
    pub resolution: [f32; 2],
}

impl UniformPacket {
    /// Size of the uniform block in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Conversion from clock milliseconds to shader seconds.
    pub const MS_TO_SECONDS: f64 = 0.001;

    /// Packet for a frame at `timestamp_ms` rendered at `extent`.
    pub fn new(timestamp_ms: f64, extent: SurfaceExtent) -> Self {
        Self {
            time: (timestamp_ms * Self::MS_TO_SECONDS) as f32,
            _padding: 0.0,
            resolution: extent.resolution(),
        }
    }
}
