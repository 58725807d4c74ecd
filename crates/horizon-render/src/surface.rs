//! Surface sizing shared between the resize handler and the frame loop.
//!
//! Resize requests are clamped to `[1, max_dimension]` and published as one
//! packed atomic word, so a frame that snapshots the extent at its start always
//! sees a width and height that belong together.

use std::sync::atomic::{AtomicU64, Ordering};

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of the render target. Both sides are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceExtent {
    pub width: u32,
    pub height: u32,
}

impl SurfaceExtent {
    /// The smallest valid extent.
    pub const MIN: Self = Self {
        width: MIN_SURFACE_DIMENSION,
        height: MIN_SURFACE_DIMENSION,
    };

    /// Clamps a requested size into `[1, max_dimension]` on each axis.
    ///
    /// A `max_dimension` of zero is treated as 1.
    pub fn clamped(width: u32, height: u32, max_dimension: u32) -> Self {
        let max = max_dimension.max(MIN_SURFACE_DIMENSION);
        Self {
            width: width.clamp(MIN_SURFACE_DIMENSION, max),
            height: height.clamp(MIN_SURFACE_DIMENSION, max),
        }
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Dimensions as the `vec2f` the shader reads.
    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    fn pack(self) -> u64 {
        (u64::from(self.width) << 32) | u64::from(self.height)
    }

    fn unpack(packed: u64) -> Self {
        Self {
            width: (packed >> 32) as u32,
            height: packed as u32,
        }
    }
}

/// Publishes the extent the next frame will render at.
///
/// Writers call [`on_resize`](Self::on_resize) from the window event handler;
/// the frame loop calls [`snapshot`](Self::snapshot) once per tick. The manager
/// is `Sync` and can be shared through an `Arc`.
#[derive(Debug)]
pub struct SurfaceSizeManager {
    current: AtomicU64,
    max_dimension: u32,
}

impl SurfaceSizeManager {
    /// Creates a manager that clamps against `max_dimension` (typically the
    /// device's `max_texture_dimension_2d`).
    pub fn new(initial_width: u32, initial_height: u32, max_dimension: u32) -> Self {
        let extent = SurfaceExtent::clamped(initial_width, initial_height, max_dimension);
        Self {
            current: AtomicU64::new(extent.pack()),
            max_dimension: max_dimension.max(MIN_SURFACE_DIMENSION),
        }
    }

    /// Clamps and publishes a resize request, returning the published extent.
    pub fn on_resize(&self, requested_width: u32, requested_height: u32) -> SurfaceExtent {
        let extent = SurfaceExtent::clamped(requested_width, requested_height, self.max_dimension);
        let previous = SurfaceExtent::unpack(self.current.swap(extent.pack(), Ordering::AcqRel));
        if previous != extent {
            log::debug!(
                "Surface extent {}x{} -> {}x{} (requested {}x{})",
                previous.width,
                previous.height,
                extent.width,
                extent.height,
                requested_width,
                requested_height
            );
        }
        extent
    }

    /// The most recently published extent.
    pub fn snapshot(&self) -> SurfaceExtent {
        SurfaceExtent::unpack(self.current.load(Ordering::Acquire))
    }

    /// Largest width or height this manager will publish.
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }
}
