//! wgpu plumbing for the raymarched scenes: device acquisition, the per-mode
//! program cache, surface sizing and the per-frame [`RenderSession`].

pub mod gpu;
pub mod pass;
pub mod program;
pub mod session;
pub mod surface;
pub mod target;
pub mod uniforms;

pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{CLEAR_BLACK, FrameEncoder, RenderPassBuilder};
pub use program::{BindSet, Program, ProgramCache, ShaderCompileError, validate_program_source};
pub use session::{RenderSession, SessionError};
pub use surface::{MIN_SURFACE_DIMENSION, SurfaceExtent, SurfaceSizeManager};
pub use target::{AcquiredFrame, FrameTarget, OffscreenTarget};
pub use uniforms::UniformPacket;
