//! flora-gfx - GPU context and surface plumbing
//!
//! Thin wrappers around the wgpu device/surface machinery used by the
//! render thread: a [`GraphicsContext`] negotiates an adapter and owns the
//! device/queue pair, a [`DrawSurface`] binds a renderable surface to a
//! native window under an existing context.

mod context;
mod surface;
mod window;

pub use context::{ConfigChooser, GfxError, GraphicsContext};
pub use surface::{DrawSurface, Frame};
pub use window::{NativeWindow, WindowSource};
