//! flora-thread - render thread lifecycle controller
//!
//! Owns the dedicated worker thread that builds and tears down a graphics
//! context and draw surface in response to lifecycle signals arriving from
//! the host (pause/resume, window attach/detach, window resize), and drives
//! a per-frame render callback while those resources are valid:
//! - [`RenderThread`] - the thread-safe entry points and the worker loop
//! - [`GraphicsDriver`] - the backend seam the worker builds resources through
//! - [`RenderCallbacks`] - the caller-supplied rendering contract
//! - [`HostService`] - connection counting for multiple hosts sharing one thread

mod callbacks;
mod driver;
mod host;
mod thread;

pub use callbacks::RenderCallbacks;
pub use driver::{GraphicsDriver, WgpuDriver};
pub use host::HostService;
pub use thread::{RenderThread, RenderThreadLock};
