//! Shared handle to the native window a surface renders into.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::fmt;
use std::sync::Arc;

/// Anything a surface can be created from. Blanket-implemented for every
/// type that exposes raw window and display handles (e.g. `winit::window::Window`).
pub trait WindowSource: HasWindowHandle + HasDisplayHandle + Send + Sync {}

impl<T: HasWindowHandle + HasDisplayHandle + Send + Sync> WindowSource for T {}

/// Reference-counted handle to a native window.
///
/// Cloning acquires another reference to the same underlying window;
/// dropping releases it. The window outlives any surface created from it
/// because the surface keeps its own reference.
#[derive(Clone)]
pub struct NativeWindow(Arc<dyn WindowSource + 'static>);

impl NativeWindow {
    pub fn new(source: impl WindowSource + 'static) -> Self {
        Self(Arc::new(source))
    }

    /// Whether both handles refer to the same underlying native window.
    pub fn same_window(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn source(&self) -> Arc<dyn WindowSource + 'static> {
        Arc::clone(&self.0)
    }
}

impl fmt::Debug for NativeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeWindow")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}
