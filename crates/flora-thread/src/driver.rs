//! Graphics backend seam for the render thread.
//!
//! The worker loop never touches wgpu directly; everything it needs from
//! the graphics stack goes through [`GraphicsDriver`]. The production
//! implementation is [`WgpuDriver`]; tests substitute a scripted driver.

use flora_gfx::{ConfigChooser, DrawSurface, Frame, GfxError, GraphicsContext, NativeWindow};
use std::fmt::Display;

/// Backend used by the render thread to build and tear down its context
/// and surface, and to pump frames through it.
///
/// Context and surface teardown is `Drop` of the associated types; the
/// worker guarantees a surface is dropped before the context it was
/// created against. Creation errors are transient: the worker logs them
/// and retries on the next wake signal.
pub trait GraphicsDriver: Send + 'static {
    type Context: Send;
    type Surface: Send;
    type Frame;
    /// Handle to the native window surfaces are bound to. Cloning acquires
    /// another reference to the same underlying window.
    type Window: Clone + Send + 'static;
    type Error: Display;

    fn create_context(&mut self) -> Result<Self::Context, Self::Error>;

    fn create_surface(
        &mut self,
        context: &mut Self::Context,
        window: &Self::Window,
        width: u32,
        height: u32,
    ) -> Result<Self::Surface, Self::Error>;

    /// Apply new dimensions to an existing surface. Never recreates it.
    fn resize_surface(
        &mut self,
        context: &mut Self::Context,
        surface: &mut Self::Surface,
        width: u32,
        height: u32,
    );

    fn begin_frame(
        &mut self,
        context: &mut Self::Context,
        surface: &mut Self::Surface,
    ) -> Result<Self::Frame, Self::Error>;

    /// Present a frame begun with [`begin_frame`](Self::begin_frame).
    fn present(&mut self, context: &mut Self::Context, surface: &mut Self::Surface, frame: Self::Frame);

    /// Whether two handles refer to the same underlying native window.
    fn same_window(a: &Self::Window, b: &Self::Window) -> bool;
}

/// The wgpu-backed driver. Owns the config chooser invoked while
/// negotiating an adapter during context creation.
pub struct WgpuDriver {
    chooser: Box<dyn ConfigChooser>,
}

impl WgpuDriver {
    pub fn new(chooser: impl ConfigChooser) -> Self {
        Self {
            chooser: Box::new(chooser),
        }
    }
}

impl GraphicsDriver for WgpuDriver {
    type Context = GraphicsContext;
    type Surface = DrawSurface;
    type Frame = Frame;
    type Window = NativeWindow;
    type Error = GfxError;

    fn create_context(&mut self) -> Result<GraphicsContext, GfxError> {
        GraphicsContext::new(self.chooser.as_mut())
    }

    fn create_surface(
        &mut self,
        context: &mut GraphicsContext,
        window: &NativeWindow,
        width: u32,
        height: u32,
    ) -> Result<DrawSurface, GfxError> {
        DrawSurface::new(context, window, width, height)
    }

    fn resize_surface(
        &mut self,
        _context: &mut GraphicsContext,
        surface: &mut DrawSurface,
        width: u32,
        height: u32,
    ) {
        surface.resize(width, height);
    }

    fn begin_frame(
        &mut self,
        _context: &mut GraphicsContext,
        surface: &mut DrawSurface,
    ) -> Result<Frame, GfxError> {
        surface.begin_frame()
    }

    fn present(&mut self, _context: &mut GraphicsContext, _surface: &mut DrawSurface, frame: Frame) {
        frame.present();
    }

    fn same_window(a: &NativeWindow, b: &NativeWindow) -> bool {
        a.same_window(b)
    }
}
