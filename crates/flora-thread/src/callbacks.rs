//! Caller-supplied rendering contract.

use crate::driver::GraphicsDriver;

/// Callbacks invoked by the render thread at defined points of its loop,
/// always with the state lock released.
///
/// The context/surface/frame references are valid for the duration of the
/// call only. The fourth callback of the set, config selection, is supplied
/// to the driver instead (see [`flora_gfx::ConfigChooser`]) because it runs
/// inside context creation.
pub trait RenderCallbacks<D: GraphicsDriver>: Send + 'static {
    /// Called once per successful surface (re)creation, before any render
    /// call for that surface.
    fn on_surface_created(&mut self, context: &mut D::Context, surface: &mut D::Surface);

    /// Called whenever a new size has been adopted, before the next render
    /// call. May fire without an intervening
    /// [`on_surface_created`](Self::on_surface_created) if only the size
    /// changed.
    fn on_surface_size_changed(&mut self, width: u32, height: u32);

    /// Called once per loop iteration while the thread is ready to render.
    fn on_render_frame(&mut self, context: &mut D::Context, frame: &mut D::Frame);
}
