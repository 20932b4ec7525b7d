//! Sample renderer - stands in for the real drawing collaborator.

use flora_gfx::{DrawSurface, Frame, GraphicsContext};
use flora_thread::{RenderCallbacks, WgpuDriver};
use std::time::Instant;
use tracing::info;

/// Renders a slow color drift, enough to see the surface living and
/// resizing without any actual scene content.
pub struct WallpaperRenderer {
    started: Instant,
}

impl WallpaperRenderer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl RenderCallbacks<WgpuDriver> for WallpaperRenderer {
    fn on_surface_created(&mut self, _context: &mut GraphicsContext, surface: &mut DrawSurface) {
        info!("Surface ready, format {:?}", surface.format());
    }

    fn on_surface_size_changed(&mut self, width: u32, height: u32) {
        info!("Surface size {}x{}", width, height);
    }

    fn on_render_frame(&mut self, _context: &mut GraphicsContext, frame: &mut Frame) {
        let t = self.started.elapsed().as_secs_f64();
        frame.clear(wgpu::Color {
            r: 0.5 + 0.5 * (0.11 * t).sin(),
            g: 0.5 + 0.5 * (0.13 * t + 2.1).sin(),
            b: 0.5 + 0.5 * (0.17 * t + 4.2).sin(),
            a: 1.0,
        });
    }
}
