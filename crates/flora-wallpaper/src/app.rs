//! Host bridge - winit lifecycle events into controller entry points.

use crate::renderer::WallpaperRenderer;
use flora_gfx::NativeWindow;
use flora_thread::{HostService, WgpuDriver};
use std::sync::Arc;
use tracing::{debug, info};
use wgpu::{Adapter, DeviceType, Instance};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

/// Prefer the integrated GPU for lower power draw, falling back to the
/// first candidate.
fn choose_adapter(_instance: &Instance, candidates: &[Adapter]) -> Option<usize> {
    candidates
        .iter()
        .position(|adapter| adapter.get_info().device_type == DeviceType::IntegratedGpu)
        .or_else(|| (!candidates.is_empty()).then_some(0))
}

pub struct WallpaperApp {
    service: HostService<WgpuDriver>,
    window: Option<Arc<Window>>,
}

impl WallpaperApp {
    pub fn new() -> Self {
        Self {
            service: HostService::new(),
            window: None,
        }
    }
}

impl ApplicationHandler for WallpaperApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!("Resumed");
            self.service.thread().set_paused(false);
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("flora")
            .with_inner_size(LogicalSize::new(1024, 768));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .expect("Failed to create window"),
        );

        self.service
            .connect(|| (WgpuDriver::new(choose_adapter), WallpaperRenderer::new()));

        // Attach the window, report its size and resume as one atomic
        // update so the worker never sees a half-configured state.
        let size = window.inner_size();
        let mut thread = self.service.thread().lock();
        thread.set_window(Some(NativeWindow::new(Arc::clone(&window))));
        thread.set_window_size(size.width, size.height);
        thread.set_paused(false);
        drop(thread);

        self.window = Some(window);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // Pausing is a full graphics teardown on the worker side; the
        // surface is rebuilt from the retained window on resume.
        debug!("Suspended");
        self.service.thread().set_paused(true);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.service.disconnect();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.service
                    .thread()
                    .set_window_size(size.width, size.height);
            }
            _ => {}
        }
    }
}
