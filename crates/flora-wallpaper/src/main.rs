//! flora wallpaper: live-rendering demo host
//!
//! Drives the render thread controller from a real windowing host:
//! initializes the global allocator, sets up logging, and bridges winit
//! lifecycle events into the controller's entry points.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use winit::event_loop::{ControlFlow, EventLoop};

mod app;
mod renderer;

use app::WallpaperApp;

// Use mimalloc as the global allocator for reduced memory fragmentation
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    // Initialize logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    info!("flora wallpaper starting...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = WallpaperApp::new();
    event_loop.run_app(&mut app)?;

    info!("flora wallpaper shutting down");
    Ok(())
}
