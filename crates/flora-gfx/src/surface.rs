//! Draw surface - binds a renderable surface to a native window.
//!
//! A [`DrawSurface`] only makes sense together with the [`GraphicsContext`]
//! it was created against; drop the surface before dropping its context.
//! The context stays valid for a future surface after the drop.

use crate::context::{GfxError, GraphicsContext};
use crate::window::NativeWindow;
use std::sync::Arc;
use tracing::{debug, info};
use wgpu::{
    CommandEncoder, Device, PresentMode, Queue, Surface, SurfaceConfiguration, SurfaceTexture,
    TextureFormat, TextureUsages, TextureView,
};

/// Renderable surface bound to a native window.
pub struct DrawSurface {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl DrawSurface {
    /// Create a surface for `window` against an existing context and make
    /// it renderable at the given dimensions (clamped to at least 1).
    ///
    /// Fails if the platform rejects the window handle or if the surface
    /// is incompatible with the context's adapter; nothing is left bound
    /// on failure.
    pub fn new(
        context: &GraphicsContext,
        window: &NativeWindow,
        width: u32,
        height: u32,
    ) -> Result<Self, GfxError> {
        info!("Creating draw surface ({}x{})", width, height);

        let surface = context
            .instance()
            .create_surface(window.source())
            .map_err(|e| GfxError::SurfaceCreation(e.to_string()))?;

        let caps = surface.get_capabilities(context.adapter());
        if caps.formats.is_empty() {
            return Err(GfxError::Incompatible);
        }

        // Prefer sRGB format for correct color
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        debug!("Surface format: {:?}", format);

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(context.device(), &config);

        Ok(Self {
            surface,
            config,
            device: Arc::clone(context.device()),
            queue: Arc::clone(context.queue()),
        })
    }

    /// Adopt new dimensions. Reconfigures in place; the surface is never
    /// recreated for a size change.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.config.width && height == self.config.height {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        debug!("Surface resized to {}x{}", width, height);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    /// Acquire the next frame. Acquisition failures are transient; the
    /// caller is expected to retry on a later frame.
    pub fn begin_frame(&self) -> Result<Frame, GfxError> {
        let output = self
            .surface
            .get_current_texture()
            .map_err(|e| GfxError::FrameAcquisition(e.to_string()))?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        Ok(Frame {
            output,
            view,
            encoder,
            queue: Arc::clone(&self.queue),
        })
    }
}

/// A frame being rendered.
pub struct Frame {
    output: SurfaceTexture,
    pub view: TextureView,
    pub encoder: CommandEncoder,
    queue: Arc<Queue>,
}

impl Frame {
    /// Clear the frame with a color.
    pub fn clear(&mut self, color: wgpu::Color) {
        let _render_pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        // Render pass ends when dropped
    }

    /// Submit the recorded commands and present the frame.
    pub fn present(self) {
        self.queue.submit(std::iter::once(self.encoder.finish()));
        self.output.present();
    }
}
