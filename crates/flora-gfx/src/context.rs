//! Graphics context - adapter negotiation and device management.
//!
//! A [`GraphicsContext`] owns the connection to the graphics subsystem
//! (instance), the adapter picked by the caller-supplied [`ConfigChooser`],
//! and the device/queue pair created on it. It holds no surface; surfaces
//! are created against it and torn down independently.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use wgpu::{
    Adapter, Backends, Device, DeviceDescriptor, Features, Instance, InstanceDescriptor, Limits,
    Queue,
};

/// Graphics resource errors. All of these are transient from the render
/// thread's point of view: creation is retried on the next wake.
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("No graphics adapters available")]
    NoAdapters,

    #[error("No adapter configuration accepted")]
    NoConfigChosen,

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Failed to create surface: {0}")]
    SurfaceCreation(String),

    #[error("Surface is not compatible with the chosen adapter")]
    Incompatible,

    #[error("Failed to acquire frame: {0}")]
    FrameAcquisition(String),
}

/// Picks one of the candidate adapters enumerated from the instance.
///
/// Returning `None` signals that no candidate is acceptable, which fails
/// context creation without touching any of them.
pub trait ConfigChooser: Send + 'static {
    fn choose(&mut self, instance: &Instance, candidates: &[Adapter]) -> Option<usize>;
}

impl<F> ConfigChooser for F
where
    F: FnMut(&Instance, &[Adapter]) -> Option<usize> + Send + 'static,
{
    fn choose(&mut self, instance: &Instance, candidates: &[Adapter]) -> Option<usize> {
        self(instance, candidates)
    }
}

/// Connection to the graphics subsystem plus the device created on the
/// chosen adapter. Dropping it releases the device, queue and instance.
pub struct GraphicsContext {
    instance: Instance,
    adapter: Adapter,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GraphicsContext {
    /// Negotiate an adapter with `chooser` and create a device on it.
    ///
    /// Fails if no adapters are available, if the chooser rejects all of
    /// them (or returns an out-of-range index), or if device creation
    /// fails. Partially acquired resources are released on every failure
    /// path before the error is returned.
    pub fn new(chooser: &mut dyn ConfigChooser) -> Result<Self, GfxError> {
        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let mut candidates = instance.enumerate_adapters(Backends::all());
        if candidates.is_empty() {
            return Err(GfxError::NoAdapters);
        }
        debug!("Enumerated {} adapter candidate(s)", candidates.len());

        let index = chooser
            .choose(&instance, &candidates)
            .ok_or(GfxError::NoConfigChosen)?;
        if index >= candidates.len() {
            return Err(GfxError::NoConfigChosen);
        }
        let adapter = candidates.swap_remove(index);

        let adapter_info = adapter.get_info();
        info!(
            "Using adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &DeviceDescriptor {
                label: Some("flora device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
            },
            None,
        ))
        .map_err(|e| GfxError::DeviceCreation(e.to_string()))?;

        device.on_uncaptured_error(Box::new(|error| {
            warn!("wgpu error: {}", error);
        }));

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<Queue> {
        &self.queue
    }
}
