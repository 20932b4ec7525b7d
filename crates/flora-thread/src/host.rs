//! Connection counting for hosts sharing one render thread.
//!
//! A wallpaper-style service can be bound by several hosts at once while
//! only ever wanting a single render thread. `HostService` counts live
//! connections: the first one brings the thread up, the last one to leave
//! tears it down.

use crate::callbacks::RenderCallbacks;
use crate::driver::GraphicsDriver;
use crate::thread::RenderThread;
use std::sync::Mutex;
use tracing::info;

pub struct HostService<D: GraphicsDriver> {
    thread: RenderThread<D>,
    hosts: Mutex<u32>,
}

impl<D: GraphicsDriver> HostService<D> {
    pub fn new() -> Self {
        Self {
            thread: RenderThread::new(),
            hosts: Mutex::new(0),
        }
    }

    /// Register a host connection. On the first connection the factory is
    /// invoked and the render thread created from its driver/callbacks;
    /// later connections only bump the count.
    pub fn connect<C, F>(&self, factory: F)
    where
        C: RenderCallbacks<D>,
        F: FnOnce() -> (D, C),
    {
        let mut hosts = self.hosts.lock().unwrap();
        if *hosts == 0 {
            info!("First host connected, creating render thread");
            let (driver, callbacks) = factory();
            self.thread.create(driver, callbacks);
        }
        *hosts += 1;
    }

    /// Drop a host connection. The last one destroys the render thread;
    /// surplus disconnects are no-ops.
    pub fn disconnect(&self) {
        let mut hosts = self.hosts.lock().unwrap();
        match *hosts {
            0 => {}
            1 => {
                info!("Last host disconnected, destroying render thread");
                *hosts = 0;
                self.thread.destroy();
            }
            _ => *hosts -= 1,
        }
    }

    /// The controlled render thread, for the lifecycle entry points.
    pub fn thread(&self) -> &RenderThread<D> {
        &self.thread
    }

    pub fn host_count(&self) -> u32 {
        *self.hosts.lock().unwrap()
    }
}

impl<D: GraphicsDriver> Default for HostService<D> {
    fn default() -> Self {
        Self::new()
    }
}
