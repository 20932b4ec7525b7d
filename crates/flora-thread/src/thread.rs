//! The render thread controller.
//!
//! One controller owns at most one worker thread at a time. Host lifecycle
//! events arrive through the setter entry points from arbitrary threads;
//! they record their effect in the shared state under a lock and wake the
//! worker, which (re)builds its graphics context and draw surface as needed
//! and invokes the render callbacks once per ready frame.
//!
//! The worker holds the lock only while reading or mutating shared state.
//! Context/surface creation, teardown, and every callback run with the lock
//! released, and the loop re-evaluates the shared state from the top after
//! each reacquisition because setters may have run in between.

use crate::callbacks::RenderCallbacks;
use crate::driver::GraphicsDriver;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// State shared between the controller handle and the worker thread,
/// mutated only under the lock.
struct SharedState<W> {
    /// A worker thread exists.
    alive: bool,
    /// Termination requested. Monotonic while a thread is alive.
    exit: bool,
    /// Rendering suspended by the host. Threads start paused.
    paused: bool,
    /// The native window to render into. Owned here once accepted.
    window: Option<W>,
    /// The window was replaced or cleared since the worker last looked.
    window_changed: bool,
    /// Last reported drawable dimensions; 0 means unknown.
    width: u32,
    height: u32,
    /// The dimensions changed since the worker last looked.
    size_changed: bool,
}

impl<W> Default for SharedState<W> {
    fn default() -> Self {
        Self {
            alive: false,
            exit: false,
            paused: true,
            window: None,
            window_changed: false,
            width: 0,
            height: 0,
            size_changed: false,
        }
    }
}

impl<W> SharedState<W> {
    fn set_paused(&mut self, paused: bool) -> bool {
        if !self.alive {
            return false;
        }
        self.paused = paused;
        true
    }

    /// Returns whether the worker needs waking. The replaced handle (or the
    /// incoming duplicate) is dropped here, releasing its window reference.
    fn set_window<D>(&mut self, window: Option<W>) -> bool
    where
        D: GraphicsDriver<Window = W>,
    {
        if !self.alive {
            // Nothing will ever consume the handle; release it immediately.
            return false;
        }
        let same = match (&self.window, &window) {
            (Some(current), Some(new)) => D::same_window(current, new),
            (None, None) => true,
            _ => false,
        };
        if same {
            // Keep the handle already owned, release the duplicate.
            return false;
        }
        self.window = window;
        self.window_changed = true;
        self.width = 0;
        self.height = 0;
        self.size_changed = true;
        true
    }

    fn set_window_size(&mut self, width: u32, height: u32) -> bool {
        if !self.alive {
            return false;
        }
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.size_changed = true;
        true
    }
}

struct Shared<W> {
    state: Mutex<SharedState<W>>,
    cond: Condvar,
}

/// Thread-safe handle to the render thread lifecycle.
///
/// All entry points may be called from any thread. Multiple independent
/// controllers can coexist; each owns at most one worker thread.
pub struct RenderThread<D: GraphicsDriver> {
    shared: Arc<Shared<D::Window>>,
    /// Serializes create/destroy against each other, establishing a strict
    /// happens-before chain across worker thread lifetimes.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<D: GraphicsDriver> RenderThread<D> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SharedState::default()),
                cond: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the worker thread. If one is already running it is fully torn
    /// down first (joined, resources released), so at most one worker ever
    /// exists. The new thread starts paused; returns once it is launched
    /// without waiting for a first frame.
    pub fn create<C>(&self, driver: D, callbacks: C)
    where
        C: RenderCallbacks<D>,
    {
        let mut worker = self.worker.lock().unwrap();
        self.stop_worker(&mut worker);

        {
            let mut state = self.shared.state.lock().unwrap();
            state.alive = true;
            state.exit = false;
            state.paused = true;
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("flora-render".to_string())
            .spawn(move || {
                debug!("Render thread started");
                run_render_loop(&shared, driver, callbacks);
                debug!("Render thread stopped");
            })
            .expect("Failed to spawn render thread");
        *worker = Some(handle);
    }

    /// Request termination, join the worker, and reset the shared state.
    /// Releases the owned window handle (if any) exactly once. No-op when
    /// no thread is running; safe to call repeatedly and from any thread
    /// other than the worker.
    pub fn destroy(&self) {
        let mut worker = self.worker.lock().unwrap();
        self.stop_worker(&mut worker);
    }

    fn stop_worker(&self, worker: &mut Option<JoinHandle<()>>) {
        let Some(handle) = worker.take() else {
            return;
        };

        {
            let mut state = self.shared.state.lock().unwrap();
            state.exit = true;
            self.shared.cond.notify_all();
        }

        if handle.join().is_err() {
            warn!("Render thread panicked during shutdown");
        }

        // Dropping the previous state releases the window handle.
        let mut state = self.shared.state.lock().unwrap();
        *state = SharedState::default();
    }

    /// Suspend or resume rendering. Purely asynchronous: the effect is
    /// recorded and the worker woken, with no guarantee it has acted on it
    /// by the time this returns. No-op when no thread is running.
    pub fn set_paused(&self, paused: bool) {
        let mut state = self.shared.state.lock().unwrap();
        if state.set_paused(paused) {
            self.shared.cond.notify_all();
        }
    }

    /// Attach, replace or clear the native window.
    ///
    /// Ownership of `window` transfers here: on the no-op paths (no thread
    /// running, or the same handle passed again) the incoming handle is
    /// released immediately, otherwise the previously owned handle is
    /// released and the new one stored. Adopting a new window resets the
    /// known dimensions to zero until the host reports them again.
    pub fn set_window(&self, window: Option<D::Window>) {
        let mut state = self.shared.state.lock().unwrap();
        if state.set_window::<D>(window) {
            self.shared.cond.notify_all();
        }
    }

    /// Report new drawable dimensions. No-op when no thread is running or
    /// the values are unchanged.
    pub fn set_window_size(&self, width: u32, height: u32) {
        let mut state = self.shared.state.lock().unwrap();
        if state.set_window_size(width, height) {
            self.shared.cond.notify_all();
        }
    }

    /// Hold the state lock across several setter calls so they take effect
    /// as one atomic unit. The worker is woken once, when the guard drops.
    ///
    /// While a guard is outstanding, `destroy` (and the worker itself)
    /// simply block on the lock; the guard borrows the controller, so the
    /// synchronization primitives cannot be torn down under a holder.
    pub fn lock(&self) -> RenderThreadLock<'_, D> {
        RenderThreadLock {
            state: self.shared.state.lock().unwrap(),
            cond: &self.shared.cond,
            dirty: false,
        }
    }
}

impl<D: GraphicsDriver> Default for RenderThread<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: GraphicsDriver> Drop for RenderThread<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Scoped acquisition of the controller state for batched setter calls.
pub struct RenderThreadLock<'a, D: GraphicsDriver> {
    state: MutexGuard<'a, SharedState<D::Window>>,
    cond: &'a Condvar,
    dirty: bool,
}

impl<D: GraphicsDriver> RenderThreadLock<'_, D> {
    pub fn set_paused(&mut self, paused: bool) {
        self.dirty |= self.state.set_paused(paused);
    }

    pub fn set_window(&mut self, window: Option<D::Window>) {
        self.dirty |= self.state.set_window::<D>(window);
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.dirty |= self.state.set_window_size(width, height);
    }
}

impl<D: GraphicsDriver> Drop for RenderThreadLock<'_, D> {
    fn drop(&mut self) {
        if self.dirty {
            self.cond.notify_all();
        }
    }
}

/// The worker loop.
///
/// Wake-time transition rules, re-evaluated from the top after every lock
/// reacquisition:
/// 1. paused: release surface, then context
/// 2. window changed: release the surface, keep the context
/// 3. no context: create one (once per wake; failures retry on the next)
/// 4. context but no surface: create one against the current window
/// 5. size changed: adopt dimensions, resize the surface in place
/// 6. block until ready to render (context + surface + positive size)
/// 7. with the lock released: pending created/size-changed notifications,
///    then the render callback, then present
/// 8. on exit: release surface then context; the window handle stays in the
///    shared state for the controller to release after joining
fn run_render_loop<D, C>(shared: &Shared<D::Window>, mut driver: D, mut callbacks: C)
where
    D: GraphicsDriver,
    C: RenderCallbacks<D>,
{
    let mut context: Option<D::Context> = None;
    let mut surface: Option<D::Surface> = None;
    let mut width = 0u32;
    let mut height = 0u32;
    let mut notify_created = false;
    let mut notify_resized = false;

    let mut state = shared.state.lock().unwrap();
    'render: loop {
        // One creation attempt per resource per wake; a failed attempt
        // falls through to the wait and retries when something changes.
        let mut tried_context = false;
        let mut tried_surface = false;

        loop {
            if state.exit {
                break 'render;
            }

            if state.paused && context.is_some() {
                let old_surface = surface.take();
                let old_context = context.take();
                drop(state);
                drop(old_surface);
                drop(old_context);
                debug!("Paused, released surface and context");
                state = shared.state.lock().unwrap();
                continue;
            }

            if state.window_changed {
                state.window_changed = false;
                if let Some(old_surface) = surface.take() {
                    drop(state);
                    drop(old_surface);
                    debug!("Window changed, released surface");
                    state = shared.state.lock().unwrap();
                    continue;
                }
            }

            if !state.paused && context.is_none() && !tried_context {
                tried_context = true;
                drop(state);
                match driver.create_context() {
                    Ok(created) => context = Some(created),
                    Err(e) => warn!("Context creation failed: {}", e),
                }
                state = shared.state.lock().unwrap();
                continue;
            }

            if !state.paused
                && context.is_some()
                && surface.is_none()
                && state.window.is_some()
                && !tried_surface
            {
                tried_surface = true;
                let window = state.window.clone();
                let (w, h) = (state.width, state.height);
                drop(state);
                if let (Some(ctx), Some(window)) = (context.as_mut(), window) {
                    match driver.create_surface(ctx, &window, w, h) {
                        Ok(created) => {
                            surface = Some(created);
                            notify_created = true;
                        }
                        Err(e) => warn!("Surface creation failed: {}", e),
                    }
                }
                state = shared.state.lock().unwrap();
                continue;
            }

            if state.size_changed {
                state.size_changed = false;
                width = state.width;
                height = state.height;
                notify_resized = true;
                if surface.is_some() && width > 0 && height > 0 {
                    drop(state);
                    if let (Some(ctx), Some(surf)) = (context.as_mut(), surface.as_mut()) {
                        driver.resize_surface(ctx, surf, width, height);
                    }
                    state = shared.state.lock().unwrap();
                    continue;
                }
            }

            if !state.paused
                && context.is_some()
                && surface.is_some()
                && width > 0
                && height > 0
            {
                break;
            }

            state = shared.cond.wait(state).unwrap();
            tried_context = false;
            tried_surface = false;
        }

        drop(state);

        if let (Some(ctx), Some(surf)) = (context.as_mut(), surface.as_mut()) {
            if notify_created {
                notify_created = false;
                callbacks.on_surface_created(ctx, surf);
            }
            if notify_resized {
                notify_resized = false;
                callbacks.on_surface_size_changed(width, height);
            }
            match driver.begin_frame(ctx, surf) {
                Ok(mut frame) => {
                    callbacks.on_render_frame(ctx, &mut frame);
                    driver.present(ctx, surf, frame);
                }
                Err(e) => warn!("Frame acquisition failed: {}", e),
            }
        }

        state = shared.state.lock().unwrap();
    }
    drop(state);

    drop(surface.take());
    drop(context.take());
    debug!("Render loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        ContextRequested,
        ContextDropped,
        SurfaceDropped,
        Created,
        Resized(u32, u32),
        Frame,
    }

    /// Window handle stub; clones share one allocation so reference counts
    /// observe how many handles are still alive.
    #[derive(Clone)]
    struct TestWindow(Arc<()>);

    impl TestWindow {
        fn new() -> Self {
            Self(Arc::new(()))
        }

        fn handle_count(&self) -> usize {
            Arc::strong_count(&self.0)
        }
    }

    struct TestContext {
        events: Sender<Event>,
    }

    impl Drop for TestContext {
        fn drop(&mut self) {
            let _ = self.events.send(Event::ContextDropped);
        }
    }

    struct TestSurface {
        events: Sender<Event>,
    }

    impl Drop for TestSurface {
        fn drop(&mut self) {
            let _ = self.events.send(Event::SurfaceDropped);
        }
    }

    struct TestDriver {
        events: Sender<Event>,
        fail_context: Arc<AtomicBool>,
    }

    impl GraphicsDriver for TestDriver {
        type Context = TestContext;
        type Surface = TestSurface;
        type Frame = ();
        type Window = TestWindow;
        type Error = String;

        fn create_context(&mut self) -> Result<TestContext, String> {
            let _ = self.events.send(Event::ContextRequested);
            if self.fail_context.load(Ordering::SeqCst) {
                return Err("no config accepted".to_string());
            }
            Ok(TestContext {
                events: self.events.clone(),
            })
        }

        fn create_surface(
            &mut self,
            _context: &mut TestContext,
            _window: &TestWindow,
            _width: u32,
            _height: u32,
        ) -> Result<TestSurface, String> {
            Ok(TestSurface {
                events: self.events.clone(),
            })
        }

        fn resize_surface(
            &mut self,
            _context: &mut TestContext,
            _surface: &mut TestSurface,
            _width: u32,
            _height: u32,
        ) {
        }

        fn begin_frame(
            &mut self,
            _context: &mut TestContext,
            _surface: &mut TestSurface,
        ) -> Result<(), String> {
            Ok(())
        }

        fn present(&mut self, _context: &mut TestContext, _surface: &mut TestSurface, _frame: ()) {
            // Simulated vsync so the loop does not spin flat out.
            thread::sleep(Duration::from_millis(1));
        }

        fn same_window(a: &TestWindow, b: &TestWindow) -> bool {
            Arc::ptr_eq(&a.0, &b.0)
        }
    }

    struct TestCallbacks {
        events: Sender<Event>,
    }

    impl RenderCallbacks<TestDriver> for TestCallbacks {
        fn on_surface_created(&mut self, _context: &mut TestContext, _surface: &mut TestSurface) {
            let _ = self.events.send(Event::Created);
        }

        fn on_surface_size_changed(&mut self, width: u32, height: u32) {
            let _ = self.events.send(Event::Resized(width, height));
        }

        fn on_render_frame(&mut self, _context: &mut TestContext, _frame: &mut ()) {
            let _ = self.events.send(Event::Frame);
        }
    }

    struct Harness {
        thread: RenderThread<TestDriver>,
        events: Receiver<Event>,
        sender: Sender<Event>,
        fail_context: Arc<AtomicBool>,
    }

    impl Harness {
        fn new() -> Self {
            let (sender, events) = unbounded();
            let fail_context = Arc::new(AtomicBool::new(false));
            let harness = Self {
                thread: RenderThread::new(),
                events,
                sender,
                fail_context,
            };
            harness.create();
            harness
        }

        fn create(&self) {
            self.thread.create(
                TestDriver {
                    events: self.sender.clone(),
                    fail_context: Arc::clone(&self.fail_context),
                },
                TestCallbacks {
                    events: self.sender.clone(),
                },
            );
        }
    }

    fn wait_for(events: &Receiver<Event>, pred: impl Fn(&Event) -> bool) -> Event {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .expect("timed out waiting for event");
            let event = events
                .recv_timeout(remaining)
                .expect("timed out waiting for event");
            if pred(&event) {
                return event;
            }
        }
    }

    fn wait_for_frame(events: &Receiver<Event>) {
        wait_for(events, |e| *e == Event::Frame);
    }

    /// Drain everything sent for `window_ms`, asserting `forbidden` never
    /// shows up.
    fn assert_quiet(events: &Receiver<Event>, window_ms: u64, forbidden: impl Fn(&Event) -> bool) {
        let deadline = Instant::now() + Duration::from_millis(window_ms);
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match events.recv_timeout(remaining) {
                Ok(event) => assert!(!forbidden(&event), "unexpected event: {:?}", event),
                Err(_) => break,
            }
        }
    }

    fn drain(events: &Receiver<Event>) {
        while events.try_recv().is_ok() {}
    }

    #[test]
    fn reaches_rendering_in_callback_order() {
        let harness = Harness::new();
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(100, 200);
        harness.thread.set_paused(false);

        wait_for(&harness.events, |e| *e == Event::Created);
        let resized = wait_for(&harness.events, |e| {
            matches!(e, Event::Resized(..) | Event::Frame)
        });
        assert_eq!(resized, Event::Resized(100, 200), "frame before resize");
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn no_rendering_before_window_and_size() {
        let harness = Harness::new();
        harness.thread.set_paused(false);

        // Context may come up, but no surface and no frames yet.
        assert_quiet(&harness.events, 100, |e| {
            matches!(e, Event::Created | Event::Frame)
        });

        harness.thread.set_window(Some(TestWindow::new()));
        assert_quiet(&harness.events, 100, |e| matches!(e, Event::Frame));

        harness.thread.set_window_size(640, 480);
        wait_for(&harness.events, |e| *e == Event::Created);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn size_before_window_also_reaches_rendering() {
        let harness = Harness::new();
        harness.thread.set_paused(false);
        harness.thread.set_window_size(640, 480);
        assert_quiet(&harness.events, 100, |e| matches!(e, Event::Frame));

        // Attaching the window resets the dimensions, so they must be
        // reported again before frames flow.
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(640, 480);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn starts_paused_and_pause_masks_rendering() {
        let harness = Harness::new();
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(320, 240);

        // Threads start paused; nothing happens until resumed.
        assert_quiet(&harness.events, 150, |e| {
            matches!(e, Event::Created | Event::Frame | Event::ContextRequested)
        });

        harness.thread.set_paused(false);
        wait_for_frame(&harness.events);

        // Pausing again releases the surface and context and stops frames.
        harness.thread.set_paused(true);
        wait_for(&harness.events, |e| *e == Event::ContextDropped);
        drain(&harness.events);
        assert_quiet(&harness.events, 150, |e| matches!(e, Event::Frame));

        harness.thread.set_paused(false);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn window_and_size_churn_while_paused_does_not_render() {
        let harness = Harness::new();
        for i in 1..5u32 {
            harness.thread.set_window(Some(TestWindow::new()));
            harness.thread.set_window_size(100 * i, 100);
        }
        assert_quiet(&harness.events, 150, |e| matches!(e, Event::Frame));

        harness.thread.set_paused(false);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn same_window_handle_is_released_without_renotifying() {
        let harness = Harness::new();
        let window = TestWindow::new();
        harness.thread.set_window(Some(window.clone()));
        harness.thread.set_window_size(100, 100);
        harness.thread.set_paused(false);
        wait_for(&harness.events, |e| *e == Event::Created);
        wait_for_frame(&harness.events);
        drain(&harness.events);

        // Probe + controller copy; any surface-creation clone is gone.
        assert_eq!(window.handle_count(), 2);

        harness.thread.set_window(Some(window.clone()));
        assert_quiet(&harness.events, 150, |e| {
            matches!(e, Event::Created | Event::SurfaceDropped)
        });
        assert_eq!(window.handle_count(), 2, "duplicate handle not released");

        harness.thread.destroy();
        assert_eq!(window.handle_count(), 1, "window not released on destroy");
    }

    #[test]
    fn clearing_window_stops_rendering_until_reattached() {
        let harness = Harness::new();
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(100, 100);
        harness.thread.set_paused(false);
        wait_for_frame(&harness.events);

        harness.thread.set_window(None);
        wait_for(&harness.events, |e| *e == Event::SurfaceDropped);
        drain(&harness.events);
        // The context survives a window change; only the surface goes.
        assert_quiet(&harness.events, 150, |e| {
            matches!(e, Event::Frame | Event::ContextDropped)
        });

        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(100, 100);
        wait_for(&harness.events, |e| *e == Event::Created);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn destroy_is_idempotent_and_releases_window_once() {
        let harness = Harness::new();
        let window = TestWindow::new();
        harness.thread.set_window(Some(window.clone()));
        harness.thread.set_window_size(100, 100);
        harness.thread.set_paused(false);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
        assert_eq!(window.handle_count(), 1);
        harness.thread.destroy();
        assert_eq!(window.handle_count(), 1);

        // Setters after destroy are no-ops; a passed window is released
        // immediately because nothing will consume it.
        let orphan = TestWindow::new();
        harness.thread.set_window(Some(orphan.clone()));
        assert_eq!(orphan.handle_count(), 1);
        harness.thread.set_paused(false);
        harness.thread.set_window_size(100, 100);
        assert_quiet(&harness.events, 100, |e| matches!(e, Event::Frame));
    }

    #[test]
    fn destroy_without_create_is_a_noop() {
        let thread: RenderThread<TestDriver> = RenderThread::new();
        thread.destroy();
        thread.destroy();
    }

    #[test]
    fn create_replaces_the_previous_thread() {
        let harness = Harness::new();
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(100, 100);
        harness.thread.set_paused(false);
        wait_for_frame(&harness.events);

        // Second create tears the first worker down (surface and context
        // released) before spawning its replacement.
        harness.create();
        wait_for(&harness.events, |e| *e == Event::ContextDropped);
        drain(&harness.events);
        assert_quiet(&harness.events, 150, |e| matches!(e, Event::Frame));

        // The replacement starts from scratch: paused, no window, no size.
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(200, 200);
        harness.thread.set_paused(false);
        wait_for(&harness.events, |e| *e == Event::Created);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn rejected_config_never_creates_a_surface() {
        let harness = Harness::new();
        harness.fail_context.store(true, Ordering::SeqCst);
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(100, 100);
        harness.thread.set_paused(false);

        wait_for(&harness.events, |e| *e == Event::ContextRequested);
        assert_quiet(&harness.events, 200, |e| {
            matches!(e, Event::Created | Event::Frame)
        });

        harness.thread.destroy();
    }

    #[test]
    fn context_failure_retries_on_a_later_wake() {
        let harness = Harness::new();
        harness.fail_context.store(true, Ordering::SeqCst);
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(100, 100);
        harness.thread.set_paused(false);
        wait_for(&harness.events, |e| *e == Event::ContextRequested);

        harness.fail_context.store(false, Ordering::SeqCst);
        // Any setter wake triggers the retry.
        harness.thread.set_window_size(120, 100);
        wait_for(&harness.events, |e| *e == Event::Created);
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn lock_guard_batches_setters_into_one_wake() {
        let harness = Harness::new();
        {
            let mut guard = harness.thread.lock();
            guard.set_window(Some(TestWindow::new()));
            guard.set_window_size(100, 100);
            guard.set_paused(false);
        }
        wait_for(&harness.events, |e| *e == Event::Created);
        wait_for_frame(&harness.events);

        // Pausing and detaching atomically: the worker never observes the
        // unpaused-but-windowless intermediate.
        {
            let mut guard = harness.thread.lock();
            guard.set_paused(true);
            guard.set_window(None);
        }
        wait_for(&harness.events, |e| *e == Event::ContextDropped);
        drain(&harness.events);
        assert_quiet(&harness.events, 150, |e| matches!(e, Event::Frame));

        harness.thread.destroy();
    }

    #[test]
    fn independent_controllers_do_not_interfere() {
        let first = Harness::new();
        let second = Harness::new();

        first.thread.set_window(Some(TestWindow::new()));
        first.thread.set_window_size(100, 100);
        first.thread.set_paused(false);
        second.thread.set_window(Some(TestWindow::new()));
        second.thread.set_window_size(200, 200);
        second.thread.set_paused(false);

        wait_for_frame(&first.events);
        wait_for_frame(&second.events);

        first.thread.destroy();
        drain(&second.events);
        wait_for_frame(&second.events);

        second.thread.destroy();
    }

    #[test]
    fn size_change_while_rendering_notifies_without_recreating() {
        let harness = Harness::new();
        harness.thread.set_window(Some(TestWindow::new()));
        harness.thread.set_window_size(100, 100);
        harness.thread.set_paused(false);
        wait_for_frame(&harness.events);
        drain(&harness.events);

        harness.thread.set_window_size(300, 400);
        wait_for(&harness.events, |e| *e == Event::Resized(300, 400));
        // The surface was resized in place, not recreated.
        assert_quiet(&harness.events, 100, |e| {
            matches!(e, Event::Created | Event::SurfaceDropped)
        });
        wait_for_frame(&harness.events);

        harness.thread.destroy();
    }

    #[test]
    fn state_setters_dedup_and_gate_on_alive() {
        let mut state: SharedState<TestWindow> = SharedState::default();
        assert!(!state.set_paused(false), "no thread, no effect");
        assert!(!state.set_window_size(10, 10));
        assert!(!state.set_window::<TestDriver>(Some(TestWindow::new())));
        assert!(state.window.is_none());

        state.alive = true;
        assert!(state.set_window_size(10, 10));
        state.size_changed = false;
        assert!(!state.set_window_size(10, 10), "unchanged size is a no-op");
        assert!(!state.size_changed);

        let window = TestWindow::new();
        assert!(state.set_window::<TestDriver>(Some(window.clone())));
        assert_eq!((state.width, state.height), (0, 0), "size reset on attach");
        state.window_changed = false;
        assert!(!state.set_window::<TestDriver>(Some(window.clone())));
        assert!(!state.window_changed, "same handle must not set the flag");
        assert!(state.set_window::<TestDriver>(None));
        assert_eq!(window.handle_count(), 1, "old handle released on clear");
        assert!(!state.set_window::<TestDriver>(None), "already cleared");
    }
}
