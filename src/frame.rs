//! Throttled, cancellable animation loop driven by host display frames.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{HarnessError, Result};

/// Token returned by a [`FrameScheduler`] for one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub i32);

/// Receives the host timestamp of the frame, in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// "Run this once before the next repaint", plus cancellation.
///
/// Implementations call each callback at most once and never call a
/// callback whose request was cancelled.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameId>;
    fn cancel_frame(&self, id: FrameId);
}

/// Inputs written by host event listeners and read by the loop every frame.
///
/// Clones share state, so a listener holds one clone and the loop another.
#[derive(Debug, Clone)]
pub struct FrameInputs {
    pointer: Rc<Cell<[f32; 2]>>,
    motion_enabled: Rc<Cell<bool>>,
}

impl Default for FrameInputs {
    fn default() -> Self {
        Self {
            pointer: Rc::new(Cell::new([0.0, 0.0])),
            motion_enabled: Rc::new(Cell::new(true)),
        }
    }
}

impl FrameInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer position in pixels with a bottom-left origin.
    pub fn set_pointer(&self, pointer: [f32; 2]) {
        self.pointer.set(pointer);
    }

    pub fn pointer(&self) -> [f32; 2] {
        self.pointer.get()
    }

    /// Mirrors the `prefers-reduced-motion: reduce` media query.
    pub fn set_reduced_motion(&self, reduced: bool) {
        if self.motion_enabled.replace(!reduced) == reduced {
            tracing::info!(reduced, "reduced motion preference changed");
        }
    }

    pub fn motion_enabled(&self) -> bool {
        self.motion_enabled.get()
    }
}

/// Snapshot handed to the tick callback by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds since the loop's first frame.
    pub elapsed_seconds: f64,
    pub pointer: [f32; 2],
    pub motion_enabled: bool,
    /// Number of ticks delivered before this one.
    pub frame_index: u64,
}

impl FrameContext {
    /// The context used for the single still frame drawn at mount.
    pub fn initial(inputs: &FrameInputs) -> Self {
        Self {
            elapsed_seconds: 0.0,
            pointer: inputs.pointer(),
            motion_enabled: inputs.motion_enabled(),
            frame_index: 0,
        }
    }
}

/// Start/last-update bookkeeping for one loop instance.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    start_ms: Option<f64>,
    last_update_ms: f64,
    min_interval_ms: f64,
}

impl FrameClock {
    pub fn new(min_interval_ms: f64) -> Self {
        Self {
            start_ms: None,
            last_update_ms: 0.0,
            min_interval_ms: min_interval_ms.max(0.0),
        }
    }

    pub fn min_interval_ms(&self) -> f64 {
        self.min_interval_ms
    }

    /// Feeds one host frame. Returns the elapsed seconds when a tick is due.
    ///
    /// The first frame only anchors the clock. Later frames are due when
    /// strictly more than the minimum interval has passed since the last
    /// delivered tick and motion is enabled; skipped frames leave the last
    /// update untouched.
    pub fn advance(&mut self, now_ms: f64, motion_enabled: bool) -> Option<f64> {
        let Some(start) = self.start_ms else {
            self.start_ms = Some(now_ms);
            self.last_update_ms = now_ms;
            return None;
        };

        let delta = now_ms - self.last_update_ms;
        if delta > self.min_interval_ms && motion_enabled {
            self.last_update_ms = now_ms;
            Some((now_ms - start) / 1000.0)
        } else {
            None
        }
    }
}

type TickFn = Box<dyn FnMut(FrameContext) -> Result<()>>;

struct LoopState<S: FrameScheduler> {
    scheduler: Rc<S>,
    inputs: FrameInputs,
    clock: RefCell<FrameClock>,
    on_tick: RefCell<TickFn>,
    pending: Cell<Option<FrameId>>,
    cancelled: Cell<bool>,
    ticks: Cell<u64>,
}

impl<S: FrameScheduler + 'static> LoopState<S> {
    fn schedule(state: &Rc<Self>) {
        let next = Rc::clone(state);
        match state
            .scheduler
            .request_frame(Box::new(move |now| LoopState::on_frame(&next, now)))
        {
            Ok(id) => state.pending.set(Some(id)),
            Err(err) => {
                tracing::error!(error = %err, "could not schedule animation frame; loop stopped");
                state.cancelled.set(true);
            }
        }
    }

    fn on_frame(state: &Rc<Self>, now_ms: f64) {
        state.pending.set(None);
        if state.cancelled.get() {
            return;
        }

        let motion_enabled = state.inputs.motion_enabled();
        let due = state.clock.borrow_mut().advance(now_ms, motion_enabled);
        if let Some(elapsed_seconds) = due {
            let context = FrameContext {
                elapsed_seconds,
                pointer: state.inputs.pointer(),
                motion_enabled,
                frame_index: state.ticks.get(),
            };
            state.ticks.set(state.ticks.get() + 1);
            let result = (&mut **state.on_tick.borrow_mut())(context);
            if let Err(err) = result {
                tracing::warn!(error = %err, frame = context.frame_index, "frame callback failed");
            }
        }

        if !state.cancelled.get() {
            LoopState::schedule(state);
        }
    }
}

trait Cancel {
    fn cancel(&self);
    fn is_cancelled(&self) -> bool;
    fn ticks(&self) -> u64;
}

impl<S: FrameScheduler> Cancel for LoopState<S> {
    fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        tracing::debug!(ticks = self.ticks.get(), "animation loop cancelled");
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}

/// Stops an [`AnimationLoop`]. Cancelling is idempotent.
///
/// Dropping the handle does not cancel; the pending frame keeps the loop
/// alive until `cancel` is called.
#[derive(Clone)]
pub struct CancelHandle {
    state: Rc<dyn Cancel>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.state.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// Ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.state.ticks()
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .field("ticks", &self.ticks())
            .finish()
    }
}

pub struct AnimationLoop;

impl AnimationLoop {
    /// Schedules the first frame and returns the handle that stops the loop.
    ///
    /// `on_tick` runs at most once per host frame, only when more than
    /// `min_interval_ms` has passed since the previous tick and motion is
    /// enabled in `inputs`. An `Err` from `on_tick` is logged and the loop
    /// keeps going.
    pub fn start<S, F>(
        scheduler: Rc<S>,
        inputs: FrameInputs,
        min_interval_ms: f64,
        on_tick: F,
    ) -> Result<CancelHandle>
    where
        S: FrameScheduler + 'static,
        F: FnMut(FrameContext) -> Result<()> + 'static,
    {
        if !min_interval_ms.is_finite() {
            return Err(HarnessError::Host(format!(
                "frame interval must be finite, got {min_interval_ms}"
            )));
        }

        let state = Rc::new(LoopState {
            scheduler,
            inputs,
            clock: RefCell::new(FrameClock::new(min_interval_ms)),
            on_tick: RefCell::new(Box::new(on_tick)),
            pending: Cell::new(None),
            cancelled: Cell::new(false),
            ticks: Cell::new(0),
        });
        LoopState::schedule(&state);
        if state.cancelled.get() {
            return Err(HarnessError::Host(
                "host refused the first animation frame request".into(),
            ));
        }
        tracing::debug!(min_interval_ms, "animation loop started");

        Ok(CancelHandle { state })
    }
}
