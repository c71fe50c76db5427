use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Event, EventTarget, MediaQueryList, MediaQueryListEvent, MouseEvent, Window};

use crate::error::{HarnessError, Result};
use crate::frame::{FrameCallback, FrameId, FrameInputs, FrameScheduler};
use crate::subscription::Subscription;
use crate::uniforms::flip_pointer;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

pub fn js_error(value: JsValue) -> HarnessError {
    HarnessError::Host(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

/// `requestAnimationFrame` behind [`FrameScheduler`].
///
/// One persistent closure is registered with the browser; it pops whichever
/// callback is waiting in `slot`, so a loop re-requesting from inside its
/// own callback never allocates a new JS function.
pub struct RafScheduler {
    window: Window,
    slot: Rc<RefCell<Option<FrameCallback>>>,
    pending: Rc<Cell<Option<i32>>>,
    closure: Closure<dyn FnMut(f64)>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        let slot: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));
        let closure = {
            let slot = Rc::clone(&slot);
            let pending = Rc::clone(&pending);
            Closure::wrap(Box::new(move |now: f64| {
                pending.set(None);
                let callback = slot.borrow_mut().take();
                if let Some(callback) = callback {
                    callback(now);
                }
            }) as Box<dyn FnMut(f64)>)
        };
        Self {
            window,
            slot,
            pending,
            closure,
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameId> {
        *self.slot.borrow_mut() = Some(callback);
        let id = self
            .window
            .request_animation_frame(self.closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.pending.set(Some(id));
        Ok(FrameId(id))
    }

    fn cancel_frame(&self, id: FrameId) {
        if let Err(err) = self.window.cancel_animation_frame(id.0) {
            tracing::warn!(error = ?err, "cancelAnimationFrame failed");
        }
        if self.pending.get() == Some(id.0) {
            self.pending.set(None);
        }
        self.slot.borrow_mut().take();
    }
}

impl Drop for RafScheduler {
    fn drop(&mut self) {
        // The browser must not call into the closure once it is freed.
        if let Some(id) = self.pending.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

/// Adds `handler` as an `event` listener on `target` until the returned
/// subscription is released.
pub fn listen<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Subscription>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(js_error)?;

    let target = target.clone();
    Ok(Subscription::new(event, move || {
        if let Err(err) =
            target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::warn!(event, error = ?err, "removeEventListener failed");
        }
        drop(closure);
    }))
}

/// Keeps `inputs` in sync with the reduced-motion media query. Returns
/// `None` when the browser cannot evaluate the query; motion stays enabled.
pub fn watch_reduced_motion(window: &Window, inputs: &FrameInputs) -> Result<Option<Subscription>> {
    let query: Option<MediaQueryList> = window.match_media(REDUCED_MOTION_QUERY).map_err(js_error)?;
    let Some(query) = query else {
        tracing::debug!("matchMedia unavailable; reduced motion not observed");
        return Ok(None);
    };

    inputs.set_reduced_motion(query.matches());
    let inputs = inputs.clone();
    let subscription = listen(&query, "change", move |event| {
        if let Some(event) = event.dyn_ref::<MediaQueryListEvent>() {
            inputs.set_reduced_motion(event.matches());
        }
    })?;
    Ok(Some(subscription))
}

/// Feeds window `mousemove` positions into `inputs`, flipped to a
/// bottom-left origin against the current window height.
pub fn track_pointer(window: &Window, inputs: &FrameInputs) -> Result<Subscription> {
    let inputs = inputs.clone();
    let height_source = window.clone();
    listen(window, "mousemove", move |event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let height = height_source
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or_default();
        inputs.set_pointer(flip_pointer(
            f64::from(event.client_x()),
            f64::from(event.client_y()),
            height,
        ));
    })
}
