use std::rc::Rc;

use web_sys::{window, HtmlCanvasElement, WebGl2RenderingContext as GL};

use super::context::{webgl2_context, CanvasTarget};
use super::host::{listen, track_pointer, watch_reduced_motion, RafScheduler};
use crate::background::Background;
use crate::config::SceneConfig;
use crate::error::{HarnessError, Result};
use crate::program::ShaderSource;
use crate::subscription::SubscriptionSet;

/// A background rendering into one canvas through `requestAnimationFrame`.
pub type MountedBackground = Background<GL, RafScheduler>;

/// Mounts `source` on `canvas` and wires window resize, pointer and
/// reduced-motion listeners to it.
pub fn mount(
    canvas: HtmlCanvasElement,
    source: &ShaderSource,
    config: &SceneConfig,
) -> Result<MountedBackground> {
    let window = window().ok_or_else(|| HarnessError::Host("no window".into()))?;
    let gl = Rc::new(webgl2_context(&canvas)?);
    let scheduler = Rc::new(RafScheduler::new(window.clone()));
    let follow_pointer = config.pointer_tracking(source);

    Background::mount(
        gl,
        scheduler,
        Rc::new(CanvasTarget(canvas)),
        source,
        config,
        |background| {
            let mut subscriptions = SubscriptionSet::new();
            let resize = background.resize_handler();
            subscriptions.push(listen(&window, "resize", move |_| resize())?);
            if follow_pointer {
                subscriptions.push(track_pointer(&window, background.inputs())?);
            }
            if config.respect_reduced_motion {
                if let Some(subscription) = watch_reduced_motion(&window, background.inputs())? {
                    subscriptions.push(subscription);
                }
            }
            Ok(subscriptions)
        },
    )
}
