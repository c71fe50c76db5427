//! A mounted background: scene, animation loop and host listeners, torn
//! down together.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::SceneConfig;
use crate::error::{HarnessError, Result};
use crate::frame::{AnimationLoop, CancelHandle, FrameContext, FrameInputs, FrameScheduler};
use crate::gl::GraphicsApi;
use crate::program::ShaderSource;
use crate::scene::Scene;
use crate::subscription::SubscriptionSet;
use crate::viewport::{resize_to_display_size, RenderTarget, ViewportDimensions};

/// State shared between the background, its frame loop and its listeners.
struct Surface<G: GraphicsApi> {
    gl: Rc<G>,
    target: Rc<dyn RenderTarget>,
    scene: Rc<RefCell<Option<Scene<G>>>>,
    dims: Rc<Cell<ViewportDimensions>>,
    inputs: FrameInputs,
    last_frame: Rc<Cell<FrameContext>>,
}

impl<G: GraphicsApi> Clone for Surface<G> {
    fn clone(&self) -> Self {
        Self {
            gl: Rc::clone(&self.gl),
            target: Rc::clone(&self.target),
            scene: Rc::clone(&self.scene),
            dims: Rc::clone(&self.dims),
            inputs: self.inputs.clone(),
            last_frame: Rc::clone(&self.last_frame),
        }
    }
}

impl<G: GraphicsApi> Surface<G> {
    fn draw(&self, context: FrameContext) {
        if let Some(scene) = self.scene.borrow().as_ref() {
            scene.draw(&*self.gl, &context, self.dims.get());
            self.last_frame.set(context);
        }
    }

    fn resize(&self) {
        let dims = resize_to_display_size(&*self.target, &*self.gl);
        self.dims.set(dims);
        if let Some(scene) = self.scene.borrow().as_ref() {
            scene.fit(&*self.gl, dims);
        }
        // Resizing clears the backing store and no tick repaints it while
        // motion is suspended.
        if !self.inputs.motion_enabled() {
            self.draw(self.last_frame.get());
        }
    }
}

/// One background rendering into one target, with everything it acquired.
///
/// [`Background::unmount`] (also run on drop) cancels the loop, detaches the
/// listeners and frees the GPU objects. A mount that fails part-way releases
/// whatever it had acquired before returning the error.
pub struct Background<G: GraphicsApi + 'static, S: FrameScheduler + 'static> {
    surface: Surface<G>,
    frame_loop: Option<CancelHandle>,
    subscriptions: SubscriptionSet,
    // Kept alive for as long as the loop may run a frame through it.
    _scheduler: Rc<S>,
}

impl<G: GraphicsApi + 'static, S: FrameScheduler + 'static> Background<G, S> {
    /// Sizes the target, builds the scene, draws one still frame, attaches
    /// host listeners through `attach`, then starts the frame loop.
    pub fn mount<T, F>(
        gl: Rc<G>,
        scheduler: Rc<S>,
        target: Rc<T>,
        source: &ShaderSource,
        config: &SceneConfig,
        attach: F,
    ) -> Result<Self>
    where
        T: RenderTarget + 'static,
        F: FnOnce(&Self) -> Result<SubscriptionSet>,
    {
        let dims = resize_to_display_size(&*target, &*gl);
        let scene = Scene::mount(&*gl, source, config)?;
        scene.fit(&*gl, dims);

        let inputs = FrameInputs::new();
        let initial = FrameContext::initial(&inputs);
        let target: Rc<dyn RenderTarget> = target;
        let surface = Surface {
            gl,
            target,
            scene: Rc::new(RefCell::new(Some(scene))),
            dims: Rc::new(Cell::new(dims)),
            inputs,
            last_frame: Rc::new(Cell::new(initial)),
        };
        surface.draw(initial);

        // Any early return from here drops `background`, which unmounts it.
        let mut background = Self {
            surface,
            frame_loop: None,
            subscriptions: SubscriptionSet::new(),
            _scheduler: Rc::clone(&scheduler),
        };
        background.subscriptions = attach(&background)?;

        let surface = background.surface.clone();
        let frame_loop = AnimationLoop::start(
            scheduler,
            background.surface.inputs.clone(),
            config.frame_interval_ms,
            move |context| {
                surface.draw(context);
                Ok(())
            },
        )?;
        background.frame_loop = Some(frame_loop);

        tracing::info!(
            width = dims.width,
            height = dims.height,
            listeners = background.subscriptions.len(),
            "background mounted"
        );
        Ok(background)
    }

    /// Inputs the host's pointer and reduced-motion listeners write to.
    pub fn inputs(&self) -> &FrameInputs {
        &self.surface.inputs
    }

    pub fn dimensions(&self) -> ViewportDimensions {
        self.surface.dims.get()
    }

    /// Re-reads the target's layout size. Redraws the last frame when
    /// motion is suspended.
    pub fn resize(&self) {
        self.surface.resize();
    }

    /// A detached [`Background::resize`] for a host resize listener.
    pub fn resize_handler(&self) -> impl Fn() + 'static {
        let surface = self.surface.clone();
        move || surface.resize()
    }

    pub fn set_shaders(&self, source: &ShaderSource) -> Result<()> {
        let surface = &self.surface;
        match surface.scene.borrow_mut().as_mut() {
            Some(scene) => {
                scene.replace_shaders(&*surface.gl, source)?;
                scene.fit(&*surface.gl, surface.dims.get());
                Ok(())
            }
            None => Err(HarnessError::Host("background already unmounted".into())),
        }
    }

    /// Whether the frame loop is still scheduled.
    pub fn is_running(&self) -> bool {
        self.frame_loop
            .as_ref()
            .is_some_and(|frame_loop| !frame_loop.is_cancelled())
    }

    /// Frames drawn by the loop so far, excluding the still frame at mount.
    pub fn ticks(&self) -> u64 {
        self.frame_loop.as_ref().map_or(0, CancelHandle::ticks)
    }

    /// Stops the loop, detaches listeners and frees GPU objects. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(frame_loop) = &self.frame_loop {
            frame_loop.cancel();
        }
        if !self.subscriptions.is_empty() {
            tracing::debug!(count = self.subscriptions.len(), "detaching listeners");
            self.subscriptions.release_all();
        }
        if let Some(scene) = self.surface.scene.borrow_mut().take() {
            scene.release(&*self.surface.gl);
            tracing::info!(ticks = self.ticks(), "background unmounted");
        }
    }
}

impl<G: GraphicsApi + 'static, S: FrameScheduler + 'static> Drop for Background<G, S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
