#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Generative WebGL2 backgrounds: shader program building, a throttled
//! animation loop, and full-viewport geometry, with the browser bindings
//! compiled only for wasm32.

pub mod background;
pub mod config;
pub mod error;
pub mod frame;
pub mod gl;
pub mod program;
pub mod registry;
pub mod scene;
pub mod shaders;
pub mod subscription;
pub mod uniforms;
pub mod viewport;

pub use background::Background;
pub use config::SceneConfig;
pub use error::{BuildError, BuildStage, ConfigError, HarnessError};
pub use frame::{AnimationLoop, CancelHandle, FrameContext, FrameInputs, FrameScheduler};
pub use gl::{GraphicsApi, ShaderStage};
pub use program::{CompiledProgram, ShaderSource};
pub use registry::CanvasRegistry;
pub use scene::Scene;
pub use shaders::Preset;
pub use viewport::{resize_to_display_size, RenderTarget, ViewportDimensions};

#[cfg(target_arch = "wasm32")]
pub use wasm::{Backgrounds, MountedBackground};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::config::SceneConfig;
    use crate::error::HarnessError;
    use crate::program::ShaderSource;
    use crate::registry::CanvasRegistry;

    mod context;
    mod host;
    mod logging;
    mod render;

    pub use render::MountedBackground;

    impl From<HarnessError> for JsValue {
        fn from(err: HarnessError) -> Self {
            JsValue::from_str(&err.to_string())
        }
    }

    #[wasm_bindgen(start)]
    pub fn main() {
        logging::init("info");
    }

    fn canvas_by_id(canvas_id: &str) -> Result<web_sys::HtmlCanvasElement, HarnessError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| HarnessError::Host("no document".into()))?;
        document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| HarnessError::Host(format!("canvas `{canvas_id}` not found")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| HarnessError::Host(format!("`{canvas_id}` is not a canvas")))
    }

    /// A mounted background and the canvas it draws into.
    struct Mounted {
        canvas_id: String,
        background: MountedBackground,
    }

    /// The page's backgrounds, keyed by an owner-chosen id.
    ///
    /// A failed mount leaves that canvas blank and is reported to the caller;
    /// other mounted backgrounds keep running.
    #[wasm_bindgen]
    #[derive(Default)]
    pub struct Backgrounds {
        mounted: CanvasRegistry<Mounted>,
    }

    #[wasm_bindgen]
    impl Backgrounds {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Backgrounds {
            Backgrounds::default()
        }

        /// Mounts the preset named in `config_json` (or the default preset).
        /// Fails if `id` is already mounted.
        pub fn mount(
            &mut self,
            id: &str,
            canvas_id: &str,
            config_json: Option<String>,
        ) -> Result<(), JsValue> {
            let config = SceneConfig::from_optional_json(config_json.as_deref())
                .map_err(HarnessError::from)?;
            let source = config.preset.source();
            self.mount_source(id, canvas_id, &source, &config)
        }

        /// Mounts a caller-supplied shader pair. Fails if `id` is already mounted.
        pub fn mount_shaders(
            &mut self,
            id: &str,
            canvas_id: &str,
            vertex: &str,
            fragment: &str,
            config_json: Option<String>,
        ) -> Result<(), JsValue> {
            let config = SceneConfig::from_optional_json(config_json.as_deref())
                .map_err(HarnessError::from)?;
            let source = ShaderSource::new(vertex, fragment);
            self.mount_source(id, canvas_id, &source, &config)
        }

        /// Shows `vertex`/`fragment` on the background registered as `id`,
        /// mounting it first if needed. An existing background on the same
        /// canvas is reused and the collision logged; one on another canvas
        /// is an error.
        pub fn share(
            &mut self,
            id: &str,
            canvas_id: &str,
            vertex: &str,
            fragment: &str,
        ) -> Result<(), JsValue> {
            let source = ShaderSource::new(vertex, fragment);
            if let Some(existing) = self.mounted.get(id) {
                if existing.canvas_id != canvas_id {
                    return Err(HarnessError::Host(format!(
                        "`{id}` is mounted on canvas `{}`, not `{canvas_id}`",
                        existing.canvas_id
                    ))
                    .into());
                }
                tracing::warn!(id, canvas_id, "background already mounted; swapping its shaders");
                return existing.background.set_shaders(&source).map_err(JsValue::from);
            }
            self.mount_source(id, canvas_id, &source, &SceneConfig::default())
        }

        /// Swaps the shaders of `id`. On failure the previous shaders keep drawing.
        pub fn set_shaders(&self, id: &str, vertex: &str, fragment: &str) -> Result<(), JsValue> {
            let mounted = self
                .mounted
                .get(id)
                .ok_or_else(|| HarnessError::Host(format!("no background `{id}`")))?;
            mounted
                .background
                .set_shaders(&ShaderSource::new(vertex, fragment))
                .map_err(JsValue::from)
        }

        /// Returns whether anything was mounted under `id`.
        pub fn unmount(&mut self, id: &str) -> bool {
            match self.mounted.remove(id) {
                Some(mut mounted) => {
                    mounted.background.unmount();
                    true
                }
                None => false,
            }
        }

        pub fn unmount_all(&mut self) {
            if self.mounted.is_empty() {
                return;
            }
            tracing::debug!(count = self.mounted.len(), "unmounting all backgrounds");
            for (_, mut mounted) in self.mounted.drain() {
                mounted.background.unmount();
            }
        }

        pub fn is_mounted(&self, id: &str) -> bool {
            self.mounted.contains(id)
        }

        /// Whether the loop of `id` is still scheduled.
        pub fn is_running(&self, id: &str) -> bool {
            self.mounted
                .get(id)
                .is_some_and(|mounted| mounted.background.is_running())
        }

        #[wasm_bindgen(getter)]
        pub fn count(&self) -> usize {
            self.mounted.len()
        }
    }

    impl Backgrounds {
        fn mount_source(
            &mut self,
            id: &str,
            canvas_id: &str,
            source: &ShaderSource,
            config: &SceneConfig,
        ) -> Result<(), JsValue> {
            if self.mounted.contains(id) {
                return Err(HarnessError::DuplicateId(id.to_owned()).into());
            }
            let canvas = canvas_by_id(canvas_id)?;
            let background = render::mount(canvas, source, config).map_err(|err| {
                tracing::error!(id, error = %err, "background failed to mount; leaving it blank");
                err
            })?;
            self.mounted.insert(
                id,
                Mounted {
                    canvas_id: canvas_id.to_owned(),
                    background,
                },
            )?;
            Ok(())
        }
    }
}
