//! One background: program, quad and uniforms, drawn once per tick.

use crate::config::SceneConfig;
use crate::error::Result;
use crate::frame::FrameContext;
use crate::gl::GraphicsApi;
use crate::program::{CompiledProgram, ShaderSource};
use crate::uniforms::{UniformLocations, POSITION_ATTRIBUTE};
use crate::viewport::{
    aspect_fit_scale, bind_full_viewport_quad, QuadGeometry, ViewportDimensions,
};

/// Everything a mounted background owns on the GPU.
///
/// Created by [`Scene::mount`], torn down by [`Scene::release`].
pub struct Scene<G: GraphicsApi> {
    program: CompiledProgram<G>,
    quad: QuadGeometry<G>,
    uniforms: UniformLocations<G>,
    clear_color: [f32; 4],
    quad_scale: [f32; 2],
    content_aspect: Option<f32>,
}

impl<G: GraphicsApi> Scene<G> {
    pub fn mount(gl: &G, source: &ShaderSource, config: &SceneConfig) -> Result<Self> {
        let program = CompiledProgram::build(gl, source)?;
        let quad = match bind_full_viewport_quad(
            gl,
            program.handle(),
            POSITION_ATTRIBUTE,
            config.quad_scale,
        ) {
            Ok(quad) => quad,
            Err(err) => {
                program.release(gl);
                return Err(err);
            }
        };
        let uniforms = UniformLocations::locate(gl, program.handle());

        if config.blend {
            gl.enable_alpha_blend();
        }
        tracing::info!(preset = ?config.preset, "scene mounted");

        Ok(Self {
            program,
            quad,
            uniforms,
            clear_color: config.clear_color,
            quad_scale: config.quad_scale,
            content_aspect: config.content_aspect,
        })
    }

    /// Letterboxes the quad to the configured content aspect on `dims`.
    /// Without a content aspect the quad keeps its mount-time scale.
    pub fn fit(&self, gl: &G, dims: ViewportDimensions) {
        let Some(aspect) = self.content_aspect else {
            return;
        };
        let [fit_x, fit_y] = aspect_fit_scale(aspect, dims);
        self.quad
            .upload(gl, [fit_x * self.quad_scale[0], fit_y * self.quad_scale[1]]);
    }

    /// Uploads this frame's uniforms, clears, and draws the quad.
    pub fn draw(&self, gl: &G, context: &FrameContext, dims: ViewportDimensions) {
        self.program.activate(gl);
        self.uniforms.upload(gl, context, dims);
        gl.clear(self.clear_color);
        self.quad.draw(gl);
    }

    /// Swaps in a new shader pair. The old program is released only once
    /// the new one has linked; on failure the scene keeps drawing the old one.
    pub fn replace_shaders(&mut self, gl: &G, source: &ShaderSource) -> Result<()> {
        let program = match CompiledProgram::build(gl, source) {
            Ok(program) => program,
            Err(err) => {
                self.program.activate(gl);
                return Err(err.into());
            }
        };
        let previous = std::mem::replace(&mut self.program, program);
        previous.release(gl);

        self.program.activate(gl);
        self.quad.rebind(gl, self.program.handle(), POSITION_ATTRIBUTE);
        self.uniforms = UniformLocations::locate(gl, self.program.handle());
        tracing::info!("scene shaders replaced");
        Ok(())
    }

    pub fn release(self, gl: &G) {
        self.quad.release(gl);
        self.program.release(gl);
        tracing::info!("scene released");
    }
}
