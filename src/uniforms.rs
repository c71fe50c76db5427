//! Names and units of the values every background shader may read.

use crate::frame::FrameContext;
use crate::gl::GraphicsApi;
use crate::viewport::ViewportDimensions;

/// Seconds since the loop started, `float`.
pub const TIME_UNIFORM: &str = "u_time";
/// Pointer in pixels with a bottom-left origin, `vec2`.
pub const POINTER_UNIFORM: &str = "u_mousePosition";
/// Drawing buffer size in pixels, `vec2`.
pub const RESOLUTION_UNIFORM: &str = "u_resolution";
/// Clip-space quad corner, `vec2`.
pub const POSITION_ATTRIBUTE: &str = "vertPosition";

/// Converts a top-left-origin client position to the shader's
/// bottom-left origin.
pub fn flip_pointer(client_x: f64, client_y: f64, viewport_height: f64) -> [f32; 2] {
    [client_x as f32, (viewport_height - client_y) as f32]
}

/// Locations of the standard uniforms; a shader may omit any of them.
pub struct UniformLocations<G: GraphicsApi> {
    time: Option<G::UniformLocation>,
    pointer: Option<G::UniformLocation>,
    resolution: Option<G::UniformLocation>,
}

impl<G: GraphicsApi> UniformLocations<G> {
    pub fn locate(gl: &G, program: &G::Program) -> Self {
        let locations = Self {
            time: gl.uniform_location(program, TIME_UNIFORM),
            pointer: gl.uniform_location(program, POINTER_UNIFORM),
            resolution: gl.uniform_location(program, RESOLUTION_UNIFORM),
        };
        tracing::debug!(
            time = locations.time.is_some(),
            pointer = locations.pointer.is_some(),
            resolution = locations.resolution.is_some(),
            "uniforms located"
        );
        locations
    }

    pub fn upload(&self, gl: &G, context: &FrameContext, dims: ViewportDimensions) {
        if let Some(location) = &self.time {
            gl.uniform1f(location, context.elapsed_seconds as f32);
        }
        if let Some(location) = &self.pointer {
            gl.uniform2f(location, context.pointer[0], context.pointer[1]);
        }
        if let Some(location) = &self.resolution {
            let [width, height] = dims.as_vec2();
            gl.uniform2f(location, width, height);
        }
    }
}
