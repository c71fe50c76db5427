//! Full-viewport geometry and keeping the backing store in step with layout.

use crate::error::{HarnessError, Result};
use crate::gl::GraphicsApi;

/// Two triangles covering clip space from (-1, -1) to (1, 1), as `x, y` pairs.
pub const FULL_VIEWPORT_QUAD: [f32; 12] = [
    -1.0, 1.0, -1.0, -1.0, 1.0, -1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

pub const QUAD_VERTEX_COUNT: i32 = 6;

/// The full-viewport quad scaled independently along x and y.
pub fn quad_vertices(scale: [f32; 2]) -> [f32; 12] {
    let mut vertices = FULL_VIEWPORT_QUAD;
    for pair in vertices.chunks_exact_mut(2) {
        pair[0] *= scale[0];
        pair[1] *= scale[1];
    }
    vertices
}

/// Pixel size of the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportDimensions {
    pub width: u32,
    pub height: u32,
}

impl ViewportDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 for a degenerate surface.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn as_vec2(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    /// Rounds a CSS layout size to whole device pixels; negative or NaN is 0.
    pub fn from_layout(width: f64, height: f64) -> Self {
        fn to_px(value: f64) -> u32 {
            if value.is_finite() && value > 0.0 {
                value.round().min(u32::MAX as f64) as u32
            } else {
                0
            }
        }
        Self::new(to_px(width), to_px(height))
    }
}

/// Clip-space scale that fits content of `content_aspect` (width / height)
/// inside `surface` without distortion. The longer axis keeps scale 1.
pub fn aspect_fit_scale(content_aspect: f32, surface: ViewportDimensions) -> [f32; 2] {
    let surface_aspect = surface.aspect();
    if !content_aspect.is_finite() || content_aspect <= 0.0 {
        return [1.0, 1.0];
    }
    if surface_aspect > content_aspect {
        [content_aspect / surface_aspect, 1.0]
    } else {
        [1.0, surface_aspect / content_aspect]
    }
}

/// The element a scene renders into.
pub trait RenderTarget {
    /// Displayed size in CSS pixels.
    fn layout_size(&self) -> (f64, f64);
    /// Resizes the drawing buffer.
    fn set_backing_size(&self, width: u32, height: u32);
}

/// Matches the target's backing store and the graphics viewport to the
/// displayed size. Call once at mount and again on every window resize.
pub fn resize_to_display_size<T, G>(target: &T, gl: &G) -> ViewportDimensions
where
    T: RenderTarget + ?Sized,
    G: GraphicsApi + ?Sized,
{
    let (width, height) = target.layout_size();
    let dims = ViewportDimensions::from_layout(width, height);
    target.set_backing_size(dims.width, dims.height);
    gl.viewport(
        0,
        0,
        i32::try_from(dims.width).unwrap_or(i32::MAX),
        i32::try_from(dims.height).unwrap_or(i32::MAX),
    );
    tracing::trace!(width = dims.width, height = dims.height, "viewport resized");
    dims
}

/// Vertex buffer holding the quad, bound to a program's position attribute.
pub struct QuadGeometry<G: GraphicsApi> {
    buffer: G::Buffer,
    attribute: Option<u32>,
}

impl<G: GraphicsApi> QuadGeometry<G> {
    pub fn attribute(&self) -> Option<u32> {
        self.attribute
    }

    /// Points `program`'s `attribute` at this buffer, e.g. after a shader swap.
    pub fn rebind(&mut self, gl: &G, program: &G::Program, attribute: &str) {
        self.attribute = gl.attrib_location(program, attribute);
        match self.attribute {
            Some(location) => gl.bind_vertex_attribute(&self.buffer, location, 2),
            None => tracing::warn!(attribute, "vertex attribute not found in program"),
        }
    }

    /// Replaces the vertex data with the quad scaled by `scale`.
    pub fn upload(&self, gl: &G, scale: [f32; 2]) {
        gl.upload_array_buffer(&self.buffer, &quad_vertices(scale));
    }

    pub fn draw(&self, gl: &G) {
        gl.draw_triangles(0, QUAD_VERTEX_COUNT);
    }

    pub fn release(self, gl: &G) {
        gl.delete_buffer(&self.buffer);
    }
}

/// Uploads the (optionally scaled) quad and binds it to `attribute`.
///
/// A program that does not read `attribute` is not an error: the buffer is
/// still created so later draws are well defined.
pub fn bind_full_viewport_quad<G: GraphicsApi>(
    gl: &G,
    program: &G::Program,
    attribute: &str,
    scale: [f32; 2],
) -> Result<QuadGeometry<G>> {
    let buffer = gl
        .create_buffer()
        .ok_or(HarnessError::Allocation("vertex buffer"))?;

    let mut quad = QuadGeometry {
        buffer,
        attribute: None,
    };
    quad.upload(gl, scale);
    quad.rebind(gl, program, attribute);
    Ok(quad)
}
