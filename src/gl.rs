//! The slice of an OpenGL ES 3.0 style API the harness needs.
//!
//! The browser build implements [`GraphicsApi`] for
//! `web_sys::WebGl2RenderingContext`; tests implement it with a recording
//! fake. Handles are plain associated types so each backend keeps its own
//! object representation.

use std::fmt;

/// A programmable pipeline stage compiled independently before linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

pub trait GraphicsApi {
    type Shader;
    type Program;
    type Buffer;
    type UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    /// `None` unbinds whatever program is current.
    fn use_program(&self, program: Option<&Self::Program>);
    fn delete_program(&self, program: &Self::Program);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    /// Binds `buffer` as the array buffer and uploads `data` with static usage.
    fn upload_array_buffer(&self, buffer: &Self::Buffer, data: &[f32]);
    fn delete_buffer(&self, buffer: &Self::Buffer);

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    /// Points `location` at tightly packed float tuples in `buffer` and enables it.
    fn bind_vertex_attribute(&self, buffer: &Self::Buffer, location: u32, components: i32);

    fn uniform_location(&self, program: &Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    fn uniform1f(&self, location: &Self::UniformLocation, value: f32);
    fn uniform2f(&self, location: &Self::UniformLocation, x: f32, y: f32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Straight alpha blending: `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`.
    fn enable_alpha_blend(&self);
    fn clear(&self, color: [f32; 4]);
    fn draw_triangles(&self, first: i32, count: i32);
}
