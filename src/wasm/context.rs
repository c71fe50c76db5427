use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation,
};

use crate::error::{HarnessError, Result};
use crate::gl::{GraphicsApi, ShaderStage};
use crate::viewport::RenderTarget;

pub fn webgl2_context(canvas: &HtmlCanvasElement) -> Result<GL> {
    canvas
        .get_context("webgl2")
        .map_err(|err| HarnessError::MissingContext(format!("{err:?}")))?
        .ok_or_else(|| HarnessError::MissingContext("WebGL2 not supported".into()))?
        .dyn_into::<GL>()
        .map_err(|_| HarnessError::MissingContext("context is not WebGL2".into()))
}

impl GraphicsApi for GL {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type UniformLocation = WebGlUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        GL::create_shader(
            self,
            match stage {
                ShaderStage::Vertex => GL::VERTEX_SHADER,
                ShaderStage::Fragment => GL::FRAGMENT_SHADER,
            },
        )
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        GL::shader_source(self, shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        GL::compile_shader(self, shader);
    }

    fn compile_status(&self, shader: &WebGlShader) -> bool {
        self.get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.get_shader_info_log(shader)
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        GL::delete_shader(self, Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        GL::create_program(self)
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        GL::attach_shader(self, program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        GL::link_program(self, program);
    }

    fn link_status(&self, program: &WebGlProgram) -> bool {
        self.get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.get_program_info_log(program)
    }

    fn use_program(&self, program: Option<&WebGlProgram>) {
        GL::use_program(self, program);
    }

    fn delete_program(&self, program: &WebGlProgram) {
        GL::delete_program(self, Some(program));
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        GL::create_buffer(self)
    }

    fn upload_array_buffer(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        let array = js_sys::Float32Array::from(data);
        self.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        GL::delete_buffer(self, Some(buffer));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        u32::try_from(self.get_attrib_location(program, name)).ok()
    }

    fn bind_vertex_attribute(&self, buffer: &WebGlBuffer, location: u32, components: i32) {
        self.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
        self.enable_vertex_attrib_array(location);
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.get_uniform_location(program, name)
    }

    fn uniform1f(&self, location: &WebGlUniformLocation, value: f32) {
        GL::uniform1f(self, Some(location), value);
    }

    fn uniform2f(&self, location: &WebGlUniformLocation, x: f32, y: f32) {
        GL::uniform2f(self, Some(location), x, y);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        GL::viewport(self, x, y, width, height);
    }

    fn enable_alpha_blend(&self) {
        self.enable(GL::BLEND);
        self.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
    }

    fn clear(&self, color: [f32; 4]) {
        self.clear_color(color[0], color[1], color[2], color[3]);
        GL::clear(self, GL::COLOR_BUFFER_BIT);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.draw_arrays(GL::TRIANGLES, first, count);
    }
}

/// A canvas sized from its bounding box.
pub struct CanvasTarget(pub HtmlCanvasElement);

impl RenderTarget for CanvasTarget {
    fn layout_size(&self) -> (f64, f64) {
        let rect = self.0.get_bounding_client_rect();
        (rect.width(), rect.height())
    }

    fn set_backing_size(&self, width: u32, height: u32) {
        self.0.set_width(width);
        self.0.set_height(height);
    }
}
