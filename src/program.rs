//! Compile a vertex/fragment pair into a linked program.

use std::sync::Arc;

use crate::error::BuildError;
use crate::gl::{GraphicsApi, ShaderStage};
use crate::uniforms::POINTER_UNIFORM;

/// A vertex/fragment source pair. Cloning shares the underlying text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    vertex: Arc<str>,
    fragment: Arc<str>,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<Arc<str>>, fragment: impl Into<Arc<str>>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Whether the fragment stage declares the pointer uniform.
    pub fn reads_pointer(&self) -> bool {
        self.fragment.contains(POINTER_UNIFORM)
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => self.vertex(),
            ShaderStage::Fragment => self.fragment(),
        }
    }
}

/// A linked program together with the two stages it was linked from.
///
/// GPU objects are not garbage collected: call [`CompiledProgram::release`]
/// exactly once when the owner tears down. The handle must not be used for
/// draw calls afterwards, which the by-value `release` enforces.
pub struct CompiledProgram<G: GraphicsApi> {
    program: G::Program,
    vertex: G::Shader,
    fragment: G::Shader,
}

impl<G: GraphicsApi> CompiledProgram<G> {
    /// Builds and activates a program. On any failure every object created
    /// during the attempt is deleted before the error is returned.
    pub fn build(gl: &G, source: &ShaderSource) -> Result<Self, BuildError> {
        let vertex = compile_stage(gl, ShaderStage::Vertex, source.vertex())?;
        let fragment = match compile_stage(gl, ShaderStage::Fragment, source.fragment()) {
            Ok(shader) => shader,
            Err(err) => {
                gl.delete_shader(&vertex);
                return Err(err);
            }
        };

        let Some(program) = gl.create_program() else {
            gl.delete_shader(&vertex);
            gl.delete_shader(&fragment);
            return Err(BuildError::Allocation { object: "program" });
        };

        gl.attach_shader(&program, &vertex);
        gl.attach_shader(&program, &fragment);
        gl.link_program(&program);
        if !gl.link_status(&program) {
            let log = gl.program_info_log(&program).unwrap_or_default();
            gl.delete_program(&program);
            gl.delete_shader(&vertex);
            gl.delete_shader(&fragment);
            tracing::error!(%log, "shader program failed to link");
            return Err(BuildError::Link { log });
        }

        gl.use_program(Some(&program));
        tracing::debug!("shader program linked");
        Ok(Self {
            program,
            vertex,
            fragment,
        })
    }

    /// Makes this program current for subsequent draw calls.
    pub fn activate(&self, gl: &G) {
        gl.use_program(Some(&self.program));
    }

    pub fn handle(&self) -> &G::Program {
        &self.program
    }

    pub fn release(self, gl: &G) {
        gl.use_program(None);
        gl.delete_program(&self.program);
        gl.delete_shader(&self.vertex);
        gl.delete_shader(&self.fragment);
        tracing::debug!("shader program released");
    }
}

fn compile_stage<G: GraphicsApi>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, BuildError> {
    let shader = gl.create_shader(stage).ok_or(BuildError::Allocation {
        object: match stage {
            ShaderStage::Vertex => "vertex shader",
            ShaderStage::Fragment => "fragment shader",
        },
    })?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl.compile_status(&shader) {
        return Ok(shader);
    }

    let log = gl.shader_info_log(&shader).unwrap_or_default();
    gl.delete_shader(&shader);
    tracing::error!(%stage, %log, "shader stage failed to compile");
    Err(BuildError::Compile { stage, log })
}
