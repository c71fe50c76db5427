use thiserror::Error;

use crate::gl::ShaderStage;

/// Why a vertex/fragment pair could not become a usable program.
///
/// Every variant is terminal for the build attempt that produced it; shader
/// source is static, so retrying would fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("could not compile {stage} shader:\n\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("could not link shader program:\n\n{log}")]
    Link { log: String },
    #[error("graphics driver refused to allocate a {object}")]
    Allocation { object: &'static str },
}

/// Which step of the build failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Vertex,
    Fragment,
    Link,
    Allocation,
}

impl BuildError {
    pub fn stage(&self) -> BuildStage {
        match self {
            BuildError::Compile {
                stage: ShaderStage::Vertex,
                ..
            } => BuildStage::Vertex,
            BuildError::Compile {
                stage: ShaderStage::Fragment,
                ..
            } => BuildStage::Fragment,
            BuildError::Link { .. } => BuildStage::Link,
            BuildError::Allocation { .. } => BuildStage::Allocation,
        }
    }

    /// Driver diagnostics, empty for allocation failures.
    pub fn log(&self) -> &str {
        match self {
            BuildError::Compile { log, .. } | BuildError::Link { log } => log,
            BuildError::Allocation { .. } => "",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse scene configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scene configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("graphics context unavailable: {0}")]
    MissingContext(String),
    #[error("graphics driver refused to allocate a {0}")]
    Allocation(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("id `{0}` is already registered")]
    DuplicateId(String),
    #[error("host call failed: {0}")]
    Host(String),
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
