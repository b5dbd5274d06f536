use std::fmt;

use tga::TgaError;
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{program} {stage} shader compilation failed:\n{log}")]
    ShaderCompile {
        program: &'static str,
        stage: ShaderStage,
        log: String,
    },
    #[error("{program} shader linking failed:\n{log}")]
    ShaderLink { program: &'static str, log: String },
    #[error("could not decode texture: {0}")]
    Decode(#[from] TgaError),
    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("GPU allocation failed: {0}")]
    GpuAllocation(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
