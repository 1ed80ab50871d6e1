//! Error types for the rendering core
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are raised at
//! the call site that received the bad input; nothing here retries.

use thiserror::Error;

use crate::gfx::rendering::device::RenderTargetHandle;

/// Errors produced by the scene renderer and its GPU backends
#[derive(Debug, Error)]
pub enum RenderError {
    /// A draw-pass token that is not one of the known passes
    #[error("unknown draw pass '{0}'")]
    UnknownDrawPass(String),

    /// A named resource (mesh, texture, program) was not registered
    #[error("unknown {kind} '{name}'")]
    UnknownResource { kind: &'static str, name: String },

    /// A render target handle that was never created or has been released
    #[error("invalid render target {0:?}")]
    InvalidRenderTarget(RenderTargetHandle),

    /// An argument outside the accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A failure reported by the GPU backend
    #[error("backend error: {0}")]
    Backend(String),

    /// Settings file could not be parsed
    #[error("failed to parse render settings: {0}")]
    Config(#[from] toml::de::Error),

    /// Settings file could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Shorthand for [`RenderError::UnknownResource`]
    pub fn unknown_resource(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownResource {
            kind,
            name: name.into(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RenderError>;
