//! Look-dev pipeline error types.

use std::fmt;

/// Errors that can occur in the look-dev render/composite pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookDevError {
    /// Failed to initialize a backend or the pipeline itself.
    InitializationFailed(String),
    /// Failed to create a GPU resource.
    ResourceCreationFailed(String),
    /// The scene-settings override mechanism could not isolate a stage.
    ///
    /// Rendering a stage without scene isolation would leak environment
    /// settings into the host editor scene, so this aborts construction.
    SceneOverrideUnavailable(String),
    /// An internal invariant was violated.
    Internal(String),
}

impl fmt::Display for LookDevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed(msg) => write!(f, "initialization failed: {msg}"),
            Self::ResourceCreationFailed(msg) => write!(f, "resource creation failed: {msg}"),
            Self::SceneOverrideUnavailable(msg) => {
                write!(f, "scene settings override unavailable: {msg}")
            }
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for LookDevError {}
