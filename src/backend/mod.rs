//! GPU backend abstraction.
//!
//! The pipeline performs two GPU operations per frame: rendering a stage
//! camera into an offscreen target, and compositing two rendered targets
//! into one. Both go through [`GpuBackend`], so the core stays testable
//! without GPU hardware and GPU APIs stay feature-gated.
//!
//! # Available Backends
//!
//! - `dummy` (default): records operations without touching a GPU
//! - `wgpu-backend`: cross-platform backend using wgpu

pub mod dummy;

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

use std::sync::Arc;

use crate::camera::Camera;
use crate::compositing::CompositingParameters;
use crate::error::LookDevError;
use crate::scene::Scene;
use crate::targets::RenderTarget;
use crate::types::TextureDescriptor;

pub use dummy::{DummyBackend, DummyStats, DummyTexture};
#[cfg(feature = "wgpu-backend")]
pub use wgpu_backend::WgpuBackend;

/// Handle to a GPU texture resource.
pub enum GpuTexture {
    /// Dummy backend (no GPU allocation).
    Dummy(DummyTexture),
    /// wgpu backend texture.
    #[cfg(feature = "wgpu-backend")]
    Wgpu {
        /// The texture.
        texture: Arc<wgpu::Texture>,
        /// Default view over the whole texture.
        view: Arc<wgpu::TextureView>,
    },
}

impl std::fmt::Debug for GpuTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy(_) => write!(f, "GpuTexture::Dummy"),
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu { texture, .. } => f
                .debug_struct("GpuTexture::Wgpu")
                .field("texture", texture)
                .finish_non_exhaustive(),
        }
    }
}

/// Inputs for one compositing pass.
pub struct CompositeFrame<'a> {
    /// Rendered output of the first view.
    pub first: &'a RenderTarget,
    /// Rendered output of the second view.
    pub second: &'a RenderTarget,
    /// Blend, gizmo, exposure and tone-map parameters for this frame.
    pub params: &'a CompositingParameters,
}

/// GPU backend trait.
///
/// All calls are synchronous; the pipeline is tick-driven and never holds
/// GPU work across frames.
pub trait GpuBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create a texture resource.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, LookDevError>;

    /// Render one stage camera into its bound target.
    ///
    /// The caller guarantees the camera is enabled and has a target bound;
    /// engine-level render failures are not caught at this layer.
    fn render_camera(&self, scene: &Scene, camera: &Camera) -> Result<(), LookDevError>;

    /// Composite two rendered views into the output target.
    fn composite(
        &self,
        frame: &CompositeFrame<'_>,
        output: &RenderTarget,
    ) -> Result<(), LookDevError>;
}

/// Selects and creates the appropriate backend based on available features.
pub fn create_backend() -> Result<Arc<dyn GpuBackend>, LookDevError> {
    #[cfg(feature = "wgpu-backend")]
    {
        match wgpu_backend::WgpuBackend::new() {
            Ok(backend) => {
                log::info!("Using wgpu backend");
                return Ok(Arc::new(backend));
            }
            Err(e) => {
                log::warn!("Failed to create wgpu backend: {e}");
            }
        }
    }

    log::info!("Using dummy backend");
    Ok(Arc::new(DummyBackend::new()))
}

/// Check if a real GPU backend is compiled in.
pub fn has_gpu_backend() -> bool {
    cfg!(feature = "wgpu-backend")
}
