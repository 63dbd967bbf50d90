//! Dummy GPU backend for testing and development.
//!
//! Performs no GPU work but records every allocation, camera render and
//! compositing pass, so resource-lifetime properties (no per-frame
//! reallocation, exactly one destroy per resize) are directly observable
//! in tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::camera::Camera;
use crate::error::LookDevError;
use crate::layout::SplitKind;
use crate::scene::Scene;
use crate::targets::RenderTarget;
use crate::types::TextureDescriptor;

use super::{CompositeFrame, GpuBackend, GpuTexture};

/// Operation counters shared between a [`DummyBackend`] and its textures.
#[derive(Debug, Default)]
pub struct DummyStats {
    textures_created: AtomicUsize,
    textures_destroyed: AtomicUsize,
    renders: Mutex<Vec<String>>,
    composites: Mutex<Vec<SplitKind>>,
}

impl DummyStats {
    /// Number of textures created so far.
    pub fn textures_created(&self) -> usize {
        self.textures_created.load(Ordering::Relaxed)
    }

    /// Number of textures destroyed so far.
    pub fn textures_destroyed(&self) -> usize {
        self.textures_destroyed.load(Ordering::Relaxed)
    }

    /// Scene names of every camera render, in order.
    pub fn render_log(&self) -> Vec<String> {
        self.renders.lock().unwrap().clone()
    }

    /// Number of camera renders so far.
    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    /// Split kinds of every compositing pass, in order.
    pub fn composite_log(&self) -> Vec<SplitKind> {
        self.composites.lock().unwrap().clone()
    }

    /// Number of compositing passes so far.
    pub fn composite_count(&self) -> usize {
        self.composites.lock().unwrap().len()
    }

    /// Clear render and composite logs (allocation counters are kept).
    pub fn clear_logs(&self) {
        self.renders.lock().unwrap().clear();
        self.composites.lock().unwrap().clear();
    }
}

/// Texture handle of the dummy backend.
///
/// Carries the backend's stats so destruction is observable through the
/// drop of the handle, matching the deterministic-release contract of the
/// target cache.
#[derive(Debug)]
pub struct DummyTexture {
    stats: Arc<DummyStats>,
}

impl Drop for DummyTexture {
    fn drop(&mut self) {
        self.stats.textures_destroyed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    stats: Arc<DummyStats>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend's operation counters.
    pub fn stats(&self) -> Arc<DummyStats> {
        Arc::clone(&self.stats)
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, LookDevError> {
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{})",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height
        );
        self.stats.textures_created.fetch_add(1, Ordering::Relaxed);
        Ok(GpuTexture::Dummy(DummyTexture {
            stats: Arc::clone(&self.stats),
        }))
    }

    fn render_camera(&self, scene: &Scene, camera: &Camera) -> Result<(), LookDevError> {
        if camera.render_target().is_none() {
            return Err(LookDevError::Internal(format!(
                "camera for scene '{}' has no bound render target",
                scene.name()
            )));
        }
        if !camera.is_enabled() {
            return Err(LookDevError::Internal(format!(
                "camera for scene '{}' rendered while disabled",
                scene.name()
            )));
        }
        log::trace!("DummyBackend: rendering scene '{}'", scene.name());
        self.stats.renders.lock().unwrap().push(scene.name().to_string());
        Ok(())
    }

    fn composite(
        &self,
        frame: &CompositeFrame<'_>,
        output: &RenderTarget,
    ) -> Result<(), LookDevError> {
        log::trace!(
            "DummyBackend: compositing {}x{} ({:?})",
            output.width(),
            output.height(),
            frame.params.kind
        );
        self.stats.composites.lock().unwrap().push(frame.params.kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TextureFormat, TextureUsage};

    #[test]
    fn texture_drop_is_counted() {
        let backend = DummyBackend::new();
        let stats = backend.stats();

        let descriptor = TextureDescriptor::new_2d(
            8,
            8,
            TextureFormat::Rgba16Float,
            TextureUsage::RENDER_ATTACHMENT,
        );
        let texture = backend.create_texture(&descriptor).unwrap();
        assert_eq!(stats.textures_created(), 1);
        assert_eq!(stats.textures_destroyed(), 0);

        drop(texture);
        assert_eq!(stats.textures_destroyed(), 1);
    }

    #[test]
    fn render_requires_bound_enabled_camera() {
        let backend = DummyBackend::new();
        let scene = Scene::new("s");
        let camera = Camera::new();

        // Unbound camera is a contract violation.
        assert!(backend.render_camera(&scene, &camera).is_err());
        assert_eq!(backend.stats().render_count(), 0);
    }
}
