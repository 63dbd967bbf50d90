//! Offscreen render targets and the per-slot target cache.
//!
//! Preview panels resize on most frames while the user drags a splitter,
//! so targets are owned explicitly and recreated only when the requested
//! dimensions actually change. Nothing here is garbage-deferred: dropping
//! the last reference to a [`RenderTarget`] releases the GPU allocation
//! immediately.

use std::sync::Arc;

use crate::backend::{GpuBackend, GpuTexture};
use crate::camera::Camera;
use crate::error::LookDevError;
use crate::layout::ViewCompositionIndex;
use crate::sizing::compute_render_size;
use crate::types::{Rect, TextureDescriptor, TextureFormat, TextureUsage};

/// A GPU-backed color target together with its descriptor.
pub struct RenderTarget {
    descriptor: TextureDescriptor,
    gpu: GpuTexture,
}

impl RenderTarget {
    pub(crate) fn new(descriptor: TextureDescriptor, gpu: GpuTexture) -> Self {
        Self { descriptor, gpu }
    }

    /// The target descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        self.descriptor.size.width
    }

    /// Target height in pixels.
    pub fn height(&self) -> u32 {
        self.descriptor.size.height
    }

    /// Target format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Target label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Backend handle for this target.
    pub fn gpu_handle(&self) -> &GpuTexture {
        &self.gpu
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("size", &self.descriptor.size)
            .field("format", &self.descriptor.format)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

/// State of one cached target slot.
///
/// Distinguishes a slot that never allocated from one whose target was
/// explicitly destroyed at disposal, so a disposed cache cannot be
/// silently revived by a stray late frame.
#[derive(Debug, Default)]
pub enum TargetSlot {
    /// No target has been allocated yet.
    #[default]
    Vacant,
    /// A live target.
    Live(Arc<RenderTarget>),
    /// The slot was explicitly retired; it will not allocate again.
    Retired,
}

impl TargetSlot {
    /// The live target, if any.
    pub fn live(&self) -> Option<&Arc<RenderTarget>> {
        match self {
            Self::Live(target) => Some(target),
            Self::Vacant | Self::Retired => None,
        }
    }
}

/// Owns the offscreen color targets for both views and the composite.
pub struct RenderTargetCache {
    backend: Arc<dyn GpuBackend>,
    slots: [TargetSlot; 3],
}

impl RenderTargetCache {
    /// Create an empty cache.
    pub fn new(backend: Arc<dyn GpuBackend>) -> Self {
        Self {
            backend,
            slots: [TargetSlot::Vacant, TargetSlot::Vacant, TargetSlot::Vacant],
        }
    }

    /// The live target for an index, if any.
    pub fn target(&self, index: ViewCompositionIndex) -> Option<&Arc<RenderTarget>> {
        self.slots[index.index()].live()
    }

    /// Ensure the slot's target matches the requested rectangle, then bind
    /// it as the camera's render destination.
    ///
    /// Reallocates only when the computed dimensions differ from the live
    /// target's; calling this every frame with an unchanged rectangle is a
    /// no-op beyond the camera-binding check. Retired slots stay retired.
    pub fn update_size(
        &mut self,
        index: ViewCompositionIndex,
        rect: Rect,
        pixel_perfect: bool,
        pixels_per_point: f32,
        camera: Option<&mut Camera>,
    ) -> Result<(), LookDevError> {
        let slot = &mut self.slots[index.index()];
        if matches!(slot, TargetSlot::Retired) {
            return Err(LookDevError::Internal(format!(
                "target slot {index:?} used after retirement"
            )));
        }

        let size = compute_render_size(rect, pixels_per_point, pixel_perfect);
        let needs_realloc = match slot.live() {
            Some(target) => target.width() != size.width || target.height() != size.height,
            None => true,
        };

        if needs_realloc {
            if let Some(old) = slot.live() {
                log::trace!(
                    "target {index:?}: {}x{} -> {}x{}",
                    old.width(),
                    old.height(),
                    size.width,
                    size.height
                );
            }
            // Drop the old target before allocating; a panel drag can
            // otherwise briefly double the pipeline's GPU footprint.
            *slot = TargetSlot::Vacant;

            let descriptor = TextureDescriptor::new_2d(
                size.width,
                size.height,
                TextureFormat::Rgba16Float,
                TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            )
            .with_label(slot_label(index));
            let gpu = self.backend.create_texture(&descriptor)?;
            *slot = TargetSlot::Live(Arc::new(RenderTarget::new(descriptor, gpu)));
        }

        if let (Some(camera), Some(target)) = (camera, slot.live()) {
            let bound = camera
                .render_target()
                .is_some_and(|current| Arc::ptr_eq(current, target));
            if !bound {
                camera.bind_target(Arc::clone(target));
            }
        }

        Ok(())
    }

    /// Retire every slot, destroying the live targets.
    ///
    /// Called at compositor disposal; further `update_size` calls fail.
    pub fn retire_all(&mut self) {
        for slot in &mut self.slots {
            *slot = TargetSlot::Retired;
        }
    }
}

// Ensure targets can be shared with a host render thread
static_assertions::assert_impl_all!(RenderTarget: Send, Sync);

fn slot_label(index: ViewCompositionIndex) -> &'static str {
    match index {
        ViewCompositionIndex::First => "lookdev_first_view_target",
        ViewCompositionIndex::Second => "lookdev_second_view_target",
        ViewCompositionIndex::Composite => "lookdev_composite_target",
    }
}
