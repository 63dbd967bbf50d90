//! Per-view rendering: one camera render into a cached target.

use std::sync::Arc;

use crate::backend::GpuBackend;
use crate::error::LookDevError;
use crate::layout::ViewSlot;
use crate::stage::Stage;
use crate::targets::{RenderTarget, RenderTargetCache};
use crate::types::Rect;

/// Transient request pairing a view slot with its viewport rectangle.
///
/// Rebuilt every frame. After a successful acquire, `output` aliases the
/// target cache's entry for the slot; it never owns the stage.
#[derive(Debug)]
pub struct RenderingRequest {
    /// View being rendered.
    pub slot: ViewSlot,
    /// Requested viewport rectangle in points.
    pub viewport: Rect,
    /// Rendered texture, or `None` for a degenerate viewport.
    pub output: Option<Arc<RenderTarget>>,
}

impl RenderingRequest {
    /// Create a request with no output yet.
    pub fn new(slot: ViewSlot, viewport: Rect) -> Self {
        Self {
            slot,
            viewport,
            output: None,
        }
    }
}

/// Renders one view per call: sizes the target, shows the stage content,
/// performs a single synchronous camera render, and hides it again.
pub struct ViewRenderer {
    backend: Arc<dyn GpuBackend>,
    /// Round the supersampling factor to an integer to avoid resampling
    /// blur.
    pub pixel_perfect: bool,
}

impl ViewRenderer {
    /// Create a renderer. Pixel-perfect sizing is off by default.
    pub fn new(backend: Arc<dyn GpuBackend>) -> Self {
        Self {
            backend,
            pixel_perfect: false,
        }
    }

    /// Render the request's view into its slot's cached target.
    ///
    /// A degenerate viewport leaves `output == None` without touching the
    /// target cache or the camera; the next frame retries naturally.
    /// Content visibility and camera enablement are restored even when the
    /// render itself fails.
    pub fn acquire(
        &self,
        request: &mut RenderingRequest,
        stage: &mut Stage,
        targets: &mut RenderTargetCache,
        pixels_per_point: f32,
    ) -> Result<(), LookDevError> {
        if request.viewport.is_degenerate() {
            request.output = None;
            return Ok(());
        }

        stage.set_content_visible(true);
        let result = targets
            .update_size(
                request.slot.into(),
                request.viewport,
                self.pixel_perfect,
                pixels_per_point,
                Some(stage.camera_mut()),
            )
            .and_then(|()| {
                stage.camera_mut().set_enabled(true);
                let rendered = self.backend.render_camera(stage.scene(), stage.camera());
                stage.camera_mut().set_enabled(false);
                rendered
            });
        stage.set_content_visible(false);
        result?;

        request.output = targets.target(request.slot.into()).cloned();
        Ok(())
    }
}
