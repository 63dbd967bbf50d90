//! Display-surface contract and a plain panel implementation.
//!
//! The display surface is the editor-hosted UI the pipeline renders for.
//! It reports viewport rectangles per output index, receives the final
//! textures, and queues layout-change and capture-request notifications
//! that the compositor drains at the top of each frame.

use std::sync::Arc;

use crate::layout::{LayoutMode, ViewCompositionIndex, ViewSlot};
use crate::targets::RenderTarget;
use crate::types::Rect;

/// Notifications a display surface emits toward the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceNotification {
    /// The user switched the view layout.
    LayoutChanged(LayoutMode),
    /// A frame capture was requested for the next rendered frame.
    CaptureRequested,
}

/// Opaque handle identifying a surface to the capture tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SurfaceHandle(pub u64);

/// Contract implemented by the hosting UI surface.
pub trait DisplaySurface {
    /// The on-screen rectangle for one output index under the current
    /// layout.
    fn viewport_rect(&self, index: ViewCompositionIndex) -> Rect;

    /// Deliver a rendered texture for one output index. `None` clears the
    /// output (degenerate viewport this frame).
    fn set_output_texture(
        &mut self,
        index: ViewCompositionIndex,
        texture: Option<Arc<RenderTarget>>,
    );

    /// Drain queued notifications, oldest first.
    fn drain_notifications(&mut self) -> Vec<SurfaceNotification> {
        Vec::new()
    }

    /// Display pixel density.
    fn pixels_per_point(&self) -> f32 {
        1.0
    }

    /// Handle passed to the capture tool when bracketing a frame.
    fn surface_handle(&self) -> SurfaceHandle {
        SurfaceHandle::default()
    }
}

/// Compute the sub-rectangle one output occupies within a panel.
///
/// Plain split layouts carve the panel in half per view; every other
/// layout (and the composite output) uses the whole panel.
pub fn layout_rect(panel: Rect, layout: LayoutMode, index: ViewCompositionIndex) -> Rect {
    let slot = match index {
        ViewCompositionIndex::First => ViewSlot::First,
        ViewCompositionIndex::Second => ViewSlot::Second,
        ViewCompositionIndex::Composite => return panel,
    };
    match layout {
        LayoutMode::VerticalSplit => {
            let half = panel.width * 0.5;
            match slot {
                ViewSlot::First => Rect::new(panel.x, panel.y, half, panel.height),
                ViewSlot::Second => Rect::new(panel.x + half, panel.y, half, panel.height),
            }
        }
        LayoutMode::HorizontalSplit => {
            let half = panel.height * 0.5;
            match slot {
                ViewSlot::First => Rect::new(panel.x, panel.y, panel.width, half),
                ViewSlot::Second => Rect::new(panel.x, panel.y + half, panel.width, half),
            }
        }
        LayoutMode::FullFirst
        | LayoutMode::FullSecond
        | LayoutMode::CustomSplit
        | LayoutMode::CustomCircular => panel,
    }
}

/// A plain display surface backed by one panel rectangle.
///
/// Suitable for tests and for hosts that manage their own UI around the
/// pipeline: the host updates the panel rect and layout, the compositor
/// reads rects and delivers textures.
#[derive(Debug)]
pub struct PanelSurface {
    panel: Rect,
    layout: LayoutMode,
    pixels_per_point: f32,
    handle: SurfaceHandle,
    outputs: [Option<Arc<RenderTarget>>; 3],
    pending: Vec<SurfaceNotification>,
}

impl PanelSurface {
    /// Create a surface over a panel rectangle.
    pub fn new(panel: Rect) -> Self {
        Self {
            panel,
            layout: LayoutMode::default(),
            pixels_per_point: 1.0,
            handle: SurfaceHandle::default(),
            outputs: [None, None, None],
            pending: Vec::new(),
        }
    }

    /// Update the panel rectangle (e.g. on window resize).
    pub fn set_panel_rect(&mut self, panel: Rect) {
        self.panel = panel;
    }

    /// The current panel rectangle.
    pub fn panel_rect(&self) -> Rect {
        self.panel
    }

    /// Switch the layout and queue the corresponding notification.
    pub fn set_layout(&mut self, layout: LayoutMode) {
        if self.layout != layout {
            self.layout = layout;
            self.pending.push(SurfaceNotification::LayoutChanged(layout));
        }
    }

    /// The layout the surface is currently arranged for.
    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    /// Queue a capture request for the next frame.
    pub fn request_capture(&mut self) {
        self.pending.push(SurfaceNotification::CaptureRequested);
    }

    /// Set the display pixel density.
    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point;
    }

    /// Set the handle reported to the capture tool.
    pub fn set_surface_handle(&mut self, handle: SurfaceHandle) {
        self.handle = handle;
    }

    /// The last texture delivered for an output index.
    pub fn output(&self, index: ViewCompositionIndex) -> Option<&Arc<RenderTarget>> {
        self.outputs[index.index()].as_ref()
    }
}

impl DisplaySurface for PanelSurface {
    fn viewport_rect(&self, index: ViewCompositionIndex) -> Rect {
        layout_rect(self.panel, self.layout, index)
    }

    fn set_output_texture(
        &mut self,
        index: ViewCompositionIndex,
        texture: Option<Arc<RenderTarget>>,
    ) {
        self.outputs[index.index()] = texture;
    }

    fn drain_notifications(&mut self) -> Vec<SurfaceNotification> {
        std::mem::take(&mut self.pending)
    }

    fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    fn surface_handle(&self) -> SurfaceHandle {
        self.handle
    }
}
