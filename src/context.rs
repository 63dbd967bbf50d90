//! Runtime state the compositor reads each frame.
//!
//! The context is owned by the hosting editor and shared with the
//! compositor. It is not persisted here; saving and restoring layout and
//! environment choices belongs to the host's configuration layer.

use glam::Vec2;

use crate::layout::{LayoutMode, ViewSlot};

/// Opaque identifier for a host asset (prefab, material, cubemap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(pub u64);

/// Reference to the content asset previewed in a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentAsset {
    /// Host asset identifier.
    pub id: AssetId,
    /// Display name, used for stage object naming and logs.
    pub name: String,
}

impl ContentAsset {
    /// Create a content asset reference.
    pub fn new(id: AssetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Per-view content and display state.
#[derive(Debug, Clone, Default)]
pub struct ViewContent {
    /// Asset previewed in this view, if any.
    pub asset: Option<ContentAsset>,
    /// Exposure compensation in EV applied during compositing.
    pub exposure: f32,
}

/// State of the split gizmo, in normalized composite-viewport coordinates
/// (`(0, 0)` top-left, `(1, 1)` bottom-right).
#[derive(Debug, Clone)]
pub struct GizmoState {
    /// Center of the split line or circle.
    pub center: Vec2,
    /// Handle point defining the split direction from the center.
    pub handle: Vec2,
    /// Half-length of the split line stroke.
    pub length: f32,
    /// Radius of the circular zone.
    pub circle_radius: f32,
    /// Width of the blend band and overlay strokes.
    pub thickness: f32,
    /// Overlay stroke color for the first view's side.
    pub first_view_color: [f32; 4],
    /// Overlay stroke color for the second view's side.
    pub second_view_color: [f32; 4],
}

impl Default for GizmoState {
    fn default() -> Self {
        Self {
            center: Vec2::new(0.5, 0.5),
            handle: Vec2::new(0.5, 0.2),
            length: 0.3,
            circle_radius: 0.25,
            thickness: 0.005,
            first_view_color: [0.0, 0.604, 0.604, 1.0],
            second_view_color: [1.0, 0.145, 0.016, 1.0],
        }
    }
}

/// Shared per-session state read by the compositor each tick.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Active layout policy.
    pub layout: LayoutMode,
    /// Blend factor for composited layouts, in `[-1, 1]`; `0` keeps the
    /// split centered on the gizmo.
    pub blend_factor: f32,
    /// Whether the neutral tone-map runs during compositing.
    pub tone_map_enabled: bool,
    /// Split gizmo state.
    pub gizmo: GizmoState,
    views: [ViewContent; 2],
}

impl Context {
    /// Create a context with default layout and gizmo state.
    pub fn new() -> Self {
        Self {
            tone_map_enabled: true,
            ..Self::default()
        }
    }

    /// Content state for one view.
    pub fn view_content(&self, slot: ViewSlot) -> &ViewContent {
        &self.views[slot.index()]
    }

    /// Mutable content state for one view.
    pub fn view_content_mut(&mut self, slot: ViewSlot) -> &mut ViewContent {
        &mut self.views[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_view_content_is_independent() {
        let mut context = Context::new();
        context.view_content_mut(ViewSlot::First).asset =
            Some(ContentAsset::new(AssetId(7), "sphere"));
        context.view_content_mut(ViewSlot::Second).exposure = 1.5;

        assert_eq!(
            context.view_content(ViewSlot::First).asset.as_ref().map(|a| a.id),
            Some(AssetId(7))
        );
        assert!(context.view_content(ViewSlot::First).exposure == 0.0);
        assert!(context.view_content(ViewSlot::Second).asset.is_none());
        assert!(context.view_content(ViewSlot::Second).exposure == 1.5);
    }
}
