//! Compositing parameters and the blend math they drive.
//!
//! For composited layouts both views render at the full composite
//! rectangle and a single fullscreen pass merges them: each pixel picks a
//! side of the split geometry (line or circle), blends across a thin band
//! around the boundary, applies per-view exposure and the neutral
//! tone-map, and finally draws the gizmo stroke on top.
//!
//! The per-pixel functions here are the CPU reference for that pass; the
//! `wgpu-backend` shader implements the same math. Gizmo coordinates are
//! normalized to the composite rectangle and corrected by the aspect ratio
//! so circles stay circular in pixels.

use glam::{Vec2, Vec4};

use crate::context::Context;
use crate::layout::{SplitKind, ViewSlot};
use crate::types::Rect;

/// Dial units used to express the tone-map coefficients.
const DIAL_UNITS: f32 = 20.0;

/// Six-coefficient neutral tone-map expressed as a 0-1 remap.
///
/// The defaults are the preview-pipeline constants; they are deliberately
/// not user-tweakable here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutralToneMap {
    /// Input black point.
    pub black_in: f32,
    /// Input white point.
    pub white_in: f32,
    /// Output black point.
    pub black_out: f32,
    /// Output white point.
    pub white_out: f32,
    /// Scene-referred white level.
    pub white_level: f32,
    /// Clip applied above the white level.
    pub white_clip: f32,
}

impl Default for NeutralToneMap {
    fn default() -> Self {
        Self {
            black_in: 0.02,
            white_in: 10.0,
            black_out: 0.0,
            white_out: 10.0,
            white_level: 5.3,
            white_clip: 10.0,
        }
    }
}

impl NeutralToneMap {
    /// Pack the dial values into the two shader coefficient vectors.
    ///
    /// Converts from artist dial units to plain 0-1 lerp factors.
    pub fn coefficients(&self) -> (Vec4, Vec4) {
        let half_dial = DIAL_UNITS * 0.5;
        (
            Vec4::new(
                self.black_in * DIAL_UNITS + 1.0,
                self.black_out * half_dial + 1.0,
                self.white_in / DIAL_UNITS,
                1.0 - self.white_out / DIAL_UNITS,
            ),
            Vec4::new(0.0, 0.0, self.white_level, self.white_clip / half_dial),
        )
    }

    /// Remap one scene-referred channel value into display range.
    pub fn remap(&self, x: f32) -> f32 {
        let (c1, c2) = self.coefficients();
        let normalized = (x / c2.z).clamp(0.0, c2.w);
        let base = c1.y * normalized.powf(c1.x);
        let shoulder = ((normalized - c1.z) / c1.w.max(f32::EPSILON)).clamp(0.0, 1.0);
        let shoulder = shoulder * shoulder * (3.0 - 2.0 * shoulder);
        (base * (1.0 - shoulder) + shoulder).clamp(0.0, 1.0)
    }

    /// Remap an RGBA color, leaving alpha untouched.
    pub fn remap_color(&self, color: Vec4) -> Vec4 {
        Vec4::new(
            self.remap(color.x),
            self.remap(color.y),
            self.remap(color.z),
            color.w,
        )
    }
}

/// Per-frame value data for one compositing pass.
///
/// Rebuilt every frame from the current context and composite rectangle;
/// carries no persistent identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositingParameters {
    /// Split geometry kind.
    pub kind: SplitKind,
    /// Blend factor in `[-1, 1]` shifting the boundary off the gizmo.
    pub blend_factor: f32,
    /// Per-view exposure compensation in EV.
    pub exposures: [f32; 2],
    /// Gizmo center, aspect-corrected.
    pub gizmo_center: Vec2,
    /// Gizmo handle point, aspect-corrected.
    pub zone_center: Vec2,
    /// Split plane equation `(nx, ny, 0, d)`; positive side shows the
    /// first view.
    pub split_plane: Vec4,
    /// Plane orthogonal to the split, through the gizmo center.
    pub split_plane_ortho: Vec4,
    /// Half-length of the split line stroke.
    pub gizmo_length: f32,
    /// Circle radius before the blend factor is applied.
    pub circle_radius: f32,
    /// Blend band and stroke width.
    pub thickness: f32,
    /// Stroke color on the first view's side.
    pub first_view_color: Vec4,
    /// Stroke color on the second view's side.
    pub second_view_color: Vec4,
    /// Whether the tone-map runs.
    pub tone_map_enabled: bool,
    /// Tone-map dial values.
    pub tone_map: NeutralToneMap,
    /// Aspect correction applied to normalized coordinates.
    pub screen_ratio: Vec2,
}

impl CompositingParameters {
    /// Build this frame's parameters from the context and composite rect.
    pub fn from_context(context: &Context, kind: SplitKind, rect: Rect) -> Self {
        let aspect = rect.width / rect.height;
        let ratio = Vec2::new(aspect, 1.0);
        let center = context.gizmo.center * ratio;
        let handle = context.gizmo.handle * ratio;
        let dir = (handle - center).try_normalize().unwrap_or(Vec2::NEG_Y);
        // Left of the gizmo direction is the first view's side.
        let normal = Vec2::new(dir.y, -dir.x);

        Self {
            kind,
            blend_factor: context.blend_factor.clamp(-1.0, 1.0),
            exposures: [
                context.view_content(ViewSlot::First).exposure,
                context.view_content(ViewSlot::Second).exposure,
            ],
            gizmo_center: center,
            zone_center: handle,
            split_plane: Vec4::new(normal.x, normal.y, 0.0, -normal.dot(center)),
            split_plane_ortho: Vec4::new(dir.x, dir.y, 0.0, -dir.dot(center)),
            gizmo_length: context.gizmo.length,
            circle_radius: context.gizmo.circle_radius,
            thickness: context.gizmo.thickness,
            first_view_color: Vec4::from_array(context.gizmo.first_view_color),
            second_view_color: Vec4::from_array(context.gizmo.second_view_color),
            tone_map_enabled: context.tone_map_enabled,
            tone_map: NeutralToneMap::default(),
            screen_ratio: ratio,
        }
    }

    /// Linear scale for one view's exposure compensation.
    pub fn exposure_scale(&self, view: usize) -> f32 {
        self.exposures[view].exp2()
    }

    /// Signed distance from a normalized point to the split boundary.
    ///
    /// Positive on the first view's side. The blend factor shifts the
    /// boundary: along the plane normal for line splits, in or out of the
    /// circle for circular splits.
    pub fn boundary_distance(&self, point: Vec2) -> f32 {
        let p = point * self.screen_ratio;
        match self.kind {
            SplitKind::Plane => {
                plane_distance(self.split_plane, p) + self.blend_factor * self.gizmo_length
            }
            SplitKind::Circle => {
                let radius = (self.circle_radius * (1.0 + self.blend_factor)).max(0.0);
                (p - self.gizmo_center).length() - radius
            }
        }
    }

    /// Blend weight of the first view at a normalized point, in `[0, 1]`.
    ///
    /// Crosses 0.5 exactly on the boundary and ramps across the thickness
    /// band for a slightly anti-aliased seam.
    pub fn blend_weight(&self, point: Vec2) -> f32 {
        let band = self.thickness.max(f32::EPSILON);
        (self.boundary_distance(point) / band * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Gizmo stroke color at a normalized point, if the point lies on the
    /// overlay.
    pub fn overlay_color(&self, point: Vec2) -> Option<Vec4> {
        let p = point * self.screen_ratio;
        let on_stroke = match self.kind {
            SplitKind::Plane => {
                let along = plane_distance(self.split_plane_ortho, p);
                plane_distance(self.split_plane, p).abs() <= self.thickness
                    && along.abs() <= self.gizmo_length
            }
            SplitKind::Circle => {
                let radius = (self.circle_radius * (1.0 + self.blend_factor)).max(0.0);
                (((p - self.gizmo_center).length()) - radius).abs() <= self.thickness
            }
        };
        if !on_stroke {
            return None;
        }
        if self.boundary_distance(point) >= 0.0 {
            Some(self.first_view_color)
        } else {
            Some(self.second_view_color)
        }
    }

    /// Fully composite one pixel from the two views' colors.
    ///
    /// CPU reference for the compositing shader: blend by split weight,
    /// apply exposure, tone-map, then the gizmo overlay.
    pub fn composite_pixel(&self, first: Vec4, second: Vec4, point: Vec2) -> Vec4 {
        let weight = self.blend_weight(point);
        let first = first * self.exposure_scale(0);
        let second = second * self.exposure_scale(1);
        let mut color = second.lerp(first, weight);
        if self.tone_map_enabled {
            color = self.tone_map.remap_color(color);
        }
        if let Some(stroke) = self.overlay_color(point) {
            color = color.lerp(stroke, stroke.w);
        }
        color
    }
}

#[inline]
fn plane_distance(plane: Vec4, p: Vec2) -> f32 {
    plane.x * p.x + plane.y * p.y + plane.w
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::layout::ViewSlot;

    fn square_params(kind: SplitKind) -> CompositingParameters {
        // Square rect keeps the aspect correction out of the way.
        CompositingParameters::from_context(
            &Context::new(),
            kind,
            Rect::from_dimensions(512.0, 512.0),
        )
    }

    #[test]
    fn tone_map_coefficients_match_dial_conversion() {
        let (c1, c2) = NeutralToneMap::default().coefficients();
        assert!((c1.x - 1.4).abs() < 1e-6);
        assert!((c1.y - 1.0).abs() < 1e-6);
        assert!((c1.z - 0.5).abs() < 1e-6);
        assert!((c1.w - 0.5).abs() < 1e-6);
        assert!((c2.z - 5.3).abs() < 1e-6);
        assert!((c2.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tone_map_is_a_monotone_unit_remap() {
        let tm = NeutralToneMap::default();
        assert_eq!(tm.remap(0.0), 0.0);
        let mut last = 0.0;
        for i in 1..=100 {
            let x = i as f32 * 0.2;
            let y = tm.remap(x);
            assert!((0.0..=1.0).contains(&y));
            assert!(y >= last, "tone map not monotone at {x}");
            last = y;
        }
        assert!((tm.remap(100.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn vertical_split_picks_sides() {
        // Default gizmo: center (0.5, 0.5), handle above it, so the split
        // line is vertical and the first view is on the left.
        let params = square_params(SplitKind::Plane);
        assert!(params.blend_weight(Vec2::new(0.1, 0.5)) > 0.99);
        assert!(params.blend_weight(Vec2::new(0.9, 0.5)) < 0.01);
        // Exactly on the boundary the weight is half.
        let mid = params.blend_weight(Vec2::new(0.5, 0.5));
        assert!((mid - 0.5).abs() < 1e-3);
    }

    #[test]
    fn blend_factor_shifts_the_split() {
        let mut context = Context::new();
        context.blend_factor = 1.0;
        let params = CompositingParameters::from_context(
            &context,
            SplitKind::Plane,
            Rect::from_dimensions(512.0, 512.0),
        );
        // Shifted fully toward the first view's side: a point just left of
        // center now reads as first view with margin.
        assert!(params.boundary_distance(Vec2::new(0.5, 0.5)) > 0.0);
    }

    #[test]
    fn circle_shows_second_view_inside() {
        let params = square_params(SplitKind::Circle);
        assert!(params.blend_weight(Vec2::new(0.5, 0.5)) < 0.01);
        assert!(params.blend_weight(Vec2::new(0.05, 0.05)) > 0.99);
    }

    #[test]
    fn overlay_strokes_sit_on_the_boundary() {
        let params = square_params(SplitKind::Circle);
        // On the circle (radius 0.25 around the center).
        let on = Vec2::new(0.5 + 0.25, 0.5);
        assert!(params.overlay_color(on).is_some());
        // Far from the circle.
        assert!(params.overlay_color(Vec2::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn exposure_applies_per_view() {
        let mut context = Context::new();
        context.tone_map_enabled = false;
        context.view_content_mut(ViewSlot::First).exposure = 1.0;
        let params = CompositingParameters::from_context(
            &context,
            SplitKind::Plane,
            Rect::from_dimensions(512.0, 512.0),
        );

        let gray = Vec4::new(0.25, 0.25, 0.25, 1.0);
        // Deep on the first view's side: one EV doubles the color.
        let out = params.composite_pixel(gray, Vec4::ZERO, Vec2::new(0.05, 0.5));
        assert!((out.x - 0.5).abs() < 1e-4);
        // Deep on the second view's side: untouched second view color.
        let out = params.composite_pixel(gray, gray, Vec2::new(0.95, 0.5));
        assert!((out.x - 0.25).abs() < 1e-4);
    }

    #[test]
    fn aspect_ratio_keeps_circles_round() {
        let params = CompositingParameters::from_context(
            &Context::new(),
            SplitKind::Circle,
            Rect::from_dimensions(1024.0, 512.0),
        );
        // Points one radius away vertically and horizontally (in pixels)
        // are both on the boundary.
        let r = params.circle_radius;
        let vertical = params.boundary_distance(Vec2::new(0.5, 0.5 + r));
        let horizontal = params.boundary_distance(Vec2::new(0.5 + r / 2.0, 0.5));
        assert!(vertical.abs() < 1e-5);
        assert!(horizontal.abs() < 1e-5);
    }
}
