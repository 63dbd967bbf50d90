//! Render-target sizing from screen-space rectangles.
//!
//! Preview panels benefit from supersampling: a small inspector viewport
//! rendered at 2x and downsampled by the UI looks considerably better than
//! a native-resolution render. The scale factor supersamples up to 2x per
//! axis, capped at 1024 absolute pixels, and never drops below 1x, so the
//! target is never smaller than the on-screen rectangle.

use crate::types::{Extent3d, Rect};

/// Maximum supersampled dimension per axis, in pixels.
const MAX_SUPERSAMPLED_DIM: f32 = 1024.0;

/// Compute the supersampling scale factor for a viewport rectangle.
///
/// Per axis the factor is `max(min(dim * 2, 1024), dim) / dim`; the smaller
/// of the two axes wins so the target keeps the rectangle's aspect ratio.
/// The result is multiplied by the display pixel density. With
/// `pixel_perfect` the factor is rounded to the nearest integer (floored at
/// 1) to avoid resampling blur.
pub fn compute_scale_factor(
    width: f32,
    height: f32,
    pixels_per_point: f32,
    pixel_perfect: bool,
) -> f32 {
    let scale_x = (width * 2.0).min(MAX_SUPERSAMPLED_DIM).max(width) / width;
    let scale_y = (height * 2.0).min(MAX_SUPERSAMPLED_DIM).max(height) / height;
    let mut factor = scale_x.min(scale_y) * pixels_per_point;
    if pixel_perfect {
        factor = factor.round().max(1.0);
    }
    factor
}

/// Compute the render-target size for a viewport rectangle.
///
/// Returns the truncated pixel dimensions of `rect` scaled by
/// [`compute_scale_factor`]. The caller must reject degenerate rectangles
/// ([`Rect::is_degenerate`]) before calling this.
pub fn compute_render_size(rect: Rect, pixels_per_point: f32, pixel_perfect: bool) -> Extent3d {
    let factor = compute_scale_factor(rect.width, rect.height, pixels_per_point, pixel_perfect);
    Extent3d::new_2d(
        (rect.width * factor) as u32,
        (rect.height * factor) as u32,
    )
}
