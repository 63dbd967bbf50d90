//! Common geometric types.

/// A screen-space rectangle in logical points.
///
/// Viewport rectangles come from the hosting panel and may be degenerate
/// while the window is being laid out (zero-sized, or NaN during the first
/// frame of a dock operation). Degenerate rectangles are skipped for one
/// frame rather than treated as errors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from dimensions with origin at (0, 0).
    pub fn from_dimensions(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Whether this rectangle is too small or malformed to render into.
    ///
    /// A rectangle with either dimension below one point, or with a NaN
    /// dimension, produces no output for the frame.
    pub fn is_degenerate(&self) -> bool {
        self.width < 1.0 || self.height < 1.0 || self.width.is_nan() || self.height.is_nan()
    }

    /// Center of the rectangle.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Scale the rectangle from points to physical pixels.
    pub fn scaled(&self, pixels_per_point: f32) -> Self {
        Self::new(
            self.x * pixels_per_point,
            self.y * pixels_per_point,
            self.width * pixels_per_point,
            self.height * pixels_per_point,
        )
    }
}

impl From<egui::Rect> for Rect {
    fn from(rect: egui::Rect) -> Self {
        Self::new(rect.min.x, rect.min.y, rect.width(), rect.height())
    }
}

/// 3D extent for textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3d {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth in pixels (1 for 2D textures).
    pub depth: u32,
}

impl Extent3d {
    /// Create a new 2D extent.
    pub fn new_2d(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_rects() {
        assert!(Rect::from_dimensions(0.0, 5.0).is_degenerate());
        assert!(Rect::from_dimensions(5.0, 0.9).is_degenerate());
        assert!(Rect::from_dimensions(f32::NAN, 10.0).is_degenerate());
        assert!(Rect::from_dimensions(10.0, f32::NAN).is_degenerate());
        assert!(!Rect::from_dimensions(1.0, 1.0).is_degenerate());
    }

    #[test]
    fn rect_center() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), (60.0, 45.0));
    }

    #[test]
    fn rect_from_egui_panel() {
        let panel = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(300.0, 200.0));
        let rect = Rect::from(panel);
        assert_eq!(rect, Rect::new(10.0, 20.0, 300.0, 200.0));

        // Physical-pixel conversion for a 2x display.
        let physical = rect.scaled(2.0);
        assert_eq!(physical, Rect::new(20.0, 40.0, 600.0, 400.0));
    }
}
