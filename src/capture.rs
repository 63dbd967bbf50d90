//! Frame-capture tool contract.
//!
//! An external frame debugger can bracket a whole compositor frame. The
//! compositor only ever brackets one frame per request; the request flag
//! is cleared at the end of the frame regardless of the render outcome.

use crate::surface::SurfaceHandle;

/// Contract for an external frame-capture tool.
pub trait CaptureTool {
    /// Whether the tool is loaded and can capture right now.
    fn is_available(&self) -> bool;

    /// Start capturing GPU work for the given surface.
    fn begin_capture(&self, surface: SurfaceHandle);

    /// Stop capturing GPU work for the given surface.
    fn end_capture(&self, surface: SurfaceHandle);
}
