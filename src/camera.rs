//! Preview camera state.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::targets::RenderTarget;

/// Camera for one preview stage.
///
/// The camera renders only while its stage's view is being acquired: the
/// view renderer enables it, performs one synchronous render, and disables
/// it again, so a disabled camera is the steady state between frames.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    look_at: Vec3,
    up: Vec3,
    fov_y_radians: f32,
    near: f32,
    far: f32,
    clear_color: [f32; 4],
    enabled: bool,
    render_target: Option<Arc<RenderTarget>>,
}

impl Camera {
    /// Create a camera with default framing.
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            enabled: false,
            render_target: None,
        }
    }

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, self.up)
    }

    /// Projection matrix for the given aspect ratio.
    ///
    /// Uses `[0, 1]` depth range (wgpu/D3D convention).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect, self.near, self.far)
    }

    /// Position the camera.
    pub fn set_transform(&mut self, position: Vec3, look_at: Vec3, up: Vec3) {
        self.position = position;
        self.look_at = look_at;
        self.up = up;
    }

    /// Set the vertical field of view in radians.
    pub fn set_fov_y(&mut self, fov_y_radians: f32) {
        self.fov_y_radians = fov_y_radians;
    }

    /// Set the near/far clip planes.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    /// Background clear color.
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Set the background clear color.
    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    /// Whether the camera is currently enabled for rendering.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the camera.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The render target this camera draws into, if bound.
    pub fn render_target(&self) -> Option<&Arc<RenderTarget>> {
        self.render_target.as_ref()
    }

    /// Bind the camera's render destination.
    pub fn bind_target(&mut self, target: Arc<RenderTarget>) {
        self.render_target = Some(target);
    }

    /// Release the camera's render destination.
    pub fn unbind_target(&mut self) {
        self.render_target = None;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_starts_disabled_and_unbound() {
        let camera = Camera::new();
        assert!(!camera.is_enabled());
        assert!(camera.render_target().is_none());
    }

    #[test]
    fn view_matrix_uses_transform() {
        let mut camera = Camera::new();
        camera.set_transform(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let view = camera.view_matrix();
        // A point at the origin lands 10 units in front of the camera.
        let transformed = view.transform_point3(Vec3::ZERO);
        assert!((transformed.z + 10.0).abs() < 1e-5);
    }
}
