use glam::{DMat4, DVec2, DVec3, DVec4};
use serde::{Deserialize, Serialize};

use crate::settings::ViewerSettings;

/// Pan and zoom state of the 3D camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Pan offset in normalized world units.
    pub x_position: f64,
    pub y_position: f64,
    /// Camera depth, negative, within `[-z_far, -z_near]`.
    pub z_position: f64,
}

impl CameraState {
    /// Centered and fully zoomed out.
    pub fn initial(settings: &ViewerSettings) -> Self {
        Self {
            x_position: 0.0,
            y_position: 0.0,
            z_position: -settings.z_far,
        }
    }
}

/// Camera state plus the matrices derived from it. Every mutation goes
/// through a method that recomputes projection, model-view and inverse.
#[derive(Debug, Clone)]
pub struct Camera {
    state: CameraState,
    z_near: f64,
    z_far: f64,
    fovy: f64,
    extent: DVec2,
    width: u32,
    height: u32,
    projection: DMat4,
    model_view: DMat4,
    inverse: DMat4,
}

impl Camera {
    pub fn new(settings: &ViewerSettings, extent: [f64; 2], width: u32, height: u32) -> Self {
        let mut camera = Self {
            state: CameraState::initial(settings),
            z_near: settings.z_near,
            z_far: settings.z_far,
            fovy: settings.fovy_degrees.to_radians(),
            extent: DVec2::new(extent[0], extent[1]),
            width: 1,
            height: 1,
            projection: DMat4::IDENTITY,
            model_view: DMat4::IDENTITY,
            inverse: DMat4::IDENTITY,
        };
        camera.resize(width, height);
        camera
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn extent(&self) -> DVec2 {
        self.extent
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn projection(&self) -> DMat4 {
        self.projection
    }

    pub fn model_view(&self) -> DMat4 {
        self.model_view
    }

    /// Inverse of `projection * model_view`.
    pub fn inverse(&self) -> DMat4 {
        self.inverse
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Degenerate viewport {}x{}, clamping to 1 pixel", width, height);
        }
        self.width = width.max(1);
        self.height = height.max(1);
        log::debug!("Camera viewport {}x{}", self.width, self.height);
        self.update_matrices();
    }

    /// Set the camera depth, clamped to `[-z_far, -z_near]`.
    pub fn set_zoom(&mut self, z_position: f64) {
        self.state.z_position = z_position.clamp(-self.z_far, -self.z_near);
        self.update_matrices();
    }

    /// Set the pan offset, each axis clamped to half the world extent.
    pub fn set_pan(&mut self, x_position: f64, y_position: f64) {
        let half = self.extent / 2.0;
        self.state.x_position = x_position.clamp(-half.x, half.x);
        self.state.y_position = y_position.clamp(-half.y, half.y);
        self.update_matrices();
    }

    /// Convert a screen position (pixels, y down) to clip space.
    pub fn screen_to_clip(&self, x: f64, y: f64) -> DVec2 {
        DVec2::new(
            2.0 * x / f64::from(self.width) - 1.0,
            1.0 - 2.0 * y / f64::from(self.height),
        )
    }

    /// Convert a screen delta (pixels, y down) to a clip-space delta.
    pub fn screen_delta_to_clip(&self, dx: f64, dy: f64) -> DVec2 {
        DVec2::new(
            2.0 * dx / f64::from(self.width),
            -2.0 * dy / f64::from(self.height),
        )
    }

    /// Clip depth of the base plane, which sits `|z_position|` in front of
    /// the camera.
    pub fn focus_depth(&self) -> f64 {
        let clip = self.projection * DVec4::new(0.0, 0.0, self.state.z_position, 1.0);
        clip.z / clip.w
    }

    /// Map a clip-space point back to world space.
    pub fn unproject(&self, clip: DVec3) -> DVec3 {
        let world = self.inverse * clip.extend(1.0);
        world.truncate() / world.w
    }

    /// World point under a screen position, on the base plane.
    pub fn world_at(&self, x: f64, y: f64) -> DVec3 {
        self.unproject(self.screen_to_clip(x, y).extend(self.focus_depth()))
    }

    fn update_matrices(&mut self) {
        let aspect = f64::from(self.width) / f64::from(self.height);
        self.projection = DMat4::perspective_rh_gl(
            self.fovy,
            aspect,
            self.z_near - 0.01,
            self.z_far + 0.001,
        );
        self.model_view = DMat4::from_translation(DVec3::new(
            self.state.x_position - self.extent.x / 2.0,
            self.state.y_position - self.extent.y / 2.0,
            self.state.z_position,
        ));
        self.inverse = (self.projection * self.model_view).inverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&ViewerSettings::default(), [1.0, 0.5], 800, 600)
    }

    #[test]
    fn test_initial_state() {
        let cam = camera();
        assert_eq!(
            cam.state(),
            CameraState {
                x_position: 0.0,
                y_position: 0.0,
                z_position: -8.0
            }
        );
        assert_eq!(cam.viewport(), (800, 600));
    }

    #[test]
    fn test_screen_to_clip() {
        let cam = camera();
        assert_eq!(cam.screen_to_clip(0.0, 0.0), DVec2::new(-1.0, 1.0));
        assert_eq!(cam.screen_to_clip(400.0, 300.0), DVec2::new(0.0, 0.0));
        assert_eq!(cam.screen_to_clip(800.0, 600.0), DVec2::new(1.0, -1.0));
        assert_eq!(cam.screen_delta_to_clip(400.0, 300.0), DVec2::new(1.0, -1.0));
    }

    #[test]
    fn test_screen_center_hits_extent_center() {
        let cam = camera();
        let p = cam.world_at(400.0, 300.0);
        assert!((p.x - 0.5).abs() < 1e-9);
        assert!((p.y - 0.25).abs() < 1e-9);
        assert!(p.z.abs() < 1e-9);
    }

    #[test]
    fn test_focus_depth_inside_clip_volume() {
        let mut cam = camera();
        for z in [-8.0, -1.0, -0.1] {
            cam.set_zoom(z);
            let depth = cam.focus_depth();
            assert!(depth > -1.0 && depth < 1.0, "depth {} at z {}", depth, z);
        }
    }

    #[test]
    fn test_inverse_matches_matrices() {
        let mut cam = camera();
        cam.set_pan(0.1, -0.05);
        let product = cam.projection() * cam.model_view() * cam.inverse();
        assert!(product.abs_diff_eq(DMat4::IDENTITY, 1e-9));
    }

    #[test]
    fn test_zoom_and_pan_clamp() {
        let mut cam = camera();
        cam.set_zoom(-100.0);
        assert_eq!(cam.state().z_position, -8.0);
        cam.set_zoom(0.0);
        assert_eq!(cam.state().z_position, -0.1);
        cam.set_pan(3.0, -3.0);
        assert_eq!(cam.state().x_position, 0.5);
        assert_eq!(cam.state().y_position, -0.25);
    }

    #[test]
    fn test_zero_height_viewport() {
        let mut cam = camera();
        cam.resize(800, 0);
        assert_eq!(cam.viewport(), (800, 1));
        assert!(cam.inverse().is_finite());
    }
}
