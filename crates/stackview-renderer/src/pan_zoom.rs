use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// One pointer or gesture sample: absolute cursor position in pixels plus
/// the drag delta and scroll/pinch delta since the previous sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl PointerEvent {
    pub fn drag(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            x,
            y,
            dx,
            dy,
            dz: 0.0,
        }
    }

    pub fn scroll(x: f64, y: f64, dz: f64) -> Self {
        Self {
            x,
            y,
            dz,
            ..Self::default()
        }
    }
}

/// Applies pointer events to a camera so that dragged content follows the
/// cursor and the point under the cursor stays put while zooming.
pub struct PanZoomController<'a> {
    camera: &'a mut Camera,
    zoom_scale: f64,
}

impl<'a> PanZoomController<'a> {
    pub fn new(camera: &'a mut Camera, zoom_scale: f64) -> Self {
        Self { camera, zoom_scale }
    }

    pub fn handle_event(&mut self, event: PointerEvent) {
        let cam = &mut *self.camera;

        let clip = cam.screen_to_clip(event.x, event.y);
        let depth = cam.focus_depth();
        let focus = cam.unproject(clip.extend(depth));

        let clip_delta = cam.screen_delta_to_clip(event.dx, event.dy);
        let moved = cam.unproject((clip + clip_delta).extend(depth));
        let drag = moved - focus;

        let z = cam.state().z_position;
        cam.set_zoom(z * (1.0 + event.dz / self.zoom_scale));

        let refocus = cam.unproject(clip.extend(cam.focus_depth()));
        let drift: DVec3 = focus - refocus;

        let state = cam.state();
        cam.set_pan(
            state.x_position + drag.x - drift.x,
            state.y_position + drag.y - drift.y,
        );

        let state = cam.state();
        log::debug!(
            "Pointer ({:.1}, {:.1}) d=({:.1}, {:.1}, {:.1}) -> camera ({:.4}, {:.4}, {:.4})",
            event.x,
            event.y,
            event.dx,
            event.dy,
            event.dz,
            state.x_position,
            state.y_position,
            state.z_position
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ViewerSettings;

    fn camera() -> Camera {
        Camera::new(&ViewerSettings::default(), [2.0, 2.0], 800, 600)
    }

    fn apply(cam: &mut Camera, event: PointerEvent) {
        PanZoomController::new(cam, 700.0).handle_event(event);
    }

    fn assert_close(a: DVec3, b: DVec3) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_zoom_keeps_point_under_cursor() {
        let mut cam = camera();
        let before = cam.world_at(600.0, 150.0);
        apply(&mut cam, PointerEvent::scroll(600.0, 150.0, -350.0));
        assert!((cam.state().z_position - (-4.0)).abs() < 1e-12);
        assert_close(cam.world_at(600.0, 150.0), before);

        // Zoom back out part way from the new position.
        let before = cam.world_at(250.0, 420.0);
        apply(&mut cam, PointerEvent::scroll(250.0, 420.0, 200.0));
        assert_close(cam.world_at(250.0, 420.0), before);
    }

    #[test]
    fn test_drag_follows_content() {
        let mut cam = camera();
        for z in [-8.0, -2.0, -0.5] {
            cam.set_zoom(z);
            cam.set_pan(0.0, 0.0);
            let grabbed = cam.world_at(300.0, 200.0);
            apply(&mut cam, PointerEvent::drag(300.0, 200.0, 40.0, -25.0));
            assert_eq!(cam.state().z_position, z);
            assert_close(cam.world_at(340.0, 175.0), grabbed);
        }
    }

    #[test]
    fn test_pure_pan_scales_with_depth() {
        let mut far = camera();
        let mut near = camera();
        near.set_zoom(-2.0);
        apply(&mut far, PointerEvent::drag(400.0, 300.0, 20.0, 0.0));
        apply(&mut near, PointerEvent::drag(400.0, 300.0, 20.0, 0.0));
        let ratio = far.state().x_position / near.state().x_position;
        assert!((ratio - 4.0).abs() < 1e-9, "ratio {}", ratio);
        assert!(far.state().y_position.abs() < 1e-12);
    }

    #[test]
    fn test_zoom_clamps_exactly() {
        let mut cam = camera();
        apply(&mut cam, PointerEvent::scroll(400.0, 300.0, 7000.0));
        assert_eq!(cam.state().z_position, -8.0);
        apply(&mut cam, PointerEvent::scroll(400.0, 300.0, -699.0));
        apply(&mut cam, PointerEvent::scroll(400.0, 300.0, -699.0));
        assert_eq!(cam.state().z_position, -0.1);
    }

    #[test]
    fn test_pan_clamps_exactly() {
        let mut cam = camera();
        apply(&mut cam, PointerEvent::drag(400.0, 300.0, 1.0e6, 1.0e6));
        assert_eq!(cam.state().x_position, 1.0);
        assert_eq!(cam.state().y_position, -1.0);
        apply(&mut cam, PointerEvent::drag(400.0, 300.0, -1.0e7, -1.0e7));
        assert_eq!(cam.state().x_position, -1.0);
        assert_eq!(cam.state().y_position, 1.0);
    }

    #[test]
    fn test_noop_event() {
        let mut cam = camera();
        let state = cam.state();
        apply(&mut cam, PointerEvent::default());
        assert_eq!(cam.state(), state);
    }
}
