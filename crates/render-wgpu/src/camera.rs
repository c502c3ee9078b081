use glam::{Mat4, Quat, Vec2, Vec3};
use shadeview_common::{AspectMode, Ray};
use shadeview_input::CameraInput;

/// Default eye position: straight in front of the quad.
pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 1.5);
/// Extra distance along +Z when the quad is widescreen, so it still fits.
pub const WIDESCREEN_DEPTH_OFFSET: f32 = 0.5;
/// Closest the eye may get to the target when zooming.
const MIN_TARGET_DISTANCE: f32 = 0.001;
/// Keeps pitch this far (radians) from the poles.
const POLE_MARGIN: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Perspective,
}

/// Orbit camera: an eye looking at a target, with a fixed world up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fovy_degrees: f32,
    pub projection: Projection,
    /// Viewport width over height; follows the window, not the quad.
    pub viewport_aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy_degrees: 70.0,
            projection: Projection::Perspective,
            viewport_aspect: 1.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl CameraState {
    /// Restore the default pose for `mode`. The viewport aspect is kept.
    pub fn reset(&mut self, mode: AspectMode) {
        let offset = if mode.is_square() {
            Vec3::ZERO
        } else {
            Vec3::new(0.0, 0.0, WIDESCREEN_DEPTH_OFFSET)
        };
        *self = Self {
            position: DEFAULT_POSITION + offset,
            viewport_aspect: self.viewport_aspect,
            ..Self::default()
        };
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Right axis of the view, always horizontal.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Move eye and target together: `dx` along the right axis, `dy` along the view's up axis.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();
        let offset = right * dx + up * dy;
        self.position += offset;
        self.target += offset;
    }

    /// Turn the eye about the world up axis through the target.
    pub fn yaw(&mut self, angle: f32) {
        let view = self.target - self.position;
        let view = Quat::from_axis_angle(self.up.normalize(), angle) * view;
        self.position = self.target - view;
    }

    /// Tilt the eye about the right axis through the target, stopping short of the poles.
    pub fn pitch(&mut self, angle: f32) {
        let up = self.up.normalize();
        let view = self.target - self.position;

        let max_up = up.angle_between(view) - POLE_MARGIN;
        let max_down = -(-up).angle_between(view) + POLE_MARGIN;
        let angle = angle.min(max_up).max(max_down);

        let view = Quat::from_axis_angle(self.right(), angle) * view;
        self.position = self.target - view;
    }

    /// Change the eye-target distance by `delta`; negative moves closer.
    pub fn zoom(&mut self, delta: f32) {
        let distance = (self.position.distance(self.target) + delta).max(MIN_TARGET_DISTANCE);
        self.position = self.target - self.forward() * distance;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective => Mat4::perspective_rh(
                self.fovy_degrees.to_radians(),
                self.viewport_aspect,
                self.near,
                self.far,
            ),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a window pixel (origin top-left, +y down).
    pub fn screen_ray(&self, cursor: Vec2, viewport: Vec2) -> Ray {
        let ndc = Vec2::new(
            2.0 * cursor.x / viewport.x.max(1.0) - 1.0,
            1.0 - 2.0 * cursor.y / viewport.y.max(1.0),
        );
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(self.position, (far - near).normalize())
    }
}

/// Scale factors from raw mouse input to camera motion.
#[derive(Debug, Clone)]
pub struct CameraSpeeds {
    /// Radians per pixel of drag.
    pub rotate: f32,
    /// World units per pixel of drag.
    pub pan: f32,
    /// World units per wheel line.
    pub zoom: f32,
}

impl Default for CameraSpeeds {
    fn default() -> Self {
        Self {
            rotate: 0.003,
            pan: 0.01,
            zoom: 1.0,
        }
    }
}

/// Maps per-frame mouse input onto a [`CameraState`].
///
/// Middle drag orbits, middle drag with the modifier pans, the wheel zooms.
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    pub speeds: CameraSpeeds,
}

impl CameraController {
    pub fn new(speeds: CameraSpeeds) -> Self {
        Self { speeds }
    }

    pub fn update(&self, camera: &mut CameraState, input: &CameraInput) {
        let delta = input.mouse_delta;
        if input.drag && delta != Vec2::ZERO {
            if input.modifier {
                camera.pan(-self.speeds.pan * delta.x, self.speeds.pan * delta.y);
            } else {
                camera.yaw(-self.speeds.rotate * delta.x);
                camera.pitch(self.speeds.rotate * delta.y);
            }
        }

        if input.wheel != 0.0 {
            camera.zoom(-input.wheel * self.speeds.zoom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(dx: f32, dy: f32, modifier: bool) -> CameraInput {
        CameraInput {
            drag: true,
            modifier,
            mouse_delta: Vec2::new(dx, dy),
            wheel: 0.0,
        }
    }

    #[test]
    fn default_camera() {
        let cam = CameraState::default();
        assert_eq!(cam.position, DEFAULT_POSITION);
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn zero_input_changes_nothing() {
        let controller = CameraController::default();
        let mut cam = CameraState {
            position: Vec3::new(3.0, 2.0, 1.0),
            ..CameraState::default()
        };
        let before = cam;

        controller.update(&mut cam, &drag(0.0, 0.0, false));
        controller.update(&mut cam, &drag(0.0, 0.0, true));
        controller.update(&mut cam, &CameraInput::default());
        assert_eq!(cam, before);
    }

    #[test]
    fn motion_without_button_changes_nothing() {
        let controller = CameraController::default();
        let mut cam = CameraState::default();
        let input = CameraInput {
            drag: false,
            mouse_delta: Vec2::new(40.0, 12.0),
            ..CameraInput::default()
        };
        controller.update(&mut cam, &input);
        assert_eq!(cam, CameraState::default());
    }

    #[test]
    fn orbit_keeps_distance_and_target() {
        let controller = CameraController::default();
        let mut cam = CameraState::default();
        let distance = cam.position.distance(cam.target);

        controller.update(&mut cam, &drag(120.0, -45.0, false));
        assert_eq!(cam.target, Vec3::ZERO);
        assert!((cam.position.distance(cam.target) - distance).abs() < 1e-4);
        assert_ne!(cam.position, DEFAULT_POSITION);
    }

    #[test]
    fn orbit_drag_right_swings_eye_left() {
        let controller = CameraController::default();
        let mut cam = CameraState::default();
        controller.update(&mut cam, &drag(100.0, 0.0, false));
        assert!(cam.position.x < 0.0);
        assert!(cam.position.y.abs() < 1e-5);
    }

    #[test]
    fn pitch_stops_short_of_the_pole() {
        let controller = CameraController::default();
        let mut cam = CameraState::default();
        for _ in 0..50 {
            controller.update(&mut cam, &drag(0.0, 500.0, false));
        }
        let angle = cam.up.angle_between(cam.target - cam.position);
        assert!(angle > 0.0);
        assert!(!cam.view_matrix().col(0).x.is_nan());
        // Dragging down tilts the view up: the eye sinks below the target
        // but never swings past it.
        assert!(cam.position.y < 0.0);
        assert!(cam.position.z >= -1e-3);
    }

    #[test]
    fn pan_moves_eye_and_target_together() {
        let controller = CameraController::default();
        let mut cam = CameraState::default();
        let view = cam.target - cam.position;

        controller.update(&mut cam, &drag(10.0, 20.0, true));
        assert!((cam.target - cam.position - view).length() < 1e-5);
        // Dragging right pulls the scene along, so the eye moves left.
        assert!((cam.target.x + 0.1).abs() < 1e-5);
        assert!((cam.target.y - 0.2).abs() < 1e-5);
        assert!(cam.target.z.abs() < 1e-5);
    }

    #[test]
    fn wheel_zooms_along_view() {
        let controller = CameraController::default();
        let mut cam = CameraState::default();
        let input = CameraInput {
            wheel: 0.5,
            ..CameraInput::default()
        };
        controller.update(&mut cam, &input);
        assert!((cam.position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);

        // Cannot zoom through the target.
        let input = CameraInput {
            wheel: 10.0,
            ..CameraInput::default()
        };
        controller.update(&mut cam, &input);
        assert!(cam.position.z > 0.0);
        assert!((cam.position.distance(cam.target) - MIN_TARGET_DISTANCE).abs() < 1e-5);
    }

    #[test]
    fn reset_restores_default_pose() {
        let controller = CameraController::default();
        let mut cam = CameraState {
            viewport_aspect: 1.5,
            ..CameraState::default()
        };
        controller.update(&mut cam, &drag(50.0, 30.0, false));
        controller.update(&mut cam, &drag(5.0, 3.0, true));

        cam.reset(AspectMode::Square);
        assert_eq!(cam.position, DEFAULT_POSITION);
        assert_eq!(cam.target, Vec3::ZERO);
        assert_eq!(cam.viewport_aspect, 1.5);

        cam.reset(AspectMode::Widescreen);
        assert_eq!(
            cam.position,
            DEFAULT_POSITION + Vec3::new(0.0, 0.0, WIDESCREEN_DEPTH_OFFSET)
        );
    }

    #[test]
    fn screen_center_ray_points_at_target() {
        let cam = CameraState::default();
        let ray = cam.screen_ray(Vec2::new(512.0, 512.0), Vec2::new(1024.0, 1024.0));
        assert_eq!(ray.origin, cam.position);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);

        let top_left = cam.screen_ray(Vec2::ZERO, Vec2::new(1024.0, 1024.0));
        assert!(top_left.direction.x < 0.0);
        assert!(top_left.direction.y > 0.0);
    }
}
