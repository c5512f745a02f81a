use crate::camera::PerspectiveCamera;
use glam::{Vec2, Vec3};
use orbitscene_input::{ControlEvent, PointerButton};
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Spherical coordinates around the y axis.
///
/// `phi` is the polar angle measured from +Y, `theta` the azimuth measured
/// from +Z towards +X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` strictly between the poles so `look_at` stays defined.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Rotate,
    Dolly,
    Pan,
}

/// Orbit, dolly and pan a camera around a target point.
///
/// Input events accumulate deltas; [`OrbitControls::update`] applies them to
/// the camera once per frame. With damping enabled only a fraction of the
/// accumulated delta is applied each update and the rest decays, giving the
/// camera inertia.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_rotate: bool,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub enable_pan: bool,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
    drag: DragState,
    last_pointer: Vec2,
    element_size: Vec2,
    last_position: Option<Vec3>,
    last_target: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            enable_rotate: true,
            rotate_speed: 1.0,
            enable_zoom: true,
            zoom_speed: 1.0,
            enable_pan: true,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            drag: DragState::Idle,
            last_pointer: Vec2::ZERO,
            element_size: Vec2::ONE,
            last_position: None,
            last_target: Vec3::ZERO,
        }
    }
}

impl OrbitControls {
    /// Bind controls to `camera` and point it at the target.
    pub fn new(camera: &mut PerspectiveCamera, element_width: u32, element_height: u32) -> Self {
        let mut controls = Self::default();
        controls.set_element_size(element_width, element_height);
        controls.update(camera);
        controls
    }

    /// Size of the interactive element in logical pixels. Drag distances are
    /// measured against its height.
    pub fn set_element_size(&mut self, width: u32, height: u32) {
        self.element_size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    pub fn element_size(&self) -> Vec2 {
        self.element_size
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != DragState::Idle
    }

    /// Distance from the camera to the target.
    pub fn distance(&self, camera: &PerspectiveCamera) -> f32 {
        (camera.position - self.target).length()
    }

    pub fn handle_event(&mut self, event: ControlEvent, camera: &PerspectiveCamera) {
        if !self.enabled {
            return;
        }
        match event {
            ControlEvent::PointerDown { button, position } => {
                self.drag = match button {
                    PointerButton::Primary if self.enable_rotate => DragState::Rotate,
                    PointerButton::Middle if self.enable_zoom => DragState::Dolly,
                    PointerButton::Secondary if self.enable_pan => DragState::Pan,
                    _ => DragState::Idle,
                };
                self.last_pointer = position;
            }
            ControlEvent::PointerMove { position } => {
                let delta = position - self.last_pointer;
                self.last_pointer = position;
                match self.drag {
                    DragState::Idle => {}
                    DragState::Rotate => self.drag_rotate(delta),
                    DragState::Dolly => self.drag_dolly(delta),
                    DragState::Pan => self.pan(delta * self.pan_speed, camera),
                }
            }
            ControlEvent::PointerUp { .. } | ControlEvent::Cancel => {
                self.drag = DragState::Idle;
            }
            ControlEvent::Wheel { delta_y } => {
                if !self.enable_zoom || self.drag != DragState::Idle {
                    return;
                }
                if delta_y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if delta_y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
            }
        }
    }

    /// Apply accumulated input to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= keep;
            self.spherical_delta.phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = match self.last_position {
            None => true,
            Some(last) => {
                last.distance_squared(camera.position) > EPS
                    || self.last_target.distance_squared(self.target) > EPS
            }
        };
        if moved {
            self.last_position = Some(camera.position);
            self.last_target = self.target;
        }
        moved
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    fn drag_rotate(&mut self, delta: Vec2) {
        let delta = delta * self.rotate_speed;
        let height = self.element_size.y;
        self.rotate_left(TAU * delta.x / height);
        self.rotate_up(TAU * delta.y / height);
    }

    fn drag_dolly(&mut self, delta: Vec2) {
        if delta.y > 0.0 {
            self.dolly_out(self.zoom_scale());
        } else if delta.y < 0.0 {
            self.dolly_in(self.zoom_scale());
        }
    }

    /// Screen-space pan; one element height of drag moves the target by the
    /// visible extent at the target's depth.
    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera) {
        let offset = camera.position - self.target;
        let half_fov = (camera.fov_degrees / 2.0).to_radians();
        let target_distance = offset.length() * half_fov.tan();
        let height = self.element_size.y;
        let left = 2.0 * delta.x * target_distance / height;
        let up = 2.0 * delta.y * target_distance / height;
        self.pan_offset += camera.right() * -left;
        self.pan_offset += camera.up_axis() * up;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-4;

    fn scene_camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 2.0, 5.0);
        camera
    }

    #[test]
    fn spherical_round_trip() {
        let offset = Vec3::new(1.0, 2.0, -3.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!(back.abs_diff_eq(offset, TOL));
    }

    #[test]
    fn new_points_camera_at_target_without_moving_it() {
        let mut camera = scene_camera();
        let controls = OrbitControls::new(&mut camera, 800, 600);
        assert_eq!(camera.target, controls.target);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 2.0, 5.0), TOL));
    }

    #[test]
    fn idle_update_reports_no_motion() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        assert!(!controls.update(&mut camera));
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 2.0, 5.0), TOL));
    }

    #[test]
    fn drag_rotates_around_target_keeping_distance() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        let before = controls.distance(&camera);

        controls.handle_event(ControlEvent::down(PointerButton::Primary, 100.0, 100.0), &camera);
        controls.handle_event(ControlEvent::moved(250.0, 100.0), &camera);
        controls.handle_event(ControlEvent::PointerUp { button: PointerButton::Primary }, &camera);

        assert!(controls.update(&mut camera));
        assert!((controls.distance(&camera) - before).abs() < TOL);
        // Dragging right swings the camera towards -X.
        assert!(camera.position.x < 0.0);
        // 150px of a 600px element is a quarter turn.
        let theta = camera.position.x.atan2(camera.position.z);
        assert!((theta + PI / 2.0).abs() < TOL);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        controls.max_polar_angle = PI / 2.0;
        controls.handle_event(ControlEvent::down(PointerButton::Primary, 0.0, 0.0), &camera);
        controls.handle_event(ControlEvent::moved(0.0, -2000.0), &camera);
        controls.update(&mut camera);
        assert!(camera.position.y >= -TOL);
    }

    #[test]
    fn wheel_up_moves_closer_and_down_moves_away() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        let start = controls.distance(&camera);

        controls.handle_event(ControlEvent::Wheel { delta_y: -1.0 }, &camera);
        controls.update(&mut camera);
        let closer = controls.distance(&camera);
        assert!((closer - start * 0.95).abs() < TOL);

        controls.handle_event(ControlEvent::Wheel { delta_y: 1.0 }, &camera);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - start).abs() < TOL);
    }

    #[test]
    fn distance_limits_are_respected() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        controls.max_distance = 6.0;
        for _ in 0..50 {
            controls.handle_event(ControlEvent::Wheel { delta_y: 1.0 }, &camera);
        }
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 6.0).abs() < TOL);
    }

    #[test]
    fn right_drag_pans_target() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        controls.handle_event(ControlEvent::down(PointerButton::Secondary, 0.0, 0.0), &camera);
        controls.handle_event(ControlEvent::moved(60.0, 0.0), &camera);
        let offset_before = camera.position - controls.target;
        controls.update(&mut camera);

        assert!(controls.target.x < 0.0);
        assert_eq!(camera.target, controls.target);
        // Panning translates camera and target together.
        assert!((camera.position - controls.target).abs_diff_eq(offset_before, TOL));
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        controls.enable_damping = true;
        controls.handle_event(ControlEvent::down(PointerButton::Primary, 0.0, 0.0), &camera);
        controls.handle_event(ControlEvent::moved(60.0, 0.0), &camera);
        controls.handle_event(ControlEvent::Cancel, &camera);

        let x0 = camera.position.x;
        assert!(controls.update(&mut camera));
        let x1 = camera.position.x;
        assert!(controls.update(&mut camera));
        let x2 = camera.position.x;
        // Still moving after the first frame, by a smaller step.
        assert!(x1 < x0 && x2 < x1);
        assert!((x2 - x1).abs() < (x1 - x0).abs());
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        controls.enabled = false;
        controls.handle_event(ControlEvent::Wheel { delta_y: -1.0 }, &camera);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn pointer_up_ends_drag() {
        let mut camera = scene_camera();
        let mut controls = OrbitControls::new(&mut camera, 800, 600);
        controls.handle_event(ControlEvent::down(PointerButton::Middle, 0.0, 0.0), &camera);
        assert!(controls.is_dragging());
        controls.handle_event(ControlEvent::PointerUp { button: PointerButton::Middle }, &camera);
        assert!(!controls.is_dragging());
    }
}
