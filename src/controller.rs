//viewer controller

use glam::{Vec3, Mat4, Vec2};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{PhysicalKey, KeyCode};
use tracing::debug;

const DEFAULT_DIST: f32 = 30.0;
const DEFAULT_YAW: f32 = 0.6;
const DEFAULT_PITCH: f32 = 0.5;
const ORBIT_SPEED: f32 = 0.005;
const PITCH_LIMIT: f32 = 1.5;

/// What the event loop should do after the controller consumed an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlFlow {
    Ignored,
    Redraw,
    Exit,
}

pub struct Controller {
    pub cam_dist: f32,
    pub cam_yaw: f32,
    pub cam_pitch: f32,
    pub target: Vec3,

    // input state
    pub mouse_pos: Vec2,
    pub is_orbiting: bool,
    pub is_wireframe: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            cam_dist: DEFAULT_DIST,
            cam_yaw: DEFAULT_YAW,
            cam_pitch: DEFAULT_PITCH,
            target: Vec3::ZERO,
            mouse_pos: Vec2::ZERO,
            is_orbiting: false,
            is_wireframe: false,
        }
    }

    pub fn reset(&mut self) {
        let is_wireframe = self.is_wireframe;
        *self = Self { is_wireframe, ..Self::new() };
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.cam_yaw.sin_cos();
        let (sp, cp) = self.cam_pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.cam_dist
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.cam_yaw -= delta.x * ORBIT_SPEED;
        self.cam_pitch = (self.cam_pitch + delta.y * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn zoom(&mut self, lines: f32) {
        self.cam_dist = (self.cam_dist * (1.0 - lines * 0.1)).clamp(1.0, 200.0);
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> ControlFlow {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                let d = new_pos - self.mouse_pos;
                self.mouse_pos = new_pos;
                if self.is_orbiting {
                    self.orbit(d);
                    return ControlFlow::Redraw;
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if matches!(button, MouseButton::Left | MouseButton::Middle) {
                    self.is_orbiting = *state == ElementState::Pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 * 0.01,
                };
                self.zoom(y);
                return ControlFlow::Redraw;
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyF) => {
                        self.is_wireframe = !self.is_wireframe;
                        debug!(wireframe = self.is_wireframe, "toggled wireframe");
                        return ControlFlow::Redraw;
                    }
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        self.reset();
                        return ControlFlow::Redraw;
                    }
                    PhysicalKey::Code(KeyCode::Escape) => return ControlFlow::Exit,
                    _ => {}
                }
            }
            _ => {}
        }
        ControlFlow::Ignored
    }

    pub fn get_matrix(&self, width: f32, height: f32) -> Mat4 {
        let aspect = width / height.max(1.0);
        let proj = Mat4::perspective_rh(45f32.to_radians(), aspect, 0.1, 500.0);
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_at_orbit_distance() {
        let mut c = Controller::new();
        c.orbit(Vec2::new(120.0, -40.0));
        assert!((c.eye().distance(c.target) - c.cam_dist).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut c = Controller::new();
        c.orbit(Vec2::new(0.0, 1.0e6));
        assert_eq!(c.cam_pitch, PITCH_LIMIT);
        c.orbit(Vec2::new(0.0, -1.0e7));
        assert_eq!(c.cam_pitch, -PITCH_LIMIT);
    }

    #[test]
    fn zoom_stays_in_range() {
        let mut c = Controller::new();
        for _ in 0..100 {
            c.zoom(3.0);
        }
        assert_eq!(c.cam_dist, 1.0);
        for _ in 0..100 {
            c.zoom(-3.0);
        }
        assert_eq!(c.cam_dist, 200.0);
    }

    #[test]
    fn reset_keeps_wireframe() {
        let mut c = Controller::new();
        c.is_wireframe = true;
        c.orbit(Vec2::new(50.0, 50.0));
        c.zoom(2.0);
        c.reset();
        assert!(c.is_wireframe);
        assert_eq!(c.cam_dist, DEFAULT_DIST);
        assert_eq!(c.cam_yaw, DEFAULT_YAW);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let c = Controller::new();
        let clip = c.get_matrix(800.0, 600.0).project_point3(c.target);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
    }
}
