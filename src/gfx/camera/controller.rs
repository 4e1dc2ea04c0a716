//! Keyboard/mouse control for the car and the free camera.
//!
//! Tracks which movement keys are held and which of the three viewpoints is
//! active, and applies the per-tick movement steps. The app shell feeds
//! winit events in and calls the `tick_*` methods from its fixed-rate
//! control timer.

use cgmath::Vector3;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::fly_camera::Camera;
use crate::gfx::scene::MobileEntity;

const MOVE_STEP: f32 = 0.5;
const TURN_STEP: f32 = 0.05;
const SLIDE_STEP: f32 = 0.5;
/// Radians of camera rotation per pixel of mouse drag.
const LOOK_SCALE: f32 = 1.0 / 400.0;

/// The three selectable viewpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Follows behind the car.
    Chase,
    /// Fixed vantage point tracking the car.
    Photo,
    /// Free-flying camera under mouse/keyboard control.
    Observer,
}

#[derive(Debug, Default, Clone, Copy)]
struct HeldKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    rise: bool,
    sink: bool,
}

pub struct CameraController {
    pub mode: CameraMode,
    keys: HeldKeys,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            mode: CameraMode::Chase,
            keys: HeldKeys::default(),
        }
    }

    /// Updates held-key state and the camera mode. Returns true when the
    /// event was consumed.
    pub fn process_key_event(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        let pressed = event.state == ElementState::Pressed;

        match code {
            KeyCode::Digit1 if pressed => self.mode = CameraMode::Chase,
            KeyCode::Digit2 if pressed => self.mode = CameraMode::Photo,
            KeyCode::Digit3 if pressed => self.mode = CameraMode::Observer,
            KeyCode::KeyW => self.keys.forward = pressed,
            KeyCode::KeyS => self.keys.backward = pressed,
            KeyCode::KeyA => self.keys.left = pressed,
            KeyCode::KeyD => self.keys.right = pressed,
            KeyCode::Space => self.keys.rise = pressed,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.keys.sink = pressed,
            _ => return false,
        }
        true
    }

    pub fn any_key_held(&self) -> bool {
        let k = &self.keys;
        k.forward || k.backward || k.left || k.right || k.rise || k.sink
    }

    /// One control tick while driving (chase/photo modes): W/S move the
    /// car, A/D steer it.
    pub fn tick_car(&self, car: &mut MobileEntity) {
        if self.keys.forward {
            car.advance(MOVE_STEP);
        }
        if self.keys.backward {
            car.advance(-MOVE_STEP);
        }
        if self.keys.left {
            car.turn(-TURN_STEP);
        }
        if self.keys.right {
            car.turn(TURN_STEP);
        }
    }

    /// One control tick in observer mode: ground-plane strafing plus
    /// vertical slides.
    pub fn tick_observer(&self, camera: &mut Camera) {
        if self.keys.forward {
            camera.slide_xz(Vector3::new(0.0, 0.0, -SLIDE_STEP));
        }
        if self.keys.backward {
            camera.slide_xz(Vector3::new(0.0, 0.0, SLIDE_STEP));
        }
        if self.keys.left {
            camera.slide_xz(Vector3::new(-SLIDE_STEP, 0.0, 0.0));
        }
        if self.keys.right {
            camera.slide_xz(Vector3::new(SLIDE_STEP, 0.0, 0.0));
        }
        if self.keys.sink {
            camera.slide_y(Vector3::new(0.0, -SLIDE_STEP, 0.0));
        }
        if self.keys.rise {
            camera.slide_y(Vector3::new(0.0, SLIDE_STEP, 0.0));
        }
    }

    /// Mouse drag in observer mode: horizontal motion yaws around world
    /// up, vertical motion pitches (with the camera's own inversion guard).
    pub fn drag_observer(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.rotate(dx * LOOK_SCALE, Vector3::new(0.0, 1.0, 0.0));
        camera.pitch(dy * LOOK_SCALE);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}
