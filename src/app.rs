//! Windowed demo shell.
//!
//! Owns the three cameras and the event loop, feeds input to the camera
//! controller, steps the control tick at a fixed rate and renders a frame
//! per redraw. The world is built before the window exists; GPU resources
//! are initialized lazily on the first rendered frame.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cgmath::Vector3;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::error::{Error, Result};
use crate::gfx::camera::{Camera, CameraController, CameraMode};
use crate::gfx::rendering::RenderEngine;
use crate::world::World;

const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);
/// Control ticks run at the original demo's 60 Hz regardless of frame rate.
const TICK: Duration = Duration::from_micros(16_667);

pub struct RacelineApp {
    event_loop: Option<EventLoop<()>>,
    state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    world: World,
    controller: CameraController,
    chase: Camera,
    photo: Camera,
    observer: Camera,
    last_tick: Instant,
    mouse_pressed: bool,
}

impl RacelineApp {
    /// Wraps a built world in an application shell.
    pub fn new(world: World) -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::resource(format!("failed to create event loop: {e}")))?;

        Ok(Self {
            event_loop: Some(event_loop),
            state: AppState {
                window: None,
                engine: None,
                world,
                controller: CameraController::new(),
                chase: Camera::new(),
                photo: Camera::new(),
                observer: Camera::new(),
                last_tick: Instant::now(),
                mouse_pressed: false,
            },
        })
    }

    /// Runs the event loop until the window closes.
    pub fn run(mut self) -> Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| Error::precondition("event loop already consumed"))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.state)
            .map_err(|e| Error::resource(format!("event loop failed: {e}")))
    }
}

impl AppState {
    /// Chase camera: behind and above the car, looking ahead of it.
    fn orient_chase(&mut self) {
        let pos = self.world.car().position();
        let dir = self.world.car().direction();
        let at = pos + dir * 10.0;
        let mut eye = pos - dir * 6.0;
        eye.y = 3.0;
        if let Err(e) = self.chase.orient(eye, at, WORLD_UP) {
            log::warn!("chase camera orient rejected: {e}");
        }
    }

    /// Photo camera: fixed vantage point, tracking the car.
    fn orient_photo(&mut self) {
        if let Err(e) = self
            .photo
            .orient(self.world.photo_position(), self.world.car().position(), WORLD_UP)
        {
            log::warn!("photo camera orient rejected: {e}");
        }
    }

    fn control_tick(&mut self) {
        match self.controller.mode {
            CameraMode::Chase | CameraMode::Photo => {
                self.controller.tick_car(self.world.car_mut());
            }
            CameraMode::Observer => {
                self.controller.tick_observer(&mut self.observer);
            }
        }

        if self.controller.any_key_held() {
            match self.controller.mode {
                CameraMode::Chase => self.orient_chase(),
                CameraMode::Photo => self.orient_photo(),
                CameraMode::Observer => {}
            }
        }
    }

    fn set_aspect(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        self.chase.set_aspect(aspect);
        self.photo.set_aspect(aspect);
        self.observer.set_aspect(aspect);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("Raceline")
                .with_inner_size(winit::dpi::LogicalSize::new(800, 600)),
        ) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let engine = {
            let window = window.clone();
            match pollster::block_on(RenderEngine::new(window, width, height)) {
                Ok(engine) => engine,
                Err(e) => {
                    log::error!("GPU bring-up failed: {e}");
                    event_loop.exit();
                    return;
                }
            }
        };

        self.world.init(&engine.render_context());
        self.engine = Some(engine);

        self.set_aspect(width, height);
        if let Err(e) = self.observer.orient(
            self.world.observer_position(),
            self.world.car().position(),
            WORLD_UP,
        ) {
            log::warn!("observer camera orient rejected: {e}");
        }
        self.orient_chase();
        self.orient_photo();
        self.last_tick = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if matches!(
                    event.physical_key,
                    winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape)
                ) {
                    event_loop.exit();
                    return;
                }
                self.controller.process_key_event(&event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.set_aspect(width, height);
                if let Some(engine) = self.engine.as_mut() {
                    engine.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => {
                // Catch up missed ticks, but never replay a long stall
                // (window hidden, machine asleep) as a burst of movement.
                if self.last_tick.elapsed() > Duration::from_millis(250) {
                    self.last_tick = Instant::now();
                }
                while self.last_tick.elapsed() >= TICK {
                    self.last_tick += TICK;
                    self.control_tick();
                }

                if let Some(engine) = self.engine.as_mut() {
                    let camera = match self.controller.mode {
                        CameraMode::Chase => &self.chase,
                        CameraMode::Photo => &self.photo,
                        CameraMode::Observer => &self.observer,
                    };
                    engine.update_frame(camera, &self.world);
                    if let Err(e) = engine.render_frame(&self.world) {
                        log::error!("frame failed: {e}");
                    }
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.mouse_pressed && self.controller.mode == CameraMode::Observer {
                self.controller
                    .drag_observer(&mut self.observer, dx as f32, dy as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
