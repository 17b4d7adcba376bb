//! Application state and event loop handler.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{CursorGrabMode, Window, WindowId},
};

use yardview_core::{ActionOutcome, FrameClock, FramePlan, Settings, ViewerState};

use crate::config::ViewerConfig;
use crate::input::InputHandler;
use crate::renderer::Renderer;

/// Pixels per scroll line for touchpads that report pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

/// Main application state.
pub struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    state: Option<ViewerState>,
    input: InputHandler,
    clock: FrameClock,
    title: String,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            title: config.title.clone(),
            config,
            window: None,
            renderer: None,
            state: None,
            input: InputHandler::new(),
            clock: FrameClock::new(),
            error: None,
        }
    }

    /// The startup error that ended the loop, if any.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let renderer = pollster::block_on(Renderer::new(window.clone(), &self.config))?;

        let settings = Settings::load(self.config.settings_path());
        let state = ViewerState::from_settings(&settings);
        set_pointer_captured(&window, state.wants_pointer_captured());

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.state = Some(state);
        self.clock = FrameClock::new();

        tracing::info!("Window and renderer initialized");
        Ok(())
    }

    fn apply_outcome(&mut self, event_loop: &ActiveEventLoop, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::None => {}
            ActionOutcome::Quit => event_loop.exit(),
            ActionOutcome::CapturePointer | ActionOutcome::ReleasePointer => {
                if let Some(window) = &self.window {
                    set_pointer_captured(window, outcome == ActionOutcome::CapturePointer);
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(state)) = (&mut self.renderer, &mut self.state) else {
            return;
        };

        let timing = self.clock.tick();
        state.move_camera(self.input.held(), timing.delta);

        let plan = FramePlan::build(&state.frame_inputs(timing.elapsed, renderer.aspect()));
        match renderer.render(&plan) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.reconfigure();
            }
            Err(e) => {
                tracing::error!("Render error: {e:?}, exiting");
                event_loop.exit();
            }
        }

        let title = window_title(&self.config.title, state, timing.elapsed);
        if let Some(window) = &self.window {
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
            window.request_redraw();
        }
    }
}

/// Title bar text. With the UI on it doubles as the debug readout.
fn window_title(base: &str, state: &ViewerState, elapsed: f32) -> String {
    if !state.ui_enabled {
        return base.to_string();
    }
    let position = state.camera.position();
    let session = match state.session.session_time(elapsed) {
        Some(seconds) => format!("{seconds:.0}s"),
        None => "not started".to_string(),
    };
    format!(
        "{base} | camera ({:.2}, {:.2}, {:.2}) | session {session}",
        position.x, position.y, position.z
    )
}

fn set_pointer_captured(window: &Window, captured: bool) {
    let result = if captured {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(e) = result {
        tracing::warn!("Cursor grab not supported: {e}");
    }
    window.set_cursor_visible(!captured);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            tracing::error!("Startup failed: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size);
                }
            }

            WindowEvent::Focused(false) => self.input.reset(),

            WindowEvent::KeyboardInput { event, .. } => {
                let Some(action) =
                    self.input
                        .process_key(event.physical_key, event.state, event.repeat)
                else {
                    return;
                };
                let elapsed = self.clock.elapsed();
                if let Some(state) = &mut self.state {
                    let outcome = state.handle_action(action, elapsed);
                    self.apply_outcome(event_loop, outcome);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                if let Some(state) = &mut self.state {
                    state.scrolled(dy);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if let Some(state) = &mut self.state {
                // Screen y grows downwards.
                state.pointer_moved(dx as f32, -dy as f32);
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(state) = &self.state else {
            return;
        };
        let path = self.config.settings_path();
        match state.to_settings().save(&path) {
            Ok(()) => {}
            Err(e) => tracing::error!("Failed to save settings to {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yardview_core::Action;

    #[test]
    fn title_is_plain_without_ui() {
        let state = ViewerState::default();
        assert_eq!(window_title("Yardview", &state, 3.0), "Yardview");
    }

    #[test]
    fn title_shows_camera_and_session_with_ui() {
        let mut state = ViewerState::default();
        state.handle_action(Action::ToggleUi, 0.0);
        let title = window_title("Yardview", &state, 3.0);
        assert!(title.contains("camera (-2.32, 0.54, 5.87)"), "{title}");
        assert!(title.ends_with("session not started"), "{title}");

        state.handle_action(Action::StartSession, 1.0);
        assert_eq!(window_title("Yardview", &state, 2.0), "Yardview");

        state.handle_action(Action::ToggleUi, 2.0);
        let title = window_title("Yardview", &state, 4.0);
        assert!(title.ends_with("session 3s"), "{title}");
    }
}
