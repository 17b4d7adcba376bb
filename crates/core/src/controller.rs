//! Viewer state and discrete actions.
//!
//! `ViewerState` is the single owner of everything that changes while the
//! viewer runs. The client maps platform events to `Action`s and pointer
//! deltas; this module decides what they do.

use glam::Vec3;

use crate::animation::AnimationState;
use crate::camera::{Camera, Movement};
use crate::frame::FrameInputs;
use crate::settings::Settings;

/// Discrete user commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    /// Camera back to the home position.
    ResetCamera,
    /// Start the ball rolling.
    StartRoll,
    /// Start the ball drifting away.
    StartBounce,
    /// Mark the session started and capture the pointer, leaving UI mode.
    StartSession,
    /// Show or hide the UI and hand the pointer to it.
    ToggleUi,
}

/// What the client must do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing outside the viewer state changed.
    None,
    /// Close the window and shut down.
    Quit,
    /// Hide and lock the pointer.
    CapturePointer,
    /// Show and free the pointer.
    ReleasePointer,
}

/// Coarse "game started" flag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionState {
    /// Elapsed time at the first session start, if any.
    started_at: Option<f32>,
}

impl SessionState {
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<f32> {
        self.started_at
    }

    /// Seconds since the session started.
    pub fn session_time(&self, elapsed: f32) -> Option<f32> {
        self.started_at.map(|start| (elapsed - start).max(0.0))
    }

    /// Record the start time. Later calls keep the first time.
    pub fn start(&mut self, elapsed: f32) {
        if self.started_at.is_none() {
            self.started_at = Some(elapsed);
        }
    }
}

/// Everything that changes while the viewer runs.
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub clear_color: Vec3,
    pub ui_enabled: bool,
    pub camera: Camera,
    pub animation: AnimationState,
    pub session: SessionState,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ViewerState {
    /// Restore state from persisted settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut camera = Camera::new(settings.camera_position);
        camera.set_front(settings.camera_front);
        camera.set_pointer_enabled(!settings.ui_enabled);

        Self {
            clear_color: settings.clear_color,
            ui_enabled: settings.ui_enabled,
            camera,
            animation: AnimationState::default(),
            session: SessionState::default(),
        }
    }

    /// The part of the state that outlives a run.
    pub fn to_settings(&self) -> Settings {
        Settings {
            clear_color: self.clear_color,
            ui_enabled: self.ui_enabled,
            camera_position: self.camera.position(),
            camera_front: self.camera.front(),
        }
    }

    /// Whether the pointer should be captured right now.
    pub fn wants_pointer_captured(&self) -> bool {
        !self.ui_enabled
    }

    /// Apply a discrete action at `elapsed` seconds since startup.
    pub fn handle_action(&mut self, action: Action, elapsed: f32) -> ActionOutcome {
        match action {
            Action::Quit => {
                tracing::info!("Quit requested");
                ActionOutcome::Quit
            }
            Action::ResetCamera => {
                self.camera.reset_to_home();
                tracing::debug!("Camera reset to {}", self.camera.position());
                ActionOutcome::None
            }
            Action::StartRoll => {
                if self.animation.start_roll() {
                    tracing::info!("Ball roll started at t={elapsed:.2}");
                }
                ActionOutcome::None
            }
            Action::StartBounce => {
                if self.animation.start_bounce() {
                    tracing::info!("Ball bounce started at t={elapsed:.2}");
                }
                ActionOutcome::None
            }
            Action::StartSession => {
                if !self.session.is_started() {
                    tracing::info!("Session started at t={elapsed:.2}");
                }
                self.session.start(elapsed);
                // Capturing the pointer leaves UI mode so the camera follows it.
                self.ui_enabled = false;
                self.camera.set_pointer_enabled(true);
                ActionOutcome::CapturePointer
            }
            Action::ToggleUi => {
                self.ui_enabled = !self.ui_enabled;
                self.camera.set_pointer_enabled(!self.ui_enabled);
                tracing::debug!("UI {}", if self.ui_enabled { "enabled" } else { "disabled" });
                if self.ui_enabled {
                    ActionOutcome::ReleasePointer
                } else {
                    ActionOutcome::CapturePointer
                }
            }
        }
    }

    /// Pointer moved by (`dx`, `dy`) pixels, `dy` positive upwards.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        self.camera.process_pointer_motion(dx, dy);
    }

    pub fn scrolled(&mut self, dy: f32) {
        self.camera.process_scroll(dy);
    }

    /// Move the camera for each held direction.
    pub fn move_camera(&mut self, held: impl IntoIterator<Item = Movement>, delta_time: f32) {
        for direction in held {
            self.camera.process_movement(direction, delta_time);
        }
    }

    /// Planner inputs for this frame.
    pub fn frame_inputs(&self, elapsed: f32, aspect: f32) -> FrameInputs<'_> {
        FrameInputs {
            camera: &self.camera,
            animation: &self.animation,
            clear_color: self.clear_color,
            elapsed,
            aspect,
        }
    }
}
