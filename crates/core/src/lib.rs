//! Yardview Core - Scene Viewer Logic
//!
//! Everything the viewer decides on the CPU lives here: the free camera,
//! the persisted settings record, the fixed scene layout, light and
//! animation formulas, and the per-frame render plan.
//!
//! # Rules
//!
//! 1. No GPU types - the client crate executes plans, this crate builds them
//! 2. Time-varying values are pure functions of elapsed time and latches
//! 3. No globals - state is owned by `ViewerState` and passed by reference

pub mod animation;
pub mod camera;
pub mod clock;
pub mod controller;
pub mod frame;
pub mod lighting;
pub mod scene;
pub mod settings;

pub use animation::{AnimationState, Latch};
pub use camera::{Camera, Movement};
pub use clock::{FrameClock, FrameTiming};
pub use controller::{Action, ActionOutcome, SessionState, ViewerState};
pub use frame::{BlendMode, DepthCompare, FrameInputs, FramePlan, RenderCommand, RenderState};
pub use lighting::{Lighting, PointLight, SpotLight};
pub use scene::{GeometryId, Pass, SceneObject, ShaderKind, TextureId};
pub use settings::{Settings, SettingsError};
