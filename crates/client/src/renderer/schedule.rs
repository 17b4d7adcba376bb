//! Resolve a frame plan into GPU work.
//!
//! The plan is a stream of state changes. wgpu bakes blend and depth state
//! into pipelines, so each draw is resolved here to the pipeline it needs,
//! the globals snapshot it sees and its own instance uniforms. Nothing in
//! this module touches the device.

use glam::Vec3;

use yardview_core::{FramePlan, GeometryId, RenderCommand, RenderState, ShaderKind, TextureId};

use super::uniforms::{GlobalUniforms, InstanceUniforms};

/// Everything that selects a render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shader: ShaderKind,
    pub state: RenderState,
}

/// One draw with all state resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledDraw {
    pub pipeline: PipelineKey,
    /// Index into [`FrameSchedule::globals`].
    pub globals_slot: usize,
    pub instance: InstanceUniforms,
    pub geometry: GeometryId,
    /// Texture bound by the plan. Meshes without one use their own material.
    pub texture: Option<TextureId>,
}

/// A frame ready to record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSchedule {
    pub clear_color: Vec3,
    /// Globals snapshots. A new one starts whenever an upload changes them.
    pub globals: Vec<GlobalUniforms>,
    pub draws: Vec<ScheduledDraw>,
}

impl FrameSchedule {
    pub fn from_plan(plan: &FramePlan) -> Self {
        Self::from_commands(plan.commands())
    }

    pub fn from_commands(commands: &[RenderCommand]) -> Self {
        let mut schedule = Self::default();

        let mut state = RenderState::default();
        let mut shader: Option<ShaderKind> = None;
        let mut texture: Option<TextureId> = None;
        let mut current = GlobalUniforms::default();
        let mut dirty = true;

        for command in commands {
            match command {
                RenderCommand::Clear { color } => schedule.clear_color = *color,
                RenderCommand::UseShader(kind) => {
                    shader = Some(*kind);
                    texture = None;
                }
                RenderCommand::SetDepthCompare(_) | RenderCommand::SetBlend(_) => {
                    state.apply(command);
                }
                RenderCommand::UploadCamera {
                    projection,
                    view,
                    view_position,
                } => {
                    current.set_camera(*projection, *view, *view_position);
                    dirty = true;
                }
                RenderCommand::UploadLighting(lighting) => {
                    current.set_lighting(lighting);
                    dirty = true;
                }
                RenderCommand::BindTexture(id) => texture = Some(*id),
                RenderCommand::Draw { geometry, model } => {
                    let Some(shader) = shader else {
                        tracing::warn!("Skipping draw of {geometry:?}: no shader in use");
                        continue;
                    };
                    if dirty {
                        schedule.globals.push(current);
                        dirty = false;
                    }
                    schedule.draws.push(ScheduledDraw {
                        pipeline: PipelineKey { shader, state },
                        globals_slot: schedule.globals.len() - 1,
                        instance: InstanceUniforms::new(*model),
                        geometry: *geometry,
                        texture,
                    });
                }
            }
        }

        schedule
    }

    /// Distinct pipelines in first-use order.
    pub fn pipeline_keys(&self) -> Vec<PipelineKey> {
        let mut keys: Vec<PipelineKey> = Vec::new();
        for draw in &self.draws {
            if !keys.contains(&draw.pipeline) {
                keys.push(draw.pipeline);
            }
        }
        keys
    }
}
