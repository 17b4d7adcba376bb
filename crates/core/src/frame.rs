//! Per-frame render plan.
//!
//! `FramePlan::build` walks [`SCENE`] once and emits the exact sequence of
//! state changes and draws the renderer must execute. The renderer never
//! decides order itself.

use glam::{Mat4, Vec3};

use crate::animation::AnimationState;
use crate::camera::Camera;
use crate::lighting::Lighting;
use crate::scene::{passes_in_order, GeometryId, Pass, SceneObject, ShaderKind, TextureId, SCENE};

/// Depth test comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthCompare {
    #[default]
    Less,
    LessEqual,
}

/// Color blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    /// Source alpha over one-minus-source-alpha.
    Alpha,
}

/// Fixed-function state carried between commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderState {
    pub depth_compare: DepthCompare,
    pub blend: BlendMode,
}

impl RenderState {
    /// Apply a command's state change, if it has one.
    pub fn apply(&mut self, command: &RenderCommand) {
        match command {
            RenderCommand::SetDepthCompare(compare) => self.depth_compare = *compare,
            RenderCommand::SetBlend(blend) => self.blend = *blend,
            _ => {}
        }
    }
}

/// One step of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Clear color (alpha 1) and depth.
    Clear { color: Vec3 },
    UseShader(ShaderKind),
    SetDepthCompare(DepthCompare),
    SetBlend(BlendMode),
    /// Projection and view for the current shader.
    UploadCamera {
        projection: Mat4,
        view: Mat4,
        view_position: Vec3,
    },
    /// Point lights, flashlight and material for the lit shader.
    UploadLighting(Box<Lighting>),
    BindTexture(TextureId),
    Draw { geometry: GeometryId, model: Mat4 },
}

/// What the planner reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub camera: &'a Camera,
    pub animation: &'a AnimationState,
    pub clear_color: Vec3,
    /// Seconds since startup.
    pub elapsed: f32,
    /// Viewport width over height.
    pub aspect: f32,
}

/// Ordered commands for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    commands: Vec<RenderCommand>,
}

impl FramePlan {
    /// Plan a frame of the fixed scene.
    pub fn build(inputs: &FrameInputs<'_>) -> Self {
        Self::build_for(SCENE, inputs)
    }

    /// Plan a frame over an arbitrary object list.
    pub fn build_for(objects: &[SceneObject], inputs: &FrameInputs<'_>) -> Self {
        debug_assert!(passes_in_order(objects), "scene passes out of order");

        let camera = inputs.camera;
        let animation = inputs.animation;
        let elapsed = inputs.elapsed;

        let projection = camera.projection_matrix(inputs.aspect);
        let ball_position = animation.ball_position(elapsed);
        let lighting = Lighting::for_frame(camera, ball_position, elapsed);

        let mut commands = vec![RenderCommand::Clear {
            color: inputs.clear_color,
        }];

        let base = RenderState::default();
        let mut state = base;
        let mut pass: Option<Pass> = None;
        let mut shader: Option<ShaderKind> = None;
        let mut texture: Option<TextureId> = None;

        for object in objects {
            if pass != Some(object.pass) {
                transition(&mut commands, &mut state, pass_state(object.pass));
                pass = Some(object.pass);
            }

            if shader != Some(object.shader) {
                commands.push(RenderCommand::UseShader(object.shader));
                if object.shader.is_lit() {
                    commands.push(RenderCommand::UploadLighting(Box::new(lighting)));
                }
                let view = if object.shader.uses_rotation_only_view() {
                    camera.rotation_only_view_matrix()
                } else {
                    camera.view_matrix()
                };
                commands.push(RenderCommand::UploadCamera {
                    projection,
                    view,
                    view_position: camera.position(),
                });
                shader = Some(object.shader);
                // A new shader has no texture bound yet.
                texture = None;
            }

            if let Some(id) = object.texture {
                if texture != Some(id) {
                    commands.push(RenderCommand::BindTexture(id));
                    texture = Some(id);
                }
            }

            commands.push(RenderCommand::Draw {
                geometry: object.geometry,
                model: object.transform.model_matrix(animation, elapsed),
            });
        }

        transition(&mut commands, &mut state, base);

        Self { commands }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of draw commands.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Draw { .. }))
            .count()
    }

    /// State after executing this plan from `initial`.
    pub fn final_state(&self, initial: RenderState) -> RenderState {
        self.commands.iter().fold(initial, |mut state, command| {
            state.apply(command);
            state
        })
    }
}

fn pass_state(pass: Pass) -> RenderState {
    RenderState {
        depth_compare: pass.depth_compare(),
        blend: pass.blend(),
    }
}

/// Emit only the state changes needed to go from `state` to `target`.
fn transition(commands: &mut Vec<RenderCommand>, state: &mut RenderState, target: RenderState) {
    if state.blend != target.blend {
        commands.push(RenderCommand::SetBlend(target.blend));
    }
    if state.depth_compare != target.depth_compare {
        commands.push(RenderCommand::SetDepthCompare(target.depth_compare));
    }
    *state = target;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_at(camera: &Camera, animation: &AnimationState, elapsed: f32) -> FramePlan {
        FramePlan::build(&FrameInputs {
            camera,
            animation,
            clear_color: Vec3::new(0.1, 0.2, 0.3),
            elapsed,
            aspect: 800.0 / 600.0,
        })
    }

    fn position_of(plan: &FramePlan, wanted: impl Fn(&RenderCommand) -> bool) -> usize {
        plan.commands()
            .iter()
            .position(wanted)
            .unwrap_or_else(|| panic!("command not found in plan"))
    }

    fn drawn(plan: &FramePlan) -> Vec<GeometryId> {
        plan.commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Draw { geometry, .. } => Some(*geometry),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_with_clear() {
        let camera = Camera::default();
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);
        assert_eq!(
            plan.commands()[0],
            RenderCommand::Clear {
                color: Vec3::new(0.1, 0.2, 0.3)
            }
        );
    }

    #[test]
    fn draws_every_object_in_pass_order() {
        let camera = Camera::default();
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);
        assert_eq!(
            drawn(&plan),
            [
                GeometryId::Dog,
                GeometryId::Ball,
                GeometryId::Crate,
                GeometryId::Orange,
                GeometryId::RoseQuad,
                GeometryId::BinQuad,
                GeometryId::MarkerCube,
                GeometryId::MarkerCube,
                GeometryId::MarkerCube,
                GeometryId::SkyboxCube,
            ]
        );
        assert_eq!(plan.draw_count(), SCENE.len());
    }

    #[test]
    fn state_restored_across_many_frames() {
        let mut camera = Camera::default();
        let mut animation = AnimationState::default();
        let mut state = RenderState::default();

        for frame in 0..120 {
            if frame == 30 {
                animation.start_roll();
            }
            if frame == 60 {
                animation.start_bounce();
            }
            camera.process_pointer_motion(3.0, -1.0);
            let plan = plan_at(&camera, &animation, frame as f32 / 60.0);
            state = plan.final_state(state);
        }

        assert_eq!(state.depth_compare, DepthCompare::Less);
        assert_eq!(state, RenderState::default());
    }

    #[test]
    fn blending_wraps_only_the_rose() {
        let camera = Camera::default();
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);

        let blend_on = position_of(&plan, |c| *c == RenderCommand::SetBlend(BlendMode::Alpha));
        let blend_off = position_of(&plan, |c| *c == RenderCommand::SetBlend(BlendMode::Opaque));
        let rose = position_of(&plan, |c| {
            matches!(c, RenderCommand::Draw { geometry: GeometryId::RoseQuad, .. })
        });
        let orange = position_of(&plan, |c| {
            matches!(c, RenderCommand::Draw { geometry: GeometryId::Orange, .. })
        });
        let bin = position_of(&plan, |c| {
            matches!(c, RenderCommand::Draw { geometry: GeometryId::BinQuad, .. })
        });

        assert!(orange < blend_on);
        assert!(blend_on < rose);
        assert!(rose < blend_off);
        assert!(blend_off < bin);
    }

    #[test]
    fn skybox_is_last_under_less_equal() {
        let camera = Camera::default();
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);
        let commands = plan.commands();

        let less_equal = position_of(&plan, |c| {
            *c == RenderCommand::SetDepthCompare(DepthCompare::LessEqual)
        });
        let skybox = position_of(&plan, |c| {
            matches!(c, RenderCommand::Draw { geometry: GeometryId::SkyboxCube, .. })
        });

        assert!(less_equal < skybox);
        assert_eq!(
            commands.last(),
            Some(&RenderCommand::SetDepthCompare(DepthCompare::Less))
        );
        assert_eq!(skybox, commands.len() - 2);
    }

    #[test]
    fn each_shader_gets_fresh_camera() {
        let camera = Camera::default();
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);
        let commands = plan.commands();

        let mut shaders = 0;
        for (i, command) in commands.iter().enumerate() {
            if let RenderCommand::UseShader(kind) = command {
                shaders += 1;
                let uploaded = commands[i + 1..]
                    .iter()
                    .take_while(|c| !matches!(c, RenderCommand::Draw { .. }))
                    .find_map(|c| match c {
                        RenderCommand::UploadCamera { view, .. } => Some(*view),
                        _ => None,
                    })
                    .unwrap_or_else(|| panic!("{kind:?} draws without a camera upload"));

                let expected = if *kind == ShaderKind::Skybox {
                    camera.rotation_only_view_matrix()
                } else {
                    camera.view_matrix()
                };
                assert_eq!(uploaded, expected);
            }
        }
        assert_eq!(shaders, 5);
    }

    #[test]
    fn lighting_uploaded_once_for_lit_shader() {
        let camera = Camera::default();
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);

        let uploads = plan
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::UploadLighting(_)))
            .count();
        assert_eq!(uploads, 1);

        let lit = position_of(&plan, |c| *c == RenderCommand::UseShader(ShaderKind::Lit));
        let lights = position_of(&plan, |c| matches!(c, RenderCommand::UploadLighting(_)));
        let dog = position_of(&plan, |c| {
            matches!(c, RenderCommand::Draw { geometry: GeometryId::Dog, .. })
        });
        assert!(lit < lights && lights < dog);
    }

    #[test]
    fn spotlight_follows_camera() {
        let mut camera = Camera::default();
        camera.process_pointer_motion(120.0, 40.0);
        camera.process_movement(crate::camera::Movement::Forward, 0.5);
        let plan = plan_at(&camera, &AnimationState::default(), 1.0);

        let lighting = plan
            .commands()
            .iter()
            .find_map(|c| match c {
                RenderCommand::UploadLighting(l) => Some(l),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no lighting upload"));
        assert_eq!(lighting.spot_light.position, camera.position());
        assert_eq!(lighting.spot_light.direction, camera.front());
    }

    #[test]
    fn textures_bound_before_their_draws() {
        let camera = Camera::default();
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);

        for (texture, geometry) in [
            (TextureId::Rose, GeometryId::RoseQuad),
            (TextureId::Bin, GeometryId::BinQuad),
            (TextureId::Skybox, GeometryId::SkyboxCube),
        ] {
            let bind = position_of(&plan, |c| *c == RenderCommand::BindTexture(texture));
            let draw = position_of(&plan, |c| {
                matches!(c, RenderCommand::Draw { geometry: g, .. } if *g == geometry)
            });
            assert!(bind < draw, "{texture:?} bound after {geometry:?} drawn");
        }
    }

    #[test]
    fn projection_uses_zoom_and_aspect() {
        let mut camera = Camera::default();
        camera.process_scroll(20.0);
        let plan = plan_at(&camera, &AnimationState::default(), 0.0);
        let projection = plan
            .commands()
            .iter()
            .find_map(|c| match c {
                RenderCommand::UploadCamera { projection, .. } => Some(*projection),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no camera upload"));
        assert_eq!(projection, camera.projection_matrix(800.0 / 600.0));
    }

    #[test]
    fn ball_draw_uses_animated_position() {
        let camera = Camera::default();
        let mut animation = AnimationState::default();
        animation.start_bounce();
        let plan = plan_at(&camera, &animation, 2.0);

        let model = plan
            .commands()
            .iter()
            .find_map(|c| match c {
                RenderCommand::Draw {
                    geometry: GeometryId::Ball,
                    model,
                } => Some(*model),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no ball draw"));
        assert!(model
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(7.0, -7.0, 6.8), 1e-5));
    }
}
