//! The fixed scene layout.
//!
//! Every visible object is a `SceneObject` in [`SCENE`], listed in draw
//! order. Passes must appear in non-decreasing order; the frame planner
//! relies on that to switch blend and depth state once per pass.

use glam::{Mat4, Vec3};

use crate::animation::AnimationState;
use crate::frame::{BlendMode, DepthCompare};
use crate::lighting::{CRATE_LIGHT_POSITION, DOG_LIGHT_POSITION};

/// Render pass an object belongs to. Declaration order is draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pass {
    Opaque,
    Transparent,
    Textured,
    Markers,
    Skybox,
}

impl Pass {
    pub const ALL: [Pass; 5] = [
        Pass::Opaque,
        Pass::Transparent,
        Pass::Textured,
        Pass::Markers,
        Pass::Skybox,
    ];

    /// Blend mode while this pass is drawing.
    pub fn blend(self) -> BlendMode {
        match self {
            Pass::Transparent => BlendMode::Alpha,
            _ => BlendMode::Opaque,
        }
    }

    /// Depth comparison while this pass is drawing.
    pub fn depth_compare(self) -> DepthCompare {
        match self {
            // Skybox sits at depth 1.0, which must still pass against the cleared buffer.
            Pass::Skybox => DepthCompare::LessEqual,
            _ => DepthCompare::Less,
        }
    }
}

/// Shader program used for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Phong shading with three point lights and the flashlight.
    Lit,
    /// Textured quad with alpha.
    Transparent,
    /// Textured quad tinted by per-vertex color.
    BinQuad,
    /// Unlit white cube.
    LightMarker,
    /// Cubemap sampled by direction.
    Skybox,
}

impl ShaderKind {
    /// Whether this shader reads the lighting uniforms.
    pub fn is_lit(self) -> bool {
        matches!(self, ShaderKind::Lit)
    }

    /// Whether this shader wants the view with its translation removed.
    pub fn uses_rotation_only_view(self) -> bool {
        matches!(self, ShaderKind::Skybox)
    }
}

/// Geometry loaded once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryId {
    Dog,
    Ball,
    Crate,
    Orange,
    /// Six-vertex textured quad.
    RoseQuad,
    /// Four-vertex indexed quad with colors.
    BinQuad,
    MarkerCube,
    /// 36-vertex unit cube.
    SkyboxCube,
}

impl GeometryId {
    pub const ALL: [GeometryId; 8] = [
        GeometryId::Dog,
        GeometryId::Ball,
        GeometryId::Crate,
        GeometryId::Orange,
        GeometryId::RoseQuad,
        GeometryId::BinQuad,
        GeometryId::MarkerCube,
        GeometryId::SkyboxCube,
    ];

    /// Model file stem for geometry loaded from disk.
    pub fn model_name(self) -> Option<&'static str> {
        match self {
            GeometryId::Dog => Some("dog"),
            GeometryId::Ball => Some("ball"),
            GeometryId::Crate => Some("crate"),
            GeometryId::Orange => Some("orange"),
            _ => None,
        }
    }
}

/// Textures bound explicitly by the plan. Meshes carry their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureId {
    Rose,
    Bin,
    /// Six-face cubemap.
    Skybox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    Degrees(f32),
    /// The ball's animated spin.
    BallSpin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub axis: Axis,
    pub angle: Angle,
}

impl Rotation {
    const fn degrees(axis: Axis, degrees: f32) -> Self {
        Self {
            axis,
            angle: Angle::Degrees(degrees),
        }
    }

    fn radians(&self, animation: &AnimationState, elapsed: f32) -> f32 {
        match self.angle {
            Angle::Degrees(deg) => deg.to_radians(),
            Angle::BallSpin => animation.ball_spin(elapsed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Fixed(Vec3),
    /// Follows the ball animation.
    Ball,
}

/// How an object's model matrix is composed: `T * R0 * R1 * ... * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformRecipe {
    pub placement: Placement,
    pub rotations: &'static [Rotation],
    pub scale: f32,
}

impl TransformRecipe {
    const fn fixed(position: Vec3, rotations: &'static [Rotation], scale: f32) -> Self {
        Self {
            placement: Placement::Fixed(position),
            rotations,
            scale,
        }
    }

    pub fn translation(&self, animation: &AnimationState, elapsed: f32) -> Vec3 {
        match self.placement {
            Placement::Fixed(position) => position,
            Placement::Ball => animation.ball_position(elapsed),
        }
    }

    pub fn model_matrix(&self, animation: &AnimationState, elapsed: f32) -> Mat4 {
        let mut model = Mat4::from_translation(self.translation(animation, elapsed));
        for rotation in self.rotations {
            let angle = rotation.radians(animation, elapsed);
            model *= Mat4::from_axis_angle(rotation.axis.unit(), angle);
        }
        model * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

/// One entry in the scene list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub pass: Pass,
    pub shader: ShaderKind,
    pub geometry: GeometryId,
    pub texture: Option<TextureId>,
    pub transform: TransformRecipe,
}

impl SceneObject {
    const fn lit(name: &'static str, geometry: GeometryId, transform: TransformRecipe) -> Self {
        Self {
            name,
            pass: Pass::Opaque,
            shader: ShaderKind::Lit,
            geometry,
            texture: None,
            transform,
        }
    }

    const fn marker(name: &'static str, position: Vec3) -> Self {
        Self {
            name,
            pass: Pass::Markers,
            shader: ShaderKind::LightMarker,
            geometry: GeometryId::MarkerCube,
            texture: None,
            transform: TransformRecipe::fixed(position, &[], MARKER_SCALE),
        }
    }
}

/// Scale of the small cubes drawn at each light.
pub const MARKER_SCALE: f32 = 0.08;

/// Where the ball light marker sits. This is the ball's rest position, not
/// the animated light.
pub const BALL_MARKER_POSITION: Vec3 = crate::animation::BALL_BASE_POSITION;

const LAID_FLAT: Rotation = Rotation::degrees(Axis::X, -90.0);
const QUARTER_TURN: Rotation = Rotation::degrees(Axis::Z, 45.0);
const ROSE_ROLL: Rotation = Rotation::degrees(Axis::Z, -30.0);
const ROSE_YAW: Rotation = Rotation::degrees(Axis::Y, -30.0);
const BALL_SPIN: Rotation = Rotation {
    axis: Axis::Y,
    angle: Angle::BallSpin,
};

/// Every drawn object, in draw order.
pub const SCENE: &[SceneObject] = &[
    SceneObject::lit(
        "dog",
        GeometryId::Dog,
        TransformRecipe::fixed(Vec3::new(12.0, -8.0, -5.8), &[LAID_FLAT], 0.19),
    ),
    SceneObject::lit(
        "ball",
        GeometryId::Ball,
        TransformRecipe {
            placement: Placement::Ball,
            rotations: &[BALL_SPIN],
            scale: 0.1,
        },
    ),
    SceneObject::lit(
        "crate",
        GeometryId::Crate,
        TransformRecipe::fixed(
            Vec3::new(14.0, -5.0, 11.8),
            &[LAID_FLAT, QUARTER_TURN],
            0.03,
        ),
    ),
    SceneObject::lit(
        "orange",
        GeometryId::Orange,
        TransformRecipe::fixed(
            Vec3::new(12.5, -5.2, 11.8),
            &[LAID_FLAT, QUARTER_TURN],
            0.03,
        ),
    ),
    SceneObject {
        name: "rose",
        pass: Pass::Transparent,
        shader: ShaderKind::Transparent,
        geometry: GeometryId::RoseQuad,
        texture: Some(TextureId::Rose),
        transform: TransformRecipe::fixed(
            Vec3::new(9.5, -8.5, -7.8),
            &[ROSE_ROLL, ROSE_YAW],
            2.5,
        ),
    },
    SceneObject {
        name: "bin",
        pass: Pass::Textured,
        shader: ShaderKind::BinQuad,
        geometry: GeometryId::BinQuad,
        texture: Some(TextureId::Bin),
        transform: TransformRecipe::fixed(Vec3::new(-10.5, -10.6, 32.0), &[], 6.0),
    },
    SceneObject::marker("crate light", CRATE_LIGHT_POSITION),
    SceneObject::marker("dog light", DOG_LIGHT_POSITION),
    SceneObject::marker("ball light", BALL_MARKER_POSITION),
    SceneObject {
        name: "skybox",
        pass: Pass::Skybox,
        shader: ShaderKind::Skybox,
        geometry: GeometryId::SkyboxCube,
        texture: Some(TextureId::Skybox),
        transform: TransformRecipe::fixed(Vec3::ZERO, &[], 1.0),
    },
];

/// True if passes never go backwards through `objects`.
pub fn passes_in_order(objects: &[SceneObject]) -> bool {
    objects.windows(2).all(|pair| pair[0].pass <= pair[1].pass)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(name: &str) -> &'static SceneObject {
        SCENE
            .iter()
            .find(|o| o.name == name)
            .unwrap_or_else(|| panic!("no scene object named {name}"))
    }

    #[test]
    fn scene_passes_are_ordered() {
        assert!(passes_in_order(SCENE));

        let mut shuffled = SCENE.to_vec();
        shuffled.swap(0, SCENE.len() - 1);
        assert!(!passes_in_order(&shuffled));
    }

    #[test]
    fn every_pass_is_present() {
        for pass in Pass::ALL {
            assert!(SCENE.iter().any(|o| o.pass == pass), "{pass:?} missing");
        }
    }

    #[test]
    fn opaque_draw_order() {
        let names: Vec<&str> = SCENE
            .iter()
            .filter(|o| o.pass == Pass::Opaque)
            .map(|o| o.name)
            .collect();
        assert_eq!(names, ["dog", "ball", "crate", "orange"]);
    }

    #[test]
    fn pass_state_table() {
        assert_eq!(Pass::Transparent.blend(), BlendMode::Alpha);
        assert_eq!(Pass::Opaque.blend(), BlendMode::Opaque);
        assert_eq!(Pass::Skybox.depth_compare(), DepthCompare::LessEqual);
        assert_eq!(Pass::Markers.depth_compare(), DepthCompare::Less);
    }

    #[test]
    fn dog_model_matrix() {
        let animation = AnimationState::default();
        let model = find("dog").transform.model_matrix(&animation, 3.0);
        let expected = Mat4::from_translation(Vec3::new(12.0, -8.0, -5.8))
            * Mat4::from_rotation_x((-90.0_f32).to_radians())
            * Mat4::from_scale(Vec3::splat(0.19));
        assert!(model.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn rotations_compose_in_listed_order() {
        let animation = AnimationState::default();
        let model = find("crate").transform.model_matrix(&animation, 0.0);
        let expected = Mat4::from_translation(Vec3::new(14.0, -5.0, 11.8))
            * Mat4::from_rotation_x((-90.0_f32).to_radians())
            * Mat4::from_rotation_z(45.0_f32.to_radians())
            * Mat4::from_scale(Vec3::splat(0.03));
        assert!(model.abs_diff_eq(expected, 1e-5));

        let wrong_order = Mat4::from_translation(Vec3::new(14.0, -5.0, 11.8))
            * Mat4::from_rotation_z(45.0_f32.to_radians())
            * Mat4::from_rotation_x((-90.0_f32).to_radians())
            * Mat4::from_scale(Vec3::splat(0.03));
        assert!(!model.abs_diff_eq(wrong_order, 1e-3));
    }

    #[test]
    fn ball_follows_animation() {
        let ball = find("ball");
        let idle = AnimationState::default();
        let model = ball.transform.model_matrix(&idle, 5.0);
        assert!(model
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(6.0, -7.0, 6.8), 1e-6));

        let mut rolling = AnimationState::default();
        rolling.start_roll();
        let t = 2.0;
        let model = ball.transform.model_matrix(&rolling, t);
        let expected = Mat4::from_translation(rolling.ball_position(t))
            * Mat4::from_rotation_y(t / 2.0)
            * Mat4::from_scale(Vec3::splat(0.1));
        assert!(model.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn markers_sit_at_light_positions() {
        let animation = AnimationState::default();
        let positions: Vec<Vec3> = SCENE
            .iter()
            .filter(|o| o.pass == Pass::Markers)
            .map(|o| o.transform.translation(&animation, 0.0))
            .collect();
        assert_eq!(
            positions,
            [
                Vec3::new(13.0, 1.8, 7.8),
                Vec3::new(12.0, -2.0, -3.8),
                Vec3::new(6.0, -7.0, 6.8)
            ]
        );
        assert!(SCENE
            .iter()
            .filter(|o| o.pass == Pass::Markers)
            .all(|o| o.transform.scale == MARKER_SCALE));
    }

    #[test]
    fn only_disk_meshes_have_model_names() {
        let named: Vec<GeometryId> = GeometryId::ALL
            .into_iter()
            .filter(|g| g.model_name().is_some())
            .collect();
        assert_eq!(
            named,
            [
                GeometryId::Dog,
                GeometryId::Ball,
                GeometryId::Crate,
                GeometryId::Orange
            ]
        );
    }
}
