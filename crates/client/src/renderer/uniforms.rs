//! Uniform blocks shared with the WGSL shaders.
//!
//! Layouts mirror the structs in `shaders/common.wgsl`. Every vec3 is
//! followed by a scalar so each block packs to 16-byte rows.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use yardview_core::{Lighting, PointLight, SpotLight};

/// Point light as the shader sees it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    pub att_constant: f32,
    pub ambient: [f32; 3],
    pub att_linear: f32,
    pub diffuse: [f32; 3],
    pub att_quadratic: f32,
    pub specular: [f32; 3],
    pub _pad: f32,
}

impl From<&PointLight> for PointLightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.into(),
            att_constant: light.constant,
            ambient: light.ambient.into(),
            att_linear: light.linear,
            diffuse: light.diffuse.into(),
            att_quadratic: light.quadratic,
            specular: light.specular.into(),
            _pad: 0.0,
        }
    }
}

/// Spotlight as the shader sees it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpotLightUniform {
    pub position: [f32; 3],
    pub att_constant: f32,
    pub direction: [f32; 3],
    pub att_linear: f32,
    pub ambient: [f32; 3],
    pub att_quadratic: f32,
    pub diffuse: [f32; 3],
    pub cut_off: f32,
    pub specular: [f32; 3],
    pub outer_cut_off: f32,
}

impl From<&SpotLight> for SpotLightUniform {
    fn from(light: &SpotLight) -> Self {
        Self {
            position: light.position.into(),
            att_constant: light.constant,
            direction: light.direction.into(),
            att_linear: light.linear,
            ambient: light.ambient.into(),
            att_quadratic: light.quadratic,
            diffuse: light.diffuse.into(),
            cut_off: light.cut_off,
            specular: light.specular.into(),
            outer_cut_off: light.outer_cut_off,
        }
    }
}

/// Global uniforms (camera, lights). Bind group 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub view_position: [f32; 3],
    pub shininess: f32,
    pub point_lights: [PointLightUniform; 3],
    pub spot_light: SpotLightUniform,
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            view_position: [0.0; 3],
            shininess: 1.0,
            point_lights: [PointLightUniform::default(); 3],
            spot_light: SpotLightUniform::default(),
        }
    }
}

impl GlobalUniforms {
    pub fn set_camera(&mut self, projection: Mat4, view: Mat4, view_position: Vec3) {
        self.projection = projection.to_cols_array_2d();
        self.view = view.to_cols_array_2d();
        self.view_position = view_position.into();
    }

    pub fn set_lighting(&mut self, lighting: &Lighting) {
        self.point_lights = lighting.point_lights.each_ref().map(PointLightUniform::from);
        self.spot_light = SpotLightUniform::from(&lighting.spot_light);
        self.shininess = lighting.shininess;
    }
}

/// Per-draw uniforms (model matrix). Bind group 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3], // mat3x3 requires padding, so use 3 vec4s
}

impl InstanceUniforms {
    pub fn new(model: Mat4) -> Self {
        // Inverse transpose of the upper-left 3x3.
        let normal_mat = Mat3::from_mat4(model).inverse().transpose();

        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: [
                normal_mat.x_axis.extend(0.0).into(),
                normal_mat.y_axis.extend(0.0).into(),
                normal_mat.z_axis.extend(0.0).into(),
            ],
        }
    }
}
