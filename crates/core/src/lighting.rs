//! Point lights and the camera flashlight.
//!
//! Each light is rebuilt every frame from a closed-form formula. Nothing here
//! is persisted or shared between frames.

use glam::Vec3;

use crate::camera::Camera;

/// Position of the light over the crate and orange.
pub const CRATE_LIGHT_POSITION: Vec3 = Vec3::new(13.0, 1.8, 7.8);
/// Position of the light over the dog.
pub const DOG_LIGHT_POSITION: Vec3 = Vec3::new(12.0, -2.0, -3.8);
/// Offset of the ball light above the ball.
pub const BALL_LIGHT_OFFSET: Vec3 = Vec3::new(0.0, 3.0, 0.0);

/// Specular exponent shared by every lit mesh.
pub const MATERIAL_SHININESS: f32 = 32.0;

/// Angular speed of the crate light pulse, in radians per second.
const CRATE_PULSE_RATE: f32 = 1.5;

/// A point light with distance attenuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// The shared base light every scene light starts from.
    pub const BASE: Self = Self {
        position: Vec3::new(4.0, 4.0, 0.0),
        ambient: Vec3::splat(0.1),
        diffuse: Vec3::splat(0.6),
        specular: Vec3::ONE,
        constant: 0.8,
        linear: 0.0014,
        quadratic: 0.000007,
    };

    /// Crate light: fixed position, pulsing ambient and diffuse, shorter reach.
    pub fn crate_light(elapsed: f32) -> Self {
        let pulse = (elapsed * CRATE_PULSE_RATE).sin();
        Self {
            position: CRATE_LIGHT_POSITION,
            ambient: Vec3::new(0.1, 0.5, pulse + 0.2),
            diffuse: Vec3::new(0.1, pulse, 0.7),
            linear: Self::BASE.linear + 0.05,
            quadratic: Self::BASE.quadratic + 0.05,
            ..Self::BASE
        }
    }

    /// Dog light: the base light at a fixed position.
    pub fn dog_light() -> Self {
        Self {
            position: DOG_LIGHT_POSITION,
            ..Self::BASE
        }
    }

    /// Ball light: the base light hovering above the ball.
    pub fn ball_light(ball_position: Vec3) -> Self {
        Self {
            position: ball_position + BALL_LIGHT_OFFSET,
            ..Self::BASE
        }
    }
}

/// A cone light with a soft edge between its inner and outer cut-off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    /// Cosine of the inner cone half-angle.
    pub cut_off: f32,
    /// Cosine of the outer cone half-angle.
    pub outer_cut_off: f32,
}

impl SpotLight {
    /// Flashlight held at the camera and pointing where it looks.
    pub fn flashlight(camera: &Camera) -> Self {
        Self {
            position: camera.position(),
            direction: camera.front(),
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            constant: 0.5,
            linear: 0.03,
            quadratic: 0.032,
            cut_off: 12.5_f32.to_radians().cos(),
            outer_cut_off: 17.5_f32.to_radians().cos(),
        }
    }
}

/// Everything the lit shader needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Crate, dog and ball lights, in that slot order.
    pub point_lights: [PointLight; 3],
    pub spot_light: SpotLight,
    pub shininess: f32,
}

impl Lighting {
    /// Build this frame's lights.
    pub fn for_frame(camera: &Camera, ball_position: Vec3, elapsed: f32) -> Self {
        Self {
            point_lights: [
                PointLight::crate_light(elapsed),
                PointLight::dog_light(),
                PointLight::ball_light(ball_position),
            ],
            spot_light: SpotLight::flashlight(camera),
            shininess: MATERIAL_SHININESS,
        }
    }
}
