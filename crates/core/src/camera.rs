//! Free-flying camera driven by pointer motion, scroll and arrow keys.
//!
//! Orientation is stored as yaw/pitch in degrees. The front, right and up
//! vectors are always rebuilt from those two angles, never edited directly.

use glam::{Mat3, Mat4, Vec3};

/// Where the camera starts and where the reset key puts it back.
pub const HOME_POSITION: Vec3 = Vec3::new(-2.32, 0.54, 5.87);

/// World up reference for the look-at transform.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Initial yaw in degrees (looking down -Z).
pub const DEFAULT_YAW: f32 = -90.0;
/// Initial pitch in degrees.
pub const DEFAULT_PITCH: f32 = 0.0;
/// Initial (and widest) vertical field of view in degrees.
pub const DEFAULT_ZOOM: f32 = 45.0;

/// Camera movement speed in world units per second.
pub const MOVEMENT_SPEED: f32 = 2.5;
/// Degrees of rotation per pixel of pointer motion.
pub const POINTER_SENSITIVITY: f32 = 0.1;

/// Pitch is kept within +/- this many degrees so up never flips.
pub const PITCH_LIMIT: f32 = 89.0;
/// Narrowest field of view in degrees.
pub const MIN_ZOOM: f32 = 1.0;
/// Widest field of view in degrees.
pub const MAX_ZOOM: f32 = 45.0;

/// Near clipping plane.
pub const NEAR_PLANE: f32 = 0.1;
/// Far clipping plane.
pub const FAR_PLANE: f32 = 100.0;

/// Direction of a keyboard camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Yaw/pitch camera with a zoomable perspective.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    /// Yaw in degrees.
    yaw: f32,
    /// Pitch in degrees, within [-PITCH_LIMIT, PITCH_LIMIT].
    pitch: f32,
    /// Vertical field of view in degrees, within [MIN_ZOOM, MAX_ZOOM].
    zoom: f32,
    speed: f32,
    sensitivity: f32,
    /// Pointer motion is ignored while false (UI has the pointer).
    pointer_enabled: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(HOME_POSITION)
    }
}

impl Camera {
    /// Create a camera at `position` looking down -Z.
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: WORLD_UP,
            right: Vec3::X,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            zoom: DEFAULT_ZOOM,
            speed: MOVEMENT_SPEED,
            sensitivity: POINTER_SENSITIVITY,
            pointer_enabled: true,
        };
        camera.update_vectors();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Yaw in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pointer_enabled(&self) -> bool {
        self.pointer_enabled
    }

    /// Enable or disable pointer-driven rotation.
    pub fn set_pointer_enabled(&mut self, enabled: bool) {
        self.pointer_enabled = enabled;
    }

    /// Point the camera along `front`.
    ///
    /// Yaw and pitch are recovered from the direction so the basis stays
    /// orthonormal. Zero-length or non-finite directions are ignored.
    pub fn set_front(&mut self, front: Vec3) {
        let Some(dir) = front.try_normalize() else {
            tracing::debug!("Ignoring degenerate camera front {front}");
            return;
        };

        self.yaw = dir.z.atan2(dir.x).to_degrees();
        self.pitch = dir.y.asin().to_degrees().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Rotate from a pointer delta in pixels. Positive `dy` means the pointer
    /// moved up the screen.
    pub fn process_pointer_motion(&mut self, dx: f32, dy: f32) {
        if !self.pointer_enabled {
            return;
        }

        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Zoom from a scroll delta. Scrolling up narrows the field of view.
    pub fn process_scroll(&mut self, dy: f32) {
        if !dy.is_finite() {
            return;
        }
        self.zoom = (self.zoom - dy).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Move along the camera basis, scaled by frame time.
    pub fn process_movement(&mut self, direction: Movement, delta_time: f32) {
        let velocity = self.speed * delta_time;
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Put the camera back at the home position. Orientation is kept.
    pub fn reset_to_home(&mut self) {
        self.position = HOME_POSITION;
    }

    /// Look-at transform from the camera position along its front vector.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, WORLD_UP)
    }

    /// View transform with the translation removed, for the skybox.
    pub fn rotation_only_view_matrix(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view_matrix()))
    }

    /// Perspective projection for the given viewport aspect (width / height).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();

        self.front = Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
