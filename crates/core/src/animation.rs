//! Ball animation latches.
//!
//! Both latches start `Off` and can only be switched `On`. The ball's pose is
//! a pure function of the latches and the elapsed time since startup.

use glam::Vec3;

/// Ball position while no animation is running.
pub const BALL_BASE_POSITION: Vec3 = Vec3::new(6.0, -7.0, 6.8);

/// Vertical amplitude of the roll animation.
const ROLL_AMPLITUDE: f32 = 3.0;

/// One-way animation switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latch {
    #[default]
    Off,
    On,
}

impl Latch {
    pub fn is_on(self) -> bool {
        self == Latch::On
    }

    /// 0.0 while off, 1.0 once on. Scales the animated terms.
    pub fn factor(self) -> f32 {
        match self {
            Latch::Off => 0.0,
            Latch::On => 1.0,
        }
    }
}

/// Latches for the two ball animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationState {
    /// Ball bobs up and down and spins about Y.
    pub roll: Latch,
    /// Ball drifts away along +X, accelerating.
    pub bounce: Latch,
}

impl AnimationState {
    /// Returns true if the latch was off before this call.
    pub fn start_roll(&mut self) -> bool {
        let changed = !self.roll.is_on();
        self.roll = Latch::On;
        changed
    }

    /// Returns true if the latch was off before this call.
    pub fn start_bounce(&mut self) -> bool {
        let changed = !self.bounce.is_on();
        self.bounce = Latch::On;
        changed
    }

    /// Ball position at `elapsed` seconds since startup.
    pub fn ball_position(&self, elapsed: f32) -> Vec3 {
        let half = elapsed / 2.0;
        Vec3::new(
            BALL_BASE_POSITION.x + self.bounce.factor() * half * half,
            BALL_BASE_POSITION.y + self.roll.factor() * ROLL_AMPLITUDE * elapsed.sin(),
            BALL_BASE_POSITION.z,
        )
    }

    /// Ball spin about Y in radians at `elapsed` seconds since startup.
    pub fn ball_spin(&self, elapsed: f32) -> f32 {
        self.roll.factor() * elapsed / 2.0
    }
}
