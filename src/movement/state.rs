//! Movement state, telemetry, and input structures.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::FloorSample;

use super::ground::FloorNormalCache;

/// Squared input magnitude below which the accumulated vector counts as
/// no input.
pub(crate) const INPUT_EPSILON_SQ: f32 = 1.0e-4;

/// Horizontal speed below which the motion direction reads as zero.
pub(crate) const SPEED_EPSILON: f32 = 1.0e-3;

/// Locomotion mode of the avatar.
///
/// There are exactly two: either a supporting walkable surface was found
/// within tolerance this frame, or the avatar is airborne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocomotionMode {
    /// Standing on (or rolling over) a walkable surface.
    Grounded,
    /// Airborne. This is the initial mode; the first ground check decides
    /// the rest.
    #[default]
    Falling,
}

/// Whether the avatar is currently slope-sliding.
///
/// Persists across frames; only the slope-slide evaluator sets it, and it
/// clears on flat-ground landings or when input resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlideStatus {
    /// At rest with respect to slope-induced rolling.
    #[default]
    Settled,
    /// Rolling downhill under the scaled gravity pull.
    Sliding,
}

impl SlideStatus {
    /// Whether the avatar is sliding.
    #[inline]
    pub fn is_sliding(self) -> bool {
        matches!(self, Self::Sliding)
    }
}

/// Per-frame pipeline events.
///
/// Created fresh at the top of every `step` and threaded through the
/// stages, so frame-scoped facts can never leak across frames.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StepEvents {
    /// The slope-slide evaluator actually accelerated the velocity this
    /// frame. Gates the friction profile and the second collision pass.
    pub slide_accel_applied: bool,
}

/// Read-only motion telemetry for external consumers (animation, UI,
/// audio triggers).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionState {
    /// Current locomotion mode.
    pub mode: LocomotionMode,
    /// Horizontal speed (cm/s).
    pub speed_2d: f32,
    /// Unit horizontal movement direction; zero when speed is negligible.
    pub move_dir_2d: Vec2,
}

/// Complete movement state for the avatar.
///
/// Owned exclusively by the driving controller and mutated only inside a
/// frame step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementState {
    /// World-space velocity (cm/s).
    pub velocity: Vec3,

    /// Current locomotion mode.
    pub mode: LocomotionMode,

    /// Smoothed floor normals used as the projection basis for movement.
    pub floor: FloorNormalCache,

    /// Slope-slide persistence flag.
    pub slide: SlideStatus,

    /// The ground sample the avatar is currently standing on. Superseded
    /// every frame by the ground check; meaningless while falling.
    pub current_floor: FloorSample,

    /// Derived horizontal speed (cm/s).
    pub speed_2d: f32,

    /// Derived unit horizontal direction; zero at negligible speed.
    pub move_dir_2d: Vec2,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mode: LocomotionMode::Falling,
            floor: FloorNormalCache::default(),
            slide: SlideStatus::Settled,
            current_floor: FloorSample::default(),
            speed_2d: 0.0,
            move_dir_2d: Vec2::ZERO,
        }
    }
}

impl MovementState {
    /// Create a fresh state (falling, at rest).
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal (XY) part of the velocity.
    #[inline]
    pub fn horizontal_velocity(&self) -> Vec2 {
        Vec2::new(self.velocity.x, self.velocity.y)
    }

    /// Replace the horizontal part of the velocity, leaving Z untouched.
    #[inline]
    pub fn set_horizontal_velocity(&mut self, horizontal: Vec2) {
        self.velocity.x = horizontal.x;
        self.velocity.y = horizontal.y;
    }

    /// Recompute the derived speed/direction telemetry from the current
    /// velocity.
    pub fn update_motion_state(&mut self) {
        let horizontal = self.horizontal_velocity();
        let speed = horizontal.length();
        self.speed_2d = speed;
        self.move_dir_2d = if speed > SPEED_EPSILON {
            horizontal / speed
        } else {
            Vec2::ZERO
        };
    }

    /// Snapshot of the derived telemetry.
    pub fn motion_state(&self) -> MotionState {
        MotionState {
            mode: self.mode,
            speed_2d: self.speed_2d,
            move_dir_2d: self.move_dir_2d,
        }
    }
}

/// Accumulates movement input between frames.
///
/// The embedder adds per-input-event contributions (key axes, stick
/// deflection) at whatever rate input arrives; the controller consumes
/// and clears the sum once per frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputAccumulator {
    pending: Vec2,
}

impl InputAccumulator {
    /// Add an input contribution.
    pub fn add(&mut self, input: Vec2) {
        self.pending += input;
    }

    /// The accumulated vector, without consuming it.
    #[inline]
    pub fn pending(&self) -> Vec2 {
        self.pending
    }

    /// Whether no meaningful input has accumulated.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.pending.length_squared() < INPUT_EPSILON_SQ
    }

    /// Take the accumulated vector, clamped to unit length, and reset the
    /// accumulator.
    pub fn consume_and_reset(&mut self) -> Vec2 {
        let input = self.pending.clamp_length_max(1.0);
        self.pending = Vec2::ZERO;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_mode_is_falling() {
        let state = MovementState::new();
        assert_eq!(state.mode, LocomotionMode::Falling);
        assert_eq!(state.slide, SlideStatus::Settled);
    }

    #[test]
    fn test_motion_state_zero_direction_at_rest() {
        let mut state = MovementState::new();
        state.velocity = Vec3::new(0.0, 0.0, -300.0);
        state.update_motion_state();

        assert_eq!(state.speed_2d, 0.0);
        assert_eq!(state.move_dir_2d, Vec2::ZERO);
    }

    #[test]
    fn test_motion_state_derives_speed_and_direction() {
        let mut state = MovementState::new();
        state.velocity = Vec3::new(300.0, 400.0, -100.0);
        state.update_motion_state();

        assert!((state.speed_2d - 500.0).abs() < 1.0e-3);
        assert!((state.move_dir_2d - Vec2::new(0.6, 0.8)).length() < 1.0e-4);
    }

    #[test]
    fn test_input_accumulator_clamps_and_resets() {
        let mut input = InputAccumulator::default();
        input.add(Vec2::new(3.0, 0.0));
        input.add(Vec2::new(0.0, 4.0));
        assert!(!input.is_idle());

        let consumed = input.consume_and_reset();
        assert!((consumed.length() - 1.0).abs() < 1.0e-5, "clamped to unit length");
        assert!(input.is_idle());
        assert_eq!(input.consume_and_reset(), Vec2::ZERO);
    }
}
