//! Movement tuning parameters.
//!
//! All tunables are grouped here. Values use centimeters and seconds; the
//! defaults are the shipped tuning for a ~30cm marble avatar.

use serde::{Deserialize, Serialize};

/// Tuning parameters for marble movement.
///
/// Loaded once at construction and treated as constant during simulation;
/// embedders may edit values between frames for live tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    // ========================================================================
    // Gravity and speed
    // ========================================================================
    /// Gravity acceleration (cm/s²).
    pub gravity: f32,

    /// Maximum controlled horizontal speed (cm/s).
    pub max_speed: f32,

    /// Horizontal acceleration toward the input target speed (cm/s²).
    pub acceleration: f32,

    // ========================================================================
    // Friction
    // ========================================================================
    /// Linear horizontal deceleration while grounded and not sliding (cm/s²).
    pub ground_friction: f32,

    /// Kinetic braking while slope-sliding (cm/s²). Large values kill the
    /// slide, small ones descend like ice.
    pub sliding_friction: f32,

    /// Linear horizontal deceleration while airborne (cm/s²).
    pub air_friction: f32,

    // ========================================================================
    // Slope sliding
    // ========================================================================
    /// Static-friction threshold, modeled as an acceleration instead of an
    /// angle: sliding starts only once the scaled downhill pull exceeds
    /// this, and stops when it falls below half of it.
    pub static_friction_accel: f32,

    /// Minimum speed granted the frame sliding starts from rest, to avoid
    /// a visible one-frame stall.
    pub min_slope_slide_start_speed: f32,

    /// Lateral probe distance for downhill sampling when the floor normal
    /// is too ambiguous to derive a slide direction (cm).
    pub downhill_sample_distance: f32,

    /// Steepest walkable slope (degrees). The walkable normal threshold is
    /// the cosine of this.
    pub max_slope_angle: f32,

    /// Scale applied to the downhill pull; 1.0 uses the gravity component
    /// as-is.
    pub slope_slide_scale: f32,

    /// Cap on horizontal speed while sliding down a slope (cm/s).
    pub max_slope_slide_speed: f32,

    /// Velocity-proportional damping coefficient while sliding. Higher
    /// values brake harder and lower the terminal slide speed.
    pub slide_damping: f32,

    // ========================================================================
    // Ground detection and stability
    // ========================================================================
    /// Extra length of the downward ground sweep beyond the sphere radius
    /// (cm).
    pub ground_check_distance: f32,

    /// Below this cached-normal Z the floor counts as unstable and Move
    /// falls back to direction-based displacement. Raising it makes the
    /// unstable verdict trigger on the slightest lean, ruining slope
    /// walking; lowering it weakens escape from edges and vertices.
    pub unstable_floor_z_threshold: f32,

    /// Dot between the current and previous cached normals below which the
    /// floor counts as an edge (1.0 identical, ≤0.9 clearly divergent).
    /// Raising it flags edges on tiny normal changes and adds jitter on
    /// honest slopes; lowering it lets boundary stalls come back.
    pub floor_normal_dot_edge_threshold: f32,

    /// Minimum useful displacement after floor-plane projection (cm).
    /// Shorter projected moves count as collapsed.
    pub min_projected_move_cm: f32,

    /// Farthest a sweep contact can be and still count as standing on
    /// ground (cm); beyond it the avatar is airborne.
    pub max_ground_distance: f32,

    /// Subtracted from the walkable threshold to form the grace bound that
    /// keeps an already-grounded avatar grounded. Larger values steady
    /// edges and vertices but cling to unwalkable slopes; smaller values
    /// sharpen the verdict and bring back boundary flicker.
    pub ground_grace_z_offset: f32,

    /// Angular rate at which the cached floor normal turns toward a new
    /// sample (degrees/s). Faster tracks slopes immediately but lets
    /// normal spikes through; slower smooths seams but lags real slope
    /// changes.
    pub floor_normal_interp_speed: f32,

    /// Normal Z at or above which a hit counts as flat ground: the cache
    /// snaps upright and landing correction is allowed. Lowering it makes
    /// landings stickier on gentle slopes.
    pub flat_ground_z_threshold: f32,

    /// Length of the fallback downward line trace (cm). Keep comfortably
    /// above `max_ground_distance`.
    pub ground_line_trace_distance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            gravity: 2000.0,
            max_speed: 5500.0,
            acceleration: 12000.0,

            ground_friction: 2000.0,
            sliding_friction: 200.0,
            air_friction: 100.0,

            static_friction_accel: 350.0,
            min_slope_slide_start_speed: 120.0,
            downhill_sample_distance: 10.0,
            max_slope_angle: 45.0,
            slope_slide_scale: 2.5,
            max_slope_slide_speed: 6000.0,
            slide_damping: 2.0,

            ground_check_distance: 5.0,
            unstable_floor_z_threshold: 0.97,
            floor_normal_dot_edge_threshold: 0.95,
            min_projected_move_cm: 1.0,
            max_ground_distance: 8.0,
            ground_grace_z_offset: 0.05,
            floor_normal_interp_speed: 12.0,
            flat_ground_z_threshold: 0.997,
            ground_line_trace_distance: 12.0,
        }
    }
}

impl MovementConfig {
    /// Minimum surface-normal Z for a walkable floor: cos(max_slope_angle).
    #[inline]
    pub fn walkable_z(&self) -> f32 {
        self.max_slope_angle.to_radians().cos()
    }

    /// Looser normal-Z bound that keeps an already-grounded avatar
    /// grounded across the walkable boundary.
    #[inline]
    pub fn grace_z(&self) -> f32 {
        self.walkable_z() - self.ground_grace_z_offset
    }
}
