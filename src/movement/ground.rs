//! Ground detection and floor-normal smoothing.
//!
//! Detection is a downward sphere sweep with a line-trace fallback for the
//! sharp-edge cases where the sweep reports nothing usable. The detected
//! normal is never consumed raw: [`FloorNormalCache`] smooths it across
//! frames so single-frame spikes from mesh seams cannot kick the movement
//! basis around.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::MovableBody;
use crate::collision::{CollisionWorld, FloorSample};

use super::config::MovementConfig;

/// Downward sphere sweep from the body's center.
///
/// Sweeps by `radius + ground_check_distance`, so a resting sphere reports
/// a near-zero contact distance. Returns `None` when the body's collider
/// is not a sphere; callers treat that as "no ground".
pub fn sweep_ground(
    body: &impl MovableBody,
    world: &impl CollisionWorld,
    config: &MovementConfig,
) -> Option<FloorSample> {
    let radius = body.sphere_radius()?;
    let start = body.position();
    let end = start - Vec3::Z * (radius + config.ground_check_distance);
    Some(world.sweep_sphere(start, end, radius))
}

/// Short straight-down line trace from the body's center.
///
/// The fallback for edges and vertices, where a sphere sweep commonly
/// fails to produce a blocking contact.
pub fn trace_ground_line(
    body: &impl MovableBody,
    world: &impl CollisionWorld,
    config: &MovementConfig,
) -> FloorSample {
    let start = body.position();
    world.line_trace(start, start - Vec3::Z * config.ground_line_trace_distance)
}

/// Whether a sample is a valid ground candidate: a blocking contact close
/// enough to stand on.
#[inline]
pub fn is_valid_ground(sample: &FloorSample, config: &MovementConfig) -> bool {
    sample.blocking && sample.distance <= config.max_ground_distance
}

/// Smoothed floor normals.
///
/// `current` is the authoritative projection basis for movement;
/// `previous` is last frame's, kept for edge detection and as the stable
/// substitute when `current` goes untrustworthy. Both are always unit
/// length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorNormalCache {
    current: Vec3,
    previous: Vec3,
}

impl Default for FloorNormalCache {
    fn default() -> Self {
        Self {
            current: Vec3::Z,
            previous: Vec3::Z,
        }
    }
}

impl FloorNormalCache {
    /// The smoothed normal movement projects against.
    #[inline]
    pub fn current(&self) -> Vec3 {
        self.current
    }

    /// Last frame's smoothed normal.
    #[inline]
    pub fn previous(&self) -> Vec3 {
        self.previous
    }

    /// Absorb a new ground-sample normal.
    ///
    /// A flat hit snaps both normals straight up: any residual slope lean
    /// disappears immediately instead of visibly draining away on a
    /// plateau. A sloped hit shifts `previous` and turns `current` toward
    /// the sample at `interp_speed` degrees per second, clamped for this
    /// frame's `delta_time`.
    pub fn update(&mut self, sample_normal: Vec3, delta_time: f32, is_flat: bool, interp_speed: f32) {
        if is_flat {
            self.snap_upright();
            return;
        }

        self.previous = self.current;
        let max_angle = interp_speed.to_radians() * delta_time;
        self.current = rotate_toward(self.current, sample_normal, max_angle);
    }

    /// Snap both normals to straight up.
    pub fn snap_upright(&mut self) {
        self.current = Vec3::Z;
        self.previous = Vec3::Z;
    }

    /// Overwrite the current normal without shifting `previous` and
    /// without interpolation. Used by grace retention, which keeps the
    /// grounded verdict but skips the full cache update.
    pub fn set_current(&mut self, normal: Vec3) {
        self.current = normal.try_normalize().unwrap_or(Vec3::Z);
    }

    /// Shift `previous` and take the sample directly as `current`. Used
    /// by the line-trace grounding path.
    pub fn shift_to(&mut self, normal: Vec3) {
        self.previous = self.current;
        self.current = normal.try_normalize().unwrap_or(Vec3::Z);
    }
}

/// Rotate `from` toward `to` by at most `max_angle` radians, staying on
/// the unit sphere.
fn rotate_toward(from: Vec3, to: Vec3, max_angle: f32) -> Vec3 {
    let target = to.normalize_or_zero();
    if target.length_squared() < 0.5 {
        return from;
    }

    let dot = from.dot(target).clamp(-1.0, 1.0);
    let angle = dot.acos();
    if angle <= max_angle || angle < 1.0e-4 {
        return target;
    }

    let axis = from.cross(target);
    if axis.length_squared() < 1.0e-8 {
        // Antiparallel: no rotation plane to interpolate in.
        return target;
    }

    (Quat::from_axis_angle(axis.normalize(), max_angle) * from).try_normalize().unwrap_or(Vec3::Z)
}
