//! Hit records and the collision-world capability trait.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Result of a sphere sweep or line trace through the world.
///
/// Sweeps travel from a start position toward an end position and report
/// the first blocking contact along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorSample {
    /// Whether the query hit blocking geometry at all. Every other field
    /// is only meaningful when this is `true`.
    pub blocking: bool,

    /// How far along the query path the shape got before contact.
    ///
    /// - `1.0` = traveled the full distance (no contact)
    /// - `0.0` = touching at the start
    pub fraction: f32,

    /// Distance traveled before contact, in cm.
    pub distance: f32,

    /// Where the swept center (or ray point) stopped.
    pub end_position: Vec3,

    /// Contact point on the hit surface.
    pub impact_point: Vec3,

    /// Unit surface normal at the contact, pointing away from the surface.
    /// `+Z` when nothing was hit.
    pub impact_normal: Vec3,

    /// Index of the hit triangle when the contact resolved to a single
    /// mesh face. `None` for degenerate contacts (edge/vertex) and for
    /// non-face features; the movement heuristics treat `None` as a sign
    /// of unstable geometry.
    pub face_index: Option<u32>,
}

impl Default for FloorSample {
    fn default() -> Self {
        Self::no_hit(Vec3::ZERO)
    }
}

impl FloorSample {
    /// A sample indicating the query ran its full length without contact.
    pub fn no_hit(end_position: Vec3) -> Self {
        Self {
            blocking: false,
            fraction: 1.0,
            distance: 0.0,
            end_position,
            impact_point: end_position,
            impact_normal: Vec3::Z,
            face_index: None,
        }
    }

    /// A sample for a blocking contact.
    pub fn hit(
        fraction: f32,
        distance: f32,
        end_position: Vec3,
        impact_point: Vec3,
        impact_normal: Vec3,
        face_index: Option<u32>,
    ) -> Self {
        Self {
            blocking: true,
            fraction,
            distance,
            end_position,
            impact_point,
            impact_normal,
            face_index,
        }
    }

    /// Whether this sample represents a blocking contact.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.blocking
    }
}

/// The world the avatar moves through.
///
/// Implementations answer read-only geometric queries; they never move the
/// body. Queries are synchronous and are expected to complete within the
/// frame. The avatar's own collider is not part of the queried geometry.
pub trait CollisionWorld {
    /// Sweep a sphere of `radius` from `start` to `end` (positions are the
    /// sphere center) and report the first blocking contact.
    fn sweep_sphere(&self, start: Vec3, end: Vec3, radius: f32) -> FloorSample;

    /// Cast a line from `start` to `end` and report the first blocking
    /// contact.
    fn line_trace(&self, start: Vec3, end: Vec3) -> FloorSample;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_hit_sample() {
        let sample = FloorSample::no_hit(Vec3::new(10.0, 0.0, 0.0));
        assert!(!sample.is_hit());
        assert_eq!(sample.fraction, 1.0);
        assert_eq!(sample.impact_normal, Vec3::Z);
    }

    #[test]
    fn test_hit_sample() {
        let sample = FloorSample::hit(
            0.5,
            4.0,
            Vec3::new(5.0, 0.0, 30.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::Z,
            Some(7),
        );
        assert!(sample.is_hit());
        assert_eq!(sample.fraction, 0.5);
        assert_eq!(sample.face_index, Some(7));
    }
}
