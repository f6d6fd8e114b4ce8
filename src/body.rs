//! The movable body abstraction.
//!
//! The controller does not own a scene object; it is handed something that
//! can report and accept a world-space position. Anything that implements
//! [`MovableBody`] can be driven: an engine component adapter, a network
//! puppet, or the plain [`SphereBody`] value used in tests and headless
//! simulation.

use glam::{Quat, Vec3};

/// A body the movement controller is allowed to reposition.
///
/// Positions are the center of the avatar's collision sphere, in world
/// space.
pub trait MovableBody {
    /// Current world-space position of the sphere center.
    fn position(&self) -> Vec3;

    /// Teleport the body to a new world-space position.
    ///
    /// The controller calls this after swept movement and for landing
    /// corrections; implementations should not run their own collision
    /// response here.
    fn set_position(&mut self, position: Vec3);

    /// Current world-space orientation.
    ///
    /// Movement is translation-only; the orientation is carried through
    /// sweeps unchanged.
    fn orientation(&self) -> Quat;

    /// Radius of the avatar's collision sphere, if the attached collider
    /// actually is a sphere.
    ///
    /// Returns `None` when the collider is some other shape. Ground
    /// detection treats that as "no hit" and the landing snap becomes a
    /// no-op, per the degenerate-input policy.
    fn sphere_radius(&self) -> Option<f32>;
}

/// A plain owned sphere body.
#[derive(Debug, Clone, Copy)]
pub struct SphereBody {
    /// Sphere center, world space.
    pub position: Vec3,
    /// World-space orientation.
    pub orientation: Quat,
    /// Sphere radius (cm).
    pub radius: f32,
}

impl SphereBody {
    /// Create a sphere body at a position with the given radius.
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            radius,
        }
    }
}

impl MovableBody for SphereBody {
    #[inline]
    fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[inline]
    fn orientation(&self) -> Quat {
        self.orientation
    }

    #[inline]
    fn sphere_radius(&self) -> Option<f32> {
        Some(self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_body_roundtrip() {
        let mut body = SphereBody::new(Vec3::new(1.0, 2.0, 3.0), 30.0);
        assert_eq!(body.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.sphere_radius(), Some(30.0));

        body.set_position(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(body.position(), Vec3::new(4.0, 5.0, 6.0));
    }
}
