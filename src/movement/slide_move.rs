//! Displacement plumbing for the move integrator.
//!
//! Small, order-free pieces: plane projection, constant-rate velocity
//! steering, the swept placement primitive, and slide-along-surface
//! response. The integrator composes them; nothing here reads movement
//! state.

use glam::{Vec2, Vec3};

use crate::body::MovableBody;
use crate::collision::{CollisionWorld, FloorSample};

/// Displacements shorter than this are not worth sweeping (cm).
const MIN_SLIDE_DELTA_SQ: f32 = 1.0e-6;

/// Remove the component of `v` along the unit plane normal, leaving the
/// in-plane part.
#[inline]
pub fn project_onto_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Step `current` toward `target` by at most `max_delta`, without
/// overshooting.
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_delta || distance < 1.0e-4 {
        target
    } else {
        current + to_target * (max_delta / distance)
    }
}

/// Sweep the body's sphere along `delta` and place it at the stop point.
///
/// The returned sample reports whether (and where) the move was blocked.
/// A body without a sphere collider degenerates to a line sweep so
/// movement stays defined.
pub fn safe_move(
    body: &mut impl MovableBody,
    world: &impl CollisionWorld,
    delta: Vec3,
) -> FloorSample {
    let start = body.position();
    let end = start + delta;

    let sample = match body.sphere_radius() {
        Some(radius) => world.sweep_sphere(start, end, radius),
        None => world.line_trace(start, end),
    };

    body.set_position(sample.end_position);
    sample
}

/// Spend the unswept remainder of a blocked move sliding along the
/// obstructing surface.
///
/// The remainder of `delta` is projected onto the surface plane and swept
/// again, so walls and ramps deflect motion instead of eating it.
pub fn slide_along_surface(
    body: &mut impl MovableBody,
    world: &impl CollisionWorld,
    delta: Vec3,
    remaining_fraction: f32,
    surface_normal: Vec3,
) -> FloorSample {
    let slide_delta = project_onto_plane(delta, surface_normal) * remaining_fraction.clamp(0.0, 1.0);

    if slide_delta.length_squared() < MIN_SLIDE_DELTA_SQ {
        return FloorSample::no_hit(body.position());
    }

    safe_move(body, world, slide_delta)
}
