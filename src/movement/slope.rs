//! Slope sliding: should a stationary marble start rolling downhill?
//!
//! Modeled as a static/kinetic friction analogy. The downhill pull is the
//! horizontal component of gravity projected onto the floor plane; sliding
//! begins only once the scaled pull beats a static threshold and persists
//! until it drops below half of that, so marginal slopes neither pop nor
//! flicker. Near edges and vertices, where the reported normal is
//! ambiguous, short lateral probes infer the downhill direction from the
//! geometry instead.

use glam::{Vec2, Vec3};

use crate::body::MovableBody;
use crate::collision::CollisionWorld;

use super::config::MovementConfig;
use super::state::{LocomotionMode, MovementState, SlideStatus};

/// Smallest sampled height drop that counts as a credible downhill (cm).
const MIN_CREDIBLE_DROP: f32 = 0.1;

/// Evaluate slope sliding for this frame and integrate the slide
/// acceleration into the horizontal velocity if it wins.
///
/// Returns whether acceleration was actually applied; the caller uses the
/// flag to pick the friction profile and to gate the second collision
/// pass.
pub(crate) fn evaluate(
    config: &MovementConfig,
    state: &mut MovementState,
    input_idle: bool,
    body: &impl MovableBody,
    world: &impl CollisionWorld,
    delta_time: f32,
) -> bool {
    // Sliding is a stationary, grounded phenomenon: steering or leaving
    // the ground ends it outright.
    if state.mode != LocomotionMode::Grounded || !input_idle {
        state.slide = SlideStatus::Settled;
        return false;
    }

    let chosen = choose_stable_normal(config, state);

    // Horizontal component of gravity projected onto the floor plane:
    // g · n.z · (n.x, n.y).
    let mut pull = Vec2::new(chosen.x, chosen.y) * (config.gravity * chosen.z);

    let threshold = if state.slide.is_sliding() {
        0.5 * config.static_friction_accel
    } else {
        config.static_friction_accel
    };

    // Near a vertex the reported normal collapses and the plane-derived
    // pull loses its horizontal part even though the floor is not flat.
    // Probe the surrounding geometry for a downhill direction before
    // giving up.
    if pull.length() * config.slope_slide_scale < threshold
        && chosen.z < config.flat_ground_z_threshold
    {
        if let Some(sampled) = sample_downhill(config, body, world) {
            log::debug!("downhill sampling substituted pull {sampled:?}");
            pull = sampled;
        }
    }

    let accel = pull * config.slope_slide_scale;
    let magnitude = accel.length();

    if state.slide.is_sliding() {
        if magnitude < 0.5 * config.static_friction_accel {
            state.slide = SlideStatus::Settled;
            return false;
        }
    } else if magnitude <= config.static_friction_accel {
        // Static friction holds. The velocity is left untouched so a
        // marginal slope cannot pop the marble.
        return false;
    }

    let just_started = !state.slide.is_sliding();
    state.slide = SlideStatus::Sliding;

    let before = state.horizontal_velocity();
    let mut horizontal = before + accel * delta_time;

    // A slide starting from rest gets a floor on its speed so the first
    // frame does not read as a stall.
    if just_started && before.length() < config.min_slope_slide_start_speed {
        let speed = horizontal.length();
        if speed > f32::EPSILON && speed < config.min_slope_slide_start_speed {
            horizontal *= config.min_slope_slide_start_speed / speed;
        }
    }

    state.set_horizontal_velocity(horizontal.clamp_length_max(config.max_slope_slide_speed));

    true
}

/// Pick the floor normal the slide decision can trust.
///
/// When the current and previous cached normals disagree sharply, or the
/// current one is already too steep to be stable, last frame's normal is
/// the safer basis: stability over responsiveness.
fn choose_stable_normal(config: &MovementConfig, state: &MovementState) -> Vec3 {
    let current = state.floor.current();
    let previous = state.floor.previous();

    if current.dot(previous) < config.floor_normal_dot_edge_threshold
        || current.z < config.unstable_floor_z_threshold
    {
        previous
    } else {
        current
    }
}

/// Probe four cardinal directions with short downward traces and derive a
/// downhill pull from whichever sampled ground point sits lowest.
///
/// Returns `None` when nothing credible is found; the caller then leaves
/// sliding off for the frame.
fn sample_downhill(
    config: &MovementConfig,
    body: &impl MovableBody,
    world: &impl CollisionWorld,
) -> Option<Vec2> {
    let radius = body.sphere_radius()?;
    let center = body.position();
    let support_z = center.z - radius;

    let lateral = config.downhill_sample_distance;
    let depth = radius + config.ground_line_trace_distance;

    let mut best: Option<(f32, Vec2)> = None;
    for dir in [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y] {
        let start = center + Vec3::new(dir.x, dir.y, 0.0) * lateral;
        let sample = world.line_trace(start, start - Vec3::Z * depth);
        if !sample.blocking {
            continue;
        }

        let z = sample.impact_point.z;
        if best.map_or(true, |(lowest, _)| z < lowest) {
            best = Some((z, dir));
        }
    }

    let (lowest, dir) = best?;
    let drop = support_z - lowest;
    if drop <= MIN_CREDIBLE_DROP {
        return None;
    }

    // g·sinθ·cosθ for the sampled slope, the same form the plane
    // projection yields on clean geometry.
    let magnitude = config.gravity * (drop * lateral) / (drop * drop + lateral * lateral);
    Some(dir * magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::SphereBody;
    use crate::collision::FloorSample;

    /// World whose line traces report a floor at z=0 everywhere except
    /// east (+X) of `edge_x`, where the floor sits `east_drop` lower.
    /// Sphere sweeps never hit; the evaluator only line-traces here.
    struct SteppedWorld {
        edge_x: f32,
        east_drop: f32,
    }

    impl CollisionWorld for SteppedWorld {
        fn sweep_sphere(&self, _start: Vec3, end: Vec3, _radius: f32) -> FloorSample {
            FloorSample::no_hit(end)
        }

        fn line_trace(&self, start: Vec3, _end: Vec3) -> FloorSample {
            let floor_z = if start.x > self.edge_x {
                -self.east_drop
            } else {
                0.0
            };
            let impact = Vec3::new(start.x, start.y, floor_z);
            FloorSample::hit(0.5, start.z - floor_z, impact, impact, Vec3::Z, Some(0))
        }
    }

    fn flat_probe_world() -> SteppedWorld {
        SteppedWorld {
            edge_x: f32::MAX,
            east_drop: 0.0,
        }
    }

    fn grounded_state(normal: Vec3) -> MovementState {
        let mut state = MovementState::new();
        state.mode = LocomotionMode::Grounded;
        state.floor.shift_to(normal);
        state.floor.shift_to(normal); // previous == current
        state
    }

    fn slope_normal(sin: f32) -> Vec3 {
        Vec3::new(sin, 0.0, (1.0 - sin * sin).sqrt())
    }

    #[test]
    fn test_no_slide_while_falling() {
        let config = MovementConfig::default();
        let mut state = grounded_state(slope_normal(0.5));
        state.mode = LocomotionMode::Falling;
        state.slide = SlideStatus::Sliding;
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        let applied = evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        assert!(!applied);
        assert_eq!(state.slide, SlideStatus::Settled);
    }

    #[test]
    fn test_input_cancels_slide() {
        let config = MovementConfig::default();
        let mut state = grounded_state(slope_normal(0.5));
        state.slide = SlideStatus::Sliding;
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        let applied = evaluate(&config, &mut state, false, &body, &flat_probe_world(), 0.016);
        assert!(!applied);
        assert_eq!(state.slide, SlideStatus::Settled);
    }

    #[test]
    fn test_static_friction_holds_on_marginal_slope() {
        let config = MovementConfig::default();
        // ~2.6 degrees: scaled pull ≈ 226 < 350, and the normal is flat
        // enough that no downhill sampling triggers.
        let mut state = grounded_state(slope_normal(0.0453));
        state.velocity = Vec3::new(50.0, 0.0, 0.0);
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        let applied = evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        assert!(!applied);
        assert_eq!(state.slide, SlideStatus::Settled);
        // Velocity untouched: no abrupt zeroing on marginal slopes.
        assert_eq!(state.velocity, Vec3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn test_slide_starts_past_static_threshold() {
        let config = MovementConfig::default();
        // 18 degrees: scaled pull ≈ 1482 > 350.
        let mut state = grounded_state(slope_normal(0.312));
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        let applied = evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        assert!(applied);
        assert_eq!(state.slide, SlideStatus::Sliding);

        // Downhill is +X (normal leans +X).
        assert!(state.velocity.x > 0.0);
        assert!(state.velocity.y.abs() < 1.0e-3);
    }

    #[test]
    fn test_slide_start_clamps_to_minimum_speed() {
        let config = MovementConfig::default();
        let mut state = grounded_state(slope_normal(0.312));
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        // One 16ms frame integrates ~24 cm/s of accel; the start clamp
        // lifts that to the configured minimum.
        evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        let speed = state.horizontal_velocity().length();
        assert!(
            (speed - config.min_slope_slide_start_speed).abs() < 1.0e-2,
            "start speed {speed}"
        );
    }

    #[test]
    fn test_slide_persists_between_hysteresis_bounds() {
        let config = MovementConfig::default();
        // Scaled pull ≈ 250: below the 350 entry bound, above the 175
        // exit bound.
        let mut state = grounded_state(slope_normal(0.0501));
        state.slide = SlideStatus::Sliding;
        state.velocity = Vec3::new(400.0, 0.0, 0.0);
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        let applied = evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        assert!(applied, "sliding keeps going between the bounds");
        assert_eq!(state.slide, SlideStatus::Sliding);
    }

    #[test]
    fn test_slide_stops_below_half_threshold() {
        let config = MovementConfig::default();
        // Scaled pull ≈ 100 < 175.
        let mut state = grounded_state(slope_normal(0.02));
        state.slide = SlideStatus::Sliding;
        state.velocity = Vec3::new(400.0, 0.0, 0.0);
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        let applied = evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        assert!(!applied);
        assert_eq!(state.slide, SlideStatus::Settled);
        // Stopping applies no acceleration this frame.
        assert_eq!(state.velocity, Vec3::new(400.0, 0.0, 0.0));
    }

    #[test]
    fn test_speed_capped_at_max_slide_speed() {
        let config = MovementConfig::default();
        let mut state = grounded_state(slope_normal(0.6));
        state.slide = SlideStatus::Sliding;
        state.velocity = Vec3::new(config.max_slope_slide_speed - 1.0, 0.0, 0.0);
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        for _ in 0..20 {
            evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        }
        assert!(state.horizontal_velocity().length() <= config.max_slope_slide_speed + 1.0e-3);
    }

    #[test]
    fn test_downhill_sampling_rescues_ambiguous_normal() {
        let config = MovementConfig::default();
        // A near-horizontal cached normal: the plane-derived pull has
        // almost no horizontal component, but the floor is clearly not
        // flat. The east probe finds ground 8cm lower.
        let mut state = grounded_state(Vec3::new(0.9998, 0.0, 0.02));
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);
        let world = SteppedWorld {
            edge_x: 5.0,
            east_drop: 8.0,
        };

        let applied = evaluate(&config, &mut state, true, &body, &world, 0.016);
        assert!(applied, "sampling should find the eastward drop");
        assert_eq!(state.slide, SlideStatus::Sliding);
        assert!(state.velocity.x > 0.0, "slides toward the sampled drop");
    }

    #[test]
    fn test_no_credible_drop_means_no_slide() {
        let config = MovementConfig::default();
        let mut state = grounded_state(Vec3::new(0.9998, 0.0, 0.02));
        let body = SphereBody::new(Vec3::new(0.0, 0.0, 30.0), 30.0);

        // Probes all land level with the support point.
        let applied = evaluate(&config, &mut state, true, &body, &flat_probe_world(), 0.016);
        assert!(!applied);
        assert_eq!(state.slide, SlideStatus::Settled);
    }
}
