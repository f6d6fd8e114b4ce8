//! The per-frame movement controller.
//!
//! One `step` call runs the whole pipeline in a fixed order:
//! gravity → slope slide → friction → move → ground check → telemetry.
//! The order is load-bearing: friction has to see this frame's slide
//! decision, and the ground state is only meaningful after the position
//! update.

use glam::Vec3;

use crate::body::MovableBody;
use crate::collision::{CollisionWorld, FloorSample};

use super::config::MovementConfig;
use super::ground::{is_valid_ground, sweep_ground, trace_ground_line};
use super::slide_move::{move_towards, project_onto_plane, safe_move, slide_along_surface};
use super::slope;
use super::state::{
    InputAccumulator, LocomotionMode, MovementState, SlideStatus, StepEvents, INPUT_EPSILON_SQ,
    SPEED_EPSILON,
};

/// Movement controller for a spherical avatar.
///
/// Holds only tuning; all mutable simulation state lives in
/// [`MovementState`], the body position in the injected [`MovableBody`].
///
/// # Example
///
/// ```ignore
/// let controller = MarbleController::with_default_config();
/// let mut state = MovementState::new();
///
/// // Each simulation tick:
/// controller.step(&mut state, &mut input, &mut body, &world, delta_time);
/// ```
#[derive(Debug, Clone)]
pub struct MarbleController {
    /// Movement tuning.
    pub config: MovementConfig,
}

impl MarbleController {
    /// Create a controller with the given tuning.
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Create a controller with default tuning.
    pub fn with_default_config() -> Self {
        Self::new(MovementConfig::default())
    }

    /// Advance the simulation by one frame.
    ///
    /// `delta_time` is in seconds; zero or negative values make the whole
    /// frame a no-op (skipped ticks are legitimate).
    pub fn step(
        &self,
        state: &mut MovementState,
        input: &mut InputAccumulator,
        body: &mut impl MovableBody,
        world: &impl CollisionWorld,
        delta_time: f32,
    ) {
        if delta_time <= 0.0 {
            return;
        }

        let mut events = StepEvents::default();

        self.apply_gravity(state, delta_time);
        events.slide_accel_applied =
            slope::evaluate(&self.config, state, input.is_idle(), body, world, delta_time);
        self.apply_friction(state, delta_time, events);
        self.integrate_move(state, input, body, world, delta_time, events);
        self.check_ground(state, body, world, delta_time);
        state.update_motion_state();
    }

    // ========================================================================
    // Gravity
    // ========================================================================

    fn apply_gravity(&self, state: &mut MovementState, delta_time: f32) {
        if state.mode == LocomotionMode::Falling {
            state.velocity.z -= self.config.gravity * delta_time;
        } else {
            // Support cancels any residual downward velocity.
            state.velocity.z = state.velocity.z.max(0.0);
        }
    }

    // ========================================================================
    // Friction
    // ========================================================================

    fn apply_friction(&self, state: &mut MovementState, delta_time: f32, events: StepEvents) {
        if state.mode == LocomotionMode::Falling {
            self.brake_linear(state, self.config.air_friction, delta_time);
        } else if events.slide_accel_applied {
            // Kinetic profile: velocity-proportional damping plus a small
            // continuous braking term. A fixed ground-friction decel here
            // would snap slow slides straight to zero.
            let factor = (1.0 - self.config.slide_damping * delta_time).clamp(0.0, 1.0);
            state.set_horizontal_velocity(state.horizontal_velocity() * factor);
            self.brake_linear(state, self.config.sliding_friction, delta_time);
        } else {
            self.brake_linear(state, self.config.ground_friction, delta_time);
        }
    }

    /// Linear deceleration opposing the horizontal velocity, clamped so it
    /// cannot overshoot past zero. Vertical velocity is untouched.
    fn brake_linear(&self, state: &mut MovementState, friction: f32, delta_time: f32) {
        let horizontal = state.horizontal_velocity();
        let speed = horizontal.length();
        if speed < SPEED_EPSILON {
            return;
        }

        let decel = friction * delta_time;
        if decel >= speed {
            state.set_horizontal_velocity(glam::Vec2::ZERO);
        } else {
            state.set_horizontal_velocity(horizontal - horizontal / speed * decel);
        }
    }

    // ========================================================================
    // Move integration
    // ========================================================================

    fn integrate_move(
        &self,
        state: &mut MovementState,
        input: &mut InputAccumulator,
        body: &mut impl MovableBody,
        world: &impl CollisionWorld,
        delta_time: f32,
        events: StepEvents,
    ) {
        let input_vec = input.consume_and_reset();
        let has_input = input_vec.length_squared() > INPUT_EPSILON_SQ;
        let input_dir = if has_input {
            input_vec.normalize()
        } else {
            glam::Vec2::ZERO
        };

        // Steer the horizontal velocity toward the input target at a
        // constant rate. Arcade-style: the target is a speed, not a force.
        if has_input {
            let target = input_dir * self.config.max_speed;
            let steered = move_towards(
                state.horizontal_velocity(),
                target,
                self.config.acceleration * delta_time,
            );
            state.set_horizontal_velocity(steered.clamp_length_max(self.config.max_speed));
        }

        let mut move_delta = state.velocity * delta_time;

        if state.mode == LocomotionMode::Grounded {
            move_delta =
                self.adjust_grounded_move(state, move_delta, has_input, input_dir, delta_time, events);
        }

        let hit = safe_move(body, world, move_delta);

        if hit.blocking {
            slide_along_surface(body, world, move_delta, 1.0 - hit.fraction, hit.impact_normal);

            // Corners and edges eat displacement even after the slide. A
            // single short corrective pass along the floor plane recovers
            // it; skipped while sliding so two displacement sources can't
            // compound into a distance spike.
            if state.mode == LocomotionMode::Grounded && !events.slide_accel_applied {
                let floor_slide = project_onto_plane(move_delta, state.floor.current());
                if floor_slide.length_squared() > 1.0e-4 {
                    safe_move(body, world, floor_slide * 0.5);
                }
            }
        }
    }

    /// Reshape a grounded displacement for surface following.
    fn adjust_grounded_move(
        &self,
        state: &MovementState,
        move_delta: Vec3,
        has_input: bool,
        input_dir: glam::Vec2,
        delta_time: f32,
        events: StepEvents,
    ) -> Vec3 {
        let current = state.floor.current();
        let previous = state.floor.previous();

        // Edge/vertex heuristic: a cached normal that is too steep, or
        // that swung sharply since last frame, or a contact that never
        // resolved to a mesh face, cannot be trusted as a projection
        // basis.
        let unstable = current.z < self.config.unstable_floor_z_threshold
            || current.dot(previous) < self.config.floor_normal_dot_edge_threshold
            || state.current_floor.face_index.is_none();

        let horizontal = state.horizontal_velocity();
        let h_speed = horizontal.length();
        let intended_dir = if has_input {
            input_dir
        } else if h_speed > SPEED_EPSILON {
            horizontal / h_speed
        } else {
            glam::Vec2::ZERO
        };
        let directional = Vec3::new(intended_dir.x, intended_dir.y, 0.0) * h_speed * delta_time;

        if unstable {
            // Projecting onto a garbage normal collapses movement at
            // geometric seams; walk the intended direction instead.
            return directional;
        }

        let projected = project_onto_plane(move_delta, current);
        let mut adjusted = if projected.length() < self.config.min_projected_move_cm {
            directional
        } else {
            projected
        };

        // With live input, guarantee a minimum step so motion onset never
        // stutters. Suppressed when this frame's velocity came from slope
        // sliding: unforced rolling must not be handed free energy.
        if has_input
            && !events.slide_accel_applied
            && adjusted.length() < self.config.min_projected_move_cm
        {
            adjusted = Vec3::new(input_dir.x, input_dir.y, 0.0) * self.config.min_projected_move_cm;
        }

        adjusted
    }

    // ========================================================================
    // Ground check and locomotion state
    // ========================================================================

    fn check_ground(
        &self,
        state: &mut MovementState,
        body: &mut impl MovableBody,
        world: &impl CollisionWorld,
        delta_time: f32,
    ) {
        let Some(sample) = sweep_ground(body, world, &self.config) else {
            // Not a sphere collider: ground detection reports nothing.
            self.become_falling(state);
            return;
        };

        let walkable_z = self.config.walkable_z();

        if is_valid_ground(&sample, &self.config) {
            let normal_z = sample.impact_normal.z;

            if normal_z >= walkable_z {
                let is_flat = normal_z >= self.config.flat_ground_z_threshold;
                state.floor.update(
                    sample.impact_normal,
                    delta_time,
                    is_flat,
                    self.config.floor_normal_interp_speed,
                );

                // Landing correction: only for confident, non-sloped
                // landings, otherwise the snap itself causes jitter on
                // slopes.
                if is_flat
                    && state.mode == LocomotionMode::Falling
                    && state.velocity.z <= 0.0
                {
                    if let Some(radius) = body.sphere_radius() {
                        let target = sample.impact_point + sample.impact_normal * radius;
                        body.set_position(target);
                        state.slide = SlideStatus::Settled;
                        log::debug!("landing snap to {target:?}");
                    }
                }

                if state.mode == LocomotionMode::Falling {
                    log::debug!("grounded (normal_z={normal_z:.3})");
                }
                state.current_floor = sample;
                state.mode = LocomotionMode::Grounded;
                return;
            }

            // Grace retention: an already-grounded avatar rides out
            // samples slightly past the walkable cutoff, without the full
            // cache update. Kills flicker exactly at the boundary.
            if state.mode == LocomotionMode::Grounded && normal_z >= self.config.grace_z() {
                state.floor.set_current(sample.impact_normal);
                state.current_floor = sample;
                return;
            }
        }

        // The sweep found nothing standable; sharp edges and vertices do
        // that. A short straight-down trace still resolves honest floor.
        let line = trace_ground_line(body, world, &self.config);
        if line.blocking && line.impact_normal.z >= walkable_z {
            state.floor.shift_to(line.impact_normal);
            if state.mode == LocomotionMode::Falling {
                log::debug!("grounded via line trace");
            }
            state.current_floor = line;
            state.mode = LocomotionMode::Grounded;
            return;
        }

        self.become_falling(state);
    }

    fn become_falling(&self, state: &mut MovementState) {
        if state.mode == LocomotionMode::Grounded {
            log::debug!("ground support lost");
        }
        state.current_floor = FloorSample::default();
        state.mode = LocomotionMode::Falling;
    }
}

// ============================================================================
// Tests
// ============================================================================
