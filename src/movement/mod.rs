//! Marble movement system.
//!
//! Implements grounded rolling, slope sliding, and airborne falling for a
//! spherical avatar:
//!
//! - Arcade-style steering toward the input direction, with friction
//! - A static/kinetic friction analogy for slope-induced rolling
//! - Floor-plane projected displacement with swept collision response
//! - A two-state {Grounded, Falling} machine with grace-zone hysteresis
//! - Heuristic recovery at triangle edges and vertices, where reported
//!   normals stop being trustworthy
//!
//! # Design
//!
//! [`MarbleController`] holds tuning only; per-avatar simulation state
//! lives in [`MovementState`] and the position in the injected
//! [`crate::MovableBody`]. One [`MarbleController::step`] call per
//! simulation tick runs the fixed six-stage pipeline. Stage order is part
//! of the contract.

mod config;
mod controller;
mod ground;
mod slide_move;
mod slope;
mod state;

pub use config::MovementConfig;
pub use controller::MarbleController;
pub use ground::FloorNormalCache;
pub use state::{InputAccumulator, LocomotionMode, MotionState, MovementState, SlideStatus};
