//! Marble Physics
//!
//! A kinematic movement controller for a spherical avatar rolling over
//! arbitrary triangle-mesh terrain: grounded walking, slope sliding,
//! airborne falling, and edge/corner stabilization.
//!
//! # Architecture
//!
//! The crate is split into two main systems:
//!
//! - **Collision**: sweeps a sphere (or casts a line) through the world and
//!   returns hit information as a [`FloorSample`]
//! - **Movement**: consumes those queries to run the per-frame locomotion
//!   pipeline on a [`MovementState`]
//!
//! The controller never touches an engine object graph. It talks to its
//! surroundings through two capability traits: [`MovableBody`] (the thing
//! being moved) and [`CollisionWorld`] (the thing being moved through). A
//! parry3d-backed [`TriMeshWorld`] is provided for embedders and tests that
//! need a real world without a full engine.
//!
//! # Conventions
//!
//! Z is up. Distances are centimeters, speeds cm/s, accelerations cm/s²,
//! time seconds. Each simulation tick the owning loop calls
//! [`MarbleController::step`] exactly once; a zero or negative delta is a
//! no-op frame.

pub mod body;
pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use body::{MovableBody, SphereBody};
pub use collision::{CollisionWorld, FloorSample, TriMeshWorld};
pub use movement::{
    InputAccumulator, LocomotionMode, MarbleController, MotionState, MovementConfig,
    MovementState, SlideStatus,
};
