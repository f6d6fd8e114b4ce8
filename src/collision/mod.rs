//! Collision queries for sphere movement.
//!
//! The movement code needs exactly two questions answered about the world:
//!
//! - where does a sphere swept along a segment first touch something, and
//! - where does a line dropped along a segment first touch something.
//!
//! Both answers come back as a [`FloorSample`]. The [`CollisionWorld`]
//! trait is the seam between the controller and whatever owns the scene
//! geometry; [`TriMeshWorld`] is a self-contained implementation over
//! parry3d for embedders and tests.

mod query;
mod world;

pub use query::{CollisionWorld, FloorSample};
pub use world::TriMeshWorld;
