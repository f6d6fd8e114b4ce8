//! A self-contained collision world over parry3d.
//!
//! Stores static brushes (boxes and triangle meshes) and answers the two
//! queries the movement code needs: sphere sweeps and line traces. The
//! world is immutable after construction and can be shared across threads.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{contact, Ray, RayCast};
use parry3d::shape::{FeatureId, SharedShape};

use super::query::{CollisionWorld, FloorSample};

/// Contact tolerance for overlap tests (cm). A sphere resting exactly on a
/// surface reports a distance of ~0; without a skin the resting pose would
/// count as solid and every sweep from it would stop at fraction 0.
const CONTACT_SKIN: f32 = 0.05;

/// Iterations for the sweep boundary search. Twelve halvings of a
/// frame-sized sweep resolve the stop point well below the contact skin.
const SWEEP_ITERATIONS: u32 = 12;

/// A piece of static collision geometry.
#[derive(Clone)]
struct Brush {
    shape: SharedShape,
    transform: Isometry<Real>,
}

/// Static world geometry: boxes and triangle meshes.
#[derive(Default)]
pub struct TriMeshWorld {
    brushes: Vec<Brush>,
}

impl TriMeshWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self { brushes: Vec::new() }
    }

    /// Add an axis-aligned box.
    ///
    /// `center` is the box center in world space, `half_extents` the
    /// half-size along each axis.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.brushes.push(Brush {
            shape,
            transform: Isometry::translation(center.x, center.y, center.z),
        });
    }

    /// Add a triangle mesh from vertex positions and triangle indices.
    ///
    /// Panics if the index buffer does not describe a valid mesh; this is
    /// a construction-time input error, not a runtime condition.
    pub fn add_triangle_mesh(&mut self, vertices: &[Vec3], indices: &[[u32; 3]]) {
        let parry_vertices: Vec<Point<Real>> = vertices
            .iter()
            .map(|v| Point::new(v.x, v.y, v.z))
            .collect();

        let shape = SharedShape::trimesh(parry_vertices, indices.to_vec());

        self.brushes.push(Brush {
            shape,
            transform: Isometry::identity(),
        });
    }

    /// Number of brushes in the world.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    /// Whether a sphere at `center` penetrates any brush deeper than the
    /// contact skin.
    fn sphere_in_solid(&self, center: Vec3, radius: f32) -> bool {
        let sphere = SharedShape::ball(radius.max(1.0e-3));
        let pose = Isometry::translation(center.x, center.y, center.z);

        for brush in &self.brushes {
            if let Ok(Some(c)) = contact(
                &pose,
                sphere.as_ref(),
                &brush.transform,
                brush.shape.as_ref(),
                0.0,
            ) {
                if c.dist < -CONTACT_SKIN {
                    return true;
                }
            }
        }

        false
    }

    /// Deepest contact for a sphere at `center`: the surface point on the
    /// touched brush and the separation direction (surface toward sphere
    /// center). `None` when nothing is touched.
    fn deepest_contact(&self, center: Vec3, radius: f32) -> Option<(Vec3, Vec3)> {
        let sphere = SharedShape::ball(radius.max(1.0e-3));
        let pose = Isometry::translation(center.x, center.y, center.z);

        let mut deepest: Option<(f32, Vec3)> = None;
        for brush in &self.brushes {
            if let Ok(Some(c)) = contact(
                &pose,
                sphere.as_ref(),
                &brush.transform,
                brush.shape.as_ref(),
                CONTACT_SKIN,
            ) {
                let is_deeper = deepest.as_ref().map_or(true, |(dist, _)| c.dist < *dist);
                if is_deeper {
                    deepest = Some((c.dist, Vec3::new(c.point2.x, c.point2.y, c.point2.z)));
                }
            }
        }

        deepest.map(|(_, point)| {
            let away = center - point;
            let normal = away.normalize_or_zero();
            (point, normal)
        })
    }

    /// Closest ray hit across all brushes, with feature information.
    fn ray_closest(&self, origin: Vec3, dir: Vec3, max_toi: f32) -> Option<(f32, Vec3, FeatureId)> {
        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut closest: Option<(f32, Vec3, FeatureId)> = None;
        for brush in &self.brushes {
            if let Some(hit) =
                brush
                    .shape
                    .cast_ray_and_get_normal(&brush.transform, &ray, max_toi, true)
            {
                let is_closer = closest
                    .as_ref()
                    .map_or(true, |(toi, _, _)| hit.time_of_impact < *toi);
                if is_closer {
                    let normal = Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z);
                    closest = Some((hit.time_of_impact, normal, hit.feature));
                }
            }
        }

        closest
    }

    /// Build the blocking sample for a sphere stopped at `center` while
    /// sweeping along `dir`.
    ///
    /// The touched surface is resolved with a short ray in the sweep
    /// direction, which yields the exact impact point, normal, and (for
    /// meshes) the face index. Edge and vertex contacts frequently defeat
    /// that ray; those fall back to the penetration direction just past
    /// the stop point and report no face index.
    fn contact_sample(&self, center: Vec3, dir: Vec3, radius: f32, traveled: f32) -> FloorSample {
        if let Some((toi, normal, feature)) = self.ray_closest(center, dir, radius * 2.0 + 1.0) {
            let impact = center + dir * toi;
            let face_index = match feature {
                FeatureId::Face(i) => Some(i),
                _ => None,
            };
            return FloorSample {
                blocking: true,
                fraction: 0.0,
                distance: traveled,
                end_position: center,
                impact_point: impact,
                impact_normal: normal.normalize_or_zero(),
                face_index,
            };
        }

        // Ray missed: edge/vertex contact. Fall back to the deepest
        // sphere contact just past the stop point; its separation
        // direction stands in for the surface normal.
        let probe = center + dir * (CONTACT_SKIN * 4.0);
        let (impact_point, normal) = match self.deepest_contact(probe, radius) {
            Some((point, n)) if n.length_squared() > 0.5 => (point, n),
            _ => (center + dir * radius, -dir),
        };

        FloorSample {
            blocking: true,
            fraction: 0.0,
            distance: traveled,
            end_position: center,
            impact_point,
            impact_normal: normal,
            face_index: None,
        }
    }
}

impl CollisionWorld for TriMeshWorld {
    fn sweep_sphere(&self, start: Vec3, end: Vec3, radius: f32) -> FloorSample {
        let delta = end - start;
        let total = delta.length();

        if total < 1.0e-4 {
            return if self.sphere_in_solid(start, radius) {
                self.contact_sample(start, -Vec3::Z, radius, 0.0)
            } else {
                FloorSample::no_hit(start)
            };
        }

        let dir = delta / total;

        if self.sphere_in_solid(start, radius) {
            return self.contact_sample(start, dir, radius, 0.0);
        }

        // March the segment at sub-radius steps so thin geometry (a
        // triangle mesh has no interior) cannot be skipped over, then
        // bisect inside the first overlapping bracket.
        let step = (radius * 0.5).max(1.0e-2);
        let steps = ((total / step).ceil() as usize).clamp(1, 256);

        let mut bracket = None;
        let mut prev_t = 0.0_f32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            if self.sphere_in_solid(start + delta * t, radius) {
                bracket = Some((prev_t, t));
                break;
            }
            prev_t = t;
        }

        let Some((mut lo, mut hi)) = bracket else {
            return FloorSample::no_hit(end);
        };

        for _ in 0..SWEEP_ITERATIONS {
            let mid = (lo + hi) * 0.5;
            if self.sphere_in_solid(start + delta * mid, radius) {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let stop = start + delta * lo;
        let mut sample = self.contact_sample(stop, dir, radius, total * lo);
        sample.fraction = lo;
        sample
    }

    fn line_trace(&self, start: Vec3, end: Vec3) -> FloorSample {
        let delta = end - start;
        let total = delta.length();
        if total < 1.0e-6 {
            return FloorSample::no_hit(start);
        }
        let dir = delta / total;

        match self.ray_closest(start, dir, total) {
            Some((toi, normal, feature)) => {
                let impact = start + dir * toi;
                let face_index = match feature {
                    FeatureId::Face(i) => Some(i),
                    _ => None,
                };
                FloorSample::hit(
                    toi / total,
                    toi,
                    impact,
                    impact,
                    normal.normalize_or_zero(),
                    face_index,
                )
            }
            None => FloorSample::no_hit(end),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
