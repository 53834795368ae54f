//! Bounding volumes and exact intersection predicates
//!
//! The spatial index filters by cell region first (cheap, conservative) and
//! then runs the exact predicates in this module to eliminate false
//! positives. All classifications are three-state: a volume is either fully
//! outside the container, touching it, or fully inside it.

use crate::foundation::math::{Mat4, Point3, Vec3, Vec4};

/// Result of classifying a volume against a container or query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// The volumes are disjoint.
    Outside,
    /// The volumes overlap without containment.
    Intersecting,
    /// The tested volume is fully contained.
    Inside,
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create a degenerate AABB covering a single point
    pub fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB fully contains another AABB
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Classify `other` against this AABB acting as the container.
    pub fn classify_aabb(&self, other: &Aabb) -> Intersection {
        if !self.intersects_aabb(other) {
            Intersection::Outside
        } else if self.contains_aabb(other) {
            Intersection::Inside
        } else {
            Intersection::Intersecting
        }
    }

    /// The point of this AABB closest to `point`.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Transform this AABB and return the AABB of the result.
    ///
    /// The transformed box is generally not axis-aligned; the returned AABB
    /// bounds its eight transformed corners.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let mut min = Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = -min;

        for i in 0..8 {
            let corner = Point3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            );

            let p = matrix.transform_point(&corner);

            min = min.inf(&p.coords);
            max = max.sup(&p.coords);
        }

        Aabb { min, max }
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere
    pub center: Vec3,
    /// Radius of the sphere (zero is a legal degenerate point)
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// The AABB tightly enclosing this sphere
    pub fn enclosing_aabb(&self) -> Aabb {
        let r = Vec3::new(self.radius, self.radius, self.radius);
        Aabb::new(self.center - r, self.center + r)
    }

    /// Check if this sphere intersects an AABB
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let closest = aabb.closest_point(self.center);
        (closest - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Check if this sphere intersects another sphere
    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let combined = self.radius + other.radius;
        (other.center - self.center).magnitude_squared() <= combined * combined
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance, normalizing the normal
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let length = normal.magnitude();
        Self {
            normal: normal / length,
            distance: distance / length,
        }
    }

    /// Create a plane from the coefficients of `ax + by + cz + d = 0`
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        Self::new(
            Vec3::new(coefficients.x, coefficients.y, coefficients.z),
            coefficients.w,
        )
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// View frustum for visibility culling
///
/// Six inward-facing planes (left, right, bottom, top, near, far).
#[derive(Debug, Clone)]
pub struct Frustum {
    /// The six planes; points inside the frustum have a non-negative signed
    /// distance to every plane.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six inward-facing planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb–Hartmann extraction. Assumes nalgebra's clip-space convention
    /// (depth in `[-1, 1]`), matching projections built with
    /// `nalgebra::Perspective3` / `Orthographic3`.
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 {
            Vec4::new(
                view_projection[(i, 0)],
                view_projection[(i, 1)],
                view_projection[(i, 2)],
                view_projection[(i, 3)],
            )
        };

        let r0 = row(0);
        let r1 = row(1);
        let r2 = row(2);
        let r3 = row(3);

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0), // left
                Plane::from_coefficients(r3 - r0), // right
                Plane::from_coefficients(r3 + r1), // bottom
                Plane::from_coefficients(r3 - r1), // top
                Plane::from_coefficients(r3 + r2), // near
                Plane::from_coefficients(r3 - r2), // far
            ],
        }
    }

    /// Classify an AABB against the frustum.
    pub fn classify_aabb(&self, aabb: &Aabb) -> Intersection {
        let mut result = Intersection::Inside;

        for plane in &self.planes {
            // Positive vertex: corner farthest along the plane normal.
            let mut p = aabb.min;
            let mut n = aabb.max;

            if plane.normal.x >= 0.0 {
                p.x = aabb.max.x;
                n.x = aabb.min.x;
            }
            if plane.normal.y >= 0.0 {
                p.y = aabb.max.y;
                n.y = aabb.min.y;
            }
            if plane.normal.z >= 0.0 {
                p.z = aabb.max.z;
                n.z = aabb.min.z;
            }

            if plane.distance_to_point(p) < 0.0 {
                return Intersection::Outside;
            }

            if plane.distance_to_point(n) < 0.0 {
                result = Intersection::Intersecting;
            }
        }

        result
    }

    /// Classify a sphere against the frustum.
    pub fn classify_sphere(&self, sphere: &Sphere) -> Intersection {
        let mut result = Intersection::Inside;

        for plane in &self.planes {
            let distance = plane.distance_to_point(sphere.center);

            if distance < -sphere.radius {
                return Intersection::Outside;
            }

            if distance < sphere.radius {
                result = Intersection::Intersecting;
            }
        }

        result
    }
}

/// Bounding volume reported by a volume-carrying component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// Axis-aligned box bound (meshes)
    Aabb(Aabb),
    /// Sphere bound (point and spot lights)
    Sphere(Sphere),
}

impl Bounds {
    /// The AABB tightly enclosing this bound
    pub fn enclosing_aabb(&self) -> Aabb {
        match self {
            Bounds::Aabb(aabb) => *aabb,
            Bounds::Sphere(sphere) => sphere.enclosing_aabb(),
        }
    }

    /// Whether this bound fits entirely inside `cell`.
    ///
    /// Used for cell assignment in the spatial index: a bound belongs to the
    /// smallest cell that fully contains it.
    pub fn fits_inside(&self, cell: &Aabb) -> bool {
        cell.contains_aabb(&self.enclosing_aabb())
    }
}

/// Shape handed to the spatial index when querying for intersections.
#[derive(Debug, Clone)]
pub enum QueryVolume {
    /// Query by axis-aligned box
    Aabb(Aabb),
    /// Query by sphere
    Sphere(Sphere),
    /// Query by view frustum
    Frustum(Frustum),
}

impl QueryVolume {
    /// Conservative cell filter: can this query touch the given region?
    pub fn intersects_region(&self, region: &Aabb) -> bool {
        match self {
            QueryVolume::Aabb(aabb) => aabb.intersects_aabb(region),
            QueryVolume::Sphere(sphere) => sphere.intersects_aabb(region),
            QueryVolume::Frustum(frustum) => {
                frustum.classify_aabb(region) != Intersection::Outside
            }
        }
    }

    /// Exact accept/reject test against a component's bound.
    pub fn intersects_bounds(&self, bounds: &Bounds) -> bool {
        match (self, bounds) {
            (QueryVolume::Aabb(q), Bounds::Aabb(b)) => q.intersects_aabb(b),
            (QueryVolume::Aabb(q), Bounds::Sphere(s)) => s.intersects_aabb(q),
            (QueryVolume::Sphere(q), Bounds::Aabb(b)) => q.intersects_aabb(b),
            (QueryVolume::Sphere(q), Bounds::Sphere(s)) => q.intersects_sphere(s),
            (QueryVolume::Frustum(f), Bounds::Aabb(b)) => {
                f.classify_aabb(b) != Intersection::Outside
            }
            (QueryVolume::Frustum(f), Bounds::Sphere(s)) => {
                f.classify_sphere(s) != Intersection::Outside
            }
        }
    }
}
