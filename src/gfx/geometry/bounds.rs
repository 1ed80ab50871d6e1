//! Bounding volumes used for culling
//!
//! [`Aabb`] is the only bounding shape surfaces expose. [`Plane`] backs both the
//! camera frustum and the water clip plane.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Transform, Vector3, Vector4};

/// Result of a volume containment query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Containment {
    /// No overlap at all
    Disjoint,
    /// Partial overlap
    Intersects,
    /// The queried volume lies completely inside
    Contains,
}

impl Containment {
    pub fn is_disjoint(self) -> bool {
        self == Containment::Disjoint
    }
}

/// Axis-aligned bounding box in world or local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Box centred on `center` with half extents `half`
    pub fn from_center(center: Point3<f32>, half: Vector3<f32>) -> Self {
        Self::new(center - half, center + half)
    }

    /// Smallest box enclosing every point; a degenerate box at the origin when empty
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::new(Point3::origin(), Point3::origin());
        };

        points.fold(Self::new(first, first), |mut bounds, p| {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.min.z = bounds.min.z.min(p.z);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
            bounds.max.z = bounds.max.z.max(p.z);
            bounds
        })
    }

    /// Bounds of raw vertex positions
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        Self::from_points(vertices.iter().copied().map(Point3::from))
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// The eight corners, min corner first
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Closed-interval overlap test; touching boxes intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, p: Point3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Classifies `other` relative to this box
    pub fn contains(&self, other: &Aabb) -> Containment {
        if !self.intersects(other) {
            Containment::Disjoint
        } else if self.contains_point(other.min) && self.contains_point(other.max) {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::from_points([self.min, self.max, other.min, other.max])
    }

    /// Bounds of this box after an affine transform
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Aabb {
        Aabb::from_points(self.corners().into_iter().map(|c| matrix.transform_point(c)))
    }
}

/// Plane in Hessian normal form: `normal · p + d = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    /// Plane through `point` facing `normal` (normalised here)
    pub fn from_point_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            d: -normal.dot(point.to_vec()),
        }
    }

    /// Builds a plane from raw `(a, b, c, d)` coefficients and normalises it
    pub fn from_coefficients(coefficients: Vector4<f32>) -> Self {
        let normal = coefficients.truncate();
        let length = normal.magnitude();
        if length <= f32::EPSILON {
            return Self {
                normal,
                d: coefficients.w,
            };
        }
        Self {
            normal: normal / length,
            d: coefficients.w / length,
        }
    }

    /// Signed distance; positive on the side the normal points to
    pub fn distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(point.to_vec()) + self.d
    }

    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    pub fn as_vec4(&self) -> Vector4<f32> {
        self.normal.extend(self.d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box(center: Point3<f32>) -> Aabb {
        Aabb::from_center(center, Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_from_vertices() {
        let bounds = Aabb::from_vertices(&[[1.0, -2.0, 3.0], [-1.0, 4.0, 0.0], [0.0, 0.0, 5.0]]);
        assert_eq!(bounds.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 4.0, 5.0));

        let empty = Aabb::from_vertices(&[]);
        assert_eq!(empty.min, empty.max);
    }

    #[test]
    fn test_containment() {
        let outer = Aabb::new(Point3::new(-10.0, -10.0, -10.0), Point3::new(10.0, 10.0, 10.0));

        assert_eq!(outer.contains(&unit_box(Point3::origin())), Containment::Contains);
        assert_eq!(outer.contains(&unit_box(Point3::new(10.0, 0.0, 0.0))), Containment::Intersects);
        assert_eq!(outer.contains(&unit_box(Point3::new(20.0, 0.0, 0.0))), Containment::Disjoint);
    }

    #[test]
    fn test_touching_boxes_intersect() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_transformed_follows_translation_and_scale() {
        let local = unit_box(Point3::origin());
        let world = Matrix4::from_translation(Vector3::new(5.0, 0.0, -3.0)) * Matrix4::from_scale(2.0);
        let bounds = local.transformed(&world);

        assert_relative_eq!(bounds.min.x, 4.0);
        assert_relative_eq!(bounds.max.x, 6.0);
        assert_relative_eq!(bounds.min.z, -4.0);
        assert_relative_eq!(bounds.max.z, -2.0);
    }

    #[test]
    fn test_transformed_rotation_stays_conservative() {
        let local = unit_box(Point3::origin());
        let rotated = local.transformed(&Matrix4::from_angle_y(cgmath::Deg(45.0)));
        let half_diagonal = 0.5 * 2.0_f32.sqrt();

        assert_relative_eq!(rotated.max.x, half_diagonal, epsilon = 1e-5);
        assert_relative_eq!(rotated.max.y, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_plane_distance() {
        let water = Plane::from_point_normal(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(water.distance(Point3::new(3.0, 15.0, -2.0)), 5.0);
        assert_relative_eq!(water.flipped().distance(Point3::new(0.0, 4.0, 0.0)), 6.0);
        assert_relative_eq!(water.as_vec4().w, -10.0);
    }
}
