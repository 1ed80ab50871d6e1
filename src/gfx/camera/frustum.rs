//! View frustum extracted from a view-projection matrix

use cgmath::{Matrix, Matrix4, Point3};

use crate::gfx::geometry::{Aabb, Containment, Plane};

/// Six inward-facing planes of a camera's view volume
///
/// Extraction assumes wgpu clip space, where depth runs from 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn from_matrix(view_proj: &Matrix4<f32>) -> Self {
        let (r0, r1, r2, r3) = (
            view_proj.row(0),
            view_proj.row(1),
            view_proj.row(2),
            view_proj.row(3),
        );

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.planes.iter().all(|plane| plane.distance(point) >= 0.0)
    }

    /// Precise box test using the positive and negative vertex of each plane
    pub fn contains(&self, bounds: &Aabb) -> Containment {
        let mut result = Containment::Contains;

        for plane in &self.planes {
            let n = plane.normal;
            let positive = Point3::new(
                if n.x >= 0.0 { bounds.max.x } else { bounds.min.x },
                if n.y >= 0.0 { bounds.max.y } else { bounds.min.y },
                if n.z >= 0.0 { bounds.max.z } else { bounds.min.z },
            );
            if plane.distance(positive) < 0.0 {
                return Containment::Disjoint;
            }

            let negative = Point3::new(
                if n.x >= 0.0 { bounds.min.x } else { bounds.max.x },
                if n.y >= 0.0 { bounds.min.y } else { bounds.max.y },
                if n.z >= 0.0 { bounds.min.z } else { bounds.max.z },
            );
            if plane.distance(negative) < 0.0 {
                result = Containment::Intersects;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{ortho, Vector3};

    use crate::gfx::camera::camera::OPENGL_TO_WGPU_MATRIX;

    fn box_frustum() -> Frustum {
        // Looking down -Z from the origin: x, y in [-5, 5], z in [-10, -1]
        Frustum::from_matrix(&(OPENGL_TO_WGPU_MATRIX * ortho(-5.0, 5.0, -5.0, 5.0, 1.0, 10.0)))
    }

    #[test]
    fn test_point_containment() {
        let frustum = box_frustum();
        assert!(frustum.contains_point(Point3::new(0.0, 0.0, -5.0)));
        assert!(frustum.contains_point(Point3::new(4.9, -4.9, -9.9)));
        assert!(!frustum.contains_point(Point3::new(0.0, 0.0, -0.5)));
        assert!(!frustum.contains_point(Point3::new(0.0, 0.0, -10.5)));
        assert!(!frustum.contains_point(Point3::new(6.0, 0.0, -5.0)));
    }

    #[test]
    fn test_box_classification() {
        let frustum = box_frustum();
        let half = Vector3::new(0.5, 0.5, 0.5);

        let inside = Aabb::from_center(Point3::new(0.0, 0.0, -5.0), half);
        let straddling = Aabb::from_center(Point3::new(5.0, 0.0, -5.0), half);
        let behind = Aabb::from_center(Point3::new(0.0, 0.0, 3.0), half);

        assert_eq!(frustum.contains(&inside), Containment::Contains);
        assert_eq!(frustum.contains(&straddling), Containment::Intersects);
        assert_eq!(frustum.contains(&behind), Containment::Disjoint);
    }
}
