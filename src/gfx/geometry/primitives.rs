//! # Primitive Shape Generation
//!
//! Procedural meshes for the built-in surface kinds. All shapes are Y-up with
//! counter-clockwise front faces.

use super::GeometryData;
use std::f32::consts::PI;

const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    // (normal, u axis, v axis)
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
];

fn push_cube_faces(data: &mut GeometryData, inward: bool) {
    for (normal, u_axis, v_axis) in CUBE_FACES {
        let base = data.vertices.len() as u32;
        let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

        for (u, v) in corners {
            let position = [
                normal[0] * 0.5 + u_axis[0] * u + v_axis[0] * v,
                normal[1] * 0.5 + u_axis[1] * u + v_axis[1] * v,
                normal[2] * 0.5 + u_axis[2] * u + v_axis[2] * v,
            ];
            data.vertices.push(position);
            data.tex_coords.push([u + 0.5, 0.5 - v]);
            if inward {
                data.normals.push([-normal[0], -normal[1], -normal[2]]);
            } else {
                data.normals.push(normal);
            }
        }

        if inward {
            data.indices
                .extend_from_slice(&[base, base + 2, base + 1, base + 2, base, base + 3]);
        } else {
            data.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
    }
}

/// Generate a unit cube centered at the origin
///
/// Vertices span -0.5 to 0.5 on all axes. Each face has its own four vertices so
/// normals stay flat.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();
    push_cube_faces(&mut data, false);
    data
}

/// Generate a unit cube whose faces point inwards, for skyboxes
pub fn generate_skybox_cube() -> GeometryData {
    let mut data = GeometryData::new();
    push_cube_faces(&mut data, true);
    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 1.0 centered at the origin.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let position = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            data.vertices.push(position);
            data.normals.push(position);
            data.tex_coords
                .push([long as f32 / long_segs as f32, lat as f32 / lat_segs as f32]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, first + 1, second]);
            data.indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    data
}

/// Generate a horizontal grid in the XZ plane facing +Y
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `segments` - Subdivisions along each axis
/// * `uv_repeat` - How many times texture coordinates tile across the grid
pub fn generate_plane(width: f32, depth: f32, segments: u32, uv_repeat: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(1);

    for row in 0..=segs {
        let v = row as f32 / segs as f32;
        for col in 0..=segs {
            let u = col as f32 / segs as f32;
            data.vertices.push([(u - 0.5) * width, 0.0, (v - 0.5) * depth]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u * uv_repeat, v * uv_repeat]);
        }
    }

    for row in 0..segs {
        for col in 0..segs {
            let i = row * (segs + 1) + col;
            let next_row = i + segs + 1;

            data.indices.extend_from_slice(&[i, next_row, i + 1]);
            data.indices.extend_from_slice(&[i + 1, next_row, next_row + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    fn face_normal(data: &GeometryData, triangle: usize) -> Vector3<f32> {
        let idx = &data.indices[triangle * 3..triangle * 3 + 3];
        let [a, b, c] = [idx[0], idx[1], idx[2]].map(|i| Vector3::from(data.vertices[i as usize]));
        (b - a).cross(c - a)
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        for triangle in 0..cube.triangle_count() {
            let stored = Vector3::from(cube.normals[cube.indices[triangle * 3] as usize]);
            assert!(face_normal(&cube, triangle).dot(stored) > 0.0);
        }
    }

    #[test]
    fn test_skybox_faces_inward() {
        let sky = generate_skybox_cube();
        for triangle in 0..sky.triangle_count() {
            let first = Vector3::from(sky.vertices[sky.indices[triangle * 3] as usize]);
            assert!(face_normal(&sky, triangle).dot(first) < 0.0);
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert_eq!(sphere.vertex_count(), 9 * 7);
        assert_eq!(sphere.triangle_count(), 8 * 6 * 2);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
    }

    #[test]
    fn test_plane_faces_up() {
        let plane = generate_plane(2.0, 2.0, 2, 4.0);
        assert_eq!(plane.vertex_count(), 9);
        assert_eq!(plane.indices.len(), 24);
        for triangle in 0..plane.triangle_count() {
            assert!(face_normal(&plane, triangle).y > 0.0);
        }
        assert_eq!(plane.tex_coords[8], [4.0, 4.0]);
    }
}
