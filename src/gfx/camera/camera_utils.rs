use cgmath::{EuclideanSpace, Matrix4, Point3, SquareMatrix};

use super::camera::Camera;

/// Camera state laid out for a uniform buffer
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

impl CameraUniform {
    pub fn new(eye: Point3<f32>, view_proj: Matrix4<f32>) -> Self {
        Self {
            view_position: eye.to_homogeneous().into(),
            view_proj: convert_matrix4_to_array(view_proj),
        }
    }

    pub fn from_camera(camera: &Camera) -> Self {
        Self::new(camera.position(), camera.view_projection())
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
