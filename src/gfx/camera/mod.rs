//! Cameras and culling volumes

pub mod camera;
pub mod camera_utils;
pub mod frustum;

pub use camera::{Camera, Projection, OPENGL_TO_WGPU_MATRIX};
pub use camera_utils::{convert_matrix4_to_array, CameraUniform};
pub use frustum::Frustum;
