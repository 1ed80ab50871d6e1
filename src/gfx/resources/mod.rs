//! GPU resource management
//!
//! Handles textures, vertex data, per-draw uniforms and name lookup for uploaded
//! resources.

pub mod catalog;
pub mod draw_bindings;
pub mod texture_resource;
pub mod vertex;

// Re-export main types
pub use catalog::ResourceCatalog;
pub use draw_bindings::{DrawBindings, DrawUniform};
pub use texture_resource::TextureResource;
pub use vertex::{MeshData, Vertex3D};
