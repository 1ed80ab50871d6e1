//! # Graphics Module
//!
//! Everything the two-phase scene renderer needs: cameras, bounding volumes,
//! surfaces, the scene and its lights, and the GPU seam with its backends.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Perspective and orthographic cameras with frustum culling
//! - **Geometry** ([`geometry`]) - Bounding boxes, planes and procedural meshes
//! - **Surfaces** ([`surface`]) - The drawable units: meshes, skybox, terrain and water
//! - **Scene Management** ([`scene`]) - Actors, lights and the per-frame context
//! - **Rendering Pipeline** ([`rendering`]) - Device seam, shadow pass, surface drawer, wgpu backend
//! - **Resource Management** ([`resources`]) - Vertex data, textures and per-draw uniforms
//!
//! ## Frame Structure
//!
//! A frame runs in two phases. [`Scene::pre_draw`] renders every offscreen
//! target (shadow maps first, then water reflections) and returns a
//! [`FrameContext`]; [`Scene::draw`] then draws the cached surfaces to the
//! backbuffer once.
//!
//! [`Scene::pre_draw`]: scene::Scene::pre_draw
//! [`Scene::draw`]: scene::Scene::draw
//! [`FrameContext`]: scene::FrameContext

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod surface;

// Re-export commonly used types
pub use camera::Camera;
pub use rendering::{GraphicsDevice, WgpuBackend};
pub use scene::Scene;
