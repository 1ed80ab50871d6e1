//! # Tarn Prelude
//!
//! Commonly used types and traits in one import.
//!
//! ```no_run
//! use tarn::prelude::*;
//!
//! fn main() -> tarn::Result<()> {
//!     let mut device = WgpuBackend::new_headless(800, 600)?;
//!     let mut scene = Scene::new(RenderSettings::default())?;
//!     scene.add_actor(LightActor::new(ActorState::new("sky"), AmbientLight::new([0.2; 3])));
//!
//!     let mut camera = Camera::perspective(Deg(60.0_f32), 4.0 / 3.0, 0.1, 500.0)?;
//!     let time = FrameTime::new(0.0, 1.0 / 60.0);
//!     let mut frame = scene.pre_draw(time, &mut camera, &mut device)?;
//!     scene.draw(&mut frame, time, &camera, DrawPass::Normal, &mut device)?;
//!     device.submit_offscreen()
//! }
//! ```

// Settings and errors
pub use crate::config::{Fog, ReflectionSettings, RenderSettings, ShadowSettings};
pub use crate::error::{RenderError, Result};

// Scene and actors
pub use crate::gfx::scene::{
    Actor, ActorId, ActorState, AmbientLight, DirectionalLight, FrameContext, Light, LightActor,
    PointLight, Scene, SurfaceActor, Transform,
};

// Surfaces
pub use crate::gfx::surface::{
    CullMode, DrawPass, DrawProperties, DrawStyle, FrameTime, MeshSurface, SkyboxSurface, Surface,
    SurfacePrograms, SurfaceProperties, TerrainSurface, WaterSurface,
};

// Cameras, geometry and devices
pub use crate::gfx::camera::{Camera, Projection};
pub use crate::gfx::geometry::{generate_cube, generate_plane, generate_skybox_cube, generate_sphere, Aabb, Plane};
pub use crate::gfx::rendering::{CommandList, DrawStats, GraphicsDevice, WgpuBackend};
pub use crate::gfx::resources::{MeshData, ResourceCatalog};

// Re-export common external dependencies
pub use cgmath::{Deg, InnerSpace, Point3, Quaternion, Rotation3, Vector3};
