//! # Scene
//!
//! The [`Scene`] owns actors and drives each frame in two phases:
//!
//! 1. [`Scene::pre_draw`] caches the visible actors, sorts their lights by kind,
//!    collects their surfaces and runs every offscreen pass (directional shadow
//!    maps, then water reflections). It returns a [`FrameContext`].
//! 2. [`Scene::draw`] draws the cached surfaces to the backbuffer once and
//!    empties the context.
//!
//! ```no_run
//! use tarn::prelude::*;
//!
//! # fn frame(scene: &Scene, camera: &mut Camera, device: &mut dyn GraphicsDevice) -> tarn::Result<()> {
//! let time = FrameTime::new(0.0, 1.0 / 60.0);
//! let mut frame = scene.pre_draw(time, camera, device)?;
//! scene.draw(&mut frame, time, camera, DrawPass::Normal, device)?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod light;
pub mod scene;

pub use actor::{Actor, ActorState, LightActor, SurfaceActor, Transform};
pub use light::{AmbientLight, DirectionalLight, Light, LightCache, LightRef, PointLight};
pub use scene::{ActorId, FrameContext, Scene};
