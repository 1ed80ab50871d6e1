//! # Surfaces
//!
//! A surface is the unit the pipeline culls, sorts and draws. Each one is owned by
//! an actor and drawn with that actor's world transform, which is looked up again
//! on every query because actors move between frames.
//!
//! Surfaces are classified twice:
//!
//! - [`DrawStyle`] decides the bucket and therefore the order
//!   (prioritized, then opaque, then transparent).
//! - [`DrawProperties`] flags opt a surface into the shadow and reflection passes.
//!
//! Built-in kinds: [`MeshSurface`], [`SkyboxSurface`], [`TerrainSurface`] and
//! [`WaterSurface`].

pub mod mesh;
pub mod skybox;
pub mod terrain;
pub mod water;

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Transform};

use crate::config::{Fog, RenderSettings};
use crate::error::{RenderError, Result};
use crate::gfx::camera::Camera;
use crate::gfx::geometry::Aabb;
use crate::gfx::resources::catalog::ResourceCatalog;
use crate::gfx::rendering::device::{
    BlendMode, DrawCall, GraphicsDevice, LightingParams, MaterialParams, MeshHandle, ProgramHandle,
};
use crate::gfx::scene::actor::Actor;
use crate::gfx::scene::light::LightCache;

pub use mesh::MeshSurface;
pub use skybox::SkyboxSurface;
pub use terrain::TerrainSurface;
pub use water::WaterSurface;

/// Ordering class of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawStyle {
    Opaque,
    /// Alpha blended, drawn far to near after everything else
    Transparent,
    /// Drawn first in ascending [`SurfaceProperties::priority`]
    Prioritized,
}

bitflags! {
    /// Pass participation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DrawProperties: u32 {
        /// Casts into directional shadow maps
        const SHADOWING = 1 << 0;
        /// Appears in planar reflections
        const REFLECTING = 1 << 1;
        /// Placed relative to the drawing camera (skyboxes)
        const DEPENDANT_TRANSFORM = 1 << 2;
    }
}

/// Winding treated as front facing; `None` draws both sides
///
/// The ordering is only used to break transparent distance ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CullMode {
    None,
    Clockwise,
    CounterClockwise,
}

/// The draw modes surfaces dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    Normal,
    DirectionalShadow,
}

impl DrawPass {
    pub fn as_str(self) -> &'static str {
        match self {
            DrawPass::Normal => "Normal",
            DrawPass::DirectionalShadow => "DirectionalShadow",
        }
    }
}

impl fmt::Display for DrawPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrawPass {
    type Err = RenderError;

    fn from_str(token: &str) -> Result<Self> {
        match token {
            "Normal" => Ok(DrawPass::Normal),
            "DirectionalShadow" => Ok(DrawPass::DirectionalShadow),
            other => Err(RenderError::UnknownDrawPass(other.to_string())),
        }
    }
}

/// Classification and material values shared by every surface kind
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceProperties {
    /// Never culled when set
    pub boundless: bool,
    pub style: DrawStyle,
    pub draw_properties: DrawProperties,
    pub cull_mode: CullMode,
    pub priority: i32,
    pub diffuse: [f32; 4],
    pub specular: [f32; 3],
    pub specular_power: f32,
    pub lighting: bool,
    pub fog: bool,
}

impl SurfaceProperties {
    pub fn new(style: DrawStyle) -> Self {
        Self {
            boundless: false,
            style,
            draw_properties: DrawProperties::empty(),
            cull_mode: CullMode::CounterClockwise,
            priority: 0,
            diffuse: [1.0; 4],
            specular: [0.0; 3],
            specular_power: 16.0,
            lighting: true,
            fog: true,
        }
    }

    pub fn boundless(mut self) -> Self {
        self.boundless = true;
        self
    }

    pub fn with_style(mut self, style: DrawStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_draw_properties(mut self, flags: DrawProperties) -> Self {
        self.draw_properties = flags;
        self
    }

    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_diffuse(mut self, diffuse: [f32; 4]) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_specular(mut self, specular: [f32; 3], power: f32) -> Self {
        self.specular = specular;
        self.specular_power = power;
        self
    }

    pub fn with_lighting(mut self, enabled: bool) -> Self {
        self.lighting = enabled;
        self
    }

    pub fn with_fog(mut self, enabled: bool) -> Self {
        self.fog = enabled;
        self
    }

    pub fn material(&self) -> MaterialParams {
        MaterialParams {
            diffuse: self.diffuse,
            specular: self.specular,
            specular_power: self.specular_power,
            lighting: self.lighting,
            fog: self.fog,
            ..MaterialParams::default()
        }
    }

    /// Draw call for `mesh` in the context's current pass
    ///
    /// Normal-pass draws of lit surfaces pick up the scene lights and the first
    /// published shadow map. Shadow-pass draws render both faces.
    pub fn draw_call(
        &self,
        mesh: MeshHandle,
        program: ProgramHandle,
        world: Matrix4<f32>,
        ctx: &DrawContext<'_>,
    ) -> DrawCall {
        let transparent = self.style == DrawStyle::Transparent;
        let shadow_pass = ctx.pass == DrawPass::DirectionalShadow;
        let lit = self.lighting && !shadow_pass;

        let lighting = if lit {
            ctx.lights.lighting_at(world.transform_point(Point3::origin()))
        } else {
            LightingParams::default()
        };
        let mut fog = *ctx.fog;
        fog.enabled &= self.fog && !shadow_pass;

        DrawCall {
            mesh,
            program,
            pass: ctx.pass,
            world,
            view_projection: ctx.camera.view_projection(),
            eye: ctx.camera.position(),
            material: self.material(),
            lighting,
            fog,
            cull_mode: if shadow_pass { CullMode::None } else { self.cull_mode },
            blend: if transparent { BlendMode::Alpha } else { BlendMode::Replace },
            depth_write: !transparent,
            diffuse_texture: None,
            shadow: if lit { ctx.lights.shadow_map() } else { None },
            reflection: None,
        }
    }
}

/// Programs a surface draws with, one per pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfacePrograms {
    pub normal: ProgramHandle,
    pub shadow: ProgramHandle,
}

impl SurfacePrograms {
    /// Resolves the built-in `surface` and `shadow` programs
    pub fn from_catalog(catalog: &ResourceCatalog) -> Result<Self> {
        Ok(Self {
            normal: catalog.program("surface")?,
            shadow: catalog.program("shadow")?,
        })
    }

    pub fn for_pass(&self, pass: DrawPass) -> ProgramHandle {
        match pass {
            DrawPass::Normal => self.normal,
            DrawPass::DirectionalShadow => self.shadow,
        }
    }
}

/// Time of the frame being drawn, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

impl FrameTime {
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }
}

/// Per-frame state every pass reads
#[derive(Clone, Copy)]
pub struct FrameInputs<'a> {
    pub time: FrameTime,
    /// The scene's cached surfaces for this frame
    pub surfaces: &'a [SurfaceInstance<'a>],
    pub lights: &'a LightCache<'a>,
    pub fog: &'a Fog,
    pub settings: &'a RenderSettings,
}

/// What a surface sees while drawing
pub struct DrawContext<'a> {
    pub time: FrameTime,
    pub camera: &'a Camera,
    pub pass: DrawPass,
    pub lights: &'a LightCache<'a>,
    pub fog: &'a Fog,
    pub device: &'a mut dyn GraphicsDevice,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        inputs: FrameInputs<'a>,
        camera: &'a Camera,
        pass: DrawPass,
        device: &'a mut dyn GraphicsDevice,
    ) -> Self {
        Self {
            time: inputs.time,
            camera,
            pass,
            lights: inputs.lights,
            fog: inputs.fog,
            device,
        }
    }
}

/// What a surface sees during its offscreen hook
///
/// The camera is mutable so passes can temporarily re-aim it; they must put it
/// back before returning.
pub struct PreDrawContext<'a> {
    pub inputs: FrameInputs<'a>,
    pub camera: &'a mut Camera,
    pub device: &'a mut dyn GraphicsDevice,
}

/// A drawable unit bound to its owning actor's transform
pub trait Surface {
    fn properties(&self) -> &SurfaceProperties;

    /// World-space bounds under the owner's current transform
    fn bounding_box(&self, world: &Matrix4<f32>) -> Aabb;

    fn is_boundless(&self) -> bool {
        self.properties().boundless
    }

    /// Point used for distance sorting
    fn representative_point(&self, world: &Matrix4<f32>) -> Point3<f32> {
        if self.is_boundless() {
            world.transform_point(Point3::origin())
        } else {
            self.bounding_box(world).center()
        }
    }

    /// Offscreen work that has to finish before the final pass
    fn pre_draw(&self, _world: &Matrix4<f32>, _ctx: &mut PreDrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Draws for `ctx.pass`, or does nothing for passes the surface skips
    fn draw(&self, world: &Matrix4<f32>, ctx: &mut DrawContext<'_>) -> Result<()>;

    /// Frees GPU resources the surface owns
    fn release(&self, _device: &mut dyn GraphicsDevice) {}

    fn has_draw_properties(&self, flags: DrawProperties) -> bool {
        self.properties().draw_properties.contains(flags)
    }
}

/// A cached surface paired with the actor that owns it
#[derive(Clone, Copy)]
pub struct SurfaceInstance<'a> {
    pub owner: &'a dyn Actor,
    pub surface: &'a dyn Surface,
}

impl<'a> SurfaceInstance<'a> {
    pub fn new(owner: &'a dyn Actor, surface: &'a dyn Surface) -> Self {
        Self { owner, surface }
    }

    pub fn world(&self) -> Matrix4<f32> {
        self.owner.world_transform()
    }

    pub fn properties(&self) -> &'a SurfaceProperties {
        self.surface.properties()
    }

    pub fn is_boundless(&self) -> bool {
        self.surface.is_boundless()
    }

    pub fn bounding_box(&self) -> Aabb {
        self.surface.bounding_box(&self.world())
    }

    pub fn has_draw_properties(&self, flags: DrawProperties) -> bool {
        self.surface.has_draw_properties(flags)
    }

    pub fn distance2(&self, eye: Point3<f32>) -> f32 {
        (self.surface.representative_point(&self.world()) - eye).magnitude2()
    }

    /// Boundless, or overlapping the camera's view volume
    pub fn is_visible_from(&self, camera: &Camera) -> bool {
        self.is_boundless() || !camera.contains(&self.bounding_box()).is_disjoint()
    }

    /// True when this instance wraps `surface`
    pub fn is<S: Surface>(&self, surface: &S) -> bool {
        std::ptr::addr_eq(self.surface as *const dyn Surface, surface as *const S)
    }

    pub fn pre_draw(&self, ctx: &mut PreDrawContext<'_>) -> Result<()> {
        self.surface.pre_draw(&self.world(), ctx)
    }

    pub fn draw(&self, ctx: &mut DrawContext<'_>) -> Result<()> {
        self.surface.draw(&self.world(), ctx)
    }
}

impl fmt::Debug for SurfaceInstance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceInstance")
            .field("owner", &self.owner.state().name)
            .field("style", &self.properties().style)
            .finish()
    }
}
