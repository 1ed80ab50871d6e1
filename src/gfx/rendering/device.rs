//! The GPU seam
//!
//! Surfaces, passes and the scene never talk to wgpu directly. They issue
//! [`DrawCall`]s and render-target switches through [`GraphicsDevice`], which is
//! implemented by the real [`WgpuBackend`](super::wgpu_backend::WgpuBackend) and
//! by the recording [`CommandList`](super::command_list::CommandList).

use cgmath::{Matrix4, Point3, SquareMatrix, Vector3};

use crate::config::Fog;
use crate::error::Result;
use crate::gfx::geometry::Plane;
use crate::gfx::surface::{CullMode, DrawPass};

use super::shadow::ShadowMap;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

handle!(
    /// Opaque reference to an uploaded mesh
    MeshHandle
);
handle!(
    /// Opaque reference to a sampleable texture
    TextureHandle
);
handle!(
    /// Opaque reference to a shader program
    ProgramHandle
);
handle!(
    /// Opaque reference to an offscreen render target
    RenderTargetHandle
);

/// Where subsequent clears and draws land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Backbuffer,
    Offscreen(RenderTargetHandle),
}

/// Attachment layout of an offscreen target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    /// Colour plus depth; resolves to the colour texture
    Color,
    /// Depth only; resolves to the depth texture for comparison sampling
    ShadowDepth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
}

impl RenderTargetDesc {
    /// Target sized as `ratio` of the backbuffer, never smaller than 1x1
    pub fn scaled(label: &str, backbuffer: (u32, u32), ratio: f32, format: TargetFormat) -> Self {
        let scale = |extent: u32| ((extent as f32 * ratio).round() as u32).max(1);
        Self {
            label: label.to_string(),
            width: scale(backbuffer.0),
            height: scale(backbuffer.1),
            format,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Replace,
    Alpha,
}

/// Per-surface material values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub diffuse: [f32; 4],
    pub specular: [f32; 3],
    pub specular_power: f32,
    pub lighting: bool,
    pub fog: bool,
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            diffuse: [1.0; 4],
            specular: [0.0; 3],
            specular_power: 16.0,
            lighting: true,
            fog: true,
            uv_offset: [0.0; 2],
            uv_scale: [1.0; 2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalParams {
    /// Unit direction the light travels in
    pub direction: Vector3<f32>,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointParams {
    pub position: Point3<f32>,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub range: f32,
    pub falloff: f32,
}

/// Lights affecting one draw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightingParams {
    pub ambient: [f32; 3],
    pub directional: Option<DirectionalParams>,
    /// Nearest first, at most [`MAX_POINT_LIGHTS`]
    pub points: Vec<PointParams>,
}

pub const MAX_POINT_LIGHTS: usize = 4;

/// A resolved reflection map and the matrix that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionSample {
    pub texture: TextureHandle,
    pub view_projection: Matrix4<f32>,
}

/// Everything the device needs to draw one surface once
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshHandle,
    pub program: ProgramHandle,
    pub pass: DrawPass,
    pub world: Matrix4<f32>,
    pub view_projection: Matrix4<f32>,
    pub eye: Point3<f32>,
    pub material: MaterialParams,
    pub lighting: LightingParams,
    pub fog: Fog,
    pub cull_mode: CullMode,
    pub blend: BlendMode,
    pub depth_write: bool,
    pub diffuse_texture: Option<TextureHandle>,
    pub shadow: Option<ShadowMap>,
    pub reflection: Option<ReflectionSample>,
}

impl DrawCall {
    /// Unlit, untextured draw of `mesh` with identity transforms
    pub fn new(mesh: MeshHandle, program: ProgramHandle, pass: DrawPass) -> Self {
        Self {
            mesh,
            program,
            pass,
            world: Matrix4::identity(),
            view_projection: Matrix4::identity(),
            eye: Point3::new(0.0, 0.0, 0.0),
            material: MaterialParams::default(),
            lighting: LightingParams::default(),
            fog: Fog::default(),
            cull_mode: CullMode::CounterClockwise,
            blend: BlendMode::Replace,
            depth_write: true,
            diffuse_texture: None,
            shadow: None,
            reflection: None,
        }
    }
}

/// Abstract graphics device driven by the render pipeline
///
/// Resource operations take effect immediately. Target switches, clears, clip
/// planes and draws are frame operations that execute in call order.
pub trait GraphicsDevice {
    /// Current backbuffer size in pixels
    fn backbuffer_size(&self) -> (u32, u32);

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetHandle>;

    /// Frees an offscreen target; unknown handles are ignored
    fn release_render_target(&mut self, target: RenderTargetHandle);

    fn set_render_target(&mut self, target: RenderTarget) -> Result<()>;

    /// Clears colour (when present) and depth of the bound target
    fn clear(&mut self, color: [f32; 4]) -> Result<()>;

    /// Enables (`Some`) or disables (`None`) the user clip plane; fragments on the
    /// negative side are discarded
    fn set_clip_plane(&mut self, plane: Option<Plane>);

    fn draw(&mut self, call: &DrawCall) -> Result<()>;

    /// Makes the target's contents available for sampling
    fn resolve_render_target(&mut self, target: RenderTargetHandle) -> Result<TextureHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_target_never_empty() {
        let desc = RenderTargetDesc::scaled("shadow", (800, 600), 0.5, TargetFormat::ShadowDepth);
        assert_eq!(desc.size(), (400, 300));

        let tiny = RenderTargetDesc::scaled("tiny", (1, 1), 0.1, TargetFormat::Color);
        assert_eq!(tiny.size(), (1, 1));
    }
}
