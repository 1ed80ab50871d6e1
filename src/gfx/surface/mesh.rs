use cgmath::Matrix4;

use crate::error::Result;
use crate::gfx::geometry::Aabb;
use crate::gfx::rendering::device::{MeshHandle, TextureHandle};

use super::{
    DrawContext, DrawPass, DrawProperties, DrawStyle, Surface, SurfacePrograms, SurfaceProperties,
};

/// A finite, lit mesh; casts shadows and shows up in reflections by default
pub struct MeshSurface {
    properties: SurfaceProperties,
    mesh: MeshHandle,
    local_bounds: Aabb,
    programs: SurfacePrograms,
    diffuse_texture: Option<TextureHandle>,
}

impl MeshSurface {
    pub fn new(mesh: MeshHandle, local_bounds: Aabb, programs: SurfacePrograms) -> Self {
        Self {
            properties: SurfaceProperties::new(DrawStyle::Opaque)
                .with_draw_properties(DrawProperties::SHADOWING | DrawProperties::REFLECTING),
            mesh,
            local_bounds,
            programs,
            diffuse_texture: None,
        }
    }

    pub fn with_properties(mut self, properties: SurfaceProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }
}

impl Surface for MeshSurface {
    fn properties(&self) -> &SurfaceProperties {
        &self.properties
    }

    fn bounding_box(&self, world: &Matrix4<f32>) -> Aabb {
        self.local_bounds.transformed(world)
    }

    fn draw(&self, world: &Matrix4<f32>, ctx: &mut DrawContext<'_>) -> Result<()> {
        if ctx.pass == DrawPass::DirectionalShadow
            && !self.has_draw_properties(DrawProperties::SHADOWING)
        {
            return Ok(());
        }

        let mut call =
            self.properties
                .draw_call(self.mesh, self.programs.for_pass(ctx.pass), *world, ctx);
        if ctx.pass == DrawPass::Normal {
            call.diffuse_texture = self.diffuse_texture;
        }
        ctx.device.draw(&call)
    }
}
