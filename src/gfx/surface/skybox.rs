use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};

use crate::error::Result;
use crate::gfx::geometry::Aabb;
use crate::gfx::rendering::device::{MeshHandle, ProgramHandle, TextureHandle};

use super::{CullMode, DrawContext, DrawPass, DrawProperties, DrawStyle, Surface, SurfaceProperties};

/// Sky cube that follows whichever camera draws it
///
/// The owner's transform is ignored: the cube is re-centred on the drawing
/// camera each time, which is why it is split off and drawn unclipped during
/// reflection passes.
pub struct SkyboxSurface {
    properties: SurfaceProperties,
    mesh: MeshHandle,
    program: ProgramHandle,
    texture: Option<TextureHandle>,
    scale: f32,
}

impl SkyboxSurface {
    pub fn new(mesh: MeshHandle, program: ProgramHandle) -> Self {
        Self {
            properties: SurfaceProperties::new(DrawStyle::Prioritized)
                .boundless()
                .with_draw_properties(
                    DrawProperties::DEPENDANT_TRANSFORM | DrawProperties::REFLECTING,
                )
                .with_cull_mode(CullMode::None)
                .with_lighting(false)
                .with_fog(false)
                .with_priority(-100),
            mesh,
            program,
            texture: None,
            scale: 500.0,
        }
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Half extent of the cube in world units
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.properties.priority = priority;
        self
    }

    /// World transform used when drawn from `eye`
    pub fn placement(&self, eye: Point3<f32>) -> Matrix4<f32> {
        Matrix4::from_translation(eye.to_vec()) * Matrix4::from_scale(self.scale)
    }
}

impl Surface for SkyboxSurface {
    fn properties(&self) -> &SurfaceProperties {
        &self.properties
    }

    fn bounding_box(&self, world: &Matrix4<f32>) -> Aabb {
        Aabb::from_center(Point3::origin(), Vector3::new(1.0, 1.0, 1.0) * self.scale).transformed(world)
    }

    fn draw(&self, _world: &Matrix4<f32>, ctx: &mut DrawContext<'_>) -> Result<()> {
        if ctx.pass != DrawPass::Normal {
            return Ok(());
        }

        let mut call = self.properties.draw_call(
            self.mesh,
            self.program,
            self.placement(ctx.camera.position()),
            ctx,
        );
        call.depth_write = false;
        call.diffuse_texture = self.texture;
        ctx.device.draw(&call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Transform;

    #[test]
    fn test_placement_follows_eye() {
        let skybox = SkyboxSurface::new(MeshHandle(0), ProgramHandle(0)).with_scale(10.0);
        let world = skybox.placement(Point3::new(3.0, 4.0, 5.0));

        assert_eq!(world.transform_point(Point3::origin()), Point3::new(3.0, 4.0, 5.0));
        assert_eq!(
            world.transform_point(Point3::new(1.0, 0.0, 0.0)),
            Point3::new(13.0, 4.0, 5.0)
        );
    }

    #[test]
    fn test_default_classification() {
        let skybox = SkyboxSurface::new(MeshHandle(0), ProgramHandle(0));
        assert!(skybox.is_boundless());
        assert_eq!(skybox.properties().style, DrawStyle::Prioritized);
        assert!(skybox.has_draw_properties(DrawProperties::DEPENDANT_TRANSFORM));
        assert!(!skybox.has_draw_properties(DrawProperties::SHADOWING));
    }
}
