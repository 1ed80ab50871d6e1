//! Per-draw uniform data and the bind group layouts shared by every program
//!
//! Group 0 holds one dynamic-offset [`DrawUniform`] block per draw. Group 1
//! holds the three sampled textures: diffuse, shadow map and reflection map.

use cgmath::{EuclideanSpace, Matrix, Matrix4, SquareMatrix};

use crate::gfx::camera::camera_utils::{convert_matrix4_to_array, CameraUniform};
use crate::gfx::geometry::Plane;
use crate::gfx::rendering::device::{DrawCall, MAX_POINT_LIGHTS};
use crate::wgpu_utils::{binding_types, DynamicUniformBuffer};

use super::texture_resource::TextureResource;

/// Uniform block of a single draw
///
/// Starts with the [`CameraUniform`] fields. MUST match the `DrawUniform` struct
/// in the shaders exactly; every member is a `vec4` or `mat4x4`, so no explicit
/// padding is needed.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    /// Inverse transpose of `world`
    pub normal_matrix: [[f32; 4]; 4],
    pub shadow_view_proj: [[f32; 4]; 4],
    pub reflection_view_proj: [[f32; 4]; 4],

    pub diffuse: [f32; 4],
    /// rgb, specular power
    pub specular: [f32; 4],
    pub ambient: [f32; 4],

    /// xyz travel direction, w = 1 when a directional light is present
    pub sun_direction: [f32; 4],
    pub sun_diffuse: [f32; 4],
    pub sun_specular: [f32; 4],

    /// xyz position, w range
    pub point_position: [[f32; 4]; MAX_POINT_LIGHTS],
    /// rgb, w falloff exponent
    pub point_diffuse: [[f32; 4]; MAX_POINT_LIGHTS],
    pub point_specular: [[f32; 4]; MAX_POINT_LIGHTS],

    /// rgb, w = 1 when enabled
    pub fog_color: [f32; 4],
    /// start, end
    pub fog_range: [f32; 4],

    pub clip_plane: [f32; 4],
    /// uv offset xy, uv scale zw
    pub uv_transform: [f32; 4],
    /// lit, shadowed, reflected, clipped
    pub flags: [f32; 4],
    /// point light count, textured
    pub counts: [f32; 4],
}
// 5 * 64 + 6 * 16 + 3 * 64 + 6 * 16 + 16 = 720 bytes

fn flag(enabled: bool) -> f32 {
    if enabled {
        1.0
    } else {
        0.0
    }
}

fn rgb(color: [f32; 3], w: f32) -> [f32; 4] {
    [color[0], color[1], color[2], w]
}

impl DrawUniform {
    /// Packs a draw call and the clip plane active when it was issued
    pub fn new(call: &DrawCall, clip_plane: Option<Plane>) -> Self {
        let mut uniform = Self::zeroed_with_identity();

        let camera = CameraUniform::new(call.eye, call.view_projection);
        uniform.view_position = camera.view_position;
        uniform.view_proj = camera.view_proj;
        uniform.world = convert_matrix4_to_array(call.world);
        uniform.normal_matrix = convert_matrix4_to_array(
            call.world
                .invert()
                .map(|inverse| inverse.transpose())
                .unwrap_or(call.world),
        );

        let material = &call.material;
        uniform.diffuse = material.diffuse;
        uniform.specular = rgb(material.specular, material.specular_power);
        uniform.uv_transform = [
            material.uv_offset[0],
            material.uv_offset[1],
            material.uv_scale[0],
            material.uv_scale[1],
        ];

        let lighting = &call.lighting;
        uniform.ambient = rgb(lighting.ambient, 1.0);
        if let Some(sun) = &lighting.directional {
            uniform.sun_direction = sun.direction.extend(1.0).into();
            uniform.sun_diffuse = rgb(sun.diffuse, 1.0);
            uniform.sun_specular = rgb(sun.specular, 1.0);
        }
        let points = &lighting.points[..lighting.points.len().min(MAX_POINT_LIGHTS)];
        for (i, point) in points.iter().enumerate() {
            uniform.point_position[i] = point.position.to_vec().extend(point.range).into();
            uniform.point_diffuse[i] = rgb(point.diffuse, point.falloff);
            uniform.point_specular[i] = rgb(point.specular, 1.0);
        }

        let fog_enabled = call.fog.enabled && material.fog;
        uniform.fog_color = rgb(call.fog.color, flag(fog_enabled));
        uniform.fog_range = [call.fog.start, call.fog.end, 0.0, 0.0];

        if let Some(shadow) = &call.shadow {
            uniform.shadow_view_proj = convert_matrix4_to_array(shadow.view_projection);
        }
        if let Some(reflection) = &call.reflection {
            uniform.reflection_view_proj = convert_matrix4_to_array(reflection.view_projection);
        }
        if let Some(plane) = clip_plane {
            uniform.clip_plane = plane.as_vec4().into();
        }

        uniform.flags = [
            flag(material.lighting),
            flag(call.shadow.is_some()),
            flag(call.reflection.is_some()),
            flag(clip_plane.is_some()),
        ];
        uniform.counts = [
            points.len() as f32,
            flag(call.diffuse_texture.is_some()),
            0.0,
            0.0,
        ];
        uniform
    }

    fn zeroed_with_identity() -> Self {
        let identity = convert_matrix4_to_array(Matrix4::identity());
        Self {
            view_proj: identity,
            world: identity,
            normal_matrix: identity,
            shadow_view_proj: identity,
            reflection_view_proj: identity,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

/// Bind group layouts used by every surface program
pub struct DrawBindings {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl DrawBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniform Layout"),
            entries: &[binding_types::entry(
                0,
                binding_types::uniform_dynamic(std::mem::size_of::<DrawUniform>() as u64),
            )],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Texture Layout"),
            entries: &[
                binding_types::entry(0, binding_types::texture_2d()),
                binding_types::entry(1, binding_types::sampler(wgpu::SamplerBindingType::Filtering)),
                binding_types::entry(2, binding_types::texture_depth_2d()),
                binding_types::entry(3, binding_types::sampler(wgpu::SamplerBindingType::Comparison)),
                binding_types::entry(4, binding_types::texture_2d()),
                binding_types::entry(5, binding_types::sampler(wgpu::SamplerBindingType::Filtering)),
            ],
        });

        Self {
            uniform_layout,
            texture_layout,
        }
    }

    pub fn layouts(&self) -> [&wgpu::BindGroupLayout; 2] {
        [&self.uniform_layout, &self.texture_layout]
    }

    /// Must be rebuilt whenever the uniform buffer is recreated
    pub fn uniform_group(
        &self,
        device: &wgpu::Device,
        uniforms: &DynamicUniformBuffer<DrawUniform>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniform Bind Group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding_resource(),
            }],
        })
    }

    pub fn texture_group(
        &self,
        device: &wgpu::Device,
        diffuse: &TextureResource,
        shadow: &TextureResource,
        reflection: &TextureResource,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&shadow.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&shadow.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&reflection.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&reflection.sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Vector3};

    use crate::config::Fog;
    use crate::gfx::rendering::device::{
        DirectionalParams, MeshHandle, PointParams, ProgramHandle, TextureHandle,
    };
    use crate::gfx::rendering::shadow::ShadowMap;
    use crate::gfx::surface::DrawPass;

    #[test]
    fn test_layout_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 720);
        assert_eq!(std::mem::size_of::<DrawUniform>() % 16, 0);
    }

    #[test]
    fn test_defaults_are_unlit_and_unclipped() {
        let mut call = DrawCall::new(MeshHandle(0), ProgramHandle(0), DrawPass::Normal);
        call.material.lighting = false;
        let uniform = DrawUniform::new(&call, None);

        assert_eq!(uniform.flags, [0.0; 4]);
        assert_eq!(uniform.counts, [0.0; 4]);
        assert_eq!(uniform.sun_direction[3], 0.0);
        assert_eq!(uniform.uv_transform, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(uniform.shadow_view_proj, convert_matrix4_to_array(Matrix4::identity()));
    }

    #[test]
    fn test_lights_fog_and_clip_are_packed() {
        let mut call = DrawCall::new(MeshHandle(0), ProgramHandle(0), DrawPass::Normal);
        call.eye = Point3::new(1.0, 2.0, 3.0);
        call.fog = Fog::new(Vector3::new(0.5, 0.5, 0.5), 10.0, 20.0);
        call.diffuse_texture = Some(TextureHandle(7));
        call.lighting.ambient = [0.1, 0.2, 0.3];
        call.lighting.directional = Some(DirectionalParams {
            direction: -Vector3::unit_y(),
            diffuse: [1.0; 3],
            specular: [0.5; 3],
        });
        call.lighting.points = vec![
            PointParams {
                position: Point3::new(4.0, 5.0, 6.0),
                diffuse: [1.0, 0.0, 0.0],
                specular: [0.0; 3],
                range: 8.0,
                falloff: 2.0,
            };
            2
        ];
        call.shadow = Some(ShadowMap {
            texture: TextureHandle(1),
            view_projection: Matrix4::from_scale(2.0),
        });
        let plane = Plane::from_point_normal(Point3::new(0.0, 1.5, 0.0), Vector3::unit_y());

        let uniform = DrawUniform::new(&call, Some(plane));

        assert_eq!(uniform.view_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.ambient, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(uniform.sun_direction, [0.0, -1.0, 0.0, 1.0]);
        assert_eq!(uniform.point_position[1], [4.0, 5.0, 6.0, 8.0]);
        assert_eq!(uniform.point_diffuse[0], [1.0, 0.0, 0.0, 2.0]);
        assert_eq!(uniform.point_position[2], [0.0; 4]);
        assert_eq!(uniform.fog_color[3], 1.0);
        assert_eq!(uniform.fog_range[..2], [10.0, 20.0]);
        assert_eq!(uniform.clip_plane, [0.0, 1.0, 0.0, -1.5]);
        assert_eq!(uniform.flags, [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(uniform.counts[..2], [2.0, 1.0]);
        assert_eq!(uniform.shadow_view_proj, convert_matrix4_to_array(Matrix4::from_scale(2.0)));
    }

    #[test]
    fn test_surface_fog_opt_out_wins() {
        let mut call = DrawCall::new(MeshHandle(0), ProgramHandle(0), DrawPass::Normal);
        call.fog = Fog::new(Vector3::new(0.5, 0.5, 0.5), 10.0, 20.0);
        call.material.fog = false;
        assert_eq!(DrawUniform::new(&call, None).fog_color[3], 0.0);
    }
}
