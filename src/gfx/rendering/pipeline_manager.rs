//! Render pipeline management system for wgpu
//!
//! Programs are WGSL modules registered once. Pipelines are created lazily for
//! every combination of program and render state a draw asks for, then cached.

use std::collections::HashMap;
use std::sync::Arc;
use wgpu::*;

use crate::error::{RenderError, Result};
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::resources::vertex::Vertex3D;
use crate::gfx::surface::CullMode;

use super::device::{BlendMode, ProgramHandle};

/// Render state a pipeline is specialised for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: ProgramHandle,
    /// `None` for depth-only targets
    pub color_format: Option<TextureFormat>,
    pub blend: BlendMode,
    pub cull_mode: CullMode,
    pub depth_write: bool,
}

/// A registered shader program
#[derive(Debug)]
struct ProgramConfig {
    label: String,
    module: ShaderModule,
    /// Depth-only programs have no fragment stage (shadow pass)
    vertex_only: bool,
}

/// Culling face for the pipeline; counter-clockwise triangles are front facing
pub fn cull_face(cull_mode: CullMode) -> Option<Face> {
    match cull_mode {
        CullMode::None => None,
        CullMode::CounterClockwise => Some(Face::Back),
        CullMode::Clockwise => Some(Face::Front),
    }
}

pub fn blend_state(blend: BlendMode) -> BlendState {
    match blend {
        BlendMode::Replace => BlendState::REPLACE,
        BlendMode::Alpha => BlendState::ALPHA_BLENDING,
    }
}

/// Manages render pipelines with caching and lazy creation
///
/// - Lazy pipeline creation (only created when first requested)
/// - One shared set of bind group layouts for every program
pub struct PipelineManager {
    device: Arc<Device>,
    layout: PipelineLayout,
    programs: Vec<ProgramConfig>,
    pipelines: HashMap<PipelineKey, RenderPipeline>,
}

impl PipelineManager {
    /// Creates a new pipeline manager whose pipelines all use `bind_group_layouts`
    pub fn new(device: Arc<Device>, bind_group_layouts: &[&BindGroupLayout]) -> Self {
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Surface Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        Self {
            device,
            layout,
            programs: Vec::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL program and returns its handle
    ///
    /// The module must export `vs_main`, and `fs_main` unless `vertex_only`.
    pub fn register_program(&mut self, name: &str, source: &str, vertex_only: bool) -> ProgramHandle {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.programs.push(ProgramConfig {
            label: name.to_string(),
            module,
            vertex_only,
        });
        log::info!("Registered program '{}'", name);
        ProgramHandle(self.programs.len() as u32 - 1)
    }

    /// Gets or creates the pipeline for `key`
    pub fn pipeline(&mut self, key: PipelineKey) -> Result<&RenderPipeline> {
        if !self.pipelines.contains_key(&key) {
            let pipeline = self.create_pipeline(&key)?;
            self.pipelines.insert(key, pipeline);
        }
        self.pipelines
            .get(&key)
            .ok_or_else(|| RenderError::Backend("pipeline cache lost an entry".to_string()))
    }

    /// A pipeline previously created by [`pipeline`](Self::pipeline)
    pub fn cached(&self, key: &PipelineKey) -> Option<&RenderPipeline> {
        self.pipelines.get(key)
    }

    fn program(&self, program: ProgramHandle) -> Result<&ProgramConfig> {
        self.programs
            .get(program.0 as usize)
            .ok_or_else(|| RenderError::unknown_resource("program", format!("{:?}", program)))
    }

    fn create_pipeline(&self, key: &PipelineKey) -> Result<RenderPipeline> {
        let config = self.program(key.program)?;
        let label = format!("{} Pipeline", config.label);

        let color_targets = [key.color_format.map(|format| ColorTargetState {
            format,
            blend: Some(blend_state(key.blend)),
            write_mask: ColorWrites::ALL,
        })];

        // Vertex-only programs (shadow pass) and depth-only targets skip the fragment stage
        let fragment = if config.vertex_only || key.color_format.is_none() {
            None
        } else {
            Some(FragmentState {
                module: &config.module,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: PipelineCompilationOptions::default(),
            })
        };

        let pipeline = self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.layout),
            vertex: VertexState {
                module: &config.module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment,
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: cull_face(key.cull_mode),
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureResource::DEPTH_FORMAT,
                depth_write_enabled: key.depth_write,
                depth_compare: CompareFunction::LessEqual,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!("Created pipeline for {:?}", key);
        Ok(pipeline)
    }

    /// Returns pipeline manager statistics
    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            loaded_programs: self.programs.len(),
        }
    }
}

/// Statistics about pipeline manager state
#[derive(Debug)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub loaded_programs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cull_face_mapping() {
        assert_eq!(cull_face(CullMode::None), None);
        assert_eq!(cull_face(CullMode::CounterClockwise), Some(Face::Back));
        assert_eq!(cull_face(CullMode::Clockwise), Some(Face::Front));
    }

    #[test]
    fn test_blend_mapping() {
        assert_eq!(blend_state(BlendMode::Replace), BlendState::REPLACE);
        assert_eq!(blend_state(BlendMode::Alpha), BlendState::ALPHA_BLENDING);
    }
}
