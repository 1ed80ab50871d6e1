//! wgpu implementation of [`GraphicsDevice`]
//!
//! Resource calls (meshes, textures, render targets) act on the GPU right away.
//! Frame calls are recorded: each draw packs its [`DrawUniform`] into a dynamic
//! uniform buffer and captures the views it binds. [`WgpuBackend::submit`] then
//! replays the frame as one render pass per run of commands aimed at the same
//! target, in call order, inside a single command encoder.

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::error::{RenderError, Result};
use crate::gfx::geometry::Plane;
use crate::gfx::resources::catalog::ResourceCatalog;
use crate::gfx::resources::draw_bindings::{DrawBindings, DrawUniform};
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::resources::vertex::MeshData;
use crate::wgpu_utils::DynamicUniformBuffer;

use super::device::{
    DrawCall, GraphicsDevice, MeshHandle, ProgramHandle, RenderTarget, RenderTargetDesc,
    RenderTargetHandle, TargetFormat, TextureHandle,
};
use super::pipeline_manager::{PipelineKey, PipelineManager, PipelineStats};
use super::shaders::{SHADOW_SHADER, SURFACE_SHADER};

/// Draw blocks the uniform buffer starts with; it grows on demand
const INITIAL_DRAW_CAPACITY: usize = 256;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuTarget {
    desc: RenderTargetDesc,
    /// Colour attachment; `None` for shadow-depth targets
    color: Option<TextureResource>,
    depth: TextureResource,
    texture: TextureHandle,
}

impl GpuTarget {
    /// Texture sampled after a resolve
    fn sampled(&self) -> &TextureResource {
        self.color.as_ref().unwrap_or(&self.depth)
    }
}

enum TextureSource {
    Image(TextureResource),
    Target(RenderTargetHandle),
}

/// Views a pass renders into; the backbuffer view is only known at submit
#[derive(Clone)]
struct Attachments {
    color: Option<wgpu::TextureView>,
    depth: wgpu::TextureView,
    color_format: Option<wgpu::TextureFormat>,
    backbuffer: bool,
}

struct RecordedDraw {
    pipeline: PipelineKey,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_offset: u32,
    texture_key: [Option<TextureHandle>; 3],
    textures: [TextureResource; 3],
}

enum FrameCommand<A, D> {
    Bind(A),
    Clear([f32; 4]),
    Draw(D),
}

/// One render pass worth of commands
#[derive(Debug, PartialEq)]
struct Segment<A, D> {
    attachments: A,
    clear: Option<[f32; 4]>,
    draws: Vec<D>,
}

type RecordedFrame = Vec<FrameCommand<Attachments, RecordedDraw>>;

/// Samplable 1x1 stand-ins for missing textures
struct Fallbacks {
    white: TextureResource,
    black: TextureResource,
    /// Cleared to the far plane, so every comparison passes
    shadow: TextureResource,
}

/// Headless or windowed wgpu renderer behind the [`GraphicsDevice`] seam
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    backbuffer_size: (u32, u32),
    backbuffer_format: wgpu::TextureFormat,
    /// Owned colour target when there is no window to present to
    offscreen_backbuffer: Option<TextureResource>,
    depth: TextureResource,

    bindings: DrawBindings,
    pipelines: PipelineManager,
    uniforms: DynamicUniformBuffer<DrawUniform>,
    uniform_group: wgpu::BindGroup,
    fallbacks: Fallbacks,
    catalog: ResourceCatalog,

    meshes: HashMap<MeshHandle, GpuMesh>,
    textures: HashMap<TextureHandle, TextureSource>,
    targets: HashMap<RenderTargetHandle, GpuTarget>,
    next_mesh: u32,
    next_texture: u32,
    next_target: u32,

    current: Attachments,
    clip_plane: Option<Plane>,
    frame: RecordedFrame,
}

impl WgpuBackend {
    /// Creates a backend that renders into an owned offscreen colour texture
    pub fn new_headless(width: u32, height: u32) -> Result<Self> {
        pollster::block_on(Self::request_headless(width, height))
    }

    async fn request_headless(width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Backend(format!("failed to request adapter: {}", e)))?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Tarn Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::Backend(format!("failed to request device: {}", e)))?;

        let mut backend = Self::new(
            Arc::new(device),
            Arc::new(queue),
            TextureResource::COLOR_FORMAT,
            width,
            height,
        )?;
        backend.offscreen_backbuffer = Some(TextureResource::create_color_target(
            &backend.device,
            width,
            height,
            "Offscreen Backbuffer",
        ));
        Ok(backend)
    }

    /// Creates a backend on an existing device; present with [`submit`](Self::submit)
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        backbuffer_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidArgument(format!(
                "backbuffer size {}x{} is empty",
                width, height
            )));
        }

        let bindings = DrawBindings::new(&device);
        let mut pipelines = PipelineManager::new(device.clone(), &bindings.layouts());
        let uniforms = DynamicUniformBuffer::new(&device, INITIAL_DRAW_CAPACITY);
        let uniform_group = bindings.uniform_group(&device, &uniforms);
        let depth = TextureResource::create_depth_texture(&device, width, height, "Backbuffer Depth");

        let fallbacks = Fallbacks {
            white: TextureResource::create_solid(&device, &queue, [255; 4], "White Fallback")?,
            black: TextureResource::create_solid(&device, &queue, [0, 0, 0, 255], "Black Fallback")?,
            shadow: TextureResource::create_shadow_map(&device, 1, 1, "Shadow Fallback"),
        };
        clear_depth(&device, &queue, &fallbacks.shadow.view);

        let mut catalog = ResourceCatalog::new();
        catalog.register_program("surface", pipelines.register_program("surface", SURFACE_SHADER, false));
        catalog.register_program("shadow", pipelines.register_program("shadow", SHADOW_SHADER, true));

        let current = Attachments {
            color: None,
            depth: depth.view.clone(),
            color_format: Some(backbuffer_format),
            backbuffer: true,
        };

        log::info!("Created {}x{} wgpu backend ({:?})", width, height, backbuffer_format);
        Ok(Self {
            device,
            queue,
            backbuffer_size: (width, height),
            backbuffer_format,
            offscreen_backbuffer: None,
            depth,
            bindings,
            pipelines,
            uniforms,
            uniform_group,
            fallbacks,
            catalog,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            targets: HashMap::new(),
            next_mesh: 0,
            next_texture: 0,
            next_target: 0,
            current,
            clip_plane: None,
            frame: Vec::new(),
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Built-in programs ("surface", "shadow") plus everything uploaded by name
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        self.pipelines.get_stats()
    }

    /// The owned backbuffer of a headless backend
    pub fn offscreen_backbuffer(&self) -> Option<&TextureResource> {
        self.offscreen_backbuffer.as_ref()
    }

    /// Recreates the backbuffer depth (and owned colour) attachments
    ///
    /// Offscreen targets sized from the backbuffer are recreated by their owners
    /// the next time they draw.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.backbuffer_size {
            return;
        }
        self.backbuffer_size = (width, height);
        self.depth = TextureResource::create_depth_texture(&self.device, width, height, "Backbuffer Depth");
        if self.offscreen_backbuffer.is_some() {
            self.offscreen_backbuffer = Some(TextureResource::create_color_target(
                &self.device,
                width,
                height,
                "Offscreen Backbuffer",
            ));
        }
        if self.current.backbuffer {
            self.current.depth = self.depth.view.clone();
        }
        log::info!("Resized backbuffer to {}x{}", width, height);
    }

    /// Registers a WGSL program under `name`
    pub fn register_program(&mut self, name: &str, source: &str, vertex_only: bool) -> ProgramHandle {
        let program = self.pipelines.register_program(name, source, vertex_only);
        self.catalog.register_program(name, program);
        program
    }

    /// Uploads an indexed mesh and registers it under `name`
    pub fn upload_mesh(&mut self, name: &str, data: &MeshData) -> Result<MeshHandle> {
        if data.is_empty() || data.vertices.is_empty() {
            return Err(RenderError::InvalidArgument(format!("mesh '{}' is empty", name)));
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(
            handle,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: data.indices.len() as u32,
            },
        );
        self.catalog.register_mesh(name, handle);
        log::debug!("Uploaded mesh '{}' ({} indices)", name, data.indices.len());
        Ok(handle)
    }

    /// Uploads an RGBA8 image and registers it under `name`
    pub fn upload_texture_rgba(
        &mut self,
        name: &str,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle> {
        let texture =
            TextureResource::create_from_rgba_data(&self.device, &self.queue, data, width, height, name)?;
        let handle = self.allocate_texture(TextureSource::Image(texture));
        self.catalog.register_texture(name, handle);
        Ok(handle)
    }

    /// Replays the recorded frame into the owned offscreen backbuffer
    pub fn submit_offscreen(&mut self) -> Result<()> {
        let view = self
            .offscreen_backbuffer
            .as_ref()
            .map(|backbuffer| backbuffer.view.clone())
            .ok_or_else(|| RenderError::Backend("no offscreen backbuffer to submit to".to_string()))?;
        self.submit(&view)
    }

    /// Replays the recorded frame with `backbuffer` as the backbuffer colour attachment
    pub fn submit(&mut self, backbuffer: &wgpu::TextureView) -> Result<()> {
        let commands = std::mem::take(&mut self.frame);
        let draw_count = self.uniforms.len();

        if self.uniforms.upload(&self.device, &self.queue) {
            self.uniform_group = self.bindings.uniform_group(&self.device, &self.uniforms);
        }
        self.uniforms.reset();
        self.clip_plane = None;

        let segments = segment(commands, self.backbuffer_attachments());
        let texture_groups = self.texture_groups(&segments);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        for segment in &segments {
            let attachments = &segment.attachments;
            let color_view = if attachments.backbuffer {
                Some(backbuffer)
            } else {
                attachments.color.as_ref()
            };

            let color_load = match segment.clear {
                Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: a as f64,
                }),
                None => wgpu::LoadOp::Load,
            };
            let depth_load = match segment.clear {
                Some(_) => wgpu::LoadOp::Clear(1.0),
                None => wgpu::LoadOp::Load,
            };

            let color_attachments = [color_view.map(|view| wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
            })];

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Surface Pass"),
                color_attachments: if color_view.is_some() {
                    &color_attachments
                } else {
                    &[]
                },
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &attachments.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &segment.draws {
                let pipeline = self
                    .pipelines
                    .cached(&draw.pipeline)
                    .ok_or_else(|| RenderError::Backend(format!("no pipeline for {:?}", draw.pipeline)))?;
                let texture_group = texture_groups
                    .get(&draw.texture_key)
                    .ok_or_else(|| RenderError::Backend("missing texture bind group".to_string()))?;

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_group, &[draw.uniform_offset]);
                render_pass.set_bind_group(1, texture_group, &[]);
                render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
                render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        log::trace!("Submitted {} passes, {} draws", segments.len(), draw_count);
        Ok(())
    }

    fn backbuffer_attachments(&self) -> Attachments {
        Attachments {
            color: None,
            depth: self.depth.view.clone(),
            color_format: Some(self.backbuffer_format),
            backbuffer: true,
        }
    }

    /// One bind group per distinct texture combination in the frame
    fn texture_groups(
        &self,
        segments: &[Segment<Attachments, RecordedDraw>],
    ) -> HashMap<[Option<TextureHandle>; 3], wgpu::BindGroup> {
        let mut groups = HashMap::new();
        for draw in segments.iter().flat_map(|segment| &segment.draws) {
            groups.entry(draw.texture_key).or_insert_with(|| {
                let [diffuse, shadow, reflection] = &draw.textures;
                self.bindings
                    .texture_group(&self.device, diffuse, shadow, reflection)
            });
        }
        groups
    }

    fn allocate_texture(&mut self, source: TextureSource) -> TextureHandle {
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(handle, source);
        handle
    }

    fn check_target(&self, target: RenderTargetHandle) -> Result<&GpuTarget> {
        self.targets
            .get(&target)
            .ok_or(RenderError::InvalidRenderTarget(target))
    }

    fn texture(&self, handle: TextureHandle) -> Result<&TextureResource> {
        let unknown = || RenderError::unknown_resource("texture", format!("{:?}", handle));
        match self.textures.get(&handle).ok_or_else(unknown)? {
            TextureSource::Image(texture) => Ok(texture),
            TextureSource::Target(target) => self
                .targets
                .get(target)
                .map(GpuTarget::sampled)
                .ok_or_else(unknown),
        }
    }

    fn is_depth_texture(&self, handle: TextureHandle) -> bool {
        matches!(
            self.textures.get(&handle),
            Some(TextureSource::Target(target))
                if self.targets.get(target).is_some_and(|t| t.color.is_none())
        )
    }

    fn bound_textures(&self, call: &DrawCall) -> Result<[TextureResource; 3]> {
        let diffuse = match call.diffuse_texture {
            Some(handle) => self.texture(handle)?,
            None => &self.fallbacks.white,
        };
        let shadow = match &call.shadow {
            Some(map) if !self.is_depth_texture(map.texture) => {
                return Err(RenderError::InvalidArgument(format!(
                    "shadow texture {:?} is not a shadow-depth target",
                    map.texture
                )))
            }
            Some(map) => self.texture(map.texture)?,
            None => &self.fallbacks.shadow,
        };
        let reflection = match &call.reflection {
            Some(sample) => self.texture(sample.texture)?,
            None => &self.fallbacks.black,
        };
        Ok([diffuse.clone(), shadow.clone(), reflection.clone()])
    }
}

/// Splits the recorded frame into render passes
///
/// A bind or a clear after draws starts a new pass. A clear that opens a pass
/// becomes that pass's load op.
fn segment<A: Clone, D>(commands: Vec<FrameCommand<A, D>>, backbuffer: A) -> Vec<Segment<A, D>> {
    let mut segments = Vec::new();
    let mut current = Segment {
        attachments: backbuffer,
        clear: None,
        draws: Vec::new(),
    };
    let mut started = false;

    for command in commands {
        match command {
            FrameCommand::Bind(attachments) => {
                if started {
                    segments.push(current);
                }
                current = Segment {
                    attachments,
                    clear: None,
                    draws: Vec::new(),
                };
                started = true;
            }
            FrameCommand::Clear(color) => {
                if !current.draws.is_empty() {
                    let attachments = current.attachments.clone();
                    segments.push(current);
                    current = Segment {
                        attachments,
                        clear: None,
                        draws: Vec::new(),
                    };
                }
                current.clear = Some(color);
                started = true;
            }
            FrameCommand::Draw(draw) => {
                current.draws.push(draw);
                started = true;
            }
        }
    }

    if started {
        segments.push(current);
    }
    segments
}

/// Clears a depth attachment to the far plane with an empty pass
fn clear_depth(device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView) {
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Depth Clear Encoder"),
    });
    {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Depth Clear"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }
    queue.submit(std::iter::once(encoder.finish()));
}

impl GraphicsDevice for WgpuBackend {
    fn backbuffer_size(&self) -> (u32, u32) {
        self.backbuffer_size
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RenderError::InvalidArgument(format!(
                "render target '{}' has zero size",
                desc.label
            )));
        }

        let (color, depth) = match desc.format {
            TargetFormat::Color => (
                Some(TextureResource::create_color_target(
                    &self.device,
                    desc.width,
                    desc.height,
                    &desc.label,
                )),
                TextureResource::create_depth_texture(
                    &self.device,
                    desc.width,
                    desc.height,
                    &format!("{} Depth", desc.label),
                ),
            ),
            TargetFormat::ShadowDepth => (
                None,
                TextureResource::create_shadow_map(&self.device, desc.width, desc.height, &desc.label),
            ),
        };

        let target = RenderTargetHandle(self.next_target);
        self.next_target += 1;
        let texture = self.allocate_texture(TextureSource::Target(target));
        self.targets.insert(
            target,
            GpuTarget {
                desc: desc.clone(),
                color,
                depth,
                texture,
            },
        );
        log::debug!("Created render target '{}' {:?}", desc.label, target);
        Ok(target)
    }

    fn release_render_target(&mut self, target: RenderTargetHandle) {
        // Recorded commands hold their own references to the views
        if let Some(released) = self.targets.remove(&target) {
            self.textures.remove(&released.texture);
            log::debug!("Released render target '{}'", released.desc.label);
        }
    }

    fn set_render_target(&mut self, target: RenderTarget) -> Result<()> {
        let attachments = match target {
            RenderTarget::Backbuffer => self.backbuffer_attachments(),
            RenderTarget::Offscreen(handle) => {
                let target = self.check_target(handle)?;
                Attachments {
                    color: target.color.as_ref().map(|color| color.view.clone()),
                    depth: target.depth.view.clone(),
                    color_format: target.color.as_ref().map(|_| TextureResource::COLOR_FORMAT),
                    backbuffer: false,
                }
            }
        };
        self.current = attachments.clone();
        self.frame.push(FrameCommand::Bind(attachments));
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<()> {
        self.frame.push(FrameCommand::Clear(color));
        Ok(())
    }

    fn set_clip_plane(&mut self, plane: Option<Plane>) {
        self.clip_plane = plane;
    }

    fn draw(&mut self, call: &DrawCall) -> Result<()> {
        let mesh = self
            .meshes
            .get(&call.mesh)
            .ok_or_else(|| RenderError::unknown_resource("mesh", format!("{:?}", call.mesh)))?;
        let (vertex_buffer, index_buffer, index_count) =
            (mesh.vertex_buffer.clone(), mesh.index_buffer.clone(), mesh.index_count);

        let textures = self.bound_textures(call)?;
        let pipeline = PipelineKey {
            program: call.program,
            color_format: self.current.color_format,
            blend: call.blend,
            cull_mode: call.cull_mode,
            depth_write: call.depth_write,
        };
        self.pipelines.pipeline(pipeline)?;

        let uniform_offset = self.uniforms.push(&DrawUniform::new(call, self.clip_plane));
        self.frame.push(FrameCommand::Draw(RecordedDraw {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count,
            uniform_offset,
            texture_key: [
                call.diffuse_texture,
                call.shadow.map(|map| map.texture),
                call.reflection.map(|sample| sample.texture),
            ],
            textures,
        }));
        Ok(())
    }

    fn resolve_render_target(&mut self, target: RenderTargetHandle) -> Result<TextureHandle> {
        Ok(self.check_target(target)?.texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::surface::DrawPass;

    type Command = FrameCommand<&'static str, u32>;

    fn pass(attachments: &'static str, clear: Option<[f32; 4]>, draws: Vec<u32>) -> Segment<&'static str, u32> {
        Segment {
            attachments,
            clear,
            draws,
        }
    }

    #[test]
    fn test_segments_follow_target_switches() {
        let commands: Vec<Command> = vec![
            FrameCommand::Bind("shadow"),
            FrameCommand::Clear([1.0; 4]),
            FrameCommand::Draw(0),
            FrameCommand::Draw(1),
            FrameCommand::Bind("reflection"),
            FrameCommand::Clear([0.0; 4]),
            FrameCommand::Draw(2),
            FrameCommand::Bind("backbuffer"),
            FrameCommand::Draw(3),
        ];

        assert_eq!(
            segment(commands, "backbuffer"),
            vec![
                pass("shadow", Some([1.0; 4]), vec![0, 1]),
                pass("reflection", Some([0.0; 4]), vec![2]),
                pass("backbuffer", None, vec![3]),
            ]
        );
    }

    #[test]
    fn test_clear_after_draws_starts_new_pass() {
        let commands: Vec<Command> = vec![
            FrameCommand::Draw(0),
            FrameCommand::Clear([0.5; 4]),
            FrameCommand::Draw(1),
        ];

        assert_eq!(
            segment(commands, "backbuffer"),
            vec![
                pass("backbuffer", None, vec![0]),
                pass("backbuffer", Some([0.5; 4]), vec![1]),
            ]
        );
    }

    #[test]
    fn test_bind_only_frame_still_clears() {
        let commands: Vec<Command> = vec![FrameCommand::Bind("reflection"), FrameCommand::Clear([0.0; 4])];
        assert_eq!(
            segment(commands, "backbuffer"),
            vec![pass("reflection", Some([0.0; 4]), vec![])]
        );
        assert!(segment(Vec::<Command>::new(), "backbuffer").is_empty());
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn test_headless_frame_submits() {
        let mut backend = WgpuBackend::new_headless(64, 64).unwrap();
        let cube = backend.upload_mesh("cube", &generate_cube().to_mesh_data()).unwrap();
        let program = backend.catalog().program("surface").unwrap();

        backend.set_render_target(RenderTarget::Backbuffer).unwrap();
        backend.clear([0.0, 0.0, 0.0, 1.0]).unwrap();
        backend.draw(&DrawCall::new(cube, program, DrawPass::Normal)).unwrap();
        backend.submit_offscreen().unwrap();

        assert_eq!(backend.pipeline_stats().total_pipelines, 1);
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn test_released_target_is_rejected() {
        let mut backend = WgpuBackend::new_headless(64, 64).unwrap();
        let desc = RenderTargetDesc::scaled("Reflection Map", (64, 64), 0.5, TargetFormat::Color);
        let target = backend.create_render_target(&desc).unwrap();
        let texture = backend.resolve_render_target(target).unwrap();
        backend.release_render_target(target);

        assert!(matches!(
            backend.set_render_target(RenderTarget::Offscreen(target)),
            Err(RenderError::InvalidRenderTarget(t)) if t == target
        ));
        assert!(backend.texture(texture).is_err());
    }
}
