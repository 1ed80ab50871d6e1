//! Core rendering functionality
//!
//! The [`GraphicsDevice`] seam and its two implementations, the shadow pass, and
//! the drawer that buckets, sorts and draws surfaces.

pub mod command_list;
pub mod device;
pub mod pipeline_manager;
pub mod shaders;
pub mod shadow;
pub mod surface_drawer;
pub mod wgpu_backend;

// Re-export main types
pub use command_list::{CommandList, RenderCommand};
pub use device::{
    BlendMode, DrawCall, GraphicsDevice, LightingParams, MaterialParams, MeshHandle, ProgramHandle,
    RenderTarget, RenderTargetDesc, RenderTargetHandle, TargetFormat, TextureHandle,
};
pub use pipeline_manager::{PipelineKey, PipelineManager, PipelineStats};
pub use shadow::{ShadowMap, ShadowPass};
pub use surface_drawer::{DrawStats, SurfaceDrawer};
pub use wgpu_backend::WgpuBackend;
