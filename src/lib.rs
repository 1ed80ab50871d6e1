// src/lib.rs
//! Tarn
//!
//! A two-phase 3D scene renderer built on wgpu: offscreen passes (directional
//! shadow maps, planar water reflections) run before the main pass, and the
//! main pass buckets surfaces into prioritized, opaque and transparent draws.

pub mod config;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use config::RenderSettings;
pub use error::{RenderError, Result};
