//! Recording graphics device
//!
//! [`CommandList`] validates and records every call it receives instead of
//! touching a GPU. It backs the test suite and is handy for dumping what a frame
//! actually did.

use std::collections::HashMap;

use crate::error::{RenderError, Result};
use crate::gfx::geometry::Plane;

use super::device::{
    DrawCall, GraphicsDevice, RenderTarget, RenderTargetDesc, RenderTargetHandle, TextureHandle,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    CreateTarget {
        target: RenderTargetHandle,
        desc: RenderTargetDesc,
    },
    ReleaseTarget(RenderTargetHandle),
    SetTarget(RenderTarget),
    Clear([f32; 4]),
    SetClipPlane(Option<Plane>),
    Draw(DrawCall),
    Resolve {
        target: RenderTargetHandle,
        texture: TextureHandle,
    },
}

/// A recorded draw together with the state it was issued under
#[derive(Debug, Clone, Copy)]
pub struct RecordedDraw<'a> {
    /// Index of the draw command in [`CommandList::commands`]
    pub index: usize,
    pub target: RenderTarget,
    pub clip_plane: Option<Plane>,
    pub call: &'a DrawCall,
}

struct LiveTarget {
    desc: RenderTargetDesc,
    texture: TextureHandle,
}

pub struct CommandList {
    backbuffer: (u32, u32),
    commands: Vec<RenderCommand>,
    targets: HashMap<RenderTargetHandle, LiveTarget>,
    next_target: u32,
    next_texture: u32,
}

impl CommandList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            backbuffer: (width, height),
            commands: Vec::new(),
            targets: HashMap::new(),
            next_target: 0,
            next_texture: 0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backbuffer = (width, height);
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Drops recorded commands; live targets stay live
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn live_target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_live(&self, target: RenderTargetHandle) -> bool {
        self.targets.contains_key(&target)
    }

    pub fn target_desc(&self, target: RenderTargetHandle) -> Option<&RenderTargetDesc> {
        self.targets.get(&target).map(|live| &live.desc)
    }

    /// Every draw with the target and clip plane active when it was issued
    pub fn draws(&self) -> Vec<RecordedDraw<'_>> {
        let mut target = RenderTarget::Backbuffer;
        let mut clip_plane = None;
        let mut draws = Vec::new();

        for (index, command) in self.commands.iter().enumerate() {
            match command {
                RenderCommand::SetTarget(t) => target = *t,
                RenderCommand::SetClipPlane(p) => clip_plane = *p,
                RenderCommand::Draw(call) => draws.push(RecordedDraw {
                    index,
                    target,
                    clip_plane,
                    call,
                }),
                _ => {}
            }
        }

        draws
    }

    /// Draws that landed on `target`
    pub fn draws_into(&self, target: RenderTarget) -> Vec<&DrawCall> {
        self.draws()
            .into_iter()
            .filter(|draw| draw.target == target)
            .map(|draw| draw.call)
            .collect()
    }

    /// Position of the first command that binds the backbuffer
    pub fn first_backbuffer_bind(&self) -> Option<usize> {
        self.commands
            .iter()
            .position(|c| *c == RenderCommand::SetTarget(RenderTarget::Backbuffer))
    }

    fn check_target(&self, target: RenderTargetHandle) -> Result<&LiveTarget> {
        self.targets
            .get(&target)
            .ok_or(RenderError::InvalidRenderTarget(target))
    }
}

impl GraphicsDevice for CommandList {
    fn backbuffer_size(&self) -> (u32, u32) {
        self.backbuffer
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RenderError::InvalidArgument(format!(
                "render target '{}' has zero size",
                desc.label
            )));
        }

        let target = RenderTargetHandle(self.next_target);
        let texture = TextureHandle(self.next_texture);
        self.next_target += 1;
        self.next_texture += 1;

        self.targets.insert(
            target,
            LiveTarget {
                desc: desc.clone(),
                texture,
            },
        );
        self.commands.push(RenderCommand::CreateTarget {
            target,
            desc: desc.clone(),
        });
        Ok(target)
    }

    fn release_render_target(&mut self, target: RenderTargetHandle) {
        if self.targets.remove(&target).is_some() {
            self.commands.push(RenderCommand::ReleaseTarget(target));
        }
    }

    fn set_render_target(&mut self, target: RenderTarget) -> Result<()> {
        if let RenderTarget::Offscreen(handle) = target {
            self.check_target(handle)?;
        }
        self.commands.push(RenderCommand::SetTarget(target));
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<()> {
        self.commands.push(RenderCommand::Clear(color));
        Ok(())
    }

    fn set_clip_plane(&mut self, plane: Option<Plane>) {
        self.commands.push(RenderCommand::SetClipPlane(plane));
    }

    fn draw(&mut self, call: &DrawCall) -> Result<()> {
        self.commands.push(RenderCommand::Draw(call.clone()));
        Ok(())
    }

    fn resolve_render_target(&mut self, target: RenderTargetHandle) -> Result<TextureHandle> {
        let texture = self.check_target(target)?.texture;
        self.commands.push(RenderCommand::Resolve { target, texture });
        Ok(texture)
    }
}
