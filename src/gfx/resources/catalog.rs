//! Name to handle lookup for uploaded resources

use std::collections::HashMap;

use crate::error::{RenderError, Result};
use crate::gfx::rendering::device::{MeshHandle, ProgramHandle, TextureHandle};

/// Resolves resource names to the opaque handles a backend handed out
///
/// Loading is somebody else's job; the catalog only remembers what was
/// registered under which name.
#[derive(Debug, Default, Clone)]
pub struct ResourceCatalog {
    meshes: HashMap<String, MeshHandle>,
    textures: HashMap<String, TextureHandle>,
    programs: HashMap<String, ProgramHandle>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mesh; returns the handle previously bound to `name`, if any
    pub fn register_mesh(&mut self, name: &str, mesh: MeshHandle) -> Option<MeshHandle> {
        self.meshes.insert(name.to_string(), mesh)
    }

    pub fn register_texture(&mut self, name: &str, texture: TextureHandle) -> Option<TextureHandle> {
        self.textures.insert(name.to_string(), texture)
    }

    pub fn register_program(&mut self, name: &str, program: ProgramHandle) -> Option<ProgramHandle> {
        self.programs.insert(name.to_string(), program)
    }

    pub fn mesh(&self, name: &str) -> Result<MeshHandle> {
        self.meshes
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::unknown_resource("mesh", name))
    }

    pub fn texture(&self, name: &str) -> Result<TextureHandle> {
        self.textures
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::unknown_resource("texture", name))
    }

    pub fn program(&self, name: &str) -> Result<ProgramHandle> {
        self.programs
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::unknown_resource("program", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_after_register() {
        let mut catalog = ResourceCatalog::new();
        assert!(catalog.register_mesh("cube", MeshHandle(3)).is_none());
        assert_eq!(catalog.register_mesh("cube", MeshHandle(4)), Some(MeshHandle(3)));
        assert_eq!(catalog.mesh("cube").unwrap(), MeshHandle(4));
    }

    #[test]
    fn test_unknown_names_fail_by_kind() {
        let mut catalog = ResourceCatalog::new();
        catalog.register_texture("grass", TextureHandle(0));

        let err = catalog.texture("sand").unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnknownResource { kind: "texture", ref name } if name == "sand"
        ));
        // Names are per kind
        assert!(catalog.mesh("grass").is_err());
        assert!(catalog.program("surface").is_err());
    }
}
