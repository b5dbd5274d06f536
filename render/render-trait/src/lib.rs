//! The contract between the UI middleware and a rendering backend.
//!
//! The middleware owns layout and styling; whenever it needs pixels on screen
//! it calls into a [`RenderInterface`]. Geometry is always an indexed
//! triangle list of [`Vertex`] in pixel space with the origin at the top-left.

mod error;
mod files;

pub use crate::error::*;
pub use crate::files::*;

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
pub use glam::{UVec2, Vec2};

/// A single UI vertex. The field order and `repr(C)` are relied on by the
/// attribute bindings of the backends, which address fields by byte offset.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Pixel-space position
    pub position: [f32; 2],
    /// RGBA, 0-255
    pub colour: [u8; 4],
    /// Normalised texture coordinate, ignored by untextured draws
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 2], colour: [u8; 4], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            colour,
            tex_coord,
        }
    }
}

/// Opaque reference to a texture owned by a backend. [`TextureHandle::NONE`]
/// draws colour-only geometry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    pub const NONE: TextureHandle = TextureHandle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

/// Opaque reference to geometry uploaded once with
/// [`RenderInterface::compile_geometry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompiledGeometryHandle(NonZeroU64);

impl CompiledGeometryHandle {
    pub const fn from_raw(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> NonZeroU64 {
        self.0
    }
}

/// Everything a backend must provide to the UI middleware.
///
/// All calls happen on the thread that owns the graphics context, one at a
/// time. Every handle returned must be released exactly once.
pub trait RenderInterface {
    /// Set the drawable size in pixels. Must be called before the first draw
    /// and again on every resize.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Draw once, nothing is retained after the call returns.
    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[i32],
        texture: TextureHandle,
        translation: Vec2,
    ) -> RenderResult<()>;

    /// Upload geometry for repeated drawing with
    /// [`RenderInterface::render_compiled_geometry`].
    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[i32],
        texture: TextureHandle,
    ) -> RenderResult<CompiledGeometryHandle>;

    fn render_compiled_geometry(
        &mut self,
        geometry: CompiledGeometryHandle,
        translation: Vec2,
    ) -> RenderResult<()>;

    fn release_compiled_geometry(&mut self, geometry: CompiledGeometryHandle) -> RenderResult<()>;

    fn enable_scissor_region(&mut self, enable: bool);

    /// Clip to a rectangle given in UI coordinates (origin top-left)
    fn set_scissor_region(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Load and decode a texture file, returning the handle and its size in
    /// pixels.
    fn load_texture(&mut self, source: &str) -> RenderResult<(TextureHandle, UVec2)>;

    /// Create a texture from tightly packed RGBA8 pixels
    fn generate_texture(&mut self, pixels: &[u8], dimensions: UVec2) -> RenderResult<TextureHandle>;

    fn release_texture(&mut self, texture: TextureHandle) -> RenderResult<()>;
}
