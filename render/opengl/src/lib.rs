//! OpenGL 3.2 core profile backend for [`RenderInterface`].
//!
//! Every GL call goes through a [`Gpu`]; [`GlowGpu`] is the real one. Two
//! GLSL 150 programs cover all drawing, one for flat colour and one that
//! modulates a texture by the vertex colour. Immediate draws share a single
//! transient [`GeometryBuffer`], compiled geometry and textures live in
//! generational pools and are addressed by the opaque handles the middleware
//! holds.

mod geometry;
mod gpu;
mod pool;
mod shaders;
#[cfg(test)]
mod test_gpu;

pub use crate::geometry::{BoundGeometry, GeometryBuffer};
pub use crate::gpu::{GlowGpu, Gpu};
pub use crate::pool::ResourcePool;
pub use crate::shaders::{ProgramLocations, ShaderProgram, ShaderPrograms};

use glam::{Mat4, UVec2, Vec2};
use log::{debug, info, warn};
use render_trait::{
    CompiledGeometryHandle, FileInterface, RenderError, RenderInterface, RenderResult,
    TextureHandle, Vertex, read_file,
};
use tga::RGBA_CHANNELS;

struct Texture<G: Gpu> {
    id: G::Texture,
    size: UVec2,
}

pub struct Gl32Renderer<G: Gpu> {
    gpu: G,
    files: Box<dyn FileInterface>,
    programs: ShaderPrograms<G>,
    /// Re-buffered by every immediate draw
    dynamic: GeometryBuffer<G>,
    compiled: ResourcePool<GeometryBuffer<G>>,
    textures: ResourcePool<Texture<G>>,
    viewport: UVec2,
    projection: Mat4,
}

impl<G: Gpu> Gl32Renderer<G> {
    /// Compile the shader programs and allocate the transient buffer. The
    /// context behind `gpu` must be current.
    pub fn new(gpu: G, files: Box<dyn FileInterface>) -> RenderResult<Self> {
        let programs = ShaderPrograms::new(&gpu)?;
        let dynamic = match GeometryBuffer::new(&gpu) {
            Ok(dynamic) => dynamic,
            Err(e) => {
                programs.destroy(&gpu);
                return Err(e);
            }
        };
        info!("Initialised OpenGL 3.2 renderer");

        Ok(Self {
            gpu,
            files,
            programs,
            dynamic,
            compiled: ResourcePool::new(),
            textures: ResourcePool::new(),
            viewport: UVec2::ZERO,
            projection: Mat4::IDENTITY,
        })
    }

    #[inline]
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// The projection last uploaded to the programs
    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn live_geometry(&self) -> usize {
        self.compiled.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn clear(&self, colour: [f32; 4]) {
        self.gpu.clear(colour);
    }
}

/// GL sizes are signed, anything larger saturates
fn clamp_to_gl(size: u32) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

/// Look up the GPU texture for a handle. `NONE` resolves to no texture.
fn resolve<G: Gpu>(
    textures: &ResourcePool<Texture<G>>,
    handle: TextureHandle,
) -> RenderResult<Option<G::Texture>> {
    if handle.is_none() {
        return Ok(None);
    }
    textures
        .get(handle.raw())
        .map(|t| Some(t.id))
        .ok_or_else(|| {
            warn!("Texture {} is not live", handle.raw());
            RenderError::InvalidArgument(format!("texture {} is not live", handle.raw()))
        })
}

impl<G: Gpu> RenderInterface for Gl32Renderer<G> {
    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = UVec2::new(width, height);
        if width == 0 || height == 0 {
            debug!("Viewport is empty ({width}x{height}), keeping the last projection");
            return;
        }

        // Top and bottom swapped so pixel y grows downward
        self.projection =
            Mat4::orthographic_rh_gl(0.0, width as f32, height as f32, 0.0, -1.0, 1.0);
        self.programs
            .set_projection(&self.gpu, &self.projection.to_cols_array());
        self.gpu.viewport(0, 0, clamp_to_gl(width), clamp_to_gl(height));
        debug!("Viewport set to {width}x{height}");
    }

    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[i32],
        texture: TextureHandle,
        translation: Vec2,
    ) -> RenderResult<()> {
        let gl_texture = resolve(&self.textures, texture)?;
        let mut bound = self.dynamic.bind(&self.gpu);
        bound.buffer(vertices, indices, texture)?;
        bound.draw(&self.programs, gl_texture, translation)
    }

    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[i32],
        texture: TextureHandle,
    ) -> RenderResult<CompiledGeometryHandle> {
        resolve(&self.textures, texture)?;

        let mut geometry = GeometryBuffer::new(&self.gpu)?;
        let buffered = geometry.bind(&self.gpu).buffer(vertices, indices, texture);
        if let Err(e) = buffered {
            geometry.destroy(&self.gpu);
            return Err(e);
        }
        debug!("Compiled {geometry:?}");

        let raw = self.compiled.insert(geometry);
        Ok(CompiledGeometryHandle::from_raw(raw))
    }

    fn render_compiled_geometry(
        &mut self,
        geometry: CompiledGeometryHandle,
        translation: Vec2,
    ) -> RenderResult<()> {
        let Some(buffer) = self.compiled.get_mut(geometry.raw().get()) else {
            warn!("Render of released geometry {}", geometry.raw());
            return Err(RenderError::InvalidArgument(format!(
                "geometry {} is not live",
                geometry.raw()
            )));
        };
        let gl_texture = resolve(&self.textures, buffer.texture())?;
        buffer
            .bind(&self.gpu)
            .draw(&self.programs, gl_texture, translation)
    }

    fn release_compiled_geometry(&mut self, geometry: CompiledGeometryHandle) -> RenderResult<()> {
        match self.compiled.remove(geometry.raw().get()) {
            Some(buffer) => {
                buffer.destroy(&self.gpu);
                Ok(())
            }
            None => {
                warn!("Geometry {} released twice or never compiled", geometry.raw());
                Err(RenderError::InvalidArgument(format!(
                    "geometry {} is not live",
                    geometry.raw()
                )))
            }
        }
    }

    fn enable_scissor_region(&mut self, enable: bool) {
        if enable {
            self.gpu.enable(glow::SCISSOR_TEST);
        } else {
            self.gpu.disable(glow::SCISSOR_TEST);
        }
    }

    fn set_scissor_region(&mut self, x: i32, y: i32, width: i32, height: i32) {
        // GL counts rows from the bottom, computed wide and clamped
        let gpu_y = i64::from(self.viewport.y) - (i64::from(y) + i64::from(height));
        let gpu_y = gpu_y.clamp(i32::MIN.into(), i32::MAX.into()) as i32;
        self.gpu.scissor(x, gpu_y, width, height);
    }

    fn load_texture(&mut self, source: &str) -> RenderResult<(TextureHandle, UVec2)> {
        let data = read_file(self.files.as_ref(), source).inspect_err(|e| {
            warn!("Could not read texture {source}: {e}");
        })?;
        let image = tga::decode(&data)?;
        let size = UVec2::new(image.width, image.height);
        let handle = self.generate_texture(&image.pixels, size)?;
        info!("Loaded texture {source} ({}x{})", size.x, size.y);
        Ok((handle, size))
    }

    fn generate_texture(
        &mut self,
        pixels: &[u8],
        dimensions: UVec2,
    ) -> RenderResult<TextureHandle> {
        let (Ok(width), Ok(height)) = (i32::try_from(dimensions.x), i32::try_from(dimensions.y))
        else {
            return Err(RenderError::InvalidArgument(format!(
                "texture size {dimensions} is too large"
            )));
        };
        let needed = dimensions.x as usize * dimensions.y as usize * RGBA_CHANNELS;
        if pixels.len() < needed {
            warn!(
                "Texture data is {} bytes, {dimensions} needs {needed}",
                pixels.len()
            );
            return Err(RenderError::InvalidArgument(format!(
                "{} bytes of pixels for a {dimensions} texture, need {needed}",
                pixels.len()
            )));
        }

        let id = self
            .gpu
            .create_texture()
            .map_err(RenderError::GpuAllocation)?;
        let gpu = &self.gpu;
        gpu.bind_texture(glow::TEXTURE_2D, Some(id));
        gpu.tex_image_rgba8(width, height, &pixels[..needed]);
        for (parameter, value) in [
            (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
            (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
            (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
            (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
        ] {
            gpu.tex_parameter_i32(glow::TEXTURE_2D, parameter, value as i32);
        }
        gpu.bind_texture(glow::TEXTURE_2D, None);

        let raw = self.textures.insert(Texture {
            id,
            size: dimensions,
        });
        debug!("Generated texture {raw} ({dimensions})");
        Ok(TextureHandle::from_raw(raw.get()))
    }

    fn release_texture(&mut self, texture: TextureHandle) -> RenderResult<()> {
        match self.textures.remove(texture.raw()) {
            Some(t) => {
                self.gpu.delete_texture(t.id);
                Ok(())
            }
            None => {
                warn!("Texture {} released twice or never created", texture.raw());
                Err(RenderError::InvalidArgument(format!(
                    "texture {} is not live",
                    texture.raw()
                )))
            }
        }
    }
}

impl<G: Gpu> Drop for Gl32Renderer<G> {
    fn drop(&mut self) {
        if !self.compiled.is_empty() {
            warn!(
                "{} compiled geometries were never released",
                self.compiled.len()
            );
        }
        for (_, geometry) in self.compiled.drain() {
            geometry.destroy(&self.gpu);
        }

        if !self.textures.is_empty() {
            warn!("{} textures were never released", self.textures.len());
        }
        for (handle, texture) in self.textures.drain() {
            debug!("Deleting leaked texture {handle} ({})", texture.size);
            self.gpu.delete_texture(texture.id);
        }

        self.dynamic.destroy(&self.gpu);
        self.programs.destroy(&self.gpu);
        debug!("OpenGL renderer shut down");
    }
}
