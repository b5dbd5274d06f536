use std::mem::{offset_of, size_of};

use glam::Vec2;
use log::warn;
use render_trait::{RenderError, RenderResult, TextureHandle, Vertex};

use crate::gpu::Gpu;
use crate::shaders::ShaderPrograms;

const STRIDE: i32 = size_of::<Vertex>() as i32;

/// One vertex array with its vertex and index buffers. Drawn as a single
/// indexed triangle list, optionally textured.
pub struct GeometryBuffer<G: Gpu> {
    vao: G::VertexArray,
    vbo: G::Buffer,
    ibo: G::Buffer,
    vertex_count: usize,
    index_count: i32,
    texture: TextureHandle,
    buffered: bool,
}

impl<G: Gpu> GeometryBuffer<G> {
    pub fn new(gpu: &G) -> RenderResult<Self> {
        let vao = gpu.create_vertex_array().map_err(RenderError::GpuAllocation)?;
        let vbo = match gpu.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                gpu.delete_vertex_array(vao);
                return Err(RenderError::GpuAllocation(e));
            }
        };
        let ibo = match gpu.create_buffer() {
            Ok(ibo) => ibo,
            Err(e) => {
                gpu.delete_buffer(vbo);
                gpu.delete_vertex_array(vao);
                return Err(RenderError::GpuAllocation(e));
            }
        };

        Ok(Self {
            vao,
            vbo,
            ibo,
            vertex_count: 0,
            index_count: 0,
            texture: TextureHandle::NONE,
            buffered: false,
        })
    }

    #[inline]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    #[inline]
    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    #[inline]
    pub fn counts(&self) -> (usize, i32) {
        (self.vertex_count, self.index_count)
    }

    /// Bind the vertex array and both buffers until the guard drops
    pub fn bind<'a>(&'a mut self, gpu: &'a G) -> BoundGeometry<'a, G> {
        gpu.bind_vertex_array(Some(self.vao));
        gpu.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        gpu.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ibo));
        BoundGeometry {
            gpu,
            geometry: self,
        }
    }

    pub fn destroy(&self, gpu: &G) {
        gpu.delete_buffer(self.ibo);
        gpu.delete_buffer(self.vbo);
        gpu.delete_vertex_array(self.vao);
    }
}

pub struct BoundGeometry<'a, G: Gpu> {
    gpu: &'a G,
    geometry: &'a mut GeometryBuffer<G>,
}

impl<G: Gpu> BoundGeometry<'_, G> {
    /// Upload vertices and indices verbatim. Every index must address a
    /// vertex, otherwise nothing is uploaded.
    pub fn buffer(
        &mut self,
        vertices: &[Vertex],
        indices: &[i32],
        texture: TextureHandle,
    ) -> RenderResult<()> {
        let index_count = i32::try_from(indices.len()).map_err(|_| {
            RenderError::InvalidArgument(format!("{} indices is too many", indices.len()))
        })?;
        if let Some((pos, bad)) = indices
            .iter()
            .enumerate()
            .find(|(_, i)| usize::try_from(**i).map_or(true, |i| i >= vertices.len()))
        {
            warn!(
                "Index {bad} at {pos} is out of range for {} vertices",
                vertices.len()
            );
            return Err(RenderError::InvalidArgument(format!(
                "index {bad} at position {pos} is outside 0..{}",
                vertices.len()
            )));
        }

        self.gpu.buffer_data(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(vertices),
            glow::STATIC_DRAW,
        );
        self.gpu.buffer_data(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(indices),
            glow::STATIC_DRAW,
        );

        let geometry = &mut *self.geometry;
        geometry.vertex_count = vertices.len();
        geometry.index_count = index_count;
        geometry.texture = texture;
        geometry.buffered = true;
        Ok(())
    }

    /// Issue the draw. `texture` is the resolved GPU texture for the
    /// geometry's handle, `None` draws with the colour program.
    pub fn draw(
        &self,
        programs: &ShaderPrograms<G>,
        texture: Option<G::Texture>,
        translation: Vec2,
    ) -> RenderResult<()> {
        if !self.geometry.buffered {
            return Err(RenderError::InvalidArgument(
                "geometry has not been buffered".to_owned(),
            ));
        }
        let gpu = self.gpu;
        let program = programs.select(texture.is_some());
        let loc = &program.locations;

        gpu.use_program(Some(program.id));

        let mut tex_coord = None;
        if let Some(texture) = texture {
            gpu.active_texture(glow::TEXTURE0);
            gpu.bind_texture(glow::TEXTURE_2D, Some(texture));
            if let Some(index) = loc.tex_coord {
                gpu.enable_vertex_attrib_array(index);
                gpu.vertex_attrib_pointer(
                    index,
                    2,
                    glow::FLOAT,
                    false,
                    STRIDE,
                    offset_of!(Vertex, tex_coord) as i32,
                );
                tex_coord = Some(index);
            }
        }

        let blend_was_enabled = gpu.is_enabled(glow::BLEND);
        gpu.enable(glow::BLEND);
        gpu.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

        gpu.enable_vertex_attrib_array(loc.position);
        gpu.enable_vertex_attrib_array(loc.colour);
        gpu.vertex_attrib_pointer(
            loc.position,
            2,
            glow::FLOAT,
            false,
            STRIDE,
            offset_of!(Vertex, position) as i32,
        );
        gpu.vertex_attrib_pointer(
            loc.colour,
            4,
            glow::UNSIGNED_BYTE,
            true,
            STRIDE,
            offset_of!(Vertex, colour) as i32,
        );

        gpu.uniform_2_f32(loc.translation.as_ref(), translation.x, translation.y);
        gpu.draw_elements(
            glow::TRIANGLES,
            self.geometry.index_count,
            glow::UNSIGNED_INT,
            0,
        );

        gpu.disable_vertex_attrib_array(loc.position);
        gpu.disable_vertex_attrib_array(loc.colour);
        if let Some(index) = tex_coord {
            gpu.disable_vertex_attrib_array(index);
        }
        if !blend_was_enabled {
            gpu.disable(glow::BLEND);
        }
        if texture.is_some() {
            gpu.bind_texture(glow::TEXTURE_2D, None);
        }
        gpu.use_program(None);
        Ok(())
    }
}

impl<G: Gpu> Drop for BoundGeometry<'_, G> {
    fn drop(&mut self) {
        self.gpu.bind_vertex_array(None);
        self.gpu.bind_buffer(glow::ARRAY_BUFFER, None);
        self.gpu.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
    }
}

impl<G: Gpu> std::fmt::Debug for GeometryBuffer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("vao", &self.vao)
            .field("vbo", &self.vbo)
            .field("ibo", &self.ibo)
            .field("vertices", &self.vertex_count)
            .field("indices", &self.index_count)
            .field("texture", &self.texture)
            .finish()
    }
}
