//! A small hand-built document standing in for the middleware. It exercises
//! every entry point of a [`RenderInterface`] the way a real UI would.

use glam::{UVec2, Vec2};
use input::{KeyIdentifier, UiEvent};
use log::{info, warn};
use render_trait::{CompiledGeometryHandle, RenderInterface, RenderResult, TextureHandle, Vertex};

const PANEL_ORIGIN: Vec2 = Vec2::new(64.0, 64.0);
const PANEL_SIZE: Vec2 = Vec2::new(256.0, 256.0);
const BORDER: f32 = 6.0;

const STRIPES_ORIGIN: Vec2 = Vec2::new(384.0, 64.0);
const STRIPES_SIZE: Vec2 = Vec2::new(256.0, 256.0);
const STRIPE_PITCH: f32 = 32.0;
/// Pixels per second
const STRIPE_SPEED: f32 = 40.0;

const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Four corners of an axis aligned rectangle, clockwise from top-left
fn quad(min: Vec2, size: Vec2, colours: [[u8; 4]; 4]) -> [Vertex; 4] {
    let max = min + size;
    [
        Vertex::new([min.x, min.y], colours[0], [0.0, 0.0]),
        Vertex::new([max.x, min.y], colours[1], [1.0, 0.0]),
        Vertex::new([max.x, max.y], colours[2], [1.0, 1.0]),
        Vertex::new([min.x, max.y], colours[3], [0.0, 1.0]),
    ]
}

fn quad_indices(first: i32) -> [i32; 6] {
    [first, first + 1, first + 2, first, first + 2, first + 3]
}

/// Grey checkerboard used when the demo texture can't be loaded
fn checkerboard() -> Vec<u8> {
    let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let light = ((x / CHECKER_CELL) + (y / CHECKER_CELL)) % 2 == 0;
            let v = if light { 200 } else { 90 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

pub struct DemoDocument {
    size: UVec2,
    texture: TextureHandle,
    background: Option<CompiledGeometryHandle>,
    border: Option<CompiledGeometryHandle>,
    panel: Option<CompiledGeometryHandle>,
    mouse: Vec2,
    elapsed: f32,
    paused: bool,
}

impl DemoDocument {
    /// Load the panel texture (or a generated stand-in) and compile the
    /// static geometry that doesn't depend on the window size.
    pub fn new(renderer: &mut dyn RenderInterface, texture: Option<&str>) -> Self {
        let texture = Self::load_texture(renderer, texture);

        let border_verts = quad(
            PANEL_ORIGIN - BORDER,
            PANEL_SIZE + BORDER * 2.0,
            [[40, 40, 60, 255]; 4],
        );
        let border = renderer
            .compile_geometry(&border_verts, &quad_indices(0), TextureHandle::NONE)
            .inspect_err(|e| warn!("Could not compile panel border: {e}"))
            .ok();

        // Compiled at the origin, placed with the translation
        let panel_verts = quad(Vec2::ZERO, PANEL_SIZE, [WHITE; 4]);
        let panel = renderer
            .compile_geometry(&panel_verts, &quad_indices(0), texture)
            .inspect_err(|e| warn!("Could not compile panel: {e}"))
            .ok();

        Self {
            size: UVec2::ZERO,
            texture,
            background: None,
            border,
            panel,
            mouse: Vec2::new(-1.0, -1.0),
            elapsed: 0.0,
            paused: false,
        }
    }

    fn load_texture(renderer: &mut dyn RenderInterface, source: Option<&str>) -> TextureHandle {
        if let Some(source) = source {
            match renderer.load_texture(source) {
                Ok((handle, size)) => {
                    info!("Loaded {source} ({}x{})", size.x, size.y);
                    return handle;
                }
                Err(e) => warn!("Could not load {source}: {e}, using a checkerboard"),
            }
        }
        renderer
            .generate_texture(&checkerboard(), UVec2::splat(CHECKER_SIZE))
            .unwrap_or_else(|e| {
                warn!("Could not generate fallback texture: {e}");
                TextureHandle::NONE
            })
    }

    /// Recompile the full-window background for a new drawable size
    pub fn resize(&mut self, renderer: &mut dyn RenderInterface, size: UVec2) {
        if size == self.size && self.background.is_some() {
            return;
        }
        self.size = size;
        if let Some(old) = self.background.take() {
            if let Err(e) = renderer.release_compiled_geometry(old) {
                warn!("Could not release background: {e}");
            }
        }
        if size.x == 0 || size.y == 0 {
            return;
        }

        let top = [70, 90, 120, 255];
        let bottom = [20, 24, 32, 255];
        let verts = quad(Vec2::ZERO, size.as_vec2(), [top, top, bottom, bottom]);
        self.background = renderer
            .compile_geometry(&verts, &quad_indices(0), TextureHandle::NONE)
            .inspect_err(|e| warn!("Could not compile background: {e}"))
            .ok();
    }

    pub fn update(&mut self, elapsed: f32) {
        if !self.paused {
            self.elapsed = elapsed;
        }
    }

    pub fn process(&mut self, event: &UiEvent) {
        match event {
            UiEvent::MouseMove { x, y, .. } => self.mouse = Vec2::new(*x as f32, *y as f32),
            UiEvent::KeyDown {
                key: KeyIdentifier::Space,
                ..
            } => self.paused = !self.paused,
            _ => {}
        }
    }

    fn hovered(&self) -> bool {
        let rel = self.mouse - PANEL_ORIGIN;
        rel.cmpge(Vec2::ZERO).all() && rel.cmplt(PANEL_SIZE).all()
    }

    fn stripes(&self) -> (Vec<Vertex>, Vec<i32>) {
        let offset = (self.elapsed * STRIPE_SPEED) % STRIPE_PITCH;
        // One extra stripe each side so the clip edge is always covered
        let count = (STRIPES_SIZE.x / STRIPE_PITCH) as i32 + 2;
        let mut vertices = Vec::with_capacity(count as usize * 4);
        let mut indices = Vec::with_capacity(count as usize * 6);
        for i in 0..count {
            let x = (i - 1) as f32 * STRIPE_PITCH + offset;
            let colour = if i % 2 == 0 {
                [220, 120, 40, 255]
            } else {
                [250, 200, 80, 255]
            };
            indices.extend_from_slice(&quad_indices(vertices.len() as i32));
            vertices.extend_from_slice(&quad(
                Vec2::new(x, -BORDER),
                Vec2::new(STRIPE_PITCH * 0.5, STRIPES_SIZE.y + BORDER * 2.0),
                [colour; 4],
            ));
        }
        (vertices, indices)
    }

    fn draw(&self, renderer: &mut dyn RenderInterface) -> RenderResult<()> {
        if let Some(background) = self.background {
            renderer.render_compiled_geometry(background, Vec2::ZERO)?;
        }
        if let Some(border) = self.border {
            renderer.render_compiled_geometry(border, Vec2::ZERO)?;
        }
        if let Some(panel) = self.panel {
            renderer.render_compiled_geometry(panel, PANEL_ORIGIN)?;
        }

        if self.hovered() {
            let glow = [255, 255, 255, 60];
            let verts = quad(PANEL_ORIGIN, PANEL_SIZE, [glow; 4]);
            renderer.render_geometry(&verts, &quad_indices(0), TextureHandle::NONE, Vec2::ZERO)?;
        }

        let (vertices, indices) = self.stripes();
        renderer.enable_scissor_region(true);
        renderer.set_scissor_region(
            STRIPES_ORIGIN.x as i32,
            STRIPES_ORIGIN.y as i32,
            STRIPES_SIZE.x as i32,
            STRIPES_SIZE.y as i32,
        );
        let drawn =
            renderer.render_geometry(&vertices, &indices, TextureHandle::NONE, STRIPES_ORIGIN);
        renderer.enable_scissor_region(false);
        drawn
    }

    /// Draw a frame. Failures are logged and the frame carries on without
    /// the rest of the document.
    pub fn render(&self, renderer: &mut dyn RenderInterface) {
        if let Err(e) = self.draw(renderer) {
            warn!("Frame incomplete: {e}");
        }
    }

    /// Hand every resource back to the renderer
    pub fn release(&mut self, renderer: &mut dyn RenderInterface) {
        let geometry = [self.background.take(), self.border.take(), self.panel.take()];
        for handle in geometry.into_iter().flatten() {
            if let Err(e) = renderer.release_compiled_geometry(handle) {
                warn!("Could not release geometry: {e}");
            }
        }
        if !self.texture.is_none() {
            if let Err(e) = renderer.release_texture(self.texture) {
                warn!("Could not release texture: {e}");
            }
            self.texture = TextureHandle::NONE;
        }
    }
}
