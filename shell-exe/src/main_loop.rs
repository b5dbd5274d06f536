use std::error::Error;

use glam::UVec2;
use input::{Input, SystemInterface, UiEvent};
use log::info;
use render_opengl::{Gl32Renderer, Gpu};
use render_trait::RenderInterface;
use sdl2::video::Window;

use crate::document::DemoDocument;

/// Roughly one 60Hz frame. The loop wakes at least this often so the
/// document can animate with no input arriving.
const FRAME_WAIT_MS: u32 = 16;
const CLEAR_COLOUR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

fn resize<G: Gpu>(window: &Window, renderer: &mut Gl32Renderer<G>, document: &mut DemoDocument) {
    let (width, height) = window.drawable_size();
    renderer.set_viewport(width, height);
    document.resize(renderer, UVec2::new(width, height));
}

/// Run until the window is closed or the quit key is pressed
pub fn run<G: Gpu>(
    window: &Window,
    renderer: &mut Gl32Renderer<G>,
    input: &mut Input,
    system: &SystemInterface,
    document: &mut DemoDocument,
) -> Result<(), Box<dyn Error>> {
    resize(window, renderer, document);

    loop {
        document.update(system.elapsed_time());

        renderer.clear(CLEAR_COLOUR);
        document.render(renderer);
        window.gl_swap_window();

        for event in input.wait(FRAME_WAIT_MS) {
            match event {
                UiEvent::Quit => {
                    info!("Quit requested");
                    return Ok(());
                }
                // The event carries window units, the viewport wants pixels
                UiEvent::Resized { .. } => resize(window, renderer, document),
                event => document.process(&event),
            }
        }
        if input.get_quit() {
            return Ok(());
        }
    }
}
