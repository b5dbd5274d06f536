//! Host shell for the OpenGL 3.2 UI backend. Opens an SDL2 window with a core
//! profile context, drives a demo document through the renderer and feeds
//! it translated input until quit.

mod cli;
mod config;
mod document;
mod files;
mod main_loop;

use std::error::Error;

use cli::*;
use input::{Input, SystemInterface};
use log::{info, warn};
use render_opengl::{Gl32Renderer, GlowGpu};
use sdl2::video::{GLProfile, SwapInterval};
use simplelog::TermLogger;

use crate::config::UserConfig;
use crate::document::DemoDocument;
use crate::files::ShellFileInterface;

const BASE_DIR: &str = "ui-shell/";

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load();
    user_config.sync_cli(&mut options);
    user_config.write();

    let sdl_ctx = sdl2::init()?;
    info!("Init SDL2 main");
    let video_ctx = sdl_ctx.video()?;
    info!("Init SDL2 video");

    let gl_attr = video_ctx.gl_attr();
    gl_attr.set_context_profile(GLProfile::Core);
    gl_attr.set_context_version(3, 2);
    gl_attr.set_double_buffer(true);

    let window = video_ctx
        .window("UI Shell", options.width, options.height)
        .opengl()
        .resizable()
        .position_centered()
        .build()?;

    // Declared before the renderer so the renderer is dropped while the
    // context is still alive
    let gl_ctx = window.gl_create_context()?;
    window.gl_make_current(&gl_ctx)?;
    let gl = unsafe {
        glow::Context::from_loader_function(|s| video_ctx.gl_get_proc_address(s) as *const _)
    };

    if options.vsync.unwrap_or(true) {
        if video_ctx
            .gl_set_swap_interval(SwapInterval::LateSwapTearing)
            .is_err()
        {
            if let Err(e) = video_ctx.gl_set_swap_interval(SwapInterval::VSync) {
                warn!("Could not enable vsync: {e}");
            }
        }
    } else if let Err(e) = video_ctx.gl_set_swap_interval(SwapInterval::Immediate) {
        warn!("Could not disable vsync: {e}");
    }

    let files = ShellFileInterface::new(&options.assets);
    // The context was made current above
    let gpu = unsafe { GlowGpu::new(gl) };
    let mut renderer = Gl32Renderer::new(gpu, Box::new(files))?;

    let mut input = Input::new(sdl_ctx.event_pump()?, (&user_config.input).into());
    let system = SystemInterface::new();

    let mut document = DemoDocument::new(&mut renderer, options.texture.as_deref());
    let result = main_loop::run(&window, &mut renderer, &mut input, &system, &mut document);
    document.release(&mut renderer);
    result
}
