use argh::FromArgs;

/// CLI options for the ui-shell
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// directory textures and documents are loaded from
    #[argh(option, default = "Default::default()")]
    pub assets: String,
    /// window width in pixels
    #[argh(option, default = "0")]
    pub width: u32,
    /// window height in pixels
    #[argh(option, default = "0")]
    pub height: u32,
    /// TGA texture for the demo panel, relative to the assets directory
    #[argh(option)]
    pub texture: Option<String>,
    /// wait for vertical sync when swapping?
    #[argh(option)]
    pub vsync: Option<bool>,
}
