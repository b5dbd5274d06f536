use log::warn;
use nanoserde::{DeRon, SerRon};
use sdl2::keyboard::Keycode;

/// Input options persisted with the user config. Keys are stored by their
/// SDL name so the file stays readable.
#[derive(Debug, Clone, PartialEq, DeRon, SerRon)]
pub struct InputConfig {
    pub quit_key: String,
    /// Flip the wheel so pushing it away scrolls down
    pub invert_wheel: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            quit_key: Keycode::Escape.name(),
            invert_wheel: false,
        }
    }
}

/// [`InputConfig`] resolved to SDL types
#[derive(Debug, Clone, Copy)]
pub struct InputConfigSdl {
    pub(crate) quit_key: Keycode,
    pub(crate) invert_wheel: bool,
}

impl Default for InputConfigSdl {
    fn default() -> Self {
        Self::from(&InputConfig::default())
    }
}

impl From<&InputConfig> for InputConfigSdl {
    fn from(i: &InputConfig) -> Self {
        let quit_key = Keycode::from_name(&i.quit_key).unwrap_or_else(|| {
            warn!("Unknown quit key {:?}, using Escape", i.quit_key);
            Keycode::Escape
        });
        Self {
            quit_key,
            invert_wheel: i.invert_wheel,
        }
    }
}
