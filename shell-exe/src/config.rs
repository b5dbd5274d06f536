//! User configuration options.

use std::fs::{File, create_dir_all};
use std::io::{Read, Write};
use std::path::PathBuf;

use dirs::config_dir;
use input::config::InputConfig;
use log::{error, info, warn};
use nanoserde::{DeRon, SerRon};

use crate::{BASE_DIR, CLIOptions};

const LOG_TAG: &str = "UserConfig";
const DEFAULT_ASSETS: &str = "../../assets/";

fn get_cfg_file() -> Option<PathBuf> {
    let mut dir = config_dir()?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        if let Err(e) = create_dir_all(&dir) {
            warn!(target: LOG_TAG, "Couldn't create {dir:?}: {e}");
            return None;
        }
    }
    dir.push("user.ron");
    Some(dir)
}

#[derive(Debug, Clone, PartialEq, DeRon, SerRon)]
pub struct UserConfig {
    pub assets: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub input: InputConfig,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            assets: DEFAULT_ASSETS.to_owned(),
            width: 1024,
            height: 768,
            vsync: true,
            input: InputConfig::default(),
        }
    }
}

impl UserConfig {
    /// Read the config, falling back to (and writing) defaults if it is
    /// missing or unreadable
    pub fn load() -> Self {
        let Some(path) = get_cfg_file() else {
            warn!(target: LOG_TAG, "No user config dir, using defaults");
            return Self::default();
        };

        let mut buf = String::new();
        match File::open(&path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(len) if len > 0 => match Self::deserialize_ron(&buf) {
                Ok(config) => {
                    info!(target: LOG_TAG, "Loaded user config file");
                    return config;
                }
                Err(e) => warn!(target: LOG_TAG, "Could not deserialise {path:?}: {e}, recreating"),
            },
            Ok(_) => {}
            Err(e) => info!(target: LOG_TAG, "No config at {path:?} ({e})"),
        }

        let config = Self::default();
        config.write();
        info!(target: LOG_TAG, "Created default user config file");
        config
    }

    pub fn write(&self) {
        let Some(path) = get_cfg_file() else {
            return;
        };
        let data = self.serialize_ron();
        match File::create(&path).and_then(|mut f| f.write_all(data.as_bytes())) {
            Ok(()) => info!(target: LOG_TAG, "Saved user config to {path:?}"),
            Err(e) => error!(target: LOG_TAG, "Could not write config: {e}"),
        }
    }

    /// Sync the CLI options and UserConfig with each other. Options given on
    /// the command line win and are persisted.
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        if !cli.assets.is_empty() && cli.assets != self.assets {
            cli.assets.clone_into(&mut self.assets);
            info!(target: LOG_TAG, "Assets changed to: {}", &cli.assets);
        } else {
            self.assets.clone_into(&mut cli.assets);
        }

        if cli.width != 0 && cli.width != self.width {
            self.width = cli.width;
        } else {
            cli.width = self.width;
        }

        if cli.height != 0 && cli.height != self.height {
            self.height = cli.height;
        } else {
            cli.height = self.height;
        }

        if let Some(v) = cli.vsync {
            if v != self.vsync {
                self.vsync = v;
            }
        } else {
            cli.vsync = Some(self.vsync);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CLIOptions {
        CLIOptions {
            verbose: None,
            assets: String::new(),
            width: 0,
            height: 0,
            texture: None,
            vsync: None,
        }
    }

    #[test]
    fn empty_cli_takes_config() {
        let mut config = UserConfig::default();
        let mut options = cli();
        config.sync_cli(&mut options);

        assert_eq!(options.assets, DEFAULT_ASSETS);
        assert_eq!((options.width, options.height), (1024, 768));
        assert_eq!(options.vsync, Some(true));
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn cli_overrides_config() {
        let mut config = UserConfig::default();
        let mut options = CLIOptions {
            assets: "/srv/ui".to_owned(),
            width: 1280,
            vsync: Some(false),
            ..cli()
        };
        config.sync_cli(&mut options);

        assert_eq!(config.assets, "/srv/ui");
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 768);
        assert!(!config.vsync);
        assert_eq!(options.height, 768);
    }

    #[test]
    fn ron_round_trip() {
        let config = UserConfig {
            width: 800,
            ..UserConfig::default()
        };
        let text = config.serialize_ron();
        assert_eq!(UserConfig::deserialize_ron(&text).unwrap(), config);
    }
}
