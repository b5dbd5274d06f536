use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;
use render_trait::{FileHandle, FileInterface};

/// Resolves document paths against the assets directory. Paths may not
/// escape the root.
pub struct ShellFileInterface {
    root: PathBuf,
}

impl ShellFileInterface {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{path} is outside the assets directory"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl FileInterface for ShellFileInterface {
    fn open(&self, path: &str) -> io::Result<Box<dyn FileHandle>> {
        let full = self.resolve(path)?;
        debug!("Opening {full:?}");
        Ok(Box::new(File::open(full)?))
    }
}
