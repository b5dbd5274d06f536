use std::io::{self, Read, Seek, SeekFrom};

use log::debug;

/// An open file as handed out by a [`FileInterface`]
pub trait FileHandle: Read + Seek {}

impl<T: Read + Seek> FileHandle for T {}

/// File access supplied by the host. Paths are whatever the middleware
/// references in its documents, the host decides how they resolve.
pub trait FileInterface {
    fn open(&self, path: &str) -> io::Result<Box<dyn FileHandle>>;
}

/// Read a whole file through `files`, sizing the buffer from the file length
pub fn read_file(files: &dyn FileInterface, path: &str) -> io::Result<Vec<u8>> {
    let mut file = files.open(path)?;

    let len = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;

    let mut buffer = vec![0u8; len as usize];
    file.read_exact(&mut buffer)?;
    debug!("Read {len} bytes from {path}");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;

    use super::*;

    struct MemFiles(HashMap<&'static str, Vec<u8>>);

    impl FileInterface for MemFiles {
        fn open(&self, path: &str) -> io::Result<Box<dyn FileHandle>> {
            match self.0.get(path) {
                Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
                None => Err(io::Error::new(io::ErrorKind::NotFound, path.to_owned())),
            }
        }
    }

    #[test]
    fn reads_whole_file() {
        let files = MemFiles(HashMap::from([("a.tga", vec![1, 2, 3, 4, 5])]));
        assert_eq!(read_file(&files, "a.tga").unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn missing_file() {
        let files = MemFiles(HashMap::new());
        let err = read_file(&files, "nope.tga").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
