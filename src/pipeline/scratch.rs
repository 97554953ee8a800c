//! Per-request scratch copy of the input document.

use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

/// The request's document bytes written to a uniquely named temporary file.
///
/// Each request gets its own file; names never collide across concurrent
/// requests. The file is removed by [`ScratchFile::release`] or, on any
/// early return, when the handle is dropped.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Write `bytes` to a new file in `dir`, or the system temp dir.
    pub fn create(bytes: &[u8], dir: Option<&Path>) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("pdfsheet-").suffix(".pdf");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(bytes)?;
        file.flush()?;

        log::debug!("scratch file created: {}", file.path().display());
        Ok(Self { file })
    }

    /// Path of the scratch file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now, reporting failure instead of ignoring it.
    pub fn release(self) -> io::Result<()> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        log::debug!("scratch file released: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create(b"%PDF-1.4", Some(dir.path())).unwrap();
        let path = scratch.path().to_path_buf();

        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");

        scratch.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchFile::create(b"data", Some(dir.path())).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScratchFile::create(b"a", Some(dir.path())).unwrap();
        let b = ScratchFile::create(b"b", Some(dir.path())).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(ScratchFile::create(b"a", Some(&missing)).is_err());
    }
}
