// src/analysis/scratch.rs
// Request-scoped on-disk copy of a submitted snippet

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

/// Uniquely named `.py` file holding one snippet.
///
/// Removed exactly once: either explicitly through [`ScratchFile::release`]
/// or, if the owner never gets there, on drop. Removal failures are logged
/// and swallowed.
pub struct ScratchFile {
    path: Option<TempPath>,
}

impl ScratchFile {
    /// Create a new scratch file in the system temp dir and write `code` verbatim
    pub fn create(code: &str) -> std::io::Result<Self> {
        Self::create_in(&std::env::temp_dir(), code)
    }

    pub fn create_in(dir: &Path, code: &str) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("codefix-")
            .suffix(".py")
            .tempfile_in(dir)?;
        file.write_all(code.as_bytes())?;
        file.flush()?;

        let path = file.into_temp_path();
        debug!("Scratch file created: {}", path.display());
        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> &Path {
        // Only None after release(), which consumes self
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete the file now
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(path) = self.path.take() else { return };
        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => debug!("Scratch file removed: {}", shown),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Scratch file already gone: {}", shown)
            }
            Err(e) => warn!("Failed to delete scratch file {}: {}", shown, e),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_snippet_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let code = "x = 1\nprint(x)\n";
        let scratch = ScratchFile::create_in(dir.path(), code).unwrap();

        assert_eq!(std::fs::read_to_string(scratch.path()).unwrap(), code);
        assert_eq!(scratch.path().extension().unwrap(), "py");
    }

    #[test]
    fn test_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create_in(dir.path(), "pass").unwrap();
        let path = scratch.path().to_path_buf();

        scratch.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchFile::create_in(dir.path(), "pass").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_release_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFile::create_in(dir.path(), "pass").unwrap();
        std::fs::remove_file(scratch.path()).unwrap();

        // Must not panic
        scratch.release();
    }

    #[test]
    fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScratchFile::create_in(dir.path(), "a = 1").unwrap();
        let b = ScratchFile::create_in(dir.path(), "a = 1").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
