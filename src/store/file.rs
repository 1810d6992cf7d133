//! Filesystem byte store.

use std::io;
use std::path::{Path, PathBuf};

use super::ByteStore;

/// [`ByteStore`] over the local filesystem.
///
/// # Atomic Writes
///
/// Writes go to `{path}.tmp` first and are then renamed over `{path}`, so a
/// reader sees either the old contents or the new ones, never a torn file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsByteStore;

impl FsByteStore {
    fn temp_path(path: &Path) -> PathBuf {
        // state.json -> state.json.tmp, not state.tmp
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl ByteStore for FsByteStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = Self::temp_path(path);
        std::fs::write(&temp_path, bytes)?;
        std::fs::rename(&temp_path, path)
    }
}
