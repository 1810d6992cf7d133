//! Raw byte storage behind file-backed configs.
//!
//! File configs never touch the filesystem directly; they go through a
//! [`ByteStore`], which lets tests swap in an in-memory store and count
//! writes.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FsByteStore;

use std::io;
use std::path::Path;

/// Reads and writes whole files.
pub trait ByteStore: Send + Sync {
    /// Returns `true` if a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the entire file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, including `NotFound`.
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the file's contents, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}
