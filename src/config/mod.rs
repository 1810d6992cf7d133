//! Config lifecycle shared by every backend.
//!
//! This module provides:
//! - The structured lifecycle ([`StructuredConfig`]): the in-memory value is
//!   a caller-defined typed object mapped to and from a tree with serde.
//! - The unstructured lifecycle ([`UnstructuredConfig`]): the in-memory value
//!   is the raw object tree itself.
//! - Error types ([`ConfigError`]) and default values ([`defaults`]).
//!
//! # States
//!
//! A config starts *unloaded*. The first read loads it (blocking), `save`
//! persists the current value, and `close` moves it to the terminal *closed*
//! state: closing twice is an error, and every other operation on a closed
//! config fails with [`ConfigError::Closed`].
//!
//! # Locking
//!
//! Each config holds one mutex for the full duration of `load`, `save` and
//! the implicit load inside `get`. Path-level reads and writes take a
//! snapshot under that lock and resolve or mutate it outside of it, so a
//! sequence of path writes is not atomic; callers needing that must
//! serialize externally.

pub mod defaults;
mod error;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use error::{BoxError, ConfigError};

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::element::{Element, Value};
use crate::mapper;
use crate::path::{resolve, update};

/// Lifecycle of a config whose value is a typed object.
///
/// Backends implement the lifecycle; path-level [`get_path`] and
/// [`set_path`] are provided on top of it.
///
/// [`get_path`]: StructuredConfig::get_path
/// [`set_path`]: StructuredConfig::set_path
pub trait StructuredConfig<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Returns the current value, loading it first if not loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] after `close`, or the load error if
    /// the implicit load fails (the config then stays unloaded).
    fn get(&self) -> Result<T, ConfigError>;

    /// Returns the current value without loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotLoaded`] if nothing was loaded yet.
    fn get_cached(&self) -> Result<T, ConfigError>;

    /// Replaces the in-memory value. Nothing is persisted until `save`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] after `close`.
    fn set(&self, value: T) -> Result<(), ConfigError>;

    /// Returns `true` if the in-memory value is current.
    fn is_loaded(&self) -> bool;

    /// Populates the in-memory value from the backend, then persists it
    /// right away when `save` is set (to materialize missing defaults).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] on backend failure.
    fn load(&self, save: bool) -> Result<(), ConfigError>;

    /// Persists the in-memory value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Save`] on backend failure.
    fn save(&self) -> Result<(), ConfigError>;

    /// Closes the config permanently.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] if it was already closed.
    fn close(&self) -> Result<(), ConfigError>;

    /// Returns `true` once `close` succeeded.
    fn is_closed(&self) -> bool;

    /// Reads one node of the current value by path.
    ///
    /// Containers come back as [`Value::Container`] summaries.
    ///
    /// # Errors
    ///
    /// Fails like [`get`](StructuredConfig::get), or with
    /// [`ConfigError::Path`] for a malformed path.
    fn get_path(&self, path: &str) -> Result<Option<Value>, ConfigError> {
        let tree = mapper::to_element(&self.get()?)?;
        debug!(path, "Resolving config path");
        Ok(resolve(&tree, path, true)?)
    }

    /// Writes one node of the current value by path, creating missing
    /// containers on the way.
    ///
    /// # Errors
    ///
    /// Fails like [`get`](StructuredConfig::get), with [`ConfigError::Path`]
    /// for a malformed path, or with [`ConfigError::Mapping`] if the mutated
    /// tree no longer fits `T`.
    fn set_path(&self, path: &str, value: Value) -> Result<(), ConfigError> {
        let mut tree = mapper::to_element(&self.get()?)?;
        update(&mut tree, path, value, true)?;
        debug!(path, "Updated config path");
        self.set(mapper::from_element(tree)?)
    }
}

/// Lifecycle of a config whose value is a raw object tree.
pub trait UnstructuredConfig: Send + Sync {
    /// Reads one node by path, loading first if not loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] after `close`, [`ConfigError::Path`]
    /// for a malformed path, or the load error.
    fn get(&self, path: &str) -> Result<Option<Value>, ConfigError>;

    /// Reads one node by path without loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] or [`ConfigError::Path`].
    fn get_cached(&self, path: &str) -> Result<Option<Value>, ConfigError>;

    /// Writes one node by path, creating missing containers on the way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NullValue`] for [`Value::Null`],
    /// [`ConfigError::Closed`] or [`ConfigError::Path`].
    fn set(&self, path: &str, value: Value) -> Result<(), ConfigError>;

    /// Returns a copy of the whole tree, loading first if not loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] or the load error.
    fn tree(&self) -> Result<Element, ConfigError>;

    /// Replaces the whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRoot`] unless `tree` is an object.
    fn set_tree(&self, tree: Element) -> Result<(), ConfigError>;

    /// Returns `true` if the in-memory tree is current.
    fn is_loaded(&self) -> bool;

    /// Populates the tree from the backend, then persists it when `save` is
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] on backend failure.
    fn load(&self, save: bool) -> Result<(), ConfigError>;

    /// Persists the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Save`] on backend failure.
    fn save(&self) -> Result<(), ConfigError>;

    /// Closes the config permanently.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] if it was already closed.
    fn close(&self) -> Result<(), ConfigError>;

    /// Returns `true` once `close` succeeded.
    fn is_closed(&self) -> bool;
}

/// Validates a value for an unstructured path write.
pub(crate) fn require_value(value: &Value) -> Result<(), ConfigError> {
    match value {
        Value::Null => Err(ConfigError::NullValue),
        Value::Leaf(_) | Value::Container(_) => Ok(()),
    }
}

/// Validates a whole-tree replacement.
pub(crate) fn require_root(tree: &Element) -> Result<(), ConfigError> {
    match tree {
        Element::Object(_) => Ok(()),
        _ => Err(ConfigError::InvalidRoot),
    }
}

/// Locks a config's state, recovering it if a previous holder panicked.
pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
