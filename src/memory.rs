//! Configs that live only in memory.
//!
//! Both variants are always loaded; `load` and `save` do nothing beyond the
//! closed check.

use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{
    ConfigError, StructuredConfig, UnstructuredConfig, lock, require_root, require_value,
};
use crate::element::{Element, Value};
use crate::path::{resolve, update};

#[derive(Debug)]
struct State<V> {
    value: V,
    closed: bool,
}

impl<V> State<V> {
    const fn new(value: V) -> Self {
        Self {
            value,
            closed: false,
        }
    }

    const fn open(&self) -> Result<(), ConfigError> {
        if self.closed {
            Err(ConfigError::Closed)
        } else {
            Ok(())
        }
    }

    fn close(&mut self) -> Result<(), ConfigError> {
        self.open()?;
        self.closed = true;
        Ok(())
    }
}

/// Typed config held in memory.
#[derive(Debug)]
pub struct StructuredMemoryConfig<T> {
    state: Mutex<State<T>>,
}

impl<T> StructuredMemoryConfig<T> {
    /// Creates a config holding `value`.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            state: Mutex::new(State::new(value)),
        }
    }
}

impl<T: Default> Default for StructuredMemoryConfig<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> StructuredConfig<T> for StructuredMemoryConfig<T>
where
    T: Serialize + DeserializeOwned + Clone + Send,
{
    fn get(&self) -> Result<T, ConfigError> {
        let state = lock(&self.state);
        state.open()?;
        Ok(state.value.clone())
    }

    fn get_cached(&self) -> Result<T, ConfigError> {
        self.get()
    }

    fn set(&self, value: T) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        state.open()?;
        state.value = value;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        true
    }

    fn load(&self, _save: bool) -> Result<(), ConfigError> {
        lock(&self.state).open()
    }

    fn save(&self) -> Result<(), ConfigError> {
        lock(&self.state).open()
    }

    fn close(&self) -> Result<(), ConfigError> {
        lock(&self.state).close()
    }

    fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

/// Raw object tree held in memory.
#[derive(Debug)]
pub struct UnstructuredMemoryConfig {
    state: Mutex<State<Element>>,
}

impl UnstructuredMemoryConfig {
    /// Creates an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::new(Element::object())),
        }
    }

    /// Creates a config holding `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRoot`] unless `tree` is an object.
    pub fn with_tree(tree: Element) -> Result<Self, ConfigError> {
        require_root(&tree)?;
        Ok(Self {
            state: Mutex::new(State::new(tree)),
        })
    }
}

impl Default for UnstructuredMemoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl UnstructuredConfig for UnstructuredMemoryConfig {
    fn get(&self, path: &str) -> Result<Option<Value>, ConfigError> {
        let state = lock(&self.state);
        state.open()?;
        Ok(resolve(&state.value, path, true)?)
    }

    fn get_cached(&self, path: &str) -> Result<Option<Value>, ConfigError> {
        self.get(path)
    }

    fn set(&self, path: &str, value: Value) -> Result<(), ConfigError> {
        require_value(&value)?;
        let mut state = lock(&self.state);
        state.open()?;
        update(&mut state.value, path, value, true)?;
        Ok(())
    }

    fn tree(&self) -> Result<Element, ConfigError> {
        let state = lock(&self.state);
        state.open()?;
        Ok(state.value.clone())
    }

    fn set_tree(&self, tree: Element) -> Result<(), ConfigError> {
        require_root(&tree)?;
        let mut state = lock(&self.state);
        state.open()?;
        state.value = tree;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        true
    }

    fn load(&self, _save: bool) -> Result<(), ConfigError> {
        lock(&self.state).open()
    }

    fn save(&self) -> Result<(), ConfigError> {
        lock(&self.state).open()
    }

    fn close(&self) -> Result<(), ConfigError> {
        lock(&self.state).close()
    }

    fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}
