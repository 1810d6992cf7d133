//! Raw tree persisted as a single document.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::{ConfigError, UnstructuredConfig, lock, require_root, require_value};
use crate::element::{Element, Value};
use crate::format::{JsonParser, Parser, TomlParser, YamlParser};
use crate::path::{resolve, update};
use crate::store::{ByteStore, FsByteStore};

use super::{read_tree, write_tree};

#[derive(Debug)]
struct State {
    tree: Option<Element>,
    closed: bool,
}

/// Raw object tree stored in one file.
///
/// Unlike [`StructuredFileConfig`](super::StructuredFileConfig), saving an
/// unloaded config is allowed and writes an empty document.
#[derive(Debug)]
pub struct UnstructuredFileConfig<P, S = FsByteStore> {
    path: PathBuf,
    parser: P,
    store: S,
    state: Mutex<State>,
}

impl<P: Parser> UnstructuredFileConfig<P> {
    /// Creates a config for `path`.
    pub fn new(path: impl Into<PathBuf>, parser: P) -> Self {
        Self::with_store(path, parser, FsByteStore)
    }
}

impl UnstructuredFileConfig<JsonParser> {
    /// Creates a config for a JSON file.
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self::new(path, JsonParser::new())
    }
}

impl UnstructuredFileConfig<TomlParser> {
    /// Creates a config for a TOML file.
    pub fn toml(path: impl Into<PathBuf>) -> Self {
        Self::new(path, TomlParser)
    }
}

impl UnstructuredFileConfig<YamlParser> {
    /// Creates a config for a YAML file.
    pub fn yaml(path: impl Into<PathBuf>) -> Self {
        Self::new(path, YamlParser)
    }
}

impl<P: Parser, S: ByteStore> UnstructuredFileConfig<P, S> {
    /// Creates a config that goes through a custom byte store.
    pub fn with_store(path: impl Into<PathBuf>, parser: P, store: S) -> Self {
        Self {
            path: path.into(),
            parser,
            store,
            state: Mutex::new(State {
                tree: None,
                closed: false,
            }),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(state: &State) -> Result<(), ConfigError> {
        if state.closed {
            Err(ConfigError::Closed)
        } else {
            Ok(())
        }
    }

    /// Returns the loaded tree, loading it first if needed.
    fn loaded<'a>(&self, state: &'a mut State) -> Result<&'a mut Element, ConfigError> {
        Self::open(state)?;
        if state.tree.is_none() {
            self.load_locked(state, false)?;
        }
        Ok(state.tree.get_or_insert_with(Element::object))
    }

    fn load_locked(&self, state: &mut State, save: bool) -> Result<(), ConfigError> {
        let tree = read_tree(&self.parser, &self.store, &self.path, false)?;
        state.tree = Some(tree);
        if save {
            self.save_locked(state)?;
        }
        Ok(())
    }

    fn save_locked(&self, state: &State) -> Result<(), ConfigError> {
        let empty = Element::object();
        let tree = state.tree.as_ref().unwrap_or(&empty);
        write_tree(&self.parser, &self.store, &self.path, tree)
    }
}

impl<P: Parser, S: ByteStore> UnstructuredConfig for UnstructuredFileConfig<P, S> {
    fn get(&self, path: &str) -> Result<Option<Value>, ConfigError> {
        let mut state = lock(&self.state);
        let tree = self.loaded(&mut state)?;
        Ok(resolve(tree, path, true)?)
    }

    fn get_cached(&self, path: &str) -> Result<Option<Value>, ConfigError> {
        let state = lock(&self.state);
        Self::open(&state)?;
        match &state.tree {
            Some(tree) => Ok(resolve(tree, path, true)?),
            None => Err(ConfigError::NotLoaded),
        }
    }

    fn set(&self, path: &str, value: Value) -> Result<(), ConfigError> {
        require_value(&value)?;
        let mut state = lock(&self.state);
        let tree = self.loaded(&mut state)?;
        update(tree, path, value, true)?;
        Ok(())
    }

    fn tree(&self) -> Result<Element, ConfigError> {
        let mut state = lock(&self.state);
        Ok(self.loaded(&mut state)?.clone())
    }

    fn set_tree(&self, tree: Element) -> Result<(), ConfigError> {
        require_root(&tree)?;
        let mut state = lock(&self.state);
        Self::open(&state)?;
        state.tree = Some(tree);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        lock(&self.state).tree.is_some()
    }

    fn load(&self, save: bool) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        self.load_locked(&mut state, save)
    }

    fn save(&self) -> Result<(), ConfigError> {
        let state = lock(&self.state);
        Self::open(&state)?;
        self.save_locked(&state)
    }

    fn close(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        state.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}
