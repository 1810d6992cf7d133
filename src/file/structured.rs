//! Typed value persisted as a single document.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{ConfigError, StructuredConfig, lock};
use crate::element::Element;
use crate::format::{JsonParser, Parser, TomlParser, YamlParser};
use crate::mapper;
use crate::store::{ByteStore, FsByteStore};

use super::{read_tree, write_tree};

#[derive(Debug)]
struct State<T> {
    value: T,
    loaded: bool,
    closed: bool,
}

/// Typed config stored in one file.
///
/// The file's tree is overlaid on the current value when loading: keys the
/// file lacks keep their current (default) values, and `load(true)` writes
/// them back so the file ends up complete.
///
/// # Example
///
/// ```no_run
/// use serde::{Deserialize, Serialize};
/// use treecfg::config::StructuredConfig;
/// use treecfg::file::StructuredFileConfig;
///
/// #[derive(Clone, Default, Serialize, Deserialize)]
/// struct App {
///     name: String,
///     workers: u32,
/// }
///
/// let config = StructuredFileConfig::toml("app.toml", App::default());
/// config.load(true)?;
/// let app = config.get()?;
/// # Ok::<(), treecfg::config::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct StructuredFileConfig<T, P, S = FsByteStore> {
    path: PathBuf,
    parser: P,
    store: S,
    state: Mutex<State<T>>,
}

impl<T, P: Parser> StructuredFileConfig<T, P> {
    /// Creates a config for `path` seeded with `default`.
    ///
    /// Nothing is read until the first access.
    pub fn new(path: impl Into<PathBuf>, parser: P, default: T) -> Self {
        Self::with_store(path, parser, FsByteStore, default)
    }
}

impl<T> StructuredFileConfig<T, JsonParser> {
    /// Creates a config for a JSON file.
    pub fn json(path: impl Into<PathBuf>, default: T) -> Self {
        Self::new(path, JsonParser::new(), default)
    }
}

impl<T> StructuredFileConfig<T, TomlParser> {
    /// Creates a config for a TOML file.
    pub fn toml(path: impl Into<PathBuf>, default: T) -> Self {
        Self::new(path, TomlParser, default)
    }
}

impl<T> StructuredFileConfig<T, YamlParser> {
    /// Creates a config for a YAML file.
    pub fn yaml(path: impl Into<PathBuf>, default: T) -> Self {
        Self::new(path, YamlParser, default)
    }
}

impl<T, P: Parser, S: ByteStore> StructuredFileConfig<T, P, S> {
    /// Creates a config that goes through a custom byte store.
    pub fn with_store(path: impl Into<PathBuf>, parser: P, store: S, default: T) -> Self {
        Self {
            path: path.into(),
            parser,
            store,
            state: Mutex::new(State {
                value: default,
                loaded: false,
                closed: false,
            }),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T, P, S> StructuredFileConfig<T, P, S>
where
    T: Serialize + DeserializeOwned + Clone,
    P: Parser,
    S: ByteStore,
{
    fn load_locked(&self, state: &mut State<T>, save: bool) -> Result<(), ConfigError> {
        let file = read_tree(&self.parser, &self.store, &self.path, true)?;
        let mut tree = mapper::to_element(&state.value)?;
        overlay(&mut tree, file);
        state.value = mapper::from_element(tree).map_err(ConfigError::load)?;
        state.loaded = true;
        if save {
            self.save_locked(state)?;
        }
        Ok(())
    }

    fn save_locked(&self, state: &State<T>) -> Result<(), ConfigError> {
        if !state.loaded {
            return Err(ConfigError::NotLoaded);
        }
        let tree = mapper::to_element(&state.value)?;
        write_tree(&self.parser, &self.store, &self.path, &tree)
    }
}

/// Merges `source` into `target`: objects merge key by key, anything else
/// from `source` replaces what `target` holds.
fn overlay(target: &mut Element, source: Element) {
    match (target, source) {
        (Element::Object(into), Element::Object(from)) => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

impl<T, P, S> StructuredConfig<T> for StructuredFileConfig<T, P, S>
where
    T: Serialize + DeserializeOwned + Clone + Send,
    P: Parser,
    S: ByteStore,
{
    fn get(&self) -> Result<T, ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        if !state.loaded {
            self.load_locked(&mut state, false)?;
        }
        Ok(state.value.clone())
    }

    fn get_cached(&self) -> Result<T, ConfigError> {
        let state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        if !state.loaded {
            return Err(ConfigError::NotLoaded);
        }
        Ok(state.value.clone())
    }

    fn set(&self, value: T) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        state.value = value;
        state.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        lock(&self.state).loaded
    }

    fn load(&self, save: bool) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        self.load_locked(&mut state, save)
    }

    fn save(&self) -> Result<(), ConfigError> {
        let state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        self.save_locked(&state)
    }

    fn close(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        state.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}
