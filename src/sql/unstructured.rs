//! Raw tree addressed row by row, straight against the table.

use std::fmt;
use std::sync::Mutex;

use tracing::debug;

use crate::config::{ConfigError, UnstructuredConfig, lock, require_root, require_value};
use crate::element::{Element, Value};
use crate::path::{Path, PathError};

use super::link::Link;
use super::rows::{self, Statements, Untyped};
use super::{SqlConnection, SqlConnector, SqlOptions, SqliteConnector};

struct State<C: SqlConnector> {
    closed: bool,
    link: Link<C>,
}

/// Raw object tree stored in a SQL table, with no local copy.
///
/// Every read and write is a round trip: `get` selects one row, `set`
/// replaces one row. The config therefore counts as always loaded, and
/// `load`/`save` only make sure a connection is available.
///
/// Only leaves have rows, so `get` on a container path returns `None`; use
/// [`tree`](UnstructuredConfig::tree) to see whole subtrees.
///
/// Leaf types are not preserved. A row holds text only, and reads guess the
/// kind from it: `null`, then boolean, integer, float, and string last. The
/// string `"42"` written through `set` therefore reads back as the integer
/// `42`, and the strings `"true"` and `"null"` as a boolean and `Null`.
///
/// Writes whose path or text overflow the table's columns fail with
/// [`ConfigError::Save`] and write nothing.
pub struct UnstructuredSqlConfig<C: SqlConnector = SqliteConnector> {
    table: String,
    statements: Statements,
    state: Mutex<State<C>>,
}

impl<C: SqlConnector> UnstructuredSqlConfig<C> {
    /// Creates a config. No connection is opened until the first operation
    /// that needs one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTableName`] if the table name is not a
    /// plain identifier.
    pub fn new(connector: C, options: SqlOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        let statements = Statements::new(&options.table);
        let link = Link::new(connector, options.connect, statements.create.clone());
        Ok(Self {
            table: options.table,
            statements,
            state: Mutex::new(State {
                closed: false,
                link,
            }),
        })
    }

    /// Opens a fresh connection and resets the reconnect counter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] after `close`, or
    /// [`ConfigError::Load`] if the connect fails.
    pub fn connect(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        state.link.connect().map_err(ConfigError::load)
    }

    /// Returns the number of reconnect attempts since the last successful
    /// connect.
    pub fn reconnect_attempts(&self) -> u32 {
        lock(&self.state).link.reconnect_attempts()
    }

    /// Returns `true` while a connection is held.
    pub fn is_connected(&self) -> bool {
        lock(&self.state).link.is_connected()
    }

    const fn open(state: &State<C>) -> Result<(), ConfigError> {
        if state.closed {
            Err(ConfigError::Closed)
        } else {
            Ok(())
        }
    }

    fn select_one(
        &self,
        connection: &mut C::Connection,
        path: &Path,
    ) -> Result<Option<Value>, ConfigError> {
        let key = path.to_string();
        let found = connection
            .query(&self.statements.select_one, &[key.as_str()])
            .map_err(ConfigError::load)?;
        let text = found.into_iter().next().map(|row| row.into_iter().next().flatten());
        Ok(text.and_then(|text| Value::of(&Element::from_stored(text.as_deref(), None), false)))
    }
}

/// Parses a path for a row lookup. A negative index can never name a row.
fn row_path(path: &str) -> Result<Option<Path>, ConfigError> {
    match path.parse::<Path>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(PathError::NegativeIndex { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl<C: SqlConnector> UnstructuredConfig for UnstructuredSqlConfig<C> {
    fn get(&self, path: &str) -> Result<Option<Value>, ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        let Some(parsed) = row_path(path)? else {
            return Ok(None);
        };
        let connection = state.link.connection(ConfigError::load)?;
        self.select_one(connection, &parsed)
    }

    fn get_cached(&self, path: &str) -> Result<Option<Value>, ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        let Some(parsed) = row_path(path)? else {
            return Ok(None);
        };
        let connection = state.link.current().ok_or(ConfigError::NotLoaded)?;
        self.select_one(connection, &parsed)
    }

    fn set(&self, path: &str, value: Value) -> Result<(), ConfigError> {
        require_value(&value)?;
        let mut state = lock(&self.state);
        Self::open(&state)?;
        let Some(parsed) = row_path(path)? else {
            return Ok(());
        };
        let key = parsed.to_string();
        let Some(text) = value.to_element().stored_text() else {
            return Err(ConfigError::ContainerValue { path: key });
        };
        rows::check_row(&key, &text).map_err(ConfigError::save)?;
        let connection = state.link.connection(ConfigError::save)?;
        connection
            .execute(&self.statements.replace, &[key.as_str(), text.as_str()])
            .map_err(ConfigError::save)?;
        debug!(table = %self.table, path = %key, "Wrote config row");
        Ok(())
    }

    fn tree(&self) -> Result<Element, ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        let connection = state.link.connection(ConfigError::load)?;
        let fetched = connection
            .query(&self.statements.select_all, &[])
            .map_err(ConfigError::load)?;
        Ok(rows::fold(Element::object(), fetched, Untyped::Infer))
    }

    fn set_tree(&self, tree: Element) -> Result<(), ConfigError> {
        require_root(&tree)?;
        let mut state = lock(&self.state);
        Self::open(&state)?;
        let leaves = rows::flatten(&tree);
        for (path, text) in &leaves {
            rows::check_row(path, text).map_err(ConfigError::save)?;
        }
        let connection = state.link.connection(ConfigError::save)?;
        for (path, text) in &leaves {
            connection
                .execute(&self.statements.replace, &[path.as_str(), text.as_str()])
                .map_err(ConfigError::save)?;
        }
        debug!(table = %self.table, written = leaves.len(), "Wrote config tree");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        !lock(&self.state).closed
    }

    fn load(&self, _save: bool) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        state.link.connection(ConfigError::load).map(|_| ())
    }

    fn save(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        state.link.connection(ConfigError::save).map(|_| ())
    }

    fn close(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        Self::open(&state)?;
        state.closed = true;
        state.link.disconnect();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

impl<C: SqlConnector> fmt::Debug for UnstructuredSqlConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnstructuredSqlConfig")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
