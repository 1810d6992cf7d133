//! Typed value persisted as `(path, value)` rows with a TTL cache.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ConfigError, StructuredConfig, lock};
use crate::mapper;
use crate::time::{Clock, SystemClock};

use super::link::Link;
use super::rows::{self, Statements, Untyped};
use super::{SqlConnection, SqlConnector, SqlOptions, SqliteConnector};

struct State<T, C: SqlConnector> {
    value: T,
    /// Absolute expiry of the last load; `None` until the first one.
    expires: Option<SystemTime>,
    closed: bool,
    link: Link<C>,
}

/// Typed config stored in a SQL table.
///
/// A load stays fresh for the configured cache length: [`get`] serves the
/// in-memory value until it expires and then transparently reloads.
/// [`save`] only writes rows whose stored text differs from the table's and
/// never deletes rows, so keys added by other writers survive. A leaf whose
/// path or text overflows its column fails the save before anything is
/// written.
///
/// Loading overlays the rows on the current value, which also acts as the
/// type template: each stored string is parsed as the scalar kind the
/// current value holds at that path.
///
/// [`get`]: StructuredConfig::get
/// [`save`]: StructuredConfig::save
pub struct StructuredSqlConfig<T, C: SqlConnector = SqliteConnector> {
    table: String,
    statements: Statements,
    cache_length: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<State<T, C>>,
}

impl<T, C: SqlConnector> StructuredSqlConfig<T, C> {
    /// Creates a config seeded with `default`. No connection is opened until
    /// the first operation that needs one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTableName`] if the table name is not a
    /// plain identifier.
    pub fn new(connector: C, options: SqlOptions, default: T) -> Result<Self, ConfigError> {
        options.validate()?;
        let statements = Statements::new(&options.table);
        let link = Link::new(connector, options.connect, statements.create.clone());
        Ok(Self {
            table: options.table,
            statements,
            cache_length: options.cache_length,
            clock: Arc::new(SystemClock),
            state: Mutex::new(State {
                value: default,
                expires: None,
                closed: false,
                link,
            }),
        })
    }

    /// Replaces the clock used for cache expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Opens a fresh connection and resets the reconnect counter, re-arming
    /// automatic reconnects after [`ConfigError::MaxReconnects`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] after `close`, or
    /// [`ConfigError::Load`] if the connect fails.
    pub fn connect(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
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
}

impl<T, C> StructuredSqlConfig<T, C>
where
    T: Serialize + DeserializeOwned + Clone,
    C: SqlConnector,
{
    fn fresh(&self, state: &State<T, C>) -> bool {
        !state.closed && state.expires.is_some_and(|t| self.clock.is_before(t))
    }

    fn load_locked(&self, state: &mut State<T, C>, save: bool) -> Result<(), ConfigError> {
        let connection = state.link.connection(ConfigError::load)?;
        let fetched = connection
            .query(&self.statements.select_all, &[])
            .map_err(ConfigError::load)?;
        let count = fetched.len();

        let template = mapper::to_element(&state.value)?;
        let tree = rows::fold(template, fetched, Untyped::Text);
        state.value = mapper::from_element(tree).map_err(ConfigError::load)?;
        state.expires = Some(self.clock.expiry_after(self.cache_length));
        debug!(table = %self.table, rows = count, "Loaded config from SQL");

        if save {
            self.save_locked(state)?;
        }
        Ok(())
    }

    fn save_locked(&self, state: &mut State<T, C>) -> Result<(), ConfigError> {
        let local = rows::flatten(&mapper::to_element(&state.value)?);
        for (path, text) in &local {
            rows::check_row(path, text).map_err(ConfigError::save)?;
        }
        let connection = state.link.connection(ConfigError::save)?;
        let remote = rows::snapshot(
            connection
                .query(&self.statements.select_all, &[])
                .map_err(ConfigError::save)?,
        );

        let mut written = 0_usize;
        for (path, text) in &local {
            let unchanged = remote
                .get(path)
                .is_some_and(|stored| stored.as_deref() == Some(text.as_str()));
            if unchanged {
                continue;
            }
            connection
                .execute(&self.statements.replace, &[path.as_str(), text.as_str()])
                .map_err(ConfigError::save)?;
            written += 1;
        }
        debug!(
            table = %self.table,
            leaves = local.len(),
            written,
            "Saved config to SQL"
        );
        Ok(())
    }
}

impl<T, C> StructuredConfig<T> for StructuredSqlConfig<T, C>
where
    T: Serialize + DeserializeOwned + Clone + Send,
    C: SqlConnector,
{
    fn get(&self) -> Result<T, ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        if !self.fresh(&state) {
            self.load_locked(&mut state, false)?;
        }
        Ok(state.value.clone())
    }

    fn get_cached(&self) -> Result<T, ConfigError> {
        let state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        if state.expires.is_none() {
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
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.fresh(&lock(&self.state))
    }

    fn load(&self, save: bool) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        self.load_locked(&mut state, save)
    }

    fn save(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        self.save_locked(&mut state)
    }

    fn close(&self) -> Result<(), ConfigError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(ConfigError::Closed);
        }
        state.closed = true;
        state.expires = None;
        state.link.disconnect();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

impl<T, C: SqlConnector> fmt::Debug for StructuredSqlConfig<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredSqlConfig")
            .field("table", &self.table)
            .field("cache_length", &self.cache_length)
            .finish_non_exhaustive()
    }
}
