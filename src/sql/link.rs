//! Connection manager with bounded reconnects.

use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::config::defaults::{CONNECT_VALIDITY_TIMEOUT, MAX_RECONNECTS, VALIDITY_TIMEOUT};

use super::{ConnectOptions, SqlConnection, SqlConnector, SqlError};

/// Owns one config's connection and its reconnect counter.
pub(crate) struct Link<C: SqlConnector> {
    connector: C,
    options: ConnectOptions,
    create_table: String,
    connection: Option<C::Connection>,
    reconnect_attempts: u32,
}

impl<C: SqlConnector> Link<C> {
    /// `create_table` runs on every fresh connection.
    pub fn new(connector: C, options: ConnectOptions, create_table: String) -> Self {
        Self {
            connector,
            options,
            create_table,
            connection: None,
            reconnect_attempts: 0,
        }
    }

    pub const fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens a fresh connection, replacing any current one, and resets the
    /// reconnect counter.
    pub fn connect(&mut self) -> Result<(), SqlError> {
        self.connection = None;
        let connection = self.open()?;
        self.connection = Some(connection);
        self.reconnect_attempts = 0;
        Ok(())
    }

    /// Drops the current connection.
    pub fn disconnect(&mut self) {
        if self.connection.take().is_some() {
            debug!(database = %self.options.database, "Closed SQL connection");
        }
    }

    /// Returns the current connection without checking or reconnecting.
    pub fn current(&mut self) -> Option<&mut C::Connection> {
        self.connection.as_mut()
    }

    /// Returns a live connection, reconnecting if the current one is dead
    /// or missing.
    ///
    /// Each reconnect counts one attempt; the counter resets when a connect
    /// succeeds. Once it exceeds [`MAX_RECONNECTS`] no connect is attempted
    /// and [`ConfigError::MaxReconnects`] is returned. Driver failures are
    /// mapped through `wrap`.
    pub fn connection(
        &mut self,
        wrap: fn(SqlError) -> ConfigError,
    ) -> Result<&mut C::Connection, ConfigError> {
        let alive = self
            .connection
            .as_mut()
            .is_some_and(|c| c.is_valid(VALIDITY_TIMEOUT));
        if alive {
            return self
                .connection
                .as_mut()
                .ok_or_else(|| wrap(SqlError::NotConnected));
        }

        if self.connection.take().is_some() {
            warn!(database = %self.options.database, "SQL connection lost");
        }
        self.reconnect_attempts = self.reconnect_attempts.saturating_add(1);
        if self.reconnect_attempts > MAX_RECONNECTS {
            return Err(ConfigError::MaxReconnects {
                attempts: self.reconnect_attempts,
            });
        }
        if self.reconnect_attempts > 1 {
            warn!(
                database = %self.options.database,
                attempt = self.reconnect_attempts,
                "Reconnecting to SQL database"
            );
        }

        let connection = self.open().map_err(wrap)?;
        self.reconnect_attempts = 0;
        Ok(self.connection.insert(connection))
    }

    /// Connects, checks validity and makes sure the table exists.
    fn open(&self) -> Result<C::Connection, SqlError> {
        let mut connection = self.connector.connect(&self.options)?;
        if !connection.is_valid(CONNECT_VALIDITY_TIMEOUT) {
            return Err(SqlError::InvalidConnection {
                database: self.options.database.clone(),
            });
        }
        connection.execute(&self.create_table, &[])?;
        info!(
            host = %self.options.host,
            port = self.options.port,
            database = %self.options.database,
            "Connected to SQL database"
        );
        Ok(connection)
    }
}
