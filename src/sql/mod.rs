//! SQL-backed configs.
//!
//! The tree is persisted as flattened `(path, value)` rows in one table.
//! Every leaf becomes one row keyed by its escaped path; values are stored
//! as text and their scalar kind is reconstructed on load.
//!
//! # Connection handling
//!
//! Connections are opened lazily. Before each round trip the current
//! connection is checked for liveness; a dead or missing connection counts
//! one reconnect attempt. Once more than [`MAX_RECONNECTS`] attempts pile up
//! without a successful connect, calls fail with
//! [`ConfigError::MaxReconnects`] and no further automatic attempts are made
//! until an explicit `connect()` succeeds.
//!
//! [`MAX_RECONNECTS`]: crate::config::defaults::MAX_RECONNECTS
//! [`ConfigError::MaxReconnects`]: crate::config::ConfigError::MaxReconnects

mod link;
mod rows;
mod settings;
mod sqlite;
mod structured;
mod unstructured;


#[cfg(test)]
#[path = "structured_tests.rs"]
mod structured_tests;


pub use settings::{SqlOptions, SqlSettings};
pub use sqlite::{IN_MEMORY, SqliteConnection, SqliteConnector};
pub use structured::StructuredSqlConfig;
pub use unstructured::UnstructuredSqlConfig;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::{BoxError, defaults};

/// One result row; `None` is SQL `NULL`.
pub type Row = Vec<Option<String>>;

/// Error type for SQL driver operations.
#[derive(Debug, Error)]
pub enum SqlError {
    /// Opening the connection failed.
    #[error("Failed to connect to '{database}': {source}")]
    Connect {
        /// Database the connection was for
        database: String,
        /// Underlying driver error
        #[source]
        source: BoxError,
    },

    /// A freshly opened connection failed its validity check.
    #[error("Connection to '{database}' failed its validity check")]
    InvalidConnection {
        /// Database the connection was for
        database: String,
    },

    /// A statement failed.
    #[error("Statement failed: {sql}: {source}")]
    Statement {
        /// The statement text
        sql: String,
        /// Underlying driver error
        #[source]
        source: BoxError,
    },

    /// No connection is open.
    #[error("Not connected")]
    NotConnected,

    /// A row does not fit its column.
    #[error("{column} of row '{path}' is {len} characters, the column holds {max}")]
    TooLong {
        /// Path of the offending row
        path: String,
        /// `path` or `value`
        column: &'static str,
        /// Length in characters
        len: usize,
        /// Column capacity
        max: usize,
    },
}

impl SqlError {
    /// Wraps a driver error raised by `sql`.
    pub fn statement(sql: &str, source: impl Into<BoxError>) -> Self {
        Self::Statement {
            sql: sql.to_string(),
            source: source.into(),
        }
    }
}

/// Where and as whom to connect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database (for SQLite, the file path or `:memory:`)
    pub database: String,
    /// Login user
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
}

impl ConnectOptions {
    /// Creates options for `database` on the default host and port.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            database: database.into(),
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Opens connections.
pub trait SqlConnector: Send + Sync {
    /// Connection type produced.
    type Connection: SqlConnection;

    /// Opens a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Connect`] if the database is unreachable.
    fn connect(&self, options: &ConnectOptions) -> Result<Self::Connection, SqlError>;
}

/// An open connection.
///
/// Parameters are bound positionally to `?` placeholders, always as text.
pub trait SqlConnection: Send {
    /// Returns `true` if the connection answers within `timeout`.
    fn is_valid(&mut self, timeout: Duration) -> bool;

    /// Runs a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Statement`] on driver failure.
    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize, SqlError>;

    /// Runs a query and returns every row, all columns read as text.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Statement`] on driver failure.
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>, SqlError>;
}
