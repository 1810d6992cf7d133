//! SQLite driver over `rusqlite`.

use std::time::Duration;

use rusqlite::{Connection, params_from_iter};

use super::{ConnectOptions, Row, SqlConnection, SqlConnector, SqlError};

/// Database name that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Opens SQLite databases.
///
/// `database` is the file path, or [`IN_MEMORY`]. Host, port and
/// credentials are ignored. Each in-memory connection is a fresh, empty
/// database, so reconnecting loses its contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

impl SqlConnector for SqliteConnector {
    type Connection = SqliteConnection;

    fn connect(&self, options: &ConnectOptions) -> Result<SqliteConnection, SqlError> {
        let opened = if options.database == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(&options.database)
        };
        let conn = opened.map_err(|e| SqlError::Connect {
            database: options.database.clone(),
            source: e.into(),
        })?;
        Ok(SqliteConnection { conn })
    }
}

/// An open SQLite database.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Connection,
}

impl SqlConnection for SqliteConnection {
    fn is_valid(&mut self, timeout: Duration) -> bool {
        self.conn.busy_timeout(timeout).is_ok()
            && self
                .conn
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .is_ok()
    }

    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize, SqlError> {
        self.conn
            .execute(sql, params_from_iter(params))
            .map_err(|e| SqlError::statement(sql, e))
    }

    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>, SqlError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| SqlError::statement(sql, e))?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                (0..columns)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<Result<Row, _>>()
            })
            .map_err(|e| SqlError::statement(sql, e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SqlError::statement(sql, e))
    }
}
