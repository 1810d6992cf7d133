//! SQL store settings.
//!
//! [`SqlOptions`] is what the SQL configs are built from. It can be
//! assembled in code with the `with_*` builders or read from the `[sql]`
//! section of a TOML document through [`SqlSettings`].

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{ConfigError, defaults};

use super::ConnectOptions;

/// Everything a SQL config needs: where to connect, which table to use
/// and how long a load stays fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    /// Connection target and credentials
    pub connect: ConnectOptions,
    /// Table holding the `(path, value)` rows
    pub table: String,
    /// How long a loaded value is served without re-querying
    pub cache_length: Duration,
}

impl SqlOptions {
    /// Creates options for `table` in `database`, everything else default.
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            connect: ConnectOptions::new(database),
            table: table.into(),
            cache_length: defaults::cache_length(),
        }
    }

    /// Sets the server host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.connect.host = host.into();
        self
    }

    /// Sets the server port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.connect.port = port;
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.connect.username = Some(username.into());
        self.connect.password = Some(password.into());
        self
    }

    /// Sets the cache lifetime.
    #[must_use]
    pub const fn with_cache_length(mut self, cache_length: Duration) -> Self {
        self.cache_length = cache_length;
        self
    }

    /// Checks that the table name is a plain identifier, since it is
    /// spliced into SQL text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTableName`] otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut chars = self.table.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidTableName {
                name: self.table.clone(),
            })
        }
    }
}

/// Settings document root. Other sections are ignored so the `[sql]`
/// section can live in an application's own config file.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    sql: SqlSettings,
}

/// The `[sql]` section of a settings document.
///
/// All fields are optional in the document; `database` and `table` are
/// required by [`into_options`](Self::into_options).
///
/// ```toml
/// [sql]
/// host = "db.internal"
/// port = 3306
/// database = "app"
/// table = "settings"
/// username = "app"
/// password = "secret"
/// cache_length_secs = 5
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlSettings {
    /// Server host
    pub host: Option<String>,

    /// Server port
    pub port: Option<u16>,

    /// Database name (SQLite: file path)
    pub database: Option<String>,

    /// Table name
    pub table: Option<String>,

    /// Login user
    pub username: Option<String>,

    /// Login password
    pub password: Option<String>,

    /// Cache lifetime in seconds
    pub cache_length_secs: Option<u64>,
}

impl SqlSettings {
    /// Loads the `[sql]` section from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses the `[sql]` section from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or has unknown fields.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(content)?;
        Ok(file.sql)
    }

    /// Resolves the settings into options, filling unset fields from
    /// [`defaults`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] if `database` or `table` is
    /// unset, or [`ConfigError::InvalidTableName`].
    pub fn into_options(self) -> Result<SqlOptions, ConfigError> {
        let database = self
            .database
            .ok_or(ConfigError::MissingSetting { field: "database" })?;
        let table = self
            .table
            .ok_or(ConfigError::MissingSetting { field: "table" })?;

        let options = SqlOptions {
            connect: ConnectOptions {
                host: self.host.unwrap_or_else(|| defaults::HOST.to_string()),
                port: self.port.unwrap_or(defaults::PORT),
                database,
                username: self.username,
                password: self.password,
            },
            table,
            cache_length: self
                .cache_length_secs
                .map_or_else(defaults::cache_length, Duration::from_secs),
        };
        options.validate()?;
        Ok(options)
    }
}
