//! treecfg: path-addressable configuration trees
//!
//! A config is either *structured* (a typed, serde-mapped value) or
//! *unstructured* (a raw [`element::Element`] object tree). Both are read
//! and written by dotted paths such as `servers[0].host`, and persisted by
//! one of three backends:
//!
//! - [`memory`]: process-local, nothing persisted
//! - [`file`]: a whole document in JSON, TOML or YAML
//! - [`sql`]: one `(path, value)` row per leaf, with a TTL cache and
//!   bounded reconnects
//!
//! Every backend implements [`config::StructuredConfig`] or
//! [`config::UnstructuredConfig`] and shares the same lifecycle: `load`,
//! `save`, `close`.

pub mod config;
pub mod element;
pub mod file;
pub mod format;
pub mod mapper;
pub mod memory;
pub mod path;
pub mod sql;
pub mod store;
pub mod time;

#[cfg(test)]
mod test_support;
