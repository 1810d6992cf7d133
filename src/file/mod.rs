//! File-backed configs.
//!
//! A file config reads and writes one document through a [`Parser`] and a
//! [`ByteStore`]. The structured variant maps the document onto a typed
//! value; the unstructured variant keeps the raw tree.
//!
//! # Missing files
//!
//! Loading a structured config whose file does not exist writes the parser's
//! blank template first and then loads it, so the first `load(true)`
//! materializes every default. The unstructured variant parses the template
//! without touching the disk.

mod structured;
mod unstructured;



pub use structured::StructuredFileConfig;
pub use unstructured::UnstructuredFileConfig;

use std::path::Path;

use tracing::{debug, info};

use crate::config::ConfigError;
use crate::element::Element;
use crate::format::{self, Parser};
use crate::store::ByteStore;

/// Reads and parses the document at `path`.
///
/// With `create`, a missing file is first written from the parser's
/// template; otherwise the template is parsed in place.
fn read_tree<P, S>(parser: &P, store: &S, path: &Path, create: bool) -> Result<Element, ConfigError>
where
    P: Parser,
    S: ByteStore,
{
    let bytes = if store.exists(path) {
        store.read_all(path).map_err(ConfigError::load)?
    } else {
        let template = parser.empty_bytes();
        if create {
            info!(path = %path.display(), "Creating config file from template");
            store.write_all(path, &template).map_err(ConfigError::load)?;
        }
        template
    };
    let tree = format::parse_object(parser, &bytes).map_err(ConfigError::load)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Loaded config file");
    Ok(tree)
}

/// Serializes `tree` and writes it to `path`.
fn write_tree<P, S>(parser: &P, store: &S, path: &Path, tree: &Element) -> Result<(), ConfigError>
where
    P: Parser,
    S: ByteStore,
{
    let bytes = parser.to_bytes(tree).map_err(ConfigError::save)?;
    store.write_all(path, &bytes).map_err(ConfigError::save)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Saved config file");
    Ok(())
}
