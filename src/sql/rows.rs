//! Conversion between trees and flattened `(path, value)` rows.

use std::collections::HashMap;

use tracing::warn;

use crate::config::defaults::{PATH_COLUMN_LEN, VALUE_COLUMN_LEN};
use crate::element::{Element, Primitive, Value};
use crate::path::{Path, keys, resolve_element, resolve_element_at, update_at};

use super::{Row, SqlError};

/// SQL text for one table.
#[derive(Debug, Clone)]
pub(crate) struct Statements {
    pub create: String,
    pub select_all: String,
    pub select_one: String,
    pub replace: String,
}

impl Statements {
    /// Builds the statements for `table`, which must already be validated
    /// as a plain identifier.
    pub fn new(table: &str) -> Self {
        Self {
            create: format!(
                "CREATE TABLE IF NOT EXISTS {table} (path VARCHAR({PATH_COLUMN_LEN}) NOT NULL, \
                 value VARCHAR({VALUE_COLUMN_LEN}), PRIMARY KEY (path))"
            ),
            select_all: format!("SELECT path, value FROM {table}"),
            select_one: format!("SELECT value FROM {table} WHERE path = ?"),
            replace: format!("REPLACE INTO {table} (path, value) VALUES (?, ?)"),
        }
    }
}

/// Flattens a tree into `(path, stored text)` pairs, one per leaf.
///
/// Empty containers have no leaves and so produce no rows.
pub(crate) fn flatten(tree: &Element) -> Vec<(String, String)> {
    keys(tree, false)
        .into_iter()
        .filter_map(|path| {
            let text = resolve_element(tree, &path).ok().flatten()?.stored_text()?;
            Some((path, text))
        })
        .collect()
}

/// Checks a row against the column sizes of the table.
pub(crate) fn check_row(path: &str, text: &str) -> Result<(), SqlError> {
    for (column, cell, max) in [
        ("path", path, PATH_COLUMN_LEN),
        ("value", text, VALUE_COLUMN_LEN),
    ] {
        let len = cell.chars().count();
        if len > max {
            return Err(SqlError::TooLong {
                path: path.to_string(),
                column,
                len,
                max,
            });
        }
    }
    Ok(())
}

/// Collects `SELECT path, value` rows into a map. Rows with a `NULL` path
/// are dropped.
pub(crate) fn snapshot(rows: Vec<Row>) -> HashMap<String, Option<String>> {
    rows.into_iter()
        .filter_map(|row| {
            let mut cells = row.into_iter();
            let path = cells.next().flatten()?;
            Some((path, cells.next().flatten()))
        })
        .collect()
}

/// How [`fold`] reads a row with no scalar at its path in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Untyped {
    /// Keep the text as a string; the object mapper parses it later.
    Text,
    /// Guess the kind from the text.
    Infer,
}

/// Folds `SELECT path, value` rows into `tree`.
///
/// Rows are applied in path order, indices compared numerically, so arrays
/// grow densely. Each stored string is read back as the scalar kind found at
/// the same path in `tree`; elsewhere `untyped` decides. Rows whose path
/// does not parse are skipped with a warning.
pub(crate) fn fold(mut tree: Element, rows: Vec<Row>, untyped: Untyped) -> Element {
    let mut parsed: Vec<(Path, Option<String>)> = snapshot(rows)
        .into_iter()
        .filter_map(|(path, text)| match path.parse::<Path>() {
            Ok(parsed) => Some((parsed, text)),
            Err(e) => {
                warn!(path = %path, error = %e, "Skipping row with malformed path");
                None
            }
        })
        .collect();
    parsed.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, text) in parsed {
        let leaf = match resolve_element_at(&tree, &path) {
            Some(template @ Element::Primitive(_)) => {
                Element::from_stored(text.as_deref(), Some(template))
            }
            _ => match untyped {
                Untyped::Text => text.map_or(Element::Null, |text| Primitive::String(text).into()),
                Untyped::Infer => Element::from_stored(text.as_deref(), None),
            },
        };
        if let Some(value) = Value::of(&leaf, false) {
            update_at(&mut tree, &path, &value, true);
        }
    }
    tree
}
