//! Reads and writes over an [`Element`] tree by path.
//!
//! Reads never fail on a missing node; they return `None`. Writes in force
//! mode synthesize whatever intermediate containers are missing, choosing
//! each container's kind from the segment that follows it. Writes without
//! force are silent no-ops when any node along the path is missing.

use crate::element::{Element, Value};

use super::{Path, PathError, Segment, escape_key};

/// Parses `path`, mapping a negative index to "no such node".
fn parse(path: &str) -> Result<Option<Path>, PathError> {
    match path.parse::<Path>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(PathError::NegativeIndex { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolves `path` to a leaf-style value.
///
/// Primitive and null terminals are returned as-is. Container terminals are
/// summarized when `summarize_containers` is set and treated as absent
/// otherwise.
///
/// # Errors
///
/// Returns [`PathError`] if `path` is malformed. Missing nodes, type
/// mismatches and negative indices all yield `Ok(None)`.
pub fn resolve(
    tree: &Element,
    path: &str,
    summarize_containers: bool,
) -> Result<Option<Value>, PathError> {
    Ok(parse(path)?.and_then(|parsed| resolve_at(tree, &parsed, summarize_containers)))
}

/// [`resolve`] for an already parsed path.
#[must_use]
pub fn resolve_at(tree: &Element, path: &Path, summarize_containers: bool) -> Option<Value> {
    walk(tree, path.segments()).and_then(|node| Value::of(node, summarize_containers))
}

/// Borrows the node at `path`, containers included.
///
/// # Errors
///
/// Returns [`PathError`] if `path` is malformed.
pub fn resolve_element<'a>(tree: &'a Element, path: &str) -> Result<Option<&'a Element>, PathError> {
    Ok(parse(path)?.and_then(|parsed| walk(tree, parsed.segments())))
}

/// [`resolve_element`] for an already parsed path.
#[must_use]
pub fn resolve_element_at<'a>(tree: &'a Element, path: &Path) -> Option<&'a Element> {
    walk(tree, path.segments())
}

fn walk<'a>(tree: &'a Element, segments: &[Segment]) -> Option<&'a Element> {
    segments
        .iter()
        .try_fold(tree, |node, segment| match (node, segment) {
            (Element::Object(map), Segment::Key(key)) => map.get(key),
            (Element::Array(items), Segment::Index(index)) => items.get(*index),
            _ => None,
        })
}

/// Writes a leaf-style value at `path` and returns the tree for chaining.
///
/// The terminal node is replaced when it is a primitive or a placeholder
/// (null, empty object, empty array). Populated containers are left alone.
/// A [`Value::Container`] writes an empty container of the summarized kind,
/// so any value [`resolve`] returned can be written back.
///
/// When the terminal index is past the end of an array, the array is padded
/// with empty objects up to that index before the value is appended.
///
/// # Errors
///
/// Returns [`PathError`] if `path` is malformed.
pub fn update<'a>(
    tree: &'a mut Element,
    path: &str,
    value: impl Into<Value>,
    force: bool,
) -> Result<&'a mut Element, PathError> {
    if let Some(parsed) = parse(path)? {
        update_at(tree, &parsed, &value.into(), force);
    }
    Ok(tree)
}

/// [`update`] for an already parsed path.
pub fn update_at(tree: &mut Element, path: &Path, value: &Value, force: bool) {
    place(tree, path.segments(), value.to_element(), force, leaf_slot);
}

/// Places a whole subtree at `path`, replacing whatever is there.
///
/// # Errors
///
/// Returns [`PathError`] if `path` is malformed.
pub fn update_element<'a>(
    tree: &'a mut Element,
    path: &str,
    element: Element,
    force: bool,
) -> Result<&'a mut Element, PathError> {
    if let Some(parsed) = parse(path)? {
        place(tree, parsed.segments(), element, force, |_| true);
    }
    Ok(tree)
}

fn leaf_slot(existing: &Element) -> bool {
    !existing.is_container() || existing.is_placeholder()
}

fn place(
    tree: &mut Element,
    segments: &[Segment],
    element: Element,
    force: bool,
    replaceable: fn(&Element) -> bool,
) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = tree;
    for (i, segment) in parents.iter().enumerate() {
        let next = &segments[i + 1];
        match descend(node, segment, next, force) {
            Some(child) => node = child,
            None => return,
        }
    }

    match (node, last) {
        (Element::Object(map), Segment::Key(key)) => match map.get_mut(key) {
            Some(existing) if replaceable(existing) => *existing = element,
            Some(_) => {}
            None if force => {
                map.insert(key.clone(), element);
            }
            None => {}
        },
        (Element::Array(items), Segment::Index(index)) => match items.get_mut(*index) {
            Some(existing) if replaceable(existing) => *existing = element,
            Some(_) => {}
            None if force => {
                items.resize_with(*index, Element::object);
                items.push(element);
            }
            None => {}
        },
        _ => {}
    }
}

/// Steps from `node` into the child named by `segment`, synthesizing it (and
/// any array padding) in force mode. `next` decides the synthesized kind.
fn descend<'a>(
    node: &'a mut Element,
    segment: &Segment,
    next: &Segment,
    force: bool,
) -> Option<&'a mut Element> {
    let child = match (node, segment) {
        (Element::Object(map), Segment::Key(key)) => {
            if !map.contains_key(key) {
                if !force {
                    return None;
                }
                map.insert(key.clone(), container_for(next));
            }
            map.get_mut(key)?
        }
        (Element::Array(items), Segment::Index(index)) => {
            if *index >= items.len() {
                if !force {
                    return None;
                }
                items.resize_with(*index + 1, || container_for(next));
            }
            items.get_mut(*index)?
        }
        _ => return None,
    };

    // A placeholder of the wrong shape (e.g. padding synthesized for another
    // path) is swapped for the container this path needs.
    if force && child.is_placeholder() && !fits(child, next) {
        *child = container_for(next);
    }
    Some(child)
}

fn container_for(next: &Segment) -> Element {
    if next.is_index() {
        Element::array()
    } else {
        Element::object()
    }
}

const fn fits(node: &Element, next: &Segment) -> bool {
    matches!(
        (node, next),
        (Element::Object(_), Segment::Key(_)) | (Element::Array(_), Segment::Index(_))
    )
}

/// Lists the escaped path of every leaf in depth-first order, object entries
/// in insertion order and array items by index. With `include_containers`,
/// each container's own path precedes its children's.
///
/// Every returned path parses and resolves back to the node it was derived
/// from.
#[must_use]
pub fn keys(tree: &Element, include_containers: bool) -> Vec<String> {
    let mut out = Vec::new();
    collect(tree, "", include_containers, &mut out);
    out
}

fn collect(node: &Element, prefix: &str, include_containers: bool, out: &mut Vec<String>) {
    match node {
        Element::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    escape_key(key)
                } else {
                    format!("{prefix}.{}", escape_key(key))
                };
                visit(child, path, include_containers, out);
            }
        }
        Element::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                visit(child, format!("{prefix}[{index}]"), include_containers, out);
            }
        }
        Element::Null | Element::Primitive(_) => {}
    }
}

fn visit(child: &Element, path: String, include_containers: bool, out: &mut Vec<String>) {
    if child.is_container() {
        if include_containers {
            out.push(path.clone());
        }
        collect(child, &path, include_containers, out);
    } else {
        out.push(path);
    }
}
