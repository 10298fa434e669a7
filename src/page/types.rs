//! Page types
//!
//! `PageResponse` is the decoded form of one fetched page, `PageLayout`
//! performs the decoding.

use crate::config::{PageConfig, PaginationConfigDef};
use crate::error::{Error, Result};
use crate::types::{JsonValue, OptionStringExt};

/// One fetched page
///
/// Created per fetch, consumed when its items are merged into the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResponse {
    /// Item records in the order the server returned them
    pub items: Vec<JsonValue>,
    /// Raw next-page link, if the page carries one
    pub next_link: Option<String>,
}

impl PageResponse {
    /// Create a page
    pub fn new(items: Vec<JsonValue>, next_link: Option<String>) -> Self {
        Self { items, next_link }
    }

    /// An empty page with no navigation
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Describes where items and navigation live in a response body
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Dotted path to the item array (empty = the body itself)
    items_path: String,
    /// Dotted path to the next link (None when pagination is not link based)
    next_path: Option<String>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::new("items", Some("links.next".to_string()))
    }
}

impl PageLayout {
    /// Create a layout
    pub fn new(items_path: impl Into<String>, next_path: Option<String>) -> Self {
        Self {
            items_path: items_path.into(),
            next_path,
        }
    }

    /// Build the layout described by a page config
    pub fn from_config(config: &PageConfig) -> Self {
        let next_path = match &config.pagination {
            PaginationConfigDef::NextLink { path, .. } => Some(path.clone()),
            PaginationConfigDef::PageNumber { .. } => None,
        };
        Self::new(config.items_path.clone(), next_path)
    }

    /// Path of the item array
    pub fn items_path(&self) -> &str {
        &self.items_path
    }

    /// Path of the next link
    pub fn next_path(&self) -> Option<&str> {
        self.next_path.as_deref()
    }

    /// Decode a response body into a page
    ///
    /// A `null` body (what an empty response parses to) and a bare empty
    /// array both decode to an empty page with no next link.
    pub fn decode(&self, mut body: JsonValue) -> Result<PageResponse> {
        match &body {
            JsonValue::Null => return Ok(PageResponse::empty()),
            JsonValue::Array(arr) if arr.is_empty() => return Ok(PageResponse::empty()),
            _ => {}
        }

        let next_link = match &self.next_path {
            Some(path) => extract_next_link(&body, path)?,
            None => None,
        };

        let items = match lookup_path_mut(&mut body, &self.items_path).map(JsonValue::take) {
            Some(JsonValue::Array(items)) => items,
            Some(JsonValue::Null) => Vec::new(),
            Some(other) => {
                return Err(Error::parse(format!(
                    "expected an array at '{}', found {}",
                    self.items_path,
                    type_name(&other)
                )))
            }
            None => {
                return Err(Error::parse(format!(
                    "response has no item list at '{}'",
                    self.items_path
                )))
            }
        };

        Ok(PageResponse::new(items, next_link))
    }
}

/// Read the next link at `path`
fn extract_next_link(body: &JsonValue, path: &str) -> Result<Option<String>> {
    match lookup_path(body, path) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(link)) => Ok(link.clone().none_if_blank()),
        Some(other) => Err(Error::parse(format!(
            "next link at '{path}' must be a string, found {}",
            type_name(other)
        ))),
    }
}

/// Look up a value by dotted path
///
/// Supports an optional `$.` prefix and numeric segments for array indices.
/// An empty path (or `$`) returns the value itself.
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = value;
    for part in segments(path) {
        current = match current {
            JsonValue::Object(map) => map.get(part)?,
            JsonValue::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn lookup_path_mut<'a>(value: &'a mut JsonValue, path: &str) -> Option<&'a mut JsonValue> {
    let mut current = value;
    for part in segments(path) {
        current = match current {
            JsonValue::Object(map) => map.get_mut(part)?,
            JsonValue::Array(arr) => arr.get_mut(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .unwrap_or(if path == "$" { "" } else { path });
    path.split('.').filter(|part| !part.is_empty())
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
