//! Append-only item accumulation
//!
//! A [`ResultAccumulator`] is owned by exactly one traversal. It is created
//! fresh for every `fetch_all` call and dropped with the traversal, so
//! unrelated traversals can never see each other's items.

use crate::types::JsonValue;

/// Ordered, append-only collection of ingested items
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    items: Vec<JsonValue>,
}

impl ResultAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of items, preserving their order
    pub fn append(&mut self, items: Vec<JsonValue>) {
        self.items.extend(items);
    }

    /// Items accumulated so far
    pub fn snapshot(&self) -> &[JsonValue] {
        &self.items
    }

    /// Number of items accumulated so far
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the accumulator and return its items
    pub fn into_items(self) -> Vec<JsonValue> {
        self.items
    }
}
