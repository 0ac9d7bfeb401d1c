//! Per-resolution shared state

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Named values shared across the hops of one top-level resolution
///
/// A scratchpad is a cheap handle: clones share the same underlying map, so
/// a value saved by a `save_as` hop is visible to every predicate evaluated
/// later in the same resolution. Allocate a fresh scratchpad per logical
/// resolution; reusing one across unrelated resolutions leaks saved values
/// between them.
///
/// Access is synchronized, so logically concurrent branches of a single
/// resolution may share a scratchpad safely.
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    entries: Arc<DashMap<String, Value>>,
}

impl Scratchpad {
    /// Creates an empty scratchpad
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a value under `name`, overwriting any previous value
    pub fn save(&self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    /// Returns the value saved under `name`, if any
    pub fn load(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Checks whether a value was saved under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of saved values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_and_load() {
        let pad = Scratchpad::new();
        assert!(pad.is_empty());
        assert!(pad.load("user").is_none());

        pad.save("user", json!({ "name": "alice" }));
        assert_eq!(pad.load("user"), Some(json!({ "name": "alice" })));
        assert!(pad.contains("user"));
        assert_eq!(pad.len(), 1);
    }

    #[test]
    fn test_save_overwrites() {
        let pad = Scratchpad::new();
        pad.save("key", json!(1));
        pad.save("key", json!(2));
        assert_eq!(pad.load("key"), Some(json!(2)));
        assert_eq!(pad.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let pad = Scratchpad::new();
        let handle = pad.clone();

        pad.save("seen", json!(true));
        assert_eq!(handle.load("seen"), Some(json!(true)));

        handle.save("other", json!("x"));
        assert_eq!(pad.len(), 2);
    }

    #[test]
    fn test_fresh_scratchpads_are_independent() {
        let a = Scratchpad::new();
        let b = Scratchpad::new();

        a.save("key", json!("a"));
        assert!(b.load("key").is_none());
    }
}
