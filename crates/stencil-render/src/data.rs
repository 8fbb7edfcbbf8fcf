//! The root data object handed to templates.
//!
//! [`DataMap`] is a string-keyed map of MiniJinja values. Handlers fill it in;
//! the [`Renderer`](crate::Renderer) adds framework values on top.
//!
//! Framework keys are listed in [`RESERVED_KEYS`]. They are injected only into
//! the context of a single render and always take precedence: a handler value
//! stored under a reserved key is ignored (and logged), never merged.

use std::collections::BTreeMap;

use minijinja::Value;
use serde::Serialize;

/// Key of the render-duration value: a function returning the elapsed render
/// time, e.g. `{{ RenderDuration() }}` → `"3ms"`.
pub const RENDER_DURATION_KEY: &str = "RenderDuration";

/// Keys owned by the renderer.
pub const RESERVED_KEYS: &[&str] = &[RENDER_DURATION_KEY];

/// Returns true if `key` is owned by the renderer.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Template root data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMap {
    values: BTreeMap<String, Value>,
}

impl DataMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Inserts any serializable value.
    pub fn insert_serialize<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Option<Value> {
        self.insert(key, Value::from_serialize(value))
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds the render context: user entries plus `injected`, with
    /// injected values winning.
    pub(crate) fn with_injected(&self, injected: &[(&str, Value)]) -> BTreeMap<String, Value> {
        let mut ctx = self.values.clone();
        for (key, value) in injected {
            if ctx.contains_key(*key) {
                tracing::warn!(key = %key, "ignoring data value stored under a reserved key");
            }
            ctx.insert((*key).to_string(), value.clone());
        }
        ctx
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for DataMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
