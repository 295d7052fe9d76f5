//! Flattening collector for nested `{name, value}` stat payloads.

use serde_json::Value;
use std::collections::HashMap;

/// Flat raw-field-name -> value mapping produced from one source fetch.
///
/// Values are kept as JSON so the alias resolver decides numeric
/// coercibility itself. `flatten` only inserts numbers; bags assembled by
/// hand with `insert` may hold numeric strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatBag {
    fields: HashMap<String, Value>,
}

impl RawStatBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field (last writer wins).
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawStatBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

/// Walk an arbitrary JSON tree and collect every `{name, value}` numeric leaf.
///
/// Pre-order depth-first: a mapping's own `{name, value}` pair is recorded
/// before its children are visited, children in document order. Duplicate
/// names overwrite earlier ones.
pub fn flatten(node: &Value) -> RawStatBag {
    let mut bag = RawStatBag::new();
    collect(node, &mut bag);
    bag
}

fn collect(node: &Value, out: &mut RawStatBag) {
    match node {
        Value::Object(map) => {
            let name = map.get("name").and_then(Value::as_str);
            let value = map.get("value").filter(|v| v.is_number());
            if let (Some(name), Some(value)) = (name, value) {
                if !name.is_empty() {
                    out.insert(name, value.clone());
                }
            }
            for child in map.values() {
                collect(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        _ => {}
    }
}
