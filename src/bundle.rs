//! Translation bundles: one nested key tree per (language, namespace).
//!
//! Keys are dot-delimited paths. Canonical leaves are strings; raw JSON may
//! nest arbitrarily, and any non-string value is treated as a sub-tree for
//! recursive operations.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// The translated strings for one `(language, namespace)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationBundle {
    language: String,
    namespace: String,
    tree: Value,
}

impl TranslationBundle {
    /// Wrap a raw JSON tree. Non-object roots are normalized to an empty
    /// object so lookups stay total.
    pub fn new(language: impl Into<String>, namespace: impl Into<String>, tree: Value) -> Self {
        let tree = if tree.is_object() {
            tree
        } else {
            Value::Object(Map::new())
        };
        Self {
            language: language.into(),
            namespace: namespace.into(),
            tree,
        }
    }

    pub fn empty(language: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(language, namespace, Value::Object(Map::new()))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Look up a dotted key path; only string leaves resolve.
    pub fn get(&self, key: &str) -> Option<&str> {
        let mut node = &self.tree;
        for segment in key.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str()
    }

    /// Write a string leaf at a dotted key path, creating intermediate
    /// objects as needed. A non-object node on the path is replaced.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut node = &mut self.tree;
        let segments: Vec<&str> = key.split('.').collect();
        for segment in &segments[..segments.len() - 1] {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = node
                .as_object_mut()
                .expect("node was just normalized to an object")
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node.as_object_mut()
            .expect("node was just normalized to an object")
            .insert(
                segments[segments.len() - 1].to_string(),
                Value::String(value.to_string()),
            );
    }

    /// Flatten the tree into `dotted key -> string leaf`, recursing through
    /// objects and skipping non-string scalars.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        flatten_into(&self.tree, String::new(), &mut out);
        out
    }

    /// Number of string leaves in the tree.
    pub fn key_count(&self) -> usize {
        self.flatten().len()
    }
}

fn flatten_into(node: &Value, prefix: String, out: &mut BTreeMap<String, String>) {
    match node {
        Value::Object(map) => {
            for (segment, child) in map {
                let path = if prefix.is_empty() {
                    segment.clone()
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten_into(child, path, out);
            }
        }
        Value::String(leaf) => {
            out.insert(prefix, leaf.clone());
        }
        // Arrays, numbers, booleans and nulls are not translatable leaves.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle(tree: Value) -> TranslationBundle {
        TranslationBundle::new("en", "common", tree)
    }

    #[test]
    fn test_get_nested_key() {
        let b = bundle(json!({"actions": {"save": "Save", "cancel": "Cancel"}}));
        assert_eq!(b.get("actions.save"), Some("Save"));
        assert_eq!(b.get("actions.cancel"), Some("Cancel"));
    }

    #[test]
    fn test_get_missing_and_non_string() {
        let b = bundle(json!({"a": {"b": 42}, "c": "x"}));
        assert_eq!(b.get("a.b"), None);
        assert_eq!(b.get("a.missing"), None);
        assert_eq!(b.get("c.too.deep"), None);
        assert_eq!(b.get("c"), Some("x"));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut b = TranslationBundle::empty("en", "common");
        b.set("deep.nested.key", "value");
        assert_eq!(b.get("deep.nested.key"), Some("value"));
    }

    #[test]
    fn test_set_overwrites_existing_leaf() {
        let mut b = bundle(json!({"title": "Old"}));
        b.set("title", "New");
        assert_eq!(b.get("title"), Some("New"));
    }

    #[test]
    fn test_set_replaces_scalar_on_path() {
        let mut b = bundle(json!({"a": "leaf"}));
        b.set("a.b", "value");
        assert_eq!(b.get("a.b"), Some("value"));
    }

    #[test]
    fn test_flatten_recurses_and_skips_non_strings() {
        let b = bundle(json!({
            "a": {"b": "x", "count": 3},
            "c": "y",
            "list": ["ignored"],
        }));
        let flat = b.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get("a.b").map(String::as_str), Some("x"));
        assert_eq!(flat.get("c").map(String::as_str), Some("y"));
    }

    #[test]
    fn test_key_count() {
        let b = bundle(json!({"a": {"b": "1", "c": "2"}, "d": "3"}));
        assert_eq!(b.key_count(), 3);
    }

    #[test]
    fn test_non_object_root_is_normalized() {
        let b = bundle(json!("just a string"));
        assert_eq!(b.key_count(), 0);
        assert_eq!(b.get("anything"), None);
    }
}
