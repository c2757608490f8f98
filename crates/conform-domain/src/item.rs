use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reserved `metadata` keys (§3).
pub const META_TYPE: &str = "type";
pub const META_FILE: &str = "file";
pub const META_ERROR: &str = "error";

/// `metadata["type"]` values identifying a node's roll-up level.
pub const TYPE_SUMMARY: &str = "summary";
pub const TYPE_NODE: &str = "node";
pub const TYPE_FILE: &str = "file";

/// The canonical hierarchical result node (§3). A node with no children is a
/// leaf; an interior node's `status` is derived by the aggregation engine and
/// any value set here before aggregation is overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Item {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Item {
            name: name.into(),
            status: status.into(),
            metadata: HashMap::new(),
            details: HashMap::new(),
            items: Vec::new(),
        }
    }

    /// An item with no name and no children is treated as `empty` (§4.3).
    pub fn is_empty_root(&self) -> bool {
        self.name.is_empty() && self.items.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Mark this item as an unparseable artifact: forces `status=unknown`
    /// and records the failure reason (IV5).
    pub fn mark_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.metadata.insert(META_ERROR.to_string(), message.into());
        self.status = "unknown".to_string();
        self
    }

    /// Post-order depth-first walk: children are visited before their
    /// parent, siblings in insertion order (IV3). Stops and returns the
    /// first error `visit` produces.
    pub fn walk<E>(&self, visit: &mut impl FnMut(&Item) -> Result<(), E>) -> Result<(), E> {
        for child in &self.items {
            child.walk(visit)?;
        }
        visit(self)
    }

    /// Pre-order depth-first search for the first node named `name`.
    pub fn subtree_by_name(&self, name: &str) -> Option<&Item> {
        if self.name == name {
            return Some(self);
        }
        for child in &self.items {
            if let Some(found) = child.subtree_by_name(name) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, status: &str) -> Item {
        Item::new(name, status)
    }

    #[test]
    fn empty_root_detected() {
        assert!(Item::default().is_empty_root());
        assert!(!leaf("x", "passed").is_empty_root());
    }

    #[test]
    fn walk_visits_children_before_parent_in_order() {
        let mut root = leaf("root", "");
        root.items.push(leaf("a", "passed"));
        root.items.push(leaf("b", "failed"));

        let mut seen = Vec::new();
        root.walk::<std::convert::Infallible>(&mut |item| {
            seen.push(item.name.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec!["a", "b", "root"]);
    }

    #[test]
    fn walk_short_circuits_on_first_error() {
        let mut root = leaf("root", "");
        root.items.push(leaf("a", "passed"));
        root.items.push(leaf("b", "failed"));
        root.items.push(leaf("c", "passed"));

        let mut seen = Vec::new();
        let result = root.walk(&mut |item| {
            seen.push(item.name.clone());
            if item.status == "failed" {
                Err("stop")
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("stop"));
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn subtree_by_name_is_pre_order() {
        let mut root = leaf("root", "");
        let mut child = leaf("child", "");
        child.items.push(leaf("grandchild", "passed"));
        root.items.push(child);

        assert!(root.subtree_by_name("grandchild").is_some());
        assert!(root.subtree_by_name("missing").is_none());
        assert_eq!(root.subtree_by_name("root").unwrap().name, "root");
    }

    #[test]
    fn mark_error_forces_unknown_status() {
        let mut item = leaf("f.xml", "passed");
        item.mark_error("malformed xml");
        assert_eq!(item.status, "unknown");
        assert_eq!(item.meta(META_ERROR), Some("malformed xml"));
    }
}
