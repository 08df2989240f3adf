//! Segment trie over literal event names, used for prefix lookup.

use std::collections::BTreeMap;

/// A trie node keyed by name segment.
#[derive(Default)]
struct TreeNode {
    leaf: bool,
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn is_empty(&self) -> bool {
        !self.leaf && self.children.is_empty()
    }
}

/// A trie of delimiter-split event names.
///
/// Every node reached by a full name is marked as a leaf. Lookup lists the
/// direct children of a prefix node, which is how a namespace of events is
/// exposed as a set of methods.
#[derive(Default)]
pub struct EventTree {
    root: TreeNode,
}

impl EventTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the name made of `segments`.
    pub fn insert<'a>(&mut self, segments: impl IntoIterator<Item = &'a str>) {
        let mut node = &mut self.root;
        for segment in segments {
            node = node.children.entry(segment.to_owned()).or_default();
        }
        node.leaf = true;
    }

    /// Remove the name made of `segments`, pruning branches left empty.
    ///
    /// Returns `false` if the name was not in the tree.
    pub fn remove(&mut self, segments: &[&str]) -> bool {
        fn unmark(node: &mut TreeNode, segments: &[&str]) -> bool {
            let Some((first, rest)) = segments.split_first() else {
                let was_leaf = node.leaf;
                node.leaf = false;
                return was_leaf;
            };
            let Some(child) = node.children.get_mut(*first) else {
                return false;
            };
            let removed = unmark(child, rest);
            if child.is_empty() {
                node.children.remove(*first);
            }
            removed
        }

        unmark(&mut self.root, segments)
    }

    /// Returns `true` if the name made of `segments` is in the tree.
    pub fn contains(&self, segments: &[&str]) -> bool {
        self.node(segments).is_some_and(|node| node.leaf)
    }

    /// Direct child segments below `segments`, sorted.
    ///
    /// An empty prefix lists the top-level segments; an unknown prefix lists
    /// nothing.
    pub fn children(&self, segments: &[&str]) -> Vec<String> {
        self.node(segments)
            .map(|node| node.children.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn node(&self, segments: &[&str]) -> Option<&TreeNode> {
        let mut node = &self.root;
        for segment in segments {
            node = node.children.get(*segment)?;
        }
        Some(node)
    }
}

/// Split `name` into tree segments.
pub fn split<'a>(name: &'a str, delimiter: &str) -> Vec<&'a str> {
    if name.is_empty() {
        return Vec::new();
    }
    if delimiter.is_empty() {
        return vec![name];
    }
    name.split(delimiter).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(names: &[&str]) -> EventTree {
        let mut tree = EventTree::new();
        for name in names {
            tree.insert(split(name, "."));
        }
        tree
    }

    #[test]
    fn lists_direct_children() {
        let tree = tree(&["a.b.c", "a.b.d", "a.x"]);
        assert_eq!(tree.children(&["a", "b"]), vec!["c", "d"]);
        assert_eq!(tree.children(&["a"]), vec!["b", "x"]);
        assert_eq!(tree.children(&[]), vec!["a"]);
        assert!(tree.children(&["nope"]).is_empty());
        assert!(tree.children(&["a", "b", "c"]).is_empty());
    }

    #[test]
    fn inner_nodes_can_be_leaves() {
        let tree = tree(&["a.b", "a.b.c"]);
        assert!(tree.contains(&["a", "b"]));
        assert!(tree.contains(&["a", "b", "c"]));
        assert!(!tree.contains(&["a"]));
    }

    #[test]
    fn removal_prunes_empty_branches() {
        let mut tree = tree(&["a.b.c", "a.x"]);
        assert!(tree.remove(&["a", "b", "c"]));
        assert_eq!(tree.children(&["a"]), vec!["x"]);
        assert!(!tree.remove(&["a", "b", "c"]));

        assert!(tree.remove(&["a", "x"]));
        assert!(tree.children(&[]).is_empty());
    }

    #[test]
    fn removal_keeps_nodes_with_children() {
        let mut tree = tree(&["a.b", "a.b.c"]);
        assert!(tree.remove(&["a", "b"]));
        assert!(!tree.contains(&["a", "b"]));
        assert_eq!(tree.children(&["a", "b"]), vec!["c"]);
    }

    #[test]
    fn split_handles_edge_cases() {
        assert!(split("", ".").is_empty());
        assert_eq!(split("a/b", "/"), vec!["a", "b"]);
        assert_eq!(split("a.b", ""), vec!["a.b"]);
    }
}
