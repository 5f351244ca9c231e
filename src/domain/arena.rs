use generational_arena::{Arena, Index};
use std::fmt;
use termtree::Tree as DisplayTree;
use tracing::instrument;

use crate::domain::entities::PathKey;

/// Finalized hierarchy node.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Normalized label; empty for the synthetic root
    pub name: String,
    /// Leaf: accumulated own weight. Internal: sum of children.
    pub weight: f64,
    /// Distance from the root (root is 0)
    pub depth: usize,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Children in first-seen order
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.weight)
    }
}

/// Immutable weighted tree produced by [`crate::domain::TreeBuilder::finalize`].
///
/// Always has a root, even when no record contributed a path.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Arena<TreeNode>,
    root: Index,
}

impl Default for Tree {
    fn default() -> Self {
        Self::empty()
    }
}

impl Tree {
    /// Tree holding only the synthetic root.
    pub fn empty() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            name: String::new(),
            weight: 0.0,
            depth: 0,
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    pub(crate) fn from_parts(arena: Arena<TreeNode>, root: Index) -> Self {
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.arena[self.root]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root_node().children.is_empty()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Deepest node depth; 0 for an empty tree.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, node)| node.depth).max().unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        self.iter()
            .filter(|(idx, node)| *idx != self.root && node.is_leaf())
            .count()
    }

    /// Names from the root (exclusive) down to `idx` (inclusive).
    pub fn path_key(&self, idx: Index) -> PathKey {
        PathKey::new(
            self.ancestors(idx)
                .into_iter()
                .filter_map(|a| self.get_node(a))
                .map(|n| n.name.clone()),
        )
    }

    /// Ancestor chain in root → node order, root excluded, `idx` included.
    pub fn ancestors(&self, idx: Index) -> Vec<Index> {
        let mut chain = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            if i == self.root {
                break;
            }
            match self.get_node(i) {
                Some(node) => {
                    chain.push(i);
                    current = node.parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Name of the depth-1 ancestor; colour stays stable under zoom.
    pub fn fill_key(&self, idx: Index) -> Option<&str> {
        self.ancestors(idx)
            .first()
            .and_then(|&i| self.get_node(i))
            .map(|n| n.name.as_str())
    }

    /// Look a node up by its path key.
    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, key: &PathKey) -> Option<Index> {
        let mut current = self.root;
        for name in key.names() {
            let node = self.get_node(current)?;
            current = node
                .children
                .iter()
                .copied()
                .find(|&c| self.get_node(c).is_some_and(|n| &n.name == name))?;
        }
        Some(current)
    }

    /// Render as a `termtree` for terminal display.
    pub fn to_display_tree(&self) -> DisplayTree<String> {
        fn build(tree: &Tree, idx: Index, parent: &mut DisplayTree<String>) {
            if let Some(node) = tree.get_node(idx) {
                for &child_idx in &node.children {
                    if let Some(child) = tree.get_node(child_idx) {
                        let mut child_tree = DisplayTree::new(child.to_string());
                        build(tree, child_idx, &mut child_tree);
                        parent.push(child_tree);
                    }
                }
            }
        }

        let mut display = DisplayTree::new(format!("(root) ({})", self.root_node().weight));
        build(self, self.root, &mut display);
        display
    }
}

/// Pre-order, left-to-right traversal including the root.
pub struct TreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Children-before-parent traversal including the root.
pub struct PostOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
