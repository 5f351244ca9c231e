//! Tree builder: turns ordered records into a weighted hierarchy.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, warn};

use crate::domain::arena::{Tree, TreeNode};
use crate::domain::entities::Record;

/// Weight used when a record has none, and for leaves never assigned one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Records that reached at least one node
    pub contributed: usize,
    /// Records whose truncated path was empty
    pub skipped: usize,
}

/// Mutable builder for a [`Tree`].
///
/// Owns the `(parent, label)` lookup and the per-node assigned weights;
/// neither survives [`TreeBuilder::finalize`].
pub struct TreeBuilder {
    arena: Arena<TreeNode>,
    root: Index,
    lookup: HashMap<(Index, String), Index>,
    assigned: HashMap<Index, f64>,
    insertion_order: Vec<Index>,
    stats: BuildStats,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            name: String::new(),
            weight: 0.0,
            depth: 0,
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root,
            lookup: HashMap::new(),
            assigned: HashMap::new(),
            insertion_order: vec![root],
            stats: BuildStats::default(),
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Add one record. Blank-prefixed records are counted and ignored.
    #[instrument(level = "trace", skip(self))]
    pub fn push(&mut self, record: &Record) {
        let path = record.truncated_path();
        if path.is_empty() {
            self.stats.skipped += 1;
            return;
        }

        let mut current = self.root;
        for label in path {
            current = self.child_or_insert(current, label);
        }

        let weight = sanitize_weight(record.weight.unwrap_or(DEFAULT_WEIGHT));
        let own = self.assigned.entry(current).or_insert(0.0);
        *own = (*own + weight).min(f64::MAX);
        self.stats.contributed += 1;
    }

    pub fn extend<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.push(record);
        }
    }

    fn child_or_insert(&mut self, parent: Index, label: String) -> Index {
        if let Some(&existing) = self.lookup.get(&(parent, label.clone())) {
            return existing;
        }

        let depth = self.arena[parent].depth + 1;
        let idx = self.arena.insert(TreeNode {
            name: label.clone(),
            weight: 0.0,
            depth,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.arena[parent].children.push(idx);
        self.lookup.insert((parent, label), idx);
        self.insertion_order.push(idx);
        idx
    }

    /// Compute final weights bottom-up and hand over the tree.
    ///
    /// A node with children takes the sum of its children; any weight a
    /// record assigned directly to it is dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn finalize(mut self) -> Tree {
        // Children are always inserted after their parent.
        for &idx in self.insertion_order.iter().rev() {
            let weight = if self.arena[idx].children.is_empty() {
                if idx == self.root {
                    0.0
                } else {
                    self.assigned.get(&idx).copied().unwrap_or(DEFAULT_WEIGHT)
                }
            } else {
                if self.assigned.contains_key(&idx) {
                    debug!(
                        "dropping direct weight on internal node {:?}",
                        self.arena[idx].name
                    );
                }
                let sum: f64 = self.arena[idx]
                    .children
                    .iter()
                    .map(|&c| self.arena[c].weight)
                    .sum();
                // Finite leaves can still overflow when added up.
                sum.min(f64::MAX)
            };
            self.arena[idx].weight = weight;
        }

        debug!(
            "finalized tree: nodes={}, contributed={}, skipped={}",
            self.arena.len(),
            self.stats.contributed,
            self.stats.skipped
        );
        Tree::from_parts(self.arena, self.root)
    }
}

/// Build a tree in one call.
pub fn build_tree<'a, I>(records: I) -> Tree
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut builder = TreeBuilder::new();
    builder.extend(records);
    builder.finalize()
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight >= 0.0 {
        weight
    } else {
        warn!("clamping invalid weight {} to 0", weight);
        0.0
    }
}
