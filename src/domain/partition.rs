//! Radial partition layout.
//!
//! One ring per depth level; angular span proportional to weight among
//! siblings. Structural rects carry no padding, so the coverage and radial
//! invariants hold exactly; padding is applied only to rendered output.

use std::collections::HashMap;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::Tree;
use crate::domain::entities::PathKey;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::geometry::{Rect, FULL_TURN};

/// Layout extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Outer radius of the deepest ring
    pub radius: f64,
    /// Angular padding removed from rendered sectors (radians)
    pub pad_angle: f64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            radius: 300.0,
            pad_angle: 0.0,
        }
    }
}

impl PartitionConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(DomainError::InvalidLayout {
                field: "radius",
                value: self.radius,
            });
        }
        if !self.pad_angle.is_finite() || self.pad_angle < 0.0 {
            return Err(DomainError::InvalidLayout {
                field: "pad_angle",
                value: self.pad_angle,
            });
        }
        Ok(())
    }
}

/// Rendered node: structural data plus its static rect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectNode {
    pub key: PathKey,
    pub name: String,
    pub weight: f64,
    pub depth: usize,
    /// Name of the depth-1 ancestor
    pub fill_key: String,
    pub rect: Rect,
}

/// A tree with one [`Rect`] per node.
#[derive(Debug, Clone)]
pub struct Partition {
    tree: Tree,
    config: PartitionConfig,
    max_depth: usize,
    rects: HashMap<Index, Rect>,
    layout_children: HashMap<Index, Vec<Index>>,
}

impl Partition {
    /// Lay out `tree` inside a full circle of radius `config.radius`.
    #[instrument(level = "debug", skip(tree))]
    pub fn layout(tree: Tree, config: PartitionConfig) -> DomainResult<Self> {
        config.validate()?;

        let max_depth = tree.depth();
        // Leaves directly under the root still get one ring.
        let rings = max_depth.max(1) as f64;
        let radius = config.radius;
        let band = |depth: usize| -> (f64, f64) {
            if depth == 0 {
                (0.0, 0.0)
            } else {
                (
                    radius * (depth - 1) as f64 / rings,
                    radius * depth as f64 / rings,
                )
            }
        };

        let mut rects = HashMap::with_capacity(tree.len());
        let mut layout_children = HashMap::with_capacity(tree.len());

        let root = tree.root();
        rects.insert(root, Rect::new(0.0, FULL_TURN, 0.0, 0.0));
        let mut stack = vec![root];

        while let Some(parent_idx) = stack.pop() {
            let Some(parent) = tree.get_node(parent_idx) else {
                continue;
            };
            let parent_rect = rects[&parent_idx];

            let mut ordered = parent.children.clone();
            // Stable: equal weights keep first-seen order.
            ordered.sort_by(|&a, &b| {
                let wa = tree.get_node(a).map_or(0.0, |n| n.weight);
                let wb = tree.get_node(b).map_or(0.0, |n| n.weight);
                wb.total_cmp(&wa)
            });

            // Shares are taken on weights scaled by the largest sibling so the
            // sum stays finite even when raw weights would overflow.
            let scale = ordered
                .iter()
                .filter_map(|&c| tree.get_node(c))
                .map(|n| n.weight)
                .fold(0.0, f64::max);
            let share = |w: f64| if scale > 0.0 { w / scale } else { 0.0 };
            let total: f64 = ordered
                .iter()
                .filter_map(|&c| tree.get_node(c))
                .map(|n| share(n.weight))
                .sum();
            let span = parent_rect.angle_span();
            let (inner, outer) = band(parent.depth + 1);

            let mut cursor = parent_rect.angle_start;
            let last = ordered.len().saturating_sub(1);
            for (i, &child_idx) in ordered.iter().enumerate() {
                let weight = tree.get_node(child_idx).map_or(0.0, |n| n.weight);
                let end = if total > 0.0 {
                    if i == last {
                        parent_rect.angle_end
                    } else {
                        (cursor + span * (share(weight) / total)).min(parent_rect.angle_end)
                    }
                } else {
                    cursor
                };
                rects.insert(child_idx, Rect::new(cursor, end, inner, outer));
                cursor = end;
                stack.push(child_idx);
            }

            layout_children.insert(parent_idx, ordered);
        }

        debug!(
            "partition: nodes={}, max_depth={}, radius={}",
            rects.len(),
            max_depth,
            radius
        );

        Ok(Self {
            tree,
            config,
            max_depth,
            rects,
            layout_children,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn rect(&self, idx: Index) -> Option<Rect> {
        self.rects.get(&idx).copied()
    }

    pub fn rect_of(&self, key: &PathKey) -> Option<Rect> {
        self.tree.find(key).and_then(|idx| self.rect(idx))
    }

    /// Children of `idx` in angular order (descending weight).
    pub fn layout_children(&self, idx: Index) -> &[Index] {
        self.layout_children
            .get(&idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Static rect of every node, root included, keyed by path.
    pub fn static_rects(&self) -> HashMap<PathKey, Rect> {
        self.tree
            .iter()
            .filter_map(|(idx, _)| self.rect(idx).map(|r| (self.tree.path_key(idx), r)))
            .collect()
    }

    /// Rendered nodes (depth >= 1), pre-order over layout order.
    pub fn nodes(&self) -> Vec<RectNode> {
        let mut out = Vec::with_capacity(self.tree.len().saturating_sub(1));
        let mut stack: Vec<Index> = self
            .layout_children(self.tree.root())
            .iter()
            .rev()
            .copied()
            .collect();

        while let Some(idx) = stack.pop() {
            let (Some(node), Some(rect)) = (self.tree.get_node(idx), self.rect(idx)) else {
                continue;
            };
            out.push(RectNode {
                key: self.tree.path_key(idx),
                name: node.name.clone(),
                weight: node.weight,
                depth: node.depth,
                fill_key: self.tree.fill_key(idx).unwrap_or_default().to_string(),
                rect,
            });
            stack.extend(self.layout_children(idx).iter().rev().copied());
        }
        out
    }
}
