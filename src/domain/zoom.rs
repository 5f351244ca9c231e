//! Focus transform and zoom transitions.
//!
//! Animation state lives here, keyed by [`PathKey`], never on the
//! structural partition. A rebuild replaces the partition wholesale and
//! drops any in-flight transition.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::entities::PathKey;
use crate::domain::geometry::{LabelRule, Lerp, Rect, FULL_TURN};
use crate::domain::partition::Partition;

/// Rects keyed by node path.
pub type RectMap = HashMap<PathKey, Rect>;

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Renormalize one rect against `focus`.
///
/// The focus fills the full circle and its inner radius becomes the
/// origin; anything outside the focus span collapses to zero width.
pub fn focus_rect(focus: &Rect, rect: &Rect) -> Rect {
    let span = focus.angle_span();
    let angle = |a: f64| -> f64 {
        if focus.angle_start == 0.0 && span == FULL_TURN {
            // Full-circle focus is the identity on [0, 2π].
            a.clamp(0.0, FULL_TURN)
        } else if span > 0.0 {
            clamp01((a - focus.angle_start) / span) * FULL_TURN
        } else if a > focus.angle_start {
            FULL_TURN
        } else {
            0.0
        }
    };

    Rect {
        angle_start: angle(rect.angle_start),
        angle_end: angle(rect.angle_end),
        radius_inner: (rect.radius_inner - focus.radius_inner).max(0.0),
        radius_outer: (rect.radius_outer - focus.radius_inner).max(0.0),
    }
}

/// Target rect of every node for the given focus.
pub fn compute_focus_transform(focus: &Rect, nodes: &RectMap) -> RectMap {
    nodes
        .iter()
        .map(|(key, rect)| (key.clone(), focus_rect(focus, rect)))
        .collect()
}

/// Linear interpolation between two rect sets.
///
/// Keys present in only one side are carried unchanged.
#[derive(Debug, Clone)]
pub struct Transition {
    from: RectMap,
    to: RectMap,
}

impl Transition {
    pub fn new(from: RectMap, to: RectMap) -> Self {
        Self { from, to }
    }

    pub fn target(&self) -> &RectMap {
        &self.to
    }

    /// Interpolated rects at `progress` (clamped to `[0, 1]`).
    ///
    /// At `progress >= 1` the result equals the target exactly.
    pub fn frame(&self, progress: f64) -> RectMap {
        let t = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.to
            .iter()
            .map(|(key, target)| {
                let rect = match self.from.get(key) {
                    Some(start) => start.lerp_to(target, t),
                    None => *target,
                };
                (key.clone(), rect)
            })
            .collect()
    }

    /// `count + 1` evenly spaced frames, first at 0 and last at 1.
    pub fn frames(&self, count: usize) -> Vec<RectMap> {
        let count = count.max(1);
        (0..=count)
            .map(|i| self.frame(i as f64 / count as f64))
            .collect()
    }
}

/// What the renderer draws for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub path: PathKey,
    pub name: String,
    pub depth: usize,
    pub weight: f64,
    pub fill_key: String,
    /// Ancestor names, root exclusive, node inclusive
    pub ancestors: Vec<String>,
    pub rect: Rect,
    /// `rect` with angular padding removed
    pub padded: Rect,
    pub label_visible: bool,
}

/// Focus state plus the live per-node rects.
///
/// `Idle(focus)` is the only persisted state; an in-flight
/// [`Transition`] is advanced frame by frame until it completes.
#[derive(Debug)]
pub struct ZoomState {
    partition: Partition,
    static_rects: RectMap,
    focus: PathKey,
    current: RectMap,
    transition: Option<Transition>,
    generation: u64,
    label_rule: LabelRule,
}

impl ZoomState {
    /// Start focused on the root with every node at its static rect.
    pub fn new(partition: Partition) -> Self {
        Self::with_label_rule(partition, LabelRule::default())
    }

    pub fn with_label_rule(partition: Partition, label_rule: LabelRule) -> Self {
        let static_rects = partition.static_rects();
        Self {
            current: static_rects.clone(),
            static_rects,
            partition,
            focus: PathKey::root(),
            transition: None,
            generation: 0,
            label_rule,
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn focus(&self) -> &PathKey {
        &self.focus
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn current(&self) -> &RectMap {
        &self.current
    }

    pub fn current_rect(&self, key: &PathKey) -> Option<Rect> {
        self.current.get(key).copied()
    }

    /// Target of the in-flight transition, or the settled rects.
    pub fn target(&self) -> &RectMap {
        self.transition
            .as_ref()
            .map(Transition::target)
            .unwrap_or(&self.current)
    }

    /// Begin a transition toward `key`; unknown keys fall back to the root.
    ///
    /// Starts from the current (possibly mid-transition) rects. Returns the
    /// key actually focused.
    #[instrument(level = "debug", skip(self, key), fields(key = %key))]
    pub fn focus_on(&mut self, key: &PathKey) -> PathKey {
        let focus_key = if self.static_rects.contains_key(key) {
            key.clone()
        } else {
            warn!("focus target {} not in tree, using root", key);
            PathKey::root()
        };
        let focus_rect = self.static_rects[&focus_key];

        let target = compute_focus_transform(&focus_rect, &self.static_rects);
        self.transition = Some(Transition::new(self.current.clone(), target));
        self.focus = focus_key.clone();
        self.generation += 1;
        debug!("focus -> {} (generation {})", self.focus, self.generation);
        focus_key
    }

    /// Update `current` for a frame at `progress`; completes at `>= 1`.
    pub fn advance(&mut self, progress: f64) {
        let Some(transition) = &self.transition else {
            return;
        };
        self.current = transition.frame(progress);
        if progress >= 1.0 {
            self.transition = None;
        }
    }

    /// Like [`ZoomState::advance`], ignored when `generation` is stale.
    pub fn advance_for(&mut self, generation: u64, progress: f64) -> bool {
        if generation != self.generation {
            debug!(
                "dropping frame for generation {} (current {})",
                generation, self.generation
            );
            return false;
        }
        self.advance(progress);
        true
    }

    /// Jump to the end of the in-flight transition.
    pub fn finish(&mut self) {
        if let Some(transition) = self.transition.take() {
            self.current = transition.to;
        }
    }

    /// Stop where we are; `current` keeps its last frame.
    pub fn cancel(&mut self) {
        if self.transition.take().is_some() {
            self.generation += 1;
        }
    }

    /// Replace the partition after a data change.
    ///
    /// Any in-flight transition is discarded and the focus resets to root.
    #[instrument(level = "debug", skip(self, partition))]
    pub fn rebuild(&mut self, partition: Partition) {
        if self.transition.is_some() {
            debug!("rebuild cancels in-flight transition");
        }
        let generation = self.generation + 1;
        *self = Self::with_label_rule(partition, self.label_rule);
        self.generation = generation;
    }

    /// Root-exclusive ancestors of the focus, focus included.
    pub fn breadcrumbs(&self) -> Vec<PathKey> {
        self.focus.prefixes()
    }

    /// Rendered nodes whose current rect passes the label rule.
    pub fn visible_labels(&self) -> Vec<PathKey> {
        self.partition
            .nodes()
            .into_iter()
            .filter(|n| {
                self.current
                    .get(&n.key)
                    .is_some_and(|r| self.label_rule.is_visible(r))
            })
            .map(|n| n.key)
            .collect()
    }

    /// Every rendered node with its current rect, in layout order.
    pub fn render_list(&self) -> Vec<RenderItem> {
        let pad_angle = self.partition.config().pad_angle;
        self.partition
            .nodes()
            .into_iter()
            .map(|node| {
                let rect = self.current.get(&node.key).copied().unwrap_or(node.rect);
                RenderItem {
                    ancestors: node.key.names().to_vec(),
                    path: node.key,
                    name: node.name,
                    depth: node.depth,
                    weight: node.weight,
                    fill_key: node.fill_key,
                    rect,
                    padded: rect.padded(pad_angle),
                    label_visible: self.label_rule.is_visible(&rect),
                }
            })
            .collect()
    }
}
