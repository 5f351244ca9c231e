//! Domain layer: hierarchy, layout and zoom logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod partition;
pub mod zoom;

pub use arena::{Tree, TreeNode};
pub use builder::{build_tree, BuildStats, TreeBuilder, DEFAULT_WEIGHT};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use extract::{
    AllColumns, Cell, DelimitedPath, ExtractionStrategy, Extractor, LevelColumns, Table,
};
pub use geometry::{LabelRule, Lerp, Rect, FULL_TURN};
pub use partition::{Partition, PartitionConfig, RectNode};
pub use zoom::{
    compute_focus_transform, focus_rect, RectMap, RenderItem, Transition, ZoomState,
};
