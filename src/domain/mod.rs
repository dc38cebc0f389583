//! Domain layer: visualization model and geometry
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod datasets;
pub mod error;
pub mod force;
pub mod geo;
pub mod hierarchy;
pub mod interaction;
pub mod layout;
pub mod point;
pub mod scale;
pub mod transition;
pub mod tree_display;

pub use error::DomainError;
pub use hierarchy::{Hierarchy, HierarchyNode, NodeKey, NodeSpec, NodeState, ToggleOutcome};
pub use interaction::{Action, ChartMode, Interactive, Tooltip};
pub use layout::{LayoutConfig, TreeLayout, TreeLayoutEngine};
pub use point::Point;
pub use transition::{Animator, Millis, Phase, Transition};
pub use tree_display::TreeNodeConvert;
