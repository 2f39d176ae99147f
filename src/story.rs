//! Story graph: nodes, the validated tree, and its import/export forms.

pub mod legacy;
pub mod node;
pub mod outline;
pub mod tree;
pub mod wire;

pub use legacy::import_legacy_tree;
pub use node::{AchievementId, Choice, NodeId, NodeKind, StoryNode};
pub use outline::outline;
pub use tree::{StoryTree, TreeBuilder};
pub use wire::{export_tree, export_tree_value, import_tree};
