//! Narrative session engine for choose-your-own-adventure stories.
//!
//! A [`StoryTree`] is an immutable, validated graph of scenes keyed by id.
//! A [`Session`] walks it: taking choices, undoing them, restarting while
//! keeping achievements, and deriving [`Statistics`]. Trees move in and out
//! of the engine as JSON through [`import_tree`] / [`export_tree`].

pub mod config;
pub mod error;
pub mod sample;
pub mod session;
pub mod stats;
pub mod story;

pub use config::PlayConfig;
pub use error::{EngineError, EngineResult, MalformedData};
pub use session::{AchievementUnlocked, Session, SessionState, Transition};
pub use stats::Statistics;
pub use story::{
    export_tree, export_tree_value, import_legacy_tree, import_tree, outline, AchievementId,
    Choice, NodeId, NodeKind, StoryNode, StoryTree, TreeBuilder,
};
