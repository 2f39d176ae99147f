//! Error types for the narrative engine.

use thiserror::Error;

use crate::story::node::NodeId;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by session operations.
///
/// Every failing call leaves the session exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested root (or a persisted history entry) does not fit the tree.
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// Choice index out of range, or the current node is an ending.
    #[error("invalid choice {index}: {available} choice(s) available")]
    InvalidChoice {
        /// Zero-based index the caller asked for.
        index: usize,
        /// Number of choices at the current node.
        available: usize,
    },

    /// Undo requested while standing on the root.
    #[error("nothing to undo: already at the beginning")]
    NothingToUndo,

    /// Story data failed import-time validation.
    #[error(transparent)]
    Malformed(#[from] MalformedData),
}

/// Structural problems found while importing a story tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedData {
    /// Input is not well-formed JSON.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Required field missing or a field has the wrong type.
    #[error("schema error: {0}")]
    Schema(String),

    /// Two nodes share the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// A choice points at a node that does not exist.
    #[error("choice '{label}' on node {node} points to missing node {target}")]
    DanglingChoice {
        node: NodeId,
        label: String,
        target: NodeId,
    },

    /// The declared root is not one of the nodes.
    #[error("root node {0} does not exist")]
    UnresolvableRoot(NodeId),

    /// The tree has no nodes at all.
    #[error("story tree has no nodes")]
    EmptyTree,
}

impl From<serde_json::Error> for MalformedData {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Data => MalformedData::Schema(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => {
                MalformedData::Syntax(err.to_string())
            }
        }
    }
}
