//! Configuration for an interactive playthrough.

use crate::story::node::NodeId;

/// Options for the terminal player.
#[derive(Debug, Clone)]
pub struct PlayConfig {
    /// Start somewhere other than the tree's declared root.
    pub root: Option<NodeId>,
    /// Print each scene's image prompt under its text.
    pub show_image_prompts: bool,
    /// Print each scene's mood next to its heading.
    pub show_moods: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            root: None,
            show_image_prompts: true,
            show_moods: true,
        }
    }
}

impl PlayConfig {
    pub fn with_root(mut self, root: impl Into<NodeId>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_image_prompts(mut self, show: bool) -> Self {
        self.show_image_prompts = show;
        self
    }

    pub fn with_moods(mut self, show: bool) -> Self {
        self.show_moods = show;
        self
    }
}
