use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a scene. Stable across sessions and exports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of an achievement unlocked by reaching a tagged node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(String);

impl AchievementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AchievementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AchievementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A labelled edge to another scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown to the player.
    pub label: String,
    /// Destination node. Always resolves inside a validated tree.
    pub target: NodeId,
}

impl Choice {
    pub fn new(label: impl Into<String>, target: impl Into<NodeId>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}

/// A single scene in the story graph.
///
/// Nodes never own other nodes; choices refer to their targets by id and the
/// tree owns every node.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryNode {
    pub id: NodeId,
    /// Scene description shown when the node is entered.
    pub text: String,
    /// Emotional tone, consumed by presentation layers only.
    pub mood: Option<String>,
    /// Hint for illustrating the scene.
    pub image_prompt: Option<String>,
    /// Outgoing choices in display order.
    pub choices: Vec<Choice>,
    /// Explicit terminal flag. A node without choices is an ending either way.
    pub terminal: bool,
    /// Unlocked the first time a session reaches this node.
    pub achievement: Option<AchievementId>,
    /// Free-form authoring data carried through import and export.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Ending-vs-continuation view of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    /// No further choices can be taken.
    Ending,
    /// The player picks one of these.
    Continuation(&'a [Choice]),
}

impl StoryNode {
    pub fn new(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            mood: None,
            image_prompt: None,
            choices: Vec::new(),
            terminal: false,
            achievement: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_choice(mut self, label: impl Into<String>, target: impl Into<NodeId>) -> Self {
        self.choices.push(Choice::new(label, target));
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_image_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompt = Some(prompt.into());
        self
    }

    pub fn with_achievement(mut self, achievement: impl Into<AchievementId>) -> Self {
        self.achievement = Some(achievement.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Flag the node as terminal even if it still lists choices.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn is_ending(&self) -> bool {
        self.terminal || self.choices.is_empty()
    }

    pub fn kind(&self) -> NodeKind<'_> {
        if self.is_ending() {
            NodeKind::Ending
        } else {
            NodeKind::Continuation(&self.choices)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_without_choices_is_ending() {
        let node = StoryNode::new("cave", "It is dark.");
        assert!(node.is_ending());
        assert_eq!(node.kind(), NodeKind::Ending);
    }

    #[test]
    fn terminal_flag_wins_over_choices() {
        let node = StoryNode::new("gate", "The gate closes.")
            .with_choice("knock", "gate")
            .terminal();
        assert!(node.is_ending());
        assert_eq!(node.kind(), NodeKind::Ending);
    }

    #[test]
    fn continuation_exposes_choices_in_order() {
        let node = StoryNode::new("start", "Two paths.")
            .with_choice("go left", "cave")
            .with_choice("go right", "forest");
        match node.kind() {
            NodeKind::Continuation(choices) => {
                assert_eq!(choices[0].target, NodeId::from("cave"));
                assert_eq!(choices[1].target, NodeId::from("forest"));
            }
            NodeKind::Ending => panic!("expected continuation"),
        }
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&NodeId::from("start")).unwrap();
        assert_eq!(json, "\"start\"");
    }
}
