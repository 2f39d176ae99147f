//! Import for the flat story format used by earlier exports.
//!
//! The document is a single object of node id -> node, where `choices` maps
//! label -> target id and every field is optional:
//!
//! ```json
//! {
//!   "start": { "text": "...", "choices": { "Take the trail": "forest" }, "mood": "mysterious" },
//!   "forest": { "text": "*Achievement Unlocked: Pathfinder* 🏆" }
//! }
//! ```
//!
//! The root is `start` when present, otherwise the first node in the
//! document. Endings announce achievements inline with an
//! `Achievement Unlocked: <name>` marker; the name is turned into an
//! achievement id and kept in the node's `achievement_name` metadata.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::MalformedData;
use crate::story::node::{AchievementId, Choice, NodeId, StoryNode};
use crate::story::tree::StoryTree;
use crate::story::wire::ordered_entries;

/// Root used when the document has a node with this id.
pub const DEFAULT_ROOT: &str = "start";

/// Metadata key holding the display name of a derived achievement.
pub const ACHIEVEMENT_NAME_KEY: &str = "achievement_name";

#[derive(Debug, Deserialize)]
struct LegacyNode {
    #[serde(default)]
    text: String,
    #[serde(default, deserialize_with = "ordered_entries")]
    choices: Vec<(String, String)>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
    #[serde(default)]
    image_prompt: Option<String>,
    #[serde(default)]
    mood: Option<String>,
}

/// Parse and validate a tree in the flat legacy format.
pub fn import_legacy_tree(data: &str) -> Result<StoryTree, MalformedData> {
    let mut de = serde_json::Deserializer::from_str(data);
    let entries: Vec<(String, LegacyNode)> = ordered_entries(&mut de)?;
    de.end()?;

    let root = if entries.iter().any(|(id, _)| id == DEFAULT_ROOT) {
        NodeId::from(DEFAULT_ROOT)
    } else {
        match entries.first() {
            Some((id, _)) => NodeId::new(id.clone()),
            None => return Err(MalformedData::EmptyTree),
        }
    };
    debug!(
        "Parsed legacy story: {} node entries, root {}",
        entries.len(),
        root
    );

    let nodes = entries
        .into_iter()
        .map(|(id, node)| convert(id, node))
        .collect();
    StoryTree::from_parts(root, nodes)
}

fn convert(id: String, legacy: LegacyNode) -> StoryNode {
    let mut node = StoryNode::new(id, legacy.text);
    node.mood = legacy.mood;
    node.image_prompt = legacy.image_prompt.filter(|prompt| !prompt.is_empty());
    node.metadata = legacy.metadata;
    // A repeated label keeps its first position and takes the last target,
    // the way a plain JSON object reader resolves it.
    for (label, target) in legacy.choices {
        match node.choices.iter_mut().find(|choice| choice.label == label) {
            Some(choice) => {
                debug!("Node {}: choice '{label}' repeated, keeping target {target}", node.id);
                choice.target = NodeId::new(target);
            }
            None => node.choices.push(Choice::new(label, target)),
        }
    }

    if node.choices.is_empty() {
        if let Some(name) = achievement_marker(&node.text) {
            node.achievement = Some(AchievementId::new(slugify(&name)));
            node.metadata
                .insert(ACHIEVEMENT_NAME_KEY.to_string(), Value::String(name));
        }
    }
    node
}

static ACHIEVEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Achievement Unlocked:[ \t]*([^\n🏆]+)").expect("valid regex")
});

/// Display name from an `Achievement Unlocked: <name>` marker, if any.
pub fn achievement_marker(text: &str) -> Option<String> {
    let caps = ACHIEVEMENT_RE.captures(text)?;
    let name = caps[1].trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Lowercase, hyphen-separated id from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_with_markdown_and_trophy() {
        let text = "You find a compass.\n\n*Achievement Unlocked: True North of the Heart* 🏆\n";
        assert_eq!(
            achievement_marker(text).as_deref(),
            Some("True North of the Heart")
        );
    }

    #[test]
    fn marker_without_trophy() {
        assert_eq!(
            achievement_marker("Achievement Unlocked: Pathfinder").as_deref(),
            Some("Pathfinder")
        );
    }

    #[test]
    fn no_marker() {
        assert_eq!(achievement_marker("Nothing to see here."), None);
        assert_eq!(achievement_marker("Achievement Unlocked: 🏆"), None);
    }

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Keeper of the Light"), "keeper-of-the-light");
        assert_eq!(slugify("  Simple -- Joys! "), "simple-joys");
    }

    #[test]
    fn root_defaults_to_start() {
        let data = r#"{
            "intro": { "text": "Before.", "choices": { "Begin": "start" } },
            "start": { "text": "Here." }
        }"#;
        let tree = import_legacy_tree(data).unwrap();
        assert_eq!(tree.root_id(), &NodeId::from("start"));
    }

    #[test]
    fn root_falls_back_to_first_node() {
        let data = r#"{
            "gate": { "text": "A gate.", "choices": { "Enter": "hall" } },
            "hall": { "text": "A hall." }
        }"#;
        let tree = import_legacy_tree(data).unwrap();
        assert_eq!(tree.root_id(), &NodeId::from("gate"));
    }

    #[test]
    fn choices_keep_document_order() {
        let data = r#"{
            "start": { "text": "Pick.", "choices": { "Zeta": "b", "Alpha": "a" } },
            "a": { "text": "A" },
            "b": { "text": "B" }
        }"#;
        let tree = import_legacy_tree(data).unwrap();
        let labels: Vec<_> = tree.root().choices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn repeated_choice_label_keeps_last_target() {
        let data = r#"{
            "start": { "text": "Pick.", "choices": { "Left": "a", "Right": "b", "Left": "c" } },
            "a": { "text": "A" },
            "b": { "text": "B" },
            "c": { "text": "C" }
        }"#;
        let tree = import_legacy_tree(data).unwrap();
        let choices = &tree.root().choices;
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0], Choice::new("Left", "c"));
        assert_eq!(choices[1], Choice::new("Right", "b"));
    }

    #[test]
    fn endings_get_achievements_from_text() {
        let data = r#"{
            "start": { "text": "Go?", "choices": { "Yes": "end" }, "image_prompt": "" },
            "end": { "text": "Done.\n*Achievement Unlocked: Keeper of the Light* 🏆", "mood": "epic" }
        }"#;
        let tree = import_legacy_tree(data).unwrap();
        assert_eq!(tree.root().image_prompt, None);

        let end = tree.get(&"end".into()).unwrap();
        assert_eq!(
            end.achievement,
            Some(AchievementId::from("keeper-of-the-light"))
        );
        assert_eq!(
            end.metadata[ACHIEVEMENT_NAME_KEY],
            Value::String("Keeper of the Light".into())
        );
        assert_eq!(end.mood.as_deref(), Some("epic"));
    }

    #[test]
    fn empty_document_rejected() {
        assert_eq!(import_legacy_tree("{}").unwrap_err(), MalformedData::EmptyTree);
    }

    #[test]
    fn dangling_target_rejected() {
        let data = r#"{ "start": { "text": "Go", "choices": { "Jump": "void" } } }"#;
        assert!(matches!(
            import_legacy_tree(data).unwrap_err(),
            MalformedData::DanglingChoice { .. }
        ));
    }

    #[test]
    fn trailing_garbage_rejected() {
        assert!(matches!(
            import_legacy_tree(r#"{ "start": { "text": "a" } } extra"#).unwrap_err(),
            MalformedData::Syntax(_)
        ));
    }
}
