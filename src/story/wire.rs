//! Canonical JSON form of a story tree.
//!
//! ```json
//! {
//!   "root": "start",
//!   "nodes": {
//!     "start": {
//!       "text": "Two paths diverge.",
//!       "mood": "mysterious",
//!       "choices": [{ "label": "go left", "target": "cave" }]
//!     },
//!     "cave": { "text": "It is dark.", "achievement": "spelunker" }
//!   }
//! }
//! ```
//!
//! `text` is the only required node field. Node maps are read as ordered
//! entry lists so that a repeated id is reported instead of silently
//! overwriting the earlier node.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use log::debug;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::MalformedData;
use crate::story::node::{AchievementId, Choice, NodeId, StoryNode};
use crate::story::tree::StoryTree;

#[derive(Debug, Deserialize)]
struct WireTree {
    root: NodeId,
    #[serde(deserialize_with = "ordered_entries")]
    nodes: Vec<(String, WireNode)>,
}

#[derive(Debug, Deserialize)]
struct WireNode {
    text: String,
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    image_prompt: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    terminal: bool,
    #[serde(default)]
    achievement: Option<AchievementId>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl WireNode {
    fn into_node(self, id: String) -> StoryNode {
        StoryNode {
            id: NodeId::new(id),
            text: self.text,
            mood: self.mood,
            image_prompt: self.image_prompt,
            choices: self.choices,
            terminal: self.terminal,
            achievement: self.achievement,
            metadata: self.metadata,
        }
    }
}

/// Parse and validate a tree in canonical JSON form.
pub fn import_tree(data: &str) -> Result<StoryTree, MalformedData> {
    let wire: WireTree = serde_json::from_str(data)?;
    debug!(
        "Parsed canonical story: root {}, {} node entries",
        wire.root,
        wire.nodes.len()
    );

    let nodes = wire
        .nodes
        .into_iter()
        .map(|(id, node)| node.into_node(id))
        .collect();
    StoryTree::from_parts(wire.root, nodes)
}

/// Canonical JSON value of a tree. Nodes appear in id order; empty optional
/// fields are left out.
pub fn export_tree_value(tree: &StoryTree) -> Value {
    let mut nodes = Map::new();
    for node in tree.nodes() {
        nodes.insert(node.id.to_string(), node_value(node));
    }
    json!({
        "root": tree.root_id().as_str(),
        "nodes": nodes,
    })
}

/// Pretty-printed canonical JSON of a tree.
pub fn export_tree(tree: &StoryTree) -> String {
    format!("{:#}", export_tree_value(tree))
}

fn node_value(node: &StoryNode) -> Value {
    let mut out = Map::new();
    out.insert("text".into(), Value::String(node.text.clone()));
    if let Some(mood) = &node.mood {
        out.insert("mood".into(), Value::String(mood.clone()));
    }
    if let Some(prompt) = &node.image_prompt {
        out.insert("image_prompt".into(), Value::String(prompt.clone()));
    }
    if !node.choices.is_empty() {
        let choices = node
            .choices
            .iter()
            .map(|choice| json!({ "label": choice.label, "target": choice.target.as_str() }))
            .collect();
        out.insert("choices".into(), Value::Array(choices));
    }
    if node.terminal {
        out.insert("terminal".into(), Value::Bool(true));
    }
    if let Some(achievement) = &node.achievement {
        out.insert(
            "achievement".into(),
            Value::String(achievement.as_str().to_string()),
        );
    }
    if !node.metadata.is_empty() {
        let metadata = node
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        out.insert("metadata".into(), Value::Object(metadata));
    }
    Value::Object(out)
}

/// Deserialize a JSON object as a list of entries in document order,
/// keeping repeated keys.
pub(crate) fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V> Visitor<'de> for EntriesVisitor<V>
    where
        V: Deserialize<'de>,
    {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map keyed by string")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAVE_STORY: &str = r#"{
        "root": "start",
        "nodes": {
            "start": {
                "text": "Two paths.",
                "mood": "mysterious",
                "choices": [
                    { "label": "go left", "target": "cave" },
                    { "label": "go right", "target": "forest" }
                ]
            },
            "cave": { "text": "Dark.", "achievement": "spelunker" },
            "forest": { "text": "Green.", "metadata": { "author": "ana" } }
        }
    }"#;

    #[test]
    fn import_canonical() {
        let tree = import_tree(CAVE_STORY).unwrap();
        assert_eq!(tree.len(), 3);

        let start = tree.root();
        assert_eq!(start.mood.as_deref(), Some("mysterious"));
        assert_eq!(start.choices[0].label, "go left");
        assert_eq!(start.choices[1].target, NodeId::from("forest"));

        let cave = tree.get(&"cave".into()).unwrap();
        assert_eq!(cave.achievement, Some(AchievementId::from("spelunker")));
        assert!(cave.is_ending());

        let forest = tree.get(&"forest".into()).unwrap();
        assert_eq!(forest.metadata["author"], json!("ana"));
    }

    #[test]
    fn export_omits_empty_fields() {
        let tree = import_tree(CAVE_STORY).unwrap();
        let value = export_tree_value(&tree);
        let cave = &value["nodes"]["cave"];
        assert_eq!(cave["text"], json!("Dark."));
        assert!(cave.get("choices").is_none());
        assert!(cave.get("terminal").is_none());
        assert!(cave.get("mood").is_none());
    }

    #[test]
    fn export_then_import_is_identity() {
        let tree = import_tree(CAVE_STORY).unwrap();
        let again = import_tree(&export_tree(&tree)).unwrap();
        assert_eq!(tree, again);
    }

    #[test]
    fn float_metadata_survives_round_trip() {
        let data = r#"{
            "root": "a",
            "nodes": { "a": { "text": "t", "metadata": { "w": 5.209664074650981e+305, "p": 0.1 } } }
        }"#;
        let tree = import_tree(data).unwrap();
        let node = tree.root();
        assert_eq!(node.metadata["w"].as_f64(), Some(5.209664074650981e305));
        assert_eq!(node.metadata["p"].as_f64(), Some(0.1));

        let again = import_tree(&export_tree(&tree)).unwrap();
        assert_eq!(again, tree);
        assert_eq!(again.root().metadata["w"], node.metadata["w"]);
    }

    #[test]
    fn duplicate_node_keys_are_reported() {
        let data = r#"{
            "root": "start",
            "nodes": {
                "start": { "text": "one" },
                "start": { "text": "two" }
            }
        }"#;
        assert_eq!(
            import_tree(data).unwrap_err(),
            MalformedData::DuplicateNode("start".into())
        );
    }

    #[test]
    fn missing_text_is_schema_error() {
        let data = r#"{ "root": "start", "nodes": { "start": { "mood": "calm" } } }"#;
        match import_tree(data).unwrap_err() {
            MalformedData::Schema(msg) => assert!(msg.contains("text"), "{msg}"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn missing_root_field_is_schema_error() {
        let data = r#"{ "nodes": { "start": { "text": "hi" } } }"#;
        assert!(matches!(
            import_tree(data).unwrap_err(),
            MalformedData::Schema(_)
        ));
    }

    #[test]
    fn choice_without_target_is_schema_error() {
        let data = r#"{
            "root": "start",
            "nodes": { "start": { "text": "hi", "choices": [{ "label": "go" }] } }
        }"#;
        assert!(matches!(
            import_tree(data).unwrap_err(),
            MalformedData::Schema(_)
        ));
    }

    #[test]
    fn truncated_input_is_syntax_error() {
        assert!(matches!(
            import_tree(r#"{ "root": "start", "nodes": {"#).unwrap_err(),
            MalformedData::Syntax(_)
        ));
    }

    #[test]
    fn dangling_target_is_reported() {
        let data = r#"{
            "root": "start",
            "nodes": { "start": { "text": "hi", "choices": [{ "label": "go", "target": "nowhere" }] } }
        }"#;
        assert!(matches!(
            import_tree(data).unwrap_err(),
            MalformedData::DanglingChoice { .. }
        ));
    }

    #[test]
    fn unknown_root_is_reported() {
        let data = r#"{ "root": "begin", "nodes": { "start": { "text": "hi" } } }"#;
        assert_eq!(
            import_tree(data).unwrap_err(),
            MalformedData::UnresolvableRoot("begin".into())
        );
    }
}
