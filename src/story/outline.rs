//! Human-readable outline of a story tree, for reviewing a story while
//! authoring it. One-way: outlines are never parsed back.

use std::collections::{BTreeSet, VecDeque};
use std::fmt::Write;

use crate::story::node::{NodeId, StoryNode};
use crate::story::tree::StoryTree;

/// Render the tree breadth-first from the root, followed by any nodes the
/// root cannot reach.
pub fn outline(tree: &StoryTree) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Story outline: {} nodes, root {}",
        tree.len(),
        tree.root_id()
    );

    let mut in_unreachable = false;
    for id in outline_order(tree) {
        let Some(node) = tree.get(&id) else {
            continue;
        };
        if !in_unreachable && !tree.reachable().contains(&id) {
            in_unreachable = true;
            let _ = writeln!(out, "\nUnreachable from {}:", tree.root_id());
        }
        render_node(&mut out, node);
    }

    out
}

fn render_node(out: &mut String, node: &StoryNode) {
    let _ = write!(out, "\n[{}]", node.id);
    if let Some(mood) = &node.mood {
        let _ = write!(out, " ({mood})");
    }
    if node.is_ending() {
        out.push_str(" ENDING");
    }
    if let Some(achievement) = &node.achievement {
        let _ = write!(out, " achievement: {achievement}");
    }
    out.push('\n');

    let first_line = node
        .text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let _ = writeln!(out, "  {first_line}");

    for (i, choice) in node.choices.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} -> {}", i + 1, choice.label, choice.target);
    }
}

/// Ids in the order [`outline`] lists them.
pub fn outline_order(tree: &StoryTree) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(tree.len());
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([tree.root_id().clone()]);
    seen.insert(tree.root_id().clone());

    while let Some(id) = queue.pop_front() {
        if let Some(node) = tree.get(&id) {
            for choice in &node.choices {
                if seen.insert(choice.target.clone()) {
                    queue.push_back(choice.target.clone());
                }
            }
        }
        order.push(id);
    }
    order.extend(tree.nodes().filter(|n| !seen.contains(&n.id)).map(|n| n.id.clone()));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> StoryTree {
        StoryTree::builder("start")
            .node(
                StoryNode::new("start", "\n  Two paths.\nMore detail.")
                    .with_mood("mysterious")
                    .with_choice("go left", "cave")
                    .with_choice("go right", "forest"),
            )
            .node(StoryNode::new("cave", "Dark.").with_achievement("spelunker"))
            .node(StoryNode::new("forest", "Green.").with_choice("back", "start"))
            .node(StoryNode::new("attic", "Dusty."))
            .build()
            .unwrap()
    }

    #[test]
    fn outline_lists_nodes_and_choices() {
        let text = outline(&tree());
        assert!(text.starts_with("Story outline: 4 nodes, root start"));
        assert!(text.contains("[start] (mysterious)\n  Two paths.\n"));
        assert!(text.contains("  1. go left -> cave"));
        assert!(text.contains("  2. go right -> forest"));
        assert!(text.contains("[cave] ENDING achievement: spelunker"));
        assert!(!text.contains("More detail."));
    }

    #[test]
    fn unreachable_nodes_listed_last() {
        let text = outline(&tree());
        let section = text.find("Unreachable from start:").unwrap();
        assert!(text.find("[attic]").unwrap() > section);
    }

    #[test]
    fn order_is_breadth_first() {
        let order: Vec<_> = outline_order(&tree())
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(order, vec!["start", "cave", "forest", "attic"]);
    }
}
