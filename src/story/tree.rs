use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Index;

use log::debug;

use crate::error::MalformedData;
use crate::story::node::{AchievementId, NodeId, StoryNode};

/// The full story graph: a validated, immutable map of node-id -> StoryNode.
///
/// A `StoryTree` can only be obtained through [`TreeBuilder::build`] or one
/// of the importers, so every choice target resolves and the root exists.
#[derive(Debug, Clone)]
pub struct StoryTree {
    nodes: BTreeMap<NodeId, StoryNode>,
    root: NodeId,
    /// Nodes reachable from `root`, computed once at construction.
    reachable: BTreeSet<NodeId>,
}

impl PartialEq for StoryTree {
    // `reachable` is derived from the other two fields.
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.nodes == other.nodes
    }
}

/// Indexing panics on an id that is not in the tree. Use [`StoryTree::get`]
/// for ids that have not been validated.
impl Index<&NodeId> for StoryTree {
    type Output = StoryNode;

    fn index(&self, id: &NodeId) -> &StoryNode {
        match self.nodes.get(id) {
            Some(node) => node,
            None => panic!("node {id} is not in the story tree"),
        }
    }
}

impl StoryTree {
    pub fn builder(root: impl Into<NodeId>) -> TreeBuilder {
        TreeBuilder::new(root)
    }

    pub fn get(&self, id: &NodeId) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    pub fn root(&self) -> &StoryNode {
        // Validated at construction.
        &self.nodes[&self.root]
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every distinct achievement some node can unlock, sorted.
    pub fn achievements(&self) -> BTreeSet<AchievementId> {
        self.nodes
            .values()
            .filter_map(|node| node.achievement.clone())
            .collect()
    }

    /// All ending nodes, in id order.
    pub fn endings(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values().filter(|node| node.is_ending())
    }

    /// Nodes reachable from the declared root (cached).
    pub fn reachable(&self) -> &BTreeSet<NodeId> {
        &self.reachable
    }

    /// Nodes reachable from an arbitrary start node, including the start itself.
    /// Uses the cached set when `start` is the declared root.
    ///
    /// Returns an empty set if `start` is not part of the tree.
    pub fn reachable_from(&self, start: &NodeId) -> BTreeSet<NodeId> {
        if *start == self.root {
            return self.reachable.clone();
        }
        walk_reachable(&self.nodes, start)
    }

    /// Whether `from` has a choice leading directly to `to`.
    pub fn has_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        self.nodes
            .get(from)
            .is_some_and(|node| node.choices.iter().any(|choice| choice.target == *to))
    }

    /// Validate a node list and assemble the tree.
    ///
    /// Checks run in this order: empty input, duplicate ids, missing root,
    /// dangling choice targets.
    pub(crate) fn from_parts(
        root: NodeId,
        nodes: Vec<StoryNode>,
    ) -> Result<Self, MalformedData> {
        if nodes.is_empty() {
            return Err(MalformedData::EmptyTree);
        }

        let mut map = BTreeMap::new();
        for node in nodes {
            if map.contains_key(&node.id) {
                return Err(MalformedData::DuplicateNode(node.id));
            }
            map.insert(node.id.clone(), node);
        }

        if !map.contains_key(&root) {
            return Err(MalformedData::UnresolvableRoot(root));
        }

        for node in map.values() {
            for choice in &node.choices {
                if !map.contains_key(&choice.target) {
                    return Err(MalformedData::DanglingChoice {
                        node: node.id.clone(),
                        label: choice.label.clone(),
                        target: choice.target.clone(),
                    });
                }
            }
        }

        let reachable = walk_reachable(&map, &root);
        debug!(
            "Validated story tree: {} nodes, root {}, {} reachable",
            map.len(),
            root,
            reachable.len()
        );

        Ok(Self {
            nodes: map,
            root,
            reachable,
        })
    }
}

fn walk_reachable(nodes: &BTreeMap<NodeId, StoryNode>, start: &NodeId) -> BTreeSet<NodeId> {
    let mut seen = BTreeSet::new();
    if !nodes.contains_key(start) {
        return seen;
    }

    let mut queue = VecDeque::from([start.clone()]);
    seen.insert(start.clone());
    while let Some(id) = queue.pop_front() {
        let Some(node) = nodes.get(&id) else {
            continue;
        };
        for choice in &node.choices {
            if seen.insert(choice.target.clone()) {
                queue.push_back(choice.target.clone());
            }
        }
    }
    seen
}

/// Collects nodes for a tree and validates them on [`TreeBuilder::build`].
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: NodeId,
    nodes: Vec<StoryNode>,
}

impl TreeBuilder {
    pub fn new(root: impl Into<NodeId>) -> Self {
        Self {
            root: root.into(),
            nodes: Vec::new(),
        }
    }

    pub fn node(mut self, node: StoryNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = StoryNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn build(self) -> Result<StoryTree, MalformedData> {
        StoryTree::from_parts(self.root, self.nodes)
    }
}
