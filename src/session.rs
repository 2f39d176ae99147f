//! Playthrough state and the operations that move it.
//!
//! A [`Session`] shares an immutable [`StoryTree`] and owns one
//! [`SessionState`]. Every mutating method validates its input before it
//! touches the state, so a failed call leaves the session exactly as it was.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::stats::Statistics;
use crate::story::node::{AchievementId, Choice, NodeId, NodeKind, StoryNode};
use crate::story::tree::StoryTree;

/// Per-playthrough state. Serializable so a surrounding app can persist it
/// and hand it back to [`Session::resume`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    root: NodeId,
    /// Visited node ids, root first. Never empty.
    history: Vec<NodeId>,
    unlocked: BTreeSet<AchievementId>,
    started_at: DateTime<Utc>,
}

impl SessionState {
    fn new(root: NodeId, unlocked: BTreeSet<AchievementId>, started_at: DateTime<Utc>) -> Self {
        Self {
            history: vec![root.clone()],
            root,
            unlocked,
            started_at,
        }
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    /// Always the last history entry.
    pub fn current_node_id(&self) -> &NodeId {
        self.history.last().unwrap_or(&self.root)
    }

    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    pub fn unlocked(&self) -> &BTreeSet<AchievementId> {
        &self.unlocked
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn choice_count(&self) -> usize {
        self.history.len().saturating_sub(1)
    }
}

/// Reported when a node's achievement is unlocked for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementUnlocked {
    pub achievement: AchievementId,
    /// Node whose arrival unlocked it.
    pub node: NodeId,
}

/// Outcome of a successful [`Session::choose`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: NodeId,
    pub to: NodeId,
    /// Label of the choice taken.
    pub label: String,
    pub unlocked: Option<AchievementUnlocked>,
    /// Whether `to` is an ending.
    pub reached_ending: bool,
}

/// One playthrough of a story tree.
#[derive(Debug, Clone)]
pub struct Session {
    tree: Arc<StoryTree>,
    state: SessionState,
    /// Number of nodes reachable from `state.root`.
    reachable_total: usize,
}

impl Session {
    /// Begin a playthrough at `root`, or at the tree's declared root.
    pub fn start(tree: Arc<StoryTree>, root: Option<&NodeId>) -> EngineResult<Self> {
        let root = resolve_root(&tree, root)?;
        let reachable_total = tree.reachable_from(&root).len();
        info!("Session started at {root} ({reachable_total} reachable nodes)");

        Ok(Self {
            state: SessionState::new(root, BTreeSet::new(), Utc::now()),
            tree,
            reachable_total,
        })
    }

    /// Rebuild a session from persisted state.
    ///
    /// The history must start at the state's root and follow choice edges of
    /// `tree` one step at a time.
    pub fn resume(tree: Arc<StoryTree>, state: SessionState) -> EngineResult<Self> {
        match state.history.first() {
            None => {
                return Err(EngineError::InvalidTree("saved history is empty".into()));
            }
            Some(first) if *first != state.root => {
                return Err(EngineError::InvalidTree(format!(
                    "saved history starts at {first}, not at root {}",
                    state.root
                )));
            }
            Some(_) => {}
        }

        if let Some(unknown) = state.history.iter().find(|id| !tree.contains(id)) {
            return Err(EngineError::InvalidTree(format!(
                "saved history refers to unknown node {unknown}"
            )));
        }

        for step in state.history.windows(2) {
            if !tree.has_edge(&step[0], &step[1]) {
                return Err(EngineError::InvalidTree(format!(
                    "no choice leads from {} to {}",
                    step[0], step[1]
                )));
            }
        }

        let reachable_total = tree.reachable_from(&state.root).len();
        info!(
            "Session resumed at {} after {} choice(s)",
            state.current_node_id(),
            state.choice_count()
        );

        Ok(Self {
            tree,
            state,
            reachable_total,
        })
    }

    pub fn tree(&self) -> &Arc<StoryTree> {
        &self.tree
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_node_id(&self) -> &NodeId {
        self.state.current_node_id()
    }

    pub fn current_node(&self) -> &StoryNode {
        // Every history entry is checked against the tree on the way in.
        &self.tree[self.state.current_node_id()]
    }

    pub fn history(&self) -> &[NodeId] {
        self.state.history()
    }

    pub fn unlocked(&self) -> &BTreeSet<AchievementId> {
        self.state.unlocked()
    }

    pub fn is_at_ending(&self) -> bool {
        self.current_node().is_ending()
    }

    /// Take the choice at zero-based `index` from the current node.
    pub fn choose(&mut self, index: usize) -> EngineResult<Transition> {
        let tree = Arc::clone(&self.tree);
        let current = tree.get(self.state.current_node_id()).ok_or_else(|| {
            EngineError::InvalidTree(format!(
                "current node {} is missing",
                self.state.current_node_id()
            ))
        })?;

        let choices: &[Choice] = match current.kind() {
            NodeKind::Continuation(choices) => choices,
            NodeKind::Ending => &[],
        };
        let choice = choices.get(index).ok_or(EngineError::InvalidChoice {
            index,
            available: choices.len(),
        })?;
        let target = tree.get(&choice.target).ok_or_else(|| {
            EngineError::InvalidTree(format!("choice target {} is missing", choice.target))
        })?;

        self.state.history.push(target.id.clone());
        info!("Transition: {} -> {} ({})", current.id, target.id, choice.label);

        let unlocked = match &target.achievement {
            Some(achievement) if self.state.unlocked.insert(achievement.clone()) => {
                info!("Achievement unlocked: {achievement} at {}", target.id);
                Some(AchievementUnlocked {
                    achievement: achievement.clone(),
                    node: target.id.clone(),
                })
            }
            _ => None,
        };

        Ok(Transition {
            from: current.id.clone(),
            to: target.id.clone(),
            label: choice.label.clone(),
            unlocked,
            reached_ending: target.is_ending(),
        })
    }

    /// Step back to the previous node. Returns the node that was left.
    /// Achievements stay unlocked.
    pub fn undo(&mut self) -> EngineResult<NodeId> {
        if self.state.history.len() <= 1 {
            return Err(EngineError::NothingToUndo);
        }
        let left = self.state.history.pop().ok_or(EngineError::NothingToUndo)?;
        info!("Undo: {} -> {}", left, self.state.current_node_id());
        Ok(left)
    }

    /// Start over from this session's root, keeping unlocked achievements.
    pub fn restart(&mut self) -> EngineResult<()> {
        let tree = Arc::clone(&self.tree);
        let root = self.state.root.clone();
        self.restart_with(tree, Some(&root))
    }

    /// Start over on a (possibly re-imported) tree, keeping unlocked
    /// achievements. `root` defaults to the tree's declared root.
    pub fn restart_with(&mut self, tree: Arc<StoryTree>, root: Option<&NodeId>) -> EngineResult<()> {
        let root = resolve_root(&tree, root)?;
        let reachable_total = tree.reachable_from(&root).len();
        let unlocked = std::mem::take(&mut self.state.unlocked);
        debug!(
            "Restarting at {root}, keeping {} achievement(s)",
            unlocked.len()
        );

        self.state = SessionState::new(root, unlocked, Utc::now());
        self.tree = tree;
        self.reachable_total = reachable_total;
        info!("Session restarted at {}", self.state.root);
        Ok(())
    }

    pub fn stats(&self) -> Statistics {
        self.stats_at(Utc::now())
    }

    /// Statistics as of `now`.
    pub fn stats_at(&self, now: DateTime<Utc>) -> Statistics {
        Statistics::collect(&self.tree, &self.state, self.reachable_total, now)
    }

    /// The path taken so far as plain text, one chapter per visited node.
    pub fn transcript(&self) -> String {
        self.state
            .history
            .iter()
            .filter_map(|id| self.tree.get(id))
            .enumerate()
            .map(|(i, node)| format!("Chapter {}:\n{}", i + 1, node.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn resolve_root(tree: &StoryTree, root: Option<&NodeId>) -> EngineResult<NodeId> {
    let root = root.unwrap_or(tree.root_id());
    if tree.contains(root) {
        Ok(root.clone())
    } else {
        Err(EngineError::InvalidTree(format!(
            "root node {root} does not exist"
        )))
    }
}
