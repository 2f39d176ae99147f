use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::session::SessionState;
use crate::story::tree::StoryTree;

/// Snapshot of a playthrough's bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Always `history.len() - 1`.
    pub choices_made: usize,
    /// Time since the session (re)started; never negative.
    pub elapsed: Duration,
    /// Distinct nodes on the current path over nodes reachable from the root.
    pub progress: f64,
    pub distinct_visited: usize,
    pub reachable_nodes: usize,
    pub achievements_unlocked: usize,
    /// Achievements the tree offers in total.
    pub achievements_total: usize,
    pub at_ending: bool,
}

impl Statistics {
    pub(crate) fn collect(
        tree: &StoryTree,
        state: &SessionState,
        reachable_nodes: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let distinct_visited = state.history().iter().collect::<BTreeSet<_>>().len();
        let progress = if reachable_nodes == 0 {
            0.0
        } else {
            (distinct_visited as f64 / reachable_nodes as f64).min(1.0)
        };
        let elapsed = (now - state.started_at()).max(Duration::zero());
        let at_ending = tree
            .get(state.current_node_id())
            .is_some_and(|node| node.is_ending());

        Self {
            choices_made: state.choice_count(),
            elapsed,
            progress,
            distinct_visited,
            reachable_nodes,
            achievements_unlocked: state.unlocked().len(),
            achievements_total: tree.achievements().len(),
            at_ending,
        }
    }

    /// Progress as a whole percentage, rounded down.
    pub fn progress_percent(&self) -> u32 {
        (self.progress * 100.0).floor() as u32
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Choices made : {}", self.choices_made)?;
        writeln!(f, "Time playing : {} minutes", self.elapsed.num_minutes())?;
        writeln!(
            f,
            "Achievements : {}/{}",
            self.achievements_unlocked, self.achievements_total
        )?;
        write!(
            f,
            "Progress     : {}% ({} of {} scenes)",
            self.progress_percent(),
            self.distinct_visited,
            self.reachable_nodes
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::Session;
    use crate::story::node::StoryNode;

    fn loop_tree() -> Arc<StoryTree> {
        Arc::new(
            StoryTree::builder("hall")
                .node(
                    StoryNode::new("hall", "A hall.")
                        .with_choice("north", "library")
                        .with_choice("south", "garden"),
                )
                .node(StoryNode::new("library", "Books.").with_choice("back", "hall"))
                .node(StoryNode::new("garden", "Roses.").with_achievement("gardener"))
                .node(StoryNode::new("vault", "Sealed."))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn fresh_session_stats() {
        let session = Session::start(loop_tree(), None).unwrap();
        let stats = session.stats_at(session.state().started_at());

        assert_eq!(stats.choices_made, 0);
        assert_eq!(stats.elapsed, Duration::zero());
        assert_eq!(stats.distinct_visited, 1);
        assert_eq!(stats.reachable_nodes, 3);
        assert_eq!(stats.achievements_unlocked, 0);
        assert_eq!(stats.achievements_total, 1);
        assert!(!stats.at_ending);
        assert_eq!(stats.progress_percent(), 33);
    }

    #[test]
    fn revisits_count_once_for_progress() {
        let mut session = Session::start(loop_tree(), None).unwrap();
        session.choose(0).unwrap();
        session.choose(0).unwrap();
        session.choose(0).unwrap();

        let stats = session.stats();
        assert_eq!(stats.choices_made, 3);
        assert_eq!(stats.distinct_visited, 2);
    }

    #[test]
    fn elapsed_tracks_clock_and_never_goes_negative() {
        let session = Session::start(loop_tree(), None).unwrap();
        let started = session.state().started_at();

        let later = session.stats_at(started + Duration::minutes(7));
        assert_eq!(later.elapsed.num_minutes(), 7);

        let earlier = session.stats_at(started - Duration::seconds(5));
        assert_eq!(earlier.elapsed, Duration::zero());
    }

    #[test]
    fn full_progress_at_ending() {
        let mut session = Session::start(loop_tree(), None).unwrap();
        session.choose(0).unwrap();
        session.choose(0).unwrap();
        session.choose(1).unwrap();

        let stats = session.stats();
        assert!(stats.at_ending);
        assert_eq!(stats.progress, 1.0);
        assert_eq!(stats.achievements_unlocked, 1);
    }

    #[test]
    fn display_summarises() {
        let session = Session::start(loop_tree(), None).unwrap();
        let text = session.stats_at(session.state().started_at()).to_string();
        assert!(text.contains("Choices made : 0"));
        assert!(text.contains("Achievements : 0/1"));
        assert!(text.contains("Progress     : 33% (1 of 3 scenes)"));
    }
}
