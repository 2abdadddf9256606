//! Uninformed graph search.
//!
//! One exploration loop serves breadth-first and depth-first search; only the
//! frontier discipline changes. States are pruned through a reached set that
//! only grows during a run, so no state is expanded twice.

use std::marker::PhantomData;

use log::debug;
use log::trace;
use rustc_hash::FxHashSet;

use crate::cost::Cost;
use crate::frontier::FifoFrontier;
use crate::frontier::Frontier;
use crate::frontier::LifoFrontier;
use crate::problem::Problem;
use crate::search::SearchOutcome;
use crate::search::SearchResult;
use crate::search::SearchStatistics;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::search::SearchTreeNode;
use crate::space::Action;
use crate::space::State;

/// Runs a breadth-first graph search.
///
/// On unit-cost problems the solution has the fewest possible actions.
pub fn breadth_first_search<P, St, A, C>(problem: &P) -> SearchResult<St, A, C>
where
    P: Problem<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    graph_search(problem, FifoFrontier::new())
}

/// Runs a depth-first graph search.
///
/// Complete on finite spaces, but solutions may be longer than necessary.
pub fn depth_first_search<P, St, A, C>(problem: &P) -> SearchResult<St, A, C>
where
    P: Problem<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    graph_search(problem, LifoFrontier::new())
}

/// Runs a graph search picking nodes from `frontier`.
pub fn graph_search<P, F, St, A, C>(problem: &P, frontier: F) -> SearchResult<St, A, C>
where
    P: Problem<St, A, C>,
    F: Frontier<SearchTreeIndex>,
    St: State,
    A: Action,
    C: Cost,
{
    let mut search = GraphSearch::new(problem, frontier);
    search.search();
    search.into_result()
}

/// A single graph search over a problem.
///
/// Owns all the search data, so concurrent searches only share the (read-only)
/// problem.
pub struct GraphSearch<'p, P, F, St, A, C>
where
    P: Problem<St, A, C>,
    F: Frontier<SearchTreeIndex>,
    St: State,
    A: Action,
    C: Cost,
{
    problem: &'p P,

    /// Every generated node that was kept. Frontier entries point here.
    search_tree: SearchTree<St, A, C>,
    frontier: F,
    /// States discovered so far. Never shrinks during a run.
    reached: FxHashSet<St>,

    /// States popped from the frontier, to double check `reached`.
    #[cfg(feature = "verify")]
    closed: FxHashSet<St>,

    outcome: Option<SearchOutcome>,
    statistics: SearchStatistics,

    _phantom_action: PhantomData<A>,
}

impl<'p, P, F, St, A, C> GraphSearch<'p, P, F, St, A, C>
where
    P: Problem<St, A, C>,
    F: Frontier<SearchTreeIndex>,
    St: State,
    A: Action,
    C: Cost,
{
    /// Prepares a search. No work is done until `search()`.
    #[must_use]
    pub fn new(problem: &'p P, frontier: F) -> Self {
        Self {
            problem,
            search_tree: SearchTree::new(),
            frontier,
            reached: FxHashSet::default(),
            #[cfg(feature = "verify")]
            closed: FxHashSet::default(),
            outcome: None,
            statistics: SearchStatistics::default(),
            _phantom_action: PhantomData,
        }
    }

    /// Runs the search to completion.
    ///
    /// Running an already finished search returns its outcome again.
    pub fn search(&mut self) -> SearchOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }

        debug!(
            "Starting graph search on {:?} from {:?}",
            self.problem,
            self.problem.initial()
        );
        let outcome = self.explore();
        self.statistics.reached = self.reached.len();
        self.statistics.frontier_high_water = self.frontier.high_water();
        self.outcome = Some(outcome);
        debug!("Search ended with {outcome:?} ({})", self.statistics);

        outcome
    }

    fn explore(&mut self) -> SearchOutcome {
        let initial = self.problem.initial().clone();
        let root = self.search_tree.push_root(initial.clone());
        if self.problem.is_goal(&initial) {
            return SearchOutcome::Found(root);
        }

        self.reached.insert(initial);
        self.frontier.add(root);

        while let Some(index) = self.frontier.pop() {
            self.verify_first_expansion(index);
            self.statistics.expanded += 1;
            trace!(
                "Expanding {:?} (g={})",
                self.search_tree[index].state(),
                self.search_tree[index].path_cost()
            );

            for child in self.search_tree.expand(self.problem, index) {
                self.statistics.generated += 1;

                // Goals are tested as they are generated.
                if self.problem.is_goal(child.state()) {
                    let goal = self.search_tree.push(child);
                    return SearchOutcome::Found(goal);
                }
                if let Some(child_index) = self.reach(child) {
                    self.frontier.add(child_index);
                }
            }
        }

        SearchOutcome::Failure
    }

    /// Keeps a child whose state wasn't reached before.
    #[inline(always)]
    fn reach(&mut self, child: SearchTreeNode<St, A, C>) -> Option<SearchTreeIndex> {
        if self.reached.contains(child.state()) {
            return None;
        }
        self.reached.insert(child.state().clone());
        Some(self.search_tree.push(child))
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    fn verify_first_expansion(&mut self, _index: SearchTreeIndex) {
        // All good... (hopefully)
    }
    #[inline(always)]
    #[cfg(feature = "verify")]
    fn verify_first_expansion(&mut self, index: SearchTreeIndex) {
        let state = self.search_tree[index].state();
        assert!(
            self.reached.contains(state),
            "Expanding {state:?}, which was never reached"
        );
        assert!(
            self.closed.insert(state.clone()),
            "Expanding {state:?} for a second time"
        );
    }

    pub fn outcome(&self) -> Option<SearchOutcome> {
        self.outcome
    }
    pub fn search_tree(&self) -> &SearchTree<St, A, C> {
        &self.search_tree
    }
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }
    pub fn is_reached(&self, s: &St) -> bool {
        self.reached.contains(s)
    }

    /// Finishes the search, keeping the tree to rebuild paths.
    pub fn into_result(mut self) -> SearchResult<St, A, C> {
        let outcome = self.search();
        SearchResult::new(outcome, self.search_tree, self.statistics)
    }

    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "GraphSearch Stats:")?;
        let s = size_of::<SearchTreeNode<St, A, C>>();
        let l = self.search_tree.len();
        let c = self.search_tree.capacity();
        writeln!(
            out,
            "  - |Nodes|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Nodes|*:  {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<St>();
        let l = self.reached.len();
        let c = self.reached.capacity();
        writeln!(
            out,
            "  - |Reached|: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Reached|*: {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<SearchTreeIndex>();
        let l = self.frontier.len();
        let h = self.frontier.high_water();
        writeln!(
            out,
            "  - |Frontier|: {} (peak {}, {})",
            l.separate_with_commas(),
            h.separate_with_commas(),
            Size::from_bytes(h * s)
        )?;
        writeln!(
            out,
            "  - Expanded nodes: {}",
            self.statistics.expanded.separate_with_commas()
        )?;

        Ok(())
    }
}

impl<P, F, St, A, C> std::fmt::Debug for GraphSearch<'_, P, F, St, A, C>
where
    P: Problem<St, A, C>,
    F: Frontier<SearchTreeIndex>,
    St: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("GraphSearch")
            .field("problem", self.problem)
            .field("search_tree", &self.search_tree)
            .field("frontier", &self.frontier.len())
            .field("reached", &self.reached.len())
            .field("outcome", &self.outcome)
            .finish()
    }
}
