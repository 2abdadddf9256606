use crate::cost::Cost;
use crate::problem::Actions;
use crate::problem::Problem;
use crate::space::Action;
use crate::space::Path;
use crate::space::State;

/// A handle to a `SearchTreeNode` in a `SearchTree`.
///
/// Handles are stable: nodes are never moved or removed while the tree lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTreeIndex {
    index: usize,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn new(index: usize) -> Self {
        Self { index }
    }

    #[inline(always)]
    pub fn get(&self) -> usize {
        self.index
    }
}

/// A node of the search tree.
///
/// Immutable once pushed into a tree. The root has no parent, and every other
/// node records its parent together with the action that produced it.
#[derive(Clone, Debug)]
pub struct SearchTreeNode<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub(crate) parent: Option<(SearchTreeIndex, A)>,
    pub(crate) state: St,
    pub(crate) g: C,
}

impl<St, A, C> SearchTreeNode<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub fn new(s: St, parent: Option<(SearchTreeIndex, A)>, g: C) -> Self {
        Self {
            parent,
            state: s,
            g,
        }
    }

    pub fn state(&self) -> &St {
        &self.state
    }
    pub fn parent(&self) -> Option<SearchTreeIndex> {
        self.parent.map(|(p, _)| p)
    }
    /// The action that produced this node from its parent.
    pub fn action(&self) -> Option<&A> {
        self.parent.as_ref().map(|(_, a)| a)
    }
    /// Cost of the path from the root.
    pub fn path_cost(&self) -> C {
        self.g
    }
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// All the nodes generated by a search.
///
/// Nodes only point to their parents, which are always older, so the structure
/// is acyclic by construction.
pub struct SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    nodes: Vec<SearchTreeNode<St, A, C>>,
}

impl<St, A, C> SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[inline(always)]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Adds a root node with no cost.
    pub fn push_root(&mut self, s: St) -> SearchTreeIndex {
        self.push_root_with_cost(s, C::zero())
    }

    /// Adds a root node starting with a cost of `g`.
    pub fn push_root_with_cost(&mut self, s: St, g: C) -> SearchTreeIndex {
        self.push(SearchTreeNode::new(s, None, g))
    }

    #[inline(always)]
    pub fn push(&mut self, node: SearchTreeNode<St, A, C>) -> SearchTreeIndex {
        let index = SearchTreeIndex::new(self.nodes.len());
        if let Some(parent) = node.parent() {
            debug_assert!(parent < index, "Parents must exist before their children");
            debug_assert!(
                self[parent].g <= node.g,
                "Path costs can't decrease along a path"
            );
        }
        self.nodes.push(node);
        index
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Generates the children of a node as they are pulled.
    ///
    /// The actions are listed upfront, but states and costs are only computed
    /// for the children actually consumed.
    pub fn expand<'p, P>(
        &self,
        problem: &'p P,
        index: SearchTreeIndex,
    ) -> Expansion<'p, P, St, A, C>
    where
        P: Problem<St, A, C>,
    {
        let node = &self[index];
        Expansion {
            problem,
            parent: index,
            actions: problem.actions(&node.state).into_iter(),
            state: node.state.clone(),
            g: node.g,
        }
    }

    /// Number of actions from the root to the node.
    pub fn depth(&self, mut index: SearchTreeIndex) -> usize {
        let mut depth = 0;
        while let Some(parent) = self[index].parent() {
            depth += 1;
            index = parent;
        }
        depth
    }

    /// The states from the root to the node, both included.
    #[must_use]
    pub fn path_states(&self, mut index: SearchTreeIndex) -> Vec<St> {
        let mut states = vec![self[index].state.clone()];
        while let Some(parent) = self[index].parent() {
            states.push(self[parent].state.clone());
            index = parent;
        }
        states.reverse();
        states
    }

    /// The actions from the root to the node.
    #[must_use]
    pub fn path_actions(&self, mut index: SearchTreeIndex) -> Vec<A> {
        let mut actions = vec![];
        while let Some((parent, a)) = self[index].parent {
            actions.push(a);
            index = parent;
        }
        actions.reverse();
        actions
    }

    #[must_use]
    pub fn path(&self, index: SearchTreeIndex) -> Path<St, A, C> {
        let mut chain = vec![];
        let mut root = index;
        while let Some(parent) = self[root].parent() {
            chain.push(root);
            root = parent;
        }

        let mut path = Path::<St, A, C>::new_from_start(self[root].state.clone());
        let mut g = self[root].g;
        for &i in chain.iter().rev() {
            let node = &self[i];
            if let Some((_, a)) = node.parent {
                // Once infinite, the rest of the path stays infinite.
                let step = if g.valid() { node.g - g } else { C::max_value() };
                path.append((node.state.clone(), a), step);
            }
            g = node.g;
        }
        path
    }
}

impl<St, A, C> Default for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, A, C> std::ops::Index<SearchTreeIndex> for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    type Output = SearchTreeNode<St, A, C>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.index]
    }
}

impl<St, A, C> std::fmt::Debug for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

/// Children of a node, generated on demand.
///
/// See [`SearchTree::expand`].
pub struct Expansion<'p, P, St, A, C>
where
    P: Problem<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    problem: &'p P,
    parent: SearchTreeIndex,
    actions: <Actions<A> as IntoIterator>::IntoIter,
    state: St,
    g: C,
}

impl<P, St, A, C> Iterator for Expansion<'_, P, St, A, C>
where
    P: Problem<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    type Item = SearchTreeNode<St, A, C>;

    fn next(&mut self) -> Option<Self::Item> {
        let a = self.actions.next()?;
        let s1 = self.problem.result(&self.state, &a);
        let c = self.problem.action_cost(&self.state, &a, &s1);
        let g = self.g.saturating_add(&c);
        Some(SearchTreeNode::new(s1, Some((self.parent, a)), g))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.actions.size_hint()
    }
}

impl<P, St, A, C> ExactSizeIterator for Expansion<'_, P, St, A, C>
where
    P: Problem<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
}

/// How a search ended.
///
/// `Failure` and `Cutoff` replace sentinel nodes: they carry no state and
/// their path is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A goal node was reached.
    Found(SearchTreeIndex),
    /// The whole reachable space was explored without reaching a goal.
    Failure,
    /// A search budget ran out before deciding.
    Cutoff,
}

impl SearchOutcome {
    pub fn node(&self) -> Option<SearchTreeIndex> {
        match self {
            SearchOutcome::Found(index) => Some(*index),
            SearchOutcome::Failure | SearchOutcome::Cutoff => None,
        }
    }
}

/// Counters collected during a search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Nodes popped from the frontier and expanded.
    pub expanded: usize,
    /// Child nodes generated by expansions.
    pub generated: usize,
    /// Distinct states discovered.
    pub reached: usize,
    /// Largest size of the frontier.
    pub frontier_high_water: usize,
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use thousands::Separable;

        write!(
            f,
            "expanded: {}, generated: {}, reached: {}, frontier peak: {}",
            self.expanded.separate_with_commas(),
            self.generated.separate_with_commas(),
            self.reached.separate_with_commas(),
            self.frontier_high_water.separate_with_commas(),
        )
    }
}

/// The result of a search: its outcome and the tree that supports it.
pub struct SearchResult<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    outcome: SearchOutcome,
    search_tree: SearchTree<St, A, C>,
    statistics: SearchStatistics,
}

impl<St, A, C> SearchResult<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub(crate) fn new(
        outcome: SearchOutcome,
        search_tree: SearchTree<St, A, C>,
        statistics: SearchStatistics,
    ) -> Self {
        Self {
            outcome,
            search_tree,
            statistics,
        }
    }

    pub fn outcome(&self) -> SearchOutcome {
        self.outcome
    }
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }
    pub fn is_failure(&self) -> bool {
        self.outcome == SearchOutcome::Failure
    }
    pub fn is_cutoff(&self) -> bool {
        self.outcome == SearchOutcome::Cutoff
    }

    /// The goal node, if any.
    pub fn node(&self) -> Option<&SearchTreeNode<St, A, C>> {
        self.outcome.node().map(|index| &self.search_tree[index])
    }
    /// The goal state, if any.
    pub fn solution(&self) -> Option<&St> {
        self.node().map(|n| n.state())
    }

    /// States from the initial state to the goal. Empty without a solution.
    pub fn path_states(&self) -> Vec<St> {
        match self.outcome {
            SearchOutcome::Found(index) => self.search_tree.path_states(index),
            SearchOutcome::Failure | SearchOutcome::Cutoff => vec![],
        }
    }
    /// Actions from the initial state to the goal. Empty without a solution.
    pub fn path_actions(&self) -> Vec<A> {
        match self.outcome {
            SearchOutcome::Found(index) => self.search_tree.path_actions(index),
            SearchOutcome::Failure | SearchOutcome::Cutoff => vec![],
        }
    }
    /// Cost of the solution, `C::max_value()` without one.
    pub fn path_cost(&self) -> C {
        match self.node() {
            Some(node) => node.path_cost(),
            None => C::max_value(),
        }
    }
    pub fn path(&self) -> Path<St, A, C> {
        match self.outcome {
            SearchOutcome::Found(index) => self.search_tree.path(index),
            SearchOutcome::Failure | SearchOutcome::Cutoff => Path::empty(),
        }
    }

    pub fn search_tree(&self) -> &SearchTree<St, A, C> {
        &self.search_tree
    }
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }
}

impl<St, A, C> std::fmt::Debug for SearchResult<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SearchResult")
            .field("outcome", &self.outcome)
            .field("search_tree", &self.search_tree)
            .field("statistics", &self.statistics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::StepCost;

    impl State for u32 {}
    impl Action for i32 {}

    /// A line `0..=10` walked in steps of -1, +1 and +2, in that order.
    #[derive(Debug)]
    struct Line;

    impl Problem<u32, i32, StepCost> for Line {
        fn initial(&self) -> &u32 {
            &0
        }
        fn goal(&self) -> Option<&u32> {
            Some(&10)
        }
        fn actions(&self, s: &u32) -> Actions<i32> {
            [-1, 1, 2]
                .into_iter()
                .filter(|d| (0..=10).contains(&(*s as i32 + d)))
                .collect()
        }
        fn result(&self, s: &u32, a: &i32) -> u32 {
            (*s as i32 + a) as u32
        }
        fn action_cost(&self, _s: &u32, a: &i32, _s1: &u32) -> StepCost {
            a.unsigned_abs()
        }
    }

    fn chain(tree: &mut SearchTree<u32, i32, StepCost>, actions: &[i32]) -> SearchTreeIndex {
        let mut index = tree.push_root(0);
        for a in actions {
            let child = tree
                .expand(&Line, index)
                .find(|n| n.action() == Some(a))
                .unwrap();
            index = tree.push(child);
        }
        index
    }

    #[test]
    fn root_has_no_parent_and_no_cost() {
        let mut tree = SearchTree::<u32, i32, StepCost>::new();
        let root = tree.push_root(3);
        assert!(tree[root].is_root());
        assert_eq!(tree[root].path_cost(), 0);
        assert_eq!(tree[root].action(), None);
        assert_eq!(tree.path_states(root), vec![3]);
        assert!(tree.path_actions(root).is_empty());
        assert_eq!(tree.depth(root), 0);
    }

    #[test]
    fn expansion_follows_action_order() {
        let mut tree = SearchTree::<u32, i32, StepCost>::new();
        let root = tree.push_root(4);
        let children: Vec<_> = tree.expand(&Line, root).collect();
        let states: Vec<u32> = children.iter().map(|n| *n.state()).collect();
        let costs: Vec<StepCost> = children.iter().map(|n| n.path_cost()).collect();
        assert_eq!(states, vec![3, 5, 6]);
        assert_eq!(costs, vec![1, 1, 2]);
        assert!(children.iter().all(|n| n.parent() == Some(root)));
    }

    #[test]
    fn expansion_is_lazy_and_bounded() {
        let mut tree = SearchTree::<u32, i32, StepCost>::new();
        let root = tree.push_root(0);
        let mut expansion = tree.expand(&Line, root);
        assert_eq!(expansion.len(), 2);
        assert_eq!(expansion.next().map(|n| *n.state()), Some(1));
        assert_eq!(expansion.len(), 1);
        assert_eq!(expansion.next().map(|n| *n.state()), Some(2));
        assert!(expansion.next().is_none());
    }

    #[test]
    fn paths_are_rebuilt_from_the_root() {
        let mut tree = SearchTree::<u32, i32, StepCost>::new();
        let leaf = chain(&mut tree, &[2, 2, -1, 1, 2]);

        assert_eq!(tree.path_states(leaf), vec![0, 2, 4, 3, 4, 6]);
        assert_eq!(tree.path_actions(leaf), vec![2, 2, -1, 1, 2]);
        assert_eq!(tree.depth(leaf), 5);
        assert_eq!(tree[leaf].path_cost(), 8);

        let path = tree.path(leaf);
        assert_eq!(path.start, Some(0));
        assert_eq!(path.end, Some(6));
        assert_eq!(path.cost, 8);
        assert!(Line.valid_path(&path));
        assert_eq!(Line.replay(&0, &path.actions), tree.path_states(leaf));
    }

    #[test]
    fn infinite_steps_keep_the_path_infinite() {
        let mut tree = SearchTree::<u32, i32, StepCost>::new();
        let root = tree.push_root(0);
        let a = tree.push(SearchTreeNode::new(1, Some((root, 1)), StepCost::MAX));
        let b = tree.push(SearchTreeNode::new(2, Some((a, 1)), StepCost::MAX));

        let path = tree.path(b);
        assert_eq!(path.actions, vec![1, 1]);
        assert_eq!(path.end, Some(2));
        assert_eq!(path.cost, StepCost::MAX);
        assert!(!path.cost.valid());
    }

    #[test]
    fn path_costs_never_decrease() {
        let mut tree = SearchTree::<u32, i32, StepCost>::new();
        let leaf = chain(&mut tree, &[1, 1, 2, -1, 2]);
        let mut index = leaf;
        while let Some(parent) = tree[index].parent() {
            assert!(tree[parent].path_cost() <= tree[index].path_cost());
            index = parent;
        }
    }

    #[test]
    fn root_cost_can_be_supplied() {
        let mut tree = SearchTree::<u32, i32, StepCost>::new();
        let root = tree.push_root_with_cost(0, 5);
        let child = tree.expand(&Line, root).next().unwrap();
        let child = tree.push(child);
        assert_eq!(tree[child].path_cost(), 6);
        assert_eq!(tree.path(child).cost, 1);
    }

    #[test]
    fn sentinels_have_no_path() {
        for outcome in [SearchOutcome::Failure, SearchOutcome::Cutoff] {
            let result = SearchResult::<u32, i32, StepCost>::new(
                outcome,
                SearchTree::new(),
                SearchStatistics::default(),
            );
            assert!(result.path_states().is_empty());
            assert!(result.path_actions().is_empty());
            assert_eq!(result.path_cost(), StepCost::MAX);
            assert_eq!(result.path(), Path::empty());
            assert!(result.solution().is_none());
            assert!(!result.is_found());
        }
        assert_ne!(SearchOutcome::Failure, SearchOutcome::Cutoff);
    }
}
