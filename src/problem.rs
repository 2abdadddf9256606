use smallvec::SmallVec;

use crate::cost::Cost;
use crate::space::Action;
use crate::space::Path;
use crate::space::State;

/// Actions available from a state.
///
/// Most problems offer a handful of actions, so they stay inline.
pub type Actions<A> = SmallVec<[A; 8]>;

/// A state-space description.
///
/// Building a problem never searches. Every method must be a pure function of
/// its arguments so a problem can be shared by concurrent searches.
pub trait Problem<St, A, C>: std::fmt::Debug
where
    St: State,
    A: Action,
    C: Cost,
{
    fn initial(&self) -> &St;

    /// The goal state, if the goal is a single state.
    ///
    /// Problems with a goal predicate return `None` and override `is_goal`.
    fn goal(&self) -> Option<&St> {
        None
    }

    /// Actions applicable in `s`, in the order they should be tried.
    fn actions(&self, s: &St) -> Actions<A>;

    /// Applies `a` to `s`. `a` must come from `actions(s)`.
    fn result(&self, s: &St, a: &A) -> St;

    fn is_goal(&self, s: &St) -> bool {
        self.goal() == Some(s)
    }

    fn action_cost(&self, _s: &St, _a: &A, _s1: &St) -> C {
        C::one()
    }

    /// Heuristic estimate of the remaining cost. Uninformed searches ignore it.
    fn h(&self, _s: &St) -> C {
        C::zero()
    }

    /// States visited when applying `actions` from `start`, `start` included.
    fn replay(&self, start: &St, actions: &[A]) -> Vec<St> {
        let mut states = Vec::with_capacity(actions.len() + 1);
        let mut state = start.clone();
        for a in actions {
            let next = self.result(&state, a);
            states.push(state);
            state = next;
        }
        states.push(state);
        states
    }

    /// Checks that every action in `p` is applicable where it's used, and
    /// that the path ends where it claims to.
    fn valid_path(&self, p: &Path<St, A, C>) -> bool {
        match (&p.start, &p.end) {
            (Some(start), Some(end)) => {
                let mut state: St = start.clone();
                let mut cost = C::zero();
                for a in &p.actions {
                    if !self.actions(&state).contains(a) {
                        return false;
                    }
                    let next = self.result(&state, a);
                    cost = cost.saturating_add(&self.action_cost(&state, a, &next));
                    state = next;
                }
                *end == state && cost == p.cost
            }
            // Empty paths are fine
            (None, None) => *p == Path::<St, A, C>::empty(),
            _ => false,
        }
    }
}
