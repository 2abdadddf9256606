//! The water jug puzzle.
//!
//! Vessels of fixed sizes can be filled to the brim, emptied, or poured into
//! each other until either the source is empty or the target is full. The goal
//! is reached when any vessel holds exactly the target volume.

use derive_more::Display;
use smallvec::SmallVec;
use thiserror::Error;

use crate::cost::StepCost;
use crate::problem::Actions;
use crate::problem::Problem;
use crate::space::Action;
use crate::space::State;

pub type Volume = u32;

/// Levels of every vessel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PourState(pub SmallVec<[Volume; 4]>);
impl State for PourState {}

impl PourState {
    pub fn new(levels: &[Volume]) -> Self {
        Self(SmallVec::from_slice(levels))
    }

    pub fn levels(&self) -> &[Volume] {
        &self.0
    }
}

impl std::fmt::Display for PourState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, level) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{level}")?;
        }
        write!(f, ")")
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum PourAction {
    #[display("Fill({_0})")]
    Fill(usize),
    #[display("Dump({_0})")]
    Dump(usize),
    /// From the first vessel into the second.
    #[display("Pour({_0}, {_1})")]
    Pour(usize, usize),
}
impl Action for PourAction {}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PourError {
    #[error("At least one vessel is needed")]
    NoVessels,
    #[error("Got {sizes} vessel sizes but {levels} initial levels")]
    LengthMismatch { sizes: usize, levels: usize },
    #[error("Vessel {vessel} starts with {level} but only holds {size}")]
    Overfilled {
        vessel: usize,
        level: Volume,
        size: Volume,
    },
}

#[derive(Clone, Debug)]
pub struct PourProblem {
    sizes: SmallVec<[Volume; 4]>,
    initial: PourState,
    goal: Volume,
}

impl PourProblem {
    pub fn new(sizes: &[Volume], initial: &[Volume], goal: Volume) -> Result<Self, PourError> {
        if sizes.is_empty() {
            return Err(PourError::NoVessels);
        }
        if sizes.len() != initial.len() {
            return Err(PourError::LengthMismatch {
                sizes: sizes.len(),
                levels: initial.len(),
            });
        }
        if let Some(vessel) = (0..sizes.len()).find(|&i| initial[i] > sizes[i]) {
            return Err(PourError::Overfilled {
                vessel,
                level: initial[vessel],
                size: sizes[vessel],
            });
        }

        Ok(Self {
            sizes: SmallVec::from_slice(sizes),
            initial: PourState::new(initial),
            goal,
        })
    }

    pub fn sizes(&self) -> &[Volume] {
        &self.sizes
    }

    /// The volume to measure.
    pub fn target(&self) -> Volume {
        self.goal
    }
}

impl Problem<PourState, PourAction, StepCost> for PourProblem {
    fn initial(&self) -> &PourState {
        &self.initial
    }

    /// Every action is listed, even those that leave the state unchanged.
    fn actions(&self, s: &PourState) -> Actions<PourAction> {
        let n = s.levels().len();
        let mut actions = Actions::with_capacity(n * (n + 1));
        for i in 0..n {
            actions.push(PourAction::Fill(i));
            actions.push(PourAction::Dump(i));
            for j in (0..n).filter(|&j| j != i) {
                actions.push(PourAction::Pour(i, j));
            }
        }
        actions
    }

    fn result(&self, s: &PourState, a: &PourAction) -> PourState {
        let mut next = s.clone();
        let levels = &mut next.0;
        match *a {
            PourAction::Fill(i) => levels[i] = self.sizes[i],
            PourAction::Dump(i) => levels[i] = 0,
            PourAction::Pour(i, j) => {
                let amount = levels[i].min(self.sizes[j] - levels[j]);
                levels[i] -= amount;
                levels[j] += amount;
            }
        }
        next
    }

    fn is_goal(&self, s: &PourState) -> bool {
        s.levels().contains(&self.goal)
    }
}

impl std::fmt::Display for PourProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pour(sizes: {}, initial: {}, goal: {})",
            PourState(self.sizes.clone()),
            self.initial,
            self.goal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::graph_search::breadth_first_search;
    use crate::algorithms::graph_search::depth_first_search;

    fn states(v: &[&[Volume]]) -> Vec<PourState> {
        v.iter().map(|l| PourState::new(l)).collect()
    }

    #[test]
    fn measures_thirteen() {
        let problem = PourProblem::new(&[2, 16, 32], &[1, 1, 1], 13).unwrap();
        let result = breadth_first_search(&problem);

        use PourAction::*;
        assert_eq!(
            result.path_actions(),
            vec![Fill(1), Pour(1, 0), Dump(0), Pour(1, 0)]
        );
        assert_eq!(
            result.path_states(),
            states(&[&[1, 1, 1], &[1, 16, 1], &[2, 15, 1], &[0, 15, 1], &[2, 13, 1]])
        );
        assert_eq!(result.path_cost(), 4);
        assert!(problem.valid_path(&result.path()));

        let levels = result.solution().unwrap().levels();
        assert_eq!(levels.iter().position(|&l| l == problem.target()), Some(1));
        assert_eq!(problem.sizes()[1], 16);
    }

    #[test]
    fn measures_four_with_two_vessels() {
        let problem = PourProblem::new(&[3, 5], &[0, 0], 4).unwrap();
        let result = breadth_first_search(&problem);
        assert_eq!(
            result.path_states(),
            states(&[
                &[0, 0],
                &[0, 5],
                &[3, 2],
                &[0, 2],
                &[2, 0],
                &[2, 5],
                &[3, 4]
            ])
        );

        let dfs = depth_first_search(&problem);
        assert!(dfs.is_found());
        assert!(problem.is_goal(dfs.solution().unwrap()));
    }

    #[test]
    fn odd_volumes_from_even_vessels_fail() {
        let problem = PourProblem::new(&[2, 4], &[0, 0], 5).unwrap();
        let result = breadth_first_search(&problem);
        assert!(result.is_failure());
        assert!(result.path_states().is_empty());
        // (0,0), (2,0), (0,4), (2,4), (0,2), (2,2)
        assert_eq!(result.statistics().reached, 6);
    }

    #[test]
    fn goal_at_the_start() {
        let problem = PourProblem::new(&[2, 16, 32], &[1, 1, 1], 1).unwrap();
        let result = breadth_first_search(&problem);
        assert_eq!(result.path_states(), states(&[&[1, 1, 1]]));
        assert!(result.path_actions().is_empty());
    }

    #[test]
    fn actions_cover_every_vessel() {
        let problem = PourProblem::new(&[3, 5], &[0, 0], 4).unwrap();
        use PourAction::*;
        assert_eq!(
            problem.actions(problem.initial()).as_slice(),
            &[Fill(0), Dump(0), Pour(0, 1), Fill(1), Dump(1), Pour(1, 0)]
        );
        let three = PourProblem::new(&[1, 2, 3], &[0, 0, 0], 9).unwrap();
        assert_eq!(
            three.actions(three.initial()).as_slice(),
            &[
                Fill(0),
                Dump(0),
                Pour(0, 1),
                Pour(0, 2),
                Fill(1),
                Dump(1),
                Pour(1, 0),
                Pour(1, 2),
                Fill(2),
                Dump(2),
                Pour(2, 0),
                Pour(2, 1),
            ]
        );
    }

    #[test]
    fn pouring_stops_when_full_or_empty() {
        let problem = PourProblem::new(&[3, 5], &[3, 4], 1).unwrap();
        let s = problem.initial();
        assert_eq!(problem.result(s, &PourAction::Pour(0, 1)), PourState::new(&[2, 5]));
        assert_eq!(problem.result(s, &PourAction::Pour(1, 0)), PourState::new(&[3, 4]));
        assert_eq!(problem.result(s, &PourAction::Dump(1)), PourState::new(&[3, 0]));
        assert_eq!(problem.result(s, &PourAction::Fill(1)), PourState::new(&[3, 5]));
    }

    #[test]
    fn invalid_setups() {
        assert_eq!(PourProblem::new(&[], &[], 1).unwrap_err(), PourError::NoVessels);
        assert_eq!(
            PourProblem::new(&[3, 5], &[0], 1).unwrap_err(),
            PourError::LengthMismatch {
                sizes: 2,
                levels: 1
            }
        );
        assert_eq!(
            PourProblem::new(&[3, 5], &[0, 6], 1).unwrap_err(),
            PourError::Overfilled {
                vessel: 1,
                level: 6,
                size: 5
            }
        );
    }

    #[test]
    fn display() {
        let problem = PourProblem::new(&[2, 16, 32], &[1, 1, 1], 13).unwrap();
        assert_eq!(
            problem.to_string(),
            "Pour(sizes: (2, 16, 32), initial: (1, 1, 1), goal: 13)"
        );
        assert_eq!(PourAction::Pour(1, 0).to_string(), "Pour(1, 0)");
    }
}
