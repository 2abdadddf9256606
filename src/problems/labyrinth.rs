//! Grid labyrinths with 4-connected moves.
//!
//! Text format, one row per line:
//! - `.`, ` `, `░`, `1`: open
//! - `#`, `█`, `0`: wall
//! - `S`, `G`: start and goal (open)

use std::str::FromStr;

use derive_more::Display;
use thiserror::Error;

use crate::cost::StepCost;
use crate::problem::Actions;
use crate::problem::Problem;
use crate::space::Action;
use crate::space::State;

const MAX_ELEMENTS_DISPLAYED: usize = 40;
const RANDOM_STATE_MAX_TRIES: usize = 10_000;

pub type Coord = u32;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({row},{col})")]
pub struct LabyrinthState {
    pub row: Coord,
    pub col: Coord,
}

impl LabyrinthState {
    pub fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    fn from_usize(row: usize, col: usize) -> Self {
        debug_assert!(row < Coord::MAX as usize);
        debug_assert!(col < Coord::MAX as usize);
        Self::new(row as Coord, col as Coord)
    }
}
impl State for LabyrinthState {}

#[derive(Debug, Error)]
pub enum LabyrinthStateParseError {
    #[error("Expected 'row,col', got '{0}'")]
    Malformed(String),
    #[error("Invalid coordinate in '{s}': {e}")]
    InvalidCoord {
        s: String,
        e: std::num::ParseIntError,
    },
}

impl FromStr for LabyrinthState {
    type Err = LabyrinthStateParseError;

    /// Parses `row,col`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| LabyrinthStateParseError::Malformed(s.to_string()))?;
        let coord = |c: &str| {
            c.trim()
                .parse::<Coord>()
                .map_err(|e| LabyrinthStateParseError::InvalidCoord {
                    s: s.to_string(),
                    e,
                })
        };
        Ok(Self::new(coord(row)?, coord(col)?))
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum LabyrinthAction {
    #[display("→")]
    Right, // col++
    #[display("↓")]
    Down, // row++
    #[display("←")]
    Left, // col--
    #[display("↑")]
    Up, // row--
}
impl Action for LabyrinthAction {}

impl LabyrinthAction {
    /// Every move, in the order they are tried.
    pub const ALL: [LabyrinthAction; 4] = [
        LabyrinthAction::Right,
        LabyrinthAction::Down,
        LabyrinthAction::Left,
        LabyrinthAction::Up,
    ];

    /// Row and column offsets, wrapping on underflow.
    #[inline(always)]
    fn delta(&self) -> (Coord, Coord) {
        let prev = Coord::MAX;
        #[rustfmt::skip]
        let delta = match self {
            LabyrinthAction::Right => (0,    1   ),
            LabyrinthAction::Down  => (1,    0   ),
            LabyrinthAction::Left  => (0,    prev),
            LabyrinthAction::Up    => (prev, 0   ),
        };
        delta
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum LabyrinthCell {
    #[display("░")]
    Open,
    #[display("█")]
    Wall,
}

#[derive(Debug, Error)]
pub enum LabyrinthCellParseError {
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
}

impl TryFrom<char> for LabyrinthCell {
    type Error = LabyrinthCellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            ' ' | '.' | '░' | '1' => Ok(LabyrinthCell::Open),
            '#' | '█' | '0' => Ok(LabyrinthCell::Wall),
            ch => Err(LabyrinthCellParseError::InvalidCharacter(ch)),
        }
    }
}

/// A rectangular grid of cells, addressed by `(row, col)`.
#[derive(Clone, PartialEq, Eq)]
pub struct LabyrinthMap {
    cells: Vec<Vec<LabyrinthCell>>,
}

impl LabyrinthMap {
    pub fn from_cells(cells: Vec<Vec<LabyrinthCell>>) -> Result<Self, LabyrinthParseError> {
        let cols = cells.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(LabyrinthParseError::EmptyInput);
        }
        if let Some(row) = cells.iter().position(|r| r.len() != cols) {
            return Err(LabyrinthParseError::RaggedRow {
                row,
                expected: cols,
                found: cells[row].len(),
            });
        }
        Ok(Self { cells })
    }

    /// A map without walls.
    pub fn open(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![LabyrinthCell::Open; cols]; rows],
        }
    }

    /// A map where each cell is a wall with probability `wall_ratio`.
    pub fn random<R: rand::Rng>(r: &mut R, rows: usize, cols: usize, wall_ratio: f64) -> Self {
        let cells = (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| {
                        if r.random::<f64>() < wall_ratio {
                            LabyrinthCell::Wall
                        } else {
                            LabyrinthCell::Open
                        }
                    })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cells.len(), self.cells.first().map_or(0, Vec::len))
    }

    pub fn at(&self, s: &LabyrinthState) -> Option<LabyrinthCell> {
        self.cells
            .get(s.row as usize)
            .and_then(|row| row.get(s.col as usize))
            .copied()
    }

    pub fn is_open(&self, s: &LabyrinthState) -> bool {
        self.at(s) == Some(LabyrinthCell::Open)
    }

    /// Where `a` leads from `s`, if that's an open cell.
    #[inline(always)]
    pub fn step(&self, s: &LabyrinthState, a: &LabyrinthAction) -> Option<LabyrinthState> {
        let (dr, dc) = a.delta();
        let next = LabyrinthState::new(s.row.wrapping_add(dr), s.col.wrapping_add(dc));
        self.is_open(&next).then_some(next)
    }

    /// Open cells one move away from `s`.
    pub fn neighbours(&self, s: &LabyrinthState) -> Vec<LabyrinthState> {
        LabyrinthAction::ALL
            .iter()
            .filter_map(|a| self.step(s, a))
            .collect()
    }

    pub fn random_open_cell<R: rand::Rng>(&self, r: &mut R) -> Option<LabyrinthState> {
        let (rows, cols) = self.dimensions();
        if rows == 0 || cols == 0 {
            return None;
        }
        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            let s = LabyrinthState::from_usize(r.random_range(0..rows), r.random_range(0..cols));
            if self.is_open(&s) {
                return Some(s);
            }
        }
        None
    }
}

impl std::fmt::Display for LabyrinthMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (rows, cols) = self.dimensions();
        writeln!(f, "Labyrinth({rows}x{cols}):")?;
        for line in self.cells.iter().take(MAX_ELEMENTS_DISPLAYED) {
            for cell in line.iter().take(MAX_ELEMENTS_DISPLAYED) {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LabyrinthMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "LabyrinthMap{:?}", self.dimensions())
    }
}

#[derive(Debug, Error)]
pub enum LabyrinthParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Invalid cell at ({row},{col}): {e}")]
    InvalidCell {
        e: LabyrinthCellParseError,
        row: usize,
        col: usize,
    },
    #[error("Invalid value {value} at ({row},{col}), expected 0 (wall) or 1 (open)")]
    InvalidValue { value: u8, row: usize, col: usize },
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Marker '{marker}' found again at ({row},{col})")]
    DuplicateMarker { marker: char, row: usize, col: usize },
    #[error("No start given")]
    MissingStart,
    #[error("No goal given")]
    MissingGoal,
    #[error("{0} is not an open cell")]
    NotOpen(LabyrinthState),
    #[error("I/O error when loading '{p}': {e}")]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
}

/// Find a way through a labyrinth, one cell at a time.
#[derive(Clone, Debug)]
pub struct LabyrinthProblem {
    map: LabyrinthMap,
    initial: LabyrinthState,
    goal: LabyrinthState,
}

impl LabyrinthProblem {
    /// Both `initial` and `goal` should be open cells of `map`.
    pub fn new(map: LabyrinthMap, initial: LabyrinthState, goal: LabyrinthState) -> Self {
        debug_assert!(map.is_open(&initial), "{initial} is not open");
        debug_assert!(map.is_open(&goal), "{goal} is not open");
        Self { map, initial, goal }
    }

    fn checked(
        map: LabyrinthMap,
        initial: LabyrinthState,
        goal: LabyrinthState,
    ) -> Result<Self, LabyrinthParseError> {
        for s in [initial, goal] {
            if !map.is_open(&s) {
                return Err(LabyrinthParseError::NotOpen(s));
            }
        }
        Ok(Self::new(map, initial, goal))
    }

    /// Builds a problem from a grid of `1` (open) and `0` (wall).
    pub fn from_grid<R: AsRef<[u8]>>(
        grid: &[R],
        initial: LabyrinthState,
        goal: LabyrinthState,
    ) -> Result<Self, LabyrinthParseError> {
        let mut cells = Vec::with_capacity(grid.len());
        for (row, values) in grid.iter().enumerate() {
            let line = values
                .as_ref()
                .iter()
                .enumerate()
                .map(|(col, &value)| match value {
                    1 => Ok(LabyrinthCell::Open),
                    0 => Ok(LabyrinthCell::Wall),
                    value => Err(LabyrinthParseError::InvalidValue { value, row, col }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(line);
        }
        Self::checked(LabyrinthMap::from_cells(cells)?, initial, goal)
    }

    /// Parses a text labyrinth.
    ///
    /// `initial` and `goal` take precedence over the `S` and `G` markers.
    pub fn parse(
        s: &str,
        initial: Option<LabyrinthState>,
        goal: Option<LabyrinthState>,
    ) -> Result<Self, LabyrinthParseError> {
        let mut lines: Vec<&str> = s.lines().skip_while(|l| l.is_empty()).collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let mut start_marker = None;
        let mut goal_marker = None;
        let mut cells = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let mut cell_row = Vec::with_capacity(line.len());
            for (col, ch) in line.chars().enumerate() {
                let marker = match ch {
                    'S' => Some(&mut start_marker),
                    'G' => Some(&mut goal_marker),
                    _ => None,
                };
                let cell = match marker {
                    Some(m) => {
                        if m.is_some() {
                            return Err(LabyrinthParseError::DuplicateMarker {
                                marker: ch,
                                row,
                                col,
                            });
                        }
                        *m = Some(LabyrinthState::from_usize(row, col));
                        LabyrinthCell::Open
                    }
                    None => LabyrinthCell::try_from(ch)
                        .map_err(|e| LabyrinthParseError::InvalidCell { e, row, col })?,
                };
                cell_row.push(cell);
            }
            cells.push(cell_row);
        }

        let map = LabyrinthMap::from_cells(cells)?;
        let initial = initial
            .or(start_marker)
            .ok_or(LabyrinthParseError::MissingStart)?;
        let goal = goal.or(goal_marker).ok_or(LabyrinthParseError::MissingGoal)?;
        Self::checked(map, initial, goal)
    }

    pub fn load(
        p: &std::path::Path,
        initial: Option<LabyrinthState>,
        goal: Option<LabyrinthState>,
    ) -> Result<Self, LabyrinthParseError> {
        let s = std::fs::read_to_string(p).map_err(|e| LabyrinthParseError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        Self::parse(&s, initial, goal)
    }

    /// Picks a random open start and goal on `map`.
    pub fn random<R: rand::Rng>(r: &mut R, map: &LabyrinthMap) -> Option<Self> {
        let initial = map.random_open_cell(r)?;
        let goal = map.random_open_cell(r)?;
        Some(Self::new(map.clone(), initial, goal))
    }

    pub fn map(&self) -> &LabyrinthMap {
        &self.map
    }
}

impl TryFrom<&str> for LabyrinthProblem {
    type Error = LabyrinthParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s, None, None)
    }
}

impl TryFrom<&std::path::Path> for LabyrinthProblem {
    type Error = LabyrinthParseError;

    fn try_from(p: &std::path::Path) -> Result<Self, Self::Error> {
        Self::load(p, None, None)
    }
}

impl Problem<LabyrinthState, LabyrinthAction, StepCost> for LabyrinthProblem {
    fn initial(&self) -> &LabyrinthState {
        &self.initial
    }

    fn goal(&self) -> Option<&LabyrinthState> {
        Some(&self.goal)
    }

    #[inline(always)]
    fn actions(&self, s: &LabyrinthState) -> Actions<LabyrinthAction> {
        LabyrinthAction::ALL
            .into_iter()
            .filter(|a| self.map.step(s, a).is_some())
            .collect()
    }

    #[inline(always)]
    fn result(&self, s: &LabyrinthState, a: &LabyrinthAction) -> LabyrinthState {
        match self.map.step(s, a) {
            Some(next) => next,
            None => unreachable!("{a} leaves the open cells from {s}"),
        }
    }
}

impl std::fmt::Display for LabyrinthProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (rows, cols) = self.map.dimensions();
        writeln!(
            f,
            "Labyrinth({rows}x{cols}) (s:{}, g:{}):",
            self.initial, self.goal
        )?;
        for (row, line) in self.map.cells.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
            for (col, cell) in line.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
                let s = LabyrinthState::from_usize(row, col);
                match (s == self.initial, s == self.goal) {
                    (true, true) => write!(f, "!")?,
                    (true, false) => write!(f, "S")?,
                    (false, true) => write!(f, "G")?,
                    (false, false) => write!(f, "{cell}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
