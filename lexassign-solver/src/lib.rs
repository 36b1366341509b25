#![warn(clippy::uninlined_format_args)]

mod baseline;
mod grid;
pub mod hungarian;
mod milp;
mod refinement;
mod relabel;

use thiserror::Error;

pub use baseline::Baseline;
pub use grid::{Axis, CellMask, CostGrid};
pub use hungarian::Matching;
pub use milp::{MilpRegion, MilpTierSolver};
pub use refinement::{
    DualTighteningSolver, Duals, LexicographicRefiner, PriorityMode, Refinement, Tier, TierCommit,
    TierSchedule, TierSolution, TierSolver,
};
pub use relabel::{Permutation, Relabeling};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("Cost grid must be square (row {row} has {found} cells, expected {expected})")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{axis} ranks have {found} entries, expected {expected}")]
    RankLengthMismatch {
        axis: Axis,
        expected: usize,
        found: usize,
    },
    #[error("No feasible perfect matching while solving {stage}")]
    Infeasible { stage: String },
    #[error("MILP backend failed: {0}")]
    Backend(String),
    #[error("MILP backend returned a non-binary assignment")]
    NonBinarySolution,
}
