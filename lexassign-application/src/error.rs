use lexassign_domain::{Axis, ExpansionError, MatrixError, PlanningError, RankingError};
use lexassign_solver::SolveError;

/// Failure reported by a [`TableParser`](crate::ports::TableParser).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableParseError {
    #[error("No table found")]
    Empty,
    #[error("Line {line}: {detail}")]
    Syntax { line: usize, detail: String },
    #[error("Line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("Row factors sum to {row_total} but column factors sum to {col_total}")]
    DimensionMismatch { row_total: usize, col_total: usize },
    #[error("Replication factor of {axis} {index} must be at least 1 (found {factor})")]
    InvalidReplicationFactor {
        axis: Axis,
        index: usize,
        factor: usize,
    },
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    /// A refinement tier found no feasible matching after the baseline
    /// succeeded. Never caused by input.
    #[error("Internal solver error: {0}")]
    Infeasible(String),
}

pub(crate) fn map_matrix_error(err: MatrixError) -> AssignmentError {
    AssignmentError::MalformedInput(err.to_string())
}

pub(crate) fn map_expansion_error(err: ExpansionError) -> AssignmentError {
    match err {
        ExpansionError::InvalidReplicationFactor {
            axis,
            index,
            factor,
        } => AssignmentError::InvalidReplicationFactor {
            axis,
            index,
            factor,
        },
        ExpansionError::DimensionMismatch {
            row_total,
            col_total,
        } => AssignmentError::DimensionMismatch {
            row_total,
            col_total,
        },
        err @ (ExpansionError::ShapeMismatch { .. }
        | ExpansionError::FactorOverflow { .. }
        | ExpansionError::ExpandedTooLarge { .. }) => {
            AssignmentError::MalformedInput(err.to_string())
        }
    }
}

pub(crate) fn map_ranking_error(err: RankingError) -> AssignmentError {
    AssignmentError::MalformedInput(err.to_string())
}

pub(crate) fn map_table_parse_error(err: TableParseError) -> AssignmentError {
    AssignmentError::MalformedInput(err.to_string())
}

pub(crate) fn map_planning_error(err: PlanningError) -> AssignmentError {
    match err {
        PlanningError::Expansion(err) => map_expansion_error(err),
        PlanningError::Solve(err) => map_solve_error(err),
        err @ PlanningError::OptimumDrift { .. } => AssignmentError::Infeasible(err.to_string()),
    }
}

fn map_solve_error(err: SolveError) -> AssignmentError {
    match err {
        SolveError::NotSquare { .. } | SolveError::RankLengthMismatch { .. } => {
            AssignmentError::MalformedInput(err.to_string())
        }
        SolveError::Infeasible { .. } | SolveError::Backend(_) | SolveError::NonBinarySolution => {
            AssignmentError::Infeasible(err.to_string())
        }
    }
}
