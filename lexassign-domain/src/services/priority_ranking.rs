use crate::model::{Axis, Matrix, MatrixKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankingError {
    #[error("Expected {expected} {axis} priorities, found {found}")]
    LengthMismatch {
        axis: Axis,
        expected: usize,
        found: usize,
    },
}

/// Which line sums rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDirection {
    Ascending,
    Descending,
}

impl From<MatrixKind> for RankDirection {
    fn from(kind: MatrixKind) -> Self {
        match kind {
            MatrixKind::Cost => Self::Ascending,
            MatrixKind::Profit => Self::Descending,
        }
    }
}

/// Competition ranking: equal values share a rank and each rank is one
/// plus the number of values strictly better.
pub fn competition_rank(values: &[u64], direction: RankDirection) -> Vec<u32> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    values
        .iter()
        .map(|value| {
            let better = match direction {
                RankDirection::Ascending => sorted.partition_point(|v| v < value),
                RankDirection::Descending => sorted.len() - sorted.partition_point(|v| v <= value),
            };
            better as u32 + 1
        })
        .collect()
}

/// Per-original priority ranks for both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisPriorities {
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityRanking;

impl PriorityRanking {
    /// Ranks rows and columns of the original matrix by their sums.
    pub fn derive(&self, matrix: &Matrix<u64>, kind: MatrixKind) -> AxisPriorities {
        let direction = RankDirection::from(kind);
        AxisPriorities {
            rows: competition_rank(&matrix.row_sums(), direction),
            cols: competition_rank(&matrix.col_sums(), direction),
        }
    }

    /// Explicit ranks replace the derived ones axis by axis.
    pub fn resolve(
        &self,
        derived: AxisPriorities,
        explicit_rows: Option<Vec<u32>>,
        explicit_cols: Option<Vec<u32>>,
    ) -> Result<AxisPriorities, RankingError> {
        let rows = pick(Axis::Row, derived.rows, explicit_rows)?;
        let cols = pick(Axis::Column, derived.cols, explicit_cols)?;
        Ok(AxisPriorities { rows, cols })
    }
}

fn pick(axis: Axis, derived: Vec<u32>, explicit: Option<Vec<u32>>) -> Result<Vec<u32>, RankingError> {
    let Some(explicit) = explicit else {
        return Ok(derived);
    };
    if explicit.len() != derived.len() {
        return Err(RankingError::LengthMismatch {
            axis,
            expected: derived.len(),
            found: explicit.len(),
        });
    }
    Ok(explicit)
}
