use std::ops::Range;

use crate::model::{Assignment, Axis, ExpandedIndex, FoldedAssignment, Matrix};

/// Largest supported side of the expanded square matrix.
pub const MAX_EXPANDED_SIZE: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionError {
    #[error("Replication factor of {axis} {index} must be at least 1 (found {factor})")]
    InvalidReplicationFactor {
        axis: Axis,
        index: usize,
        factor: usize,
    },
    #[error("Row factors sum to {row_total} but column factors sum to {col_total}")]
    DimensionMismatch { row_total: usize, col_total: usize },
    #[error("{axis} replication factors overflow")]
    FactorOverflow { axis: Axis },
    #[error("Expanded matrix side {size} exceeds the supported maximum {limit}")]
    ExpandedTooLarge { size: usize, limit: usize },
    #[error("Expected {expected} {axis} entries, found {found}")]
    ShapeMismatch {
        axis: Axis,
        expected: usize,
        found: usize,
    },
}

/// Forward and backward index maps for one replicated axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisLayout {
    axis: Axis,
    factors: Vec<usize>,
    // offsets[i]..offsets[i + 1] is the expanded range of original i
    offsets: Vec<usize>,
    owners: Vec<ExpandedIndex>,
}

/// Sum of one axis' factors, each of which must be at least 1.
fn factor_total(axis: Axis, factors: &[usize]) -> Result<usize, ExpansionError> {
    factors
        .iter()
        .enumerate()
        .try_fold(0usize, |total, (index, &factor)| {
            if factor < 1 {
                return Err(ExpansionError::InvalidReplicationFactor {
                    axis,
                    index,
                    factor,
                });
            }
            total
                .checked_add(factor)
                .ok_or(ExpansionError::FactorOverflow { axis })
        })
}

impl AxisLayout {
    // `factors` are validated and sum to `total`.
    fn build(axis: Axis, factors: Vec<usize>, total: usize) -> Self {
        let mut offsets = Vec::with_capacity(factors.len() + 1);
        let mut owners = Vec::with_capacity(total);
        offsets.push(0);
        for (original, &factor) in factors.iter().enumerate() {
            owners.extend((0..factor).map(|replica| ExpandedIndex { original, replica }));
            offsets.push(owners.len());
        }

        Self {
            axis,
            factors,
            offsets,
            owners,
        }
    }

    fn unit(axis: Axis, len: usize) -> Self {
        Self {
            axis,
            factors: vec![1; len],
            offsets: (0..=len).collect(),
            owners: (0..len)
                .map(|original| ExpandedIndex {
                    original,
                    replica: 0,
                })
                .collect(),
        }
    }

    pub fn original_len(&self) -> usize {
        self.factors.len()
    }

    pub fn expanded_len(&self) -> usize {
        self.owners.len()
    }

    pub fn expanded_range(&self, original: usize) -> Range<usize> {
        self.offsets[original]..self.offsets[original + 1]
    }

    pub fn locate(&self, expanded: usize) -> ExpandedIndex {
        self.owners[expanded]
    }

    fn check_len(&self, found: usize) -> Result<(), ExpansionError> {
        if found == self.original_len() {
            Ok(())
        } else {
            Err(ExpansionError::ShapeMismatch {
                axis: self.axis,
                expected: self.original_len(),
                found,
            })
        }
    }

    /// Repeats each per-original value once per replica.
    pub fn expand_values<T: Clone>(&self, values: &[T]) -> Result<Vec<T>, ExpansionError> {
        self.check_len(values.len())?;
        Ok(self
            .owners
            .iter()
            .map(|owner| values[owner.original].clone())
            .collect())
    }

    pub fn expand_labels(&self, names: &[String]) -> Result<Vec<String>, ExpansionError> {
        self.check_len(names.len())?;
        Ok(names
            .iter()
            .zip(&self.factors)
            .flat_map(|(name, &factor)| {
                (0..factor).map(move |replica| replica_label(name, replica, factor))
            })
            .collect())
    }

    pub fn fold_labels(&self, names: &[String]) -> Result<Vec<String>, ExpansionError> {
        self.check_len(names.len())?;
        Ok(names
            .iter()
            .zip(&self.factors)
            .map(|(name, &factor)| fold_label(name, factor))
            .collect())
    }
}

/// Display name of one replica: the base name when it is not replicated,
/// otherwise suffixed with its 1-based ordinal.
fn replica_label(name: &str, replica: usize, factor: usize) -> String {
    if factor == 1 {
        name.to_string()
    } else {
        format!("{name}-{}", replica + 1)
    }
}

/// Display name of a folded row or column.
fn fold_label(name: &str, factor: usize) -> String {
    if factor == 1 {
        name.to_string()
    } else {
        format!("{name}×{factor}")
    }
}

/// Validated replication factors for both axes of one problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationPlan {
    rows: AxisLayout,
    cols: AxisLayout,
}

impl ReplicationPlan {
    pub fn try_new(row_factors: Vec<usize>, col_factors: Vec<usize>) -> Result<Self, ExpansionError> {
        let row_total = factor_total(Axis::Row, &row_factors)?;
        let col_total = factor_total(Axis::Column, &col_factors)?;
        if row_total != col_total {
            return Err(ExpansionError::DimensionMismatch {
                row_total,
                col_total,
            });
        }
        if row_total > MAX_EXPANDED_SIZE {
            return Err(ExpansionError::ExpandedTooLarge {
                size: row_total,
                limit: MAX_EXPANDED_SIZE,
            });
        }
        Ok(Self {
            rows: AxisLayout::build(Axis::Row, row_factors, row_total),
            cols: AxisLayout::build(Axis::Column, col_factors, col_total),
        })
    }

    /// Every factor 1 on an `n x n` problem.
    pub fn identity(size: usize) -> Self {
        Self {
            rows: AxisLayout::unit(Axis::Row, size),
            cols: AxisLayout::unit(Axis::Column, size),
        }
    }

    pub fn rows(&self) -> &AxisLayout {
        &self.rows
    }

    pub fn cols(&self) -> &AxisLayout {
        &self.cols
    }

    pub fn layout(&self, axis: Axis) -> &AxisLayout {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.cols,
        }
    }

    /// Side of the expanded square matrix.
    pub fn size(&self) -> usize {
        self.rows.expanded_len()
    }

    pub fn check_shape<T>(&self, matrix: &Matrix<T>) -> Result<(), ExpansionError> {
        self.rows.check_len(matrix.row_count())?;
        self.cols.check_len(matrix.col_count())
    }

    pub fn expand_matrix<T: Clone>(&self, matrix: &Matrix<T>) -> Result<Matrix<T>, ExpansionError> {
        self.check_shape(matrix)?;
        Ok(Matrix::from_fn(self.size(), self.size(), |row, col| {
            matrix[(self.rows.locate(row).original, self.cols.locate(col).original)].clone()
        }))
    }

    /// Attributes every expanded assignment to its original row and column.
    /// Replicas are kept apart.
    pub fn fold(&self, assignments: &[Assignment], expanded: &Matrix<u64>) -> FoldedAllocation {
        let mut entries: Vec<FoldedAssignment> = assignments
            .iter()
            .map(|a| FoldedAssignment {
                row: self.rows.locate(a.row),
                col: self.cols.locate(a.col),
                value: expanded[(a.row, a.col)],
            })
            .collect();
        entries.sort_unstable_by_key(|entry| (entry.row, entry.col));
        FoldedAllocation {
            entries,
            original_rows: self.rows.original_len(),
            original_cols: self.cols.original_len(),
        }
    }
}

/// Expanded assignments projected back onto original indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedAllocation {
    entries: Vec<FoldedAssignment>,
    original_rows: usize,
    original_cols: usize,
}

impl FoldedAllocation {
    pub fn entries(&self) -> &[FoldedAssignment] {
        &self.entries
    }

    /// `(original_row, original_col)` for every assignment, in entry order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.entries
            .iter()
            .map(|entry| (entry.row.original, entry.col.original))
            .collect()
    }

    pub fn for_original(&self, axis: Axis, original: usize) -> impl Iterator<Item = &FoldedAssignment> {
        self.entries.iter().filter(move |entry| match axis {
            Axis::Row => entry.row.original == original,
            Axis::Column => entry.col.original == original,
        })
    }

    pub fn row_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.original_rows];
        for entry in &self.entries {
            totals[entry.row.original] += entry.value;
        }
        totals
    }

    pub fn col_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.original_cols];
        for entry in &self.entries {
            totals[entry.col.original] += entry.value;
        }
        totals
    }

    /// Number of assignments landing on each original cell.
    pub fn counts(&self) -> Matrix<u64> {
        let mut counts = vec![vec![0u64; self.original_cols]; self.original_rows];
        for entry in &self.entries {
            counts[entry.row.original][entry.col.original] += 1;
        }
        Matrix::from_fn(self.original_rows, self.original_cols, |row, col| counts[row][col])
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|entry| entry.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|name| (*name).to_string()).collect()
    }

    #[rstest]
    #[case::row_zero(vec![1, 0], vec![1], ExpansionError::InvalidReplicationFactor { axis: Axis::Row, index: 1, factor: 0 })]
    #[case::col_zero(vec![1], vec![0, 1], ExpansionError::InvalidReplicationFactor { axis: Axis::Column, index: 0, factor: 0 })]
    #[case::unequal_totals(vec![1, 2], vec![1, 1], ExpansionError::DimensionMismatch { row_total: 3, col_total: 2 })]
    #[case::row_overflow(vec![usize::MAX, 1], vec![1], ExpansionError::FactorOverflow { axis: Axis::Row })]
    #[case::col_overflow(vec![1], vec![1, usize::MAX], ExpansionError::FactorOverflow { axis: Axis::Column })]
    #[case::huge_mismatch(vec![100_000_000_000], vec![1], ExpansionError::DimensionMismatch { row_total: 100_000_000_000, col_total: 1 })]
    #[case::above_limit(vec![MAX_EXPANDED_SIZE + 1], vec![MAX_EXPANDED_SIZE, 1], ExpansionError::ExpandedTooLarge { size: MAX_EXPANDED_SIZE + 1, limit: MAX_EXPANDED_SIZE })]
    fn rejects_invalid_factors(
        #[case] rows: Vec<usize>,
        #[case] cols: Vec<usize>,
        #[case] expected: ExpansionError,
    ) {
        assert_eq!(ReplicationPlan::try_new(rows, cols), Err(expected));
    }

    #[test]
    fn unit_factors_leave_matrix_unchanged() {
        let matrix = Matrix::from_values(vec![vec![1, 2], vec![3, 4]]).expect("valid");
        let plan = ReplicationPlan::try_new(vec![1, 1], vec![1, 1]).expect("valid plan");
        assert_eq!(plan.expand_matrix(&matrix).expect("expand"), matrix);
        assert_eq!(plan, ReplicationPlan::identity(2));
    }

    #[test]
    fn replicated_row_duplicates_values_and_maps_back() {
        // One worker doing two of three tasks.
        let matrix = Matrix::from_values(vec![vec![1, 2, 3], vec![4, 5, 6]]).expect("valid");
        let plan = ReplicationPlan::try_new(vec![2, 1], vec![1, 1, 1]).expect("valid plan");
        let expanded = plan.expand_matrix(&matrix).expect("expand");

        assert_eq!(
            expanded.to_rows(),
            vec![vec![1, 2, 3], vec![1, 2, 3], vec![4, 5, 6]]
        );
        assert_eq!(plan.rows().expanded_range(0), 0..2);
        assert_eq!(
            plan.rows().locate(1),
            ExpandedIndex {
                original: 0,
                replica: 1
            }
        );
    }

    #[test]
    fn shape_must_match_factor_lengths() {
        let matrix = Matrix::from_values(vec![vec![1, 2]]).expect("valid");
        let err = ReplicationPlan::try_new(vec![2], vec![1, 1, 1]).expect_err("totals differ");
        assert!(matches!(err, ExpansionError::DimensionMismatch { .. }));

        let plan = ReplicationPlan::try_new(vec![3], vec![1, 1, 1]).expect("valid plan");
        assert_eq!(
            plan.expand_matrix(&matrix),
            Err(ExpansionError::ShapeMismatch {
                axis: Axis::Column,
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn labels_carry_ordinals_and_fold_markers() {
        let plan = ReplicationPlan::try_new(vec![1, 3], vec![2, 2]).expect("valid plan");
        let rows = names(&["Ann", "Bob"]);
        assert_eq!(
            plan.rows().expand_labels(&rows).expect("labels"),
            names(&["Ann", "Bob-1", "Bob-2", "Bob-3"])
        );
        assert_eq!(
            plan.rows().fold_labels(&rows).expect("labels"),
            names(&["Ann", "Bob×3"])
        );
        assert!(plan.cols().expand_labels(&names(&["x"])).is_err());
    }

    #[test]
    fn fold_keeps_every_replica_and_aggregates_per_original() {
        let matrix = Matrix::from_values(vec![vec![1, 2, 3], vec![4, 5, 6]]).expect("valid");
        let plan = ReplicationPlan::try_new(vec![2, 1], vec![1, 1, 1]).expect("valid plan");
        let expanded = plan.expand_matrix(&matrix).expect("expand");
        let assignments = Assignment::from_row_map(&[2, 0, 1]);

        let folded = plan.fold(&assignments, &expanded);
        assert_eq!(folded.pairs(), vec![(0, 2), (0, 0), (1, 1)]);
        assert_eq!(folded.for_original(Axis::Row, 0).count(), 2);
        assert_eq!(
            folded
                .for_original(Axis::Row, 0)
                .map(|entry| entry.row.replica)
                .collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(folded.row_totals(), vec![4, 5]);
        assert_eq!(folded.col_totals(), vec![1, 5, 3]);
        assert_eq!(folded.total(), 9);
        assert_eq!(folded.counts().to_rows(), vec![vec![1, 0, 1], vec![0, 1, 0]]);
    }
}
