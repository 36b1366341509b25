//! Random relabeling of rows and columns.
//!
//! Solvers break ties by index order. Solving a randomly relabeled copy of
//! the problem and mapping the answer back turns that order into a uniform
//! choice among equally good matchings.

use crate::{CellMask, CostGrid, TierCommit, grid::Axis};
use rand::{Rng, seq::SliceRandom};

/// Bijection over `[0, n)`; position `i` of the relabeled problem holds
/// element `source(i)` of the original one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    source: Vec<usize>,
}

impl Permutation {
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut source: Vec<usize> = (0..len).collect();
        source.shuffle(rng);
        Self { source }
    }

    /// Returns `None` unless `source` is a bijection over `[0, source.len())`.
    pub fn from_sources(source: Vec<usize>) -> Option<Self> {
        let mut seen = vec![false; source.len()];
        for &idx in &source {
            if idx >= source.len() || std::mem::replace(&mut seen[idx], true) {
                return None;
            }
        }
        Some(Self { source })
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    #[inline]
    pub fn source(&self, position: usize) -> usize {
        self.source[position]
    }

    pub fn permute<T: Clone>(&self, values: &[T]) -> Vec<T> {
        debug_assert_eq!(values.len(), self.source.len());
        self.source.iter().map(|&idx| values[idx].clone()).collect()
    }
}

/// Independent row and column permutations applied together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relabeling {
    rows: Permutation,
    cols: Permutation,
}

impl Relabeling {
    pub fn new(rows: Permutation, cols: Permutation) -> Self {
        debug_assert_eq!(rows.len(), cols.len());
        Self { rows, cols }
    }

    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let rows = Permutation::random(size, rng);
        let cols = Permutation::random(size, rng);
        Self::new(rows, cols)
    }

    pub fn rows(&self) -> &Permutation {
        &self.rows
    }

    pub fn cols(&self) -> &Permutation {
        &self.cols
    }

    pub fn costs(&self, costs: &CostGrid) -> CostGrid {
        CostGrid::from_fn(costs.size(), |row, col| {
            costs.get(self.rows.source(row), self.cols.source(col))
        })
    }

    pub fn mask(&self, mask: &CellMask) -> CellMask {
        let mut relabeled = CellMask::empty(mask.size());
        for row in 0..mask.size() {
            for col in 0..mask.size() {
                if mask.contains(self.rows.source(row), self.cols.source(col)) {
                    relabeled.insert(row, col);
                }
            }
        }
        relabeled
    }

    pub fn row_values<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.rows.permute(values)
    }

    pub fn col_values<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.cols.permute(values)
    }

    /// Maps an assignment of the relabeled problem back to original labels.
    pub fn restore(&self, assignment: &[usize]) -> Vec<usize> {
        let mut restored = vec![0usize; assignment.len()];
        for (row, &col) in assignment.iter().enumerate() {
            restored[self.rows.source(row)] = self.cols.source(col);
        }
        restored
    }

    pub fn restore_commit(&self, commit: &TierCommit) -> TierCommit {
        let permutation = match commit.axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.cols,
        };
        let mut members: Vec<usize> = commit
            .members
            .iter()
            .map(|&idx| permutation.source(idx))
            .collect();
        members.sort_unstable();
        TierCommit {
            members,
            ..commit.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn from_sources_rejects_non_bijections() {
        assert!(Permutation::from_sources(vec![0, 0, 1]).is_none());
        assert!(Permutation::from_sources(vec![0, 3, 1]).is_none());
        assert!(Permutation::from_sources(vec![2, 0, 1]).is_some());
    }

    #[test]
    fn same_seed_gives_same_relabeling() {
        let a = Relabeling::random(12, &mut ChaCha8Rng::seed_from_u64(42));
        let b = Relabeling::random(12, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn restore_recovers_costs_of_relabeled_solution() {
        let costs = CostGrid::try_from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]])
            .expect("square grid");
        let relabeling = Relabeling::new(
            Permutation::from_sources(vec![2, 0, 1]).expect("bijection"),
            Permutation::from_sources(vec![1, 2, 0]).expect("bijection"),
        );
        let relabeled = relabeling.costs(&costs);
        assert_eq!(relabeled.row(0), &[8, 9, 7]);

        let assignment = vec![0, 2, 1];
        let restored = relabeling.restore(&assignment);
        assert_eq!(costs.total(&restored), relabeled.total(&assignment));
        // Relabeled row 0 is original row 2, relabeled column 0 is original column 1.
        assert_eq!(restored, vec![0, 2, 1]);
    }

    #[test]
    fn mask_follows_cost_relabeling() {
        let mut mask = CellMask::empty(2);
        mask.insert(0, 1);
        let relabeling = Relabeling::new(
            Permutation::from_sources(vec![1, 0]).expect("bijection"),
            Permutation::from_sources(vec![0, 1]).expect("bijection"),
        );
        let relabeled = relabeling.mask(&mask);
        assert!(relabeled.contains(1, 1));
        assert!(!relabeled.contains(0, 1));
    }
}
