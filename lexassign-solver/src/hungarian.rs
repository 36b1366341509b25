//! Minimum-cost perfect matching (Hungarian algorithm).
//!
//! Dense O(n^3) shortest augmenting path implementation over integer costs
//! that keeps row and column potentials. The potentials form an optimal
//! dual solution: `cost - row_potential - col_potential` is non-negative on
//! every allowed cell and zero on every matched cell.

use crate::{CellMask, CostGrid, SolveError};

const UNREACHED: i64 = i64::MAX / 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    /// Column matched to each row.
    pub assignment: Vec<usize>,
    pub total: i64,
    pub row_potential: Vec<i64>,
    pub col_potential: Vec<i64>,
}

impl Matching {
    #[inline]
    pub fn reduced_cost(&self, costs: &CostGrid, row: usize, col: usize) -> i64 {
        costs.get(row, col) - self.row_potential[row] - self.col_potential[col]
    }
}

/// Solves the assignment problem on `costs`, using only cells in `allowed`
/// when a mask is given.
pub fn solve(costs: &CostGrid, allowed: Option<&CellMask>) -> Result<Matching, SolveError> {
    let n = costs.size();
    if n == 0 {
        return Ok(Matching {
            assignment: Vec::new(),
            total: 0,
            row_potential: Vec::new(),
            col_potential: Vec::new(),
        });
    }

    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![UNREACHED; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = UNREACHED;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                if allowed.is_none_or(|mask| mask.contains(i0 - 1, j - 1)) {
                    let cur = costs.get(i0 - 1, j - 1) - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            if j1 == 0 {
                return Err(SolveError::Infeasible {
                    stage: format!("augmentation from row {}", i - 1),
                });
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else if minv[j] < UNREACHED {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }

    Ok(Matching {
        total: costs.total(&assignment),
        assignment,
        row_potential: u[1..].to_vec(),
        col_potential: v[1..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn grid(rows: &[&[i64]]) -> CostGrid {
        let rows: Vec<Vec<i64>> = rows.iter().map(|row| row.to_vec()).collect();
        CostGrid::try_from_rows(&rows).expect("square grid")
    }

    fn brute_force_optimum(costs: &CostGrid, allowed: Option<&CellMask>) -> Option<i64> {
        fn walk(
            costs: &CostGrid,
            allowed: Option<&CellMask>,
            row: usize,
            used: &mut Vec<bool>,
            acc: i64,
            best: &mut Option<i64>,
        ) {
            if row == costs.size() {
                *best = Some(best.map_or(acc, |b| b.min(acc)));
                return;
            }
            for col in 0..costs.size() {
                if used[col] || allowed.is_some_and(|mask| !mask.contains(row, col)) {
                    continue;
                }
                used[col] = true;
                walk(costs, allowed, row + 1, used, acc + costs.get(row, col), best);
                used[col] = false;
            }
        }

        let mut best = None;
        walk(
            costs,
            allowed,
            0,
            &mut vec![false; costs.size()],
            0,
            &mut best,
        );
        best
    }

    #[rstest]
    #[case::diagonal(&[&[5, 15, 25][..], &[15, 5, 25][..], &[25, 25, 5][..]], 15)]
    #[case::classic(&[&[5, 4, 7, 6][..], &[6, 7, 3, 2][..], &[8, 11, 2, 5][..], &[9, 8, 6, 7][..]], 17)]
    #[case::single(&[&[42][..]], 42)]
    #[case::uniform(&[&[3, 3][..], &[3, 3][..]], 6)]
    fn finds_minimum_total(#[case] rows: &[&[i64]], #[case] expected: i64) {
        let costs = grid(rows);
        let matching = solve(&costs, None).expect("feasible");
        assert_eq!(matching.total, expected);
        assert_eq!(costs.total(&matching.assignment), expected);
    }

    #[test]
    fn empty_grid_has_empty_matching() {
        let matching = solve(&CostGrid::from_fn(0, |_, _| 0), None).expect("feasible");
        assert!(matching.assignment.is_empty());
        assert_eq!(matching.total, 0);
    }

    #[test]
    fn forbidden_cells_are_never_used() {
        let costs = grid(&[&[0, 10], &[10, 0]]);
        let mut mask = CellMask::empty(2);
        mask.insert(0, 1);
        mask.insert(1, 0);
        let matching = solve(&costs, Some(&mask)).expect("feasible");
        assert_eq!(matching.assignment, vec![1, 0]);
        assert_eq!(matching.total, 20);
    }

    #[test]
    fn reports_infeasible_mask() {
        let costs = grid(&[&[1, 2], &[3, 4]]);
        let mut mask = CellMask::empty(2);
        mask.insert(0, 0);
        mask.insert(1, 0);
        let err = solve(&costs, Some(&mask)).expect_err("no perfect matching");
        assert!(matches!(err, SolveError::Infeasible { .. }));
    }

    proptest! {
        #[test]
        fn matches_brute_force_and_dual_feasibility(
            size in 1usize..=5,
            values in prop::collection::vec(0i64..=30, 25),
        ) {
            let costs = CostGrid::from_fn(size, |r, c| values[r * 5 + c]);
            let matching = solve(&costs, None).expect("complete grid is feasible");

            prop_assert_eq!(Some(matching.total), brute_force_optimum(&costs, None));

            let mut seen = vec![false; size];
            for &col in &matching.assignment {
                prop_assert!(!seen[col]);
                seen[col] = true;
            }
            for row in 0..size {
                for col in 0..size {
                    prop_assert!(matching.reduced_cost(&costs, row, col) >= 0);
                }
                prop_assert_eq!(matching.reduced_cost(&costs, row, matching.assignment[row]), 0);
            }
        }

        #[test]
        fn masked_solve_matches_brute_force(
            size in 1usize..=5,
            values in prop::collection::vec(0i64..=30, 25),
            holes in prop::collection::vec(any::<bool>(), 25),
        ) {
            let costs = CostGrid::from_fn(size, |r, c| values[r * 5 + c]);
            let mut mask = CellMask::empty(size);
            for row in 0..size {
                for col in 0..size {
                    // Keep the diagonal so a perfect matching always exists.
                    if row == col || !holes[row * 5 + col] {
                        mask.insert(row, col);
                    }
                }
            }
            let matching = solve(&costs, Some(&mask)).expect("diagonal keeps it feasible");
            prop_assert!(mask.contains_assignment(&matching.assignment));
            prop_assert_eq!(Some(matching.total), brute_force_optimum(&costs, Some(&mask)));
        }
    }
}
