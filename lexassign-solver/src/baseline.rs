use crate::{
    CellMask, CostGrid, SolveError,
    hungarian::{self, Matching},
};
use fixedbitset::FixedBitSet;
use std::collections::VecDeque;

/// Reference optimum of an unconstrained assignment problem together with
/// the cells that some minimum-cost perfect matching may use.
#[derive(Debug, Clone)]
pub struct Baseline {
    matching: Matching,
    reduced: Vec<i64>,
    marker: CellMask,
}

impl Baseline {
    pub fn compute(costs: &CostGrid) -> Result<Self, SolveError> {
        let matching = hungarian::solve(costs, None)?;
        let n = costs.size();

        let mut reduced = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                reduced.push(matching.reduced_cost(costs, row, col));
            }
        }

        let tight = tight_cells(costs, &matching, None);
        let marker = matchable_cells(&tight, &matching.assignment);
        tracing::debug!(
            size = n,
            optimum = matching.total,
            candidates = marker.len(),
            "baseline assignment solved"
        );

        Ok(Self {
            matching,
            reduced,
            marker,
        })
    }

    pub fn size(&self) -> usize {
        self.matching.assignment.len()
    }

    pub fn assignment(&self) -> &[usize] {
        &self.matching.assignment
    }

    pub fn optimum(&self) -> i64 {
        self.matching.total
    }

    pub fn matching(&self) -> &Matching {
        &self.matching
    }

    /// Cells used by at least one minimum-cost perfect matching.
    pub fn marker(&self) -> &CellMask {
        &self.marker
    }

    pub fn reduced_cost(&self, row: usize, col: usize) -> i64 {
        self.reduced[row * self.size() + col]
    }

    /// Zero exactly on marker cells; elsewhere the reduced cost, at least 1.
    pub fn marker_matrix(&self) -> Vec<Vec<i64>> {
        let n = self.size();
        (0..n)
            .map(|row| {
                (0..n)
                    .map(|col| {
                        if self.marker.contains(row, col) {
                            0
                        } else {
                            self.reduced_cost(row, col).max(1)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Cells with zero reduced cost under the duals of `matching`.
pub(crate) fn tight_cells(
    costs: &CostGrid,
    matching: &Matching,
    within: Option<&CellMask>,
) -> CellMask {
    let n = costs.size();
    let mut tight = CellMask::empty(n);
    for row in 0..n {
        for col in 0..n {
            if within.is_none_or(|mask| mask.contains(row, col))
                && matching.reduced_cost(costs, row, col) == 0
            {
                tight.insert(row, col);
            }
        }
    }
    tight
}

/// Restricts `mask` to the cells that lie on some perfect matching inside it.
///
/// `assignment` must be a perfect matching contained in `mask`. An unmatched
/// cell `(row, col)` can be swapped in exactly when the row currently holding
/// `col` reaches `row` through the exchange graph, closing an alternating
/// cycle.
pub(crate) fn matchable_cells(mask: &CellMask, assignment: &[usize]) -> CellMask {
    let n = assignment.len();
    debug_assert!(mask.contains_assignment(assignment));

    let mut holder = vec![0usize; n];
    for (row, &col) in assignment.iter().enumerate() {
        holder[col] = row;
    }

    let mut exchanges: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (row, col) in mask.cells() {
        if assignment[row] != col {
            exchanges[row].push(holder[col]);
        }
    }

    let reach: Vec<FixedBitSet> = (0..n).map(|start| reachable(&exchanges, start)).collect();

    let mut kept = CellMask::empty(n);
    for (row, col) in mask.cells() {
        if assignment[row] == col || reach[holder[col]].contains(row) {
            kept.insert(row, col);
        }
    }
    kept
}

fn reachable(edges: &[Vec<usize>], start: usize) -> FixedBitSet {
    let mut seen = FixedBitSet::with_capacity(edges.len());
    let mut queue = VecDeque::from([start]);
    seen.insert(start);
    while let Some(node) = queue.pop_front() {
        for &next in &edges[node] {
            if !seen.put(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}
