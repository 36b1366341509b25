use lexassign_solver::{
    Baseline, LexicographicRefiner, Relabeling, SolveError, TierCommit, TierSchedule, TierSolver,
};
use rand::Rng;

use crate::{
    model::{Assignment, Matrix, MatrixKind, PriorityMode},
    services::{
        expansion::{ExpansionError, FoldedAllocation, ReplicationPlan},
        priority_ranking::AxisPriorities,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanningError {
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error("Refined assignment costs {refined}, baseline optimum is {baseline}")]
    OptimumDrift { baseline: i64, refined: i64 },
}

/// Everything one solve needs, on original indices.
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub matrix: &'a Matrix<u64>,
    pub replication: &'a ReplicationPlan,
    pub priorities: &'a AxisPriorities,
    pub kind: MatrixKind,
    pub mode: PriorityMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    /// Expanded square value matrix.
    pub expanded: Matrix<u64>,
    /// Perfect matching on expanded indices, one entry per row.
    pub assignments: Vec<Assignment>,
    /// Baseline optimum in cost-grid units.
    pub optimum: i64,
    /// Zero where some optimal matching may assign; reduced cost elsewhere.
    pub candidates: Matrix<i64>,
    /// Tier trace on expanded indices.
    pub commits: Vec<TierCommit>,
    pub folded: FoldedAllocation,
    /// Sum of original values over the assignment.
    pub total: u64,
}

impl AssignmentPlan {
    /// Zero exactly at assigned cells.
    pub fn marker(&self) -> Matrix<u8> {
        let size = self.expanded.row_count();
        let mut marker = vec![vec![1u8; size]; size];
        for assignment in &self.assignments {
            marker[assignment.row][assignment.col] = 0;
        }
        Matrix::from_fn(size, size, |row, col| marker[row][col])
    }
}

/// Expansion, baseline, relabeling, refinement and folding in one pass.
pub struct AssignmentPlanner<S> {
    refiner: LexicographicRefiner<S>,
}

impl<S: TierSolver> AssignmentPlanner<S> {
    pub fn new(solver: S) -> Self {
        Self {
            refiner: LexicographicRefiner::new(solver),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.refiner.solver().name()
    }

    pub fn plan<R: Rng + ?Sized>(
        &self,
        input: PlanInput<'_>,
        rng: &mut R,
    ) -> Result<AssignmentPlan, PlanningError> {
        let replication = input.replication;
        let expanded = replication.expand_matrix(input.matrix)?;
        let row_ranks = replication.rows().expand_values(&input.priorities.rows)?;
        let col_ranks = replication.cols().expand_values(&input.priorities.cols)?;

        let costs = input.kind.cost_grid(&expanded);
        let baseline = Baseline::compute(&costs)?;

        let relabeling = Relabeling::random(costs.size(), rng);
        let schedule = TierSchedule::new(
            input.mode,
            &relabeling.row_values(&row_ranks),
            &relabeling.col_values(&col_ranks),
        )?;
        tracing::debug!(
            size = costs.size(),
            tiers = schedule.len(),
            backend = self.backend(),
            "refining relabeled problem"
        );

        let refinement = self.refiner.refine(
            &relabeling.costs(&costs),
            &relabeling.mask(baseline.marker()),
            &schedule,
        )?;
        let assignment = relabeling.restore(&refinement.assignment);

        let refined = costs.total(&assignment);
        if refined != baseline.optimum() {
            return Err(PlanningError::OptimumDrift {
                baseline: baseline.optimum(),
                refined,
            });
        }

        let commits = refinement
            .commits
            .iter()
            .map(|commit| relabeling.restore_commit(commit))
            .collect();
        let assignments = Assignment::from_row_map(&assignment);
        let folded = replication.fold(&assignments, &expanded);
        let marker = baseline.marker_matrix();
        let size = costs.size();

        Ok(AssignmentPlan {
            total: folded.total(),
            candidates: Matrix::from_fn(size, size, |row, col| marker[row][col]),
            optimum: baseline.optimum(),
            expanded,
            assignments,
            commits,
            folded,
        })
    }
}
