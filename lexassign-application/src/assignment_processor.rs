use crate::{
    error::{
        AssignmentError, map_expansion_error, map_matrix_error, map_planning_error,
        map_ranking_error, map_table_parse_error,
    },
    model::{AssignmentReport, AssignmentRequest, RefinementBackend, ReportLabels},
    ports::{SeedSource, TableParser},
};
use lexassign_domain::{
    AssignmentPlan, AssignmentPlanner, Axis, AxisPriorities, Matrix, MatrixKind, PlanInput,
    PriorityMode, PriorityRanking, ReplicationPlan,
};
use lexassign_solver::{DualTighteningSolver, MilpTierSolver};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Copy)]
pub struct AssignmentProcessor<'a> {
    parser: &'a dyn TableParser,
    seeds: &'a dyn SeedSource,
    backend: RefinementBackend,
}

impl<'a> AssignmentProcessor<'a> {
    pub fn new(parser: &'a dyn TableParser, seeds: &'a dyn SeedSource) -> Self {
        Self {
            parser,
            seeds,
            backend: RefinementBackend::default(),
        }
    }

    pub fn with_backend(mut self, backend: RefinementBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn backend(&self) -> RefinementBackend {
        self.backend
    }

    /// Parses pasted text and solves it with a fresh seed.
    pub fn solve_text(
        &self,
        content: &str,
        kind: MatrixKind,
        mode: PriorityMode,
    ) -> Result<AssignmentReport, AssignmentError> {
        let table = self.parser.parse(content).map_err(map_table_parse_error)?;
        self.solve(table.into_request(kind, mode))
    }

    pub fn solve(&self, request: AssignmentRequest) -> Result<AssignmentReport, AssignmentError> {
        let seed = self.seeds.next_seed();
        self.solve_with_seed(request, seed)
    }

    pub fn solve_with_seed(
        &self,
        request: AssignmentRequest,
        seed: u64,
    ) -> Result<AssignmentReport, AssignmentError> {
        let kind = MatrixKind::from_code(request.matrix_type).ok_or_else(|| {
            AssignmentError::MalformedInput(format!(
                "Matrix type must be 0 (cost) or 1 (profit), found {}",
                request.matrix_type
            ))
        })?;
        let mode = PriorityMode::from_flag(request.priority_mode).ok_or_else(|| {
            AssignmentError::MalformedInput(format!(
                "Priority mode must be 0 (row) or 1 (column), found {}",
                request.priority_mode
            ))
        })?;

        let replication = ReplicationPlan::try_new(request.row_factors, request.col_factors)
            .map_err(map_expansion_error)?;
        let matrix = Matrix::from_values(request.matrix).map_err(map_matrix_error)?;
        replication
            .check_shape(&matrix)
            .map_err(map_expansion_error)?;

        let row_names = resolve_names(Axis::Row, request.row_names, matrix.row_count())?;
        let col_names = resolve_names(Axis::Column, request.col_names, matrix.col_count())?;
        let labels = ReportLabels {
            rows: replication
                .rows()
                .expand_labels(&row_names)
                .map_err(map_expansion_error)?,
            cols: replication
                .cols()
                .expand_labels(&col_names)
                .map_err(map_expansion_error)?,
            folded_rows: replication
                .rows()
                .fold_labels(&row_names)
                .map_err(map_expansion_error)?,
            folded_cols: replication
                .cols()
                .fold_labels(&col_names)
                .map_err(map_expansion_error)?,
        };

        let ranking = PriorityRanking;
        let priorities = ranking
            .resolve(
                ranking.derive(&matrix, kind),
                request.row_priorities,
                request.col_priorities,
            )
            .map_err(map_ranking_error)?;

        let input = PlanInput {
            matrix: &matrix,
            replication: &replication,
            priorities: &priorities,
            kind,
            mode,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let plan = match self.backend {
            RefinementBackend::DualTightening => {
                AssignmentPlanner::new(DualTighteningSolver).plan(input, &mut rng)
            }
            RefinementBackend::Milp => AssignmentPlanner::new(MilpTierSolver).plan(input, &mut rng),
        }
        .map_err(|err| {
            tracing::error!(error = %err, seed, "assignment planning failed");
            map_planning_error(err)
        })?;

        tracing::info!(
            size = replication.size(),
            total = plan.total,
            tiers = plan.commits.len(),
            seed,
            "assignment solved"
        );

        Ok(build_report(
            plan,
            replication,
            labels,
            priorities,
            kind,
            mode,
            self.backend,
            seed,
        ))
    }
}

fn resolve_names(
    axis: Axis,
    names: Option<Vec<String>>,
    len: usize,
) -> Result<Vec<String>, AssignmentError> {
    let prefix = match axis {
        Axis::Row => 'R',
        Axis::Column => 'C',
    };
    match names {
        None => Ok((1..=len).map(|idx| format!("{prefix}{idx}")).collect()),
        Some(names) if names.len() == len => Ok(names),
        Some(names) => Err(AssignmentError::MalformedInput(format!(
            "Expected {len} {axis} names, found {}",
            names.len()
        ))),
    }
}

fn build_report(
    plan: AssignmentPlan,
    replication: ReplicationPlan,
    labels: ReportLabels,
    priorities: AxisPriorities,
    kind: MatrixKind,
    mode: PriorityMode,
    backend: RefinementBackend,
    seed: u64,
) -> AssignmentReport {
    AssignmentReport {
        marker: plan.marker(),
        pairs: plan.folded.pairs(),
        expanded: plan.expanded,
        candidates: plan.candidates,
        assignments: plan.assignments,
        folded: plan.folded,
        total: plan.total,
        replication,
        labels,
        priorities,
        tiers: plan.commits,
        kind,
        mode,
        backend,
        seed,
    }
}
