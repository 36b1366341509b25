//! Lexicographic refinement over priority tiers.
//!
//! Starting from the cells of the baseline marker (every perfect matching
//! inside it is globally optimal), each tier in turn minimizes the cost
//! collected by its own rows or columns and then pins that sum for every
//! later tier.

use crate::{
    CellMask, CostGrid, SolveError,
    baseline::{matchable_cells, tight_cells},
    grid::Axis,
    hungarian::{self, Matching},
};
use fixedbitset::FixedBitSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityMode {
    RowFirst,
    ColumnFirst,
}

impl PriorityMode {
    /// `0` is row priority first, `1` column priority first.
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::RowFirst),
            1 => Some(Self::ColumnFirst),
            _ => None,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Self::RowFirst => 0,
            Self::ColumnFirst => 1,
        }
    }

    pub fn primary_axis(self) -> Axis {
        match self {
            Self::RowFirst => Axis::Row,
            Self::ColumnFirst => Axis::Column,
        }
    }
}

/// Rows or columns sharing one priority rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    axis: Axis,
    rank: u32,
    members: Vec<usize>,
    lookup: FixedBitSet,
}

impl Tier {
    pub fn new(axis: Axis, rank: u32, members: Vec<usize>, size: usize) -> Self {
        let mut lookup = FixedBitSet::with_capacity(size);
        for &member in &members {
            lookup.insert(member);
        }
        Self {
            axis,
            rank,
            members,
            lookup,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn contains(&self, index: usize) -> bool {
        self.lookup.contains(index)
    }

    #[inline]
    pub fn weight(&self, costs: &CostGrid, row: usize, col: usize) -> i64 {
        let index = match self.axis {
            Axis::Row => row,
            Axis::Column => col,
        };
        if self.lookup.contains(index) {
            costs.get(row, col)
        } else {
            0
        }
    }

    pub fn weights(&self, costs: &CostGrid) -> CostGrid {
        CostGrid::from_fn(costs.size(), |row, col| self.weight(costs, row, col))
    }

    pub fn sum(&self, costs: &CostGrid, assignment: &[usize]) -> i64 {
        assignment
            .iter()
            .enumerate()
            .map(|(row, &col)| self.weight(costs, row, col))
            .sum()
    }
}

/// Tiers in processing order: the primary axis by ascending rank, then the
/// other axis by ascending rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSchedule {
    tiers: Vec<Tier>,
}

impl TierSchedule {
    pub fn new(mode: PriorityMode, row_ranks: &[u32], col_ranks: &[u32]) -> Result<Self, SolveError> {
        let size = row_ranks.len();
        if col_ranks.len() != size {
            return Err(SolveError::RankLengthMismatch {
                axis: Axis::Column,
                expected: size,
                found: col_ranks.len(),
            });
        }

        let primary = mode.primary_axis();
        let ranks_for = |axis: Axis| match axis {
            Axis::Row => row_ranks,
            Axis::Column => col_ranks,
        };

        let mut tiers = axis_tiers(primary, ranks_for(primary), size);
        tiers.extend(axis_tiers(primary.other(), ranks_for(primary.other()), size));
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

fn axis_tiers(axis: Axis, ranks: &[u32], size: usize) -> Vec<Tier> {
    priority_groups(ranks)
        .into_iter()
        .map(|group| Tier::new(axis, group.rank, group.members, size))
        .collect()
}

/// Indices sharing one rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PriorityGroup {
    pub rank: u32,
    pub members: Vec<usize>,
}

/// Groups indices by rank, ascending. Every group has at least one member.
pub(crate) fn priority_groups(ranks: &[u32]) -> Vec<PriorityGroup> {
    let mut order: Vec<usize> = (0..ranks.len()).collect();
    order.sort_by_key(|&index| (ranks[index], index));

    let mut groups: Vec<PriorityGroup> = Vec::new();
    for index in order {
        match groups.last_mut() {
            Some(group) if group.rank == ranks[index] => group.members.push(index),
            _ => groups.push(PriorityGroup {
                rank: ranks[index],
                members: vec![index],
            }),
        }
    }
    groups
}

/// Optimal dual of a tier solve, when the backend produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duals {
    pub rows: Vec<i64>,
    pub cols: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSolution {
    pub assignment: Vec<usize>,
    pub sum: i64,
    pub duals: Option<Duals>,
}

/// Backend solving one tier over an accumulated feasible region.
pub trait TierSolver {
    /// Feasible region: the baseline candidates plus every committed tier sum.
    type Region;

    fn name(&self) -> &'static str;

    fn open_region(&self, costs: &CostGrid, candidates: &CellMask) -> Self::Region;

    /// Minimum of `tier`'s cost sum over all perfect matchings in `region`.
    fn minimize(
        &self,
        costs: &CostGrid,
        region: &Self::Region,
        tier: &Tier,
    ) -> Result<TierSolution, SolveError>;

    /// Adds the equality constraint fixing `tier`'s sum to `solution.sum`.
    fn commit(
        &self,
        costs: &CostGrid,
        region: &mut Self::Region,
        tier: &Tier,
        solution: &TierSolution,
    );
}

/// Hungarian backend. A perfect matching inside the region attains the tier
/// minimum exactly when all of its cells are tight under an optimal dual, so
/// committing a tier shrinks the region to those tight cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualTighteningSolver;

impl TierSolver for DualTighteningSolver {
    type Region = CellMask;

    fn name(&self) -> &'static str {
        "dual-tightening"
    }

    fn open_region(&self, _costs: &CostGrid, candidates: &CellMask) -> CellMask {
        candidates.clone()
    }

    fn minimize(
        &self,
        costs: &CostGrid,
        region: &CellMask,
        tier: &Tier,
    ) -> Result<TierSolution, SolveError> {
        let weights = tier.weights(costs);
        let matching = hungarian::solve(&weights, Some(region)).map_err(|err| match err {
            SolveError::Infeasible { stage } => SolveError::Infeasible {
                stage: format!("{} tier {} ({stage})", tier.axis(), tier.rank()),
            },
            other => other,
        })?;
        Ok(TierSolution {
            sum: matching.total,
            assignment: matching.assignment,
            duals: Some(Duals {
                rows: matching.row_potential,
                cols: matching.col_potential,
            }),
        })
    }

    fn commit(
        &self,
        costs: &CostGrid,
        region: &mut CellMask,
        tier: &Tier,
        solution: &TierSolution,
    ) {
        let Some(duals) = &solution.duals else {
            tracing::warn!(
                tier = tier.rank(),
                "tier solution carries no duals; region left unchanged"
            );
            return;
        };
        let matching = Matching {
            assignment: solution.assignment.clone(),
            total: solution.sum,
            row_potential: duals.rows.clone(),
            col_potential: duals.cols.clone(),
        };
        let tight = tight_cells(&tier.weights(costs), &matching, Some(region));
        *region = matchable_cells(&tight, &solution.assignment);
    }
}

/// Sum fixed for one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCommit {
    pub axis: Axis,
    pub rank: u32,
    pub members: Vec<usize>,
    pub committed: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refinement {
    pub assignment: Vec<usize>,
    pub commits: Vec<TierCommit>,
}

pub struct LexicographicRefiner<S> {
    solver: S,
}

impl<S: TierSolver> LexicographicRefiner<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn refine(
        &self,
        costs: &CostGrid,
        candidates: &CellMask,
        schedule: &TierSchedule,
    ) -> Result<Refinement, SolveError> {
        let mut region = self.solver.open_region(costs, candidates);
        let mut commits = Vec::with_capacity(schedule.len());
        let mut last = None;

        for tier in schedule.tiers() {
            let solution = self.solver.minimize(costs, &region, tier)?;
            tracing::debug!(
                backend = self.solver.name(),
                axis = %tier.axis(),
                rank = tier.rank(),
                members = tier.members().len(),
                committed = solution.sum,
                "tier committed"
            );
            self.solver.commit(costs, &mut region, tier, &solution);
            commits.push(TierCommit {
                axis: tier.axis(),
                rank: tier.rank(),
                members: tier.members().to_vec(),
                committed: solution.sum,
            });
            last = Some(solution);
        }

        // Only an empty problem has no tiers.
        let assignment = last.map_or_else(Vec::new, |solution| solution.assignment);

        Ok(Refinement {
            assignment,
            commits,
        })
    }
}
