//! Tier backend that states the refinement as a binary assignment model and
//! re-solves it once per tier, carrying every committed tier sum as an
//! explicit equality constraint.

use crate::{
    CellMask, CostGrid, SolveError,
    refinement::{Tier, TierSolution, TierSolver},
};
use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, Variable, microlp, variable, variables,
};

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct MilpTierSolver;

#[derive(Debug, Clone)]
pub struct MilpRegion {
    candidates: CellMask,
    commitments: Vec<(Tier, i64)>,
}

fn tier_expression(
    costs: &CostGrid,
    tier: &Tier,
    cells: &[(usize, usize)],
    x_vars: &[Variable],
) -> Expression {
    let mut expr = Expression::with_capacity(cells.len());
    for (&(row, col), &var) in cells.iter().zip(x_vars) {
        let weight = tier.weight(costs, row, col);
        if weight != 0 {
            expr.add_mul(weight as f64, var);
        }
    }
    expr
}

impl TierSolver for MilpTierSolver {
    type Region = MilpRegion;

    fn name(&self) -> &'static str {
        "milp"
    }

    fn open_region(&self, _costs: &CostGrid, candidates: &CellMask) -> MilpRegion {
        MilpRegion {
            candidates: candidates.clone(),
            commitments: Vec::new(),
        }
    }

    fn minimize(
        &self,
        costs: &CostGrid,
        region: &MilpRegion,
        tier: &Tier,
    ) -> Result<TierSolution, SolveError> {
        let n = costs.size();
        let cells: Vec<(usize, usize)> = region.candidates.cells().collect();

        let mut vars = variables!();
        let x_vars: Vec<Variable> = cells
            .iter()
            .map(|_| vars.add(variable().binary()))
            .collect();

        let objective = tier_expression(costs, tier, &cells, &x_vars);
        let mut problem = vars.minimise(objective).using(microlp);

        let mut row_cells: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut col_cells: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, &(row, col)) in cells.iter().enumerate() {
            row_cells[row].push(idx);
            col_cells[col].push(idx);
        }

        // All-different: every row and every column matched exactly once.
        for line in row_cells.iter().chain(&col_cells) {
            let mut expr = Expression::with_capacity(line.len());
            for &idx in line {
                expr.add_mul(1.0, x_vars[idx]);
            }
            problem = problem.with(expr.eq(1.0));
        }

        for (fixed, committed) in &region.commitments {
            let target = *committed as f64;
            let expr = tier_expression(costs, fixed, &cells, &x_vars);
            problem = problem
                .with(expr.clone().leq(target + EPS))
                .with(expr.geq(target - EPS));
        }

        let solution = problem.solve().map_err(|err| match err {
            ResolutionError::Infeasible => SolveError::Infeasible {
                stage: format!("{} tier {}", tier.axis(), tier.rank()),
            },
            other => SolveError::Backend(other.to_string()),
        })?;

        let mut assignment = vec![usize::MAX; n];
        for (&(row, col), &var) in cells.iter().zip(&x_vars) {
            let value = solution.value(var);
            if value > 0.5 {
                if assignment[row] != usize::MAX {
                    return Err(SolveError::NonBinarySolution);
                }
                assignment[row] = col;
            } else if value > EPS {
                return Err(SolveError::NonBinarySolution);
            }
        }
        if assignment.contains(&usize::MAX) {
            return Err(SolveError::NonBinarySolution);
        }

        Ok(TierSolution {
            sum: tier.sum(costs, &assignment),
            assignment,
            duals: None,
        })
    }

    fn commit(
        &self,
        _costs: &CostGrid,
        region: &mut MilpRegion,
        tier: &Tier,
        solution: &TierSolution,
    ) {
        region.commitments.push((tier.clone(), solution.sum));
    }
}
