use crate::constraints::{LpProgram, Sense};
use crate::error::{PriceError, Result};
use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use faer::sparse::{SparseColMat, Triplet};
use std::time::Duration;

/// Terminal status reported by the LP adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Timeout,
}

/// A successful solve: the bound and the full subset valuation, in
/// universe order.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: LpStatus,
    pub bound: f64,
    pub f_values: Vec<f64>,
}

/// Submit the program to Clarabel and map its terminal status.
///
/// Failures stay typed: infeasibility, unboundedness, and timeouts come
/// back as distinct errors instead of being coerced into a number.
pub fn solve(program: &LpProgram, time_limit: Option<Duration>) -> Result<LpSolution> {
    let n_cols = program.n_columns();

    // Clarabel stacks cones in declaration order, so equality rows
    // (ZeroCone) are emitted before inequality rows (NonnegativeCone).
    let mut triplets: Vec<Triplet<usize, usize, f64>> = Vec::new();
    let mut b = Vec::with_capacity(program.rows.len());
    let mut row = 0usize;
    let mut n_eq = 0usize;
    for pass in [Sense::Eq, Sense::Le] {
        for constraint in program.rows.iter().filter(|r| r.sense == pass) {
            for &(col, coef) in &constraint.terms {
                triplets.push(Triplet::new(row, col, coef));
            }
            b.push(constraint.rhs);
            row += 1;
        }
        if pass == Sense::Eq {
            n_eq = row;
        }
    }
    let n_rows = row;
    let n_ineq = n_rows - n_eq;

    let a_sparse = SparseColMat::try_new_from_triplets(n_rows, n_cols, &triplets)
        .map_err(|e| PriceError::LpSolver(format!("failed to assemble constraint matrix: {e:?}")))?;
    let (symbolic, values) = a_sparse.as_ref().parts();
    let a = CscMatrix::new(
        n_rows,
        n_cols,
        symbolic.col_ptr().to_vec(),
        symbolic.row_idx().to_vec(),
        values.to_vec(),
    );

    // No quadratic term; the objective is the z column alone.
    let p = CscMatrix::new(n_cols, n_cols, vec![0; n_cols + 1], vec![], vec![]);
    let mut q = vec![0.0; n_cols];
    q[program.z_column()] = 1.0;

    let mut cones = Vec::new();
    if n_eq > 0 {
        cones.push(SupportedConeT::ZeroConeT(n_eq));
    }
    if n_ineq > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(n_ineq));
    }

    let mut settings = DefaultSettingsBuilder::default();
    settings
        .verbose(false)
        .max_iter(10_000)
        .tol_gap_abs(1e-8)
        .tol_gap_rel(1e-8)
        .tol_feas(1e-8);
    if let Some(limit) = time_limit {
        settings.time_limit(limit.as_secs_f64());
    }
    let settings = settings
        .build()
        .map_err(|e| PriceError::LpSolver(format!("invalid solver settings: {e}")))?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
        .map_err(|e| PriceError::LpSolver(format!("failed to create solver: {e}")))?;
    solver.solve();

    match solver.solution.status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => Ok(LpSolution {
            status: LpStatus::Optimal,
            bound: solver.solution.x[program.z_column()],
            f_values: solver.solution.x[..program.n_subsets].to_vec(),
        }),
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            Err(PriceError::InfeasibleLp)
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            Err(PriceError::UnboundedLp)
        }
        SolverStatus::MaxTime => Err(PriceError::SolverTimeout),
        SolverStatus::MaxIterations => {
            Err(PriceError::LpSolver("maximum iterations reached".to_string()))
        }
        SolverStatus::NumericalError => {
            Err(PriceError::LpSolver("numerical error in solver".to_string()))
        }
        SolverStatus::InsufficientProgress => Err(PriceError::LpSolver(
            "solver made insufficient progress".to_string(),
        )),
        status => Err(PriceError::LpSolver(format!(
            "unexpected solver status: {status:?}"
        ))),
    }
}
