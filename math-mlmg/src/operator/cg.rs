//! Matrix-free conjugate gradient backend
//!
//! Solves the correction equation `L0 e = rhs - L(sol)` where `L0` is the
//! operator with homogeneous boundary ghosts, then adds `e` to `sol`. Ghost
//! values the caller stored in `sol` act as the inhomogeneous boundary part
//! and are left as they are.
//!
//! Only single-box, non-periodic levels are supported: search directions
//! need their ghost cells filled, and there is no ghost exchange here.

use ndarray::Array1;

use crate::error::{MlmgError, Result};
use crate::field::MultiFab;

use super::backend::{BackendSolution, LevelOperator, SolverBackend};
use super::cell_abec::OperatorState;

/// CG backend configuration
#[derive(Debug, Clone)]
pub struct CgConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for CgConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            print_interval: 0,
        }
    }
}

/// Conjugate gradient on one AMR level
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradientBackend {
    config: CgConfig,
}

impl ConjugateGradientBackend {
    pub const NAME: &'static str = "cg";

    pub fn new(config: CgConfig) -> Self {
        Self { config }
    }

    fn check_layout<const D: usize>(op: &dyn LevelOperator<D>, amrlev: usize) -> Result<()> {
        if op.state() != OperatorState::Prepared {
            return Err(MlmgError::NotPrepared);
        }
        let layout = op.level_layout(amrlev)?;
        if layout.grids.len() != 1 {
            return Err(MlmgError::UnsupportedLayout {
                backend: Self::NAME.into(),
                reason: format!("{} boxes, single box required", layout.grids.len()),
            });
        }
        if let Some(dir) = (0..D).find(|&d| layout.geom.is_periodic(d)) {
            return Err(MlmgError::UnsupportedLayout {
                backend: Self::NAME.into(),
                reason: format!("direction {dir} is periodic"),
            });
        }
        Ok(())
    }
}

/// Homogeneous operator applied to a vector of valid values
fn apply_homogeneous<const D: usize>(
    op: &dyn LevelOperator<D>,
    amrlev: usize,
    scratch: &mut MultiFab<D>,
    out: &mut MultiFab<D>,
    x: &Array1<f64>,
) -> Result<Array1<f64>> {
    scratch.set_val(0.0);
    scratch.assign_from_array1(x);
    op.fill_coupled_ghosts(amrlev, scratch)?;
    op.apply(amrlev, out, scratch)?;
    Ok(out.to_array1())
}

impl<const D: usize> SolverBackend<D> for ConjugateGradientBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn solve(
        &mut self,
        op: &dyn LevelOperator<D>,
        amrlev: usize,
        sol: &mut MultiFab<D>,
        rhs: &MultiFab<D>,
        tol: f64,
    ) -> Result<BackendSolution> {
        Self::check_layout(op, amrlev)?;

        let mut scratch = op.make_level_field(amrlev)?;
        let mut out = op.make_level_field(amrlev)?;

        // r = rhs - L(sol) with the caller's ghosts
        op.apply(amrlev, &mut out, sol)?;
        let mut r = rhs.to_array1() - out.to_array1();
        let r0_norm = r.dot(&r).sqrt();
        let mut e = Array1::<f64>::zeros(r.len());

        if r0_norm < 1e-300 {
            return Ok(BackendSolution {
                iterations: 0,
                residual: 0.0,
                converged: true,
            });
        }

        let mut p = r.clone();
        let mut rho = r.dot(&r);
        let mut iterations = self.config.max_iterations;
        let mut rel_residual = 1.0;
        let mut converged = false;

        for iter in 0..self.config.max_iterations {
            let q = apply_homogeneous(op, amrlev, &mut scratch, &mut out, &p)?;
            let pq = p.dot(&q);
            if pq.abs() < 1e-300 {
                iterations = iter;
                break;
            }
            let alpha = rho / pq;
            e.scaled_add(alpha, &p);
            r.scaled_add(-alpha, &q);

            let rho_new = r.dot(&r);
            rel_residual = rho_new.sqrt() / r0_norm;

            if self.config.print_interval > 0 && (iter + 1) % self.config.print_interval == 0 {
                log::info!(
                    "CG iteration {}: relative residual = {:.6e}",
                    iter + 1,
                    rel_residual
                );
            }

            if rel_residual < tol {
                iterations = iter + 1;
                converged = true;
                break;
            }

            let beta = rho_new / rho;
            rho = rho_new;
            p = &r + &(beta * &p);
        }

        let mut updated = sol.to_array1();
        updated += &e;
        sol.assign_from_array1(&updated);

        log::debug!(
            "CG on AMR level {}: {} iterations, relative residual {:.3e}",
            amrlev,
            iterations,
            rel_residual
        );
        Ok(BackendSolution {
            iterations,
            residual: rel_residual,
            converged,
        })
    }
}
