//! Uniform-coefficient physics

use crate::error::Result;
use crate::field::MultiFab;

use super::hierarchy::LevelLayouts;
use super::physics::AbecPhysics;

/// `alpha*a0*phi - beta*b0*laplacian(phi)` on every level
///
/// Coefficient storage is filled once at define and never goes stale.
#[derive(Debug, Clone)]
pub struct ConstantCoefficients<const D: usize> {
    alpha: f64,
    beta: f64,
    a0: f64,
    b0: f64,
    a: Vec<Vec<MultiFab<D>>>,
    b: Vec<Vec<[MultiFab<D>; D]>>,
}

impl<const D: usize> ConstantCoefficients<D> {
    pub fn new(alpha: f64, beta: f64, a0: f64, b0: f64) -> Self {
        Self {
            alpha,
            beta,
            a0,
            b0,
            a: Vec::new(),
            b: Vec::new(),
        }
    }

    /// Pure Poisson operator `-laplacian(phi)`
    pub fn poisson() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0)
    }
}

impl<const D: usize> AbecPhysics<D> for ConstantCoefficients<D> {
    fn a_scalar(&self) -> f64 {
        self.alpha
    }

    fn b_scalar(&self) -> f64 {
        self.beta
    }

    fn a_coeffs(&self, amrlev: usize, mglev: usize) -> &MultiFab<D> {
        &self.a[amrlev][mglev]
    }

    fn b_coeffs(&self, amrlev: usize, mglev: usize) -> [&MultiFab<D>; D] {
        let level = &self.b[amrlev][mglev];
        std::array::from_fn(|d| &level[d])
    }

    fn define(&mut self, layouts: &LevelLayouts<D>) -> Result<()> {
        let nlevels = layouts.num_amr_levels();
        self.a = (0..nlevels)
            .map(|amrlev| {
                layouts
                    .stack(amrlev)
                    .iter()
                    .map(|layout| {
                        let mut a = MultiFab::new_cell(&layout.grids, 1, 0);
                        a.set_val(self.a0);
                        a
                    })
                    .collect()
            })
            .collect();
        self.b = (0..nlevels)
            .map(|amrlev| {
                layouts
                    .stack(amrlev)
                    .iter()
                    .map(|layout| {
                        std::array::from_fn(|d| {
                            let mut bd = MultiFab::new_face(&layout.grids, d, 1, 0);
                            bd.set_val(self.b0);
                            bd
                        })
                    })
                    .collect()
            })
            .collect();
        Ok(())
    }
}
