//! Variable-coefficient physics
//!
//! Users set `a` and `b` on the finest multigrid level of each AMR level.
//! `update` restricts them onto every coarser multigrid level and onto the
//! part of each coarser AMR level covered by finer boxes, finest first.

use crate::error::{MlmgError, Result};
use crate::field::MultiFab;

use super::average::{average_down_cells, average_down_faces};
use super::hierarchy::LevelLayouts;
use super::physics::AbecPhysics;

/// Coefficients of one (AMR, multigrid) level
#[derive(Debug, Clone)]
struct LevelCoeffs<const D: usize> {
    a: MultiFab<D>,
    b: [MultiFab<D>; D],
}

/// `alpha*a*phi - beta*div(b*grad(phi))` with user-supplied `a` and `b`
///
/// Defaults: `alpha = 0`, `beta = 1`, `a = 0`, `b = 1`.
#[derive(Debug, Clone)]
pub struct AbecLaplacian<const D: usize> {
    alpha: f64,
    beta: f64,
    /// `[amrlev][mglev]`
    coeffs: Vec<Vec<LevelCoeffs<D>>>,
    needs_update: bool,
}

impl<const D: usize> Default for AbecLaplacian<D> {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            beta: 1.0,
            coeffs: Vec::new(),
            needs_update: false,
        }
    }
}

impl<const D: usize> AbecLaplacian<D> {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            ..Self::default()
        }
    }

    pub fn set_scalars(&mut self, alpha: f64, beta: f64) {
        self.alpha = alpha;
        self.beta = beta;
        self.needs_update = true;
    }

    fn finest(&mut self, amrlev: usize) -> Result<&mut LevelCoeffs<D>> {
        if self.coeffs.is_empty() {
            return Err(MlmgError::Unconfigured);
        }
        self.coeffs
            .get_mut(amrlev)
            .and_then(|stack| stack.first_mut())
            .ok_or(MlmgError::LevelOutOfRange { amrlev, mglev: 0 })
    }

    /// Copy component 0 of `a` on the valid region of AMR level `amrlev`
    pub fn set_a_coeffs(&mut self, amrlev: usize, a: &MultiFab<D>) -> Result<()> {
        let level = self.finest(amrlev)?;
        if a.grids() != level.a.grids() || a.nodal().is_some() {
            return Err(MlmgError::LayoutMismatch { amrlev, mglev: 0 });
        }
        copy_valid(a, &mut level.a);
        self.needs_update = true;
        Ok(())
    }

    /// Copy component 0 of the face fields `b` on AMR level `amrlev`
    pub fn set_b_coeffs(&mut self, amrlev: usize, b: [&MultiFab<D>; D]) -> Result<()> {
        let level = self.finest(amrlev)?;
        for (d, bd) in b.iter().enumerate() {
            if bd.grids() != level.b[d].grids() || bd.nodal() != Some(d) {
                return Err(MlmgError::LayoutMismatch { amrlev, mglev: 0 });
            }
        }
        for (d, bd) in b.iter().enumerate() {
            copy_valid(bd, &mut level.b[d]);
        }
        self.needs_update = true;
        Ok(())
    }

    /// Uniform `a` on AMR level `amrlev`
    pub fn set_a_scalar_field(&mut self, amrlev: usize, value: f64) -> Result<()> {
        self.finest(amrlev)?.a.set_val(value);
        self.needs_update = true;
        Ok(())
    }

    /// Uniform `b` in every direction on AMR level `amrlev`
    pub fn set_b_scalar_field(&mut self, amrlev: usize, value: f64) -> Result<()> {
        for bd in self.finest(amrlev)?.b.iter_mut() {
            bd.set_val(value);
        }
        self.needs_update = true;
        Ok(())
    }
}

fn copy_valid<const D: usize>(src: &MultiFab<D>, dst: &mut MultiFab<D>) {
    for i in 0..dst.len() {
        let valid = dst.valid_box(i);
        dst.fab_mut(i).copy_region(src.fab(i), &valid);
    }
}

impl<const D: usize> AbecPhysics<D> for AbecLaplacian<D> {
    fn a_scalar(&self) -> f64 {
        self.alpha
    }

    fn b_scalar(&self) -> f64 {
        self.beta
    }

    fn a_coeffs(&self, amrlev: usize, mglev: usize) -> &MultiFab<D> {
        &self.coeffs[amrlev][mglev].a
    }

    fn b_coeffs(&self, amrlev: usize, mglev: usize) -> [&MultiFab<D>; D] {
        let level = &self.coeffs[amrlev][mglev];
        std::array::from_fn(|d| &level.b[d])
    }

    fn define(&mut self, layouts: &LevelLayouts<D>) -> Result<()> {
        self.coeffs = (0..layouts.num_amr_levels())
            .map(|amrlev| {
                layouts
                    .stack(amrlev)
                    .iter()
                    .map(|layout| {
                        let a = MultiFab::new_cell(&layout.grids, 1, 0);
                        let b = std::array::from_fn(|d| {
                            let mut bd = MultiFab::new_face(&layout.grids, d, 1, 0);
                            bd.set_val(1.0);
                            bd
                        });
                        LevelCoeffs { a, b }
                    })
                    .collect()
            })
            .collect();
        self.needs_update = false;
        Ok(())
    }

    fn needs_update(&self) -> bool {
        self.needs_update
    }

    fn update(&mut self, layouts: &LevelLayouts<D>) -> Result<()> {
        let nlevels = self.coeffs.len();
        for amrlev in (0..nlevels).rev() {
            if amrlev + 1 < nlevels {
                let (crse, fine) = self.coeffs.split_at_mut(amrlev + 1);
                // a fine stack always ends one factor of 2 above the next AMR level
                if let (Some(src), Some(dst)) = (fine[0].last(), crse[amrlev].first_mut()) {
                    average_down_cells(&src.a, &mut dst.a, 2);
                    for d in 0..D {
                        average_down_faces(&src.b[d], &mut dst.b[d], d, 2);
                    }
                }
            }

            let stack = &mut self.coeffs[amrlev];
            for mglev in 1..stack.len() {
                let (upper, lower) = stack.split_at_mut(mglev);
                let src = &upper[mglev - 1];
                let dst = &mut lower[0];
                average_down_cells(&src.a, &mut dst.a, 2);
                for d in 0..D {
                    average_down_faces(&src.b[d], &mut dst.b[d], d, 2);
                }
            }
        }
        log::debug!(
            "averaged coefficients down {} AMR levels ({} multigrid levels on level 0)",
            nlevels,
            layouts.num_mg_levels(0)
        );
        self.needs_update = false;
        Ok(())
    }
}
