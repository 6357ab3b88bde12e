//! Cell-centered ABec operator over an AMR/multigrid hierarchy
//!
//! [`CellAbecLap`] owns the level layouts, the boundary couplings of every
//! box and the lifecycle state. Coefficients come from a physics strategy
//! implementing [`AbecPhysics`]. Level operations dispatch the box kernels
//! over all boxes of a level, in parallel with the `rayon` feature.
//!
//! Ghost cells of solution fields are never filled here. Before `apply`,
//! `residual` or a smoothing color, the caller fills them: from neighboring
//! boxes, from the coarser level and from the boundary conditions.
//! [`CellAbecLap::fill_coupled_ghosts`] provides the homogeneous part.
//!
//! # Example
//!
//! ```ignore
//! use math_mlmg::*;
//!
//! let domain = IndexBox::from_size([64, 64]);
//! let geom = LevelGeometry::from_lengths(domain, [1.0, 1.0], [false; 2]);
//! let grids = BoxArray::chopped(domain, 32);
//! let dmap = DistributionMapping::round_robin(grids.len(), 1);
//!
//! let mut op = CellAbecLap::new(
//!     ConstantCoefficients::new(1.0, 1.0, 1.0, 1.0),
//!     DomainBcs::uniform(LinOpBc::Dirichlet),
//! );
//! op.define(&[geom], &[grids], &[dmap], LpInfo::default(), BackendRegistry::new())?;
//! op.prepare_for_solve()?;
//!
//! let mut sol = op.make_multifab(0, 0)?;
//! let rhs = op.make_multifab(0, 0)?;
//! op.smooth(0, 0, &mut sol, &rhs, 2)?;
//! ```

use crate::boundary::{BoundaryCoupling, DomainBcs};
use crate::error::{MlmgError, Result};
use crate::field::{Array4, Array4Mut, MultiFab};
use crate::geometry::{BoxArray, DistributionMapping, IndexBox, LevelGeometry, Orientation, shift};
use crate::kernels::{
    abec_adotx, abec_face_flux, abec_face_flux_box_faces, abec_gsrb, abec_normalize,
};
use crate::parallel::{for_each_box, parallel_map_indexed, try_for_each_box};

use super::backend::{BackendRegistry, LevelOperator, SolverBackend};
use super::hierarchy::{LevelLayout, LevelLayouts};
use super::info::LpInfo;
use super::physics::AbecPhysics;

/// Ghost width read by the stencil
const STENCIL_GHOSTS: usize = 1;

/// Lifecycle of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorState {
    /// `define` has not succeeded yet
    Unconfigured,
    /// Layouts exist; `prepare_for_solve` has not run
    Defined,
    /// Couplings and coefficients are current
    Prepared,
    /// Prepared once, but coefficients changed since
    Stale,
}

/// Where fluxes are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Center of each face
    FaceCenter,
    /// Identical to the face center on regular geometry
    FaceCentroid,
    /// Cell centers; needs embedded boundaries, returns `EmbeddedBoundaryRequired`
    CellCenter,
    /// Cell centroids; needs embedded boundaries, returns `EmbeddedBoundaryRequired`
    CellCentroid,
}

/// Cell-centered `alpha*a*phi - beta*div(b*grad(phi))` operator
pub struct CellAbecLap<const D: usize, P: AbecPhysics<D>> {
    physics: P,
    bcs: DomainBcs<D>,
    info: LpInfo,
    layouts: Option<LevelLayouts<D>>,
    /// `[amrlev][mglev][box]`
    couplings: Vec<Vec<Vec<BoundaryCoupling<D>>>>,
    geometry_stale: bool,
    prepared: bool,
    backends: BackendRegistry<D>,
}

impl<const D: usize, P: AbecPhysics<D>> CellAbecLap<D, P> {
    /// Unconfigured operator over `physics` with domain conditions `bcs`
    pub fn new(physics: P, bcs: DomainBcs<D>) -> Self {
        Self {
            physics,
            bcs,
            info: LpInfo::default(),
            layouts: None,
            couplings: Vec::new(),
            geometry_stale: false,
            prepared: false,
            backends: BackendRegistry::new(),
        }
    }

    /// Validate the AMR levels, build the multigrid hierarchy and allocate
    /// coefficient storage
    ///
    /// On error the operator keeps its previous definition (Unconfigured
    /// for a fresh operator).
    pub fn define(
        &mut self,
        geoms: &[LevelGeometry<D>],
        grids: &[BoxArray<D>],
        dmaps: &[DistributionMapping],
        info: LpInfo,
        backends: BackendRegistry<D>,
    ) -> Result<()> {
        let layouts = LevelLayouts::build(geoms, grids, dmaps, &info)?;
        for geom in geoms {
            for dir in 0..D {
                let periodic = geom.is_periodic(dir);
                if self.bcs.lo[dir].is_periodic() != periodic
                    || self.bcs.hi[dir].is_periodic() != periodic
                {
                    return Err(MlmgError::PeriodicityMismatch { dir });
                }
            }
        }
        self.physics.define(&layouts)?;

        log::debug!(
            "defined operator: {} AMR levels, {} multigrid levels on level 0, {} backends",
            layouts.num_amr_levels(),
            layouts.num_mg_levels(0),
            backends.len()
        );
        self.info = info;
        self.layouts = Some(layouts);
        self.couplings.clear();
        self.backends = backends;
        self.geometry_stale = true;
        self.prepared = false;
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> OperatorState {
        match (&self.layouts, self.prepared) {
            (None, _) => OperatorState::Unconfigured,
            (Some(_), false) => OperatorState::Defined,
            (Some(_), true) if self.needs_update() => OperatorState::Stale,
            (Some(_), true) => OperatorState::Prepared,
        }
    }

    /// Geometry changed since the last update, or the physics has stale
    /// coefficients
    pub fn needs_update(&self) -> bool {
        self.layouts.is_some() && (self.geometry_stale || self.physics.needs_update())
    }

    /// Rebuild boundary couplings and derived coefficients when stale
    pub fn update(&mut self) -> Result<()> {
        let layouts = self.layouts.as_ref().ok_or(MlmgError::Unconfigured)?;
        if self.geometry_stale {
            let bcs = self.bcs;
            self.couplings = (0..layouts.num_amr_levels())
                .map(|amrlev| {
                    layouts
                        .stack(amrlev)
                        .iter()
                        .map(|layout| {
                            parallel_map_indexed(layout.grids.len(), |i| {
                                BoundaryCoupling::build(&layout.grids, i, &layout.geom, &bcs)
                            })
                        })
                        .collect()
                })
                .collect();
            log::debug!("rebuilt boundary couplings on {} AMR levels", layouts.num_amr_levels());
            self.geometry_stale = false;
        }
        if self.physics.needs_update() {
            self.physics.update(layouts)?;
        }
        Ok(())
    }

    /// Bring couplings and coefficients up to date and enable level
    /// operations
    pub fn prepare_for_solve(&mut self) -> Result<()> {
        self.update()?;
        self.prepared = true;
        Ok(())
    }

    /// Coefficient provider
    pub fn physics(&self) -> &P {
        &self.physics
    }

    /// Mutable physics access; coefficient changes turn a prepared operator
    /// stale until the next `prepare_for_solve`
    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    /// Domain boundary conditions
    pub fn bcs(&self) -> &DomainBcs<D> {
        &self.bcs
    }

    /// Options given to the last successful `define`
    pub fn info(&self) -> &LpInfo {
        &self.info
    }

    /// Level hierarchy, `None` before `define`
    pub fn layouts(&self) -> Option<&LevelLayouts<D>> {
        self.layouts.as_ref()
    }

    /// Number of AMR levels (0 before `define`)
    pub fn num_amr_levels(&self) -> usize {
        self.layouts.as_ref().map_or(0, LevelLayouts::num_amr_levels)
    }

    /// Number of multigrid levels of AMR level `amrlev`
    pub fn num_mg_levels(&self, amrlev: usize) -> usize {
        self.layouts.as_ref().map_or(0, |l| l.num_mg_levels(amrlev))
    }

    /// Layout of a level; needs only a definition
    pub fn layout(&self, amrlev: usize, mglev: usize) -> Result<&LevelLayout<D>> {
        self.layouts
            .as_ref()
            .ok_or(MlmgError::Unconfigured)?
            .level(amrlev, mglev)
    }

    /// Boundary couplings of every box of a level (built by `update`)
    pub fn couplings(&self, amrlev: usize, mglev: usize) -> Result<&[BoundaryCoupling<D>]> {
        self.layout(amrlev, mglev)?;
        self.couplings
            .get(amrlev)
            .and_then(|stack| stack.get(mglev))
            .map(Vec::as_slice)
            .ok_or(MlmgError::NotPrepared)
    }

    /// Whether the level-0 problem has a null space: no `a` term and no
    /// boundary that pins the solution
    pub fn is_singular(&self, amrlev: usize) -> bool {
        if amrlev != 0 || self.layouts.is_none() {
            return false;
        }
        let pinned = Orientation::all::<D>().any(|ori| {
            self.bcs.get(ori).coupling().is_some_and(|c| c < 0.0)
        });
        let no_mass =
            self.physics.a_scalar() == 0.0 || self.physics.a_coeffs(0, 0).max_abs(0) == 0.0;
        !pinned && no_mass
    }

    /// Cell field on a level with the operator's component and ghost counts
    pub fn make_multifab(&self, amrlev: usize, mglev: usize) -> Result<MultiFab<D>> {
        let layout = self.layout(amrlev, mglev)?;
        Ok(MultiFab::new_cell(&layout.grids, self.info.ncomp, self.info.ngrow))
    }

    /// Face fields on a level, one per direction, without ghost cells
    pub fn make_face_multifabs(&self, amrlev: usize, mglev: usize) -> Result<[MultiFab<D>; D]> {
        let layout = self.layout(amrlev, mglev)?;
        Ok(std::array::from_fn(|d| {
            MultiFab::new_face(&layout.grids, d, self.info.ncomp, 0)
        }))
    }

    /// Instantiate an alternate backend by name; `Ok(None)` when none is
    /// registered under it
    pub fn make_backend(&self, name: &str) -> Result<Option<Box<dyn SolverBackend<D>>>> {
        if self.layouts.is_none() {
            return Err(MlmgError::Unconfigured);
        }
        Ok(self.backends.make(name))
    }

    /// Level layout for a level operation: the operator must be prepared
    fn prepared_level(&self, amrlev: usize, mglev: usize) -> Result<&LevelLayout<D>> {
        match self.state() {
            OperatorState::Unconfigured => Err(MlmgError::Unconfigured),
            OperatorState::Defined | OperatorState::Stale => Err(MlmgError::NotPrepared),
            OperatorState::Prepared => self.layout(amrlev, mglev),
        }
    }

    fn check_field(
        &self,
        field: &MultiFab<D>,
        layout: &LevelLayout<D>,
        amrlev: usize,
        mglev: usize,
        ghosts: usize,
    ) -> Result<()> {
        if field.grids() != &layout.grids
            || field.ncomp() != self.info.ncomp
            || field.nodal().is_some()
        {
            return Err(MlmgError::LayoutMismatch { amrlev, mglev });
        }
        if field.ngrow() < ghosts {
            return Err(MlmgError::InsufficientGhostCells {
                ngrow: field.ngrow(),
                required: ghosts,
            });
        }
        Ok(())
    }

    /// `out = L(input)` on the valid cells of a level
    pub fn apply(
        &self,
        amrlev: usize,
        mglev: usize,
        out: &mut MultiFab<D>,
        input: &MultiFab<D>,
    ) -> Result<()> {
        let layout = self.prepared_level(amrlev, mglev)?;
        self.check_field(input, layout, amrlev, mglev, STENCIL_GHOSTS)?;
        self.check_field(out, layout, amrlev, mglev, 0)?;

        let alpha = self.physics.a_scalar();
        let beta = self.physics.b_scalar();
        let dxinv = layout.geom.inv_dx();
        let a = self.physics.a_coeffs(amrlev, mglev);
        let b = self.physics.b_coeffs(amrlev, mglev);

        for_each_box(out.fabs_mut(), |i, fab| {
            let bx = layout.grids.get(i);
            let bv: [Array4<'_, f64, D>; D] = std::array::from_fn(|d| b[d].fab(i).view());
            abec_adotx(
                &bx,
                &mut fab.view_mut(),
                &input.fab(i).view(),
                &a.fab(i).view(),
                &bv,
                dxinv,
                alpha,
                beta,
            );
        });
        Ok(())
    }

    /// Divide `x` by the operator diagonal
    pub fn normalize(&self, amrlev: usize, mglev: usize, x: &mut MultiFab<D>) -> Result<()> {
        let layout = self.prepared_level(amrlev, mglev)?;
        self.check_field(x, layout, amrlev, mglev, 0)?;

        let alpha = self.physics.a_scalar();
        let beta = self.physics.b_scalar();
        let dxinv = layout.geom.inv_dx();
        let a = self.physics.a_coeffs(amrlev, mglev);
        let b = self.physics.b_coeffs(amrlev, mglev);

        for_each_box(x.fabs_mut(), |i, fab| {
            let bx = layout.grids.get(i);
            let bv: [Array4<'_, f64, D>; D] = std::array::from_fn(|d| b[d].fab(i).view());
            abec_normalize(&bx, &mut fab.view_mut(), &a.fab(i).view(), &bv, dxinv, alpha, beta);
        });
        Ok(())
    }

    /// One color of red-black Gauss-Seidel on every box of a level
    pub fn smooth_color(
        &self,
        amrlev: usize,
        mglev: usize,
        sol: &mut MultiFab<D>,
        rhs: &MultiFab<D>,
        redblack: i32,
    ) -> Result<()> {
        let layout = self.prepared_level(amrlev, mglev)?;
        self.check_field(sol, layout, amrlev, mglev, STENCIL_GHOSTS)?;
        self.check_field(rhs, layout, amrlev, mglev, 0)?;
        let couplings = self.couplings(amrlev, mglev)?;

        let alpha = self.physics.a_scalar();
        let beta = self.physics.b_scalar();
        let dxinv = layout.geom.inv_dx();
        let dh: [f64; D] = std::array::from_fn(|d| beta * dxinv[d] * dxinv[d]);
        let a = self.physics.a_coeffs(amrlev, mglev);
        let b = self.physics.b_coeffs(amrlev, mglev);
        let ncomp = self.info.ncomp;

        for_each_box(sol.fabs_mut(), |i, fab| {
            let valid = layout.grids.get(i);
            let bv: [Array4<'_, f64, D>; D] = std::array::from_fn(|d| b[d].fab(i).view());
            abec_gsrb(
                &valid,
                &mut fab.view_mut(),
                &rhs.fab(i).view(),
                alpha,
                dh,
                &a.fab(i).view(),
                &bv,
                &couplings[i].views(),
                &valid,
                ncomp,
                redblack,
            );
        });
        Ok(())
    }

    /// `nsweeps` full red-black sweeps
    ///
    /// Ghost cells are not refreshed between colors; callers needing that
    /// run [`CellAbecLap::smooth_color`] themselves.
    pub fn smooth(
        &self,
        amrlev: usize,
        mglev: usize,
        sol: &mut MultiFab<D>,
        rhs: &MultiFab<D>,
        nsweeps: usize,
    ) -> Result<()> {
        for _ in 0..nsweeps {
            self.smooth_color(amrlev, mglev, sol, rhs, 0)?;
            self.smooth_color(amrlev, mglev, sol, rhs, 1)?;
        }
        Ok(())
    }

    /// `resid = rhs - L(sol)`
    pub fn residual(
        &self,
        amrlev: usize,
        mglev: usize,
        resid: &mut MultiFab<D>,
        sol: &MultiFab<D>,
        rhs: &MultiFab<D>,
    ) -> Result<()> {
        let layout = self.prepared_level(amrlev, mglev)?;
        self.check_field(rhs, layout, amrlev, mglev, 0)?;
        self.apply(amrlev, mglev, resid, sol)?;
        for_each_box(resid.fabs_mut(), |i, fab| {
            let bx = layout.grids.get(i);
            let r = rhs.fab(i).view();
            let mut out = fab.view_mut();
            for n in 0..out.ncomp() {
                for iv in bx.cells() {
                    let v = r.get_n(iv, n) - out.get_n(iv, n);
                    out.set_n(iv, n, v);
                }
            }
        });
        Ok(())
    }

    /// Set every coupled ghost cell to `coef * adjacent interior value`
    ///
    /// This is the boundary fill of a homogeneous problem. Uncoupled ghost
    /// cells are left untouched.
    pub fn fill_coupled_ghosts(&self, amrlev: usize, mglev: usize, x: &mut MultiFab<D>) -> Result<()> {
        let layout = self.prepared_level(amrlev, mglev)?;
        self.check_field(x, layout, amrlev, mglev, STENCIL_GHOSTS)?;
        let couplings = self.couplings(amrlev, mglev)?;

        for_each_box(x.fabs_mut(), |i, fab| {
            let valid = layout.grids.get(i);
            let ncomp = fab.ncomp();
            let mut view = fab.view_mut();
            for ori in Orientation::all::<D>() {
                let mask = couplings[i].mask(ori).view();
                let coef = couplings[i].coef(ori).view();
                let inward = -ori.side.sign();
                for g in valid.adjacent_layer(ori).cells() {
                    if mask.get(g) <= 0 {
                        continue;
                    }
                    let inside = shift(g, ori.dir, inward);
                    for n in 0..ncomp {
                        let v = coef.get(g) * view.get_n(inside, n);
                        view.set_n(g, n, v);
                    }
                }
            }
        });
        Ok(())
    }

    /// Fluxes `-beta*b*grad(sol)` on every face of every AMR level, using
    /// the finest multigrid level of each
    pub fn get_fluxes(
        &self,
        sols: &[&MultiFab<D>],
        location: Location,
    ) -> Result<Vec<[MultiFab<D>; D]>> {
        self.fluxes_with(sols, location, |dir, fbx, flux, sol, b, fac| {
            abec_face_flux(dir, fbx, flux, sol, b, fac);
            Ok(())
        })
    }

    /// Like [`CellAbecLap::get_fluxes`], but only the two bounding face
    /// planes of each box are computed; interior faces stay zero
    pub fn get_box_face_fluxes(
        &self,
        sols: &[&MultiFab<D>],
        location: Location,
    ) -> Result<Vec<[MultiFab<D>; D]>> {
        self.fluxes_with(sols, location, abec_face_flux_box_faces::<D>)
    }

    fn fluxes_with<K>(
        &self,
        sols: &[&MultiFab<D>],
        location: Location,
        kernel: K,
    ) -> Result<Vec<[MultiFab<D>; D]>>
    where
        K: Fn(
                usize,
                &IndexBox<D>,
                &mut Array4Mut<'_, f64, D>,
                &Array4<'_, f64, D>,
                &Array4<'_, f64, D>,
                f64,
            ) -> Result<()>
            + Sync
            + Send,
    {
        if matches!(location, Location::CellCenter | Location::CellCentroid) {
            return Err(MlmgError::EmbeddedBoundaryRequired);
        }
        let nlevels = self.num_amr_levels();
        if sols.len() != nlevels {
            return Err(MlmgError::LayoutMismatch {
                amrlev: sols.len().min(nlevels),
                mglev: 0,
            });
        }

        let beta = self.physics.b_scalar();
        let mut out = Vec::with_capacity(nlevels);
        for (amrlev, sol) in sols.iter().enumerate() {
            let layout = self.prepared_level(amrlev, 0)?;
            self.check_field(sol, layout, amrlev, 0, STENCIL_GHOSTS)?;
            let dxinv = layout.geom.inv_dx();
            let b = self.physics.b_coeffs(amrlev, 0);

            let mut fluxes = self.make_face_multifabs(amrlev, 0)?;
            for (dir, flux) in fluxes.iter_mut().enumerate() {
                let fac = beta * dxinv[dir];
                try_for_each_box(flux.fabs_mut(), |i, fab| {
                    let fbx = layout.grids.get(i).surrounding_nodes(dir);
                    kernel(
                        dir,
                        &fbx,
                        &mut fab.view_mut(),
                        &sol.fab(i).view(),
                        &b[dir].fab(i).view(),
                        fac,
                    )
                })?;
            }
            out.push(fluxes);
        }
        Ok(out)
    }
}

impl<const D: usize, P: AbecPhysics<D>> LevelOperator<D> for CellAbecLap<D, P> {
    fn state(&self) -> OperatorState {
        CellAbecLap::state(self)
    }

    fn ncomp(&self) -> usize {
        self.info.ncomp
    }

    fn level_layout(&self, amrlev: usize) -> Result<&LevelLayout<D>> {
        self.layout(amrlev, 0)
    }

    fn make_level_field(&self, amrlev: usize) -> Result<MultiFab<D>> {
        self.make_multifab(amrlev, 0)
    }

    fn apply(&self, amrlev: usize, out: &mut MultiFab<D>, input: &MultiFab<D>) -> Result<()> {
        CellAbecLap::apply(self, amrlev, 0, out, input)
    }

    fn fill_coupled_ghosts(&self, amrlev: usize, x: &mut MultiFab<D>) -> Result<()> {
        CellAbecLap::fill_coupled_ghosts(self, amrlev, 0, x)
    }
}
