//! AMR and multigrid level layouts
//!
//! Each AMR level owns a stack of multigrid levels, finest first. AMR level
//! 0 is coarsened by 2 for as long as the boxes and the domain allow it. A
//! finer AMR level only gets the levels between itself and the next coarser
//! AMR level: one for a refinement ratio of 2, two for a ratio of 4.

use crate::error::{MlmgError, Result};
use crate::geometry::{BoxArray, DistributionMapping, LevelGeometry};

use super::info::LpInfo;

/// Geometry, boxes and owners of one (AMR, multigrid) level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout<const D: usize> {
    pub geom: LevelGeometry<D>,
    pub grids: BoxArray<D>,
    pub dmap: DistributionMapping,
}

impl<const D: usize> LevelLayout<D> {
    fn coarsen(&self, r: i32) -> Self {
        Self {
            geom: self.geom.coarsen(r),
            grids: self.grids.coarsen(r),
            dmap: self.dmap.clone(),
        }
    }
}

/// All level layouts of an operator, indexed `[amrlev][mglev]`
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayouts<const D: usize> {
    levels: Vec<Vec<LevelLayout<D>>>,
    /// Refinement ratio of each AMR level to the next coarser one (0 for
    /// level 0)
    ref_ratios: Vec<i32>,
}

impl<const D: usize> LevelLayouts<D> {
    /// Validate the AMR levels and build their multigrid stacks
    pub fn build(
        geoms: &[LevelGeometry<D>],
        grids: &[BoxArray<D>],
        dmaps: &[DistributionMapping],
        info: &LpInfo,
    ) -> Result<Self> {
        if geoms.is_empty() || geoms.len() != grids.len() || geoms.len() != dmaps.len() {
            return Err(MlmgError::InconsistentLevels {
                geometries: geoms.len(),
                grids: grids.len(),
                distributions: dmaps.len(),
            });
        }
        info.validate()?;

        for (amrlev, ((geom, ba), dm)) in geoms.iter().zip(grids).zip(dmaps).enumerate() {
            if ba.len() != dm.len() {
                return Err(MlmgError::InconsistentGrids {
                    amrlev,
                    boxes: ba.len(),
                    ranks: dm.len(),
                });
            }
            if ba.is_empty() {
                return Err(MlmgError::EmptyLevel { amrlev });
            }
            if let Some(index) = ba.iter().position(|b| b.is_empty() || !geom.domain.contains_box(b)) {
                return Err(MlmgError::BoxOutsideDomain { amrlev, index });
            }
        }

        let mut ref_ratios = vec![0];
        for amrlev in 1..geoms.len() {
            let ratio = refinement_ratio(&geoms[amrlev - 1], &geoms[amrlev]);
            if ratio != 2 && ratio != 4 {
                return Err(MlmgError::InvalidRefinementRatio { amrlev, ratio });
            }
            if let Some(index) = grids[amrlev]
                .iter()
                .position(|b| b.coarsen(ratio).refine(ratio) != *b)
            {
                return Err(MlmgError::MisalignedBox {
                    amrlev,
                    index,
                    ratio,
                });
            }
            ref_ratios.push(ratio);
        }

        let mut levels = Vec::with_capacity(geoms.len());
        for amrlev in 0..geoms.len() {
            let finest = LevelLayout {
                geom: geoms[amrlev].clone(),
                grids: grids[amrlev].clone(),
                dmap: dmaps[amrlev].clone(),
            };
            let mut stack = vec![finest];
            if amrlev == 0 {
                loop {
                    let Some(last) = stack.last() else { break };
                    let coarsenable = stack.len() <= info.max_coarsening_level
                        && last.grids.coarsenable(2, info.min_coarse_width)
                        && last.geom.domain.coarsenable(2, info.min_coarse_width);
                    if !coarsenable {
                        break;
                    }
                    let next = last.coarsen(2);
                    stack.push(next);
                }
            } else {
                let mut r = ref_ratios[amrlev];
                while r > 2 {
                    let Some(last) = stack.last() else { break };
                    let next = last.coarsen(2);
                    stack.push(next);
                    r /= 2;
                }
            }
            log::debug!(
                "AMR level {}: {} boxes, {} multigrid levels",
                amrlev,
                grids[amrlev].len(),
                stack.len()
            );
            levels.push(stack);
        }

        Ok(Self { levels, ref_ratios })
    }

    pub fn num_amr_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn finest_amr_level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn num_mg_levels(&self, amrlev: usize) -> usize {
        self.levels.get(amrlev).map_or(0, Vec::len)
    }

    /// Ratio between `amrlev` and `amrlev - 1`, `None` for level 0
    pub fn ref_ratio(&self, amrlev: usize) -> Option<i32> {
        match amrlev {
            0 => None,
            _ => self.ref_ratios.get(amrlev).copied(),
        }
    }

    pub fn level(&self, amrlev: usize, mglev: usize) -> Result<&LevelLayout<D>> {
        self.levels
            .get(amrlev)
            .and_then(|stack| stack.get(mglev))
            .ok_or(MlmgError::LevelOutOfRange { amrlev, mglev })
    }

    /// Multigrid stack of one AMR level, finest first
    pub fn stack(&self, amrlev: usize) -> &[LevelLayout<D>] {
        self.levels.get(amrlev).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(amrlev, mglev, layout)` for every level
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &LevelLayout<D>)> {
        self.levels.iter().enumerate().flat_map(|(amrlev, stack)| {
            stack
                .iter()
                .enumerate()
                .map(move |(mglev, layout)| (amrlev, mglev, layout))
        })
    }
}

/// Uniform ratio between two domains, 0 when they are not related by one
fn refinement_ratio<const D: usize>(crse: &LevelGeometry<D>, fine: &LevelGeometry<D>) -> i32 {
    let c = crse.domain.len(0);
    if c == 0 || fine.domain.len(0) % c != 0 {
        return 0;
    }
    let r = fine.domain.len(0) / c;
    if r > 0 && crse.domain.refine(r) == fine.domain {
        r
    } else {
        0
    }
}
