//! Linear operator options

use serde::{Deserialize, Serialize};

use crate::error::{MlmgError, Result};

/// Options fixed at `define` time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpInfo {
    /// Upper bound on multigrid levels below AMR level 0
    #[serde(default = "default_max_coarsening_level")]
    pub max_coarsening_level: usize,
    /// Smallest box width allowed after coarsening
    #[serde(default = "default_min_coarse_width")]
    pub min_coarse_width: i32,
    /// Components of solution fields
    #[serde(default = "default_ncomp")]
    pub ncomp: usize,
    /// Ghost width of fields created by the operator
    #[serde(default = "default_ngrow")]
    pub ngrow: usize,
}

impl Default for LpInfo {
    fn default() -> Self {
        Self {
            max_coarsening_level: default_max_coarsening_level(),
            min_coarse_width: default_min_coarse_width(),
            ncomp: default_ncomp(),
            ngrow: default_ngrow(),
        }
    }
}

fn default_max_coarsening_level() -> usize {
    30
}

fn default_min_coarse_width() -> i32 {
    2
}

fn default_ncomp() -> usize {
    1
}

fn default_ngrow() -> usize {
    1
}

impl LpInfo {
    pub fn with_max_coarsening_level(mut self, level: usize) -> Self {
        self.max_coarsening_level = level;
        self
    }

    pub fn with_min_coarse_width(mut self, width: i32) -> Self {
        self.min_coarse_width = width;
        self
    }

    pub fn with_ncomp(mut self, ncomp: usize) -> Self {
        self.ncomp = ncomp;
        self
    }

    pub fn with_ngrow(mut self, ngrow: usize) -> Self {
        self.ngrow = ngrow;
        self
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let info: LpInfo = serde_json::from_str(json)?;
        info.validate()?;
        Ok(info)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ncomp == 0 {
            return Err(MlmgError::InvalidOption {
                name: "ncomp",
                reason: "must be at least 1".into(),
            });
        }
        if self.ngrow == 0 {
            return Err(MlmgError::InvalidOption {
                name: "ngrow",
                reason: "the stencil reads one ghost cell".into(),
            });
        }
        if self.min_coarse_width < 1 {
            return Err(MlmgError::InvalidOption {
                name: "min_coarse_width",
                reason: format!("{} is not positive", self.min_coarse_width),
            });
        }
        Ok(())
    }
}
