//! Error types for the operator layer.
//!
//! Kernels never fail (out-of-range access is a caller precondition); the
//! only kernel-level error is the rejection of a degenerate face box. Every
//! other variant comes from operator configuration or from calling a level
//! operation with fields that do not match the level layout.

use thiserror::Error;

/// Errors raised by the multigrid operator layer.
#[derive(Debug, Error)]
pub enum MlmgError {
    /// Geometry, box array and distribution counts differ (or are zero).
    #[error(
        "inconsistent level counts: {geometries} geometries, {grids} box arrays, {distributions} distribution maps"
    )]
    InconsistentLevels {
        /// Number of level geometries supplied
        geometries: usize,
        /// Number of box arrays supplied
        grids: usize,
        /// Number of distribution mappings supplied
        distributions: usize,
    },

    /// A level's box array and distribution mapping have different lengths.
    #[error("AMR level {amrlev}: {boxes} boxes but {ranks} distribution entries")]
    InconsistentGrids {
        /// AMR level index
        amrlev: usize,
        /// Number of boxes in the box array
        boxes: usize,
        /// Number of entries in the distribution mapping
        ranks: usize,
    },

    /// A level has no boxes at all.
    #[error("AMR level {amrlev} has no boxes")]
    EmptyLevel {
        /// AMR level index
        amrlev: usize,
    },

    /// A box is not contained in its level's domain.
    #[error("AMR level {amrlev}: box {index} lies outside the level domain")]
    BoxOutsideDomain {
        /// AMR level index
        amrlev: usize,
        /// Box index within the level
        index: usize,
    },

    /// Successive AMR domains are not related by a ratio of 2 or 4.
    #[error("AMR level {amrlev}: refinement ratio {ratio} is not 2 or 4")]
    InvalidRefinementRatio {
        /// AMR level index (the finer of the two levels)
        amrlev: usize,
        /// Observed ratio (0 when the domains are not a uniform refinement)
        ratio: i32,
    },

    /// A fine box cannot be coarsened onto the next coarser AMR level.
    #[error("AMR level {amrlev}: box {index} is not aligned to refinement ratio {ratio}")]
    MisalignedBox {
        /// AMR level index
        amrlev: usize,
        /// Box index within the level
        index: usize,
        /// Refinement ratio to the coarser level
        ratio: i32,
    },

    /// Periodic geometry requires periodic boundary conditions and vice versa.
    #[error("direction {dir}: periodic geometry and periodic boundary conditions disagree")]
    PeriodicityMismatch {
        /// Direction index
        dir: usize,
    },

    /// An option is outside its valid range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption {
        /// Option name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The operator has not been defined yet.
    #[error("operator has not been defined")]
    Unconfigured,

    /// A level operation was called before `prepare_for_solve`, or after the
    /// operator went stale.
    #[error("operator is not prepared for solve")]
    NotPrepared,

    /// The requested (AMR, multigrid) level does not exist.
    #[error("level ({amrlev}, {mglev}) does not exist")]
    LevelOutOfRange {
        /// AMR level index
        amrlev: usize,
        /// Multigrid level index
        mglev: usize,
    },

    /// A field's box array or component count does not match the level.
    #[error("field layout does not match level ({amrlev}, {mglev})")]
    LayoutMismatch {
        /// AMR level index
        amrlev: usize,
        /// Multigrid level index
        mglev: usize,
    },

    /// A field has fewer ghost cells than the stencil reads.
    #[error("field has {ngrow} ghost cells, at least {required} required")]
    InsufficientGhostCells {
        /// Ghost width of the field
        ngrow: usize,
        /// Ghost width the operation needs
        required: usize,
    },

    /// The domain-face flux batch needs two distinct planes.
    #[error("face box spans {len} plane(s) along direction {dir}, at least 2 required")]
    DegenerateFaceBox {
        /// Flux direction
        dir: usize,
        /// Number of face planes in the box along `dir`
        len: i32,
    },

    /// Centroid placement needs embedded-boundary geometry.
    #[error("cell-centroid flux placement requires embedded-boundary geometry")]
    EmbeddedBoundaryRequired,

    /// An alternate backend cannot handle the given layout.
    #[error("backend '{backend}' does not support this layout: {reason}")]
    UnsupportedLayout {
        /// Backend name
        backend: String,
        /// What is unsupported
        reason: String,
    },

    /// Operator options could not be parsed.
    #[error("invalid operator configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// A specialized `Result` type for the operator layer.
pub type Result<T> = std::result::Result<T, MlmgError>;

impl MlmgError {
    /// Returns `true` for errors raised while defining the operator.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MlmgError::InconsistentLevels { .. }
                | MlmgError::InconsistentGrids { .. }
                | MlmgError::EmptyLevel { .. }
                | MlmgError::BoxOutsideDomain { .. }
                | MlmgError::InvalidRefinementRatio { .. }
                | MlmgError::MisalignedBox { .. }
                | MlmgError::PeriodicityMismatch { .. }
                | MlmgError::InvalidOption { .. }
                | MlmgError::Config(_)
        )
    }

    /// Returns `true` when a field does not fit the level it was used on.
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            MlmgError::LevelOutOfRange { .. }
                | MlmgError::LayoutMismatch { .. }
                | MlmgError::InsufficientGhostCells { .. }
                | MlmgError::DegenerateFaceBox { .. }
                | MlmgError::UnsupportedLayout { .. }
        )
    }

    /// Returns `true` when the operator is in the wrong lifecycle state.
    pub fn is_state_error(&self) -> bool {
        matches!(self, MlmgError::Unconfigured | MlmgError::NotPrepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MlmgError::InconsistentLevels {
            geometries: 2,
            grids: 2,
            distributions: 1,
        };
        assert_eq!(
            err.to_string(),
            "inconsistent level counts: 2 geometries, 2 box arrays, 1 distribution maps"
        );
    }

    #[test]
    fn test_degenerate_face_display() {
        let err = MlmgError::DegenerateFaceBox { dir: 1, len: 1 };
        assert!(err.to_string().contains("direction 1"));
    }

    #[test]
    fn test_error_categories() {
        let cfg = MlmgError::EmptyLevel { amrlev: 0 };
        let layout = MlmgError::InsufficientGhostCells {
            ngrow: 0,
            required: 1,
        };

        assert!(cfg.is_configuration_error());
        assert!(!cfg.is_layout_error());
        assert!(layout.is_layout_error());
        assert!(MlmgError::NotPrepared.is_state_error());
        assert!(!MlmgError::NotPrepared.is_configuration_error());
    }

    #[test]
    fn test_config_error_from_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: MlmgError = parse.unwrap_err().into();
        assert!(err.is_configuration_error());
    }
}
