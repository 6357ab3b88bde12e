//! Alternate solver backends
//!
//! A backend solves one AMR level through the object-safe
//! [`LevelOperator`] view of an operator. Backends are created on demand
//! from a name-to-factory registry handed to the operator at define time; a
//! missing name is a normal outcome, not an error.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::field::MultiFab;

use super::cell_abec::OperatorState;
use super::hierarchy::LevelLayout;

/// The part of an operator a backend needs, on the finest multigrid level
/// of an AMR level
pub trait LevelOperator<const D: usize> {
    fn state(&self) -> OperatorState;

    /// Components of solution fields
    fn ncomp(&self) -> usize;

    fn level_layout(&self, amrlev: usize) -> Result<&LevelLayout<D>>;

    /// Zeroed cell field matching the level
    fn make_level_field(&self, amrlev: usize) -> Result<MultiFab<D>>;

    /// `out = L(input)` using the ghost values stored in `input`
    fn apply(&self, amrlev: usize, out: &mut MultiFab<D>, input: &MultiFab<D>) -> Result<()>;

    /// Homogeneous boundary fill of the coupled ghost cells of `x`
    fn fill_coupled_ghosts(&self, amrlev: usize, x: &mut MultiFab<D>) -> Result<()>;
}

/// Outcome of a backend solve
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSolution {
    /// Number of iterations
    pub iterations: usize,
    /// Final residual relative to the initial one
    pub residual: f64,
    /// Whether the requested tolerance was reached
    pub converged: bool,
}

/// A solver that can replace the multigrid cycle on one level
pub trait SolverBackend<const D: usize>: Send {
    fn name(&self) -> &str;

    /// Improve `sol` so that `rhs - L(sol)` shrinks by `tol` relative to its
    /// initial value
    fn solve(
        &mut self,
        op: &dyn LevelOperator<D>,
        amrlev: usize,
        sol: &mut MultiFab<D>,
        rhs: &MultiFab<D>,
        tol: f64,
    ) -> Result<BackendSolution>;
}

/// Creates a fresh backend instance
pub type BackendFactory<const D: usize> = Box<dyn Fn() -> Box<dyn SolverBackend<D>> + Send + Sync>;

/// Backends available to an operator, by name
#[derive(Default)]
pub struct BackendRegistry<const D: usize> {
    factories: BTreeMap<String, BackendFactory<D>>,
}

impl<const D: usize> BackendRegistry<D> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) a factory under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn SolverBackend<D>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Builder-style [`BackendRegistry::register`]
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SolverBackend<D>> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// New backend instance, `None` when `name` is not registered
    pub fn make(&self, name: &str) -> Option<Box<dyn SolverBackend<D>>> {
        self.factories.get(name).map(|factory| factory())
    }
}

impl<const D: usize> std::fmt::Debug for BackendRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl SolverBackend<2> for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn solve(
            &mut self,
            _op: &dyn LevelOperator<2>,
            _amrlev: usize,
            _sol: &mut MultiFab<2>,
            _rhs: &MultiFab<2>,
            _tol: f64,
        ) -> Result<BackendSolution> {
            Ok(BackendSolution {
                iterations: 0,
                residual: 0.0,
                converged: true,
            })
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = BackendRegistry::<2>::new().with("noop", || Box::new(Noop));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("noop"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["noop"]);
        assert_eq!(registry.make("noop").map(|b| b.name().to_string()), Some("noop".into()));
        assert!(registry.make("petsc").is_none());
        assert!(format!("{registry:?}").contains("noop"));
    }
}
