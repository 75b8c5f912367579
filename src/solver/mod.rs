//! Numerical solvers
//!
//! This module provides traits and implementations for numerical solvers.
//! A numerical solver applies a numerical method to the equations provided
//! by a model within a specific scenario.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Model (equations)
//!    - Initial state
//!    - Output time grid (`TimeGrid`)
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Adaptive tolerances and step budget, or fixed substeps
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns a `Trajectory` sampled at the grid times
//!    - Independent of the epidemiology
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │  OdeModel       │  (equations)
//! └────────┬────────┘
//!          │
//! ┌────────▼──────────────────┐
//! │ Scenario                  │ ← WHAT to solve
//! │ (model + y0 + time grid)  │
//! └────────┬──────────────────┘
//!          │
//! ┌────────▼─────────────┐
//! │ Solver Configuration │ ← HOW to solve
//! │ (tolerances, budget) │
//! └────────┬─────────────┘
//!          │
//! ┌────────▼──────────────────────┐
//! │ Solver                        │ ← The method
//! │ (Dopri5, SDIRK, RK4, Euler)   │
//! └────────┬──────────────────────┘
//!          │
//! ┌────────▼────────────┐
//! │ Trajectory          │ ← The solution
//! │ (states + stats)    │
//! └─────────────────────┘
//! ```
//!
//! # Available Solvers
//!
//! | Method            | Order | Steps    | Stiff problems |
//! |-------------------|-------|----------|----------------|
//! | `Dopri5Solver`    | 5(4)  | adaptive | no             |
//! | `SdirkSolver`     | 2(1)  | adaptive | yes (L-stable) |
//! | `RK4Solver`       | 4     | fixed    | no             |
//! | `EulerSolver`     | 1     | fixed    | no             |
//!
//! `Dopri5Solver` is the default. Adaptive solvers choose their own internal
//! steps and report at the grid times through a continuous extension, so the
//! grid density does not change the accuracy of the reported values.
//!
//! # Error Handling
//!
//! All solvers return [`crate::error::Result`]. Integration problems are
//! reported as `SimulationError::IntegrationFailure` with the time reached
//! and the reason (step budget, step underflow, non-finite state, singular
//! Newton matrix). No partial trajectory is ever returned.

// =================================================================================================
// Module Declarations
// =================================================================================================
mod methods;
mod scenario;
mod time_grid;
mod traits;
mod trajectory;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{
    AdaptiveSettings, DEFAULT_ATOL, DEFAULT_MAX_STEPS, DEFAULT_RTOL, DEFAULT_SUBSTEPS, Solver,
    SolverConfiguration, SolverMethod, StepControl,
};

pub use scenario::Scenario;
pub use time_grid::TimeGrid;
pub use trajectory::{SolverStats, Trajectory};

pub use methods::{Dopri5Solver, EulerSolver, RK4Solver, SdirkSolver};

// =================================================================================================
// Helper Functions
// =================================================================================================

use nalgebra::DVector;

use crate::error::{FailureKind, Result, SimulationError};

/// Validate a state for numerical issues
///
/// NaN arises from 0/0 or Inf - Inf, infinity from overflow. Both mean the
/// integration cannot continue.
///
/// # Example
///
/// ```rust,ignore
/// validate_state(&state, t, self.name())?;
/// ```
pub(crate) fn validate_state(state: &DVector<f64>, t: f64, solver: &str) -> Result<()> {
    match state.iter().position(|x| !x.is_finite()) {
        Some(component) => Err(SimulationError::integration_failure(
            solver,
            FailureKind::NonFiniteState { component },
            t,
        )),
        None => Ok(()),
    }
}

/// Emit one warning the first time a component goes negative
///
/// Negative values are kept in the trajectory as computed.
pub(crate) fn warn_if_negative(state: &DVector<f64>, t: f64, labels: &[String], warned: &mut bool) {
    if *warned {
        return;
    }
    if let Some(index) = state.iter().position(|x| *x < 0.0) {
        let label = labels.get(index).map(String::as_str).unwrap_or("?");
        log::warn!(
            "Component {} ({}) became negative ({:.3e}) at t = {:.6}; values are reported unclipped",
            index,
            label,
            state[index],
            t
        );
        *warned = true;
    }
}

// =================================================================================================
// Tests
// =================================================================================================
