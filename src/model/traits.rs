//! Model trait
//!
//! This module defines the core API every compartmental model implements:
//! - `OdeModel`: the right-hand side of dy/dt = f(t, y)
//!
//! The model provides the **equations**, the solver provides the **method**.

use nalgebra::{DMatrix, DVector};

use crate::error::Result;

// =================================================================================================
// OdeModel Trait
// =================================================================================================

/// Trait for ordinary differential equation models
///
/// # Responsibility
///
/// Evaluates the instantaneous rate of change of every state component.
/// Does NOT integrate (that's the Solver's job).
///
/// # Purity
///
/// `derivatives` must be a pure function of `(t, state)` and the model's
/// immutable parameters: no interior mutability, no I/O. The solvers call
/// it many times per output point, in an order that is not specified.
///
/// # Thread Safety
///
/// Models are `Send + Sync` so that independent runs can be executed on
/// separate threads (see [`crate::sweep`]).
pub trait OdeModel: Send + Sync {
    /// Number of state components
    ///
    /// Used by the solver to check the initial state and allocate buffers
    fn dimension(&self) -> usize;

    /// Right-hand side f(t, y) of dy/dt = f(t, y)
    ///
    /// # Arguments
    /// * `t` - Current time (may be unused by autonomous systems)
    /// * `state` - Current state, of length [`dimension`](OdeModel::dimension)
    fn derivatives(&self, t: f64, state: &DVector<f64>) -> DVector<f64>;

    /// Jacobian ∂f/∂y evaluated at `(t, state)`
    ///
    /// The default implementation uses central finite differences
    /// (2·n evaluations of `derivatives`). Models with a closed-form
    /// Jacobian should override it; implicit solvers call it once per step.
    fn jacobian(&self, t: f64, state: &DVector<f64>) -> DMatrix<f64> {
        let n = self.dimension();
        let mut jacobian = DMatrix::zeros(n, n);
        let mut probe = state.clone();

        for j in 0..n {
            let original = probe[j];
            let h = f64::EPSILON.cbrt() * (1.0 + original.abs());

            probe[j] = original + h;
            let forward = self.derivatives(t, &probe);
            probe[j] = original - h;
            let backward = self.derivatives(t, &probe);
            probe[j] = original;

            let column = (forward - backward) / (2.0 * h);
            jacobian.set_column(j, &column);
        }

        jacobian
    }

    /// Model-specific check of an initial state
    ///
    /// Called by [`Scenario::validate`](crate::solver::Scenario::validate)
    /// after the dimension and finiteness checks. Accepts everything by default.
    fn validate_state(&self, _state: &DVector<f64>) -> Result<()> {
        Ok(())
    }

    /// One human-readable label per state component
    ///
    /// Used by exporters and plots for column headers and legends.
    fn labels(&self) -> Vec<String> {
        (0..self.dimension()).map(|i| format!("y{}", i)).collect()
    }

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (optional)
    fn description(&self) -> Option<&str> {
        None
    }
}

// =================================================================================================
// Tests
// =================================================================================================
