//! Forward Euler numerical solver
//!
//! # Mathematical Background
//!
//! The Forward Euler method is the simplest explicit time-stepping scheme
//! for solving ordinary differential equations (ODEs):
//!
//! ```text
//! dy/dt = f(t, y)
//! y_{n+1} = y_n + dt * f(t_n, y_n)
//! ```
//!
//! # Characteristics
//!
//! - **Order**: First-order accurate (global error ~ O(dt))
//! - **Stability**: Conditionally stable (|1 + λ·dt| ≤ 1)
//! - **Complexity**: 1 function evaluation per step
//!
//! # When to Use
//!
//! - Cross-checking the adaptive solvers on a coarse grid
//! - Educational demonstrations of first-order convergence
//!
//! # When NOT to Use
//!
//! - Reference outbreak curves → Use the adaptive Dormand-Prince solver
//! - Stiff parameter sets → Use the SDIRK solver

use crate::error::{Result, SimulationError};
use crate::solver::trajectory::{SolverStats, Trajectory};
use crate::solver::{
    DEFAULT_SUBSTEPS, Scenario, Solver, SolverConfiguration, StepControl, validate_state, warn_if_negative,
};

// =================================================================================================
// Euler Solver
// =================================================================================================

/// Forward Euler solver with fixed substeps
///
/// Between two consecutive output times `t_i` and `t_{i+1}`, the solver
/// takes `substeps` equal steps `dt = (t_{i+1} - t_i) / substeps`.
///
/// # Example
///
/// ```rust
/// use seird_rs::solver::{EulerSolver, Solver};
///
/// let solver = EulerSolver::new();
/// assert_eq!(solver.name(), "Forward Euler");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerSolver;

impl EulerSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for EulerSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<Trajectory> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let substeps = match config.step_control {
            StepControl::Fixed { substeps } => substeps,
            other => {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{} only supports fixed-step configuration, got {}",
                    self.name(),
                    other.name()
                )));
            }
        };

        // ====== Step 2: Setup ======

        let model = scenario.model.as_ref();
        let grid = &scenario.grid;
        let labels = model.labels();

        let mut state = scenario.initial_state.clone();
        let mut states = Vec::with_capacity(grid.len());
        states.push(state.clone());

        let mut stats = SolverStats::default();
        let mut warned = false;

        // ====== Step 3: Time Integration ======

        for (t_start, t_end) in grid.intervals() {
            let dt = (t_end - t_start) / substeps as f64;

            for step in 0..substeps {
                // Time from the interval start, not accumulated
                let t = t_start + step as f64 * dt;

                let slope = model.derivatives(t, &state);
                state += slope * dt;

                stats.function_evaluations += 1;
                stats.accepted_steps += 1;

                validate_state(&state, t + dt, self.name())?;
            }

            warn_if_negative(&state, t_end, &labels, &mut warned);
            states.push(state.clone());
        }

        // ====== Step 4: Build Result ======

        log::debug!(
            "{}: {} output points, {} steps",
            self.name(),
            grid.len(),
            stats.accepted_steps
        );

        let mut trajectory = Trajectory::new(grid.points().to_vec(), states, labels, stats);
        trajectory.add_metadata("solver", self.name());
        trajectory.add_metadata("model", scenario.model_name());
        trajectory.add_metadata("substeps", &substeps.to_string());
        trajectory.add_metadata("function evaluations", &stats.function_evaluations.to_string());

        Ok(trajectory)
    }

    fn name(&self) -> &'static str {
        "Forward Euler"
    }

    fn default_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::fixed(DEFAULT_SUBSTEPS)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
