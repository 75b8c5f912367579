//! Runge-Kutta 4 (RK4) numerical solver
//!
//! # Mathematical Background
//!
//! The classical fourth-order Runge-Kutta method uses a weighted average of
//! four slope estimates:
//!
//! ```text
//! k₁ = f(tₙ, yₙ)
//! k₂ = f(tₙ + dt/2, yₙ + dt/2 * k₁)
//! k₃ = f(tₙ + dt/2, yₙ + dt/2 * k₂)
//! k₄ = f(tₙ + dt, yₙ + dt * k₃)
//!
//! yₙ₊₁ = yₙ + dt/6 * (k₁ + 2k₂ + 2k₃ + k₄)
//! ```
//!
//! # Characteristics
//!
//! - **Order**: Fourth-order accurate (global error ~ O(dt⁴))
//! - **Complexity**: 4 function evaluations per step
//! - **Step**: fixed, `substeps` per output interval (no error control)
//!
//! # Comparison with Euler
//!
//! | Method | Order | Evals/Step | Error |
//! |--------|-------|------------|-------|
//! | Euler  | 1     | 1          | O(dt) |
//! | RK4    | 4     | 4          | O(dt⁴)|
//!
//! Halving dt divides the RK4 error by about 16.

use crate::error::{Result, SimulationError};
use crate::solver::trajectory::{SolverStats, Trajectory};
use crate::solver::{
    DEFAULT_SUBSTEPS, Scenario, Solver, SolverConfiguration, StepControl, validate_state, warn_if_negative,
};

// =================================================================================================
// RK4 Solver
// =================================================================================================

/// Classical fourth-order Runge-Kutta solver with fixed substeps
///
/// # Stability
///
/// For dy/dt = λy, RK4 is stable when
///
/// ```text
/// |1 + z + z²/2 + z³/6 + z⁴/24| ≤ 1,   z = λ·dt
/// ```
///
/// which on the real axis means dt < 2.785 / |λ|.
///
/// # Example
///
/// ```rust
/// use seird_rs::solver::{RK4Solver, Solver};
///
/// let solver = RK4Solver::new();
/// assert_eq!(solver.name(), "Runge Kutta (RK4)");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Solver;

impl RK4Solver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for RK4Solver {
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
            let half = dt / 2.0;

            for step in 0..substeps {
                let t = t_start + step as f64 * dt;

                // ====== RK4 Stages ======

                let k1 = model.derivatives(t, &state);
                let k2 = model.derivatives(t + half, &(&state + &k1 * half));
                let k3 = model.derivatives(t + half, &(&state + &k2 * half));
                let k4 = model.derivatives(t + dt, &(&state + &k3 * dt));

                // ====== RK4 Update ======

                // Simpson weights: endpoints 1/6, midpoints 1/3
                state += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);

                stats.function_evaluations += 4;
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
        "Runge Kutta (RK4)"
    }

    fn default_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::fixed(DEFAULT_SUBSTEPS)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OdeModel;
    use crate::solver::TimeGrid;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    // ====== Mock Models for Testing ======

    /// dy/dt = -k * y
    struct ExponentialDecay {
        decay_rate: f64,
    }

    impl OdeModel for ExponentialDecay {
        fn dimension(&self) -> usize {
            1
        }

        fn derivatives(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
            state * -self.decay_rate
        }

        fn name(&self) -> &str {
            "Exponential Decay"
        }
    }

    /// x'' = -ω² x as a first-order system, x(t) = cos(ωt)
    struct HarmonicOscillator {
        omega: f64,
    }

    impl OdeModel for HarmonicOscillator {
        fn dimension(&self) -> usize {
            2
        }

        fn derivatives(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
            DVector::from_vec(vec![state[1], -self.omega * self.omega * state[0]])
        }

        fn name(&self) -> &str {
            "Harmonic Oscillator"
        }
    }

    /// dy/dt = t² (non-autonomous, RK4 integrates polynomials of degree ≤ 3 exactly)
    struct Quadrature;

    impl OdeModel for Quadrature {
        fn dimension(&self) -> usize {
            1
        }

        fn derivatives(&self, t: f64, _state: &DVector<f64>) -> DVector<f64> {
            DVector::from_element(1, t * t)
        }

        fn name(&self) -> &str {
            "Quadrature"
        }
    }

    fn solve(model: Box<dyn OdeModel>, y0: Vec<f64>, grid: TimeGrid, substeps: usize) -> Trajectory {
        let scenario = Scenario::new(model, DVector::from_vec(y0), grid);
        RK4Solver::new()
            .solve(&scenario, &SolverConfiguration::fixed(substeps))
            .unwrap()
    }

    #[test]
    fn test_rk4_solver_creation() {
        let solver = RK4Solver::new();
        assert_eq!(solver.name(), "Runge Kutta (RK4)");
    }

    #[test]
    fn test_rk4_rejects_adaptive_configuration() {
        let scenario = Scenario::new(
            Box::new(ExponentialDecay { decay_rate: 1.0 }),
            DVector::from_vec(vec![1.0]),
            TimeGrid::linspace(0.0, 1.0, 2).unwrap(),
        );
        assert!(RK4Solver::new().solve(&scenario, &SolverConfiguration::default()).is_err());
    }

    #[test]
    fn test_rk4_exponential_decay() {
        let k = 0.3;
        let result = solve(
            Box::new(ExponentialDecay { decay_rate: k }),
            vec![1.0],
            TimeGrid::linspace(0.0, 5.0, 6).unwrap(),
            40,
        );

        for (t, state) in result.iter() {
            assert_relative_eq!(state[0], (-k * t).exp(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rk4_non_autonomous_exact() {
        let result = solve(Box::new(Quadrature), vec![0.0], TimeGrid::linspace(0.0, 3.0, 4).unwrap(), 3);
        assert_relative_eq!(result.final_state()[0], 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rk4_harmonic_oscillator() {
        let omega = 2.0;
        let result = solve(
            Box::new(HarmonicOscillator { omega }),
            vec![1.0, 0.0],
            TimeGrid::linspace(0.0, std::f64::consts::PI, 5).unwrap(),
            200,
        );

        // One full period
        assert_relative_eq!(result.final_state()[0], 1.0, epsilon = 1e-7);
        assert_relative_eq!(result.final_state()[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rk4_metadata() {
        let result = solve(
            Box::new(ExponentialDecay { decay_rate: 1.0 }),
            vec![1.0],
            TimeGrid::linspace(0.0, 1.0, 3).unwrap(),
            10,
        );
        assert_eq!(result.get_metadata("solver"), Some("Runge Kutta (RK4)"));
        assert_eq!(result.get_metadata("function evaluations"), Some("80"));
        assert_eq!(result.stats().accepted_steps, 20);
    }
}
