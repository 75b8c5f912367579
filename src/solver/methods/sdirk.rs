//! SDIRK 2(1) adaptive implicit solver
//!
//! # Mathematical Background
//!
//! Two-stage, stiffly accurate, L-stable singly diagonally implicit
//! Runge-Kutta method (Alexander, 1977):
//!
//! ```text
//! γ | γ      0
//! 1 | 1 - γ  γ          γ = 1 - 1/√2
//! --+-----------
//!   | 1 - γ  γ          (order 2)
//!   | 1      0          (order 1, embedded)
//! ```
//!
//! Each stage solves `k = f(t_s, base + h·γ·k)` with a simplified Newton
//! iteration on the matrix `M = I - h·γ·J`, factored once per step (LU with
//! partial pivoting from nalgebra). Both stages share the same `M`.
//!
//! # Error Estimate
//!
//! The raw difference `h·γ·(k₂ - k₁)` is filtered through `M⁻¹`, which
//! damps the stiff components and keeps the estimate meaningful when
//! `h·|λ|` is large.
//!
//! # When to Use
//!
//! - Stiff parameter sets: recovery or death rates many orders of magnitude
//!   faster than transmission (Dormand-Prince would exhaust its step budget)
//!
//! # When NOT to Use
//!
//! - Tight tolerances on non-stiff problems: second order needs many more
//!   steps than the fifth-order Dormand-Prince pair

use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{FailureKind, Result, SimulationError};
use crate::model::OdeModel;
use crate::solver::methods::{error_norm, initial_step, scaled_norm, step_underflow};
use crate::solver::trajectory::{SolverStats, Trajectory};
use crate::solver::{
    AdaptiveSettings, Scenario, Solver, SolverConfiguration, StepControl, TimeGrid, validate_state,
    warn_if_negative,
};

const GAMMA: f64 = 1.0 - FRAC_1_SQRT_2;

const NEWTON_MAX_ITERATIONS: usize = 7;

/// Newton stops when the scaled state increment falls below this
const NEWTON_TOLERANCE: f64 = 0.03;

const SAFETY: f64 = 0.9;
const FAC_MIN: f64 = 0.2;
const FAC_MAX: f64 = 5.0;

// =================================================================================================
// Hermite Interpolation
// =================================================================================================

/// Cubic Hermite interpolant on `[t, t + h]` from values and slopes at both ends
fn hermite(
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    y1: &DVector<f64>,
    f1: &DVector<f64>,
    h: f64,
    theta: f64,
) -> DVector<f64> {
    let t2 = theta * theta;
    let t3 = t2 * theta;

    // h00 = 1 - h01, folded into the increment so constant states stay exact
    let h10 = t3 - 2.0 * t2 + theta;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    y0 + (y1 - y0) * h01 + f0 * (h10 * h) + f1 * (h11 * h)
}

// =================================================================================================
// SDIRK Solver
// =================================================================================================

/// Adaptive L-stable SDIRK 2(1) solver for stiff problems
///
/// Uses the model's [`jacobian`](OdeModel::jacobian), so models with a
/// closed-form Jacobian (such as [`SeirdModel`](crate::model::SeirdModel))
/// avoid finite differences.
///
/// # Example
///
/// ```rust
/// use seird_rs::solver::{SdirkSolver, Solver};
///
/// let solver = SdirkSolver::new();
/// assert_eq!(solver.name(), "SDIRK 2(1)");
/// assert!(solver.default_configuration().adaptive_settings().is_some());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SdirkSolver;

enum StageOutcome {
    Converged(DVector<f64>),
    Diverged,
}

impl SdirkSolver {
    pub fn new() -> Self {
        Self
    }

    /// Solve `k = f(t_stage, base + hγ·k)` by simplified Newton iteration
    #[allow(clippy::too_many_arguments)]
    fn solve_stage(
        &self,
        model: &dyn OdeModel,
        lu: &LU<f64, Dyn, Dyn>,
        t_stage: f64,
        base: &DVector<f64>,
        h_gamma: f64,
        guess: DVector<f64>,
        settings: &AdaptiveSettings,
        stats: &mut SolverStats,
    ) -> Result<StageOutcome> {
        let mut k = guess;

        for _ in 0..NEWTON_MAX_ITERATIONS {
            let residual = model.derivatives(t_stage, &(base + &k * h_gamma)) - &k;
            stats.function_evaluations += 1;

            let delta = lu.solve(&residual).ok_or_else(|| {
                SimulationError::integration_failure(self.name(), FailureKind::SingularMatrix, t_stage)
            })?;
            k += &delta;

            if k.iter().any(|v| !v.is_finite()) {
                return Ok(StageOutcome::Diverged);
            }

            if scaled_norm(&(&delta * h_gamma), base, settings) <= NEWTON_TOLERANCE {
                return Ok(StageOutcome::Converged(k));
            }
        }

        Ok(StageOutcome::Diverged)
    }

    fn integrate(
        &self,
        model: &dyn OdeModel,
        grid: &TimeGrid,
        initial: &DVector<f64>,
        settings: &AdaptiveSettings,
        states: &mut Vec<DVector<f64>>,
        stats: &mut SolverStats,
    ) -> Result<()> {
        let n = model.dimension();
        let labels = model.labels();
        let t_end = grid.end();
        let max_step = settings.max_step.unwrap_or(f64::INFINITY);

        let mut t = grid.start();
        let mut y = initial.clone();
        let mut f0 = model.derivatives(t, &y);
        stats.function_evaluations += 1;

        let mut h = match settings.initial_step {
            Some(h) => h,
            None => initial_step(model, t, &y, &f0, settings, 1, t_end - t, stats),
        };

        let mut next = 1;
        let mut steps_in_interval = 0;
        let mut last_rejected = false;
        let mut warned = false;

        while next < grid.len() {
            if steps_in_interval >= settings.max_steps {
                return Err(SimulationError::integration_failure(
                    self.name(),
                    FailureKind::MaxStepsExceeded {
                        max_steps: settings.max_steps,
                    },
                    t,
                ));
            }

            h = h.min(max_step);
            let remaining = t_end - t;
            let reaches_end = h >= remaining;
            if reaches_end {
                h = remaining;
            }

            if step_underflow(t, h) {
                return Err(SimulationError::integration_failure(
                    self.name(),
                    FailureKind::StepSizeUnderflow { step: h },
                    t,
                ));
            }

            steps_in_interval += 1;
            let h_gamma = h * GAMMA;

            // ====== Newton Matrix ======

            let jacobian = model.jacobian(t, &y);
            stats.jacobian_evaluations += 1;
            let lu = (DMatrix::identity(n, n) - jacobian * h_gamma).lu();
            stats.lu_decompositions += 1;

            // ====== Stage 1 ======

            let k1 = match self.solve_stage(model, &lu, t + h_gamma, &y, h_gamma, f0.clone(), settings, stats)? {
                StageOutcome::Converged(k) => k,
                StageOutcome::Diverged => {
                    stats.rejected_steps += 1;
                    h *= 0.5;
                    last_rejected = true;
                    continue;
                }
            };

            // ====== Stage 2 ======

            let base = &y + &k1 * (h * (1.0 - GAMMA));
            let t_new = if reaches_end { t_end } else { t + h };
            let k2 = match self.solve_stage(model, &lu, t_new, &base, h_gamma, k1.clone(), settings, stats)? {
                StageOutcome::Converged(k) => k,
                StageOutcome::Diverged => {
                    stats.rejected_steps += 1;
                    h *= 0.5;
                    last_rejected = true;
                    continue;
                }
            };

            // Stiffly accurate: the solution is the last stage value
            let y_new = &base + &k2 * h_gamma;

            // ====== Error Estimate ======

            let raw_error = (&k2 - &k1) * h_gamma;
            let error = lu.solve(&raw_error).unwrap_or(raw_error);
            let err = error_norm(&error, &y, &y_new, settings);

            if err.is_finite() && err <= 1.0 {
                // ====== Accepted ======

                stats.accepted_steps += 1;
                validate_state(&y_new, t_new, self.name())?;

                let f_new = model.derivatives(t_new, &y_new);
                stats.function_evaluations += 1;

                if grid[next] <= t_new {
                    while next < grid.len() && grid[next] <= t_new {
                        let t_out = grid[next];
                        let y_out = if t_out == t_new {
                            y_new.clone()
                        } else {
                            hermite(&y, &f0, &y_new, &f_new, h, (t_out - t) / h)
                        };

                        warn_if_negative(&y_out, t_out, &labels, &mut warned);
                        states.push(y_out);
                        next += 1;
                    }
                    steps_in_interval = 0;
                }

                let mut factor = if err == 0.0 {
                    FAC_MAX
                } else {
                    (SAFETY * err.powf(-0.5)).clamp(FAC_MIN, FAC_MAX)
                };
                if last_rejected {
                    factor = factor.min(1.0);
                }

                t = t_new;
                y = y_new;
                f0 = f_new;
                h *= factor;
                last_rejected = false;
            } else {
                // ====== Rejected ======

                stats.rejected_steps += 1;
                let factor = if err.is_finite() {
                    (SAFETY * err.powf(-0.5)).clamp(FAC_MIN, 1.0)
                } else {
                    FAC_MIN
                };
                h *= factor;
                last_rejected = true;
            }
        }

        Ok(())
    }
}

impl Solver for SdirkSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<Trajectory> {
        config.validate()?;
        scenario.validate()?;

        let settings = match &config.step_control {
            StepControl::Adaptive(settings) => *settings,
            other => {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{} requires an adaptive configuration, got {}",
                    self.name(),
                    other.name()
                )));
            }
        };

        let grid = &scenario.grid;
        let mut states = Vec::with_capacity(grid.len());
        states.push(scenario.initial_state.clone());

        let mut stats = SolverStats::default();
        if grid.len() > 1 {
            self.integrate(
                scenario.model.as_ref(),
                grid,
                &scenario.initial_state,
                &settings,
                &mut states,
                &mut stats,
            )?;
        }

        log::debug!(
            "{}: {} accepted / {} rejected steps, {} evaluations, {} Jacobians",
            self.name(),
            stats.accepted_steps,
            stats.rejected_steps,
            stats.function_evaluations,
            stats.jacobian_evaluations
        );

        let mut trajectory = Trajectory::new(grid.points().to_vec(), states, scenario.model.labels(), stats);
        trajectory.add_metadata("solver", self.name());
        trajectory.add_metadata("model", scenario.model_name());
        trajectory.add_metadata("rtol", &format!("{:e}", settings.rtol));
        trajectory.add_metadata("atol", &format!("{:e}", settings.atol));
        trajectory.add_metadata("accepted steps", &stats.accepted_steps.to_string());
        trajectory.add_metadata("rejected steps", &stats.rejected_steps.to_string());
        trajectory.add_metadata("jacobian evaluations", &stats.jacobian_evaluations.to_string());

        Ok(trajectory)
    }

    fn name(&self) -> &'static str {
        "SDIRK 2(1)"
    }

    fn default_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::adaptive(1e-6, 1e-6).with_max_steps(5000)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Dopri5Solver;
    use approx::assert_relative_eq;

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

    /// dy/dt = -λ (y - cos t): stiff, solution stays close to cos t
    struct StiffTracking {
        lambda: f64,
    }

    impl OdeModel for StiffTracking {
        fn dimension(&self) -> usize {
            1
        }

        fn derivatives(&self, t: f64, state: &DVector<f64>) -> DVector<f64> {
            DVector::from_element(1, -self.lambda * (state[0] - t.cos()))
        }

        fn jacobian(&self, _t: f64, _state: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_element(1, 1, -self.lambda)
        }

        fn name(&self) -> &str {
            "Stiff Tracking"
        }
    }

    #[test]
    fn test_hermite_reproduces_cubic() {
        // y = t³ on [1, 2]
        let y0 = DVector::from_element(1, 1.0);
        let f0 = DVector::from_element(1, 3.0);
        let y1 = DVector::from_element(1, 8.0);
        let f1 = DVector::from_element(1, 12.0);

        let mid = hermite(&y0, &f0, &y1, &f1, 1.0, 0.5);
        assert_relative_eq!(mid[0], 1.5_f64.powi(3), epsilon = 1e-12);
    }

    #[test]
    fn test_sdirk_exponential_decay() {
        let k = 0.5;
        let scenario = Scenario::new(
            Box::new(ExponentialDecay { decay_rate: k }),
            DVector::from_vec(vec![1.0]),
            TimeGrid::linspace(0.0, 5.0, 51).unwrap(),
        );
        let config = SolverConfiguration::adaptive(1e-8, 1e-8).with_max_steps(5000);
        let result = SdirkSolver::new().solve(&scenario, &config).unwrap();

        for (t, state) in result.iter() {
            assert_relative_eq!(state[0], (-k * t).exp(), epsilon = 1e-5);
        }
        assert_eq!(result.stats().jacobian_evaluations, result.stats().lu_decompositions);
    }

    #[test]
    fn test_sdirk_handles_stiff_problem() {
        let grid = TimeGrid::linspace(0.0, 2.0, 21).unwrap();
        let config = SolverConfiguration::adaptive(1e-5, 1e-5).with_max_step(0.05);

        let stiff = || {
            Scenario::new(
                Box::new(StiffTracking { lambda: 1.0e6 }),
                DVector::from_vec(vec![1.0]),
                grid.clone(),
            )
        };

        let result = SdirkSolver::new().solve(&stiff(), &config).unwrap();
        for (t, state) in result.iter() {
            assert!((state[0] - t.cos()).abs() < 1e-3, "t = {t}, y = {}", state[0]);
        }

        // The explicit pair cannot take steps longer than its stability limit
        let err = Dopri5Solver::new().solve(&stiff(), &config).unwrap_err();
        assert!(err.is_integration_failure());
    }

    #[test]
    fn test_sdirk_rejects_fixed_configuration() {
        let scenario = Scenario::new(
            Box::new(ExponentialDecay { decay_rate: 1.0 }),
            DVector::from_vec(vec![1.0]),
            TimeGrid::linspace(0.0, 1.0, 2).unwrap(),
        );
        let err = SdirkSolver::new()
            .solve(&scenario, &SolverConfiguration::fixed(4))
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_sdirk_metadata() {
        let scenario = Scenario::new(
            Box::new(ExponentialDecay { decay_rate: 1.0 }),
            DVector::from_vec(vec![1.0]),
            TimeGrid::linspace(0.0, 1.0, 5).unwrap(),
        );
        let solver = SdirkSolver::new();
        let result = solver.solve(&scenario, &solver.default_configuration()).unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result.get_metadata("solver"), Some("SDIRK 2(1)"));
        assert!(result.stats().jacobian_evaluations > 0);
    }
}
