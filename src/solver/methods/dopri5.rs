//! Dormand-Prince 5(4) adaptive solver
//!
//! # Mathematical Background
//!
//! Seven-stage explicit Runge-Kutta pair. The fifth-order solution is
//! propagated, the embedded fourth-order solution provides the local error
//! estimate. The last stage is evaluated at the new point and reused as the
//! first stage of the next step (First Same As Last), so an accepted step
//! costs six function evaluations.
//!
//! ```text
//! 0    |
//! 1/5  | 1/5
//! 3/10 | 3/40        9/40
//! 4/5  | 44/45      -56/15       32/9
//! 8/9  | 19372/6561 -25360/2187  64448/6561 -212/729
//! 1    | 9017/3168  -355/33      46732/5247  49/176  -5103/18656
//! 1    | 35/384      0           500/1113    125/192 -2187/6784   11/84
//! -----+------------------------------------------------------------------
//!      | 35/384      0           500/1113    125/192 -2187/6784   11/84   0
//!      | 5179/57600  0           7571/16695  393/640 -92097/339200 187/2100 1/40
//! ```
//!
//! # Step-Size Control
//!
//! ```text
//! h_new = h · clamp(0.9 · err^(-1/5), 0.2, 10)
//! ```
//!
//! with no growth allowed right after a rejected step.
//!
//! # Dense Output
//!
//! Output times are served by the fourth-order continuous extension of
//! Dormand & Prince (Hairer, Nørsett & Wanner, Solving ODEs I, II.6), so the
//! internal steps never have to land on the grid.

use nalgebra::DVector;

use crate::error::{FailureKind, Result, SimulationError};
use crate::model::OdeModel;
use crate::solver::methods::{error_norm, initial_step, step_underflow};
use crate::solver::trajectory::{SolverStats, Trajectory};
use crate::solver::{
    AdaptiveSettings, Scenario, Solver, SolverConfiguration, StepControl, TimeGrid, validate_state,
    warn_if_negative,
};

// =================================================================================================
// Butcher Tableau
// =================================================================================================

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also the last row of A)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth minus fourth order
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// Continuous extension
const D1: f64 = -12715105075.0 / 11282082432.0;
const D3: f64 = 87487479700.0 / 32700410799.0;
const D4: f64 = -10690763975.0 / 1880347072.0;
const D5: f64 = 701980252875.0 / 199316789632.0;
const D6: f64 = -1453857185.0 / 822651844.0;
const D7: f64 = 69997945.0 / 29380423.0;

// Step-size controller
const SAFETY: f64 = 0.9;
const FAC_MIN: f64 = 0.2;
const FAC_MAX: f64 = 10.0;

// =================================================================================================
// Dense Output
// =================================================================================================

/// Continuous extension of one accepted step
struct DenseOutput {
    r1: DVector<f64>,
    r2: DVector<f64>,
    r3: DVector<f64>,
    r4: DVector<f64>,
    r5: DVector<f64>,
}

impl DenseOutput {
    /// `k` holds the seven stages of the step, `k[6]` being f(t + h, y_new)
    fn new(y: &DVector<f64>, y_new: &DVector<f64>, k: [&DVector<f64>; 7], h: f64) -> Self {
        let r2 = y_new - y;
        let r3 = k[0] * h - &r2;
        let r4 = &r2 - k[6] * h - &r3;
        let r5 = (k[0] * D1 + k[2] * D3 + k[3] * D4 + k[4] * D5 + k[5] * D6 + k[6] * D7) * h;

        Self {
            r1: y.clone(),
            r2,
            r3,
            r4,
            r5,
        }
    }

    /// State at `t + θ·h`, θ ∈ [0, 1]
    fn evaluate(&self, theta: f64) -> DVector<f64> {
        let s1 = 1.0 - theta;
        let inner = &self.r4 + &self.r5 * s1;
        let inner = &self.r3 + inner * theta;
        let inner = &self.r2 + inner * s1;
        &self.r1 + inner * theta
    }
}

// =================================================================================================
// Dopri5 Solver
// =================================================================================================

/// Adaptive Dormand-Prince 5(4) solver (default method)
///
/// # Failure Modes
///
/// - more than `max_steps` steps between two output times
///   (typical of stiff parameter sets, use [`SdirkSolver`](crate::solver::SdirkSolver))
/// - step size below the floating-point resolution of `t`
/// - NaN or infinity in an accepted state
///
/// # Example
///
/// ```rust
/// use seird_rs::model::{Compartments, SeirdModel, SeirdParameters};
/// use seird_rs::solver::{Dopri5Solver, Scenario, Solver, TimeGrid};
///
/// let model = SeirdModel::new(SeirdParameters::new(1000.0, 1.0, 0.5, 0.4, 0.01).unwrap());
/// let y0 = Compartments::new(999.0, 0.0, 1.0, 0.0, 0.0).unwrap().to_state();
/// let scenario = Scenario::new(Box::new(model), y0, TimeGrid::linspace(0.0, 50.0, 51).unwrap());
///
/// let solver = Dopri5Solver::new();
/// let trajectory = solver.solve(&scenario, &solver.default_configuration()).unwrap();
/// assert_eq!(trajectory.len(), 51);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Dopri5Solver;

impl Dopri5Solver {
    pub fn new() -> Self {
        Self
    }

    /// Advance from the first to the last grid time, pushing one state per
    /// remaining grid point into `states`
    fn integrate(
        &self,
        model: &dyn OdeModel,
        grid: &TimeGrid,
        initial: &DVector<f64>,
        settings: &AdaptiveSettings,
        states: &mut Vec<DVector<f64>>,
        stats: &mut SolverStats,
    ) -> Result<()> {
        let labels = model.labels();
        let t_end = grid.end();
        let max_step = settings.max_step.unwrap_or(f64::INFINITY);

        let mut t = grid.start();
        let mut y = initial.clone();
        let mut k1 = model.derivatives(t, &y);
        stats.function_evaluations += 1;

        let mut h = match settings.initial_step {
            Some(h) => h,
            None => initial_step(model, t, &y, &k1, settings, 4, t_end - t, stats),
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

            // ====== Stages ======

            let k2 = model.derivatives(t + C2 * h, &(&y + &k1 * (A21 * h)));
            let k3 = model.derivatives(t + C3 * h, &(&y + (&k1 * A31 + &k2 * A32) * h));
            let k4 = model.derivatives(t + C4 * h, &(&y + (&k1 * A41 + &k2 * A42 + &k3 * A43) * h));
            let k5 = model.derivatives(
                t + C5 * h,
                &(&y + (&k1 * A51 + &k2 * A52 + &k3 * A53 + &k4 * A54) * h),
            );
            let k6 = model.derivatives(
                t + h,
                &(&y + (&k1 * A61 + &k2 * A62 + &k3 * A63 + &k4 * A64 + &k5 * A65) * h),
            );

            let y_new = &y + (&k1 * B1 + &k3 * B3 + &k4 * B4 + &k5 * B5 + &k6 * B6) * h;
            let t_new = if reaches_end { t_end } else { t + h };
            let k7 = model.derivatives(t_new, &y_new);

            stats.function_evaluations += 6;
            steps_in_interval += 1;

            // ====== Error Estimate ======

            let error = (&k1 * E1 + &k3 * E3 + &k4 * E4 + &k5 * E5 + &k6 * E6 + &k7 * E7) * h;
            let err = error_norm(&error, &y, &y_new, settings);

            if err.is_finite() && err <= 1.0 {
                // ====== Accepted ======

                stats.accepted_steps += 1;
                validate_state(&y_new, t_new, self.name())?;

                if grid[next] <= t_new {
                    let dense = DenseOutput::new(&y, &y_new, [&k1, &k2, &k3, &k4, &k5, &k6, &k7], h);

                    while next < grid.len() && grid[next] <= t_new {
                        let t_out = grid[next];
                        let y_out = if t_out == t_new {
                            y_new.clone()
                        } else {
                            dense.evaluate((t_out - t) / h)
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
                    (SAFETY * err.powf(-0.2)).clamp(FAC_MIN, FAC_MAX)
                };
                if last_rejected {
                    factor = factor.min(1.0);
                }

                t = t_new;
                y = y_new;
                k1 = k7;
                h *= factor;
                last_rejected = false;
            } else {
                // ====== Rejected ======

                stats.rejected_steps += 1;
                let factor = if err.is_finite() {
                    (SAFETY * err.powf(-0.2)).clamp(FAC_MIN, 1.0)
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

impl Solver for Dopri5Solver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<Trajectory> {
        // ====== Step 1: Validation ======

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

        // ====== Step 2: Integration ======

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
            "{}: {} accepted / {} rejected steps, {} evaluations",
            self.name(),
            stats.accepted_steps,
            stats.rejected_steps,
            stats.function_evaluations
        );

        // ====== Step 3: Build Result ======

        let mut trajectory = Trajectory::new(grid.points().to_vec(), states, scenario.model.labels(), stats);
        trajectory.add_metadata("solver", self.name());
        trajectory.add_metadata("model", scenario.model_name());
        trajectory.add_metadata("rtol", &format!("{:e}", settings.rtol));
        trajectory.add_metadata("atol", &format!("{:e}", settings.atol));
        trajectory.add_metadata("accepted steps", &stats.accepted_steps.to_string());
        trajectory.add_metadata("rejected steps", &stats.rejected_steps.to_string());
        trajectory.add_metadata("function evaluations", &stats.function_evaluations.to_string());

        Ok(trajectory)
    }

    fn name(&self) -> &'static str {
        "Dormand-Prince 5(4)"
    }

    fn default_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::default()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
