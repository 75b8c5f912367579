//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - `Solver` trait: a numerical method applied to a [`Scenario`]
//! - `StepControl` enum: adaptive (error-controlled) or fixed substeps
//! - `SolverConfiguration`: the HOW of a run, independent of the model
//! - `SolverMethod`: user-facing selector that maps a name to a `Solver`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimulationError};
use crate::solver::methods::{Dopri5Solver, EulerSolver, RK4Solver, SdirkSolver};
use crate::solver::scenario::Scenario;
use crate::solver::trajectory::Trajectory;

// =================================================================================================
// Defaults
// =================================================================================================

/// Default relative tolerance, √ε of double precision
pub const DEFAULT_RTOL: f64 = 1.49012e-8;

/// Default absolute tolerance
pub const DEFAULT_ATOL: f64 = 1.49012e-8;

/// Default internal step budget between two consecutive output times
pub const DEFAULT_MAX_STEPS: usize = 500;

/// Default number of fixed substeps between two output times
pub const DEFAULT_SUBSTEPS: usize = 10;

// =================================================================================================
// Step Control
// =================================================================================================

/// Settings of an error-controlled integrator
///
/// A step is accepted when the scaled error norm
///
/// ```text
/// sqrt( mean_i ( err_i / (atol + rtol·|y_i|) )² ) ≤ 1
/// ```
///
/// so every component is held to `rtol` relative accuracy, or to `atol`
/// absolute accuracy when it is close to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSettings {
    pub rtol: f64,
    pub atol: f64,

    /// Maximum accepted + rejected steps between two output times
    pub max_steps: usize,

    /// First trial step (automatic when `None`)
    pub initial_step: Option<f64>,

    /// Upper bound on the step size (unbounded when `None`)
    pub max_step: Option<f64>,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            max_steps: DEFAULT_MAX_STEPS,
            initial_step: None,
            max_step: None,
        }
    }
}

/// How the solver chooses its internal steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepControl {
    /// Error-controlled step size
    ///
    /// Used by: Dormand-Prince 5(4), SDIRK 2(1)
    Adaptive(AdaptiveSettings),

    /// Constant number of equal substeps per output interval
    ///
    /// Used by: Forward Euler, RK4
    Fixed { substeps: usize },
}

impl StepControl {
    pub fn name(&self) -> &'static str {
        match self {
            StepControl::Adaptive(_) => "adaptive",
            StepControl::Fixed { .. } => "fixed",
        }
    }
}

// =================================================================================================
// Solver Configuration
// =================================================================================================

/// Configuration for a numerical solver
///
/// # Examples
///
/// ```rust
/// use seird_rs::solver::SolverConfiguration;
///
/// // Tight adaptive tolerances
/// let config = SolverConfiguration::adaptive(1e-10, 1e-10).with_max_steps(5000);
/// assert!(config.validate().is_ok());
///
/// // Fixed substeps for Euler / RK4
/// let config = SolverConfiguration::fixed(100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfiguration {
    pub step_control: StepControl,
}

impl SolverConfiguration {
    pub fn new(step_control: StepControl) -> Self {
        Self { step_control }
    }

    /// Adaptive configuration with default step budget
    pub fn adaptive(rtol: f64, atol: f64) -> Self {
        Self::new(StepControl::Adaptive(AdaptiveSettings {
            rtol,
            atol,
            ..AdaptiveSettings::default()
        }))
    }

    /// Fixed-substep configuration
    pub fn fixed(substeps: usize) -> Self {
        Self::new(StepControl::Fixed { substeps })
    }

    /// Replace the step budget (ignored by fixed-step configurations)
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        if let StepControl::Adaptive(settings) = &mut self.step_control {
            settings.max_steps = max_steps;
        }
        self
    }

    /// Set the first trial step (ignored by fixed-step configurations)
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        if let StepControl::Adaptive(settings) = &mut self.step_control {
            settings.initial_step = Some(initial_step);
        }
        self
    }

    /// Bound the step size (ignored by fixed-step configurations)
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        if let StepControl::Adaptive(settings) = &mut self.step_control {
            settings.max_step = Some(max_step);
        }
        self
    }

    /// Adaptive settings, if this configuration is adaptive
    pub fn adaptive_settings(&self) -> Option<&AdaptiveSettings> {
        match &self.step_control {
            StepControl::Adaptive(settings) => Some(settings),
            StepControl::Fixed { .. } => None,
        }
    }

    /// Validate numerical settings
    pub fn validate(&self) -> Result<()> {
        match &self.step_control {
            StepControl::Adaptive(settings) => {
                for (name, value) in [("rtol", settings.rtol), ("atol", settings.atol)] {
                    if !value.is_finite() || value <= 0.0 {
                        return Err(SimulationError::InvalidConfiguration(format!(
                            "{} must be finite and strictly positive, got {}",
                            name, value
                        )));
                    }
                }
                if settings.max_steps == 0 {
                    return Err(SimulationError::InvalidConfiguration(
                        "max_steps must be greater than 0".to_string(),
                    ));
                }
                for (name, value) in [
                    ("initial_step", settings.initial_step),
                    ("max_step", settings.max_step),
                ] {
                    if let Some(h) = value
                        && (!h.is_finite() || h <= 0.0)
                    {
                        return Err(SimulationError::InvalidConfiguration(format!(
                            "{} must be finite and strictly positive, got {}",
                            name, h
                        )));
                    }
                }
                Ok(())
            }
            StepControl::Fixed { substeps } => {
                if *substeps == 0 {
                    return Err(SimulationError::InvalidConfiguration(
                        "substeps must be greater than 0".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self::adaptive(DEFAULT_RTOL, DEFAULT_ATOL)
    }
}

// =================================================================================================
// Solver Trait
// =================================================================================================

/// Numerical time integrator
///
/// # Contract
///
/// - Validates `config` and `scenario` before any work
/// - Returns exactly one state per time-grid point, the first being the
///   initial state itself
/// - Never returns a partial trajectory: a failure is an `Err`
/// - Stateless: the same solver can be reused for many scenarios
pub trait Solver: Send + Sync {
    /// Integrate `scenario` with the numerical settings of `config`
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<Trajectory>;

    /// Human-readable method name
    fn name(&self) -> &'static str;

    /// Configuration this solver works best with
    fn default_configuration(&self) -> SolverConfiguration;
}

// =================================================================================================
// Solver Method Selector
// =================================================================================================

/// Named choice of integration method
///
/// Parsed from configuration files and the command line
/// (`dopri5`, `sdirk`, `rk4`, `euler`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverMethod {
    /// Dormand-Prince 5(4), adaptive explicit (default)
    #[default]
    Dopri5,

    /// Two-stage L-stable SDIRK 2(1), adaptive implicit, for stiff parameters
    Sdirk,

    /// Classical Runge-Kutta, fixed substeps
    Rk4,

    /// Forward Euler, fixed substeps
    Euler,
}

impl SolverMethod {
    pub const ALL: [SolverMethod; 4] = [
        SolverMethod::Dopri5,
        SolverMethod::Sdirk,
        SolverMethod::Rk4,
        SolverMethod::Euler,
    ];

    /// Instantiate the selected solver
    pub fn solver(self) -> Box<dyn Solver> {
        match self {
            SolverMethod::Dopri5 => Box::new(Dopri5Solver::new()),
            SolverMethod::Sdirk => Box::new(SdirkSolver::new()),
            SolverMethod::Rk4 => Box::new(RK4Solver::new()),
            SolverMethod::Euler => Box::new(EulerSolver::new()),
        }
    }

    /// Configuration the selected solver works best with
    pub fn default_configuration(self) -> SolverConfiguration {
        self.solver().default_configuration()
    }

    pub fn is_adaptive(self) -> bool {
        matches!(self, SolverMethod::Dopri5 | SolverMethod::Sdirk)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverMethod::Dopri5 => "dopri5",
            SolverMethod::Sdirk => "sdirk",
            SolverMethod::Rk4 => "rk4",
            SolverMethod::Euler => "euler",
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dopri5" | "rk45" | "dormand-prince" => Ok(SolverMethod::Dopri5),
            "sdirk" | "implicit" => Ok(SolverMethod::Sdirk),
            "rk4" => Ok(SolverMethod::Rk4),
            "euler" => Ok(SolverMethod::Euler),
            other => Err(format!(
                "unknown solver method '{}' (expected one of: dopri5, sdirk, rk4, euler)",
                other
            )),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_adaptive() {
        let config = SolverConfiguration::default();
        let settings = config.adaptive_settings().unwrap();
        assert_eq!(settings.rtol, DEFAULT_RTOL);
        assert_eq!(settings.atol, DEFAULT_ATOL);
        assert_eq!(settings.max_steps, DEFAULT_MAX_STEPS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = SolverConfiguration::adaptive(1e-6, 1e-9)
            .with_max_steps(42)
            .with_initial_step(0.01)
            .with_max_step(1.0);
        let settings = config.adaptive_settings().unwrap();
        assert_eq!(settings.max_steps, 42);
        assert_eq!(settings.initial_step, Some(0.01));
        assert_eq!(settings.max_step, Some(1.0));

        let fixed = SolverConfiguration::fixed(10).with_max_steps(42);
        assert_eq!(fixed.step_control, StepControl::Fixed { substeps: 10 });
    }

    #[test]
    fn test_invalid_tolerances() {
        assert!(SolverConfiguration::adaptive(0.0, 1e-8).validate().is_err());
        assert!(SolverConfiguration::adaptive(1e-8, -1.0).validate().is_err());
        assert!(SolverConfiguration::adaptive(f64::NAN, 1e-8).validate().is_err());
    }

    #[test]
    fn test_invalid_step_settings() {
        assert!(SolverConfiguration::default().with_max_steps(0).validate().is_err());
        assert!(SolverConfiguration::default().with_initial_step(-1.0).validate().is_err());
        assert!(SolverConfiguration::default().with_max_step(0.0).validate().is_err());
        assert!(SolverConfiguration::fixed(0).validate().is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("dopri5".parse::<SolverMethod>(), Ok(SolverMethod::Dopri5));
        assert_eq!("SDIRK".parse::<SolverMethod>(), Ok(SolverMethod::Sdirk));
        assert_eq!("rk4".parse::<SolverMethod>(), Ok(SolverMethod::Rk4));
        assert_eq!("euler".parse::<SolverMethod>(), Ok(SolverMethod::Euler));
        assert!("lsoda".parse::<SolverMethod>().is_err());
    }

    #[test]
    fn test_method_display_round_trip() {
        for method in SolverMethod::ALL {
            assert_eq!(method.to_string().parse::<SolverMethod>(), Ok(method));
        }
    }

    #[test]
    fn test_method_default_configurations() {
        assert!(SolverMethod::Dopri5.default_configuration().adaptive_settings().is_some());
        assert!(SolverMethod::Sdirk.default_configuration().adaptive_settings().is_some());
        assert!(SolverMethod::Rk4.default_configuration().adaptive_settings().is_none());
        assert!(!SolverMethod::Euler.is_adaptive());
    }

    #[test]
    fn test_method_serde() {
        let json = serde_json::to_string(&SolverMethod::Sdirk).unwrap();
        assert_eq!(json, "\"sdirk\"");
        let back: SolverMethod = serde_json::from_str("\"rk4\"").unwrap();
        assert_eq!(back, SolverMethod::Rk4);
    }
}
