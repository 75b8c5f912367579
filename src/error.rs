//! Error types for simulation runs
//!
//! Every failure of the computational core is reported through
//! [`SimulationError`]. The three families follow the life of a run:
//!
//! - **before integration**: [`SimulationError::InvalidParameter`] and
//!   [`SimulationError::InvalidConfiguration`] (preconditions)
//! - **during integration**: [`SimulationError::IntegrationFailure`]
//! - **after integration**: [`SimulationError::DegenerateStatistics`]
//!
//! The core never retries and never returns a partial trajectory.

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the computational core
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors raised by model construction, integration and statistics
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A parameter, initial value or time grid violates its precondition
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    /// Solver settings are inconsistent or cannot be loaded
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The integrator could not honour its error tolerance
    #[error("{solver} failed at t = {time:.6e}: {kind}")]
    IntegrationFailure {
        solver: String,
        kind: FailureKind,
        time: f64,
    },

    /// A derived statistic is mathematically undefined for these parameters
    #[error("degenerate statistics: {0}")]
    DegenerateStatistics(String),
}

impl SimulationError {
    /// Shorthand for [`SimulationError::InvalidParameter`]
    pub fn invalid_parameter(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`SimulationError::IntegrationFailure`]
    pub fn integration_failure(solver: &str, kind: FailureKind, time: f64) -> Self {
        Self::IntegrationFailure {
            solver: solver.to_string(),
            kind,
            time,
        }
    }

    /// True for [`SimulationError::IntegrationFailure`]
    pub fn is_integration_failure(&self) -> bool {
        matches!(self, Self::IntegrationFailure { .. })
    }
}

/// Reason an integration was abandoned
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// Internal step budget between two grid points exhausted
    MaxStepsExceeded { max_steps: usize },

    /// Step size fell below the resolution of the time variable
    StepSizeUnderflow { step: f64 },

    /// NaN or infinity appeared in the state
    NonFiniteState { component: usize },

    /// Newton iteration matrix of an implicit method could not be factored
    SingularMatrix,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MaxStepsExceeded { max_steps } => write!(
                f,
                "more than {} internal steps between two output times (problem may be stiff)",
                max_steps
            ),
            FailureKind::StepSizeUnderflow { step } => {
                write!(f, "step size {:.3e} too small for the time resolution", step)
            }
            FailureKind::NonFiniteState { component } => {
                write!(f, "non-finite value in state component {}", component)
            }
            FailureKind::SingularMatrix => write!(f, "singular Newton iteration matrix"),
        }
    }
}
