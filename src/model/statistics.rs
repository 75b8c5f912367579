//! Derived epidemiological statistics
//!
//! Closed-form quantities computed from the parameters alone, without
//! integrating the model.

use serde::Serialize;
use std::fmt;

use crate::error::{Result, SimulationError};
use crate::model::parameters::SeirdParameters;

/// Statistics derived from a [`SeirdParameters`] set
///
/// - `r0 = β / γ` (basic reproduction number)
/// - `herd_immunity_threshold = 1 - 1 / R0`
///
/// The threshold is negative when R0 < 1: no immunity is needed for the
/// outbreak to die out. It is reported as computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedStatistics {
    /// Basic reproduction number β/γ
    pub r0: f64,

    /// Fraction of the population that must be immune, 1 - 1/R0
    pub herd_immunity_threshold: f64,

    /// Fraction of infectious cases ending in death, μ/(γ + μ)
    pub infection_fatality_ratio: Option<f64>,

    /// Mean time spent in E, 1/σ
    pub mean_incubation_period: Option<f64>,

    /// Mean time spent in I, 1/(γ + μ)
    pub mean_infectious_period: Option<f64>,
}

impl DerivedStatistics {
    /// Compute the statistics for `parameters`
    ///
    /// # Errors
    ///
    /// `DegenerateStatistics` when γ = 0 (R0 undefined) or β = 0
    /// (R0 = 0, threshold undefined).
    ///
    /// # Example
    ///
    /// ```rust
    /// use seird_rs::model::{DerivedStatistics, SeirdParameters};
    ///
    /// let p = SeirdParameters::new(1000.0, 1.0, 0.5, 0.4, 0.01).unwrap();
    /// let stats = DerivedStatistics::from_parameters(&p).unwrap();
    /// assert_eq!(stats.r0, 2.5);
    /// ```
    pub fn from_parameters(parameters: &SeirdParameters) -> Result<Self> {
        let (beta, sigma, gamma, mu) = (
            parameters.beta(),
            parameters.sigma(),
            parameters.gamma(),
            parameters.mu(),
        );

        if gamma == 0.0 {
            return Err(SimulationError::DegenerateStatistics(
                "R0 = beta / gamma is undefined for gamma = 0".to_string(),
            ));
        }

        let r0 = beta / gamma;
        if r0 == 0.0 {
            return Err(SimulationError::DegenerateStatistics(
                "herd immunity threshold 1 - 1/R0 is undefined for R0 = 0 (beta = 0)".to_string(),
            ));
        }

        let removal = gamma + mu;

        Ok(Self {
            r0,
            herd_immunity_threshold: 1.0 - 1.0 / r0,
            infection_fatality_ratio: Some(mu / removal),
            mean_incubation_period: (sigma > 0.0).then(|| 1.0 / sigma),
            mean_infectious_period: Some(1.0 / removal),
        })
    }
}

impl fmt::Display for DerivedStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R0                       : {:.4}", self.r0)?;
        writeln!(f, "Herd immunity threshold  : {:.2} %", 100.0 * self.herd_immunity_threshold)?;

        let optional = |value: Option<f64>, scale: f64| match value {
            Some(v) => format!("{:.4}", v * scale),
            None => "undefined".to_string(),
        };

        writeln!(f, "Infection fatality ratio : {} %", optional(self.infection_fatality_ratio, 100.0))?;
        writeln!(f, "Mean incubation period   : {}", optional(self.mean_incubation_period, 1.0))?;
        write!(f, "Mean infectious period   : {}", optional(self.mean_infectious_period, 1.0))
    }
}
