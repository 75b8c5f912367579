//! SEIRD rate parameters
//!
//! A [`SeirdParameters`] value can only be obtained through validation, so a
//! model holding one never divides by a non-positive population nor runs with
//! a negative rate.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Immutable rate constants for one simulation run
///
/// | Field        | Meaning                                   | Constraint |
/// |--------------|-------------------------------------------|------------|
/// | `population` | N, contact-rate normalizer                | > 0        |
/// | `beta`       | effective contact / transmission rate     | ≥ 0        |
/// | `sigma`      | incubation rate (E → I)                   | ≥ 0        |
/// | `gamma`      | recovery rate (I → R)                     | ≥ 0        |
/// | `mu`         | disease-induced death rate (I → D)        | ≥ 0        |
///
/// All rates are per unit of time (days in the presets). `mu` is the linear
/// death-rate coefficient applied to the Infected compartment.
///
/// # Example
///
/// ```rust
/// use seird_rs::model::SeirdParameters;
///
/// let parameters = SeirdParameters::new(1.0e6, 1.0, 0.5, 0.4, 0.01).unwrap();
/// assert_eq!(parameters.beta(), 1.0);
///
/// assert!(SeirdParameters::new(0.0, 1.0, 0.5, 0.4, 0.01).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterValues", into = "ParameterValues")]
pub struct SeirdParameters {
    population: f64,
    beta: f64,
    sigma: f64,
    gamma: f64,
    mu: f64,
}

impl SeirdParameters {
    /// Create a validated parameter set
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when `population` is not strictly positive or any
    /// rate is negative; every value must be finite.
    pub fn new(population: f64, beta: f64, sigma: f64, gamma: f64, mu: f64) -> Result<Self> {
        if !population.is_finite() || population <= 0.0 {
            return Err(SimulationError::invalid_parameter(
                "population",
                population,
                "must be finite and strictly positive",
            ));
        }

        for (name, value) in [("beta", beta), ("sigma", sigma), ("gamma", gamma), ("mu", mu)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::invalid_parameter(
                    name,
                    value,
                    "rate must be finite and non-negative",
                ));
            }
        }

        Ok(Self { population, beta, sigma, gamma, mu })
    }

    /// Total reference population N
    pub fn population(&self) -> f64 {
        self.population
    }

    /// Transmission rate β
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Incubation rate σ
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Recovery rate γ
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Death rate μ
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Same parameters with a different transmission rate
    pub fn with_beta(&self, beta: f64) -> Result<Self> {
        Self::new(self.population, beta, self.sigma, self.gamma, self.mu)
    }

    /// Named values, in declaration order (used by reports and exports)
    pub fn named_values(&self) -> [(&'static str, f64); 5] {
        [
            ("N", self.population),
            ("beta", self.beta),
            ("sigma", self.sigma),
            ("gamma", self.gamma),
            ("mu", self.mu),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterValues {
    population: f64,
    beta: f64,
    sigma: f64,
    gamma: f64,
    mu: f64,
}

impl TryFrom<ParameterValues> for SeirdParameters {
    type Error = SimulationError;

    fn try_from(v: ParameterValues) -> Result<Self> {
        SeirdParameters::new(v.population, v.beta, v.sigma, v.gamma, v.mu)
    }
}

impl From<SeirdParameters> for ParameterValues {
    fn from(p: SeirdParameters) -> Self {
        Self {
            population: p.population,
            beta: p.beta,
            sigma: p.sigma,
            gamma: p.gamma,
            mu: p.mu,
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
