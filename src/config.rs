//! Run configuration
//!
//! A [`SimulationConfig`] bundles everything a single run needs: the rate
//! parameters, the initial compartments, the output grid and the solver
//! settings. It is read from JSON files (serde) or built from one of the
//! reference [`Preset`]s.
//!
//! # JSON layout
//!
//! ```json
//! {
//!   "name": "moderate outbreak",
//!   "parameters": { "population": 1e6, "beta": 1.0, "sigma": 0.5, "gamma": 0.4, "mu": 0.01 },
//!   "initial":    { "susceptible": 999999.0, "infected": 1.0 },
//!   "time":       { "start": 0.0, "end": 200.0, "points": 200 },
//!   "solver":     { "method": "dopri5", "rtol": 1e-8 }
//! }
//! ```
//!
//! `name` and `solver` are optional, as are the `exposed`, `recovered` and
//! `dead` initial values (zero). Parameters and compartments are validated
//! while deserializing, so an invalid file never produces a config.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, SimulationError};
use crate::model::{Compartments, SeirdModel, SeirdParameters};
use crate::solver::{SolverConfiguration, SolverMethod, StepControl, TimeGrid, Trajectory};

// =================================================================================================
// Time Span
// =================================================================================================

/// Output time span: `points` evenly spaced times from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64, points: usize) -> Self {
        Self { start, end, points }
    }

    /// Build the output grid
    pub fn grid(&self) -> Result<TimeGrid> {
        TimeGrid::linspace(self.start, self.end, self.points)
    }
}

// =================================================================================================
// Solver Settings
// =================================================================================================

/// Method choice plus optional overrides of its default configuration
///
/// Tolerance overrides only apply to adaptive methods, `substeps` only to
/// fixed-step methods; an override that does not apply is ignored with a
/// warning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub method: SolverMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substeps: Option<usize>,
}

impl SolverSettings {
    pub fn new(method: SolverMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Resolve into a validated [`SolverConfiguration`]
    pub fn configuration(&self) -> Result<SolverConfiguration> {
        let mut config = self.method.default_configuration();

        match &mut config.step_control {
            StepControl::Adaptive(settings) => {
                if let Some(rtol) = self.rtol {
                    settings.rtol = rtol;
                }
                if let Some(atol) = self.atol {
                    settings.atol = atol;
                }
                if let Some(max_steps) = self.max_steps {
                    settings.max_steps = max_steps;
                }
                if self.substeps.is_some() {
                    log::warn!("`substeps` ignored: {} is adaptive", self.method);
                }
            }
            StepControl::Fixed { substeps } => {
                if let Some(n) = self.substeps {
                    *substeps = n;
                }
                if self.rtol.is_some() || self.atol.is_some() || self.max_steps.is_some() {
                    log::warn!("tolerance settings ignored: {} uses fixed steps", self.method);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

// =================================================================================================
// Presets
// =================================================================================================

/// Reference parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Global-scale outbreak: N = 8e9, beta = 8, sigma = 0.1, gamma = 0.05, mu = 1
    #[default]
    World,

    /// Moderate outbreak: beta = 1, sigma = 0.5, gamma = 0.4, mu = 0.01 (R0 = 2.5)
    Moderate,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::World, Preset::Moderate];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::World => "world",
            Preset::Moderate => "moderate",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::World => "global-scale outbreak, one initial case in 8 billion",
            Preset::Moderate => "moderate outbreak with R0 = 2.5",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "world" => Ok(Preset::World),
            "moderate" => Ok(Preset::Moderate),
            other => Err(format!("unknown preset '{other}' (expected world or moderate)")),
        }
    }
}

// =================================================================================================
// Simulation Configuration
// =================================================================================================

fn default_name() -> String {
    "SEIRD run".to_string()
}

/// Complete description of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub parameters: SeirdParameters,
    pub initial: Compartments,
    pub time: TimeSpan,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl SimulationConfig {
    /// Build one of the reference scenarios
    pub fn preset(preset: Preset) -> Result<Self> {
        const POPULATION: f64 = 8.0e9;

        let (parameters, susceptible_fraction) = match preset {
            Preset::World => (SeirdParameters::new(POPULATION, 8.0, 0.1, 0.05, 1.0)?, 0.99),
            Preset::Moderate => (SeirdParameters::new(POPULATION, 1.0, 0.5, 0.4, 0.01)?, 0.9999),
        };
        let initial = Compartments::new(susceptible_fraction * POPULATION - 1.0, 0.0, 1.0, 0.0, 0.0)?;

        Ok(Self {
            name: format!("{preset} preset"),
            parameters,
            initial,
            time: TimeSpan::new(0.0, 200.0, 200),
            solver: SolverSettings::default(),
        })
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::InvalidConfiguration(format!("invalid run configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SimulationError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        log::debug!("loaded run configuration from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::InvalidConfiguration(format!("cannot serialize configuration: {e}")))
    }

    /// Check the pieces serde cannot check on its own (grid and solver settings)
    pub fn validate(&self) -> Result<()> {
        self.grid()?;
        self.solver_configuration()?;
        Ok(())
    }

    pub fn model(&self) -> SeirdModel {
        SeirdModel::new(self.parameters)
    }

    pub fn grid(&self) -> Result<TimeGrid> {
        self.time.grid()
    }

    pub fn solver_configuration(&self) -> Result<SolverConfiguration> {
        self.solver.configuration()
    }

    /// Integrate the configured scenario
    pub fn run(&self) -> Result<Trajectory> {
        let grid = self.grid()?;
        let config = self.solver_configuration()?;

        log::info!(
            "running '{}' with {} over [{}, {}] ({} points)",
            self.name,
            self.solver.method,
            grid.start(),
            grid.end(),
            grid.len()
        );

        self.model().simulate(&self.initial, &grid, self.solver.method, &config)
    }
}
