//! Text summary of one simulation run
//!
//! ```rust
//! use seird_rs::config::{Preset, SimulationConfig};
//! use seird_rs::output::RunReport;
//!
//! let config = SimulationConfig::preset(Preset::Moderate).unwrap();
//! let trajectory = config.run().unwrap();
//! let report = RunReport::new(&config.name, &config.parameters, &trajectory).unwrap();
//!
//! let text = report.to_string();
//! assert!(text.contains("R0"));
//! assert!(text.contains("Peak infected"));
//! ```

use std::fmt;

use crate::error::Result;
use crate::model::{Compartment, Compartments, DerivedStatistics, SeirdParameters};
use crate::solver::{SolverStats, Trajectory};

/// Headline numbers of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub name: String,
    pub solver: String,
    pub parameters: SeirdParameters,

    /// Error kept as-is when R0 or the threshold is undefined
    pub statistics: Result<DerivedStatistics>,

    /// `(time, value)` of the largest Infected value
    pub peak_infected: (f64, f64),

    pub initial: Compartments,
    pub final_time: f64,
    pub final_state: Compartments,

    /// Relative drift of the total population
    pub conservation_drift: f64,

    pub stats: SolverStats,
}

impl RunReport {
    /// Summarize a SEIRD trajectory
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when the trajectory does not have five components.
    pub fn new(name: &str, parameters: &SeirdParameters, trajectory: &Trajectory) -> Result<Self> {
        let initial = trajectory.compartments_at(0)?;
        let final_state = trajectory.compartments_at(trajectory.len() - 1)?;

        Ok(Self {
            name: name.to_string(),
            solver: trajectory.get_metadata("solver").unwrap_or("unknown").to_string(),
            parameters: *parameters,
            statistics: DerivedStatistics::from_parameters(parameters),
            peak_infected: trajectory.peak(Compartment::Infected.index()),
            initial,
            final_time: trajectory.final_time(),
            final_state,
            conservation_drift: trajectory.max_relative_conservation_drift(),
            stats: *trajectory.stats(),
        })
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.name)?;
        writeln!(f)?;

        writeln!(f, "Parameters")?;
        for (name, value) in self.parameters.named_values() {
            writeln!(f, "  {:<11}: {}", name, value)?;
        }
        writeln!(f)?;

        writeln!(f, "Derived statistics")?;
        match &self.statistics {
            Ok(statistics) => {
                for line in statistics.to_string().lines() {
                    writeln!(f, "  {}", line)?;
                }
            }
            Err(e) => writeln!(f, "  {}", e)?,
        }
        writeln!(f)?;

        let (peak_time, peak_value) = self.peak_infected;
        writeln!(f, "Peak infected : {:.6e} at t = {:.2}", peak_value, peak_time)?;
        writeln!(f)?;

        writeln!(f, "{:<12} {:>16} {:>16}", "Compartment", "initial", format!("t = {:.2}", self.final_time))?;
        for compartment in Compartment::ALL {
            writeln!(
                f,
                "{:<12} {:>16.6e} {:>16.6e}",
                compartment.label(),
                self.initial[compartment],
                self.final_state[compartment]
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Solver        : {}", self.solver)?;
        writeln!(
            f,
            "Steps         : {} accepted, {} rejected",
            self.stats.accepted_steps, self.stats.rejected_steps
        )?;
        writeln!(f, "Evaluations   : {}", self.stats.function_evaluations)?;
        if self.stats.lu_decompositions > 0 {
            writeln!(f, "LU factors    : {}", self.stats.lu_decompositions)?;
        }
        write!(f, "Total drift   : {:.3e} (relative)", self.conservation_drift)
    }
}
