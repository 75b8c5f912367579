//! Visualization of simulation results with the `plotters` library
//!
//! # Organization
//!
//! - **config**: Shared plot configuration (`PlotConfig`)
//! - **epidemic_curve**: Compartment sizes against time
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seird_rs::output::visualization::{plot_trajectory, PlotConfig};
//!
//! let trajectory = model.simulate(&initial, &grid, SolverMethod::Dopri5, &config)?;
//!
//! // Default configuration
//! plot_trajectory(&trajectory, "outbreak.png", None)?;
//!
//! // Custom title, vector output
//! let config = PlotConfig::epidemic_curve("Moderate outbreak");
//! plot_trajectory(&trajectory, "outbreak.svg", Some(&config))?;
//! ```
//!
//! | Use Case | Function |
//! |----------|----------|
//! | All compartments of one run | `plot_trajectory` |
//! | One compartment across runs | `plot_compartment_comparison` |

pub mod config;
pub mod epidemic_curve;

pub use config::PlotConfig;
pub use epidemic_curve::{plot_compartment_comparison, plot_trajectory};
