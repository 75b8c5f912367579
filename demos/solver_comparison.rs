//! Example: integration methods side by side
//!
//! Solves the moderate outbreak with every method and compares cost and
//! accuracy against a tight-tolerance Dormand-Prince reference. Then makes
//! the death rate very fast (stiff system) and shows the explicit method
//! giving up while SDIRK completes.

use seird_rs::{
    config::{Preset, SimulationConfig},
    model::{Compartment, SeirdModel, SeirdParameters},
    output::visualization::plot_compartment_comparison,
    solver::{SolverConfiguration, SolverMethod, Trajectory},
};

use std::time::Instant;

fn max_relative_difference(a: &Trajectory, b: &Trajectory) -> f64 {
    a.states()
        .iter()
        .zip(b.states())
        .flat_map(|(x, y)| x.iter().zip(y.iter()).map(|(u, v)| (u - v).abs() / v.abs().max(1.0)))
        .fold(0.0, f64::max)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  SEIRD - Solver Comparison");
    println!("═══════════════════════════════════════════════════════\n");

    let config = SimulationConfig::preset(Preset::Moderate)?;
    let model = config.model();
    let grid = config.grid()?;

    // ====== Reference ======

    let reference = model.simulate(
        &config.initial,
        &grid,
        SolverMethod::Dopri5,
        &SolverConfiguration::adaptive(1e-12, 1e-12).with_max_steps(10_000),
    )?;

    // ====== Each method, default configuration ======

    println!("{:<8} {:>10} {:>12} {:>14} {:>12}", "method", "steps", "evaluations", "max rel. diff", "time");

    let mut runs = Vec::new();
    for method in SolverMethod::ALL {
        let start = Instant::now();
        let trajectory = model.simulate(&config.initial, &grid, method, &method.default_configuration())?;
        let elapsed = start.elapsed();

        println!(
            "{:<8} {:>10} {:>12} {:>14.3e} {:>12.2?}",
            method.as_str(),
            trajectory.stats().total_steps(),
            trajectory.stats().function_evaluations,
            max_relative_difference(&trajectory, &reference),
            elapsed
        );
        runs.push((method.as_str(), trajectory));
    }

    let plot_path = std::env::temp_dir().join("seird_solver_comparison.png");
    let labelled: Vec<(&str, &Trajectory)> = runs.iter().map(|(name, t)| (*name, t)).collect();
    plot_compartment_comparison(&labelled, Compartment::Infected, &plot_path, None)?;
    println!("\nPlot: {}\n", plot_path.display());

    // ====== Stiff parameter set ======

    let p = &config.parameters;
    let stiff = SeirdModel::new(SeirdParameters::new(p.population(), p.beta(), p.sigma(), p.gamma(), 1.0e6)?);

    println!("Stiff death rate (mu = 1e6):");
    for method in [SolverMethod::Dopri5, SolverMethod::Sdirk] {
        match stiff.simulate(&config.initial, &grid, method, &method.default_configuration()) {
            Ok(trajectory) => println!(
                "  {:<8} ok, {} steps, final deaths {:.3e}",
                method.as_str(),
                trajectory.stats().total_steps(),
                trajectory.final_state()[Compartment::Dead.index()]
            ),
            Err(e) => println!("  {:<8} {}", method.as_str(), e),
        }
    }

    Ok(())
}
