//! Example: contact-rate sweep
//!
//! Varies beta around the moderate outbreak (gamma = 0.4, so R0 from 0.5 to
//! 5) and reports peak size, peak time and final deaths for each value.
//! Runs are spread over all cores with the `parallel` feature.

use seird_rs::{
    config::{Preset, SimulationConfig},
    model::Compartment,
    output::visualization::{PlotConfig, plot_compartment_comparison},
    sweep::{beta_sweep, run_sweep, summarize},
};

use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  SEIRD - R0 Sweep");
    println!("═══════════════════════════════════════════════════════\n");

    let config = SimulationConfig::preset(Preset::Moderate)?;
    let grid = config.grid()?;
    let solver_config = config.solver_configuration()?;

    let betas: Vec<f64> = (1..=10).map(|i| 0.2 * i as f64).collect();
    let sets = beta_sweep(&config.parameters, &betas)?;

    let start = Instant::now();
    let results = run_sweep(&sets, &config.initial, &grid, config.solver.method, &solver_config);
    println!("{} runs in {:.2?}\n", results.len(), start.elapsed());

    println!("{:>6} {:>8} {:>12} {:>14} {:>14}", "beta", "R0", "peak day", "peak infected", "final dead");
    for summary in summarize(&sets, &results) {
        let r0 = summary.r0.map_or("-".to_string(), |r| format!("{r:.2}"));
        println!(
            "{:>6.2} {:>8} {:>12.1} {:>14.4e} {:>14.4e}",
            summary.beta, r0, summary.peak_time, summary.peak_infected, summary.final_dead
        );
    }
    for (beta, result) in betas.iter().zip(&results) {
        if let Err(e) = result {
            println!("beta = {beta}: {e}");
        }
    }

    // ====== Infected curves ======

    let labels: Vec<String> = betas.iter().map(|b| format!("beta = {b:.1}")).collect();
    let runs: Vec<_> = labels
        .iter()
        .zip(&results)
        .filter_map(|(label, result)| result.as_ref().ok().map(|t| (label.as_str(), t)))
        .collect();

    let plot_path = std::env::temp_dir().join("seird_r0_sweep.svg");
    plot_compartment_comparison(
        &runs,
        Compartment::Infected,
        &plot_path,
        Some(&PlotConfig::epidemic_curve("Infected for increasing contact rate")),
    )?;
    println!("\nPlot: {}", plot_path.display());

    Ok(())
}
