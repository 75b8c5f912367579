//! Example: the two reference outbreaks
//!
//! Runs the `world` and `moderate` presets with the default adaptive method,
//! prints the run reports and writes one CSV and one epidemic curve per
//! scenario to the system temporary directory.
//!
//! - **world**: N = 8e9, beta = 8, sigma = 0.1, gamma = 0.05, mu = 1 (R0 = 160)
//! - **moderate**: same population, beta = 1, sigma = 0.5, gamma = 0.4, mu = 0.01 (R0 = 2.5)

use seird_rs::{
    config::{Preset, SimulationConfig},
    output::{
        RunReport,
        export::{CsvConfig, CsvExporter, CsvMetadata, Exporter},
        visualization::{PlotConfig, plot_trajectory},
    },
};

use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  SEIRD - Reference Outbreaks");
    println!("═══════════════════════════════════════════════════════\n");

    let tmp_dir = std::env::temp_dir();

    for preset in Preset::ALL {
        let config = SimulationConfig::preset(preset)?;
        println!("▶ {} ({})\n", preset, preset.description());

        // ====== Simulation ======

        let start = Instant::now();
        let trajectory = config.run()?;
        let elapsed = start.elapsed();

        println!("{}", RunReport::new(&config.name, &config.parameters, &trajectory)?);
        println!("Wall time     : {:.2?}\n", elapsed);

        // ====== Export ======

        let csv_path = tmp_dir.join(format!("seird_{}.csv", preset));
        let metadata = CsvMetadata::from_trajectory(&trajectory).with_parameters(&config.parameters);
        CsvExporter::new(CsvConfig::default().with_metadata(metadata)).export(&trajectory, None, &csv_path)?;

        let plot_path = tmp_dir.join(format!("seird_{}.png", preset));
        let plot_config = PlotConfig::epidemic_curve(format!("SEIRD - {} outbreak", preset));
        plot_trajectory(&trajectory, &plot_path, Some(&plot_config))?;

        println!("  CSV  : {}", csv_path.display());
        println!("  Plot : {}\n", plot_path.display());
    }

    Ok(())
}
