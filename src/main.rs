//! `seird` command-line front end
//!
//! ```text
//! seird --preset moderate --csv moderate.csv --plot moderate.png
//! seird --config run.json --method sdirk --rtol 1e-6
//! seird --preset world --dump-config > world.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use log4rs::Config;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use seird_rs::config::{Preset, SimulationConfig};
use seird_rs::output::export::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
use seird_rs::output::visualization::{PlotConfig, plot_trajectory};
use seird_rs::output::RunReport;
use seird_rs::solver::SolverMethod;

// ISO 8601 timestamp and color coded level tag
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

/// Simulate a SEIRD outbreak and report R0, herd immunity threshold and the epidemic curve
#[derive(Parser, Debug)]
#[command(name = "seird", version, about)]
struct Cli {
    /// Reference scenario (world or moderate)
    #[arg(long, default_value = "world", conflicts_with = "config")]
    preset: Preset,

    /// JSON run configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Integration method (dopri5, sdirk, rk4, euler)
    #[arg(long)]
    method: Option<SolverMethod>,

    /// Relative tolerance (adaptive methods)
    #[arg(long)]
    rtol: Option<f64>,

    /// Absolute tolerance (adaptive methods)
    #[arg(long)]
    atol: Option<f64>,

    /// Number of output times
    #[arg(long)]
    points: Option<usize>,

    /// Final simulation time (days)
    #[arg(long)]
    t_end: Option<f64>,

    /// Write the trajectory as CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Downsample the CSV to this many rows
    #[arg(long, value_name = "ROWS", requires = "csv")]
    csv_rows: Option<usize>,

    /// Write the epidemic curve (.png or .svg)
    #[arg(long, value_name = "FILE")]
    plot: Option<PathBuf>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn init_logging(level: LevelFilter) -> Result<()> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .context("failed to build logging configuration")?;

    log4rs::init_config(config).context("failed to initialize logging")?;
    Ok(())
}

/// Load the configuration and apply command-line overrides
fn resolve_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("cannot load {}", path.display()))?,
        None => SimulationConfig::preset(cli.preset)?,
    };

    if let Some(method) = cli.method {
        config.solver.method = method;
    }
    if let Some(rtol) = cli.rtol {
        config.solver.rtol = Some(rtol);
    }
    if let Some(atol) = cli.atol {
        config.solver.atol = Some(atol);
    }
    if let Some(points) = cli.points {
        config.time.points = points;
    }
    if let Some(t_end) = cli.t_end {
        config.time.end = t_end;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    let config = resolve_config(&cli)?;

    if cli.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let trajectory = config
        .run()
        .with_context(|| format!("simulation '{}' failed", config.name))?;

    let report = RunReport::new(&config.name, &config.parameters, &trajectory)?;
    println!("{report}");

    if let Some(path) = &cli.csv {
        let metadata = CsvMetadata::from_trajectory(&trajectory).with_parameters(&config.parameters);
        let exporter = CsvExporter::new(CsvConfig::default().with_metadata(metadata));
        exporter
            .export(&trajectory, cli.csv_rows, path)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }

    if let Some(path) = &cli.plot {
        let title = match config.solver.method {
            SolverMethod::Dopri5 => config.name.clone(),
            other => format!("{} ({})", config.name, other),
        };
        plot_trajectory(&trajectory, path, Some(&PlotConfig::epidemic_curve(title)))
            .with_context(|| format!("cannot write {}", path.display()))?;
    }

    Ok(())
}
