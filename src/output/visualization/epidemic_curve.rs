//! Epidemic curves: compartment sizes against time
//!
//! - [`plot_trajectory`]: every compartment of one run, one colored line each
//! - [`plot_compartment_comparison`]: one compartment across several runs
//!   (parameter sweeps, solver comparisons)
//!
//! The backend is chosen from the file extension: `.svg` produces a vector
//! image, anything else a PNG bitmap.

use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

use super::config::{PlotConfig, format_count};
use crate::model::Compartment;
use crate::output::OutputError;
use crate::solver::Trajectory;

/// One line of a chart
struct Series<'a> {
    label: String,
    times: &'a [f64],
    values: Vec<f64>,
}

/// Plot every compartment of `trajectory`
///
/// # Errors
///
/// `InvalidData` for out-of-range component indices or non-finite values,
/// `Plot` if the backend cannot write `output_path`.
///
/// # Example
///
/// ```rust,ignore
/// use seird_rs::output::visualization::{plot_trajectory, PlotConfig};
///
/// plot_trajectory(&trajectory, "world.png", None)?;
///
/// // Infected and Dead only, as SVG
/// let config = PlotConfig::epidemic_curve("World").only(&[2, 4]);
/// plot_trajectory(&trajectory, "world.svg", Some(&config))?;
/// ```
pub fn plot_trajectory<P: AsRef<Path>>(
    trajectory: &Trajectory,
    output_path: P,
    config: Option<&PlotConfig>,
) -> Result<(), OutputError> {
    let default_config = PlotConfig::default();
    let config = config.unwrap_or(&default_config);

    let components: Vec<usize> = match &config.components {
        Some(selected) => selected.clone(),
        None => (0..trajectory.dimension()).collect(),
    };

    let mut series = Vec::with_capacity(components.len());
    for &component in &components {
        if component >= trajectory.dimension() {
            return Err(OutputError::InvalidData(format!(
                "component {} out of range (dimension {})",
                component,
                trajectory.dimension()
            )));
        }
        let label = trajectory
            .labels()
            .get(component)
            .cloned()
            .unwrap_or_else(|| format!("y{component}"));

        series.push(Series {
            label,
            times: trajectory.times(),
            values: trajectory.series(component),
        });
    }

    render(output_path.as_ref(), &series, config, |i| components[i])
}

/// Overlay one compartment of several labelled runs
///
/// # Example
///
/// ```rust,ignore
/// plot_compartment_comparison(
///     &[("beta = 0.5", &low), ("beta = 1.0", &high)],
///     Compartment::Infected,
///     "infected.png",
///     None,
/// )?;
/// ```
pub fn plot_compartment_comparison<P: AsRef<Path>>(
    runs: &[(&str, &Trajectory)],
    compartment: Compartment,
    output_path: P,
    config: Option<&PlotConfig>,
) -> Result<(), OutputError> {
    if runs.is_empty() {
        return Err(OutputError::EmptyTrajectory);
    }

    let default_config = PlotConfig::epidemic_curve(format!("{} comparison", compartment.label()));
    let config = config.unwrap_or(&default_config);

    let mut series = Vec::with_capacity(runs.len());
    for (label, trajectory) in runs {
        if compartment.index() >= trajectory.dimension() {
            return Err(OutputError::InvalidData(format!(
                "run '{}' has no {} compartment",
                label,
                compartment.label()
            )));
        }
        series.push(Series {
            label: label.to_string(),
            times: trajectory.times(),
            values: trajectory.compartment(compartment),
        });
    }

    render(output_path.as_ref(), &series, config, |i| i)
}

// =================================================================================================
// Rendering
// =================================================================================================

/// Validate the data, pick the backend and draw
fn render(
    output_path: &Path,
    series: &[Series<'_>],
    config: &PlotConfig,
    color_index: impl Fn(usize) -> usize,
) -> Result<(), OutputError> {
    if series.is_empty() || series.iter().any(|s| s.times.is_empty()) {
        return Err(OutputError::EmptyTrajectory);
    }
    for s in series {
        if s.times.iter().chain(s.values.iter()).any(|v| !v.is_finite()) {
            return Err(OutputError::InvalidData(format!("NaN or Inf in series '{}'", s.label)));
        }
    }

    let x_min = series.iter().map(|s| s.times[0]).fold(f64::INFINITY, f64::min);
    let mut x_max = series
        .iter()
        .map(|s| s.times[s.times.len() - 1])
        .fold(f64::NEG_INFINITY, f64::max);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }

    let y_min = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0, f64::min);
    let y_top = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let y_max = if y_top > y_min { y_top * 1.05 } else { y_min + 1.0 };

    let colors: Vec<RGBColor> = (0..series.len()).map(|i| config.series_color(color_index(i))).collect();

    let extension = output_path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let result = match extension.as_str() {
        "svg" => {
            let backend = SVGBackend::new(output_path, (config.width, config.height));
            draw(backend, series, &colors, config, (x_min, x_max), (y_min, y_max))
        }
        _ => {
            let backend = BitMapBackend::new(output_path, (config.width, config.height));
            draw(backend, series, &colors, config, (x_min, x_max), (y_min, y_max))
        }
    };

    result.map_err(|e| OutputError::Plot(e.to_string()))?;
    log::info!("plot written to {}", output_path.display());
    Ok(())
}

fn draw<DB: DrawingBackend>(
    backend: DB,
    series: &[Series<'_>],
    colors: &[RGBColor],
    config: &PlotConfig,
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&config.background)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 36).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let x_format = |x: &f64| format!("{:.0}", x);
    let y_format = |y: &f64| format_count(*y);

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&config.xlabel)
        .y_desc(&config.ylabel)
        .x_label_formatter(&x_format)
        .y_label_formatter(&y_format);

    if config.show_grid {
        mesh.draw()?;
    } else {
        mesh.disable_mesh().draw()?;
    }

    for (s, &color) in series.iter().zip(colors) {
        let style = color.stroke_width(config.line_width);
        chart
            .draw_series(LineSeries::new(
                s.times.iter().copied().zip(s.values.iter().copied()),
                style,
            ))?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(config.background.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverStats;
    use nalgebra::DVector;
    use tempfile::TempDir;

    fn sample() -> Trajectory {
        let times: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let states = times
            .iter()
            .map(|t| {
                let infected = 100.0 * (-(t - 20.0) * (t - 20.0) / 50.0).exp();
                DVector::from_vec(vec![1000.0 - 2.0 * t, 0.5 * infected, infected, 1.8 * t, 0.2 * t])
            })
            .collect();
        let labels = Compartment::ALL.iter().map(|c| c.label().to_string()).collect();
        Trajectory::new(times, states, labels, SolverStats::default())
    }

    #[test]
    fn test_plot_trajectory_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("curve.png");
        plot_trajectory(&sample(), &path, None).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_trajectory_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("curve.svg");
        plot_trajectory(&sample(), &path, Some(&PlotConfig::epidemic_curve("Test"))).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("Infected"));
    }

    #[test]
    fn test_plot_selected_components() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("selected.svg");
        let config = PlotConfig::default().only(&[Compartment::Infected.index()]);
        plot_trajectory(&sample(), &path, Some(&config)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Infected"));
        assert!(!content.contains("Susceptible"));
    }

    #[test]
    fn test_plot_rejects_bad_component() {
        let dir = TempDir::new().unwrap();
        let config = PlotConfig::default().only(&[7]);
        let result = plot_trajectory(&sample(), dir.path().join("bad.png"), Some(&config));
        assert!(matches!(result, Err(OutputError::InvalidData(_))));
    }

    #[test]
    fn test_plot_comparison() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("comparison.svg");
        let a = sample();
        let b = sample();
        plot_compartment_comparison(&[("a", &a), ("b", &b)], Compartment::Dead, &path, None).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_comparison_empty() {
        let result = plot_compartment_comparison(&[], Compartment::Infected, "unused.png", None);
        assert!(matches!(result, Err(OutputError::EmptyTrajectory)));
    }
}
