//! Plot configuration shared across visualization functions

use plotters::prelude::*;

/// Configuration for customizing plots
///
/// # Example
///
/// ```rust
/// use seird_rs::output::visualization::PlotConfig;
///
/// let mut config = PlotConfig::epidemic_curve("Moderate outbreak");
/// config.width = 1920;
/// config.height = 1080;
/// assert_eq!(config.xlabel, "Time (days)");
/// ```
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1024)
    pub width: u32,

    /// Image height in pixels (default: 768)
    pub height: u32,

    pub title: String,

    /// X-axis label (default: "Time (days)")
    pub xlabel: String,

    /// Y-axis label (default: "Population")
    pub ylabel: String,

    /// One color per series; `None` uses the compartment palette
    pub series_colors: Option<Vec<RGBColor>>,

    /// State components to draw, by index; `None` draws all of them
    pub components: Option<Vec<usize>>,

    /// Background color (default: WHITE)
    pub background: RGBColor,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    /// Show grid lines (default: true)
    pub show_grid: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "SEIRD Epidemic Curve".to_string(),
            xlabel: "Time (days)".to_string(),
            ylabel: "Population".to_string(),
            series_colors: None,
            components: None,
            background: WHITE,
            line_width: 2,
            show_grid: true,
        }
    }
}

/// Orange, used for the Exposed compartment
const ORANGE: RGBColor = RGBColor(255, 140, 0);

impl PlotConfig {
    /// Default configuration with a custom title
    pub fn epidemic_curve(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Draw only the given state components
    pub fn only(mut self, components: &[usize]) -> Self {
        self.components = Some(components.to_vec());
        self
    }

    /// Color of the series at index `i`
    ///
    /// Without custom colors, indices follow the compartment order
    /// S (blue), E (orange), I (red), R (green), D (black).
    pub(crate) fn series_color(&self, index: usize) -> RGBColor {
        if let Some(colors) = &self.series_colors
            && let Some(color) = colors.get(index)
        {
            return *color;
        }

        let palette = [
            BLUE,
            ORANGE,
            RED,
            GREEN,
            BLACK,
            MAGENTA,
            CYAN,
            RGBColor(128, 0, 128),
            RGBColor(165, 42, 42),
        ];
        palette[index % palette.len()]
    }
}

/// Compact axis label for population counts (`1.5k`, `2.0M`, `8.0B`)
pub(crate) fn format_count(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else if magnitude >= 1.0 || magnitude == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_config_default() {
        let config = PlotConfig::default();
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 768);
        assert_eq!(config.xlabel, "Time (days)");
        assert_eq!(config.ylabel, "Population");
        assert!(config.show_grid);
        assert!(config.components.is_none());
    }

    #[test]
    fn test_epidemic_curve_title() {
        let config = PlotConfig::epidemic_curve(format!("R0 = {}", 2.5));
        assert_eq!(config.title, "R0 = 2.5");
    }

    #[test]
    fn test_series_color_palette() {
        let config = PlotConfig::default();
        assert_eq!(config.series_color(0), BLUE);
        assert_eq!(config.series_color(2), RED);
        assert_eq!(config.series_color(9), BLUE);
    }

    #[test]
    fn test_series_color_custom_with_fallback() {
        let config = PlotConfig {
            series_colors: Some(vec![CYAN]),
            ..PlotConfig::default()
        };
        assert_eq!(config.series_color(0), CYAN);
        assert_eq!(config.series_color(1), ORANGE);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(8.0e9), "8.0B");
        assert_eq!(format_count(2.5e6), "2.5M");
        assert_eq!(format_count(1500.0), "1.5k");
        assert_eq!(format_count(42.0), "42");
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(0.25), "0.25");
    }
}
