//! Relative humidity altitude–time profile pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mpas_diagnostics::HumidityProfile;
use netcdf_parser::MultiFileDataset;
use renderer::{
    render_filled_contour, AxisSpec, ColorbarOrientation, ColorbarSpec, Colormap, FieldGrid,
    Figure, FigureConfig,
};
use tracing::info;

use crate::config::ProfileConfig;

/// Compute the profile over the configured window and write the figure.
pub fn run(config: &ProfileConfig) -> Result<PathBuf> {
    let window = config.window.geo_window()?;
    let dataset = MultiFileDataset::open(&config.pattern)
        .with_context(|| format!("Failed to open model output series {}", config.pattern))?;

    let profile = HumidityProfile::from_dataset(
        &dataset,
        &window,
        config.lon_convention()?,
        config.reference_pressure,
    )
    .with_context(|| format!("Failed to compute humidity over {}", config.window.name))?;

    let figure = render(&profile, config)?;
    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    figure
        .save(&config.output)
        .with_context(|| format!("Failed to write {:?}", config.output))?;

    info!(
        window = %config.window.name,
        cells = profile.cells,
        levels = profile.n_levels(),
        steps = profile.n_times(),
        path = %config.output.display(),
        "Wrote humidity profile"
    );
    Ok(config.output.clone())
}

/// Draw relative humidity against time (x) and altitude (y).
pub fn render(profile: &HumidityProfile, config: &ProfileConfig) -> Result<Figure> {
    let values: Vec<f64> = profile.values.iter().copied().collect();
    let steps: Vec<f64> = (0..profile.n_times()).map(|t| t as f64).collect();
    let grid = FieldGrid::new(&values, &steps, &profile.altitudes)
        .context("Cannot plot the humidity profile")?;

    let scheme = config.band_scheme()?;
    let colormap = Colormap::by_name(&config.colormap)?;

    let figure_config = FigureConfig {
        width: config.figure.width,
        height: config.figure.height,
        title: Some(format!("Relative humidity, {}", config.window.name)),
        x_axis: AxisSpec {
            ticks: config.time_axis.ticks(profile.calendar, profile.n_times()),
            ..AxisSpec::default()
        },
        y_axis: AxisSpec {
            label: Some("altitude (km)".to_string()),
            range: Some((0.0, config.max_altitude_m)),
            ticks: config.altitude_ticks(),
            inverted: false,
        },
        colorbar: ColorbarSpec {
            orientation: ColorbarOrientation::Vertical,
            label: Some("%".to_string()),
            ticks: Some(config.colorbar_ticks.resolve()?),
        },
        band_edges: config.band_edges,
        ..FigureConfig::default()
    };

    Ok(render_filled_contour(&grid, &scheme, &colormap, &figure_config)?)
}
