//! Hovmöller diagram pipeline: load, bin, crop, render.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mpas_common::CellGrid;
use mpas_diagnostics::HovmollerSlice;
use netcdf_parser::MultiFileDataset;
use renderer::{
    render_filled_contour, AxisSpec, ColorbarOrientation, ColorbarSpec, Colormap, FieldGrid,
    Figure, FigureConfig,
};
use tracing::info;

use crate::config::{FieldConfig, HovmollerConfig};

/// Render one figure per field and return the written paths.
pub fn run(config: &HovmollerConfig, fields: &[FieldConfig]) -> Result<Vec<PathBuf>> {
    let grid = load_grid(&config.grid_file)?;
    let dataset = MultiFileDataset::open(&config.pattern)
        .with_context(|| format!("Failed to open diagnostics series {}", config.pattern))?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))?;

    let mut written = Vec::with_capacity(fields.len());
    for field in fields {
        let slice = HovmollerSlice::from_dataset(
            &dataset,
            &grid,
            &field.name,
            config.latitude_band,
            config.longitude_increment,
        )
        .with_context(|| format!("Failed to reduce {}", field.name))?;

        let figure = render(&slice, field, config)?;
        let path = config.output_dir.join(output_file_name(&field.name));
        figure
            .save(&path)
            .with_context(|| format!("Failed to write {:?}", path))?;

        info!(
            field = %field.name,
            steps = slice.n_times(),
            empty_bins = slice.empty_bins(),
            path = %path.display(),
            "Wrote Hovmöller diagram"
        );
        written.push(path);
    }

    Ok(written)
}

/// Cell coordinates from the grid file.
pub fn load_grid(path: &Path) -> Result<CellGrid> {
    let label = path.display().to_string();
    let grid = MultiFileDataset::open_paths(&label, vec![path.to_path_buf()])
        .with_context(|| format!("Failed to open grid file {}", label))?
        .read_cell_grid()
        .with_context(|| format!("Failed to read cell coordinates from {}", label))?;
    info!(cells = grid.len(), file = %label, "Loaded cell grid");
    Ok(grid)
}

pub fn output_file_name(field: &str) -> String {
    format!("hovmoller_{}.png", field)
}

/// Crop to the display longitudes and draw with time running downward.
pub fn render(
    slice: &HovmollerSlice,
    field: &FieldConfig,
    config: &HovmollerConfig,
) -> Result<Figure> {
    let cropped = slice.crop_longitudes(config.display_longitudes.min, config.display_longitudes.max);
    let values: Vec<f64> = cropped.values.iter().copied().collect();
    let steps: Vec<f64> = (0..cropped.n_times()).map(|t| t as f64).collect();
    let grid = FieldGrid::new(&values, &cropped.longitudes, &steps)
        .with_context(|| format!("Cannot plot {} after cropping", field.name))?;

    let scheme = field.band_scheme(config.extend)?;
    let colormap = Colormap::by_name(&config.colormap)?;

    let figure_config = FigureConfig {
        width: config.figure.width,
        height: config.figure.height,
        title: Some(field.name.clone()),
        x_axis: AxisSpec {
            label: Some("Longitude".to_string()),
            ..AxisSpec::default()
        },
        y_axis: AxisSpec {
            ticks: config.time_axis.ticks(cropped.calendar, cropped.n_times()),
            inverted: true,
            ..AxisSpec::default()
        },
        colorbar: ColorbarSpec {
            orientation: ColorbarOrientation::Horizontal,
            label: Some(field.units.clone()),
            ticks: None,
        },
        band_edges: config.band_edges,
        ..FigureConfig::default()
    };

    Ok(render_filled_contour(&grid, &scheme, &colormap, &figure_config)?)
}
