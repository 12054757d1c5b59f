//! Small MPAS-style NetCDF files for tests.
//!
//! The writers mirror the layout MPAS produces: one file per output
//! interval, a `Time` record dimension (usually of length one), fields indexed
//! `(Time, nCells[, nVertLevels])`, and cell coordinates in radians.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use mpas_common::degrees_to_radians;

use crate::generators::{ColumnProfile, SyntheticGrid};

/// Hours between consecutive files of a series.
pub const STEP_HOURS: i64 = 6;

/// 2009-01-15 00:00, the first output time of the reference runs.
pub fn series_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2009, 1, 15)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid fixture start date")
}

fn step_time(start: NaiveDateTime, step: usize) -> NaiveDateTime {
    start + Duration::hours(STEP_HOURS * step as i64)
}

/// `diagnostics.2009-01-15_06.00.00.nc`
pub fn diagnostics_file_name(time: NaiveDateTime) -> String {
    format!("diagnostics.{}.nc", time.format("%Y-%m-%d_%H.%M.%S"))
}

/// `x1.2621442.output.2009-01-15_06.00.00.nc`
pub fn output_file_name(time: NaiveDateTime) -> String {
    format!("x1.2621442.output.{}.nc", time.format("%Y-%m-%d_%H.%M.%S"))
}

fn put_cell_coordinates(
    file: &mut netcdf::FileMut,
    grid: &SyntheticGrid,
) -> Result<(), netcdf::Error> {
    let lat: Vec<f64> = grid.lat.iter().copied().map(degrees_to_radians).collect();
    let lon: Vec<f64> = grid.lon.iter().copied().map(degrees_to_radians).collect();

    let mut var = file.add_variable::<f64>("latCell", &["nCells"])?;
    var.put_attribute("units", "radians")?;
    var.put_values(&lat, ..)?;

    let mut var = file.add_variable::<f64>("lonCell", &["nCells"])?;
    var.put_attribute("units", "radians")?;
    var.put_values(&lon, ..)?;
    Ok(())
}

/// Write a coordinate-only file (`output.nc`) holding `latCell`/`lonCell`.
pub fn write_grid_file(path: &Path, grid: &SyntheticGrid) -> Result<PathBuf, netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("nCells", grid.len())?;
    put_cell_coordinates(&mut file, grid)?;
    Ok(path.to_path_buf())
}

/// Write `steps` diagnostics files with `w_500hPa` and `w_200hPa`.
///
/// `value(field, step, cell)` supplies every sample.
pub fn write_diagnostics_series<F>(
    dir: &Path,
    steps: usize,
    grid: &SyntheticGrid,
    value: F,
) -> Result<Vec<PathBuf>, netcdf::Error>
where
    F: Fn(&str, usize, usize) -> f64,
{
    write_diagnostics_files(dir, steps, 1, grid, value)
}

/// Write `days` daily diagnostics files holding `records_per_day` records
/// each. `value` receives the step counted across the whole series.
pub fn write_daily_diagnostics<F>(
    dir: &Path,
    days: usize,
    records_per_day: usize,
    grid: &SyntheticGrid,
    value: F,
) -> Result<Vec<PathBuf>, netcdf::Error>
where
    F: Fn(&str, usize, usize) -> f64,
{
    write_diagnostics_files(dir, days, records_per_day, grid, value)
}

fn write_diagnostics_files<F>(
    dir: &Path,
    files: usize,
    records: usize,
    grid: &SyntheticGrid,
    value: F,
) -> Result<Vec<PathBuf>, netcdf::Error>
where
    F: Fn(&str, usize, usize) -> f64,
{
    let start = series_start();
    let mut paths = Vec::with_capacity(files);

    for index in 0..files {
        // One record per file keeps the 6-hourly spacing; several make it daily
        let time = if records == 1 {
            step_time(start, index)
        } else {
            start + Duration::days(index as i64)
        };
        let path = dir.join(diagnostics_file_name(time));
        let mut file = netcdf::create(&path)?;
        file.add_dimension("Time", records)?;
        file.add_dimension("nCells", grid.len())?;

        for field in ["w_500hPa", "w_200hPa"] {
            let data: Vec<f64> = (0..records)
                .flat_map(|r| {
                    let step = index * records + r;
                    (0..grid.len()).map(move |cell| (step, cell))
                })
                .map(|(step, cell)| value(field, step, cell))
                .collect();
            let mut var = file.add_variable::<f64>(field, &["Time", "nCells"])?;
            var.put_attribute("units", "m s^{-1}")?;
            var.put_values(&data, ..)?;
        }
        paths.push(path);
    }

    Ok(paths)
}

/// Write `steps` model output files for the humidity profile.
///
/// Every cell carries `column`; `qv` is scaled by `moisture(step, cell)`.
/// `zgrid` is static and `pressure_base`, `theta` and `qv` are
/// `(Time, nCells, nVertLevels)`.
pub fn write_output_series<F>(
    dir: &Path,
    steps: usize,
    grid: &SyntheticGrid,
    column: &ColumnProfile,
    moisture: F,
) -> Result<Vec<PathBuf>, netcdf::Error>
where
    F: Fn(usize, usize) -> f64,
{
    let start = series_start();
    let n_cells = grid.len();
    let n_levels = column.pressure.len();
    let mut paths = Vec::with_capacity(steps);

    let repeat = |profile: &[f64]| -> Vec<f64> {
        (0..n_cells).flat_map(|_| profile.iter().copied()).collect()
    };
    let pressure = repeat(&column.pressure);
    let theta = repeat(&column.theta);
    let zgrid = repeat(&column.zgrid);

    for step in 0..steps {
        let path = dir.join(output_file_name(step_time(start, step)));
        let mut file = netcdf::create(&path)?;
        file.add_dimension("Time", 1)?;
        file.add_dimension("nCells", n_cells)?;
        file.add_dimension("nVertLevels", n_levels)?;
        file.add_dimension("nVertLevelsP1", n_levels + 1)?;

        put_cell_coordinates(&mut file, grid)?;

        let mut var = file.add_variable::<f64>("zgrid", &["nCells", "nVertLevelsP1"])?;
        var.put_attribute("units", "m")?;
        var.put_values(&zgrid, ..)?;

        let dims = ["Time", "nCells", "nVertLevels"];
        let mut var = file.add_variable::<f64>("pressure_base", &dims)?;
        var.put_attribute("units", "Pa")?;
        var.put_values(&pressure, ..)?;

        let mut var = file.add_variable::<f64>("theta", &dims)?;
        var.put_attribute("units", "K")?;
        var.put_values(&theta, ..)?;

        let qv: Vec<f64> = (0..n_cells)
            .flat_map(|cell| {
                let scale = moisture(step, cell);
                column.qv.iter().map(move |q| q * scale)
            })
            .collect();
        let mut var = file.add_variable::<f64>("qv", &dims)?;
        var.put_attribute("units", "kg kg^{-1}")?;
        var.put_values(&qv, ..)?;

        paths.push(path);
    }

    Ok(paths)
}
