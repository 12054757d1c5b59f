//! End-to-end reductions over synthetic MPAS files.

use mpas_common::{GeoWindow, LatitudeBand, LonConvention, MpasError};
use mpas_diagnostics::{HovmollerSlice, HumidityProfile, ReferencePressure};
use netcdf_parser::MultiFileDataset;
use test_utils::fixtures::{
    series_start, write_diagnostics_series, write_grid_file, write_output_series,
};
use test_utils::{
    assert_approx_eq, maldives_cells, ring_grid, ring_grid_with_gaps, temp_test_dir,
    tropical_column,
};

fn maldives() -> GeoWindow {
    GeoWindow::new(-0.5, 1.5, 72.0, 74.0).unwrap()
}

// ============================================================================
// Hovmöller
// ============================================================================

#[test]
fn test_hovmoller_from_files() {
    let dir = temp_test_dir();
    // Ring at 20°N lies outside the band and carries a large value
    let grid = ring_grid_with_gaps(&[0.0, 20.0], &[200]);
    write_diagnostics_series(dir.path(), 6, &grid, |field, step, cell| {
        if grid.lat[cell] > 10.0 {
            return 99.0;
        }
        let lon = grid.lon[cell];
        if field == "w_500hPa" {
            step as f64 + lon / 1000.0
        } else {
            -lon
        }
    })
    .unwrap();
    let grid_file = dir.path().join("output.nc");
    write_grid_file(&grid_file, &grid).unwrap();

    let cells = MultiFileDataset::open(&grid_file.to_string_lossy())
        .unwrap()
        .read_cell_grid()
        .unwrap();
    let ds = MultiFileDataset::open(&dir.path().join("diagnostics.2009-0*.nc").to_string_lossy())
        .unwrap();

    let slice =
        HovmollerSlice::from_dataset(&ds, &cells, "w_500hPa", LatitudeBand::default(), 1.0)
            .unwrap();
    assert_eq!(slice.n_times(), 6);
    assert_eq!(slice.values.ncols(), 360);
    assert_approx_eq!(slice.values[[3, 45]], 3.0455, 1e-9);
    assert!(slice.values.column(200).iter().all(|v| v.is_nan()));
    assert_eq!(slice.empty_bins(), 1);

    let calendar = slice.calendar.unwrap();
    assert_eq!(calendar.start, series_start());
    assert_eq!(calendar.steps_per_day, 4);

    let w200 =
        HovmollerSlice::from_dataset(&ds, &cells, "w_200hPa", LatitudeBand::default(), 1.0)
            .unwrap()
            .crop_longitudes(45.0, 150.0);
    assert_eq!(w200.values.dim(), (6, 105));
    assert_approx_eq!(w200.values[[0, 0]], -45.5, 1e-9);
}

// ============================================================================
// Humidity profile
// ============================================================================

#[test]
fn test_profile_from_files() {
    let dir = temp_test_dir();
    let grid = maldives_cells();
    let column = tropical_column(25);
    // Moisten the selected cell over time; the other cells are bone dry
    write_output_series(dir.path(), 4, &grid, &column, |step, cell| {
        if cell == 0 {
            1.0 + 0.1 * step as f64
        } else {
            0.0
        }
    })
    .unwrap();

    let ds = MultiFileDataset::open(
        &dir.path().join("x1.2621442.output.*.nc").to_string_lossy(),
    )
    .unwrap();
    let profile = HumidityProfile::from_dataset(
        &ds,
        &maldives(),
        LonConvention::ZeroTo360,
        ReferencePressure::FirstSample,
    )
    .unwrap();

    assert_eq!(profile.cells, 1);
    assert_eq!(profile.values.dim(), (25, 4));
    assert_eq!(profile.altitudes.len(), 25);
    assert_eq!(profile.altitudes[3], 3000.0);

    // Constant pressure: humidity scales with the moisture factor
    let ratio = profile.values[[0, 3]] / profile.values[[0, 0]];
    assert_approx_eq!(ratio, 1.3, 1e-9);
    assert!(profile.values.iter().all(|v| v.is_finite() && *v > 0.0));
}

#[test]
fn test_profile_reference_pressure_choice_matters() {
    let dir = temp_test_dir();
    let grid = maldives_cells();
    write_output_series(dir.path(), 2, &grid, &tropical_column(10), |_, _| 1.0).unwrap();
    let ds = MultiFileDataset::open(
        &dir.path().join("x1.2621442.output.*.nc").to_string_lossy(),
    )
    .unwrap();

    let first = HumidityProfile::from_dataset(
        &ds,
        &maldives(),
        LonConvention::ZeroTo360,
        ReferencePressure::FirstSample,
    )
    .unwrap();
    let standard = HumidityProfile::from_dataset(
        &ds,
        &maldives(),
        LonConvention::ZeroTo360,
        ReferencePressure::Standard,
    )
    .unwrap();

    // Lowest-layer pressure is under 1000 hPa, so the two conversions differ
    assert!((first.values[[0, 0]] - standard.values[[0, 0]]).abs() > 1e-6);
}

#[test]
fn test_profile_window_outside_grid() {
    let dir = temp_test_dir();
    let grid = ring_grid(&[0.0]);
    write_output_series(dir.path(), 1, &grid, &tropical_column(5), |_, _| 1.0).unwrap();
    let ds = MultiFileDataset::open(
        &dir.path().join("x1.2621442.output.*.nc").to_string_lossy(),
    )
    .unwrap();

    let polar = GeoWindow::new(80.0, 85.0, 10.0, 20.0).unwrap();
    let err = HumidityProfile::from_dataset(
        &ds,
        &polar,
        LonConvention::ZeroTo360,
        ReferencePressure::FirstSample,
    )
    .unwrap_err();
    assert!(matches!(err, MpasError::EmptySelection(_)));
}
