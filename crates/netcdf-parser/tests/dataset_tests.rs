//! Integration tests for multi-file MPAS datasets.
//!
//! Files are written into temporary directories with the `test-utils`
//! fixtures, so these tests need libnetcdf but no downloaded data.

use mpas_common::MpasError;
use netcdf_parser::{MultiFileDataset, NetCdfError};
use test_utils::fixtures::{
    diagnostics_file_name, series_start, write_daily_diagnostics, write_diagnostics_series,
    write_grid_file, write_output_series,
};
use test_utils::{assert_approx_eq, maldives_cells, ring_grid, temp_test_dir, tropical_column};

fn pattern_in(dir: &std::path::Path, glob: &str) -> String {
    dir.join(glob).to_string_lossy().into_owned()
}

// ============================================================================
// Opening and concatenation
// ============================================================================

#[test]
fn test_glob_match_count_equals_time_length() {
    let dir = temp_test_dir();
    let grid = maldives_cells();
    write_diagnostics_series(dir.path(), 8, &grid, |_, _, _| 0.0).unwrap();

    let ds = MultiFileDataset::open(&pattern_in(dir.path(), "diagnostics.2009-0*.nc")).unwrap();
    assert_eq!(ds.file_count(), 8);
    assert_eq!(ds.time_len().unwrap(), 8);
    assert!(ds.check_one_step_per_file().unwrap());
}

#[test]
fn test_time_series_concatenates_in_file_order() {
    let dir = temp_test_dir();
    let grid = maldives_cells();
    write_diagnostics_series(dir.path(), 5, &grid, |field, step, cell| {
        let base = if field == "w_500hPa" { 0.0 } else { 1000.0 };
        base + step as f64 * 10.0 + cell as f64
    })
    .unwrap();

    let ds = MultiFileDataset::open(&pattern_in(dir.path(), "diagnostics.*.nc")).unwrap();
    let w500 = ds.read_time_series("w_500hPa").unwrap();
    assert_eq!(w500.shape(), &[5, 4]);
    assert_eq!(w500[[0, 0]], 0.0);
    assert_eq!(w500[[3, 2]], 32.0);
    assert_eq!(w500[[4, 3]], 43.0);

    let w200 = ds.read_time_series("w_200hPa").unwrap();
    assert_eq!(w200[[2, 1]], 1021.0);
}

#[test]
fn test_paths_are_sorted() {
    let dir = temp_test_dir();
    write_diagnostics_series(dir.path(), 3, &maldives_cells(), |_, _, _| 0.0).unwrap();

    let ds = MultiFileDataset::open(&pattern_in(dir.path(), "diagnostics.*.nc")).unwrap();
    let names: Vec<String> = ds
        .paths()
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names[0], diagnostics_file_name(series_start()));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_no_files_matched() {
    let dir = temp_test_dir();
    let err = MultiFileDataset::open(&pattern_in(dir.path(), "diagnostics.*.nc")).unwrap_err();
    assert!(matches!(err, NetCdfError::NoFilesMatched(_)));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_variable() {
    let dir = temp_test_dir();
    write_diagnostics_series(dir.path(), 2, &maldives_cells(), |_, _, _| 0.0).unwrap();

    let ds = MultiFileDataset::open(&pattern_in(dir.path(), "diagnostics.*.nc")).unwrap();
    let err = ds.read_time_series("w_850hPa").unwrap_err();
    match &err {
        NetCdfError::MissingVariable { name, .. } => assert_eq!(name, "w_850hPa"),
        other => panic!("unexpected error: {other:?}"),
    }

    let mpas: MpasError = err.into();
    assert!(matches!(mpas, MpasError::MissingVariable { .. }));
}

#[test]
fn test_cell_count_mismatch_between_files() {
    let dir = temp_test_dir();
    let small = dir.path().join("small");
    let large = dir.path().join("large");
    std::fs::create_dir_all(&small).unwrap();
    std::fs::create_dir_all(&large).unwrap();

    let a = write_diagnostics_series(&small, 1, &maldives_cells(), |_, _, _| 0.0).unwrap();
    let b = write_diagnostics_series(&large, 1, &ring_grid(&[0.0]), |_, _, _| 0.0).unwrap();

    let ds = MultiFileDataset::open_paths("mixed", vec![a[0].clone(), b[0].clone()]).unwrap();
    let err = ds.read_time_series("w_500hPa").unwrap_err();
    match err {
        NetCdfError::ShapeMismatch { expected, found, .. } => {
            assert_eq!(expected, vec![4]);
            assert_eq!(found, vec![360]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_time_series_rejects_static_variable() {
    let dir = temp_test_dir();
    let path = dir.path().join("output.nc");
    write_grid_file(&path, &maldives_cells()).unwrap();

    let ds = MultiFileDataset::open(&path.to_string_lossy()).unwrap();
    let err = ds.read_time_series("latCell").unwrap_err();
    assert!(matches!(err, NetCdfError::InvalidFormat(_)));
}

// ============================================================================
// Grid and static variables
// ============================================================================

#[test]
fn test_read_cell_grid_in_degrees() {
    let dir = temp_test_dir();
    let path = dir.path().join("output.nc");
    let grid = maldives_cells();
    write_grid_file(&path, &grid).unwrap();

    let ds = MultiFileDataset::open(&path.to_string_lossy()).unwrap();
    let cells = ds.read_cell_grid().unwrap();
    assert_eq!(cells.len(), 4);
    for (i, (lat, lon)) in cells.cells().enumerate() {
        assert_approx_eq!(lat, grid.lat[i], 1e-9);
        assert_approx_eq!(lon, grid.lon[i], 1e-9);
    }
}

#[test]
fn test_read_output_series_shapes() {
    let dir = temp_test_dir();
    let grid = maldives_cells();
    let column = tropical_column(10);
    write_output_series(dir.path(), 3, &grid, &column, |_, _| 1.0).unwrap();

    let ds = MultiFileDataset::open(&pattern_in(
        dir.path(),
        "x1.2621442.output.2009-*_00.00.00.nc",
    ))
    .unwrap();
    // Only the 00 UTC file of day one matches the daily pattern
    assert_eq!(ds.file_count(), 1);

    let ds = MultiFileDataset::open(&pattern_in(dir.path(), "x1.2621442.output.*.nc")).unwrap();
    assert_eq!(ds.read_time_series("theta").unwrap().shape(), &[3, 4, 10]);
    assert_eq!(ds.read_time_series("qv").unwrap().shape(), &[3, 4, 10]);
    assert_eq!(ds.read_static("zgrid").unwrap().shape(), &[4, 11]);
}

#[test]
fn test_calendar_from_file_names() {
    let dir = temp_test_dir();
    write_diagnostics_series(dir.path(), 4, &maldives_cells(), |_, _, _| 0.0).unwrap();

    let ds = MultiFileDataset::open(&pattern_in(dir.path(), "diagnostics.*.nc")).unwrap();
    let calendar = ds.calendar().unwrap();
    assert_eq!(calendar.start, series_start());
    assert_eq!(calendar.steps_per_day, 4);
}

#[test]
fn test_calendar_counts_records_in_daily_files() {
    let dir = temp_test_dir();
    write_daily_diagnostics(dir.path(), 3, 4, &maldives_cells(), |_, step, _| step as f64).unwrap();

    let ds = MultiFileDataset::open(&pattern_in(dir.path(), "diagnostics.*.nc")).unwrap();
    assert_eq!(ds.file_count(), 3);
    assert_eq!(ds.time_len().unwrap(), 12);
    assert_eq!(ds.records_per_file(), Some(4));
    assert!(!ds.check_one_step_per_file().unwrap());

    let w500 = ds.read_time_series("w_500hPa").unwrap();
    assert_eq!(w500[[5, 0]], 5.0);

    let calendar = ds.calendar().unwrap();
    assert_eq!(calendar.steps_per_day, 4);
    assert_eq!(calendar.datetime_at(4).format("%b %d").to_string(), "Jan 16");
    let labels: Vec<String> = calendar.day_ticks(12, 4, 1).into_iter().map(|t| t.label).collect();
    assert_eq!(labels, vec!["Jan 15", "Jan 16", "Jan 17"]);
}
