//! Averaging over selected cells.
//!
//! Fields are `(time, cell)` or `(time, cell, level)` arrays. Means follow
//! floating-point semantics: a NaN sample makes its mean NaN, and a mask
//! selecting no cells yields NaN rather than an error.

use mpas_common::{MpasError, MpasResult};
use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView2, ArrayView3, Axis, Ix2, Ix3};

use crate::selector::{CellMask, LongitudeBin};

/// Reshape a loaded variable into `(time, cell)`.
pub fn into_time_cell(name: &str, field: ArrayD<f64>) -> MpasResult<Array2<f64>> {
    let shape = field.shape().to_vec();
    field
        .into_dimensionality::<Ix2>()
        .map_err(|_| MpasError::rank(format!("{} (time, cell)", name), 2, &shape))
}

/// Reshape a loaded variable into `(time, cell, level)`.
pub fn into_time_cell_level(name: &str, field: ArrayD<f64>) -> MpasResult<Array3<f64>> {
    let shape = field.shape().to_vec();
    field
        .into_dimensionality::<Ix3>()
        .map_err(|_| MpasError::rank(format!("{} (time, cell, level)", name), 3, &shape))
}

fn check_mask(what: &str, n_cells: usize, mask: &CellMask) -> MpasResult<()> {
    if mask.len() != n_cells {
        return Err(MpasError::shape(what, &[mask.len()], &[n_cells]));
    }
    Ok(())
}

/// Mean over the selected cells for each time step of a `(time, cell)` field.
pub fn masked_mean(field: ArrayView2<f64>, mask: &CellMask) -> MpasResult<Array1<f64>> {
    check_mask("field cells", field.ncols(), mask)?;

    let n = mask.count();
    Ok(field
        .outer_iter()
        .map(|row| {
            if n == 0 {
                return f64::NAN;
            }
            mask.indices().iter().map(|&c| row[c]).sum::<f64>() / n as f64
        })
        .collect())
}

/// Per-bin masked means of a `(time, cell)` field, as `(time, bin)`.
pub fn hovmoller_average(field: ArrayView2<f64>, bins: &[LongitudeBin]) -> MpasResult<Array2<f64>> {
    let mut out = Array2::from_elem((field.nrows(), bins.len()), f64::NAN);
    for (b, bin) in bins.iter().enumerate() {
        let means = masked_mean(field, &bin.mask)?;
        out.column_mut(b).assign(&means);
    }
    Ok(out)
}

/// Keep only the selected cells of a `(time, cell, level)` field.
pub fn select_cells(field: ArrayView3<f64>, mask: &CellMask) -> MpasResult<Array3<f64>> {
    check_mask("field cells", field.len_of(Axis(1)), mask)?;
    Ok(field.select(Axis(1), mask.indices()))
}

/// Mean over the cell axis of a `(time, cell, level)` field, as `(time, level)`.
///
/// A field with no cells yields NaN everywhere.
pub fn cell_mean(field: ArrayView3<f64>) -> Array2<f64> {
    let (n_time, _, n_level) = field.dim();
    field
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array2::from_elem((n_time, n_level), f64::NAN))
}

/// Mean over the time axis of a `(time, cell, level)` field, as `(cell, level)`.
pub fn time_mean(field: ArrayView3<f64>) -> Array2<f64> {
    let (_, n_cell, n_level) = field.dim();
    field
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array2::from_elem((n_cell, n_level), f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};

    #[test]
    fn test_masked_mean() {
        let field = array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]];
        let mask = CellMask::from_bools(&[true, false, true, false]);
        let mean = masked_mean(field.view(), &mask).unwrap();
        assert_eq!(mean.to_vec(), vec![2.0, 6.0]);
    }

    #[test]
    fn test_masked_mean_empty_is_nan() {
        let field = array![[1.0, 2.0], [3.0, 4.0]];
        let mean = masked_mean(field.view(), &CellMask::none(2)).unwrap();
        assert!(mean.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_masked_mean_length_mismatch() {
        let field = array![[1.0, 2.0, 3.0]];
        let err = masked_mean(field.view(), &CellMask::none(4)).unwrap_err();
        assert!(matches!(err, MpasError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_select_and_cell_mean() {
        // (time=2, cell=3, level=2)
        let field = Array3::from_shape_fn((2, 3, 2), |(t, c, l)| (t * 100 + c * 10 + l) as f64);
        let mask = CellMask::from_bools(&[true, false, true]);
        let selected = select_cells(field.view(), &mask).unwrap();
        assert_eq!(selected.dim(), (2, 2, 2));

        let mean = cell_mean(selected.view());
        assert_eq!(mean[[0, 0]], 10.0);
        assert_eq!(mean[[1, 1]], 111.0);
    }

    #[test]
    fn test_time_mean() {
        let field = Array3::from_shape_fn((4, 1, 1), |(t, _, _)| t as f64);
        assert_eq!(time_mean(field.view())[[0, 0]], 1.5);
    }

    #[test]
    fn test_into_time_cell_rejects_3d() {
        let field = ArrayD::zeros(IxDyn(&[2, 3, 4]));
        let err = into_time_cell("theta", field).unwrap_err();
        match err {
            MpasError::RankMismatch { expected, found, .. } => {
                assert_eq!(expected, 2);
                assert_eq!(found, vec![2, 3, 4]);
            }
            other => panic!("expected rank mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_into_time_cell_level_rejects_2d() {
        let field = ArrayD::zeros(IxDyn(&[5, 7]));
        let err = into_time_cell_level("qv", field).unwrap_err();
        assert_eq!(
            err.to_string(),
            "qv (time, cell, level) must be 3-dimensional, found shape [5, 7]"
        );
    }
}
