//! Time–longitude (Hovmöller) slices.

use mpas_common::{CalendarAxis, CellGrid, LatitudeBand, LonConvention, MpasResult};
use ndarray::{s, Array2, ArrayView2};
use netcdf_parser::MultiFileDataset;
use tracing::{info, warn};

use crate::reduce::{hovmoller_average, into_time_cell};
use crate::selector::longitude_bin_masks;

/// A field averaged over a latitude band in longitude bins, `(time, bin)`.
#[derive(Debug, Clone)]
pub struct HovmollerSlice {
    pub field: String,
    pub band: LatitudeBand,
    pub increment: f64,
    /// Western edge of each bin column (degrees)
    pub longitudes: Vec<f64>,
    /// Row per time step, column per bin; NaN where a bin has no cells
    pub values: Array2<f64>,
    pub calendar: Option<CalendarAxis>,
}

impl HovmollerSlice {
    /// Average a `(time, cell)` field into longitude bins of `increment`
    /// degrees within `band`.
    pub fn compute(
        field_name: &str,
        field: ArrayView2<f64>,
        grid: &CellGrid,
        band: LatitudeBand,
        increment: f64,
    ) -> MpasResult<Self> {
        grid.check_cell_count(field_name, field.ncols())?;

        let grid = grid.with_lon_convention(LonConvention::ZeroTo360);
        let bins = longitude_bin_masks(&grid, &band, increment)?;
        let values = hovmoller_average(field, &bins)?;

        let empty = bins.iter().filter(|b| b.mask.count() == 0).count();
        if empty > 0 {
            warn!(field = %field_name, empty_bins = empty, "Longitude bins without cells are left blank");
        }

        Ok(Self {
            field: field_name.to_string(),
            band,
            increment,
            longitudes: bins.iter().map(|b| b.west).collect(),
            values,
            calendar: None,
        })
    }

    /// Load `field_name` from a diagnostics series and compute its slice.
    ///
    /// The time length comes from the loaded field; a file count that
    /// disagrees with it is only logged.
    pub fn from_dataset(
        dataset: &MultiFileDataset,
        grid: &CellGrid,
        field_name: &str,
        band: LatitudeBand,
        increment: f64,
    ) -> MpasResult<Self> {
        let field = into_time_cell(field_name, dataset.read_time_series(field_name)?)?;
        dataset.check_one_step_per_file()?;

        info!(
            field = %field_name,
            steps = field.nrows(),
            cells = field.ncols(),
            "Loaded Hovmöller field"
        );

        let mut slice = Self::compute(field_name, field.view(), grid, band, increment)?;
        slice.calendar = dataset.calendar();
        Ok(slice)
    }

    pub fn n_times(&self) -> usize {
        self.values.nrows()
    }

    /// Number of bins holding no cells.
    pub fn empty_bins(&self) -> usize {
        self.values
            .columns()
            .into_iter()
            .filter(|c| c.iter().all(|v| v.is_nan()))
            .count()
    }

    /// Keep the bin columns from `lon_min` up to (not including) `lon_max`.
    ///
    /// Column indices are `floor(lon / increment)`, so with 1° bins the
    /// 45..150 display range keeps the bins west-edged 45 to 149.
    pub fn crop_longitudes(&self, lon_min: f64, lon_max: f64) -> Self {
        let n = self.longitudes.len();
        let first = ((lon_min / self.increment).floor().max(0.0) as usize).min(n);
        let last = ((lon_max / self.increment).floor().max(0.0) as usize).clamp(first, n);

        Self {
            field: self.field.clone(),
            band: self.band,
            increment: self.increment,
            longitudes: self.longitudes[first..last].to_vec(),
            values: self.values.slice(s![.., first..last]).to_owned(),
            calendar: self.calendar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn one_cell_per_bin() -> CellGrid {
        let lon: Vec<f64> = (0..360).map(|b| b as f64 + 0.5).collect();
        CellGrid::from_degrees(vec![0.0; 360], lon).unwrap()
    }

    #[test]
    fn test_compute_shapes() {
        let grid = one_cell_per_bin();
        let field = Array2::from_shape_fn((3, 360), |(t, c)| (t * 1000 + c) as f64);
        let slice =
            HovmollerSlice::compute("w_500hPa", field.view(), &grid, LatitudeBand::default(), 1.0)
                .unwrap();
        assert_eq!(slice.values.dim(), (3, 360));
        assert_eq!(slice.values[[2, 100]], 2100.0);
        assert_eq!(slice.empty_bins(), 0);
    }

    #[test]
    fn test_crop_display_range() {
        let grid = one_cell_per_bin();
        let field = Array2::from_shape_fn((2, 360), |(_, c)| c as f64);
        let slice =
            HovmollerSlice::compute("w_200hPa", field.view(), &grid, LatitudeBand::default(), 1.0)
                .unwrap()
                .crop_longitudes(45.0, 150.0);
        assert_eq!(slice.longitudes.len(), 105);
        assert_eq!(slice.longitudes[0], 45.0);
        assert_eq!(slice.values[[0, 0]], 45.0);
        assert_eq!(slice.values[[1, 104]], 149.0);
    }

    #[test]
    fn test_cell_count_mismatch() {
        let grid = one_cell_per_bin();
        let field = Array2::<f64>::zeros((2, 10));
        assert!(
            HovmollerSlice::compute("w_500hPa", field.view(), &grid, LatitudeBand::default(), 1.0)
                .is_err()
        );
    }
}
