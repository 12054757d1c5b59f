//! Altitude–time relative humidity profiles over a small window.

use mpas_common::{CalendarAxis, CellGrid, GeoWindow, LonConvention, MpasError, MpasResult};
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use netcdf_parser::MultiFileDataset;
use tracing::info;

use crate::humidity::{relative_humidity_field, ReferencePressure};
use crate::reduce::{cell_mean, into_time_cell_level, select_cells};
use crate::selector::cell_mask;

/// Relative humidity averaged over a window, `(level, time)`.
#[derive(Debug, Clone)]
pub struct HumidityProfile {
    pub window: GeoWindow,
    /// Cells inside the window
    pub cells: usize,
    /// Bottom interface height of each level (m), averaged over the cells
    pub altitudes: Vec<f64>,
    /// Row per level, column per time step (%)
    pub values: Array2<f64>,
    pub calendar: Option<CalendarAxis>,
}

impl HumidityProfile {
    /// Compute the profile from `(time, cell, level)` fields and the static
    /// `(cell, level interface)` heights.
    ///
    /// `grid` longitudes must follow the window's convention. An empty
    /// window is an error since there is no column to show.
    pub fn compute(
        grid: &CellGrid,
        window: &GeoWindow,
        pressure: ArrayView3<f64>,
        theta: ArrayView3<f64>,
        qv: ArrayView3<f64>,
        zgrid: ArrayView2<f64>,
        reference: ReferencePressure,
    ) -> MpasResult<Self> {
        grid.check_cell_count("pressure_base", pressure.len_of(Axis(1)))?;
        grid.check_cell_count("zgrid", zgrid.nrows())?;

        let mask = cell_mask(grid, window);
        if mask.count() == 0 {
            return Err(MpasError::EmptySelection(format!(
                "lat ({}, {}), lon ({}, {})",
                window.lat_min(),
                window.lat_max(),
                window.lon_min(),
                window.lon_max()
            )));
        }

        let pressure = select_cells(pressure, &mask)?;
        let theta = select_cells(theta, &mask)?;
        let qv = select_cells(qv, &mask)?;

        let n_levels = pressure.len_of(Axis(2));
        if zgrid.ncols() < n_levels {
            return Err(MpasError::shape("zgrid", &[grid.len(), n_levels + 1], zgrid.shape()));
        }

        let rh = relative_humidity_field(pressure.view(), theta.view(), qv.view(), reference)?;
        let values = cell_mean(rh.view()).reversed_axes();

        let altitudes = (0..n_levels)
            .map(|k| {
                mask.indices().iter().map(|&c| zgrid[[c, k]]).sum::<f64>() / mask.count() as f64
            })
            .collect();

        info!(
            cells = mask.count(),
            levels = n_levels,
            steps = values.ncols(),
            "Computed humidity profile"
        );

        Ok(Self {
            window: *window,
            cells: mask.count(),
            altitudes,
            values,
            calendar: None,
        })
    }

    /// Load `pressure_base`, `theta`, `qv` and `zgrid` from a model output
    /// series and compute the profile.
    pub fn from_dataset(
        dataset: &MultiFileDataset,
        window: &GeoWindow,
        convention: LonConvention,
        reference: ReferencePressure,
    ) -> MpasResult<Self> {
        let grid = dataset.read_cell_grid()?.with_lon_convention(convention);

        let read = |name: &str| -> MpasResult<_> {
            into_time_cell_level(name, dataset.read_time_series(name)?)
        };
        let pressure = read("pressure_base")?;
        let theta = read("theta")?;
        let qv = read("qv")?;
        let zgrid = dataset.read_static("zgrid")?;
        let zgrid_shape = zgrid.shape().to_vec();
        let zgrid = zgrid
            .into_dimensionality::<ndarray::Ix2>()
            .map_err(|_| MpasError::rank("zgrid (cell, level)", 2, &zgrid_shape))?;
        dataset.check_one_step_per_file()?;

        let mut profile = Self::compute(
            &grid,
            window,
            pressure.view(),
            theta.view(),
            qv.view(),
            zgrid.view(),
            reference,
        )?;
        profile.calendar = dataset.calendar();
        Ok(profile)
    }

    pub fn n_levels(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_times(&self) -> usize {
        self.values.ncols()
    }
}
