//! Synthetic grids and atmospheric profiles for tests.
//!
//! These generators create predictable, verifiable data patterns that can be
//! used across the test suite.

use mpas_common::CellGrid;

/// Cell-center coordinates in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticGrid {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl SyntheticGrid {
    pub fn len(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    pub fn to_cell_grid(&self) -> CellGrid {
        CellGrid::from_degrees(self.lat.clone(), self.lon.clone())
            .expect("synthetic grid has matching coordinate lengths")
    }
}

/// Creates rings of cells, one cell per 1° longitude bin at each latitude.
///
/// Cell `i` of ring `r` sits at `(lats[r], i + 0.5)`, so every bin
/// `(b, b + 1)` holds exactly one cell per ring.
///
/// # Example
///
/// ```
/// use test_utils::ring_grid;
///
/// let grid = ring_grid(&[0.0, 20.0]);
/// assert_eq!(grid.len(), 720);
/// assert_eq!(grid.lon[0], 0.5);
/// assert_eq!(grid.lat[360], 20.0);
/// ```
pub fn ring_grid(lats: &[f64]) -> SyntheticGrid {
    ring_grid_with_gaps(lats, &[])
}

/// Like [`ring_grid`] but leaves the listed longitude bins without cells.
pub fn ring_grid_with_gaps(lats: &[f64], empty_bins: &[usize]) -> SyntheticGrid {
    let mut lat = Vec::new();
    let mut lon = Vec::new();
    for &ring_lat in lats {
        for bin in (0..360).filter(|b| !empty_bins.contains(b)) {
            lat.push(ring_lat);
            lon.push(bin as f64 + 0.5);
        }
    }
    SyntheticGrid { lat, lon }
}

/// Four cells around the Maldives window (lat -0.5..1.5, lon 72..74); only
/// the first one lies inside it.
pub fn maldives_cells() -> SyntheticGrid {
    SyntheticGrid {
        lat: vec![0.0, 5.0, -20.0, 0.0],
        lon: vec![73.0, 73.0, 73.0, 200.0],
    }
}

/// A plausible tropical column on `n_levels` layers, 1 km thick.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    /// Layer-interface heights (m), `n_levels + 1` values
    pub zgrid: Vec<f64>,
    /// Layer pressure (Pa)
    pub pressure: Vec<f64>,
    /// Potential temperature (K)
    pub theta: Vec<f64>,
    /// Water vapour mixing ratio (kg/kg)
    pub qv: Vec<f64>,
}

/// Creates an idealised column: exponential pressure with a 7 km scale
/// height, 6.5 K/km lapse rate from 300 K, and moisture decaying with a
/// 2.5 km scale height.
pub fn tropical_column(n_levels: usize) -> ColumnProfile {
    let zgrid: Vec<f64> = (0..=n_levels).map(|k| k as f64 * 1000.0).collect();
    let mut pressure = Vec::with_capacity(n_levels);
    let mut theta = Vec::with_capacity(n_levels);
    let mut qv = Vec::with_capacity(n_levels);

    for k in 0..n_levels {
        let z = (zgrid[k] + zgrid[k + 1]) / 2.0;
        let p = 100_000.0 * (-z / 7000.0).exp();
        let t = (300.0 - 6.5e-3 * z).max(210.0);
        pressure.push(p);
        theta.push(t * (100_000.0 / p).powf(287.0 / 1004.0));
        qv.push(0.015 * (-z / 2500.0).exp());
    }

    ColumnProfile {
        zgrid,
        pressure,
        theta,
        qv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_grid_gaps() {
        let grid = ring_grid_with_gaps(&[0.0], &[10, 11]);
        assert_eq!(grid.len(), 358);
        assert!(!grid.lon.contains(&10.5));
        assert!(!grid.lon.contains(&11.5));
        assert!(grid.lon.contains(&12.5));
    }

    #[test]
    fn test_maldives_cells() {
        let grid = maldives_cells();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.to_cell_grid().len(), 4);
    }

    #[test]
    fn test_tropical_column_shapes() {
        let col = tropical_column(20);
        assert_eq!(col.zgrid.len(), 21);
        assert_eq!(col.pressure.len(), 20);
        assert!(col.pressure.windows(2).all(|w| w[0] > w[1]));
        assert!(col.theta.windows(2).all(|w| w[0] < w[1]));
    }
}
