//! Unstructured cell grids.

use crate::error::{MpasError, MpasResult};
use crate::window::LonConvention;

/// Convert an angle from radians to degrees (×180/π).
pub fn radians_to_degrees(rad: f64) -> f64 {
    rad * 180.0 / std::f64::consts::PI
}

/// Convert an angle from degrees to radians.
pub fn degrees_to_radians(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Cell-center coordinates of an unstructured grid, in degrees.
///
/// Cell order matches the cell dimension of every field read from the same
/// file set.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
}

impl CellGrid {
    /// Build a grid from coordinates already in degrees.
    pub fn from_degrees(lat: Vec<f64>, lon: Vec<f64>) -> MpasResult<Self> {
        if lat.len() != lon.len() {
            return Err(MpasError::shape("lonCell", &[lat.len()], &[lon.len()]));
        }
        Ok(Self { lat, lon })
    }

    /// Build a grid from `latCell`/`lonCell` values stored in radians.
    pub fn from_radians(lat_rad: &[f64], lon_rad: &[f64]) -> MpasResult<Self> {
        Self::from_degrees(
            lat_rad.iter().copied().map(radians_to_degrees).collect(),
            lon_rad.iter().copied().map(radians_to_degrees).collect(),
        )
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    /// Latitudes in degrees.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitudes in degrees.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Iterate (lat, lon) pairs in cell order.
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lat.iter().copied().zip(self.lon.iter().copied())
    }

    /// Return a copy with longitudes mapped into `convention`.
    pub fn with_lon_convention(&self, convention: LonConvention) -> Self {
        Self {
            lat: self.lat.clone(),
            lon: self.lon.iter().map(|&l| convention.normalize(l)).collect(),
        }
    }

    /// Fail unless a field's cell dimension matches this grid.
    pub fn check_cell_count(&self, what: &str, n_cells: usize) -> MpasResult<()> {
        if n_cells != self.len() {
            return Err(MpasError::shape(what, &[self.len()], &[n_cells]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radian_degree_roundtrip() {
        for &deg in &[-180.0, -90.0, -0.5, 0.0, 1.5, 73.0, 359.75] {
            let back = radians_to_degrees(degrees_to_radians(deg));
            assert!((back - deg).abs() < 1e-10, "{deg} came back as {back}");
        }
    }

    #[test]
    fn test_from_radians() {
        let pi = std::f64::consts::PI;
        let grid = CellGrid::from_radians(&[0.0, pi / 2.0], &[pi, 1.5 * pi]).unwrap();
        assert_eq!(grid.len(), 2);
        assert!((grid.lat()[1] - 90.0).abs() < 1e-12);
        assert!((grid.lon()[0] - 180.0).abs() < 1e-12);
        assert!((grid.lon()[1] - 270.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(CellGrid::from_degrees(vec![0.0, 1.0], vec![0.0]).is_err());
    }

    #[test]
    fn test_lon_convention() {
        let grid = CellGrid::from_degrees(vec![0.0, 0.0], vec![73.0, 200.0]).unwrap();
        let signed = grid.with_lon_convention(LonConvention::Signed180);
        assert_eq!(signed.lon(), &[73.0, -160.0]);
        assert_eq!(signed.lat(), grid.lat());
    }
}
