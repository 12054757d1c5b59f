//! Spatial selection of unstructured grid cells.
//!
//! A [`CellMask`] marks the cells whose center lies strictly inside a
//! window. Masks behave like boolean vectors over the cell dimension but
//! store only the selected indices, so the 360 longitude bins of a
//! Hovmöller band cost no more than the band itself.

use mpas_common::{CellGrid, GeoWindow, LatitudeBand, MpasError, MpasResult};
use tracing::debug;

/// Boolean selection over the cell dimension of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMask {
    len: usize,
    /// Selected cell indices, ascending
    indices: Vec<usize>,
}

impl CellMask {
    /// Build a mask from one flag per cell.
    pub fn from_bools(flags: &[bool]) -> Self {
        Self {
            len: flags.len(),
            indices: flags
                .iter()
                .enumerate()
                .filter_map(|(i, &f)| f.then_some(i))
                .collect(),
        }
    }

    /// Mask over `len` cells selecting every cell that satisfies `pred`.
    pub fn from_predicate(len: usize, mut pred: impl FnMut(usize) -> bool) -> Self {
        Self {
            len,
            indices: (0..len).filter(|&i| pred(i)).collect(),
        }
    }

    /// Mask with nothing selected.
    pub fn none(len: usize) -> Self {
        Self {
            len,
            indices: Vec::new(),
        }
    }

    /// Number of cells the mask ranges over (selected or not).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of selected cells.
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    /// Selected cell indices in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Expand back to one flag per cell.
    pub fn to_bools(&self) -> Vec<bool> {
        let mut flags = vec![false; self.len];
        for &i in &self.indices {
            flags[i] = true;
        }
        flags
    }

    /// Element-wise AND of two masks over the same grid.
    pub fn and(&self, other: &CellMask) -> MpasResult<CellMask> {
        if self.len != other.len {
            return Err(MpasError::shape("cell mask", &[self.len], &[other.len]));
        }

        let (mut a, mut b) = (self.indices.iter().peekable(), other.indices.iter().peekable());
        let mut indices = Vec::with_capacity(self.count().min(other.count()));
        while let (Some(&&x), Some(&&y)) = (a.peek(), b.peek()) {
            match x.cmp(&y) {
                std::cmp::Ordering::Less => {
                    a.next();
                }
                std::cmp::Ordering::Greater => {
                    b.next();
                }
                std::cmp::Ordering::Equal => {
                    indices.push(x);
                    a.next();
                    b.next();
                }
            }
        }

        Ok(CellMask {
            len: self.len,
            indices,
        })
    }
}

/// Cells strictly inside `window`.
///
/// Grid longitudes must already follow the window's convention.
pub fn cell_mask(grid: &CellGrid, window: &GeoWindow) -> CellMask {
    let (lat, lon) = (grid.lat(), grid.lon());
    let mask = CellMask::from_predicate(grid.len(), |i| window.contains(lat[i], lon[i]));
    debug!(
        selected = mask.count(),
        cells = grid.len(),
        "Built window mask"
    );
    mask
}

/// Cells strictly inside a latitude band.
pub fn latitude_mask(grid: &CellGrid, band: &LatitudeBand) -> CellMask {
    let lat = grid.lat();
    CellMask::from_predicate(grid.len(), |i| band.contains(lat[i]))
}

/// One longitude bin of a Hovmöller band.
#[derive(Debug, Clone, PartialEq)]
pub struct LongitudeBin {
    /// Western edge in degrees; the bin is `(west, west + increment)`
    pub west: f64,
    pub mask: CellMask,
}

/// Western edges `0, inc, 2*inc, ...` below 360.
pub fn bin_edges(increment: f64) -> MpasResult<Vec<f64>> {
    if !increment.is_finite() || increment <= 0.0 || increment > 360.0 {
        return Err(MpasError::InvalidWindow(format!(
            "longitude increment must be in (0, 360], got {}",
            increment
        )));
    }
    let n = (360.0 / increment).ceil() as usize;
    Ok((0..n)
        .map(|i| i as f64 * increment)
        .filter(|&w| w < 360.0)
        .collect())
}

/// Masks for every longitude bin `(w, w + increment)` across [0, 360),
/// each intersected with the latitude band.
///
/// Grid longitudes must be in [0, 360). Both edges are strict, so a cell
/// sitting exactly on a bin edge belongs to no bin.
pub fn longitude_bin_masks(
    grid: &CellGrid,
    band: &LatitudeBand,
    increment: f64,
) -> MpasResult<Vec<LongitudeBin>> {
    let edges = bin_edges(increment)?;
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); edges.len()];

    let in_band = latitude_mask(grid, band);
    let lon = grid.lon();
    for &cell in in_band.indices() {
        let l = lon[cell];
        let guess = (l / increment).floor() as isize;
        // Neighbours cover rounding in the division
        let bin = [guess - 1, guess, guess + 1].into_iter().find(|&b| {
            b >= 0 && (b as usize) < edges.len() && {
                let west = edges[b as usize];
                west < l && l < west + increment
            }
        });
        if let Some(b) = bin {
            members[b as usize].push(cell);
        }
    }

    let bins: Vec<LongitudeBin> = edges
        .into_iter()
        .zip(members)
        .map(|(west, indices)| LongitudeBin {
            west,
            mask: CellMask {
                len: grid.len(),
                indices,
            },
        })
        .collect();

    debug!(
        bins = bins.len(),
        band_cells = in_band.count(),
        empty = bins.iter().filter(|b| b.mask.count() == 0).count(),
        "Built longitude bins"
    );
    Ok(bins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(lat: &[f64], lon: &[f64]) -> CellGrid {
        CellGrid::from_degrees(lat.to_vec(), lon.to_vec()).unwrap()
    }

    #[test]
    fn test_from_bools_round_trip() {
        let flags = [true, false, true, true, false];
        let mask = CellMask::from_bools(&flags);
        assert_eq!(mask.count(), 3);
        assert_eq!(mask.indices(), &[0, 2, 3]);
        assert_eq!(mask.to_bools(), flags.to_vec());
    }

    #[test]
    fn test_and() {
        let a = CellMask::from_bools(&[true, true, false, true]);
        let b = CellMask::from_bools(&[true, false, true, true]);
        assert_eq!(a.and(&b).unwrap().to_bools(), vec![true, false, false, true]);
    }

    #[test]
    fn test_and_length_mismatch() {
        let a = CellMask::none(3);
        let b = CellMask::none(4);
        assert!(matches!(a.and(&b), Err(MpasError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_cell_mask_length_matches_grid() {
        let g = grid(&[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0]);
        let w = GeoWindow::new(-5.0, 5.0, 0.0, 25.0).unwrap();
        let mask = cell_mask(&g, &w);
        assert_eq!(mask.len(), 3);
        assert_eq!(mask.to_bools(), vec![true, true, false]);
    }

    #[test]
    fn test_bin_edges() {
        assert_eq!(bin_edges(1.0).unwrap().len(), 360);
        assert_eq!(bin_edges(7.0).unwrap().len(), 52);
        assert_eq!(bin_edges(0.5).unwrap()[3], 1.5);
        assert!(bin_edges(0.0).is_err());
        assert!(bin_edges(f64::NAN).is_err());
    }

    #[test]
    fn test_bin_edges_are_strict() {
        let g = grid(&[0.0, 0.0, 0.0], &[10.0, 10.5, 11.0]);
        let bins = longitude_bin_masks(&g, &LatitudeBand::default(), 1.0).unwrap();
        assert_eq!(bins[10].mask.indices(), &[1]);
        assert_eq!(bins[9].mask.count(), 0);
        assert_eq!(bins[11].mask.count(), 0);
    }

    #[test]
    fn test_bins_respect_latitude_band() {
        let g = grid(&[0.0, 15.0, -9.9, -10.0], &[5.5, 5.5, 5.5, 5.5]);
        let bins = longitude_bin_masks(&g, &LatitudeBand::default(), 1.0).unwrap();
        assert_eq!(bins[5].mask.to_bools(), vec![true, false, true, false]);
    }
}
