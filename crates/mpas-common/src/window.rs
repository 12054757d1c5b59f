//! Geographic selection windows.

use serde::{Deserialize, Serialize};

use crate::error::{MpasError, MpasResult};

/// Longitude convention a set of coordinates is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LonConvention {
    /// Longitudes in [0, 360)
    #[default]
    #[serde(rename = "zero_to_360")]
    ZeroTo360,
    /// Longitudes in [-180, 180)
    #[serde(rename = "signed_180")]
    Signed180,
}

impl LonConvention {
    /// Map a longitude in degrees into this convention.
    pub fn normalize(&self, lon: f64) -> f64 {
        let mut wrapped = lon.rem_euclid(360.0);
        // rem_euclid rounds tiny negative inputs up to exactly 360
        if wrapped >= 360.0 {
            wrapped = 0.0;
        }
        match self {
            LonConvention::ZeroTo360 => wrapped,
            LonConvention::Signed180 => {
                if wrapped >= 180.0 {
                    wrapped - 360.0
                } else {
                    wrapped
                }
            }
        }
    }
}

/// A rectangular latitude/longitude window in degrees.
///
/// Containment is strict on both axes: a cell lying exactly on a bound is
/// outside the window. Windows never cross the longitude seam; callers
/// needing one must split it in two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct GeoWindow {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl GeoWindow {
    /// Create a window, rejecting empty and seam-crossing bounds.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> MpasResult<Self> {
        if [lat_min, lat_max, lon_min, lon_max].iter().any(|v| !v.is_finite()) {
            return Err(MpasError::InvalidWindow(format!(
                "non-finite bound in ({lat_min}, {lat_max}, {lon_min}, {lon_max})"
            )));
        }
        if lat_min >= lat_max {
            return Err(MpasError::InvalidWindow(format!(
                "latitude min {lat_min} must be below max {lat_max}"
            )));
        }
        if lon_min >= lon_max {
            return Err(MpasError::SeamCrossing { lon_min, lon_max });
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Strict containment test on both axes.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat > self.lat_min && lat < self.lat_max && lon > self.lon_min && lon < self.lon_max
    }

    /// The convention the longitude bounds are written in.
    ///
    /// Negative bounds imply [-180, 180); anything else is read as [0, 360).
    pub fn lon_convention(&self) -> LonConvention {
        if self.lon_min < 0.0 {
            LonConvention::Signed180
        } else {
            LonConvention::ZeroTo360
        }
    }

    /// Center point (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawWindow {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl TryFrom<RawWindow> for GeoWindow {
    type Error = MpasError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        GeoWindow::new(raw.lat_min, raw.lat_max, raw.lon_min, raw.lon_max)
    }
}

impl From<GeoWindow> for RawWindow {
    fn from(w: GeoWindow) -> Self {
        RawWindow {
            lat_min: w.lat_min,
            lat_max: w.lat_max,
            lon_min: w.lon_min,
            lon_max: w.lon_max,
        }
    }
}

/// A latitude band spanning all longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatitudeBand {
    pub min: f64,
    pub max: f64,
}

impl LatitudeBand {
    pub fn new(min: f64, max: f64) -> MpasResult<Self> {
        if !(min < max) {
            return Err(MpasError::InvalidWindow(format!(
                "latitude band min {min} must be below max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Strict containment.
    pub fn contains(&self, lat: f64) -> bool {
        lat > self.min && lat < self.max
    }
}

impl Default for LatitudeBand {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_edges() {
        let w = GeoWindow::new(-0.5, 1.5, 72.0, 74.0).unwrap();
        assert!(w.contains(0.0, 73.0));
        assert!(!w.contains(-0.5, 73.0));
        assert!(!w.contains(0.0, 74.0));
    }

    #[test]
    fn test_normalize_longitudes() {
        assert_eq!(LonConvention::ZeroTo360.normalize(-90.0), 270.0);
        assert_eq!(LonConvention::ZeroTo360.normalize(360.0), 0.0);
        assert_eq!(LonConvention::Signed180.normalize(270.0), -90.0);
        assert_eq!(LonConvention::Signed180.normalize(180.0), -180.0);
        assert_eq!(LonConvention::Signed180.normalize(73.0), 73.0);
    }

    #[test]
    fn test_normalize_tiny_negative_stays_in_range() {
        for lon in [-1e-20, -f64::MIN_POSITIVE, -1e-14] {
            let wrapped = LonConvention::ZeroTo360.normalize(lon);
            assert!((0.0..360.0).contains(&wrapped), "{lon} wrapped to {wrapped}");
            let signed = LonConvention::Signed180.normalize(lon);
            assert!((-180.0..180.0).contains(&signed), "{lon} wrapped to {signed}");
        }
        assert_eq!(LonConvention::ZeroTo360.normalize(-1e-20), 0.0);
    }
}
