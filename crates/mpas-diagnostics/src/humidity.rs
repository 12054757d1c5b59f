//! Relative humidity from pressure, potential temperature and mixing ratio.
//!
//! Temperature is recovered from potential temperature with the time-mean
//! pressure of each (cell, level), computed once for the whole series:
//!
//! ```text
//! T  = θ · (P₀ / mean_t(P))^(−R/cp) − 273.15        [°C]
//! es = 610.8 · exp(17.27 · T / (237.3 + T))         [Pa]
//! ws = 621.97 · es / (P − es)                       [g/kg]
//! rh = 1000 · qv / ws · 100                         [%]
//! ```
//!
//! `ws` uses the instantaneous pressure. Values above 100 % are kept; the
//! colorbar extends past its top level for them.

use mpas_common::{MpasError, MpasResult};
use ndarray::{Array3, ArrayView3, Zip};
use serde::{Deserialize, Serialize};

/// Gas constant over specific heat of dry air, 287/1004.
pub const R_OVER_CP: f64 = 287.0 / 1004.0;

/// Offset between kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Standard reference pressure (Pa).
pub const STANDARD_PRESSURE: f64 = 100_000.0;

/// Reference pressure `P₀` of the potential temperature conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePressure {
    /// Pressure at the first time step, first selected cell, lowest level
    #[default]
    FirstSample,
    /// 1000 hPa
    Standard,
}

impl ReferencePressure {
    /// Resolve against a `(time, cell, level)` pressure field.
    pub fn resolve(&self, pressure: ArrayView3<f64>) -> MpasResult<f64> {
        match self {
            ReferencePressure::Standard => Ok(STANDARD_PRESSURE),
            ReferencePressure::FirstSample => pressure.get((0, 0, 0)).copied().ok_or_else(|| {
                MpasError::EmptySelection(
                    "first-sample reference pressure needs at least one cell".to_string(),
                )
            }),
        }
    }
}

/// Temperature (°C) from potential temperature (K).
#[inline]
pub fn temperature_celsius(theta: f64, p0: f64, p_mean: f64) -> f64 {
    theta * (p0 / p_mean).powf(-R_OVER_CP) - KELVIN_OFFSET
}

/// Magnus saturation vapour pressure (Pa) at `t_celsius`.
#[inline]
pub fn saturation_vapor_pressure(t_celsius: f64) -> f64 {
    610.8 * (17.27 * t_celsius / (237.3 + t_celsius)).exp()
}

/// Saturation mixing ratio (g/kg).
#[inline]
pub fn saturation_mixing_ratio(es: f64, pressure: f64) -> f64 {
    621.97 * es / (pressure - es)
}

/// Relative humidity (%) from mixing ratio `qv` (kg/kg) and `ws` (g/kg).
#[inline]
pub fn relative_humidity(qv: f64, ws: f64) -> f64 {
    1000.0 * qv / ws * 100.0
}

/// Relative humidity of every sample of `(time, cell, level)` fields.
pub fn relative_humidity_field(
    pressure: ArrayView3<f64>,
    theta: ArrayView3<f64>,
    qv: ArrayView3<f64>,
    reference: ReferencePressure,
) -> MpasResult<Array3<f64>> {
    for (name, field) in [("theta", theta), ("qv", qv)] {
        if field.shape() != pressure.shape() {
            return Err(MpasError::shape(name, pressure.shape(), field.shape()));
        }
    }

    let p0 = reference.resolve(pressure)?;
    let p_mean = crate::reduce::time_mean(pressure);

    let mut rh = Array3::from_elem(pressure.raw_dim(), f64::NAN);
    for (t, mut rh_t) in rh.outer_iter_mut().enumerate() {
        let p_t = pressure.index_axis(ndarray::Axis(0), t);
        let theta_t = theta.index_axis(ndarray::Axis(0), t);
        let qv_t = qv.index_axis(ndarray::Axis(0), t);
        Zip::from(&mut rh_t)
            .and(&p_t)
            .and(&theta_t)
            .and(&qv_t)
            .and(&p_mean)
            .for_each(|out, &p, &th, &q, &pm| {
                let t_c = temperature_celsius(th, p0, pm);
                let ws = saturation_mixing_ratio(saturation_vapor_pressure(t_c), p);
                *out = relative_humidity(q, ws);
            });
    }
    Ok(rh)
}
