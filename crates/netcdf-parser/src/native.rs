//! Native NetCDF access using the netcdf library.
//!
//! Thin helpers over the `netcdf` crate for opening MPAS files and reading
//! whole variables as `f64`.

use std::path::Path;
use std::sync::Once;

use crate::error::{NetCdfError, NetCdfResult};

/// Turn off HDF5's automatic error printing for this process.
///
/// Probing MPAS files for optional attributes such as `_FillValue` otherwise
/// floods stderr with `HDF5-DIAG` traces for errors we already handle.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: null handler and client data disable the default stack printer.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a NetCDF file for reading.
pub fn open_file(path: &Path) -> NetCdfResult<netcdf::File> {
    silence_hdf5_errors();

    if !path.exists() {
        return Err(NetCdfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })
}

/// Look up a variable, reporting the file on failure.
pub fn require_variable<'f>(
    file: &'f netcdf::File,
    path: &Path,
    name: &str,
) -> NetCdfResult<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| NetCdfError::MissingVariable {
            file: path.display().to_string(),
            name: name.to_string(),
        })
}

/// Dimension names and lengths of a variable.
pub fn variable_dims(var: &netcdf::Variable) -> (Vec<String>, Vec<usize>) {
    var.dimensions()
        .iter()
        .map(|d| (d.name(), d.len()))
        .unzip()
}

/// Read a whole variable as `f64`, mapping `_FillValue` to NaN.
pub fn read_values_f64(var: &netcdf::Variable, path: &Path) -> NetCdfResult<Vec<f64>> {
    let mut values: Vec<f64> = var.get_values(..).map_err(|e| {
        NetCdfError::InvalidFormat(format!(
            "Failed to read {} from {}: {}",
            var.name(),
            path.display(),
            e
        ))
    })?;

    if let Some(fill) = fill_value(var) {
        for v in values.iter_mut().filter(|v| **v == fill) {
            *v = f64::NAN;
        }
    }

    Ok(values)
}

/// Numeric `_FillValue` of a variable, if declared.
fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    // Listing first keeps HDF5 from logging a failed lookup
    if !var.attributes().any(|attr| attr.name() == "_FillValue") {
        return None;
    }
    let value = var.attribute_value("_FillValue")?.ok()?;
    f64::try_from(value).ok()
}
