//! Shared test utilities for the mpas-plot workspace.
//!
//! - Synthetic unstructured grids and atmospheric columns
//! - Writers for small MPAS-style NetCDF series
//! - Lookup of real MPAS output, with a skip macro when it is absent
//! - Tolerance assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, generators::ring_grid};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use generators::*;
pub use paths::*;

/// Directory holding a real MPAS series matching a file glob, or skip.
///
/// Returns from the calling test (after a note on stderr) when no directory
/// from [`test_data_dirs`] has a match.
///
/// ```ignore
/// #[test]
/// fn test_real_diagnostics() {
///     let dir = test_utils::require_mpas_series!("diagnostics.2009-0*.nc");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_mpas_series {
    ($file_glob:expr) => {{
        match $crate::find_series_dir($file_glob) {
            Some(dir) => dir,
            None => {
                eprintln!(
                    "SKIPPED: no '{}' found; set {} to a directory of MPAS output.",
                    $file_glob,
                    $crate::TEST_DATA_ENV
                );
                return;
            }
        }
    }};
}

/// `|left - right| <= epsilon`, compared as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        assert!(
            (left - right).abs() <= epsilon,
            "{} and {} differ by {:e}, tolerance {:e}",
            left,
            right,
            (left - right).abs(),
            epsilon
        );
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(610.8001, 610.8, 0.001);
        assert_approx_eq!(-0.04, -0.04000001_f32, 1e-6);
    }

    #[test]
    #[should_panic(expected = "tolerance")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(3.8223, 3.8, 0.001);
    }
}
