//! Locating real MPAS output for optional tests.
//!
//! Full-resolution runs are several gigabytes and never checked in. Tests
//! that want them look in `$MPAS_TEST_DATA`, then in `<workspace>/testdata`.

use std::path::{Path, PathBuf};

/// Environment variable naming a directory of real MPAS output.
pub const TEST_DATA_ENV: &str = "MPAS_TEST_DATA";

/// Workspace root: two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Directories searched for real data, most specific first.
pub fn test_data_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(2);
    if let Ok(dir) = std::env::var(TEST_DATA_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    dirs.push(workspace_root().join("testdata"));
    dirs
}

/// First directory holding a file that matches `file_glob`, e.g.
/// `diagnostics.2009-0*.nc`.
pub fn find_series_dir(file_glob: &str) -> Option<PathBuf> {
    test_data_dirs()
        .into_iter()
        .find(|dir| has_match(&dir.join(file_glob)))
}

/// Whether a glob pattern matches at least one existing path.
pub fn has_match(pattern: &Path) -> bool {
    glob::glob(&pattern.to_string_lossy())
        .map(|mut paths| paths.any(|entry| entry.is_ok()))
        .unwrap_or(false)
}

/// Temporary directory for fixture files, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
