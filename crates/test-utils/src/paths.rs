//! Path utilities for test output.

use std::path::PathBuf;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Creates a temporary directory for test output.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("rpbin_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Name of the bin file for a timestep, e.g. `frame_0007.bin`.
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{:04}.bin", index)
}
