//! Shared test utilities for the rpbin workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Temporary output directories
//! - Rain intensity grid generators
//! - Station fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(96.4, 96.0, 0.5); // passes
/// assert_approx_eq!(1.1, 1.0, 0.001); // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that every cell of a row-major grid satisfies a predicate.
///
/// The failure message names the offending (row, col).
#[macro_export]
macro_rules! assert_grid_all {
    ($grid:expr, $width:expr, |$cell:ident| $pred:expr) => {{
        let width: usize = $width as usize;
        for (i, &$cell) in $grid.iter().enumerate() {
            if !($pred) {
                panic!(
                    "grid cell ({}, {}) = {:?} fails `{}`",
                    i / width,
                    i % width,
                    $cell,
                    stringify!($pred)
                );
            }
        }
    }};
}
