//! Core types shared across the codec.

use serde::{Deserialize, Serialize};

/// A pixel position in the radar image, in (row, col) order.
///
/// Rows count downward and columns count rightward, the same numbering the
/// source images use. This is a left-handed system: a positive angle from
/// `atan2(row, col)` turns clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pixel {
    pub row: i32,
    pub col: i32,
}

impl Pixel {
    /// Create a new pixel position.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Offset from `origin` as (d_row, d_col).
    pub fn delta_from(&self, origin: Pixel) -> (i64, i64) {
        (
            self.row as i64 - origin.row as i64,
            self.col as i64 - origin.col as i64,
        )
    }
}

impl From<(i32, i32)> for Pixel {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl std::fmt::Display for Pixel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entries: usize,
    /// Number of evictions.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
