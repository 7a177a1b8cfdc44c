//! Generators for synthetic radar intensity grids.
//!
//! Grids are row-major `Vec<u8>` of rain intensities, row 0 first, matching
//! the layout raw payloads are built from.

/// Creates a grid whose values encode their position.
///
/// Each cell is `(row * 16 + col) % 256`, which makes transposition and
/// offset mistakes easy to spot.
///
/// # Example
///
/// ```
/// use test_utils::create_position_grid;
///
/// let grid = create_position_grid(4, 3);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[1], 1);  // row 0, col 1
/// assert_eq!(grid[4], 16); // row 1, col 0
/// ```
pub fn create_position_grid(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(((row * 16 + col) % 256) as u8);
        }
    }
    data
}

/// Creates a sparse, deterministic rain field.
///
/// About a quarter of the cells carry rain with intensities in
/// `1..=max_intensity`; the rest are dry.
pub fn create_rain_grid(width: usize, height: usize, max_intensity: u8, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let value = if hash % 4 == 0 && max_intensity > 0 {
                1 + (hash >> 8) % max_intensity as u32
            } else {
                0
            };
            data.push(value as u8);
        }
    }
    data
}

/// Creates a single circular storm cell.
///
/// Intensity is `peak` at `(centre_row, centre_col)` and falls off by one
/// level per `falloff` pixels of distance, reaching zero at the edge.
pub fn create_storm_cell_grid(
    width: usize,
    height: usize,
    centre_row: usize,
    centre_col: usize,
    peak: u8,
    falloff: f64,
) -> Vec<u8> {
    let falloff = if falloff > 0.0 { falloff } else { 1.0 };
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dr = row as f64 - centre_row as f64;
            let dc = col as f64 - centre_col as f64;
            let distance = (dr * dr + dc * dc).sqrt();
            let value = (peak as f64 - (distance / falloff).floor()).max(0.0);
            data.push(value as u8);
        }
    }
    data
}

/// Creates a grid filled with a constant intensity.
pub fn create_constant_grid(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_grid_deterministic() {
        let a = create_rain_grid(32, 32, 14, 7);
        let b = create_rain_grid(32, 32, 14, 7);
        assert_eq!(a, b);
        assert_ne!(a, create_rain_grid(32, 32, 14, 8));
    }

    #[test]
    fn test_rain_grid_range() {
        let grid = create_rain_grid(64, 64, 14, 1);
        assert!(grid.iter().all(|&v| v <= 14));
        assert!(grid.iter().any(|&v| v > 0));
        assert!(grid.iter().any(|&v| v == 0));
    }

    #[test]
    fn test_storm_cell_peak_and_edge() {
        let grid = create_storm_cell_grid(21, 21, 10, 10, 9, 1.0);
        assert_eq!(grid[10 * 21 + 10], 9);
        assert_eq!(grid[10 * 21 + 11], 8);
        assert_eq!(grid[0], 0);
    }

    #[test]
    fn test_constant_grid() {
        assert_eq!(create_constant_grid(3, 2, 5), vec![5; 6]);
    }
}
