//! Common fixtures for rpbin tests.

/// Default station geometry.
pub mod station {
    /// Station position (row, col).
    pub const CENTRE: (i32, i32) = (239, 240);

    /// Sensitive pixels (row, col) around the station.
    pub const SENSITIVE_PIXELS: [(i32, i32); 4] = [(204, 264), (205, 264), (204, 265), (205, 265)];

    /// Heavy rain threshold.
    pub const HEAVY_THRESHOLD: i32 = 3;

    /// Fingerprint of the default station.
    pub const FINGERPRINT: &str = "163f697e";

    /// Side of the square radar image.
    pub const IMAGE_SIDE: usize = 480;
}

/// A small worked example with known downsampled results.
pub mod sample {
    /// Width of the sample grid.
    pub const WIDTH: usize = 6;

    /// Height of the sample grid.
    pub const HEIGHT: usize = 4;

    /// The sample grid, row-major.
    pub const GRID: [u8; WIDTH * HEIGHT] = [
        0, 4, 3, 4, 9, 10, //
        0, 2, 9, 7, 3, 1, //
        2, 0, 3, 5, 3, 1, //
        11, 8, 3, 1, 5, 6,
    ];

    /// Block maxima at scale 2 (3 x 2).
    pub const MAX_SCALE_2: [u8; 6] = [4, 9, 10, 11, 5, 6];

    /// Block maxima at scale 3 (2 x 2).
    pub const MAX_SCALE_3: [u8; 4] = [9, 10, 11, 6];

    /// TOTALRAIN written with the sample.
    pub const TOTAL_RAIN: u64 = 888;

    /// Returns the sample grid as a vector.
    pub fn grid() -> Vec<u8> {
        GRID.to_vec()
    }
}
