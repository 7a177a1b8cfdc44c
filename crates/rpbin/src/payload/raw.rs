//! Raw pixel payloads and their max/mean pooled pyramid levels.

use bytes::BufMut;

use super::record;
use crate::error::{Result, RpBinError};
use crate::types::Pixel;

/// Average byte stored for cells whose maximum is zero.
pub const NO_DATA_AVERAGE: u8 = 255;

/// A grid of rain intensities at one scale.
///
/// `max_values` holds the peak intensity of each cell. `avg_values` holds
/// the cell mean as a fraction of that peak, scaled to 0..=255. At full
/// resolution every cell is its own block, so the fraction is always 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPixelPayload {
    width: u16,
    height: u16,
    x_offset: u16,
    y_offset: u16,
    scaling: u16,
    max_values: Vec<u8>,
    avg_values: Vec<u8>,
}

impl RawPixelPayload {
    /// Build a full-resolution payload from a row-major grid.
    pub fn from_grid(
        width: u16,
        height: u16,
        x_offset: u16,
        y_offset: u16,
        values: Vec<u8>,
    ) -> Result<Self> {
        let avg_values = vec![NO_DATA_AVERAGE; values.len()];
        Self::from_parts(width, height, x_offset, y_offset, 1, values, avg_values)
    }

    /// Build a payload from all of its fields.
    pub fn from_parts(
        width: u16,
        height: u16,
        x_offset: u16,
        y_offset: u16,
        scaling: u16,
        max_values: Vec<u8>,
        avg_values: Vec<u8>,
    ) -> Result<Self> {
        let cells = width as usize * height as usize;
        if max_values.len() != cells || avg_values.len() != cells {
            return Err(RpBinError::invalid_payload(format!(
                "{}x{} grid needs {} cells, got {} max and {} average values",
                width,
                height,
                cells,
                max_values.len(),
                avg_values.len()
            )));
        }
        if scaling == 0 {
            return Err(RpBinError::invalid_payload("scaling factor must be > 0"));
        }

        Ok(Self {
            width,
            height,
            x_offset,
            y_offset,
            scaling,
            max_values,
            avg_values,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn x_offset(&self) -> u16 {
        self.x_offset
    }

    pub fn y_offset(&self) -> u16 {
        self.y_offset
    }

    /// Edge length in full-resolution pixels of one cell (1 = full resolution).
    pub fn scaling(&self) -> u16 {
        self.scaling
    }

    /// Peak intensities, row-major.
    pub fn max_values(&self) -> &[u8] {
        &self.max_values
    }

    /// Mean-to-peak ratios scaled to 0..=255, row-major.
    pub fn avg_values(&self) -> &[u8] {
        &self.avg_values
    }

    /// Peak intensity at a grid cell.
    pub fn max_at(&self, row: usize, col: usize) -> Option<u8> {
        self.index(row, col).map(|i| self.max_values[i])
    }

    /// Average byte at a grid cell.
    pub fn avg_at(&self, row: usize, col: usize) -> Option<u8> {
        self.index(row, col).map(|i| self.avg_values[i])
    }

    /// Peak intensity covering an absolute full-resolution pixel.
    ///
    /// The pixel is shifted by the grid offsets and divided by the scaling
    /// factor; `None` when it falls outside the grid.
    pub fn value_at(&self, pixel: Pixel) -> Option<u8> {
        let row = pixel.row as i64 - self.y_offset as i64;
        let col = pixel.col as i64 - self.x_offset as i64;
        if row < 0 || col < 0 {
            return None;
        }
        let scale = self.scaling as i64;
        self.max_at((row / scale) as usize, (col / scale) as usize)
    }

    /// Largest intensity in the grid.
    pub fn peak(&self) -> u8 {
        self.max_values.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all peak intensities.
    pub fn total(&self) -> u64 {
        self.max_values.iter().map(|&v| v as u64).sum()
    }

    /// Produce a coarser copy pooled over `edge_scale`×`edge_scale` blocks.
    ///
    /// Output dimensions round up, so blocks on the right and bottom edges
    /// are clipped to the grid. Each output cell stores the block maximum
    /// and `round(mean / max * 255)`, or [`NO_DATA_AVERAGE`] when the
    /// maximum is zero.
    pub fn scaled_copy(&self, edge_scale: u16) -> Result<Self> {
        if edge_scale == 0 {
            return Err(RpBinError::invalid_payload("edge scale must be > 0"));
        }
        let scaling = self.scaling.checked_mul(edge_scale).ok_or_else(|| {
            RpBinError::invalid_payload(format!(
                "scaling {} x {} overflows",
                self.scaling, edge_scale
            ))
        })?;

        let k = edge_scale as usize;
        let (width, height) = (self.width as usize, self.height as usize);
        let new_width = width.div_ceil(k);
        let new_height = height.div_ceil(k);

        let mut max_values = vec![0u8; new_width * new_height];
        let mut avg_values = vec![NO_DATA_AVERAGE; new_width * new_height];

        for out_row in 0..new_height {
            for out_col in 0..new_width {
                let rows = out_row * k..((out_row + 1) * k).min(height);
                let cols = out_col * k..((out_col + 1) * k).min(width);

                let mut max = 0u8;
                let mut sum = 0u64;
                let mut count = 0u64;
                for row in rows {
                    for &v in &self.max_values[row * width + cols.start..row * width + cols.end] {
                        max = max.max(v);
                        sum += v as u64;
                        count += 1;
                    }
                }

                let idx = out_row * new_width + out_col;
                if count == 0 {
                    continue;
                }
                max_values[idx] = max;
                avg_values[idx] = average_byte(sum as f64 / count as f64, max);
            }
        }

        Ok(Self {
            width: new_width as u16,
            height: new_height as u16,
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            scaling,
            max_values,
            avg_values,
        })
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.height as usize || col >= self.width as usize {
            return None;
        }
        Some(row * self.width as usize + col)
    }

    /// Bytes this payload occupies after the common prefix.
    pub(crate) fn body_len(&self) -> usize {
        5 * 2 + 2 * self.max_values.len()
    }

    pub(crate) fn encode_body(&self, out: &mut Vec<u8>) {
        out.put_u16(self.width);
        out.put_u16(self.height);
        out.put_u16(self.x_offset);
        out.put_u16(self.y_offset);
        out.put_u16(self.scaling);
        out.put_slice(&self.max_values);
        out.put_slice(&self.avg_values);
    }

    pub(crate) fn decode_body(buf: &mut &[u8]) -> Result<Self> {
        let width = record::take_u16(buf, "raw width")?;
        let height = record::take_u16(buf, "raw height")?;
        let x_offset = record::take_u16(buf, "raw x offset")?;
        let y_offset = record::take_u16(buf, "raw y offset")?;
        let scaling = record::take_u16(buf, "raw scaling")?;

        let cells = width as usize * height as usize;
        let max_values = record::take_bytes(buf, cells, "raw max buffer")?;
        let avg_values = record::take_bytes(buf, cells, "raw average buffer")?;

        Self::from_parts(width, height, x_offset, y_offset, scaling, max_values, avg_values)
            .map_err(|e| RpBinError::corruption(e.to_string()))
    }
}

fn average_byte(mean: f64, max: u8) -> u8 {
    if max == 0 {
        return NO_DATA_AVERAGE;
    }
    (mean / max as f64 * 255.0).round().min(255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawPixelPayload {
        #[rustfmt::skip]
        let values = vec![
            0, 4, 3, 4, 9, 10,
            0, 2, 9, 7, 3, 1,
            2, 0, 3, 5, 3, 1,
            11, 8, 3, 1, 5, 6,
        ];
        RawPixelPayload::from_grid(6, 4, 0, 0, values).unwrap()
    }

    #[test]
    fn test_from_grid_defaults() {
        let raw = sample();
        assert_eq!(raw.scaling(), 1);
        assert!(raw.avg_values().iter().all(|&v| v == NO_DATA_AVERAGE));
        assert_eq!(raw.max_at(3, 0), Some(11));
        assert_eq!(raw.max_at(4, 0), None);
        assert_eq!(raw.peak(), 11);
        assert_eq!(raw.total(), 100);
    }

    #[test]
    fn test_from_grid_wrong_size() {
        let result = RawPixelPayload::from_grid(3, 3, 0, 0, vec![0; 8]);
        assert!(matches!(result, Err(RpBinError::InvalidPayload(_))));
    }

    #[test]
    fn test_scaled_copy_by_two() {
        let scaled = sample().scaled_copy(2).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (3, 2));
        assert_eq!(scaled.scaling(), 2);
        assert_eq!(scaled.max_values(), &[4, 9, 10, 11, 5, 6]);
        // Block [0, 4, 0, 2]: mean 1.5 of max 4.
        assert_eq!(scaled.avg_at(0, 0), Some(96));
        // Block [9, 10, 3, 1]: mean 5.75 of max 10.
        assert_eq!(scaled.avg_at(0, 2), Some(147));
    }

    #[test]
    fn test_scaled_copy_clips_edges() {
        let scaled = sample().scaled_copy(3).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (2, 2));
        assert_eq!(scaled.max_values(), &[9, 10, 11, 6]);
        // Bottom-left block only has the last row: [11, 8, 3].
        assert_eq!(scaled.avg_at(1, 0), Some(170));
    }

    #[test]
    fn test_zero_block_average_sentinel() {
        let raw = RawPixelPayload::from_grid(2, 2, 0, 0, vec![0; 4]).unwrap();
        let scaled = raw.scaled_copy(2).unwrap();
        assert_eq!(scaled.max_values(), &[0]);
        assert_eq!(scaled.avg_values(), &[NO_DATA_AVERAGE]);
    }

    #[test]
    fn test_scaled_copy_rejects_zero() {
        assert!(sample().scaled_copy(0).is_err());
    }

    #[test]
    fn test_scaled_copy_does_not_alias() {
        let raw = sample();
        let scaled = raw.scaled_copy(1).unwrap();
        assert_eq!(scaled.max_values(), raw.max_values());
        assert_ne!(scaled.max_values().as_ptr(), raw.max_values().as_ptr());
    }

    #[test]
    fn test_value_at_absolute() {
        let raw = RawPixelPayload::from_grid(6, 4, 100, 200, sample().max_values().to_vec())
            .unwrap();
        assert_eq!(raw.value_at(Pixel::new(203, 100)), Some(11));
        assert_eq!(raw.value_at(Pixel::new(199, 100)), None);
        assert_eq!(raw.value_at(Pixel::new(200, 106)), None);

        let scaled = raw.scaled_copy(2).unwrap();
        assert_eq!(scaled.value_at(Pixel::new(203, 100)), Some(11));
        assert_eq!(scaled.value_at(Pixel::new(201, 105)), Some(10));
    }
}
