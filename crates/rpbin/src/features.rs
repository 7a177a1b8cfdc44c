//! Aggregation of raw grids into per-module feature vectors.

use crate::error::{Result, RpBinError};
use crate::partition::ModulePartition;
use crate::payload::{PreparedFeaturePayload, RawPixelPayload};
use crate::types::Pixel;

/// Map a rain intensity onto 0.0..=1.0 with a gap below heavy rain.
///
/// Light intensities map to `value / (n + gap)`, heavy ones (at or above
/// `heavy_threshold`) to `(gap + value) / (n + gap)`, so the two classes
/// never land on neighbouring inputs.
pub fn normalize(value: f64, heavy_threshold: u8, num_intensities: u8, intensity_gap: u8) -> f64 {
    let denominator = num_intensities as f64 + intensity_gap as f64;
    if denominator == 0.0 {
        return 0.0;
    }
    if value < heavy_threshold as f64 {
        value / denominator
    } else {
        (intensity_gap as f64 + value) / denominator
    }
}

/// Per-module tuple layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureLayout {
    /// Peak and mean.
    Pair,
    /// Peak, mean and rain coverage.
    Triple,
}

impl FeatureLayout {
    pub fn values_per_module(&self) -> usize {
        match self {
            Self::Pair => 2,
            Self::Triple => 3,
        }
    }

    pub fn from_width(width: usize) -> Result<Self> {
        match width {
            2 => Ok(Self::Pair),
            3 => Ok(Self::Triple),
            other => Err(RpBinError::config(format!(
                "features per module must be 2 or 3, got {}",
                other
            ))),
        }
    }
}

/// Builds prepared payloads from full-resolution raw payloads.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    modules: Vec<Vec<Pixel>>,
    num_rings: u16,
    num_cuts: u16,
    heavy_threshold: u8,
    num_intensities: u8,
    intensity_gap: u8,
    layout: FeatureLayout,
}

impl FeatureExtractor {
    pub fn new(
        partition: &ModulePartition,
        heavy_threshold: u8,
        num_intensities: u8,
        intensity_gap: u8,
        layout: FeatureLayout,
    ) -> Self {
        Self {
            modules: partition.module_pixels(),
            num_rings: partition.geometry().ring_count as u16,
            num_cuts: partition.geometry().cut_count as u16,
            heavy_threshold,
            num_intensities,
            intensity_gap,
            layout,
        }
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Aggregate `raw` over every module.
    ///
    /// Module pixels are absolute full-resolution positions; pixels outside
    /// the grid are skipped, and a module with none inside emits zeros.
    pub fn extract(&self, raw: &RawPixelPayload) -> Result<PreparedFeaturePayload> {
        let width = self.layout.values_per_module();
        let mut data = Vec::with_capacity(self.modules.len() * width);

        for pixels in &self.modules {
            let values: Vec<u8> = pixels.iter().filter_map(|&p| raw.value_at(p)).collect();
            if values.is_empty() {
                data.extend(std::iter::repeat(0u8).take(width));
                continue;
            }

            let norm = |v: f64| {
                normalize(v, self.heavy_threshold, self.num_intensities, self.intensity_gap)
            };
            let peak = values.iter().copied().max().unwrap_or(0);
            let mean = values.iter().map(|&v| norm(v as f64)).sum::<f64>() / values.len() as f64;

            data.push(to_byte(norm(peak as f64)));
            data.push(to_byte(mean));
            if self.layout == FeatureLayout::Triple {
                let wet = values.iter().filter(|&&v| v > 0).count();
                data.push(to_byte(wet as f64 / values.len() as f64));
            }
        }

        PreparedFeaturePayload::from_modules(data.len(), self.num_rings, self.num_cuts, data)
    }
}

fn to_byte(fraction: f64) -> u8 {
    (fraction * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionGeometry;

    #[test]
    fn test_normalize_gap() {
        // 14 intensities, gap 5, heavy from 3.
        assert!((normalize(2.0, 3, 14, 5) - 2.0 / 19.0).abs() < 1e-12);
        assert!((normalize(3.0, 3, 14, 5) - 8.0 / 19.0).abs() < 1e-12);
        assert!((normalize(14.0, 3, 14, 5) - 1.0).abs() < 1e-12);
        assert_eq!(normalize(0.0, 3, 14, 5), 0.0);
        assert_eq!(normalize(5.0, 3, 0, 0), 0.0);
    }

    #[test]
    fn test_layout_from_width() {
        assert_eq!(FeatureLayout::from_width(2).unwrap(), FeatureLayout::Pair);
        assert_eq!(FeatureLayout::from_width(3).unwrap(), FeatureLayout::Triple);
        assert!(FeatureLayout::from_width(4).is_err());
    }

    fn partition() -> ModulePartition {
        ModulePartition::build(PartitionGeometry {
            centre: Pixel::new(5, 5),
            radius: 4,
            ring_count: 2,
            cut_count: 4,
            bullseye_radius: 1,
            tripwire_centre: Pixel::new(2, 5),
            tripwire_radius: 1,
        })
    }

    #[test]
    fn test_extract_dry_grid() {
        let raw = RawPixelPayload::from_grid(11, 11, 0, 0, vec![0; 121]).unwrap();
        let extractor = FeatureExtractor::new(&partition(), 3, 14, 5, FeatureLayout::Triple);
        let prepared = extractor.extract(&raw).unwrap();

        assert_eq!(prepared.num_modules(), 10);
        assert_eq!(prepared.num_rings(), 2);
        assert_eq!(prepared.data_length(), 30);
        assert!(prepared.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_extract_heavy_bullseye() {
        let mut values = vec![0u8; 121];
        values[5 * 11 + 5] = 14;
        let raw = RawPixelPayload::from_grid(11, 11, 0, 0, values).unwrap();
        let part = partition();
        let extractor = FeatureExtractor::new(&part, 3, 14, 5, FeatureLayout::Triple);
        let prepared = extractor.extract(&raw).unwrap();

        let bullseye = prepared.module(part.bullseye_index()).unwrap();
        // Five bullseye pixels, one at full intensity.
        assert_eq!(bullseye, &[255, 51, 51]);
        assert_eq!(prepared.module(0).unwrap(), &[0, 0, 0]);
    }

    #[test]
    fn test_extract_pair_layout_and_offgrid() {
        // Grid covers only the top-left corner of the disc.
        let raw = RawPixelPayload::from_grid(5, 5, 0, 0, vec![1; 25]).unwrap();
        let extractor = FeatureExtractor::new(&partition(), 3, 14, 5, FeatureLayout::Pair);
        let prepared = extractor.extract(&raw).unwrap();

        assert_eq!(prepared.data_length(), 20);
        assert_eq!(prepared.values_per_module(), Some(2));
        // Sector 0 of the inner ring lies right of the centre, off the grid.
        assert_eq!(prepared.module(0).unwrap(), &[0, 0]);
        // Outer ring, upper-left sector touches the grid.
        let upper_left = prepared.module(4 + 2).unwrap();
        assert_eq!(upper_left, &[13, 13]);
    }
}
