//! Configuration for producing and consuming bin files.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RpBinError};
use crate::features::{FeatureExtractor, FeatureLayout};
use crate::fingerprint;
use crate::partition::{ModulePartition, PartitionGeometry, MAX_RADIUS};
use crate::types::Pixel;

/// Station geometry, rain scale and output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpBinConfig {
    /// Station position in the radar image.
    pub centre: Pixel,

    /// Outer radius of the partitioned disc in pixels.
    pub radius: u32,

    /// Number of concentric rings.
    pub ring_count: u32,

    /// Number of angular cuts per ring.
    pub cut_count: u32,

    /// Radius of the bullseye module.
    pub bullseye_radius: u32,

    /// Pixels whose rain state is predicted. The first one centres the
    /// tripwire circle.
    pub sensitive_pixels: Vec<Pixel>,

    /// Radius of the tripwire circle.
    pub tripwire_radius: u32,

    /// First intensity counted as heavy rain.
    pub heavy_threshold: u8,

    /// Number of distinct intensity levels.
    pub num_intensities: u8,

    /// Normalization gap between light and heavy rain.
    pub intensity_gap: u8,

    /// Scaling factors written after the full-resolution payload.
    pub rescales: Vec<u16>,

    /// Gzip level (1-9).
    pub compression_level: u32,

    /// Bytes per module in prepared payloads (2 or 3).
    pub features_per_module: usize,

    /// Maximum number of payloads held by the payload cache.
    pub cache_capacity: usize,
}

impl Default for RpBinConfig {
    fn default() -> Self {
        Self {
            centre: Pixel::new(239, 240),
            radius: 240,
            ring_count: 20,
            cut_count: 40,
            bullseye_radius: 20,
            sensitive_pixels: vec![
                Pixel::new(204, 264),
                Pixel::new(205, 264),
                Pixel::new(204, 265),
                Pixel::new(205, 265),
            ],
            tripwire_radius: 25,
            heavy_threshold: 3,
            num_intensities: 14,
            intensity_gap: 5,
            rescales: vec![2, 3],
            compression_level: 6,
            features_per_module: 3,
            cache_capacity: 64,
        }
    }
}

impl RpBinConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(centre) = lookup("RPBIN_CENTRE").as_deref().and_then(parse_pixel) {
            config.centre = centre;
        }

        if let Some(Ok(radius)) = lookup("RPBIN_RADIUS").map(|v| v.trim().parse()) {
            config.radius = radius;
        }

        if let Some(Ok(rings)) = lookup("RPBIN_RING_COUNT").map(|v| v.trim().parse()) {
            config.ring_count = rings;
        }

        if let Some(Ok(cuts)) = lookup("RPBIN_CUT_COUNT").map(|v| v.trim().parse()) {
            config.cut_count = cuts;
        }

        if let Some(Ok(heavy)) = lookup("RPBIN_HEAVY_THRESHOLD").map(|v| v.trim().parse()) {
            config.heavy_threshold = heavy;
        }

        if let Some(Ok(level)) = lookup("RPBIN_COMPRESSION_LEVEL").map(|v| v.trim().parse()) {
            config.compression_level = level;
        }

        if let Some(Ok(capacity)) = lookup("RPBIN_CACHE_CAPACITY").map(|v| v.trim().parse()) {
            config.cache_capacity = capacity;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(RpBinError::config("radius must be > 0"));
        }

        if self.radius > MAX_RADIUS {
            return Err(RpBinError::config(format!(
                "radius {} exceeds the maximum of {}",
                self.radius, MAX_RADIUS
            )));
        }

        if self.ring_count == 0 {
            return Err(RpBinError::config("ring_count must be >= 1"));
        }

        if self.cut_count == 0 {
            return Err(RpBinError::config("cut_count must be >= 1"));
        }

        if self.ring_count as u64 * self.cut_count as u64 + 2 > u16::MAX as u64 {
            return Err(RpBinError::config(format!(
                "{} rings x {} cuts exceed the 16-bit module count",
                self.ring_count, self.cut_count
            )));
        }

        if !(1..=9).contains(&self.compression_level) {
            return Err(RpBinError::config("compression_level must be 1-9"));
        }

        FeatureLayout::from_width(self.features_per_module)?;

        if self.sensitive_pixels.is_empty() {
            return Err(RpBinError::config("sensitive_pixels must not be empty"));
        }

        if let Some(k) = self.rescales.iter().find(|&&k| k == 0) {
            return Err(RpBinError::config(format!("rescale factor {} must be > 0", k)));
        }

        Ok(())
    }

    /// Fingerprint identifying this station setup.
    pub fn fingerprint(&self) -> String {
        fingerprint::fingerprint(
            self.centre,
            &self.sensitive_pixels,
            self.heavy_threshold as i32,
        )
    }

    /// Partition geometry; the tripwire is centred on the first sensitive
    /// pixel, or on the station when there is none.
    pub fn partition_geometry(&self) -> PartitionGeometry {
        PartitionGeometry {
            centre: self.centre,
            radius: self.radius,
            ring_count: self.ring_count,
            cut_count: self.cut_count,
            bullseye_radius: self.bullseye_radius,
            tripwire_centre: self.sensitive_pixels.first().copied().unwrap_or(self.centre),
            tripwire_radius: self.tripwire_radius,
        }
    }

    pub fn build_partition(&self) -> ModulePartition {
        ModulePartition::build(self.partition_geometry())
    }

    pub fn feature_layout(&self) -> Result<FeatureLayout> {
        FeatureLayout::from_width(self.features_per_module)
    }

    /// Build a feature extractor over a freshly computed partition.
    pub fn feature_extractor(&self) -> Result<FeatureExtractor> {
        let layout = self.feature_layout()?;
        Ok(FeatureExtractor::new(
            &self.build_partition(),
            self.heavy_threshold,
            self.num_intensities,
            self.intensity_gap,
            layout,
        ))
    }
}

/// Parse a "row,col" pair.
fn parse_pixel(value: &str) -> Option<Pixel> {
    let (row, col) = value.split_once(',')?;
    Some(Pixel::new(row.trim().parse().ok()?, col.trim().parse().ok()?))
}
