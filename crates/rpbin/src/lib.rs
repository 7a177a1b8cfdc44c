//! Rain Predictor Bin File Codec
//!
//! This crate reads and writes the compact binary files a rain prediction
//! pipeline uses to store preprocessed radar images. It provides:
//!
//! - **Container codec**: ASCII header plus one gzip body of payload records
//! - **Payload catalog**: raw pixel grids and prepared feature vectors,
//!   dispatched on a 16-bit magic number
//! - **Polar partition**: rings, angular cuts, bullseye and tripwire modules
//!   around a weather station
//! - **Feature extraction**: per-module aggregation of a raw grid
//! - **Payload cache**: LRU cache of decoded payloads per file
//!
//! # Architecture
//!
//! ```text
//! Radar image (u8 intensities)
//!      │
//!      ▼
//! RawPixelPayload::from_grid
//!      │
//!      ├─► scaled_copy(k)  ──► coarser max/avg grids
//!      │
//!      ├─► FeatureExtractor::extract (over ModulePartition)
//!      │         │
//!      │         └─► PreparedFeaturePayload
//!      │
//!      └─► RpBinWriter ──► header + gzip(payload records) ──► file
//!                                                             │
//!                                                             ▼
//!                              RpBinReader / PayloadCache::get_or_load
//! ```
//!
//! # Example
//!
//! ```no_run
//! use rpbin::{RawPixelPayload, RpBinReader, RpBinWriter};
//!
//! # fn main() -> rpbin::Result<()> {
//! let raw = RawPixelPayload::from_grid(6, 4, 0, 0, vec![0; 24])?;
//!
//! let mut writer = RpBinWriter::new();
//! writer.set_total_rain(0);
//! writer.add_raw_with_rescales(raw, &[2, 3])?;
//! writer.write("frame.bin")?;
//!
//! let reader = RpBinReader::open("frame.bin")?;
//! assert_eq!(reader.scales(), vec![1, 2, 3]);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod features;
pub mod fingerprint;
pub mod partition;
pub mod payload;
pub mod types;

// Re-export commonly used types at crate root
pub use cache::{PayloadCache, PayloadQuery};
pub use config::RpBinConfig;
pub use container::{Header, RpBinReader, RpBinWriter};
pub use error::{Result, RpBinError};
pub use features::{normalize, FeatureExtractor, FeatureLayout};
pub use fingerprint::fingerprint;
pub use partition::{ModulePartition, PartitionGeometry, MAX_RADIUS, UNASSIGNED};
pub use payload::{Payload, PayloadKind, PreparedFeaturePayload, RawPixelPayload};
pub use types::{CacheStats, Pixel};
