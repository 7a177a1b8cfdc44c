//! Configuration fingerprints.
//!
//! A fingerprint binds training records to the station geometry and rain
//! threshold they were produced with. Records whose fingerprint differs from
//! the running configuration are skipped by consumers.

use md5::{Digest, Md5};

use crate::types::Pixel;

/// Seed mixed into every fingerprint.
pub const FINGERPRINT_SEED: i64 = 0xabcd_dcba;

/// Compute the 8 hex character fingerprint of a configuration.
///
/// The sensitive pixels are hashed in the order given, so reordering the
/// list yields a different fingerprint.
pub fn fingerprint(centre: Pixel, sensitive: &[Pixel], heavy_threshold: i32) -> String {
    let mut hasher = Md5::new();
    hasher.update(hex_field(FINGERPRINT_SEED).as_bytes());
    hasher.update(pixel_fields(centre).as_bytes());
    for pixel in sensitive {
        hasher.update(pixel_fields(*pixel).as_bytes());
    }
    hasher.update(hex_field(heavy_threshold as i64).as_bytes());

    let digest = hasher.finalize();
    digest[..4].iter().map(|b| format!("{:02x}", b)).collect()
}

fn pixel_fields(pixel: Pixel) -> String {
    format!(
        "{}{}",
        hex_field(pixel.row as i64),
        hex_field(pixel.col as i64)
    )
}

/// Lowercase hex, right aligned and zero filled to 8 characters.
///
/// Negative values keep their sign inside the field (`-1` becomes
/// `000000-1`) so existing fingerprints stay stable.
fn hex_field(value: i64) -> String {
    let digits = if value < 0 {
        format!("-{:x}", value.unsigned_abs())
    } else {
        format!("{:x}", value)
    };
    format!("{:0>8}", digits)
}
