//! The ASCII header at the start of every bin file.
//!
//! ```text
//! RAIN PREDICTOR BIN FILE
//! VERSION 4
//! MAXVAL <int>
//! TOTALRAIN <int>
//! ```
//!
//! Keywords and their order are fixed. Any deviation, and any version other
//! than [`FORMAT_VERSION`], is rejected before the body is touched.

use std::io::BufRead;

use crate::error::{Result, RpBinError};

pub const HEADER_KEY: &str = "RAIN PREDICTOR BIN FILE";
pub const VERSION_KEY: &str = "VERSION";
pub const MAXVAL_KEY: &str = "MAXVAL";
pub const TOTALRAIN_KEY: &str = "TOTALRAIN";

/// The only container revision this codec reads or writes.
pub const FORMAT_VERSION: u32 = 4;

/// Global metadata of a bin file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    /// Largest intensity value occurring in the payloads.
    pub max_val: u32,
    /// Sum of intensities over the full-resolution grid.
    pub total_rain: u64,
}

impl Header {
    /// Header for the current format revision.
    pub fn new(max_val: u32, total_rain: u64) -> Self {
        Self {
            version: FORMAT_VERSION,
            max_val,
            total_rain,
        }
    }

    /// Render the four header lines.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{}\n{} {}\n{} {}\n{} {}\n",
            HEADER_KEY,
            VERSION_KEY,
            self.version,
            MAXVAL_KEY,
            self.max_val,
            TOTALRAIN_KEY,
            self.total_rain
        )
        .into_bytes()
    }

    /// Parse the header at the start of `data`.
    ///
    /// Returns the header and the offset where the compressed body begins.
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        let mut cursor = data;
        let header = Self::read_from(&mut cursor)?;
        Ok((header, data.len() - cursor.len()))
    }

    /// Read the header lines from `reader`, leaving it positioned at the body.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self> {
        let key = next_line(reader, "header key")?;
        if key != HEADER_KEY {
            return Err(RpBinError::header_format(format!(
                "not a rain predictor bin file (first line {:?})",
                key
            )));
        }

        let version = keyed_value(&next_line(reader, VERSION_KEY)?, VERSION_KEY)?;
        if version != FORMAT_VERSION as u64 {
            return Err(RpBinError::header_format(format!(
                "file is version {}, only version {} is supported",
                version, FORMAT_VERSION
            )));
        }

        let max_val = keyed_value(&next_line(reader, MAXVAL_KEY)?, MAXVAL_KEY)?;
        let max_val = u32::try_from(max_val)
            .map_err(|_| RpBinError::header_format(format!("{} {} out of range", MAXVAL_KEY, max_val)))?;
        let total_rain = keyed_value(&next_line(reader, TOTALRAIN_KEY)?, TOTALRAIN_KEY)?;

        Ok(Self {
            version: FORMAT_VERSION,
            max_val,
            total_rain,
        })
    }
}

fn next_line<R: BufRead>(reader: &mut R, field: &str) -> Result<String> {
    let mut raw = Vec::new();
    reader.read_until(b'\n', &mut raw)?;
    if raw.last() != Some(&b'\n') {
        return Err(RpBinError::header_format(format!(
            "header ends before the {} line",
            field
        )));
    }
    let line = std::str::from_utf8(&raw)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| RpBinError::header_format(format!("{} line is not ASCII", field)))?;
    Ok(line.trim_end().to_string())
}

fn keyed_value(line: &str, key: &str) -> Result<u64> {
    let (found, value) = line
        .split_once(' ')
        .ok_or_else(|| RpBinError::header_format(format!("expected '{} <int>', got {:?}", key, line)))?;
    if found != key {
        return Err(RpBinError::header_format(format!(
            "expected keyword {}, got {:?}",
            key, found
        )));
    }
    value.parse().map_err(|_| {
        RpBinError::header_format(format!("{} value {:?} is not an integer", key, value))
    })
}
