//! Writing bin files.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::header::Header;
use crate::error::Result;
use crate::payload::{self, Payload, PreparedFeaturePayload, RawPixelPayload};

/// Accumulates payloads and writes them as one bin file.
///
/// Payloads are written in insertion order.
#[derive(Debug, Clone)]
pub struct RpBinWriter {
    payloads: Vec<Payload>,
    total_rain: Option<u64>,
    compression: Compression,
}

impl Default for RpBinWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RpBinWriter {
    pub fn new() -> Self {
        Self {
            payloads: Vec::new(),
            total_rain: None,
            compression: Compression::default(),
        }
    }

    /// Set the gzip level (0-9).
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// Override the TOTALRAIN header value.
    ///
    /// Without an override the sum of the first full-resolution raw payload
    /// is written.
    pub fn set_total_rain(&mut self, total_rain: u64) -> &mut Self {
        self.total_rain = Some(total_rain);
        self
    }

    pub fn add(&mut self, payload: Payload) -> &mut Self {
        self.payloads.push(payload);
        self
    }

    pub fn add_raw(&mut self, raw: RawPixelPayload) -> &mut Self {
        self.add(Payload::Raw(raw))
    }

    pub fn add_prepared(&mut self, prepared: PreparedFeaturePayload) -> &mut Self {
        self.add(Payload::Prepared(prepared))
    }

    /// Add `raw` followed by one scaled copy per entry of `rescales`.
    pub fn add_raw_with_rescales(
        &mut self,
        raw: RawPixelPayload,
        rescales: &[u16],
    ) -> Result<&mut Self> {
        let scaled = rescales
            .iter()
            .map(|&k| raw.scaled_copy(k))
            .collect::<Result<Vec<_>>>()?;
        self.add_raw(raw);
        for copy in scaled {
            self.add_raw(copy);
        }
        Ok(self)
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    /// Largest intensity in any raw payload.
    pub fn max_val(&self) -> u32 {
        self.payloads
            .iter()
            .filter_map(Payload::as_raw)
            .map(|raw| raw.peak() as u32)
            .max()
            .unwrap_or(0)
    }

    pub fn total_rain(&self) -> u64 {
        self.total_rain.unwrap_or_else(|| {
            self.payloads
                .iter()
                .filter_map(Payload::as_raw)
                .find(|raw| raw.scaling() == 1)
                .map(RawPixelPayload::total)
                .unwrap_or(0)
        })
    }

    pub fn header(&self) -> Header {
        Header::new(self.max_val(), self.total_rain())
    }

    /// Render the complete file image.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the header and compressed body to `out`.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        let body_len: usize = self.payloads.iter().map(Payload::encoded_len).sum();
        let mut body = Vec::with_capacity(body_len);
        for p in &self.payloads {
            payload::encode_into(p, &mut body);
        }

        out.write_all(&self.header().to_bytes())?;
        let mut encoder = GzEncoder::new(out, self.compression);
        encoder.write_all(&body)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Write the file to `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;
        std::fs::write(path, &data)?;

        tracing::debug!(
            path = %path.display(),
            payloads = self.payloads.len(),
            bytes = data.len(),
            "Wrote bin file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_derived_from_payloads() {
        let raw = RawPixelPayload::from_grid(2, 2, 0, 0, vec![1, 0, 9, 2]).unwrap();
        let mut writer = RpBinWriter::new();
        writer.add_raw_with_rescales(raw, &[2]).unwrap();

        assert_eq!(writer.payloads().len(), 2);
        assert_eq!(writer.max_val(), 9);
        assert_eq!(writer.total_rain(), 12);

        writer.set_total_rain(888);
        assert_eq!(writer.header(), Header::new(9, 888));
    }

    #[test]
    fn test_empty_writer() {
        let writer = RpBinWriter::new();
        assert_eq!(writer.header(), Header::new(0, 0));
        let data = writer.to_bytes().unwrap();
        assert!(data.starts_with(b"RAIN PREDICTOR BIN FILE\nVERSION 4\nMAXVAL 0\nTOTALRAIN 0\n"));
    }

    #[test]
    fn test_bad_rescale_adds_nothing() {
        let raw = RawPixelPayload::from_grid(2, 2, 0, 0, vec![1, 0, 9, 2]).unwrap();
        let mut writer = RpBinWriter::new();
        assert!(writer.add_raw_with_rescales(raw, &[2, 0]).is_err());
        assert!(writer.payloads().is_empty());
    }

    #[test]
    fn test_body_is_gzip() {
        let raw = RawPixelPayload::from_grid(1, 1, 0, 0, vec![5]).unwrap();
        let mut writer = RpBinWriter::new().with_compression_level(9);
        writer.add_raw(raw);
        let data = writer.to_bytes().unwrap();
        let (_, offset) = Header::parse(&data).unwrap();
        assert_eq!(&data[offset..offset + 2], &[0x1f, 0x8b]);
    }
}
