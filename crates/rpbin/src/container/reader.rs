//! Reading bin files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use super::header::Header;
use crate::error::{Result, RpBinError};
use crate::payload::{self, Payload, PreparedFeaturePayload, RawPixelPayload};

/// A fully decoded bin file.
///
/// Payloads are kept in file order; the query helpers return the first
/// match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpBinReader {
    header: Header,
    payloads: Vec<Payload>,
}

impl RpBinReader {
    /// Read and decode the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let reader = Self::from_bytes(&data)?;

        tracing::debug!(
            path = %path.display(),
            file_bytes = data.len(),
            payloads = reader.payloads.len(),
            "Read bin file"
        );

        Ok(reader)
    }

    /// Decode a complete file image.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (header, body_offset) = Header::parse(data)?;
        let body = decompress_body(&data[body_offset..])?;
        let payloads = payload::decode_all(&body)?;

        Ok(Self { header, payloads })
    }

    /// Parse only the header lines of the file at `path`.
    ///
    /// The compressed body is not read.
    pub fn read_header(path: impl AsRef<Path>) -> Result<Header> {
        let mut reader = BufReader::new(File::open(path)?);
        Header::read_from(&mut reader)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Largest intensity value in the file.
    pub fn max_val(&self) -> u32 {
        self.header.max_val
    }

    /// Sum of intensities over the full-resolution grid.
    pub fn total_rain(&self) -> u64 {
        self.header.total_rain
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn into_payloads(self) -> Vec<Payload> {
        self.payloads
    }

    /// The first raw payload with the given scaling factor.
    pub fn raw_at_scale(&self, scale: u16) -> Option<&RawPixelPayload> {
        self.payloads
            .iter()
            .filter_map(Payload::as_raw)
            .find(|raw| raw.scaling() == scale)
    }

    /// The first prepared payload.
    pub fn prepared(&self) -> Option<&PreparedFeaturePayload> {
        self.payloads.iter().find_map(Payload::as_prepared)
    }

    /// Scaling factors of the raw payloads, in file order.
    pub fn scales(&self) -> Vec<u16> {
        self.payloads
            .iter()
            .filter_map(Payload::as_raw)
            .map(RawPixelPayload::scaling)
            .collect()
    }
}

/// Decompress the gzip body of a bin file.
///
/// Every gzip member is read, so a body written as several concatenated
/// members decodes in full. Bytes after the last member that do not form a
/// gzip header are `Corruption`.
pub fn decompress_body(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(data);
    let mut body = Vec::new();
    decoder
        .read_to_end(&mut body)
        .map_err(|e| RpBinError::corruption(format!("gzip body: {}", e)))?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::RpBinWriter;

    fn sample_writer() -> RpBinWriter {
        let raw = RawPixelPayload::from_grid(4, 2, 0, 0, vec![0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        let mut writer = RpBinWriter::new();
        writer.add_raw_with_rescales(raw, &[2]).unwrap();
        writer
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let writer = sample_writer();
        let reader = RpBinReader::from_bytes(&writer.to_bytes().unwrap()).unwrap();

        assert_eq!(reader.payloads(), writer.payloads());
        assert_eq!(reader.max_val(), 7);
        assert_eq!(reader.total_rain(), 28);
        assert_eq!(reader.scales(), vec![1, 2]);
        assert!(reader.prepared().is_none());
        assert!(reader.raw_at_scale(3).is_none());
    }

    #[test]
    fn test_corrupt_body() {
        let mut data = sample_writer().to_bytes().unwrap();
        let len = data.len();
        data.truncate(len - 12);
        assert!(matches!(
            RpBinReader::from_bytes(&data),
            Err(RpBinError::Corruption(_))
        ));
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_concatenated_members() {
        let first = RawPixelPayload::from_grid(2, 1, 0, 0, vec![3, 4]).unwrap();
        let second = first.scaled_copy(2).unwrap();

        let mut data = Header::new(4, 7).to_bytes();
        data.extend(gzip(&payload::encode(&Payload::Raw(first.clone()))));
        data.extend(gzip(&payload::encode(&Payload::Raw(second.clone()))));

        let reader = RpBinReader::from_bytes(&data).unwrap();
        assert_eq!(
            reader.payloads(),
            &[Payload::Raw(first), Payload::Raw(second)]
        );
    }

    #[test]
    fn test_trailing_garbage() {
        let mut data = sample_writer().to_bytes().unwrap();
        data.extend_from_slice(b"GARBAGE TRAILING BYTES");
        assert!(matches!(
            RpBinReader::from_bytes(&data),
            Err(RpBinError::Corruption(_))
        ));
    }

    #[test]
    fn test_decompress_invalid() {
        assert!(matches!(
            decompress_body(b"not gzip data"),
            Err(RpBinError::Corruption(_))
        ));
    }
}
