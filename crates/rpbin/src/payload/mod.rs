//! Payload records and the magic-number catalog.
//!
//! Every record in a decompressed body starts with the same prefix:
//!
//! ```text
//! [magic: u16][version: u16][body ...]
//! ```
//!
//! The catalog is closed. A magic number outside it is fatal, since the
//! record length cannot be known and nothing after it can be located.

mod prepared;
mod raw;
mod record;

pub use prepared::PreparedFeaturePayload;
pub use raw::{RawPixelPayload, NO_DATA_AVERAGE};

use bytes::BufMut;

use crate::error::{Result, RpBinError};

/// Length of the magic + version prefix.
pub const PREFIX_LEN: usize = 4;

/// The payload kinds in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Raw,
    Prepared,
}

/// One entry of the payload catalog.
pub struct PayloadFormat {
    pub kind: PayloadKind,
    pub magic: u16,
    pub version: u16,
    pub name: &'static str,
    decode_body: fn(&mut &[u8]) -> Result<Payload>,
}

/// Every payload kind the codec reads and writes.
pub static CATALOG: [PayloadFormat; 2] = [
    PayloadFormat {
        kind: PayloadKind::Raw,
        magic: 0xA1B2,
        version: 1,
        name: "raw pixels",
        decode_body: decode_raw,
    },
    PayloadFormat {
        kind: PayloadKind::Prepared,
        magic: 0xA1B3,
        version: 1,
        name: "prepared features",
        decode_body: decode_prepared,
    },
];

impl std::fmt::Debug for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadFormat")
            .field("kind", &self.kind)
            .field("magic", &format_args!("0x{:04X}", self.magic))
            .field("version", &self.version)
            .field("name", &self.name)
            .finish()
    }
}

fn decode_raw(buf: &mut &[u8]) -> Result<Payload> {
    RawPixelPayload::decode_body(buf).map(Payload::Raw)
}

fn decode_prepared(buf: &mut &[u8]) -> Result<Payload> {
    PreparedFeaturePayload::decode_body(buf).map(Payload::Prepared)
}

/// Catalog entry for a magic number.
pub fn format_for_magic(magic: u16) -> Option<&'static PayloadFormat> {
    CATALOG.iter().find(|f| f.magic == magic)
}

/// Catalog entry for a payload kind.
pub fn format_for_kind(kind: PayloadKind) -> &'static PayloadFormat {
    match kind {
        PayloadKind::Raw => &CATALOG[0],
        PayloadKind::Prepared => &CATALOG[1],
    }
}

/// A decoded payload record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Raw(RawPixelPayload),
    Prepared(PreparedFeaturePayload),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Raw(_) => PayloadKind::Raw,
            Self::Prepared(_) => PayloadKind::Prepared,
        }
    }

    pub fn format(&self) -> &'static PayloadFormat {
        format_for_kind(self.kind())
    }

    pub fn as_raw(&self) -> Option<&RawPixelPayload> {
        match self {
            Self::Raw(raw) => Some(raw),
            Self::Prepared(_) => None,
        }
    }

    pub fn as_prepared(&self) -> Option<&PreparedFeaturePayload> {
        match self {
            Self::Prepared(prepared) => Some(prepared),
            Self::Raw(_) => None,
        }
    }

    /// Size of the encoded record in bytes.
    pub fn encoded_len(&self) -> usize {
        PREFIX_LEN
            + match self {
                Self::Raw(raw) => raw.body_len(),
                Self::Prepared(prepared) => prepared.body_len(),
            }
    }
}

impl From<RawPixelPayload> for Payload {
    fn from(raw: RawPixelPayload) -> Self {
        Self::Raw(raw)
    }
}

impl From<PreparedFeaturePayload> for Payload {
    fn from(prepared: PreparedFeaturePayload) -> Self {
        Self::Prepared(prepared)
    }
}

/// Encode one payload as a standalone record.
pub fn encode(payload: &Payload) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.encoded_len());
    encode_into(payload, &mut out);
    out
}

/// Append the record for `payload` to `out`.
pub fn encode_into(payload: &Payload, out: &mut Vec<u8>) {
    let format = payload.format();
    out.put_u16(format.magic);
    out.put_u16(format.version);
    match payload {
        Payload::Raw(raw) => raw.encode_body(out),
        Payload::Prepared(prepared) => prepared.encode_body(out),
    }
}

/// Read the magic number at `offset` without consuming anything.
pub fn peek_magic(buf: &[u8], offset: usize) -> Result<u16> {
    match offset.checked_add(2).and_then(|end| buf.get(offset..end)) {
        Some(bytes) => Ok(u16::from_be_bytes([bytes[0], bytes[1]])),
        None => Err(RpBinError::corruption(format!(
            "stream ends at offset {} inside a record prefix",
            offset
        ))),
    }
}

/// Decode the record starting at `offset`.
///
/// Returns the payload and the offset just past it.
pub fn decode(buf: &[u8], offset: usize) -> Result<(Payload, usize)> {
    let magic = peek_magic(buf, offset)?;
    let format =
        format_for_magic(magic).ok_or(RpBinError::UnknownPayload { magic, offset })?;

    let mut cursor = buf.get(offset + 2..).unwrap_or_default();
    let version = record::take_u16(&mut cursor, "payload version")?;
    if version != format.version {
        return Err(RpBinError::UnsupportedPayloadVersion { magic, version });
    }

    let before = cursor.len();
    let payload = (format.decode_body)(&mut cursor)?;
    let consumed = PREFIX_LEN + (before - cursor.len());

    tracing::trace!(
        kind = format.name,
        offset,
        bytes = consumed,
        "Decoded payload"
    );

    Ok((payload, offset + consumed))
}

/// Decode every record in a decompressed body, in order.
pub fn decode_all(buf: &[u8]) -> Result<Vec<Payload>> {
    let mut payloads = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (payload, next) = decode(buf, offset)?;
        payloads.push(payload);
        offset = next;
    }
    Ok(payloads)
}
