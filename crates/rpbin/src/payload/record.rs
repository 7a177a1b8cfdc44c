//! Bounds-checked reads from a payload stream.

use bytes::Buf;

use crate::error::{Result, RpBinError};

/// Read a big-endian u16, failing with `Corruption` if the stream ends.
pub(crate) fn take_u16(buf: &mut &[u8], field: &str) -> Result<u16> {
    if buf.remaining() < 2 {
        return Err(RpBinError::corruption(format!(
            "record truncated while reading {} ({} bytes left)",
            field,
            buf.remaining()
        )));
    }
    Ok(buf.get_u16())
}

/// Read `len` bytes into an owned buffer.
pub(crate) fn take_bytes(buf: &mut &[u8], len: usize, field: &str) -> Result<Vec<u8>> {
    if buf.remaining() < len {
        return Err(RpBinError::corruption(format!(
            "record truncated in {}: need {} bytes, {} left",
            field,
            len,
            buf.remaining()
        )));
    }
    let bytes = buf[..len].to_vec();
    buf.advance(len);
    Ok(bytes)
}
