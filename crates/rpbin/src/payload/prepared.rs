//! Prepared feature vectors.

use bytes::BufMut;

use super::record;
use crate::error::{Result, RpBinError};

/// Fixed-length per-module feature bytes, ready to feed a network.
///
/// The buffer is a sequence of equal-width tuples, one per module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedFeaturePayload {
    num_modules: u16,
    num_rings: u16,
    data: Vec<u8>,
}

impl PreparedFeaturePayload {
    /// Wrap the feature buffer of a ring/cut partition.
    ///
    /// The module count is `ring_count * cut_count + 2`, counting the
    /// bullseye and tripwire modules.
    pub fn from_modules(
        data_length: usize,
        ring_count: u16,
        cut_count: u16,
        data: Vec<u8>,
    ) -> Result<Self> {
        let num_modules = (ring_count as u32 * cut_count as u32 + 2)
            .try_into()
            .map_err(|_| {
                RpBinError::invalid_payload(format!(
                    "{} rings x {} cuts exceed the 16-bit module count",
                    ring_count, cut_count
                ))
            })?;
        Self::from_parts(data_length, num_modules, ring_count, data)
    }

    /// Wrap a feature buffer with an explicit module count.
    ///
    /// `data_length` must match the buffer and fit the 16-bit length field.
    pub fn from_parts(
        data_length: usize,
        num_modules: u16,
        num_rings: u16,
        data: Vec<u8>,
    ) -> Result<Self> {
        if data.len() != data_length {
            return Err(RpBinError::invalid_payload(format!(
                "declared {} feature bytes, buffer has {}",
                data_length,
                data.len()
            )));
        }
        if data_length > u16::MAX as usize {
            return Err(RpBinError::invalid_payload(format!(
                "{} feature bytes exceed the 16-bit length field",
                data_length
            )));
        }

        Ok(Self {
            num_modules,
            num_rings,
            data,
        })
    }

    pub fn data_length(&self) -> usize {
        self.data.len()
    }

    pub fn num_modules(&self) -> u16 {
        self.num_modules
    }

    pub fn num_rings(&self) -> u16 {
        self.num_rings
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes per module, or `None` if the buffer does not divide evenly.
    pub fn values_per_module(&self) -> Option<usize> {
        let modules = self.num_modules as usize;
        if modules == 0 || self.data.len() % modules != 0 {
            return None;
        }
        Some(self.data.len() / modules)
    }

    /// The feature tuple of one module.
    pub fn module(&self, index: usize) -> Option<&[u8]> {
        let width = self.values_per_module()?;
        self.data.get(index * width..(index + 1) * width)
    }

    /// Feature bytes scaled to 0.0..=1.0, the form networks consume.
    pub fn normalized(&self) -> Vec<f32> {
        self.data.iter().map(|&b| b as f32 / 255.0).collect()
    }

    pub(crate) fn body_len(&self) -> usize {
        3 * 2 + self.data.len()
    }

    pub(crate) fn encode_body(&self, out: &mut Vec<u8>) {
        out.put_u16(self.data.len() as u16);
        out.put_u16(self.num_modules);
        out.put_u16(self.num_rings);
        out.put_slice(&self.data);
    }

    pub(crate) fn decode_body(buf: &mut &[u8]) -> Result<Self> {
        let data_length = record::take_u16(buf, "prepared data length")? as usize;
        let num_modules = record::take_u16(buf, "prepared module count")?;
        let num_rings = record::take_u16(buf, "prepared ring count")?;
        let data = record::take_bytes(buf, data_length, "prepared buffer")?;

        Ok(Self {
            num_modules,
            num_rings,
            data,
        })
    }
}
