//! Cursor over canonically encoded bytes.

use super::{MAX_VARINT, MAX_VARINT_LEN};
use crate::error::{Result, SignerError};

/// A forward-only reader for the canonical encoding.
///
/// Every read either consumes exactly the bytes it returns or fails without
/// moving the cursor past the end of the buffer.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(SignerError::Malformed(format!(
                "wanted {} bytes at offset {}, only {} left",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Reads a fixed 32-byte field (hashes, asset ids).
    pub fn read_array32(&mut self) -> Result<[u8; 32]> {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.read_bytes(32)?);
        Ok(out)
    }

    /// Reads an unsigned LEB128 varint limited to 63 bits.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            let shift = 7 * i as u32;
            let payload = u64::from(byte & 0x7f);
            if shift == 63 && payload > 1 {
                return Err(SignerError::Malformed("varint overflows u64".into()));
            }
            value |= payload << shift;
            if byte & 0x80 == 0 {
                if value > MAX_VARINT {
                    return Err(SignerError::VarintOverflow(value));
                }
                return Ok(value);
            }
        }
        Err(SignerError::Malformed(format!(
            "varint longer than {MAX_VARINT_LEN} bytes"
        )))
    }

    /// Reads a length-prefixed byte string.
    pub fn read_var_str(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .map_err(|_| SignerError::Malformed(format!("length {len} does not fit in memory")))?;
        self.read_bytes(len)
    }

    /// Reads a count-prefixed list of byte strings.
    pub fn read_var_str_list(&mut self) -> Result<Vec<&'a [u8]>> {
        let count = self.read_varint()?;
        // Each item needs at least its one-byte length prefix.
        if count > self.remaining() as u64 {
            return Err(SignerError::Malformed(format!(
                "list claims {count} items but only {} bytes remain",
                self.remaining()
            )));
        }
        (0..count).map(|_| self.read_var_str()).collect()
    }

    /// Reads an extensible block and returns its opaque body.
    pub fn read_extensible(&mut self) -> Result<&'a [u8]> {
        self.read_var_str()
    }
}
