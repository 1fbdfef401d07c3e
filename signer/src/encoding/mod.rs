//! # Canonical Byte Codec
//!
//! The ledger's wire format is built from exactly three primitives, and every
//! other module in this crate goes through them:
//!
//! - **varint**: unsigned LEB128. Seven payload bits per byte, lowest group
//!   first, high bit set on every byte except the last. Values are limited to
//!   63 bits (`i64::MAX`), matching what the ledger's decoder accepts.
//! - **var_str**: `varint(len) || bytes`. Used for programs, nonces and
//!   witness arguments.
//! - **extensible block**: also `varint(len) || bytes`, but semantically an
//!   opaque sub-structure (a commitment or a witness). A parser that does not
//!   understand the inner layout can skip it by its declared length, which is
//!   how new fields get appended without breaking old parsers.
//!
//! The writers append to a `Vec<u8>` and never allocate on their own beyond
//! the growth of that buffer. The [`Reader`] is the inverse, used to inspect
//! serialized transactions.

mod reader;

pub use reader::Reader;

use crate::error::{Result, SignerError};

/// Largest value a varint may carry (the ledger's `varint63`).
pub const MAX_VARINT: u64 = i64::MAX as u64;

/// Longest possible LEB128 encoding of a u64.
pub const MAX_VARINT_LEN: usize = 10;

/// Appends `n` as an unsigned LEB128 varint.
///
/// Fails with [`SignerError::VarintOverflow`] if `n` does not fit in 63 bits.
///
/// # Example
///
/// ```
/// use tx_signer::encoding::write_varint;
///
/// let mut out = Vec::new();
/// write_varint(300, &mut out).unwrap();
/// assert_eq!(out, vec![0xac, 0x02]);
/// ```
pub fn write_varint(n: u64, out: &mut Vec<u8>) -> Result<()> {
    if n > MAX_VARINT {
        return Err(SignerError::VarintOverflow(n));
    }
    let mut value = n;
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    Ok(())
}

/// Appends a length-prefixed byte string.
pub fn write_var_str(bytes: &[u8], out: &mut Vec<u8>) -> Result<()> {
    write_varint(bytes.len() as u64, out)?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Appends a count-prefixed list of length-prefixed byte strings.
///
/// This is the witness argument stack layout.
pub fn write_var_str_list<T: AsRef<[u8]>>(items: &[T], out: &mut Vec<u8>) -> Result<()> {
    write_varint(items.len() as u64, out)?;
    for item in items {
        write_var_str(item.as_ref(), out)?;
    }
    Ok(())
}

/// Appends an extensible block: a length prefix followed by the opaque body.
///
/// Byte-for-byte this is the same as [`write_var_str`]; it is a separate
/// function because it wraps a whole sub-structure rather than a field.
pub fn write_extensible(block: &[u8], out: &mut Vec<u8>) -> Result<()> {
    write_var_str(block, out)
}

/// Returns the number of bytes `write_varint` would produce for `n`.
pub fn varint_len(n: u64) -> usize {
    let bits = 64 - n.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(n: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(n, &mut out).unwrap();
        out
    }

    #[test]
    fn varint_known_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(100), vec![0x64]);
        assert_eq!(encode(127), vec![0x7f]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(65536), vec![0x80, 0x80, 0x04]);
    }

    #[test]
    fn varint_round_trip_boundaries() {
        for n in [0u64, 1, 127, 128, 65536, (1u64 << 63) - 1] {
            let bytes = encode(n);
            let mut reader = Reader::new(&bytes);
            assert_eq!(reader.read_varint().unwrap(), n, "value {n}");
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn varint_rejects_values_past_63_bits() {
        let mut out = Vec::new();
        let err = write_varint(1 << 63, &mut out).unwrap_err();
        assert!(matches!(err, SignerError::VarintOverflow(v) if v == 1 << 63));
        assert!(out.is_empty(), "nothing is written on failure");
    }

    #[test]
    fn varint_len_matches_encoding() {
        for n in [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, MAX_VARINT] {
            assert_eq!(varint_len(n), encode(n).len(), "value {n}");
        }
    }

    #[test]
    fn var_str_is_length_prefixed() {
        let mut out = Vec::new();
        write_var_str(&[0x51], &mut out).unwrap();
        assert_eq!(out, vec![0x01, 0x51]);

        let mut empty = Vec::new();
        write_var_str(&[], &mut empty).unwrap();
        assert_eq!(empty, vec![0x00]);
    }

    #[test]
    fn var_str_list_counts_then_items() {
        let mut out = Vec::new();
        write_var_str_list(&[vec![0xaa, 0xbb], vec![0xcc]], &mut out).unwrap();
        assert_eq!(out, vec![0x02, 0x02, 0xaa, 0xbb, 0x01, 0xcc]);
    }

    #[test]
    fn extensible_block_can_be_skipped() {
        let mut out = Vec::new();
        write_extensible(&[1, 2, 3, 4], &mut out).unwrap();
        out.push(0xff);

        let mut reader = Reader::new(&out);
        let block = reader.read_extensible().unwrap();
        assert_eq!(block, &[1, 2, 3, 4]);
        assert_eq!(reader.read_bytes(1).unwrap(), &[0xff]);
    }
}
