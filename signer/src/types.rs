//! Core value types shared by the commitment, graph and witness code.
//!
//! These mirror the ledger's own vocabulary: 32-byte hashes and asset ids,
//! an (asset, amount) pair, a versioned program, and a value source that
//! points at the entry some value came from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::hash::sha3_256;
use crate::error::{Result, SignerError};

fn decode_32(field: &'static str, s: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(s).map_err(SignerError::decoding(field))?;
    if bytes.len() != 32 {
        return Err(SignerError::InvalidLength {
            field,
            expected: 32,
            got: bytes.len(),
        });
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte content digest. Entry ids, the transaction id, and signature
/// hashes are all `Hash` values.
///
/// Compared by value, so it works as a map key for deduplication.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_32("hash", s).map(Self)
    }

    /// SHA3-256 of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(sha3_256(data))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Hash {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Identifier of an asset. Always exactly 32 bytes on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct AssetId([u8; 32]);

impl AssetId {
    /// Wraps raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_32("asset id", s).map(Self)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for AssetId {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// AssetAmount / Program / ValueSource
// ---------------------------------------------------------------------------

/// A quantity of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetAmount {
    pub asset_id: AssetId,
    pub amount: u64,
}

impl AssetAmount {
    pub fn new(asset_id: AssetId, amount: u64) -> Self {
        Self { asset_id, amount }
    }
}

impl fmt::Display for AssetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.amount, self.asset_id)
    }
}

/// A control or issuance program together with the VM version that runs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    pub vm_version: u64,
    pub code: Vec<u8>,
}

impl Program {
    pub fn new(vm_version: u64, code: Vec<u8>) -> Self {
        Self { vm_version, code }
    }
}

/// Where a value came from: the entry that produced it, the value itself,
/// and the position among that entry's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueSource {
    pub reference: Hash,
    pub value: AssetAmount,
    pub position: u64,
}

impl ValueSource {
    pub fn new(reference: Hash, value: AssetAmount, position: u64) -> Self {
        Self {
            reference,
            value,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_hex_round_trip() {
        let h = Hash::digest(b"entry");
        let parsed: Hash = h.to_hex().parse().unwrap();
        assert_eq!(h, parsed);
        assert_eq!(h.to_string().len(), 64);
    }

    #[test]
    fn asset_id_rejects_wrong_length() {
        let err = AssetId::from_hex("00ff").unwrap_err();
        assert!(matches!(
            err,
            SignerError::InvalidLength {
                field: "asset id",
                expected: 32,
                got: 2
            }
        ));
    }

    #[test]
    fn asset_id_rejects_bad_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(
            AssetId::from_hex(&bad),
            Err(SignerError::Decoding { field: "asset id", .. })
        ));
    }

    #[test]
    fn debug_is_abbreviated() {
        let id = AssetId::from_bytes([0xab; 32]);
        assert_eq!(format!("{:?}", id), "AssetId(abababababab...)");
    }

    #[test]
    fn asset_amount_serde_roundtrip() {
        let value = AssetAmount::new(AssetId::from_bytes([7; 32]), 42);
        let json = serde_json::to_string(&value).unwrap();
        let recovered: AssetAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(value, recovered);
    }
}
