//! # Hashing Utilities
//!
//! The ledger hashes everything that is content-addressed with **SHA3-256**:
//! entry ids, asset ids, nonce and definition hashes, and the per-input
//! signature hash. **SHA-512** and **HMAC-SHA512** only show up inside the
//! chain-key derivation and the Ed25519 signing equation.
//!
//! There is deliberately no BLAKE3 or SHA-256 here. Whatever we hash has to
//! match what the ledger's verifier hashes, bit for bit.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use sha3::{Digest, Sha3_256};

/// Compute the SHA3-256 hash of the input data.
///
/// # Example
///
/// ```
/// use tx_signer::crypto::hash::sha3_256;
///
/// let digest = sha3_256(b"");
/// assert_eq!(
///     hex::encode(digest),
///     "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
/// );
/// ```
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash several byte slices as if they were concatenated.
///
/// Avoids building a temporary buffer for things like `input_id || tx_id`.
pub fn sha3_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// SHA-512 over several concatenated slices.
///
/// `sha2` and `sha3` share the same `Digest` trait, so one import serves both.
pub fn sha512_multi(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 64];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// HMAC-SHA512 keyed with `key` over the concatenation of `parts`.
pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    type HmacSha512 = Hmac<Sha512>;
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        mac.update(part);
    }
    let mut output = [0u8; 64];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}
