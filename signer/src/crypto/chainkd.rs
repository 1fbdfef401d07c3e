//! # Chain-Key Derivation
//!
//! Hierarchical Ed25519 keys as the ledger's wallets use them. An extended
//! private key (`XPrv`) is 64 bytes: a 32-byte little-endian scalar followed by
//! a 32-byte chain code. The extended public key (`XPub`) swaps the scalar for
//! the compressed point `scalar·B` and keeps the chain code.
//!
//! Children are derived with HMAC-SHA512 keyed by the parent's chain code:
//!
//! ```text
//! non-hardened:  I = HMAC(cc, "N" || pubkey || selector)   scalar' = scalar + prune_intermediate(I[..32])
//! hardened:      I = HMAC(cc, "H" || scalar || selector)   scalar' = prune_root(I[..32])
//!                chain code' = I[32..]
//! ```
//!
//! Non-hardened derivation is additive in the scalar, so `xprv.derive(p).xpub()`
//! equals `xprv.xpub().derive(p)`. Watch-only wallets rely on that.
//!
//! Signing uses an *expanded* key: `HMAC("Expand", xprv)` with the first half
//! replaced by the scalar. The second half seeds the deterministic nonce, so
//! the same key and message always produce the same signature. The result is a
//! plain Ed25519 signature and verifies under any RFC 8032 verifier.
//!
//! Key bytes are never logged or printed. `Debug` on [`XPrv`] is redacted.

use std::fmt;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};

use super::hash::{hmac_sha512, sha512_multi};
use crate::error::{Result, SignerError};

/// Length of an extended key (either half) in bytes.
pub const EXTENDED_KEY_LENGTH: usize = 64;

/// Length of a chain-key signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// An ordered list of derivation selectors. Each selector is an opaque byte
/// string mixed into one derivation step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath(Vec<Vec<u8>>);

impl DerivationPath {
    /// Builds a path from raw selectors.
    pub fn new(selectors: Vec<Vec<u8>>) -> Self {
        Self(selectors)
    }

    /// The selectors, outermost first.
    pub fn selectors(&self) -> &[Vec<u8>] {
        &self.0
    }

    /// Number of derivation steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the empty path (the root key itself).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An extended private key.
#[derive(Clone, PartialEq, Eq)]
pub struct XPrv([u8; EXTENDED_KEY_LENGTH]);

/// An extended public key: compressed Ed25519 point followed by the chain code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct XPub([u8; EXTENDED_KEY_LENGTH]);

fn prune_root_scalar(s: &mut [u8]) {
    s[0] &= 248;
    s[31] &= 31;
    s[31] |= 64;
}

fn prune_intermediate_scalar(f: &mut [u8]) {
    f[0] &= 248;
    f[29] &= 1;
    f[30] = 0;
    f[31] = 0;
}

fn scalar_mul_base(bytes: &[u8]) -> [u8; 32] {
    let mut s = [0u8; 32];
    s.copy_from_slice(&bytes[..32]);
    // The base point has prime order, so reducing mod l leaves the product unchanged.
    EdwardsPoint::mul_base(&Scalar::from_bytes_mod_order(s))
        .compress()
        .to_bytes()
}

impl XPrv {
    /// Wraps 64 raw bytes. No pruning is applied.
    pub fn from_bytes(bytes: [u8; EXTENDED_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parses a 128-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str).map_err(SignerError::decoding("root private key"))?;
        if bytes.len() != EXTENDED_KEY_LENGTH {
            return Err(SignerError::InvalidLength {
                field: "root private key",
                expected: EXTENDED_KEY_LENGTH,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; EXTENDED_KEY_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives a root key from seed material.
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut res = hmac_sha512(b"Root", &[seed]);
        prune_root_scalar(&mut res[..32]);
        Self(res)
    }

    /// Exports the raw 64 bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; EXTENDED_KEY_LENGTH] {
        self.0
    }

    /// Hex form of the raw key. Same warning as [`to_bytes`](Self::to_bytes).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The matching extended public key.
    pub fn xpub(&self) -> XPub {
        let mut out = [0u8; EXTENDED_KEY_LENGTH];
        out[..32].copy_from_slice(&scalar_mul_base(&self.0[..32]));
        out[32..].copy_from_slice(&self.0[32..]);
        XPub(out)
    }

    /// Derives one child. Non-hardened derivation fails only if the scalar
    /// sum no longer fits in 256 bits, which a well-formed key never reaches.
    pub fn child(&self, selector: &[u8], hardened: bool) -> Result<XPrv> {
        if hardened {
            Ok(self.hardened_child(selector))
        } else {
            self.non_hardened_child(selector)
        }
    }

    fn hardened_child(&self, selector: &[u8]) -> XPrv {
        let mut res = hmac_sha512(&self.0[32..], &[b"H", &self.0[..32], selector]);
        prune_root_scalar(&mut res[..32]);
        XPrv(res)
    }

    fn non_hardened_child(&self, selector: &[u8]) -> Result<XPrv> {
        let xpub = self.xpub();
        let mut res = hmac_sha512(&xpub.0[32..], &[b"N", &xpub.0[..32], selector]);
        prune_intermediate_scalar(&mut res[..32]);

        let mut carry: u16 = 0;
        for i in 0..32 {
            let sum = u16::from(self.0[i]) + u16::from(res[i]) + carry;
            res[i] = (sum & 0xff) as u8;
            carry = sum >> 8;
        }
        if carry != 0 {
            return Err(SignerError::Signing(
                "child scalar does not fit in 256 bits".into(),
            ));
        }
        Ok(XPrv(res))
    }

    /// Walks a path of non-hardened steps.
    pub fn derive(&self, path: &DerivationPath) -> Result<XPrv> {
        path.selectors()
            .iter()
            .try_fold(self.clone(), |key, selector| key.child(selector, false))
    }

    /// The 64-byte expanded signing key: scalar followed by the nonce prefix.
    fn expanded(&self) -> [u8; 64] {
        let mut res = hmac_sha512(b"Expand", &[&self.0]);
        res[..32].copy_from_slice(&self.0[..32]);
        res
    }

    /// Signs `message` deterministically.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        let expanded = self.expanded();
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&expanded[..32]);
        let a = Scalar::from_bytes_mod_order(scalar_bytes);
        let public_key = EdwardsPoint::mul_base(&a).compress();

        let r = Scalar::from_bytes_mod_order_wide(&sha512_multi(&[&expanded[32..], message]));
        let big_r = EdwardsPoint::mul_base(&r).compress();

        let h = Scalar::from_bytes_mod_order_wide(&sha512_multi(&[
            big_r.as_bytes(),
            public_key.as_bytes(),
            message,
        ]));
        let s = h * a + r;

        let mut signature = [0u8; SIGNATURE_LENGTH];
        signature[..32].copy_from_slice(big_r.as_bytes());
        signature[32..].copy_from_slice(s.as_bytes());
        signature
    }
}

impl fmt::Debug for XPrv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XPrv")
            .field("xpub", &self.xpub())
            .finish_non_exhaustive()
    }
}

impl XPub {
    /// Wraps 64 raw bytes.
    pub fn from_bytes(bytes: [u8; EXTENDED_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The raw 64 bytes.
    pub fn to_bytes(&self) -> [u8; EXTENDED_KEY_LENGTH] {
        self.0
    }

    /// Hex form of the extended public key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The 32-byte Ed25519 public key (the witness pushes this).
    pub fn public_key(&self) -> [u8; 32] {
        let mut pk = [0u8; 32];
        pk.copy_from_slice(&self.0[..32]);
        pk
    }

    /// Derives a non-hardened child without the private key.
    pub fn child(&self, selector: &[u8]) -> Result<XPub> {
        let mut res = hmac_sha512(&self.0[32..], &[b"N", &self.0[..32], selector]);
        prune_intermediate_scalar(&mut res[..32]);

        let parent = CompressedEdwardsY(self.public_key())
            .decompress()
            .ok_or_else(|| SignerError::Signing("extended public key is not a curve point".into()))?;
        let offset = scalar_mul_base(&res[..32]);
        let offset = CompressedEdwardsY(offset)
            .decompress()
            .ok_or_else(|| SignerError::Signing("derived offset is not a curve point".into()))?;

        res[..32].copy_from_slice((parent + offset).compress().as_bytes());
        Ok(XPub(res))
    }

    /// Walks a path of non-hardened steps.
    pub fn derive(&self, path: &DerivationPath) -> Result<XPub> {
        path.selectors()
            .iter()
            .try_fold(*self, |key, selector| key.child(selector))
    }

    /// Checks an Ed25519 signature produced by [`XPrv::sign`].
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(&self.public_key()) else {
            return false;
        };
        key.verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }
}

impl fmt::Debug for XPub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XPub({})", self.to_hex())
    }
}

impl fmt::Display for XPub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
