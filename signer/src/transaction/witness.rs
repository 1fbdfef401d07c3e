//! # Witness Builder
//!
//! Turns a root extended private key plus a key index into the witness
//! arguments an input needs on chain.
//!
//! ## Flow
//!
//! 1. Pick the derivation path for the input kind
//!    ([`issuance_path`] or [`account_path`]).
//! 2. Compute the signature hash `SHA3-256(input_id || tx_id)` ([`sig_hash`]).
//! 3. Ask the [`KeyStore`] to derive and sign.
//! 4. Push the results onto the [`WitnessComponent`] in the order the
//!    verifier pops them.
//!
//! Signing is deterministic: the same root key, key index and transaction id
//! always produce the same signature bytes.

use crate::config::{ASSET_KEY_SPACE, BIP44_COIN_TYPE, BIP44_PURPOSE};
use crate::crypto::chainkd::{DerivationPath, XPrv, XPub, SIGNATURE_LENGTH};
use crate::crypto::hash::sha3_256_multi;
use crate::error::{Result, SignerError};
use crate::types::Hash;

// ---------------------------------------------------------------------------
// KeyStore
// ---------------------------------------------------------------------------

/// Where keys are derived and messages signed.
///
/// The builder never touches curve arithmetic itself; it goes through this
/// trait so a caller can plug in an HSM or a remote signer. Implementations
/// must be deterministic and safe to call from several threads at once.
pub trait KeyStore: Send + Sync {
    /// Derives the extended public key at `path` under `root`.
    fn derive(&self, root: &XPrv, path: &DerivationPath) -> Result<XPub>;

    /// Signs `message` with the key at `path` under `root`.
    fn sign(&self, root: &XPrv, path: &DerivationPath, message: &[u8])
        -> Result<[u8; SIGNATURE_LENGTH]>;
}

/// In-process chain-key signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainKdKeyStore;

impl KeyStore for ChainKdKeyStore {
    fn derive(&self, root: &XPrv, path: &DerivationPath) -> Result<XPub> {
        Ok(root.derive(path)?.xpub())
    }

    fn sign(
        &self,
        root: &XPrv,
        path: &DerivationPath,
        message: &[u8],
    ) -> Result<[u8; SIGNATURE_LENGTH]> {
        Ok(root.derive(path)?.sign(message))
    }
}

// ---------------------------------------------------------------------------
// Paths and the signature hash
// ---------------------------------------------------------------------------

/// Path for asset (issuance) keys: a single selector `0x00 || LE64(key_index)`.
pub fn issuance_path(key_index: u64) -> DerivationPath {
    let mut selector = Vec::with_capacity(9);
    selector.push(ASSET_KEY_SPACE);
    selector.extend_from_slice(&key_index.to_le_bytes());
    DerivationPath::new(vec![selector])
}

/// BIP44 path for account keys:
/// `44 / 153 / key_index / change / address_index`, each step LE32.
pub fn account_path(key_index: u64, change: bool, address_index: u64) -> Result<DerivationPath> {
    let account = u32::try_from(key_index)
        .map_err(|_| SignerError::Signing(format!("key index {key_index} exceeds 32 bits")))?;
    let address = u32::try_from(address_index).map_err(|_| {
        SignerError::Signing(format!("address index {address_index} exceeds 32 bits"))
    })?;

    let steps = [
        BIP44_PURPOSE,
        BIP44_COIN_TYPE,
        account,
        u32::from(change),
        address,
    ];
    Ok(DerivationPath::new(
        steps.iter().map(|s| s.to_le_bytes().to_vec()).collect(),
    ))
}

/// The message every input signs.
pub fn sig_hash(input_id: &Hash, tx_id: &Hash) -> Hash {
    Hash::from_bytes(sha3_256_multi(&[input_id.as_bytes(), tx_id.as_bytes()]))
}

// ---------------------------------------------------------------------------
// WitnessComponent
// ---------------------------------------------------------------------------

/// The root key an input signs with and the arguments produced so far.
#[derive(Debug, Clone)]
pub struct WitnessComponent {
    root_key: XPrv,
    arguments: Vec<Vec<u8>>,
}

impl WitnessComponent {
    pub fn new(root_key: XPrv) -> Self {
        Self {
            root_key,
            arguments: Vec::new(),
        }
    }

    pub fn root_key(&self) -> &XPrv {
        &self.root_key
    }

    /// Arguments in push order.
    pub fn arguments(&self) -> &[Vec<u8>] {
        &self.arguments
    }

    fn push(&mut self, argument: Vec<u8>) {
        self.arguments.push(argument);
    }

    /// Signs `message` at `path` and pushes the signature.
    pub(crate) fn push_signature(
        &mut self,
        key_store: &dyn KeyStore,
        path: &DerivationPath,
        message: &Hash,
    ) -> Result<()> {
        let signature = key_store.sign(&self.root_key, path, message.as_bytes())?;
        self.push(signature.to_vec());
        Ok(())
    }

    /// Pushes the 32-byte public key at `path`.
    pub(crate) fn push_public_key(
        &mut self,
        key_store: &dyn KeyStore,
        path: &DerivationPath,
    ) -> Result<()> {
        let xpub = key_store.derive(&self.root_key, path)?;
        self.push(xpub.public_key().to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> XPrv {
        XPrv::from_seed(b"witness test seed")
    }

    #[test]
    fn issuance_path_is_one_nine_byte_selector() {
        let path = issuance_path(0x0102);
        assert_eq!(path.len(), 1);
        assert_eq!(path.selectors()[0], vec![0, 0x02, 0x01, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn account_path_follows_bip44() {
        let path = account_path(3, true, 7).unwrap();
        let expected: Vec<Vec<u8>> = [44u32, 153, 3, 1, 7]
            .iter()
            .map(|s| s.to_le_bytes().to_vec())
            .collect();
        assert_eq!(path.selectors(), expected.as_slice());
    }

    #[test]
    fn account_path_rejects_wide_key_index() {
        let err = account_path(u64::from(u32::MAX) + 1, false, 1).unwrap_err();
        assert!(matches!(err, SignerError::Signing(_)));
    }

    #[test]
    fn sig_hash_binds_both_ids() {
        let a = Hash::from_bytes([1; 32]);
        let b = Hash::from_bytes([2; 32]);
        assert_ne!(sig_hash(&a, &b), sig_hash(&b, &a));
    }

    #[test]
    fn signing_is_deterministic() {
        let path = account_path(1, false, 1).unwrap();
        let message = sig_hash(&Hash::from_bytes([4; 32]), &Hash::from_bytes([5; 32]));

        let mut first = WitnessComponent::new(root());
        first
            .push_signature(&ChainKdKeyStore, &path, &message)
            .unwrap();
        let mut second = WitnessComponent::new(root());
        second
            .push_signature(&ChainKdKeyStore, &path, &message)
            .unwrap();

        assert_eq!(first.arguments(), second.arguments());
        assert_eq!(first.arguments()[0].len(), SIGNATURE_LENGTH);
    }

    #[test]
    fn pushed_signature_verifies_under_pushed_key() {
        let path = account_path(2, false, 5).unwrap();
        let message = Hash::digest(b"tx");

        let mut witness = WitnessComponent::new(root());
        witness
            .push_signature(&ChainKdKeyStore, &path, &message)
            .unwrap();
        witness.push_public_key(&ChainKdKeyStore, &path).unwrap();

        let xpub = root().xpub().derive(&path).unwrap();
        assert_eq!(witness.arguments()[1], xpub.public_key().to_vec());
        assert!(xpub.verify(message.as_bytes(), &witness.arguments()[0]));
    }
}
