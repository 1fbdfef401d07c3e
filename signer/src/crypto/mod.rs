//! # Cryptographic Primitives
//!
//! Two concerns live here and nothing else:
//!
//! - **hash**: SHA3-256 for everything content-addressed, plus the SHA-512 and
//!   HMAC-SHA512 building blocks the key scheme needs.
//! - **chainkd**: hierarchical Ed25519 keys: derivation, public derivation,
//!   deterministic signing and verification.
//!
//! The curve arithmetic comes from `curve25519-dalek`; verification goes
//! through `ed25519-dalek`. We only compose audited pieces here. Nothing in
//! this module re-implements field or group arithmetic.

pub mod chainkd;
pub mod hash;

pub use chainkd::{DerivationPath, XPrv, XPub};
pub use hash::{sha3_256, sha3_256_multi};
