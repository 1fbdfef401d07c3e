// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # tx-signer
//!
//! Offline construction and signing of transactions for an entry-graph
//! ledger. Nothing here talks to a node: you hand in the fields, you get back
//! byte-exact transaction hex that any submitter can broadcast.
//!
//! ## Architecture
//!
//! - **encoding**: the canonical codec (varints, var_str, extensible blocks).
//! - **crypto**: SHA3 hashing and hierarchical Ed25519 keys.
//! - **types**: hashes, asset ids, amounts, programs, value sources.
//! - **transaction**: inputs, outputs, the entry graph, witnesses, assembly.
//! - **config**: wire constants and [`BuilderConfig`](config::BuilderConfig).
//! - **error**: [`SignerError`](error::SignerError) and its kinds.
//! - **logging**: optional `tracing` subscriber setup.
//!
//! ## Flow
//!
//! ```text
//! fields -> commitments -> entry graph -> tx id -> witnesses -> raw bytes
//! ```
//!
//! The id is fixed before any signature exists, and every signature commits
//! to it, so the two phases can never disagree.

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod transaction;
pub mod types;

pub use error::{ErrorKind, Result, SignerError};
pub use transaction::{ChainKdKeyStore, InputBuilder, KeyStore, Output, SignedTransaction, TransactionBuilder};
