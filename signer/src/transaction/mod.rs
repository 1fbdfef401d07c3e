//! # Transaction Module
//!
//! Everything between raw caller fields and a submittable transaction.
//!
//! ## Submodules
//!
//! - [`output`]: outputs and their commitment bytes.
//! - [`input`]: the four input kinds, validation, commitments and witnesses.
//! - [`entry`]: content-addressed graph entries and the build-scoped map.
//! - [`graph`]: maps inputs and outputs onto entries and derives the id.
//! - [`witness`]: derivation paths, signature hash, the [`KeyStore`] seam.
//! - [`builder`]: [`TransactionBuilder`] and the final serialization.

pub mod builder;
pub mod entry;
pub mod graph;
pub mod input;
pub mod output;
pub mod witness;

pub use builder::{SignedTransaction, TransactionBuilder};
pub use entry::{Entry, EntryMap};
pub use graph::{map_transaction, TxGraph};
pub use input::{compute_asset_id, Input, InputBuilder, InputEntry, InputKind, SpentOutput, WitnessedInput};
pub use output::Output;
pub use witness::{ChainKdKeyStore, KeyStore, WitnessComponent};
