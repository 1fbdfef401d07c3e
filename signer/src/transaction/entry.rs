//! # Entries
//!
//! A transaction is hashed not as one blob but as a graph of small,
//! content-addressed *entries*: the outputs being spent, the spends, the
//! issuances, a mux that pools every input value, and the results that draw
//! from it. The transaction id is the id of the header entry at the root.
//!
//! ## Entry ids
//!
//! ```text
//! id = SHA3-256("entryid:" || type || ":" || SHA3-256(body))
//! ```
//!
//! `body` uses the hash encoding: `u64` as 8 little-endian bytes, hashes and
//! asset ids as their raw 32 bytes, byte strings length-prefixed, lists
//! count-prefixed, structs field by field. Only the fields the ledger commits
//! to are written. Bookkeeping such as an input's ordinal is kept outside the
//! entry so it can never leak into the id.
//!
//! ## Deduplication
//!
//! [`EntryMap`] keys entries by id. Registering content that is already
//! present returns the existing id and stores nothing, so two structurally
//! identical entries always collapse into one node.

use std::collections::HashMap;

use crate::crypto::hash::sha3_256_multi;
use crate::types::{AssetAmount, AssetId, Hash, Program, ValueSource};

// ---------------------------------------------------------------------------
// Hash encoding
// ---------------------------------------------------------------------------

/// Appends an in-memory length as a varint.
///
/// Slice lengths never exceed `isize::MAX`, so the bytes always match
/// [`write_varint`](crate::encoding::write_varint) and this cannot fail.
fn write_length(len: usize, w: &mut Vec<u8>) {
    let mut value = len;
    while value >= 0x80 {
        w.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    w.push(value as u8);
}

/// Values that can be fed into an entry body.
pub trait WriteForHash {
    fn write_for_hash(&self, w: &mut Vec<u8>);
}

impl WriteForHash for u64 {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        w.extend_from_slice(&self.to_le_bytes());
    }
}

impl WriteForHash for Hash {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        w.extend_from_slice(self.as_bytes());
    }
}

impl WriteForHash for AssetId {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        w.extend_from_slice(self.as_bytes());
    }
}

impl WriteForHash for [u8] {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        write_length(self.len(), w);
        w.extend_from_slice(self);
    }
}

impl WriteForHash for AssetAmount {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        self.asset_id.write_for_hash(w);
        self.amount.write_for_hash(w);
    }
}

impl WriteForHash for Program {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        self.vm_version.write_for_hash(w);
        self.code.write_for_hash(w);
    }
}

impl WriteForHash for ValueSource {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        self.reference.write_for_hash(w);
        self.value.write_for_hash(w);
        self.position.write_for_hash(w);
    }
}

fn write_list_for_hash<T: WriteForHash>(items: &[T], w: &mut Vec<u8>) {
    write_length(items.len(), w);
    for item in items {
        item.write_for_hash(w);
    }
}

impl WriteForHash for [ValueSource] {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        write_list_for_hash(self, w);
    }
}

impl WriteForHash for [Hash] {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        write_list_for_hash(self, w);
    }
}

impl WriteForHash for Vec<u8> {
    fn write_for_hash(&self, w: &mut Vec<u8>) {
        self.as_slice().write_for_hash(w);
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// Every node kind the transaction graph can contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// An output: either a prior output being spent or a new result.
    Output {
        source: ValueSource,
        control_program: Program,
    },
    /// A prior vote output, consumed by a veto input.
    VoteOutput {
        source: ValueSource,
        control_program: Program,
        vote: Vec<u8>,
    },
    /// A result that destroys value.
    Retirement { source: ValueSource },
    /// Spends the output with the given id.
    Spend { spent_output_id: Hash },
    /// Withdraws a vote output.
    Veto { spent_output_id: Hash },
    /// Creates new units of an asset.
    Issuance { nonce_hash: Hash, value: AssetAmount },
    /// Block reward.
    Coinbase { arbitrary: Vec<u8> },
    /// Pools every input value so results can draw from it.
    Mux {
        sources: Vec<ValueSource>,
        program: Program,
    },
    /// The root. Its id is the transaction id.
    TxHeader {
        version: u64,
        time_range: u64,
        result_ids: Vec<Hash>,
    },
}

impl Entry {
    /// The type string mixed into the id.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Output { .. } => "output1",
            Self::VoteOutput { .. } => "voteOutput1",
            Self::Retirement { .. } => "retirement1",
            Self::Spend { .. } => "spend1",
            Self::Veto { .. } => "vetoInput1",
            Self::Issuance { .. } => "issuance1",
            Self::Coinbase { .. } => "coinbase1",
            Self::Mux { .. } => "mux1",
            Self::TxHeader { .. } => "txheader",
        }
    }

    /// The canonical body the id commits to.
    pub fn body(&self) -> Vec<u8> {
        let mut w = Vec::with_capacity(128);
        match self {
            Self::Output {
                source,
                control_program,
            } => {
                source.write_for_hash(&mut w);
                control_program.write_for_hash(&mut w);
            }
            Self::VoteOutput {
                source,
                control_program,
                vote,
            } => {
                source.write_for_hash(&mut w);
                control_program.write_for_hash(&mut w);
                vote.write_for_hash(&mut w);
            }
            Self::Retirement { source } => source.write_for_hash(&mut w),
            Self::Spend { spent_output_id } | Self::Veto { spent_output_id } => {
                spent_output_id.write_for_hash(&mut w)
            }
            Self::Issuance { nonce_hash, value } => {
                nonce_hash.write_for_hash(&mut w);
                value.write_for_hash(&mut w);
            }
            Self::Coinbase { arbitrary } => arbitrary.write_for_hash(&mut w),
            Self::Mux { sources, program } => {
                sources.as_slice().write_for_hash(&mut w);
                program.write_for_hash(&mut w);
            }
            Self::TxHeader {
                version,
                time_range,
                result_ids,
            } => {
                version.write_for_hash(&mut w);
                time_range.write_for_hash(&mut w);
                result_ids.as_slice().write_for_hash(&mut w);
            }
        }
        w
    }

    /// Computes the entry id from the type and body.
    pub fn id(&self) -> Hash {
        let inner = sha3_256_multi(&[&self.body()]);
        Hash::from_bytes(sha3_256_multi(&[
            b"entryid:",
            self.type_name().as_bytes(),
            b":",
            &inner,
        ]))
    }
}

// ---------------------------------------------------------------------------
// EntryMap
// ---------------------------------------------------------------------------

/// Build-scoped store of entries keyed by id.
///
/// Created fresh for each transaction, filled during graph construction and
/// dropped once the transaction id is known.
#[derive(Debug, Default)]
pub struct EntryMap {
    entries: HashMap<Hash, Entry>,
}

impl EntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` and returns its id. Content that is already present
    /// is not stored twice.
    pub fn add(&mut self, entry: Entry) -> Hash {
        let id = entry.id();
        self.entries.entry(id).or_insert(entry);
        id
    }

    pub fn get(&self, id: &Hash) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &Hash) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, entry)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Hash, &Entry)> {
        self.entries.iter()
    }
}
