//! Maps a transaction onto its entry graph.
//!
//! ```text
//!   prevout ─► spend ─┐
//!          issuance ──┼─► mux ─► output / retirement ... ─► header
//!          coinbase ──┘
//! ```
//!
//! Inputs are registered in order, each feeding one source into the mux.
//! Every output then draws from the mux at its own position, and the header
//! commits to the result ids in output order. The transaction id is the
//! header's id.

use super::entry::{Entry, EntryMap};
use super::input::Input;
use super::output::Output;
use crate::config::{OP_TRUE, VM_VERSION};
use crate::error::Result;
use crate::types::{Hash, Program, ValueSource};

/// The ids a built graph exposes.
#[derive(Debug)]
pub struct TxGraph {
    /// Id of the header entry.
    pub tx_id: Hash,
    /// Input entry ids, in input order.
    pub input_ids: Vec<Hash>,
    /// Mux entry id.
    pub mux_id: Hash,
    /// Result entry ids, in output order.
    pub result_ids: Vec<Hash>,
    /// Every entry registered along the way.
    pub entries: EntryMap,
}

/// Builds the entry graph for the given inputs and outputs.
pub fn map_transaction(
    version: u64,
    time_range: u64,
    inputs: &[Input],
    outputs: &[Output],
) -> Result<TxGraph> {
    let mut entries = EntryMap::new();

    let input_entries: Vec<_> = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| input.to_input_entry(&mut entries, index))
        .collect();

    let sources = input_entries
        .iter()
        .map(|e| ValueSource::new(e.id, e.value, 0))
        .collect();
    let mux_id = entries.add(Entry::Mux {
        sources,
        program: Program::new(VM_VERSION, vec![OP_TRUE]),
    });

    let result_ids = outputs
        .iter()
        .enumerate()
        .map(|(position, output)| output.to_result_entry(&mut entries, mux_id, position))
        .collect::<Result<Vec<_>>>()?;

    let tx_id = entries.add(Entry::TxHeader {
        version,
        time_range,
        result_ids: result_ids.clone(),
    });

    Ok(TxGraph {
        tx_id,
        input_ids: input_entries.iter().map(|e| e.id).collect(),
        mux_id,
        result_ids,
        entries,
    })
}
