//! Transaction assembly via the builder pattern.
//!
//! [`TransactionBuilder`] collects validated inputs and outputs, then
//! `.build()` runs every phase in a fixed order:
//!
//! 1. **Validate**: at least one input and one output, within the limits of
//!    the [`BuilderConfig`].
//! 2. **Graph**: register every entry in a fresh [`EntryMap`](super::entry::EntryMap).
//! 3. **Id**: the header entry's id becomes the transaction id.
//! 4. **Witness**: sign every input against that id. Inputs are independent
//!    here, so this fans out over rayon when enabled.
//! 5. **Serialize**: concatenate the framing, inputs and outputs.
//!
//! Any failure aborts the build. A partially signed transaction is never
//! returned.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::graph::map_transaction;
use super::input::{Input, WitnessedInput};
use super::output::Output;
use super::witness::KeyStore;
use crate::config::{BuilderConfig, SERIALIZATION_FLAGS, TX_VERSION};
use crate::encoding::write_varint;
use crate::error::{Result, SignerError};
use crate::types::Hash;

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A fully witnessed transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Id of the header entry.
    pub tx_id: Hash,

    pub version: u64,

    pub time_range: u64,

    /// Input entry ids, in input order.
    pub input_ids: Vec<Hash>,

    /// Outputs with their `id` and `position` filled in.
    pub outputs: Vec<Output>,

    /// The serialized transaction.
    pub raw: Vec<u8>,
}

impl SignedTransaction {
    /// Hex of [`raw`](Self::raw), the form submitters expect.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.raw)
    }

    pub fn size_bytes(&self) -> usize {
        self.raw.len()
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`SignedTransaction`] instances.
///
/// ```rust,no_run
/// use tx_signer::transaction::{ChainKdKeyStore, InputBuilder, Output, TransactionBuilder};
///
/// # fn run(input: InputBuilder) -> tx_signer::error::Result<()> {
/// let tx = TransactionBuilder::new()
///     .time_range(0)
///     .input(input.build()?)
///     .output(Output::new(
///         "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
///         99_000_000,
///         "0014a86c83ee12e6d790fb388345cc2e2b87056a0773",
///     ))
///     .build(&ChainKdKeyStore)?;
/// println!("{}", tx.to_hex());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    config: BuilderConfig,
    version: u64,
    time_range: u64,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    /// Defaults: version 1, time range 0, [`BuilderConfig::default`].
    pub fn new() -> Self {
        Self {
            config: BuilderConfig::default(),
            version: TX_VERSION,
            time_range: 0,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Block height after which the transaction is no longer valid. 0 means
    /// no limit.
    pub fn time_range(mut self, time_range: u64) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    fn validate(&self) -> Result<()> {
        self.config.check()?;
        if self.inputs.is_empty() {
            return Err(SignerError::InvalidTransaction(
                "transaction has no inputs".into(),
            ));
        }
        if self.outputs.is_empty() {
            return Err(SignerError::InvalidTransaction(
                "transaction has no outputs".into(),
            ));
        }
        if self.inputs.len() > self.config.max_inputs {
            return Err(SignerError::InvalidTransaction(format!(
                "{} inputs exceed the limit of {}",
                self.inputs.len(),
                self.config.max_inputs
            )));
        }
        if self.outputs.len() > self.config.max_outputs {
            return Err(SignerError::InvalidTransaction(format!(
                "{} outputs exceed the limit of {}",
                self.outputs.len(),
                self.config.max_outputs
            )));
        }
        Ok(())
    }

    /// Consumes the builder, signs every input, and serializes the result.
    pub fn build(self, key_store: &dyn KeyStore) -> Result<SignedTransaction> {
        self.validate()?;

        let graph = map_transaction(self.version, self.time_range, &self.inputs, &self.outputs)?;
        let tx_id = graph.tx_id;
        info!(
            tx_id = %tx_id,
            inputs = self.inputs.len(),
            outputs = self.outputs.len(),
            entries = graph.entries.len(),
            "entry graph built"
        );

        let pending: Vec<(Input, Hash)> = self
            .inputs
            .into_iter()
            .zip(graph.input_ids.iter().copied())
            .collect();
        let witnessed: Vec<WitnessedInput> = if self.config.parallel_signing {
            pending
                .into_par_iter()
                .map(|(input, input_id)| input.build_witness(input_id, tx_id, key_store))
                .collect::<Result<_>>()?
        } else {
            pending
                .into_iter()
                .map(|(input, input_id)| input.build_witness(input_id, tx_id, key_store))
                .collect::<Result<_>>()?
        };
        debug!(tx_id = %tx_id, parallel = self.config.parallel_signing, "witnesses built");

        let mut outputs = self.outputs;
        for (position, (output, id)) in outputs.iter_mut().zip(&graph.result_ids).enumerate() {
            output.id = Some(*id);
            output.position = Some(position);
        }

        let raw = serialize_transaction(self.version, self.time_range, &witnessed, &outputs)?;
        debug!(tx_id = %tx_id, size = raw.len(), "transaction serialized");

        Ok(SignedTransaction {
            tx_id,
            version: self.version,
            time_range: self.time_range,
            input_ids: graph.input_ids,
            outputs,
            raw,
        })
    }
}

/// `serflags || varint(version) || varint(time_range) || varint(n) || inputs || varint(m) || outputs`
fn serialize_transaction(
    version: u64,
    time_range: u64,
    inputs: &[WitnessedInput],
    outputs: &[Output],
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(256 * (inputs.len() + outputs.len()));
    out.push(SERIALIZATION_FLAGS);
    write_varint(version, &mut out)?;
    write_varint(time_range, &mut out)?;

    write_varint(inputs.len() as u64, &mut out)?;
    for input in inputs {
        out.extend_from_slice(&input.serialize_input()?);
    }

    write_varint(outputs.len() as u64, &mut out)?;
    for output in outputs {
        out.extend_from_slice(&output.serialize_output()?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
