//! # Inputs
//!
//! Every input kind the ledger knows about, from an unvalidated
//! [`InputBuilder`] through a validated [`Input`] to a [`WitnessedInput`]
//! that can finally be serialized.
//!
//! ## Lifecycle
//!
//! ```text
//! InputBuilder --build()--> Input --build_witness()--> WitnessedInput --serialize_input()--> bytes
//!                              |
//!                              +--to_input_entry()--> EntryMap
//! ```
//!
//! Only a `WitnessedInput` can be serialized, so an input can never reach
//! the wire without its witness.
//!
//! ## Commitments
//!
//! | Kind     | Tag | Commitment body |
//! |----------|-----|-----------------|
//! | Issuance | 0   | `var_str(nonce) \|\| asset_id \|\| varint(amount)` |
//! | Spend    | 1   | `extensible(source_id \|\| asset_id \|\| varint(amount) \|\| varint(source_position) \|\| varint(vm_version) \|\| var_str(program))` |
//! | Coinbase | 2   | `var_str(arbitrary)` |
//! | Veto     | 3   | `extensible(<spend body>) \|\| var_str(vote)` |

use serde::{Deserialize, Serialize};

use super::entry::{Entry, EntryMap, WriteForHash};
use super::witness::{account_path, issuance_path, sig_hash, KeyStore, WitnessComponent};
use crate::config::{
    ASSET_VERSION, COINBASE_INPUT_TYPE, ISSUANCE_INPUT_TYPE, SPEND_INPUT_TYPE, VETO_INPUT_TYPE,
    VM_VERSION,
};
use crate::crypto::chainkd::{DerivationPath, XPrv};
use crate::crypto::hash::sha3_256;
use crate::encoding::{write_extensible, write_var_str, write_var_str_list, write_varint};
use crate::error::{RequiredField, Result, SignerError};
use crate::types::{AssetAmount, AssetId, Hash, Program, ValueSource};

/// Length of the random nonce given to issuances that don't set one.
const ISSUANCE_NONCE_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// A prior output consumed by a spend or a veto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentOutput {
    /// Id of the entry that produced the output.
    pub source_id: Hash,
    /// Position of the output among that entry's results.
    pub source_position: u64,
    /// BIP44 change flag of the key that controls the output.
    pub change: bool,
    /// BIP44 address index of the key that controls the output.
    pub address_index: u64,
}

/// The closed set of input kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// Creates new units. `asset_definition` travels in the witness.
    Issuance {
        nonce: Vec<u8>,
        asset_definition: Vec<u8>,
    },
    Spend(SpentOutput),
    /// Block reward. Carries no signature.
    Coinbase { arbitrary: Vec<u8> },
    /// Withdraws a vote output.
    Veto { spent: SpentOutput, vote: Vec<u8> },
}

impl InputKind {
    /// The commitment type tag.
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Issuance { .. } => ISSUANCE_INPUT_TYPE,
            Self::Spend(_) => SPEND_INPUT_TYPE,
            Self::Coinbase { .. } => COINBASE_INPUT_TYPE,
            Self::Veto { .. } => VETO_INPUT_TYPE,
        }
    }
}

#[derive(Debug, Clone)]
enum PendingKind {
    Issuance {
        nonce: Option<Vec<u8>>,
        asset_definition: Vec<u8>,
    },
    Spend,
    Coinbase {
        arbitrary: Vec<u8>,
    },
    Veto {
        vote: Vec<u8>,
    },
}

// ---------------------------------------------------------------------------
// InputBuilder
// ---------------------------------------------------------------------------

/// Collects the fields of one input.
///
/// Nothing is decoded until [`build`](Self::build), which validates first
/// and fails on the first missing field.
///
/// ```rust,no_run
/// use tx_signer::transaction::InputBuilder;
///
/// let input = InputBuilder::spend()
///     .source_id("f6b3a1ee4c3a5f9bd1a7f7ecc9da4d60d6fe1cb5d3e1ab1f88c2e1e0d5e8a1c4")
///     .source_position(0)
///     .asset_id("ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
///     .amount(100_000)
///     .program("0014d47c3f4ea1f18e6a1b2e1de1d1c24f2f3e4c0f4a")
///     .key_index(1)
///     .root_private_key("<128 hex chars>")
///     .build()?;
/// # Ok::<(), tx_signer::error::SignerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct InputBuilder {
    kind: PendingKind,
    asset_id: Option<String>,
    amount: Option<u64>,
    program: Option<String>,
    vm_version: u64,
    key_index: Option<u64>,
    root_private_key: Option<String>,
    source_id: Option<String>,
    source_position: u64,
    change: bool,
    address_index: u64,
}

impl InputBuilder {
    fn with_kind(kind: PendingKind) -> Self {
        Self {
            kind,
            asset_id: None,
            amount: None,
            program: None,
            vm_version: VM_VERSION,
            key_index: None,
            root_private_key: None,
            source_id: None,
            source_position: 0,
            change: false,
            address_index: 1,
        }
    }

    /// An issuance of a new asset. `program` is the issuance program.
    pub fn issuance(asset_definition: impl Into<Vec<u8>>) -> Self {
        Self::with_kind(PendingKind::Issuance {
            nonce: None,
            asset_definition: asset_definition.into(),
        })
    }

    /// A spend of a prior output. `program` is that output's control program.
    pub fn spend() -> Self {
        Self::with_kind(PendingKind::Spend)
    }

    pub fn coinbase(arbitrary: impl Into<Vec<u8>>) -> Self {
        Self::with_kind(PendingKind::Coinbase {
            arbitrary: arbitrary.into(),
        })
    }

    /// A veto of a prior vote output carrying `vote`.
    pub fn veto(vote: impl Into<Vec<u8>>) -> Self {
        Self::with_kind(PendingKind::Veto { vote: vote.into() })
    }

    pub fn asset_id(mut self, asset_id: &str) -> Self {
        self.asset_id = Some(asset_id.to_string());
        self
    }

    pub fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Control program for spends and vetoes, issuance program for issuances.
    pub fn program(mut self, program: &str) -> Self {
        self.program = Some(program.to_string());
        self
    }

    /// Defaults to 1.
    pub fn vm_version(mut self, vm_version: u64) -> Self {
        self.vm_version = vm_version;
        self
    }

    /// Account index for spends and vetoes, asset index for issuances.
    pub fn key_index(mut self, key_index: u64) -> Self {
        self.key_index = Some(key_index);
        self
    }

    /// Hex of the 64-byte root extended private key.
    pub fn root_private_key(mut self, xprv: &str) -> Self {
        self.root_private_key = Some(xprv.to_string());
        self
    }

    /// Id of the entry that produced the output being spent.
    pub fn source_id(mut self, source_id: &str) -> Self {
        self.source_id = Some(source_id.to_string());
        self
    }

    pub fn source_position(mut self, position: u64) -> Self {
        self.source_position = position;
        self
    }

    /// BIP44 change flag. Defaults to `false`.
    pub fn change(mut self, change: bool) -> Self {
        self.change = change;
        self
    }

    /// BIP44 address index. Defaults to 1.
    pub fn address_index(mut self, index: u64) -> Self {
        self.address_index = index;
        self
    }

    /// Issuance nonce. A random 8-byte nonce is drawn at build time if unset.
    pub fn nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        if let PendingKind::Issuance { nonce: slot, .. } = &mut self.kind {
            *slot = Some(nonce.into());
        }
        self
    }

    /// Fails with the first required field that is missing.
    pub fn validate(&self) -> Result<()> {
        if self.asset_id.is_none() {
            return Err(SignerError::MissingField(RequiredField::AssetId));
        }
        if self.amount.is_none() {
            return Err(SignerError::MissingField(RequiredField::Amount));
        }
        if self.program.is_none() {
            return Err(SignerError::MissingField(RequiredField::Program));
        }
        if self.key_index.is_none() {
            return Err(SignerError::MissingField(RequiredField::KeyIndex));
        }
        if self.root_private_key.is_none() {
            return Err(SignerError::MissingField(RequiredField::RootPrivateKey));
        }
        if matches!(self.kind, PendingKind::Spend | PendingKind::Veto { .. })
            && self.source_id.is_none()
        {
            return Err(SignerError::MissingField(RequiredField::SourceId));
        }
        Ok(())
    }

    /// Validates, decodes every hex field, and produces an immutable input.
    pub fn build(self) -> Result<Input> {
        self.validate()?;

        let missing = SignerError::MissingField;
        let asset_id = AssetId::from_hex(self.asset_id.as_deref().ok_or(missing(RequiredField::AssetId))?)?;
        let amount = self.amount.ok_or(missing(RequiredField::Amount))?;
        let program = hex::decode(self.program.as_deref().ok_or(missing(RequiredField::Program))?)
            .map_err(SignerError::decoding("program"))?;
        let key_index = self.key_index.ok_or(missing(RequiredField::KeyIndex))?;
        let root_key = XPrv::from_hex(
            self.root_private_key
                .as_deref()
                .ok_or(missing(RequiredField::RootPrivateKey))?,
        )?;

        let spent = |source_id: Option<&str>| -> Result<SpentOutput> {
            let source_id = source_id.ok_or(missing(RequiredField::SourceId))?;
            Ok(SpentOutput {
                source_id: decode_source_id(source_id)?,
                source_position: self.source_position,
                change: self.change,
                address_index: self.address_index,
            })
        };

        let kind = match self.kind.clone() {
            PendingKind::Issuance {
                nonce,
                asset_definition,
            } => InputKind::Issuance {
                nonce: nonce.unwrap_or_else(|| {
                    rand::random::<[u8; ISSUANCE_NONCE_LENGTH]>().to_vec()
                }),
                asset_definition,
            },
            PendingKind::Spend => InputKind::Spend(spent(self.source_id.as_deref())?),
            PendingKind::Coinbase { arbitrary } => InputKind::Coinbase { arbitrary },
            PendingKind::Veto { vote } => InputKind::Veto {
                spent: spent(self.source_id.as_deref())?,
                vote,
            },
        };

        Ok(Input {
            kind,
            value: AssetAmount::new(asset_id, amount),
            program: Program::new(self.vm_version, program),
            key_index,
            witness: WitnessComponent::new(root_key),
        })
    }
}

fn decode_source_id(source_id: &str) -> Result<Hash> {
    let bytes = hex::decode(source_id).map_err(SignerError::decoding("source id"))?;
    let arr: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| SignerError::InvalidLength {
            field: "source id",
            expected: 32,
            got: bytes.len(),
        })?;
    Ok(Hash::from_bytes(arr))
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A validated input, ready for the entry graph and for signing.
#[derive(Debug, Clone)]
pub struct Input {
    kind: InputKind,
    value: AssetAmount,
    program: Program,
    key_index: u64,
    witness: WitnessComponent,
}

/// What registering an input in the graph yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEntry {
    /// Id of the spend, issuance, coinbase or veto entry.
    pub id: Hash,
    /// Position of the input in the transaction. Not hashed.
    pub index: usize,
    /// Value the input contributes to the mux.
    pub value: AssetAmount,
}

impl Input {
    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    pub fn value(&self) -> AssetAmount {
        self.value
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn key_index(&self) -> u64 {
        self.key_index
    }

    /// The tagged commitment bytes.
    pub fn serialize_input_commitment(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(128);
        out.push(self.kind.type_tag());
        match &self.kind {
            InputKind::Issuance { nonce, .. } => {
                write_var_str(nonce, &mut out)?;
                out.extend_from_slice(self.value.asset_id.as_bytes());
                write_varint(self.value.amount, &mut out)?;
            }
            InputKind::Spend(spent) => {
                write_extensible(&self.spend_commitment(spent)?, &mut out)?;
            }
            InputKind::Coinbase { arbitrary } => {
                write_var_str(arbitrary, &mut out)?;
            }
            InputKind::Veto { spent, vote } => {
                write_extensible(&self.spend_commitment(spent)?, &mut out)?;
                write_var_str(vote, &mut out)?;
            }
        }
        Ok(out)
    }

    fn spend_commitment(&self, spent: &SpentOutput) -> Result<Vec<u8>> {
        let mut body = Vec::with_capacity(96 + self.program.code.len());
        body.extend_from_slice(spent.source_id.as_bytes());
        body.extend_from_slice(self.value.asset_id.as_bytes());
        write_varint(self.value.amount, &mut body)?;
        write_varint(spent.source_position, &mut body)?;
        write_varint(self.program.vm_version, &mut body)?;
        write_var_str(&self.program.code, &mut body)?;
        Ok(body)
    }

    fn spent_source(&self, spent: &SpentOutput) -> ValueSource {
        ValueSource::new(spent.source_id, self.value, spent.source_position)
    }

    /// Registers this input's entries and returns the input entry.
    ///
    /// Spends and vetoes register the output they consume first, then the
    /// input entry pointing at it.
    pub fn to_input_entry(&self, entries: &mut EntryMap, index: usize) -> InputEntry {
        let entry = match &self.kind {
            InputKind::Issuance { nonce, .. } => Entry::Issuance {
                nonce_hash: Hash::digest(nonce),
                value: self.value,
            },
            InputKind::Spend(spent) => {
                let spent_output_id = entries.add(Entry::Output {
                    source: self.spent_source(spent),
                    control_program: self.program.clone(),
                });
                Entry::Spend { spent_output_id }
            }
            InputKind::Coinbase { arbitrary } => Entry::Coinbase {
                arbitrary: arbitrary.clone(),
            },
            InputKind::Veto { spent, vote } => {
                let spent_output_id = entries.add(Entry::VoteOutput {
                    source: self.spent_source(spent),
                    control_program: self.program.clone(),
                    vote: vote.clone(),
                });
                Entry::Veto { spent_output_id }
            }
        };

        InputEntry {
            id: entries.add(entry),
            index,
            value: self.value,
        }
    }

    /// The path of the key that signs for this input, if it signs at all.
    pub fn derivation_path(&self) -> Result<Option<DerivationPath>> {
        match &self.kind {
            InputKind::Issuance { .. } => Ok(Some(issuance_path(self.key_index))),
            InputKind::Spend(spent) | InputKind::Veto { spent, .. } => Ok(Some(account_path(
                self.key_index,
                spent.change,
                spent.address_index,
            )?)),
            InputKind::Coinbase { .. } => Ok(None),
        }
    }

    /// Signs `SHA3-256(input_id || tx_id)` and fills in the witness arguments.
    pub fn build_witness(
        mut self,
        input_id: Hash,
        tx_id: Hash,
        key_store: &dyn KeyStore,
    ) -> Result<WitnessedInput> {
        if let Some(path) = self.derivation_path()? {
            let message = sig_hash(&input_id, &tx_id);
            self.witness.push_signature(key_store, &path, &message)?;
            if !matches!(self.kind, InputKind::Issuance { .. }) {
                self.witness.push_public_key(key_store, &path)?;
            }
        }
        Ok(WitnessedInput {
            input: self,
            input_id,
        })
    }
}

// ---------------------------------------------------------------------------
// WitnessedInput
// ---------------------------------------------------------------------------

/// An input whose witness has been built.
#[derive(Debug, Clone)]
pub struct WitnessedInput {
    input: Input,
    input_id: Hash,
}

impl WitnessedInput {
    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_id(&self) -> Hash {
        self.input_id
    }

    /// Witness arguments in push order.
    pub fn arguments(&self) -> &[Vec<u8>] {
        self.input.witness.arguments()
    }

    /// The witness bytes for this input's kind.
    pub fn serialize_input_witness(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(160);
        match &self.input.kind {
            InputKind::Issuance {
                asset_definition, ..
            } => {
                write_var_str(asset_definition, &mut out)?;
                write_varint(self.input.program.vm_version, &mut out)?;
                write_var_str(&self.input.program.code, &mut out)?;
                write_var_str_list(self.arguments(), &mut out)?;
            }
            InputKind::Spend(_) | InputKind::Veto { .. } => {
                write_var_str_list(self.arguments(), &mut out)?;
            }
            InputKind::Coinbase { .. } => {}
        }
        Ok(out)
    }

    /// `varint(asset_version) || extensible(commitment) || extensible(witness)`.
    pub fn serialize_input(&self) -> Result<Vec<u8>> {
        let commitment = self.input.serialize_input_commitment()?;
        let witness = self.serialize_input_witness()?;

        let mut out = Vec::with_capacity(commitment.len() + witness.len() + 8);
        write_varint(ASSET_VERSION, &mut out)?;
        write_extensible(&commitment, &mut out)?;
        write_extensible(&witness, &mut out)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Asset ids
// ---------------------------------------------------------------------------

/// Derives the id of the asset issued by `issuance_program` with the given
/// definition: `SHA3-256(program || SHA3-256(definition))` in hash encoding.
pub fn compute_asset_id(issuance_program: &Program, asset_definition: &[u8]) -> AssetId {
    let mut w = Vec::with_capacity(72 + issuance_program.code.len());
    issuance_program.write_for_hash(&mut w);
    Hash::from_bytes(sha3_256(asset_definition)).write_for_hash(&mut w);
    AssetId::from_bytes(sha3_256(&w))
}
