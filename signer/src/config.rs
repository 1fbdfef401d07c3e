//! # Protocol Constants & Builder Configuration
//!
//! Every wire-format constant the signer depends on lives here. These are
//! fixed by the ledger's consensus rules, not by us. Changing one of them
//! produces transactions the network will reject, so don't.
//!
//! The only tunable knobs are in [`BuilderConfig`], and none of them change
//! the bytes that come out.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignerError};

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Asset version prefixed to every input and output.
pub const ASSET_VERSION: u64 = 1;

/// VM version for control and issuance programs.
pub const VM_VERSION: u64 = 1;

/// Default transaction version.
pub const TX_VERSION: u64 = 1;

/// Serialization flags byte that opens a fully serialized transaction
/// (asset version, commitment suffixes and witnesses all present).
pub const SERIALIZATION_FLAGS: u8 = 0x07;

/// Input commitment type tags.
pub const ISSUANCE_INPUT_TYPE: u8 = 0;
pub const SPEND_INPUT_TYPE: u8 = 1;
pub const COINBASE_INPUT_TYPE: u8 = 2;
pub const VETO_INPUT_TYPE: u8 = 3;

// ---------------------------------------------------------------------------
// VM opcodes the builder needs to know about
// ---------------------------------------------------------------------------

/// `OP_TRUE`, the mux program.
pub const OP_TRUE: u8 = 0x51;

/// `OP_FAIL`. A control program starting with it makes the output a retirement.
pub const OP_FAIL: u8 = 0x6a;

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Key space byte for asset (issuance) keys.
pub const ASSET_KEY_SPACE: u8 = 0;

/// BIP44 purpose used by account keys.
pub const BIP44_PURPOSE: u32 = 44;

/// BIP44 coin type registered for the ledger.
pub const BIP44_COIN_TYPE: u32 = 153;

// ---------------------------------------------------------------------------
// Transaction limits
// ---------------------------------------------------------------------------

/// Hard cap on inputs per transaction (the count is a 31-bit varint).
pub const MAX_TX_INPUTS: usize = i32::MAX as usize;

/// Hard cap on outputs per transaction.
pub const MAX_TX_OUTPUTS: usize = i32::MAX as usize;

// ---------------------------------------------------------------------------
// BuilderConfig
// ---------------------------------------------------------------------------

/// Knobs for the transaction assembler.
///
/// None of these affect the serialized bytes; they only change how the work
/// is scheduled and what the builder is willing to accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Sign inputs on the rayon thread pool instead of one after another.
    pub parallel_signing: bool,
    /// Reject transactions with more inputs than this.
    pub max_inputs: usize,
    /// Reject transactions with more outputs than this.
    pub max_outputs: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            parallel_signing: true,
            max_inputs: 256,
            max_outputs: 256,
        }
    }
}

impl BuilderConfig {
    /// Parses a config from JSON. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SignerError::InvalidTransaction(format!("bad builder config: {e}")))?;
        config.check()?;
        Ok(config)
    }

    /// Rejects limits beyond what the wire format can express.
    pub fn check(&self) -> Result<()> {
        if self.max_inputs == 0 || self.max_inputs > MAX_TX_INPUTS {
            return Err(SignerError::InvalidTransaction(format!(
                "max_inputs must be in 1..={MAX_TX_INPUTS}, got {}",
                self.max_inputs
            )));
        }
        if self.max_outputs == 0 || self.max_outputs > MAX_TX_OUTPUTS {
            return Err(SignerError::InvalidTransaction(format!(
                "max_outputs must be in 1..={MAX_TX_OUTPUTS}, got {}",
                self.max_outputs
            )));
        }
        Ok(())
    }
}
