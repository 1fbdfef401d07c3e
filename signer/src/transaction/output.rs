//! Transaction outputs and their binary commitment.
//!
//! An output locks `amount` units of `asset_id` under `control_program`.
//! Fields arrive as hex strings straight from the caller; they are decoded
//! when the output is committed to the graph or serialized, and a bad field
//! fails the build right there.
//!
//! # Wire format
//!
//! ```text
//! varint(asset_version = 1)
//! extensible( asset_id[32] || varint(amount) || varint(vm_version = 1) || var_str(control_program) )
//! varint(0)                                   // outputs carry no witness
//! ```

use serde::{Deserialize, Serialize};

use super::entry::{Entry, EntryMap};
use crate::config::{ASSET_VERSION, OP_FAIL, VM_VERSION};
use crate::encoding::{write_extensible, write_var_str, write_varint};
use crate::error::{Result, SignerError};
use crate::types::{AssetAmount, AssetId, Hash, Program, ValueSource};

/// A value-controlling output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// The number of units of the asset being controlled.
    pub amount: u64,

    /// Hex id of the asset being controlled.
    pub asset_id: String,

    /// Hex control program that must be satisfied to spend this output.
    pub control_program: String,

    /// Entry id of the output, assigned once the transaction is built.
    pub id: Option<Hash>,

    /// Position in the transaction's output list, assigned with `id`.
    pub position: Option<usize>,
}

impl Output {
    pub fn new(asset_id: &str, amount: u64, control_program: &str) -> Self {
        Self {
            amount,
            asset_id: asset_id.to_string(),
            control_program: control_program.to_string(),
            id: None,
            position: None,
        }
    }

    /// Decoded asset id.
    pub fn asset(&self) -> Result<AssetId> {
        AssetId::from_hex(&self.asset_id)
    }

    /// Decoded control program bytes.
    pub fn program_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.control_program).map_err(SignerError::decoding("control program"))
    }

    /// `true` if the control program is provably unspendable.
    pub fn is_retirement(&self) -> Result<bool> {
        Ok(self.program_bytes()?.first() == Some(&OP_FAIL))
    }

    /// Serializes the output commitment followed by an empty witness.
    pub fn serialize_output(&self) -> Result<Vec<u8>> {
        let asset_id = self.asset()?;
        let program = self.program_bytes()?;

        let mut commitment = Vec::with_capacity(36 + program.len());
        commitment.extend_from_slice(asset_id.as_bytes());
        write_varint(self.amount, &mut commitment)?;
        write_varint(VM_VERSION, &mut commitment)?;
        write_var_str(&program, &mut commitment)?;

        let mut out = Vec::with_capacity(commitment.len() + 4);
        write_varint(ASSET_VERSION, &mut out)?;
        write_extensible(&commitment, &mut out)?;
        write_varint(0, &mut out)?;
        Ok(out)
    }

    /// Registers this output as a result drawing from the mux at `position`.
    ///
    /// Unspendable programs become retirements, everything else an output.
    pub fn to_result_entry(
        &self,
        entries: &mut EntryMap,
        mux_id: Hash,
        position: usize,
    ) -> Result<Hash> {
        let value = AssetAmount::new(self.asset()?, self.amount);
        let source = ValueSource::new(mux_id, value, position as u64);
        let program = self.program_bytes()?;

        let entry = if program.first() == Some(&OP_FAIL) {
            Entry::Retirement { source }
        } else {
            Entry::Output {
                source,
                control_program: Program::new(VM_VERSION, program),
            }
        };
        Ok(entries.add(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Reader;

    const ZERO_ASSET: &str = "0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn serialize_known_vector() {
        let out = Output::new(ZERO_ASSET, 100, "51").serialize_output().unwrap();

        let mut expected = vec![0x01, 0x24];
        expected.extend_from_slice(&[0u8; 32]);
        expected.extend_from_slice(&[0x64, 0x01, 0x01, 0x51]);
        expected.push(0x00);
        assert_eq!(out, expected);
    }

    #[test]
    fn serialization_is_deterministic() {
        let output = Output::new(ZERO_ASSET, 12_345, "0014c5a5b563c4623018557fb299259542b8739f6d0d");
        assert_eq!(
            output.serialize_output().unwrap(),
            output.serialize_output().unwrap()
        );
    }

    #[test]
    fn commitment_block_is_skippable() {
        let output = Output::new(ZERO_ASSET, 1 << 40, "00145c1fb6a4cbcd3e98f6f5e2b0ef53bbe0c0e43a50");
        let bytes = output.serialize_output().unwrap();

        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varint().unwrap(), 1);
        let commitment = reader.read_extensible().unwrap();
        assert_eq!(reader.read_varint().unwrap(), 0);
        assert!(reader.is_empty());

        let mut inner = Reader::new(commitment);
        assert_eq!(inner.read_array32().unwrap(), [0u8; 32]);
        assert_eq!(inner.read_varint().unwrap(), 1 << 40);
        assert_eq!(inner.read_varint().unwrap(), 1);
        assert_eq!(inner.read_var_str().unwrap().len(), 22);
    }

    #[test]
    fn bad_asset_hex_is_a_decoding_error() {
        let err = Output::new("xyz", 1, "51").serialize_output().unwrap_err();
        assert!(matches!(err, SignerError::Decoding { field: "asset id", .. }));
    }

    #[test]
    fn bad_program_hex_is_a_decoding_error() {
        let err = Output::new(ZERO_ASSET, 1, "5").serialize_output().unwrap_err();
        assert!(matches!(
            err,
            SignerError::Decoding {
                field: "control program",
                ..
            }
        ));
    }

    #[test]
    fn op_fail_programs_retire_value() {
        let mut entries = EntryMap::new();
        let mux = Hash::from_bytes([3; 32]);

        let retire = Output::new(ZERO_ASSET, 5, "6a");
        assert!(retire.is_retirement().unwrap());
        let id = retire.to_result_entry(&mut entries, mux, 0).unwrap();
        assert!(matches!(entries.get(&id), Some(Entry::Retirement { .. })));

        let keep = Output::new(ZERO_ASSET, 5, "51");
        assert!(!keep.is_retirement().unwrap());
        let id = keep.to_result_entry(&mut entries, mux, 1).unwrap();
        assert!(matches!(entries.get(&id), Some(Entry::Output { .. })));
    }

    #[test]
    fn result_position_changes_the_id() {
        let mut entries = EntryMap::new();
        let mux = Hash::from_bytes([3; 32]);
        let output = Output::new(ZERO_ASSET, 5, "51");
        let a = output.to_result_entry(&mut entries, mux, 0).unwrap();
        let b = output.to_result_entry(&mut entries, mux, 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(entries.len(), 2);
    }
}
