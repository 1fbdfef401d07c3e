//! End-to-end tests for the signer.
//!
//! Every test drives the public API only: build inputs from hex fields, run
//! the assembler against a key store, and pick the resulting bytes apart
//! with the codec's reader.

use tx_signer::config::{BuilderConfig, SERIALIZATION_FLAGS};
use tx_signer::crypto::{DerivationPath, XPrv, XPub};
use tx_signer::encoding::Reader;
use tx_signer::error::{ErrorKind, Result, SignerError};
use tx_signer::transaction::witness::{account_path, issuance_path, sig_hash};
use tx_signer::transaction::{
    compute_asset_id, map_transaction, ChainKdKeyStore, Input, InputBuilder, KeyStore, Output,
    TransactionBuilder,
};
use tx_signer::types::Program;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const BTM: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
const RECEIVER: &str = "00147211ec12410ce8bd0d71cab0a29be3ea61c71eb1";
const CHANGE: &str = "0014a86c83ee12e6d790fb388345cc2e2b87056a0773";

fn root() -> XPrv {
    XPrv::from_seed(b"e2e root seed for the signer tests")
}

fn spend(source: u8, amount: u64) -> InputBuilder {
    InputBuilder::spend()
        .source_id(&hex::encode([source; 32]))
        .source_position(0)
        .asset_id(BTM)
        .amount(amount)
        .program(CHANGE)
        .key_index(1)
        .root_private_key(&root().to_hex())
}

fn transfer() -> TransactionBuilder {
    TransactionBuilder::new()
        .input(spend(0x11, 60_000_000).build().unwrap())
        .input(spend(0x22, 50_000_000).build().unwrap())
        .output(Output::new(BTM, 100_000_000, RECEIVER))
        .output(Output::new(BTM, 9_000_000, CHANGE))
}

/// A key store that refuses to sign.
struct OfflineKeyStore;

impl KeyStore for OfflineKeyStore {
    fn derive(&self, root: &XPrv, path: &DerivationPath) -> Result<XPub> {
        ChainKdKeyStore.derive(root, path)
    }

    fn sign(&self, _root: &XPrv, _path: &DerivationPath, _message: &[u8]) -> Result<[u8; 64]> {
        Err(SignerError::Signing("hardware key unavailable".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn transfer_round_trips_through_the_reader() {
    let tx = transfer().build(&ChainKdKeyStore).unwrap();

    let mut reader = Reader::new(&tx.raw);
    assert_eq!(reader.read_u8().unwrap(), SERIALIZATION_FLAGS);
    assert_eq!(reader.read_varint().unwrap(), 1);
    assert_eq!(reader.read_varint().unwrap(), 0);

    assert_eq!(reader.read_varint().unwrap(), 2);
    for _ in 0..2 {
        assert_eq!(reader.read_varint().unwrap(), 1);
        let commitment = reader.read_extensible().unwrap();
        assert_eq!(commitment[0], 1, "spend tag");
        let witness = reader.read_extensible().unwrap();
        assert_eq!(Reader::new(witness).read_var_str_list().unwrap().len(), 2);
    }

    assert_eq!(reader.read_varint().unwrap(), 2);
    for output in &tx.outputs {
        let expected = output.serialize_output().unwrap();
        assert_eq!(reader.read_bytes(expected.len()).unwrap(), expected.as_slice());
    }
    assert!(reader.is_empty());
}

#[test]
fn tx_id_matches_the_graph() {
    let inputs: Vec<Input> = vec![
        spend(0x11, 60_000_000).build().unwrap(),
        spend(0x22, 50_000_000).build().unwrap(),
    ];
    let outputs = vec![
        Output::new(BTM, 100_000_000, RECEIVER),
        Output::new(BTM, 9_000_000, CHANGE),
    ];
    let graph = map_transaction(1, 0, &inputs, &outputs).unwrap();

    let tx = transfer().build(&ChainKdKeyStore).unwrap();
    assert_eq!(tx.tx_id, graph.tx_id);
    assert_eq!(tx.input_ids, graph.input_ids);
    assert_eq!(tx.outputs[1].id, Some(graph.result_ids[1]));
}

#[test]
fn signatures_verify_under_the_derived_public_key() {
    let tx = transfer().build(&ChainKdKeyStore).unwrap();
    let xpub = root().xpub().derive(&account_path(1, false, 1).unwrap()).unwrap();

    let mut reader = Reader::new(&tx.raw);
    reader.read_u8().unwrap();
    reader.read_varint().unwrap();
    reader.read_varint().unwrap();
    reader.read_varint().unwrap();

    for input_id in &tx.input_ids {
        reader.read_varint().unwrap();
        reader.read_extensible().unwrap();
        let witness = reader.read_extensible().unwrap();
        let args = Reader::new(witness).read_var_str_list().unwrap();

        assert_eq!(args[1], xpub.public_key().as_slice());
        let message = sig_hash(input_id, &tx.tx_id);
        assert!(xpub.verify(message.as_bytes(), args[0]));
    }
}

#[test]
fn building_twice_gives_identical_bytes() {
    let a = transfer().build(&ChainKdKeyStore).unwrap();
    let b = transfer().build(&ChainKdKeyStore).unwrap();
    assert_eq!(a.to_hex(), b.to_hex());
}

#[test]
fn parallel_and_sequential_signing_agree() {
    let sequential = BuilderConfig::from_json(r#"{"parallel_signing": false}"#).unwrap();
    let a = transfer().build(&ChainKdKeyStore).unwrap();
    let b = transfer().config(sequential).build(&ChainKdKeyStore).unwrap();
    assert_eq!(a, b);
}

#[test]
fn a_failing_key_store_aborts_the_build() {
    let err = transfer().build(&OfflineKeyStore).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Signing);
}

#[test]
fn missing_fields_surface_before_any_graph_work() {
    let err = InputBuilder::spend()
        .source_id(&hex::encode([1u8; 32]))
        .asset_id(BTM)
        .amount(1)
        .program(CHANGE)
        .root_private_key(&root().to_hex())
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "the key index of input must be specified");
}

#[test]
fn issuance_into_retirement() {
    let issuance_program = "ae2066147ab3a5d1fdc1b3ea4a3b1bd3cd8b7a6f6e0d35d1c0ec5dd4fa1d4b5c7a5151ad";
    let definition = br#"{"name":"GOLD","decimals":8}"#.to_vec();
    let asset = compute_asset_id(
        &Program::new(1, hex::decode(issuance_program).unwrap()),
        &definition,
    );

    let issuance = InputBuilder::issuance(definition)
        .nonce(vec![0x5a; 8])
        .asset_id(&asset.to_hex())
        .amount(1_000)
        .program(issuance_program)
        .key_index(4)
        .root_private_key(&root().to_hex())
        .build()
        .unwrap();

    let tx = TransactionBuilder::new()
        .input(issuance)
        .input(spend(0x33, 10_000_000).build().unwrap())
        .output(Output::new(&asset.to_hex(), 600, RECEIVER))
        .output(Output::new(&asset.to_hex(), 400, "6a"))
        .output(Output::new(BTM, 10_000_000, CHANGE))
        .build(&ChainKdKeyStore)
        .unwrap();

    // issuance signs with the asset key and pushes only the signature
    let mut reader = Reader::new(&tx.raw);
    reader.read_u8().unwrap();
    reader.read_varint().unwrap();
    reader.read_varint().unwrap();
    assert_eq!(reader.read_varint().unwrap(), 2);
    reader.read_varint().unwrap();
    assert_eq!(reader.read_extensible().unwrap()[0], 0, "issuance tag");
    let mut witness = Reader::new(reader.read_extensible().unwrap());
    witness.read_var_str().unwrap();
    witness.read_varint().unwrap();
    witness.read_var_str().unwrap();
    let args = witness.read_var_str_list().unwrap();
    assert_eq!(args.len(), 1);

    let asset_key = root().xpub().derive(&issuance_path(4)).unwrap();
    let message = sig_hash(&tx.input_ids[0], &tx.tx_id);
    assert!(asset_key.verify(message.as_bytes(), args[0]));
}

#[test]
fn wide_key_index_fails_spend_signing() {
    let input = spend(0x44, 1).key_index(u64::from(u32::MAX) + 1).build().unwrap();
    let err = TransactionBuilder::new()
        .input(input)
        .output(Output::new(BTM, 1, RECEIVER))
        .build(&ChainKdKeyStore)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Signing);
}
