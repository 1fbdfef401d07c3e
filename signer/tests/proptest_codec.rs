use proptest::prelude::*;

use tx_signer::crypto::{DerivationPath, XPrv};
use tx_signer::encoding::{varint_len, write_var_str_list, write_varint, Reader, MAX_VARINT};
use tx_signer::error::ErrorKind;
use tx_signer::transaction::Output;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn varint_roundtrip(n in 0..=MAX_VARINT) {
        let mut buf = Vec::new();
        write_varint(n, &mut buf).unwrap();
        prop_assert_eq!(buf.len(), varint_len(n));

        let mut reader = Reader::new(&buf);
        prop_assert_eq!(reader.read_varint().unwrap(), n);
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn varint_rejects_the_top_bit(n in (MAX_VARINT + 1)..=u64::MAX) {
        let err = write_varint(n, &mut Vec::new()).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn var_str_list_roundtrip(items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..80), 0..6)) {
        let mut buf = Vec::new();
        write_var_str_list(&items, &mut buf).unwrap();

        let decoded = Reader::new(&buf).read_var_str_list().unwrap();
        prop_assert_eq!(decoded.len(), items.len());
        for (a, b) in decoded.iter().zip(&items) {
            prop_assert_eq!(*a, b.as_slice());
        }
    }

    #[test]
    fn output_commitment_is_skippable(
        asset in prop::array::uniform32(any::<u8>()),
        amount in 0..=MAX_VARINT,
        program in prop::collection::vec(any::<u8>(), 1..64)
    ) {
        let output = Output::new(&hex::encode(asset), amount, &hex::encode(&program));
        let bytes = output.serialize_output().unwrap();

        let mut reader = Reader::new(&bytes);
        prop_assert_eq!(reader.read_varint().unwrap(), 1);
        reader.read_extensible().unwrap();
        prop_assert_eq!(reader.read_varint().unwrap(), 0);
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn signatures_are_deterministic_and_verify(
        seed in prop::collection::vec(any::<u8>(), 16..64),
        index in any::<u32>(),
        message in prop::array::uniform32(any::<u8>())
    ) {
        let root = XPrv::from_seed(&seed);
        let path = DerivationPath::new(vec![index.to_le_bytes().to_vec()]);
        let child = root.derive(&path).unwrap();

        let sig = child.sign(&message);
        prop_assert_eq!(sig, child.sign(&message));
        prop_assert!(root.xpub().derive(&path).unwrap().verify(&message, &sig));
    }
}
