use confidential_tx::primitives::confidential::{
    ConfidentialAssetId, ConfidentialNonce, ConfidentialValue,
};
use confidential_tx::primitives::script::Script;
use confidential_tx::primitives::transaction::{OutPoint, Txid};
use confidential_tx::transaction::{ConfidentialTransaction, DEFAULT_SEQUENCE};
use confidential_tx::CtError;

// A 1-in/2-out unblinded transaction (second output is the fee).
const TX_SIMPLE_HEX: &str = "020000000001319bff5f4311e6255ecf4dd472650a6ef85fde7d11cd10d3e6ba5974174aeb560100000000ffffffff0201f38611eb688e6fcd06f25e2faf52b9f98364dc14c379ab085f1b57d56b4b1a6f0100000bd2cc1584c002deb65cc52301e1622f482a2f588b9800d2b8386ffabf74d6b2d73d17503a2f921976a9146a98a3f2935718df72518c00768ec67c589e0b2888ac01f38611eb688e6fcd06f25e2faf52b9f98364dc14c379ab085f1b57d56b4b1a6f0100000000004c4b40000000000000";

// A 1-in/2-out transaction with a signed segwit input.
const TX_WITNESS_HEX: &str = "0200000001017f3da365db9401a4d3facf68d2ccb6372bb714491987e5d035d2b474721078c601000000171600149a417c11cb67e1dc522997f07e1ff89e960d5ff1fdffffff020135e7a177b434ee0799be6dcffc945a1d892f2e0fdfc5975ba0f80d3bdbab9c84010000000002f9c1ec0017a914c9cbab5b0f3430e824b1961bf8e876be43d3fee0870135e7a177b434ee0799be6dcffc945a1d892f2e0fdfc5975ba0f80d3bdbab9c8401000000000000e07400000000000000000247304402207ab059e55e3e4337e88e1a6db00b7549110065eb5770880b1081dcdcdcf1c9a402207a3a0bc7d0d40661f54eff63c67838260a489984138d24eeee04b689f393bf2e012103753cff6c6123d25d99a3d02dc050a2c6b3ea40bcc04029c4330a4d30cb5390770000000000";

// TX_WITNESS_HEX after declaring a 100.0/10.0 issuance on input 0.
const TX_ISSUED_HEX: &str = "0200000001017f3da365db9401a4d3facf68d2ccb6372bb714491987e5d035d2b474721078c601000080171600149a417c11cb67e1dc522997f07e1ff89e960d5ff1fdffffff000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000100000002540be40001000000003b9aca00040135e7a177b434ee0799be6dcffc945a1d892f2e0fdfc5975ba0f80d3bdbab9c84010000000002f9c1ec0017a914c9cbab5b0f3430e824b1961bf8e876be43d3fee0870135e7a177b434ee0799be6dcffc945a1d892f2e0fdfc5975ba0f80d3bdbab9c8401000000000000e07400000107ec1ec7027d89071814d5ccd1f5ea4cee45e598287fc8f59acbb1d9129081dc0100000002540be400001976a914144f003aa8dd6408ba0e8ee91757cf1f1976315c88ac01aaf1579c847497d406605b4ef875a2b37164f4c5b9e5d2a23b2b2a16e132ec0501000000003b9aca00001976a914ae8cab151547d6f6e25b62b41200368dfdabe62b88ac0000000000000247304402207ab059e55e3e4337e88e1a6db00b7549110065eb5770880b1081dcdcdcf1c9a402207a3a0bc7d0d40661f54eff63c67838260a489984138d24eeee04b689f393bf2e012103753cff6c6123d25d99a3d02dc050a2c6b3ea40bcc04029c4330a4d30cb539077000000000000000000";

const EMPTY_TX_HEX: &str = "0200000000000000000000";

#[test]
fn test_degenerate_serialization() {
    let tx = ConfidentialTransaction::new(2, 0);
    let bytes = tx.serialize().unwrap();
    assert_eq!(bytes.len(), 11);
    assert_eq!(hex::encode(&bytes), EMPTY_TX_HEX);

    let parsed = ConfidentialTransaction::from_hex(EMPTY_TX_HEX).unwrap();
    assert_eq!(parsed.version, 2);
    assert_eq!(parsed.lock_time, 0);
    assert!(parsed.input.is_empty());
    assert!(parsed.output.is_empty());
    assert_eq!(parsed, tx);
}

#[test]
fn test_simple_transaction_roundtrip() {
    let tx = ConfidentialTransaction::from_hex(TX_SIMPLE_HEX).unwrap();
    assert_eq!(tx.version, 2);
    assert_eq!(tx.lock_time, 0);
    assert_eq!(tx.input_count(), 1);
    assert_eq!(tx.output_count(), 2);

    let txin = tx.txin(0).unwrap();
    assert_eq!(
        txin.previous_output.txid.to_hex(),
        "56eb4a177459bae6d310cd117dde5ff86e0a6572d44dcf5e25e611435fff9b31"
    );
    assert_eq!(txin.previous_output.vout, 1);
    assert!(!txin.has_issuance());

    let txout = tx.txout(0).unwrap();
    assert_eq!(
        txout.asset.to_hex(),
        "6f1a4b6bd5571b5f08ab79c314dc6483f9b952faf25ef206cd6f8e68eb1186f3"
    );
    assert!(txout.nonce.has_blinding());
    assert_eq!(txout.value.to_explicit(), 13_000_000_000_000);

    let fee = tx.txout(1).unwrap();
    assert!(fee.is_fee());
    assert_eq!(fee.value.to_explicit(), 5_000_000);

    // No blinded values anywhere, so the round trip is byte exact.
    assert_eq!(tx.to_hex().unwrap(), TX_SIMPLE_HEX);
}

#[test]
fn test_witness_transaction_roundtrip() {
    let tx = ConfidentialTransaction::from_hex(TX_WITNESS_HEX).unwrap();
    assert!(tx.has_witness());
    assert_eq!(tx.txin(0).unwrap().script_witness.len(), 2);
    assert_eq!(tx.to_hex().unwrap(), TX_WITNESS_HEX);

    // The txid form drops the witness section and clears the flag byte.
    let stripped = tx.serialize_no_witness().unwrap();
    assert_eq!(stripped[4], 0);
    let txid = tx.txid().unwrap();
    let wtxid = tx.wtxid().unwrap();
    assert_ne!(txid, wtxid);
}

#[test]
fn test_set_asset_issuance_fixture() {
    let mut tx = ConfidentialTransaction::from_hex(TX_WITNESS_HEX).unwrap();
    let param = tx
        .set_asset_issuance(
            0,
            10_000_000_000,
            &Script::from_hex("76a914144f003aa8dd6408ba0e8ee91757cf1f1976315c88ac").unwrap(),
            ConfidentialNonce::Empty,
            1_000_000_000,
            &Script::from_hex("76a914ae8cab151547d6f6e25b62b41200368dfdabe62b88ac").unwrap(),
            ConfidentialNonce::Empty,
            false,
            &[0u8; 32],
        )
        .unwrap();

    assert_eq!(
        param.entropy.to_hex(),
        "0a002ed099bd2d52f4bb04d36ebc159c838f0557461d462127845b996e61cb70"
    );
    assert_eq!(tx.to_hex().unwrap(), TX_ISSUED_HEX);

    let txin = tx.txin(0).unwrap();
    assert!(txin.has_issuance());
    assert!(!txin.is_reissuance());
    assert_eq!(txin.issuance_amount.to_explicit(), 10_000_000_000);
    assert_eq!(txin.inflation_keys.to_explicit(), 1_000_000_000);

    // Issuing twice on the same input is rejected.
    let again = tx.set_asset_issuance(
        0,
        1,
        &Script::from_bytes(vec![0x51]),
        ConfidentialNonce::Empty,
        0,
        &Script::new(),
        ConfidentialNonce::Empty,
        false,
        &[0u8; 32],
    );
    assert!(matches!(again, Err(CtError::IllegalState(_))));
}

#[test]
fn test_issued_transaction_roundtrip() {
    let tx = ConfidentialTransaction::from_hex(TX_ISSUED_HEX).unwrap();
    assert_eq!(tx.output_count(), 4);
    assert!(tx.txin(0).unwrap().has_issuance());
    assert_eq!(tx.to_hex().unwrap(), TX_ISSUED_HEX);
}

#[test]
fn test_set_asset_issuance_rejects_zero_amounts() {
    let mut tx = ConfidentialTransaction::from_hex(TX_WITNESS_HEX).unwrap();
    let result = tx.set_asset_issuance(
        0,
        0,
        &Script::from_bytes(vec![0x51]),
        ConfidentialNonce::Empty,
        0,
        &Script::from_bytes(vec![0x51]),
        ConfidentialNonce::Empty,
        false,
        &[0u8; 32],
    );
    assert!(matches!(result, Err(CtError::InvalidArgument(_))));
}

#[test]
fn test_set_asset_reissuance() {
    let mut tx = ConfidentialTransaction::from_hex(TX_WITNESS_HEX).unwrap();
    let entropy = confidential_tx::primitives::confidential::BlindFactor::from_hex(
        "0a002ed099bd2d52f4bb04d36ebc159c838f0557461d462127845b996e61cb70",
    )
    .unwrap();
    let abf = confidential_tx::primitives::confidential::BlindFactor::new([0x21; 32]);

    let param = tx
        .set_asset_reissuance(
            0,
            300_000,
            &Script::from_bytes(vec![0x51]),
            ConfidentialNonce::Empty,
            &abf,
            &entropy,
        )
        .unwrap();

    assert_eq!(param.entropy, entropy);
    assert!(param.token.is_empty());
    let txin = tx.txin(0).unwrap();
    assert!(txin.is_reissuance());
    assert_eq!(&txin.blinding_nonce, abf.as_bytes());
    assert_eq!(&txin.asset_entropy, entropy.as_bytes());
    assert_eq!(txin.issuance_amount.to_explicit(), 300_000);
    assert!(txin.inflation_keys.is_empty());

    // The reissued output was appended with the derived asset.
    let txout = tx.txout(tx.output_count() - 1).unwrap();
    assert_eq!(txout.asset, param.asset);
    assert_eq!(txout.value.to_explicit(), 300_000);
}

#[test]
fn test_index_bounds() {
    let mut tx = ConfidentialTransaction::from_hex(TX_SIMPLE_HEX).unwrap();
    assert!(matches!(tx.txin(1), Err(CtError::OutOfRange(_))));
    assert!(matches!(tx.txout(2), Err(CtError::OutOfRange(_))));
    assert!(matches!(
        tx.set_unlocking_script(9, Script::new()),
        Err(CtError::OutOfRange(_))
    ));
    assert!(matches!(
        tx.set_output_value(7, 1),
        Err(CtError::OutOfRange(_))
    ));
    assert!(matches!(
        tx.add_script_witness(3, vec![1]),
        Err(CtError::OutOfRange(_))
    ));
}

#[test]
fn test_remove_output_shifts_indices() {
    let mut tx = ConfidentialTransaction::new(2, 0);
    let asset = ConfidentialAssetId::explicit([5u8; 32]);
    for satoshi in [100u64, 200, 300] {
        tx.add_output(
            satoshi,
            asset,
            Script::from_bytes(vec![0x51]),
            ConfidentialNonce::Empty,
        )
        .unwrap();
    }
    tx.remove_output(0).unwrap();
    assert_eq!(tx.output_count(), 2);
    assert_eq!(tx.txout(0).unwrap().value.to_explicit(), 200);
    assert_eq!(tx.txout(1).unwrap().value.to_explicit(), 300);
}

#[test]
fn test_pegin_witness_drives_marker_bit() {
    let mut tx = ConfidentialTransaction::new(2, 0);
    let txid =
        Txid::from_hex("56eb4a177459bae6d310cd117dde5ff86e0a6572d44dcf5e25e611435fff9b31").unwrap();
    tx.add_input(OutPoint::new(txid, 2), DEFAULT_SEQUENCE, Script::new());
    tx.add_output(
        1,
        ConfidentialAssetId::explicit([1u8; 32]),
        Script::from_bytes(vec![0x51]),
        ConfidentialNonce::Empty,
    )
    .unwrap();

    let plain = tx.serialize().unwrap();
    // index bytes start right after version(4) + flag(1) + count(1) + txid(32)
    assert_eq!(&plain[38..42], &[0x02, 0x00, 0x00, 0x00]);

    tx.add_pegin_witness(0, vec![0xaa, 0xbb]).unwrap();
    let pegged = tx.serialize().unwrap();
    assert_eq!(&pegged[38..42], &[0x02, 0x00, 0x00, 0x40]);
    // Witness flag flips on as well.
    assert_eq!(pegged[4], 1);

    let reparsed = ConfidentialTransaction::from_hex(&hex::encode(&pegged)).unwrap();
    assert_eq!(reparsed, tx);

    tx.remove_pegin_witness_all(0).unwrap();
    let cleared = tx.serialize().unwrap();
    assert_eq!(cleared, plain);
}

#[test]
fn test_lookup_helpers() {
    let tx = ConfidentialTransaction::from_hex(TX_SIMPLE_HEX).unwrap();
    let outpoint = OutPoint::new(
        Txid::from_hex("56eb4a177459bae6d310cd117dde5ff86e0a6572d44dcf5e25e611435fff9b31").unwrap(),
        1,
    );
    assert_eq!(tx.find_txin(&outpoint).unwrap(), 0);
    assert!(tx.find_txin(&OutPoint::new(outpoint.txid, 3)).is_err());

    let script =
        Script::from_hex("76a9146a98a3f2935718df72518c00768ec67c589e0b2888ac").unwrap();
    assert_eq!(tx.find_txout(&script).unwrap(), 0);
    assert!(tx.find_txout(&Script::from_bytes(vec![0x6a])).is_err());
}

#[test]
fn test_serde_json_roundtrip() {
    let tx = ConfidentialTransaction::from_hex(TX_ISSUED_HEX).unwrap();
    let json = serde_json::to_string(&tx).unwrap();
    let back: ConfidentialTransaction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tx);
}

#[test]
fn test_value_slot_roundtrip_in_container() {
    // A blinded value slot survives parse -> serialize untouched.
    let mut tx = ConfidentialTransaction::from_hex(TX_SIMPLE_HEX).unwrap();
    tx.set_output_commitment(
        0,
        ConfidentialAssetId::Blinded([0x0a; 33]),
        ConfidentialValue::Blinded([0x08; 33]),
        ConfidentialNonce::Blinded([0x02; 33]),
        vec![0x10; 67],
        vec![0x20; 120],
    )
    .unwrap();
    let hex_form = tx.to_hex().unwrap();
    let reparsed = ConfidentialTransaction::from_hex(&hex_form).unwrap();
    assert_eq!(reparsed, tx);
    assert_eq!(reparsed.to_hex().unwrap(), hex_form);
}
