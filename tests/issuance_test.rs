use confidential_tx::issuance::{
    asset_entropy, asset_id, issuance_blinding_key, issuance_value, reissuance_token,
};
use confidential_tx::primitives::confidential::BlindFactor;
use confidential_tx::primitives::transaction::{OutPoint, Txid};

fn outpoint(txid_hex: &str, vout: u32) -> OutPoint {
    OutPoint::new(Txid::from_hex(txid_hex).unwrap(), vout)
}

#[test]
fn test_issuance_fixture() {
    let op = outpoint(
        "d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a",
        1,
    );
    let entropy = asset_entropy(&op, &[0u8; 32]);
    assert_eq!(
        entropy.to_hex(),
        "18dde72422dba6e922b41ae3c23243e64d361a6e18c49b75a0b02e627b1dae0c"
    );
    assert_eq!(
        asset_id(&entropy).to_hex(),
        "598ae0bb5298b89e257b64bcbb05e4f70a2def1c1c74d929ef753021e0559e07"
    );
}

#[test]
fn test_issuance_fixture_second_outpoint() {
    let op = outpoint(
        "c678107274b4d235d0e587194914b72b37b6ccd268cffad3a40194db65a33d7f",
        1,
    );
    let entropy = asset_entropy(&op, &[0u8; 32]);
    assert_eq!(
        entropy.to_hex(),
        "0a002ed099bd2d52f4bb04d36ebc159c838f0557461d462127845b996e61cb70"
    );
}

#[test]
fn test_issuance_value_fresh_vs_reissue() {
    let op = outpoint(
        "d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a",
        1,
    );

    let fresh = issuance_value(&op, false, &[0u8; 32], &[0u8; 32]);
    assert_eq!(fresh.entropy, asset_entropy(&op, &[0u8; 32]));
    assert_eq!(fresh.asset, asset_id(&fresh.entropy));
    assert_eq!(fresh.token, reissuance_token(&fresh.entropy, false));
    assert!(!fresh.token.is_empty());

    // Reissuance: the recorded entropy comes back verbatim, no token.
    let mut marker = [0u8; 32];
    marker[0] = 1;
    let reissue = issuance_value(&op, false, fresh.entropy.as_bytes(), &marker);
    assert_eq!(reissue.entropy, fresh.entropy);
    assert_eq!(reissue.asset, fresh.asset);
    assert!(reissue.token.is_empty());
}

#[test]
fn test_token_derivation_depends_on_blinding_domain() {
    let op = outpoint(
        "d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a",
        0,
    );
    let entropy = asset_entropy(&op, &[0u8; 32]);
    let token_clear = reissuance_token(&entropy, false);
    let token_blind = reissuance_token(&entropy, true);
    assert_ne!(token_clear, token_blind);
    assert_ne!(token_clear, asset_id(&entropy));
}

#[test]
fn test_entropy_commits_to_contract_hash_and_outpoint() {
    let op_a = outpoint(
        "d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a",
        0,
    );
    let op_b = outpoint(
        "d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a",
        1,
    );
    assert_ne!(asset_entropy(&op_a, &[0u8; 32]), asset_entropy(&op_b, &[0u8; 32]));
    assert_ne!(
        asset_entropy(&op_a, &[0u8; 32]),
        asset_entropy(&op_a, &[1u8; 32])
    );
}

#[test]
fn test_issuance_blinding_key_derivation() {
    let master = [0x42u8; 32];
    let op = outpoint(
        "d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a",
        1,
    );
    let key = issuance_blinding_key(&master, &op).unwrap();
    assert_eq!(key, issuance_blinding_key(&master, &op).unwrap());
    assert_ne!(key, issuance_blinding_key(&[0x43u8; 32], &op).unwrap());

    let vault = BlindFactor::new(key);
    assert!(!vault.is_zero());
}
