use confidential_tx::primitives::confidential::{
    BlindFactor, ConfidentialAssetId, ConfidentialNonce, ConfidentialValue,
};
use confidential_tx::primitives::encode::{Decodable, Encodable};
use confidential_tx::CtError;

#[test]
fn test_value_state_invariant() {
    let cases = [
        (ConfidentialValue::Empty, true, false),
        (ConfidentialValue::explicit(1), false, false),
        (ConfidentialValue::Blinded([0x08; 33]), false, true),
    ];
    for (value, is_empty, has_blinding) in cases {
        assert_eq!(value.is_empty(), is_empty);
        assert_eq!(value.has_blinding(), has_blinding);
        // Exactly one state holds.
        let explicit = !is_empty && !has_blinding;
        assert_eq!(
            [is_empty, explicit, has_blinding]
                .iter()
                .filter(|s| **s)
                .count(),
            1
        );
    }
}

#[test]
fn test_value_explicit_wire_form() {
    let value = ConfidentialValue::from_hex("0100000bd2cc1584c0").unwrap();
    assert_eq!(value.to_explicit(), 13_000_000_000_000);
    assert_eq!(value.to_hex(), "0100000bd2cc1584c0");

    // 8 raw bytes are accepted as a bare big-endian amount.
    let bare = ConfidentialValue::from_hex("00000bd2cc1584c0").unwrap();
    assert_eq!(bare, value);
}

#[test]
fn test_value_commitment_bytes_reparse() {
    for value in [
        ConfidentialValue::Empty,
        ConfidentialValue::explicit(0),
        ConfidentialValue::explicit(u64::MAX),
        ConfidentialValue::Blinded([0x09; 33]),
    ] {
        let bytes = value.commitment_bytes();
        assert_eq!(ConfidentialValue::from_bytes(&bytes).unwrap(), value);

        let decoded = ConfidentialValue::consensus_decode_from_slice(&bytes).unwrap();
        assert_eq!(decoded, value);
    }
}

#[test]
fn test_value_invalid_inputs() {
    assert!(matches!(
        ConfidentialValue::from_bytes(&[0x02; 9]),
        Err(CtError::InvalidArgument(_))
    ));
    assert!(matches!(
        ConfidentialValue::from_bytes(&[0x01; 12]),
        Err(CtError::InvalidArgument(_))
    ));
    assert!(matches!(
        ConfidentialValue::from_commitment(&[0x0a; 33]),
        Err(CtError::InvalidArgument(_))
    ));
}

#[test]
fn test_asset_explicit_display_order() {
    let display = "6f1a4b6bd5571b5f08ab79c314dc6483f9b952faf25ef206cd6f8e68eb1186f3";
    let asset = ConfidentialAssetId::from_hex(display).unwrap();
    // The wire form carries the internal (reversed) byte order.
    assert_eq!(
        hex::encode(asset.commitment_bytes()),
        "01f38611eb688e6fcd06f25e2faf52b9f98364dc14c379ab085f1b57d56b4b1a6f"
    );
    assert_eq!(asset.to_hex(), display);
}

#[test]
fn test_asset_blinded_roundtrip() {
    let mut commitment = [0u8; 33];
    commitment[0] = 0x0b;
    commitment[1] = 0x99;
    let asset = ConfidentialAssetId::from_commitment(&commitment).unwrap();
    assert!(asset.has_blinding());
    assert_eq!(asset.to_explicit(), [0u8; 32]);

    let encoded = asset.consensus_encode_to_vec().unwrap();
    assert_eq!(
        ConfidentialAssetId::consensus_decode_from_slice(&encoded).unwrap(),
        asset
    );
}

#[test]
fn test_nonce_states_and_reparse() {
    let nonce = ConfidentialNonce::from_commitment(&[0x03; 33]).unwrap();
    assert!(nonce.has_blinding());
    assert!(!nonce.is_empty());
    assert_eq!(
        ConfidentialNonce::from_bytes(&nonce.commitment_bytes()).unwrap(),
        nonce
    );

    let explicit = ConfidentialNonce::from_bytes(&[0x42; 32]).unwrap();
    assert!(!explicit.is_empty());
    assert!(!explicit.has_blinding());
    assert_eq!(explicit.to_explicit(), [0x42; 32]);

    assert!(ConfidentialNonce::from_bytes(&[0x07; 33]).is_err());
    assert!(ConfidentialNonce::from_bytes(&[0x01; 5]).is_err());
}

#[test]
fn test_blind_factor_zero_and_random() {
    assert!(BlindFactor::zero().is_zero());
    assert!(BlindFactor::zero().is_empty());

    let random = BlindFactor::random();
    assert!(!random.is_zero());
    assert_ne!(random, BlindFactor::random());

    let parsed = BlindFactor::from_hex(&random.to_hex()).unwrap();
    assert_eq!(parsed, random);
}

#[test]
fn test_serde_json_roundtrip() {
    let value = ConfidentialValue::Blinded([0x08; 33]);
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(
        serde_json::from_str::<ConfidentialValue>(&json).unwrap(),
        value
    );

    let asset = ConfidentialAssetId::explicit([0x77; 32]);
    let json = serde_json::to_string(&asset).unwrap();
    assert_eq!(
        serde_json::from_str::<ConfidentialAssetId>(&json).unwrap(),
        asset
    );
}
