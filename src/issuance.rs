//! Asset issuance and reissuance derivation.
//!
//! Entropy binds an issuance to the outpoint it spends plus an optional
//! contract hash; the asset id and the reissuance token are then derived from
//! the entropy with domain-separated merkle-midstate hashing.

use crate::primitives::confidential::{BlindFactor, ConfidentialAssetId};
use crate::primitives::hash::{fast_merkle_root, sha256d};
use crate::primitives::transaction::OutPoint;
use crate::{CtError, Result};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// The derived identity of an issuance: entropy, asset id and (for fresh
/// issuances) the reissuance token.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssuanceParameter {
    pub entropy: BlindFactor,
    pub asset: ConfidentialAssetId,
    pub token: ConfidentialAssetId,
}

/// Derives the issuance entropy from the spent outpoint and the contract
/// hash.
pub fn asset_entropy(outpoint: &OutPoint, contract_hash: &[u8; 32]) -> BlindFactor {
    let mut buf = Vec::with_capacity(36);
    buf.extend_from_slice(outpoint.txid.as_bytes());
    buf.extend_from_slice(&outpoint.vout.to_le_bytes());
    let outpoint_hash = sha256d(&buf);
    BlindFactor::new(fast_merkle_root(&[outpoint_hash, *contract_hash]))
}

/// Derives the issued asset id from the entropy.
pub fn asset_id(entropy: &BlindFactor) -> ConfidentialAssetId {
    ConfidentialAssetId::explicit(fast_merkle_root(&[*entropy.as_bytes(), [0u8; 32]]))
}

/// Derives the reissuance token id from the entropy. The derivation domain
/// differs depending on whether the original issuance amount was blinded.
pub fn reissuance_token(entropy: &BlindFactor, is_blinded: bool) -> ConfidentialAssetId {
    let mut leaf = [0u8; 32];
    leaf[0] = if is_blinded { 2 } else { 1 };
    ConfidentialAssetId::explicit(fast_merkle_root(&[*entropy.as_bytes(), leaf]))
}

/// Computes the full issuance identity for one input.
///
/// A non-zero `existing_entropy` marks a reissuance: the entropy is taken
/// verbatim from `contract_hash` (which then holds the original issuance
/// entropy) and no token is derived, since only the asset is reissued.
pub fn issuance_value(
    outpoint: &OutPoint,
    is_blinded: bool,
    contract_hash: &[u8; 32],
    existing_entropy: &[u8; 32],
) -> IssuanceParameter {
    if existing_entropy != &[0u8; 32] {
        let entropy = BlindFactor::new(*contract_hash);
        return IssuanceParameter {
            entropy,
            asset: asset_id(&entropy),
            token: ConfidentialAssetId::Empty,
        };
    }

    let entropy = asset_entropy(outpoint, contract_hash);
    IssuanceParameter {
        entropy,
        asset: asset_id(&entropy),
        token: reissuance_token(&entropy, is_blinded),
    }
}

// OP_RETURN <txid> <vout>, the domain the issuance blinding key is bound to.
fn issuance_key_script(outpoint: &OutPoint) -> Vec<u8> {
    let mut script = Vec::with_capacity(40);
    script.push(0x6a);
    script.push(32);
    script.extend_from_slice(outpoint.txid.as_bytes());
    push_script_num(&mut script, outpoint.vout as u64);
    script
}

// Minimal script-number data push (vout is never negative).
fn push_script_num(script: &mut Vec<u8>, value: u64) {
    if value == 0 {
        script.push(0x00);
        return;
    }
    let mut bytes = Vec::new();
    let mut rest = value;
    while rest > 0 {
        bytes.push((rest & 0xff) as u8);
        rest >>= 8;
    }
    // A set top bit would read as a sign; pad with a zero byte.
    if bytes.last().copied().unwrap_or(0) & 0x80 != 0 {
        bytes.push(0x00);
    }
    script.push(bytes.len() as u8);
    script.extend_from_slice(&bytes);
}

/// Derives the per-issuance blinding key from a master blinding key and the
/// issuance outpoint.
pub fn issuance_blinding_key(master_key: &[u8; 32], outpoint: &OutPoint) -> Result<[u8; 32]> {
    let mut mac = Hmac::<Sha256>::new_from_slice(master_key)
        .map_err(|e| CtError::internal(format!("HMAC key setup failed: {}", e)))?;
    mac.update(&issuance_key_script(outpoint));
    Ok(mac.finalize().into_bytes().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::transaction::Txid;

    fn fixture_outpoint() -> OutPoint {
        OutPoint::new(
            Txid::from_hex("d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a")
                .unwrap(),
            1,
        )
    }

    #[test]
    fn test_entropy_and_asset_fixture() {
        let entropy = asset_entropy(&fixture_outpoint(), &[0u8; 32]);
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
    fn test_derivations_are_pure() {
        let outpoint = fixture_outpoint();
        let entropy = asset_entropy(&outpoint, &[0u8; 32]);
        assert_eq!(entropy, asset_entropy(&outpoint, &[0u8; 32]));
        assert_eq!(asset_id(&entropy), asset_id(&entropy));
        assert_eq!(
            reissuance_token(&entropy, true),
            reissuance_token(&entropy, true)
        );
        // The blinded and unblinded token domains are distinct.
        assert_ne!(
            reissuance_token(&entropy, true),
            reissuance_token(&entropy, false)
        );
    }

    #[test]
    fn test_reissuance_branch_copies_entropy() {
        let outpoint = fixture_outpoint();
        let original = asset_entropy(&outpoint, &[0u8; 32]);
        let mut existing = [0u8; 32];
        existing[5] = 0x77;

        let param = issuance_value(&outpoint, false, original.as_bytes(), &existing);
        assert_eq!(param.entropy, original);
        assert_eq!(param.asset, asset_id(&original));
        assert!(param.token.is_empty());
    }

    #[test]
    fn test_issuance_blinding_key_depends_on_outpoint() {
        let master = [0x11u8; 32];
        let key_a = issuance_blinding_key(&master, &fixture_outpoint()).unwrap();
        let other = OutPoint::new(fixture_outpoint().txid, 2);
        let key_b = issuance_blinding_key(&master, &other).unwrap();
        assert_ne!(key_a, key_b);
    }
}
