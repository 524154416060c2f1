//! Recovering explicit values from blinded outputs and issuances.

use crate::blind::ecdh_shared_secret;
use crate::issuance;
use crate::primitives::confidential::{
    BlindFactor, ConfidentialAssetId, ConfidentialNonce, ConfidentialValue,
};
use crate::transaction::ConfidentialTransaction;
use crate::{CtError, Result};
use secp256k1_zkp::{
    Generator, PedersenCommitment, PublicKey, RangeProof, Secp256k1, SecretKey, Tag, Verification,
    ZERO_TWEAK,
};
use serde::{Deserialize, Serialize};

/// What a blinded slot opened to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnblindParameter {
    pub asset: ConfidentialAssetId,
    pub abf: BlindFactor,
    pub vbf: BlindFactor,
    pub value: ConfidentialValue,
}

// Rewinds a range proof and unpacks the recovered opening: the message holds
// the asset id and asset blinding factor, the opening itself the value and
// value blinding factor.
fn rewind_rangeproof<C: Verification>(
    secp: &Secp256k1<C>,
    proof_bytes: &[u8],
    value: &ConfidentialValue,
    generator: Generator,
    nonce: SecretKey,
    extra_script: &[u8],
) -> Result<UnblindParameter> {
    let commitment = PedersenCommitment::from_slice(&value.commitment_bytes())?;
    let proof = RangeProof::from_slice(proof_bytes)?;
    let (opening, _) = proof.rewind(secp, commitment, nonce, extra_script, generator)?;

    let message_bytes: &[u8] = &opening.message;
    if message_bytes.len() < 64 {
        return Err(CtError::illegal_state(
            "rewound range proof message is too short".to_string(),
        ));
    }
    let mut asset_tag = [0u8; 32];
    asset_tag.copy_from_slice(&message_bytes[..32]);
    let abf = BlindFactor::from_bytes(&message_bytes[32..64])?;

    let mut vbf_bytes = [0u8; 32];
    vbf_bytes.copy_from_slice(opening.blinding_factor.as_ref());

    Ok(UnblindParameter {
        asset: ConfidentialAssetId::explicit(asset_tag),
        abf,
        vbf: BlindFactor::new(vbf_bytes),
        value: ConfidentialValue::explicit(opening.value),
    })
}

impl ConfidentialTransaction {
    /// Unblinds the output at `index` with the receiver's blinding key and
    /// writes the explicit asset/value back, clearing the nonce and both
    /// proofs.
    pub fn unblind_output(&mut self, index: u32, blinding_key: &SecretKey) -> Result<UnblindParameter> {
        let vout_index = self.check_txout_index(index)?;
        let txout = &self.output[vout_index];
        if !txout.asset.has_blinding()
            || !txout.nonce.has_blinding()
            || !txout.value.has_blinding()
            || txout.range_proof.is_empty()
            || txout.surjection_proof.is_empty()
        {
            log::warn!("vout[{}] is not fully blinded", index);
            return Err(CtError::illegal_state(format!(
                "output {} is already unblinded",
                index
            )));
        }

        let secp = Secp256k1::new();
        let nonce_key = PublicKey::from_slice(&txout.nonce.commitment_bytes())?;
        let shared_secret = ecdh_shared_secret(&nonce_key, blinding_key)?;
        let generator = Generator::from_slice(&txout.asset.commitment_bytes())?;
        let result = rewind_rangeproof(
            &secp,
            &txout.range_proof,
            &txout.value,
            generator,
            shared_secret,
            txout.script_pubkey.as_bytes(),
        )?;

        self.set_output_commitment(
            index,
            result.asset,
            result.value,
            ConfidentialNonce::Empty,
            Vec::new(),
            Vec::new(),
        )?;
        Ok(result)
    }

    /// Unblinds the issuance commitments of one input. Issuance range proofs
    /// are keyed by the blinding key directly (no ECDH); the token key falls
    /// back to the asset key. Returns the amount and inflation-keys openings,
    /// empty where the slot was not blinded.
    pub fn unblind_input_issuance(
        &mut self,
        index: u32,
        asset_key: &SecretKey,
        token_key: Option<&SecretKey>,
    ) -> Result<[UnblindParameter; 2]> {
        let vin_index = self.check_txin_index(index)?;
        let txin = &self.input[vin_index];
        let amount_blinded = txin.issuance_amount.has_blinding();
        let token_blinded = txin.inflation_keys.has_blinding();
        if (!amount_blinded && !token_blinded)
            || (txin.issuance_amount_rangeproof.is_empty()
                && txin.inflation_keys_rangeproof.is_empty())
        {
            log::warn!("issuance on vin[{}] is not blinded", index);
            return Err(CtError::illegal_state(format!(
                "issuance on input {} is already unblinded",
                index
            )));
        }

        let issue = issuance::issuance_value(
            &txin.previous_output,
            true,
            &txin.asset_entropy,
            &txin.blinding_nonce,
        );
        let secp = Secp256k1::new();

        let mut amount_unblind = UnblindParameter::default();
        let mut token_unblind = UnblindParameter::default();
        let mut issuance_amount = txin.issuance_amount;
        let mut inflation_keys = txin.inflation_keys;
        let mut amount_rangeproof = txin.issuance_amount_rangeproof.clone();
        let mut token_rangeproof = txin.inflation_keys_rangeproof.clone();

        if amount_blinded {
            let generator =
                Generator::new_blinded(&secp, Tag::from(issue.asset.to_explicit()), ZERO_TWEAK);
            amount_unblind = rewind_rangeproof(
                &secp,
                &amount_rangeproof,
                &issuance_amount,
                generator,
                *asset_key,
                &[],
            )?;
            issuance_amount = amount_unblind.value;
            amount_rangeproof.clear();
        }

        if token_blinded && !token_rangeproof.is_empty() {
            let key = token_key.copied().unwrap_or(*asset_key);
            let generator =
                Generator::new_blinded(&secp, Tag::from(issue.token.to_explicit()), ZERO_TWEAK);
            token_unblind = rewind_rangeproof(
                &secp,
                &token_rangeproof,
                &inflation_keys,
                generator,
                key,
                &[],
            )?;
            inflation_keys = token_unblind.value;
            token_rangeproof.clear();
        }

        let txin = &mut self.input[vin_index];
        txin.issuance_amount = issuance_amount;
        txin.inflation_keys = inflation_keys;
        txin.issuance_amount_rangeproof = amount_rangeproof;
        txin.inflation_keys_rangeproof = token_rangeproof;

        Ok([amount_unblind, token_unblind])
    }

    /// Unblinds every non-fee output whose key slot holds a key, in index
    /// order. The key list must cover every output.
    pub fn unblind_all_outputs(
        &mut self,
        blinding_keys: &[Option<SecretKey>],
    ) -> Result<Vec<UnblindParameter>> {
        if blinding_keys.len() != self.output.len() {
            log::warn!(
                "blinding key count {} != output count {}",
                blinding_keys.len(),
                self.output.len()
            );
            return Err(CtError::invalid_argument(format!(
                "blinding key count {} does not match output count {}",
                blinding_keys.len(),
                self.output.len()
            )));
        }

        let mut results = Vec::new();
        for index in 0..self.output.len() {
            if self.output[index].script_pubkey.is_empty() {
                continue;
            }
            let Some(key) = blinding_keys[index] else {
                continue;
            };
            results.push(self.unblind_output(index as u32, &key)?);
        }
        Ok(results)
    }
}
