//! Transaction blinding: turning explicit issuance and output values into a
//! balanced set of commitments plus proofs.
//!
//! The engine collects what it knows about the spent coins, blinds any
//! issuance amounts the caller supplied keys for, draws fresh blinding
//! factors for every output to blind, and solves the balancing equation for
//! the last output so that the Pedersen commitments sum to zero.

use crate::issuance::{self, IssuanceParameter};
use crate::primitives::confidential::{
    BlindFactor, ConfidentialAssetId, ConfidentialNonce, ConfidentialValue,
};
use crate::primitives::hash::sha256d;
use crate::transaction::ConfidentialTransaction;
use crate::{CtError, Result};
use secp256k1_zkp::rand::thread_rng;
use secp256k1_zkp::{
    compute_adaptive_blinding_factor, ecdh, verify_commitments_sum_to_equal, CommitmentSecrets,
    Generator, PedersenCommitment, PublicKey, RangeProof, Secp256k1, SecretKey, Signing,
    SurjectionProof, Tag, Tweak, ZERO_TWEAK,
};
use serde::{Deserialize, Serialize};

/// Surjection proof construction is probabilistic; bounded seed retries.
const SURJECTION_PROOF_ATTEMPTS: u32 = 20;

/// What one spent input's commitments open to. The caller must already know
/// these; cleartext coins use zero blinding factors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlindParameter {
    pub asset: ConfidentialAssetId,
    pub abf: BlindFactor,
    pub vbf: BlindFactor,
    pub value: ConfidentialValue,
}

impl BlindParameter {
    pub fn new(
        asset: ConfidentialAssetId,
        abf: BlindFactor,
        vbf: BlindFactor,
        value: ConfidentialValue,
    ) -> Self {
        BlindParameter {
            asset,
            abf,
            vbf,
            value,
        }
    }

    /// A cleartext (unblinded) coin.
    pub fn explicit(asset: ConfidentialAssetId, satoshi: u64) -> Self {
        BlindParameter {
            asset,
            abf: BlindFactor::zero(),
            vbf: BlindFactor::zero(),
            value: ConfidentialValue::explicit(satoshi),
        }
    }
}

/// Optional per-input keys enabling issuance blinding.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuanceBlindingKeyPair {
    pub asset_key: Option<SecretKey>,
    pub token_key: Option<SecretKey>,
}

/// Range proof tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct RangeProofOptions {
    /// Smallest provable value for spendable outputs; unspendable scripts
    /// always prove from zero.
    pub minimum_range_value: u64,
    pub exponent: i32,
    pub minimum_bits: u8,
}

impl Default for RangeProofOptions {
    fn default() -> Self {
        RangeProofOptions {
            minimum_range_value: 1,
            exponent: 0,
            minimum_bits: 52,
        }
    }
}

/// Asset generator for an explicit asset id and asset blinding factor.
pub fn asset_generator<C: Signing>(
    secp: &Secp256k1<C>,
    asset: &ConfidentialAssetId,
    abf: &BlindFactor,
) -> Result<Generator> {
    let ConfidentialAssetId::Explicit(tag) = *asset else {
        return Err(CtError::invalid_argument(
            "asset generator requires an explicit asset id".to_string(),
        ));
    };
    let tweak = Tweak::from_slice(abf.as_bytes())?;
    Ok(Generator::new_blinded(secp, Tag::from(tag), tweak))
}

/// Pedersen commitment to `satoshi` under `generator` with blinding `vbf`.
pub fn value_commitment<C: Signing>(
    secp: &Secp256k1<C>,
    satoshi: u64,
    generator: Generator,
    vbf: &BlindFactor,
) -> Result<PedersenCommitment> {
    let tweak = Tweak::from_slice(vbf.as_bytes())?;
    Ok(PedersenCommitment::new(secp, satoshi, tweak, generator))
}

// ECDH shared secret between a published nonce key and a blinding key:
// double-SHA256 of the compressed shared point.
pub(crate) fn ecdh_shared_secret(pk: &PublicKey, sk: &SecretKey) -> Result<SecretKey> {
    let point = ecdh::shared_secret_point(pk, sk);
    let mut compressed = [0u8; 33];
    compressed[0] = if point[63] & 1 == 1 { 0x03 } else { 0x02 };
    compressed[1..].copy_from_slice(&point[..32]);
    Ok(SecretKey::from_slice(&sha256d(&compressed))?)
}

// The message recovered by the receiver from the range proof: asset id
// followed by the asset blinding factor.
fn rangeproof_message(asset_tag: &[u8; 32], abf: &Tweak) -> [u8; 64] {
    let mut message = [0u8; 64];
    message[..32].copy_from_slice(asset_tag);
    message[32..].copy_from_slice(abf.as_ref());
    message
}

// One issuance slot to blind, resolved during the input scan.
struct IssuanceJob {
    index: usize,
    param: IssuanceParameter,
    is_reissue: bool,
    asset_key: Option<SecretKey>,
    token_key: Option<SecretKey>,
}

impl ConfidentialTransaction {
    /// Blinds the transaction in place.
    ///
    /// `txin_params` opens every spent input (at least one per input),
    /// `issuance_keys` optionally enables issuance blinding per input, and
    /// `output_keys` holds each output's confidential (receiver) key; `None`
    /// or the fee output skips blinding for that slot.
    ///
    /// A failed call can leave earlier outputs already blinded; callers must
    /// discard the transaction on error.
    pub fn blind(
        &mut self,
        txin_params: &[BlindParameter],
        issuance_keys: &[IssuanceBlindingKeyPair],
        output_keys: &[Option<PublicKey>],
        options: &RangeProofOptions,
    ) -> Result<()> {
        if self.input.len() > txin_params.len() {
            log::warn!(
                "blind parameter shortfall: {} inputs, {} parameters",
                self.input.len(),
                txin_params.len()
            );
            return Err(CtError::invalid_argument(format!(
                "expected a blind parameter for each of the {} inputs, got {}",
                self.input.len(),
                txin_params.len()
            )));
        }
        if self.output.len() > output_keys.len() {
            log::warn!(
                "confidential key shortfall: {} outputs, {} keys",
                self.output.len(),
                output_keys.len()
            );
            return Err(CtError::invalid_argument(format!(
                "expected a confidential key slot for each of the {} outputs, got {}",
                self.output.len(),
                output_keys.len()
            )));
        }

        let secp = Secp256k1::new();
        let mut rng = thread_rng();

        // Known input side of the balance: asset generators for the
        // surjection proof domain, plus (value, vbf, abf) openings for every
        // input that is itself a blinded coin.
        let mut domain: Vec<(Generator, Tag, Tweak)> = Vec::new();
        let mut input_secrets: Vec<CommitmentSecrets> = Vec::new();
        let mut blinded_txin_count = 0usize;
        let mut blind_target_count = 0usize;
        let mut issuance_jobs: Vec<IssuanceJob> = Vec::new();

        for (index, txin) in self.input.iter().enumerate() {
            let param = &txin_params[index];
            let ConfidentialAssetId::Explicit(asset_tag) = param.asset else {
                return Err(CtError::invalid_argument(format!(
                    "blind parameter {} requires an explicit asset id",
                    index
                )));
            };
            let tag = Tag::from(asset_tag);
            let abf = Tweak::from_slice(param.abf.as_bytes())?;
            domain.push((Generator::new_blinded(&secp, tag, abf), tag, abf));

            if !param.abf.is_zero() || !param.vbf.is_zero() {
                let vbf = Tweak::from_slice(param.vbf.as_bytes())?;
                input_secrets.push(CommitmentSecrets::new(param.value.to_explicit(), vbf, abf));
                blinded_txin_count += 1;
            }

            if !txin.has_issuance() {
                continue;
            }
            if txin.issuance_amount.has_blinding() || txin.inflation_keys.has_blinding() {
                log::warn!("issuance on vin[{}] is already blinded", index);
                return Err(CtError::illegal_state(format!(
                    "issuance on input {} is already blinded",
                    index
                )));
            }

            let keys = issuance_keys.get(index).copied().unwrap_or_default();
            let blind_token = keys.token_key.is_some();
            let issue = issuance::issuance_value(
                &txin.previous_output,
                blind_token,
                &txin.asset_entropy,
                &txin.blinding_nonce,
            );
            let is_reissue = txin.is_reissuance();

            // Issuance creates new supply; its asset (and token) generators
            // join the surjection domain with zero blinding factors.
            if !txin.issuance_amount.is_empty() {
                let tag = Tag::from(issue.asset.to_explicit());
                domain.push((Generator::new_blinded(&secp, tag, ZERO_TWEAK), tag, ZERO_TWEAK));
            }
            if !is_reissue && !txin.inflation_keys.is_empty() {
                let tag = Tag::from(issue.token.to_explicit());
                domain.push((Generator::new_blinded(&secp, tag, ZERO_TWEAK), tag, ZERO_TWEAK));
            }

            if keys.asset_key.is_some() {
                if !txin.issuance_amount_rangeproof.is_empty() {
                    return Err(CtError::illegal_state(format!(
                        "issuance amount on input {} is already blinded",
                        index
                    )));
                }
                blind_target_count += 1;
            }
            if blind_token && !is_reissue {
                if !txin.inflation_keys_rangeproof.is_empty() {
                    return Err(CtError::illegal_state(format!(
                        "inflation keys on input {} are already blinded",
                        index
                    )));
                }
                blind_target_count += 1;
            }
            if keys.asset_key.is_some() || blind_token {
                issuance_jobs.push(IssuanceJob {
                    index,
                    param: issue,
                    is_reissue,
                    asset_key: keys.asset_key,
                    token_key: keys.token_key,
                });
            }
        }

        // Blind issuance amounts. These behave like inputs of new value in
        // the balancing equation.
        for job in &issuance_jobs {
            if let Some(asset_key) = job.asset_key {
                let value = self.input[job.index].issuance_amount.to_explicit();
                let vbf = Tweak::new(&mut rng);
                input_secrets.push(CommitmentSecrets::new(value, vbf, ZERO_TWEAK));

                let (commitment, proof) =
                    blind_issuance_value(&secp, value, &job.param.asset, vbf, &asset_key, options)?;
                let txin = &mut self.input[job.index];
                txin.issuance_amount = ConfidentialValue::from_commitment(&commitment.serialize())?;
                txin.issuance_amount_rangeproof = proof.serialize();
            }
            if let Some(token_key) = job.token_key {
                if !job.is_reissue {
                    let value = self.input[job.index].inflation_keys.to_explicit();
                    let vbf = Tweak::new(&mut rng);
                    input_secrets.push(CommitmentSecrets::new(value, vbf, ZERO_TWEAK));

                    let (commitment, proof) = blind_issuance_value(
                        &secp,
                        value,
                        &job.param.token,
                        vbf,
                        &token_key,
                        options,
                    )?;
                    let txin = &mut self.input[job.index];
                    txin.inflation_keys =
                        ConfidentialValue::from_commitment(&commitment.serialize())?;
                    txin.inflation_keys_rangeproof = proof.serialize();
                }
            }
        }

        // Outputs to blind: non-fee, not yet blinded, with a receiver key.
        let mut blind_outputs: Vec<(usize, PublicKey)> = Vec::new();
        for (index, txout) in self.output.iter().enumerate() {
            if txout.script_pubkey.is_empty() {
                continue;
            }
            let Some(receiver) = output_keys[index] else {
                continue;
            };
            if txout.value.has_blinding() || txout.asset.has_blinding() {
                log::warn!("vout[{}] is already blinded", index);
                return Err(CtError::illegal_state(format!(
                    "output {} is already blinded",
                    index
                )));
            }
            if !matches!(txout.value, ConfidentialValue::Explicit(_)) {
                return Err(CtError::invalid_argument(format!(
                    "output {} requires an explicit value to blind",
                    index
                )));
            }
            if !matches!(txout.asset, ConfidentialAssetId::Explicit(_)) {
                return Err(CtError::invalid_argument(format!(
                    "output {} requires an explicit asset to blind",
                    index
                )));
            }
            blind_outputs.push((index, receiver));
        }
        blind_target_count += blind_outputs.len();

        if blinded_txin_count == 0 && blind_target_count <= 1 {
            log::warn!("too few blind targets: {}", blind_target_count);
            return Err(CtError::invalid_argument(format!(
                "blinding requires at least two blind targets, got {}",
                blind_target_count
            )));
        }
        log::debug!(
            "blinding {} outputs ({} targets, {} blinded inputs)",
            blind_outputs.len(),
            blind_target_count,
            blinded_txin_count
        );
        if blind_outputs.is_empty() {
            return Ok(());
        }

        // Fresh asset blinding factors for every output, fresh value
        // blinding factors for all but the last.
        let output_abfs: Vec<Tweak> = blind_outputs.iter().map(|_| Tweak::new(&mut rng)).collect();
        let mut output_vbfs: Vec<Tweak> = (1..blind_outputs.len())
            .map(|_| Tweak::new(&mut rng))
            .collect();

        let last = blind_outputs.len() - 1;
        let other_secrets: Vec<CommitmentSecrets> = blind_outputs[..last]
            .iter()
            .enumerate()
            .map(|(k, (txout_index, _))| {
                CommitmentSecrets::new(
                    self.output[*txout_index].value.to_explicit(),
                    output_vbfs[k],
                    output_abfs[k],
                )
            })
            .collect();

        // The unique vbf that zeroes the commitment sum.
        let final_vbf = compute_adaptive_blinding_factor(
            &secp,
            self.output[blind_outputs[last].0].value.to_explicit(),
            output_abfs[last],
            &input_secrets,
            &other_secrets,
        );
        output_vbfs.push(final_vbf);

        for (k, (txout_index, receiver)) in blind_outputs.iter().enumerate() {
            let txout = &self.output[*txout_index];
            let value = txout.value.to_explicit();
            let asset_tag = txout.asset.to_explicit();
            let tag = Tag::from(asset_tag);
            let abf = output_abfs[k];
            let vbf = output_vbfs[k];

            let generator = Generator::new_blinded(&secp, tag, abf);
            let commitment = PedersenCommitment::new(&secp, value, vbf, generator);

            let ephemeral_sk = SecretKey::new(&mut rng);
            let nonce_pub = PublicKey::from_secret_key(&secp, &ephemeral_sk);
            let shared_secret = ecdh_shared_secret(receiver, &ephemeral_sk)?;

            let min_value = if txout.script_pubkey.is_empty() || txout.script_pubkey.is_op_return()
            {
                0
            } else {
                options.minimum_range_value
            };
            let range_proof = RangeProof::new(
                &secp,
                min_value,
                commitment,
                value,
                vbf,
                &rangeproof_message(&asset_tag, &abf),
                txout.script_pubkey.as_bytes(),
                shared_secret,
                options.exponent,
                options.minimum_bits,
                generator,
            )?;

            let surjection_proof = make_surjection_proof(&secp, &mut rng, tag, abf, &domain)?;

            let txout = &mut self.output[*txout_index];
            txout.asset = ConfidentialAssetId::from_commitment(&generator.serialize())?;
            txout.value = ConfidentialValue::from_commitment(&commitment.serialize())?;
            txout.nonce = ConfidentialNonce::from_commitment(&nonce_pub.serialize())?;
            txout.surjection_proof = surjection_proof.serialize();
            txout.range_proof = range_proof.serialize();
        }
        Ok(())
    }

    /// Blinds outputs only; issuances stay untouched.
    pub fn blind_txout(
        &mut self,
        txin_params: &[BlindParameter],
        output_keys: &[Option<PublicKey>],
        options: &RangeProofOptions,
    ) -> Result<()> {
        self.blind(txin_params, &[], output_keys, options)
    }

    /// Verifies value conservation: the Pedersen commitments of the spent
    /// inputs plus issuances equal those of the outputs. Explicit slots enter
    /// the sums as unblinded commitments; zero-value explicit outputs carry
    /// no commitment and are skipped.
    pub fn verify_amount_commitments(&self, txin_params: &[BlindParameter]) -> Result<bool> {
        if self.input.len() != txin_params.len() {
            return Err(CtError::invalid_argument(format!(
                "expected {} blind parameters, got {}",
                self.input.len(),
                txin_params.len()
            )));
        }
        let secp = Secp256k1::new();
        let mut input_commitments: Vec<PedersenCommitment> = Vec::new();
        let mut output_commitments: Vec<PedersenCommitment> = Vec::new();

        for (index, txin) in self.input.iter().enumerate() {
            let param = &txin_params[index];
            let generator = asset_generator(&secp, &param.asset, &param.abf)?;
            if param.abf.is_zero() && param.vbf.is_zero() {
                input_commitments.push(PedersenCommitment::new_unblinded(
                    &secp,
                    param.value.to_explicit(),
                    generator,
                ));
            } else {
                input_commitments.push(value_commitment(
                    &secp,
                    param.value.to_explicit(),
                    generator,
                    &param.vbf,
                )?);
            }

            if !txin.has_issuance() {
                continue;
            }
            let issue = issuance::issuance_value(
                &txin.previous_output,
                txin.issuance_amount.has_blinding(),
                &txin.asset_entropy,
                &txin.blinding_nonce,
            );
            for (slot, asset) in [
                (&txin.issuance_amount, issue.asset),
                (&txin.inflation_keys, issue.token),
            ] {
                match slot {
                    ConfidentialValue::Empty => {}
                    ConfidentialValue::Explicit(satoshi) => {
                        let generator = asset_generator(&secp, &asset, &BlindFactor::zero())?;
                        input_commitments.push(PedersenCommitment::new_unblinded(
                            &secp, *satoshi, generator,
                        ));
                    }
                    ConfidentialValue::Blinded(bytes) => {
                        input_commitments.push(PedersenCommitment::from_slice(bytes)?);
                    }
                }
            }
        }

        for txout in &self.output {
            match (&txout.value, &txout.asset) {
                (ConfidentialValue::Blinded(bytes), _) => {
                    output_commitments.push(PedersenCommitment::from_slice(bytes)?);
                }
                (ConfidentialValue::Explicit(0), _) => {}
                (ConfidentialValue::Explicit(satoshi), asset) => {
                    let generator = asset_generator(&secp, asset, &BlindFactor::zero())?;
                    output_commitments.push(PedersenCommitment::new_unblinded(
                        &secp, *satoshi, generator,
                    ));
                }
                (ConfidentialValue::Empty, _) => {
                    return Err(CtError::illegal_state(
                        "output without a value cannot be verified".to_string(),
                    ));
                }
            }
        }

        Ok(verify_commitments_sum_to_equal(
            &secp,
            &input_commitments,
            &output_commitments,
        ))
    }
}

// Commitment and range proof for one issuance amount. Issuance commitments
// use a zero asset blinding factor and are keyed by the blinding key
// directly rather than an ECDH secret.
fn blind_issuance_value<C: Signing>(
    secp: &Secp256k1<C>,
    value: u64,
    asset: &ConfidentialAssetId,
    vbf: Tweak,
    key: &SecretKey,
    options: &RangeProofOptions,
) -> Result<(PedersenCommitment, RangeProof)> {
    let asset_tag = asset.to_explicit();
    let generator = Generator::new_blinded(secp, Tag::from(asset_tag), ZERO_TWEAK);
    let commitment = PedersenCommitment::new(secp, value, vbf, generator);
    let proof = RangeProof::new(
        secp,
        0,
        commitment,
        value,
        vbf,
        &rangeproof_message(&asset_tag, &ZERO_TWEAK),
        &[],
        *key,
        options.exponent,
        options.minimum_bits,
        generator,
    )?;
    Ok((commitment, proof))
}

fn make_surjection_proof<C: Signing, R: secp256k1_zkp::rand::Rng>(
    secp: &Secp256k1<C>,
    rng: &mut R,
    tag: Tag,
    abf: Tweak,
    domain: &[(Generator, Tag, Tweak)],
) -> Result<SurjectionProof> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match SurjectionProof::new(secp, rng, tag, abf, domain) {
            Ok(proof) => return Ok(proof),
            Err(e) if attempt < SURJECTION_PROOF_ATTEMPTS => {
                log::debug!("surjection proof attempt {} failed: {}", attempt, e);
            }
            Err(e) => {
                log::warn!("surjection proof failed after {} attempts", attempt);
                return Err(CtError::illegal_state(format!(
                    "surjection proof construction failed after {} attempts: {}",
                    attempt, e
                )));
            }
        }
    }
}
