//! Signature hash computation for confidential transactions.
//!
//! The legacy path hashes the signature-serializer form of the transaction
//! (scripts blanked except the script code on the signed input); the segwit
//! path hashes the BIP143-style preimage extended with the issuance hash and
//! confidential amounts.

use crate::primitives::confidential::ConfidentialValue;
use crate::primitives::encode::{write_varint, Encodable};
use crate::primitives::hash::sha256d;
use crate::transaction::{ConfidentialTransaction, ConfidentialTxOut};
use crate::{CtError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigHashFlag {
    All,
    None,
    Single,
}

/// A sighash mode: the base flag plus the ANYONECANPAY modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigHashType {
    pub flag: SigHashFlag,
    pub anyone_can_pay: bool,
}

impl SigHashType {
    pub const ALL: SigHashType = SigHashType {
        flag: SigHashFlag::All,
        anyone_can_pay: false,
    };

    pub fn new(flag: SigHashFlag, anyone_can_pay: bool) -> Self {
        SigHashType {
            flag,
            anyone_can_pay,
        }
    }

    pub fn as_u32(&self) -> u32 {
        let base = match self.flag {
            SigHashFlag::All => 0x01,
            SigHashFlag::None => 0x02,
            SigHashFlag::Single => 0x03,
        };
        if self.anyone_can_pay {
            base | 0x80
        } else {
            base
        }
    }
}

/// Witness version of the script being satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessVersion {
    /// Pre-segwit scripts.
    None,
    /// Segwit v0 scripts.
    V0,
}

fn serialize_output(txout: &ConfidentialTxOut) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    txout.asset.consensus_encode(&mut buf)?;
    txout.value.consensus_encode(&mut buf)?;
    txout.nonce.consensus_encode(&mut buf)?;
    txout.script_pubkey.consensus_encode(&mut buf)?;
    Ok(buf)
}

impl ConfidentialTransaction {
    /// Computes the signature hash for the input at `input_index`.
    ///
    /// `script_code` is the script being satisfied (never empty), `value` the
    /// amount of the spent output in its confidential form (required on the
    /// segwit path).
    pub fn signature_hash(
        &self,
        input_index: u32,
        script_code: &[u8],
        sighash_type: SigHashType,
        value: &ConfidentialValue,
        witness_version: WitnessVersion,
    ) -> Result<[u8; 32]> {
        if script_code.is_empty() {
            return Err(CtError::invalid_argument(
                "signature hash requires a non-empty script".to_string(),
            ));
        }
        let index = self.check_txin_index(input_index)?;
        match witness_version {
            WitnessVersion::None => self.legacy_signature_hash(index, script_code, sighash_type),
            WitnessVersion::V0 => {
                self.segwit_signature_hash(index, script_code, sighash_type, value)
            }
        }
    }

    // Pre-segwit digest over the signature-serializer form: version, the
    // input list with scripts blanked except the script code on the signed
    // input (plus any issuance block), the output list reduced per the
    // sighash mode, locktime, and the sighash word. Outpoint indexes carry
    // no marker bits and there is no witness flag byte in this form.
    fn legacy_signature_hash(
        &self,
        index: usize,
        script_code: &[u8],
        sighash_type: SigHashType,
    ) -> Result<[u8; 32]> {
        if sighash_type.flag == SigHashFlag::Single && index >= self.output.len() {
            return Err(CtError::invalid_argument(format!(
                "SIGHASH_SINGLE input {} has no matching output",
                index
            )));
        }

        let mut preimage = Vec::new();
        preimage.extend_from_slice(&self.version.to_le_bytes());

        let signed_inputs: Vec<usize> = if sighash_type.anyone_can_pay {
            vec![index]
        } else {
            (0..self.input.len()).collect()
        };
        write_varint(&mut preimage, signed_inputs.len() as u64)?;
        for &i in &signed_inputs {
            let txin = &self.input[i];
            preimage.extend_from_slice(txin.previous_output.txid.as_bytes());
            preimage.extend_from_slice(&txin.previous_output.vout.to_le_bytes());
            if i == index {
                write_varint(&mut preimage, script_code.len() as u64)?;
                preimage.extend_from_slice(script_code);
            } else {
                preimage.push(0x00);
            }
            let sequence = if i != index && sighash_type.flag != SigHashFlag::All {
                0
            } else {
                txin.sequence
            };
            preimage.extend_from_slice(&sequence.to_le_bytes());
            if txin.has_issuance() {
                preimage.extend_from_slice(&txin.blinding_nonce);
                preimage.extend_from_slice(&txin.asset_entropy);
                preimage.extend_from_slice(&txin.issuance_amount.commitment_bytes());
                preimage.extend_from_slice(&txin.inflation_keys.commitment_bytes());
            }
        }

        match sighash_type.flag {
            SigHashFlag::All => {
                write_varint(&mut preimage, self.output.len() as u64)?;
                for txout in &self.output {
                    preimage.extend_from_slice(&serialize_output(txout)?);
                }
            }
            SigHashFlag::None => {
                write_varint(&mut preimage, 0)?;
            }
            SigHashFlag::Single => {
                write_varint(&mut preimage, (index + 1) as u64)?;
                let null_output = serialize_output(&ConfidentialTxOut::default())?;
                for _ in 0..index {
                    preimage.extend_from_slice(&null_output);
                }
                preimage.extend_from_slice(&serialize_output(&self.output[index])?);
            }
        }

        preimage.extend_from_slice(&self.lock_time.to_le_bytes());
        preimage.extend_from_slice(&sighash_type.as_u32().to_le_bytes());
        Ok(sha256d(&preimage))
    }

    // Segwit v0 digest with the issuance hash between the sequence hash and
    // the outpoint, and confidential amounts in place of satoshi fields.
    fn segwit_signature_hash(
        &self,
        index: usize,
        script_code: &[u8],
        sighash_type: SigHashType,
        value: &ConfidentialValue,
    ) -> Result<[u8; 32]> {
        if value.is_empty() {
            return Err(CtError::invalid_argument(
                "segwit signature hash requires the spent output value".to_string(),
            ));
        }
        let zero = [0u8; 32];
        let txin = &self.input[index];

        let hash_prevouts = if sighash_type.anyone_can_pay {
            zero
        } else {
            let mut buf = Vec::new();
            for txin in &self.input {
                buf.extend_from_slice(txin.previous_output.txid.as_bytes());
                buf.extend_from_slice(&txin.previous_output.vout.to_le_bytes());
            }
            sha256d(&buf)
        };

        let hash_sequence = if sighash_type.anyone_can_pay || sighash_type.flag != SigHashFlag::All
        {
            zero
        } else {
            let mut buf = Vec::new();
            for txin in &self.input {
                buf.extend_from_slice(&txin.sequence.to_le_bytes());
            }
            sha256d(&buf)
        };

        let hash_issuance = if sighash_type.anyone_can_pay {
            zero
        } else {
            let mut buf = Vec::new();
            for txin in &self.input {
                if txin.has_issuance() {
                    buf.extend_from_slice(&txin.blinding_nonce);
                    buf.extend_from_slice(&txin.asset_entropy);
                    buf.extend_from_slice(&txin.issuance_amount.commitment_bytes());
                    buf.extend_from_slice(&txin.inflation_keys.commitment_bytes());
                } else {
                    buf.push(0x00);
                }
            }
            sha256d(&buf)
        };

        let hash_outputs = match sighash_type.flag {
            SigHashFlag::All => {
                let mut buf = Vec::new();
                for txout in &self.output {
                    buf.extend_from_slice(&serialize_output(txout)?);
                }
                sha256d(&buf)
            }
            SigHashFlag::Single if index < self.output.len() => {
                sha256d(&serialize_output(&self.output[index])?)
            }
            _ => zero,
        };

        let mut preimage = Vec::new();
        preimage.extend_from_slice(&self.version.to_le_bytes());
        preimage.extend_from_slice(&hash_prevouts);
        preimage.extend_from_slice(&hash_sequence);
        preimage.extend_from_slice(&hash_issuance);
        preimage.extend_from_slice(txin.previous_output.txid.as_bytes());
        preimage.extend_from_slice(&txin.previous_output.vout.to_le_bytes());
        write_varint(&mut preimage, script_code.len() as u64)?;
        preimage.extend_from_slice(script_code);
        preimage.extend_from_slice(&value.commitment_bytes());
        preimage.extend_from_slice(&txin.sequence.to_le_bytes());
        if txin.has_issuance() {
            preimage.extend_from_slice(&txin.blinding_nonce);
            preimage.extend_from_slice(&txin.asset_entropy);
            preimage.extend_from_slice(&txin.issuance_amount.commitment_bytes());
            preimage.extend_from_slice(&txin.inflation_keys.commitment_bytes());
        }
        preimage.extend_from_slice(&hash_outputs);
        preimage.extend_from_slice(&self.lock_time.to_le_bytes());
        preimage.extend_from_slice(&sighash_type.as_u32().to_le_bytes());
        Ok(sha256d(&preimage))
    }
}
