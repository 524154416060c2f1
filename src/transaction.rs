//! Confidential transaction container and its wire format.
//!
//! The serializer runs a single code path for every transaction, including
//! the zero-input/zero-output case: version, a one-byte witness flag, the
//! input and output lists, locktime, and (flag permitting) the witness
//! section. Issuance and pegin markers on the serialized outpoint index are
//! derived from the current field state at encoding time and never stored.

use crate::issuance::{self, IssuanceParameter};
use crate::primitives::confidential::{
    BlindFactor, ConfidentialAssetId, ConfidentialNonce, ConfidentialValue,
};
use crate::primitives::encode::{read_varint, write_varint, Decodable, Encodable};
use crate::primitives::hash::sha256d;
use crate::primitives::script::Script;
use crate::primitives::transaction::{OutPoint, Txid, Witness};
use crate::{CtError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Marker bit on the serialized outpoint index: the input carries issuance data.
const OUTPOINT_ISSUANCE_FLAG: u32 = 0x8000_0000;
/// Marker bit on the serialized outpoint index: the input is a pegin claim.
const OUTPOINT_PEGIN_FLAG: u32 = 0x4000_0000;
/// Mask recovering the plain output index from a serialized outpoint index.
const OUTPOINT_INDEX_MASK: u32 = 0x3fff_ffff;
/// Outpoint index of a coinbase input; serialized raw, without marker bits.
const COINBASE_INDEX: u32 = 0xffff_ffff;

/// Default transaction version.
pub const DEFAULT_VERSION: i32 = 2;
/// Default input sequence number.
pub const DEFAULT_SEQUENCE: u32 = 0xffff_ffff;

/// A confidential transaction input, including the issuance sub-record and
/// pegin witness.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfidentialTxIn {
    pub previous_output: OutPoint,
    pub sequence: u32,
    pub script_sig: Script,
    pub script_witness: Witness,
    /// Zero for a fresh issuance; the asset blinding factor of the spent
    /// token output for a reissuance.
    pub blinding_nonce: [u8; 32],
    /// The contract hash for a fresh issuance; the original issuance entropy
    /// for a reissuance.
    pub asset_entropy: [u8; 32],
    pub issuance_amount: ConfidentialValue,
    pub inflation_keys: ConfidentialValue,
    pub issuance_amount_rangeproof: Vec<u8>,
    pub inflation_keys_rangeproof: Vec<u8>,
    pub pegin_witness: Witness,
}

impl ConfidentialTxIn {
    pub fn new(previous_output: OutPoint, sequence: u32, script_sig: Script) -> Self {
        ConfidentialTxIn {
            previous_output,
            sequence,
            script_sig,
            ..Default::default()
        }
    }

    /// True when either issuance value slot is populated. Drives the
    /// issuance marker bit and the presence of the issuance block on the wire.
    pub fn has_issuance(&self) -> bool {
        !self.issuance_amount.is_empty() || !self.inflation_keys.is_empty()
    }

    /// True when a pegin witness is attached. Drives the pegin marker bit.
    pub fn has_pegin(&self) -> bool {
        !self.pegin_witness.is_empty()
    }

    /// A non-zero blinding nonce marks the issuance as a reissuance.
    pub fn is_reissuance(&self) -> bool {
        self.blinding_nonce != [0u8; 32]
    }

    pub fn has_witness_data(&self) -> bool {
        !self.script_witness.is_empty()
            || !self.pegin_witness.is_empty()
            || !self.issuance_amount_rangeproof.is_empty()
            || !self.inflation_keys_rangeproof.is_empty()
    }

    pub fn set_issuance(
        &mut self,
        blinding_nonce: [u8; 32],
        asset_entropy: [u8; 32],
        issuance_amount: ConfidentialValue,
        inflation_keys: ConfidentialValue,
        issuance_amount_rangeproof: Vec<u8>,
        inflation_keys_rangeproof: Vec<u8>,
    ) {
        self.blinding_nonce = blinding_nonce;
        self.asset_entropy = asset_entropy;
        self.issuance_amount = issuance_amount;
        self.inflation_keys = inflation_keys;
        self.issuance_amount_rangeproof = issuance_amount_rangeproof;
        self.inflation_keys_rangeproof = inflation_keys_rangeproof;
    }

    // Serialized outpoint index with derived marker bits.
    fn wire_index(&self) -> u32 {
        let vout = self.previous_output.vout;
        if vout == COINBASE_INDEX {
            return vout;
        }
        let mut index = vout & OUTPOINT_INDEX_MASK;
        if self.has_issuance() {
            index |= OUTPOINT_ISSUANCE_FLAG;
        }
        if self.has_pegin() {
            index |= OUTPOINT_PEGIN_FLAG;
        }
        index
    }
}

/// A confidential transaction output.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ConfidentialTxOut {
    pub asset: ConfidentialAssetId,
    pub value: ConfidentialValue,
    pub nonce: ConfidentialNonce,
    pub script_pubkey: Script,
    pub surjection_proof: Vec<u8>,
    pub range_proof: Vec<u8>,
    /// Cleartext amount shadow. Tracks the explicit value automatically and
    /// can be set out of band for blinded outputs whose amount the caller
    /// knows.
    pub explicit_amount: u64,
}

impl ConfidentialTxOut {
    pub fn new(
        asset: ConfidentialAssetId,
        value: ConfidentialValue,
        nonce: ConfidentialNonce,
        script_pubkey: Script,
    ) -> Self {
        let mut out = ConfidentialTxOut {
            asset,
            value,
            nonce,
            script_pubkey,
            ..Default::default()
        };
        out.sync_explicit_amount();
        out
    }

    /// The mandatory fee output: explicit value, empty locking script.
    pub fn fee(asset: ConfidentialAssetId, satoshi: u64) -> Self {
        ConfidentialTxOut::new(
            asset,
            ConfidentialValue::explicit(satoshi),
            ConfidentialNonce::Empty,
            Script::new(),
        )
    }

    /// An empty locking script marks the fee output.
    pub fn is_fee(&self) -> bool {
        self.script_pubkey.is_empty()
    }

    pub fn has_witness_data(&self) -> bool {
        !self.surjection_proof.is_empty() || !self.range_proof.is_empty()
    }

    // Refreshes the cleartext shadow from the value slot. Called at the end
    // of every mutation that can change the value; a blinded value leaves the
    // previously known amount in place.
    fn sync_explicit_amount(&mut self) {
        if let ConfidentialValue::Explicit(satoshi) = self.value {
            self.explicit_amount = satoshi;
        }
    }
}

// The cleartext shadow is a cache, not part of the output's identity.
impl PartialEq for ConfidentialTxOut {
    fn eq(&self, other: &Self) -> bool {
        self.asset == other.asset
            && self.value == other.value
            && self.nonce == other.nonce
            && self.script_pubkey == other.script_pubkey
            && self.surjection_proof == other.surjection_proof
            && self.range_proof == other.range_proof
    }
}

impl Eq for ConfidentialTxOut {}

/// An ordered, index-addressed confidential transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfidentialTransaction {
    pub version: i32,
    pub lock_time: u32,
    pub input: Vec<ConfidentialTxIn>,
    pub output: Vec<ConfidentialTxOut>,
}

impl Default for ConfidentialTransaction {
    fn default() -> Self {
        ConfidentialTransaction::new(DEFAULT_VERSION, 0)
    }
}

impl ConfidentialTransaction {
    pub fn new(version: i32, lock_time: u32) -> Self {
        ConfidentialTransaction {
            version,
            lock_time,
            input: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::consensus_decode_from_slice(bytes)
    }

    pub fn from_hex(hex_string: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hex_string)?)
    }

    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.serialize()?))
    }

    /// Full serialization, witness section included when any witness data
    /// exists.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_transaction(&mut buf, true)?;
        Ok(buf)
    }

    /// Serialization without the witness section (txid form).
    pub fn serialize_no_witness(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_transaction(&mut buf, false)?;
        Ok(buf)
    }

    pub fn txid(&self) -> Result<Txid> {
        Ok(Txid::new(sha256d(&self.serialize_no_witness()?)))
    }

    pub fn wtxid(&self) -> Result<Txid> {
        Ok(Txid::new(sha256d(&self.serialize()?)))
    }

    pub fn has_witness(&self) -> bool {
        self.input.iter().any(|txin| txin.has_witness_data())
            || self.output.iter().any(|txout| txout.has_witness_data())
    }

    pub fn input_count(&self) -> u32 {
        self.input.len() as u32
    }

    pub fn output_count(&self) -> u32 {
        self.output.len() as u32
    }

    pub fn txin(&self, index: u32) -> Result<&ConfidentialTxIn> {
        let index = self.check_txin_index(index)?;
        Ok(&self.input[index])
    }

    pub fn txout(&self, index: u32) -> Result<&ConfidentialTxOut> {
        let index = self.check_txout_index(index)?;
        Ok(&self.output[index])
    }

    /// Finds the input spending `outpoint`, ignoring issuance/pegin marker
    /// bits on the index.
    pub fn find_txin(&self, outpoint: &OutPoint) -> Result<u32> {
        let target = if outpoint.vout == COINBASE_INDEX {
            outpoint.vout
        } else {
            outpoint.vout & OUTPOINT_INDEX_MASK
        };
        for (index, txin) in self.input.iter().enumerate() {
            if txin.previous_output.txid == outpoint.txid && txin.previous_output.vout == target {
                return Ok(index as u32);
            }
        }
        Err(CtError::invalid_argument(format!(
            "no input spends outpoint {}:{}",
            outpoint.txid.to_hex(),
            outpoint.vout
        )))
    }

    /// Finds the first output paying to `script_pubkey`.
    pub fn find_txout(&self, script_pubkey: &Script) -> Result<u32> {
        for (index, txout) in self.output.iter().enumerate() {
            if &txout.script_pubkey == script_pubkey {
                return Ok(index as u32);
            }
        }
        Err(CtError::invalid_argument(
            "locking script not found in outputs".to_string(),
        ))
    }

    // ---- input mutators ----------------------------------------------------

    /// Appends an input and returns its index. Marker bits on the outpoint
    /// index are stripped; they are reconstructed from state on encoding.
    pub fn add_input(&mut self, outpoint: OutPoint, sequence: u32, script_sig: Script) -> u32 {
        let vout = if outpoint.vout == COINBASE_INDEX {
            outpoint.vout
        } else {
            outpoint.vout & OUTPOINT_INDEX_MASK
        };
        self.input.push(ConfidentialTxIn::new(
            OutPoint::new(outpoint.txid, vout),
            sequence,
            script_sig,
        ));
        (self.input.len() - 1) as u32
    }

    pub fn remove_input(&mut self, index: u32) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input.remove(index);
        Ok(())
    }

    pub fn set_unlocking_script(&mut self, index: u32, script_sig: Script) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].script_sig = script_sig;
        Ok(())
    }

    pub fn add_script_witness(&mut self, index: u32, item: Vec<u8>) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].script_witness.push(item);
        Ok(())
    }

    pub fn set_script_witness(&mut self, index: u32, witness_index: u32, item: Vec<u8>) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].script_witness.set(witness_index, item)
    }

    pub fn remove_script_witness_all(&mut self, index: u32) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].script_witness.clear();
        Ok(())
    }

    pub fn add_pegin_witness(&mut self, index: u32, item: Vec<u8>) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].pegin_witness.push(item);
        Ok(())
    }

    pub fn set_pegin_witness(&mut self, index: u32, witness_index: u32, item: Vec<u8>) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].pegin_witness.set(witness_index, item)
    }

    pub fn remove_pegin_witness_all(&mut self, index: u32) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].pegin_witness.clear();
        Ok(())
    }

    /// Writes the six issuance fields of one input.
    pub fn set_issuance(
        &mut self,
        index: u32,
        blinding_nonce: [u8; 32],
        asset_entropy: [u8; 32],
        issuance_amount: ConfidentialValue,
        inflation_keys: ConfidentialValue,
        issuance_amount_rangeproof: Vec<u8>,
        inflation_keys_rangeproof: Vec<u8>,
    ) -> Result<()> {
        let index = self.check_txin_index(index)?;
        self.input[index].set_issuance(
            blinding_nonce,
            asset_entropy,
            issuance_amount,
            inflation_keys,
            issuance_amount_rangeproof,
            inflation_keys_rangeproof,
        );
        Ok(())
    }

    /// Declares a fresh asset issuance on one input, derives the asset and
    /// reissuance token, and appends the corresponding outputs.
    #[allow(clippy::too_many_arguments)]
    pub fn set_asset_issuance(
        &mut self,
        index: u32,
        asset_amount: u64,
        asset_script: &Script,
        asset_nonce: ConfidentialNonce,
        token_amount: u64,
        token_script: &Script,
        token_nonce: ConfidentialNonce,
        is_blind: bool,
        contract_hash: &[u8; 32],
    ) -> Result<IssuanceParameter> {
        let vin_index = self.check_txin_index(index)?;
        let txin = &self.input[vin_index];
        if txin.has_issuance() {
            log::warn!("issuance already set on vin[{}]", index);
            return Err(CtError::illegal_state(format!(
                "input {} already carries an issuance",
                index
            )));
        }
        if asset_amount == 0 && token_amount == 0 {
            return Err(CtError::invalid_argument(
                "issuance requires a non-zero asset or token amount".to_string(),
            ));
        }
        if asset_amount > 0 && asset_script.is_empty() {
            return Err(CtError::invalid_argument(
                "issuance asset output requires a locking script".to_string(),
            ));
        }
        if token_amount > 0 && token_script.is_empty() {
            return Err(CtError::invalid_argument(
                "issuance token output requires a locking script".to_string(),
            ));
        }

        let param = issuance::issuance_value(
            &txin.previous_output,
            is_blind,
            contract_hash,
            &[0u8; 32],
        );
        log::debug!(
            "issuance on vin[{}]: asset={} token={}",
            index,
            param.asset.to_hex(),
            param.token.to_hex()
        );

        self.input[vin_index].set_issuance(
            [0u8; 32],
            *contract_hash,
            ConfidentialValue::explicit(asset_amount),
            ConfidentialValue::explicit(token_amount),
            Vec::new(),
            Vec::new(),
        );

        if asset_amount > 0 {
            self.push_output(param.asset, asset_amount, asset_script.clone(), asset_nonce);
        }
        if token_amount > 0 {
            self.push_output(param.token, token_amount, token_script.clone(), token_nonce);
        }
        Ok(param)
    }

    /// Declares a reissuance on one input. The blinding-nonce slot records
    /// the asset blinding factor of the spent token output, the entropy slot
    /// the original issuance entropy. Only the asset amount is reissued.
    pub fn set_asset_reissuance(
        &mut self,
        index: u32,
        asset_amount: u64,
        asset_script: &Script,
        asset_nonce: ConfidentialNonce,
        asset_blind_factor: &BlindFactor,
        entropy: &BlindFactor,
    ) -> Result<IssuanceParameter> {
        let vin_index = self.check_txin_index(index)?;
        if self.input[vin_index].has_issuance() {
            log::warn!("issuance already set on vin[{}]", index);
            return Err(CtError::illegal_state(format!(
                "input {} already carries an issuance",
                index
            )));
        }
        if asset_amount == 0 {
            return Err(CtError::invalid_argument(
                "reissuance requires a non-zero asset amount".to_string(),
            ));
        }
        if asset_script.is_empty() {
            return Err(CtError::invalid_argument(
                "reissuance asset output requires a locking script".to_string(),
            ));
        }

        let param = IssuanceParameter {
            entropy: *entropy,
            asset: issuance::asset_id(entropy),
            token: ConfidentialAssetId::Empty,
        };
        self.input[vin_index].set_issuance(
            *asset_blind_factor.as_bytes(),
            *entropy.as_bytes(),
            ConfidentialValue::explicit(asset_amount),
            ConfidentialValue::Empty,
            Vec::new(),
            Vec::new(),
        );
        self.push_output(param.asset, asset_amount, asset_script.clone(), asset_nonce);
        Ok(param)
    }

    // ---- output mutators ---------------------------------------------------

    /// Appends an explicit output and returns its index.
    pub fn add_output(
        &mut self,
        satoshi: u64,
        asset: ConfidentialAssetId,
        script_pubkey: Script,
        nonce: ConfidentialNonce,
    ) -> Result<u32> {
        if asset.is_empty() {
            return Err(CtError::invalid_argument(
                "output asset must not be empty".to_string(),
            ));
        }
        Ok(self.push_output(asset, satoshi, script_pubkey, nonce))
    }

    /// Appends the fee output (empty locking script).
    pub fn add_fee_output(&mut self, satoshi: u64, asset: ConfidentialAssetId) -> Result<u32> {
        if asset.is_empty() {
            return Err(CtError::invalid_argument(
                "fee asset must not be empty".to_string(),
            ));
        }
        self.output.push(ConfidentialTxOut::fee(asset, satoshi));
        Ok((self.output.len() - 1) as u32)
    }

    pub fn remove_output(&mut self, index: u32) -> Result<()> {
        let index = self.check_txout_index(index)?;
        self.output.remove(index);
        Ok(())
    }

    /// Overwrites the commitment slots and proofs of one output. The fee
    /// output (empty locking script) can never hold a blinded value.
    pub fn set_output_commitment(
        &mut self,
        index: u32,
        asset: ConfidentialAssetId,
        value: ConfidentialValue,
        nonce: ConfidentialNonce,
        surjection_proof: Vec<u8>,
        range_proof: Vec<u8>,
    ) -> Result<()> {
        let index = self.check_txout_index(index)?;
        let txout = &mut self.output[index];
        if txout.script_pubkey.is_empty() && value.has_blinding() {
            return Err(CtError::invalid_argument(format!(
                "fee output {} cannot hold a blinded value",
                index
            )));
        }
        txout.asset = asset;
        txout.value = value;
        txout.nonce = nonce;
        txout.surjection_proof = surjection_proof;
        txout.range_proof = range_proof;
        txout.sync_explicit_amount();
        Ok(())
    }

    /// Records the cleartext amount of an output whose commitment stays
    /// untouched (the caller knows the value out of band).
    pub fn set_output_value(&mut self, index: u32, satoshi: u64) -> Result<()> {
        let index = self.check_txout_index(index)?;
        self.output[index].explicit_amount = satoshi;
        Ok(())
    }

    // ---- internals ---------------------------------------------------------

    fn push_output(
        &mut self,
        asset: ConfidentialAssetId,
        satoshi: u64,
        script_pubkey: Script,
        nonce: ConfidentialNonce,
    ) -> u32 {
        self.output.push(ConfidentialTxOut::new(
            asset,
            ConfidentialValue::explicit(satoshi),
            nonce,
            script_pubkey,
        ));
        (self.output.len() - 1) as u32
    }

    pub(crate) fn check_txin_index(&self, index: u32) -> Result<usize> {
        if (index as usize) < self.input.len() {
            Ok(index as usize)
        } else {
            log::warn!("vin[{}] out of range", index);
            Err(CtError::out_of_range(format!(
                "vin index {} out of range ({} inputs)",
                index,
                self.input.len()
            )))
        }
    }

    pub(crate) fn check_txout_index(&self, index: u32) -> Result<usize> {
        if (index as usize) < self.output.len() {
            Ok(index as usize)
        } else {
            log::warn!("vout[{}] out of range", index);
            Err(CtError::out_of_range(format!(
                "vout index {} out of range ({} outputs)",
                index,
                self.output.len()
            )))
        }
    }

    fn write_transaction<W: Write>(&self, writer: &mut W, include_witness: bool) -> Result<usize> {
        let has_witness = include_witness && self.has_witness();
        let mut written = self.version.consensus_encode(writer)?;
        written += writer.write(&[u8::from(has_witness)])?;

        written += write_varint(writer, self.input.len() as u64)?;
        for txin in &self.input {
            written += txin.previous_output.txid.consensus_encode(writer)?;
            written += txin.wire_index().consensus_encode(writer)?;
            written += txin.script_sig.consensus_encode(writer)?;
            written += txin.sequence.consensus_encode(writer)?;
            if txin.has_issuance() {
                written += txin.blinding_nonce.consensus_encode(writer)?;
                written += txin.asset_entropy.consensus_encode(writer)?;
                written += txin.issuance_amount.consensus_encode(writer)?;
                written += txin.inflation_keys.consensus_encode(writer)?;
            }
        }

        written += write_varint(writer, self.output.len() as u64)?;
        for txout in &self.output {
            written += txout.asset.consensus_encode(writer)?;
            written += txout.value.consensus_encode(writer)?;
            written += txout.nonce.consensus_encode(writer)?;
            written += txout.script_pubkey.consensus_encode(writer)?;
        }

        written += self.lock_time.consensus_encode(writer)?;

        if has_witness {
            for txin in &self.input {
                written += txin.issuance_amount_rangeproof.consensus_encode(writer)?;
                written += txin.inflation_keys_rangeproof.consensus_encode(writer)?;
                written += txin.script_witness.consensus_encode(writer)?;
                written += txin.pegin_witness.consensus_encode(writer)?;
            }
            for txout in &self.output {
                written += txout.surjection_proof.consensus_encode(writer)?;
                written += txout.range_proof.consensus_encode(writer)?;
            }
        }
        Ok(written)
    }
}

impl Encodable for ConfidentialTransaction {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        self.write_transaction(writer, true)
    }
}

impl Decodable for ConfidentialTransaction {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let version = i32::consensus_decode(reader)?;
        let flag = u8::consensus_decode(reader)?;
        if flag > 1 {
            return Err(CtError::invalid_argument(format!(
                "invalid witness flag: 0x{:02x}",
                flag
            )));
        }
        let has_witness = flag == 1;

        let input_count = read_varint(reader)?;
        let mut input = Vec::with_capacity(std::cmp::min(input_count as usize, 1024));
        for _ in 0..input_count {
            let txid = Txid::consensus_decode(reader)?;
            let wire_index = u32::consensus_decode(reader)?;
            let script_sig = Script::consensus_decode(reader)?;
            let sequence = u32::consensus_decode(reader)?;
            let (vout, has_issuance) = if wire_index == COINBASE_INDEX {
                (wire_index, false)
            } else {
                (
                    wire_index & OUTPOINT_INDEX_MASK,
                    wire_index & OUTPOINT_ISSUANCE_FLAG != 0,
                )
            };
            let mut txin =
                ConfidentialTxIn::new(OutPoint::new(txid, vout), sequence, script_sig);
            if has_issuance {
                txin.blinding_nonce = <[u8; 32]>::consensus_decode(reader)?;
                txin.asset_entropy = <[u8; 32]>::consensus_decode(reader)?;
                txin.issuance_amount = ConfidentialValue::consensus_decode(reader)?;
                txin.inflation_keys = ConfidentialValue::consensus_decode(reader)?;
            }
            input.push(txin);
        }

        let output_count = read_varint(reader)?;
        let mut output = Vec::with_capacity(std::cmp::min(output_count as usize, 1024));
        for _ in 0..output_count {
            let asset = ConfidentialAssetId::consensus_decode(reader)?;
            let value = ConfidentialValue::consensus_decode(reader)?;
            let nonce = ConfidentialNonce::consensus_decode(reader)?;
            let script_pubkey = Script::consensus_decode(reader)?;
            output.push(ConfidentialTxOut::new(asset, value, nonce, script_pubkey));
        }

        let lock_time = u32::consensus_decode(reader)?;

        if has_witness {
            for txin in &mut input {
                txin.issuance_amount_rangeproof = Vec::<u8>::consensus_decode(reader)?;
                txin.inflation_keys_rangeproof = Vec::<u8>::consensus_decode(reader)?;
                txin.script_witness = Witness::consensus_decode(reader)?;
                txin.pegin_witness = Witness::consensus_decode(reader)?;
            }
            for txout in &mut output {
                txout.surjection_proof = Vec::<u8>::consensus_decode(reader)?;
                txout.range_proof = Vec::<u8>::consensus_decode(reader)?;
            }
        }

        Ok(ConfidentialTransaction {
            version,
            lock_time,
            input,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_TX_HEX: &str = "0200000000000000000000";

    #[test]
    fn test_empty_transaction_serialization() {
        let tx = ConfidentialTransaction::new(2, 0);
        assert_eq!(tx.to_hex().unwrap(), EMPTY_TX_HEX);

        let parsed = ConfidentialTransaction::from_hex(EMPTY_TX_HEX).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(parsed.serialize().unwrap().len(), 11);
    }

    #[test]
    fn test_add_and_remove_input() {
        let mut tx = ConfidentialTransaction::new(2, 0);
        let txid =
            Txid::from_hex("d1efb621591f94f66a9c3161addd6d7db0ae82cc1674e3b098051793fb70028a")
                .unwrap();
        let first = tx.add_input(OutPoint::new(txid, 0), DEFAULT_SEQUENCE, Script::new());
        let second = tx.add_input(OutPoint::new(txid, 1), DEFAULT_SEQUENCE, Script::new());
        assert_eq!((first, second), (0, 1));
        assert_eq!(tx.input_count(), 2);

        tx.remove_input(0).unwrap();
        assert_eq!(tx.input_count(), 1);
        assert_eq!(tx.txin(0).unwrap().previous_output.vout, 1);
        assert!(matches!(tx.txin(1), Err(CtError::OutOfRange(_))));
        assert!(matches!(tx.remove_input(1), Err(CtError::OutOfRange(_))));
    }

    #[test]
    fn test_marker_bits_are_stripped_on_add() {
        let mut tx = ConfidentialTransaction::new(2, 0);
        let txid = Txid::new([9u8; 32]);
        tx.add_input(
            OutPoint::new(txid, 1 | OUTPOINT_ISSUANCE_FLAG),
            DEFAULT_SEQUENCE,
            Script::new(),
        );
        assert_eq!(tx.txin(0).unwrap().previous_output.vout, 1);
        assert_eq!(tx.find_txin(&OutPoint::new(txid, 1)).unwrap(), 0);
        assert_eq!(
            tx.find_txin(&OutPoint::new(txid, 1 | OUTPOINT_PEGIN_FLAG))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_fee_output_rejects_blinded_value() {
        let mut tx = ConfidentialTransaction::new(2, 0);
        tx.add_fee_output(1000, ConfidentialAssetId::explicit([3u8; 32]))
            .unwrap();
        let result = tx.set_output_commitment(
            0,
            ConfidentialAssetId::explicit([3u8; 32]),
            ConfidentialValue::Blinded([0x08; 33]),
            ConfidentialNonce::Empty,
            Vec::new(),
            Vec::new(),
        );
        assert!(matches!(result, Err(CtError::InvalidArgument(_))));
    }

    #[test]
    fn test_explicit_amount_shadow() {
        let mut tx = ConfidentialTransaction::new(2, 0);
        tx.add_output(
            7700,
            ConfidentialAssetId::explicit([1u8; 32]),
            Script::from_bytes(vec![0x51]),
            ConfidentialNonce::Empty,
        )
        .unwrap();
        assert_eq!(tx.txout(0).unwrap().explicit_amount, 7700);

        // Blinding the output keeps the known amount; setting it out of band
        // overrides it.
        tx.set_output_commitment(
            0,
            ConfidentialAssetId::Blinded([0x0a; 33]),
            ConfidentialValue::Blinded([0x08; 33]),
            ConfidentialNonce::Empty,
            vec![1],
            vec![2],
        )
        .unwrap();
        assert_eq!(tx.txout(0).unwrap().explicit_amount, 7700);
        tx.set_output_value(0, 8800).unwrap();
        assert_eq!(tx.txout(0).unwrap().explicit_amount, 8800);
    }
}
