//! Tagged commitment field types for confidential transactions.
//!
//! Each of the four confidential fields (asset, value, nonce, blinding
//! factor) is either absent, carried in the clear, or replaced by a 33-byte
//! commitment whose leading version byte identifies the field kind. The wire
//! prefix table:
//!
//! | field | explicit | blinded    |
//! |-------|----------|------------|
//! | value | 0x01     | 0x08, 0x09 |
//! | asset | 0x01     | 0x0a, 0x0b |
//! | nonce | 0x01     | 0x02, 0x03 |
//!
//! A single 0x00 byte marks an absent field. State is decided once at
//! construction; malformed sizes or version bytes are rejected up front.

use super::encode::{Decodable, Encodable};
use crate::{CtError, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::io::{Read, Write};

/// Version byte of an explicit (unblinded) field.
pub const PREFIX_EXPLICIT: u8 = 0x01;
/// Version bytes of a blinded value commitment.
pub const PREFIX_VALUE_COMMITMENT: [u8; 2] = [0x08, 0x09];
/// Version bytes of a blinded asset commitment.
pub const PREFIX_ASSET_COMMITMENT: [u8; 2] = [0x0a, 0x0b];
/// Version bytes of a blinded nonce commitment.
pub const PREFIX_NONCE_COMMITMENT: [u8; 2] = [0x02, 0x03];

fn reversed_hex(bytes: &[u8]) -> String {
    let mut buf = bytes.to_vec();
    buf.reverse();
    hex::encode(buf)
}

fn array32(bytes: &[u8]) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(bytes);
    buf
}

fn be_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_be_bytes(buf)
}

fn array33(bytes: &[u8]) -> [u8; 33] {
    let mut buf = [0u8; 33];
    buf.copy_from_slice(bytes);
    buf
}

/// A confidential amount: absent, an explicit satoshi amount, or a Pedersen
/// commitment.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidentialValue {
    #[default]
    Empty,
    Explicit(u64),
    Blinded(#[serde_as(as = "Bytes")] [u8; 33]),
}

impl ConfidentialValue {
    pub fn explicit(satoshi: u64) -> Self {
        ConfidentialValue::Explicit(satoshi)
    }

    /// Builds a value from its raw byte form. Accepted shapes: empty, a
    /// single zero byte, an 8-byte big-endian amount, a 9-byte prefixed
    /// amount, or a 33-byte commitment.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            0 => Ok(ConfidentialValue::Empty),
            1 if bytes[0] == 0 => Ok(ConfidentialValue::Empty),
            8 => Ok(ConfidentialValue::Explicit(be_u64(bytes))),
            9 => match bytes[0] {
                0 => Ok(ConfidentialValue::Empty),
                PREFIX_EXPLICIT => Ok(ConfidentialValue::Explicit(be_u64(&bytes[1..]))),
                v => Err(CtError::invalid_argument(format!(
                    "invalid confidential value version: 0x{:02x}",
                    v
                ))),
            },
            33 => match bytes[0] {
                0 => Ok(ConfidentialValue::Empty),
                v if PREFIX_VALUE_COMMITMENT.contains(&v) => {
                    Ok(ConfidentialValue::Blinded(array33(bytes)))
                }
                v => Err(CtError::invalid_argument(format!(
                    "invalid confidential value version: 0x{:02x}",
                    v
                ))),
            },
            n => Err(CtError::invalid_argument(format!(
                "invalid confidential value size: {}",
                n
            ))),
        }
    }

    pub fn from_hex(hex_string: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hex_string)?)
    }

    /// Builds a blinded value from a 33-byte Pedersen commitment.
    pub fn from_commitment(commitment: &[u8]) -> Result<Self> {
        if commitment.len() != 33 || !PREFIX_VALUE_COMMITMENT.contains(&commitment[0]) {
            return Err(CtError::invalid_argument(
                "value commitment must be 33 bytes with an 0x08/0x09 prefix".to_string(),
            ));
        }
        Ok(ConfidentialValue::Blinded(array33(commitment)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConfidentialValue::Empty)
    }

    pub fn has_blinding(&self) -> bool {
        matches!(self, ConfidentialValue::Blinded(_))
    }

    /// The explicit satoshi amount; zero when the value is absent or blinded.
    pub fn to_explicit(&self) -> u64 {
        match self {
            ConfidentialValue::Explicit(satoshi) => *satoshi,
            _ => 0,
        }
    }

    /// Version byte plus payload, exactly as serialized on the wire.
    pub fn commitment_bytes(&self) -> Vec<u8> {
        match self {
            ConfidentialValue::Empty => vec![0],
            ConfidentialValue::Explicit(satoshi) => {
                let mut buf = Vec::with_capacity(9);
                buf.push(PREFIX_EXPLICIT);
                buf.extend_from_slice(&satoshi.to_be_bytes());
                buf
            }
            ConfidentialValue::Blinded(commitment) => commitment.to_vec(),
        }
    }

    pub fn to_hex(&self) -> String {
        match self {
            ConfidentialValue::Empty => String::new(),
            _ => hex::encode(self.commitment_bytes()),
        }
    }
}

impl Encodable for ConfidentialValue {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        Ok(writer.write(&self.commitment_bytes())?)
    }
}

impl Decodable for ConfidentialValue {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        match version[0] {
            0 => Ok(ConfidentialValue::Empty),
            PREFIX_EXPLICIT => {
                let mut buf = [0u8; 8];
                reader.read_exact(&mut buf)?;
                Ok(ConfidentialValue::Explicit(u64::from_be_bytes(buf)))
            }
            v if PREFIX_VALUE_COMMITMENT.contains(&v) => {
                let mut buf = [0u8; 33];
                buf[0] = v;
                reader.read_exact(&mut buf[1..])?;
                Ok(ConfidentialValue::Blinded(buf))
            }
            v => Err(CtError::invalid_argument(format!(
                "invalid confidential value version: 0x{:02x}",
                v
            ))),
        }
    }
}

/// A confidential asset id: absent, an explicit 32-byte asset tag, or an
/// asset generator commitment.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidentialAssetId {
    #[default]
    Empty,
    Explicit([u8; 32]),
    Blinded(#[serde_as(as = "Bytes")] [u8; 33]),
}

impl ConfidentialAssetId {
    pub fn explicit(asset_tag: [u8; 32]) -> Self {
        ConfidentialAssetId::Explicit(asset_tag)
    }

    /// Builds an asset id from its raw byte form: a 32-byte explicit tag or a
    /// 33-byte prefixed slot. Empty input is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            1 if bytes[0] == 0 => Ok(ConfidentialAssetId::Empty),
            32 => Ok(ConfidentialAssetId::Explicit(array32(bytes))),
            33 => match bytes[0] {
                0 => Ok(ConfidentialAssetId::Empty),
                PREFIX_EXPLICIT => Ok(ConfidentialAssetId::Explicit(array32(&bytes[1..]))),
                v if PREFIX_ASSET_COMMITMENT.contains(&v) => {
                    Ok(ConfidentialAssetId::Blinded(array33(bytes)))
                }
                v => Err(CtError::invalid_argument(format!(
                    "invalid asset version: 0x{:02x}",
                    v
                ))),
            },
            n => Err(CtError::invalid_argument(format!(
                "invalid asset size: {}",
                n
            ))),
        }
    }

    /// Parses the hex form: 64 chars are a display-order (reversed) explicit
    /// asset id, 66 chars a raw prefixed slot.
    pub fn from_hex(hex_string: &str) -> Result<Self> {
        let mut bytes = hex::decode(hex_string)?;
        if bytes.len() == 32 {
            bytes.reverse();
        }
        Self::from_bytes(&bytes)
    }

    /// Builds a blinded asset from a 33-byte generator serialization.
    pub fn from_commitment(commitment: &[u8]) -> Result<Self> {
        if commitment.len() != 33 || !PREFIX_ASSET_COMMITMENT.contains(&commitment[0]) {
            return Err(CtError::invalid_argument(
                "asset commitment must be 33 bytes with an 0x0a/0x0b prefix".to_string(),
            ));
        }
        Ok(ConfidentialAssetId::Blinded(array33(commitment)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConfidentialAssetId::Empty)
    }

    pub fn has_blinding(&self) -> bool {
        matches!(self, ConfidentialAssetId::Blinded(_))
    }

    /// The explicit asset tag; all zero when absent or blinded.
    pub fn to_explicit(&self) -> [u8; 32] {
        match self {
            ConfidentialAssetId::Explicit(tag) => *tag,
            _ => [0u8; 32],
        }
    }

    /// Version byte plus payload, exactly as serialized on the wire.
    pub fn commitment_bytes(&self) -> Vec<u8> {
        match self {
            ConfidentialAssetId::Empty => vec![0],
            ConfidentialAssetId::Explicit(tag) => {
                let mut buf = Vec::with_capacity(33);
                buf.push(PREFIX_EXPLICIT);
                buf.extend_from_slice(tag);
                buf
            }
            ConfidentialAssetId::Blinded(commitment) => commitment.to_vec(),
        }
    }

    /// Explicit asset ids display byte-reversed; commitments display raw.
    pub fn to_hex(&self) -> String {
        match self {
            ConfidentialAssetId::Empty => String::new(),
            ConfidentialAssetId::Explicit(tag) => reversed_hex(tag),
            ConfidentialAssetId::Blinded(commitment) => hex::encode(commitment),
        }
    }
}

impl Encodable for ConfidentialAssetId {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        Ok(writer.write(&self.commitment_bytes())?)
    }
}

impl Decodable for ConfidentialAssetId {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        match version[0] {
            0 => Ok(ConfidentialAssetId::Empty),
            PREFIX_EXPLICIT => {
                let mut buf = [0u8; 32];
                reader.read_exact(&mut buf)?;
                Ok(ConfidentialAssetId::Explicit(buf))
            }
            v if PREFIX_ASSET_COMMITMENT.contains(&v) => {
                let mut buf = [0u8; 33];
                buf[0] = v;
                reader.read_exact(&mut buf[1..])?;
                Ok(ConfidentialAssetId::Blinded(buf))
            }
            v => Err(CtError::invalid_argument(format!(
                "invalid asset version: 0x{:02x}",
                v
            ))),
        }
    }
}

/// A confidential ECDH nonce: absent, a raw 32-byte value, or a 33-byte
/// public key published by the sender.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidentialNonce {
    #[default]
    Empty,
    Explicit([u8; 32]),
    Blinded(#[serde_as(as = "Bytes")] [u8; 33]),
}

impl ConfidentialNonce {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            0 => Ok(ConfidentialNonce::Empty),
            1 if bytes[0] == 0 => Ok(ConfidentialNonce::Empty),
            32 => Ok(ConfidentialNonce::Explicit(array32(bytes))),
            33 => match bytes[0] {
                0 => Ok(ConfidentialNonce::Empty),
                PREFIX_EXPLICIT => Ok(ConfidentialNonce::Explicit(array32(&bytes[1..]))),
                v if PREFIX_NONCE_COMMITMENT.contains(&v) => {
                    Ok(ConfidentialNonce::Blinded(array33(bytes)))
                }
                v => Err(CtError::invalid_argument(format!(
                    "invalid nonce version: 0x{:02x}",
                    v
                ))),
            },
            n => Err(CtError::invalid_argument(format!(
                "invalid nonce size: {}",
                n
            ))),
        }
    }

    pub fn from_hex(hex_string: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hex_string)?)
    }

    /// Builds a blinded nonce from a 33-byte compressed public key.
    pub fn from_commitment(commitment: &[u8]) -> Result<Self> {
        if commitment.len() != 33 || !PREFIX_NONCE_COMMITMENT.contains(&commitment[0]) {
            return Err(CtError::invalid_argument(
                "nonce commitment must be a 33-byte compressed public key".to_string(),
            ));
        }
        Ok(ConfidentialNonce::Blinded(array33(commitment)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConfidentialNonce::Empty)
    }

    pub fn has_blinding(&self) -> bool {
        matches!(self, ConfidentialNonce::Blinded(_))
    }

    /// The explicit nonce bytes; all zero when absent or blinded.
    pub fn to_explicit(&self) -> [u8; 32] {
        match self {
            ConfidentialNonce::Explicit(bytes) => *bytes,
            _ => [0u8; 32],
        }
    }

    /// Version byte plus payload, exactly as serialized on the wire.
    pub fn commitment_bytes(&self) -> Vec<u8> {
        match self {
            ConfidentialNonce::Empty => vec![0],
            ConfidentialNonce::Explicit(bytes) => {
                let mut buf = Vec::with_capacity(33);
                buf.push(PREFIX_EXPLICIT);
                buf.extend_from_slice(bytes);
                buf
            }
            ConfidentialNonce::Blinded(commitment) => commitment.to_vec(),
        }
    }

    pub fn to_hex(&self) -> String {
        match self {
            ConfidentialNonce::Empty => String::new(),
            _ => hex::encode(self.commitment_bytes()),
        }
    }
}

impl Encodable for ConfidentialNonce {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        Ok(writer.write(&self.commitment_bytes())?)
    }
}

impl Decodable for ConfidentialNonce {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        match version[0] {
            0 => Ok(ConfidentialNonce::Empty),
            PREFIX_EXPLICIT => {
                let mut buf = [0u8; 32];
                reader.read_exact(&mut buf)?;
                Ok(ConfidentialNonce::Explicit(buf))
            }
            v if PREFIX_NONCE_COMMITMENT.contains(&v) => {
                let mut buf = [0u8; 33];
                buf[0] = v;
                reader.read_exact(&mut buf[1..])?;
                Ok(ConfidentialNonce::Blinded(buf))
            }
            v => Err(CtError::invalid_argument(format!(
                "invalid nonce version: 0x{:02x}",
                v
            ))),
        }
    }
}

/// A 32-byte blinding factor (or issuance entropy). The hex form is
/// byte-reversed, like asset ids.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlindFactor([u8; 32]);

impl BlindFactor {
    pub fn new(bytes: [u8; 32]) -> Self {
        BlindFactor(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(CtError::invalid_argument(format!(
                "blind factor must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(BlindFactor(array32(bytes)))
    }

    pub fn from_hex(hex_string: &str) -> Result<Self> {
        let mut bytes = hex::decode(hex_string)?;
        if bytes.len() != 32 {
            return Err(CtError::invalid_argument(format!(
                "blind factor must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        bytes.reverse();
        Ok(BlindFactor(array32(&bytes)))
    }

    /// Generates a uniformly random blinding factor.
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        BlindFactor(bytes)
    }

    pub fn zero() -> Self {
        BlindFactor([0u8; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// An all-zero factor doubles as "not set".
    pub fn is_empty(&self) -> bool {
        self.is_zero()
    }

    pub fn to_hex(&self) -> String {
        reversed_hex(&self.0)
    }
}
