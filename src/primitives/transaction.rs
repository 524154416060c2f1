//! Outpoint, txid and witness-stack building blocks.

use super::encode::{read_varint, write_varint, Decodable, Encodable};
use crate::{CtError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// A transaction identifier. Stored in internal (hash) byte order; the hex
/// form is byte-reversed, following the usual display convention.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Txid(pub [u8; 32]);

impl Txid {
    pub fn new(bytes: [u8; 32]) -> Self {
        Txid(bytes)
    }

    pub fn from_hex(hex_string: &str) -> Result<Self> {
        let mut bytes = hex::decode(hex_string)?;
        if bytes.len() != 32 {
            return Err(CtError::invalid_argument(format!(
                "txid must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        bytes.reverse();
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&bytes);
        Ok(Txid(buf))
    }

    pub fn to_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Encodable for Txid {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for Txid {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Txid(<[u8; 32]>::consensus_decode(reader)?))
    }
}

/// A reference to a spent transaction output.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutPoint {
    pub txid: Txid,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Txid, vout: u32) -> Self {
        OutPoint { txid, vout }
    }
}

impl Encodable for OutPoint {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.txid.consensus_encode(writer)?;
        written += self.vout.consensus_encode(writer)?;
        Ok(written)
    }
}

impl Decodable for OutPoint {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let txid = Txid::consensus_decode(reader)?;
        let vout = u32::consensus_decode(reader)?;
        Ok(OutPoint { txid, vout })
    }
}

/// An ordered stack of witness items, used for both the script witness and
/// the pegin witness of an input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Witness(Vec<Vec<u8>>);

impl Witness {
    pub fn new() -> Self {
        Witness(Vec::new())
    }

    pub fn from_items(items: Vec<Vec<u8>>) -> Self {
        Witness(items)
    }

    pub fn push(&mut self, data: Vec<u8>) {
        self.0.push(data);
    }

    /// Replaces the item at `index`.
    pub fn set(&mut self, index: u32, data: Vec<u8>) -> Result<()> {
        let slot = self.0.get_mut(index as usize).ok_or_else(|| {
            CtError::out_of_range(format!("witness stack index {} out of range", index))
        })?;
        *slot = data;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[Vec<u8>] {
        &self.0
    }
}

impl Encodable for Witness {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = write_varint(writer, self.0.len() as u64)?;
        for item in &self.0 {
            written += write_varint(writer, item.len() as u64)?;
            written += writer.write(item)?;
        }
        Ok(written)
    }
}

impl Decodable for Witness {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let count = read_varint(reader)?;
        let mut items = Vec::with_capacity(std::cmp::min(count as usize, 1024));
        for _ in 0..count {
            let len = read_varint(reader)?;
            let mut item = vec![0u8; len as usize];
            reader.read_exact(&mut item)?;
            items.push(item);
        }
        Ok(Witness(items))
    }
}
