//! Minimal locking/unlocking script container.
//!
//! The confidential core never interprets scripts beyond emptiness (the fee
//! output marker) and the OP_RETURN prefix; construction of real locking
//! scripts is the job of the surrounding wallet code.

use super::encode::{read_varint, write_varint, Decodable, Encodable};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

const OP_RETURN: u8 = 0x6a;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    /// Creates an empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    pub fn from_hex(hex_string: &str) -> Result<Self> {
        Ok(Script(hex::decode(hex_string)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for scripts starting with OP_RETURN (provably unspendable).
    pub fn is_op_return(&self) -> bool {
        self.0.first() == Some(&OP_RETURN)
    }
}

impl Encodable for Script {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = write_varint(writer, self.0.len() as u64)?;
        written += writer.write(&self.0)?;
        Ok(written)
    }
}

impl Decodable for Script {
    fn consensus_decode<R: Read>(reader: &mut R) -> Result<Self> {
        let len = read_varint(reader)?;
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf)?;
        Ok(Script(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_hex_roundtrip() {
        let script = Script::from_hex("76a914144f003aa8dd6408ba0e8ee91757cf1f1976315c88ac").unwrap();
        assert_eq!(script.len(), 25);
        assert_eq!(script.to_hex(), "76a914144f003aa8dd6408ba0e8ee91757cf1f1976315c88ac");
        assert!(!script.is_empty());
        assert!(!script.is_op_return());
    }

    #[test]
    fn test_op_return_detection() {
        let script = Script::from_bytes(vec![0x6a, 0x04, 0xde, 0xad, 0xbe, 0xef]);
        assert!(script.is_op_return());
        assert!(!Script::new().is_op_return());
    }
}
