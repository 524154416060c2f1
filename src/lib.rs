//! # confidential-tx
//!
//! A pure Rust implementation of Elements-style confidential transactions.
//!
//! A confidential transaction looks like an ordinary UTXO transaction but
//! replaces the plaintext asset and amount fields of its inputs and outputs
//! with either explicit values or homomorphic commitments, so validators can
//! verify conservation of value without learning what was moved. This crate
//! covers the data model and the protocol around it:
//!
//! - [`primitives::confidential`]: the tagged commitment field types
//!   (`Empty`/`Explicit`/`Blinded`) with construction-time validation
//! - [`transaction`]: the [`ConfidentialTransaction`](transaction::ConfidentialTransaction)
//!   container, its mutators and the bit-exact wire format (including the
//!   zero-input/zero-output case)
//! - [`issuance`]: asset issuance and reissuance derivation (entropy, asset
//!   id, reissuance token)
//! - [`blind`]: the blinding engine, producing a balanced set of Pedersen
//!   commitments, range proofs and surjection proofs
//! - [`unblind`]: the inverse engine, recovering explicit values with the
//!   receiver's blinding key
//! - [`sighash`]: legacy and segwit-v0 signature hashes
//!
//! Commitment arithmetic and the zero-knowledge proof systems come from
//! `secp256k1-zkp`, re-exported as [`secp256k1_zkp`] for callers that need to
//! handle keys or verify proofs themselves.
//!
//! ## Example
//!
//! ```rust
//! use confidential_tx::primitives::confidential::ConfidentialAssetId;
//! use confidential_tx::primitives::script::Script;
//! use confidential_tx::transaction::{ConfidentialTransaction, DEFAULT_SEQUENCE};
//! use confidential_tx::primitives::transaction::{OutPoint, Txid};
//! use confidential_tx::primitives::confidential::ConfidentialNonce;
//!
//! # fn main() -> confidential_tx::Result<()> {
//! let mut tx = ConfidentialTransaction::new(2, 0);
//! let outpoint = OutPoint::new(Txid::new([0x11; 32]), 0);
//! tx.add_input(outpoint, DEFAULT_SEQUENCE, Script::new());
//!
//! let asset = ConfidentialAssetId::explicit([0x22; 32]);
//! tx.add_output(
//!     99_000,
//!     asset,
//!     Script::from_hex("0014f54a5851e9372b87810a8e60cdd2e7cfd80b6e31")?,
//!     ConfidentialNonce::Empty,
//! )?;
//! tx.add_fee_output(1_000, asset)?;
//! assert_eq!(tx, ConfidentialTransaction::from_hex(&tx.to_hex()?)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error handling
//!
//! All fallible APIs return [`Result<T, CtError>`](CtError). Failures are
//! synchronous, typed by a closed error kind set, and carry a message naming
//! the offending index or field.
//!
//! ## Concurrency
//!
//! A [`ConfidentialTransaction`](transaction::ConfidentialTransaction) is a
//! plain mutable aggregate: share it read-only freely, but serialize
//! mutation externally. Curve operations run on per-call contexts and are
//! reentrant.

pub mod error;
pub mod primitives;
pub mod transaction;
pub mod issuance;
pub mod blind;
pub mod unblind;
pub mod sighash;

pub use error::{CtError, Result};

// Re-exported so callers can construct keys and verify commitments with the
// exact versions this crate links against.
pub use secp256k1_zkp;

/// Initializes the library's logging. Call once per process; subsequent
/// calls have no effect.
pub fn init() -> Result<()> {
    // It's ok if this fails, it just means logging was already initialized.
    let _ = env_logger::try_init();
    log::debug!("confidential-tx {} initialized", env!("CARGO_PKG_VERSION"));
    Ok(())
}
