//! Core ledger types for consensus validation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hash type: 256-bit identity value, supplied externally and only ever
/// compared, never recomputed here
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Monetary value in integer base units
pub type Value = i64;

/// OutPoint: identifies one output as (producing transaction id, output index)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Hash,
    pub index: u32,
}

/// Transaction input: a claimed outpoint plus the signature authorizing the claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Input {
    pub prevout: OutPoint,
    pub signature: ByteString,
}

/// Transaction output: a value locked to an owner's public key bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Output {
    pub value: Value,
    pub owner: ByteString,
}

/// Transaction: stable external identity, ordered inputs, ordered outputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Hash,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

impl Transaction {
    /// A coinbase introduces new value and claims nothing.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Canonical signed message for the input at `input_index`: that input's
    /// claimed outpoint followed by every output. Input signatures are not
    /// part of the payload, so each input can be signed independently, and the
    /// outpoint prefix ties the signature to one specific input.
    pub fn signing_payload(&self, input_index: usize) -> ByteString {
        let mut payload = Vec::new();
        if let Some(input) = self.inputs.get(input_index) {
            payload.extend_from_slice(&input.prevout.txid);
            payload.extend_from_slice(&input.prevout.index.to_le_bytes());
        }
        for output in &self.outputs {
            payload.extend_from_slice(&output.value.to_le_bytes());
            payload.extend_from_slice(&output.owner);
        }
        payload
    }
}

/// Block: external identity, parent identity (absent only for genesis), the
/// block's own coinbase, and the ordered non-coinbase transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: Hash,
    pub prev_hash: Option<Hash>,
    pub coinbase: Transaction,
    pub transactions: Vec<Transaction>,
}

/// Unspent-output set: outpoint -> output for everything produced along one
/// chain path and not yet consumed
pub type UtxoSet = HashMap<OutPoint, Output>;

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}
