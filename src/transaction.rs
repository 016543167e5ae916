//! Transaction validation against an unspent-output snapshot

use std::collections::HashSet;

use crate::crypto::SignatureVerifier;
use crate::types::*;

/// CheckTransaction: tx x utxo set -> {valid, invalid}
///
/// A transaction is valid against a snapshot if and only if:
/// 1. every input claims an output present in the snapshot
/// 2. every input signature verifies under the claimed output's owner key,
///    over the per-input signing payload
/// 3. no output is claimed by more than one input of the transaction
/// 4. every output value is non-negative
/// 5. the claimed input values sum to at least the output values
///    (the difference is the fee; no fee accounting happens here)
///
/// Read-only: the snapshot is never touched, and re-checking against the same
/// snapshot always gives the same answer.
pub fn check_transaction<V: SignatureVerifier>(
    tx: &Transaction,
    utxo_set: &UtxoSet,
    verifier: &V,
) -> ValidationResult {
    let mut claimed: HashSet<&OutPoint> = HashSet::new();
    let mut input_total: Value = 0;

    for (index, input) in tx.inputs.iter().enumerate() {
        // 1. The claimed output must be unspent in this snapshot.
        let funding = match utxo_set.get(&input.prevout) {
            Some(output) => output,
            None => {
                return ValidationResult::Invalid(format!(
                    "input {} claims missing output {}:{}",
                    index,
                    hex::encode(&input.prevout.txid[..4]),
                    input.prevout.index
                ));
            }
        };

        // 2. The funding output's owner must have signed this input.
        let payload = tx.signing_payload(index);
        if !verifier.verify(&funding.owner, &payload, &input.signature) {
            return ValidationResult::Invalid(format!("invalid signature on input {}", index));
        }

        // 3. No double-claim within the transaction itself.
        if !claimed.insert(&input.prevout) {
            return ValidationResult::Invalid(format!(
                "input {} claims an output already claimed by this transaction",
                index
            ));
        }

        input_total += funding.value;
    }

    // 4. Output values must be non-negative.
    let mut output_total: Value = 0;
    for (index, output) in tx.outputs.iter().enumerate() {
        if output.value < 0 {
            return ValidationResult::Invalid(format!(
                "negative value {} at output {}",
                output.value, index
            ));
        }
        output_total += output.value;
    }

    // 5. Inputs must cover outputs.
    if input_total < output_total {
        return ValidationResult::Invalid(format!(
            "outputs {} overdraw inputs {}",
            output_total, input_total
        ));
    }

    ValidationResult::Valid
}

/// ApplyTransaction: commit an accepted transaction to a snapshot
///
/// Removes every claimed outpoint and inserts `(tx.id, i)` for each produced
/// output. Callers validate first; applying an unvalidated transaction can
/// leave the snapshot claiming value that never existed.
pub fn apply_transaction(tx: &Transaction, utxo_set: &mut UtxoSet) {
    for input in &tx.inputs {
        utxo_set.remove(&input.prevout);
    }
    for (index, output) in tx.outputs.iter().enumerate() {
        utxo_set.insert(
            OutPoint {
                txid: tx.id,
                index: index as u32,
            },
            output.clone(),
        );
    }
}
