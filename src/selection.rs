//! Maximal mutually valid batch selection
//!
//! Candidates in one batch may spend outputs produced by other candidates in
//! the same batch, so selection is a fixed point rather than a single filter
//! pass: keep committing whatever has become spendable until nothing more can
//! be committed.

use tracing::trace;

use crate::crypto::SignatureVerifier;
use crate::transaction::{apply_transaction, check_transaction};
use crate::types::*;

/// SelectTransactions: candidates x base snapshot -> accepted x result snapshot
///
/// Runs rounds until a round commits nothing. In each round every remaining
/// candidate whose claimed outputs are all present in the current snapshot is
/// validated and, when valid, applied before the next candidate is examined -
/// later candidates in the same round observe earlier commits, which is what
/// resolves same-batch dependency chains. A candidate that was ready but
/// failed validation is dropped for good; a candidate still waiting on an
/// unproduced output is deferred to the next round. Once a round commits
/// nothing, the deferred candidates can never be satisfied and are excluded.
///
/// The accepted set is maximal, not maximum: nothing excluded could be added
/// back without breaking validity, and double-spend ties go to the candidate
/// validated first in candidate order.
///
/// Returns the accepted transactions in acceptance order and a fresh snapshot;
/// the base set is never modified or aliased.
pub fn select_transactions<V: SignatureVerifier>(
    candidates: &[Transaction],
    base_utxo_set: &UtxoSet,
    verifier: &V,
) -> (Vec<Transaction>, UtxoSet) {
    let mut utxo_set = base_utxo_set.clone();
    let mut accepted = Vec::new();
    let mut remaining: Vec<Transaction> = candidates.to_vec();

    loop {
        let mut committed = 0usize;
        let mut deferred = Vec::with_capacity(remaining.len());

        for tx in remaining {
            if !inputs_available(&tx, &utxo_set) {
                deferred.push(tx);
                continue;
            }
            if check_transaction(&tx, &utxo_set, verifier).is_valid() {
                apply_transaction(&tx, &mut utxo_set);
                accepted.push(tx);
                committed += 1;
            }
            // Ready but invalid: dropped, never retried.
        }

        trace!(committed, waiting = deferred.len(), "selection round");
        remaining = deferred;
        if committed == 0 {
            break;
        }
    }

    (accepted, utxo_set)
}

/// True when every output the transaction claims exists in the snapshot as it
/// stands, i.e. the transaction is not waiting on another candidate.
fn inputs_available(tx: &Transaction, utxo_set: &UtxoSet) -> bool {
    tx.inputs
        .iter()
        .all(|input| utxo_set.contains_key(&input.prevout))
}
