//! Pending-transaction pool shared with external block builders

use std::collections::HashMap;

use crate::types::{Hash, Transaction};

/// The process-wide pool of transactions waiting to be mined. Entries enter
/// unconditionally - validation happens at block acceptance, not here - and
/// leave when a block consuming them is accepted.
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    transactions: HashMap<Hash, Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds unconditionally, replacing any entry with the same id.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.insert(tx.id, tx);
    }

    pub fn remove_transaction(&mut self, id: &Hash) -> Option<Transaction> {
        self.transactions.remove(id)
    }

    pub fn transaction(&self, id: &Hash) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    pub fn contains(&self, id: &Hash) -> bool {
        self.transactions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
