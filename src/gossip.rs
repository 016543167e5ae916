//! Round-synchronous transaction relay simulation
//!
//! Independent of the ledger core: peers flood candidate transactions over
//! discrete rounds. The driver owns the round barrier - every peer's
//! broadcast for round N is computed from round N-1 state before any peer
//! processes round N's candidates - which keeps a run deterministic. Peer
//! behavior is a strategy behind [`GossipNode`], not a node subclass.

use std::collections::HashSet;

use crate::types::Transaction;

/// One relayed candidate: which peer index sent it, and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub sender: usize,
    pub tx: Transaction,
}

/// Capability contract for one peer in the relay simulation.
pub trait GossipNode {
    /// Fixes which peer indices this node listens to. Called once, before the
    /// first round.
    fn set_followees(&mut self, followees: &[bool]);

    /// Seeds the initially believed transactions. Called once, before the
    /// first round.
    fn set_pending_transactions(&mut self, pending: HashSet<Transaction>);

    /// The set this node relays this round. On the first round this is
    /// exactly the seeded pending set.
    fn produce_broadcast(&self) -> HashSet<Transaction>;

    /// Folds in this round's incoming candidates.
    fn receive(&mut self, candidates: &[Candidate]);
}

/// A rule-following peer: believes every transaction a followee relays and
/// never drops one, so its belief set grows monotonically toward consensus.
///
/// The simulation parameters (connectivity, malicious share, transaction
/// distribution, round count) are accepted for interface parity across
/// strategies; this strategy needs none of them.
#[derive(Debug, Default)]
pub struct CompliantNode {
    followees: Vec<bool>,
    believed: HashSet<Transaction>,
}

impl CompliantNode {
    pub fn new(
        _graph_density: f64,
        _malicious_ratio: f64,
        _tx_distribution: f64,
        _num_rounds: u32,
    ) -> Self {
        Self::default()
    }
}

impl GossipNode for CompliantNode {
    fn set_followees(&mut self, followees: &[bool]) {
        self.followees = followees.to_vec();
    }

    fn set_pending_transactions(&mut self, pending: HashSet<Transaction>) {
        self.believed = pending;
    }

    fn produce_broadcast(&self) -> HashSet<Transaction> {
        self.believed.clone()
    }

    fn receive(&mut self, candidates: &[Candidate]) {
        for candidate in candidates {
            let followed = self
                .followees
                .get(candidate.sender)
                .copied()
                .unwrap_or(false);
            if followed && !self.believed.contains(&candidate.tx) {
                self.believed.insert(candidate.tx.clone());
            }
        }
    }
}

/// An adversarial peer that goes silent: relays nothing and ignores
/// everything. The simplest strategy that still honors the contract.
#[derive(Debug, Default)]
pub struct WithholdingNode;

impl WithholdingNode {
    pub fn new(
        _graph_density: f64,
        _malicious_ratio: f64,
        _tx_distribution: f64,
        _num_rounds: u32,
    ) -> Self {
        Self
    }
}

impl GossipNode for WithholdingNode {
    fn set_followees(&mut self, _followees: &[bool]) {}

    fn set_pending_transactions(&mut self, _pending: HashSet<Transaction>) {}

    fn produce_broadcast(&self) -> HashSet<Transaction> {
        HashSet::new()
    }

    fn receive(&mut self, _candidates: &[Candidate]) {}
}
