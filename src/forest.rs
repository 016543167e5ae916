//! Pruned multi-branch block forest
//!
//! Blocks form a forest rather than a list because competing branches coexist
//! until one outgrows the others. Each retained node owns the full
//! unspent-output snapshot for its chain position, so extending any branch is
//! a lookup, not a replay. To keep that affordable, headers (forest roots)
//! that fall more than [`CUT_OFF_AGE`] below the best tip are pruned and their
//! children promoted to roots: memory stays proportional to the cutoff window
//! times the branching factor, never to total chain length. The trade is that
//! a block arriving for a pruned branch is unreconstructable and is rejected
//! exactly like a block with an unknown parent.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::{CUT_OFF_AGE, GENESIS_HEIGHT};
use crate::crypto::SignatureVerifier;
use crate::error::{ForestError, Result};
use crate::pool::TransactionPool;
use crate::selection::select_transactions;
use crate::transaction::apply_transaction;
use crate::types::*;

/// One retained block. The snapshot is owned exclusively by the node; the
/// children are identity references into the arena, not owned subtrees.
#[derive(Debug, Clone)]
struct BlockNode {
    block: Block,
    height: u64,
    children: Vec<Hash>,
    snapshot: UtxoSet,
}

/// The block forest: an arena of nodes keyed by block hash, a root list, the
/// best tip, and the process-wide pending-transaction pool.
///
/// Single-threaded by design: every operation is call-and-return over owned
/// memory. Under concurrency, inserts must be serialized with each other and
/// with reads, because pruning rewrites the arena and root list.
pub struct ChainForest<V> {
    nodes: HashMap<Hash, BlockNode>,
    headers: Vec<Hash>,
    best_tip: Hash,
    pool: TransactionPool,
    verifier: V,
}

impl<V: SignatureVerifier> ChainForest<V> {
    /// Creates a forest holding just `genesis` at height [`GENESIS_HEIGHT`],
    /// with a snapshot containing exactly the genesis coinbase output.
    ///
    /// The genesis block is trusted, not validated; only its shape is checked,
    /// since a genesis that declares a parent or carries a malformed coinbase
    /// cannot anchor a forest at all.
    pub fn new(genesis: Block, verifier: V) -> Result<Self> {
        if let Some(parent) = genesis.prev_hash {
            return Err(ForestError::GenesisDeclaresParent(hex::encode(parent)));
        }
        if genesis.coinbase.outputs.len() != 1 {
            return Err(ForestError::MalformedGenesisCoinbase(
                genesis.coinbase.outputs.len(),
            ));
        }

        let mut snapshot = UtxoSet::new();
        apply_transaction(&genesis.coinbase, &mut snapshot);

        let hash = genesis.hash;
        let node = BlockNode {
            block: genesis,
            height: GENESIS_HEIGHT,
            children: Vec::new(),
            snapshot,
        };
        let mut nodes = HashMap::new();
        nodes.insert(hash, node);

        Ok(Self {
            nodes,
            headers: vec![hash],
            best_tip: hash,
            pool: TransactionPool::new(),
            verifier,
        })
    }

    /// The block of the highest node. Equal heights keep the incumbent, so
    /// among tied branches the earliest-inserted tip wins.
    pub fn best_tip(&self) -> &Block {
        &self.best_node().block
    }

    /// An independent copy of the best tip's snapshot, safe for callers to
    /// mutate while assembling a block on top of it.
    pub fn best_tip_snapshot(&self) -> UtxoSet {
        self.best_node().snapshot.clone()
    }

    /// Adds `block` on top of its declared parent.
    ///
    /// Returns false, leaving the forest untouched, when the block declares no
    /// parent (a second genesis), or when the parent hash matches no active
    /// node - a truly unknown parent and an already-pruned one are
    /// indistinguishable and both mean the block cannot be placed. A block is
    /// also rejected whole if any of its proposed transactions fails selection
    /// against the parent snapshot: partial blocks are not accepted.
    ///
    /// On success the new node owns the post-block snapshot (selection result
    /// plus the coinbase output), accepted transactions leave the pending
    /// pool, the best tip moves if the new height strictly exceeds it, and
    /// out-of-window headers are pruned.
    pub fn insert(&mut self, block: Block) -> bool {
        let parent_hash = match block.prev_hash {
            Some(hash) => hash,
            None => {
                debug!(block = %short_hash(&block.hash), "insert rejected: block claims to be a genesis");
                return false;
            }
        };

        let (parent_height, parent_snapshot) = match self.nodes.get(&parent_hash) {
            Some(parent) => (parent.height, &parent.snapshot),
            None => {
                debug!(
                    block = %short_hash(&block.hash),
                    parent = %short_hash(&parent_hash),
                    "insert rejected: parent is not an active node"
                );
                return false;
            }
        };

        // All or nothing: if the selector cannot take every proposed
        // transaction, the block is invalid as a whole.
        let (accepted, mut snapshot) =
            select_transactions(&block.transactions, parent_snapshot, &self.verifier);
        if accepted.len() != block.transactions.len() {
            debug!(
                block = %short_hash(&block.hash),
                proposed = block.transactions.len(),
                accepted = accepted.len(),
                "insert rejected: transactions are not mutually valid"
            );
            return false;
        }

        // The coinbase is not part of selection; credit its output now.
        apply_transaction(&block.coinbase, &mut snapshot);

        for tx in &accepted {
            self.pool.remove_transaction(&tx.id);
        }

        let height = parent_height + 1;
        let hash = block.hash;
        self.nodes.insert(
            hash,
            BlockNode {
                block,
                height,
                children: Vec::new(),
                snapshot,
            },
        );
        if let Some(parent) = self.nodes.get_mut(&parent_hash) {
            parent.children.push(hash);
        }

        if height > self.max_height() {
            debug!(tip = %short_hash(&hash), height, "new best tip");
            self.best_tip = hash;
        }

        self.prune();
        true
    }

    /// Appends to the pending pool, unconditionally; transactions are only
    /// validated when a block proposing them is inserted.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.pool.add_transaction(tx);
    }

    /// The pending pool, for external block builders choosing candidates.
    pub fn transaction_pool(&self) -> &TransactionPool {
        &self.pool
    }

    /// Number of retained (not yet pruned) block nodes.
    pub fn active_block_count(&self) -> usize {
        self.nodes.len()
    }

    /// True while the block is retained; pruned blocks are gone for good.
    pub fn is_active(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    /// Current forest roots: the true genesis until it is pruned, then the
    /// promoted children of pruned headers.
    pub fn headers(&self) -> &[Hash] {
        &self.headers
    }

    fn max_height(&self) -> u64 {
        self.best_node().height
    }

    fn best_node(&self) -> &BlockNode {
        // The best tip has maximal height, so it sits above every prune
        // cutoff and never leaves the arena.
        self.nodes
            .get(&self.best_tip)
            .expect("best tip node is retained")
    }

    /// Removes every header that can no longer be extended to reach the best
    /// tip within the cutoff window, promoting its children to roots.
    ///
    /// Single pass: promoted children are appended to the rebuilt root list
    /// but not re-examined. Heights grow by one per insert while the cutoff
    /// moves at most one per insert, so a promoted child is at worst exactly
    /// at the cutoff and a second cut in the same pass cannot arise.
    fn prune(&mut self) {
        let cutoff = self.max_height().saturating_sub(CUT_OFF_AGE);

        let headers = std::mem::take(&mut self.headers);
        for header in headers {
            let expired = match self.nodes.get(&header) {
                Some(node) => node.height < cutoff,
                None => false,
            };
            if !expired {
                self.headers.push(header);
                continue;
            }
            if let Some(node) = self.nodes.remove(&header) {
                debug!(
                    header = %short_hash(&header),
                    height = node.height,
                    cutoff,
                    promoted = node.children.len(),
                    "pruned header"
                );
                self.headers.extend(node.children);
            }
        }
    }
}

fn short_hash(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CUT_OFF_AGE;
    use crate::types::Value;

    /// Test oracle: a signature is good iff it equals payload ++ owner bytes.
    struct StubVerifier;

    impl SignatureVerifier for StubVerifier {
        fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
            let expected = [message, owner].concat();
            signature == expected.as_slice()
        }
    }

    fn coinbase(id_byte: u8, value: Value, owner: &[u8]) -> Transaction {
        Transaction {
            id: [id_byte; 32],
            inputs: vec![],
            outputs: vec![Output { value, owner: owner.to_vec() }],
        }
    }

    fn genesis() -> Block {
        Block {
            hash: [1; 32],
            prev_hash: None,
            coinbase: coinbase(200, 25, b"alice"),
            transactions: vec![],
        }
    }

    fn empty_block(hash_byte: u8, parent: Hash, coinbase_id: u8) -> Block {
        Block {
            hash: [hash_byte; 32],
            prev_hash: Some(parent),
            coinbase: coinbase(coinbase_id, 25, b"miner"),
            transactions: vec![],
        }
    }

    fn signed_spend(
        id_byte: u8,
        claims: &[(Hash, u32)],
        outputs: &[(Value, &[u8])],
        owner: &[u8],
    ) -> Transaction {
        let mut tx = Transaction {
            id: [id_byte; 32],
            inputs: claims
                .iter()
                .map(|(txid, index)| Input {
                    prevout: OutPoint { txid: *txid, index: *index },
                    signature: vec![],
                })
                .collect(),
            outputs: outputs
                .iter()
                .map(|(value, owner)| Output { value: *value, owner: owner.to_vec() })
                .collect(),
        };
        for index in 0..tx.inputs.len() {
            let signature = [tx.signing_payload(index).as_slice(), owner].concat();
            tx.inputs[index].signature = signature;
        }
        tx
    }

    fn forest() -> ChainForest<StubVerifier> {
        ChainForest::new(genesis(), StubVerifier).unwrap()
    }

    #[test]
    fn test_genesis_forest() {
        let forest = forest();

        assert_eq!(forest.best_tip().hash, [1; 32]);
        assert_eq!(forest.active_block_count(), 1);

        let snapshot = forest.best_tip_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get(&OutPoint { txid: [200; 32], index: 0 }).map(|o| o.value),
            Some(25)
        );
    }

    #[test]
    fn test_new_rejects_genesis_with_parent() {
        let mut bad = genesis();
        bad.prev_hash = Some([9; 32]);

        assert!(matches!(
            ChainForest::new(bad, StubVerifier),
            Err(ForestError::GenesisDeclaresParent(_))
        ));
    }

    #[test]
    fn test_new_rejects_malformed_coinbase() {
        let mut bad = genesis();
        bad.coinbase.outputs.push(Output { value: 1, owner: b"alice".to_vec() });

        assert!(matches!(
            ChainForest::new(bad, StubVerifier),
            Err(ForestError::MalformedGenesisCoinbase(2))
        ));
    }

    #[test]
    fn test_insert_extends_chain() {
        let mut forest = forest();

        assert!(forest.insert(empty_block(2, [1; 32], 201)));
        assert_eq!(forest.best_tip().hash, [2; 32]);
        assert_eq!(forest.active_block_count(), 2);
        // The child's snapshot holds both coinbase outputs.
        assert_eq!(forest.best_tip_snapshot().len(), 2);
    }

    #[test]
    fn test_insert_rejects_second_genesis() {
        let mut forest = forest();
        let impostor = Block {
            hash: [3; 32],
            prev_hash: None,
            coinbase: coinbase(202, 25, b"mallory"),
            transactions: vec![],
        };

        assert!(!forest.insert(impostor));
        assert_eq!(forest.active_block_count(), 1);
        assert_eq!(forest.best_tip().hash, [1; 32]);
    }

    #[test]
    fn test_insert_rejects_unknown_parent() {
        let mut forest = forest();

        assert!(!forest.insert(empty_block(3, [77; 32], 202)));
        assert_eq!(forest.active_block_count(), 1);
    }

    #[test]
    fn test_insert_applies_transactions_and_drains_pool() {
        let mut forest = forest();
        let spend = signed_spend(50, &[([200; 32], 0)], &[(15, b"bob"), (5, b"carol")], b"alice");
        forest.add_transaction(spend.clone());
        assert_eq!(forest.transaction_pool().len(), 1);

        let block = Block {
            hash: [2; 32],
            prev_hash: Some([1; 32]),
            coinbase: coinbase(201, 25, b"miner"),
            transactions: vec![spend],
        };
        assert!(forest.insert(block));

        assert!(forest.transaction_pool().is_empty());
        let snapshot = forest.best_tip_snapshot();
        // Genesis coinbase consumed; two spend outputs plus the new coinbase.
        assert!(!snapshot.contains_key(&OutPoint { txid: [200; 32], index: 0 }));
        assert_eq!(snapshot.len(), 3);
        assert_eq!(
            snapshot.get(&OutPoint { txid: [50; 32], index: 0 }).map(|o| o.value),
            Some(15)
        );
        assert_eq!(
            snapshot.get(&OutPoint { txid: [201; 32], index: 0 }).map(|o| o.value),
            Some(25)
        );
    }

    #[test]
    fn test_insert_rejects_partially_valid_block_whole() {
        let mut forest = forest();
        let winner = signed_spend(50, &[([200; 32], 0)], &[(20, b"bob")], b"alice");
        let double_spend = signed_spend(51, &[([200; 32], 0)], &[(20, b"carol")], b"alice");
        forest.add_transaction(winner.clone());
        forest.add_transaction(double_spend.clone());

        let block = Block {
            hash: [2; 32],
            prev_hash: Some([1; 32]),
            coinbase: coinbase(201, 25, b"miner"),
            transactions: vec![winner, double_spend],
        };

        assert!(!forest.insert(block));
        assert_eq!(forest.active_block_count(), 1);
        assert_eq!(forest.best_tip().hash, [1; 32]);
        // Rejection leaves the pending pool alone.
        assert_eq!(forest.transaction_pool().len(), 2);
    }

    #[test]
    fn test_equal_height_keeps_earlier_tip() {
        let mut forest = forest();

        assert!(forest.insert(empty_block(2, [1; 32], 201)));
        assert!(forest.insert(empty_block(3, [1; 32], 202)));

        // Same height: the incumbent stays.
        assert_eq!(forest.best_tip().hash, [2; 32]);

        // A strictly higher block on the other branch takes over.
        assert!(forest.insert(empty_block(4, [3; 32], 203)));
        assert_eq!(forest.best_tip().hash, [4; 32]);
    }

    #[test]
    fn test_best_tip_snapshot_is_independent() {
        let forest = forest();

        let mut copy = forest.best_tip_snapshot();
        copy.clear();

        assert_eq!(forest.best_tip_snapshot().len(), 1);
    }

    #[test]
    fn test_pruning_bounds_chain_memory() {
        let mut forest = forest();

        let mut parent = [1u8; 32];
        for i in 0..30u8 {
            let block = empty_block(10 + i, parent, 100 + i);
            parent = block.hash;
            assert!(forest.insert(block));
            assert!(forest.active_block_count() <= (CUT_OFF_AGE + 1) as usize);
        }

        // Steady state: exactly the cutoff window survives.
        assert_eq!(forest.active_block_count(), (CUT_OFF_AGE + 1) as usize);
        assert!(!forest.is_active(&[1; 32]));
    }

    #[test]
    fn test_insert_rejects_block_on_pruned_ancestor() {
        let mut forest = forest();

        let mut parent = [1u8; 32];
        for i in 0..15u8 {
            let block = empty_block(10 + i, parent, 100 + i);
            parent = block.hash;
            assert!(forest.insert(block));
        }
        assert!(!forest.is_active(&[1; 32]));

        // Extending the pruned genesis is indistinguishable from an unknown
        // parent and fails without touching the forest.
        let count = forest.active_block_count();
        assert!(!forest.insert(empty_block(90, [1; 32], 250)));
        assert_eq!(forest.active_block_count(), count);
    }

    #[test]
    fn test_pruned_header_promotes_children() {
        let mut forest = forest();

        // A sibling branch off genesis, then a main chain long enough to
        // push genesis out of the window.
        assert!(forest.insert(empty_block(9, [1; 32], 99)));

        let mut parent = [1u8; 32];
        for i in 0..11u8 {
            let block = empty_block(10 + i, parent, 100 + i);
            parent = block.hash;
            assert!(forest.insert(block));
        }

        // Best height is now 12: genesis (height 1) fell below the cutoff and
        // both of its children were promoted to roots.
        assert!(!forest.is_active(&[1; 32]));
        assert!(forest.is_active(&[9; 32]));
        assert!(forest.headers().contains(&[9; 32]));
        assert!(forest.headers().contains(&[10; 32]));

        // One more block pushes the cutoff past the stranded sibling: it is
        // now a header below the window and gets cut in the next pass.
        assert!(forest.insert(empty_block(30, parent, 130)));
        assert!(!forest.is_active(&[9; 32]));
        assert!(!forest.headers().contains(&[9; 32]));
    }
}
