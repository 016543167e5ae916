//! # Block-Forest
//!
//! Consensus-critical data path for a minimal proof-of-work blockchain:
//! transaction validation against an unspent-output ledger, maximal mutually
//! valid batch selection for block assembly, and a pruned multi-branch block
//! forest with a bounded-depth fork choice.
//!
//! ## Architecture
//!
//! The crate is layered leaf-first:
//! - [`types`]: the domain model and the unspent-output set
//! - [`transaction`]: pure validation of one transaction against a snapshot
//! - [`selection`]: fixed-point selection of a maximal mutually valid batch
//! - [`forest`]: the pruned block forest, fork choice, and pending pool
//! - [`gossip`]: an independent round-synchronous relay simulation
//!
//! ## Design Principles
//!
//! 1. **Rejection is data, not faults**: malformed or fraudulent transactions
//!    and blocks are routine input, signalled through
//!    [`types::ValidationResult`] and boolean returns - a hostile peer can
//!    never crash the validator.
//! 2. **Pure, synchronous core**: every operation is call-and-return over
//!    owned in-memory structures and always terminates.
//! 3. **Opaque crypto boundary**: signatures are checked through the
//!    [`crypto::SignatureVerifier`] oracle, and identity hashes are supplied
//!    externally and only ever compared.
//! 4. **Bounded memory**: the forest prunes headers older than
//!    [`constants::CUT_OFF_AGE`] below the best tip, trading very old
//!    branches for a footprint independent of chain length.
//!
//! ## Usage
//!
//! ```rust
//! use block_forest::crypto::Secp256k1Verifier;
//! use block_forest::forest::ChainForest;
//! use block_forest::types::{Block, Output, Transaction};
//!
//! let coinbase = Transaction {
//!     id: [7u8; 32],
//!     inputs: vec![],
//!     outputs: vec![Output { value: 25, owner: vec![0x02] }],
//! };
//! let genesis = Block {
//!     hash: [1u8; 32],
//!     prev_hash: None,
//!     coinbase,
//!     transactions: vec![],
//! };
//!
//! let forest = ChainForest::new(genesis, Secp256k1Verifier::new()).unwrap();
//! assert_eq!(forest.best_tip().hash, [1u8; 32]);
//! assert_eq!(forest.best_tip_snapshot().len(), 1);
//! ```

pub mod constants;
pub mod crypto;
pub mod error;
pub mod forest;
pub mod gossip;
pub mod pool;
pub mod selection;
pub mod transaction;
pub mod types;

// Re-export commonly used items
pub use constants::CUT_OFF_AGE;
pub use error::{ForestError, Result};
pub use types::*;
