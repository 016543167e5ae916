//! Consensus constants for the block forest

/// Maximum height distance between the best tip and a retained forest root.
/// Headers older than this can no longer be extended to reach the best chain
/// and are pruned, which bounds memory regardless of total chain length.
pub const CUT_OFF_AGE: u64 = 10;

/// Height assigned to a genesis block
pub const GENESIS_HEIGHT: u64 = 1;
