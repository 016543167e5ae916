//! Error types for forest construction
//!
//! Expected-invalid input (bad transactions, bad blocks) is never an error:
//! validation signals rejection through [`crate::types::ValidationResult`] and
//! boolean returns. Errors cover only caller-contract violations at
//! construction time.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForestError {
    #[error("genesis block declares parent {0}")]
    GenesisDeclaresParent(String),

    #[error("genesis coinbase must carry exactly one output, found {0}")]
    MalformedGenesisCoinbase(usize),
}

pub type Result<T> = std::result::Result<T, ForestError>;
