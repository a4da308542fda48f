// Consensus and validation logic

pub mod pow;
pub mod validation;

pub use pow::{search_nonce, Miner, MiningError, MiningResult, NonceSearch, Target, DEFAULT_DIFFICULTY_BITS};
pub use validation::{verify_transaction, ValidationError};
