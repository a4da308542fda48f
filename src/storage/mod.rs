// Storage layer: per-node block store and UTXO scan

mod block_store;
mod utxo_set;

pub use block_store::BlockStore;
pub use utxo_set::{Utxo, UtxoSet};
