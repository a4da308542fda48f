// Proof-of-work ledger simulator
//
// Every node keeps its own replica of the ledger; blocks and transactions
// travel between nodes by synchronous gossip inside one process.

pub mod cli;
pub mod config;
pub mod consensus;
pub mod core;
pub mod crypto;
pub mod network;
pub mod storage;
pub mod wallet;

// Re-exports for convenience
pub use cli::{Cli, CliHandler};
pub use config::NetworkConfig;
pub use consensus::{Miner, MiningError, Target, ValidationError};
pub use crate::core::{Block, BlockHeader, Hash256, OutPoint, Transaction, TxInput, TxOutput};
pub use crypto::CryptoError;
pub use network::{Admission, Network, NetworkError, Node, NodeId};
pub use storage::{BlockStore, Utxo, UtxoSet};
pub use wallet::{Address, KeyPair, WalletError};
