// Network-level errors

use crate::consensus::MiningError;
use crate::core::Hash256;
use crate::wallet::WalletError;
use thiserror::Error;

/// Errors surfaced by the simulated network and its nodes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("A node labelled '{0}' already exists")]
    DuplicateLabel(String),
    #[error("No node labelled '{0}'")]
    UnknownLabel(String),
    #[error("Cannot connect node '{0}' to itself")]
    SelfConnection(String),
    #[error("Node '{0}' cannot be linked to the relay")]
    RelayConnection(String),
    #[error("Node '{0}' cannot send to itself")]
    SelfTransfer(String),
    #[error("Node '{0}' is not a miner")]
    NotAMiner(String),
    #[error("Block {0} not found")]
    BlockNotFound(Hash256),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Mining(#[from] MiningError),
}
