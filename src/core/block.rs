// Block data structures

use serde::Serialize;
use thiserror::Error;

use crate::core::{hash_pair, sha256, Hash256, Transaction};
use crate::wallet::Address;

/// Recipient of the genesis reward
pub const GENESIS_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
/// Nonce sealing the genesis header under the default 8-bit target
pub const GENESIS_NONCE: u32 = 3_719_336_634;

/// Block construction errors. These are programming errors, not traffic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// A block must carry at least one transaction
    #[error("A mined block requires at least one transaction")]
    NoTransactions,
    /// Second reward transaction attached to an unmined block
    #[error("A block can only contain one reward transaction")]
    DuplicateReward,
    /// Header requested before the reward transaction was attached
    #[error("A minable block must contain a reward transaction")]
    MissingReward,
}

/// Block header - 68 bytes when hashed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    /// Hash of the previous block (zero for genesis)
    pub prev_hash: Hash256,
    /// Merkle root of all transaction hashes in the block
    pub merkle_root: Hash256,
    /// Nonce for proof-of-work
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a new block header
    pub fn new(prev_hash: Hash256, merkle_root: Hash256, nonce: u32) -> Self {
        Self {
            prev_hash,
            merkle_root,
            nonce,
        }
    }

    /// prev_hash (32) || merkle_root (32) || nonce (4, big-endian)
    pub fn to_bytes(&self) -> [u8; 68] {
        let mut buf = [0u8; 68];
        buf[..32].copy_from_slice(self.prev_hash.as_bytes());
        buf[32..64].copy_from_slice(self.merkle_root.as_bytes());
        buf[64..].copy_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    /// Calculate the hash of this block header
    pub fn hash(&self) -> Hash256 {
        sha256(&self.to_bytes())
    }
}

/// Merkle root over a list of hashes.
///
/// Adjacent hashes are paired left to right; an odd last hash is paired
/// with itself. A single hash is its own root.
pub fn merkle_root(hashes: &[Hash256]) -> Hash256 {
    if hashes.is_empty() {
        return Hash256::zero();
    }

    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                [last] => hash_pair(last, last),
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }

    level[0]
}

/// Sealed block - header and transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Block header
    pub header: BlockHeader,
    /// Transactions in this block
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a new block
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Result<Self, BlockError> {
        if transactions.is_empty() {
            return Err(BlockError::NoTransactions);
        }
        Ok(Self {
            header,
            transactions,
        })
    }

    /// The hard-coded genesis block every node starts from
    pub fn genesis() -> Self {
        let reward = Transaction::reward(Address(GENESIS_ADDRESS.to_string()), 0);
        let header = BlockHeader::new(Hash256::zero(), reward.hash(), GENESIS_NONCE);

        Self {
            header,
            transactions: vec![reward],
        }
    }

    /// Calculate Merkle root from transactions
    pub fn calculate_merkle_root(transactions: &[Transaction]) -> Hash256 {
        let hashes: Vec<Hash256> = transactions.iter().map(|tx| tx.hash()).collect();
        merkle_root(&hashes)
    }

    /// Get the block hash
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.header.prev_hash.is_zero()
    }

    /// Find a transaction by hash
    pub fn find_transaction(&self, tx_hash: &Hash256) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.hash() == *tx_hash)
    }
}

/// Staging area for a block that still has to be mined
#[derive(Debug, Clone)]
pub struct UnminedBlock {
    transactions: Vec<Transaction>,
    prev_hash: Hash256,
    has_reward: bool,
}

impl UnminedBlock {
    /// Stage transactions on top of `prev_hash`
    pub fn new(transactions: Vec<Transaction>, prev_hash: Hash256) -> Self {
        Self {
            transactions,
            prev_hash,
            has_reward: false,
        }
    }

    /// Prepend the reward transaction. Only one may be attached.
    pub fn attach_reward(&mut self, address: Address, height: u64) -> Result<(), BlockError> {
        if self.has_reward {
            return Err(BlockError::DuplicateReward);
        }
        self.transactions.insert(0, Transaction::reward(address, height));
        self.has_reward = true;
        Ok(())
    }

    /// Header with merkle root filled in and nonce zero
    pub fn header_template(&self) -> Result<BlockHeader, BlockError> {
        if !self.has_reward {
            return Err(BlockError::MissingReward);
        }
        Ok(BlockHeader::new(
            self.prev_hash,
            Block::calculate_merkle_root(&self.transactions),
            0,
        ))
    }

    /// Staged transactions, reward first once attached
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn prev_hash(&self) -> Hash256 {
        self.prev_hash
    }

    /// Seal with a header whose nonce has been found
    pub fn seal(self, header: BlockHeader) -> Result<Block, BlockError> {
        if !self.has_reward {
            return Err(BlockError::MissingReward);
        }
        Block::new(header, self.transactions)
    }
}
