// Per-node block store and longest-chain selection

use crate::core::{Block, Hash256, Transaction};
use std::collections::HashMap;

/// Append-only map from block hash to block, seeded with genesis.
///
/// Blocks are stored whether or not their ancestry is known; chain
/// selection only considers blocks whose walk reaches genesis.
#[derive(Debug, Clone)]
pub struct BlockStore {
    blocks: HashMap<Hash256, Block>,
    genesis_hash: Hash256,
}

impl BlockStore {
    /// Create a store holding only the genesis block
    pub fn new() -> Self {
        let genesis = Block::genesis();
        let genesis_hash = genesis.hash();
        let mut blocks = HashMap::new();
        blocks.insert(genesis_hash, genesis);

        Self {
            blocks,
            genesis_hash,
        }
    }

    /// Store a block. Returns false if a block with the same hash is
    /// already present (the store is left untouched).
    pub fn insert(&mut self, block: Block) -> bool {
        let hash = block.hash();
        if self.blocks.contains_key(&hash) {
            return false;
        }
        self.blocks.insert(hash, block);
        true
    }

    /// Get a block by hash
    pub fn get(&self, hash: &Hash256) -> Option<&Block> {
        self.blocks.get(hash)
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.blocks.contains_key(hash)
    }

    /// Number of stored blocks, on any branch
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All stored blocks in unspecified order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn genesis_hash(&self) -> Hash256 {
        self.genesis_hash
    }

    /// Number of blocks from `hash` back to genesis inclusive, or None if
    /// the walk hits a block this store does not hold
    pub fn chain_length(&self, hash: &Hash256) -> Option<usize> {
        let mut length = 0;
        let mut current = self.blocks.get(hash)?;

        loop {
            length += 1;
            if current.is_genesis() {
                return Some(length);
            }
            current = self.blocks.get(&current.header.prev_hash)?;
        }
    }

    /// Hash of the block with the strictly longest chain to genesis.
    ///
    /// Equal-length candidates keep whichever was evaluated first; the
    /// evaluation order is the map's iteration order, so ties are not
    /// deterministic across nodes.
    pub fn tip(&self) -> Hash256 {
        let mut best = self.genesis_hash;
        let mut best_length = 1;

        for hash in self.blocks.keys() {
            if let Some(length) = self.chain_length(hash) {
                if length > best_length {
                    best = *hash;
                    best_length = length;
                }
            }
        }

        best
    }

    /// The tip block
    pub fn latest_block(&self) -> Option<&Block> {
        self.blocks.get(&self.tip())
    }

    /// Blocks from `hash` back to genesis, tip first
    pub fn chain_from(&self, hash: &Hash256) -> Vec<&Block> {
        let mut chain = Vec::new();
        let mut next = self.blocks.get(hash);

        while let Some(block) = next {
            chain.push(block);
            if block.is_genesis() {
                break;
            }
            next = self.blocks.get(&block.header.prev_hash);
        }

        chain
    }

    /// The canonical chain, tip first
    pub fn current_chain(&self) -> Vec<&Block> {
        self.chain_from(&self.tip())
    }

    /// Find a transaction anywhere in the store, on any branch
    pub fn find_transaction(&self, tx_hash: &Hash256) -> Option<&Transaction> {
        self.blocks
            .values()
            .find_map(|block| block.find_transaction(tx_hash))
    }

    /// Check if any stored block carries the transaction
    pub fn contains_transaction(&self, tx_hash: &Hash256) -> bool {
        self.find_transaction(tx_hash).is_some()
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new()
    }
}
