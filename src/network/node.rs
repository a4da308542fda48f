// Simulated node - wallet, mempool, block store and optional miner

use crate::consensus::{verify_transaction, Miner, MiningResult, ValidationError};
use crate::core::{Block, Transaction, UnminedBlock};
use crate::network::{Message, NetworkError};
use crate::storage::{BlockStore, Utxo, UtxoSet};
use crate::wallet::{Address, KeyPair, TransactionBuilder, WalletError};
use std::fmt;

/// Index of a node inside its network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of handing a block or transaction to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Stored; the node forwards it to its peers
    Accepted,
    /// Already stored, nothing to do
    AlreadyKnown,
    /// Failed verification and was dropped
    Rejected(ValidationError),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }
}

/// A participant in the simulation
#[derive(Debug, Clone)]
pub struct Node {
    label: String,
    keypair: KeyPair,
    /// Peers this node forwards to; the network owns the nodes themselves
    peers: Vec<NodeId>,
    mempool: Vec<Transaction>,
    blocks: BlockStore,
    miner: Option<Miner>,
}

impl Node {
    /// Create a node with a fresh keypair and a store holding only genesis
    pub fn new(label: impl Into<String>, miner: Option<Miner>) -> Self {
        Self {
            label: label.into(),
            keypair: KeyPair::generate(),
            peers: Vec::new(),
            mempool: Vec::new(),
            blocks: BlockStore::new(),
            miner,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn address(&self) -> &Address {
        self.keypair.address()
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn peers(&self) -> &[NodeId] {
        &self.peers
    }

    /// Pending transactions in arrival order
    pub fn mempool(&self) -> &[Transaction] {
        &self.mempool
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.blocks
    }

    pub fn is_miner(&self) -> bool {
        self.miner.is_some()
    }

    /// Add a peer. Returns false if it was already present.
    pub(crate) fn add_peer(&mut self, peer: NodeId) -> bool {
        if self.peers.contains(&peer) {
            return false;
        }
        self.peers.push(peer);
        true
    }

    /// Dispatch a gossip message to the matching ingestion path
    pub fn receive(&mut self, message: &Message) -> Admission {
        match message {
            Message::Block(block) => self.receive_block(block),
            Message::Tx(tx) => self.receive_transaction(tx),
        }
    }

    /// Verify, dedup against stored blocks and the mempool, then queue
    pub fn receive_transaction(&mut self, tx: &Transaction) -> Admission {
        let tx_hash = tx.hash();

        if let Err(e) = self.verify_transaction(tx) {
            log::debug!("[{}] rejected tx {}: {}", self.label, tx_hash, e);
            return Admission::Rejected(e);
        }

        if self.blocks.contains_transaction(&tx_hash)
            || self.mempool.iter().any(|pending| pending.hash() == tx_hash)
        {
            log::debug!("[{}] already knows tx {}", self.label, tx_hash);
            return Admission::AlreadyKnown;
        }

        self.mempool.push(tx.clone());
        Admission::Accepted
    }

    /// Store any block not seen before. Proof-of-work and contents are
    /// not checked.
    pub fn receive_block(&mut self, block: &Block) -> Admission {
        if !self.blocks.insert(block.clone()) {
            log::debug!("[{}] already knows block {}", self.label, block.hash());
            return Admission::AlreadyKnown;
        }
        Admission::Accepted
    }

    /// Check a transaction's inputs against this node's blocks
    pub fn verify_transaction(&self, tx: &Transaction) -> Result<(), ValidationError> {
        verify_transaction(tx, &self.blocks)
    }

    /// The tip block
    pub fn latest_block(&self) -> Option<&Block> {
        self.blocks.latest_block()
    }

    /// Blocks from the tip back to genesis
    pub fn current_chain(&self) -> Vec<&Block> {
        self.blocks.current_chain()
    }

    /// UTXO view of this node's current chain
    pub fn utxo_set(&self) -> UtxoSet {
        UtxoSet::from_chain(&self.current_chain())
    }

    /// Unspent outputs paying this node, in scan order
    pub fn unspent_outputs(&self) -> Vec<Utxo> {
        self.utxo_set().for_address(self.address()).cloned().collect()
    }

    pub fn spendable_amount(&self) -> u64 {
        self.utxo_set().balance(self.address())
    }

    /// Build and sign a transfer from this node's unspent outputs. The
    /// transaction is not queued; hand it to the ingestion path to do so.
    pub fn create_transfer(&self, to: &Address, amount: u64) -> Result<Transaction, WalletError> {
        let utxo_set = self.utxo_set();
        TransactionBuilder::new(&self.keypair, &utxo_set).build(to, amount)
    }

    /// Mine the whole mempool on top of the current tip and clear it.
    ///
    /// The sealed block is returned rather than stored so the caller can
    /// deliver it through the normal ingestion path.
    pub fn mine_mempool(&mut self) -> Result<MiningResult, NetworkError> {
        let miner = self
            .miner
            .as_ref()
            .ok_or_else(|| NetworkError::NotAMiner(self.label.clone()))?;

        let height = self.current_chain().len() as u64;
        let unmined = UnminedBlock::new(self.mempool.clone(), self.blocks.tip());
        let result = miner.mine(unmined, self.address().clone(), height)?;

        self.mempool.clear();
        Ok(result)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = if self.is_miner() { "Miner" } else { "Basic" };
        write!(f, "{} Node: {}", kind, self.label)
    }
}
