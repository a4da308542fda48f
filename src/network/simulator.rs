// In-process network of simulated nodes with synchronous gossip

use crate::config::NetworkConfig;
use crate::consensus::Miner;
use crate::core::{Block, Hash256, Transaction};
use crate::network::{Admission, Message, NetworkError, Node, NodeId};
use crate::wallet::Address;
use std::collections::HashMap;

/// Label reserved for the observer node
pub const RELAY_LABEL: &str = "relay";

/// Arena owning every node, plus the label registry.
///
/// Gossip is delivered depth-first and completes before the call that
/// started it returns. A node forwards an item only after accepting it,
/// which is what stops messages from circulating forever.
///
/// Every node created through the network lists the relay as a peer. The
/// relay has no peers of its own, so it hears everything and forwards
/// nothing; the network-wide queries read from it.
#[derive(Debug)]
pub struct Network {
    config: NetworkConfig,
    nodes: Vec<Node>,
    labels: HashMap<String, NodeId>,
    relay: NodeId,
}

impl Network {
    /// Create a network with the default configuration
    pub fn new() -> Self {
        Self::with_config(NetworkConfig::default())
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        let relay = NodeId(0);
        let mut labels = HashMap::new();
        labels.insert(RELAY_LABEL.to_string(), relay);

        Self {
            config,
            nodes: vec![Node::new(RELAY_LABEL, None)],
            labels,
            relay,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Create a node that can transfer but not mine
    pub fn create_node(&mut self, label: &str) -> Result<NodeId, NetworkError> {
        self.add_node(label, None)
    }

    /// Create a node that can also mine at the configured difficulty
    pub fn create_miner(&mut self, label: &str) -> Result<NodeId, NetworkError> {
        let miner = Miner::new(self.config.target());
        self.add_node(label, Some(miner))
    }

    fn add_node(&mut self, label: &str, miner: Option<Miner>) -> Result<NodeId, NetworkError> {
        if self.labels.contains_key(label) {
            return Err(NetworkError::DuplicateLabel(label.to_string()));
        }

        let id = NodeId(self.nodes.len());
        let mut node = Node::new(label, miner);
        node.add_peer(self.relay);

        log::info!("Created {} ({}) at {}", node, id, node.address());

        self.nodes.push(node);
        self.labels.insert(label.to_string(), id);
        Ok(id)
    }

    /// Link two nodes in both directions. The relay is already a peer of
    /// every node and never gets peers of its own.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<(), NetworkError> {
        if a == b {
            return Err(NetworkError::SelfConnection(a.to_string()));
        }
        let id_a = self.resolve(a)?;
        let id_b = self.resolve(b)?;
        if id_a == self.relay {
            return Err(NetworkError::RelayConnection(b.to_string()));
        }
        if id_b == self.relay {
            return Err(NetworkError::RelayConnection(a.to_string()));
        }

        self.nodes[id_a.0].add_peer(id_b);
        self.nodes[id_b.0].add_peer(id_a);

        log::info!("Connected '{}' <-> '{}'", a, b);
        Ok(())
    }

    /// Build a transfer on `from` and gossip it starting at `from`.
    ///
    /// The admission is the sender's own verdict. Only `Accepted` means the
    /// transaction was queued and gossiped; a repeat of a pending transfer
    /// comes back `AlreadyKnown` and nothing moves.
    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<(Transaction, Admission), NetworkError> {
        if from == to {
            return Err(NetworkError::SelfTransfer(from.to_string()));
        }
        let sender = self.resolve(from)?;
        let recipient = self.address_of(to)?.clone();

        let tx = self.nodes[sender.0].create_transfer(&recipient, amount)?;
        log::info!("'{}' sends {} to '{}' in tx {}", from, amount, to, tx.hash());

        let admission = self.deliver(sender, &Message::Tx(tx.clone()));
        if !admission.is_accepted() {
            log::debug!("Transfer {} not queued by '{}': {:?}", tx.hash(), from, admission);
        }
        Ok((tx, admission))
    }

    /// Hand an externally built transaction to `label` and gossip it if
    /// accepted
    pub fn submit_transaction(&mut self, label: &str, tx: Transaction) -> Result<Admission, NetworkError> {
        let id = self.resolve(label)?;
        Ok(self.deliver(id, &Message::Tx(tx)))
    }

    /// Mine the mempool of `label` and gossip the sealed block, starting
    /// with the miner itself
    pub fn mine(&mut self, label: &str) -> Result<Block, NetworkError> {
        let id = self.resolve(label)?;
        let result = self.nodes[id.0].mine_mempool()?;

        log::info!(
            "'{}' mined block {} with {} transaction(s) in {} attempts ({:.0} H/s)",
            label,
            result.hash,
            result.block.transactions.len(),
            result.attempts,
            result.hash_rate()
        );

        self.deliver(id, &Message::Block(result.block.clone()));
        Ok(result.block)
    }

    /// Depth-first delivery. Accepted items go to every peer, the sender
    /// included; each node's own dedup stops the recursion.
    fn deliver(&mut self, to: NodeId, message: &Message) -> Admission {
        let admission = self.nodes[to.0].receive(message);

        if admission.is_accepted() {
            let peers = self.nodes[to.0].peers().to_vec();
            for peer in peers {
                log::trace!(
                    "'{}' forwards {} {} to '{}'",
                    self.nodes[to.0].label(),
                    message.message_type(),
                    message.hash(),
                    self.nodes[peer.0].label()
                );
                self.deliver(peer, message);
            }
        }

        admission
    }

    fn resolve(&self, label: &str) -> Result<NodeId, NetworkError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| NetworkError::UnknownLabel(label.to_string()))
    }

    /// Look up a node by label
    pub fn node(&self, label: &str) -> Result<&Node, NetworkError> {
        let id = self.resolve(label)?;
        Ok(&self.nodes[id.0])
    }

    /// Look up a node by id
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn address_of(&self, label: &str) -> Result<&Address, NetworkError> {
        Ok(self.node(label)?.address())
    }

    /// Labels of user-created nodes, in creation order
    pub fn labels(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != self.relay.0)
            .map(|(_, node)| node.label())
            .collect()
    }

    /// Label of the node whose wallet owns `address`
    pub fn owner(&self, address: &Address) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.address() == address)
            .map(|node| node.label())
    }

    /// The observer node
    pub fn relay(&self) -> &Node {
        &self.nodes[self.relay.0]
    }

    pub fn current_chain(&self, label: &str) -> Result<Vec<&Block>, NetworkError> {
        Ok(self.node(label)?.current_chain())
    }

    pub fn lookup_block(&self, label: &str, hash: &Hash256) -> Result<&Block, NetworkError> {
        self.node(label)?
            .blocks()
            .get(hash)
            .ok_or(NetworkError::BlockNotFound(*hash))
    }

    /// Search the node's stored blocks; pending mempool entries are not
    /// included
    pub fn lookup_transaction(&self, label: &str, hash: &Hash256) -> Result<Option<&Transaction>, NetworkError> {
        Ok(self.node(label)?.blocks().find_transaction(hash))
    }

    pub fn spendable_amount(&self, label: &str) -> Result<u64, NetworkError> {
        Ok(self.node(label)?.spendable_amount())
    }

    /// Current chain as seen by the relay
    pub fn chain(&self) -> Vec<&Block> {
        self.relay().current_chain()
    }

    /// Any block the relay has heard of
    pub fn block(&self, hash: &Hash256) -> Option<&Block> {
        self.relay().blocks().get(hash)
    }

    /// Any mined transaction the relay has heard of
    pub fn transaction(&self, hash: &Hash256) -> Option<&Transaction> {
        self.relay().blocks().find_transaction(hash)
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}
