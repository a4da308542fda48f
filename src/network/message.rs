// Gossip messages

use crate::core::{Block, Hash256, Transaction};
use std::fmt;

/// Network message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Block,
    Tx,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Block => "block",
            MessageType::Tx => "tx",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item relayed between peers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Block(Block),
    Tx(Transaction),
}

impl Message {
    /// Get message type
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Block(_) => MessageType::Block,
            Message::Tx(_) => MessageType::Tx,
        }
    }

    /// Hash of the carried block or transaction
    pub fn hash(&self) -> Hash256 {
        match self {
            Message::Block(block) => block.hash(),
            Message::Tx(tx) => tx.hash(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type() {
        let genesis = Block::genesis();
        let reward = genesis.transactions[0].clone();

        let block = Message::Block(genesis.clone());
        let tx = Message::Tx(reward.clone());

        assert_eq!(block.message_type(), MessageType::Block);
        assert_eq!(tx.message_type().to_string(), "tx");
        assert_eq!(block.hash(), genesis.hash());
        assert_eq!(tx.hash(), reward.hash());
    }
}
