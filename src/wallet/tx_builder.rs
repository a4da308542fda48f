// Transaction builder

use crate::core::{Transaction, TxInput, TxOutput};
use crate::crypto::CryptoError;
use crate::storage::{Utxo, UtxoSet};
use crate::wallet::{Address, KeyPair};
use thiserror::Error;

/// Wallet errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Spendable outputs do not cover the requested amount
    #[error("Insufficient funds: have {available}, need {requested}")]
    InsufficientFunds { available: u64, requested: u64 },
    /// Signing an input failed
    #[error("Failed to sign input: {0}")]
    Signing(#[from] CryptoError),
}

/// Transaction builder
pub struct TransactionBuilder<'a> {
    keypair: &'a KeyPair,
    utxo_set: &'a UtxoSet,
}

impl<'a> TransactionBuilder<'a> {
    /// Create a new transaction builder
    pub fn new(keypair: &'a KeyPair, utxo_set: &'a UtxoSet) -> Self {
        Self { keypair, utxo_set }
    }

    /// Build a signed transaction paying `amount` to `to`, with change
    /// back to the sender when the selected outputs exceed it
    pub fn build(&self, to: &Address, amount: u64) -> Result<Transaction, WalletError> {
        let (selected, total) = self.select_utxos(amount)?;

        let mut inputs = Vec::with_capacity(selected.len());
        for utxo in &selected {
            let mut input = TxInput::new(utxo.outpoint.tx_hash, utxo.outpoint.index);
            input.sign(self.keypair.private_key(), self.keypair.compressed_public_key())?;
            inputs.push(input);
        }

        let mut outputs = vec![TxOutput::new(amount, to.clone())];

        let change = total - amount;
        if change > 0 {
            outputs.push(TxOutput::new(change, self.keypair.address().clone()));
        }

        Ok(Transaction::new(inputs, outputs))
    }

    /// Take outputs in scan order, checking the running total after each
    /// one, until it covers `target`. At least one output is always taken.
    /// The total saturates, so change is capped at `u64::MAX - target`.
    fn select_utxos(&self, target: u64) -> Result<(Vec<&'a Utxo>, u64), WalletError> {
        let mut selected = Vec::new();
        let mut total = 0u64;

        for utxo in self.utxo_set.for_address(self.keypair.address()) {
            selected.push(utxo);
            total = total.saturating_add(utxo.output.amount);

            if total >= target {
                return Ok((selected, total));
            }
        }

        Err(WalletError::InsufficientFunds {
            available: total,
            requested: target,
        })
    }

    /// Get balance for the builder's key
    pub fn balance(&self) -> u64 {
        self.utxo_set.balance(self.keypair.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Block, BlockHeader, OutPoint};
    use crate::crypto;

    /// Chain of one block per amount, each paying `address`
    fn utxos_for(address: &Address, amounts: &[u64]) -> UtxoSet {
        let mut blocks = vec![Block::genesis()];
        for (height, amount) in amounts.iter().enumerate() {
            let mut reward = Transaction::reward(address.clone(), height as u64 + 1);
            reward.outputs[0].amount = *amount;
            let prev = blocks.last().map(|b| b.hash()).unwrap_or_default();
            let header = BlockHeader::new(prev, reward.hash(), 0);
            blocks.push(Block::new(header, vec![reward]).unwrap());
        }

        let chain: Vec<&Block> = blocks.iter().rev().collect();
        UtxoSet::from_chain(&chain)
    }

    #[test]
    fn test_transaction_builder() {
        let sender = KeyPair::generate();
        let recipient = KeyPair::generate();
        let utxo_set = utxos_for(sender.address(), &[50]);

        let builder = TransactionBuilder::new(&sender, &utxo_set);
        let tx = builder.build(recipient.address(), 40).unwrap();

        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 2); // Payment + change

        // Verify amounts
        assert_eq!(tx.outputs[0], TxOutput::new(40, recipient.address().clone()));
        assert_eq!(tx.outputs[1], TxOutput::new(10, sender.address().clone()));
        assert!(!tx.is_reward());
    }

    #[test]
    fn test_exact_amount_has_no_change() {
        let sender = KeyPair::generate();
        let recipient = KeyPair::generate();
        let utxo_set = utxos_for(sender.address(), &[50]);

        let tx = TransactionBuilder::new(&sender, &utxo_set)
            .build(recipient.address(), 50)
            .unwrap();

        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.total_output_value(), 50);
    }

    #[test]
    fn test_selection_stops_once_covered() {
        let sender = KeyPair::generate();
        let recipient = KeyPair::generate();
        // Scan order is tip first: 5, then 20, then 30
        let utxo_set = utxos_for(sender.address(), &[30, 20, 5]);

        let builder = TransactionBuilder::new(&sender, &utxo_set);
        assert_eq!(builder.balance(), 55);

        let tx = builder.build(recipient.address(), 24).unwrap();
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.outputs[1].amount, 1);

        let first: Vec<OutPoint> = utxo_set
            .for_address(sender.address())
            .take(2)
            .map(|u| u.outpoint)
            .collect();
        let spent: Vec<OutPoint> = tx.inputs.iter().map(|i| i.outpoint()).collect();
        assert_eq!(spent, first);
    }

    #[test]
    fn test_inputs_are_signed_by_sender() {
        let sender = KeyPair::generate();
        let utxo_set = utxos_for(sender.address(), &[10, 10]);

        let tx = TransactionBuilder::new(&sender, &utxo_set)
            .build(&Address::from_public_key(b"anyone"), 15)
            .unwrap();

        for input in &tx.inputs {
            let proof = input.proof.as_ref().unwrap();
            assert_eq!(proof.public_key, sender.compressed_public_key().to_vec());
            assert!(crypto::verify(&input.to_bytes(), &proof.signature, &proof.public_key));
        }
    }

    #[test]
    fn test_insufficient_funds() {
        let sender = KeyPair::generate();
        let utxo_set = utxos_for(sender.address(), &[50]);

        // Try to send more than available
        let builder = TransactionBuilder::new(&sender, &utxo_set);
        let result = builder.build(&Address::from_public_key(b"anyone"), 51);

        assert_eq!(
            result,
            Err(WalletError::InsufficientFunds {
                available: 50,
                requested: 51
            })
        );
    }

    #[test]
    fn test_empty_wallet_cannot_send_anything() {
        let sender = KeyPair::generate();
        let utxo_set = utxos_for(&Address::from_public_key(b"other"), &[50]);

        let builder = TransactionBuilder::new(&sender, &utxo_set);
        assert!(matches!(
            builder.build(&Address::from_public_key(b"anyone"), 0),
            Err(WalletError::InsufficientFunds { available: 0, requested: 0 })
        ));
    }

    #[test]
    fn test_selection_total_saturates() {
        let sender = KeyPair::generate();
        // Tip first: 50, then u64::MAX
        let utxo_set = utxos_for(sender.address(), &[u64::MAX, 50]);

        let builder = TransactionBuilder::new(&sender, &utxo_set);
        assert_eq!(builder.balance(), u64::MAX);

        let tx = builder.build(&Address::from_public_key(b"anyone"), 60).unwrap();
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.outputs[0].amount, 60);
        assert_eq!(tx.outputs[1].amount, u64::MAX - 60);
    }
}
