// UTXO (Unspent Transaction Output) scan over a chain

use crate::core::{Block, OutPoint, TxOutput};
use crate::wallet::Address;
use std::collections::HashSet;

/// UTXO - the output and where it lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub output: TxOutput,
}

/// Unspent outputs of one chain, in scan order: blocks tip to genesis,
/// transactions and outputs in their stored order
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    entries: Vec<Utxo>,
}

impl UtxoSet {
    /// An output is unspent iff no input anywhere in `chain` references it
    pub fn from_chain(chain: &[&Block]) -> Self {
        let spent: HashSet<OutPoint> = chain
            .iter()
            .flat_map(|block| block.transactions.iter())
            .flat_map(|tx| tx.inputs.iter().map(|input| input.outpoint()))
            .collect();

        let mut entries = Vec::new();
        for block in chain {
            for tx in &block.transactions {
                let tx_hash = tx.hash();
                for (index, output) in tx.outputs.iter().enumerate() {
                    let outpoint = OutPoint::new(tx_hash, index as u32);
                    if !spent.contains(&outpoint) {
                        entries.push(Utxo {
                            outpoint,
                            output: output.clone(),
                        });
                    }
                }
            }
        }

        Self { entries }
    }

    /// Get a UTXO
    pub fn get(&self, outpoint: &OutPoint) -> Option<&Utxo> {
        self.entries.iter().find(|utxo| utxo.outpoint == *outpoint)
    }

    /// Check if a UTXO exists
    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.get(outpoint).is_some()
    }

    /// All UTXOs paying `address`, in scan order
    pub fn for_address<'a>(&'a self, address: &'a Address) -> impl Iterator<Item = &'a Utxo> + 'a {
        self.entries
            .iter()
            .filter(move |utxo| utxo.output.address == *address)
    }

    /// Get balance for an address, saturating at `u64::MAX`
    pub fn balance(&self, address: &Address) -> u64 {
        self.for_address(address)
            .fold(0u64, |total, utxo| total.saturating_add(utxo.output.amount))
    }

    /// All UTXOs
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.entries.iter()
    }

    /// Count total UTXOs
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BlockHeader, Hash256, Transaction, TxInput, REWARD_AMOUNT};

    fn address(label: &str) -> Address {
        Address::from_public_key(label.as_bytes())
    }

    fn block(prev: Hash256, transactions: Vec<Transaction>) -> Block {
        let merkle = Block::calculate_merkle_root(&transactions);
        Block::new(BlockHeader::new(prev, merkle, 0), transactions).unwrap()
    }

    #[test]
    fn test_genesis_utxo() {
        let genesis = Block::genesis();
        let set = UtxoSet::from_chain(&[&genesis]);
        assert_eq!(set.count(), 1);

        let utxo = set.iter().next().unwrap();
        assert_eq!(utxo.output.amount, REWARD_AMOUNT);
        assert_eq!(utxo.outpoint, OutPoint::new(genesis.transactions[0].hash(), 0));
    }

    #[test]
    fn test_spent_outputs_excluded() {
        let alice = address("alice");
        let bob = address("bob");

        let genesis = Block::genesis();
        let reward = Transaction::reward(alice.clone(), 1);
        let b1 = block(genesis.hash(), vec![reward.clone()]);

        let spend = Transaction::new(
            vec![TxInput::new(reward.hash(), 0)],
            vec![TxOutput::new(30, bob.clone()), TxOutput::new(20, alice.clone())],
        );
        let b2 = block(b1.hash(), vec![Transaction::reward(bob.clone(), 2), spend.clone()]);

        let set = UtxoSet::from_chain(&[&b2, &b1, &genesis]);

        assert!(!set.contains(&OutPoint::new(reward.hash(), 0)));
        assert!(set.contains(&OutPoint::new(spend.hash(), 0)));
        assert_eq!(set.balance(&alice), 20);
        assert_eq!(set.balance(&bob), 80);

        // Scan order: tip block first, then outputs in order
        let bob_outputs: Vec<u64> = set.for_address(&bob).map(|u| u.output.amount).collect();
        assert_eq!(bob_outputs, vec![50, 30]);
    }

    #[test]
    fn test_inputs_outside_chain_do_not_spend() {
        let alice = address("alice");
        let genesis = Block::genesis();
        let reward = Transaction::reward(alice.clone(), 1);
        let b1 = block(genesis.hash(), vec![reward]);

        // Only b1 and genesis are in the chain; a spend elsewhere is ignored
        let set = UtxoSet::from_chain(&[&b1, &genesis]);
        assert_eq!(set.balance(&alice), 50);
        assert_eq!(set.balance(&address("nobody")), 0);
    }

    #[test]
    fn test_balance_saturates() {
        let alice = address("alice");
        let genesis = Block::genesis();
        let windfall = Transaction::new(vec![], vec![TxOutput::new(u64::MAX, alice.clone())]);
        let b1 = block(
            genesis.hash(),
            vec![Transaction::reward(alice.clone(), 1), windfall],
        );

        let set = UtxoSet::from_chain(&[&b1, &genesis]);
        assert_eq!(set.for_address(&alice).count(), 2);
        assert_eq!(set.balance(&alice), u64::MAX);
    }
}
