// Transaction data structures

use serde::{Serialize, Serializer};

use crate::core::{sha256, Hash256, OutPoint};
use crate::crypto::{self, CryptoError, Signature};
use crate::wallet::Address;

/// Amount paid by every reward transaction
pub const REWARD_AMOUNT: u64 = 50;

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Unlocking data attached to a signed input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendProof {
    /// Signature over prev_tx_hash || output_index
    pub signature: Signature,
    /// Spender's compressed public key
    #[serde(serialize_with = "serialize_hex")]
    pub public_key: Vec<u8>,
}

/// Transaction input - references a previous transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxInput {
    /// Hash of the previous transaction
    pub prev_tx_hash: Hash256,
    /// Index of the output in the previous transaction
    pub output_index: u32,
    /// Signature and public key, once signed
    pub proof: Option<SpendProof>,
}

impl TxInput {
    /// Create a new unsigned input
    pub fn new(prev_tx_hash: Hash256, output_index: u32) -> Self {
        Self {
            prev_tx_hash,
            output_index,
            proof: None,
        }
    }

    /// The output this input spends
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.prev_tx_hash, self.output_index)
    }

    /// Bytes that are hashed and signed: prev_tx_hash (32) || index (4, big-endian)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(36);
        buf.extend_from_slice(self.prev_tx_hash.as_bytes());
        buf.extend_from_slice(&self.output_index.to_be_bytes());
        buf
    }

    /// Sign the input and attach the compressed public key
    pub fn sign(&mut self, private_key: &[u8; 32], public_key: &[u8]) -> Result<(), CryptoError> {
        let signature = crypto::sign(&self.to_bytes(), private_key)?;
        self.proof = Some(SpendProof {
            signature,
            public_key: public_key.to_vec(),
        });
        Ok(())
    }

    /// Whether a proof has been attached
    pub fn is_signed(&self) -> bool {
        self.proof.is_some()
    }
}

/// Transaction output - amount and recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutput {
    /// Amount in the minimal coin unit
    pub amount: u64,
    /// Destination address
    pub address: Address,
}

impl TxOutput {
    /// Create a new transaction output
    pub fn new(amount: u64, address: Address) -> Self {
        Self { amount, address }
    }

    /// amount (8, big-endian) || address characters
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + self.address.as_bytes().len());
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(self.address.as_bytes());
        buf
    }
}

/// Transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Transaction inputs
    pub inputs: Vec<TxInput>,
    /// Transaction outputs
    pub outputs: Vec<TxOutput>,
    /// Height of the block paying this reward; None for ordinary transfers
    pub reward_height: Option<u64>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            inputs,
            outputs,
            reward_height: None,
        }
    }

    /// Create a reward transaction (no inputs, one output of REWARD_AMOUNT)
    pub fn reward(address: Address, height: u64) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: vec![TxOutput::new(REWARD_AMOUNT, address)],
            reward_height: Some(height),
        }
    }

    /// A reward carries a height, spends nothing and pays exactly one output.
    /// A height on any other shape does not make it one.
    pub fn is_reward(&self) -> bool {
        self.reward_height.is_some() && self.inputs.is_empty() && self.outputs.len() == 1
    }

    /// Concatenated input bytes followed by output bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for input in &self.inputs {
            buf.extend_from_slice(&input.to_bytes());
        }
        for output in &self.outputs {
            buf.extend_from_slice(&output.to_bytes());
        }
        buf
    }

    /// Transaction hash. Reward transactions also bind their block height
    /// (as a 32-byte big-endian integer) so equal rewards at different
    /// heights hash differently.
    pub fn hash(&self) -> Hash256 {
        let mut bytes = self.to_bytes();
        if let Some(height) = self.reward_height {
            let mut padded = [0u8; 32];
            padded[24..].copy_from_slice(&height.to_be_bytes());
            bytes.extend_from_slice(&padded);
        }
        sha256(&bytes)
    }

    /// Calculate total output value, saturating at `u64::MAX`
    pub fn total_output_value(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |total, out| total.saturating_add(out.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{compress_public_key, generate_keypair, verify};

    fn address(label: &str) -> Address {
        Address::from_public_key(label.as_bytes())
    }

    #[test]
    fn test_input_bytes() {
        let input = TxInput::new(Hash256::new([7; 32]), 258);
        let bytes = input.to_bytes();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..32], &[7; 32]);
        assert_eq!(&bytes[32..], &[0, 0, 1, 2]);
    }

    #[test]
    fn test_output_bytes() {
        let output = TxOutput::new(50, Address("1abc".to_string()));
        let bytes = output.to_bytes();
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 50]);
        assert_eq!(&bytes[8..], b"1abc");
    }

    #[test]
    fn test_hash_covers_inputs_then_outputs() {
        let input = TxInput::new(Hash256::new([1; 32]), 0);
        let output = TxOutput::new(10, address("bob"));
        let tx = Transaction::new(vec![input.clone()], vec![output.clone()]);

        let mut expected = input.to_bytes();
        expected.extend_from_slice(&output.to_bytes());
        assert_eq!(tx.hash(), sha256(&expected));
    }

    #[test]
    fn test_signature_not_part_of_hash() {
        let (private_key, public_key) = generate_keypair();
        let compressed = compress_public_key(&public_key).unwrap();

        let unsigned = Transaction::new(
            vec![TxInput::new(Hash256::new([3; 32]), 1)],
            vec![TxOutput::new(5, address("carol"))],
        );
        let mut signed = unsigned.clone();
        signed.inputs[0].sign(&private_key, &compressed).unwrap();

        assert!(signed.inputs[0].is_signed());
        assert!(!unsigned.inputs[0].is_signed());
        assert_eq!(signed.hash(), unsigned.hash());
    }

    #[test]
    fn test_input_signature_verifies() {
        let (private_key, public_key) = generate_keypair();
        let compressed = compress_public_key(&public_key).unwrap();

        let mut input = TxInput::new(Hash256::new([9; 32]), 0);
        input.sign(&private_key, &compressed).unwrap();

        let proof = input.proof.as_ref().unwrap();
        assert_eq!(proof.public_key, compressed.to_vec());
        assert!(verify(&input.to_bytes(), &proof.signature, &proof.public_key));
    }

    #[test]
    fn test_reward_transaction() {
        let tx = Transaction::reward(address("miner"), 3);
        assert!(tx.is_reward());
        assert!(tx.inputs.is_empty());
        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.total_output_value(), REWARD_AMOUNT);
    }

    #[test]
    fn test_reward_hash_binds_height() {
        let at_one = Transaction::reward(address("miner"), 1);
        let at_two = Transaction::reward(address("miner"), 2);
        assert_ne!(at_one.hash(), at_two.hash());

        let mut expected = at_one.to_bytes();
        let mut height = [0u8; 32];
        height[31] = 1;
        expected.extend_from_slice(&height);
        assert_eq!(at_one.hash(), sha256(&expected));
    }

    #[test]
    fn test_reward_differs_from_plain_transfer() {
        let reward = Transaction::reward(address("miner"), 0);
        let plain = Transaction::new(vec![], reward.outputs.clone());
        assert_eq!(reward.to_bytes(), plain.to_bytes());
        assert_ne!(reward.hash(), plain.hash());
        assert!(!plain.is_reward());
    }

    #[test]
    fn test_height_alone_does_not_make_a_reward() {
        let mut spend = Transaction::new(
            vec![TxInput::new(Hash256::new([4; 32]), 0)],
            vec![TxOutput::new(REWARD_AMOUNT, address("mallory"))],
        );
        spend.reward_height = Some(7);
        assert!(!spend.is_reward());

        let mut split = Transaction::reward(address("miner"), 1);
        split.outputs.push(TxOutput::new(1, address("other")));
        assert!(!split.is_reward());
    }

    #[test]
    fn test_total_output_value_saturates() {
        let tx = Transaction::new(
            vec![],
            vec![TxOutput::new(u64::MAX, address("a")), TxOutput::new(1, address("b"))],
        );
        assert_eq!(tx.total_output_value(), u64::MAX);
    }
}
