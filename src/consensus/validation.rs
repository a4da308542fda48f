// Transaction validation against a node's block store

use crate::core::{Hash256, Transaction};
use crate::crypto;
use crate::storage::BlockStore;
use crate::wallet::Address;
use thiserror::Error;

/// Validation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input references a transaction that no stored block carries
    #[error("Input {input} references unknown transaction {tx_hash}")]
    MissingPreviousTransaction { input: usize, tx_hash: Hash256 },
    /// Input references an output index past the end of the transaction
    #[error("Input {input} references output {index} but the transaction has {available}")]
    OutputIndexOutOfRange {
        input: usize,
        index: u32,
        available: usize,
    },
    /// Input carries no signature or public key
    #[error("Input {input} is not signed")]
    UnsignedInput { input: usize },
    /// Embedded public key does not hash to the address being spent
    #[error("Input {input} key belongs to {actual}, output is locked to {expected}")]
    AddressMismatch {
        input: usize,
        expected: Address,
        actual: Address,
    },
    /// Signature does not verify against the embedded public key
    #[error("Input {input} has an invalid signature")]
    InvalidSignature { input: usize },
}

/// Verify a transaction's inputs against the blocks in `store`.
///
/// Reward transactions (no inputs, one output) are valid by construction.
/// A transaction that carries a reward height but spends outputs is checked
/// like any other. For every input the referenced transaction may sit on
/// any branch the store holds. Output values and double spends are not
/// checked here.
pub fn verify_transaction(tx: &Transaction, store: &BlockStore) -> Result<(), ValidationError> {
    if tx.is_reward() {
        return Ok(());
    }

    for (input_index, input) in tx.inputs.iter().enumerate() {
        let previous = store.find_transaction(&input.prev_tx_hash).ok_or(
            ValidationError::MissingPreviousTransaction {
                input: input_index,
                tx_hash: input.prev_tx_hash,
            },
        )?;

        let output = previous
            .outputs
            .get(input.output_index as usize)
            .ok_or(ValidationError::OutputIndexOutOfRange {
                input: input_index,
                index: input.output_index,
                available: previous.outputs.len(),
            })?;

        let proof = input
            .proof
            .as_ref()
            .ok_or(ValidationError::UnsignedInput { input: input_index })?;

        let signer = Address::from_public_key(&proof.public_key);
        if signer != output.address {
            return Err(ValidationError::AddressMismatch {
                input: input_index,
                expected: output.address.clone(),
                actual: signer,
            });
        }

        if !crypto::verify(&input.to_bytes(), &proof.signature, &proof.public_key) {
            return Err(ValidationError::InvalidSignature { input: input_index });
        }
    }

    Ok(())
}
