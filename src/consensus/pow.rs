// Proof of Work implementation

use crate::core::{Block, BlockError, BlockHeader, Hash256, UnminedBlock};
use crate::wallet::Address;
use primitive_types::U256;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Leading zero bits required by default (and by the genesis block)
pub const DEFAULT_DIFFICULTY_BITS: u32 = 8;

/// Mining errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiningError {
    /// The staged block could not be turned into a header or sealed
    #[error(transparent)]
    Block(#[from] BlockError),
    /// No nonce in the 32-bit space met the target
    #[error("No nonce satisfies the target")]
    NonceSpaceExhausted,
}

/// Difficulty target: a 256-bit threshold with `bits` leading zero bits
/// and every other bit set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    threshold: U256,
}

impl Target {
    /// Create a target requiring `bits` leading zero bits
    pub fn from_leading_zero_bits(bits: u32) -> Self {
        let threshold = if bits >= 256 {
            U256::zero()
        } else {
            U256::MAX >> bits as usize
        };
        Self { threshold }
    }

    /// Threshold as a big-endian hash
    pub fn to_hash256(&self) -> Hash256 {
        let mut bytes = [0u8; 32];
        self.threshold.to_big_endian(&mut bytes);
        Hash256::new(bytes)
    }

    /// Check if a hash meets this target (hash <= target, big-endian)
    pub fn is_met_by(&self, hash: &Hash256) -> bool {
        U256::from_big_endian(hash.as_bytes()) <= self.threshold
    }

    /// Count leading zero bits in target (difficulty indicator)
    pub fn leading_zeros(&self) -> u32 {
        self.threshold.leading_zeros()
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::from_leading_zero_bits(DEFAULT_DIFFICULTY_BITS)
    }
}

/// Outcome of a nonce search over one header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceSearch {
    /// The nonce that was found
    pub nonce: u32,
    /// The resulting hash
    pub hash: Hash256,
    /// Number of attempts
    pub attempts: u64,
}

/// Scan nonces (start + i) mod 2^32 for i in [0, 2^32), stopping at the
/// first header hash that meets the target
pub fn search_nonce(header: &mut BlockHeader, target: &Target, start: u32) -> Option<NonceSearch> {
    let started = Instant::now();

    for i in 0..=u32::MAX {
        header.nonce = start.wrapping_add(i);
        let hash = header.hash();
        let attempts = u64::from(i) + 1;

        if target.is_met_by(&hash) {
            return Some(NonceSearch {
                nonce: header.nonce,
                hash,
                attempts,
            });
        }

        // Progress indicator every 100k attempts
        if attempts % 100_000 == 0 {
            let elapsed = started.elapsed();
            log::debug!("Mining attempts: {} ({:.1} KH/s)",
                attempts,
                attempts as f64 / elapsed.as_secs_f64() / 1000.0
            );
        }
    }

    None
}

/// Proof of Work miner
#[derive(Debug, Clone)]
pub struct Miner {
    /// Fixed difficulty target
    pub target: Target,
}

impl Miner {
    /// Create a new miner with fixed difficulty
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    /// Attach the reward for `reward_address` at `height`, then search for a
    /// nonce from a random starting point and seal the block
    pub fn mine(
        &self,
        mut unmined: UnminedBlock,
        reward_address: Address,
        height: u64,
    ) -> Result<MiningResult, MiningError> {
        let started = Instant::now();

        unmined.attach_reward(reward_address, height)?;
        let mut header = unmined.header_template()?;

        let start = rand::random::<u32>();
        let found = search_nonce(&mut header, &self.target, start)
            .ok_or(MiningError::NonceSpaceExhausted)?;

        let block = unmined.seal(header)?;
        Ok(MiningResult {
            block,
            hash: found.hash,
            attempts: found.attempts,
            duration: started.elapsed(),
        })
    }

    /// Verify that a block header satisfies PoW
    pub fn verify(&self, header: &BlockHeader) -> bool {
        self.target.is_met_by(&header.hash())
    }
}

impl Default for Miner {
    fn default() -> Self {
        Self::new(Target::default())
    }
}

/// Mining result
#[derive(Debug, Clone)]
pub struct MiningResult {
    /// The sealed block
    pub block: Block,
    /// The block hash
    pub hash: Hash256,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        self.attempts as f64 / self.duration.as_secs_f64()
    }
}
