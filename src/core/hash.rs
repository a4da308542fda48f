// Hashing utilities

use sha2::{Sha256, Digest};
use crate::core::Hash256;

/// Single SHA256 hash. Transaction hashes, Merkle nodes, block hashes and
/// signature digests all use one pass.
pub fn sha256(data: &[u8]) -> Hash256 {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    Hash256::new(result)
}

/// SHA256 double hash, used for base58check checksums
/// double_sha256 = SHA256(SHA256(data))
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first_hash = Sha256::digest(data);
    sha256(&first_hash)
}

/// RIPEMD160(SHA256(data)) - used for address generation
pub fn hash160(data: &[u8]) -> [u8; 20] {
    use ripemd::{Ripemd160, Digest as RipemdDigest};
    let sha = Sha256::digest(data);
    let ripemd = Ripemd160::digest(sha);
    let mut result = [0u8; 20];
    result.copy_from_slice(&ripemd);
    result
}

/// SHA256 over the concatenation of two hashes (Merkle tree node)
pub fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left.as_bytes());
    combined[32..].copy_from_slice(right.as_bytes());
    sha256(&combined)
}
