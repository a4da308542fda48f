// Key management

use crate::core::hash160;
use crate::crypto::{
    compress_public_key, generate_keypair, public_key_from_private, CryptoError,
    COMPRESSED_KEY_LEN, UNCOMPRESSED_KEY_LEN,
};
use crate::wallet::Address;

/// Key pair
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: [u8; 32],
    public_key: [u8; UNCOMPRESSED_KEY_LEN],
    compressed: [u8; COMPRESSED_KEY_LEN],
    address: Address,
}

impl KeyPair {
    /// Generate a new key pair
    pub fn generate() -> Self {
        loop {
            let (private_key, public_key) = generate_keypair();
            if let Ok(keypair) = Self::from_parts(private_key, public_key) {
                return keypair;
            }
        }
    }

    /// Create from secret key bytes
    pub fn from_private_key(private_key: &[u8; 32]) -> Result<Self, CryptoError> {
        let public_key = public_key_from_private(private_key)?;
        Self::from_parts(*private_key, public_key)
    }

    fn from_parts(
        private_key: [u8; 32],
        public_key: [u8; UNCOMPRESSED_KEY_LEN],
    ) -> Result<Self, CryptoError> {
        let compressed = compress_public_key(&public_key)?;
        let address = Address::from_public_key(&compressed);

        Ok(Self {
            private_key,
            public_key,
            compressed,
            address,
        })
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// 65-byte `0x04 || x || y` encoding
    pub fn public_key(&self) -> &[u8; UNCOMPRESSED_KEY_LEN] {
        &self.public_key
    }

    /// 33-byte compressed encoding, the form embedded in signed inputs
    pub fn compressed_public_key(&self) -> &[u8; COMPRESSED_KEY_LEN] {
        &self.compressed
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get pubkey hash
    pub fn pubkey_hash(&self) -> [u8; 20] {
        hash160(&self.compressed)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.compressed))
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
