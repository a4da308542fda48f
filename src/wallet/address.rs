// Base58check addresses

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{double_sha256, hash160};

/// Version byte prepended to the public key hash
pub const ADDRESS_VERSION: u8 = 0x00;
/// version (1) + hash160 (20)
pub const PAYLOAD_LEN: usize = 21;
/// payload + 4-byte checksum
const DECODED_LEN: usize = PAYLOAD_LEN + 4;

/// Address decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Character outside the base58 alphabet
    #[error("Invalid base58 string: {0}")]
    InvalidBase58(String),
    /// Decoded value does not fit in 25 bytes
    #[error("Invalid address length: {0} bytes")]
    InvalidLength(usize),
    /// Checksum does not match the payload
    #[error("Checksum does not match for address")]
    ChecksumMismatch,
}

/// Shareable identifier derived from a compressed public key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Encode the address for a public key:
    /// base58(0x00 || hash160(pubkey) || checksum)
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = ADDRESS_VERSION;
        payload[1..].copy_from_slice(&hash160(public_key));
        Self::from_payload(&payload)
    }

    /// Append the checksum to a payload and base58-encode it
    pub fn from_payload(payload: &[u8; PAYLOAD_LEN]) -> Self {
        let checksum = double_sha256(payload);

        let mut full = Vec::with_capacity(DECODED_LEN);
        full.extend_from_slice(payload);
        full.extend_from_slice(&checksum.as_bytes()[..4]);

        // bs58 keeps leading zero bytes as leading '1' characters
        Self(bs58::encode(full).into_string())
    }

    /// Parse and validate an address string
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let address = Self(address.trim().to_string());
        address.decode()?;
        Ok(address)
    }

    /// Decode back to the versioned payload, verifying the checksum
    pub fn decode(&self) -> Result<[u8; PAYLOAD_LEN], AddressError> {
        let raw = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;

        // Re-pad to the fixed width, as if decoding into a 200-bit integer
        let significant = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
        let value = &raw[significant..];
        if value.len() > DECODED_LEN {
            return Err(AddressError::InvalidLength(value.len()));
        }
        let mut full = [0u8; DECODED_LEN];
        full[DECODED_LEN - value.len()..].copy_from_slice(value);

        let (payload, checksum) = full.split_at(PAYLOAD_LEN);
        let expected = double_sha256(payload);
        if checksum != &expected.as_bytes()[..4] {
            return Err(AddressError::ChecksumMismatch);
        }

        let mut result = [0u8; PAYLOAD_LEN];
        result.copy_from_slice(payload);
        Ok(result)
    }

    /// Get address string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bytes committed to by transaction output hashes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn test_known_address() {
        let public_key = hex::decode(G_COMPRESSED).unwrap();
        let address = Address::from_public_key(&public_key);
        assert_eq!(address.as_str(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");

        let payload = address.decode().unwrap();
        assert_eq!(hex::encode(payload), "00751e76e8199196d454941c45d1b3a323f1433bd6");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let public_key = hex::decode(G_COMPRESSED).unwrap();
        assert_eq!(
            Address::from_public_key(&public_key),
            Address::from_public_key(&public_key)
        );
    }

    #[test]
    fn test_genesis_address_decodes() {
        let address = Address::parse("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").unwrap();
        let payload = address.decode().unwrap();
        assert_eq!(payload[0], ADDRESS_VERSION);
        assert_eq!(hex::encode(&payload[1..]), "62e907b15cbf27d5425399ebf6f0fb50ebb88f18");
    }

    #[test]
    fn test_checksum_mismatch() {
        // Last character changed: only the checksum bytes move
        let err = Address::parse("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb").unwrap_err();
        assert_eq!(err, AddressError::ChecksumMismatch);
    }

    #[test]
    fn test_invalid_characters() {
        // '0', 'O', 'I' and 'l' are not in the alphabet
        assert!(matches!(
            Address::parse("1A1zP1eP5QGefi2DMPTfTL5SLmv7Div0Na"),
            Err(AddressError::InvalidBase58(_))
        ));
    }

    #[test]
    fn test_too_long() {
        let long = "z".repeat(40);
        assert!(matches!(Address::parse(&long), Err(AddressError::InvalidLength(_))));
    }

    proptest! {
        #[test]
        fn prop_decode_returns_hash160_payload(public_key in prop::collection::vec(any::<u8>(), 1..70)) {
            let address = Address::from_public_key(&public_key);
            let payload = address.decode().unwrap();
            prop_assert_eq!(payload[0], ADDRESS_VERSION);
            prop_assert_eq!(&payload[1..], &hash160(&public_key)[..]);
        }

        #[test]
        fn prop_mutated_address_fails(
            public_key in prop::collection::vec(any::<u8>(), 33),
            position in 1usize..25,
            replacement in prop::sample::select(b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz".to_vec()),
        ) {
            let address = Address::from_public_key(&public_key);
            let mut chars: Vec<u8> = address.as_str().bytes().collect();
            let position = position % chars.len();
            prop_assume!(chars[position] != replacement);
            chars[position] = replacement;

            let mutated = Address(String::from_utf8(chars).unwrap());
            prop_assert!(mutated.decode().is_err());
        }
    }
}
