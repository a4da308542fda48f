// Elliptic-curve cryptography over secp256k1

pub mod curve;
mod ecdsa;

use thiserror::Error;

pub use curve::{mod_inverse, point_add, point_double, scalar_multiply, Point, N, P};
pub use ecdsa::{
    compress_public_key, decompress_public_key, generate_keypair, public_key_from_private,
    public_key_point, sign, verify, Signature, COMPRESSED_KEY_LEN, UNCOMPRESSED_KEY_LEN,
};

/// Errors from curve arithmetic and key handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Scalar is zero or not below the group order
    #[error("Invalid scalar: must be in [1, N-1]")]
    InvalidScalar,
    /// Value has no inverse modulo the given modulus
    #[error("Value is not invertible")]
    NotInvertible,
    /// Malformed public key encoding
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    /// Coordinates do not satisfy the curve equation
    #[error("Point is not on the curve")]
    NotOnCurve,
    /// Malformed signature encoding
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}
