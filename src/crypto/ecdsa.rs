// Keys, key compression, signing and verification

use primitive_types::U256;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Serialize, Serializer};

use crate::core::sha256;
use crate::crypto::curve::{
    curve_rhs, double_and_add, mod_add, mod_inverse, mod_mul, mod_pow, point_add,
    scalar_multiply, Point, N, P,
};
use crate::crypto::CryptoError;

/// Length of a compressed public key (marker + x)
pub const COMPRESSED_KEY_LEN: usize = 33;
/// Length of an uncompressed public key (0x04 + x + y)
pub const UNCOMPRESSED_KEY_LEN: usize = 65;

/// Signature pair over a message digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub s: U256,
    pub r: U256,
}

impl Signature {
    /// Fixed 64-byte encoding: r || s, both big-endian
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        self.r.to_big_endian(&mut bytes[..32]);
        self.s.to_big_endian(&mut bytes[32..]);
        bytes
    }

    /// Decode the 64-byte r || s form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 64 {
            return Err(CryptoError::InvalidSignature(format!(
                "expected 64 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            r: U256::from_big_endian(&bytes[..32]),
            s: U256::from_big_endian(&bytes[32..]),
        })
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

/// Uniformly random scalar in [1, N-1]
fn random_scalar() -> U256 {
    let mut rng = OsRng;
    let mut bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut bytes);
        let candidate = U256::from_big_endian(&bytes);
        if !candidate.is_zero() && candidate < N {
            return candidate;
        }
    }
}

/// Integer value of SHA256(message)
fn message_digest(message: &[u8]) -> U256 {
    U256::from_big_endian(sha256(message).as_bytes())
}

/// Encode an affine point as 0x04 || x || y
fn encode_uncompressed(x: U256, y: U256) -> [u8; UNCOMPRESSED_KEY_LEN] {
    let mut bytes = [0u8; UNCOMPRESSED_KEY_LEN];
    bytes[0] = 0x04;
    x.to_big_endian(&mut bytes[1..33]);
    y.to_big_endian(&mut bytes[33..]);
    bytes
}

/// Public key (uncompressed) for a 32-byte private key
pub fn public_key_from_private(private_key: &[u8; 32]) -> Result<[u8; UNCOMPRESSED_KEY_LEN], CryptoError> {
    let d = U256::from_big_endian(private_key);
    match scalar_multiply(&Point::generator(), d)? {
        Point::Affine { x, y } => Ok(encode_uncompressed(x, y)),
        Point::Infinity => Err(CryptoError::InvalidScalar),
    }
}

/// Generate a fresh keypair: 32-byte private key, 65-byte uncompressed public key
pub fn generate_keypair() -> ([u8; 32], [u8; UNCOMPRESSED_KEY_LEN]) {
    loop {
        let d = random_scalar();
        if let Point::Affine { x, y } = double_and_add(&Point::generator(), d) {
            let mut private_key = [0u8; 32];
            d.to_big_endian(&mut private_key);
            return (private_key, encode_uncompressed(x, y));
        }
    }
}

/// 65-byte uncompressed key to 33-byte compressed key
pub fn compress_public_key(public_key: &[u8]) -> Result<[u8; COMPRESSED_KEY_LEN], CryptoError> {
    if public_key.len() != UNCOMPRESSED_KEY_LEN || public_key[0] != 0x04 {
        return Err(CryptoError::InvalidPublicKey(
            "uncompressed key must be 0x04 followed by 64 bytes".to_string(),
        ));
    }

    let mut compressed = [0u8; COMPRESSED_KEY_LEN];
    compressed[0] = 0x02 + (public_key[64] & 1);
    compressed[1..].copy_from_slice(&public_key[1..33]);
    Ok(compressed)
}

/// 33-byte compressed key to 65-byte uncompressed key.
///
/// Since p = 3 mod 4, a square root of a is a^((p+1)/4); the root whose
/// parity matches the marker byte is kept.
pub fn decompress_public_key(compressed: &[u8]) -> Result<[u8; UNCOMPRESSED_KEY_LEN], CryptoError> {
    if compressed.len() != COMPRESSED_KEY_LEN {
        return Err(CryptoError::InvalidPublicKey(format!(
            "compressed key must be 33 bytes, got {}",
            compressed.len()
        )));
    }

    let marker = compressed[0];
    if marker != 0x02 && marker != 0x03 {
        return Err(CryptoError::InvalidPublicKey(format!(
            "compressed key must start with 0x02 or 0x03, got {:#04x}",
            marker
        )));
    }

    let x = U256::from_big_endian(&compressed[1..]);
    if x >= P {
        return Err(CryptoError::NotOnCurve);
    }

    let y_squared = curve_rhs(x);
    let exponent = (P + U256::one()) / U256::from(4u8);
    let root = mod_pow(y_squared, exponent, P);
    if mod_mul(root, root, P) != y_squared {
        return Err(CryptoError::NotOnCurve);
    }

    let wants_odd = marker == 0x03;
    let y = if root.bit(0) != wants_odd && !root.is_zero() {
        P - root
    } else {
        root
    };

    Ok(encode_uncompressed(x, y))
}

/// Parse a compressed or uncompressed public key into a curve point
pub fn public_key_point(public_key: &[u8]) -> Result<Point, CryptoError> {
    let uncompressed = match public_key.first() {
        Some(0x02) | Some(0x03) => decompress_public_key(public_key)?,
        Some(0x04) if public_key.len() == UNCOMPRESSED_KEY_LEN => {
            let mut bytes = [0u8; UNCOMPRESSED_KEY_LEN];
            bytes.copy_from_slice(public_key);
            bytes
        }
        _ => {
            return Err(CryptoError::InvalidPublicKey(
                "public key must be 33 bytes (0x02/0x03) or 65 bytes (0x04)".to_string(),
            ))
        }
    };

    let point = Point::Affine {
        x: U256::from_big_endian(&uncompressed[1..33]),
        y: U256::from_big_endian(&uncompressed[33..]),
    };
    if !point.is_on_curve() {
        return Err(CryptoError::NotOnCurve);
    }
    Ok(point)
}

/// Sign SHA256(message) with a fresh random nonce.
///
/// r == 0 or s == 0 is not retried.
pub fn sign(message: &[u8], private_key: &[u8; 32]) -> Result<Signature, CryptoError> {
    let d = U256::from_big_endian(private_key);
    if d.is_zero() || d >= N {
        return Err(CryptoError::InvalidScalar);
    }

    let k = random_scalar();
    let r = match scalar_multiply(&Point::generator(), k)?.x() {
        Some(x) => x % N,
        None => return Err(CryptoError::InvalidScalar),
    };

    let z = message_digest(message) % N;
    let k_inv = mod_inverse(k, N)?;
    let s = mod_mul(k_inv, mod_add(z, mod_mul(r, d, N), N), N);

    Ok(Signature { s, r })
}

/// Verify a signature against a compressed or uncompressed public key
pub fn verify(message: &[u8], signature: &Signature, public_key: &[u8]) -> bool {
    let q = match public_key_point(public_key) {
        Ok(q) => q,
        Err(_) => return false,
    };
    let w = match mod_inverse(signature.s, N) {
        Ok(w) => w,
        Err(_) => return false,
    };

    let u1 = mod_mul(w, message_digest(message), N);
    let u2 = mod_mul(w, signature.r, N);

    let (a, b) = match (
        scalar_multiply(&Point::generator(), u1),
        scalar_multiply(&q, u2),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return false,
    };

    match point_add(&a, &b) {
        Point::Affine { x, .. } => x == signature.r,
        Point::Infinity => false,
    }
}
