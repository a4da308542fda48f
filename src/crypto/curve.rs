// secp256k1 field and point arithmetic
//
// Curve: y^2 = x^3 + 7 over F_p. All values are 256-bit unsigned integers;
// products are widened to 512 bits before reduction.

use primitive_types::{U256, U512};
use crate::crypto::CryptoError;

/// Field prime p = 2^256 - 2^32 - 977
pub const P: U256 = U256([
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// Order of the generator point
pub const N: U256 = U256([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// Generator x coordinate
pub const GX: U256 = U256([
    0x59F2_815B_16F8_1798,
    0x029B_FCDB_2DCE_28D9,
    0x55A0_6295_CE87_0B07,
    0x79BE_667E_F9DC_BBAC,
]);

/// Generator y coordinate
pub const GY: U256 = U256([
    0x9C47_D08F_FB10_D4B8,
    0xFD17_B448_A685_5419,
    0x5DA4_FBFC_0E11_08A8,
    0x483A_DA77_26A3_C465,
]);

/// Curve constant b
const B: u64 = 7;

/// Truncate a 512-bit value known to be below 2^256
fn narrow(value: U512) -> U256 {
    U256([value.0[0], value.0[1], value.0[2], value.0[3]])
}

/// (a + b) mod m
pub fn mod_add(a: U256, b: U256, m: U256) -> U256 {
    let sum = U512::from(a) + U512::from(b);
    narrow(sum % U512::from(m))
}

/// (a - b) mod m, for a and b already reduced mod m
pub fn mod_sub(a: U256, b: U256, m: U256) -> U256 {
    if a >= b {
        a - b
    } else {
        m - (b - a)
    }
}

/// (a * b) mod m
pub fn mod_mul(a: U256, b: U256, m: U256) -> U256 {
    narrow(a.full_mul(b) % U512::from(m))
}

/// base^exp mod m (square and multiply, most significant bit first)
pub fn mod_pow(base: U256, exp: U256, m: U256) -> U256 {
    let base = base % m;
    let mut result = U256::one() % m;
    for i in (0..exp.bits()).rev() {
        result = mod_mul(result, result, m);
        if exp.bit(i) {
            result = mod_mul(result, base, m);
        }
    }
    result
}

/// Modular inverse by the extended Euclidean algorithm.
///
/// Bezout coefficients are tracked modulo `modulus` so the whole
/// computation stays unsigned.
pub fn mod_inverse(a: U256, modulus: U256) -> Result<U256, CryptoError> {
    let mut low = a % modulus;
    if low.is_zero() {
        return Err(CryptoError::NotInvertible);
    }

    let mut high = modulus;
    let mut lm = U256::one();
    let mut hm = U256::zero();

    while low > U256::one() {
        let ratio = high / low;
        let nm = mod_sub(hm, mod_mul(lm, ratio, modulus), modulus);
        let new = high % low;
        hm = lm;
        lm = nm;
        high = low;
        low = new;
    }

    // gcd(a, modulus) != 1
    if low.is_zero() {
        return Err(CryptoError::NotInvertible);
    }

    Ok(lm % modulus)
}

/// Right-hand side of the curve equation: x^3 + 7 mod p
pub fn curve_rhs(x: U256) -> U256 {
    let x3 = mod_mul(mod_mul(x, x, P), x, P);
    mod_add(x3, U256::from(B), P)
}

/// A point on the curve, or the point at infinity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Point {
    /// Group identity
    Infinity,
    /// Affine coordinates
    Affine { x: U256, y: U256 },
}

impl Point {
    /// The fixed base point G
    pub fn generator() -> Self {
        Point::Affine { x: GX, y: GY }
    }

    /// x coordinate, None at infinity
    pub fn x(&self) -> Option<U256> {
        match self {
            Point::Infinity => None,
            Point::Affine { x, .. } => Some(*x),
        }
    }

    /// Check that the coordinates satisfy y^2 = x^3 + 7
    pub fn is_on_curve(&self) -> bool {
        match *self {
            Point::Infinity => true,
            Point::Affine { x, y } => {
                x < P && y < P && mod_mul(y, y, P) == curve_rhs(x)
            }
        }
    }

    /// Additive inverse (x, -y)
    pub fn negate(&self) -> Self {
        match *self {
            Point::Infinity => Point::Infinity,
            Point::Affine { x, y } => Point::Affine { x, y: mod_sub(U256::zero(), y, P) },
        }
    }
}

/// P + Q
pub fn point_add(p: &Point, q: &Point) -> Point {
    let (x1, y1, x2, y2) = match (*p, *q) {
        (Point::Infinity, _) => return *q,
        (_, Point::Infinity) => return *p,
        (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => (x1, y1, x2, y2),
    };

    if x1 == x2 {
        if y1 == y2 {
            return point_double(p);
        }
        return Point::Infinity;
    }

    // x2 - x1 is nonzero here
    let inv = match mod_inverse(mod_sub(x2, x1, P), P) {
        Ok(inv) => inv,
        Err(_) => return Point::Infinity,
    };
    let lambda = mod_mul(mod_sub(y2, y1, P), inv, P);

    let x3 = mod_sub(mod_sub(mod_mul(lambda, lambda, P), x1, P), x2, P);
    let y3 = mod_sub(mod_mul(lambda, mod_sub(x1, x3, P), P), y1, P);
    Point::Affine { x: x3, y: y3 }
}

/// 2P
pub fn point_double(p: &Point) -> Point {
    let (x, y) = match *p {
        Point::Infinity => return Point::Infinity,
        Point::Affine { x, y } => (x, y),
    };

    if y.is_zero() {
        return Point::Infinity;
    }

    let inv = match mod_inverse(mod_add(y, y, P), P) {
        Ok(inv) => inv,
        Err(_) => return Point::Infinity,
    };
    let three_x2 = mod_mul(U256::from(3u8), mod_mul(x, x, P), P);
    let lambda = mod_mul(three_x2, inv, P);

    let x3 = mod_sub(mod_mul(lambda, lambda, P), mod_add(x, x, P), P);
    let y3 = mod_sub(mod_mul(lambda, mod_sub(x, x3, P), P), y, P);
    Point::Affine { x: x3, y: y3 }
}

/// Double-and-add over the bits of k, k already validated
pub(crate) fn double_and_add(point: &Point, k: U256) -> Point {
    if k.is_zero() {
        return Point::Infinity;
    }

    let mut result = *point;
    for i in (0..k.bits() - 1).rev() {
        result = point_double(&result);
        if k.bit(i) {
            result = point_add(&result, point);
        }
    }
    result
}

/// k * P for k in [1, N-1]
pub fn scalar_multiply(point: &Point, k: U256) -> Result<Point, CryptoError> {
    if k.is_zero() || k >= N {
        return Err(CryptoError::InvalidScalar);
    }
    Ok(double_and_add(point, k))
}
