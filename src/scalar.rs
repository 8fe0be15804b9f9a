use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

use ark_ff::{BigInt, BigInteger, One, PrimeField, Zero};

/// Prime-field element the constraint system is written over.
///
/// Both engines bring their own scalar field: BN254's `Fr` for Groth16 and
/// ristretto255's `Scalar` for Spartan. Circuit code only needs ring
/// operations and a canonical 32-byte little-endian encoding.
pub trait FieldElement:
    Copy
    + Debug
    + Eq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + From<u64>
{
    /// Short name of the field, used in logs.
    const NAME: &'static str;

    fn zero() -> Self;

    fn one() -> Self;

    fn to_bytes_le(&self) -> [u8; 32];

    /// Returns `None` for non-canonical encodings (value >= modulus).
    fn from_bytes_le(bytes: &[u8; 32]) -> Option<Self>;
}

impl FieldElement for ark_bn254::Fr {
    const NAME: &'static str = "bn254-fr";

    fn zero() -> Self {
        <Self as Zero>::zero()
    }

    fn one() -> Self {
        <Self as One>::one()
    }

    fn to_bytes_le(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        let bytes = self.into_bigint().to_bytes_le();
        out[..bytes.len()].copy_from_slice(&bytes);
        out
    }

    fn from_bytes_le(bytes: &[u8; 32]) -> Option<Self> {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
        }
        Self::from_bigint(BigInt::new(limbs))
    }
}

impl FieldElement for curve25519_dalek::Scalar {
    const NAME: &'static str = "ristretto255-scalar";

    fn zero() -> Self {
        Self::ZERO
    }

    fn one() -> Self {
        Self::ONE
    }

    fn to_bytes_le(&self) -> [u8; 32] {
        self.to_bytes()
    }

    fn from_bytes_le(bytes: &[u8; 32]) -> Option<Self> {
        Option::from(Self::from_canonical_bytes(*bytes))
    }
}

pub fn from_i64<F: FieldElement>(x: i64) -> F {
    let x_abs = x.unsigned_abs();
    if x < 0 {
        -F::from(x_abs)
    } else {
        F::from(x_abs)
    }
}

/// Human-readable rendering: decimal when the value fits in a `u128`,
/// big-endian hex otherwise.
pub fn render<F: FieldElement>(x: &F) -> String {
    let bytes = x.to_bytes_le();
    if bytes[16..].iter().all(|b| *b == 0) {
        let mut low = [0u8; 16];
        low.copy_from_slice(&bytes[..16]);
        return u128::from_le_bytes(low).to_string();
    }
    let mut be = bytes;
    be.reverse();
    format!("0x{}", hex::encode(be))
}
