//! The prime-field oracle, keyed by curve identity.

use lazy_static::lazy_static;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::constraint_system::SynthesisError;

/// The closed enumeration of supported curve identities.
///
/// Each identity selects the scalar field the circuit is built over.
/// Identity selection is an input to the overall build, not to each
/// operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    Bn254,
    Bls12_381,
    Bls12_377,
    Bw6_761,
}

lazy_static! {
    static ref BN254_R: BigUint = parse(
        "21888242871839275222246405745257275088548364400416034343698204186575808495617"
    );
    static ref BLS12_381_R: BigUint = parse(
        "52435875175126190479447740508185965837690552500527637822603658699938581184513"
    );
    static ref BLS12_377_R: BigUint = parse(
        "8444461749428370424248824938781546531375899335154063827935233455917409239041"
    );
    static ref BW6_761_R: BigUint = parse(
        "258664426012969094010652733694893533536393512754914660539884262666720468348340822774968888139573360124440321458177"
    );
}

fn parse(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 10).expect("malformed modulus literal")
}

impl Curve {
    pub const ALL: [Curve; 4] = [
        Curve::Bn254,
        Curve::Bls12_381,
        Curve::Bls12_377,
        Curve::Bw6_761,
    ];

    /// The order of the curve's scalar field.
    pub fn modulus(&self) -> &'static BigUint {
        match self {
            Curve::Bn254 => &BN254_R,
            Curve::Bls12_381 => &BLS12_381_R,
            Curve::Bls12_377 => &BLS12_377_R,
            Curve::Bw6_761 => &BW6_761_R,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Curve::Bn254 => "bn254",
            Curve::Bls12_381 => "bls12-381",
            Curve::Bls12_377 => "bls12-377",
            Curve::Bw6_761 => "bw6-761",
        }
    }

    /// Look up an identity by name.
    pub fn from_name(name: &str) -> Result<Curve, SynthesisError> {
        Curve::ALL
            .iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| SynthesisError::UnknownCurve(name.to_string()))
    }
}

/// Canonicalize `x` into `[0, p)`.
pub fn normalize(x: &BigInt, p: &BigUint) -> BigUint {
    let p = BigInt::from_biguint(Sign::Plus, p.clone());
    let mut r = x % &p;
    if r.sign() == Sign::Minus {
        r += &p;
    }
    r.to_biguint().expect("residue is non-negative")
}

pub(crate) fn add_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (a + b) % p
}

pub(crate) fn mul_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (a * b) % p
}

pub(crate) fn neg_mod(a: &BigUint, p: &BigUint) -> BigUint {
    if a.is_zero() {
        BigUint::zero()
    } else {
        p - a
    }
}

pub(crate) fn sub_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    add_mod(a, &neg_mod(b, p), p)
}

pub(crate) fn inv_mod(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    a.modinv(p)
}
