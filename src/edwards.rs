//! Twisted-Edwards companion-curve parameters, keyed by curve identity.
//!
//! This is a passive, read-only registry: the front-end performs no curve
//! arithmetic, it only hands these constants to gadget code that needs
//! them.

use lazy_static::lazy_static;
use num_bigint::BigUint;

use crate::constraint_system::SynthesisError;
use crate::curve::Curve;

/// Parameters of the twisted-Edwards curve `a·x² + y² = 1 + d·x²·y²`
/// defined over the scalar field of the associated identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdCurve {
    pub a: BigUint,
    pub d: BigUint,
    pub cofactor: BigUint,
    pub order: BigUint,
    pub base_x: BigUint,
    pub base_y: BigUint,
    pub modulus: BigUint,
    pub id: Curve,
}

impl EdCurve {
    /// Look up the registered companion curve for `id`.
    pub fn try_new(id: Curve) -> Result<EdCurve, SynthesisError> {
        match id {
            Curve::Bn254 => Ok(ED_BN254.clone()),
            Curve::Bls12_381 => Ok(ED_BLS12_381.clone()),
            Curve::Bls12_377 => Ok(ED_BLS12_377.clone()),
            Curve::Bw6_761 => Ok(ED_BW6_761.clone()),
        }
    }
}

fn parse(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 10).expect("malformed curve parameter literal")
}

lazy_static! {
    static ref ED_BN254: EdCurve = EdCurve {
        a: parse("168700"),
        d: parse("168696"),
        cofactor: parse("8"),
        order: parse(
            "2736030358979909402780800718157159386076813972158567259200215660948447373041"
        ),
        base_x: parse(
            "5299619240641551281634865583518297030282874472190772894086521144482721001553"
        ),
        base_y: parse(
            "16950150798460657717958625567821834550301663161624707787222815936182638968203"
        ),
        modulus: Curve::Bn254.modulus().clone(),
        id: Curve::Bn254,
    };
    static ref ED_BLS12_381: EdCurve = EdCurve {
        a: Curve::Bls12_381.modulus() - 1u32,
        d: parse(
            "19257038036680949359750312669786877991949435402254120286184196891950884077233"
        ),
        cofactor: parse("8"),
        order: parse(
            "6554484396890773809930967563523245729705921265872317281365359162392183254199"
        ),
        base_x: parse(
            "8076246640662884909881801758704306714034609987455869804520522091855516602923"
        ),
        base_y: parse(
            "13262374693698910701929044844600465831413122818447359594527400194675274060458"
        ),
        modulus: Curve::Bls12_381.modulus().clone(),
        id: Curve::Bls12_381,
    };
    static ref ED_BLS12_377: EdCurve = EdCurve {
        a: Curve::Bls12_377.modulus() - 1u32,
        d: parse("3021"),
        cofactor: parse("4"),
        order: parse(
            "2111115437357092606062206234695386632838870926408408195193685246394721360383"
        ),
        base_x: parse(
            "717051916204163000937139483451426116831771857428389560441264442629694842243"
        ),
        base_y: parse(
            "882565546457454111605105352482086902132191855952243170543452705048019814192"
        ),
        modulus: Curve::Bls12_377.modulus().clone(),
        id: Curve::Bls12_377,
    };
    static ref ED_BW6_761: EdCurve = EdCurve {
        a: Curve::Bw6_761.modulus() - 1u32,
        d: parse("79743"),
        cofactor: parse("8"),
        order: parse(
            "32333053251621136751331591711861691692049189094364332567435817881934511297123972799646723302813083835942624121493"
        ),
        base_x: parse(
            "174701772324485506941690903512423551998294352968833659960042362742684869862495746426366187462669992073196420267127"
        ),
        base_y: parse(
            "208487200052258845495340374451540775445408439654930191324011635560142523886549663106522691296420655144190624954833"
        ),
        modulus: Curve::Bw6_761.modulus().clone(),
        id: Curve::Bw6_761,
    };
}
