//! Interning pool for field coefficients.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Index of a field element in a [`CoeffPool`].
///
/// Ids are dense, starting at zero; the first four are reserved for the
/// canonical coefficients {0, 1, -1, 2} and usable without interning.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoeffId(pub(crate) u32);

impl CoeffId {
    pub const ZERO: CoeffId = CoeffId(0);
    pub const ONE: CoeffId = CoeffId(1);
    pub const MINUS_ONE: CoeffId = CoeffId(2);
    pub const TWO: CoeffId = CoeffId(3);
}

/// Dense table of field elements in `[0, p)`, deduplicated by value.
#[derive(Clone, Debug)]
pub struct CoeffPool {
    coeffs: Vec<BigUint>,
    ids: HashMap<BigUint, CoeffId>,
}

impl CoeffPool {
    /// A pool over the field of order `modulus`, pre-populated with the
    /// reserved coefficients.
    pub fn new(modulus: &BigUint) -> CoeffPool {
        let mut pool = CoeffPool {
            coeffs: Vec::with_capacity(16),
            ids: HashMap::new(),
        };
        pool.insert(BigUint::zero());
        pool.insert(BigUint::one());
        pool.insert(modulus - 1u32);
        pool.insert(BigUint::from(2u32));
        pool
    }

    fn insert(&mut self, value: BigUint) -> CoeffId {
        let id = CoeffId(u32::try_from(self.coeffs.len()).expect("coefficient table overflow"));
        self.ids.insert(value.clone(), id);
        self.coeffs.push(value);
        id
    }

    /// Intern a canonical field element and return its id.
    ///
    /// `value` must already be reduced into `[0, p)`.
    pub fn intern(&mut self, value: BigUint) -> CoeffId {
        match self.ids.get(&value) {
            Some(id) => *id,
            None => self.insert(value),
        }
    }

    /// Total on every id previously returned by the pool.
    pub fn get(&self, id: CoeffId) -> &BigUint {
        &self.coeffs[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// The finished coefficient table, ordered by id.
    pub fn into_table(self) -> Vec<BigUint> {
        self.coeffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    #[test]
    fn test_reserved_ids() {
        let p = Curve::Bn254.modulus();
        let pool = CoeffPool::new(p);

        assert_eq!(pool.len(), 4);
        assert_eq!(pool.get(CoeffId::ZERO), &BigUint::zero());
        assert_eq!(pool.get(CoeffId::ONE), &BigUint::one());
        assert_eq!(pool.get(CoeffId::MINUS_ONE), &(p - 1u32));
        assert_eq!(pool.get(CoeffId::TWO), &BigUint::from(2u32));
    }

    #[test]
    fn test_intern_dedups_by_value() {
        let p = Curve::Bn254.modulus();
        let mut pool = CoeffPool::new(p);

        let a = pool.intern(BigUint::from(42u32));
        let b = pool.intern(BigUint::from(43u32));
        let c = pool.intern(BigUint::from(42u32));

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 6);

        // Reserved values intern back to their reserved ids.
        assert_eq!(pool.intern(BigUint::one()), CoeffId::ONE);
        assert_eq!(pool.intern(p - 1u32), CoeffId::MINUS_ONE);
    }
}
