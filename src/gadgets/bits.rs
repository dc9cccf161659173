//! Binary decomposition and recomposition.

use num_bigint::BigUint;
use num_traits::One;

use crate::constraint_system::{ConstraintSystem, SolvingHint, SynthesisError, R1C};
use crate::lc::{LinearExpression, Term, Variable};

impl ConstraintSystem {
    /// Unpack `a` into `n` bits, little endian (index 0 is the lsb).
    ///
    /// Allocates `n` fresh wires, asserts each boolean, and records the
    /// single constraint `Σ 2ⁱ·bᵢ · 1 = a` tagged with the binary-
    /// decomposition hint so a solver computes the bits from `a`. With
    /// `n = 0` the constraint degenerates to `0 · 1 = a`, satisfiable
    /// only for `a = 0`.
    pub fn to_binary(&mut self, a: &Variable, n: usize) -> Result<Vec<Variable>, SynthesisError> {
        let ac = self.completed(a)?;

        let mut bits = Vec::with_capacity(n);
        for _ in 0..n {
            let bit = self.new_internal();
            self.assert_is_boolean(&bit)?;
            bits.push(bit);
        }

        let mut packed = LinearExpression::zero();
        let mut coeff = BigUint::one();
        for bit in &bits {
            let c = &coeff % self.modulus;
            let id = self.coeffs.intern(c);
            packed.push(Term::new(id, bit.wire().expect("fresh internal has a wire")));
            coeff *= 2u32;
        }
        let packed = self.reduce(packed);

        let mut r1c = R1C::new(packed, self.one.lin_exp.clone(), ac.lin_exp.clone());
        r1c.hint = SolvingHint::BinaryDecomposition;
        self.push_constraint(r1c);

        Ok(bits)
    }

    /// Pack little-endian bits into `Σ 2ⁱ·bᵢ`.
    ///
    /// Purely linear; each bit is additionally asserted boolean. The
    /// empty input packs to the zero constant.
    pub fn from_binary(&mut self, bits: &[Variable]) -> Result<Variable, SynthesisError> {
        let mut raw = LinearExpression::zero();
        let mut coeff = BigUint::one();
        for bit in bits {
            let bc = self.completed(bit)?;
            self.assert_is_boolean(bit)?;
            let c = &coeff % self.modulus;
            let scaled = self.mul_constant(&c, &bc);
            raw.extend_from(&scaled.lin_exp);
            coeff *= 2u32;
        }
        let reduced = self.reduce(raw);
        Ok(Variable::from_lin_exp(reduced))
    }
}
