//! Field arithmetic over variables and constants.

use num_bigint::{BigInt, BigUint};
use num_traits::One;

use crate::constraint_system::{ConstraintSystem, SynthesisError, R1C};
use crate::curve::{mul_mod, neg_mod, normalize};
use crate::lc::{LinearExpression, Operand, Variable, Wire};

impl ConstraintSystem {
    /// Materialize an operand as a variable: constants become expressions
    /// over the one-wire, variables are read through dangling completion.
    pub(crate) fn as_variable(&mut self, op: Operand) -> Result<Variable, SynthesisError> {
        match op {
            Operand::Var(v) => self.completed(&v),
            Operand::Constant(n) => Ok(self.constant_value(&n)),
        }
    }

    fn constant_value(&mut self, n: &BigInt) -> Variable {
        let k = normalize(n, self.modulus);
        if k.is_one() {
            return self.one_wire();
        }
        let id = self.coeffs.intern(k);
        Variable::from_lin_exp(LinearExpression::from_term(crate::lc::Term::new(
            id,
            Wire::ONE,
        )))
    }

    /// Returns (and interns if necessary) a constant variable. The
    /// constant 1 is the cached one-wire variable.
    pub fn constant(&mut self, k: impl Into<Operand>) -> Result<Variable, SynthesisError> {
        self.as_variable(k.into())
    }

    /// Returns `i1 + i2`. Purely linear; no constraint is recorded.
    pub fn add(
        &mut self,
        i1: impl Into<Operand>,
        i2: impl Into<Operand>,
    ) -> Result<Variable, SynthesisError> {
        self.sum([i1.into(), i2.into()])
    }

    /// Returns the sum of all operands; the empty sum is the zero
    /// constant. No constraint is recorded.
    pub fn sum<I>(&mut self, terms: I) -> Result<Variable, SynthesisError>
    where
        I: IntoIterator<Item = Operand>,
    {
        let mut raw = LinearExpression::zero();
        for op in terms {
            let v = self.as_variable(op)?;
            raw.extend_from(&v.lin_exp);
        }
        let reduced = self.reduce(raw);
        Ok(Variable::from_lin_exp(reduced))
    }

    /// Returns `-i`. No constraint is recorded.
    pub fn neg(&mut self, i: impl Into<Operand>) -> Result<Variable, SynthesisError> {
        match i.into() {
            Operand::Var(v) => {
                let v = self.completed(&v)?;
                let negated = self.negate_lin_exp(&v.lin_exp);
                Ok(Variable::from_lin_exp(negated))
            }
            Operand::Constant(n) => {
                let m = -n;
                Ok(self.constant_value(&m))
            }
        }
    }

    /// Returns `i1 - i2` in one reduction, without materializing the
    /// negated intermediate as a separate variable.
    pub fn sub(
        &mut self,
        i1: impl Into<Operand>,
        i2: impl Into<Operand>,
    ) -> Result<Variable, SynthesisError> {
        let a = self.as_variable(i1.into())?;
        let b = self.as_variable(i2.into())?;
        let mut raw = a.lin_exp.clone();
        let negated = self.negate_lin_exp(&b.lin_exp);
        raw.extend_from(&negated);
        let reduced = self.reduce(raw);
        Ok(Variable::from_lin_exp(reduced))
    }

    fn negate_lin_exp(&mut self, le: &LinearExpression) -> LinearExpression {
        let mut out = LinearExpression::zero();
        for term in le.iter() {
            let c = neg_mod(self.coeffs.get(term.coeff_id()), self.modulus);
            let id = self.coeffs.intern(c);
            out.push(term.with_coeff(id));
        }
        out
    }

    /// Scale every coefficient of `v` by `lambda`; no constraint.
    pub(crate) fn mul_constant(&mut self, lambda: &BigUint, v: &Variable) -> Variable {
        let mut out = LinearExpression::zero();
        for term in v.lin_exp.iter() {
            let c = mul_mod(self.coeffs.get(term.coeff_id()), lambda, self.modulus);
            let id = self.coeffs.intern(c);
            out.push(term.with_coeff(id));
        }
        Variable::from_lin_exp(out)
    }

    /// Returns `i1 * i2`.
    ///
    /// Only the variable-by-variable case records a constraint: a fresh
    /// internal wire `z` with `i1 · i2 = z`. Multiplication by a constant
    /// folds into the coefficients, and a product of two constants folds
    /// in the field.
    pub fn mul(
        &mut self,
        i1: impl Into<Operand>,
        i2: impl Into<Operand>,
    ) -> Result<Variable, SynthesisError> {
        self.mul_op(i1.into(), i2.into())
    }

    pub(crate) fn mul_op(&mut self, i1: Operand, i2: Operand) -> Result<Variable, SynthesisError> {
        match (i1, i2) {
            (Operand::Var(a), Operand::Var(b)) => {
                let a = self.completed(&a)?;
                let b = self.completed(&b)?;
                let z = self.new_internal();
                self.push_constraint(R1C::new(
                    a.lin_exp.clone(),
                    b.lin_exp.clone(),
                    z.lin_exp.clone(),
                ));
                Ok(z)
            }
            (Operand::Var(v), Operand::Constant(n)) | (Operand::Constant(n), Operand::Var(v)) => {
                let v = self.completed(&v)?;
                let k = normalize(&n, self.modulus);
                Ok(self.mul_constant(&k, &v))
            }
            (Operand::Constant(n1), Operand::Constant(n2)) => {
                let k = n1 * n2;
                Ok(self.constant_value(&k))
            }
        }
    }

    /// Left-fold product of all operands; the empty product is the
    /// constant 1.
    pub fn product<I>(&mut self, factors: I) -> Result<Variable, SynthesisError>
    where
        I: IntoIterator<Item = Operand>,
    {
        let mut iter = factors.into_iter();
        let mut acc = match iter.next() {
            Some(op) => op,
            None => return self.constant(1u32),
        };
        for op in iter {
            acc = Operand::Var(self.mul_op(acc, op)?);
        }
        self.as_variable(acc)
    }

    /// Returns `z` constrained by `v · z = 1`.
    ///
    /// The constraint is insufficient for `v = 0` (the system becomes
    /// unsatisfiable); callers guard.
    pub fn inverse(&mut self, v: &Variable) -> Result<Variable, SynthesisError> {
        let v = self.completed(v)?;
        let z = self.new_internal();
        self.push_constraint(R1C::new(
            v.lin_exp.clone(),
            z.lin_exp.clone(),
            self.one.lin_exp.clone(),
        ));
        Ok(z)
    }

    /// Returns `z` constrained by `i2 · z = i1`. A zero divisor is the
    /// caller's contract; nothing is signalled at compile time.
    pub fn div(
        &mut self,
        i1: impl Into<Operand>,
        i2: impl Into<Operand>,
    ) -> Result<Variable, SynthesisError> {
        let o = self.as_variable(i1.into())?;
        let l = self.as_variable(i2.into())?;
        let z = self.new_internal();
        self.push_constraint(R1C::new(l.lin_exp, z.lin_exp.clone(), o.lin_exp));
        Ok(z)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rand_core::{RngCore, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use crate::constraint_system::ConstraintSystem;
    use crate::curve::Curve;
    use crate::lc::Operand;

    #[test]
    fn test_add_commutes() {
        let mut rng = XorShiftRng::from_seed([
            0x59, 0x62, 0xbe, 0x3d, 0x76, 0x3d, 0x31, 0x8d, 0x17, 0xdb, 0x37, 0x32, 0x54, 0x06,
            0xbc, 0xe5,
        ]);

        let mut cs = ConstraintSystem::new(Curve::Bls12_381);
        for _ in 0..50 {
            let u = cs.new_internal();
            let v = cs.new_internal();
            let ku = cs.mul(&u, rng.next_u64()).unwrap();
            let kv = cs.mul(&v, rng.next_u64()).unwrap();

            let ab = cs.add(&ku, &kv).unwrap();
            let ba = cs.add(&kv, &ku).unwrap();
            assert_eq!(ab.lin_exp(), ba.lin_exp());
        }
    }

    #[test]
    fn test_add_of_negation_reduces_to_zero() {
        let mut cs = ConstraintSystem::new(Curve::Bn254);
        let v = cs.new_internal();
        let scaled = cs.mul(&v, 1234u64).unwrap();
        let negated = cs.neg(&scaled).unwrap();
        let sum = cs.add(&scaled, &negated).unwrap();
        assert!(sum.lin_exp().is_empty());
    }

    #[test]
    fn test_mul_constant_emits_no_constraint() {
        let mut cs = ConstraintSystem::new(Curve::Bn254);
        let v = cs.new_internal();

        let by_one = cs.mul(1u32, &v).unwrap();
        assert_eq!(by_one.lin_exp(), v.lin_exp());

        let by_zero = cs.mul(0u32, &v).unwrap();
        let reduced = cs.reduce(by_zero.lin_exp().clone());
        assert!(reduced.is_empty());

        let by_negative = cs.mul(BigInt::from(-3), &v).unwrap();
        assert_eq!(by_negative.lin_exp().len(), 1);

        assert_eq!(cs.num_constraints(), 0);
    }

    #[test]
    fn test_mul_of_variables_emits_exactly_one_constraint() {
        let mut cs = ConstraintSystem::new(Curve::Bn254);
        let u = cs.new_internal();
        let v = cs.new_internal();

        let z = cs.mul(&u, &v).unwrap();
        assert_eq!(cs.num_constraints(), 1);
        assert!(z.wire().is_some());

        // Constant folding never touches the constraint list.
        let folded = cs.mul(6u32, 7u32).unwrap();
        assert_eq!(cs.num_constraints(), 1);
        assert!(folded.wire().is_none());
    }

    #[test]
    fn test_constant_one_is_the_one_wire() {
        let mut cs = ConstraintSystem::new(Curve::Bn254);
        let one = cs.constant(1u32).unwrap();
        assert_eq!(one.wire(), cs.one_wire().wire());

        // Other constants are expressions over the one-wire with no
        // backing wire of their own.
        let five = cs.constant(5u32).unwrap();
        assert!(five.wire().is_none());
        assert_eq!(five.lin_exp().len(), 1);
    }

    #[test]
    fn test_empty_sum_is_the_zero_constant() {
        let mut cs = ConstraintSystem::new(Curve::Bn254);
        let zero = cs.sum(Vec::<Operand>::new()).unwrap();
        assert!(zero.lin_exp().is_empty());
    }

    #[test]
    fn test_div_and_inverse_shapes() {
        let mut cs = ConstraintSystem::new(Curve::Bn254);
        let v = cs.new_internal();

        let inv = cs.inverse(&v).unwrap();
        assert_eq!(cs.num_constraints(), 1);
        assert!(inv.wire().is_some());
        let c = &cs.constraints[0];
        assert_eq!(c.l, *v.lin_exp());
        assert_eq!(c.o, *cs.one_wire().lin_exp());

        // 42 / 6 : L = 6, R = z, O = 42.
        let q = cs.div(42u32, 6u32).unwrap();
        assert_eq!(cs.num_constraints(), 2);
        assert!(q.wire().is_some());
    }

    #[test]
    fn test_product_left_fold() {
        let mut cs = ConstraintSystem::new(Curve::Bn254);
        let u = cs.new_internal();
        let v = cs.new_internal();
        let w = cs.new_internal();

        cs.product([(&u).into(), (&v).into(), (&w).into()]).unwrap();
        assert_eq!(cs.num_constraints(), 2);

        let empty = cs.product(Vec::<Operand>::new()).unwrap();
        assert_eq!(empty.wire(), cs.one_wire().wire());
    }
}
