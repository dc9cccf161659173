//! Comparisons: is-zero, conditional selection and range checks.

use std::panic::Location;

use num_bigint::BigUint;

use crate::constraint_system::{ConstraintSystem, LogEntry, SynthesisError, R1C};
use crate::curve::normalize;
use crate::lc::{Operand, Variable};

/// Field-independent bit width of the range-check decompositions.
const RANGE_BITS: usize = 256;
const WORD_SIZE: usize = 64;
const NB_WORDS: usize = RANGE_BITS / WORD_SIZE;

impl ConstraintSystem {
    /// Returns 1 if `a` is zero, 0 otherwise, as `1 - a^(p-1)`.
    ///
    /// The exponentiation is square-and-multiply over the bits of the
    /// modulus from high to low, skipping bit 0; the final extra squaring
    /// absorbs the missing low bit since `p` is odd. Costs O(log p)
    /// constraints.
    pub fn is_zero(&mut self, a: &Variable) -> Result<Variable, SynthesisError> {
        let ac = self.completed(a)?;
        let p = self.modulus;

        let mut res = self.one_wire();
        for i in (1..p.bits()).rev() {
            res = self.mul(&res, &res)?;
            if p.bit(i) {
                res = self.mul(&res, &ac)?;
            }
        }
        res = self.mul(&res, &res)?;
        self.sub(1u32, &res)
    }

    /// If `b` is 1 yields `i1`, else yields `i2`; `b` is asserted
    /// boolean.
    ///
    /// With a variable operand this is the constraint
    /// `b · (i1 - i2) = z - i2`; with two constants the selection
    /// `b·(i1 - i2) + i2` folds without a constraint.
    pub fn select(
        &mut self,
        b: &Variable,
        i1: impl Into<Operand>,
        i2: impl Into<Operand>,
    ) -> Result<Variable, SynthesisError> {
        let bc = self.completed(b)?;
        self.assert_is_boolean(b)?;

        match (i1.into(), i2.into()) {
            (Operand::Constant(n1), Operand::Constant(n2)) => {
                let diff = n1 - &n2;
                let scaled = self.mul_op(Operand::Var(bc), Operand::Constant(diff))?;
                self.add(&scaled, Operand::Constant(n2))
            }
            (i1, i2) => {
                let z = self.new_internal();
                let r = self.sub(i1, i2.clone())?;
                let o = self.sub(&z, i2)?;
                self.push_constraint(R1C::new(bc.lin_exp.clone(), r.lin_exp, o.lin_exp));
                Ok(z)
            }
        }
    }

    /// Adds the assertion `v <= bound`, with `bound` either a constant or
    /// a variable.
    #[track_caller]
    pub fn assert_is_less_or_equal(
        &mut self,
        v: &Variable,
        bound: impl Into<Operand>,
    ) -> Result<(), SynthesisError> {
        let caller = Location::caller();
        match bound.into() {
            Operand::Var(b) => self.must_be_less_or_eq_var(v, &b, caller),
            Operand::Constant(n) => {
                let bound = normalize(&n, self.modulus);
                self.must_be_less_or_eq_cst(v, &bound, caller)
            }
        }
    }

    /// Bit-by-bit comparison against a variable bound.
    ///
    /// `p[i]` is 1 exactly while the high bits of `w` match the high bits
    /// of the bound; at a zero bound bit with the prefix still matching,
    /// the corresponding bit of `w` is forced to zero.
    fn must_be_less_or_eq_var(
        &mut self,
        w: &Variable,
        bound: &Variable,
        caller: &Location<'_>,
    ) -> Result<(), SynthesisError> {
        let wc = self.completed(w)?;
        let bc = self.completed(bound)?;

        let (w_format, mut to_resolve) = self.log_fragment(&wc.lin_exp);
        let (b_format, b_terms) = self.log_fragment(&bc.lin_exp);
        to_resolve.extend(b_terms);
        let log = self.push_log(LogEntry {
            format: format!(
                "{}:{} {} <= {}\n",
                caller.file(),
                caller.line(),
                w_format,
                b_format
            ),
            to_resolve,
        });

        let bin_w = self.to_binary(&wc, RANGE_BITS)?;
        let bin_bound = self.to_binary(&bc, RANGE_BITS)?;

        let zero = self.constant(0u32)?;
        let mut p = vec![Variable::default(); RANGE_BITS + 1];
        p[RANGE_BITS] = self.constant(1u32)?;

        for i in (0..RANGE_BITS).rev() {
            let p1 = self.mul(&p[i + 1], &bin_w[i])?;
            p[i] = self.select(&bin_bound[i], &p1, &p[i + 1])?;
            let t = self.select(&bin_bound[i], &zero, &p[i + 1])?;

            let partial = self.sub(1u32, &t)?;
            let l = self.sub(&partial, &bin_w[i])?;
            let o = self.constant(0u32)?;

            self.push_assertion(
                R1C::new(l.lin_exp, bin_w[i].lin_exp.clone(), o.lin_exp),
                log,
            );
        }
        Ok(())
    }

    /// Specialized comparison avoiding the decomposition of a constant
    /// bound: walk the bound's bits high to low in fixed 4×64-bit chunks,
    /// extending the running product at 1-bits and forcing the matching
    /// bit of `v` to zero at 0-bits.
    fn must_be_less_or_eq_cst(
        &mut self,
        v: &Variable,
        bound: &BigUint,
        caller: &Location<'_>,
    ) -> Result<(), SynthesisError> {
        let vc = self.completed(v)?;

        let (v_format, to_resolve) = self.log_fragment(&vc.lin_exp);
        let log = self.push_log(LogEntry {
            format: format!(
                "{}:{} {} <= {}\n",
                caller.file(),
                caller.line(),
                v_format,
                bound
            ),
            to_resolve,
        });

        let v_bits = self.to_binary(&vc, RANGE_BITS)?;

        let mut words = bound.to_u64_digits();
        words.resize(NB_WORDS, 0);

        let mut p = vec![Variable::default(); RANGE_BITS + 1];
        p[RANGE_BITS] = self.constant(1u32)?;

        for i in (0..NB_WORDS).rev() {
            for j in 0..WORD_SIZE {
                let k = (i + 1) * WORD_SIZE - 1 - j;
                if (words[i] >> (WORD_SIZE - 1 - j)) & 1 == 0 {
                    p[k] = p[k + 1].clone();

                    let partial = self.sub(1u32, &p[k + 1])?;
                    let l = self.sub(&partial, &v_bits[k])?;
                    let o = self.constant(0u32)?;
                    self.push_assertion(
                        R1C::new(l.lin_exp, v_bits[k].lin_exp.clone(), o.lin_exp),
                        log,
                    );
                } else {
                    p[k] = self.mul(&p[k + 1], &v_bits[k])?;
                }
            }
        }
        Ok(())
    }
}
