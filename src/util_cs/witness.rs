//! Helpers for testing circuit implementations: witness solving and
//! satisfaction checking over a compiled system.
//!
//! The production solver lives behind the backend boundary; this module
//! implements just enough of its contract — hint-driven solving and
//! insertion-order evaluation — for tests to exercise witnesses end to
//! end and for diagnostics to resolve log entries.

use std::collections::HashSet;

use log::info;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::constraint_system::{CompiledSystem, LogEntry, SolvingHint, SynthesisError, R1C};
use crate::curve::{inv_mod, mul_mod, sub_mod};
use crate::lc::{LinearExpression, Term, Variable, Visibility, Wire};

/// A full wire assignment for a compiled system.
pub struct Witness {
    one: BigUint,
    public: Vec<Option<BigUint>>,
    secret: Vec<Option<BigUint>>,
    internal: Vec<Option<BigUint>>,
}

impl Witness {
    /// Solve the internal wires from the user-provided inputs.
    ///
    /// Constraints are visited in insertion order; a single-output
    /// constraint is solved for its one unresolved wire, a
    /// binary-decomposition constraint assigns the bits of its evaluated
    /// `O` operand to the wires of `L`. Every constraint is then
    /// re-checked; assertions are *not* checked here — use
    /// [`Witness::which_assertion_is_unsatisfied`] so tests can observe
    /// which assertion a bad witness trips.
    pub fn solve(
        cs: &CompiledSystem,
        public: &[BigUint],
        secret: &[BigUint],
    ) -> Result<Witness, SynthesisError> {
        if public.len() != cs.n_public as usize || secret.len() != cs.n_secret as usize {
            return Err(SynthesisError::AssignmentMissing);
        }
        let p = cs.curve.modulus();
        let mut w = Witness {
            one: BigUint::one(),
            public: public.iter().map(|v| Some(v % p)).collect(),
            secret: secret.iter().map(|v| Some(v % p)).collect(),
            internal: vec![None; cs.n_internal as usize],
        };

        for (idx, c) in cs.constraints.iter().enumerate() {
            w.solve_constraint(cs, c, idx)?;
        }
        for (idx, c) in cs.constraints.iter().enumerate() {
            if !w.satisfies(cs, c) {
                return Err(SynthesisError::Unsatisfiable(idx));
            }
        }

        // Entries not attached to an assertion are deferred debug prints;
        // resolve them now that the wires have values.
        let assertion_logs: HashSet<usize> = cs.assertions.iter().map(|a| a.log).collect();
        for (i, entry) in cs.logs.iter().enumerate() {
            if !assertion_logs.contains(&i) {
                info!("{}", w.resolve_log(entry));
            }
        }

        Ok(w)
    }

    fn get(&self, wire: Wire) -> Option<&BigUint> {
        match wire.visibility {
            Visibility::One => Some(&self.one),
            Visibility::Public => self.public[wire.id as usize].as_ref(),
            Visibility::Secret => self.secret[wire.id as usize].as_ref(),
            Visibility::Internal => self.internal[wire.id as usize].as_ref(),
        }
    }

    fn set(&mut self, wire: Wire, value: BigUint) {
        match wire.visibility {
            Visibility::One => {}
            Visibility::Public => self.public[wire.id as usize] = Some(value),
            Visibility::Secret => self.secret[wire.id as usize] = Some(value),
            Visibility::Internal => self.internal[wire.id as usize] = Some(value),
        }
    }

    fn coeff<'a>(&self, cs: &'a CompiledSystem, term: &Term) -> &'a BigUint {
        &cs.coeffs[term.coeff_id().0 as usize]
    }

    /// Evaluate a fully-assigned expression; `None` if any wire is
    /// unresolved.
    fn eval(&self, cs: &CompiledSystem, le: &LinearExpression) -> Option<BigUint> {
        let p = cs.curve.modulus();
        let mut acc = BigUint::zero();
        for term in le.iter() {
            let value = self.get(term.wire())?;
            acc = (acc + self.coeff(cs, term) * value) % p;
        }
        Some(acc)
    }

    /// The known partial sum of an expression and its unresolved terms.
    fn partial_eval(&self, cs: &CompiledSystem, le: &LinearExpression) -> (BigUint, Vec<Term>) {
        let p = cs.curve.modulus();
        let mut acc = BigUint::zero();
        let mut unknown = Vec::new();
        for term in le.iter() {
            match self.get(term.wire()) {
                Some(value) => acc = (acc + self.coeff(cs, term) * value) % p,
                None => unknown.push(*term),
            }
        }
        (acc, unknown)
    }

    fn solve_constraint(
        &mut self,
        cs: &CompiledSystem,
        c: &R1C,
        idx: usize,
    ) -> Result<(), SynthesisError> {
        match c.hint {
            SolvingHint::BinaryDecomposition => self.solve_binary(cs, c),
            SolvingHint::SingleOutput => self.solve_single(cs, c, idx),
        }
    }

    /// Assign the wires of `L` from the bits of `⟨O⟩/⟨R⟩`. Consistency
    /// (including a value too wide for the decomposition) is established
    /// by the re-check pass.
    fn solve_binary(&mut self, cs: &CompiledSystem, c: &R1C) -> Result<(), SynthesisError> {
        let p = cs.curve.modulus();
        let r = self
            .eval(cs, &c.r)
            .ok_or(SynthesisError::AssignmentMissing)?;
        let o = self
            .eval(cs, &c.o)
            .ok_or(SynthesisError::AssignmentMissing)?;
        let value = if r.is_one() {
            o
        } else {
            let r_inv = inv_mod(&r, p).ok_or(SynthesisError::DivisionByZero)?;
            (o * r_inv) % p
        };

        for (i, term) in c.l.iter().enumerate() {
            if self.get(term.wire()).is_none() {
                let bit = if value.bit(i as u64) {
                    BigUint::one()
                } else {
                    BigUint::zero()
                };
                self.set(term.wire(), bit);
            }
        }
        Ok(())
    }

    /// Solve `⟨L⟩·⟨R⟩ = ⟨O⟩` for its single unresolved wire.
    fn solve_single(
        &mut self,
        cs: &CompiledSystem,
        c: &R1C,
        idx: usize,
    ) -> Result<(), SynthesisError> {
        let p = cs.curve.modulus();
        let (la, lu) = self.partial_eval(cs, &c.l);
        let (ra, ru) = self.partial_eval(cs, &c.r);
        let (oa, ou) = self.partial_eval(cs, &c.o);

        let n_unknown = lu.len() + ru.len() + ou.len();
        if n_unknown == 0 {
            return Ok(());
        }
        if n_unknown > 1 {
            return Err(SynthesisError::AssignmentMissing);
        }

        let inverse = |v: &BigUint| inv_mod(v, p).ok_or(SynthesisError::DivisionByZero);

        let (term, value) = if let [term] = ou[..] {
            // la·ra = oa + c·x
            let prod = mul_mod(&la, &ra, p);
            let num = sub_mod(&prod, &oa, p);
            (term, mul_mod(&num, &inverse(self.coeff(cs, &term))?, p))
        } else if let [term] = lu[..] {
            // (la + c·x)·ra = oa
            if ra.is_zero() {
                if oa.is_zero() {
                    (term, BigUint::zero())
                } else {
                    return Err(SynthesisError::Unsatisfiable(idx));
                }
            } else {
                let quot = mul_mod(&oa, &inverse(&ra)?, p);
                let num = sub_mod(&quot, &la, p);
                (term, mul_mod(&num, &inverse(self.coeff(cs, &term))?, p))
            }
        } else {
            let term = ru[0];
            // la·(ra + c·x) = oa
            if la.is_zero() {
                if oa.is_zero() {
                    (term, BigUint::zero())
                } else {
                    return Err(SynthesisError::Unsatisfiable(idx));
                }
            } else {
                let quot = mul_mod(&oa, &inverse(&la)?, p);
                let num = sub_mod(&quot, &ra, p);
                (term, mul_mod(&num, &inverse(self.coeff(cs, &term))?, p))
            }
        };

        self.set(term.wire(), value);
        Ok(())
    }

    fn satisfies(&self, cs: &CompiledSystem, c: &R1C) -> bool {
        let p = cs.curve.modulus();
        match (
            self.eval(cs, &c.l),
            self.eval(cs, &c.r),
            self.eval(cs, &c.o),
        ) {
            (Some(l), Some(r), Some(o)) => mul_mod(&l, &r, p) == o,
            _ => false,
        }
    }

    /// Index of the first failing assertion, in insertion order.
    pub fn which_assertion_is_unsatisfied(&self, cs: &CompiledSystem) -> Option<usize> {
        cs.assertions
            .iter()
            .position(|a| !self.satisfies(cs, &a.r1c))
    }

    pub fn assertions_satisfied(&self, cs: &CompiledSystem) -> bool {
        self.which_assertion_is_unsatisfied(cs).is_none()
    }

    /// Evaluate a variable handle against this witness.
    pub fn value_of(&self, cs: &CompiledSystem, v: &Variable) -> Option<BigUint> {
        if v.lin_exp().is_empty() {
            v.wire().and_then(|w| self.get(w).cloned())
        } else {
            self.eval(cs, v.lin_exp())
        }
    }

    /// Substitute resolved wire values into a log entry's `%s`
    /// placeholders.
    pub fn resolve_log(&self, entry: &LogEntry) -> String {
        let mut parts = entry.format.split("%s");
        let mut out = String::from(parts.next().unwrap_or(""));
        let mut terms = entry.to_resolve.iter();
        for part in parts {
            match terms.next().and_then(|t| self.get(t.wire())) {
                Some(value) => out.push_str(&value.to_string()),
                None => out.push_str("<unassigned>"),
            }
            out.push_str(part);
        }
        out
    }

    /// Human-readable diagnostic for the indexed assertion.
    pub fn explain_assertion(&self, cs: &CompiledSystem, index: usize) -> String {
        self.resolve_log(&cs.logs[cs.assertions[index].log])
    }
}
