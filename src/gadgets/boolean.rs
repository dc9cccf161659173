//! Boolean gates over 0/1-valued variables.

use std::panic::Location;

use crate::constraint_system::{ConstraintSystem, LogEntry, SynthesisError, R1C};
use crate::lc::Variable;

impl ConstraintSystem {
    /// Adds the assertion `v · (1 - v) = 0`.
    ///
    /// Skipped when this handle is already flagged boolean. The flag is
    /// per-handle: clones of `v` do not share it, so a spurious
    /// re-assertion through another handle is tolerated.
    #[track_caller]
    pub fn assert_is_boolean(&mut self, v: &Variable) -> Result<(), SynthesisError> {
        let vc = self.completed(v)?;
        if v.known_boolean.get() {
            return Ok(());
        }
        v.known_boolean.set(true);

        let complement = self.sub(1u32, &vc)?;
        let zero = self.constant(0u32)?;

        let caller = Location::caller();
        let log = self.push_log(LogEntry {
            format: format!(
                "{}:{} boolean assertion failed\n",
                caller.file(),
                caller.line()
            ),
            to_resolve: Vec::new(),
        });
        self.push_assertion(
            R1C::new(vc.lin_exp.clone(), complement.lin_exp.clone(), zero.lin_exp.clone()),
            log,
        );
        Ok(())
    }

    /// Returns `a ⊕ b` via `2a · b = a + b - z`.
    pub fn xor(&mut self, a: &Variable, b: &Variable) -> Result<Variable, SynthesisError> {
        let ac = self.completed(a)?;
        let bc = self.completed(b)?;
        self.assert_is_boolean(a)?;
        self.assert_is_boolean(b)?;

        let z = self.new_internal();
        let l = self.mul(2u32, &ac)?;
        let sum = self.add(&ac, &bc)?;
        let o = self.sub(&sum, &z)?;
        self.push_constraint(R1C::new(l.lin_exp, bc.lin_exp.clone(), o.lin_exp));
        Ok(z)
    }

    /// Returns `a ∨ b` via `b · (1 - a) = z - a`.
    pub fn or(&mut self, a: &Variable, b: &Variable) -> Result<Variable, SynthesisError> {
        let ac = self.completed(a)?;
        let bc = self.completed(b)?;
        self.assert_is_boolean(a)?;
        self.assert_is_boolean(b)?;

        let z = self.new_internal();
        let r = self.sub(1u32, &ac)?;
        let o = self.sub(&z, &ac)?;
        self.push_constraint(R1C::new(bc.lin_exp.clone(), r.lin_exp, o.lin_exp));
        Ok(z)
    }

    /// Returns `a ∧ b`, which over booleans is the product.
    pub fn and(&mut self, a: &Variable, b: &Variable) -> Result<Variable, SynthesisError> {
        self.assert_is_boolean(a)?;
        self.assert_is_boolean(b)?;
        self.mul(a, b)
    }
}
