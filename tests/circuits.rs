use std::cell::RefCell;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use poblano::util_cs::Witness;
use poblano::{
    compile, Circuit, CompiledSystem, ConstraintSystem, Curve, LogArg, SynthesisError, Variable,
};

fn big(n: u64) -> BigUint {
    BigUint::from(n)
}

#[derive(Default)]
struct EqualityCircuit {
    a: Variable,
    b: Variable,
}

impl Circuit for EqualityCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.a = cs.declare_public("A")?;
        self.b = cs.declare_secret("B")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        cs.println([LogArg::from("A ="), LogArg::from(&self.a)])?;
        cs.assert_is_equal(&self.a, &self.b)
    }
}

#[test]
fn test_equality_circuit() {
    let cs = compile(Curve::Bn254, &mut EqualityCircuit::default()).unwrap();

    assert_eq!(cs.n_public, 1);
    assert_eq!(cs.n_secret, 1);
    assert_eq!(cs.constraints.len(), 0);
    assert_eq!(cs.assertions.len(), 1);
    assert_eq!(
        cs.schema,
        vec![
            ("A".to_string(), poblano::Visibility::Public),
            ("B".to_string(), poblano::Visibility::Secret),
        ]
    );

    // A matching witness satisfies the single assertion.
    let w = Witness::solve(&cs, &[big(42)], &[big(42)]).unwrap();
    assert!(w.assertions_satisfied(&cs));

    // A mismatch fails exactly that assertion, with both sides resolved
    // in the diagnostic.
    let w = Witness::solve(&cs, &[big(42)], &[big(8000)]).unwrap();
    assert_eq!(w.which_assertion_is_unsatisfied(&cs), Some(0));
    let diagnostic = w.explain_assertion(&cs, 0);
    assert!(diagnostic.contains("42"));
    assert!(diagnostic.contains("8000"));

    // A public-only assignment is accepted at allocation time but
    // rejected at solve time.
    assert!(matches!(
        Witness::solve(&cs, &[big(42)], &[]),
        Err(SynthesisError::AssignmentMissing)
    ));
}

#[derive(Default)]
struct BitsCircuit {
    a: Variable,
    bits: RefCell<Vec<Variable>>,
    recomposed: RefCell<Option<Variable>>,
}

impl Circuit for BitsCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.a = cs.declare_public("a")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        let bits = cs.to_binary(&self.a, 4)?;
        let recomposed = cs.from_binary(&bits)?;
        cs.assert_is_equal(&recomposed, &self.a)?;
        *self.bits.borrow_mut() = bits;
        *self.recomposed.borrow_mut() = Some(recomposed);
        Ok(())
    }
}

#[test]
fn test_to_binary_and_back() {
    let mut circuit = BitsCircuit::default();
    let cs = compile(Curve::Bn254, &mut circuit).unwrap();

    let w = Witness::solve(&cs, &[big(13)], &[]).unwrap();
    assert!(w.assertions_satisfied(&cs));

    // 13 = 0b1101, little endian.
    let bits = circuit.bits.borrow();
    let values: Vec<BigUint> = bits
        .iter()
        .map(|b| w.value_of(&cs, b).unwrap())
        .collect();
    assert_eq!(values, vec![big(1), big(0), big(1), big(1)]);

    let recomposed = circuit.recomposed.borrow();
    assert_eq!(
        w.value_of(&cs, recomposed.as_ref().unwrap()).unwrap(),
        big(13)
    );

    // 16 does not fit four bits.
    assert!(matches!(
        Witness::solve(&cs, &[big(16)], &[]),
        Err(SynthesisError::Unsatisfiable(_))
    ));
}

#[derive(Default)]
struct ZeroWidthCircuit {
    a: Variable,
}

impl Circuit for ZeroWidthCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.a = cs.declare_public("a")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        let bits = cs.to_binary(&self.a, 0)?;
        assert!(bits.is_empty());
        Ok(())
    }
}

#[test]
fn test_zero_width_decomposition_only_accepts_zero() {
    let cs = compile(Curve::Bn254, &mut ZeroWidthCircuit::default()).unwrap();
    assert_eq!(cs.constraints.len(), 1);

    assert!(Witness::solve(&cs, &[big(0)], &[]).is_ok());
    assert!(matches!(
        Witness::solve(&cs, &[big(1)], &[]),
        Err(SynthesisError::Unsatisfiable(0))
    ));
}

#[derive(Default)]
struct SelectConstCircuit {
    sel: Variable,
    expected: Variable,
}

impl Circuit for SelectConstCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.sel = cs.declare_public("sel")?;
        self.expected = cs.declare_public("expected")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        let chosen = cs.select(&self.sel, 7u32, 3u32)?;
        cs.assert_is_equal(&chosen, &self.expected)
    }
}

#[test]
fn test_select_truth_table_and_boolean_guard() {
    let cs = compile(Curve::Bn254, &mut SelectConstCircuit::default()).unwrap();

    let w = Witness::solve(&cs, &[big(1), big(7)], &[]).unwrap();
    assert!(w.assertions_satisfied(&cs));

    let w = Witness::solve(&cs, &[big(0), big(3)], &[]).unwrap();
    assert!(w.assertions_satisfied(&cs));

    let w = Witness::solve(&cs, &[big(0), big(7)], &[]).unwrap();
    assert!(!w.assertions_satisfied(&cs));

    // A non-boolean selector trips the boolean assertion even when the
    // selected value happens to match: 2·(7-3)+3 = 11.
    let w = Witness::solve(&cs, &[big(2), big(11)], &[]).unwrap();
    assert_eq!(w.which_assertion_is_unsatisfied(&cs), Some(0));
}

#[derive(Default)]
struct SelectVarCircuit {
    sel: Variable,
    x: Variable,
    y: Variable,
    chosen: RefCell<Option<Variable>>,
}

impl Circuit for SelectVarCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.sel = cs.declare_public("sel")?;
        self.x = cs.declare_public("x")?;
        self.y = cs.declare_public("y")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        let chosen = cs.select(&self.sel, &self.x, &self.y)?;
        *self.chosen.borrow_mut() = Some(chosen);
        Ok(())
    }
}

#[test]
fn test_select_of_variables() {
    let mut circuit = SelectVarCircuit::default();
    let cs = compile(Curve::Bn254, &mut circuit).unwrap();
    assert_eq!(cs.constraints.len(), 1);

    let w = Witness::solve(&cs, &[big(1), big(7), big(3)], &[]).unwrap();
    let chosen = circuit.chosen.borrow();
    assert_eq!(w.value_of(&cs, chosen.as_ref().unwrap()).unwrap(), big(7));

    let w = Witness::solve(&cs, &[big(0), big(7), big(3)], &[]).unwrap();
    assert_eq!(w.value_of(&cs, chosen.as_ref().unwrap()).unwrap(), big(3));
}

#[derive(Default)]
struct GatesCircuit {
    a: Variable,
    b: Variable,
    outs: RefCell<Vec<Variable>>,
}

impl Circuit for GatesCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.a = cs.declare_public("a")?;
        self.b = cs.declare_public("b")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        let x = cs.xor(&self.a, &self.b)?;
        let o = cs.or(&self.a, &self.b)?;
        let n = cs.and(&self.a, &self.b)?;
        *self.outs.borrow_mut() = vec![x, o, n];
        Ok(())
    }
}

#[test]
fn test_boolean_gate_tables() {
    let mut circuit = GatesCircuit::default();
    let cs = compile(Curve::Bls12_381, &mut circuit).unwrap();

    // (a, b) -> (xor, or, and)
    let table = [
        (0u64, 0u64, 0u64, 0u64, 0u64),
        (0, 1, 1, 1, 0),
        (1, 0, 1, 1, 0),
        (1, 1, 0, 1, 1),
    ];
    for (a, b, want_xor, want_or, want_and) in table {
        let w = Witness::solve(&cs, &[big(a), big(b)], &[]).unwrap();
        assert!(w.assertions_satisfied(&cs));
        let outs = circuit.outs.borrow();
        assert_eq!(w.value_of(&cs, &outs[0]).unwrap(), big(want_xor));
        assert_eq!(w.value_of(&cs, &outs[1]).unwrap(), big(want_or));
        assert_eq!(w.value_of(&cs, &outs[2]).unwrap(), big(want_and));
    }

    // Non-boolean inputs are caught by the input assertions.
    let w = Witness::solve(&cs, &[big(2), big(0)], &[]).unwrap();
    assert!(!w.assertions_satisfied(&cs));
}

#[derive(Default)]
struct IsZeroCircuit {
    a: Variable,
    flag: RefCell<Option<Variable>>,
}

impl Circuit for IsZeroCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.a = cs.declare_public("a")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        let flag = cs.is_zero(&self.a)?;
        *self.flag.borrow_mut() = Some(flag);
        Ok(())
    }
}

#[test]
fn test_is_zero() {
    let mut circuit = IsZeroCircuit::default();
    let cs = compile(Curve::Bn254, &mut circuit).unwrap();

    let w = Witness::solve(&cs, &[big(0)], &[]).unwrap();
    let flag = circuit.flag.borrow();
    assert_eq!(w.value_of(&cs, flag.as_ref().unwrap()).unwrap(), BigUint::one());

    for a in [1u64, 5, 12345678] {
        let w = Witness::solve(&cs, &[big(a)], &[]).unwrap();
        assert_eq!(
            w.value_of(&cs, flag.as_ref().unwrap()).unwrap(),
            BigUint::zero()
        );
    }

    // a = p is 0 in the field.
    let p = Curve::Bn254.modulus().clone();
    let w = Witness::solve(&cs, &[p], &[]).unwrap();
    assert_eq!(w.value_of(&cs, flag.as_ref().unwrap()).unwrap(), BigUint::one());
}

fn digest_of(curve: Curve) -> (String, CompiledSystem) {
    let mut circuit = GatesCircuit::default();
    let cs = compile(curve, &mut circuit).unwrap();
    (cs.digest(), cs)
}

#[test]
fn test_compilation_is_deterministic() {
    let (d1, cs1) = digest_of(Curve::Bn254);
    let (d2, cs2) = digest_of(Curve::Bn254);

    assert_eq!(d1, d2);
    assert_eq!(cs1.constraints, cs2.constraints);
    assert_eq!(cs1.assertions, cs2.assertions);
    assert_eq!(cs1.coeffs, cs2.coeffs);
    assert_eq!(cs1.logs, cs2.logs);
    assert_eq!(cs1.fingerprint, cs2.fingerprint);

    // A different field changes the interned coefficient values, and the
    // digest with them.
    let (d3, _) = digest_of(Curve::Bls12_381);
    assert_ne!(d1, d3);
}

#[derive(Default)]
struct FailingCircuit;

impl Circuit for FailingCircuit {
    fn declare(&mut self, _cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        Ok(())
    }

    fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        // Using a never-declared variable is a bad operand.
        let ghost = Variable::default();
        cs.add(&ghost, 1u32)?;
        Ok(())
    }
}

#[test]
fn test_define_errors_are_wrapped() {
    let err = compile(Curve::Bn254, &mut FailingCircuit).unwrap_err();
    assert!(matches!(err, SynthesisError::DefineFailed(_)));
}

#[derive(Default)]
struct DuplicateNameCircuit {
    a: Variable,
    b: Variable,
}

impl Circuit for DuplicateNameCircuit {
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        self.a = cs.declare_public("x")?;
        self.b = cs.declare_secret("x")?;
        Ok(())
    }

    fn define(&self, _curve: Curve, _cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
        Ok(())
    }
}

#[test]
fn test_duplicate_names_are_malformed() {
    let err = compile(Curve::Bn254, &mut DuplicateNameCircuit::default()).unwrap_err();
    assert!(matches!(err, SynthesisError::MalformedCircuit(_)));
}
