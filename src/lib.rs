//! `poblano` is a crate for building zk-SNARK circuits over a prime field
//! selected by curve identity. It provides the circuit trait and primitive
//! structures of a rank-1 constraint system front-end, as well as a gadget
//! library for booleans, bit decomposition, selection and range checks.
//!
//! # Example circuit
//!
//! Say we want to prove we know a secret equal to some public value. We
//! declare one public and one secret variable, and assert equality between
//! them in `define`:
//!
//! ```
//! use poblano::{compile, Circuit, ConstraintSystem, Curve, SynthesisError, Variable};
//!
//! #[derive(Default)]
//! struct EqualityCircuit {
//!     a: Variable,
//!     b: Variable,
//! }
//!
//! impl Circuit for EqualityCircuit {
//!     fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
//!         self.a = cs.declare_public("a")?;
//!         self.b = cs.declare_secret("b")?;
//!         Ok(())
//!     }
//!
//!     fn define(&self, _curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError> {
//!         cs.assert_is_equal(&self.a, &self.b)
//!     }
//! }
//!
//! let r1cs = compile(Curve::Bn254, &mut EqualityCircuit::default()).unwrap();
//! assert_eq!(r1cs.assertions.len(), 1);
//! ```

pub mod gadgets;
pub mod util_cs;

mod coeff;
pub use coeff::{CoeffId, CoeffPool};
mod curve;
pub use curve::{normalize, Curve};
mod edwards;
pub use edwards::EdCurve;
mod lc;
pub use lc::{LinearExpression, Operand, Term, Variable, Visibility, Wire};
mod constraint_system;
pub use constraint_system::{
    compile, Assertion, Circuit, CompiledSystem, ConstraintSystem, LogArg, LogEntry, SolvingHint,
    SynthesisError, R1C,
};

pub const POBLANO_VERSION: &str = env!("CARGO_PKG_VERSION");
