use std::cell::Cell;
use std::fmt;

use num_bigint::{BigInt, BigUint};

use crate::coeff::CoeffId;

/// Visibility of a wire in the constraint system.
///
/// Wire identifiers are unique within their visibility namespace; the
/// ordering of the enum is the ordering of terms in a reduced linear
/// expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Visibility {
    /// The distinguished constant-1 wire.
    One = 0,
    /// A wire declared public by the user circuit.
    Public = 1,
    /// A wire declared secret by the user circuit.
    Secret = 2,
    /// A wire allocated internally by the builder.
    Internal = 3,
}

impl Visibility {
    pub(crate) fn from_bits(bits: u64) -> Visibility {
        match bits {
            0 => Visibility::One,
            1 => Visibility::Public,
            2 => Visibility::Secret,
            3 => Visibility::Internal,
            _ => unreachable!("invalid visibility encoding"),
        }
    }
}

/// A value slot in the circuit, identified by (visibility, id).
///
/// Wires are created only by the builder and never destroyed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wire {
    pub visibility: Visibility,
    pub id: u32,
}

impl Wire {
    /// The distinguished constant-1 wire.
    pub const ONE: Wire = Wire {
        visibility: Visibility::One,
        id: 0,
    };
}

const COEFF_BITS: u32 = 29;
const WIRE_BITS: u32 = 32;

/// A coefficient-id / wire-id / visibility triple packed into a `u64`.
///
/// The layout places the visibility in the top bits and the coefficient id
/// in the low bits, so the natural integer ordering of terms is
/// (visibility, wire-id) first and the coefficient only after key equality.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term(u64);

impl Term {
    pub fn new(coeff: CoeffId, wire: Wire) -> Term {
        let c = coeff.0 as u64;
        assert!(c < (1 << COEFF_BITS), "coefficient table overflow");
        Term(((wire.visibility as u64) << (COEFF_BITS + WIRE_BITS)) | ((wire.id as u64) << COEFF_BITS) | c)
    }

    pub fn coeff_id(&self) -> CoeffId {
        CoeffId((self.0 & ((1 << COEFF_BITS) - 1)) as u32)
    }

    pub fn wire_id(&self) -> u32 {
        ((self.0 >> COEFF_BITS) & ((1 << WIRE_BITS) - 1)) as u32
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_bits(self.0 >> (COEFF_BITS + WIRE_BITS))
    }

    pub fn wire(&self) -> Wire {
        Wire {
            visibility: self.visibility(),
            id: self.wire_id(),
        }
    }

    /// The (visibility, wire-id) sort key, with the coefficient masked out.
    pub fn key(&self) -> u64 {
        self.0 >> COEFF_BITS
    }

    /// Raw packed encoding, stable across builds of the same circuit.
    pub fn packed(&self) -> u64 {
        self.0
    }

    /// The same term with its coefficient replaced.
    pub fn with_coeff(&self, coeff: CoeffId) -> Term {
        Term::new(coeff, self.wire())
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Term({:?}#{} * c{})",
            self.visibility(),
            self.wire_id(),
            self.coeff_id().0
        )
    }
}

/// An ordered sequence of terms interpreted as their sum.
///
/// Two forms coexist: *raw* expressions may contain several terms with the
/// same (visibility, wire-id) key; *reduced* expressions are sorted by key,
/// key-unique, and free of zero coefficients. The empty expression is the
/// constant zero.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LinearExpression(Vec<Term>);

impl LinearExpression {
    pub fn zero() -> LinearExpression {
        LinearExpression(Vec::new())
    }

    pub fn from_term(term: Term) -> LinearExpression {
        LinearExpression(vec![term])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term> + '_ {
        self.0.iter()
    }

    pub fn push(&mut self, term: Term) {
        self.0.push(term);
    }

    pub fn extend_from(&mut self, other: &LinearExpression) {
        self.0.extend_from_slice(&other.0);
    }

    pub(crate) fn terms(&self) -> &[Term] {
        &self.0
    }

    pub(crate) fn terms_mut(&mut self) -> &mut Vec<Term> {
        &mut self.0
    }
}

impl FromIterator<Term> for LinearExpression {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        LinearExpression(iter.into_iter().collect())
    }
}

impl fmt::Debug for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// A user-visible handle on a circuit value.
///
/// A variable carries a linear expression over wires, an optional backing
/// wire (set when the variable was allocated as a fresh wire), and a
/// per-handle flag recording that a boolean assertion was already emitted
/// for it. Clones snapshot the flag; two handles never share it.
///
/// `Variable::default()` is the unset state user circuit fields start in
/// before `declare` assigns them; using an unset variable in a gadget is a
/// `BadOperand` error.
#[derive(Clone, Default)]
pub struct Variable {
    pub(crate) wire: Option<Wire>,
    pub(crate) lin_exp: LinearExpression,
    pub(crate) known_boolean: Cell<bool>,
}

impl Variable {
    pub(crate) fn from_wire(wire: Wire) -> Variable {
        Variable {
            wire: Some(wire),
            lin_exp: LinearExpression::from_term(Term::new(CoeffId::ONE, wire)),
            known_boolean: Cell::new(false),
        }
    }

    pub(crate) fn from_lin_exp(lin_exp: LinearExpression) -> Variable {
        Variable {
            wire: None,
            lin_exp,
            known_boolean: Cell::new(false),
        }
    }

    /// The linear expression this handle denotes.
    pub fn lin_exp(&self) -> &LinearExpression {
        &self.lin_exp
    }

    /// The backing wire, when the variable was allocated as a fresh wire.
    pub fn wire(&self) -> Option<Wire> {
        self.wire
    }

    /// A declared-but-unused variable: wire assigned, expression not yet
    /// materialized.
    pub(crate) fn is_dangling(&self) -> bool {
        self.lin_exp.is_empty() && self.wire.is_some()
    }

    /// Neither declared nor produced by a gadget.
    pub(crate) fn is_unset(&self) -> bool {
        self.lin_exp.is_empty() && self.wire.is_none()
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("wire", &self.wire)
            .field("lin_exp", &self.lin_exp)
            .finish()
    }
}

/// A gadget input: either a constant convertible to a field element or a
/// circuit variable.
///
/// Gadgets accept `impl Into<Operand>`, so call sites pass integers,
/// big integers and variables interchangeably.
#[derive(Clone, Debug)]
pub enum Operand {
    Constant(BigInt),
    Var(Variable),
}

impl From<Variable> for Operand {
    fn from(v: Variable) -> Operand {
        Operand::Var(v)
    }
}

impl From<&Variable> for Operand {
    fn from(v: &Variable) -> Operand {
        Operand::Var(v.clone())
    }
}

impl From<BigInt> for Operand {
    fn from(n: BigInt) -> Operand {
        Operand::Constant(n)
    }
}

impl From<BigUint> for Operand {
    fn from(n: BigUint) -> Operand {
        Operand::Constant(n.into())
    }
}

impl From<&BigUint> for Operand {
    fn from(n: &BigUint) -> Operand {
        Operand::Constant(n.clone().into())
    }
}

macro_rules! operand_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(n: $t) -> Operand {
                    Operand::Constant(BigInt::from(n))
                }
            }
        )*
    };
}

operand_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
