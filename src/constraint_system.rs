use std::fmt::Write as _;
use std::panic::Location;

use blake2s_simd::{Params as Blake2sParams, State as Blake2sState};
use byteorder::{BigEndian, ByteOrder};
use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::coeff::{CoeffId, CoeffPool};
use crate::curve::Curve;
use crate::lc::{LinearExpression, Term, Variable, Visibility, Wire};

/// Computations are expressed in terms of arithmetic circuits, in
/// particular rank-1 quadratic constraint systems. The `Circuit` trait
/// represents a circuit that can be compiled: `declare` walks the circuit's
/// variables in declaration order and assigns each a fresh wire, then
/// `define` is invoked once to build the constraints.
pub trait Circuit {
    /// Declare the circuit's public and secret variables, in order.
    /// Declaration order defines wire-id order within each namespace.
    fn declare(&mut self, cs: &mut ConstraintSystem) -> Result<(), SynthesisError>;

    /// Build the circuit's constraints against the declared variables.
    fn define(&self, curve: Curve, cs: &mut ConstraintSystem) -> Result<(), SynthesisError>;
}

/// This is an error that could occur during circuit compilation, or while
/// evaluating a witness against a compiled system.
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    /// A curve identity that is not registered was requested.
    #[error("unknown curve identity: {0}")]
    UnknownCurve(String),
    /// The circuit declaration pass was inconsistent.
    #[error("malformed circuit: {0}")]
    MalformedCircuit(String),
    /// A gadget received a value that is neither a usable variable nor
    /// convertible to a field element.
    #[error("bad operand: {0}")]
    BadOperand(String),
    /// The user's `define` hook returned an error.
    #[error("circuit definition failed: {0}")]
    DefineFailed(#[source] Box<SynthesisError>),
    /// During witness evaluation, we lacked knowledge of a variable
    /// assignment.
    #[error("an assignment for a variable could not be computed")]
    AssignmentMissing,
    /// During witness evaluation, we divided by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// A witness failed the indexed constraint.
    #[error("unsatisfiable constraint system (constraint {0})")]
    Unsatisfiable(usize),
}

/// Tag telling a downstream solver which operand of a constraint it should
/// solve for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolvingHint {
    /// Solve for the single wire without an assignment.
    SingleOutput,
    /// The L operand is a binary decomposition of the evaluated O operand.
    BinaryDecomposition,
}

/// A rank-1 constraint: the witness must satisfy `⟨L⟩·⟨R⟩ = ⟨O⟩`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct R1C {
    pub l: LinearExpression,
    pub r: LinearExpression,
    pub o: LinearExpression,
    pub hint: SolvingHint,
}

impl R1C {
    pub(crate) fn new(l: LinearExpression, r: LinearExpression, o: LinearExpression) -> R1C {
        R1C {
            l,
            r,
            o,
            hint: SolvingHint::SingleOutput,
        }
    }
}

/// A constraint whose failure is a user-facing event, paired with the log
/// entry a solver resolves to explain the failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    pub r1c: R1C,
    /// Index into the compiled system's log-entry list.
    pub log: usize,
}

/// A printable template with `%s` placeholders and the terms whose solved
/// values fill them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub format: String,
    pub to_resolve: Vec<Term>,
}

/// One argument to [`ConstraintSystem::println`].
#[derive(Clone, Debug)]
pub enum LogArg {
    Text(String),
    Var(Variable),
}

impl From<&str> for LogArg {
    fn from(s: &str) -> LogArg {
        LogArg::Text(s.to_string())
    }
}

impl From<String> for LogArg {
    fn from(s: String) -> LogArg {
        LogArg::Text(s)
    }
}

impl From<&Variable> for LogArg {
    fn from(v: &Variable) -> LogArg {
        LogArg::Var(v.clone())
    }
}

impl From<Variable> for LogArg {
    fn from(v: Variable) -> LogArg {
        LogArg::Var(v)
    }
}

/// The in-progress constraint system builder.
///
/// Created empty, mutated only by builder operations, and consumed by
/// [`compile`], which returns the immutable [`CompiledSystem`]. The builder
/// is single-threaded: operations are synchronous and run to completion.
pub struct ConstraintSystem {
    pub(crate) curve: Curve,
    pub(crate) modulus: &'static BigUint,
    pub(crate) coeffs: CoeffPool,
    pub(crate) n_public: u32,
    pub(crate) n_secret: u32,
    pub(crate) n_internal: u32,
    pub(crate) constraints: Vec<R1C>,
    pub(crate) assertions: Vec<Assertion>,
    pub(crate) logs: Vec<LogEntry>,
    pub(crate) schema: Vec<(String, Visibility)>,
    pub(crate) one: Variable,
    pub(crate) in_define: bool,
}

impl ConstraintSystem {
    pub fn new(curve: Curve) -> ConstraintSystem {
        let modulus = curve.modulus();
        ConstraintSystem {
            curve,
            modulus,
            coeffs: CoeffPool::new(modulus),
            n_public: 0,
            n_secret: 0,
            n_internal: 0,
            constraints: Vec::new(),
            assertions: Vec::new(),
            logs: Vec::new(),
            schema: Vec::new(),
            one: Variable::from_wire(Wire::ONE),
            in_define: false,
        }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_assertions(&self) -> usize {
        self.assertions.len()
    }

    /// Declare a public input wire. Legal only during the declaration
    /// pass; the returned variable is dangling until first use.
    pub fn declare_public(&mut self, name: &str) -> Result<Variable, SynthesisError> {
        self.declare(name, Visibility::Public)
    }

    /// Declare a secret input wire. Legal only during the declaration
    /// pass; the returned variable is dangling until first use.
    pub fn declare_secret(&mut self, name: &str) -> Result<Variable, SynthesisError> {
        self.declare(name, Visibility::Secret)
    }

    fn declare(&mut self, name: &str, visibility: Visibility) -> Result<Variable, SynthesisError> {
        if self.in_define {
            return Err(SynthesisError::MalformedCircuit(format!(
                "variable `{name}` declared inside define"
            )));
        }
        if self.schema.iter().any(|(n, _)| n == name) {
            return Err(SynthesisError::MalformedCircuit(format!(
                "duplicate variable name `{name}`"
            )));
        }

        let id = match visibility {
            Visibility::Public => {
                self.n_public += 1;
                self.n_public - 1
            }
            Visibility::Secret => {
                self.n_secret += 1;
                self.n_secret - 1
            }
            _ => unreachable!("user declarations are public or secret"),
        };
        self.schema.push((name.to_string(), visibility));

        // Declared variables stay dangling (wire only, empty expression)
        // until an operation completes them.
        Ok(Variable {
            wire: Some(Wire { visibility, id }),
            lin_exp: LinearExpression::zero(),
            known_boolean: std::cell::Cell::new(false),
        })
    }

    /// Allocate a fresh internal wire; the result is the singleton
    /// expression `1·wire`.
    pub fn new_internal(&mut self) -> Variable {
        let id = self.n_internal;
        self.n_internal += 1;
        Variable::from_wire(Wire {
            visibility: Visibility::Internal,
            id,
        })
    }

    /// The cached variable for the constant-1 wire.
    pub fn one_wire(&self) -> Variable {
        self.one.clone()
    }

    /// Read `v` through dangling completion: a declared-but-unused handle
    /// completes to the singleton `1·wire`; a fully-unset handle is a
    /// `BadOperand`.
    pub(crate) fn completed(&self, v: &Variable) -> Result<Variable, SynthesisError> {
        if v.is_unset() {
            return Err(SynthesisError::BadOperand(
                "variable used before declaration".to_string(),
            ));
        }
        if v.is_dangling() {
            let wire = v.wire.expect("dangling implies wire");
            let completed = Variable::from_wire(wire);
            completed.known_boolean.set(v.known_boolean.get());
            return Ok(completed);
        }
        Ok(v.clone())
    }

    /// Canonicalize a linear expression: sort by (visibility, wire-id),
    /// fold equal-key runs by field-summing their coefficients, drop
    /// zeros. Stable for any permutation of the input.
    pub fn reduce(&mut self, mut le: LinearExpression) -> LinearExpression {
        le.terms_mut().sort_by_key(|t| t.key());

        let mut out = LinearExpression::zero();
        let terms = le.terms();
        let mut i = 0;
        while i < terms.len() {
            let mut sum = self.coeffs.get(terms[i].coeff_id()).clone();
            let mut j = i + 1;
            while j < terms.len() && terms[j].key() == terms[i].key() {
                sum = (sum + self.coeffs.get(terms[j].coeff_id())) % self.modulus;
                j += 1;
            }
            if !sum.is_zero() {
                let id = self.coeffs.intern(sum);
                out.push(terms[i].with_coeff(id));
            }
            i = j;
        }
        out
    }

    pub(crate) fn push_constraint(&mut self, r1c: R1C) {
        self.constraints.push(r1c);
    }

    /// Record an assertion together with its diagnostic log entry,
    /// returning the log index so related assertions can share it.
    pub(crate) fn push_assertion(&mut self, r1c: R1C, log: usize) {
        self.assertions.push(Assertion { r1c, log });
    }

    pub(crate) fn push_log(&mut self, entry: LogEntry) -> usize {
        self.logs.push(entry);
        self.logs.len() - 1
    }

    /// Render a linear expression into a `%s`-templated fragment and the
    /// terms resolving the placeholders.
    pub(crate) fn log_fragment(&self, le: &LinearExpression) -> (String, Vec<Term>) {
        if le.is_empty() {
            return ("0".to_string(), Vec::new());
        }
        let mut format = String::new();
        for (i, term) in le.iter().enumerate() {
            if i > 0 {
                format.push_str(" + ");
            }
            write!(format, "(%s * {})", self.coeffs.get(term.coeff_id())).unwrap();
        }
        (format, le.iter().copied().collect())
    }

    /// Debug print resolved at solve time, like `println!` but deferred.
    ///
    /// Variable arguments contribute a `%s` placeholder and a resolve
    /// term; an expression-only variable gets a backing wire allocated and
    /// bound by a single-output constraint so the solver has a value to
    /// substitute. The format is prefixed with the caller's `file:line`.
    #[track_caller]
    pub fn println<I>(&mut self, args: I) -> Result<(), SynthesisError>
    where
        I: IntoIterator<Item = LogArg>,
    {
        let caller = Location::caller();
        let mut format = format!("{}:{} ", caller.file(), caller.line());
        let mut to_resolve = Vec::new();

        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 {
                format.push(' ');
            }
            match arg {
                LogArg::Text(s) => format.push_str(&s),
                LogArg::Var(v) => {
                    let wire = self.backing_wire(&v)?;
                    to_resolve.push(Term::new(CoeffId::ONE, wire));
                    format.push_str("%s");
                }
            }
        }
        format.push('\n');

        self.push_log(LogEntry { format, to_resolve });
        Ok(())
    }

    /// The wire carrying `v`'s value, allocating and binding one when the
    /// variable is expression-only.
    fn backing_wire(&mut self, v: &Variable) -> Result<Wire, SynthesisError> {
        let v = self.completed(v)?;
        if let Some(wire) = v.wire {
            return Ok(wire);
        }
        let out = self.new_internal();
        let wire = out.wire.expect("fresh internal has a wire");
        self.push_constraint(R1C::new(
            v.lin_exp.clone(),
            self.one.lin_exp.clone(),
            out.lin_exp.clone(),
        ));
        Ok(wire)
    }

    /// Adds the assertion `i1 == i2`, encoded as `L·R = O` with `L = i1`,
    /// `R = 1`, `O = i2`, with a log entry describing `[L != O]`.
    pub fn assert_is_equal(
        &mut self,
        i1: impl Into<crate::lc::Operand>,
        i2: impl Into<crate::lc::Operand>,
    ) -> Result<(), SynthesisError> {
        let l = self.as_variable(i1.into())?;
        let o = self.as_variable(i2.into())?;
        let r = self.one_wire();

        let (lhs, mut to_resolve) = self.log_fragment(&l.lin_exp);
        let (rhs, rhs_terms) = self.log_fragment(&o.lin_exp);
        to_resolve.extend(rhs_terms);
        let log = self.push_log(LogEntry {
            format: format!("[{lhs} != {rhs}]"),
            to_resolve,
        });

        self.push_assertion(
            R1C::new(l.lin_exp.clone(), r.lin_exp.clone(), o.lin_exp.clone()),
            log,
        );
        Ok(())
    }

    fn seal(self) -> CompiledSystem {
        let fingerprint = schema_fingerprint(&self.schema);
        debug!(
            "compiled circuit over {}: {} public, {} secret, {} internal wires; {} constraints, {} assertions, {} coefficients",
            self.curve.name(),
            self.n_public,
            self.n_secret,
            self.n_internal,
            self.constraints.len(),
            self.assertions.len(),
            self.coeffs.len(),
        );
        CompiledSystem {
            curve: self.curve,
            n_public: self.n_public,
            n_secret: self.n_secret,
            n_internal: self.n_internal,
            coeffs: self.coeffs.into_table(),
            constraints: self.constraints,
            assertions: self.assertions,
            logs: self.logs,
            schema: self.schema,
            fingerprint,
        }
    }
}

/// Compile a user circuit over the selected curve identity.
///
/// Drives the two `Circuit` hooks in order — declaration pass, then
/// `define` — and seals the builder into an immutable [`CompiledSystem`].
/// On any error the partial system is discarded.
pub fn compile<C: Circuit>(curve: Curve, circuit: &mut C) -> Result<CompiledSystem, SynthesisError> {
    let mut cs = ConstraintSystem::new(curve);
    circuit.declare(&mut cs)?;
    cs.in_define = true;
    circuit
        .define(curve, &mut cs)
        .map_err(|e| SynthesisError::DefineFailed(Box::new(e)))?;
    Ok(cs.seal())
}

/// The finished, immutable constraint system handed to backends.
///
/// All appends preserved insertion order; that order is part of the
/// contract, and [`CompiledSystem::digest`] is stable across rebuilds of
/// the same circuit.
#[derive(Clone, Debug)]
pub struct CompiledSystem {
    pub curve: Curve,
    pub n_public: u32,
    pub n_secret: u32,
    pub n_internal: u32,
    /// Field elements indexed by the coefficient ids inside terms.
    pub coeffs: Vec<BigUint>,
    pub constraints: Vec<R1C>,
    pub assertions: Vec<Assertion>,
    pub logs: Vec<LogEntry>,
    /// Ordered (name, visibility) for every user-declared variable.
    pub schema: Vec<(String, Visibility)>,
    /// Fingerprint of the declared-variable layout.
    pub fingerprint: [u8; 32],
}

fn hash_lc(le: &LinearExpression, h: &mut Blake2sState) {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, le.len() as u64);
    h.update(&buf);
    for term in le.iter() {
        BigEndian::write_u64(&mut buf, term.packed());
        h.update(&buf);
    }
}

fn hash_biguint(n: &BigUint, h: &mut Blake2sState) {
    let bytes = n.to_bytes_be();
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, bytes.len() as u64);
    h.update(&buf);
    h.update(&bytes);
}

fn schema_fingerprint(schema: &[(String, Visibility)]) -> [u8; 32] {
    let mut h = Blake2sParams::new().hash_length(32).to_state();
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, schema.len() as u64);
    h.update(&buf);
    for (name, visibility) in schema {
        BigEndian::write_u64(&mut buf, name.len() as u64);
        h.update(&buf);
        h.update(name.as_bytes());
        h.update(&[*visibility as u8]);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(h.finalize().as_ref());
    out
}

impl CompiledSystem {
    /// Hex digest over every externally visible part of the system; equal
    /// digests mean byte-identical constraint and assertion lists,
    /// coefficient tables and log entries.
    pub fn digest(&self) -> String {
        let mut h = Blake2sParams::new().hash_length(32).to_state();

        let mut buf = [0u8; 32];
        BigEndian::write_u64(&mut buf[0..8], u64::from(self.n_public));
        BigEndian::write_u64(&mut buf[8..16], u64::from(self.n_secret));
        BigEndian::write_u64(&mut buf[16..24], u64::from(self.n_internal));
        BigEndian::write_u64(&mut buf[24..32], self.constraints.len() as u64);
        h.update(&buf);

        for coeff in &self.coeffs {
            hash_biguint(coeff, &mut h);
        }

        for c in &self.constraints {
            hash_lc(&c.l, &mut h);
            hash_lc(&c.r, &mut h);
            hash_lc(&c.o, &mut h);
            h.update(&[c.hint as u8]);
        }

        for a in &self.assertions {
            hash_lc(&a.r1c.l, &mut h);
            hash_lc(&a.r1c.r, &mut h);
            hash_lc(&a.r1c.o, &mut h);
            let mut idx = [0u8; 8];
            BigEndian::write_u64(&mut idx, a.log as u64);
            h.update(&idx);
        }

        for entry in &self.logs {
            h.update(entry.format.as_bytes());
            let mut buf = [0u8; 8];
            for term in &entry.to_resolve {
                BigEndian::write_u64(&mut buf, term.packed());
                h.update(&buf);
            }
        }

        h.update(&self.fingerprint);

        let mut s = String::new();
        for b in h.finalize().as_ref() {
            write!(s, "{:02x}", b).unwrap();
        }
        s
    }
}
