//! Terms: hash-consed expressions over booleans, bit-vectors, and integers.
//!
//! A [Term] is a handle to an interned [TermData]. Structurally equal terms are the same node, so
//! `==` on terms is an identity check and [TermMap]s key on identity.
//!
//! Terms live in a per-thread table; construct them with [term], [leaf_term], or [term!].

use fxhash::{FxHashMap, FxHashSet};
use log::debug;
use pull_ite_hc::{Node, Table};
use rug::Integer;

pub use bv::BitVector;
pub use eval::eval;
pub use ty::{check, check_raw, TypeError, TypeErrorReason};

/// An operator.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Op {
    /// if-then-else: condition, then-branch, else-branch
    Ite,
    /// equality
    Eq,
    /// a variable
    Var(String, Sort),
    /// a literal
    Const(Value),

    /// boolean negation
    Not,
    /// boolean implication (binary)
    Implies,
    /// n-ary boolean operators
    BoolNaryOp(BoolNaryOp),

    /// binary bit-vector operators
    BvBinOp(BvBinOp),
    /// binary bit-vector predicates
    BvBinPred(BvBinPred),
    /// n-ary bit-vector operators
    BvNaryOp(BvNaryOp),
    /// unary bit-vector operators
    BvUnOp(BvUnOp),

    /// n-ary integer operators
    IntNaryOp(IntNaryOp),
    /// binary integer predicates
    IntBinPred(IntBinPred),

    /// An uninterpreted function: name, argument sorts, return sort
    Uf(String, Vec<Sort>, Sort),
}

/// The operator families built into the rewriter.
///
/// Variables and uninterpreted functions belong to no family.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Family {
    /// ITE, equality, and the boolean connectives
    Basic,
    /// bit-vectors
    Bv,
    /// integer arithmetic
    Arith,
}

/// Boolean AND
pub const AND: Op = Op::BoolNaryOp(BoolNaryOp::And);
/// Boolean OR
pub const OR: Op = Op::BoolNaryOp(BoolNaryOp::Or);
/// Boolean XOR
pub const XOR: Op = Op::BoolNaryOp(BoolNaryOp::Xor);
/// Bit-vector addition
pub const BV_ADD: Op = Op::BvNaryOp(BvNaryOp::Add);
/// Bit-vector multiplication
pub const BV_MUL: Op = Op::BvNaryOp(BvNaryOp::Mul);
/// Bit-vector subtraction
pub const BV_SUB: Op = Op::BvBinOp(BvBinOp::Sub);
/// Bit-vector unsigned less-than
pub const BV_ULT: Op = Op::BvBinPred(BvBinPred::Ult);
/// Integer addition
pub const INT_ADD: Op = Op::IntNaryOp(IntNaryOp::Add);
/// Integer multiplication
pub const INT_MUL: Op = Op::IntNaryOp(IntNaryOp::Mul);
/// Integer less-than
pub const INT_LT: Op = Op::IntBinPred(IntBinPred::Lt);

impl Op {
    /// Number of arguments for this operator. `None` if n-ary.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Op::Ite => Some(3),
            Op::Eq => Some(2),
            Op::Var(_, _) => Some(0),
            Op::Const(_) => Some(0),
            Op::Not => Some(1),
            Op::Implies => Some(2),
            Op::BoolNaryOp(_) => None,
            Op::BvBinOp(_) => Some(2),
            Op::BvBinPred(_) => Some(2),
            Op::BvNaryOp(_) => None,
            Op::BvUnOp(_) => Some(1),
            Op::IntNaryOp(_) => None,
            Op::IntBinPred(_) => Some(2),
            Op::Uf(_, args, _) => Some(args.len()),
        }
    }

    /// The family this operator belongs to, if it is built in.
    pub fn family(&self) -> Option<Family> {
        match self {
            Op::Var(..) | Op::Uf(..) => None,
            Op::Const(v) => Some(v.sort().family()),
            Op::Ite | Op::Eq | Op::Not | Op::Implies | Op::BoolNaryOp(_) => Some(Family::Basic),
            Op::BvBinOp(_) | Op::BvBinPred(_) | Op::BvNaryOp(_) | Op::BvUnOp(_) => {
                Some(Family::Bv)
            }
            Op::IntNaryOp(_) | Op::IntBinPred(_) => Some(Family::Arith),
        }
    }
}

/// N-ary boolean operators
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BoolNaryOp {
    /// conjunction
    And,
    /// exclusive or
    Xor,
    /// disjunction
    Or,
}

/// Binary bit-vector operators
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BvBinOp {
    /// subtraction
    Sub,
    /// unsigned division
    Udiv,
    /// unsigned remainder
    Urem,
}

/// Binary bit-vector predicates
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BvBinPred {
    /// unsigned less-than
    Ult,
    /// unsigned greater-than
    Ugt,
    /// unsigned less-than-or-equal
    Ule,
    /// unsigned greater-than-or-equal
    Uge,
    /// signed less-than
    Slt,
    /// signed greater-than
    Sgt,
    /// signed less-than-or-equal
    Sle,
    /// signed greater-than-or-equal
    Sge,
}

/// N-ary bit-vector operators
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BvNaryOp {
    /// addition
    Add,
    /// multiplication
    Mul,
    /// bitwise or
    Or,
    /// bitwise and
    And,
    /// bitwise xor
    Xor,
}

/// Unary bit-vector operators
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BvUnOp {
    /// bitwise not
    Not,
    /// two's complement negation
    Neg,
}

/// N-ary integer operators
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum IntNaryOp {
    /// addition
    Add,
    /// multiplication
    Mul,
}

/// Binary integer predicates
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum IntBinPred {
    /// less-than
    Lt,
    /// greater-than
    Gt,
    /// less-than-or-equal
    Le,
    /// greater-than-or-equal
    Ge,
}

/// A sort
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Sort {
    /// booleans
    Bool,
    /// bit-vectors of some width
    BitVector(usize),
    /// mathematical integers
    Int,
}

impl Sort {
    #[track_caller]
    /// Unwrap the width of this bit-vector sort, panicking otherwise.
    pub fn as_bv(&self) -> usize {
        if let Sort::BitVector(w) = self {
            *w
        } else {
            panic!("{} is not a bit-vector", self)
        }
    }

    /// The family whose literals have this sort.
    pub fn family(&self) -> Family {
        match self {
            Sort::Bool => Family::Basic,
            Sort::BitVector(_) => Family::Bv,
            Sort::Int => Family::Arith,
        }
    }
}

/// A literal value
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Value {
    /// boolean
    Bool(bool),
    /// bit-vector
    BitVector(BitVector),
    /// integer
    Int(Integer),
}

impl Value {
    /// The sort of this value.
    pub fn sort(&self) -> Sort {
        match &self {
            Value::Bool(_) => Sort::Bool,
            Value::BitVector(b) => Sort::BitVector(b.width()),
            Value::Int(_) => Sort::Int,
        }
    }
    #[track_caller]
    /// Unwrap a boolean, panicking otherwise.
    pub fn as_bool(&self) -> bool {
        if let Value::Bool(b) = self {
            *b
        } else {
            panic!("Not a bool: {}", self)
        }
    }
    #[track_caller]
    /// Unwrap a bit-vector, panicking otherwise.
    pub fn as_bv(&self) -> &BitVector {
        if let Value::BitVector(b) = self {
            b
        } else {
            panic!("Not a bit-vec: {}", self)
        }
    }
    #[track_caller]
    /// Unwrap an integer, panicking otherwise.
    pub fn as_int(&self) -> &Integer {
        if let Value::Int(i) = self {
            i
        } else {
            panic!("Not an int: {}", self)
        }
    }
}

/// The contents of a term: an operator and its children.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TermData {
    /// the operator
    pub op: Op,
    /// the children
    pub cs: Vec<Term>,
}

impl TermData {
    /// Get the operator.
    pub fn op(&self) -> &Op {
        &self.op
    }
    /// Get the children.
    pub fn cs(&self) -> &[Term] {
        &self.cs
    }
    /// Is this an ITE?
    pub fn is_ite(&self) -> bool {
        self.op == Op::Ite
    }
    /// Is this an ITE over a non-boolean sort?
    pub fn is_term_ite(&self) -> bool {
        self.is_ite() && check(&self.cs[1]) != Sort::Bool
    }
    /// Is this a literal?
    pub fn is_value(&self) -> bool {
        matches!(self.op, Op::Const(_))
    }
    /// Is this a variable?
    pub fn is_var(&self) -> bool {
        matches!(self.op, Op::Var(..))
    }
    /// The literal, if this is one.
    pub fn as_value_opt(&self) -> Option<&Value> {
        if let Op::Const(v) = &self.op {
            Some(v)
        } else {
            None
        }
    }
    /// The boolean literal, if this is one.
    pub fn as_bool_opt(&self) -> Option<bool> {
        if let Op::Const(Value::Bool(b)) = &self.op {
            Some(*b)
        } else {
            None
        }
    }
    /// The bit-vector literal, if this is one.
    pub fn as_bv_opt(&self) -> Option<&BitVector> {
        if let Op::Const(Value::BitVector(b)) = &self.op {
            Some(b)
        } else {
            None
        }
    }
    /// The integer literal, if this is one.
    pub fn as_int_opt(&self) -> Option<&Integer> {
        if let Op::Const(Value::Int(i)) = &self.op {
            Some(i)
        } else {
            None
        }
    }
}

/// A hash-consed term.
pub type Term = Node<TermData>;

/// A map keyed on term identity.
pub type TermMap<T> = FxHashMap<Term, T>;
/// A set of terms, by identity.
pub type TermSet = FxHashSet<Term>;

thread_local! {
    static TERMS: Table<TermData> = Table::default();
}

/// Make a term, without type-checking it.
fn mk(op: Op, cs: Vec<Term>) -> Term {
    TERMS.with(|t| t.create(TermData { op, cs }))
}

/// Make a term. Panics if it is ill-sorted.
#[track_caller]
pub fn term(op: Op, cs: Vec<Term>) -> Term {
    let t = mk(op, cs);
    check(&t);
    t
}

/// Make a term with no children.
#[track_caller]
pub fn leaf_term(op: Op) -> Term {
    term(op, Vec::new())
}

/// Make a variable.
pub fn var(name: String, s: Sort) -> Term {
    leaf_term(Op::Var(name, s))
}

/// Make a literal.
pub fn const_(v: Value) -> Term {
    leaf_term(Op::Const(v))
}

/// Make a boolean literal.
pub fn bool_lit(b: bool) -> Term {
    const_(Value::Bool(b))
}

/// Make a bit-vector literal.
pub fn bv_lit<T>(uint: T, width: usize) -> Term
where
    Integer: From<T>,
{
    const_(Value::BitVector(BitVector::new(uint.into(), width)))
}

/// Make an integer literal.
pub fn int_lit<T>(i: T) -> Term
where
    Integer: From<T>,
{
    const_(Value::Int(Integer::from(i)))
}

/// The sort of `t`.
#[track_caller]
pub fn sort(t: &Term) -> Sort {
    check(t)
}

/// The number of live terms in this thread's table.
pub fn term_count() -> usize {
    TERMS.with(|t| t.len())
}

/// The number of terms this thread has ever allocated.
pub fn terms_allocated() -> u64 {
    TERMS.with(|t| t.allocated())
}

/// Scans the term database and the type database and removes dead terms.
///
/// Proofs hold terms, so dead proofs are collected first.
pub fn garbage_collect() {
    let proofs = super::proof::collect();
    ty::clear_cache();
    let terms = TERMS.with(|t| t.gc());
    debug!(target: "ir::term::gc", "{} proofs and {} terms collected", proofs, terms);
}

/// Make a term: `term![OP; CHILD, ...]`.
#[macro_export]
macro_rules! term {
    ($x:expr; $($y:expr),+ $(,)?) => {
        $crate::ir::term::term($x, vec![$($y),+])
    };
}

/// Iterate over the distinct subterms of a term, children first.
pub struct PostOrderIter {
    // (cs stacked, term)
    stack: Vec<(bool, Term)>,
    visited: TermSet,
}

impl PostOrderIter {
    /// Make an iterator over the descendents of `root`.
    pub fn new(root: Term) -> Self {
        Self {
            stack: vec![(false, root)],
            visited: TermSet::default(),
        }
    }

    /// Make an iterator over the descendents of all of `roots`, yielding shared ones once.
    pub fn from_roots(roots: impl IntoIterator<Item = Term>) -> Self {
        Self {
            stack: roots.into_iter().map(|r| (false, r)).collect(),
            visited: TermSet::default(),
        }
    }
}

impl std::iter::Iterator for PostOrderIter {
    type Item = Term;
    fn next(&mut self) -> Option<Term> {
        while let Some((children_pushed, t)) = self.stack.last() {
            if self.visited.contains(t) {
                self.stack.pop();
            } else if !children_pushed {
                self.stack.last_mut().unwrap().0 = true;
                let last = self.stack.last().unwrap().1.clone();
                self.stack.extend(
                    last.cs
                        .iter()
                        .filter(|c| !self.visited.contains(*c))
                        .map(|c| (false, c.clone())),
                );
            } else {
                break;
            }
        }
        self.stack.pop().map(|(_, t)| {
            self.visited.insert(t.clone());
            t
        })
    }
}

// Declared after `term!` so that they can use it.
pub mod bv;
pub mod eval;
mod fmt;
pub mod ty;

#[cfg(test)]
pub mod dist;

#[cfg(test)]
mod test;
