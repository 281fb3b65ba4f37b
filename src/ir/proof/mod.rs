//! Proof certificates for term equalities.
//!
//! A [Proof] witnesses `lhs = rhs`. Proofs are hash-consed like terms and are built from three
//! rules:
//!
//! * [rewrite]: a single trusted step,
//! * [congruence]: equal arguments give equal applications,
//! * [transitivity]: chains two proofs.
//!
//! An absent proof (`None`) stands for reflexivity; see [trans_opt]. A [ProofChecker] validates
//! certificates.

use super::term::Term;

use log::trace;
use pull_ite_hc::{Node, Table};

use std::fmt::{self, Display, Formatter};

mod check;

pub use check::{ProofChecker, ProofError};

/// How a proof step is justified.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Rule {
    /// A single rewrite step.
    Rewrite,
    /// Equal operators applied to equal arguments. The premises justify the arguments that differ,
    /// left to right.
    Congruence(Vec<Proof>),
    /// `a = b` and `b = c`.
    Transitivity(Proof, Proof),
}

/// A proof step concluding `lhs = rhs`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ProofData {
    rule: Rule,
    lhs: Term,
    rhs: Term,
}

impl ProofData {
    /// How this step is justified.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }
    /// The left side of the conclusion.
    pub fn lhs(&self) -> &Term {
        &self.lhs
    }
    /// The right side of the conclusion.
    pub fn rhs(&self) -> &Term {
        &self.rhs
    }
    /// The direct premises of this step.
    pub fn premises(&self) -> Vec<Proof> {
        match &self.rule {
            Rule::Rewrite => Vec::new(),
            Rule::Congruence(ps) => ps.clone(),
            Rule::Transitivity(p, q) => vec![p.clone(), q.clone()],
        }
    }
}

/// A hash-consed proof.
pub type Proof = Node<ProofData>;

thread_local! {
    static PROOFS: Table<ProofData> = Table::default();
}

fn mk(rule: Rule, lhs: Term, rhs: Term) -> Proof {
    let p = PROOFS.with(|t| t.create(ProofData { rule, lhs, rhs }));
    trace!(target: "ir::proof", "{}", Step(&p));
    p
}

/// `lhs = rhs` in one step.
pub fn rewrite(lhs: Term, rhs: Term) -> Proof {
    mk(Rule::Rewrite, lhs, rhs)
}

/// `lhs = rhs` by congruence.
///
/// `lhs` and `rhs` should apply the same operator to the same number of arguments; `premises`
/// relate the argument pairs that differ, in order.
pub fn congruence(lhs: Term, rhs: Term, premises: Vec<Proof>) -> Proof {
    mk(Rule::Congruence(premises), lhs, rhs)
}

/// `p.lhs = q.rhs`. Panics unless `p.rhs == q.lhs`.
#[track_caller]
pub fn transitivity(p: Proof, q: Proof) -> Proof {
    assert_eq!(
        p.rhs, q.lhs,
        "Cannot chain\n  {}\nand\n  {}",
        *p, *q
    );
    let lhs = p.lhs.clone();
    let rhs = q.rhs.clone();
    mk(Rule::Transitivity(p, q), lhs, rhs)
}

/// [transitivity], where an absent proof is reflexivity.
#[track_caller]
pub fn trans_opt(p: Option<Proof>, q: Option<Proof>) -> Option<Proof> {
    match (p, q) {
        (None, q) => q,
        (p, None) => p,
        (Some(p), Some(q)) => Some(transitivity(p, q)),
    }
}

/// The number of live proofs in this thread's table.
pub fn proof_count() -> usize {
    PROOFS.with(|t| t.len())
}

/// Remove dead proofs. Returns how many were removed.
pub(crate) fn collect() -> usize {
    PROOFS.with(|t| t.gc())
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Rule::Rewrite => write!(f, "rewrite"),
            Rule::Congruence(ps) => write!(f, "congruence/{}", ps.len()),
            Rule::Transitivity(..) => write!(f, "transitivity"),
        }
    }
}

impl Display for ProofData {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "[{}] {} = {}", self.rule, self.lhs, self.rhs)
    }
}

/// A proof step with its sides named by id, for tracing.
struct Step<'a>(&'a Proof);

impl Display for Step<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let p = self.0;
        write!(
            f,
            "proof {}: [{}] term {} = term {}",
            p.id(),
            p.rule,
            p.lhs.id(),
            p.rhs.id()
        )
    }
}
