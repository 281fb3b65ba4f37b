//! Type(Sort)-checking

use super::*;

use itertools::Itertools;
use pull_ite_hc::Id;
use thiserror::Error;

use std::cell::RefCell;

thread_local! {
    /// Cache of the sorts of checked terms, keyed by identity.
    static TERM_TYPES: RefCell<FxHashMap<Id, Sort>> = RefCell::new(FxHashMap::default());
}

#[track_caller]
/// Type-check this term, panicking if it is ill-sorted.
pub fn check(t: &Term) -> Sort {
    check_raw(t).unwrap_or_else(|e| panic!("Ill-sorted term {}\n{}", t, e))
}

/// Type-check this term.
///
/// Descendents that have not been checked yet are checked too, using an explicit stack. All
/// results are stored in this thread's type table.
pub fn check_raw(t: &Term) -> Result<Sort, TypeError> {
    if let Some(s) = TERM_TYPES.with(|tys| tys.borrow().get(&t.id()).cloned()) {
        return Ok(s);
    }
    TERM_TYPES.with(|tys| {
        let mut tys = tys.borrow_mut();
        // (node, cs pushed)
        let mut to_check = vec![(t.clone(), false)];
        while let Some((back, cs_pushed)) = to_check.last_mut() {
            if tys.contains_key(&back.id()) {
                to_check.pop();
            } else if !*cs_pushed {
                *cs_pushed = true;
                let back = back.clone();
                to_check.extend(
                    back.cs
                        .iter()
                        .filter(|c| !tys.contains_key(&c.id()))
                        .map(|c| (c.clone(), false)),
                );
            } else {
                let back = back.clone();
                to_check.pop();
                let ty = {
                    let args: Vec<&Sort> = back.cs.iter().map(|c| &tys[&c.id()]).collect();
                    rule(&back.op, &args).map_err(|reason| TypeError {
                        op: back.op.clone(),
                        args: args.iter().map(|s| (*s).clone()).collect(),
                        reason,
                    })?
                };
                tys.insert(back.id(), ty);
            }
        }
        Ok(tys[&t.id()].clone())
    })
}

/// Forget all cached sorts.
pub(super) fn clear_cache() {
    TERM_TYPES.with(|tys| tys.borrow_mut().clear())
}

fn rule(op: &Op, args: &[&Sort]) -> Result<Sort, TypeErrorReason> {
    if let Some(n) = op.arity() {
        if n != args.len() {
            return Err(TypeErrorReason::Arity(n, args.len()));
        }
    }
    match (op, args) {
        (Op::Ite, &[c, a, b]) => bool_or(c, "ite")
            .and_then(|_| eq_or(a, b, "ite"))
            .map(|_| a.clone()),
        (Op::Eq, &[a, b]) => eq_or(a, b, "=").map(|_| Sort::Bool),
        (Op::Var(_, s), &[]) => Ok(s.clone()),
        (Op::Const(v), &[]) => Ok(v.sort()),
        (Op::Not, &[a]) => bool_or(a, "not").cloned(),
        (Op::Implies, &[a, b]) => {
            let ctx = "=>";
            bool_or(a, ctx).and_then(|_| bool_or(b, ctx)).cloned()
        }
        (Op::BoolNaryOp(_), a) => {
            let ctx = "bool nary op";
            all_eq_or(a.iter().copied(), ctx)
                .and_then(|t| bool_or(t, ctx))
                .cloned()
        }
        (Op::BvBinOp(_), &[a, b]) => {
            let ctx = "bv binary op";
            bv_or(a, ctx)
                .and_then(|_| eq_or(a, b, ctx))
                .map(|_| a.clone())
        }
        (Op::BvBinPred(_), &[a, b]) => {
            let ctx = "bv binary predicate";
            bv_or(a, ctx)
                .and_then(|_| eq_or(a, b, ctx))
                .map(|_| Sort::Bool)
        }
        (Op::BvNaryOp(_), a) => {
            let ctx = "bv nary op";
            all_eq_or(a.iter().copied(), ctx)
                .and_then(|t| bv_or(t, ctx))
                .cloned()
        }
        (Op::BvUnOp(_), &[a]) => bv_or(a, "bv unary op").cloned(),
        (Op::IntNaryOp(_), a) => {
            let ctx = "int nary op";
            all_eq_or(a.iter().copied(), ctx)
                .and_then(|t| int_or(t, ctx))
                .cloned()
        }
        (Op::IntBinPred(_), &[a, b]) => {
            let ctx = "int binary predicate";
            int_or(a, ctx)
                .and_then(|_| int_or(b, ctx))
                .map(|_| Sort::Bool)
        }
        (Op::Uf(_, sorts, ret), a) => {
            for (s, a) in sorts.iter().zip(a) {
                eq_or(s, a, "uninterpreted function")?;
            }
            Ok(ret.clone())
        }
        // arities were checked above
        (_, a) => Err(TypeErrorReason::Arity(op.arity().unwrap_or(0), a.len())),
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("{reason}\n  in `{op}` applied to sorts [{}]", .args.iter().format(", "))]
/// A type error with some operator.
pub struct TypeError {
    /// the operator
    pub op: Op,
    /// the sorts of its arguments
    pub args: Vec<Sort>,
    /// what went wrong
    pub reason: TypeErrorReason,
}

#[derive(Debug, PartialEq, Eq, Error)]
/// Underlying reason for the error
pub enum TypeErrorReason {
    /// Two sorts should be equal
    #[error("{2}: sorts {0} and {1} should be equal")]
    NotEqual(Sort, Sort, &'static str),
    /// A sort should be a boolean
    #[error("{1}: expected bool, got {0}")]
    ExpectedBool(Sort, &'static str),
    /// A sort should be a bit-vector
    #[error("{1}: expected a bit-vector, got {0}")]
    ExpectedBv(Sort, &'static str),
    /// A sort should be an integer
    #[error("{1}: expected int, got {0}")]
    ExpectedInt(Sort, &'static str),
    /// Wrong number of arguments: (expected, actual)
    #[error("expected {0} arguments, got {1}")]
    Arity(usize, usize),
    /// An empty n-ary operator.
    #[error("{0}: no arguments")]
    EmptyNary(&'static str),
}

fn bv_or<'a>(a: &'a Sort, ctx: &'static str) -> Result<&'a Sort, TypeErrorReason> {
    if let Sort::BitVector(_) = a {
        Ok(a)
    } else {
        Err(TypeErrorReason::ExpectedBv(a.clone(), ctx))
    }
}

fn bool_or<'a>(a: &'a Sort, ctx: &'static str) -> Result<&'a Sort, TypeErrorReason> {
    if let Sort::Bool = a {
        Ok(a)
    } else {
        Err(TypeErrorReason::ExpectedBool(a.clone(), ctx))
    }
}

fn int_or<'a>(a: &'a Sort, ctx: &'static str) -> Result<&'a Sort, TypeErrorReason> {
    if let Sort::Int = a {
        Ok(a)
    } else {
        Err(TypeErrorReason::ExpectedInt(a.clone(), ctx))
    }
}

fn eq_or(a: &Sort, b: &Sort, ctx: &'static str) -> Result<(), TypeErrorReason> {
    if a == b {
        Ok(())
    } else {
        Err(TypeErrorReason::NotEqual(a.clone(), b.clone(), ctx))
    }
}

fn all_eq_or<'a, I: Iterator<Item = &'a Sort>>(
    mut a: I,
    ctx: &'static str,
) -> Result<&'a Sort, TypeErrorReason> {
    let first = a.next().ok_or(TypeErrorReason::EmptyNary(ctx))?;
    for x in a {
        eq_or(first, x, ctx)?;
    }
    Ok(first)
}
