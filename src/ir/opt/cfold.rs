//! Constant folding, and the simplifying constructor that rewriters build terms with.

use crate::ir::term::*;

use rug::Integer;

/// Builds applications, possibly simplifying them on the way.
///
/// The result of [Simplifier::mk_app] must be equal, under every assignment, to `op` applied to
/// `cs`.
pub trait Simplifier {
    /// Make `op` applied to `cs`.
    fn mk_app(&mut self, op: &Op, cs: Vec<Term>) -> Term;
}

/// A [Simplifier] that only hash-conses.
#[derive(Default, Debug, Clone, Copy)]
pub struct Raw;

impl Simplifier for Raw {
    fn mk_app(&mut self, op: &Op, cs: Vec<Term>) -> Term {
        term(op.clone(), cs)
    }
}

/// A [Simplifier] that folds constants at the root of each application it builds.
#[derive(Default, Debug, Clone, Copy)]
pub struct ConstFold;

impl Simplifier for ConstFold {
    fn mk_app(&mut self, op: &Op, cs: Vec<Term>) -> Term {
        fold_app(op, cs)
    }
}

/// Create a constant boolean
fn cbool(b: bool) -> Option<Term> {
    Some(bool_lit(b))
}

/// Create a constant bit-vector
fn cbv(b: BitVector) -> Option<Term> {
    Some(const_(Value::BitVector(b)))
}

/// Make `op` applied to `cs`, folding the application if its children allow.
///
/// The children themselves are not revisited.
pub fn fold_app(op: &Op, cs: Vec<Term>) -> Term {
    fold_root(op, &cs).unwrap_or_else(|| term(op.clone(), cs))
}

fn fold_root(op: &Op, cs: &[Term]) -> Option<Term> {
    let get = |i: usize| &cs[i];
    match op {
        Op::Not => match get(0).as_bool_opt() {
            Some(b) => cbool(!b),
            None if get(0).op == Op::Not => Some(get(0).cs[0].clone()),
            None => None,
        },
        Op::Implies => match get(0).as_bool_opt() {
            Some(true) => Some(get(1).clone()),
            Some(false) => cbool(true),
            None => match get(1).as_bool_opt() {
                Some(true) => cbool(true),
                Some(false) => Some(neg_bool(get(0).clone())),
                None => None,
            },
        },
        Op::BoolNaryOp(o) => Some(o.flatten(cs.iter().cloned())),
        Op::Eq => {
            let c0 = get(0);
            let c1 = get(1);
            if c0 == c1 {
                cbool(true)
            } else {
                match (c0.as_value_opt(), c1.as_value_opt()) {
                    (Some(a), Some(b)) => cbool(a == b),
                    _ => None,
                }
            }
        }
        Op::Ite => {
            let c = get(0);
            let t = get(1);
            let f = get(2);
            match c.as_bool_opt() {
                Some(true) => Some(t.clone()),
                Some(false) => Some(f.clone()),
                None if t == f => Some(t.clone()),
                None => match t.as_bool_opt() {
                    Some(true) => Some(fold_app(&OR, vec![c.clone(), f.clone()])),
                    Some(false) => Some(fold_app(&AND, vec![neg_bool(c.clone()), f.clone()])),
                    None => match f.as_bool_opt() {
                        Some(true) => Some(fold_app(&OR, vec![neg_bool(c.clone()), t.clone()])),
                        Some(false) => Some(fold_app(&AND, vec![c.clone(), t.clone()])),
                        None => None,
                    },
                },
            }
        }
        Op::BvBinOp(o) => {
            let c0 = get(0);
            let c1 = get(1);
            use BvBinOp::*;
            match (o, c0.as_bv_opt(), c1.as_bv_opt()) {
                (Sub, Some(a), Some(b)) => cbv(a.clone() - b.clone()),
                (Sub, _, Some(b)) if b.uint() == &0 => Some(c0.clone()),
                (Udiv, Some(a), Some(b)) => cbv(a.clone() / b),
                (Udiv, _, Some(b)) if b.uint() == &1 => Some(c0.clone()),
                (Urem, Some(a), Some(b)) => cbv(a.clone() % b),
                _ => None,
            }
        }
        Op::BvNaryOp(o) => Some(o.flatten(cs.iter().cloned())),
        Op::BvBinPred(p) => {
            if let (Some(a), Some(b)) = (get(0).as_bv_opt(), get(1).as_bv_opt()) {
                cbool(match p {
                    BvBinPred::Uge => a.uint() >= b.uint(),
                    BvBinPred::Ugt => a.uint() > b.uint(),
                    BvBinPred::Ule => a.uint() <= b.uint(),
                    BvBinPred::Ult => a.uint() < b.uint(),
                    BvBinPred::Sge => a.as_sint() >= b.as_sint(),
                    BvBinPred::Sgt => a.as_sint() > b.as_sint(),
                    BvBinPred::Sle => a.as_sint() <= b.as_sint(),
                    BvBinPred::Slt => a.as_sint() < b.as_sint(),
                })
            } else {
                None
            }
        }
        Op::BvUnOp(o) => get(0).as_bv_opt().and_then(|bv| {
            cbv(match o {
                BvUnOp::Not => !bv.clone(),
                BvUnOp::Neg => -bv.clone(),
            })
        }),
        Op::IntNaryOp(o) => Some(o.flatten(cs.iter().cloned())),
        Op::IntBinPred(p) => {
            if let (Some(a), Some(b)) = (get(0).as_int_opt(), get(1).as_int_opt()) {
                cbool(match p {
                    IntBinPred::Ge => a >= b,
                    IntBinPred::Gt => a > b,
                    IntBinPred::Le => a <= b,
                    IntBinPred::Lt => a < b,
                })
            } else {
                None
            }
        }
        Op::Var(..) | Op::Const(_) | Op::Uf(..) => None,
    }
}

/// Fold away operators over constants, everywhere in `node`.
pub fn fold(node: &Term) -> Term {
    fold_cache(node, &mut TermMap::default())
}

/// Do constant-folding backed by a cache.
pub fn fold_cache(node: &Term, cache: &mut TermMap<Term>) -> Term {
    // (node, children pushed)
    let mut stack = vec![(node.clone(), false)];

    while let Some((t, children_pushed)) = stack.pop() {
        if cache.contains_key(&t) {
            continue;
        }
        if !children_pushed {
            stack.push((t.clone(), true));
            stack.extend(
                t.cs.iter()
                    .filter(|c| !cache.contains_key(*c))
                    .map(|c| (c.clone(), false)),
            );
            continue;
        }
        let cs = t.cs.iter().map(|c| cache[c].clone()).collect();
        let new_t = fold_app(&t.op, cs);
        cache.insert(t, new_t);
    }
    cache[node].clone()
}

/// Boolean negation, folded.
pub fn neg_bool(t: Term) -> Term {
    fold_app(&Op::Not, vec![t])
}

trait NaryFlat<T: Clone>: Sized {
    fn as_const(t: Term) -> Result<T, Term>;
    fn combine(self, children: Vec<Term>, consts: Vec<T>) -> Term;
    fn flatten<I: IntoIterator<Item = Term>>(self, children: I) -> Term {
        let mut real_children = Vec::new();
        let mut consts = Vec::new();
        for c in children {
            match Self::as_const(c) {
                Ok(t) => consts.push(t),
                Err(t) => real_children.push(t),
            }
        }
        self.combine(real_children, consts)
    }
}

impl NaryFlat<bool> for BoolNaryOp {
    fn as_const(t: Term) -> Result<bool, Term> {
        match t.as_bool_opt() {
            Some(b) => Ok(b),
            None => Err(t),
        }
    }
    fn combine(self, children: Vec<Term>, consts: Vec<bool>) -> Term {
        match self {
            BoolNaryOp::Or => {
                if consts.iter().any(|b| *b) {
                    bool_lit(true)
                } else if children.is_empty() {
                    bool_lit(false)
                } else {
                    safe_nary(OR, children)
                }
            }
            BoolNaryOp::And => {
                if consts.iter().any(|b| !*b) {
                    bool_lit(false)
                } else if children.is_empty() {
                    bool_lit(true)
                } else {
                    safe_nary(AND, children)
                }
            }
            BoolNaryOp::Xor => {
                let odd_trues = consts.into_iter().filter(|b| *b).count() % 2 == 1;
                if children.is_empty() {
                    bool_lit(odd_trues)
                } else {
                    let t = safe_nary(XOR, children);
                    if odd_trues {
                        neg_bool(t)
                    } else {
                        t
                    }
                }
            }
        }
    }
}

impl NaryFlat<BitVector> for BvNaryOp {
    fn as_const(t: Term) -> Result<BitVector, Term> {
        match t.as_bv_opt() {
            Some(b) => Ok(b.clone()),
            None => Err(t),
        }
    }
    fn combine(self, mut children: Vec<Term>, mut consts: Vec<BitVector>) -> Term {
        let op = Op::BvNaryOp(self);
        let c = match consts.pop() {
            Some(c) => c,
            None => return safe_nary(op, children),
        };
        let w = c.width();
        let (c, absorbing, neutral) = match self {
            BvNaryOp::Add => (
                consts.into_iter().fold(c, std::ops::Add::add),
                None,
                BitVector::zeros(w),
            ),
            BvNaryOp::Mul => (
                consts.into_iter().fold(c, std::ops::Mul::mul),
                Some(BitVector::zeros(w)),
                BitVector::new(Integer::from(1), w),
            ),
            BvNaryOp::Or => (
                consts.into_iter().fold(c, std::ops::BitOr::bitor),
                Some(BitVector::ones(w)),
                BitVector::zeros(w),
            ),
            BvNaryOp::And => (
                consts.into_iter().fold(c, std::ops::BitAnd::bitand),
                Some(BitVector::zeros(w)),
                BitVector::ones(w),
            ),
            BvNaryOp::Xor => (
                consts.into_iter().fold(c, std::ops::BitXor::bitxor),
                None,
                BitVector::zeros(w),
            ),
        };
        if children.is_empty() || absorbing.as_ref() == Some(&c) {
            const_(Value::BitVector(c))
        } else {
            if c != neutral {
                children.push(const_(Value::BitVector(c)));
            }
            safe_nary(op, children)
        }
    }
}

impl NaryFlat<Integer> for IntNaryOp {
    fn as_const(t: Term) -> Result<Integer, Term> {
        match t.as_int_opt() {
            Some(i) => Ok(i.clone()),
            None => Err(t),
        }
    }
    fn combine(self, mut children: Vec<Term>, mut consts: Vec<Integer>) -> Term {
        let op = Op::IntNaryOp(self);
        match (self, consts.pop()) {
            (_, None) => safe_nary(op, children),
            (IntNaryOp::Add, Some(c)) => {
                let c = consts.into_iter().fold(c, std::ops::Add::add);
                if c != 0 || children.is_empty() {
                    children.push(int_lit(c));
                }
                safe_nary(op, children)
            }
            (IntNaryOp::Mul, Some(c)) => {
                let c = consts.into_iter().fold(c, std::ops::Mul::mul);
                if c == 0 || children.is_empty() {
                    int_lit(c)
                } else {
                    if c != 1 {
                        children.push(int_lit(c));
                    }
                    safe_nary(op, children)
                }
            }
        }
    }
}

fn safe_nary(op: Op, mut children: Vec<Term>) -> Term {
    match children.len() {
        0 => panic!("Empty {}", op),
        1 => children.swap_remove(0),
        _ => term(op, children),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::term::dist::*;
    use quickcheck_macros::quickcheck;

    fn v_bv(n: &str, w: usize) -> Term {
        var(n.to_owned(), Sort::BitVector(w))
    }

    fn v_bool(n: &str) -> Term {
        var(n.to_owned(), Sort::Bool)
    }

    #[quickcheck]
    fn semantics_random(ArbitraryTermEnv(t, vs): ArbitraryTermEnv) {
        let tt = fold(&t);
        let orig = eval(&t, &vs);
        let new = eval(&tt, &vs);
        assert!(orig == new, "{} ({}) vs {} ({})", t, orig, tt, new);
    }

    #[quickcheck]
    fn idempotent_random(ArbitraryTermEnv(t, _): ArbitraryTermEnv) {
        let tt = fold(&t);
        assert_eq!(fold(&tt), tt);
    }

    #[test]
    fn b_xor() {
        assert_eq!(fold(&term![XOR; bool_lit(false), bool_lit(true)]), bool_lit(true));
        assert_eq!(
            fold(&term![XOR; v_bool("a"), bool_lit(true)]),
            term![Op::Not; v_bool("a")]
        );
    }

    #[test]
    fn b_or() {
        assert_eq!(fold(&term![OR; bool_lit(false), bool_lit(true)]), bool_lit(true));
        assert_eq!(fold(&term![OR; bool_lit(false), v_bool("a")]), v_bool("a"));
    }

    #[test]
    fn b_and() {
        assert_eq!(fold(&term![AND; bool_lit(false), bool_lit(true)]), bool_lit(false));
    }

    #[test]
    fn double_negation() {
        let a = v_bool("a");
        assert_eq!(fold(&term![Op::Not; term![Op::Not; a.clone()]]), a);
    }

    #[test]
    fn ite() {
        let (c, x, y) = (v_bool("c"), v_bv("x", 4), v_bv("y", 4));
        assert_eq!(fold(&term![Op::Ite; bool_lit(true), x.clone(), y.clone()]), x);
        assert_eq!(fold(&term![Op::Ite; bool_lit(false), x.clone(), y.clone()]), y);
        assert_eq!(fold(&term![Op::Ite; c.clone(), x.clone(), x.clone()]), x);
        let a = v_bool("a");
        assert_eq!(
            fold(&term![Op::Ite; c.clone(), bool_lit(true), a.clone()]),
            term![OR; c.clone(), a.clone()]
        );
        assert_eq!(
            fold(&term![Op::Ite; c.clone(), a.clone(), bool_lit(false)]),
            term![AND; c, a]
        );
    }

    #[test]
    fn eq() {
        let x = v_bv("x", 4);
        assert_eq!(fold(&term![Op::Eq; x.clone(), x.clone()]), bool_lit(true));
        assert_eq!(fold(&term![Op::Eq; int_lit(3), int_lit(4)]), bool_lit(false));
        let e = term![Op::Eq; x, bv_lit(1, 4)];
        assert_eq!(fold(&e), e);
    }

    #[test]
    fn bv_arith() {
        let x = v_bv("x", 4);
        assert_eq!(
            fold(&term![BV_ADD; bv_lit(9, 4), bv_lit(8, 4)]),
            bv_lit(1, 4)
        );
        assert_eq!(fold(&term![BV_ADD; x.clone(), bv_lit(0, 4)]), x);
        assert_eq!(
            fold(&term![BV_MUL; x.clone(), bv_lit(0, 4), bv_lit(3, 4)]),
            bv_lit(0, 4)
        );
        assert_eq!(fold(&term![BV_SUB; x.clone(), bv_lit(0, 4)]), x);
        assert_eq!(
            fold(&term![Op::BvNaryOp(BvNaryOp::Or); x.clone(), bv_lit(15, 4)]),
            bv_lit(15, 4)
        );
        assert_eq!(
            fold(&term![BV_ULT; bv_lit(2, 4), bv_lit(3, 4)]),
            bool_lit(true)
        );
    }

    #[test]
    fn int_arith() {
        let i = var("i".to_owned(), Sort::Int);
        assert_eq!(
            fold(&term![INT_ADD; int_lit(2), i.clone(), int_lit(-2)]),
            i.clone()
        );
        assert_eq!(
            fold(&term![INT_MUL; int_lit(2), i.clone(), int_lit(3)]),
            term![INT_MUL; i.clone(), int_lit(6)]
        );
        assert_eq!(fold(&term![INT_LT; int_lit(2), int_lit(3)]), bool_lit(true));
    }

    #[test]
    fn raw_does_not_fold() {
        let t = Raw.mk_app(&BV_ADD, vec![bv_lit(1, 4), bv_lit(2, 4)]);
        assert_eq!(t.cs.len(), 2);
        assert_eq!(ConstFold.mk_app(&BV_ADD, vec![bv_lit(1, 4), bv_lit(2, 4)]), bv_lit(3, 4));
    }
}
