//! Printing terms as s-expressions.

use super::*;

use std::fmt::{self, Debug, Display, Formatter};

impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Op::Ite => write!(f, "ite"),
            Op::Eq => write!(f, "="),
            Op::Var(n, _) => write!(f, "{}", n),
            Op::Const(c) => write!(f, "{}", c),
            Op::Not => write!(f, "not"),
            Op::Implies => write!(f, "=>"),
            Op::BoolNaryOp(a) => write!(f, "{}", a),
            Op::BvBinOp(a) => write!(f, "{}", a),
            Op::BvBinPred(a) => write!(f, "{}", a),
            Op::BvNaryOp(a) => write!(f, "{}", a),
            Op::BvUnOp(a) => write!(f, "{}", a),
            Op::IntNaryOp(a) => write!(f, "{}", a),
            Op::IntBinPred(a) => write!(f, "{}", a),
            Op::Uf(n, _, _) => write!(f, "{}", n),
        }
    }
}

impl Display for BoolNaryOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BoolNaryOp::And => write!(f, "and"),
            BoolNaryOp::Or => write!(f, "or"),
            BoolNaryOp::Xor => write!(f, "xor"),
        }
    }
}

impl Display for BvBinOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BvBinOp::Sub => write!(f, "bvsub"),
            BvBinOp::Udiv => write!(f, "bvudiv"),
            BvBinOp::Urem => write!(f, "bvurem"),
        }
    }
}

impl Display for BvBinPred {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BvBinPred::Ult => write!(f, "bvult"),
            BvBinPred::Ugt => write!(f, "bvugt"),
            BvBinPred::Ule => write!(f, "bvule"),
            BvBinPred::Uge => write!(f, "bvuge"),
            BvBinPred::Slt => write!(f, "bvslt"),
            BvBinPred::Sgt => write!(f, "bvsgt"),
            BvBinPred::Sle => write!(f, "bvsle"),
            BvBinPred::Sge => write!(f, "bvsge"),
        }
    }
}

impl Display for BvNaryOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BvNaryOp::Add => write!(f, "bvadd"),
            BvNaryOp::Mul => write!(f, "bvmul"),
            BvNaryOp::Or => write!(f, "bvor"),
            BvNaryOp::And => write!(f, "bvand"),
            BvNaryOp::Xor => write!(f, "bvxor"),
        }
    }
}

impl Display for BvUnOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BvUnOp::Not => write!(f, "bvnot"),
            BvUnOp::Neg => write!(f, "bvneg"),
        }
    }
}

impl Display for IntNaryOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            IntNaryOp::Add => write!(f, "+"),
            IntNaryOp::Mul => write!(f, "*"),
        }
    }
}

impl Display for IntBinPred {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            IntBinPred::Lt => write!(f, "<"),
            IntBinPred::Gt => write!(f, ">"),
            IntBinPred::Le => write!(f, "<="),
            IntBinPred::Ge => write!(f, ">="),
        }
    }
}

impl Display for Sort {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "bool"),
            Sort::BitVector(n) => write!(f, "(bv {})", n),
            Sort::Int => write!(f, "int"),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::BitVector(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
        }
    }
}

/// Writes `(op cs..)`, naming children by `names` where it has them.
///
/// Uses an explicit stack, so deep terms do not recurse.
fn write_app(op: &Op, cs: &[Term], names: &TermMap<usize>, f: &mut Formatter) -> fmt::Result {
    // `None` closes an application
    let mut stack: Vec<Option<&Term>> = vec![None];
    stack.extend(cs.iter().rev().map(Some));
    write!(f, "({}", op)?;
    while let Some(next) = stack.pop() {
        let t = match next {
            Some(t) => t,
            None => {
                write!(f, ")")?;
                continue;
            }
        };
        if let Some(n) = names.get(t) {
            write!(f, " '{}", n)?;
        } else if t.cs.is_empty() {
            write!(f, " {}", t.op)?;
        } else {
            write!(f, " ({}", t.op)?;
            stack.push(None);
            stack.extend(t.cs.iter().rev().map(Some));
        }
    }
    Ok(())
}

/// Prints the term, let-binding every application with more than one parent so that shared
/// subterms are printed once.
impl Display for TermData {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.cs.is_empty() {
            return write!(f, "{}", self.op);
        }
        let mut parent_counts = TermMap::<usize>::default();
        let mut shared = Vec::new();
        for t in PostOrderIter::from_roots(self.cs.iter().cloned()) {
            for c in &t.cs {
                *parent_counts.entry(c.clone()).or_insert(0) += 1;
            }
            shared.push(t);
        }
        for c in &self.cs {
            *parent_counts.entry(c.clone()).or_insert(0) += 1;
        }
        // post-order, so each binding only refers to earlier ones
        shared.retain(|t| !t.cs.is_empty() && parent_counts[t] > 1);
        if shared.is_empty() {
            return write_app(&self.op, &self.cs, &TermMap::default(), f);
        }
        let mut names = TermMap::<usize>::default();
        write!(f, "(let (")?;
        for (i, t) in shared.into_iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "('{} ", i)?;
            write_app(&t.op, &t.cs, &names, f)?;
            write!(f, ")")?;
            names.insert(t, i);
        }
        write!(f, ") ")?;
        write_app(&self.op, &self.cs, &names, f)?;
        write!(f, ")")
    }
}

impl Debug for TermData {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sexpr() {
        let c = var("c".to_owned(), Sort::Bool);
        let x = var("x".to_owned(), Sort::Int);
        let t = term![Op::Eq; term![Op::Ite; c, x, int_lit(3)], int_lit(-1)];
        assert_eq!(format!("{}", t), "(= (ite c x 3) -1)");
    }

    #[test]
    fn bv_and_uf() {
        let f = Op::Uf(
            "f".to_owned(),
            vec![Sort::BitVector(4)],
            Sort::Bool,
        );
        let t = term![f; term![BV_ADD; bv_lit(1, 4), bv_lit(2, 4)]];
        assert_eq!(format!("{}", t), "(f (bvadd #b0001 #b0010))");
    }

    #[test]
    fn shared_subterms_are_bound() {
        let x = var("x".to_owned(), Sort::Int);
        let d = term![INT_ADD; x.clone(), x];
        let t = term![INT_ADD; d.clone(), d];
        assert_eq!(format!("{}", t), "(let (('0 (+ x x))) (+ '0 '0))");
        assert_eq!(format!("{:?}", t), format!("{}", t));
    }

    #[test]
    fn doubling_chain_prints_linearly() {
        let mut t = var("x".to_owned(), Sort::Int);
        for _ in 0..20 {
            t = term![INT_ADD; t.clone(), t];
        }
        let s = format!("{}", t);
        // one binding per level below the root
        assert_eq!(s.matches("('").count(), 19);
        assert!(s.len() < 20 * 30, "{}", s);
    }

    #[test]
    fn deep_term_prints_without_recursion() {
        let n = 10_000;
        let mut t = var("b".to_owned(), Sort::Bool);
        for _ in 0..n {
            t = term![Op::Not; t];
        }
        let s = format!("{}", t);
        assert_eq!(s.len(), 6 * n + 1);
        assert!(s.starts_with("(not (not "));
        assert!(s.ends_with("b))"));
    }
}
