//! Random terms, for property tests.
//!
//! Terms are drawn over small fixed pools of variables so that one environment can evaluate any
//! sample. ITEs are over-represented, since they are what the rewriter moves around.

use super::*;

use quickcheck::{Arbitrary, Gen};
use rand::distributions::Distribution;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Width of the bit-vectors in samples.
pub const BV_WIDTH: usize = 4;

const BOOL_VARS: [&str; 4] = ["a", "b", "c", "d"];
const BV_VARS: [&str; 3] = ["x", "y", "z"];
const INT_VARS: [&str; 3] = ["i", "j", "k"];

/// `f : int -> int`
pub fn uf_f() -> Op {
    Op::Uf("f".to_owned(), vec![Sort::Int], Sort::Int)
}

/// `g : bv -> bv`
pub fn uf_g() -> Op {
    Op::Uf(
        "g".to_owned(),
        vec![Sort::BitVector(BV_WIDTH)],
        Sort::BitVector(BV_WIDTH),
    )
}

/// `p : int -> bool`
pub fn uf_p() -> Op {
    Op::Uf("p".to_owned(), vec![Sort::Int], Sort::Bool)
}

// A distribution of n usizes that sum to this value.
// (n, sum)
pub struct Sum(usize, usize);

impl Distribution<Vec<usize>> for Sum {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut acc = self.1;
        let mut ns = Vec::new();
        assert!(acc == 0 || self.0 > 0);
        while acc > 0 && ns.len() < self.0 {
            let x = rng.gen_range(0..acc);
            acc -= x;
            ns.push(x);
        }
        while ns.len() < self.0 {
            ns.push(0);
        }
        if acc > 0 {
            *ns.last_mut().unwrap() += acc;
        }
        ns.shuffle(rng);
        ns
    }
}

/// Terms of some sort with exactly `size` nodes (counting shared nodes once per use).
pub struct FixedSizeDist {
    pub size: usize,
    pub sort: Sort,
}

impl FixedSizeDist {
    fn leaf<R: Rng + ?Sized>(&self, rng: &mut R) -> Op {
        let konst = rng.gen_bool(0.3);
        match &self.sort {
            Sort::Bool if konst => Op::Const(Value::Bool(rng.gen())),
            Sort::Bool => Op::Var(
                BOOL_VARS.choose(rng).unwrap().to_string(),
                Sort::Bool,
            ),
            Sort::BitVector(w) if konst => Op::Const(Value::BitVector(BitVector::new(
                Integer::from(rng.gen_range(0..(1u32 << *w))),
                *w,
            ))),
            Sort::BitVector(w) => Op::Var(
                BV_VARS.choose(rng).unwrap().to_string(),
                Sort::BitVector(*w),
            ),
            Sort::Int if konst => Op::Const(Value::Int(Integer::from(rng.gen_range(-4i32..8)))),
            Sort::Int => Op::Var(INT_VARS.choose(rng).unwrap().to_string(), Sort::Int),
        }
    }

    fn ops(&self) -> Vec<Op> {
        match &self.sort {
            Sort::Bool => vec![
                Op::Ite,
                Op::Ite,
                Op::Not,
                uf_p(),
                Op::Implies,
                Op::Eq,
                Op::Eq,
                Op::BvBinPred(BvBinPred::Ult),
                Op::BvBinPred(BvBinPred::Sle),
                Op::IntBinPred(IntBinPred::Lt),
                Op::IntBinPred(IntBinPred::Ge),
                AND,
                OR,
                XOR,
            ],
            Sort::BitVector(_) => vec![
                Op::Ite,
                Op::Ite,
                Op::BvUnOp(BvUnOp::Neg),
                Op::BvUnOp(BvUnOp::Not),
                uf_g(),
                Op::BvBinOp(BvBinOp::Sub),
                Op::BvBinOp(BvBinOp::Udiv),
                Op::BvBinOp(BvBinOp::Urem),
                BV_ADD,
                BV_MUL,
                Op::BvNaryOp(BvNaryOp::And),
                Op::BvNaryOp(BvNaryOp::Or),
                Op::BvNaryOp(BvNaryOp::Xor),
            ],
            Sort::Int => vec![Op::Ite, Op::Ite, uf_f(), INT_ADD, INT_MUL],
        }
    }

    fn child_sorts<R: Rng + ?Sized>(&self, o: &Op, arity: usize, rng: &mut R) -> Vec<Sort> {
        match o {
            Op::Ite => vec![Sort::Bool, self.sort.clone(), self.sort.clone()],
            Op::Eq => {
                let s = [Sort::Bool, Sort::BitVector(BV_WIDTH), Sort::Int]
                    .choose(rng)
                    .unwrap()
                    .clone();
                vec![s.clone(), s]
            }
            Op::BvBinPred(_) => vec![Sort::BitVector(BV_WIDTH); 2],
            Op::IntBinPred(_) => vec![Sort::Int; 2],
            Op::Uf(_, args, _) => args.clone(),
            _ => vec![self.sort.clone(); arity],
        }
    }
}

impl Distribution<Term> for FixedSizeDist {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Term {
        if self.size <= 1 {
            return leaf_term(self.leaf(rng));
        }
        // every sort has a unary operator, so something always fits
        let ops: Vec<Op> = self
            .ops()
            .into_iter()
            .filter(|o| o.arity().map_or(self.size >= 3, |a| a < self.size))
            .collect();
        let o = ops.choose(rng).unwrap().clone();
        let a = o.arity().unwrap_or_else(|| rng.gen_range(2..self.size));
        let ns = Sum(a, self.size - 1 - a).sample(rng);
        let sorts = self.child_sorts(&o, a, rng);
        let cs = ns
            .into_iter()
            .zip(sorts)
            .map(|(n, sort)| FixedSizeDist { size: n + 1, sort }.sample(rng))
            .collect();
        term(o, cs)
    }
}

/// An environment binding every variable a sample can mention.
pub fn arbitrary_env(g: &mut Gen) -> FxHashMap<String, Value> {
    let mut env = FxHashMap::default();
    for v in BOOL_VARS {
        env.insert(v.to_owned(), Value::Bool(bool::arbitrary(g)));
    }
    for v in BV_VARS {
        let u = u8::arbitrary(g) % (1 << BV_WIDTH);
        env.insert(
            v.to_owned(),
            Value::BitVector(BitVector::new(Integer::from(u), BV_WIDTH)),
        );
    }
    for v in INT_VARS {
        env.insert(v.to_owned(), Value::Int(Integer::from(i8::arbitrary(g))));
    }
    env
}

/// A boolean term and an environment for it.
#[derive(Clone, Debug)]
pub struct ArbitraryTermEnv(pub Term, pub FxHashMap<String, Value>);

impl Arbitrary for ArbitraryTermEnv {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(u64::arbitrary(g));
        let t = FixedSizeDist {
            size: g.size().max(1),
            sort: Sort::Bool,
        }
        .sample(&mut rng);
        ArbitraryTermEnv(t, arbitrary_env(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let vs = self.1.clone();
        let ts = PostOrderIter::new(self.0.clone()).collect::<Vec<_>>();

        Box::new(
            ts.into_iter()
                .rev()
                .skip(1)
                .map(move |t| ArbitraryTermEnv(t, vs.clone())),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sizes_and_sorts() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        for size in 1..40 {
            for sort in [Sort::Bool, Sort::BitVector(BV_WIDTH), Sort::Int] {
                let t = FixedSizeDist {
                    size,
                    sort: sort.clone(),
                }
                .sample(&mut rng);
                assert_eq!(check(&t), sort);
            }
        }
    }

    #[test]
    fn env_covers_samples() {
        let mut g = Gen::new(30);
        for _ in 0..20 {
            let ArbitraryTermEnv(t, env) = ArbitraryTermEnv::arbitrary(&mut g);
            assert_eq!(eval(&t, &env).sort(), Sort::Bool);
        }
    }
}
