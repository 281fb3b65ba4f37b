//! IR Evaluation

use super::{
    BitVector, BoolNaryOp, BvBinOp, BvBinPred, BvNaryOp, BvUnOp, FxHashMap, IntBinPred, IntNaryOp,
    Integer, Op, Sort, Term, TermMap, Value,
};

use log::trace;

use std::hash::{Hash, Hasher};

/// Evaluate the term `t`, using variable values in `h` and storing intermediate evaluations in
/// the cache `vs`.
pub fn eval_cached<'a>(
    t: &Term,
    h: &FxHashMap<String, Value>,
    vs: &'a mut TermMap<Value>,
) -> &'a Value {
    // (children pushed, term)
    let mut stack = vec![(false, t.clone())];
    while let Some((children_pushed, node)) = stack.pop() {
        if vs.contains_key(&node) {
            continue;
        }
        if children_pushed {
            eval_value(vs, h, node);
        } else {
            stack.push((true, node.clone()));
            for c in node.cs() {
                // vs doubles as our visited set.
                if !vs.contains_key(c) {
                    stack.push((false, c.clone()));
                }
            }
        }
    }
    &vs[t]
}

/// Evaluate the term `t`, using variable values in `h`.
pub fn eval(t: &Term, h: &FxHashMap<String, Value>) -> Value {
    let mut vs = TermMap::<Value>::default();
    eval_cached(t, h, &mut vs).clone()
}

fn eval_value(vs: &mut TermMap<Value>, h: &FxHashMap<String, Value>, t: Term) {
    let args: Vec<&Value> = t.cs().iter().map(|c| &vs[c]).collect();
    let v = eval_op(t.op(), &args, h);
    trace!("Eval {} => {}", t, v);
    vs.insert(t, v);
}

/// Evaluate a single operator applied to values.
pub fn eval_op(op: &Op, args: &[&Value], var_vals: &FxHashMap<String, Value>) -> Value {
    match op {
        Op::Var(n, _) => var_vals
            .get(n)
            .unwrap_or_else(|| panic!("Missing var: {} in {:?}", n, var_vals))
            .clone(),
        Op::Const(v) => v.clone(),
        Op::Ite => args[if args[0].as_bool() { 1 } else { 2 }].clone(),
        Op::Eq => Value::Bool(args[0] == args[1]),
        Op::Not => Value::Bool(!args[0].as_bool()),
        Op::Implies => Value::Bool(!args[0].as_bool() || args[1].as_bool()),
        Op::BoolNaryOp(BoolNaryOp::Or) => Value::Bool(args.iter().any(|a| a.as_bool())),
        Op::BoolNaryOp(BoolNaryOp::And) => Value::Bool(args.iter().all(|a| a.as_bool())),
        Op::BoolNaryOp(BoolNaryOp::Xor) => Value::Bool(
            args.iter()
                .map(|a| a.as_bool())
                .fold(false, std::ops::BitXor::bitxor),
        ),
        Op::BvBinOp(o) => Value::BitVector({
            let a = args[0].as_bv().clone();
            let b = args[1].as_bv().clone();
            match o {
                BvBinOp::Udiv => a / &b,
                BvBinOp::Urem => a % &b,
                BvBinOp::Sub => a - b,
            }
        }),
        Op::BvUnOp(o) => Value::BitVector({
            let a = args[0].as_bv().clone();
            match o {
                BvUnOp::Not => !a,
                BvUnOp::Neg => -a,
            }
        }),
        Op::BvNaryOp(o) => Value::BitVector({
            let mut xs = args.iter().map(|a| a.as_bv().clone());
            let f = xs.next().expect("empty bit-vector operator");
            xs.fold(
                f,
                match o {
                    BvNaryOp::Add => std::ops::Add::add,
                    BvNaryOp::Mul => std::ops::Mul::mul,
                    BvNaryOp::Xor => std::ops::BitXor::bitxor,
                    BvNaryOp::Or => std::ops::BitOr::bitor,
                    BvNaryOp::And => std::ops::BitAnd::bitand,
                },
            )
        }),
        Op::BvBinPred(o) => Value::Bool({
            let a = args[0].as_bv();
            let b = args[1].as_bv();
            match o {
                BvBinPred::Sge => a.as_sint() >= b.as_sint(),
                BvBinPred::Sgt => a.as_sint() > b.as_sint(),
                BvBinPred::Sle => a.as_sint() <= b.as_sint(),
                BvBinPred::Slt => a.as_sint() < b.as_sint(),
                BvBinPred::Uge => a.uint() >= b.uint(),
                BvBinPred::Ugt => a.uint() > b.uint(),
                BvBinPred::Ule => a.uint() <= b.uint(),
                BvBinPred::Ult => a.uint() < b.uint(),
            }
        }),
        Op::IntBinPred(o) => Value::Bool({
            let a = args[0].as_int();
            let b = args[1].as_int();
            match o {
                IntBinPred::Ge => a >= b,
                IntBinPred::Gt => a > b,
                IntBinPred::Le => a <= b,
                IntBinPred::Lt => a < b,
            }
        }),
        Op::IntNaryOp(o) => Value::Int({
            let mut xs = args.iter().map(|a| a.as_int().clone());
            let f = xs.next().expect("empty integer operator");
            xs.fold(
                f,
                match o {
                    IntNaryOp::Add => std::ops::Add::add,
                    IntNaryOp::Mul => std::ops::Mul::mul,
                },
            )
        }),
        Op::Uf(name, _, ret) => uf_value(name, args, ret),
    }
}

/// A fixed interpretation for uninterpreted functions: a hash of the name and arguments,
/// truncated to the return sort.
fn uf_value(name: &str, args: &[&Value], ret: &Sort) -> Value {
    let mut hasher = fxhash::FxHasher64::default();
    name.hash(&mut hasher);
    args.hash(&mut hasher);
    let hash = hasher.finish();
    match ret {
        Sort::Bool => Value::Bool(hash & 1 == 1),
        Sort::BitVector(w) => Value::BitVector(BitVector::wrapping(Integer::from(hash), *w)),
        Sort::Int => Value::Int(Integer::from(hash % 16)),
    }
}
