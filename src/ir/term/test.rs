#![allow(missing_docs)]

use super::*;

#[test]
fn eq() {
    let v = var("a".to_owned(), Sort::Bool);
    let u = var("a".to_owned(), Sort::Bool);
    let w = var("b".to_owned(), Sort::Bool);
    assert_eq!(v, u);
    assert!(v != w);
    assert!(u != w);
    // same name, other sort
    assert!(v != var("a".to_owned(), Sort::Int));
}

#[test]
fn sharing() {
    let x = var("x".to_owned(), Sort::Int);
    let before = terms_allocated();
    let a = term![INT_ADD; x.clone(), int_lit(1)];
    let b = term![INT_ADD; x, int_lit(1)];
    assert_eq!(a, b);
    assert_eq!(a.id(), b.id());
    // `1` and the sum
    assert_eq!(terms_allocated() - before, 2);
}

#[test]
fn queries() {
    let c = var("c".to_owned(), Sort::Bool);
    let x = var("x".to_owned(), Sort::Int);
    let ti = term![Op::Ite; c.clone(), x, int_lit(2)];
    let bi = term![Op::Ite; c.clone(), c.clone(), bool_lit(false)];
    assert!(ti.is_ite() && ti.is_term_ite());
    assert!(bi.is_ite() && !bi.is_term_ite());
    assert!(!c.is_ite() && c.is_var() && !c.is_value());
    assert_eq!(ti.cs[2].as_int_opt(), Some(&Integer::from(2)));
    assert_eq!(bi.cs[2].as_bool_opt(), Some(false));
    assert_eq!(bv_lit(3, 4).as_bv_opt().map(|b| b.width()), Some(4));
    assert_eq!(sort(&ti), Sort::Int);
}

#[test]
fn families() {
    assert_eq!(Op::Ite.family(), Some(Family::Basic));
    assert_eq!(BV_ADD.family(), Some(Family::Bv));
    assert_eq!(INT_LT.family(), Some(Family::Arith));
    assert_eq!(Op::Const(Value::Bool(true)).family(), Some(Family::Basic));
    assert_eq!(Op::Var("x".to_owned(), Sort::Int).family(), None);
    assert_eq!(Op::Uf("f".to_owned(), vec![], Sort::Int).family(), None);
}

#[test]
fn post_order_visits_shared_once() {
    let x = var("x".to_owned(), Sort::Int);
    let s = term![INT_ADD; x.clone(), x.clone()];
    let t = term![INT_MUL; s.clone(), s.clone()];
    let order: Vec<Term> = PostOrderIter::new(t.clone()).collect();
    assert_eq!(order, vec![x, s, t]);
}

#[test]
fn post_order_deep() {
    let c = var("c".to_owned(), Sort::Bool);
    let mut t = int_lit(0);
    for i in 0..20_000 {
        t = term![Op::Ite; c.clone(), int_lit(i), t];
    }
    assert_eq!(PostOrderIter::new(t).count(), 20_000 + 20_000 + 1);
}

#[test]
fn gc() {
    let before = term_count();
    {
        let x = var("gc_x".to_owned(), Sort::BitVector(8));
        let _t = term![BV_ADD; x.clone(), x];
        assert_eq!(term_count(), before + 2);
    }
    garbage_collect();
    assert_eq!(term_count(), before);
}
