//! Pulling ITEs out of applications.
//!
//! The rewrite turns `f(a, ite(c, t, e))` into `ite(c, f(a, t), f(a, e))`, and pushes `f` through
//! the whole tree of ITEs found in that argument position, so that afterwards `f` is only applied
//! to the leaves of the tree.
//!
//! [PullIteTree] is the one-step rewrite. Which applications it is tried on is up to an
//! [IteTarget]; [PullIteCfg] combines the two for a [Rewriter](super::visit::Rewriter).

use super::cfold::{ConstFold, Simplifier};
use super::visit::Rewriter;
use crate::ir::proof::{congruence, rewrite, transitivity, Proof};
use crate::ir::term::*;

use log::debug;

mod target;

pub use target::{AllTargets, CheapTargets, IteTarget, PullIteCfg};


/// An application with one argument held open.
struct Hole {
    op: Op,
    args: Vec<Term>,
    idx: usize,
}

impl Hole {
    /// The arguments, with `t` in the hole.
    fn fill(&self, t: &Term) -> Vec<Term> {
        let mut args = self.args.clone();
        args[self.idx] = t.clone();
        args
    }

    /// The unsimplified application, with `t` in the hole.
    fn apply(&self, t: &Term) -> Term {
        term(self.op.clone(), self.fill(t))
    }
}

/// The ITE-pulling rewrite.
///
/// Applications are rebuilt through a [Simplifier]. With proofs on, every result comes with a
/// proof that it equals the input.
pub struct PullIteTree<S> {
    simp: S,
    proofs: bool,
    /// Results for the nodes of the current ITE tree, with the current hole.
    cache: TermMap<(Term, Option<Proof>)>,
    todo: Vec<Term>,
}

impl<S: Simplifier> PullIteTree<S> {
    /// Create an engine that builds terms with `simp`.
    pub fn new(simp: S, proofs: bool) -> Self {
        Self {
            simp,
            proofs,
            cache: TermMap::default(),
            todo: Vec::new(),
        }
    }

    /// Whether proofs are produced.
    pub fn proofs(&self) -> bool {
        self.proofs
    }

    /// The simplifier.
    pub fn simplifier(&self) -> &S {
        &self.simp
    }

    /// Pull the first ITE argument of `app` to the top.
    ///
    /// Returns `app` itself, with no proof, if no argument is an ITE.
    pub fn rewrite(&mut self, app: &Term) -> (Term, Option<Proof>) {
        let idx = match app.cs.iter().position(|c| c.is_ite()) {
            Some(idx) => idx,
            None => return (app.clone(), None),
        };
        let hole = Hole {
            op: app.op.clone(),
            args: app.cs.clone(),
            idx,
        };
        let ite = app.cs[idx].clone();
        self.todo.push(ite.clone());
        while let Some(n) = self.todo.last() {
            if self.cache.contains_key(n) {
                self.todo.pop();
                continue;
            }
            let n = n.clone();
            if self.visit_children(&n) {
                self.todo.pop();
                let res = self.reduce(&hole, &n);
                let prev = self.cache.insert(n, res);
                debug_assert!(prev.is_none());
            }
        }
        let res = self.cache[&ite].clone();
        debug!(
            target: "pull_ite",
            "{} ite nodes below {} at argument {}",
            self.cache.len(),
            hole.op,
            idx
        );
        self.cache.clear();
        self.todo.clear();
        res
    }

    /// Push the branches of `n` that are not yet done. Returns whether `n` can be reduced now.
    fn visit_children(&mut self, n: &Term) -> bool {
        if !n.is_ite() {
            return true;
        }
        let mut ready = true;
        let (t, e) = (&n.cs[1], &n.cs[2]);
        if !self.cache.contains_key(t) {
            self.todo.push(t.clone());
            ready = false;
        }
        if t != e && !self.cache.contains_key(e) {
            self.todo.push(e.clone());
            ready = false;
        }
        ready
    }

    /// Rewrite the hole's application with `n` in the hole.
    fn reduce(&mut self, hole: &Hole, n: &Term) -> (Term, Option<Proof>) {
        if !n.is_ite() {
            let args = hole.fill(n);
            let r = self.simp.mk_app(&hole.op, args.clone());
            if !self.proofs {
                return (r, None);
            }
            let old = term(hole.op.clone(), args);
            let pf = (old != r).then(|| rewrite(old, r.clone()));
            return (r, pf);
        }
        let (c, t_old, e_old) = (&n.cs[0], &n.cs[1], &n.cs[2]);
        let (t, t_pf) = self.cache[t_old].clone();
        let (e, e_pf) = self.cache[e_old].clone();
        let r = self
            .simp
            .mk_app(&Op::Ite, vec![c.clone(), t.clone(), e.clone()]);
        if !self.proofs {
            return (r, None);
        }
        // f(.. ite(c, t_old, e_old) ..) = ite(c, f(.. t_old ..), f(.. e_old ..))
        let tmp1 = term![Op::Ite; c.clone(), hole.apply(t_old), hole.apply(e_old)];
        let pf1 = rewrite(hole.apply(n), tmp1.clone());
        // ite(c, f(.. t_old ..), f(.. e_old ..)) = ite(c, t, e)
        let tmp2 = term![Op::Ite; c.clone(), t, e];
        let premises: Vec<Proof> = t_pf.into_iter().chain(e_pf).collect();
        let pf2 = if premises.is_empty() {
            pf1
        } else {
            transitivity(pf1, congruence(tmp1, tmp2.clone(), premises))
        };
        // ite(c, t, e) = r
        let pf3 = if tmp2 != r {
            transitivity(pf2, rewrite(tmp2, r.clone()))
        } else {
            pf2
        };
        (r, Some(pf3))
    }
}

/// Pull ITEs to the top of `t`, everywhere the default policy allows.
pub fn pull_ite(t: &Term) -> Term {
    Rewriter::new(PullIteCfg::new(AllTargets, ConstFold, false))
        .rewrite(t)
        .0
}

/// Pull ITEs out of small boolean applications with a value argument only.
pub fn pull_cheap_ite(t: &Term) -> Term {
    Rewriter::new(PullIteCfg::new(CheapTargets, ConstFold, false))
        .rewrite(t)
        .0
}

/// [pull_ite], with a proof that the result equals `t` (`None` if it is `t`).
pub fn pull_ite_with_proof(t: &Term) -> (Term, Option<Proof>) {
    Rewriter::new(PullIteCfg::new(AllTargets, ConstFold, true)).rewrite(t)
}
