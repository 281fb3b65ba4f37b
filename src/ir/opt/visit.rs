//! A bottom-up rewriting driver.
//!
//! A [Rewriter] offers every node of a term, children first, to a [RewriteCfg]. Nodes whose
//! children changed are rebuilt before they are offered; in proof mode the rebuilt node is tied to
//! the original by congruence.

use crate::ir::proof::{congruence, trans_opt, Proof};
use crate::ir::term::*;

use log::{debug, trace};

/// A local rewrite.
pub trait RewriteCfg {
    /// Whether proofs should be produced.
    fn proofs(&self) -> bool {
        false
    }

    /// Rewrite `t`, whose children have already been rewritten.
    ///
    /// Returns the replacement and, in proof mode, a proof that `t` equals it. `None` leaves `t`
    /// as it is.
    fn get_subst(&mut self, t: &Term) -> Option<(Term, Option<Proof>)>;
}

/// Applies a [RewriteCfg] everywhere in a term.
///
/// Results are memoized by node until [Rewriter::reset], so terms rewritten one after another
/// share work.
pub struct Rewriter<C> {
    cfg: C,
    cache: TermMap<(Term, Option<Proof>)>,
}

impl<C: RewriteCfg> Rewriter<C> {
    /// Create a driver for `cfg`.
    pub fn new(cfg: C) -> Self {
        Self {
            cfg,
            cache: TermMap::default(),
        }
    }

    /// The configuration.
    pub fn cfg(&self) -> &C {
        &self.cfg
    }

    /// The configuration, mutably.
    pub fn cfg_mut(&mut self) -> &mut C {
        &mut self.cfg
    }

    /// Forget memoized results.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Rewrite `t` bottom-up.
    ///
    /// Returns the result and, in proof mode, a proof that `t` equals it (`None` if they are the
    /// same term). Replacements are not revisited.
    pub fn rewrite(&mut self, t: &Term) -> (Term, Option<Proof>) {
        let mut children_added = TermSet::default();
        let mut stack = vec![t.clone()];
        while let Some(top) = stack.pop() {
            if !self.cache.contains_key(&top) {
                // was it missing?
                if children_added.insert(top.clone()) {
                    stack.push(top.clone());
                    stack.extend(
                        top.cs
                            .iter()
                            .filter(|c| !self.cache.contains_key(*c))
                            .cloned(),
                    );
                } else {
                    let res = self.visit(&top);
                    self.cache.insert(top, res);
                }
            }
        }
        debug!(target: "ir::opt::visit", "{} memoized rewrites", self.cache.len());
        self.cache[t].clone()
    }

    fn visit(&mut self, t: &Term) -> (Term, Option<Proof>) {
        let mut changed = false;
        let mut cs = Vec::with_capacity(t.cs.len());
        let mut premises = Vec::new();
        for c in &t.cs {
            let (new_c, pf) = &self.cache[c];
            if new_c != c {
                changed = true;
                premises.extend(pf.iter().cloned());
            }
            cs.push(new_c.clone());
        }
        let (rebuilt, pf) = if changed {
            let new_t = term(t.op.clone(), cs);
            let pf = if self.cfg.proofs() {
                Some(congruence(t.clone(), new_t.clone(), premises))
            } else {
                None
            };
            (new_t, pf)
        } else {
            (t.clone(), None)
        };
        match self.cfg.get_subst(&rebuilt) {
            Some((r, q)) => {
                trace!(target: "ir::opt::visit", "{} -> {}", rebuilt, r);
                (r, trans_opt(pf, q))
            }
            None => (rebuilt, pf),
        }
    }
}
