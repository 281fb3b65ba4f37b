//! Which applications ITEs are pulled out of.

use super::PullIteTree;
use crate::cfg::cfg_or_default;
use crate::ir::opt::cfold::{ConstFold, Simplifier};
use crate::ir::opt::visit::{RewriteCfg, Rewriter};
use crate::ir::proof::Proof;
use crate::ir::term::*;

use log::trace;
use pull_ite_opt::TargetPolicy;

/// Decides whether an application should have its ITEs pulled.
pub trait IteTarget {
    /// Whether `t` is a target. Must not depend on anything but `t`.
    fn is_target(&self, t: &Term) -> bool;
}

/// Any built-in application with an ITE argument, ITEs included.
#[derive(Default, Debug, Clone, Copy)]
pub struct AllTargets;

impl IteTarget for AllTargets {
    fn is_target(&self, t: &Term) -> bool {
        t.op.family().is_some() && t.cs.iter().any(|c| c.is_ite())
    }
}

/// Binary boolean built-ins with a value argument and a non-boolean ITE argument, like
/// `(= 3 (ite c x y))`.
///
/// Pulling the ITE out of these duplicates nothing big, and often folds both branches.
#[derive(Default, Debug, Clone, Copy)]
pub struct CheapTargets;

impl IteTarget for CheapTargets {
    fn is_target(&self, t: &Term) -> bool {
        let r = t.cs.len() == 2
            && t.op.family().is_some()
            && sort(t) == Sort::Bool
            && t.cs.iter().any(|c| c.is_value())
            && t.cs.iter().any(|c| c.is_term_ite());
        trace!(target: "pull_ite::target", "{}\nresult: {}", t, r);
        r
    }
}

impl IteTarget for TargetPolicy {
    fn is_target(&self, t: &Term) -> bool {
        match self {
            TargetPolicy::All => AllTargets.is_target(t),
            TargetPolicy::Cheap => CheapTargets.is_target(t),
        }
    }
}

/// Pulls ITEs out of the applications an [IteTarget] picks.
pub struct PullIteCfg<T, S> {
    target: T,
    engine: PullIteTree<S>,
}

impl<T: IteTarget, S: Simplifier> PullIteCfg<T, S> {
    /// Pull ITEs out of `target`s, building terms with `simp`.
    pub fn new(target: T, simp: S, proofs: bool) -> Self {
        Self {
            target,
            engine: PullIteTree::new(simp, proofs),
        }
    }

    /// The target policy.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The engine.
    pub fn engine(&self) -> &PullIteTree<S> {
        &self.engine
    }

    /// A driver that applies this everywhere in a term.
    pub fn into_rewriter(self) -> Rewriter<Self> {
        Rewriter::new(self)
    }
}

impl PullIteCfg<TargetPolicy, ConstFold> {
    /// Configured by [crate::cfg].
    pub fn from_cfg() -> Self {
        let opt = &cfg_or_default().pull_ite;
        Self::new(opt.policy, ConstFold, opt.proofs)
    }
}

impl<T: IteTarget, S: Simplifier> RewriteCfg for PullIteCfg<T, S> {
    fn proofs(&self) -> bool {
        self.engine.proofs()
    }

    fn get_subst(&mut self, t: &Term) -> Option<(Term, Option<Proof>)> {
        if !self.target.is_target(t) {
            return None;
        }
        let (r, pf) = self.engine.rewrite(t);
        if &r != t {
            Some((r, pf))
        } else {
            None
        }
    }
}
