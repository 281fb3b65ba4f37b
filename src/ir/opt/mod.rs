//! Optimizations
pub mod cfold;
pub mod pull_ite;
pub mod visit;

use super::proof::{rewrite, trans_opt, Proof};
use super::term::*;

use log::{debug, trace};
use pull_ite_opt::TargetPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// An optimization pass
pub enum Opt {
    /// Fold constants
    ConstantFold,
    /// Pull ITEs out of the applications the policy picks
    PullIte(TargetPolicy),
}

/// Run optimizations on `assertions`, in this order, returning the new assertions.
pub fn opt<I: IntoIterator<Item = Opt>>(assertions: Vec<Term>, optimizations: I) -> Vec<Term> {
    opt_with_proofs(assertions, optimizations, false)
        .into_iter()
        .map(|(a, _)| a)
        .collect()
}

/// Like [opt], but also returns, for each assertion, a proof that the original equals the new one
/// when `proofs` is set (`None` if it did not change).
pub fn opt_with_proofs<I: IntoIterator<Item = Opt>>(
    assertions: Vec<Term>,
    optimizations: I,
    proofs: bool,
) -> Vec<(Term, Option<Proof>)> {
    let frequent_gc = crate::cfg::cfg_or_default().ir.frequent_gc;
    let mut outs: Vec<(Term, Option<Proof>)> = assertions.into_iter().map(|a| (a, None)).collect();
    for i in optimizations {
        debug!("Applying: {:?}", i);
        match i {
            Opt::ConstantFold => {
                let mut cache = TermMap::default();
                for (a, pf) in &mut outs {
                    let new_a = cfold::fold_cache(a, &mut cache);
                    if &new_a != a {
                        let step = proofs.then(|| rewrite(a.clone(), new_a.clone()));
                        *pf = trans_opt(pf.take(), step);
                        *a = new_a;
                    }
                }
            }
            Opt::PullIte(policy) => {
                let mut rw =
                    pull_ite::PullIteCfg::new(policy, cfold::ConstFold, proofs).into_rewriter();
                for (a, pf) in &mut outs {
                    let (new_a, step) = rw.rewrite(a);
                    *pf = trans_opt(pf.take(), step);
                    *a = new_a;
                }
            }
        }
        debug!("After {:?}: {} assertions", i, outs.len());
        if let Some((a, _)) = outs.first() {
            trace!("After {:?}: {}", i, a);
        }
        debug!("After {:?}: {} terms", i, term_count());
        if frequent_gc {
            garbage_collect();
        }
    }
    if !frequent_gc {
        garbage_collect();
    }
    outs
}
