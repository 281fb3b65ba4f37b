//! Checking proof certificates.

use super::{Proof, ProofData, Rule};
use crate::ir::term::eval::eval_cached;
use crate::ir::term::{check, Op, Term, TermMap, TermSet, Value};

use fxhash::{FxHashMap, FxHashSet};
use log::debug;
use thiserror::Error;

/// Why a certificate was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    /// The conclusion is not the expected equality.
    #[error("the proof concludes {lhs} = {rhs}, but {expected_lhs} = {expected_rhs} was expected")]
    Conclusion {
        /// concluded left side
        lhs: Term,
        /// concluded right side
        rhs: Term,
        /// expected left side
        expected_lhs: Term,
        /// expected right side
        expected_rhs: Term,
    },
    /// A step relates terms of different sorts.
    #[error("a step relates {lhs} and {rhs}, which have different sorts")]
    SortMismatch {
        /// left side
        lhs: Term,
        /// right side
        rhs: Term,
    },
    /// A rewrite step relates terms that evaluate differently.
    #[error("the rewrite {lhs} = {rhs} is false under {env:?}")]
    Unsound {
        /// left side
        lhs: Term,
        /// right side
        rhs: Term,
        /// a counterexample
        env: FxHashMap<String, Value>,
    },
    /// The sides of a congruence step have different operators or arities.
    #[error("congruence between {lhs} and {rhs}, which have different operators or arities")]
    CongruenceShape {
        /// left side
        lhs: Term,
        /// right side
        rhs: Term,
    },
    /// Some differing argument pair of a congruence step has no premise.
    #[error("congruence argument {idx} is unjustified: {lhs} vs. {rhs}")]
    CongruenceArg {
        /// the argument index
        idx: usize,
        /// left argument
        lhs: Term,
        /// right argument
        rhs: Term,
    },
    /// A congruence step has premises that justify no argument.
    #[error("congruence between {lhs} and {rhs} has {extra} unused premises")]
    UnusedPremises {
        /// left side
        lhs: Term,
        /// right side
        rhs: Term,
        /// number of unused premises
        extra: usize,
    },
    /// A rewrite step mentions a variable that a sample environment does not bind.
    #[error("variable {name} is unbound in {env:?}")]
    MissingVar {
        /// the variable
        name: String,
        /// the environment without it
        env: FxHashMap<String, Value>,
    },
}

/// Validates proof certificates.
///
/// Rewrite steps are trusted up to sorting and to the sample environments the checker holds:
/// under each, both sides must evaluate equal. Without environments, only the structure of the
/// proof is checked.
#[derive(Default, Debug, Clone)]
pub struct ProofChecker {
    envs: Vec<FxHashMap<String, Value>>,
}

impl ProofChecker {
    /// A checker that validates structure only.
    pub fn new() -> Self {
        Self::default()
    }

    /// A checker that also evaluates rewrite steps under `envs`.
    ///
    /// A rewrite step that mentions a variable missing from some environment is rejected with
    /// [ProofError::MissingVar].
    pub fn with_envs(envs: Vec<FxHashMap<String, Value>>) -> Self {
        Self { envs }
    }

    /// Check that `p` is a valid proof of `lhs = rhs`.
    pub fn check_equality(&self, p: &Proof, lhs: &Term, rhs: &Term) -> Result<(), ProofError> {
        if p.lhs() != lhs || p.rhs() != rhs {
            return Err(ProofError::Conclusion {
                lhs: p.lhs().clone(),
                rhs: p.rhs().clone(),
                expected_lhs: lhs.clone(),
                expected_rhs: rhs.clone(),
            });
        }
        self.check(p)
    }

    /// Check that `p` is a valid proof of its conclusion.
    pub fn check(&self, p: &Proof) -> Result<(), ProofError> {
        // one evaluation cache per environment, shared by all steps
        let mut values: Vec<TermMap<Value>> = vec![TermMap::default(); self.envs.len()];
        // terms whose variables are known to be bound
        let mut scanned = TermSet::default();
        let mut visited = FxHashSet::default();
        let mut stack = vec![p.clone()];
        while let Some(step) = stack.pop() {
            if !visited.insert(step.clone()) {
                continue;
            }
            self.check_step(&step, &mut values, &mut scanned)?;
            stack.extend(step.premises());
        }
        debug!(target: "ir::proof", "checked {} steps", visited.len());
        Ok(())
    }

    /// Fails if some environment leaves a variable under `t` unbound.
    fn check_bound(&self, t: &Term, scanned: &mut TermSet) -> Result<(), ProofError> {
        let mut stack = vec![t.clone()];
        while let Some(s) = stack.pop() {
            if !scanned.insert(s.clone()) {
                continue;
            }
            if let Op::Var(name, _) = &s.op {
                if let Some(env) = self.envs.iter().find(|e| !e.contains_key(name)) {
                    return Err(ProofError::MissingVar {
                        name: name.clone(),
                        env: env.clone(),
                    });
                }
            }
            stack.extend(s.cs.iter().cloned());
        }
        Ok(())
    }

    fn check_step(
        &self,
        p: &ProofData,
        values: &mut [TermMap<Value>],
        scanned: &mut TermSet,
    ) -> Result<(), ProofError> {
        let (lhs, rhs) = (p.lhs(), p.rhs());
        if check(lhs) != check(rhs) {
            return Err(ProofError::SortMismatch {
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            });
        }
        match p.rule() {
            Rule::Rewrite => {
                if !self.envs.is_empty() {
                    self.check_bound(lhs, scanned)?;
                    self.check_bound(rhs, scanned)?;
                }
                for (env, vs) in self.envs.iter().zip(values) {
                    if eval_cached(lhs, env, vs).clone() != *eval_cached(rhs, env, vs) {
                        return Err(ProofError::Unsound {
                            lhs: lhs.clone(),
                            rhs: rhs.clone(),
                            env: env.clone(),
                        });
                    }
                }
                Ok(())
            }
            // chaining is enforced when the step is built
            Rule::Transitivity(..) => Ok(()),
            Rule::Congruence(premises) => {
                if lhs.op != rhs.op || lhs.cs.len() != rhs.cs.len() {
                    return Err(ProofError::CongruenceShape {
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    });
                }
                let mut premises = premises.iter().peekable();
                for (idx, (l, r)) in lhs.cs.iter().zip(&rhs.cs).enumerate() {
                    if premises
                        .peek()
                        .map_or(false, |q| q.lhs() == l && q.rhs() == r)
                    {
                        premises.next();
                    } else if l != r {
                        return Err(ProofError::CongruenceArg {
                            idx,
                            lhs: l.clone(),
                            rhs: r.clone(),
                        });
                    }
                }
                match premises.count() {
                    0 => Ok(()),
                    extra => Err(ProofError::UnusedPremises {
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                        extra,
                    }),
                }
            }
        }
    }
}
