//! Options for the ITE-pulling rewriter.
//!
//! ## Contents
//!
//! * A type for rewriter options [IteOpt] containing fields for module options:
//!    * `pull_ite`: [PullIteOpt]
//!    * `ir`: [IrOpt]
//!    * all options types implement:
//!       * std's [Default]
//!       * clap's [Args]; all options are settable by
//!          * environmental variable (SHOUTY_SNEK_CASE), e.g., `"PULL_ITE_POLICY"`
//!          * long option (kebab-case), e.g., `"--pull-ite-policy"`
//!       * these a guaranteed to agree (and we test this)
//!
//! ## Constructing custom options in a tool
//!
//! We recommend that tools construct custom options using [`clap`][clap].
//! Simply use our (rexported) version of clap in your tool ([crate::clap])
//! and include [IteOpt] in your [clap::Parser].
//!
//! ```rust
//! use pull_ite_opt::{IteOpt, clap::Parser};
//!
//! #[derive(Parser, Debug)]
//! struct BinaryOpt {
//!     #[command(flatten)]
//!     pub ite: IteOpt,
//! }
//!
//! fn main() {
//!     let opt = BinaryOpt::parse_from(["tool", "--pull-ite-policy", "cheap"]);
//!     assert_eq!(opt.ite.pull_ite.policy, pull_ite_opt::TargetPolicy::Cheap);
//! }
//! ```
//!
//! [clap]: https://crates.io/crates/clap

use clap::{ArgAction, Args, ValueEnum};

use std::default::Default;

/// Re-export our version of clap.
pub use clap;

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
/// Options that configure the rewriter
pub struct IteOpt {
    /// Options for ITE pulling
    #[command(flatten)]
    pub pull_ite: PullIteOpt,
    /// Options for the IR itself
    #[command(flatten)]
    pub ir: IrOpt,
}

/// Options for ITE pulling
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PullIteOpt {
    /// Produce proof certificates for every pulled ITE
    #[arg(
        long = "pull-ite-proofs",
        env = "PULL_ITE_PROOFS",
        action = ArgAction::Set,
        default_value = "false"
    )]
    pub proofs: bool,

    /// Which applications ITEs are pulled out of
    #[arg(
        long = "pull-ite-policy",
        env = "PULL_ITE_POLICY",
        value_enum,
        default_value = "all"
    )]
    pub policy: TargetPolicy,
}

impl Default for PullIteOpt {
    fn default() -> Self {
        Self {
            proofs: false,
            policy: TargetPolicy::All,
        }
    }
}

#[derive(ValueEnum, Debug, PartialEq, Eq, Clone, Copy)]
/// Which applications ITEs are pulled out of
pub enum TargetPolicy {
    /// Any built-in application with an ITE argument
    All,
    /// Only binary Boolean built-ins comparing a value with a non-Boolean ITE, e.g. `(= 3 (ite c x y))`
    Cheap,
}

impl Default for TargetPolicy {
    fn default() -> Self {
        TargetPolicy::All
    }
}

/// Options for the IR itself
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct IrOpt {
    /// Garbage collection after each rewriting pass.
    #[arg(
        long = "ir-frequent-gc",
        env = "IR_FREQUENT_GC",
        action = ArgAction::Set,
        default_value = "false"
    )]
    pub frequent_gc: bool,
}
