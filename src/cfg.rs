//! Rewriter configuration
//!
//! This module contains two components:
//! * A type [IteCfg] for configuration information.
//! * Static configuration storage
//!    * set with [set] and [set_cfg]
//!    * read with [cfg]
//!    * it can only be set once per process
//!       * if you want to unit-test your component, we recommend that it **should not** use [cfg].

use once_cell::sync::OnceCell;

use std::convert::From;
use std::default::Default;

/// Re-export our clap version
pub use pull_ite_opt::clap;
/// Re-export our clap [clap::Args]
pub use pull_ite_opt::IteOpt;

/// A rewriter configuration. Contructible [From::from] [IteOpt].
#[derive(Clone, Debug, Default)]
pub struct IteCfg {
    opt: IteOpt,
}

/// Set the configuration from an [IteOpt].
///
/// If you want to build the configuration [IteCfg] object yourself,
/// you can set it with [set_cfg].
///
/// [IteOpt] implements [clap::Args], so it can be build from your command line or envvars. See
/// its documentation.
pub fn set(o: &IteOpt) {
    set_cfg(From::from(o.clone()))
}

/// Set the configuration to its defaults.
/// See [set] to customize
pub fn set_default() {
    set_cfg(Default::default())
}

/// Set the configuration from an [IteCfg].
///
/// We recommends using [set], which takes an [IteOpt] instead.
pub fn set_cfg(c: IteCfg) {
    CFG.set(c).unwrap_or_else(|c| {
        panic!(
            "Tried to set the rewriter configuration, but it had already been set.\nNew cfg:\n{:#?}",
            c
        )
    })
}

/// Get the configuration
pub fn cfg() -> &'static IteCfg {
    CFG.get().expect("A component tried to read the rewriter configuration, but it was not yet set. Did the top-level application call `pull_ite::cfg::set`?")
}

/// Get the configuration, setting the configuration to the default value if it is unset.
pub fn cfg_or_default() -> &'static IteCfg {
    CFG.get_or_init(Default::default)
}

/// Has the configuration been set yet?
pub fn is_cfg_set() -> bool {
    CFG.get().is_some()
}

static CFG: OnceCell<IteCfg> = OnceCell::new();

impl From<IteOpt> for IteCfg {
    fn from(opt: IteOpt) -> Self {
        Self { opt }
    }
}

/// Used to expose all fields of [IteOpt].
impl std::ops::Deref for IteCfg {
    type Target = IteOpt;

    fn deref(&self) -> &Self::Target {
        &self.opt
    }
}
