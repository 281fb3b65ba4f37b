//! # pull_ite
//!
//! Rewriting that pulls if-then-else terms out of applications, optionally producing proofs that
//! each rewrite preserves meaning.
//!
//! * [ir::term]: hash-consed terms over booleans, bit-vectors, and integers
//! * [ir::proof]: proof certificates for term equalities, and a checker for them
//! * [ir::opt::pull_ite]: the ITE-pulling rewrite and its target policies
//! * [ir::opt]: a small pass pipeline
//! * [cfg]: process-wide configuration

#![warn(missing_docs)]

#[macro_use]
pub mod ir;
pub mod cfg;
