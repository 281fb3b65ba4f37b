//! Intermediate representation: terms, proofs about them, and passes over them

#[macro_use]
pub mod term;
pub mod opt;
pub mod proof;
