// src/lib.rs
//! weft: a structural type system with copy-on-write value trees.
//!
//! The member crates are re-exported so that users of the facade need only
//! one dependency. The `cli` and `commands` modules back the `weft` binary.

pub mod cli;
pub mod commands;

pub use weft_identity;
pub use weft_tree;
pub use weft_types;
