//! Live, typed value trees.
//!
//! A [`ValueTreeRoot`] owns one root value and the type it must satisfy.
//! Nested positions are not separate nodes; they are addressed by
//! [`Path`](weft_identity::Path) and reached through the type's compound
//! navigation. Every edit works on a copy-on-write copy of the root and is
//! committed only when it succeeds, so a failed edit leaves the tree as it
//! was.

mod diff;
mod flags;
mod root;


pub use flags::ChangeFlags;
pub use root::ValueTreeRoot;
pub use weft_types::ModelError;
