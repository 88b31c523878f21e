// src/lib.rs
//
// Identifiers and value paths shared by every weft crate.
// Identifiers are opaque, pre-resolved tokens: the registry that resolves them
// is an explicit value threaded through the APIs that need it.

mod error;
mod identifier;
mod path;
mod registry;

pub use error::IdentifierError;
pub use identifier::{Discriminator, Identifier};
pub use path::{Path, PathStep};
pub use registry::IdentifierRegistry;
