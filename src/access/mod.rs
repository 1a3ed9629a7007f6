//! Role hierarchy, approval chains and visibility scoping.
//!
//! Everything here is pure and works on an already loaded [`Directory`]
//! snapshot. Lookups that miss yield empty results instead of errors.

pub mod approval;
pub mod chain;
pub mod directory;
pub mod hierarchy;
pub mod scope;

use derive_more::Display;

pub use directory::Directory;
pub use hierarchy::Tier;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[display(fmt = "unknown role: {}", _0)]
    UnknownRole(String),
}

impl std::error::Error for AccessError {}
