//! In-memory category forest.
//!
//! The forest is a disposable projection of the store's flat record list:
//! it is rebuilt after every mutation and never patched by hand.

mod build;
mod filter;
mod guard;

pub use build::{Forest, TreeNode, build_forest};
#[cfg(test)]
pub(crate) use build::tests::acyclic_records;
pub use filter::filter_forest;
pub use guard::{DEFAULT_PROTECTED_ID, DEFAULT_PROTECTED_NAME, ProtectedPolicy, is_descendant};
