#![forbid(unsafe_code)]

pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod mutate;
mod paths;
pub mod store;
pub mod telemetry;
pub mod tree;
pub mod view;

pub use error::{Effect, Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the types most callers need at crate root
pub use crate::batch::{BatchFailure, BatchReport, parse_batch_names};
pub use crate::core::{CategoryId, CategoryName, CategoryPatch, CategoryRecord, LocaleNames, NewCategory};
pub use crate::mutate::{
    AlwaysConfirm, Confirm, DeletePrompt, MutationError, MutationOutcome, NeverConfirm, TreeMutator,
};
pub use crate::store::{CategoryStore, FileStore, MemoryStore, StoreCall, StoreError, StoreOp};
pub use crate::tree::{Forest, ProtectedPolicy, TreeNode, build_forest, filter_forest, is_descendant};
pub use crate::view::{
    DragState, DropPosition, DropTarget, ExpansionState, MoveRequest, Row, StatusKind, StatusMessage,
    TreeView,
};
