//! Core domain types for the category catalog
//!
//! Module hierarchy follows type dependency order:
//! - error: CoreError, InvalidId, InvalidName
//! - identity: CategoryId, CategoryName
//! - record: CategoryRecord, NewCategory, CategoryPatch

pub mod error;
pub mod identity;
pub mod record;

pub use error::{CoreError, InvalidId, InvalidName};
pub use identity::{CategoryId, CategoryName};
pub use record::{CategoryPatch, CategoryRecord, LocaleNames, NewCategory};
