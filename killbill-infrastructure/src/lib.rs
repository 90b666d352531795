#![warn(clippy::uninlined_format_args)]

pub mod document;
pub mod error;
pub mod json_store;
pub mod memory_store;

pub use document::{GroupRecord, LedgerDocument, UserRecord};
pub use error::InfrastructureError;
pub use json_store::JsonLedgerStore;
pub use memory_store::InMemoryLedgerStore;
