#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ledger_service;
pub mod model;
pub mod ports;

pub use error::{LedgerError, StorageError};
pub use ledger_service::LedgerService;
pub use model::{
    DEFAULT_CURRENCY, ExpenseActivity, GroupBalance, GroupId, GroupSnapshot, GroupSummary,
    LedgerConfig, PairwiseEntry, UserOverview,
};
pub use ports::{LedgerRepository, MemberDirectory, SettlementRecorder};
