use crate::model::GroupId;
use killbill_domain::{BalanceError, MemberId};
use thiserror::Error;

/// Failure reported by a ledger store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("group '{0}' does not exist in the store")]
    UnknownGroup(GroupId),
    #[error("ledger store failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("group '{0}' not found")]
    GroupNotFound(GroupId),
    #[error("'{member}' is not a member of group '{group_id}'")]
    NotAMember { group_id: GroupId, member: MemberId },
    #[error("'{user}' and '{counterpart}' are already settled up")]
    NothingToSettle { user: MemberId, counterpart: MemberId },
    #[error("invalid settlement: {0}")]
    InvalidSettlement(&'static str),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
