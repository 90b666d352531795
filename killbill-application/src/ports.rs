use crate::{
    error::StorageError,
    model::{GroupId, GroupSnapshot},
};
use killbill_domain::{MemberId, Settlement};
use std::collections::HashMap;

/// Read side of the external ledger store.
pub trait LedgerRepository: Send + Sync {
    fn group_ids(&self) -> Result<Vec<GroupId>, StorageError>;

    /// `Ok(None)` when the group does not exist.
    fn load_group(&self, group_id: &GroupId) -> Result<Option<GroupSnapshot>, StorageError>;

    fn groups_of(&self, member: &MemberId) -> Result<Vec<GroupSnapshot>, StorageError> {
        let mut groups = Vec::new();
        for group_id in self.group_ids()? {
            if let Some(group) = self.load_group(&group_id)?
                && group.has_member(member)
            {
                groups.push(group);
            }
        }
        Ok(groups)
    }
}

/// Write side of the external ledger store.
pub trait SettlementRecorder: Send + Sync {
    /// Persist `settlement` and return it as stored (with its assigned id).
    fn record(&self, group_id: &GroupId, settlement: Settlement)
    -> Result<Settlement, StorageError>;
}

pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, member_id: &MemberId) -> Option<&str>;
}

impl MemberDirectory for HashMap<MemberId, String> {
    fn display_name(&self, member_id: &MemberId) -> Option<&str> {
        self.get(member_id).map(String::as_str)
    }
}
