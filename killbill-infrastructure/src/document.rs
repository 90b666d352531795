use arcstr::ArcStr;
use fxhash::FxHashMap;
use killbill_application::{GroupId, GroupSnapshot};
use killbill_domain::{Expense, Member, MemberId, Settlement};
use serde::{Deserialize, Serialize};

/// On-disk shape of a ledger: the user directory plus every group with its
/// expense and settlement records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub members: Vec<MemberId>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

impl LedgerDocument {
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn group(&self, group_id: &GroupId) -> Option<&GroupRecord> {
        self.groups.iter().find(|group| group.id == group_id.as_str())
    }

    pub fn group_mut(&mut self, group_id: &GroupId) -> Option<&mut GroupRecord> {
        self.groups
            .iter_mut()
            .find(|group| group.id == group_id.as_str())
    }

    /// Resolve a group's member links against the user directory. Members
    /// without a user record are shown by id.
    pub fn snapshot(&self, group_id: &GroupId) -> Option<GroupSnapshot> {
        let group = self.group(group_id)?;
        let names: FxHashMap<&MemberId, &str> = self
            .users
            .iter()
            .filter(|user| !user.name.is_empty())
            .map(|user| (&user.id, user.name.as_str()))
            .collect();

        let members = group
            .members
            .iter()
            .map(|id| {
                let display_name = names.get(id).copied().unwrap_or_else(|| id.as_str());
                Member::new(id.clone(), display_name)
            })
            .collect();

        Some(GroupSnapshot {
            id: GroupId::from(group.id.as_str()),
            name: group.name.clone(),
            emoji: group.emoji.clone(),
            currency: ArcStr::from(group.currency.as_str()),
            members,
            expenses: group.expenses.clone(),
            settlements: group.settlements.clone(),
        })
    }

    pub fn snapshots(&self) -> Vec<GroupSnapshot> {
        self.groups
            .iter()
            .filter_map(|group| self.snapshot(&GroupId::from(group.id.as_str())))
            .collect()
    }
}

/// Next free settlement id of the form `settlement-N` within one group.
pub(crate) fn next_settlement_id(existing: &[Settlement]) -> String {
    let next = existing
        .iter()
        .filter_map(|settlement| settlement.id.strip_prefix("settlement-"))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("settlement-{next}")
}
