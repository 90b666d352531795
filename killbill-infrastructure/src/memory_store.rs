use crate::{document::next_settlement_id, error::InfrastructureError};
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use killbill_application::{
    GroupId, GroupSnapshot, LedgerRepository, SettlementRecorder, StorageError,
};
use killbill_domain::Settlement;
use std::sync::RwLock;

type GroupTable = IndexMap<GroupId, GroupSnapshot, FxBuildHasher>;

/// Ledger store held entirely in memory. Groups keep the order they were
/// inserted in.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    groups: RwLock<GroupTable>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(groups: impl IntoIterator<Item = GroupSnapshot>) -> Self {
        let table: GroupTable = groups
            .into_iter()
            .map(|group| (group.id.clone(), group))
            .collect();
        Self {
            groups: RwLock::new(table),
        }
    }

    /// Insert or replace a group.
    pub fn upsert(&self, group: GroupSnapshot) -> Result<(), StorageError> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| InfrastructureError::Poisoned)?;
        groups.insert(group.id.clone(), group);
        Ok(())
    }
}

impl LedgerRepository for InMemoryLedgerStore {
    fn group_ids(&self) -> Result<Vec<GroupId>, StorageError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| InfrastructureError::Poisoned)?;
        Ok(groups.keys().cloned().collect())
    }

    fn load_group(&self, group_id: &GroupId) -> Result<Option<GroupSnapshot>, StorageError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| InfrastructureError::Poisoned)?;
        Ok(groups.get(group_id).cloned())
    }
}

impl SettlementRecorder for InMemoryLedgerStore {
    fn record(
        &self,
        group_id: &GroupId,
        mut settlement: Settlement,
    ) -> Result<Settlement, StorageError> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| InfrastructureError::Poisoned)?;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| StorageError::UnknownGroup(group_id.clone()))?;

        if settlement.id.is_empty() {
            settlement.id = next_settlement_id(&group.settlements);
        }
        group.settlements.push(settlement.clone());
        tracing::debug!(group_id = %group_id, settlement_id = %settlement.id, "Settlement stored in memory");
        Ok(settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcstr::ArcStr;
    use killbill_domain::{Member, Money};
    use rstest::{fixture, rstest};

    fn group(id: &str) -> GroupSnapshot {
        GroupSnapshot {
            id: GroupId::from(id),
            name: id.to_uppercase(),
            emoji: String::new(),
            currency: ArcStr::default(),
            members: vec![Member::new("a", "A"), Member::new("b", "B")],
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }

    #[fixture]
    fn store() -> InMemoryLedgerStore {
        InMemoryLedgerStore::with_groups([group("zeta"), group("alpha")])
    }

    #[rstest]
    fn lists_groups_in_insertion_order(store: InMemoryLedgerStore) {
        assert_eq!(
            store.group_ids().expect("readable"),
            vec![GroupId::from("zeta"), GroupId::from("alpha")]
        );
    }

    #[rstest]
    fn unknown_group_loads_as_none(store: InMemoryLedgerStore) {
        assert_eq!(store.load_group(&GroupId::from("nope")), Ok(None));
    }

    #[rstest]
    fn recording_assigns_sequential_ids(store: InMemoryLedgerStore) {
        let zeta = GroupId::from("zeta");
        let first = store
            .record(&zeta, Settlement::new("a", "b", Money::from_i64(3)))
            .expect("recorded");
        let second = store
            .record(&zeta, Settlement::new("b", "a", Money::from_i64(1)))
            .expect("recorded");

        assert_eq!(first.id, "settlement-1");
        assert_eq!(second.id, "settlement-2");
        let stored = store.load_group(&zeta).expect("readable").expect("exists");
        assert_eq!(stored.settlements, vec![first, second]);
    }

    #[rstest]
    fn recording_into_missing_group_fails(store: InMemoryLedgerStore) {
        let result = store.record(
            &GroupId::from("nope"),
            Settlement::new("a", "b", Money::from_i64(3)),
        );
        assert_eq!(result, Err(StorageError::UnknownGroup(GroupId::from("nope"))));
    }

    #[rstest]
    fn upsert_replaces_in_place(store: InMemoryLedgerStore) {
        let mut renamed = group("zeta");
        renamed.name = "Renamed".to_owned();
        store.upsert(renamed).expect("writable");

        assert_eq!(
            store.group_ids().expect("readable"),
            vec![GroupId::from("zeta"), GroupId::from("alpha")]
        );
        let zeta = store
            .load_group(&GroupId::from("zeta"))
            .expect("readable")
            .expect("exists");
        assert_eq!(zeta.name, "Renamed");
    }
}
