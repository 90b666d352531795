use crate::{
    document::{LedgerDocument, next_settlement_id},
    error::InfrastructureError,
};
use killbill_application::{
    GroupId, GroupSnapshot, LedgerRepository, SettlementRecorder, StorageError,
};
use killbill_domain::{MemberId, Settlement};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

/// Ledger store backed by a single JSON document on disk.
///
/// The document is read once on [`JsonLedgerStore::open`]. Every recorded
/// settlement rewrites the whole file.
pub struct JsonLedgerStore {
    path: PathBuf,
    document: RwLock<LedgerDocument>,
}

impl JsonLedgerStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, InfrastructureError> {
        let path = path.into();
        let source = fs::read_to_string(&path).map_err(|source| InfrastructureError::Read {
            path: path.clone(),
            source,
        })?;
        let document = LedgerDocument::from_json(&source)?;

        tracing::debug!(
            path = %path.display(),
            group_count = document.groups.len(),
            user_count = document.users.len(),
            "Ledger document loaded"
        );

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display names from the document's user directory.
    pub fn user_names(&self) -> Result<Vec<(MemberId, String)>, InfrastructureError> {
        let document = self
            .document
            .read()
            .map_err(|_| InfrastructureError::Poisoned)?;
        Ok(document
            .users
            .iter()
            .filter(|user| !user.name.is_empty())
            .map(|user| (user.id.clone(), user.name.clone()))
            .collect())
    }

    pub fn save(&self) -> Result<(), InfrastructureError> {
        let document = self
            .document
            .read()
            .map_err(|_| InfrastructureError::Poisoned)?;
        write_document(&self.path, &document)
    }
}

fn write_document(path: &Path, document: &LedgerDocument) -> Result<(), InfrastructureError> {
    let json = document.to_json()?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|source| InfrastructureError::Write {
        path: staging.clone(),
        source,
    })?;
    fs::rename(&staging, path).map_err(|source| InfrastructureError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl LedgerRepository for JsonLedgerStore {
    fn group_ids(&self) -> Result<Vec<GroupId>, StorageError> {
        let document = self
            .document
            .read()
            .map_err(|_| InfrastructureError::Poisoned)?;
        Ok(document
            .groups
            .iter()
            .map(|group| GroupId::from(group.id.as_str()))
            .collect())
    }

    fn load_group(&self, group_id: &GroupId) -> Result<Option<GroupSnapshot>, StorageError> {
        let document = self
            .document
            .read()
            .map_err(|_| InfrastructureError::Poisoned)?;
        Ok(document.snapshot(group_id))
    }

    fn groups_of(&self, member: &MemberId) -> Result<Vec<GroupSnapshot>, StorageError> {
        let document = self
            .document
            .read()
            .map_err(|_| InfrastructureError::Poisoned)?;
        Ok(document
            .snapshots()
            .into_iter()
            .filter(|group| group.has_member(member))
            .collect())
    }
}

impl SettlementRecorder for JsonLedgerStore {
    fn record(
        &self,
        group_id: &GroupId,
        mut settlement: Settlement,
    ) -> Result<Settlement, StorageError> {
        let mut document = self
            .document
            .write()
            .map_err(|_| InfrastructureError::Poisoned)?;
        let group = document
            .group_mut(group_id)
            .ok_or_else(|| StorageError::UnknownGroup(group_id.clone()))?;

        if settlement.id.is_empty() {
            settlement.id = next_settlement_id(&group.settlements);
        }
        group.settlements.push(settlement.clone());

        if let Err(err) = write_document(&self.path, &document) {
            tracing::error!(path = %self.path.display(), error = %err, "Failed to save ledger document");
            // Keep memory and disk in sync.
            if let Some(group) = document.group_mut(group_id) {
                group.settlements.pop();
            }
            return Err(err.into());
        }

        Ok(settlement)
    }
}
