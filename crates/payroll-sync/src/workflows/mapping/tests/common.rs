use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use crate::workflows::mapping::{
    LegalEntity, MappingEntry, MappingService, MappingStore, MappingStoreError,
};
use crate::workflows::waiting_events::{ChangeRecord, RecordKey};

#[derive(Default)]
pub(crate) struct MemoryMappingStore {
    entries: Mutex<BTreeMap<i64, MappingEntry>>,
    entities: Mutex<Vec<LegalEntity>>,
}

impl MemoryMappingStore {
    pub(crate) fn with_entity(entity: LegalEntity) -> Self {
        let store = Self::default();
        store.entities.lock().expect("entities mutex poisoned").push(entity);
        store
    }

    pub(crate) fn seed(&self, legal_entity_id: i64, pay_element_id: &str, code: &str, frequency: &str) {
        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        let id = guard.keys().next_back().copied().unwrap_or(0) + 1;
        guard.insert(
            id,
            MappingEntry {
                id,
                legal_entity_id,
                pay_element_id: pay_element_id.to_string(),
                component_code: code.to_string(),
                frequency: frequency.to_string(),
                description: None,
                active: true,
                created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                last_modified_at: None,
            },
        );
    }

    pub(crate) fn all(&self) -> Vec<MappingEntry> {
        self.entries
            .lock()
            .expect("entries mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl MappingStore for MemoryMappingStore {
    fn list_mappings(&self, legal_entity_id: i64) -> Result<Vec<MappingEntry>, MappingStoreError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|entry| entry.legal_entity_id == legal_entity_id && entry.active)
            .collect())
    }

    fn fetch(&self, id: i64) -> Result<Option<MappingEntry>, MappingStoreError> {
        Ok(self.entries.lock().expect("entries mutex poisoned").get(&id).cloned())
    }

    fn create(&self, mut entry: MappingEntry) -> Result<MappingEntry, MappingStoreError> {
        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        entry.id = guard.keys().next_back().copied().unwrap_or(0) + 1;
        guard.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: MappingEntry) -> Result<(), MappingStoreError> {
        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        match guard.get_mut(&entry.id) {
            Some(slot) => {
                *slot = entry;
                Ok(())
            }
            None => Err(MappingStoreError::NotFound),
        }
    }

    fn delete(&self, id: i64) -> Result<(), MappingStoreError> {
        let mut guard = self.entries.lock().expect("entries mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(MappingStoreError::NotFound)
    }

    fn legal_entity(&self, id: i64) -> Result<Option<LegalEntity>, MappingStoreError> {
        let guard = self.entities.lock().expect("entities mutex poisoned");
        Ok(guard.iter().find(|entity| entity.id == id).cloned())
    }

    fn legal_entity_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<LegalEntity>, MappingStoreError> {
        let guard = self.entities.lock().expect("entities mutex poisoned");
        Ok(guard
            .iter()
            .find(|entity| entity.active && entity.logical_id_prefix == prefix)
            .cloned())
    }
}

/// Store whose every call fails.
pub(crate) struct UnavailableStore;

impl MappingStore for UnavailableStore {
    fn list_mappings(&self, _legal_entity_id: i64) -> Result<Vec<MappingEntry>, MappingStoreError> {
        Err(MappingStoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: i64) -> Result<Option<MappingEntry>, MappingStoreError> {
        Err(MappingStoreError::Unavailable("database offline".to_string()))
    }

    fn create(&self, _entry: MappingEntry) -> Result<MappingEntry, MappingStoreError> {
        Err(MappingStoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _entry: MappingEntry) -> Result<(), MappingStoreError> {
        Err(MappingStoreError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: i64) -> Result<(), MappingStoreError> {
        Err(MappingStoreError::Unavailable("database offline".to_string()))
    }

    fn legal_entity(&self, _id: i64) -> Result<Option<LegalEntity>, MappingStoreError> {
        Err(MappingStoreError::Unavailable("database offline".to_string()))
    }

    fn legal_entity_by_prefix(
        &self,
        _prefix: &str,
    ) -> Result<Option<LegalEntity>, MappingStoreError> {
        Err(MappingStoreError::Unavailable("database offline".to_string()))
    }
}

pub(crate) fn acme() -> LegalEntity {
    LegalEntity {
        id: 7,
        company_code: "ACME".to_string(),
        company_name: "Acme Holdings".to_string(),
        logical_id_prefix: "ACME".to_string(),
        active: true,
    }
}

pub(crate) fn service_with_store() -> (Arc<MemoryMappingStore>, MappingService<MemoryMappingStore>) {
    let store = Arc::new(MemoryMappingStore::with_entity(acme()));
    let service = MappingService::new(store.clone());
    (store, service)
}

pub(crate) fn record(person_id: &str, record_number: &str, event: &str, category: &str) -> ChangeRecord {
    let mut record = ChangeRecord::new(RecordKey::new(person_id, record_number));
    record.event = Some(event.to_string());
    record.category = Some(category.to_string());
    record
}

pub(crate) fn pay_element_record(person_id: &str, pay_element_id: &str, amount: i64) -> ChangeRecord {
    let mut record = record(person_id, "1", "Pay Element", "Pay Element");
    record.pay_element.pay_element_id = Some(pay_element_id.to_string());
    record.pay_element.amount = Some(Decimal::from(amount));
    record
}
