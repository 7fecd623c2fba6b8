use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{LegalEntity, MappingEntry, MappingUpdate, NewMapping};
use super::store::{MappingStore, MappingStoreError};
use super::MappingError;

/// CRUD over mapping configuration with the checks the store does not enforce.
pub struct MappingService<S> {
    store: Arc<S>,
}

impl<S> MappingService<S>
where
    S: MappingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self, legal_entity_id: i64) -> Result<Vec<MappingEntry>, MappingError> {
        Ok(self.store.list_mappings(legal_entity_id)?)
    }

    /// Distinct frequencies configured for the legal entity, sorted.
    pub fn frequencies(&self, legal_entity_id: i64) -> Result<Vec<String>, MappingError> {
        let frequencies: BTreeSet<String> = self
            .store
            .list_mappings(legal_entity_id)?
            .into_iter()
            .map(|entry| entry.frequency.trim().to_string())
            .filter(|frequency| !frequency.is_empty())
            .collect();
        Ok(frequencies.into_iter().collect())
    }

    pub fn legal_entity_by_prefix(&self, prefix: &str) -> Result<LegalEntity, MappingError> {
        self.store
            .legal_entity_by_prefix(prefix.trim())?
            .ok_or_else(|| MappingError::UnknownPrefix(prefix.trim().to_string()))
    }

    pub fn create(&self, mapping: NewMapping) -> Result<MappingEntry, MappingError> {
        if mapping.legal_entity_id <= 0 {
            return Err(MappingError::Invalid(
                "legal_entity_id must be positive".to_string(),
            ));
        }
        require("pay_element_id", &mapping.pay_element_id)?;
        require("component_code", &mapping.component_code)?;
        require("frequency", &mapping.frequency)?;

        self.store
            .legal_entity(mapping.legal_entity_id)?
            .ok_or(MappingError::UnknownLegalEntity(mapping.legal_entity_id))?;

        self.ensure_unique(
            mapping.legal_entity_id,
            &mapping.pay_element_id,
            &mapping.frequency,
            None,
        )?;

        let entry = MappingEntry {
            id: 0,
            legal_entity_id: mapping.legal_entity_id,
            pay_element_id: mapping.pay_element_id.trim().to_string(),
            component_code: mapping.component_code.trim().to_string(),
            frequency: mapping.frequency.trim().to_string(),
            description: mapping.description,
            active: true,
            created_at: Utc::now(),
            last_modified_at: None,
        };

        let stored = self.store.create(entry)?;
        info!(
            id = stored.id,
            legal_entity_id = stored.legal_entity_id,
            pay_element_id = %stored.pay_element_id,
            "mapping created"
        );
        Ok(stored)
    }

    pub fn update(&self, id: i64, update: MappingUpdate) -> Result<MappingEntry, MappingError> {
        require("pay_element_id", &update.pay_element_id)?;
        require("component_code", &update.component_code)?;
        require("frequency", &update.frequency)?;

        let mut entry = self.store.fetch(id)?.ok_or(MappingError::NotFound(id))?;

        if update.active {
            self.ensure_unique(
                entry.legal_entity_id,
                &update.pay_element_id,
                &update.frequency,
                Some(id),
            )?;
        }

        entry.pay_element_id = update.pay_element_id.trim().to_string();
        entry.component_code = update.component_code.trim().to_string();
        entry.frequency = update.frequency.trim().to_string();
        entry.description = update.description;
        entry.active = update.active;
        entry.last_modified_at = Some(Utc::now());

        self.store.update(entry.clone()).map_err(|err| match err {
            MappingStoreError::NotFound => MappingError::NotFound(id),
            other => other.into(),
        })?;
        info!(id, "mapping updated");
        Ok(entry)
    }

    pub fn delete(&self, id: i64) -> Result<(), MappingError> {
        self.store.delete(id).map_err(|err| match err {
            MappingStoreError::NotFound => MappingError::NotFound(id),
            other => other.into(),
        })?;
        info!(id, "mapping deleted");
        Ok(())
    }

    fn ensure_unique(
        &self,
        legal_entity_id: i64,
        pay_element_id: &str,
        frequency: &str,
        ignore: Option<i64>,
    ) -> Result<(), MappingError> {
        let conflict = self
            .store
            .list_mappings(legal_entity_id)?
            .into_iter()
            .any(|entry| {
                Some(entry.id) != ignore
                    && entry.active
                    && entry.pay_element_id.trim() == pay_element_id.trim()
                    && entry.frequency.trim().eq_ignore_ascii_case(frequency.trim())
            });

        if conflict {
            Err(MappingError::Conflict {
                legal_entity_id,
                pay_element_id: pay_element_id.trim().to_string(),
                frequency: frequency.trim().to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), MappingError> {
    if value.trim().is_empty() {
        Err(MappingError::Invalid(format!("{field} is required")))
    } else {
        Ok(())
    }
}
