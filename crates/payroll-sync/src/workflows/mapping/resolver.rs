use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{MappedRecord, MappingEntry};
use super::store::MappingStore;
use super::MappingError;
use crate::workflows::waiting_events::{ChangeRecord, EventKind};

/// Outcome of a lenient resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub mapped: Vec<MappedRecord>,
    /// Distinct unmapped pay element ids in first-seen order.
    pub unmapped: Vec<String>,
}

/// Attaches payroll component codes to pay element records.
pub struct MappingResolver<S> {
    store: Arc<S>,
}

impl<S> MappingResolver<S>
where
    S: MappingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn resolve(
        &self,
        legal_entity_id: i64,
        frequency: Option<&str>,
        records: &[ChangeRecord],
    ) -> Result<Resolution, MappingError> {
        let entries = self.store.list_mappings(legal_entity_id)?;
        let table = component_table(&entries, frequency);

        let mut mapped = Vec::with_capacity(records.len());
        let mut unmapped: Vec<String> = Vec::new();

        for record in records {
            let pay_element_id = match (record.event_kind(), record.pay_element_id()) {
                (Some(EventKind::PayElement), Some(id)) if !id.trim().is_empty() => id.trim(),
                _ => {
                    mapped.push(MappedRecord::unmapped(record.clone()));
                    continue;
                }
            };

            match table.get(pay_element_id) {
                Some(component_code) => {
                    mapped.push(MappedRecord::with_component(record.clone(), *component_code));
                }
                None => {
                    warn!(
                        legal_entity_id,
                        pay_element_id,
                        person_id = record.person_id(),
                        "no mapping for pay element"
                    );
                    if !unmapped.iter().any(|id| id == pay_element_id) {
                        unmapped.push(pay_element_id.to_string());
                    }
                }
            }
        }

        info!(
            legal_entity_id,
            mapped = mapped.len(),
            unmapped = unmapped.len(),
            "pay elements resolved"
        );

        Ok(Resolution { mapped, unmapped })
    }

    /// Resolves every pay element or fails with the full list of gaps.
    pub fn resolve_or_fail(
        &self,
        legal_entity_id: i64,
        frequency: Option<&str>,
        records: &[ChangeRecord],
    ) -> Result<Vec<MappedRecord>, MappingError> {
        let Resolution { mapped, unmapped } = self.resolve(legal_entity_id, frequency, records)?;
        if unmapped.is_empty() {
            Ok(mapped)
        } else {
            Err(MappingError::Unmapped {
                legal_entity_id,
                pay_element_ids: unmapped,
            })
        }
    }
}

fn component_table<'a>(
    entries: &'a [MappingEntry],
    frequency: Option<&str>,
) -> HashMap<&'a str, &'a str> {
    let mut table = HashMap::new();
    for entry in entries.iter().filter(|entry| entry.active && entry.applies_to(frequency)) {
        table
            .entry(entry.pay_element_id.trim())
            .or_insert(entry.component_code.as_str());
    }
    table
}
