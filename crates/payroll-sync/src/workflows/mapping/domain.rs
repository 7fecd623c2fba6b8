use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::waiting_events::ChangeRecord;

/// Active pay element to component code translation for one legal entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub id: i64,
    pub legal_entity_id: i64,
    pub pay_element_id: String,
    pub component_code: String,
    pub frequency: String,
    #[serde(default)]
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl MappingEntry {
    pub(crate) fn applies_to(&self, frequency: Option<&str>) -> bool {
        match frequency.map(str::trim).filter(|value| !value.is_empty()) {
            Some(frequency) => {
                self.frequency.trim().is_empty() || self.frequency.trim().eq_ignore_ascii_case(frequency)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMapping {
    pub legal_entity_id: i64,
    pub pay_element_id: String,
    pub component_code: String,
    pub frequency: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Replacement values for an existing mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingUpdate {
    pub pay_element_id: String,
    pub component_code: String,
    pub frequency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Employer registered with the payroll system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntity {
    pub id: i64,
    pub company_code: String,
    pub company_name: String,
    pub logical_id_prefix: String,
    pub active: bool,
}

/// A change record with its resolved payroll component code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedRecord {
    pub record: ChangeRecord,
    pub component_code: Option<String>,
}

impl MappedRecord {
    pub fn unmapped(record: ChangeRecord) -> Self {
        Self {
            record,
            component_code: None,
        }
    }

    pub fn with_component(record: ChangeRecord, component_code: impl Into<String>) -> Self {
        Self {
            record,
            component_code: Some(component_code.into()),
        }
    }

    pub fn component_code(&self) -> Option<&str> {
        self.component_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
    }

    pub fn employee_id(&self) -> &str {
        self.record.person_id()
    }
}
