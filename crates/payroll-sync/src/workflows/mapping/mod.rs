//! Pay element to payroll component mapping.
//!
//! Resolution is all-or-nothing: a single unmapped pay element fails the whole
//! batch before anything reaches the payroll system.

pub mod domain;
mod resolver;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{LegalEntity, MappedRecord, MappingEntry, MappingUpdate, NewMapping};
pub use resolver::{MappingResolver, Resolution};
pub use router::mapping_router;
pub use service::MappingService;
pub use store::{MappingStore, MappingStoreError};

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error(
        "unmapped pay elements found for legal entity {legal_entity_id}: {}",
        .pay_element_ids.join(", ")
    )]
    Unmapped {
        legal_entity_id: i64,
        pay_element_ids: Vec<String>,
    },
    #[error("mapping with id {0} not found")]
    NotFound(i64),
    #[error("legal entity {0} not found")]
    UnknownLegalEntity(i64),
    #[error("no active legal entity for logical id prefix '{0}'")]
    UnknownPrefix(String),
    #[error("invalid mapping: {0}")]
    Invalid(String),
    #[error(
        "an active mapping for pay element {pay_element_id} ({frequency}) already exists in legal entity {legal_entity_id}"
    )]
    Conflict {
        legal_entity_id: i64,
        pay_element_id: String,
        frequency: String,
    },
    #[error(transparent)]
    Store(#[from] MappingStoreError),
}
