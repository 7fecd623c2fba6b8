use super::domain::{LegalEntity, MappingEntry};

/// Persistence boundary for mapping configuration.
pub trait MappingStore: Send + Sync {
    /// Active mappings for the legal entity, ordered by id.
    fn list_mappings(&self, legal_entity_id: i64) -> Result<Vec<MappingEntry>, MappingStoreError>;
    fn fetch(&self, id: i64) -> Result<Option<MappingEntry>, MappingStoreError>;
    /// Stores a new entry; the store assigns the id.
    fn create(&self, entry: MappingEntry) -> Result<MappingEntry, MappingStoreError>;
    fn update(&self, entry: MappingEntry) -> Result<(), MappingStoreError>;
    fn delete(&self, id: i64) -> Result<(), MappingStoreError>;
    fn legal_entity(&self, id: i64) -> Result<Option<LegalEntity>, MappingStoreError>;
    /// Active legal entity registered under a logical id prefix.
    fn legal_entity_by_prefix(&self, prefix: &str)
        -> Result<Option<LegalEntity>, MappingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MappingStoreError {
    #[error("mapping not found")]
    NotFound,
    #[error("mapping store unavailable: {0}")]
    Unavailable(String),
}
