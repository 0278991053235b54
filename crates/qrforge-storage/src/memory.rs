use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use qrforge_core::repository::{CodeRecord, CodeRepository, Result};
use qrforge_core::{ShortCode, StorageError};

/// An in-memory [`CodeRepository`] for tests and local development.
///
/// The entry API gives the same check-and-insert atomicity a unique index
/// provides in Postgres.
#[derive(Debug, Default)]
pub struct InMemoryCodeStore {
    records: DashMap<String, CodeRecord>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted codes.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CodeRepository for InMemoryCodeStore {
    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.records.contains_key(code.as_str()))
    }

    async fn insert(&self, code: &ShortCode, record: CodeRecord) -> Result<()> {
        match self.records.entry(code.as_str().to_string()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(record);
                Ok(())
            }
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.records.remove(code.as_str()).is_some())
    }
}
