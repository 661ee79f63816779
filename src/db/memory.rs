//! In-memory collection
//!
//! Stores the same BSON documents the MongoDB backend would, keyed by
//! ObjectId in a `DashMap`. Used in development mode when no database is
//! reachable, and by the test suite. Nothing is persisted.

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use dashmap::DashMap;
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::warn;

use crate::db::store::{prepare_insert, with_updated_at, Entity, EntityStore, Filter};
use crate::identity::Identity;
use crate::types::{GenealogyError, Result};

/// Collection held in process memory
pub struct MemoryCollection<T> {
    name: String,
    documents: DashMap<ObjectId, Document>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> MemoryCollection<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            documents: DashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Store a document as-is, bypassing schema encoding
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, id: ObjectId, document: Document) {
        self.documents.insert(id, document);
    }

    fn decode(document: &Document) -> Result<T> {
        Ok(bson::from_document(document.clone())?)
    }

    fn select(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<T>> {
        self.documents
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .take(limit.unwrap_or(usize::MAX))
            .map(|entry| Self::decode(entry.value()))
            .collect()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryCollection<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, mut item: T) -> Result<Identity> {
        let id = prepare_insert(&mut item);
        let document = bson::to_document(&item)?;
        self.documents.insert(id.object_id(), document);
        Ok(id)
    }

    async fn get(&self, id: Identity) -> Result<Option<T>> {
        self.documents
            .get(&id.object_id())
            .map(|entry| Self::decode(entry.value()))
            .transpose()
    }

    async fn sample(&self, limit: usize) -> Result<Vec<T>> {
        self.select(&Filter::All, Some(limit))
    }

    async fn find(&self, filter: Filter) -> Result<Vec<T>> {
        self.select(&filter, None)
    }

    async fn existing_ids(&self, filter: Filter) -> Result<HashSet<Identity>> {
        Ok(self
            .documents
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| Identity::from(*entry.key()))
            .collect())
    }

    async fn update(&self, id: Identity, set: Document) -> Result<bool> {
        let Some(mut entry) = self.documents.get_mut(&id.object_id()) else {
            return Ok(false);
        };

        // Validate the merged document before committing it
        let mut merged = entry.value().clone();
        for (key, value) in with_updated_at(set) {
            merged.insert(key, value);
        }
        Self::decode(&merged)?;
        *entry.value_mut() = merged;

        Ok(true)
    }

    async fn delete(&self, id: Identity) -> Result<bool> {
        Ok(self.documents.remove(&id.object_id()).is_some())
    }

    async fn delete_many(&self, filter: Filter) -> Result<u64> {
        if filter == Filter::All {
            warn!("Refusing unfiltered delete on '{}'", self.name);
            return Err(GenealogyError::Internal(
                "delete_many requires a filter".to_string(),
            ));
        }

        let before = self.documents.len();
        self.documents.retain(|_, document| !filter.matches(document));
        Ok(before.saturating_sub(self.documents.len()) as u64)
    }

    async fn count(&self, filter: Filter) -> Result<u64> {
        Ok(self
            .documents
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }
}
