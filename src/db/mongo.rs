//! MongoDB client and collection wrapper

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::StreamExt;
use mongodb::{Client, Collection, IndexModel};
use std::collections::HashSet;
use tracing::{error, info, warn};

use crate::db::store::{
    prepare_insert, with_updated_at, Entity, EntityStore, Filter, ID_FIELD,
};
use crate::identity::Identity;
use crate::types::{GenealogyError, Result};

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the database answers a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", redact_uri(uri));

        // Bound server selection so an unreachable store fails fast
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri).await.map_err(|e| {
            GenealogyError::StorageUnavailable(format!("Failed to connect to MongoDB: {}", e))
        })?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| GenealogyError::StorageUnavailable(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Open a typed collection, applying its schema indexes
    pub async fn collection<T: Entity>(&self, name: &str) -> Result<MongoCollection<T>> {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Close pooled connections; waits for in-flight operations
    pub async fn close(&self) {
        info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}

/// Hide credentials when logging a connection string
pub fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &uri[..scheme_end], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Entity,
{
    inner: Collection<T>,
    name: String,
}

impl<T: Entity> MongoCollection<T> {
    /// Create a new collection handle and apply indexes
    pub async fn new(client: &Client, db_name: &str, collection_name: &str) -> Result<Self> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection {
            inner: collection,
            name: collection_name.to_string(),
        };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner.create_indexes(indices).await.map_err(|e| {
            GenealogyError::StorageUnavailable(format!(
                "Failed to create indexes on '{}': {}",
                self.name, e
            ))
        })?;

        Ok(())
    }

    fn by_id(id: Identity) -> Document {
        doc! { "_id": id.object_id() }
    }

    /// Drain a cursor. An undecodable document fails the whole read rather
    /// than vanishing from the result.
    async fn collect(&self, mut cursor: mongodb::Cursor<T>) -> Result<Vec<T>> {
        let mut results = Vec::new();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(d) => results.push(d),
                Err(e) => {
                    error!("Error reading {} document from '{}': {}", T::KIND, self.name, e);
                    return Err(e.into());
                }
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MongoCollection<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, mut item: T) -> Result<Identity> {
        let id = prepare_insert(&mut item);
        self.inner.insert_one(item).await?;
        Ok(id)
    }

    async fn get(&self, id: Identity) -> Result<Option<T>> {
        Ok(self.inner.find_one(Self::by_id(id)).await?)
    }

    async fn sample(&self, limit: usize) -> Result<Vec<T>> {
        // MongoDB reads a zero limit as "no limit"
        if limit == 0 {
            return Ok(Vec::new());
        }

        let cursor = self
            .inner
            .find(doc! {})
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;

        self.collect(cursor).await
    }

    async fn find(&self, filter: Filter) -> Result<Vec<T>> {
        let cursor = self.inner.find(filter.to_document()).await?;
        self.collect(cursor).await
    }

    async fn existing_ids(&self, filter: Filter) -> Result<HashSet<Identity>> {
        let mut cursor = self
            .inner
            .clone_with_type::<Document>()
            .find(filter.to_document())
            .projection(doc! { "_id": 1 })
            .await?;

        let mut ids = HashSet::new();
        while let Some(document) = cursor.next().await {
            if let Ok(oid) = document?.get_object_id(ID_FIELD) {
                ids.insert(Identity::from(oid));
            }
        }
        Ok(ids)
    }

    async fn update(&self, id: Identity, set: Document) -> Result<bool> {
        let result = self
            .inner
            .update_one(Self::by_id(id), doc! { "$set": with_updated_at(set) })
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: Identity) -> Result<bool> {
        let result = self.inner.delete_one(Self::by_id(id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_many(&self, filter: Filter) -> Result<u64> {
        if filter == Filter::All {
            warn!("Refusing unfiltered delete on '{}'", self.name);
            return Err(GenealogyError::Internal(
                "delete_many requires a filter".to_string(),
            ));
        }

        let result = self.inner.delete_many(filter.to_document()).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, filter: Filter) -> Result<u64> {
        Ok(self.inner.count_documents(filter.to_document()).await?)
    }
}
