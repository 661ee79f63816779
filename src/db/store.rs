//! Entity store contract
//!
//! Every collection (people, relationships, events) is reached through
//! `EntityStore<T>`, so the engine never knows whether it is talking to
//! MongoDB or the in-memory backend. Both backends store the same BSON
//! documents and evaluate the same `Filter`s.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashSet;

use crate::identity::Identity;
use crate::types::Result;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// A persisted document type
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Unpin + Send + Sync + IntoIndexes + 'static
{
    /// Human-readable kind, used in error messages and logs
    const KIND: &'static str;

    /// Store-assigned identity, `None` before insertion
    fn object_id(&self) -> Option<ObjectId>;

    /// Assign identity and creation timestamps
    fn assign(&mut self, id: ObjectId, now: DateTime);

    fn identity(&self) -> Option<Identity> {
        self.object_id().map(Identity::from)
    }
}

/// Simple field predicate understood by every backend
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// `field == value` (for array fields: the array contains `value`)
    Eq(String, Bson),
    /// `field` equals any of the values
    In(String, Vec<Bson>),
    /// Any sub-filter matches
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Bson>) -> Self {
        Self::Eq(field.to_string(), value.into())
    }

    pub fn any_of(field: &str, values: impl IntoIterator<Item = Bson>) -> Self {
        Self::In(field.to_string(), values.into_iter().collect())
    }

    /// Documents whose identity is in `ids`
    pub fn id_in(ids: impl IntoIterator<Item = Identity>) -> Self {
        Self::any_of(ID_FIELD, ids.into_iter().map(|id| Bson::ObjectId(id.object_id())))
    }

    /// Documents where either of two fields references `id`
    pub fn references(field_a: &str, field_b: &str, id: Identity) -> Self {
        Self::Or(vec![
            Self::eq(field_a, id.object_id()),
            Self::eq(field_b, id.object_id()),
        ])
    }

    /// Render as a MongoDB query document
    pub fn to_document(&self) -> Document {
        match self {
            Self::All => doc! {},
            Self::Eq(field, value) => {
                let mut query = Document::new();
                query.insert(field.clone(), value.clone());
                query
            }
            Self::In(field, values) => {
                let mut query = Document::new();
                query.insert(field.clone(), doc! { "$in": values.clone() });
                query
            }
            Self::Or(filters) => {
                let branches: Vec<Bson> = filters
                    .iter()
                    .map(|f| Bson::Document(f.to_document()))
                    .collect();
                doc! { "$or": branches }
            }
        }
    }

    /// Evaluate against a stored document, with MongoDB's semantics for the
    /// operators used here
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, value) => field_matches(doc.get(field), value),
            Self::In(field, values) => values.iter().any(|v| field_matches(doc.get(field), v)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

fn field_matches(actual: Option<&Bson>, expected: &Bson) -> bool {
    match actual {
        Some(Bson::Array(items)) => items.contains(expected) || actual == Some(expected),
        Some(Bson::Null) | None => matches!(expected, Bson::Null),
        Some(value) => value == expected,
    }
}

/// Prepare a document for insertion: fresh identity, `created_at == updated_at`
pub(crate) fn prepare_insert<T: Entity>(item: &mut T) -> Identity {
    let id = ObjectId::new();
    item.assign(id, DateTime::now());
    Identity::from(id)
}

/// Add the `updated_at` refresh to a field-merge update
pub(crate) fn with_updated_at(mut set: Document) -> Document {
    set.insert(UPDATED_AT_FIELD, DateTime::now());
    set
}

/// Generic persistence over one named collection
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Insert, assigning identity and timestamps. Returns the identity.
    async fn insert(&self, item: T) -> Result<Identity>;

    async fn get(&self, id: Identity) -> Result<Option<T>>;

    /// All documents, in no particular order
    async fn list(&self) -> Result<Vec<T>> {
        self.find(Filter::All).await
    }

    /// At most `limit` documents, in no particular order
    async fn sample(&self, limit: usize) -> Result<Vec<T>>;

    async fn find(&self, filter: Filter) -> Result<Vec<T>>;

    /// Identities of the documents matching `filter`. Reads only `_id`, so a
    /// document that no longer decodes as `T` still counts as existing.
    async fn existing_ids(&self, filter: Filter) -> Result<HashSet<Identity>>;

    /// Merge `set` into the document and refresh `updated_at`.
    /// Returns whether a document matched `id`.
    async fn update(&self, id: Identity, set: Document) -> Result<bool>;

    /// Returns whether a document was deleted
    async fn delete(&self, id: Identity) -> Result<bool>;

    /// Batch predicate delete. Returns the number of documents removed.
    async fn delete_many(&self, filter: Filter) -> Result<u64>;

    async fn count(&self, filter: Filter) -> Result<u64>;
}
