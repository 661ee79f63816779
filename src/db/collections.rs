//! Store handles for the three collections
//!
//! Built once at startup and passed to every component; there is no
//! process-wide client.

use std::sync::Arc;
use tracing::info;

use crate::db::memory::MemoryCollection;
use crate::db::mongo::MongoClient;
use crate::db::schemas::{
    EventDoc, PersonDoc, RelationshipDoc, EVENT_COLLECTION, PEOPLE_COLLECTION,
    RELATIONSHIP_COLLECTION,
};
use crate::db::store::EntityStore;
use crate::types::Result;

pub type PeopleStore = Arc<dyn EntityStore<PersonDoc>>;
pub type RelationshipStore = Arc<dyn EntityStore<RelationshipDoc>>;
pub type EventStore = Arc<dyn EntityStore<EventDoc>>;

/// Collection names, overridable from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    pub people: String,
    pub relationships: String,
    pub events: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            people: PEOPLE_COLLECTION.to_string(),
            relationships: RELATIONSHIP_COLLECTION.to_string(),
            events: EVENT_COLLECTION.to_string(),
        }
    }
}

/// Handles to the people, relationships and events collections
#[derive(Clone)]
pub struct Collections {
    pub people: PeopleStore,
    pub relationships: RelationshipStore,
    pub events: EventStore,
}

impl Collections {
    pub fn new(people: PeopleStore, relationships: RelationshipStore, events: EventStore) -> Self {
        Self {
            people,
            relationships,
            events,
        }
    }

    /// Open all three collections on MongoDB, applying indexes
    pub async fn open(mongo: &MongoClient, names: &CollectionNames) -> Result<Self> {
        let people = mongo.collection::<PersonDoc>(&names.people).await?;
        let relationships = mongo
            .collection::<RelationshipDoc>(&names.relationships)
            .await?;
        let events = mongo.collection::<EventDoc>(&names.events).await?;

        info!(
            "Opened collections '{}', '{}', '{}' in '{}'",
            names.people,
            names.relationships,
            names.events,
            mongo.db_name()
        );

        Ok(Self::new(
            Arc::new(people),
            Arc::new(relationships),
            Arc::new(events),
        ))
    }

    /// Fresh in-memory collections
    pub fn memory_only(names: &CollectionNames) -> Self {
        Self::new(
            Arc::new(MemoryCollection::<PersonDoc>::new(&names.people)),
            Arc::new(MemoryCollection::<RelationshipDoc>::new(&names.relationships)),
            Arc::new(MemoryCollection::<EventDoc>::new(&names.events)),
        )
    }
}
