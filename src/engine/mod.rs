//! Genealogy engine
//!
//! Every operation the serving layer calls. Identity tokens arrive as
//! strings and are decoded before any store access; results leave as
//! boundary records.
//!
//! ## Components
//!
//! - **Integrity**: cascade delete, endpoint validation, orphan sweep
//! - **Neighborhood**: one-hop family subgraph of a person
//! - **Statistics**: counts, gender distribution, event sample

pub mod integrity;
pub mod neighborhood;
pub mod statistics;

pub use integrity::{CascadeDeleteReport, IntegrityManager};
pub use neighborhood::{FamilyNeighborhood, NeighborhoodResolver};
pub use statistics::{
    GenderDistribution, Statistics, StatisticsAggregator, DEFAULT_RECENT_EVENTS_LIMIT,
};

use bson::Document;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::db::schemas::{
    EventPatch, NewEvent, NewPerson, NewRelationship, PersonPatch, RelationshipPatch,
};
use crate::db::{
    Collections, Entity, EntityStore, EventStore, Filter, PeopleStore, RelationshipStore,
};
use crate::identity::Identity;
use crate::records::{to_records, EventRecord, PersonRecord, RelationshipRecord};
use crate::types::{GenealogyError, Result};

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Size of the event sample in statistics
    pub recent_events_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recent_events_limit: DEFAULT_RECENT_EVENTS_LIMIT,
        }
    }
}

/// Per-collection counts for readiness checks
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionCounts {
    pub people: u64,
    pub relationships: u64,
    pub events: u64,
}

pub struct GenealogyEngine {
    people: PeopleStore,
    relationships: RelationshipStore,
    events: EventStore,
    integrity: IntegrityManager,
    resolver: NeighborhoodResolver,
    statistics: StatisticsAggregator,
}

impl GenealogyEngine {
    pub fn new(collections: Collections, config: EngineConfig) -> Self {
        let Collections {
            people,
            relationships,
            events,
        } = collections;

        Self {
            integrity: IntegrityManager::new(people.clone(), relationships.clone()),
            resolver: NeighborhoodResolver::new(people.clone(), relationships.clone()),
            statistics: StatisticsAggregator::new(
                people.clone(),
                relationships.clone(),
                events.clone(),
                config.recent_events_limit,
            ),
            people,
            relationships,
            events,
        }
    }

    // =========================================================================
    // People
    // =========================================================================

    pub async fn list_people(&self) -> Result<Vec<PersonRecord>> {
        Ok(to_records(self.people.list().await?))
    }

    pub async fn get_person(&self, id: &str) -> Result<PersonRecord> {
        let id = Identity::decode(id)?;
        fetch(self.people.as_ref(), id).await.map(PersonRecord::from)
    }

    /// Insert a person. Only `full_name` is required.
    pub async fn create_person(&self, payload: NewPerson) -> Result<PersonRecord> {
        let doc = payload.into_doc()?;
        let id = self.people.insert(doc).await?;
        info!("Created person {}", id);
        fetch(self.people.as_ref(), id).await.map(PersonRecord::from)
    }

    pub async fn update_person(&self, id: &str, patch: PersonPatch) -> Result<()> {
        let id = Identity::decode(id)?;
        let set = patch.into_set_document()?;
        update(self.people.as_ref(), id, set).await
    }

    /// Delete a person and, best-effort, every relationship naming them
    pub async fn delete_person(&self, id: &str) -> Result<CascadeDeleteReport> {
        let id = Identity::decode(id)?;
        self.integrity.cascade_delete_person(id).await
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    pub async fn list_relationships(&self) -> Result<Vec<RelationshipRecord>> {
        Ok(to_records(self.relationships.list().await?))
    }

    pub async fn get_relationship(&self, id: &str) -> Result<RelationshipRecord> {
        let id = Identity::decode(id)?;
        fetch(self.relationships.as_ref(), id)
            .await
            .map(RelationshipRecord::from)
    }

    /// Insert a relationship between two existing people
    pub async fn create_relationship(&self, payload: NewRelationship) -> Result<RelationshipRecord> {
        let (person_id_1, person_id_2) = payload.endpoints()?;
        self.integrity
            .validate_relationship_endpoints(person_id_1, person_id_2)
            .await?;

        let id = self
            .relationships
            .insert(payload.into_doc(person_id_1, person_id_2))
            .await?;
        info!(
            "Created relationship {} between {} and {}",
            id, person_id_1, person_id_2
        );
        fetch(self.relationships.as_ref(), id)
            .await
            .map(RelationshipRecord::from)
    }

    pub async fn update_relationship(&self, id: &str, patch: RelationshipPatch) -> Result<()> {
        let id = Identity::decode(id)?;
        let set = patch.into_set_document()?;
        update(self.relationships.as_ref(), id, set).await
    }

    pub async fn delete_relationship(&self, id: &str) -> Result<()> {
        let id = Identity::decode(id)?;
        delete(self.relationships.as_ref(), id).await
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub async fn list_events(&self) -> Result<Vec<EventRecord>> {
        Ok(to_records(self.events.list().await?))
    }

    pub async fn get_event(&self, id: &str) -> Result<EventRecord> {
        let id = Identity::decode(id)?;
        fetch(self.events.as_ref(), id).await.map(EventRecord::from)
    }

    pub async fn create_event(&self, payload: NewEvent) -> Result<EventRecord> {
        let doc = payload.into_doc()?;
        let id = self.events.insert(doc).await?;
        info!("Created event {}", id);
        fetch(self.events.as_ref(), id).await.map(EventRecord::from)
    }

    pub async fn update_event(&self, id: &str, patch: EventPatch) -> Result<()> {
        let id = Identity::decode(id)?;
        let set = patch.into_set_document()?;
        update(self.events.as_ref(), id, set).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<()> {
        let id = Identity::decode(id)?;
        delete(self.events.as_ref(), id).await
    }

    // =========================================================================
    // Composite operations
    // =========================================================================

    pub async fn family_neighborhood(&self, id: &str) -> Result<FamilyNeighborhood> {
        let id = Identity::decode(id)?;
        self.resolver.resolve(id).await
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        self.statistics.compute().await
    }

    pub async fn sweep_orphan_relationships(&self) -> Result<u64> {
        self.integrity.sweep_orphan_relationships().await
    }

    /// Count every collection; fails if any store is unreachable
    pub async fn collection_counts(&self) -> Result<CollectionCounts> {
        let (people, relationships, events) = tokio::try_join!(
            self.people.count(Filter::All),
            self.relationships.count(Filter::All),
            self.events.count(Filter::All),
        )?;
        Ok(CollectionCounts {
            people,
            relationships,
            events,
        })
    }
}

/// Periodically remove relationships whose endpoints no longer exist
pub fn spawn_orphan_sweep_task(engine: Arc<GenealogyEngine>, interval: Duration) -> JoinHandle<()> {
    let handle = tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            match engine.sweep_orphan_relationships().await {
                Ok(0) => debug!("Orphan sweep: nothing to remove"),
                Ok(removed) => info!("Orphan sweep: removed {} relationship(s)", removed),
                Err(e) => warn!("Orphan sweep failed: {}", e),
            }
        }
    });
    info!("Orphan sweep task started (every {}s)", interval.as_secs());
    handle
}

async fn fetch<T: Entity>(store: &dyn EntityStore<T>, id: Identity) -> Result<T> {
    store
        .get(id)
        .await?
        .ok_or_else(|| GenealogyError::NotFound(format!("{} {} not found", T::KIND, id)))
}

async fn update<T: Entity>(store: &dyn EntityStore<T>, id: Identity, set: Document) -> Result<()> {
    if store.update(id, set).await? {
        debug!("Updated {} {}", T::KIND, id);
        Ok(())
    } else {
        Err(GenealogyError::NotFound(format!("{} {} not found", T::KIND, id)))
    }
}

async fn delete<T: Entity>(store: &dyn EntityStore<T>, id: Identity) -> Result<()> {
    if store.delete(id).await? {
        info!("Deleted {} {}", T::KIND, id);
        Ok(())
    } else {
        Err(GenealogyError::NotFound(format!("{} {} not found", T::KIND, id)))
    }
}
