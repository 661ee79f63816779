//! Referential integrity across people and relationships
//!
//! The store has no foreign keys and no cross-collection transactions, so:
//!
//! - deleting a person is two phases (person, then every relationship naming
//!   them). A failure in the second phase is reported, never rolled back, and
//!   leaves orphaned relationships behind;
//! - `sweep_orphan_relationships` is the idempotent repair pass for that
//!   window, safe to run at any time;
//! - new relationships must name two existing people.

use bson::Bson;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::db::schemas::{PERSON_ID_1_FIELD, PERSON_ID_2_FIELD};
use crate::db::{Filter, PeopleStore, RelationshipStore};
use crate::identity::Identity;
use crate::types::{GenealogyError, Result};

/// Outcome of a cascading person delete
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CascadeDeleteReport {
    pub person_id: Identity,
    pub relationships_removed: u64,
    /// Set when removing the person's relationships failed. The person is
    /// deleted regardless; orphans remain until the next sweep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_cleanup_error: Option<String>,
}

impl CascadeDeleteReport {
    /// Whether both phases succeeded
    pub fn is_complete(&self) -> bool {
        self.relationship_cleanup_error.is_none()
    }
}

pub struct IntegrityManager {
    people: PeopleStore,
    relationships: RelationshipStore,
}

impl IntegrityManager {
    pub fn new(people: PeopleStore, relationships: RelationshipStore) -> Self {
        Self {
            people,
            relationships,
        }
    }

    /// Delete a person and every relationship where they are either endpoint.
    ///
    /// `NotFound` if the person does not exist, in which case no relationship
    /// is touched.
    pub async fn cascade_delete_person(&self, id: Identity) -> Result<CascadeDeleteReport> {
        if !self.people.delete(id).await? {
            return Err(GenealogyError::NotFound(format!("Person {} not found", id)));
        }

        let touching = Filter::references(PERSON_ID_1_FIELD, PERSON_ID_2_FIELD, id);
        match self.relationships.delete_many(touching).await {
            Ok(removed) => {
                info!("Deleted person {} and {} relationship(s)", id, removed);
                Ok(CascadeDeleteReport {
                    person_id: id,
                    relationships_removed: removed,
                    relationship_cleanup_error: None,
                })
            }
            Err(e) => {
                warn!(
                    "Person {} deleted but relationship cleanup failed, orphans remain until the next sweep: {}",
                    id, e
                );
                Ok(CascadeDeleteReport {
                    person_id: id,
                    relationships_removed: 0,
                    relationship_cleanup_error: Some(e.to_string()),
                })
            }
        }
    }

    /// Both endpoints must resolve to existing people
    pub async fn validate_relationship_endpoints(
        &self,
        person_id_1: Identity,
        person_id_2: Identity,
    ) -> Result<()> {
        let found = self
            .people
            .existing_ids(Filter::id_in([person_id_1, person_id_2]))
            .await?;

        for (field, id) in [(PERSON_ID_1_FIELD, person_id_1), (PERSON_ID_2_FIELD, person_id_2)] {
            if !found.contains(&id) {
                return Err(GenealogyError::InvalidReference(format!(
                    "{} {} does not reference an existing person",
                    field, id
                )));
            }
        }

        Ok(())
    }

    /// Remove relationships whose endpoint no longer exists. Returns how
    /// many were removed.
    pub async fn sweep_orphan_relationships(&self) -> Result<u64> {
        let relationships = self.relationships.list().await?;
        let endpoints: HashSet<Identity> = relationships
            .iter()
            .flat_map(|r| r.endpoints())
            .collect();

        if endpoints.is_empty() {
            return Ok(0);
        }

        let existing = self
            .people
            .existing_ids(Filter::id_in(endpoints.iter().copied()))
            .await?;

        let missing: Vec<Bson> = endpoints
            .difference(&existing)
            .map(|id| Bson::ObjectId(id.object_id()))
            .collect();

        if missing.is_empty() {
            debug!("Orphan sweep: {} relationship(s) all consistent", relationships.len());
            return Ok(0);
        }

        let orphans = Filter::Or(vec![
            Filter::any_of(PERSON_ID_1_FIELD, missing.clone()),
            Filter::any_of(PERSON_ID_2_FIELD, missing),
        ]);
        let removed = self.relationships.delete_many(orphans).await?;

        warn!("Orphan sweep removed {} dangling relationship(s)", removed);
        Ok(removed)
    }
}
