//! One-hop family neighborhood
//!
//! For a person: every relationship touching them, and the people at either
//! end of those relationships, fetched in one batch. The origin person is
//! itself an endpoint of each of its relationships and so appears in
//! `related_people` whenever it has any relationship. With no relationships
//! both lists are empty.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::db::schemas::{PERSON_ID_1_FIELD, PERSON_ID_2_FIELD};
use crate::db::{Filter, PeopleStore, RelationshipStore};
use crate::identity::Identity;
use crate::records::{to_records, PersonRecord, RelationshipRecord};
use crate::types::{GenealogyError, Result};

/// A person with their immediate relationship subgraph. List order is
/// unspecified.
#[derive(Serialize, Clone, Debug)]
pub struct FamilyNeighborhood {
    pub person: PersonRecord,
    pub relationships: Vec<RelationshipRecord>,
    pub related_people: Vec<PersonRecord>,
}

pub struct NeighborhoodResolver {
    people: PeopleStore,
    relationships: RelationshipStore,
}

impl NeighborhoodResolver {
    pub fn new(people: PeopleStore, relationships: RelationshipStore) -> Self {
        Self {
            people,
            relationships,
        }
    }

    pub async fn resolve(&self, id: Identity) -> Result<FamilyNeighborhood> {
        let person = self
            .people
            .get(id)
            .await?
            .ok_or_else(|| GenealogyError::NotFound(format!("Person {} not found", id)))?;

        let relationships = self
            .relationships
            .find(Filter::references(PERSON_ID_1_FIELD, PERSON_ID_2_FIELD, id))
            .await?;

        let related_ids: HashSet<Identity> = relationships
            .iter()
            .flat_map(|r| r.endpoints())
            .collect();

        // Single `_id in {...}` query rather than one fetch per relative
        let related_people = if related_ids.is_empty() {
            Vec::new()
        } else {
            self.people.find(Filter::id_in(related_ids.iter().copied())).await?
        };

        debug!(
            "Neighborhood of {}: {} relationship(s), {} related people",
            id,
            relationships.len(),
            related_people.len()
        );

        Ok(FamilyNeighborhood {
            person: person.into(),
            relationships: to_records(relationships),
            related_people: to_records(related_people),
        })
    }
}
