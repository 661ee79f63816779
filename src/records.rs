//! Boundary records
//!
//! What callers see. Identities are hex strings under `_id` and timestamps are
//! RFC 3339, so no store-native value leaves the engine.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::schemas::{EventDoc, Gender, PersonDoc, RelationshipDoc};
use crate::identity::Identity;

fn timestamp(at: Option<bson::DateTime>) -> Option<DateTime<Utc>> {
    at.map(|at| at.to_chrono())
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PersonRecord {
    #[serde(rename = "_id")]
    pub id: Option<Identity>,
    pub full_name: String,
    pub native_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub place_of_birth: Option<String>,
    pub education_level: Option<String>,
    pub occupations: Vec<String>,
    pub roles_in_community: Vec<String>,
    pub suku: Option<String>,
    pub biography: Option<String>,
    pub photos: Vec<String>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<PersonDoc> for PersonRecord {
    fn from(doc: PersonDoc) -> Self {
        Self {
            id: doc._id.map(Identity::from),
            full_name: doc.full_name,
            native_name: doc.native_name,
            gender: doc.gender,
            birth_date: doc.birth_date,
            death_date: doc.death_date,
            place_of_birth: doc.place_of_birth,
            education_level: doc.education_level,
            occupations: doc.occupations,
            roles_in_community: doc.roles_in_community,
            suku: doc.suku,
            biography: doc.biography,
            photos: doc.photos,
            notes: doc.notes,
            created_at: timestamp(doc.created_at),
            updated_at: timestamp(doc.updated_at),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RelationshipRecord {
    #[serde(rename = "_id")]
    pub id: Option<Identity>,
    pub person_id_1: Identity,
    pub person_id_2: Identity,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RelationshipDoc> for RelationshipRecord {
    fn from(doc: RelationshipDoc) -> Self {
        Self {
            id: doc._id.map(Identity::from),
            person_id_1: doc.person_id_1.into(),
            person_id_2: doc.person_id_2.into(),
            kind: doc.kind,
            start_date: doc.start_date,
            end_date: doc.end_date,
            status: doc.status,
            notes: doc.notes,
            created_at: timestamp(doc.created_at),
            updated_at: timestamp(doc.updated_at),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EventRecord {
    #[serde(rename = "_id")]
    pub id: Option<Identity>,
    pub event_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub participants: Vec<Identity>,
    pub media_url: Vec<String>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<EventDoc> for EventRecord {
    fn from(doc: EventDoc) -> Self {
        Self {
            id: doc._id.map(Identity::from),
            event_name: doc.event_name,
            kind: doc.kind,
            date: doc.date,
            location: doc.location,
            description: doc.description,
            participants: doc.participants.into_iter().map(Identity::from).collect(),
            media_url: doc.media_url,
            notes: doc.notes,
            created_at: timestamp(doc.created_at),
            updated_at: timestamp(doc.updated_at),
        }
    }
}

/// Convert a batch of documents
pub(crate) fn to_records<D, R: From<D>>(docs: Vec<D>) -> Vec<R> {
    docs.into_iter().map(R::from).collect()
}
