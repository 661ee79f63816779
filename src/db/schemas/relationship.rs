//! Relationship document schema
//!
//! A relationship is a typed edge between two people. Endpoint order carries
//! meaning only for directional kinds such as "parent".

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use super::{required_text, set_field};
use crate::db::store::{Entity, IntoIndexes};
use crate::identity::Identity;
use crate::types::Result;

/// Collection name for relationships
pub const RELATIONSHIP_COLLECTION: &str = "relationships";

pub const PERSON_ID_1_FIELD: &str = "person_id_1";
pub const PERSON_ID_2_FIELD: &str = "person_id_2";

/// Relationship document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RelationshipDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub person_id_1: ObjectId,

    pub person_id_2: ObjectId,

    /// spouse, parent, child, sibling. Stored as free text.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

fn default_status() -> String {
    "active".to_string()
}

impl RelationshipDoc {
    /// Both endpoint identities
    pub fn endpoints(&self) -> [Identity; 2] {
        [self.person_id_1.into(), self.person_id_2.into()]
    }

    /// Whether `id` is one of the endpoints
    pub fn touches(&self, id: Identity) -> bool {
        self.endpoints().contains(&id)
    }
}

impl IntoIndexes for RelationshipDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Neighborhood lookups and cascade deletes filter on either endpoint
            (
                doc! { "person_id_1": 1 },
                Some(
                    IndexOptions::builder()
                        .name("person_id_1_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "person_id_2": 1 },
                Some(
                    IndexOptions::builder()
                        .name("person_id_2_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl Entity for RelationshipDoc {
    const KIND: &'static str = "Relationship";

    fn object_id(&self) -> Option<ObjectId> {
        self._id
    }

    fn assign(&mut self, id: ObjectId, now: DateTime) {
        self._id = Some(id);
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }
}

/// Create payload for a relationship
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct NewRelationship {
    pub person_id_1: Option<String>,
    pub person_id_2: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl NewRelationship {
    /// Decode both endpoint identities
    pub fn endpoints(&self) -> Result<(Identity, Identity)> {
        let first = required_text(PERSON_ID_1_FIELD, self.person_id_1.clone())?;
        let second = required_text(PERSON_ID_2_FIELD, self.person_id_2.clone())?;
        Ok((Identity::decode(&first)?, Identity::decode(&second)?))
    }

    /// Build the document once the endpoints are known to be valid
    pub fn into_doc(self, person_id_1: Identity, person_id_2: Identity) -> RelationshipDoc {
        RelationshipDoc {
            _id: None,
            person_id_1: person_id_1.object_id(),
            person_id_2: person_id_2.object_id(),
            kind: self.kind,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.unwrap_or_else(default_status),
            notes: self.notes,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Partial update for a relationship. Endpoints are fixed once created.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct RelationshipPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl RelationshipPatch {
    /// Fields to `$set`
    pub fn into_set_document(self) -> Result<Document> {
        let mut set = Document::new();
        set_field(&mut set, "type", self.kind)?;
        set_field(&mut set, "start_date", self.start_date)?;
        set_field(&mut set, "end_date", self.end_date)?;
        set_field(&mut set, "status", self.status)?;
        set_field(&mut set, "notes", self.notes)?;
        Ok(set)
    }
}
