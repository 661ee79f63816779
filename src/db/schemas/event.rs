//! Event document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use super::set_field;
use crate::db::store::{Entity, IntoIndexes};
use crate::identity::{decode_all, Identity};
use crate::types::Result;

/// Collection name for events
pub const EVENT_COLLECTION: &str = "events";

/// Life event document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EventDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// People involved. Not checked against the people collection.
    #[serde(default)]
    pub participants: Vec<ObjectId>,

    #[serde(default)]
    pub media_url: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl IntoIndexes for EventDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "date": -1 },
            Some(
                IndexOptions::builder()
                    .name("date_index".to_string())
                    .sparse(true)
                    .build(),
            ),
        )]
    }
}

impl Entity for EventDoc {
    const KIND: &'static str = "Event";

    fn object_id(&self) -> Option<ObjectId> {
        self._id
    }

    fn assign(&mut self, id: ObjectId, now: DateTime) {
        self._id = Some(id);
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }
}

fn participant_ids(raw: &[String]) -> Result<Vec<ObjectId>> {
    Ok(decode_all(raw)?.iter().map(Identity::object_id).collect())
}

/// Create payload for an event
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct NewEvent {
    pub event_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub media_url: Vec<String>,
    pub notes: Option<String>,
}

impl NewEvent {
    /// Build the document to insert. Participant tokens must be well-formed.
    pub fn into_doc(self) -> Result<EventDoc> {
        Ok(EventDoc {
            _id: None,
            event_name: self.event_name,
            kind: self.kind,
            date: self.date,
            location: self.location,
            description: self.description,
            participants: participant_ids(&self.participants)?,
            media_url: self.media_url,
            notes: self.notes,
            created_at: None,
            updated_at: None,
        })
    }
}

/// Partial update for an event
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct EventPatch {
    pub event_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub participants: Option<Vec<String>>,
    pub media_url: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl EventPatch {
    /// Fields to `$set`
    pub fn into_set_document(self) -> Result<Document> {
        let participants = match self.participants {
            Some(raw) => Some(participant_ids(&raw)?),
            None => None,
        };

        let mut set = Document::new();
        set_field(&mut set, "event_name", self.event_name)?;
        set_field(&mut set, "type", self.kind)?;
        set_field(&mut set, "date", self.date)?;
        set_field(&mut set, "location", self.location)?;
        set_field(&mut set, "description", self.description)?;
        set_field(&mut set, "participants", participants)?;
        set_field(&mut set, "media_url", self.media_url)?;
        set_field(&mut set, "notes", self.notes)?;
        Ok(set)
    }
}
