//! Database schemas
//!
//! MongoDB document structures for people, relationships and events, plus the
//! create/patch payloads that feed them. Payloads reject unknown fields so
//! identities and timestamps can only be set by the store.

mod event;
mod person;
mod relationship;

pub use event::{EventDoc, EventPatch, NewEvent, EVENT_COLLECTION};
pub use person::{Gender, NewPerson, PersonDoc, PersonPatch, GENDER_FIELD, PEOPLE_COLLECTION};
pub use relationship::{
    NewRelationship, RelationshipDoc, RelationshipPatch, PERSON_ID_1_FIELD, PERSON_ID_2_FIELD,
    RELATIONSHIP_COLLECTION,
};

use bson::Document;
use serde::Serialize;

use crate::types::{GenealogyError, Result};

/// Put `value` under `key` if the patch supplied it
fn set_field<V: Serialize>(set: &mut Document, key: &str, value: Option<V>) -> Result<()> {
    if let Some(value) = value {
        set.insert(key, bson::to_bson(&value)?);
    }
    Ok(())
}

/// Trimmed, non-empty required text
fn required_text(field: &str, value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GenealogyError::Validation(format!("{} is required", field))),
    }
}
