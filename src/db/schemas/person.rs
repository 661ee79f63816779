//! Person document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use super::{required_text, set_field};
use crate::db::store::{Entity, IntoIndexes};
use crate::types::Result;

/// Collection name for people
pub const PEOPLE_COLLECTION: &str = "people";

pub const GENDER_FIELD: &str = "gender";

/// Gender as recorded. Statistics only distinguish male and female.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

/// Person document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PersonDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub full_name: String,

    /// Name in the local script or language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,

    #[serde(default)]
    pub occupations: Vec<String>,

    #[serde(default)]
    pub roles_in_community: Vec<String>,

    /// Clan (suku) label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,

    /// Photo URLs
    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl IntoIndexes for PersonDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Gender distribution counts
            (
                doc! { "gender": 1 },
                Some(
                    IndexOptions::builder()
                        .name("gender_index".to_string())
                        .sparse(true)
                        .build(),
                ),
            ),
        ]
    }
}

impl Entity for PersonDoc {
    const KIND: &'static str = "Person";

    fn object_id(&self) -> Option<ObjectId> {
        self._id
    }

    fn assign(&mut self, id: ObjectId, now: DateTime) {
        self._id = Some(id);
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }
}

/// Create payload for a person
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct NewPerson {
    pub full_name: Option<String>,
    pub native_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub place_of_birth: Option<String>,
    pub education_level: Option<String>,
    #[serde(default)]
    pub occupations: Vec<String>,
    #[serde(default)]
    pub roles_in_community: Vec<String>,
    pub suku: Option<String>,
    pub biography: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub notes: Option<String>,
}

impl NewPerson {
    /// Validate and build the document to insert. Only `full_name` is required.
    pub fn into_doc(self) -> Result<PersonDoc> {
        Ok(PersonDoc {
            _id: None,
            full_name: required_text("full_name", self.full_name)?,
            native_name: self.native_name,
            gender: self.gender,
            birth_date: self.birth_date,
            death_date: self.death_date,
            place_of_birth: self.place_of_birth,
            education_level: self.education_level,
            occupations: self.occupations,
            roles_in_community: self.roles_in_community,
            suku: self.suku,
            biography: self.biography,
            photos: self.photos,
            notes: self.notes,
            created_at: None,
            updated_at: None,
        })
    }
}

/// Partial update for a person. Absent fields are left untouched.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PersonPatch {
    pub full_name: Option<String>,
    pub native_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub place_of_birth: Option<String>,
    pub education_level: Option<String>,
    pub occupations: Option<Vec<String>>,
    pub roles_in_community: Option<Vec<String>>,
    pub suku: Option<String>,
    pub biography: Option<String>,
    pub photos: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl PersonPatch {
    /// Fields to `$set`
    pub fn into_set_document(self) -> Result<Document> {
        let mut set = Document::new();
        if self.full_name.is_some() {
            set.insert("full_name", required_text("full_name", self.full_name)?);
        }
        set_field(&mut set, "native_name", self.native_name)?;
        set_field(&mut set, GENDER_FIELD, self.gender)?;
        set_field(&mut set, "birth_date", self.birth_date)?;
        set_field(&mut set, "death_date", self.death_date)?;
        set_field(&mut set, "place_of_birth", self.place_of_birth)?;
        set_field(&mut set, "education_level", self.education_level)?;
        set_field(&mut set, "occupations", self.occupations)?;
        set_field(&mut set, "roles_in_community", self.roles_in_community)?;
        set_field(&mut set, "suku", self.suku)?;
        set_field(&mut set, "biography", self.biography)?;
        set_field(&mut set, "photos", self.photos)?;
        set_field(&mut set, "notes", self.notes)?;
        Ok(set)
    }
}
