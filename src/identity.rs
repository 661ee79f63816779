//! Identity codec
//!
//! Entities are keyed by MongoDB ObjectIds inside the store. Outside the
//! engine an identity is always the 24-character hex string; the ObjectId
//! itself never crosses the boundary.

use bson::oid::ObjectId;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::types::{GenealogyError, Result};

/// Opaque entity identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(ObjectId);

impl Identity {
    /// Decode an external identity token.
    ///
    /// Fails with `InvalidIdentity` unless `raw` is exactly a 24-character
    /// ObjectId hex string. Callers decode before touching the store.
    pub fn decode(raw: &str) -> Result<Self> {
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| GenealogyError::InvalidIdentity(format!("'{}' is not a valid identity", raw)))
    }

    /// Encode for an external boundary
    pub fn encode(&self) -> String {
        self.0.to_hex()
    }

    /// Fresh identity, as the store would assign it
    pub(crate) fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub(crate) fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for Identity {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for Identity {
    type Err = GenealogyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// Boundary records carry identities as plain strings.
impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

/// Decode a list of identity tokens, failing on the first malformed one
pub fn decode_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Identity>> {
    raw.iter().map(|r| Identity::decode(r.as_ref())).collect()
}
