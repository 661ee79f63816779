//! Database layer
//!
//! `EntityStore` is the persistence contract; MongoDB is the production
//! backend and `MemoryCollection` the development/test one.

pub mod collections;
pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use collections::{CollectionNames, Collections, EventStore, PeopleStore, RelationshipStore};
pub use memory::MemoryCollection;
pub use mongo::{MongoClient, MongoCollection};
pub use schemas::{EventDoc, PersonDoc, RelationshipDoc};
pub use store::{Entity, EntityStore, Filter};
