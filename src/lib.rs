//! Silsilah - genealogy graph service
//!
//! Stores people, the relationships between them and the life events they
//! take part in, and answers graph questions over them.
//!
//! ## Components
//!
//! - **Identity**: opaque identity tokens, decoded at the boundary
//! - **Store**: typed collections over MongoDB or an in-memory map
//! - **Integrity**: cascade delete and relationship endpoint checks
//! - **Neighborhood**: one-hop family subgraph of a person
//! - **Statistics**: collection counts, gender split, event sample

pub mod config;
pub mod db;
pub mod engine;
pub mod identity;
pub mod records;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use engine::GenealogyEngine;
pub use identity::Identity;
pub use server::{run, AppState};
pub use types::{GenealogyError, Result};
