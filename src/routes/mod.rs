//! HTTP route handlers

pub mod events;
pub mod family;
pub mod health;
pub mod people;
pub mod relationships;
pub mod response;

pub use events::{handle_events_request, EVENTS_PREFIX};
pub use family::{handle_family_tree, orphan_sweep, statistics, FAMILY_TREE_PREFIX};
pub use health::{health_check, readiness_check};
pub use people::{handle_people_request, PEOPLE_PREFIX};
pub use relationships::{handle_relationships_request, RELATIONSHIPS_PREFIX};
pub use response::{error_response, json_response, not_found_response, FullBody};
