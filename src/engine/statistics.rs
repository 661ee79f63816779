//! Aggregate statistics

use serde::Serialize;
use tracing::{debug, warn};

use crate::db::schemas::{Gender, GENDER_FIELD};
use crate::db::{EventStore, Filter, PeopleStore, RelationshipStore};
use crate::records::{to_records, EventRecord};
use crate::types::Result;

pub const DEFAULT_RECENT_EVENTS_LIMIT: usize = 5;

/// People counted by gender. People recorded as "other", or with no gender,
/// fall in neither bucket.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenderDistribution {
    pub male: u64,
    pub female: u64,
}

#[derive(Serialize, Clone, Debug)]
pub struct Statistics {
    pub total_people: u64,
    pub total_relationships: u64,
    pub total_events: u64,
    pub gender_distribution: GenderDistribution,
    /// A bounded sample of events. Not ordered by date.
    pub recent_events: Vec<EventRecord>,
}

pub struct StatisticsAggregator {
    people: PeopleStore,
    relationships: RelationshipStore,
    events: EventStore,
    recent_events_limit: usize,
}

impl StatisticsAggregator {
    pub fn new(
        people: PeopleStore,
        relationships: RelationshipStore,
        events: EventStore,
        recent_events_limit: usize,
    ) -> Self {
        Self {
            people,
            relationships,
            events,
            // A zero limit would read as "unbounded" on MongoDB
            recent_events_limit: recent_events_limit.max(1),
        }
    }

    /// Counts fail the whole aggregate; the event sample degrades to empty.
    pub async fn compute(&self) -> Result<Statistics> {
        let (total_people, total_relationships, total_events, male, female) = tokio::try_join!(
            self.people.count(Filter::All),
            self.relationships.count(Filter::All),
            self.events.count(Filter::All),
            self.people.count(Filter::eq(GENDER_FIELD, Gender::Male.as_str())),
            self.people.count(Filter::eq(GENDER_FIELD, Gender::Female.as_str())),
        )?;

        debug!(
            "Counts - people: {}, relationships: {}, events: {}, male: {}, female: {}",
            total_people, total_relationships, total_events, male, female
        );

        let recent_events = match self.events.sample(self.recent_events_limit).await {
            Ok(events) => to_records(events),
            Err(e) => {
                warn!("Recent events unavailable, returning none: {}", e);
                Vec::new()
            }
        };

        Ok(Statistics {
            total_people,
            total_relationships,
            total_events,
            gender_distribution: GenderDistribution { male, female },
            recent_events,
        })
    }
}
