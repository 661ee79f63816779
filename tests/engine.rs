//! Engine behaviour over the in-memory store, including injected storage faults

use async_trait::async_trait;
use bson::Document;
use std::collections::HashSet;
use std::sync::Arc;

use silsilah::db::schemas::{
    EventDoc, Gender, NewEvent, NewPerson, NewRelationship, PersonDoc, PersonPatch,
    RelationshipDoc, RelationshipPatch,
};
use silsilah::db::{Collections, Entity, EntityStore, Filter, MemoryCollection};
use silsilah::engine::{EngineConfig, GenealogyEngine};
use silsilah::{GenealogyError, Identity, Result};

// =============================================================================
// Fault injection
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Op {
    Insert,
    Get,
    Sample,
    Find,
    ExistingIds,
    Update,
    Delete,
    DeleteMany,
    Count,
}

/// Wraps a memory collection and fails the chosen operations with
/// `StorageUnavailable`.
struct FailingStore<T: Entity> {
    inner: MemoryCollection<T>,
    failing: Vec<Op>,
}

impl<T: Entity> FailingStore<T> {
    fn new(name: &str, failing: &[Op]) -> Self {
        Self {
            inner: MemoryCollection::new(name),
            failing: failing.to_vec(),
        }
    }

    fn check(&self, op: Op) -> Result<()> {
        if self.failing.contains(&op) {
            Err(GenealogyError::StorageUnavailable(format!(
                "{:?} on {} failed",
                op,
                self.inner.name()
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for FailingStore<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert(&self, item: T) -> Result<Identity> {
        self.check(Op::Insert)?;
        self.inner.insert(item).await
    }

    async fn get(&self, id: Identity) -> Result<Option<T>> {
        self.check(Op::Get)?;
        self.inner.get(id).await
    }

    async fn sample(&self, limit: usize) -> Result<Vec<T>> {
        self.check(Op::Sample)?;
        self.inner.sample(limit).await
    }

    async fn find(&self, filter: Filter) -> Result<Vec<T>> {
        self.check(Op::Find)?;
        self.inner.find(filter).await
    }

    async fn existing_ids(&self, filter: Filter) -> Result<HashSet<Identity>> {
        self.check(Op::ExistingIds)?;
        self.inner.existing_ids(filter).await
    }

    async fn update(&self, id: Identity, set: Document) -> Result<bool> {
        self.check(Op::Update)?;
        self.inner.update(id, set).await
    }

    async fn delete(&self, id: Identity) -> Result<bool> {
        self.check(Op::Delete)?;
        self.inner.delete(id).await
    }

    async fn delete_many(&self, filter: Filter) -> Result<u64> {
        self.check(Op::DeleteMany)?;
        self.inner.delete_many(filter).await
    }

    async fn count(&self, filter: Filter) -> Result<u64> {
        self.check(Op::Count)?;
        self.inner.count(filter).await
    }
}

const ALL_OPS: &[Op] = &[
    Op::Insert,
    Op::Get,
    Op::Sample,
    Op::Find,
    Op::ExistingIds,
    Op::Update,
    Op::Delete,
    Op::DeleteMany,
    Op::Count,
];

// =============================================================================
// Helpers
// =============================================================================

fn memory_engine() -> GenealogyEngine {
    GenealogyEngine::new(
        Collections::memory_only(&Default::default()),
        EngineConfig::default(),
    )
}

fn engine_with(people: &[Op], relationships: &[Op], events: &[Op]) -> GenealogyEngine {
    let collections = Collections::new(
        Arc::new(FailingStore::<PersonDoc>::new("people", people)),
        Arc::new(FailingStore::<RelationshipDoc>::new("relationships", relationships)),
        Arc::new(FailingStore::<EventDoc>::new("events", events)),
    );
    GenealogyEngine::new(collections, EngineConfig::default())
}

async fn add_person(engine: &GenealogyEngine, name: &str, gender: Option<Gender>) -> String {
    let person = engine
        .create_person(NewPerson {
            full_name: Some(name.to_string()),
            gender,
            ..Default::default()
        })
        .await
        .unwrap();
    person.id.unwrap().encode()
}

async fn relate(engine: &GenealogyEngine, a: &str, b: &str, kind: &str) -> String {
    let relationship = engine
        .create_relationship(NewRelationship {
            person_id_1: Some(a.to_string()),
            person_id_2: Some(b.to_string()),
            kind: Some(kind.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    relationship.id.unwrap().encode()
}

fn pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

// =============================================================================
// Entity store round trips
// =============================================================================

#[tokio::test]
async fn test_created_person_reads_back_equal() {
    let engine = memory_engine();
    let created = engine
        .create_person(NewPerson {
            full_name: Some("Siti Rahayu".into()),
            gender: Some(Gender::Female),
            suku: Some("Jawa".into()),
            occupations: vec!["weaver".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let id = created.id.unwrap();
    assert_eq!(id.encode().len(), 24);
    assert!(created.created_at.is_some());
    assert_eq!(created.created_at, created.updated_at);

    let fetched = engine.get_person(&id.encode()).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_update_changes_fields_and_timestamp() {
    let engine = memory_engine();
    let id = add_person(&engine, "Budi", None).await;
    let before = engine.get_person(&id).await.unwrap();

    engine
        .update_person(
            &id,
            PersonPatch {
                place_of_birth: Some("Medan".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = engine.get_person(&id).await.unwrap();
    assert_eq!(after.full_name, "Budi");
    assert_eq!(after.place_of_birth.as_deref(), Some("Medan"));
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn test_update_missing_id_is_not_found_and_creates_nothing() {
    let engine = memory_engine();
    let ghost = "65a1b2c3d4e5f60718293a4b";

    let result = engine
        .update_person(
            ghost,
            PersonPatch {
                full_name: Some("Nobody".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(GenealogyError::NotFound(_))));
    assert!(engine.list_people().await.unwrap().is_empty());

    let result = engine
        .update_relationship(ghost, RelationshipPatch::default())
        .await;
    assert!(matches!(result, Err(GenealogyError::NotFound(_))));
    assert!(engine.list_relationships().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_full_name_is_rejected() {
    let engine = memory_engine();
    let result = engine
        .create_person(NewPerson {
            full_name: Some("   ".into()),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(GenealogyError::Validation(_))));
    assert!(engine.list_people().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_event_participants_round_trip() {
    let engine = memory_engine();
    let a = add_person(&engine, "A", None).await;
    let b = add_person(&engine, "B", None).await;

    let event = engine
        .create_event(NewEvent {
            event_name: Some("Wedding".into()),
            kind: Some("ceremony".into()),
            participants: vec![a.clone(), b.clone()],
            ..Default::default()
        })
        .await
        .unwrap();

    let participants: Vec<String> = event.participants.iter().map(Identity::encode).collect();
    assert_eq!(participants, vec![a, b]);

    let fetched = engine.get_event(&event.id.unwrap().encode()).await.unwrap();
    assert_eq!(fetched, event);
}

// =============================================================================
// Identity decoding
// =============================================================================

#[tokio::test]
async fn test_malformed_identity_fails_before_store_access() {
    // Every store operation would fail with StorageUnavailable, so seeing
    // InvalidIdentity means the store was never reached.
    let engine = engine_with(ALL_OPS, ALL_OPS, ALL_OPS);

    for bad in ["", "xyz", "65a1b2c3d4e5f60718293a4", "zza1b2c3d4e5f60718293a4b"] {
        assert!(matches!(
            engine.get_person(bad).await,
            Err(GenealogyError::InvalidIdentity(_))
        ));
        assert!(matches!(
            engine.delete_person(bad).await,
            Err(GenealogyError::InvalidIdentity(_))
        ));
        assert!(matches!(
            engine.family_neighborhood(bad).await,
            Err(GenealogyError::InvalidIdentity(_))
        ));
        assert!(matches!(
            engine.update_event(bad, Default::default()).await,
            Err(GenealogyError::InvalidIdentity(_))
        ));
    }
}

#[tokio::test]
async fn test_malformed_endpoint_fails_before_store_access() {
    let engine = engine_with(ALL_OPS, ALL_OPS, ALL_OPS);
    let result = engine
        .create_relationship(NewRelationship {
            person_id_1: Some("not-an-id".into()),
            person_id_2: Some("65a1b2c3d4e5f60718293a4b".into()),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(GenealogyError::InvalidIdentity(_))));
}

// =============================================================================
// Referential integrity
// =============================================================================

#[tokio::test]
async fn test_relationship_to_missing_person_is_rejected() {
    let engine = memory_engine();
    let a = add_person(&engine, "A", None).await;

    let result = engine
        .create_relationship(NewRelationship {
            person_id_1: Some(a),
            person_id_2: Some("65a1b2c3d4e5f60718293a4b".into()),
            kind: Some("spouse".into()),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(GenealogyError::InvalidReference(_))));
    assert!(engine.list_relationships().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cascade_delete_removes_touching_relationships() {
    let engine = memory_engine();
    let a = add_person(&engine, "A", None).await;
    let b = add_person(&engine, "B", None).await;
    let c = add_person(&engine, "C", None).await;
    relate(&engine, &a, &b, "spouse").await;
    let kept = relate(&engine, &b, &c, "parent").await;

    let report = engine.delete_person(&a).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.relationships_removed, 1);
    assert_eq!(report.person_id.encode(), a);

    let remaining = engine.list_relationships().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id.unwrap().encode(), kept);

    assert!(matches!(
        engine.get_person(&a).await,
        Err(GenealogyError::NotFound(_))
    ));
    assert_eq!(engine.list_people().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cascade_delete_missing_person_is_not_found() {
    let engine = memory_engine();
    let result = engine.delete_person("65a1b2c3d4e5f60718293a4b").await;
    assert!(matches!(result, Err(GenealogyError::NotFound(_))));
}

#[tokio::test]
async fn test_cascade_cleanup_failure_is_reported() {
    let engine = engine_with(&[], &[Op::DeleteMany], &[]);
    let a = add_person(&engine, "A", None).await;
    let b = add_person(&engine, "B", None).await;
    relate(&engine, &a, &b, "sibling").await;

    let report = engine.delete_person(&a).await.unwrap();
    assert!(!report.is_complete());
    assert!(report.relationship_cleanup_error.is_some());
    assert_eq!(report.relationships_removed, 0);

    // The person is gone; the dangling relationship waits for a sweep
    assert!(matches!(
        engine.get_person(&a).await,
        Err(GenealogyError::NotFound(_))
    ));
    assert_eq!(engine.list_relationships().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sweep_repairs_interrupted_cascade() {
    let people = Arc::new(MemoryCollection::<PersonDoc>::new("people"));
    let engine = GenealogyEngine::new(
        Collections::new(
            people.clone(),
            Arc::new(MemoryCollection::<RelationshipDoc>::new("relationships")),
            Arc::new(MemoryCollection::<EventDoc>::new("events")),
        ),
        EngineConfig::default(),
    );

    let a = add_person(&engine, "A", None).await;
    let b = add_person(&engine, "B", None).await;
    let c = add_person(&engine, "C", None).await;
    relate(&engine, &a, &b, "spouse").await;
    relate(&engine, &b, &c, "parent").await;

    // Remove A behind the engine's back, as if the cascade stopped halfway
    assert!(people.delete(Identity::decode(&a).unwrap()).await.unwrap());

    assert_eq!(engine.sweep_orphan_relationships().await.unwrap(), 1);
    assert_eq!(engine.sweep_orphan_relationships().await.unwrap(), 0);
    assert_eq!(engine.list_relationships().await.unwrap().len(), 1);
}

// =============================================================================
// Family neighborhood
// =============================================================================

#[tokio::test]
async fn test_neighborhood_is_one_hop() {
    let engine = memory_engine();
    let a = add_person(&engine, "A", None).await;
    let b = add_person(&engine, "B", None).await;
    let c = add_person(&engine, "C", None).await;
    let d = add_person(&engine, "D", None).await;
    relate(&engine, &a, &b, "spouse").await;
    relate(&engine, &a, &c, "parent").await;
    relate(&engine, &c, &d, "parent").await;

    let tree = engine.family_neighborhood(&a).await.unwrap();
    assert_eq!(tree.person.id.unwrap().encode(), a);

    let pairs: HashSet<(String, String)> = tree
        .relationships
        .iter()
        .map(|r| pair(&r.person_id_1.encode(), &r.person_id_2.encode()))
        .collect();
    let expected: HashSet<(String, String)> = [pair(&a, &b), pair(&a, &c)].into_iter().collect();
    assert_eq!(pairs, expected);

    let related: HashSet<String> = tree
        .related_people
        .iter()
        .map(|p| p.id.unwrap().encode())
        .collect();
    let expected: HashSet<String> = [a.clone(), b, c].into_iter().collect();
    assert_eq!(related, expected);
    assert!(!related.contains(&d));
    assert_eq!(tree.relationships.len(), 2);
    assert_eq!(tree.related_people.len(), 3);
}

#[tokio::test]
async fn test_neighborhood_lists_each_relative_once() {
    let engine = memory_engine();
    let a = add_person(&engine, "A", None).await;
    let b = add_person(&engine, "B", None).await;
    let c = add_person(&engine, "C", None).await;
    relate(&engine, &a, &b, "spouse").await;
    relate(&engine, &b, &a, "spouse").await;
    relate(&engine, &a, &c, "parent").await;

    let tree = engine.family_neighborhood(&a).await.unwrap();
    assert_eq!(tree.relationships.len(), 3);
    assert_eq!(tree.related_people.len(), 3);

    let related: HashSet<String> = tree
        .related_people
        .iter()
        .map(|p| p.id.unwrap().encode())
        .collect();
    let expected: HashSet<String> = [a, b, c].into_iter().collect();
    assert_eq!(related, expected);
}

#[tokio::test]
async fn test_neighborhood_without_relationships_is_empty() {
    let engine = memory_engine();
    let a = add_person(&engine, "Alone", None).await;

    let tree = engine.family_neighborhood(&a).await.unwrap();
    assert_eq!(tree.person.full_name, "Alone");
    assert!(tree.relationships.is_empty());
    assert!(tree.related_people.is_empty());
}

#[tokio::test]
async fn test_neighborhood_is_idempotent() {
    let engine = memory_engine();
    let a = add_person(&engine, "A", None).await;
    let b = add_person(&engine, "B", None).await;
    relate(&engine, &a, &b, "sibling").await;

    let first = engine.family_neighborhood(&a).await.unwrap();
    let second = engine.family_neighborhood(&a).await.unwrap();

    let ids = |people: &[silsilah::records::PersonRecord]| -> HashSet<Identity> {
        people.iter().filter_map(|p| p.id).collect()
    };
    assert_eq!(first.person, second.person);
    assert_eq!(first.relationships.len(), second.relationships.len());
    assert_eq!(ids(&first.related_people), ids(&second.related_people));
}

#[tokio::test]
async fn test_neighborhood_of_missing_person_is_not_found() {
    let engine = memory_engine();
    let result = engine.family_neighborhood("65a1b2c3d4e5f60718293a4b").await;
    assert!(matches!(result, Err(GenealogyError::NotFound(_))));
}

// =============================================================================
// Statistics
// =============================================================================

#[tokio::test]
async fn test_statistics_counts() {
    let engine = memory_engine();
    let a = add_person(&engine, "A", Some(Gender::Male)).await;
    let b = add_person(&engine, "B", Some(Gender::Female)).await;
    add_person(&engine, "C", Some(Gender::Other)).await;
    add_person(&engine, "D", None).await;
    relate(&engine, &a, &b, "spouse").await;
    for i in 0..7 {
        engine
            .create_event(NewEvent {
                event_name: Some(format!("Event {}", i)),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.total_people, 4);
    assert_eq!(stats.total_relationships, 1);
    assert_eq!(stats.total_events, 7);
    assert_eq!(stats.gender_distribution.male, 1);
    assert_eq!(stats.gender_distribution.female, 1);
    assert!(
        stats.gender_distribution.male + stats.gender_distribution.female <= stats.total_people
    );
    assert_eq!(stats.recent_events.len(), 5);
}

#[tokio::test]
async fn test_statistics_on_empty_store() {
    let engine = memory_engine();
    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.total_people, 0);
    assert_eq!(stats.total_relationships, 0);
    assert_eq!(stats.total_events, 0);
    assert_eq!(stats.gender_distribution.male, 0);
    assert_eq!(stats.gender_distribution.female, 0);
    assert!(stats.recent_events.is_empty());
}

#[tokio::test]
async fn test_statistics_recent_events_degrade_to_empty() {
    let engine = engine_with(&[], &[], &[Op::Sample]);
    engine
        .create_event(NewEvent {
            event_name: Some("Harvest".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.total_events, 1);
    assert!(stats.recent_events.is_empty());
}

#[tokio::test]
async fn test_statistics_zero_limit_still_bounded() {
    let engine = GenealogyEngine::new(
        Collections::memory_only(&Default::default()),
        EngineConfig {
            recent_events_limit: 0,
        },
    );
    for i in 0..3 {
        engine
            .create_event(NewEvent {
                event_name: Some(format!("Event {}", i)),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.total_events, 3);
    assert_eq!(stats.recent_events.len(), 1);
}

#[tokio::test]
async fn test_statistics_count_failure_fails_whole() {
    let engine = engine_with(&[Op::Count], &[], &[]);
    assert!(matches!(
        engine.statistics().await,
        Err(GenealogyError::StorageUnavailable(_))
    ));
}
