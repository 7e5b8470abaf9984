use super::*;
use lumenflow_core::{FakeClock, FakeProcessProbe, Lane, SpawnStatus, WorkUnitId};
use tempfile::TempDir;

fn record(spawn_id: &str, status: SpawnStatus) -> SpawnRecord {
    SpawnRecord {
        spawn_id: spawn_id.into(),
        parent_wu: WorkUnitId::from_number(1),
        target_wu: WorkUnitId::from_number(2),
        lane: Lane::from("Ops".to_string()),
        spawned_at: "2026-01-01T00:00:00.000Z".to_string(),
        status,
        completed_at: None,
    }
}

#[test]
fn load_on_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = SpawnStore::new(dir.path().join("spawns.jsonl"), FakeClock::new(), FakeProcessProbe::new());
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn later_record_for_same_spawn_id_supersedes_earlier_one() {
    let dir = TempDir::new().unwrap();
    let store = SpawnStore::new(dir.path().join("spawns.jsonl"), FakeClock::new(), FakeProcessProbe::new());

    store.append(&record("spawn-1", SpawnStatus::Pending)).unwrap();
    store.append(&record("spawn-1", SpawnStatus::Running)).unwrap();
    store.append(&record("spawn-1", SpawnStatus::Completed)).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].status, SpawnStatus::Completed);
}

#[test]
fn preserves_first_seen_order_across_distinct_spawn_ids() {
    let dir = TempDir::new().unwrap();
    let store = SpawnStore::new(dir.path().join("spawns.jsonl"), FakeClock::new(), FakeProcessProbe::new());

    store.append(&record("spawn-a", SpawnStatus::Pending)).unwrap();
    store.append(&record("spawn-b", SpawnStatus::Pending)).unwrap();
    store.append(&record("spawn-a", SpawnStatus::Running)).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].spawn_id.as_str(), "spawn-a");
    assert_eq!(loaded[0].status, SpawnStatus::Running);
    assert_eq!(loaded[1].spawn_id.as_str(), "spawn-b");
}
