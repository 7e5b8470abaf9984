use super::*;
use lumenflow_core::{EventPayload, FakeClock, FakeProcessProbe, Lane, WUEvent, WorkUnitId};
use std::fs;
use tempfile::TempDir;

fn store(dir: &TempDir) -> EventStore<FakeClock, FakeProcessProbe> {
    EventStore::new(
        dir.path().join("wu-events.jsonl"),
        FakeClock::new(),
        FakeProcessProbe::new(),
    )
}

fn create_event(n: u64) -> WUEvent {
    WUEvent {
        event_id: format!("evt-{n}").into(),
        timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        wu_id: WorkUnitId::from_number(n),
        payload: EventPayload::Create {
            lane: Lane::from("Ops".to_string()),
            title: format!("WU {n}"),
            priority: None,
            created_mode: None,
            initiative: None,
        },
    }
}

#[test]
fn load_on_missing_file_returns_empty() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let result = store.load().unwrap();
    assert!(result.events.is_empty());
    assert!(result.repair.is_none());
}

#[test]
fn append_then_load_round_trips_events_in_order() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    for n in 1..=3 {
        store.append(&create_event(n)).unwrap();
    }

    let result = store.load().unwrap();
    assert_eq!(result.events.len(), 3);
    assert_eq!(result.events[0].wu_id.as_str(), "WU-1");
    assert_eq!(result.events[2].wu_id.as_str(), "WU-3");
    assert!(result.repair.is_none());
}

#[test]
fn load_repairs_file_over_corruption_threshold() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let mut lines = Vec::new();
    for n in 1..=6 {
        lines.push(serde_json::to_string(&create_event(n)).unwrap());
    }
    for _ in 0..4 {
        lines.push("{not valid json".to_string());
    }
    let contents = lines.join("\n") + "\n";
    fs::write(store.path(), &contents).unwrap();

    let result = store.load().unwrap();
    let repair = result.repair.expect("expected corruption repair");
    assert_eq!(repair.lines_kept, 6);
    assert_eq!(repair.lines_removed, 4);
    assert!(fs::metadata(&repair.backup_path).is_ok());

    // The repaired file now contains only valid lines.
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.events.len(), 6);
    assert!(reloaded.repair.is_none());
}

#[test]
fn load_below_threshold_keeps_events_and_logs_warnings_without_rewriting() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let mut lines = Vec::new();
    for n in 1..=9 {
        lines.push(serde_json::to_string(&create_event(n)).unwrap());
    }
    lines.push("{not valid json".to_string());
    let contents = lines.join("\n") + "\n";
    fs::write(store.path(), &contents).unwrap();

    let result = store.load().unwrap();
    assert!(result.repair.is_none());
    assert_eq!(result.events.len(), 9);
}

#[test]
fn append_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let nested = EventStore::new(
        dir.path().join("nested/state/wu-events.jsonl"),
        FakeClock::new(),
        FakeProcessProbe::new(),
    );
    nested.append(&create_event(1)).unwrap();
    assert!(nested.path().exists());
}
