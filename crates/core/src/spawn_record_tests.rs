use super::*;

#[test]
fn terminal_statuses() {
    assert!(SpawnStatus::Completed.is_terminal());
    assert!(SpawnStatus::Crashed.is_terminal());
    assert!(SpawnStatus::Timeout.is_terminal());
    assert!(!SpawnStatus::Pending.is_terminal());
    assert!(!SpawnStatus::Running.is_terminal());
    assert!(!SpawnStatus::Stuck.is_terminal());
}

#[test]
fn round_trips_through_json() {
    let record = SpawnRecord {
        spawn_id: SpawnId::new("sp-1"),
        parent_wu: WorkUnitId::from_number(1),
        target_wu: WorkUnitId::from_number(2),
        lane: Lane::new("Ops"),
        spawned_at: "2026-01-01T00:00:00.000Z".to_string(),
        status: SpawnStatus::Running,
        completed_at: None,
    };
    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("completed_at"));
    let back: SpawnRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}
