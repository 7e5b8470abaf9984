use super::*;

#[test]
fn spawned_entry_has_expected_status() {
    let entry = WaveEntry::spawned(WorkUnitId::from_number(1), Lane::new("Ops"));
    assert_eq!(entry.status, "spawned");
}

#[test]
fn manifest_round_trips_through_json() {
    let manifest = WaveManifest {
        initiative: "INIT-1".to_string(),
        wave: 0,
        created_at: "2026-01-01T00:00:00.000Z".to_string(),
        wus: vec![WaveEntry::spawned(WorkUnitId::from_number(1), Lane::new("Ops"))],
    };
    let json = serde_json::to_string(&manifest).unwrap();
    let back: WaveManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, manifest);
}
