use super::*;

#[test]
fn serializes_with_documented_field_order() {
    let entry = LockEntry {
        wu_id: WorkUnitId::from_number(123),
        lane: "Operations: Tooling".to_string(),
        timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        pid: 12345,
        agent_session: Some("sess-1".to_string()),
    };
    let pretty = serde_json::to_string_pretty(&entry).unwrap();
    let keys: Vec<&str> = pretty
        .lines()
        .filter_map(|l| l.trim().split(':').next())
        .collect();
    assert_eq!(
        keys,
        vec!["{", "\"wu_id\"", "\"lane\"", "\"timestamp\"", "\"pid\"", "\"agent_session\"", "}"]
    );
}

#[test]
fn agent_session_omitted_when_absent() {
    let entry = LockEntry {
        wu_id: WorkUnitId::from_number(1),
        lane: "Ops".to_string(),
        timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        pid: 1,
        agent_session: None,
    };
    let json = serde_json::to_string(&entry).unwrap();
    assert!(!json.contains("agent_session"));
}

#[test]
fn round_trips_through_json() {
    let entry = LockEntry {
        wu_id: WorkUnitId::from_number(7),
        lane: "Intel".to_string(),
        timestamp: "2026-02-02T00:00:00.000Z".to_string(),
        pid: 999,
        agent_session: None,
    };
    let json = serde_json::to_string(&entry).unwrap();
    let back: LockEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}
