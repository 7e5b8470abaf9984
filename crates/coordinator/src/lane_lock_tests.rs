use super::*;
use lumenflow_core::{FakeClock, FakeProcessProbe};
use std::time::Duration;
use tempfile::TempDir;

fn manager(dir: &TempDir, clock: FakeClock, probe: FakeProcessProbe) -> LaneLockManager<FakeClock, FakeProcessProbe> {
    LaneLockManager::new(dir.path(), clock, probe, Duration::from_secs(2 * 60 * 60))
}

#[test]
fn acquire_on_empty_lane_succeeds() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    let result = mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();
    assert!(result.acquired);
    assert!(result.existing_lock.is_none());
}

#[test]
fn reacquisition_by_same_owner_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    let wu = WorkUnitId::from_number(1);
    mgr.acquire("ops", &wu, "Ops", None).unwrap();
    let second = mgr.acquire("ops", &wu, "Ops", None).unwrap();
    assert!(second.acquired);
}

#[test]
fn acquire_fails_when_a_different_live_wu_holds_the_lane() {
    let dir = TempDir::new().unwrap();
    let probe = FakeProcessProbe::new();
    let mgr = manager(&dir, FakeClock::new(), probe);
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    let result = mgr.acquire("ops", &WorkUnitId::from_number(2), "Ops", None).unwrap();
    assert!(!result.acquired);
    assert_eq!(result.existing_lock.unwrap().wu_id, WorkUnitId::from_number(1));
}

#[test]
fn acquire_reclaims_a_zombie_lock_from_a_dead_pid() {
    let dir = TempDir::new().unwrap();
    let probe = FakeProcessProbe::new();
    let mgr = manager(&dir, FakeClock::new(), probe.clone());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    probe.kill(std::process::id() as i64);
    let result = mgr.acquire("ops", &WorkUnitId::from_number(2), "Ops", None).unwrap();
    assert!(result.acquired);
    assert_eq!(result.existing_lock.unwrap().wu_id, WorkUnitId::from_number(1));
}

#[test]
fn release_by_owner_removes_the_lock() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    let wu = WorkUnitId::from_number(1);
    mgr.acquire("ops", &wu, "Ops", None).unwrap();

    let result = mgr.release("ops", Some(&wu), false).unwrap();
    assert!(result.released);
    assert!(!result.not_found);
    assert!(!mgr.check("ops").unwrap().locked);
}

#[test]
fn release_on_missing_lock_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    let result = mgr.release("ops", None, false).unwrap();
    assert!(result.released);
    assert!(result.not_found);
}

#[test]
fn release_by_non_owner_without_force_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    let err = mgr.release("ops", Some(&WorkUnitId::from_number(2)), false).unwrap_err();
    assert!(matches!(err, LaneLockError::NotOwner { .. }));
}

#[test]
fn check_reports_staleness_past_the_threshold() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::new();
    let mgr = manager(&dir, clock.clone(), FakeProcessProbe::new());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    assert!(!mgr.check("ops").unwrap().is_stale);
    clock.advance(Duration::from_secs(3 * 60 * 60));
    assert!(mgr.check("ops").unwrap().is_stale);
}

#[test]
fn force_remove_stale_leaves_a_fresh_lock_untouched() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    let result = mgr.force_remove_stale("ops").unwrap();
    assert!(!result.released);
    assert!(mgr.check("ops").unwrap().locked);
}

#[test]
fn force_remove_stale_removes_an_expired_lock() {
    let dir = TempDir::new().unwrap();
    let clock = FakeClock::new();
    let mgr = manager(&dir, clock.clone(), FakeProcessProbe::new());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();
    clock.advance(Duration::from_secs(3 * 60 * 60));

    let result = mgr.force_remove_stale("ops").unwrap();
    assert!(result.released);
    assert!(!mgr.check("ops").unwrap().locked);
}

#[test]
fn audited_unlock_requires_a_non_empty_reason() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    let err = mgr.audited_unlock("ops", "Ops", "   ", true).unwrap_err();
    assert!(matches!(err, LaneLockError::MissingReason { .. }));
}

#[test]
fn audited_unlock_refuses_to_remove_an_active_lock_without_force() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    let (result, audit) = mgr.audited_unlock("ops", "Ops", "need it now", false).unwrap();
    assert!(!result.released);
    assert!(audit.is_none());
    assert!(mgr.check("ops").unwrap().locked);
}

#[test]
fn audited_unlock_with_force_removes_an_active_lock_and_writes_an_audit() {
    let dir = TempDir::new().unwrap();
    let mgr = manager(&dir, FakeClock::new(), FakeProcessProbe::new());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();

    let (result, audit) = mgr.audited_unlock("ops", "Ops", "urgent override", true).unwrap();
    assert!(result.released);
    let audit = audit.unwrap();
    assert_eq!(audit.reason, "urgent override");
    assert!(audit.forced);
    assert!(!mgr.check("ops").unwrap().locked);
}

#[test]
fn audited_unlock_removes_a_zombie_lock_without_force() {
    let dir = TempDir::new().unwrap();
    let probe = FakeProcessProbe::new();
    let mgr = manager(&dir, FakeClock::new(), probe.clone());
    mgr.acquire("ops", &WorkUnitId::from_number(1), "Ops", None).unwrap();
    probe.kill(std::process::id() as i64);

    let (result, audit) = mgr.audited_unlock("ops", "Ops", "dead agent", false).unwrap();
    assert!(result.released);
    assert!(!audit.unwrap().forced);
}
