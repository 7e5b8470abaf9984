use super::*;

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new();
    let start = clock.epoch_ms();
    clock.advance(Duration::from_secs(10));
    assert_eq!(clock.epoch_ms(), start + 10_000);
}

#[test]
fn fake_clock_set_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    assert_eq!(clock.epoch_ms(), 1_700_000_000_000);
}

#[test]
fn rfc3339_formats_known_epoch() {
    assert_eq!(
        format_epoch_ms_rfc3339(1_700_000_000_000),
        "2023-11-14T22:13:20.000Z"
    );
}

#[test]
fn rfc3339_formats_epoch_zero() {
    assert_eq!(format_epoch_ms_rfc3339(0), "1970-01-01T00:00:00.000Z");
}

#[test]
fn system_clock_is_nonzero() {
    assert!(SystemClock.epoch_ms() > 0);
}

#[test]
fn rfc3339_parse_inverts_format_for_known_epoch() {
    let formatted = format_epoch_ms_rfc3339(1_700_000_000_000);
    assert_eq!(rfc3339_to_epoch_ms(&formatted), Some(1_700_000_000_000));
}

#[test]
fn rfc3339_parse_inverts_format_for_epoch_zero() {
    assert_eq!(rfc3339_to_epoch_ms("1970-01-01T00:00:00.000Z"), Some(0));
}

#[test]
fn rfc3339_parse_round_trips_across_many_epochs() {
    for epoch_ms in [0, 1, 999, 86_400_000, 1_700_000_000_000, 4_102_444_800_000] {
        let formatted = format_epoch_ms_rfc3339(epoch_ms);
        assert_eq!(rfc3339_to_epoch_ms(&formatted), Some(epoch_ms), "round trip failed for {epoch_ms}");
    }
}

#[test]
fn rfc3339_parse_rejects_malformed_input() {
    assert_eq!(rfc3339_to_epoch_ms("not a timestamp"), None);
    assert_eq!(rfc3339_to_epoch_ms("2026-01-01T00:00:00.000"), None);
}
