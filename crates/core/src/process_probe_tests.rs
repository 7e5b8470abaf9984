use super::*;

#[test]
fn nonpositive_pid_is_never_alive() {
    let probe = UnixProcessProbe;
    assert!(!probe.is_alive(0));
    assert!(!probe.is_alive(-1));
}

#[test]
fn current_process_is_alive() {
    let probe = UnixProcessProbe;
    assert!(probe.is_alive(std::process::id() as i64));
}

#[test]
fn implausible_pid_is_dead() {
    // PIDs are 32-bit on Linux; this value can never be assigned.
    let probe = UnixProcessProbe;
    assert!(!probe.is_alive(i64::from(i32::MAX)));
}

#[test]
fn fake_probe_defaults_alive() {
    let probe = FakeProcessProbe::new();
    assert!(probe.is_alive(1234));
}

#[test]
fn fake_probe_kill_marks_dead() {
    let probe = FakeProcessProbe::new();
    probe.kill(1234);
    assert!(!probe.is_alive(1234));
    assert!(probe.is_alive(5678));
}

#[test]
fn fake_probe_nonpositive_pid_is_never_alive() {
    let probe = FakeProcessProbe::new();
    assert!(!probe.is_alive(0));
}
