use super::*;

#[test]
fn from_number_formats_wu_prefix() {
    assert_eq!(WorkUnitId::from_number(42).as_str(), "WU-42");
}

#[test]
fn parse_accepts_valid_ids() {
    assert_eq!(WorkUnitId::parse("WU-1").unwrap().number(), 1);
    assert_eq!(WorkUnitId::parse("WU-12345").unwrap().number(), 12345);
}

#[yare::parameterized(
    missing_prefix = { "1" },
    wrong_prefix = { "wu-1" },
    zero = { "WU-0" },
    non_numeric = { "WU-abc" },
    empty_number = { "WU-" },
    trailing_junk = { "WU-1a" },
    negative = { "WU--1" },
)]
fn parse_rejects_malformed_ids(input: &str) {
    assert!(WorkUnitId::parse(input).is_err());
}

#[test]
fn display_round_trips() {
    let id = WorkUnitId::parse("WU-7").unwrap();
    assert_eq!(id.to_string(), "WU-7");
}

#[test]
fn ordering_is_numeric_via_string_but_tested_directly() {
    // String ordering of "WU-<n>" is not numeric for multi-digit n; callers
    // needing numeric order must compare `.number()`, not the id directly.
    let a = WorkUnitId::parse("WU-2").unwrap();
    let b = WorkUnitId::parse("WU-10").unwrap();
    assert!(a.number() < b.number());
}

#[test]
fn try_from_string_and_str() {
    assert!(WorkUnitId::try_from("WU-5".to_string()).is_ok());
    assert!(WorkUnitId::try_from("bogus").is_err());
}

crate::define_id! {
    /// Test-only id for exercising the macro in isolation.
    pub struct ScratchId;
}

#[test]
fn define_id_macro_generates_expected_impls() {
    let id = ScratchId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.to_string(), "abc");
    assert_eq!(id, "abc");
    assert_eq!(ScratchId::from("abc".to_string()), id);
}
