use chrono::TimeZone;

use super::*;

#[test]
fn test_format_timestamp_is_fixed_width() {
    let whole = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let fractional = whole + chrono::Duration::microseconds(1500);

    let a = format_timestamp(whole);
    let b = format_timestamp(fractional);

    assert_eq!(a, "2024-03-01T12:00:00.000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
}

#[test]
fn test_parse_timestamp_round_trip() {
    let ts = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
}

#[test]
fn test_parse_timestamp_accepts_offsets() {
    let parsed = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_parse_timestamp_rejects_garbage() {
    let err = parse_timestamp("yesterday").unwrap_err();
    assert!(matches!(err, StorageError::Corrupt(_)));
}

#[test]
fn test_parse_optional_timestamp() {
    assert_eq!(parse_optional_timestamp(None).unwrap(), None);
    assert!(parse_optional_timestamp(Some("2024-01-01T00:00:00Z"))
        .unwrap()
        .is_some());
}
