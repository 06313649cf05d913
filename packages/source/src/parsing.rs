//! Field-level parsing and cleaning rules for accident rows.
//!
//! Every function here is lenient: a value that cannot be interpreted comes
//! back as `None` (or a neutral default) and the caller decides whether the
//! row survives.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive datetime layouts tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Offset-carrying layouts. The wall-clock time is kept, the offset dropped.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses an accident start time.
///
/// Accepts ISO 8601 with either `T` or a space separator, optional
/// fractional seconds, an optional UTC offset (kept as local wall-clock
/// time) and bare dates (midnight).
#[must_use]
pub fn parse_start_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.naive_local());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a single coordinate component. Returns `None` if the value is
/// missing, unparseable, or not finite.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parses a latitude/longitude pair, rejecting values outside the valid
/// geographic range.
#[must_use]
pub fn parse_lat_lng(lat: &str, lng: &str) -> Option<(f64, f64)> {
    let latitude = parse_coordinate(lat)?;
    let longitude = parse_coordinate(lng)?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some((latitude, longitude))
}

/// Parses a severity value. Integer-valued floats such as `"3.0"` are
/// accepted; anything else yields `0`, which is never major.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_severity(s: &str) -> i32 {
    let s = s.trim();
    if let Ok(value) = s.parse::<i32>() {
        return value;
    }

    match s.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => value as i32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike as _;

    use super::*;

    #[test]
    fn parses_space_separated_time() {
        let dt = parse_start_time("2016-02-08 05:46:00").unwrap();
        assert_eq!(dt.to_string(), "2016-02-08 05:46:00");
    }

    #[test]
    fn parses_fractional_and_t_separated_time() {
        let dt = parse_start_time("2021-11-30T17:02:11.000000000").unwrap();
        assert_eq!(dt.hour(), 17);
        let dt = parse_start_time("2021-11-30T17:02:11").unwrap();
        assert_eq!(dt.minute(), 2);
    }

    #[test]
    fn keeps_wall_clock_hour_for_offset_times() {
        let dt = parse_start_time("2020-06-01T22:10:00-04:00").unwrap();
        assert_eq!(dt.hour(), 22);
        let dt = parse_start_time("2020-06-01 07:10:00-04:00").unwrap();
        assert_eq!(dt.hour(), 7);
    }

    #[test]
    fn parses_date_only_as_midnight() {
        let dt = parse_start_time("2019-03-04").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn rejects_invalid_time() {
        assert!(parse_start_time("yesterday-ish").is_none());
        assert!(parse_start_time("").is_none());
        assert!(parse_start_time("2019-13-45 10:00:00").is_none());
    }

    #[test]
    fn parses_lat_lng_strings() {
        let (la, lo) = parse_lat_lng(" 25.7617", "-80.1918 ").unwrap();
        assert!((la - 25.7617).abs() < f64::EPSILON);
        assert!((lo - -80.1918).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_numeric_or_out_of_range_coordinates() {
        assert!(parse_lat_lng("abc", "-80.19").is_none());
        assert!(parse_lat_lng("", "-80.19").is_none());
        assert!(parse_lat_lng("NaN", "-80.19").is_none());
        assert!(parse_lat_lng("inf", "-80.19").is_none());
        assert!(parse_lat_lng("91.0", "-80.19").is_none());
        assert!(parse_lat_lng("25.0", "-181.0").is_none());
    }

    #[test]
    fn parses_severity_variants() {
        assert_eq!(parse_severity("3"), 3);
        assert_eq!(parse_severity(" 2 "), 2);
        assert_eq!(parse_severity("4.0"), 4);
        assert_eq!(parse_severity("2.5"), 0);
        assert_eq!(parse_severity("severe"), 0);
        assert_eq!(parse_severity(""), 0);
    }
}
