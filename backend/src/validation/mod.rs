//! Field validators for simple-mode cells.
//!
//! Every validator takes the raw cell text (blank = empty or whitespace-only),
//! returns the normalized output text, or fails with a row-scoped
//! [`RowError`]. Type coercion (numbers, dates) happens here and nowhere else.
//!
//! # Example
//!
//! ```rust,ignore
//! use bulkmap::validation::{coerce_datetime, validate_positive_number};
//!
//! assert_eq!(coerce_datetime("2024-05-01", "Campaign Start Time")?, "2024-05-01 00:00");
//! assert_eq!(validate_positive_number("49.6", "Ad Set Daily Budget", true, "1")?, "50");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

use crate::error::{RowError, RowResult};
use crate::transform::profile::AgeBounds;

/// Canonical bulk-import date/time layout.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Date/time layouts tried after the canonical one.
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M %p",
    "%Y-%m-%d %I:%M %p",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M",
];

/// Date-only layouts; time defaults to midnight.
const DATE_LAYOUTS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y%m%d",
];

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn sorted(allowed: &BTreeSet<String>) -> Vec<String> {
    allowed.iter().cloned().collect()
}

/// Check a value against a closed enumeration.
///
/// Blank returns `default`; a non-blank value must match a member exactly
/// (after trimming).
pub fn validate_enum(
    value: &str,
    allowed: &BTreeSet<String>,
    field: &str,
    default: &str,
) -> RowResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(default.to_string());
    }
    if allowed.contains(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(RowError::InvalidEnumValue {
            field: field.to_string(),
            value: trimmed.to_string(),
            allowed: sorted(allowed),
        })
    }
}

/// Check a comma-separated list where every item belongs to `allowed`.
/// Blank returns `""`; a valid list is returned with its items trimmed and
/// re-joined with `,`.
pub fn validate_list(value: &str, allowed: &BTreeSet<String>, field: &str) -> RowResult<String> {
    let items: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if let Some(unknown) = items.iter().find(|item| !allowed.contains(**item)) {
        return Err(RowError::InvalidEnumValue {
            field: field.to_string(),
            value: unknown.to_string(),
            allowed: sorted(allowed),
        });
    }
    Ok(items.join(","))
}

/// Validate a strictly positive amount and round it to a whole number.
///
/// Blank returns `""` when `allow_blank`, otherwise `fallback`. Halves round
/// to even; an amount that rounds to zero is rejected. The integer is written
/// out in full, however large.
pub fn validate_positive_number(
    value: &str,
    field: &str,
    allow_blank: bool,
    fallback: &str,
) -> RowResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(if allow_blank {
            String::new()
        } else {
            fallback.to_string()
        });
    }

    let invalid = || RowError::InvalidNumber {
        field: field.to_string(),
        value: trimmed.to_string(),
    };

    let number: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !number.is_finite() {
        return Err(invalid());
    }
    let rounded = number.round_ties_even();
    if rounded < 1.0 {
        return Err(invalid());
    }
    Ok(format!("{:.0}", rounded))
}

/// Normalize a date/time cell to `YYYY-MM-DD HH:MM`.
pub fn coerce_datetime(value: &str, field: &str) -> RowResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    parse_datetime(trimmed)
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .ok_or_else(|| RowError::InvalidDateTime {
            field: field.to_string(),
            value: trimmed.to_string(),
        })
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    // Offsets keep the wall-clock time they were written with.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(dt);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, layout) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Title-case a gender cell and check it against `allowed`.
/// Blank returns `default`.
pub fn normalize_gender(
    value: &str,
    allowed: &BTreeSet<String>,
    default: &str,
) -> RowResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(default.to_string());
    }
    let titled = title_case(trimmed);
    if allowed.contains(&titled) {
        Ok(titled)
    } else {
        Err(RowError::InvalidGender {
            value: trimmed.to_string(),
        })
    }
}

/// Uppercase the first letter of each alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Resolve the targeting age pair.
///
/// Blank bounds default to the effective minimum / platform maximum. Two
/// provided bounds in the wrong order are rejected; anything else out of range
/// is clamped silently.
pub fn resolve_age_range(
    min: &str,
    max: &str,
    special_category: bool,
    bounds: AgeBounds,
) -> RowResult<(String, String)> {
    let effective_min = bounds.effective_min(special_category);
    let provided_min = parse_age(min, "Age Min")?;
    let provided_max = parse_age(max, "Age Max")?;

    if let (Some(lo), Some(hi)) = (provided_min, provided_max) {
        if lo > hi {
            return Err(RowError::InvalidAgeRange { min: lo, max: hi });
        }
    }

    let clamp = |age: i64| age.clamp(effective_min, bounds.max.max(effective_min));
    let lo = clamp(provided_min.unwrap_or(effective_min));
    let hi = clamp(provided_max.unwrap_or(bounds.max));
    Ok((lo.to_string(), hi.to_string()))
}

fn parse_age(value: &str, field: &str) -> RowResult<Option<i64>> {
    if is_blank(value) {
        return Ok(None);
    }
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(age) if age.is_finite() => Ok(Some(age.trunc() as i64)),
        _ => Err(RowError::InvalidNumber {
            field: field.to_string(),
            value: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::profile::MappingProfile;

    fn statuses() -> BTreeSet<String> {
        MappingProfile::revised().enums.status
    }

    #[test]
    fn test_enum_blank_uses_default() {
        assert_eq!(
            validate_enum("  ", &statuses(), "Campaign Status", "ACTIVE").unwrap(),
            "ACTIVE"
        );
        assert_eq!(validate_enum("", &statuses(), "Campaign Status", "").unwrap(), "");
    }

    #[test]
    fn test_enum_trims_and_accepts_member() {
        assert_eq!(
            validate_enum(" PAUSED ", &statuses(), "Campaign Status", "ACTIVE").unwrap(),
            "PAUSED"
        );
    }

    #[test]
    fn test_enum_rejects_with_sorted_allowed_list() {
        let err = validate_enum("paused", &statuses(), "Campaign Status", "ACTIVE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Campaign Status: 'paused' not in [ACTIVE, ARCHIVED, DELETED, PAUSED]"
        );
    }

    #[test]
    fn test_list_checks_every_item() {
        let allowed = MappingProfile::revised().enums.special_ad_categories;
        assert_eq!(
            validate_list(" HOUSING, CREDIT ,", &allowed, "Special Ad Categories").unwrap(),
            "HOUSING,CREDIT"
        );
        assert_eq!(validate_list("  ", &allowed, "Special Ad Categories").unwrap(), "");
        let err =
            validate_list("HOUSING, GAMBLING", &allowed, "Special Ad Categories").unwrap_err();
        assert!(err.to_string().contains("'GAMBLING'"));
    }

    #[test]
    fn test_positive_number_rounds() {
        assert_eq!(validate_positive_number("100", "b", true, "1").unwrap(), "100");
        assert_eq!(validate_positive_number("49.6", "b", true, "1").unwrap(), "50");
        assert_eq!(validate_positive_number("2.5", "b", true, "1").unwrap(), "2");
        assert_eq!(validate_positive_number("3.5", "b", true, "1").unwrap(), "4");
    }

    #[test]
    fn test_positive_number_large_values_written_in_full() {
        assert_eq!(
            validate_positive_number("1e20", "b", true, "1").unwrap(),
            "100000000000000000000"
        );
        assert_eq!(
            validate_positive_number("9223372036854775808", "b", true, "1").unwrap(),
            "9223372036854775808"
        );
        assert_eq!(validate_positive_number("0.6", "b", true, "1").unwrap(), "1");
    }

    #[test]
    fn test_positive_number_blank_policy() {
        assert_eq!(validate_positive_number(" ", "b", true, "1").unwrap(), "");
        assert_eq!(validate_positive_number("", "b", false, "1").unwrap(), "1");
    }

    #[test]
    fn test_positive_number_rejects() {
        for bad in ["0", "0.4", "0.5", "-5", "abc", "NaN", "inf", "1,000"] {
            let err =
                validate_positive_number(bad, "Campaign Daily Budget", true, "1").unwrap_err();
            assert_eq!(err.kind(), "InvalidNumber", "value {bad}");
        }
    }

    #[test]
    fn test_datetime_canonical_and_bare_date() {
        assert_eq!(coerce_datetime("", "t").unwrap(), "");
        assert_eq!(
            coerce_datetime("2024-05-01 09:30", "t").unwrap(),
            "2024-05-01 09:30"
        );
        assert_eq!(coerce_datetime("2024-05-01", "t").unwrap(), "2024-05-01 00:00");
    }

    #[test]
    fn test_datetime_general_layouts() {
        assert_eq!(
            coerce_datetime("2024-05-01T09:30:15", "t").unwrap(),
            "2024-05-01 09:30"
        );
        assert_eq!(
            coerce_datetime("2024-05-01T09:30:00+02:00", "t").unwrap(),
            "2024-05-01 09:30"
        );
        assert_eq!(coerce_datetime("05/01/2024", "t").unwrap(), "2024-05-01 00:00");
        assert_eq!(
            coerce_datetime("2024/05/01 18:05", "t").unwrap(),
            "2024-05-01 18:05"
        );
        assert_eq!(
            coerce_datetime("May 1, 2024", "t").unwrap(),
            "2024-05-01 00:00"
        );
    }

    #[test]
    fn test_datetime_rejects_garbage() {
        let err = coerce_datetime("next tuesday", "Campaign Start Time").unwrap_err();
        assert_eq!(err.kind(), "InvalidDateTime");
        assert!(err.to_string().contains("Campaign Start Time"));
        assert!(coerce_datetime("2024-13-45", "t").is_err());
    }

    #[test]
    fn test_gender_normalization() {
        let genders = MappingProfile::revised().enums.genders;
        assert_eq!(normalize_gender("", &genders, "All").unwrap(), "All");
        assert_eq!(normalize_gender("male", &genders, "All").unwrap(), "Male");
        assert_eq!(normalize_gender("FEMALE", &genders, "All").unwrap(), "Female");
        let err = normalize_gender("women", &genders, "All").unwrap_err();
        assert_eq!(err.kind(), "InvalidGender");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("aLL"), "All");
        assert_eq!(title_case("non-binary person"), "Non-Binary Person");
    }

    #[test]
    fn test_age_clamp_without_special_category() {
        let bounds = MappingProfile::revised().age;
        assert_eq!(
            resolve_age_range("10", "70", false, bounds).unwrap(),
            ("13".to_string(), "65".to_string())
        );
    }

    #[test]
    fn test_age_clamp_with_special_category() {
        let bounds = MappingProfile::revised().age;
        assert_eq!(
            resolve_age_range("10", "70", true, bounds).unwrap(),
            ("18".to_string(), "65".to_string())
        );
    }

    #[test]
    fn test_age_blank_defaults() {
        let bounds = MappingProfile::revised().age;
        assert_eq!(
            resolve_age_range("", "", false, bounds).unwrap(),
            ("13".to_string(), "65".to_string())
        );
        assert_eq!(
            resolve_age_range("", " ", true, bounds).unwrap(),
            ("18".to_string(), "65".to_string())
        );
        assert_eq!(
            resolve_age_range("25.0", "", false, bounds).unwrap(),
            ("25".to_string(), "65".to_string())
        );
    }

    #[test]
    fn test_age_inverted_range_rejected() {
        let bounds = MappingProfile::revised().age;
        let err = resolve_age_range("40", "20", false, bounds).unwrap_err();
        assert_eq!(err, RowError::InvalidAgeRange { min: 40, max: 20 });
        assert!(err.to_string().contains("Invalid age range"));
    }

    #[test]
    fn test_age_non_numeric_rejected() {
        let bounds = MappingProfile::revised().age;
        let err = resolve_age_range("twenty", "30", false, bounds).unwrap_err();
        assert_eq!(err.kind(), "InvalidNumber");
    }
}
