//! Name-driven field coercion.
//!
//! The field name alone decides how a raw value is typed. [`RULES`] is
//! consulted top to bottom and the first matching rule wins; names no rule
//! matches stay text.

use chrono::{NaiveDate, NaiveTime};

use crate::{
    core::diagnostics::{Diagnostic, Diagnostics},
    error::{ParseError, ParseResult},
    record::{FieldValue, RawRecord, Record},
    types::{INT_SENTINEL, RecordNo},
};

/// Integer fields, in the order they are converted.
pub const INTEGER_FIELDS: [&str; 4] = ["dxcc", "cqz", "ituz", "tx_pwr"];

/// Placeholder `tx_pwr` values some loggers write, matched case-insensitively.
const TX_PWR_EXCEPTIONS: &[(&str, i64)] = &[("unknown", INT_SENTINEL)];

/// How a field is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `YYYYMMDD` date.
    Date,
    /// Frequency as a float.
    Frequency,
    /// `HHMM` or `HHMMSS` time of day.
    Time,
    /// Integer with `-1` fallback.
    Integer,
    /// Kept verbatim.
    Text,
}

/// One entry of the coercion table.
#[derive(Debug, Clone, Copy)]
pub struct CoercionRule {
    /// Category selected when `matches` holds.
    pub kind: FieldKind,
    /// Predicate over the lowercased field name.
    pub matches: fn(&str) -> bool,
}

/// Coercion table, highest precedence first.
pub const RULES: &[CoercionRule] = &[
    CoercionRule {
        kind: FieldKind::Date,
        matches: |name| name.ends_with("_date"),
    },
    CoercionRule {
        kind: FieldKind::Frequency,
        matches: |name| name == "freq",
    },
    CoercionRule {
        kind: FieldKind::Time,
        matches: |name| name.starts_with("time_"),
    },
    CoercionRule {
        kind: FieldKind::Integer,
        matches: |name| INTEGER_FIELDS.iter().any(|f| *f == name),
    },
];

/// Category of a lowercased field name.
pub fn classify(name: &str) -> FieldKind {
    RULES
        .iter()
        .find(|rule| (rule.matches)(name))
        .map_or(FieldKind::Text, |rule| rule.kind)
}

/// Types every field of a staged record.
///
/// Strict fields (dates, frequency, times) are handled first in name order
/// and fail the record on bad input. Integer fields follow in
/// [`INTEGER_FIELDS`] order and never fail: unusable text becomes
/// [`INT_SENTINEL`] plus a diagnostic.
pub fn fixup(raw: RawRecord, record: RecordNo, diags: &mut Diagnostics) -> ParseResult<Record> {
    let mut names: Vec<&String> = raw.keys().collect();
    names.sort_unstable();

    let mut out = Record::new();
    for name in names {
        let value = &raw[name];
        let typed = match classify(name) {
            FieldKind::Date => FieldValue::Date(parse_date(name, value, record)?),
            FieldKind::Frequency => FieldValue::Float(parse_freq(name, value, record)?),
            FieldKind::Time => FieldValue::Time(parse_time(name, value, record)?),
            FieldKind::Integer => continue,
            FieldKind::Text => FieldValue::Text(value.clone()),
        };
        out.insert(name, typed);
    }

    for name in INTEGER_FIELDS {
        if let Some(value) = raw.get(name) {
            out.insert(name, FieldValue::Int(parse_int(name, value, record, diags)));
        }
    }

    Ok(out)
}

fn parse_date(field: &str, value: &str, record: RecordNo) -> ParseResult<NaiveDate> {
    let err = || ParseError::InvalidDate {
        field: field.to_string(),
        record,
        value: value.to_string(),
    };
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| err())
}

fn parse_freq(field: &str, value: &str, record: RecordNo) -> ParseResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|source| ParseError::InvalidFrequency {
            field: field.to_string(),
            record,
            value: value.to_string(),
            source,
        })
}

fn parse_time(field: &str, value: &str, record: RecordNo) -> ParseResult<NaiveTime> {
    let components = match value.chars().count() {
        5 | 6 => 3,
        3 | 4 => 2,
        len => {
            return Err(ParseError::UnsupportedTimeLength {
                field: field.to_string(),
                record,
                len,
                value: value.to_string(),
            });
        }
    };
    let mut clock = [0u32; 3];
    let valid = value.bytes().all(|b| b.is_ascii_digit())
        && split_clock(value.as_bytes(), &CLOCK_LIMITS[..components], &mut clock);
    valid
        .then(|| NaiveTime::from_hms_opt(clock[0], clock[1], clock[2]))
        .flatten()
        .ok_or_else(|| ParseError::InvalidTime {
            field: field.to_string(),
            record,
            value: value.to_string(),
        })
}

/// Largest value of hour, minute and second.
const CLOCK_LIMITS: [u32; 3] = [23, 59, 59];

// Splits ASCII digits into clock components of one or two digits each,
// preferring two where the value stays in range. Unpadded writers drop the
// leading zero of any component, so "83100" is 8:31:00.
fn split_clock(digits: &[u8], limits: &[u32], out: &mut [u32]) -> bool {
    let Some((&limit, rest_limits)) = limits.split_first() else {
        return digits.is_empty();
    };
    for width in [2, 1] {
        let Some(head) = digits.get(..width) else {
            continue;
        };
        let v = head.iter().fold(0, |acc, d| acc * 10 + u32::from(d - b'0'));
        if v <= limit && split_clock(&digits[width..], rest_limits, &mut out[1..]) {
            out[0] = v;
            return true;
        }
    }
    false
}

fn parse_int(field: &str, value: &str, record: RecordNo, diags: &mut Diagnostics) -> i64 {
    if field == "tx_pwr" {
        if let Some((_, mapped)) = TX_PWR_EXCEPTIONS
            .iter()
            .find(|(text, _)| value.eq_ignore_ascii_case(text))
        {
            return *mapped;
        }
    }
    match value.trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            diags.push(Diagnostic::IntegerFallback {
                field: field.to_string(),
                record,
                value: value.to_string(),
            });
            INT_SENTINEL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn rule_precedence_follows_table_order() {
        assert_eq!(classify("qso_date"), FieldKind::Date);
        assert_eq!(classify("time_off_date"), FieldKind::Date);
        assert_eq!(classify("freq"), FieldKind::Frequency);
        assert_eq!(classify("freq_rx"), FieldKind::Text);
        assert_eq!(classify("time_on"), FieldKind::Time);
        assert_eq!(classify("tx_pwr"), FieldKind::Integer);
        assert_eq!(classify("rst_sent"), FieldKind::Text);
    }

    #[test]
    fn time_lengths_select_format() {
        let t = |v: &str| parse_time("time_on", v, 0).unwrap();
        let hms = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();
        assert_eq!(t("0831"), hms(8, 31, 0));
        assert_eq!(t("831"), hms(8, 31, 0));
        assert_eq!(t("083100"), hms(8, 31, 0));
        assert_eq!(t("83100"), hms(8, 31, 0));
        assert_eq!(t("08311"), hms(8, 31, 1));
        assert_eq!(t("123"), hms(12, 3, 0));
        assert_eq!(t("235959"), hms(23, 59, 59));
    }

    #[test]
    fn unsupported_time_length_is_fatal() {
        let err = parse_time("time_on", "08", 4).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedTimeLength { len: 2, record: 4, .. }
        ));
        assert!(matches!(
            parse_time("time_on", "0831000", 0),
            Err(ParseError::UnsupportedTimeLength { len: 7, .. })
        ));
        assert!(matches!(
            parse_time("time_on", "2561", 0),
            Err(ParseError::InvalidTime { .. })
        ));
    }

    #[test]
    fn bad_integers_fall_back_with_diagnostic() {
        let mut diags = Diagnostics::new();
        let rec = fixup(
            raw(&[("dxcc", "notanum"), ("cqz", " 5 "), ("tx_pwr", "UNKNOWN")]),
            9,
            &mut diags,
        )
        .unwrap();
        assert_eq!(rec.int("dxcc"), Some(INT_SENTINEL));
        assert_eq!(rec.int("cqz"), Some(5));
        assert_eq!(rec.int("tx_pwr"), Some(INT_SENTINEL));

        let diags = diags.into_vec();
        assert_eq!(
            diags,
            vec![Diagnostic::IntegerFallback {
                field: "dxcc".into(),
                record: 9,
                value: "notanum".into(),
            }]
        );
    }

    #[test]
    fn strict_fields_reject_garbage() {
        let mut diags = Diagnostics::new();
        assert!(matches!(
            fixup(raw(&[("qso_date", "2013-05-27")]), 0, &mut diags),
            Err(ParseError::InvalidDate { .. })
        ));
        assert!(matches!(
            fixup(raw(&[("qso_date", "20130231")]), 0, &mut diags),
            Err(ParseError::InvalidDate { .. })
        ));
        assert!(matches!(
            fixup(raw(&[("freq", "14.07x")]), 0, &mut diags),
            Err(ParseError::InvalidFrequency { .. })
        ));
        assert!(diags.is_empty());
    }
}
