use std::{fmt, str::FromStr};

use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::JarsError;

/// Calendar month key, rendered as zero-padded `YYYY-MM`.
///
/// Field order makes the derived `Ord` agree with lexicographic comparison of
/// the rendered string for every representable year (0000..=9999).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing today's date in UTC.
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar month immediately after this one.
    pub fn next(&self) -> Option<Self> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .and_then(|date| Self::new(date.year(), date.month()))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = JarsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || JarsError::InvalidMonth(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let digits = |range: std::ops::Range<usize>| {
            let part = &s[range];
            if part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse::<u32>().ok()
            } else {
                None
            }
        };
        let year = digits(0..4).ok_or_else(invalid)?;
        let month = digits(5..7).ok_or_else(invalid)?;
        Self::new(year as i32, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats_round_trip() {
        assert_eq!(key("2024-03").to_string(), "2024-03");
        assert_eq!(key("0999-12").to_string(), "0999-12");
    }

    #[test]
    fn rejects_malformed_keys() {
        for bad in ["2024-3", "2024/03", "2024-13", "2024-00", "24-03-01", "abcd-ef", "+202-01"] {
            assert!(bad.parse::<MonthKey>().is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn next_rolls_over_the_year() {
        assert_eq!(key("2024-01").next(), Some(key("2024-02")));
        assert_eq!(key("2024-12").next(), Some(key("2025-01")));
        assert_eq!(key("9999-12").next(), None);
    }

    #[test]
    fn ordering_matches_string_ordering() {
        let mut keys = vec![key("2025-01"), key("2024-11"), key("2024-02")];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut strings = rendered.clone();
        strings.sort();
        assert_eq!(rendered, strings);
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&key("2024-07")).unwrap();
        assert_eq!(json, "\"2024-07\"");
        assert!(serde_json::from_str::<MonthKey>("\"July\"").is_err());
    }
}
