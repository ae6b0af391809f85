//! Slot and month-key models.
//!
//! A slot is one (calendar date, shift label) unit of coverage, filled by
//! at most one worker. Slots are unique by (date, label) and live in a
//! fixed order that also defines their index at model-build time.
//!
//! Shift labels are opaque strings matched by exact equality (e.g. a
//! per-day alphabet like "L1"/"L2"/"L3").

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One (date, shift-label) unit of coverage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Calendar date of the shift.
    pub date: NaiveDate,
    /// Shift label within the day.
    pub shift: String,
}

impl Slot {
    /// Creates a new slot.
    pub fn new(date: NaiveDate, shift: impl Into<String>) -> Self {
        Self {
            date,
            shift: shift.into(),
        }
    }

    /// Month key of this slot's date.
    #[inline]
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.shift)
    }
}

/// Canonical `"YYYY-MM"` month key.
///
/// Quota-map keys use this form; absence of a quota entry for a
/// (worker, month) means no ceiling is imposed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// Creates a month key from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Self {
        Self(format!("{year:04}-{month:02}"))
    }

    /// Month key of a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Parses a `"YYYY-MM"` string. Returns `None` for malformed input.
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) || year < 0 {
            return None;
        }
        Some(Self::new(year, month))
    }

    /// Whether a date falls in this month.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    /// Canonical string form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expands an inclusive date range and a shift-label alphabet into the
/// ordered, gap-free slot list: every date carries every label, labels in
/// the given order within each day.
pub fn slot_grid(start: NaiveDate, end: NaiveDate, labels: &[&str]) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut date = start;
    while date <= end {
        for label in labels {
            slots.push(Slot::new(date, *label));
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_slot_month() {
        let slot = Slot::new(d(2025, 6, 2), "L2");
        assert_eq!(slot.month(), MonthKey::new(2025, 6));
        assert_eq!(slot.to_string(), "2025-06-02 L2");
    }

    #[test]
    fn test_month_key_roundtrip() {
        let key = MonthKey::from_date(d(2025, 7, 31));
        assert_eq!(key.as_str(), "2025-07");
        assert_eq!(MonthKey::parse("2025-07"), Some(key));
    }

    #[test]
    fn test_month_key_rejects_malformed() {
        assert_eq!(MonthKey::parse("2025"), None);
        assert_eq!(MonthKey::parse("2025-13"), None);
        assert_eq!(MonthKey::parse("2025-xx"), None);
    }

    #[test]
    fn test_month_key_contains() {
        let key = MonthKey::new(2025, 6);
        assert!(key.contains(d(2025, 6, 1)));
        assert!(key.contains(d(2025, 6, 30)));
        assert!(!key.contains(d(2025, 7, 1)));
    }

    #[test]
    fn test_slot_grid_order() {
        let slots = slot_grid(d(2025, 6, 1), d(2025, 6, 3), &["L1", "L2", "L3"]);
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0], Slot::new(d(2025, 6, 1), "L1"));
        assert_eq!(slots[4], Slot::new(d(2025, 6, 2), "L2"));
        assert_eq!(slots[8], Slot::new(d(2025, 6, 3), "L3"));
    }

    #[test]
    fn test_slot_grid_single_day() {
        let slots = slot_grid(d(2025, 6, 1), d(2025, 6, 1), &["L1"]);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_slot_grid_empty_range() {
        let slots = slot_grid(d(2025, 6, 2), d(2025, 6, 1), &["L1"]);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_slot_serde() {
        let slot = Slot::new(d(2025, 6, 2), "L2");
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, r#"{"date":"2025-06-02","shift":"L2"}"#);
        let back: Slot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);
    }
}
