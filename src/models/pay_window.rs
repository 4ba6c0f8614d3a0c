//! Pay window model.
//!
//! This module contains the [`PayWindow`] type that bounds a payroll run.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// A closed date range over which attendance is aggregated.
///
/// # Example
///
/// ```
/// use teacher_payroll::models::PayWindow;
/// use chrono::NaiveDate;
///
/// let window = PayWindow::new(
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
/// )
/// .unwrap();
///
/// assert!(window.contains_date(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()));
/// assert!(!window.contains_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayWindow {
    /// The first day of the window (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the window (inclusive).
    pub end_date: NaiveDate,
}

impl PayWindow {
    /// Creates a window, rejecting one that ends before it starts.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        if start_date > end_date {
            return Err(EngineError::InvalidWindow {
                start_date,
                end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// The calendar month containing `date`.
    ///
    /// # Example
    ///
    /// ```
    /// use teacher_payroll::models::PayWindow;
    /// use chrono::NaiveDate;
    ///
    /// let window = PayWindow::calendar_month(NaiveDate::from_ymd_opt(2028, 2, 10).unwrap());
    /// assert_eq!(window.start_date, NaiveDate::from_ymd_opt(2028, 2, 1).unwrap());
    /// assert_eq!(window.end_date, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
    /// ```
    pub fn calendar_month(date: NaiveDate) -> Self {
        let start_date = date.with_day(1).unwrap_or(date);
        let next_month_start = if date.month() == 12 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
        };
        let end_date = next_month_start
            .and_then(|d| d.pred_opt())
            .unwrap_or(date);
        Self {
            start_date,
            end_date,
        }
    }

    /// The calendar month before the one containing `date`.
    pub fn previous_calendar_month(date: NaiveDate) -> Self {
        let this_month = Self::calendar_month(date);
        let last_day_of_previous = this_month.start_date.pred_opt().unwrap_or(date);
        Self::calendar_month(last_day_of_previous)
    }

    /// Checks if a given date falls within this window (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days in the window.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

impl fmt::Display for PayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inverted_window_rejected() {
        let result = PayWindow::new(date(2026, 3, 31), date(2026, 3, 1));
        assert!(matches!(result, Err(EngineError::InvalidWindow { .. })));
    }

    #[test]
    fn test_single_day_window() {
        let window = PayWindow::new(date(2026, 3, 2), date(2026, 3, 2)).unwrap();
        assert_eq!(window.days(), 1);
        assert!(window.contains_date(date(2026, 3, 2)));
    }

    #[test]
    fn test_contains_date_boundaries() {
        let window = PayWindow::new(date(2026, 3, 1), date(2026, 3, 31)).unwrap();
        assert!(window.contains_date(window.start_date));
        assert!(window.contains_date(window.end_date));
        assert!(!window.contains_date(date(2026, 2, 28)));
        assert!(!window.contains_date(date(2026, 4, 1)));
    }

    #[test]
    fn test_previous_calendar_month_across_year() {
        let window = PayWindow::previous_calendar_month(date(2027, 1, 1));
        assert_eq!(window.start_date, date(2026, 12, 1));
        assert_eq!(window.end_date, date(2026, 12, 31));
    }

    #[test]
    fn test_previous_calendar_month_february() {
        let window = PayWindow::previous_calendar_month(date(2026, 3, 1));
        assert_eq!(window.start_date, date(2026, 2, 1));
        assert_eq!(window.end_date, date(2026, 2, 28));
        assert_eq!(window.days(), 28);
    }

    #[test]
    fn test_window_display() {
        let window = PayWindow::new(date(2026, 3, 1), date(2026, 3, 31)).unwrap();
        assert_eq!(window.to_string(), "2026-03-01..=2026-03-31");
    }

    #[test]
    fn test_window_deserialization() {
        let json = r#"{"start_date": "2026-03-01", "end_date": "2026-03-31"}"#;
        let window: PayWindow = serde_json::from_str(json).unwrap();
        assert_eq!(window.days(), 31);
    }
}
