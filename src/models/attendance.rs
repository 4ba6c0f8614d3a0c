//! Attendance records and the joined view consumed by the payroll engine.
//!
//! An [`AttendanceRecord`] is one teacher's clock-in/clock-out pair for a
//! single work day. [`QualifyingAttendance`] is the same record after the
//! ledger has joined it with the teacher and their pay grade and confirmed
//! that it is closed.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordStatus;

const SECONDS_PER_HOUR: i64 = 3600;

/// Converts the span between two instants into fractional hours.
///
/// Resolution is one second; the result keeps full decimal precision.
fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Decimal {
    let seconds = (end - start).num_seconds();
    Decimal::new(seconds, 0) / Decimal::new(SECONDS_PER_HOUR, 0)
}

/// One teacher's attendance for one work day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The teacher who clocked in.
    pub teacher_id: Uuid,
    /// The work day. At most one record exists per teacher and date.
    pub date: NaiveDate,
    /// When the teacher clocked in.
    pub clock_in: NaiveDateTime,
    /// When the teacher clocked out, if they have.
    pub clock_out: Option<NaiveDateTime>,
    /// Soft-delete status.
    #[serde(default)]
    pub status: RecordStatus,
}

impl AttendanceRecord {
    /// Opens a new record for `teacher_id` clocked in at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use teacher_payroll::models::AttendanceRecord;
    /// use chrono::NaiveDateTime;
    /// use uuid::Uuid;
    ///
    /// let now = NaiveDateTime::parse_from_str("2026-03-02 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let record = AttendanceRecord::open(Uuid::new_v4(), now);
    /// assert_eq!(record.date, now.date());
    /// assert!(!record.is_closed());
    /// ```
    pub fn open(teacher_id: Uuid, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            teacher_id,
            date: now.date(),
            clock_in: now,
            clock_out: None,
            status: RecordStatus::Active,
        }
    }

    /// Returns true once clock-out has been recorded.
    pub fn is_closed(&self) -> bool {
        self.clock_out.is_some()
    }

    /// Returns the hours between clock-in and clock-out, or `None` while open.
    ///
    /// # Examples
    ///
    /// ```
    /// use teacher_payroll::models::AttendanceRecord;
    /// use chrono::NaiveDateTime;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let mut record = AttendanceRecord::open(Uuid::new_v4(), parse("2026-03-02 08:00:00"));
    /// record.clock_out = Some(parse("2026-03-02 15:30:00"));
    /// assert_eq!(record.worked_hours(), Some(Decimal::new(75, 1)));
    /// ```
    pub fn worked_hours(&self) -> Option<Decimal> {
        self.clock_out
            .map(|clock_out| hours_between(self.clock_in, clock_out))
    }
}

/// A closed attendance record joined with its teacher and pay grade.
///
/// This is the row shape the ledger hands to the payroll engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifyingAttendance {
    /// The attendance record id.
    pub record_id: Uuid,
    /// The teacher id.
    pub teacher_id: Uuid,
    /// The teacher's display name.
    pub teacher_name: String,
    /// The teacher's email address.
    pub email: String,
    /// The teacher's bank account number, if recorded.
    pub account_number: Option<String>,
    /// The hourly rate of the teacher's current level.
    pub pay_grade: Decimal,
    /// The work day.
    pub date: NaiveDate,
    /// Clock-in instant.
    pub clock_in: NaiveDateTime,
    /// Clock-out instant.
    pub clock_out: NaiveDateTime,
}

impl QualifyingAttendance {
    /// Hours between clock-in and clock-out.
    pub fn worked_hours(&self) -> Decimal {
        hours_between(self.clock_in, self.clock_out)
    }
}
