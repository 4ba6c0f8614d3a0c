//! Attendance aggregation.
//!
//! Groups qualifying attendance rows by teacher and sums the hours each
//! teacher worked inside a pay window. Rows dated outside the window are
//! ignored; rows whose clock-out is not after clock-in are rejected.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, PayWindow, QualifyingAttendance};

/// Hours and attended days for one teacher within a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherAttendance {
    /// The teacher id.
    pub teacher_id: Uuid,
    /// The teacher's display name.
    pub teacher_name: String,
    /// The teacher's email address.
    pub email: String,
    /// The teacher's account number, if any.
    pub account_number: Option<String>,
    /// Hourly rate carried on the teacher's rows.
    pub pay_grade: Decimal,
    /// Σ (clock_out - clock_in) in hours, unrounded.
    pub total_worked_hours: Decimal,
    /// Number of distinct dates with qualifying attendance.
    pub days_attended: u32,
}

/// The outcome of grouping a window's attendance.
#[derive(Debug, Clone)]
pub struct AttendanceAggregation {
    /// One entry per teacher with at least one qualifying row, ordered by id.
    pub teachers: Vec<TeacherAttendance>,
    /// Rows dropped because their date lies outside the window.
    pub ignored_rows: usize,
    /// One audit step per teacher.
    pub audit_steps: Vec<AuditStep>,
}

struct Accumulator<'a> {
    first: &'a QualifyingAttendance,
    latest: &'a QualifyingAttendance,
    total_worked_hours: Decimal,
    dates: BTreeSet<NaiveDate>,
    rows: usize,
}

/// Groups `rows` by teacher and totals their hours within `window`.
///
/// When a teacher's rows disagree on pay grade, the grade on the row with the
/// latest clock-in wins.
///
/// # Examples
///
/// ```
/// use teacher_payroll::calculation::aggregate_attendance;
/// use teacher_payroll::models::{PayWindow, QualifyingAttendance};
/// use chrono::{NaiveDate, NaiveDateTime};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let window = PayWindow::new(
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
/// )
/// .unwrap();
/// let row = QualifyingAttendance {
///     record_id: Uuid::new_v4(),
///     teacher_id: Uuid::new_v4(),
///     teacher_name: "Ada Obi".to_string(),
///     email: "ada@school.org".to_string(),
///     account_number: None,
///     pay_grade: Decimal::from(10),
///     date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     clock_in: parse("2026-03-02 08:00:00"),
///     clock_out: parse("2026-03-02 17:00:00"),
/// };
///
/// let aggregation = aggregate_attendance(&window, &[row], 1).unwrap();
/// assert_eq!(aggregation.teachers[0].total_worked_hours, Decimal::from(9));
/// assert_eq!(aggregation.teachers[0].days_attended, 1);
/// ```
pub fn aggregate_attendance(
    window: &PayWindow,
    rows: &[QualifyingAttendance],
    step_number_start: u32,
) -> EngineResult<AttendanceAggregation> {
    let mut groups: BTreeMap<Uuid, Accumulator<'_>> = BTreeMap::new();
    let mut ignored_rows = 0;

    for row in rows {
        if !window.contains_date(row.date) {
            ignored_rows += 1;
            continue;
        }
        if row.clock_out <= row.clock_in {
            return Err(EngineError::InvalidAttendance {
                record_id: row.record_id.to_string(),
                message: format!(
                    "clock-out {} is not after clock-in {}",
                    row.clock_out, row.clock_in
                ),
            });
        }

        let hours = row.worked_hours();
        let entry = groups.entry(row.teacher_id).or_insert_with(|| Accumulator {
            first: row,
            latest: row,
            total_worked_hours: Decimal::ZERO,
            dates: BTreeSet::new(),
            rows: 0,
        });
        entry.total_worked_hours += hours;
        entry.dates.insert(row.date);
        entry.rows += 1;
        if row.clock_in > entry.latest.clock_in {
            entry.latest = row;
        }
    }

    let mut teachers = Vec::with_capacity(groups.len());
    let mut audit_steps = Vec::with_capacity(groups.len());
    let mut step_number = step_number_start;

    for (teacher_id, acc) in groups {
        let days_attended = acc.dates.len() as u32;

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "attendance_aggregation".to_string(),
            rule_name: "Attendance Aggregation".to_string(),
            teacher_id: Some(teacher_id),
            input: serde_json::json!({
                "rows": acc.rows,
                "first_date": acc.dates.first().map(|d| d.to_string()),
                "last_date": acc.dates.last().map(|d| d.to_string()),
            }),
            output: serde_json::json!({
                "total_worked_hours": acc.total_worked_hours.normalize().to_string(),
                "days_attended": days_attended,
            }),
            reasoning: format!(
                "{} closed attendance row(s) over {} day(s) total {} hours",
                acc.rows,
                days_attended,
                acc.total_worked_hours.round_dp(4).normalize()
            ),
        });
        step_number += 1;

        teachers.push(TeacherAttendance {
            teacher_id,
            teacher_name: acc.first.teacher_name.clone(),
            email: acc.first.email.clone(),
            account_number: acc.first.account_number.clone(),
            pay_grade: acc.latest.pay_grade,
            total_worked_hours: acc.total_worked_hours,
            days_attended,
        });
    }

    Ok(AttendanceAggregation {
        teachers,
        ignored_rows,
        audit_steps,
    })
}
