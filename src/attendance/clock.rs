//! Clock-in / clock-out protocol.
//!
//! A teacher has at most one attendance record per day. Clocking in creates
//! it; clocking out closes it once the minimum shift has elapsed. The store
//! performs each check-and-write under one lock.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::AttendanceRecord;
use crate::store::AttendanceLedger;

/// Default minimum time between clock-in and clock-out.
pub const DEFAULT_MIN_SHIFT_MINUTES: i64 = 60;

/// Rules applied at clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRules {
    /// Clock-out is accepted only strictly after `clock_in + min_shift`.
    pub min_shift: Duration,
}

impl Default for ClockRules {
    fn default() -> Self {
        Self {
            min_shift: Duration::minutes(DEFAULT_MIN_SHIFT_MINUTES),
        }
    }
}

impl ClockRules {
    /// Rules with a minimum shift of `minutes`.
    pub fn with_min_shift_minutes(minutes: i64) -> Self {
        Self {
            min_shift: Duration::minutes(minutes),
        }
    }
}

/// Which side of the clock an event recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    /// A new record was opened.
    ClockIn,
    /// The day's record was closed.
    ClockOut,
}

/// The outcome of a clock operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEvent {
    /// What happened.
    pub action: ClockAction,
    /// The record after the operation.
    pub record: AttendanceRecord,
}

/// Opens today's record for `teacher_id`.
///
/// # Errors
///
/// [`EngineError::DuplicateClockIn`] when a record already exists for
/// `now.date()`.
pub fn clock_in<L>(
    ledger: &L,
    teacher_id: Uuid,
    now: NaiveDateTime,
) -> EngineResult<ClockEvent>
where
    L: AttendanceLedger + ?Sized,
{
    let record = ledger
        .insert_attendance(AttendanceRecord::open(teacher_id, now))
        .map_err(|err| match err {
            EngineError::DuplicateAttendance { teacher_id, date } => {
                EngineError::DuplicateClockIn { teacher_id, date }
            }
            other => other,
        })?;

    info!(teacher_id = %teacher_id, date = %record.date, "Clocked in");
    Ok(ClockEvent {
        action: ClockAction::ClockIn,
        record,
    })
}

/// Closes today's record for `teacher_id`.
///
/// # Errors
///
/// - [`EngineError::AttendanceNotFound`] when there is no record for today.
/// - [`EngineError::DuplicateClockOut`] when it is already closed.
/// - [`EngineError::ClockOutTooEarly`] when `now <= clock_in + min_shift`.
pub fn clock_out<L>(
    ledger: &L,
    rules: &ClockRules,
    teacher_id: Uuid,
    now: NaiveDateTime,
) -> EngineResult<ClockEvent>
where
    L: AttendanceLedger + ?Sized,
{
    let mut close = |record: &mut AttendanceRecord| {
        if record.is_closed() {
            return Err(EngineError::DuplicateClockOut {
                teacher_id: record.teacher_id.to_string(),
                date: record.date,
            });
        }
        let earliest = record.clock_in + rules.min_shift;
        if now <= earliest {
            return Err(EngineError::ClockOutTooEarly { earliest });
        }
        record.clock_out = Some(now);
        Ok(())
    };
    let record = ledger.modify_attendance(teacher_id, now.date(), &mut close)?;

    info!(
        teacher_id = %teacher_id,
        date = %record.date,
        worked_hours = %record.worked_hours().unwrap_or_default().round_dp(2),
        "Clocked out"
    );
    Ok(ClockEvent {
        action: ClockAction::ClockOut,
        record,
    })
}

/// Single-entry toggle: clocks in when there is no record for today,
/// otherwise clocks out.
pub fn register_attendance<L>(
    ledger: &L,
    rules: &ClockRules,
    teacher_id: Uuid,
    now: NaiveDateTime,
) -> EngineResult<ClockEvent>
where
    L: AttendanceLedger + ?Sized,
{
    match clock_in(ledger, teacher_id, now) {
        Err(EngineError::DuplicateClockIn { .. }) => clock_out(ledger, rules, teacher_id, now),
        other => other,
    }
}
