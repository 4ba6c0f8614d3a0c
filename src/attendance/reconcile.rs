//! Auto-close of forgotten clock-outs.
//!
//! Before payroll aggregates a window, records that were never closed are
//! closed at a fixed cutoff on their own date. A record is only closed once
//! that cutoff has passed and only when the cutoff falls after its clock-in;
//! anything else stays open and is left out of the run.

use chrono::{NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use crate::error::EngineResult;
use crate::models::{AttendanceRecord, AuditStep, AuditWarning, PayWindow};
use crate::store::AttendanceLedger;

/// Default time of day at which open records are closed.
pub const DEFAULT_AUTO_CLOSE_TIME: NaiveTime = match NaiveTime::from_hms_opt(16, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// The instant an open record should be closed at, if it can be closed yet.
///
/// # Examples
///
/// ```
/// use teacher_payroll::attendance::{DEFAULT_AUTO_CLOSE_TIME, auto_close_time};
/// use teacher_payroll::models::AttendanceRecord;
/// use chrono::NaiveDateTime;
/// use uuid::Uuid;
///
/// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let record = AttendanceRecord::open(Uuid::new_v4(), parse("2026-03-02 08:00:00"));
///
/// // Cutoff has not passed yet.
/// assert_eq!(auto_close_time(&record, DEFAULT_AUTO_CLOSE_TIME, parse("2026-03-02 15:00:00")), None);
/// // Cutoff has passed.
/// assert_eq!(
///     auto_close_time(&record, DEFAULT_AUTO_CLOSE_TIME, parse("2026-03-03 09:00:00")),
///     Some(parse("2026-03-02 16:00:00"))
/// );
/// ```
pub fn auto_close_time(
    record: &AttendanceRecord,
    cutoff: NaiveTime,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if record.is_closed() {
        return None;
    }
    let close_at = record.date.and_time(cutoff);
    (close_at <= now && close_at > record.clock_in).then_some(close_at)
}

/// What the reconciliation pass did to a window.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Records closed at the cutoff.
    pub closed: Vec<AttendanceRecord>,
    /// Records still open; excluded from this run.
    pub still_open: Vec<AttendanceRecord>,
    /// The audit step recording the pass.
    pub audit_step: AuditStep,
    /// One warning when records had to be left open.
    pub warning: Option<AuditWarning>,
}

/// Closes the window's open attendance at `cutoff` where allowed.
pub fn reconcile_open_attendance<L>(
    ledger: &L,
    window: &PayWindow,
    cutoff: NaiveTime,
    now: NaiveDateTime,
    step_number: u32,
) -> EngineResult<Reconciliation>
where
    L: AttendanceLedger + ?Sized,
{
    let sweep =
        ledger.close_open_attendance(window, &|record: &AttendanceRecord| {
            auto_close_time(record, cutoff, now)
        })?;

    if !sweep.closed.is_empty() {
        info!(
            window = %window,
            closed = sweep.closed.len(),
            cutoff = %cutoff,
            "Auto-closed open attendance"
        );
    }

    let warning = if sweep.still_open.is_empty() {
        None
    } else {
        warn!(
            window = %window,
            still_open = sweep.still_open.len(),
            "Open attendance left out of payroll"
        );
        Some(AuditWarning {
            code: "OPEN_ATTENDANCE_EXCLUDED".to_string(),
            message: format!(
                "{} attendance record(s) in {} could not be closed at {} and were excluded",
                sweep.still_open.len(),
                window,
                cutoff
            ),
            severity: "medium".to_string(),
        })
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_auto_close".to_string(),
        rule_name: "Attendance Auto Close".to_string(),
        teacher_id: None,
        input: serde_json::json!({
            "window": window.to_string(),
            "cutoff": cutoff.to_string(),
            "now": now.to_string()
        }),
        output: serde_json::json!({
            "closed": sweep.closed.iter().map(|r| r.id.to_string()).collect::<Vec<_>>(),
            "still_open": sweep.still_open.iter().map(|r| r.id.to_string()).collect::<Vec<_>>()
        }),
        reasoning: format!(
            "Closed {} open record(s) at {}; {} left open",
            sweep.closed.len(),
            cutoff,
            sweep.still_open.len()
        ),
    };

    Ok(Reconciliation {
        closed: sweep.closed,
        still_open: sweep.still_open,
        audit_step,
        warning,
    })
}
