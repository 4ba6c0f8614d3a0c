//! When payroll runs and which window it covers.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{PayWindow, SalaryCycle};

/// Default time of day payroll runs at.
pub const DEFAULT_RUN_TIME: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// The payroll calendar.
///
/// Salary cycles live in the store and can change while the service runs, so
/// callers pass the current active cycles to each query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayrollSchedule {
    /// Runs on the first day of each month for the previous calendar month.
    MonthStart {
        /// Time of day the run becomes due.
        run_time: NaiveTime,
    },
    /// Runs on the last day of each stored cycle for that cycle.
    SalaryCycle {
        /// Time of day the run becomes due.
        run_time: NaiveTime,
    },
}

impl PayrollSchedule {
    fn run_time(&self) -> NaiveTime {
        match self {
            PayrollSchedule::MonthStart { run_time } => *run_time,
            PayrollSchedule::SalaryCycle { run_time } => *run_time,
        }
    }

    /// The window whose payroll is due at `now`, if any.
    ///
    /// A window is due for the whole of its run date from `run_time` onwards.
    /// `cycles` is only consulted in salary cycle mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use teacher_payroll::scheduler::{DEFAULT_RUN_TIME, PayrollSchedule};
    /// use chrono::{NaiveDate, NaiveDateTime};
    ///
    /// let schedule = PayrollSchedule::MonthStart { run_time: DEFAULT_RUN_TIME };
    /// let parse = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    ///
    /// assert!(schedule.due_window(parse("2026-04-01 08:59:59"), &[]).is_none());
    /// let window = schedule.due_window(parse("2026-04-01 09:00:00"), &[]).unwrap();
    /// assert_eq!(window.start_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    /// assert!(schedule.due_window(parse("2026-04-02 09:00:00"), &[]).is_none());
    /// ```
    pub fn due_window(&self, now: NaiveDateTime, cycles: &[SalaryCycle]) -> Option<PayWindow> {
        if now.time() < self.run_time() {
            return None;
        }
        let today = now.date();
        match self {
            PayrollSchedule::MonthStart { .. } => {
                (today.day() == 1).then(|| PayWindow::previous_calendar_month(today))
            }
            PayrollSchedule::SalaryCycle { .. } => cycles
                .iter()
                .filter(|cycle| cycle.status.is_active())
                .find(|cycle| cycle.end_date == today)
                .map(SalaryCycle::window),
        }
    }

    /// Whether due dates depend on the stored salary cycles.
    pub fn uses_salary_cycles(&self) -> bool {
        matches!(self, PayrollSchedule::SalaryCycle { .. })
    }

    /// The next date on or after `today` on which payroll runs.
    ///
    /// `None` once every stored salary cycle has ended.
    pub fn next_run_date(&self, today: NaiveDate, cycles: &[SalaryCycle]) -> Option<NaiveDate> {
        match self {
            PayrollSchedule::MonthStart { .. } => {
                if today.day() == 1 {
                    Some(today)
                } else {
                    PayWindow::calendar_month(today).end_date.succ_opt()
                }
            }
            PayrollSchedule::SalaryCycle { .. } => cycles
                .iter()
                .filter(|cycle| cycle.status.is_active())
                .map(|cycle| cycle.end_date)
                .filter(|end| *end >= today)
                .min(),
        }
    }
}
