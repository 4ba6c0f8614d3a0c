//! Attendance ledger operations.
//!
//! The clock protocol that creates and closes daily records, and the
//! reconciliation pass that closes forgotten records before payroll.

mod clock;
mod reconcile;

pub use clock::{
    ClockAction, ClockEvent, ClockRules, DEFAULT_MIN_SHIFT_MINUTES, clock_in, clock_out,
    register_attendance,
};
pub use reconcile::{
    DEFAULT_AUTO_CLOSE_TIME, Reconciliation, auto_close_time, reconcile_open_attendance,
};
