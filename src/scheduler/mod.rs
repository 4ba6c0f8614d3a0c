//! Payroll scheduling.
//!
//! [`PayrollSchedule`] decides when a window is due, [`PayrollJob`] runs
//! payroll for one window, and [`SchedulerRunner`] ties the two together on a
//! tokio interval.

mod job;
mod runner;
mod schedule;

pub use job::{
    DEFAULT_MAX_DELIVERY_ATTEMPTS, DEFAULT_PAY_STATEMENT_SUBJECT, FailedDelivery, PayrollJob,
    PayrollJobSettings, PayrollRunReport,
};
pub use runner::SchedulerRunner;
pub use schedule::{DEFAULT_RUN_TIME, PayrollSchedule};
