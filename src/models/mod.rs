//! Core data models for the teacher payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod level;
mod pay_policy;
mod pay_statement;
mod pay_window;
mod salary_cycle;
mod status;
mod teacher;

pub use attendance::{AttendanceRecord, QualifyingAttendance};
pub use level::{Level, LevelUpdate};
pub use pay_policy::PayPolicy;
pub use pay_statement::{
    AuditStep, AuditTrace, AuditWarning, PRESENTATION_DP, PayStatement, PayrollRun,
    round_for_presentation,
};
pub use pay_window::PayWindow;
pub use salary_cycle::{MAX_CYCLES_PER_BATCH, SalaryCycle, SalaryCycleBatch, SalaryCycleUpdate};
pub use status::RecordStatus;
pub use teacher::{ACCOUNT_NUMBER_MAX_LEN, ChangeDirection, LevelChange, NewTeacher, Teacher};
