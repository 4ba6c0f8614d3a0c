//! Payroll calculation for the teacher payroll engine.
//!
//! This module contains the pure calculation functions: grouping attendance
//! by teacher, splitting worked hours into regular and overtime against the
//! attended-day capacity, deriving the overtime rate and pay, and assembling
//! the rounded pay statements.

mod aggregation;
mod overtime;
mod pay;
mod statement;

pub use aggregation::{AttendanceAggregation, TeacherAttendance, aggregate_attendance};
pub use overtime::{OvertimeDetection, detect_overtime, regular_capacity};
pub use pay::{OvertimeRateResult, PayCalculation, calculate_overtime_rate, calculate_pay};
pub use statement::{ENGINE_VERSION, compute_statements, run_payroll};
