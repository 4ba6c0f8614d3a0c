//! Error types for the teacher payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the roster, attendance ledger and payroll engine can
//! report. Each variant belongs to one [`ErrorKind`], which callers use to
//! decide how to surface it.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A teacher, level or attendance record does not exist.
    NotFound,
    /// The organisation pay policy has not been set.
    ConfigurationMissing,
    /// A state change was attempted that the current state does not allow.
    InvalidTransition,
    /// A notification could not be delivered.
    DeliveryFailure,
    /// Input failed validation or violated a uniqueness constraint.
    Validation,
    /// A fault inside the service (configuration files, storage).
    Internal,
}

/// The main error type for the teacher payroll engine.
///
/// # Example
///
/// ```
/// use teacher_payroll::error::{EngineError, ErrorKind};
///
/// let error = EngineError::ConfigurationMissing;
/// assert_eq!(error.kind(), ErrorKind::ConfigurationMissing);
/// assert_eq!(error.to_string(), "Pay policy has not been configured");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// No active teacher matches the given identifier.
    #[error("Teacher does not exist: {id}")]
    TeacherNotFound {
        /// The teacher id or email that was looked up.
        id: String,
    },

    /// No active level matches the given identifier.
    #[error("Level does not exist: {id}")]
    LevelNotFound {
        /// The level id that was looked up.
        id: String,
    },

    /// No active salary cycle matches the given identifier.
    #[error("Salary cycle does not exist: {id}")]
    SalaryCycleNotFound {
        /// The salary cycle id that was looked up.
        id: String,
    },

    /// No attendance record exists for the teacher on the given date.
    #[error("No attendance for teacher '{teacher_id}' on {date}")]
    AttendanceNotFound {
        /// The teacher id.
        teacher_id: String,
        /// The work day.
        date: NaiveDate,
    },

    /// The singleton pay policy has not been set.
    #[error("Pay policy has not been configured")]
    ConfigurationMissing,

    /// A second pay policy was created while one already exists.
    #[error("Pay policy already set")]
    PolicyAlreadySet,

    /// The teacher already has an attendance record for today.
    #[error("You are already clocked in")]
    DuplicateClockIn {
        /// The teacher id.
        teacher_id: String,
        /// The work day.
        date: NaiveDate,
    },

    /// The teacher's attendance for today is already closed.
    #[error("You are already clocked out")]
    DuplicateClockOut {
        /// The teacher id.
        teacher_id: String,
        /// The work day.
        date: NaiveDate,
    },

    /// Clock-out was attempted before the minimum shift length elapsed.
    #[error("Clock out is not allowed before {earliest}")]
    ClockOutTooEarly {
        /// The first instant at which clock-out is accepted (exclusive).
        earliest: NaiveDateTime,
    },

    /// A promotion or demotion targeted the teacher's current level.
    #[error("You are already on this level: {level}")]
    AlreadyAtLevel {
        /// The name of the level.
        level: String,
    },

    /// A notification could not be delivered to the recipient.
    #[error("Failed to deliver notification to '{recipient}': {message}")]
    DeliveryFailure {
        /// The recipient email address.
        recipient: String,
        /// A description of the transport failure.
        message: String,
    },

    /// Another active teacher already uses this email address.
    #[error("Email already in use: {email}")]
    DuplicateEmail {
        /// The duplicated email.
        email: String,
    },

    /// Another active teacher already uses this account number.
    #[error("Account number already in use: {account_number}")]
    DuplicateAccountNumber {
        /// The duplicated account number.
        account_number: String,
    },

    /// An attendance row for the same teacher and day already exists.
    #[error("Attendance for teacher '{teacher_id}' on {date} already exists")]
    DuplicateAttendance {
        /// The teacher id.
        teacher_id: String,
        /// The work day.
        date: NaiveDate,
    },

    /// The level is still referenced by active teachers.
    #[error("Level cannot be deleted. {teacher_count} teacher(s) are associated with it")]
    LevelInUse {
        /// The level id.
        level_id: String,
        /// How many active teachers reference it.
        teacher_count: usize,
    },

    /// An active salary cycle already starts on this date.
    #[error("Salary cycle starting {start_date} already exists")]
    DuplicateSalaryCycle {
        /// The duplicated start date.
        start_date: NaiveDate,
    },

    /// A salary cycle field was out of range.
    #[error("Invalid salary cycle field '{field}': {message}")]
    InvalidSalaryCycle {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A pay policy field was out of range.
    #[error("Invalid pay policy field '{field}': {message}")]
    InvalidPolicy {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A level field was out of range.
    #[error("Invalid level field '{field}': {message}")]
    InvalidLevel {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A teacher field was invalid.
    #[error("Invalid teacher field '{field}': {message}")]
    InvalidTeacher {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// An attendance record contained inconsistent data.
    #[error("Invalid attendance '{record_id}': {message}")]
    InvalidAttendance {
        /// The id of the record.
        record_id: String,
        /// What made the record invalid.
        message: String,
    },

    /// A pay window ended before it started.
    #[error("Invalid pay window: {start_date} is after {end_date}")]
    InvalidWindow {
        /// The window start.
        start_date: NaiveDate,
        /// The window end.
        end_date: NaiveDate,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The backing store could not be accessed.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the storage fault.
        message: String,
    },

}

impl EngineError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::TeacherNotFound { .. }
            | EngineError::LevelNotFound { .. }
            | EngineError::SalaryCycleNotFound { .. }
            | EngineError::AttendanceNotFound { .. } => ErrorKind::NotFound,
            EngineError::ConfigurationMissing => ErrorKind::ConfigurationMissing,
            EngineError::DuplicateClockIn { .. }
            | EngineError::DuplicateClockOut { .. }
            | EngineError::ClockOutTooEarly { .. }
            | EngineError::AlreadyAtLevel { .. } => ErrorKind::InvalidTransition,
            EngineError::DeliveryFailure { .. } => ErrorKind::DeliveryFailure,
            EngineError::PolicyAlreadySet
            | EngineError::DuplicateEmail { .. }
            | EngineError::DuplicateAccountNumber { .. }
            | EngineError::DuplicateAttendance { .. }
            | EngineError::LevelInUse { .. }
            | EngineError::DuplicateSalaryCycle { .. }
            | EngineError::InvalidSalaryCycle { .. }
            | EngineError::InvalidPolicy { .. }
            | EngineError::InvalidLevel { .. }
            | EngineError::InvalidTeacher { .. }
            | EngineError::InvalidAttendance { .. }
            | EngineError::InvalidWindow { .. } => ErrorKind::Validation,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::StoreUnavailable { .. } => ErrorKind::Internal,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
