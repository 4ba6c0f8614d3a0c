//! Response types for the payroll API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::attendance::{ClockAction, ClockEvent};
use crate::error::{EngineError, ErrorKind};
use crate::models::AttendanceRecord;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// The HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ConfigurationMissing | ErrorKind::InvalidTransition => StatusCode::CONFLICT,
        ErrorKind::DeliveryFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::TeacherNotFound { .. } => "TEACHER_NOT_FOUND",
        EngineError::LevelNotFound { .. } => "LEVEL_NOT_FOUND",
        EngineError::SalaryCycleNotFound { .. } => "SALARY_CYCLE_NOT_FOUND",
        EngineError::AttendanceNotFound { .. } => "ATTENDANCE_NOT_FOUND",
        EngineError::ConfigurationMissing => "CONFIGURATION_MISSING",
        EngineError::PolicyAlreadySet => "POLICY_ALREADY_SET",
        EngineError::DuplicateClockIn { .. } => "ALREADY_CLOCKED_IN",
        EngineError::DuplicateClockOut { .. } => "ALREADY_CLOCKED_OUT",
        EngineError::ClockOutTooEarly { .. } => "CLOCK_OUT_TOO_EARLY",
        EngineError::AlreadyAtLevel { .. } => "ALREADY_AT_LEVEL",
        EngineError::DeliveryFailure { .. } => "DELIVERY_FAILURE",
        EngineError::DuplicateEmail { .. } => "DUPLICATE_EMAIL",
        EngineError::DuplicateAccountNumber { .. } => "DUPLICATE_ACCOUNT_NUMBER",
        EngineError::DuplicateAttendance { .. } => "DUPLICATE_ATTENDANCE",
        EngineError::LevelInUse { .. } => "LEVEL_IN_USE",
        EngineError::DuplicateSalaryCycle { .. } => "DUPLICATE_SALARY_CYCLE",
        EngineError::InvalidSalaryCycle { .. } => "INVALID_SALARY_CYCLE",
        EngineError::InvalidPolicy { .. } => "INVALID_POLICY",
        EngineError::InvalidLevel { .. } => "INVALID_LEVEL",
        EngineError::InvalidTeacher { .. } => "INVALID_TEACHER",
        EngineError::InvalidAttendance { .. } => "INVALID_ATTENDANCE",
        EngineError::InvalidWindow { .. } => "INVALID_WINDOW",
        EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => "CONFIG_ERROR",
        EngineError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let kind = error.kind();
        let code = error_code(&error);
        let error = match kind {
            // Internal faults get a generic message; the cause goes in details.
            ErrorKind::Internal => {
                ApiError::with_details(code, "Internal server error", error.to_string())
            }
            _ => ApiError::new(code, error.to_string()),
        };
        ApiErrorResponse {
            status: status_for(kind),
            error,
        }
    }
}

/// Body returned by the attendance endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockResponse {
    /// Confirmation shown to the teacher, e.g. "Clock in at 08:00:00 successful".
    pub message: String,
    /// What the request did.
    pub action: ClockAction,
    /// The attendance record after the change.
    pub record: AttendanceRecord,
}

impl From<ClockEvent> for ClockResponse {
    fn from(event: ClockEvent) -> Self {
        let (label, at) = match event.action {
            ClockAction::ClockIn => ("Clock in", Some(event.record.clock_in)),
            ClockAction::ClockOut => ("Clock out", event.record.clock_out),
        };
        let time = at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        Self {
            message: format!("{} at {} successful", label, time),
            action: event.action,
            record: event.record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let api_error: ApiErrorResponse = EngineError::TeacherNotFound {
            id: "ada@school.org".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.error.code, "TEACHER_NOT_FOUND");
        assert!(api_error.error.message.contains("ada@school.org"));
    }

    #[test]
    fn test_transition_and_missing_policy_map_to_409() {
        let api_error: ApiErrorResponse = EngineError::AlreadyAtLevel {
            level: "Teacher".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert!(api_error.error.message.starts_with("You are already on this level"));

        let api_error: ApiErrorResponse = EngineError::ConfigurationMissing.into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "CONFIGURATION_MISSING");
    }

    #[test]
    fn test_internal_error_hides_cause_in_details() {
        let api_error: ApiErrorResponse = EngineError::StoreUnavailable {
            message: "lock poisoned".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.message, "Internal server error");
        assert!(api_error.error.details.unwrap().contains("lock poisoned"));
    }

    #[test]
    fn test_clock_response_message() {
        let mut record = AttendanceRecord::open(Uuid::new_v4(), make_datetime("2026-03-02", "08:00:00"));
        let clock_in: ClockResponse = ClockEvent {
            action: ClockAction::ClockIn,
            record: record.clone(),
        }
        .into();
        assert_eq!(clock_in.message, "Clock in at 08:00:00 successful");

        record.clock_out = Some(make_datetime("2026-03-02", "16:30:15"));
        let clock_out: ClockResponse = ClockEvent {
            action: ClockAction::ClockOut,
            record,
        }
        .into();
        assert_eq!(clock_out.message, "Clock out at 16:30:15 successful");
    }
}
