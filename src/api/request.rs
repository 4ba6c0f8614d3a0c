//! Request types for the payroll API.
//!
//! Onboarding, level updates, promotions and the pay policy reuse the domain
//! payloads directly; the types here cover the remaining endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::PayWindow;

/// Request body for `POST /levels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLevelRequest {
    /// Display name of the level.
    pub name: String,
    /// Hourly pay grade.
    pub pay_grade: Decimal,
}

/// Request body for the attendance endpoints.
///
/// Teachers identify themselves by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The teacher's email address.
    pub email: String,
}

/// A pay window given as two dates.
///
/// Used as the query of `GET /payroll/statements` and the body of
/// `POST /payroll/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowRequest {
    /// The start date of the window (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the window (inclusive).
    pub end_date: NaiveDate,
}

impl WindowRequest {
    /// Validates the dates into a [`PayWindow`].
    pub fn window(&self) -> EngineResult<PayWindow> {
        PayWindow::new(self.start_date, self.end_date)
    }
}
