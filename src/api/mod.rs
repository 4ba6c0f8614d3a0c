//! HTTP API for the payroll service.
//!
//! This module provides the REST endpoints for the roster, the pay policy,
//! attendance and payroll.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AttendanceRequest, CreateLevelRequest, WindowRequest};
pub use response::{ApiError, ClockResponse};
pub use state::AppState;
