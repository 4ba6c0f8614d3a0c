//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::attendance::{clock_in, clock_out, register_attendance};
use crate::calculation::run_payroll;
use crate::error::{EngineError, EngineResult, ErrorKind};
use crate::models::{
    LevelUpdate, NewTeacher, PayPolicy, PayWindow, PayrollRun, SalaryCycleBatch, SalaryCycleUpdate,
};
use crate::roster::{
    LevelChangeRequest, create_level, create_salary_cycles, current_salary_cycle, delete_level,
    delete_salary_cycle, demote, find_teacher_by_email, get_level, get_salary_cycle, get_teacher,
    level_history, list_levels, list_salary_cycles, list_teachers, onboard_teacher, promote,
    soft_delete_teacher, update_level, update_salary_cycle,
};
use crate::store::{AttendanceLedger, PayrollStore, PolicyStore};

use super::request::{AttendanceRequest, CreateLevelRequest, WindowRequest};
use super::response::{ApiError, ApiErrorResponse, ClockResponse};
use super::state::AppState;

/// Handlers answer with a JSON body on both paths.
type HandlerResult = Result<Response, Response>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/teachers", post(create_teacher_handler).get(list_teachers_handler))
        .route(
            "/teachers/:id",
            get(get_teacher_handler).delete(delete_teacher_handler),
        )
        .route("/teachers/:id/promote", post(promote_handler))
        .route("/teachers/:id/demote", post(demote_handler))
        .route("/teachers/:id/level-history", get(level_history_handler))
        .route("/levels", post(create_level_handler).get(list_levels_handler))
        .route(
            "/levels/:id",
            get(get_level_handler)
                .patch(update_level_handler)
                .delete(delete_level_handler),
        )
        .route(
            "/policy",
            get(get_policy_handler)
                .post(create_policy_handler)
                .put(update_policy_handler),
        )
        .route("/salary-cycles", get(list_salary_cycles_handler))
        .route("/salary-cycles/bulk-create", post(create_salary_cycles_handler))
        .route("/salary-cycles/current", get(current_salary_cycle_handler))
        .route(
            "/salary-cycles/:id",
            get(get_salary_cycle_handler)
                .patch(update_salary_cycle_handler)
                .delete(delete_salary_cycle_handler),
        )
        .route("/attendance", post(register_attendance_handler))
        .route("/attendance/clock-in", post(clock_in_handler))
        .route("/attendance/clock-out", post(clock_out_handler))
        .route("/payroll/statements", get(statements_handler))
        .route("/payroll/run", post(run_payroll_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    if err.kind() == ErrorKind::Internal {
        error!(correlation_id = %correlation_id, error = %err, "Request failed");
    } else {
        warn!(correlation_id = %correlation_id, error = %err, kind = ?err.kind(), "Request rejected");
    }
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

fn respond<T: Serialize>(
    correlation_id: Uuid,
    status: StatusCode,
    result: EngineResult<T>,
) -> HandlerResult {
    match result {
        Ok(body) => Ok(json_response(status, &body)),
        Err(err) => Err(error_response(correlation_id, err)),
    }
}

fn bad_request(error: ApiError) -> Response {
    let response = ApiErrorResponse::bad_request(error);
    json_response(response.status, &response.error)
}

/// Unwraps a JSON body, turning rejections into 400 responses.
fn parse_json<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(bad_request(error))
}

fn parse_id(correlation_id: Uuid, path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, Response> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path");
            Err(bad_request(ApiError::validation_error(rejection.body_text())))
        }
    }
}

// Teachers

async fn create_teacher_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewTeacher>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing onboarding request");
    let new_teacher = parse_json(correlation_id, payload)?;
    let result = onboard_teacher(state.store(), new_teacher, state.clock().now());
    respond(correlation_id, StatusCode::CREATED, result)
}

async fn list_teachers_handler(State(state): State<AppState>) -> HandlerResult {
    respond(Uuid::new_v4(), StatusCode::OK, list_teachers(state.store()))
}

async fn get_teacher_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    respond(correlation_id, StatusCode::OK, get_teacher(state.store(), id))
}

async fn delete_teacher_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    info!(correlation_id = %correlation_id, teacher_id = %id, "Processing teacher deletion");
    let result = soft_delete_teacher(state.store(), id, state.clock().now());
    respond(correlation_id, StatusCode::OK, result)
}

async fn promote_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LevelChangeRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    let request = parse_json(correlation_id, payload)?;
    info!(correlation_id = %correlation_id, teacher_id = %id, level_id = %request.level_id, "Processing promotion");
    let result = promote(
        state.store(),
        state.notifier(),
        state.level_change_subject(),
        id,
        request,
        state.clock().now(),
    );
    respond(correlation_id, StatusCode::OK, result)
}

async fn demote_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LevelChangeRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    let request = parse_json(correlation_id, payload)?;
    info!(correlation_id = %correlation_id, teacher_id = %id, level_id = %request.level_id, "Processing demotion");
    let result = demote(
        state.store(),
        state.notifier(),
        state.level_change_subject(),
        id,
        request,
        state.clock().now(),
    );
    respond(correlation_id, StatusCode::OK, result)
}

async fn level_history_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    respond(correlation_id, StatusCode::OK, level_history(state.store(), id))
}

// Levels

async fn create_level_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLevelRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(correlation_id, payload)?;
    let result = create_level(state.store(), &request.name, request.pay_grade);
    respond(correlation_id, StatusCode::CREATED, result)
}

async fn list_levels_handler(State(state): State<AppState>) -> HandlerResult {
    respond(Uuid::new_v4(), StatusCode::OK, list_levels(state.store()))
}

async fn get_level_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    respond(correlation_id, StatusCode::OK, get_level(state.store(), id))
}

async fn update_level_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LevelUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    let update = parse_json(correlation_id, payload)?;
    respond(correlation_id, StatusCode::OK, update_level(state.store(), id, update))
}

async fn delete_level_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    respond(correlation_id, StatusCode::OK, delete_level(state.store(), id))
}

// Policy

async fn get_policy_handler(State(state): State<AppState>) -> HandlerResult {
    let result = state
        .store()
        .active_policy()
        .and_then(|policy| policy.ok_or(EngineError::ConfigurationMissing));
    respond(Uuid::new_v4(), StatusCode::OK, result)
}

async fn create_policy_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayPolicy>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let policy = parse_json(correlation_id, payload)?;
    info!(correlation_id = %correlation_id, "Initialising pay policy");
    respond(
        correlation_id,
        StatusCode::CREATED,
        state.store().initialize_policy(policy),
    )
}

async fn update_policy_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayPolicy>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let policy = parse_json(correlation_id, payload)?;
    info!(correlation_id = %correlation_id, "Updating pay policy");
    respond(correlation_id, StatusCode::OK, state.store().update_policy(policy))
}

// Salary cycles

async fn create_salary_cycles_handler(
    State(state): State<AppState>,
    payload: Result<Json<SalaryCycleBatch>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let batch = parse_json(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        start_date = %batch.start_date,
        number_of_cycles = batch.number_of_cycles,
        "Processing salary cycle creation"
    );
    let result = create_salary_cycles(state.store(), &batch);
    respond(correlation_id, StatusCode::CREATED, result)
}

async fn list_salary_cycles_handler(State(state): State<AppState>) -> HandlerResult {
    respond(Uuid::new_v4(), StatusCode::OK, list_salary_cycles(state.store()))
}

async fn current_salary_cycle_handler(State(state): State<AppState>) -> HandlerResult {
    let today = state.clock().today();
    let result = current_salary_cycle(state.store(), today).and_then(|cycle| {
        cycle.ok_or_else(|| EngineError::SalaryCycleNotFound {
            id: today.to_string(),
        })
    });
    respond(Uuid::new_v4(), StatusCode::OK, result)
}

async fn get_salary_cycle_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    respond(correlation_id, StatusCode::OK, get_salary_cycle(state.store(), id))
}

async fn update_salary_cycle_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SalaryCycleUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    let update = parse_json(correlation_id, payload)?;
    respond(
        correlation_id,
        StatusCode::OK,
        update_salary_cycle(state.store(), id, update),
    )
}

async fn delete_salary_cycle_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(correlation_id, path)?;
    respond(correlation_id, StatusCode::OK, delete_salary_cycle(state.store(), id))
}

// Attendance

async fn register_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(correlation_id, payload)?;
    let result = find_teacher_by_email(state.store(), &request.email).and_then(|teacher| {
        register_attendance(
            state.store(),
            state.clock_rules(),
            teacher.id,
            state.clock().now(),
        )
    });
    respond(correlation_id, StatusCode::OK, result.map(ClockResponse::from))
}

async fn clock_in_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(correlation_id, payload)?;
    let result = find_teacher_by_email(state.store(), &request.email)
        .and_then(|teacher| clock_in(state.store(), teacher.id, state.clock().now()));
    respond(correlation_id, StatusCode::OK, result.map(ClockResponse::from))
}

async fn clock_out_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(correlation_id, payload)?;
    let result = find_teacher_by_email(state.store(), &request.email).and_then(|teacher| {
        clock_out(
            state.store(),
            state.clock_rules(),
            teacher.id,
            state.clock().now(),
        )
    });
    respond(correlation_id, StatusCode::OK, result.map(ClockResponse::from))
}

// Payroll

/// Computes statements for a window without closing attendance or sending anything.
fn preview_payroll(store: &dyn PayrollStore, window: &PayWindow) -> EngineResult<PayrollRun> {
    let policy = store.active_policy()?;
    let rows = store.find_qualifying_attendance(window)?;
    run_payroll(window, policy.as_ref(), &rows)
}

async fn statements_handler(
    State(state): State<AppState>,
    query: Result<Query<WindowRequest>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = match query {
        Ok(Query(request)) => request,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query");
            return Err(bad_request(ApiError::validation_error(rejection.body_text())));
        }
    };

    let start_time = Instant::now();
    let result = request
        .window()
        .and_then(|window| preview_payroll(state.store(), &window));
    if let Ok(run) = &result {
        info!(
            correlation_id = %correlation_id,
            window = %run.window,
            statements = run.statements.len(),
            total_payout = %run.total_payout(),
            duration_us = start_time.elapsed().as_micros(),
            "Statements computed"
        );
    }
    respond(correlation_id, StatusCode::OK, result)
}

async fn run_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<WindowRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        start_date = %request.start_date,
        end_date = %request.end_date,
        "Processing manual payroll run"
    );
    let window = match request.window() {
        Ok(window) => window,
        Err(err) => return Err(error_response(correlation_id, err)),
    };

    // The job blocks on the store and the notifier.
    let job = state.job().clone();
    let now = state.clock().now();
    let result = tokio::task::spawn_blocking(move || job.run(&window, now)).await;
    match result {
        Ok(report) => respond(correlation_id, StatusCode::OK, report),
        Err(err) => {
            error!(correlation_id = %correlation_id, error = %err, "Payroll run task failed");
            Err(json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ApiError::with_details("INTERNAL_ERROR", "Internal server error", err.to_string()),
            ))
        }
    }
}
