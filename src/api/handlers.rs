//! HTTP request handlers for the payroll cost engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::EmployerCostInput;

use super::response::{ActiveParametersResponse, ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/employer-cost", post(employer_cost_handler))
        .route("/parameters/active", get(active_parameters_handler))
        .with_state(state)
}

/// Handler for POST /employer-cost endpoint.
///
/// Accepts an employer cost request and returns the itemized cost.
async fn employer_cost_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployerCostInput>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing employer cost request");

    // Handle JSON parsing errors
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // Get the body text which contains the detailed error from serde
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    // Well-formed JSON with the wrong shape is a validation error
                    if ["missing field", "unknown variant", "did not match any variant"]
                        .iter()
                        .any(|marker| body_text.contains(marker))
                    {
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
            return json_response(StatusCode::BAD_REQUEST, &error);
        }
    };

    match state.engine().compute_employer_cost(&input).await {
        Ok(output) => {
            info!(
                correlation_id = %correlation_id,
                version_id = %output.parameters_snapshot.version_id,
                contract_type = input.contract_type.as_str(),
                total_cost = %output.total_cost,
                "Employer cost request completed"
            );
            json_response(StatusCode::OK, &output)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /parameters/active endpoint.
///
/// Returns the metadata of the parameter version used by unpinned requests.
async fn active_parameters_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Fetching active parameters");

    match state.engine().parameters().load_active_parameters().await {
        Ok(version) => json_response(
            StatusCode::OK,
            &ActiveParametersResponse::from(version.as_ref()),
        ),
        Err(err) => error_response(correlation_id, err),
    }
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Employer cost request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}
