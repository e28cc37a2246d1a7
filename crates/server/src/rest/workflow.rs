use axum::{extract::Query, Json};
use chrono::Utc;

use shared_types::{
    AppError, AvailableTransitionsParams, AvailableTransitionsResponse, CalculateDeadlineRequest,
    CalculateDeadlineResponse, ComplaintCategory, ComplaintStatus, TransitionValidation, UserRole,
    ValidateTransitionRequest,
};

use crate::auth::extractors::AuthRequired;

// ---------------------------------------------------------------------------
// POST /api/workflow/validate
// ---------------------------------------------------------------------------

/// Dry-run a status change without touching any complaint.
///
/// `role` defaults to the caller's own role. Always answers 200; the result
/// carries `valid` and every error.
#[utoipa::path(
    post,
    path = "/api/workflow/validate",
    request_body = ValidateTransitionRequest,
    responses(
        (status = 200, description = "Validation result", body = TransitionValidation),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument(skip(auth))]
pub async fn validate_transition(
    auth: AuthRequired,
    Json(body): Json<ValidateTransitionRequest>,
) -> Result<Json<TransitionValidation>, AppError> {
    let role = body.role.clone().unwrap_or_else(|| auth.0.role.clone());
    Ok(Json(crate::workflow::validate_transition_str(
        &body.from,
        &body.to,
        &role,
        body.has_response,
        body.has_assignment,
    )))
}

// ---------------------------------------------------------------------------
// GET /api/workflow/transitions
// ---------------------------------------------------------------------------

/// Statuses a role may move a complaint to from a given status.
#[utoipa::path(
    get,
    path = "/api/workflow/transitions",
    params(AvailableTransitionsParams),
    responses(
        (status = 200, description = "Available transitions", body = AvailableTransitionsResponse),
        (status = 400, description = "Unknown status", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument]
pub async fn list_transitions(
    Query(params): Query<AvailableTransitionsParams>,
) -> Result<Json<AvailableTransitionsResponse>, AppError> {
    let from = ComplaintStatus::parse(&params.from)
        .ok_or_else(|| AppError::bad_request(format!("Unknown status '{}'", params.from)))?;
    let role = UserRole::from_str_or_default(&params.role);

    Ok(Json(AvailableTransitionsResponse {
        from,
        role,
        transitions: crate::workflow::transition_options(from, role),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/deadlines/calculate
// ---------------------------------------------------------------------------

/// Compute a deadline from a submission time and category.
///
/// Unrecognized categories use the `other` window. `is_overdue` is only
/// reported when a status is given.
#[utoipa::path(
    post,
    path = "/api/deadlines/calculate",
    request_body = CalculateDeadlineRequest,
    responses(
        (status = 200, description = "Calculated deadline", body = CalculateDeadlineResponse),
        (status = 400, description = "Unknown status", body = AppError)
    ),
    tag = "deadlines"
)]
#[tracing::instrument]
pub async fn calculate_deadline(
    Json(body): Json<CalculateDeadlineRequest>,
) -> Result<Json<CalculateDeadlineResponse>, AppError> {
    let category = ComplaintCategory::from_str_or_default(&body.category);
    let status = body
        .status
        .as_deref()
        .map(|s| {
            ComplaintStatus::parse(s).ok_or_else(|| AppError::bad_request(format!("Unknown status '{}'", s)))
        })
        .transpose()?;

    let now = Utc::now();
    let due_at = crate::deadline::calculate_deadline(body.submitted_at, category);

    Ok(Json(CalculateDeadlineResponse {
        category: category.as_str().to_string(),
        window_days: category.deadline_days(),
        due_at: due_at.to_rfc3339(),
        days_remaining: crate::deadline::days_until_deadline_at(body.submitted_at, category, now),
        is_overdue: status.map(|s| crate::deadline::is_overdue_at(body.submitted_at, category, s, now)),
    }))
}
