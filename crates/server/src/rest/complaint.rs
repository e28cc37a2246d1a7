use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    AppError, AvailableTransitionsResponse, Complaint, ComplaintCategory, ComplaintResponse,
    ComplaintSearchParams, ComplaintSearchResponse, ComplaintStatistics, ComplaintStatus,
    CreateComplaintRequest, DeadlineSummary, NewNotification, UpdateComplaintStatusRequest,
    UserRole, NOTIFICATION_KIND_STATUS_CHANGED,
};

use crate::auth::extractors::{AdminRequired, AuthRequired, StaffRequired};
use crate::auth::{ensure_can_view, jwt::Claims};
use crate::error_convert::ValidateRequest;

fn parse_complaint_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid UUID format"))
}

/// Load a complaint the caller is allowed to see, or 404.
async fn load_visible(pool: &Pool<Postgres>, claims: &Claims, id: &str) -> Result<Complaint, AppError> {
    let uuid = parse_complaint_id(id)?;
    let complaint = crate::repo::complaint::find_by_id(pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Complaint {} not found", id)))?;
    ensure_can_view(claims, &complaint)?;
    Ok(complaint)
}

/// Officers only see their own department's complaints in batch queries.
fn in_scope(claims: &Claims, complaints: Vec<Complaint>) -> Vec<ComplaintResponse> {
    complaints
        .into_iter()
        .filter(|c| crate::auth::can_view_complaint(claims, c))
        .map(ComplaintResponse::from)
        .collect()
}

// ---------------------------------------------------------------------------
// POST /api/complaints
// ---------------------------------------------------------------------------

/// Submit a new complaint. It starts out `pending`.
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint submitted", body = ComplaintResponse),
        (status = 401, description = "Not authenticated", body = AppError),
        (status = 403, description = "Officers cannot submit complaints", body = AppError),
        (status = 422, description = "Validation error", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn create_complaint(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Json(body): Json<CreateComplaintRequest>,
) -> Result<(StatusCode, Json<ComplaintResponse>), AppError> {
    let claims = auth.0;
    body.validate_request()?;

    let student_id = match claims.user_role() {
        UserRole::Student => claims.sub,
        UserRole::Admin => body.student_id.unwrap_or(claims.sub),
        UserRole::DepartmentOfficer => {
            return Err(AppError::forbidden("Department officers cannot submit complaints"));
        }
    };

    let category = ComplaintCategory::parse(&body.category).ok_or_else(|| {
        AppError::validation(
            format!("Unknown category '{}'", body.category),
            [("category".to_string(), "must be one of ca_mark, exam_mark, other".to_string())]
                .into_iter()
                .collect(),
        )
    })?;

    let complaint = crate::repo::complaint::create(
        &pool,
        student_id,
        body.department_id,
        category,
        body.title.trim(),
        body.description.trim(),
    )
    .await?;

    tracing::info!(complaint_id = %complaint.complaint_id, category = %category, "complaint submitted");
    Ok((StatusCode::CREATED, Json(ComplaintResponse::from(complaint))))
}

// ---------------------------------------------------------------------------
// GET /api/complaints
// ---------------------------------------------------------------------------

/// Search complaints. Students only see their own; officers with a
/// department claim only see that department.
#[utoipa::path(
    get,
    path = "/api/complaints",
    params(ComplaintSearchParams),
    responses(
        (status = 200, description = "Search results", body = ComplaintSearchResponse),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn search_complaints(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Query(mut params): Query<ComplaintSearchParams>,
) -> Result<Json<ComplaintSearchResponse>, AppError> {
    let claims = auth.0;
    match claims.user_role() {
        UserRole::Student => params.student_id = Some(claims.sub),
        UserRole::DepartmentOfficer => {
            if claims.department_id.is_some() {
                params.department_id = claims.department_id;
            }
        }
        UserRole::Admin => {}
    }

    let (rows, total) = crate::repo::complaint::search(&pool, &params).await?;
    Ok(Json(ComplaintSearchResponse {
        complaints: rows.into_iter().map(ComplaintResponse::from).collect(),
        total,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/complaints/{id}
// ---------------------------------------------------------------------------

/// Get a single complaint by ID.
#[utoipa::path(
    get,
    path = "/api/complaints/{id}",
    params(("id" = String, Path, description = "Complaint UUID")),
    responses(
        (status = 200, description = "Complaint found", body = ComplaintResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn get_complaint(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<ComplaintResponse>, AppError> {
    let complaint = load_visible(&pool, &auth.0, &id).await?;
    Ok(Json(ComplaintResponse::from(complaint)))
}

// ---------------------------------------------------------------------------
// PATCH /api/complaints/{id}/status
// ---------------------------------------------------------------------------

/// Move a complaint through the workflow.
///
/// Every failed workflow check is reported in one 422 response. An existing
/// officer assignment satisfies the assignment requirement; a response
/// message must be supplied with each change that needs one.
#[utoipa::path(
    patch,
    path = "/api/complaints/{id}/status",
    params(("id" = String, Path, description = "Complaint UUID")),
    request_body = UpdateComplaintStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ComplaintResponse),
        (status = 403, description = "Officer or admin role required", body = AppError),
        (status = 404, description = "Not found", body = AppError),
        (status = 409, description = "Status changed concurrently", body = AppError),
        (status = 422, description = "Transition rejected", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn update_complaint_status(
    State(pool): State<Pool<Postgres>>,
    auth: StaffRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateComplaintStatusRequest>,
) -> Result<Json<ComplaintResponse>, AppError> {
    let claims = auth.0;
    let complaint = load_visible(&pool, &claims, &id).await?;

    let to = ComplaintStatus::parse(&body.status)
        .ok_or_else(|| AppError::workflow_rejected(&[format!("Unknown status '{}'", body.status)]))?;
    let from = complaint.status()?;
    let has_assignment = body.assigned_officer_id.is_some() || complaint.assigned_officer_id.is_some();

    let validation = crate::workflow::validate_transition(
        from,
        to,
        claims.user_role(),
        body.has_response(),
        has_assignment,
    );
    if !validation.valid {
        return Err(AppError::workflow_rejected(&validation.errors));
    }

    let response_message = body
        .response_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let updated = match crate::repo::complaint::update_status(
        &pool,
        complaint.id,
        from,
        to,
        response_message,
        body.assigned_officer_id,
    )
    .await?
    {
        Some(row) => row,
        None => {
            return Err(
                match crate::repo::complaint::find_by_id(&pool, complaint.id).await? {
                    Some(current) => AppError::conflict(format!(
                        "Complaint {} is now {}, not {}",
                        current.complaint_id, current.status, from
                    )),
                    None => AppError::not_found(format!("Complaint {} not found", id)),
                },
            );
        }
    };

    tracing::info!(
        complaint_id = %updated.complaint_id,
        %from,
        %to,
        actor = %claims.sub,
        "complaint status changed"
    );

    if crate::config::feature_flags().notifications {
        let note = NewNotification {
            recipient_id: Some(updated.student_id),
            department_id: updated.department_id,
            complaint_id: updated.id,
            kind: NOTIFICATION_KIND_STATUS_CHANGED,
            message: format!("Complaint {} moved from {} to {}", updated.complaint_id, from, to),
        };
        if let Err(e) = crate::repo::notification::enqueue(&pool, &note).await {
            tracing::warn!(error = %e, complaint_id = %updated.complaint_id, "failed to enqueue status notification");
        }
    }

    Ok(Json(ComplaintResponse::from(updated)))
}

// ---------------------------------------------------------------------------
// GET /api/complaints/{id}/transitions
// ---------------------------------------------------------------------------

/// Statuses the caller may move this complaint to, with what each needs.
#[utoipa::path(
    get,
    path = "/api/complaints/{id}/transitions",
    params(("id" = String, Path, description = "Complaint UUID")),
    responses(
        (status = 200, description = "Available transitions", body = AvailableTransitionsResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn complaint_transitions(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<AvailableTransitionsResponse>, AppError> {
    let claims = auth.0;
    let complaint = load_visible(&pool, &claims, &id).await?;
    let from = complaint.status()?;
    let role = claims.user_role();

    Ok(Json(AvailableTransitionsResponse {
        from,
        role,
        transitions: crate::workflow::transition_options(from, role),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/complaints/{id}/deadline
// ---------------------------------------------------------------------------

/// Deadline state of a complaint.
#[utoipa::path(
    get,
    path = "/api/complaints/{id}/deadline",
    params(("id" = String, Path, description = "Complaint UUID")),
    responses(
        (status = 200, description = "Deadline summary", body = DeadlineSummary),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn complaint_deadline(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<DeadlineSummary>, AppError> {
    let complaint = load_visible(&pool, &auth.0, &id).await?;
    let window = crate::config::sweep_config().approaching_window_days;
    let summary = crate::deadline::complaint_summary_at(&complaint, window, Utc::now())?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// Batch deadline queries
// ---------------------------------------------------------------------------

/// Open complaints past their deadline.
#[utoipa::path(
    get,
    path = "/api/complaints/overdue",
    responses(
        (status = 200, description = "Overdue complaints", body = Vec<ComplaintResponse>),
        (status = 403, description = "Officer or admin role required", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn list_overdue(
    State(pool): State<Pool<Postgres>>,
    auth: StaffRequired,
) -> Result<Json<Vec<ComplaintResponse>>, AppError> {
    let rows = crate::sweep::overdue_complaints(&pool).await?;
    Ok(Json(in_scope(&auth.0, rows)))
}

/// Open complaints due within the configured approaching window.
#[utoipa::path(
    get,
    path = "/api/complaints/approaching",
    responses(
        (status = 200, description = "Complaints nearing their deadline", body = Vec<ComplaintResponse>),
        (status = 403, description = "Officer or admin role required", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn list_approaching(
    State(pool): State<Pool<Postgres>>,
    auth: StaffRequired,
) -> Result<Json<Vec<ComplaintResponse>>, AppError> {
    let window = crate::config::sweep_config().approaching_window_days;
    let rows = crate::sweep::approaching_complaints(&pool, window).await?;
    Ok(Json(in_scope(&auth.0, rows)))
}

// ---------------------------------------------------------------------------
// GET /api/complaints/statistics
// ---------------------------------------------------------------------------

/// System-wide complaint counts.
#[utoipa::path(
    get,
    path = "/api/complaints/statistics",
    responses(
        (status = 200, description = "Complaint statistics", body = ComplaintStatistics),
        (status = 403, description = "Admin role required", body = AppError)
    ),
    tag = "complaints"
)]
#[tracing::instrument(skip(pool, _auth))]
pub async fn complaint_statistics(
    State(pool): State<Pool<Postgres>>,
    _auth: AdminRequired,
) -> Result<Json<ComplaintStatistics>, AppError> {
    let stats = crate::repo::complaint::statistics(&pool).await?;
    Ok(Json(stats))
}
