use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{AppError, NotificationResponse};

use crate::auth::extractors::AuthRequired;

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// The caller's notifications, including department-wide ones for officers.
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationListParams),
    responses(
        (status = 200, description = "Notifications", body = Vec<NotificationResponse>),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "notifications"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn list_notifications(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Query(params): Query<NotificationListParams>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let claims = auth.0;
    let department = claims.user_role().is_staff().then_some(claims.department_id).flatten();
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    let rows = crate::repo::notification::list_for_recipient(
        &pool,
        claims.sub,
        department,
        params.unread_only,
        limit,
    )
    .await?;

    Ok(Json(rows.into_iter().map(NotificationResponse::from).collect()))
}

/// Mark one of the caller's notifications as read.
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification UUID")),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "notifications"
)]
#[tracing::instrument(skip(pool, auth))]
pub async fn mark_notification_read(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, AppError> {
    let claims = auth.0;
    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;
    let department = claims.user_role().is_staff().then_some(claims.department_id).flatten();

    let row = crate::repo::notification::mark_read(&pool, uuid, claims.sub, department)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Notification {} not found", id)))?;

    Ok(Json(NotificationResponse::from(row)))
}
