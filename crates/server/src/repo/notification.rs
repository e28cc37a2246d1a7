use shared_types::{AppError, NewNotification, Notification};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert a notification.
pub async fn enqueue(pool: &Pool<Postgres>, note: &NewNotification) -> Result<Notification, AppError> {
    let row = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (recipient_id, department_id, complaint_id, kind, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, recipient_id, department_id, complaint_id, kind, message, read, created_at
        "#,
    )
    .bind(note.recipient_id)
    .bind(note.department_id)
    .bind(note.complaint_id)
    .bind(note.kind)
    .bind(&note.message)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Insert unless a notification of the same kind for the same complaint was
/// created in the last day. Returns true if a row was inserted.
///
/// Concurrent callers for the same complaint and kind are serialized on a
/// transaction-scoped advisory lock, so sweeps on several replicas cannot
/// both pass the existence check.
pub async fn enqueue_daily(pool: &Pool<Postgres>, note: &NewNotification) -> Result<bool, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::TEXT || ':' || $2::TEXT, 0))")
        .bind(note.complaint_id.to_string())
        .bind(note.kind)
        .execute(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    let result = sqlx::query(
        r#"
        INSERT INTO notifications (recipient_id, department_id, complaint_id, kind, message)
        SELECT $1::UUID, $2::UUID, $3::UUID, $4::TEXT, $5::TEXT
        WHERE NOT EXISTS (
            SELECT 1 FROM notifications
            WHERE complaint_id = $3
              AND kind = $4
              AND created_at > NOW() - INTERVAL '1 day'
        )
        "#,
    )
    .bind(note.recipient_id)
    .bind(note.department_id)
    .bind(note.complaint_id)
    .bind(note.kind)
    .bind(&note.message)
    .execute(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}

/// Notifications addressed to a user, plus department-wide ones for their
/// department. Newest first.
pub async fn list_for_recipient(
    pool: &Pool<Postgres>,
    recipient_id: Uuid,
    department_id: Option<Uuid>,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<Notification>, AppError> {
    let rows = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, recipient_id, department_id, complaint_id, kind, message, read, created_at
        FROM notifications
        WHERE (recipient_id = $1
               OR (recipient_id IS NULL AND $2::UUID IS NOT NULL AND department_id = $2))
          AND ($3 = FALSE OR read = FALSE)
        ORDER BY created_at DESC
        LIMIT $4
        "#,
    )
    .bind(recipient_id)
    .bind(department_id)
    .bind(unread_only)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Mark a notification read if the caller can see it. Returns the updated
/// row or None.
pub async fn mark_read(
    pool: &Pool<Postgres>,
    id: Uuid,
    recipient_id: Uuid,
    department_id: Option<Uuid>,
) -> Result<Option<Notification>, AppError> {
    let row = sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications SET read = TRUE
        WHERE id = $1
          AND (recipient_id = $2
               OR (recipient_id IS NULL AND $3::UUID IS NOT NULL AND department_id = $3))
        RETURNING id, recipient_id, department_id, complaint_id, kind, message, read, created_at
        "#,
    )
    .bind(id)
    .bind(recipient_id)
    .bind(department_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}
