use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use shared_types::{
    AppError, Complaint, ComplaintCategory, ComplaintSearchParams, ComplaintStatistics,
    ComplaintStatus,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

const COMPLAINT_COLUMNS: &str = "id, complaint_id, category, status, title, description, \
     student_id, department_id, assigned_officer_id, response_message, \
     submitted_at, updated_at, resolved_at";

/// Human-readable reference: `CMP-YYYYMMDD-XXXXXX` (e.g. `CMP-20250314-7KQ2ZD`).
pub fn generate_complaint_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("CMP-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

/// Insert a new pending complaint with a generated reference.
pub async fn create(
    pool: &Pool<Postgres>,
    student_id: Uuid,
    department_id: Uuid,
    category: ComplaintCategory,
    title: &str,
    description: &str,
) -> Result<Complaint, AppError> {
    let sql = format!(
        r#"
        INSERT INTO complaints
            (complaint_id, category, status, title, description, student_id, department_id)
        VALUES ($1, $2, 'pending', $3, $4, $5, $6)
        RETURNING {COMPLAINT_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, Complaint>(&sql)
        .bind(generate_complaint_id())
        .bind(category.as_str())
        .bind(title)
        .bind(description)
        .bind(student_id)
        .bind(department_id)
        .fetch_one(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a complaint by ID.
pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Complaint>, AppError> {
    let sql = format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = $1");

    let row = sqlx::query_as::<_, Complaint>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Search complaints with filters. Returns (complaints, total_count).
pub async fn search(
    pool: &Pool<Postgres>,
    params: &ComplaintSearchParams,
) -> Result<(Vec<Complaint>, i64), AppError> {
    let offset = params.offset.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    const FILTERS: &str = r#"
        WHERE ($1::TEXT IS NULL OR status = $1)
          AND ($2::TEXT IS NULL OR category = $2)
          AND ($3::UUID IS NULL OR department_id = $3)
          AND ($4::UUID IS NULL OR student_id = $4)
          AND ($5::UUID IS NULL OR assigned_officer_id = $5)
    "#;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM complaints {FILTERS}"))
        .bind(params.status.as_deref())
        .bind(params.category.as_deref())
        .bind(params.department_id)
        .bind(params.student_id)
        .bind(params.assigned_officer_id)
        .fetch_one(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    let sql = format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints {FILTERS} \
         ORDER BY submitted_at DESC LIMIT $6 OFFSET $7"
    );
    let rows = sqlx::query_as::<_, Complaint>(&sql)
        .bind(params.status.as_deref())
        .bind(params.category.as_deref())
        .bind(params.department_id)
        .bind(params.student_id)
        .bind(params.assigned_officer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

/// Apply a status change. `resolved_at` is stamped on entry to `resolved`
/// and cleared otherwise. A `None` response or officer keeps the stored one.
///
/// The row is only written while its status is still `expected`. Returns
/// None if the complaint is missing or has moved on since it was read.
pub async fn update_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    expected: ComplaintStatus,
    status: ComplaintStatus,
    response_message: Option<&str>,
    assigned_officer_id: Option<Uuid>,
) -> Result<Option<Complaint>, AppError> {
    let sql = format!(
        r#"
        UPDATE complaints SET
            status              = $2,
            response_message    = COALESCE($3, response_message),
            assigned_officer_id = COALESCE($4, assigned_officer_id),
            resolved_at         = CASE WHEN $2 = 'resolved' THEN NOW() ELSE NULL END,
            updated_at          = NOW()
        WHERE id = $1 AND status = $5
        RETURNING {COMPLAINT_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, Complaint>(&sql)
        .bind(id)
        .bind(status.as_str())
        .bind(response_message)
        .bind(assigned_officer_id)
        .bind(expected.as_str())
        .fetch_optional(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// All complaints still running against a deadline, oldest first.
pub async fn list_open(pool: &Pool<Postgres>) -> Result<Vec<Complaint>, AppError> {
    let open: Vec<&str> = ComplaintStatus::open_statuses()
        .iter()
        .map(ComplaintStatus::as_str)
        .collect();
    let sql = format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints \
         WHERE status = ANY($1) ORDER BY submitted_at ASC"
    );

    let rows = sqlx::query_as::<_, Complaint>(&sql)
        .bind(&open)
        .fetch_all(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Counts by status and category, plus open complaints past their window.
pub async fn statistics(pool: &Pool<Postgres>) -> Result<ComplaintStatistics, AppError> {
    let row: (i64, i64, i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status = 'pending'),
            COUNT(*) FILTER (WHERE status = 'in_progress'),
            COUNT(*) FILTER (WHERE status = 'resolved'),
            COUNT(*) FILTER (WHERE status = 'rejected'),
            COUNT(*) FILTER (WHERE category = 'ca_mark'),
            COUNT(*) FILTER (WHERE category = 'exam_mark'),
            COUNT(*) FILTER (WHERE category = 'other'),
            COUNT(*) FILTER (
                WHERE status IN ('pending', 'in_progress')
                  AND submitted_at + make_interval(days => CASE category
                        WHEN 'ca_mark' THEN $1
                        WHEN 'exam_mark' THEN $2
                        ELSE $3 END) < NOW()
            )
        FROM complaints
        "#,
    )
    .bind(ComplaintCategory::CaMark.deadline_days() as i32)
    .bind(ComplaintCategory::ExamMark.deadline_days() as i32)
    .bind(ComplaintCategory::Other.deadline_days() as i32)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(ComplaintStatistics {
        total: row.0,
        pending: row.1,
        in_progress: row.2,
        resolved: row.3,
        rejected: row.4,
        ca_mark: row.5,
        exam_mark: row.6,
        other: row.7,
        overdue: row.8,
    })
}
