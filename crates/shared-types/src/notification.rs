use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification kinds, matching the DB CHECK constraint.
pub const NOTIFICATION_KIND_OVERDUE: &str = "overdue";
pub const NOTIFICATION_KIND_STATUS_CHANGED: &str = "status_changed";

/// Notification row from the database.
///
/// `recipient_id` is `None` for department-wide notifications, which every
/// officer of `department_id` sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub department_id: Uuid,
    pub complaint_id: Uuid,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_id: Option<Uuid>,
    pub department_id: Uuid,
    pub complaint_id: Uuid,
    pub kind: &'static str,
    pub message: String,
}

/// API response shape for a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub department_id: String,
    pub complaint_id: String,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id.to_string(),
            recipient_id: n.recipient_id.map(|u| u.to_string()),
            department_id: n.department_id.to_string(),
            complaint_id: n.complaint_id.to_string(),
            kind: n.kind,
            message: n.message,
            read: n.read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}
