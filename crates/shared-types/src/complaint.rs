use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::AppError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a complaint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Resolved and rejected complaints no longer run against a deadline.
    /// Rejected is still reopenable through the workflow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    /// Statuses the deadline sweep looks at.
    pub fn open_statuses() -> [ComplaintStatus; 2] {
        [Self::Pending, Self::InProgress]
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Complaint classification. Determines the deadline window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    CaMark,
    ExamMark,
    #[default]
    Other,
}

impl ComplaintCategory {
    pub const ALL: [ComplaintCategory; 3] = [Self::CaMark, Self::ExamMark, Self::Other];

    /// Strict parse, used when accepting new submissions.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ca_mark" => Some(Self::CaMark),
            "exam_mark" => Some(Self::ExamMark),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Lenient parse for stored rows: anything unrecognized is `Other`.
    pub fn from_str_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CaMark => "ca_mark",
            Self::ExamMark => "exam_mark",
            Self::Other => "other",
        }
    }

    /// Number of days after submission by which a complaint should be resolved.
    pub fn deadline_days(&self) -> i64 {
        match self {
            Self::CaMark => 7,
            Self::ExamMark => 14,
            Self::Other => 10,
        }
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Database Row
// ---------------------------------------------------------------------------

/// Complaint row from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Complaint {
    pub id: Uuid,
    pub complaint_id: String,
    pub category: String,
    pub status: String,
    pub title: String,
    pub description: String,
    pub student_id: Uuid,
    pub department_id: Uuid,
    pub assigned_officer_id: Option<Uuid>,
    pub response_message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Complaint {
    /// Typed status. The column is CHECK-constrained, so a parse failure
    /// means the row was written outside this service.
    pub fn status(&self) -> Result<ComplaintStatus, AppError> {
        ComplaintStatus::parse(&self.status).ok_or_else(|| {
            AppError::internal(format!(
                "Complaint {} has unknown status '{}'",
                self.complaint_id, self.status
            ))
        })
    }

    pub fn category(&self) -> ComplaintCategory {
        ComplaintCategory::from_str_or_default(&self.category)
    }
}

// ---------------------------------------------------------------------------
// API Response
// ---------------------------------------------------------------------------

/// API response shape for a complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplaintResponse {
    pub id: String,
    pub complaint_id: String,
    pub category: String,
    pub status: String,
    pub title: String,
    pub description: String,
    pub student_id: String,
    pub department_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_officer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    pub submitted_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
}

impl From<Complaint> for ComplaintResponse {
    fn from(c: Complaint) -> Self {
        Self {
            id: c.id.to_string(),
            complaint_id: c.complaint_id,
            category: c.category,
            status: c.status,
            title: c.title,
            description: c.description,
            student_id: c.student_id.to_string(),
            department_id: c.department_id.to_string(),
            assigned_officer_id: c.assigned_officer_id.map(|u| u.to_string()),
            response_message: c.response_message,
            submitted_at: c.submitted_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
            resolved_at: c.resolved_at.map(|d| d.to_rfc3339()),
        }
    }
}

/// Search response for complaints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplaintSearchResponse {
    pub complaints: Vec<ComplaintResponse>,
    pub total: i64,
}

/// System-wide metrics for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplaintStatistics {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub rejected: i64,
    pub ca_mark: i64,
    pub exam_mark: i64,
    pub other: i64,
    pub overdue: i64,
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Request to submit a new complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct CreateComplaintRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))
    )]
    pub title: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))
    )]
    pub description: String,
    pub category: String,
    pub department_id: Uuid,
    /// Admins may file on behalf of a student; ignored for student callers.
    #[serde(default)]
    pub student_id: Option<Uuid>,
}

/// Request to move a complaint to a new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateComplaintStatusRequest {
    pub status: String,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub assigned_officer_id: Option<Uuid>,
}

impl UpdateComplaintStatusRequest {
    /// A whitespace-only message does not count as a response.
    pub fn has_response(&self) -> bool {
        self.response_message
            .as_deref()
            .map(|m| !m.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Query parameters for complaint search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ComplaintSearchParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub department_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub assigned_officer_id: Option<Uuid>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}
