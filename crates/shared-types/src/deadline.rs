use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deadline facts for a single complaint, derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeadlineSummary {
    pub due_at: DateTime<Utc>,
    /// Ceiling of the remaining time in days. Negative once overdue.
    pub days_remaining: i64,
    pub is_overdue: bool,
    pub is_approaching: bool,
}

/// Request to calculate a deadline without a stored complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalculateDeadlineRequest {
    pub submitted_at: DateTime<Utc>,
    pub category: String,
    /// When present, the response also reports overdue state for this status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Response for a calculated deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalculateDeadlineResponse {
    /// Category the window was computed for (unknown input reports `other`).
    pub category: String,
    pub window_days: i64,
    pub due_at: String,
    pub days_remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_overdue: Option<bool>,
}
