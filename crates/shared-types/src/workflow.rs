use serde::{Deserialize, Serialize};

use crate::{ComplaintStatus, UserRole};

/// Outcome of checking a requested status change.
///
/// `errors` holds one human-readable line per violated rule; it is empty
/// exactly when `valid` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TransitionValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl TransitionValidation {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// A permitted next status together with what the caller must supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TransitionOption {
    pub to: ComplaintStatus,
    pub requires_response: bool,
    pub requires_assignment: bool,
}

/// Request body for POST /api/workflow/validate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValidateTransitionRequest {
    pub from: String,
    pub to: String,
    /// Defaults to the caller's own role.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub has_response: bool,
    #[serde(default)]
    pub has_assignment: bool,
}

/// Query parameters for GET /api/workflow/transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct AvailableTransitionsParams {
    pub from: String,
    pub role: String,
}

/// Permitted next statuses for a role, used to populate a status selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableTransitionsResponse {
    pub from: ComplaintStatus,
    pub role: UserRole,
    pub transitions: Vec<TransitionOption>,
}
