pub mod extractors;
pub mod jwt;
pub mod middleware;

use shared_types::{AppError, Complaint, UserRole};

use jwt::Claims;

/// Whether the caller may read a complaint.
///
/// Students see their own complaints; officers see their department's;
/// admins see everything. An officer token without a department claim is
/// not scoped.
pub fn can_view_complaint(claims: &Claims, complaint: &Complaint) -> bool {
    match claims.user_role() {
        UserRole::Admin => true,
        UserRole::DepartmentOfficer => claims
            .department_id
            .map(|d| d == complaint.department_id)
            .unwrap_or(true),
        UserRole::Student => complaint.student_id == claims.sub,
    }
}

/// 404 rather than 403 so complaint ids do not leak across owners.
pub fn ensure_can_view(claims: &Claims, complaint: &Complaint) -> Result<(), AppError> {
    if can_view_complaint(claims, complaint) {
        Ok(())
    } else {
        Err(AppError::not_found(format!("Complaint {} not found", complaint.id)))
    }
}
