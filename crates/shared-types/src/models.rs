use serde::{Deserialize, Serialize};

/// Role of the actor making a request.
///
/// - `Student`: submits complaints and reads their own. Also the fallback
///   for unknown role strings, so an unrecognized role carries no workflow
///   permissions.
/// - `DepartmentOfficer`: triages and resolves complaints for a department.
/// - `Admin`: system-wide access; the only role that may reopen rejected
///   complaints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Student,
    DepartmentOfficer,
    Admin,
}

impl UserRole {
    /// Parse from the JWT `role` claim. Unknown values default to Student.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "department_officer" => UserRole::DepartmentOfficer,
            "admin" => UserRole::Admin,
            _ => UserRole::Student,
        }
    }

    /// Lowercase string for database / JWT storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::DepartmentOfficer => "department_officer",
            UserRole::Admin => "admin",
        }
    }

    /// Returns true if this role satisfies the `required` role.
    /// Admin satisfies all roles; officers satisfy officer and student.
    pub fn satisfies(&self, required: &UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::DepartmentOfficer => {
                matches!(required, UserRole::DepartmentOfficer | UserRole::Student)
            }
            UserRole::Student => matches!(required, UserRole::Student),
        }
    }

    /// Officers and admins handle complaints on behalf of the university.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::DepartmentOfficer | UserRole::Admin)
    }
}
