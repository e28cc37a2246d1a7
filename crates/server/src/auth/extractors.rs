use axum::{extract::FromRequestParts, http::request::Parts};
use shared_types::{AppError, UserRole};

use super::jwt::Claims;

/// Extractor that requires authentication. Returns 401 if no valid token.
pub struct AuthRequired(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for AuthRequired {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthRequired)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// Role constants for [`RoleRequired`] (match `UserRole` variants).
pub const ROLE_STUDENT: u8 = 0;
pub const ROLE_OFFICER: u8 = 1;
pub const ROLE_ADMIN: u8 = 2;

/// Extractor that requires authentication AND a minimum role.
/// Returns 401 if unauthenticated, 403 if the role is insufficient.
pub struct RoleRequired<const ROLE: u8>(pub Claims);

impl<const ROLE: u8, S: Send + Sync> FromRequestParts<S> for RoleRequired<ROLE> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let required_role = match ROLE {
            ROLE_OFFICER => UserRole::DepartmentOfficer,
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::Student,
        };

        if !claims.user_role().satisfies(&required_role) {
            return Err(AppError::forbidden(format!(
                "{} role or higher required",
                required_role.as_str()
            )));
        }

        Ok(RoleRequired(claims))
    }
}

/// Any authenticated officer or admin.
pub type StaffRequired = RoleRequired<ROLE_OFFICER>;

/// Admins only.
pub type AdminRequired = RoleRequired<ROLE_ADMIN>;
