//! Access checks applied at the top of each guarded handler

use crate::{
    error::{AppError, AppResult},
    models::{Permission, UserClaims},
};

use super::CurrentUser;

pub trait RouteGuard {
    /// Claims of a logged-in caller, 401 for anonymous callers
    fn require_authenticated(&self) -> AppResult<&UserClaims>;

    /// 401 when anonymous, 403 when the permission is missing
    fn require_permission(&self, permission: Permission) -> AppResult<&UserClaims> {
        let claims = self.require_authenticated()?;
        claims.require_permission(permission)?;
        Ok(claims)
    }

    /// 401 when anonymous, 403 for non-staff accounts
    fn require_staff(&self) -> AppResult<&UserClaims> {
        let claims = self.require_authenticated()?;
        claims.require_staff()?;
        Ok(claims)
    }
}

impl RouteGuard for CurrentUser {
    fn require_authenticated(&self) -> AppResult<&UserClaims> {
        self.0
            .as_ref()
            .ok_or_else(|| AppError::Authentication("Login required".to_string()))
    }
}
