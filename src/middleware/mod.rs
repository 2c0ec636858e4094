use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Principal;
use crate::services::AuthError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
    pub token: String,
}

// Bearer token extractor
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let principal = state.auth.authenticate(token).await?;

        Ok(AuthUser {
            principal,
            token: token.to_string(),
        })
    }
}

/// An [`AuthUser`] whose principal carries the admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.principal.is_admin {
            return Err(AuthError::Forbidden.into());
        }
        Ok(AdminUser(user.principal))
    }
}
