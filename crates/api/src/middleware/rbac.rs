//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement, so handlers enforce authorization by signature.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use scholar_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `site_admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireSiteAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireSiteAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_site_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Site administrator role required".into(),
            )));
        }
        Ok(RequireSiteAdmin(user))
    }
}

/// Requires a journal manager (`manager` or `site_admin`).
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_journal_manager() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Journal manager role required".into(),
            )));
        }
        Ok(RequireManager(user))
    }
}
