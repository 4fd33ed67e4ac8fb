//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireSiteAdmin`] -- Requires the `site_admin` role.
//! - [`rbac::RequireManager`] -- Requires `manager` or `site_admin`.

pub mod auth;
pub mod rbac;
