//! Request handlers.
//!
//! Each submodule holds the async handler functions for one resource.
//! Handlers authorize through extractors, delegate to `scholar_db`
//! repositories or `scholar_core` logic, and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod admin;
pub mod agencies;
pub mod announcements;
pub mod journals;
pub mod navigation_menus;
pub mod payments;
pub mod pub_ids;
pub mod subeditors;
pub mod tombstones;
