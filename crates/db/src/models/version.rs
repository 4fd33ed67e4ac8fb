//! Installed application versions.

use serde::Serialize;
use sqlx::FromRow;
use scholar_core::admin::VersionEntry;
use scholar_core::types::Timestamp;
use scholar_core::version::Version;

/// Product type and name of the application itself in `versions`.
pub const PRODUCT_TYPE_CORE: &str = "core";
pub const PRODUCT_NAME: &str = "scholar";

/// A row from the `versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InstalledVersion {
    pub major: i32,
    pub minor: i32,
    pub revision: i32,
    pub build: i32,
    pub date_installed: Timestamp,
    pub current: bool,
}

impl InstalledVersion {
    pub fn version(&self) -> Version {
        Version::new(self.major, self.minor, self.revision, self.build)
    }
}

impl From<&InstalledVersion> for VersionEntry {
    fn from(row: &InstalledVersion) -> Self {
        Self {
            version: row.version().to_string(),
            date_installed: row.date_installed,
            current: row.current,
        }
    }
}
