//! Dotted application versions (`major.minor.revision.build`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub revision: i32,
    pub build: i32,
}

impl Version {
    pub const fn new(major: i32, minor: i32, revision: i32, build: i32) -> Self {
        Self {
            major,
            minor,
            revision,
            build,
        }
    }

    /// Version of the running code, from the package version.
    pub fn code_version() -> Self {
        env!("CARGO_PKG_VERSION")
            .parse()
            .unwrap_or(Self::new(0, 0, 0, 0))
    }

    fn parts(&self) -> [i32; 4] {
        [self.major, self.minor, self.revision, self.build]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts().cmp(&other.parts())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.revision, self.build
        )
    }
}

/// Accepts one to four numeric components; missing ones are zero.
/// A pre-release suffix (`-beta`) is ignored.
impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s.trim().split(['-', '+']).next().unwrap_or_default();
        let pieces: Vec<&str> = core.split('.').collect();
        if core.is_empty() || pieces.len() > 4 {
            return Err(CoreError::Validation(format!("Invalid version '{s}'")));
        }
        let mut parts = [0i32; 4];
        for (slot, piece) in parts.iter_mut().zip(&pieces) {
            *slot = piece
                .parse()
                .map_err(|_| CoreError::Validation(format!("Invalid version '{s}'")))?;
        }
        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}
