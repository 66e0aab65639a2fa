use serde::{Deserialize, Serialize};
use std::fmt;

/// A format version.  Versions read from files only carry `major.minor`;
/// `patch` is always zero for them and exists so that file versions compare
/// directly with other three-component versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// The version of a file with the given header fields.
    pub const fn of_file(major: u32, minor: u32) -> Self {
        Self::new(major, minor, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
