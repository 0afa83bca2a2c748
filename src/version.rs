//! Minimal `major.minor.patch` versions for the document version gate.

use std::{fmt::Display, str::FromStr};

use crate::error::Error;

/// The version this build of the crate supports, used as the default baseline.
pub const SUPPORTED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A semantic version. Missing components read as zero; pre-release and build
/// suffixes (`-rc.1`, `+meta`) are ignored for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// The version of this crate.
    pub fn supported() -> Self {
        SUPPORTED_VERSION
            .parse()
            .unwrap_or(Version::new(0, 0, 0))
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::supported()
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('v');
        let core = trimmed
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        let invalid = || Error::configuration_error(format!("invalid version `{}`", s));

        let parts = core.split('.').collect::<Vec<_>>();
        if core.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Version::new(numbers[0], numbers[1], numbers[2]))
    }
}
