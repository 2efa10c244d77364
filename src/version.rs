//! Four-component browser/driver version numbers.

use std::fmt;
use std::str::FromStr;

use crate::error::WebDriverError;

/// A `major.minor.build.revision` version such as `114.0.5735.90`.
///
/// Parsing accepts 1 to 4 components; missing trailing components are 0,
/// so `"114"` and `"114.0.0.0"` are equal. Ordering is lexicographic over
/// the four components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl VersionNumber {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    pub fn parse(text: &str) -> Result<Self, WebDriverError> {
        let invalid = || WebDriverError::InvalidVersionFormat {
            input: text.to_string(),
        };

        let parts: Vec<&str> = text.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(invalid());
        }

        let mut components = [0u32; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            // `u32::from_str` accepts a leading '+', which is not a version digit.
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        let [major, minor, build, revision] = components;
        Ok(Self::new(major, minor, build, revision))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for VersionNumber {
    type Err = WebDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
