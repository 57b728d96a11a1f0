//! DXC release versions such as `v1.7.2308` or `1.8.2403.2`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ToolchainError;

/// A DXC release version.
///
/// Versions order lexicographically by `major`, `minor`, `micro`, `patch`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DxcVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Micro version, the `YYMM` of the release.
    pub micro: u32,
    /// Patch number; zero when the tag has none.
    pub patch: u32,
}

impl DxcVersion {
    /// Creates a version from its components.
    pub const fn new(major: u32, minor: u32, micro: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            patch,
        }
    }
}

impl fmt::Display for DxcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if self.patch > 0 {
            write!(f, ".{}", self.patch)?;
        }
        Ok(())
    }
}

impl FromStr for DxcVersion {
    type Err = ToolchainError;

    /// Parses `[v]major.minor.micro[.patch]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ToolchainError::InvalidVersion(s.to_string());
        let digits = s.strip_prefix('v').unwrap_or(s);

        let mut numbers = [0u32; 4];
        let mut count = 0;
        for part in digits.split('.') {
            if count == numbers.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            numbers[count] = part.parse().map_err(|_| invalid())?;
            count += 1;
        }
        if count < 3 {
            return Err(invalid());
        }

        let [major, minor, micro, patch] = numbers;
        Ok(DxcVersion::new(major, minor, micro, patch))
    }
}

impl Serialize for DxcVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
