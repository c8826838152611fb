//! Cluster version parsing and ordering.
//!
//! Version strings reported by a cluster (`"7.10.2"`, `"8.0.0-SNAPSHOT"`) are
//! compared numerically per component, never as plain strings.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A `major.minor.patch` cluster version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ClusterVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ClusterVersion {
    type Err = Error;

    /// Parses `X`, `X.Y` or `X.Y.Z`, ignoring any `-qualifier` or `+build` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s
            .trim()
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return Err(Error::Parse(format!("empty version string: {s:?}")));
        }

        let mut parts = [0u32; 3];
        let mut count = 0;
        for piece in core.split('.') {
            if count == parts.len() {
                return Err(Error::Parse(format!("too many version components: {s:?}")));
            }
            parts[count] = piece
                .parse()
                .map_err(|_| Error::Parse(format!("invalid version component {piece:?} in {s:?}")))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for ClusterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
