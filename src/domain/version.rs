//! Version parsing and comparison
//!
//! A version is a dotted sequence of non-negative integers with an optional
//! pre-release tag (`0.2.0-nightly.1`). Missing trailing components compare
//! as zero, so `1.2` and `1.2.0` are equal. A leading `v` and `+build`
//! metadata are accepted and ignored.

use crate::error::VersionError;
use semver::Prerelease;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A parsed tool version
#[derive(Debug, Clone)]
pub struct Version {
    /// Numeric components in the order they were written
    components: Vec<u64>,
    /// Pre-release tag; empty for a release
    pre: Prerelease,
}

impl Version {
    /// Parse a version string such as `11.5.2` or `v0.2.0-beta.3`
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let text = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if text.is_empty() {
            return Err(VersionError::parse(input, "empty version string"));
        }

        let text = text.split_once('+').map_or(text, |(core, _)| core);
        let (core, tag) = match text.split_once('-') {
            Some((core, tag)) => (core, Some(tag)),
            None => (text, None),
        };

        let components = core
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| VersionError::parse(input, format!("invalid component '{part}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match tag {
            Some("") => return Err(VersionError::parse(input, "empty pre-release tag")),
            Some(tag) => Prerelease::new(tag).map_err(|e| VersionError::parse(input, e.to_string()))?,
            None => Prerelease::EMPTY,
        };

        Ok(Self { components, pre })
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

/// Compare two version strings
///
/// Fails if either side is not a valid version; callers treat that as an
/// unknown result rather than guessing an order.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for index in 0..len {
            match self.component(index).cmp(&other.component(index)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        // Prerelease::EMPTY orders above any tag, so releases win ties
        self.pre.cmp(&other.pre)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self
            .components
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        if self.pre.is_empty() {
            write!(f, "{}", core)
        } else {
            write!(f, "{}-{}", core, self.pre)
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
