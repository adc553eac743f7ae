//! Comparable version keys.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Prerelease;
use thiserror::Error;

/// Package ecosystems publish versions with up to four numeric segments
/// (e.g. "4.7.2.1"); anything longer is rejected.
pub const MAX_RELEASE_SEGMENTS: usize = 4;

/// A version string that cannot be turned into a [`VersionKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid version '{version}': {reason}")]
pub struct VersionParseError {
    pub version: String,
    pub reason: String,
}

impl VersionParseError {
    fn new(version: &str, reason: impl Into<String>) -> Self {
        Self {
            version: version.to_string(),
            reason: reason.into(),
        }
    }
}

/// Ordering key derived from a version string.
///
/// Release segments are compared element-wise with missing segments treated
/// as zero, so "1.0", "1.0.0" and "1.0.0.0" are equal. A pre-release sorts
/// strictly below the release it qualifies. Build metadata is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey {
    release: [u64; MAX_RELEASE_SEGMENTS],
    pre: Prerelease,
}

impl VersionKey {
    /// Parse a version string such as "1.2", "1.2.3-beta.1" or "4.7.2.1+sha.abc".
    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::new(version, "version is empty"));
        }

        let without_build = trimmed.split_once('+').map_or(trimmed, |(head, _)| head);
        let (release_part, pre_part) = match without_build.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (without_build, None),
        };

        let segments: Vec<&str> = release_part.split('.').collect();
        if segments.len() > MAX_RELEASE_SEGMENTS {
            return Err(VersionParseError::new(
                version,
                format!(
                    "expected at most {} release segments, found {}",
                    MAX_RELEASE_SEGMENTS,
                    segments.len()
                ),
            ));
        }

        let mut release = [0u64; MAX_RELEASE_SEGMENTS];
        for (slot, segment) in release.iter_mut().zip(&segments) {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError::new(
                    version,
                    format!("release segment '{}' is not numeric", segment),
                ));
            }
            *slot = segment.parse().map_err(|_| {
                VersionParseError::new(
                    version,
                    format!("release segment '{}' is out of range", segment),
                )
            })?;
        }

        let pre = match pre_part {
            Some("") => {
                return Err(VersionParseError::new(version, "pre-release is empty"));
            }
            Some(pre) => Prerelease::new(pre)
                .map_err(|e| VersionParseError::new(version, format!("pre-release: {}", e)))?,
            None => Prerelease::EMPTY,
        };

        Ok(Self { release, pre })
    }

    /// Numeric release segments, padded with zeros.
    pub fn release(&self) -> &[u64; MAX_RELEASE_SEGMENTS] {
        &self.release
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // An empty pre-release compares greater than any non-empty one.
        self.release
            .cmp(&other.release)
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for VersionKey {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch, revision] = self.release;
        write!(f, "{}.{}.{}", major, minor, patch)?;
        if revision != 0 {
            write!(f, ".{}", revision)?;
        }
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}
