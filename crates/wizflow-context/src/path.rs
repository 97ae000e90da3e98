//! Context paths for addressing within a workspace tree
//!
//! Provides [`ContextPath`] for dot-separated addressing of values inside a
//! workspace's context tree.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path within a workspace context tree
///
/// Dot-separated ASCII segments. There is no array-index syntax and no
/// escaping: a segment can never contain a dot.
///
/// # Examples
/// - `["campaign", "settings", "budget"]` → `campaign.settings.budget`
/// - `["form", "q1"]` → `form.q1`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextPath(Vec<String>);

impl ContextPath {
    /// Create path from segments without validation
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Empty path (tree root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get first segment (the top-level context key)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Split into the top-level key and the remaining sub-path
    ///
    /// This is the split `update_by_context_path` dispatches on.
    #[must_use]
    pub fn split_first(&self) -> Option<(&str, ContextPath)> {
        let (head, rest) = self.0.split_first()?;
        Some((head.as_str(), Self(rest.to_vec())))
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Extend with multiple segments
    #[inline]
    #[must_use]
    pub fn extend(&self, segments: &[impl AsRef<str>]) -> Self {
        let mut new = self.clone();
        for seg in segments {
            new.0.push(seg.as_ref().to_string());
        }
        new
    }

    /// Check if this path is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for ContextPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for ContextPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else if !seg.chars().all(is_segment_char) {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '.' | '{' | '}')
}

impl From<Vec<String>> for ContextPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl Default for ContextPath {
    fn default() -> Self {
        Self::root()
    }
}

impl serde::Serialize for ContextPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ContextPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to context paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Invalid segment characters
    #[error("invalid segment: '{0}' (must be printable ASCII without dots or braces)")]
    InvalidSegment(String),

    /// Expected exactly one segment
    #[error("'{0}' is not a single top-level key")]
    NotAKey(String),
}
