//! Core identifier and path types
//!
//! - VersionId: identifier of a committed (or staged) version
//! - WriterId: unique identifier of one writer task
//! - Category: relative path segments a record is routed under

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a version inside a store
///
/// Conventionally a millisecond timestamp. The only properties the store
/// relies on are uniqueness and strict increase in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionId(u64);

impl VersionId {
    /// Wrap a raw identifier
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Current wall-clock time in milliseconds
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis().max(0) as u64)
    }

    /// Raw identifier value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The identifier immediately after this one
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Parse a directory name as a committed version identifier
    ///
    /// Only the canonical decimal rendering is accepted, so `"007"`,
    /// `"+7"` and `".7.tmp"` are all rejected. This keeps the mapping
    /// between identifiers and directory names one-to-one.
    pub fn parse_canonical(name: &str) -> Option<Self> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if name.len() > 1 && name.starts_with('0') {
            return None;
        }
        name.parse().ok().map(Self)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VersionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for VersionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Unique identifier of a writer task
///
/// Every task writing into a staged version gets its own `WriterId`; the id
/// is part of every key the task produces, which is what keeps concurrent
/// writers from colliding without any coordination between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WriterId(Uuid);

impl WriterId {
    /// Create a new random WriterId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a WriterId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for WriterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Relative path a record is routed under
///
/// An ordered sequence of path segments. The empty category places records
/// directly under the version root. Segments never contain `/` and never
/// start with `_` or `.`; those names are reserved for scratch data that
/// readers skip. Use [`Category::encode_segment`] to make an arbitrary
/// string safe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(SmallVec<[String; 4]>);

/// A read-side attribute path has the same shape as a category
pub type AttributePath = Category;

impl Category {
    /// The empty category (no partitioning)
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// Build a category from raw segments, encoding each one
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            segments
                .into_iter()
                .map(|s| Self::encode_segment(s.as_ref()))
                .collect(),
        )
    }

    /// Parse a `/`-separated relative path
    ///
    /// Empty components are dropped, so `"a//b/"` equals `"a/b"`.
    pub fn parse(path: &str) -> Self {
        Self::from_segments(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Append one segment
    pub fn push(&mut self, segment: impl AsRef<str>) {
        self.0.push(Self::encode_segment(segment.as_ref()));
    }

    /// Path segments in order
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root category
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` equals `other` or is one of its ancestors
    pub fn is_prefix_of(&self, other: &Category) -> bool {
        other.0.len() >= self.0.len() && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
    }

    /// Render as a `/`-joined relative path (empty for the root)
    pub fn to_path(&self) -> String {
        self.0.join("/")
    }

    /// Escape a string so it is usable as a single path segment
    ///
    /// `%`, `/` and `\` are percent-encoded anywhere; a leading `.` or `_`
    /// is percent-encoded so the segment is never hidden; the empty string
    /// becomes `%00`. A segment without reserved characters is unchanged.
    pub fn encode_segment(raw: &str) -> String {
        if raw.is_empty() {
            return "%00".to_string();
        }
        let mut out = String::with_capacity(raw.len());
        for (i, ch) in raw.chars().enumerate() {
            match ch {
                '%' => out.push_str("%25"),
                '/' => out.push_str("%2F"),
                '\\' => out.push_str("%5C"),
                '.' if i == 0 => out.push_str("%2E"),
                '_' if i == 0 => out.push_str("%5F"),
                c => out.push(c),
            }
        }
        out
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.to_path())
        }
    }
}

impl From<&str> for Category {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Category {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_segments(iter)
    }
}
