//! Canonical listing path.

use std::fmt;

use serde_json::Value;

use super::error::ListingError;

/// Path under a listing root, reduced to its non-empty segments.
///
/// The empty segment list is the root path (`/`). Strings are split on
/// `/`, so `"/a/b"`, `"a/b/"` and `["a", "b"]` all produce the same path.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListingPath {
    segments: Vec<String>,
}

impl ListingPath {
    /// Returns the root path (no segments).
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Builds a path from segments, dropping empty ones.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Canonical segments in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Renders the value sent as the `path` query parameter.
    ///
    /// Example: `[]` → `"/"`, `["a", "b"]` → `"/a/b"`.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Returns a child path with `segment` appended.
    ///
    /// `segment` is split like a string path, so `"x/y"` appends two segments.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(
            segment
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
        Self { segments }
    }
}

impl fmt::Display for ListingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

impl From<&str> for ListingPath {
    fn from(path: &str) -> Self {
        Self::from_segments(path.split('/'))
    }
}

impl From<String> for ListingPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl From<Vec<String>> for ListingPath {
    fn from(segments: Vec<String>) -> Self {
        Self::from_segments(segments)
    }
}

impl From<&[&str]> for ListingPath {
    fn from(segments: &[&str]) -> Self {
        Self::from_segments(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for ListingPath {
    fn from(segments: [&str; N]) -> Self {
        Self::from_segments(segments)
    }
}

/// Accepts a JSON string or an array of strings.
///
/// Anything else is rejected with [`ListingError::InvalidPathType`].
impl TryFrom<&Value> for ListingPath {
    type Error = ListingError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::from(s.as_str())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().ok_or(ListingError::InvalidPathType))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::from_segments),
            _ => Err(ListingError::InvalidPathType),
        }
    }
}
