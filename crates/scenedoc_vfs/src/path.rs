//! Logical resource paths.

use crate::error::{VfsError, VfsResult};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A normalized, case-insensitive logical path.
///
/// Logical paths are slash-separated and always relative to a mount root.
/// Normalization converts backslashes, collapses repeated separators, strips
/// leading/trailing separators, and drops `.` segments. Paths containing
/// `..` segments are rejected outright - a logical path can never escape its
/// mount.
///
/// Two paths compare equal when they differ only by ASCII case; the original
/// spelling is preserved for display.
#[derive(Debug, Clone)]
pub struct LogicalPath {
    display: String,
    key: String,
}

impl LogicalPath {
    /// The empty path, used as the root for directory listings.
    #[must_use]
    pub fn root() -> Self {
        Self {
            display: String::new(),
            key: String::new(),
        }
    }

    /// Parses and normalizes a path.
    ///
    /// Input that normalizes to no segments at all yields the root path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path contains a `..` segment.
    pub fn parse(raw: &str) -> VfsResult<Self> {
        let mut segments = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(VfsError::invalid_path(raw, "'..' segments are not allowed"));
                }
                s => segments.push(s),
            }
        }

        let display = segments.join("/");
        let key = display.to_ascii_lowercase();
        Ok(Self { display, key })
    }

    /// Returns the normalized path text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Returns the lowercase comparison key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Checks whether this is the root (empty) path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.display.is_empty()
    }

    /// Returns the final segment, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.display.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Returns the extension of the final segment, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        let dot = name.rfind('.')?;
        if dot == 0 || dot + 1 == name.len() {
            return None;
        }
        Some(&name[dot + 1..])
    }

    /// Returns the parent path, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.display.rfind('/') {
            Some(at) => Some(Self {
                display: self.display[..at].to_string(),
                key: self.key[..at].to_string(),
            }),
            None => Some(Self::root()),
        }
    }

    /// Joins a relative suffix onto this path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the suffix fails normalization.
    pub fn join(&self, suffix: &str) -> VfsResult<Self> {
        let tail = Self::parse(suffix)?;
        if self.is_root() {
            return Ok(tail);
        }
        if tail.is_root() {
            return Ok(self.clone());
        }
        Ok(Self {
            display: format!("{}/{}", self.display, tail.display),
            key: format!("{}/{}", self.key, tail.key),
        })
    }

    /// Checks whether this path lives under `dir` (component-wise, so
    /// `maps/a.scene` is under `maps` but `mapsx/a.scene` is not).
    /// Every path is under the root.
    #[must_use]
    pub fn starts_with(&self, dir: &Self) -> bool {
        if dir.is_root() {
            return true;
        }
        match self.key.strip_prefix(&dir.key) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Iterates over the path components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.display.split('/').filter(|s| !s.is_empty())
    }
}

impl PartialEq for LogicalPath {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for LogicalPath {}

impl Hash for LogicalPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for LogicalPath {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogicalPath {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators() {
        let path = LogicalPath::parse("maps\\zone//level1.scene").unwrap();
        assert_eq!(path.as_str(), "maps/zone/level1.scene");
    }

    #[test]
    fn strips_dot_segments_and_edges() {
        let path = LogicalPath::parse("/maps/./zone/").unwrap();
        assert_eq!(path.as_str(), "maps/zone");
    }

    #[test]
    fn rejects_parent_segments() {
        let result = LogicalPath::parse("maps/../secrets");
        assert!(matches!(result, Err(VfsError::InvalidPath { .. })));
    }

    #[test]
    fn case_insensitive_equality() {
        let a = LogicalPath::parse("Maps/Level1.Scene").unwrap();
        let b = LogicalPath::parse("maps/level1.scene").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Maps/Level1.Scene");
    }

    #[test]
    fn file_name_and_extension() {
        let path = LogicalPath::parse("maps/level1.scene").unwrap();
        assert_eq!(path.file_name(), Some("level1.scene"));
        assert_eq!(path.extension(), Some("scene"));

        let bare = LogicalPath::parse("maps/README").unwrap();
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn parent_walks_to_root() {
        let path = LogicalPath::parse("a/b/c").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "a/b");
        let grand = parent.parent().unwrap();
        assert_eq!(grand.as_str(), "a");
        let root = grand.parent().unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());
    }

    #[test]
    fn join_paths() {
        let dir = LogicalPath::parse("textures").unwrap();
        let joined = dir.join("walls/brick.png").unwrap();
        assert_eq!(joined.as_str(), "textures/walls/brick.png");
        assert_eq!(LogicalPath::root().join("a").unwrap().as_str(), "a");
    }

    #[test]
    fn starts_with_is_component_wise() {
        let dir = LogicalPath::parse("maps").unwrap();
        let inside = LogicalPath::parse("Maps/level1.scene").unwrap();
        let outside = LogicalPath::parse("mapsx/level1.scene").unwrap();
        assert!(inside.starts_with(&dir));
        assert!(!outside.starts_with(&dir));
        assert!(inside.starts_with(&LogicalPath::root()));
    }
}
