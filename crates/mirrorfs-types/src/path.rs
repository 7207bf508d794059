//! VFS paths.
//!
//! A [`VfsPath`] is an ordered sequence of segments, root-relative and
//! endpoint-scoped. Parsing rejects empty input, empty segments and the
//! `.`/`..` segments, so a stored path can never escape its namespace.
//!
//! Ordering is lexicographic over the segment sequence. That property is
//! load-bearing: a `BTreeMap` keyed by `VfsPath` keeps every subtree
//! contiguous, so child listings and subtree walks are range scans.

use serde::{Deserialize, Serialize};

use crate::error::VfsError;

/// A root-relative path in an endpoint's virtual filesystem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VfsPath {
    segments: Vec<String>,
}

impl VfsPath {
    /// The root path `/`.
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Parse a path from its string form.
    ///
    /// Accepts `/a/b/c` and `a/b/c` (a single trailing slash is
    /// tolerated). Rejects empty input, empty segments, `.` and `..`.
    pub fn parse(input: &str) -> Result<Self, VfsError> {
        if input.is_empty() {
            return Err(VfsError::invalid_path("path is empty"));
        }

        let trimmed = input.strip_prefix('/').unwrap_or(input);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            validate_segment(segment)?;
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Number of segments. Root has zero.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, if any. Root has no name.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The parent path, or `None` for root.
    pub fn parent(&self) -> Option<VfsPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append one validated segment.
    pub fn join(&self, segment: &str) -> Result<VfsPath, VfsError> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// True if `self` equals `base` or lies below it.
    pub fn starts_with(&self, base: &VfsPath) -> bool {
        self.segments.len() >= base.segments.len()
            && self.segments[..base.segments.len()] == base.segments[..]
    }

    /// True if `self` is a direct child of `parent`.
    pub fn is_child_of(&self, parent: &VfsPath) -> bool {
        self.segments.len() == parent.segments.len() + 1 && self.starts_with(parent)
    }

    /// All proper ancestors, from the root down to the parent.
    pub fn ancestors(&self) -> Vec<VfsPath> {
        (0..self.segments.len())
            .map(|n| Self {
                segments: self.segments[..n].to_vec(),
            })
            .collect()
    }

    /// The path relative to `base`, joined with `/`.
    ///
    /// Returns `None` if `self` does not lie under `base`, and an empty
    /// string when `self == base`.
    pub fn relative_to(&self, base: &VfsPath) -> Option<String> {
        if !self.starts_with(base) {
            return None;
        }
        Some(self.segments[base.segments.len()..].join("/"))
    }
}

fn validate_segment(segment: &str) -> Result<(), VfsError> {
    match segment {
        "" => Err(VfsError::invalid_path("empty path segment")),
        "." | ".." => Err(VfsError::invalid_path(format!(
            "disallowed path segment: {segment:?}"
        ))),
        _ => Ok(()),
    }
}

impl std::fmt::Display for VfsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for VfsPath {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VfsPath {
    type Error = VfsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VfsPath> for String {
    fn from(path: VfsPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let path = VfsPath::parse("/fs/os/etc/hosts").unwrap();
        assert_eq!(path.to_string(), "/fs/os/etc/hosts");
        assert_eq!(path.depth(), 4);
        assert_eq!(path.name(), Some("hosts"));
    }

    #[test]
    fn parse_without_leading_slash() {
        let path = VfsPath::parse("fs/os").unwrap();
        assert_eq!(path.to_string(), "/fs/os");
    }

    #[test]
    fn parse_root() {
        let path = VfsPath::parse("/").unwrap();
        assert!(path.is_root());
        assert_eq!(path.to_string(), "/");
        assert_eq!(path.name(), None);
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(VfsPath::parse("").is_err());
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(VfsPath::parse("/a//b").is_err());
    }

    #[test]
    fn parse_rejects_dot_segments() {
        assert!(VfsPath::parse("/a/./b").is_err());
        assert!(VfsPath::parse("/a/../b").is_err());
    }

    #[test]
    fn parent_chain_ends_at_root() {
        let path = VfsPath::parse("/a/b/c").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "/a/b");
        assert_eq!(parent.parent().unwrap().to_string(), "/a");
        let root = parent.parent().unwrap().parent().unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());
    }

    #[test]
    fn ancestors_from_root_down() {
        let path = VfsPath::parse("/a/b/c").unwrap();
        let ancestors: Vec<String> = path.ancestors().iter().map(|p| p.to_string()).collect();
        assert_eq!(ancestors, vec!["/", "/a", "/a/b"]);
    }

    #[test]
    fn ordering_keeps_subtrees_contiguous() {
        let a = VfsPath::parse("/a").unwrap();
        let a_z = VfsPath::parse("/a/z").unwrap();
        let ab = VfsPath::parse("/ab").unwrap();
        assert!(a < a_z);
        assert!(a_z < ab);
    }

    #[test]
    fn starts_with_and_child_of() {
        let base = VfsPath::parse("/fs/os").unwrap();
        let child = VfsPath::parse("/fs/os/etc").unwrap();
        let deep = VfsPath::parse("/fs/os/etc/hosts").unwrap();
        let sibling = VfsPath::parse("/fs/tsk").unwrap();

        assert!(child.starts_with(&base));
        assert!(deep.starts_with(&base));
        assert!(!sibling.starts_with(&base));
        assert!(child.is_child_of(&base));
        assert!(!deep.is_child_of(&base));
        assert!(base.starts_with(&base));
    }

    #[test]
    fn relative_to_base() {
        let base = VfsPath::parse("/fs/os").unwrap();
        let deep = VfsPath::parse("/fs/os/etc/hosts").unwrap();
        assert_eq!(deep.relative_to(&base).as_deref(), Some("etc/hosts"));
        assert_eq!(base.relative_to(&base).as_deref(), Some(""));
        assert_eq!(base.relative_to(&deep), None);
    }

    #[test]
    fn serde_uses_string_form() {
        let path = VfsPath::parse("/fs/os/etc").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/fs/os/etc\"");
        let back: VfsPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<VfsPath, _> = serde_json::from_str("\"/a/../b\"");
        assert!(result.is_err());
    }
}
