//! Normalized, `/`-rooted logical paths.

use std::fmt;

use crate::error::{RepoError, RepoResult};

/// A `/`-rooted sequence of non-empty segments.
///
/// `.` and `..` are rejected at parse time, so a `LogicalPath` can never
/// climb out of the tree it is resolved against. A trailing slash is kept
/// as a flag: reads use it to insist on a directory, writes reject it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogicalPath {
    segments: Vec<String>,
    trailing_slash: bool,
}

impl LogicalPath {
    /// The repository root, `/`.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            trailing_slash: false,
        }
    }

    /// Parse a raw path. The empty string is the root.
    ///
    /// ```
    /// use vds_repo::LogicalPath;
    ///
    /// let p = LogicalPath::parse("/docs/index.md").unwrap();
    /// assert_eq!(p.segments(), ["docs", "index.md"]);
    /// assert!(LogicalPath::parse("/docs/../etc").is_err());
    /// ```
    pub fn parse(raw: &str) -> RepoResult<Self> {
        if raw.is_empty() || raw == "/" {
            return Ok(Self::root());
        }
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| RepoError::invalid_path(raw, "must start with '/'"))?;
        let (rest, trailing_slash) = match rest.strip_suffix('/') {
            Some(r) => (r, true),
            None => (rest, false),
        };

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            match segment {
                "" => return Err(RepoError::invalid_path(raw, "empty path segment")),
                "." | ".." => {
                    return Err(RepoError::invalid_path(
                        raw,
                        format!("segment {segment:?} is not allowed"),
                    ))
                }
                s if s.contains('\0') => {
                    return Err(RepoError::invalid_path(raw, "segment contains NUL"))
                }
                s => segments.push(s.to_string()),
            }
        }
        Ok(Self {
            segments,
            trailing_slash,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The containing directory, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, dirs) = self.segments.split_last()?;
        Some(Self {
            segments: dirs.to_vec(),
            trailing_slash: !dirs.is_empty(),
        })
    }

    /// Same segments, directory form.
    pub fn as_directory(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            trailing_slash: !self.is_root(),
        }
    }

    /// The path of the first `depth` segments.
    pub fn prefix(&self, depth: usize) -> Self {
        Self {
            segments: self.segments[..depth.min(self.segments.len())].to_vec(),
            trailing_slash: false,
        }
    }

    /// Check the extra rules a write target must satisfy.
    pub fn validate_for_write(&self, metadata_suffix: &str) -> RepoResult<()> {
        if self.is_root() {
            return Err(RepoError::invalid_path(self.to_string(), "cannot write the root"));
        }
        if self.trailing_slash {
            return Err(RepoError::invalid_path(
                self.to_string(),
                "trailing slash names a directory",
            ));
        }
        if !metadata_suffix.is_empty()
            && self
                .file_name()
                .is_some_and(|name| name.ends_with(metadata_suffix))
        {
            return Err(RepoError::invalid_path(
                self.to_string(),
                format!("paths ending in {metadata_suffix:?} are reserved"),
            ));
        }
        Ok(())
    }

    /// If this path ends in `suffix`, the path it is a metadata query for.
    ///
    /// `/a/b.json` maps to `/a/b` and `/a/b/.json` to the directory `/a/b/`.
    pub fn strip_metadata_suffix(&self, suffix: &str) -> Option<Self> {
        if suffix.is_empty() || self.trailing_slash {
            return None;
        }
        let name = self.file_name()?;
        let stem = name.strip_suffix(suffix)?;
        let mut segments = self.segments.clone();
        if stem.is_empty() {
            segments.pop();
            let trailing_slash = !segments.is_empty();
            return Some(Self {
                segments,
                trailing_slash,
            });
        }
        if let Some(last) = segments.last_mut() {
            *last = stem.to_string();
        }
        Some(Self {
            segments,
            trailing_slash: false,
        })
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        f.write_str(&self.segments.join("/"))?;
        if self.trailing_slash {
            f.write_str("/")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for LogicalPath {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn root_forms() {
        assert!(LogicalPath::parse("").unwrap().is_root());
        assert!(LogicalPath::parse("/").unwrap().is_root());
        assert_eq!(LogicalPath::root().to_string(), "/");
    }

    #[test]
    fn trailing_slash_is_kept() {
        let p = LogicalPath::parse("/a/b/").unwrap();
        assert!(p.has_trailing_slash());
        assert_eq!(p.segments(), ["a", "b"]);
        assert_eq!(p.to_string(), "/a/b/");
    }

    #[test]
    fn rejects_relative_and_dot_segments() {
        for bad in ["a/b", "/a/./b", "/a/../b", "/..", "/a//b", "//"] {
            let err = LogicalPath::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPath, "{bad:?}");
        }
    }

    #[test]
    fn write_rules() {
        let suffix = ".json";
        assert!(LogicalPath::parse("/a.txt").unwrap().validate_for_write(suffix).is_ok());
        assert!(LogicalPath::root().validate_for_write(suffix).is_err());
        assert!(LogicalPath::parse("/a/").unwrap().validate_for_write(suffix).is_err());
        assert!(LogicalPath::parse("/a.json").unwrap().validate_for_write(suffix).is_err());
        assert!(LogicalPath::parse("/a.json").unwrap().validate_for_write("").is_ok());
    }

    #[test]
    fn metadata_suffix_mapping() {
        let strip = |raw: &str| {
            LogicalPath::parse(raw)
                .unwrap()
                .strip_metadata_suffix(".json")
                .map(|p| p.to_string())
        };
        assert_eq!(strip("/foo/bar.json").as_deref(), Some("/foo/bar"));
        assert_eq!(strip("/foo/bar/.json").as_deref(), Some("/foo/bar/"));
        assert_eq!(strip("/.json").as_deref(), Some("/"));
        assert_eq!(strip("/foo/bar"), None);
        assert_eq!(strip("/foo.json/"), None);
    }

    #[test]
    fn parent_and_prefix() {
        let p = LogicalPath::parse("/a/b/c.txt").unwrap();
        assert_eq!(p.parent().unwrap().to_string(), "/a/b/");
        assert_eq!(p.prefix(1).to_string(), "/a");
        assert_eq!(LogicalPath::parse("/top").unwrap().parent().unwrap(), LogicalPath::root());
        assert!(LogicalPath::root().parent().is_none());
    }

    proptest! {
        #[test]
        fn display_reparses_to_same_path(
            segs in proptest::collection::vec("[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,8}", 0..5),
            trailing in any::<bool>(),
        ) {
            let mut raw = format!("/{}", segs.join("/"));
            if trailing && !segs.is_empty() {
                raw.push('/');
            }
            prop_assume!(segs.iter().all(|s| s != "." && s != ".."));
            let parsed = LogicalPath::parse(&raw).unwrap();
            prop_assert_eq!(parsed.to_string(), raw.clone());
            prop_assert_eq!(LogicalPath::parse(&parsed.to_string()).unwrap(), parsed);
        }
    }
}
