// src/label.rs

//! Target labels and label patterns.
//!
//! A label is the canonical identity of a target or config: a directory in
//! the source tree plus a name, written `//dir:name`. Labels are totally
//! ordered (lexicographic on the pair) so that sorting rule output by label
//! gives deterministic build files.

use std::fmt;

use crate::errors::{GenError, Result};

/// Canonical identity of a target or config.
///
/// `dir` is the source-tree directory without the leading `//` and without a
/// trailing slash (the root directory is the empty string). `name` is the
/// declaration name inside that directory's `BUILD.toml`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
    dir: String,
    name: String,
}

impl Label {
    pub fn new(dir: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    /// Parse a label reference as written in a `BUILD.toml`.
    ///
    /// Accepted forms:
    /// - `//dir:name` - absolute
    /// - `//dir` - shorthand for `//dir:<last path component>`
    /// - `:name` - a declaration in `current_dir`'s own file
    pub fn parse(raw: &str, current_dir: &str) -> Result<Self> {
        if let Some(rest) = raw.strip_prefix("//") {
            let (dir, name) = match rest.split_once(':') {
                Some((dir, name)) => (dir.to_string(), name.to_string()),
                None => {
                    // `//a/b` means `//a/b:b`; `//` alone has no implied name.
                    let name = rest
                        .rsplit('/')
                        .next()
                        .filter(|s| !s.is_empty())
                        .ok_or_else(|| GenError::BadLabel(raw.to_string()))?;
                    (rest.to_string(), name.to_string())
                }
            };
            if name.is_empty() || name.contains('/') {
                return Err(GenError::BadLabel(raw.to_string()));
            }
            Ok(Self {
                dir: dir.trim_end_matches('/').to_string(),
                name,
            })
        } else if let Some(name) = raw.strip_prefix(':') {
            if name.is_empty() {
                return Err(GenError::BadLabel(raw.to_string()));
            }
            Ok(Self::new(current_dir, name))
        } else {
            Err(GenError::BadLabel(raw.to_string()))
        }
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The form shown in diagnostics. Toolchain suffixes are confusing in the
    /// common case, so callers pass `show_toolchain` only when some involved
    /// target lives outside the default toolchain.
    pub fn to_user_string(&self, show_toolchain: bool, toolchain: &str) -> String {
        if show_toolchain {
            format!("{self}({toolchain})")
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.dir, self.name)
    }
}

/// A pattern from `--filters`, limiting which targets auxiliary projections
/// include.
#[derive(Debug, Clone)]
pub enum LabelPattern {
    /// `//dir:name` - exactly one target.
    Exact(Label),
    /// `//dir:*` - every target in one directory.
    Dir(String),
    /// `//dir/*` - every target under a directory subtree.
    Subtree(String),
}

impl LabelPattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix("//")
            .ok_or_else(|| GenError::BadLabel(raw.to_string()))?;

        if let Some(dir) = rest.strip_suffix(":*") {
            Ok(Self::Dir(dir.trim_end_matches('/').to_string()))
        } else if let Some(dir) = rest.strip_suffix("/*") {
            Ok(Self::Subtree(dir.trim_end_matches('/').to_string()))
        } else {
            Ok(Self::Exact(Label::parse(raw, "")?))
        }
    }

    /// Parse a semicolon-separated `--filters` value.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        raw.split(';')
            .filter(|s| !s.trim().is_empty())
            .map(|s| Self::parse(s.trim()))
            .collect()
    }

    pub fn matches(&self, label: &Label) -> bool {
        match self {
            Self::Exact(l) => l == label,
            Self::Dir(dir) => label.dir() == dir,
            Self::Subtree(dir) => {
                label.dir() == dir
                    || label
                        .dir()
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| dir.is_empty() || rest.starts_with('/'))
            }
        }
    }
}

/// True when `label` matches any pattern, or when the pattern list is empty
/// (no filtering requested).
pub fn matches_any(patterns: &[LabelPattern], label: &Label) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| p.matches(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        assert_eq!(Label::parse("//a/b:c", "").unwrap(), Label::new("a/b", "c"));
        assert_eq!(Label::parse("//a/b", "").unwrap(), Label::new("a/b", "b"));
        assert_eq!(Label::parse(":c", "a").unwrap(), Label::new("a", "c"));
        assert!(Label::parse("c", "a").is_err());
        assert!(Label::parse("//", "").is_err());
    }

    #[test]
    fn ordering_is_lexicographic_on_dir_then_name() {
        let mut labels = vec![
            Label::new("b", "a"),
            Label::new("a", "z"),
            Label::new("a", "a"),
            Label::new("", "root"),
        ];
        labels.sort();
        let shown: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        assert_eq!(shown, ["//:root", "//a:a", "//a:z", "//b:a"]);
    }

    #[test]
    fn patterns() {
        let exact = LabelPattern::parse("//a:b").unwrap();
        assert!(exact.matches(&Label::new("a", "b")));
        assert!(!exact.matches(&Label::new("a", "c")));

        let dir = LabelPattern::parse("//a:*").unwrap();
        assert!(dir.matches(&Label::new("a", "anything")));
        assert!(!dir.matches(&Label::new("a/sub", "x")));

        let subtree = LabelPattern::parse("//a/*").unwrap();
        assert!(subtree.matches(&Label::new("a", "x")));
        assert!(subtree.matches(&Label::new("a/sub", "x")));
        assert!(!subtree.matches(&Label::new("ab", "x")));
    }
}
