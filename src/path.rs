// src/path.rs

//! Source-tree and build-directory path types.
//!
//! `SourceFile` and `SourceDir` are source-absolute: they start with `//`
//! and are rooted at the source tree, independent of where the checkout
//! lives on disk. `OutputFile` is relative to the build directory.

use std::fmt;
use std::path::PathBuf;

use crate::errors::{GenError, Result};

/// Normalize the path component of a source-absolute path: collapse `.` and
/// empty segments, resolve `..`. Returns `None` when `..` would escape the
/// source root.
fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            seg => parts.push(seg),
        }
    }
    Some(parts.join("/"))
}

/// A file in the source tree, e.g. `//base/util.cc`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceFile(String);

impl SourceFile {
    /// Resolve a path as written in a `BUILD.toml`: either source-absolute
    /// (`//a/b.cc`) or relative to the declaring directory (`b.cc`).
    pub fn resolve(raw: &str, current_dir: &str) -> Result<Self> {
        let joined = match raw.strip_prefix("//") {
            Some(abs) => abs.to_string(),
            None if current_dir.is_empty() => raw.to_string(),
            None => format!("{current_dir}/{raw}"),
        };
        let norm = normalize(&joined).ok_or_else(|| GenError::BadPath(raw.to_string()))?;
        if norm.is_empty() {
            return Err(GenError::BadPath(raw.to_string()));
        }
        Ok(Self(format!("//{norm}")))
    }

    /// The full `//`-prefixed value.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Path relative to the source root (no `//`).
    pub fn root_relative(&self) -> &str {
        &self.0[2..]
    }

    /// Last path component without its extension.
    pub fn stem(&self) -> &str {
        let base = self.0.rsplit('/').next().unwrap_or(&self.0);
        base.rsplit_once('.').map_or(base, |(stem, _)| stem)
    }

    /// On-disk location given the checkout root.
    pub fn to_disk_path(&self, source_root: &std::path::Path) -> PathBuf {
        source_root.join(self.root_relative())
    }

    /// Path as written in build files, relative to the build directory.
    /// Files inside the build directory stay relative to it; everything else
    /// climbs out with `../` segments.
    pub fn rebase_to(&self, build_dir: &SourceDir) -> String {
        if let Some(inside) = self.0.strip_prefix(build_dir.value()) {
            inside.to_string()
        } else {
            let ups = "../".repeat(build_dir.depth());
            format!("{ups}{}", self.root_relative())
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directory in the source tree, e.g. `//base/`. Always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceDir(String);

impl SourceDir {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.strip_prefix("//").unwrap_or(raw);
        let norm = normalize(trimmed).ok_or_else(|| GenError::BadPath(raw.to_string()))?;
        if norm.is_empty() {
            Ok(Self("//".to_string()))
        } else {
            Ok(Self(format!("//{norm}/")))
        }
    }

    /// The full `//`-prefixed, `/`-terminated value.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Directory path without `//` prefix or trailing slash; empty for the
    /// source root itself.
    pub fn root_relative(&self) -> &str {
        self.0[2..].trim_end_matches('/')
    }

    /// Number of path components below the source root.
    pub fn depth(&self) -> usize {
        let rel = self.root_relative();
        if rel.is_empty() {
            0
        } else {
            rel.split('/').count()
        }
    }

    /// Whether `file` lies inside this directory (or a subdirectory of it).
    pub fn contains(&self, file: &SourceFile) -> bool {
        file.value().starts_with(self.value())
    }

    /// Directory path as written in build files, relative to the build
    /// directory and without a trailing slash.
    pub fn rebase_to(&self, build_dir: &SourceDir) -> String {
        if let Some(inside) = self.0.strip_prefix(build_dir.value()) {
            inside.trim_end_matches('/').to_string()
        } else {
            let ups = "../".repeat(build_dir.depth());
            format!("{ups}{}", self.root_relative())
        }
    }

    pub fn to_disk_path(&self, source_root: &std::path::Path) -> PathBuf {
        source_root.join(self.root_relative())
    }
}

impl fmt::Display for SourceDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path relative to the build directory, e.g. `gen/version.h` or
/// `obj/base/libbase.a`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputFile(String);

impl OutputFile {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The build-dir-relative equivalent of a source file, if the file lies
    /// inside the build directory at all. Only such files can ever match a
    /// target's computed outputs.
    pub fn from_source_file(build_dir: &SourceDir, file: &SourceFile) -> Option<Self> {
        file.value()
            .strip_prefix(build_dir.value())
            .map(|rel| Self(rel.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn to_disk_path(&self, build_dir_path: &std::path::Path) -> PathBuf {
        build_dir_path.join(&self.0)
    }
}

impl fmt::Display for OutputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_and_normalize() {
        let f = SourceFile::resolve("util.cc", "base").unwrap();
        assert_eq!(f.value(), "//base/util.cc");

        let f = SourceFile::resolve("//a/./b/../c.cc", "x").unwrap();
        assert_eq!(f.value(), "//a/c.cc");

        assert!(SourceFile::resolve("//../escape.cc", "").is_err());
    }

    #[test]
    fn rebase() {
        let out = SourceDir::new("//out/debug").unwrap();
        let src = SourceFile::resolve("//base/a.cc", "").unwrap();
        assert_eq!(src.rebase_to(&out), "../../base/a.cc");

        let gen = SourceFile::resolve("//out/debug/gen/a.h", "").unwrap();
        assert_eq!(gen.rebase_to(&out), "gen/a.h");
    }

    #[test]
    fn output_file_from_source() {
        let out = SourceDir::new("//out").unwrap();
        let gen = SourceFile::resolve("//out/gen/a.h", "").unwrap();
        assert_eq!(
            OutputFile::from_source_file(&out, &gen),
            Some(OutputFile::new("gen/a.h"))
        );

        let src = SourceFile::resolve("//base/a.cc", "").unwrap();
        assert_eq!(OutputFile::from_source_file(&out, &src), None);
    }
}
