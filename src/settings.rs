// src/settings.rs

//! Per-invocation build settings: where the source tree and the build
//! directory live, which toolchain is the default, and which optional
//! checks were requested.

use std::path::{Path, PathBuf};

use crate::errors::{GenError, Result};
use crate::path::SourceDir;

#[derive(Debug)]
pub struct BuildSettings {
    /// On-disk location of the source root (the directory holding the root
    /// `BUILD.toml`).
    source_root: PathBuf,
    /// Build directory as a source-absolute dir, e.g. `//out/debug/`.
    build_dir: SourceDir,
    /// On-disk location of the build directory.
    build_dir_path: PathBuf,
    pub check_public_headers: bool,
    pub check_system_includes: bool,
}

impl BuildSettings {
    /// Build settings from the `gen` arguments. `out_dir` is either
    /// source-absolute (`//out/foo`) or relative to the source root
    /// (`out/foo`).
    pub fn new(source_root: PathBuf, out_dir: &str) -> Result<Self> {
        if out_dir.is_empty() {
            return Err(GenError::Setup("output directory is empty".to_string()));
        }
        let build_dir = SourceDir::new(out_dir)?;
        if build_dir.root_relative().is_empty() {
            return Err(GenError::Setup(
                "the output directory may not be the source root".to_string(),
            ));
        }
        let build_dir_path = build_dir.to_disk_path(&source_root);
        Ok(Self {
            source_root,
            build_dir,
            build_dir_path,
            check_public_headers: false,
            check_system_includes: false,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn build_dir(&self) -> &SourceDir {
        &self.build_dir
    }

    pub fn build_dir_path(&self) -> &Path {
        &self.build_dir_path
    }
}
