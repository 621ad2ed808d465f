// crates/test-utils/src/lib.rs

//! Shared helpers for integration tests: builders that write description
//! trees to temp directories, plus canned `gen` argument sets.

pub mod builders;

pub use builders::{TargetDecl, TreeBuilder};

use std::path::Path;

use buildgen::cli::GenArgs;

/// A quiet, four-worker `gen` invocation rooted at `root`. Tests tweak the
/// fields they care about.
pub fn default_gen_args(root: &Path, out_dir: &str) -> GenArgs {
    GenArgs {
        out_dir: out_dir.to_string(),
        root: Some(root.display().to_string()),
        check: None,
        filters: None,
        ide: None,
        sln: None,
        no_deps: false,
        winsdk: None,
        ninja_executable: None,
        ninja_extra_args: None,
        xcode_project: None,
        xcode_build_system: None,
        root_target: None,
        json_file_name: None,
        json_ide_script: None,
        json_ide_script_args: None,
        export_compile_commands: None,
        export_rust_project: false,
        args: None,
        quiet: true,
        unity_stats: false,
        threads: Some(4),
        log_level: None,
    }
}
