// src/desc/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::graph::target::TargetType;

/// One `BUILD.toml` description file.
///
/// A file describes the directory it lives in:
///
/// ```toml
/// import = ["//lib"]
///
/// [config.warnings]
/// cflags = ["-Wall"]
///
/// [target.app]
/// type = "executable"
/// sources = ["main.cc"]
/// deps = ["//lib:util"]
/// ```
///
/// `[toolchain.<name>]` sections are only honored in the root file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescFile {
    /// Directories whose `BUILD.toml` must also be loaded, e.g. `"//lib"`.
    #[serde(default)]
    pub import: Vec<String>,

    /// Toolchain declarations from `[toolchain.<name>]`, root file only.
    #[serde(default)]
    pub toolchain: BTreeMap<String, ToolchainDecl>,

    /// Configuration records from `[config.<name>]`.
    #[serde(default)]
    pub config: BTreeMap<String, ConfigDecl>,

    /// Target declarations from `[target.<name>]`.
    #[serde(default)]
    pub target: BTreeMap<String, TargetDecl>,
}

/// `[toolchain.<name>]`: the tools and flags used to realize targets.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainDecl {
    #[serde(default = "default_cc")]
    pub cc: String,

    #[serde(default = "default_cxx")]
    pub cxx: String,

    #[serde(default = "default_ar")]
    pub ar: String,

    /// Linker driver; falls back to `cxx` when unset.
    #[serde(default)]
    pub link: Option<String>,

    /// Flags applied to every compile in this toolchain.
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Exactly one declared toolchain must set this.
    #[serde(default)]
    pub default: bool,
}

fn default_cc() -> String {
    "cc".to_string()
}

fn default_cxx() -> String {
    "c++".to_string()
}

fn default_ar() -> String {
    "ar".to_string()
}

/// `[config.<name>]`: a reusable bundle of compile settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDecl {
    #[serde(default)]
    pub cflags: Vec<String>,

    #[serde(default)]
    pub defines: Vec<String>,

    /// Source-absolute or file-relative directories.
    #[serde(default)]
    pub include_dirs: Vec<String>,
}

/// `[target.<name>]`: one target declaration.
///
/// The field set is fixed and typed; there are no free-form keyword
/// arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetDecl {
    #[serde(rename = "type")]
    pub target_type: TargetType,

    /// Compiled/processed files, dir-relative or source-absolute.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Additional files the target consumes.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Public headers. Empty means every header is public.
    #[serde(default)]
    pub public: Vec<String>,

    /// Dependencies visible through this target.
    #[serde(default)]
    pub public_deps: Vec<String>,

    /// Dependencies visible only to this target.
    #[serde(default)]
    pub deps: Vec<String>,

    /// Runtime-only dependencies. These never satisfy a generated-input
    /// requirement.
    #[serde(default)]
    pub data_deps: Vec<String>,

    /// Configs applied to this target, in order.
    #[serde(default)]
    pub configs: Vec<String>,

    /// Configs propagated to direct dependents (and applied here).
    #[serde(default)]
    pub public_configs: Vec<String>,

    /// Declared outputs for action/action_foreach/copy/generated_file
    /// targets, relative to the build directory. `action_foreach` and
    /// `copy` may use `{{source_name_part}}` as a per-source placeholder.
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Script run by action targets.
    #[serde(default)]
    pub script: Option<String>,

    /// Arguments to the action script.
    #[serde(default)]
    pub args: Vec<String>,

    /// Overrides the label name when naming produced artifacts.
    #[serde(default)]
    pub output_name: Option<String>,

    /// Toolchain name; the default toolchain when unset.
    #[serde(default)]
    pub toolchain: Option<String>,

    /// Build-dir-relative path of a runtime-deps file to write for this
    /// target.
    #[serde(default)]
    pub write_runtime_deps: Option<String>,

    /// Unity-build admissibility. Unset means not configured.
    #[serde(default)]
    pub unity_allowed: Option<bool>,

    /// Runtime data files/dirs, recorded verbatim in runtime-deps files.
    #[serde(default)]
    pub data: Vec<String>,
}
