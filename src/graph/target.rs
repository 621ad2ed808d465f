// src/graph/target.rs

use std::sync::Arc;

use serde::Deserialize;

use crate::label::Label;
use crate::path::{OutputFile, SourceDir, SourceFile};
use crate::settings::BuildSettings;

/// What a target produces, mirroring the `type` field of its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Executable,
    SharedLibrary,
    StaticLibrary,
    SourceSet,
    Group,
    Action,
    ActionForeach,
    Copy,
    BundleData,
    CreateBundle,
    GeneratedFile,
}

impl TargetType {
    /// True for targets that compile source code.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Executable | Self::SharedLibrary | Self::StaticLibrary | Self::SourceSet
        )
    }

    /// True for targets other targets can link against.
    pub fn is_linkable(self) -> bool {
        matches!(self, Self::SharedLibrary | Self::StaticLibrary)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Executable => "executable",
            Self::SharedLibrary => "shared_library",
            Self::StaticLibrary => "static_library",
            Self::SourceSet => "source_set",
            Self::Group => "group",
            Self::Action => "action",
            Self::ActionForeach => "action_foreach",
            Self::Copy => "copy",
            Self::BundleData => "bundle_data",
            Self::CreateBundle => "create_bundle",
            Self::GeneratedFile => "generated_file",
        }
    }
}

/// A named configuration identifying the tools and flags used to realize
/// targets. One toolchain is the default.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub name: String,
    pub cc: String,
    pub cxx: String,
    pub ar: String,
    pub link: String,
    pub cflags: Vec<String>,
    pub is_default: bool,
}

impl Toolchain {
    /// The built-in toolchain used when the root file declares none.
    pub fn builtin_default() -> Self {
        Self {
            name: "default".to_string(),
            cc: "cc".to_string(),
            cxx: "c++".to_string(),
            ar: "ar".to_string(),
            link: "c++".to_string(),
            cflags: Vec::new(),
            is_default: true,
        }
    }
}

/// A reusable bundle of compile settings, referenced by label from targets'
/// `configs` / `public_configs` lists.
#[derive(Debug, Clone)]
pub struct Config {
    pub label: Label,
    pub cflags: Vec<String>,
    pub defines: Vec<String>,
    pub include_dirs: Vec<SourceDir>,
}

/// The three dependency edge kinds. They differ in transitive visibility
/// and in whether they satisfy a generated-input requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    Public,
    Private,
    Data,
}

/// A resolved dependency edge. The target reference is frozen: dependencies
/// reach the resolved state before their dependents, so everything behind
/// this pointer is final.
#[derive(Debug, Clone)]
pub struct DepEdge {
    pub label: Label,
    pub kind: DepKind,
    pub target: Arc<Target>,
}

/// A declared build artifact or action.
///
/// Declaration fields are populated when the target's description file is
/// loaded; `computed_outputs`, `resolved_deps`, and `resolved_configs` are
/// filled during resolution and are final once the target reaches the
/// resolved state.
#[derive(Debug)]
pub struct Target {
    pub label: Label,
    pub target_type: TargetType,
    pub dir: SourceDir,
    /// Name of the toolchain this target belongs to.
    pub toolchain: String,
    pub in_default_toolchain: bool,

    pub sources: Vec<SourceFile>,
    pub inputs: Vec<SourceFile>,
    pub public_headers: Vec<SourceFile>,

    pub public_dep_labels: Vec<Label>,
    pub private_dep_labels: Vec<Label>,
    pub data_dep_labels: Vec<Label>,
    pub config_labels: Vec<Label>,
    pub public_config_labels: Vec<Label>,

    /// Outputs as declared for action/copy/generated_file targets, with
    /// `{{source_name_part}}` not yet substituted.
    pub declared_outputs: Vec<String>,
    pub script: Option<SourceFile>,
    pub script_args: Vec<String>,
    pub output_name: Option<String>,
    pub write_runtime_deps: Option<OutputFile>,
    pub data: Vec<String>,
    pub unity_allowed: Option<bool>,

    pub settings: Arc<BuildSettings>,

    // Filled during resolution.
    pub computed_outputs: Vec<OutputFile>,
    pub resolved_deps: Vec<DepEdge>,
    pub resolved_configs: Vec<Arc<Config>>,
}

impl Target {
    pub fn is_binary(&self) -> bool {
        self.target_type.is_binary()
    }

    pub fn is_unity_configured(&self) -> bool {
        self.unity_allowed.is_some()
    }

    pub fn is_unity_allowed(&self) -> bool {
        self.unity_allowed.unwrap_or(false)
    }

    /// The name used for produced artifacts: `output_name` if set, the
    /// label name otherwise.
    pub fn computed_output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(self.label.name())
    }

    /// Ninja phony name for targets with no real output file.
    pub fn phony_name(&self) -> String {
        if self.label.dir().is_empty() {
            format!("phony/{}", self.label.name())
        } else {
            format!("phony/{}/{}", self.label.dir(), self.label.name())
        }
    }

    /// The path other targets use to depend on this one: the first computed
    /// output, or the phony alias when the target produces nothing.
    pub fn dependency_output(&self) -> String {
        self.computed_outputs
            .first()
            .map(|o| o.value().to_string())
            .unwrap_or_else(|| self.phony_name())
    }

    /// Dependency edges of the given kinds, in declaration order.
    pub fn deps_of_kind<'a>(
        &'a self,
        kinds: &'a [DepKind],
    ) -> impl Iterator<Item = &'a DepEdge> + 'a {
        self.resolved_deps
            .iter()
            .filter(move |edge| kinds.contains(&edge.kind))
    }

    /// Finalize `computed_outputs`. For binaries this is the linked
    /// artifact; action-like targets get their declared outputs (with the
    /// per-source placeholder expanded); meta targets produce nothing.
    /// Targets outside the default toolchain write under a toolchain
    /// subdirectory so their outputs never collide with the default ones.
    ///
    /// Object files and phony aliases are deliberately not listed here.
    pub fn compute_outputs(&mut self) {
        let name = self.computed_output_name().to_string();
        let dir = self.label.dir().to_string();
        self.computed_outputs = match self.target_type {
            TargetType::Executable => vec![OutputFile::new(name)],
            TargetType::SharedLibrary => vec![OutputFile::new(format!("lib{name}.so"))],
            TargetType::StaticLibrary => {
                let path = if dir.is_empty() {
                    format!("obj/lib{name}.a")
                } else {
                    format!("obj/{dir}/lib{name}.a")
                };
                vec![OutputFile::new(path)]
            }
            TargetType::SourceSet
            | TargetType::Group
            | TargetType::BundleData
            | TargetType::CreateBundle => Vec::new(),
            TargetType::Action | TargetType::GeneratedFile => self
                .declared_outputs
                .iter()
                .map(OutputFile::new)
                .collect(),
            TargetType::ActionForeach | TargetType::Copy => {
                let mut outputs = Vec::new();
                for source in &self.sources {
                    for pattern in &self.declared_outputs {
                        outputs.push(OutputFile::new(
                            pattern.replace("{{source_name_part}}", source.stem()),
                        ));
                    }
                }
                outputs
            }
        };

        if !self.in_default_toolchain {
            let toolchain = self.toolchain.clone();
            self.computed_outputs = self
                .computed_outputs
                .iter()
                .map(|o| OutputFile::new(format!("{toolchain}/{o}")))
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_and_linkable_classification() {
        assert!(TargetType::SourceSet.is_binary());
        assert!(!TargetType::SourceSet.is_linkable());
        assert!(TargetType::StaticLibrary.is_linkable());
        assert!(!TargetType::Action.is_binary());
        assert!(!TargetType::Group.is_binary());
    }
}
