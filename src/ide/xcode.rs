// src/ide/xcode.rs

//! Xcode projection: a project whose single legacy/external build target
//! invokes the downstream executor.

use std::fs;

use anyhow::Context;

use crate::errors::{GenError, Result};
use crate::graph::builder::Builder;
use crate::ide::{scoped_targets, ProjectionOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSystem {
    Legacy,
    New,
}

impl BuildSystem {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("legacy") => Ok(Self::Legacy),
            Some("new") => Ok(Self::New),
            Some(other) => Err(GenError::UnknownBuildSystem(other.to_string())),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "Original",
            Self::New => "Latest",
        }
    }
}

pub fn write(builder: &Builder, opts: &ProjectionOptions) -> Result<()> {
    let build_system = BuildSystem::parse(opts.xcode_build_system.as_deref())?;
    let targets = scoped_targets(builder, opts.root_target.as_deref())?;

    let project_name = opts.xcode_project.as_deref().unwrap_or("all");
    let ninja = opts.ninja_executable.as_deref().unwrap_or("ninja");
    let extra_args = opts.ninja_extra_args.as_deref().unwrap_or("");
    let build_arg = opts.root_target.as_deref().unwrap_or("");

    let mut out = String::new();
    out.push_str("// !$*UTF8*$!\n{\n");
    out.push_str("\tarchiveVersion = 1;\n\tobjectVersion = 46;\n");
    out.push_str(&format!(
        "\tbuildSystem = \"{}\";\n",
        build_system.as_str()
    ));
    out.push_str(&format!(
        "\tbuildToolPath = \"{ninja}\";\n\tbuildArguments = \"{extra_args} {build_arg}\";\n"
    ));
    out.push_str("\ttargets = (\n");
    for target in &targets {
        out.push_str(&format!("\t\t\"{}\",\n", target.label));
    }
    out.push_str("\t);\n}\n");

    let project_dir = builder
        .settings()
        .build_dir_path()
        .join(format!("{project_name}.xcodeproj"));
    fs::create_dir_all(&project_dir)
        .with_context(|| format!("creating {}", project_dir.display()))?;
    let path = project_dir.join("project.pbxproj");
    fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
