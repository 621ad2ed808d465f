// src/ide/vs.rs

//! Visual Studio projection: a solution file plus one minimal project file
//! per selected target. The projects shell out to the downstream executor
//! rather than describing the build natively.

use std::fs;

use anyhow::Context;

use crate::errors::Result;
use crate::graph::builder::Builder;
use crate::ide::{filtered_targets, ProjectionOptions};

#[derive(Debug, Clone, Copy)]
pub enum Version {
    Vs2013,
    Vs2015,
    Vs2017,
    Vs2019,
}

impl Version {
    pub fn from_ide_name(name: &str) -> Self {
        match name {
            "vs2013" => Self::Vs2013,
            "vs2015" => Self::Vs2015,
            "vs2017" => Self::Vs2017,
            _ => Self::Vs2019,
        }
    }

    fn tools_version(self) -> &'static str {
        match self {
            Self::Vs2013 => "12.0",
            Self::Vs2015 => "14.0",
            Self::Vs2017 => "15.0",
            Self::Vs2019 => "16.0",
        }
    }
}

pub fn write(builder: &Builder, opts: &ProjectionOptions, version: Version) -> Result<()> {
    let targets = filtered_targets(builder, &opts.filters, !opts.no_deps);
    let build_dir = builder.settings().build_dir_path();
    let ninja = opts.ninja_executable.as_deref().unwrap_or("ninja");
    let extra_args = opts.ninja_extra_args.as_deref().unwrap_or("");

    let mut sln = String::new();
    sln.push_str("Microsoft Visual Studio Solution File, Format Version 12.00\n");
    sln.push_str(&format!("# buildgen (tools version {})\n", version.tools_version()));

    for target in &targets {
        let project_rel = project_path(target.label.dir(), target.label.name());
        sln.push_str(&format!(
            "Project(\"{{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}}\") = \"{}\", \"{}\", \"{{{}}}\"\nEndProject\n",
            target.label.name(),
            project_rel.replace('/', "\\"),
            project_guid(&target.label.to_string()),
        ));

        let mut proj = String::new();
        proj.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        proj.push_str(&format!(
            "<Project ToolsVersion=\"{}\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n",
            version.tools_version()
        ));
        if let Some(winsdk) = &opts.winsdk {
            proj.push_str(&format!(
                "  <PropertyGroup><WindowsTargetPlatformVersion>{winsdk}</WindowsTargetPlatformVersion></PropertyGroup>\n"
            ));
        }
        proj.push_str("  <ItemGroup>\n");
        for source in &target.sources {
            proj.push_str(&format!(
                "    <ClCompile Include=\"{}\" />\n",
                source.rebase_to(builder.settings().build_dir()).replace('/', "\\")
            ));
        }
        proj.push_str("  </ItemGroup>\n");
        proj.push_str(&format!(
            "  <Target Name=\"Build\"><Exec Command=\"{ninja} {extra_args} {}\" /></Target>\n",
            target.dependency_output()
        ));
        proj.push_str("</Project>\n");

        let proj_path = build_dir.join(&project_rel);
        if let Some(parent) = proj_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&proj_path, proj)
            .with_context(|| format!("writing {}", proj_path.display()))?;
    }

    let sln_name = opts.sln_name.as_deref().unwrap_or("all");
    let sln_path = build_dir.join(format!("{sln_name}.sln"));
    fs::write(&sln_path, sln).with_context(|| format!("writing {}", sln_path.display()))?;
    Ok(())
}

fn project_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        format!("obj/{name}.vcxproj")
    } else {
        format!("obj/{dir}/{name}.vcxproj")
    }
}

/// Stable pseudo-GUID derived from the label so regeneration never churns
/// solution files.
fn project_guid(label: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in label.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let hi = hash;
    let lo = hash.rotate_left(32) ^ 0x9e37_79b9_7f4a_7c15;
    format!(
        "{:08X}-{:04X}-{:04X}-{:04X}-{:012X}",
        (hi >> 32) as u32,
        (hi >> 16) as u16,
        hi as u16,
        (lo >> 48) as u16,
        lo & 0xFFFF_FFFF_FFFF
    )
}
