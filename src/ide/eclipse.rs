// src/ide/eclipse.rs

//! Eclipse CDT settings: not a full project, just an importable XML file
//! with one project-wide set of include paths and defines.

use std::collections::BTreeSet;
use std::fs;

use anyhow::Context;

use crate::errors::Result;
use crate::graph::builder::Builder;
use crate::ide::ProjectionOptions;

pub fn write(builder: &Builder, _opts: &ProjectionOptions) -> Result<()> {
    let mut include_dirs: BTreeSet<String> = BTreeSet::new();
    let mut defines: BTreeSet<String> = BTreeSet::new();

    for target in builder.all_resolved_targets() {
        for config in &target.resolved_configs {
            for dir in &config.include_dirs {
                include_dirs.insert(
                    dir.to_disk_path(builder.settings().source_root())
                        .display()
                        .to_string(),
                );
            }
            defines.extend(config.defines.iter().cloned());
        }
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<cdtprojectproperties>\n");
    out.push_str(
        "  <section name=\"org.eclipse.cdt.internal.ui.wizards.settingswizards.IncludePaths\">\n",
    );
    out.push_str("    <language name=\"C++ Source File\">\n");
    for dir in &include_dirs {
        out.push_str(&format!("      <includepath>{dir}</includepath>\n"));
    }
    out.push_str("    </language>\n");
    out.push_str("  </section>\n");
    out.push_str(
        "  <section name=\"org.eclipse.cdt.internal.ui.wizards.settingswizards.Macros\">\n",
    );
    out.push_str("    <language name=\"C++ Source File\">\n");
    for define in &defines {
        let (name, value) = define.split_once('=').unwrap_or((define.as_str(), ""));
        out.push_str(&format!(
            "      <macro><name>{name}</name><value>{value}</value></macro>\n"
        ));
    }
    out.push_str("    </language>\n");
    out.push_str("  </section>\n");
    out.push_str("</cdtprojectproperties>\n");

    let path = builder
        .settings()
        .build_dir_path()
        .join("eclipse-cdt-settings.xml");
    fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
