// src/ide/json.rs

//! Generic JSON projection: dumps the resolved target graph to a JSON file
//! and optionally invokes a post-emit script on it.

use std::fs;
use std::process::Command;

use anyhow::{anyhow, Context};
use serde_json::json;

use crate::errors::Result;
use crate::graph::builder::Builder;
use crate::ide::{filtered_targets, ProjectionOptions};

pub fn write(builder: &Builder, opts: &ProjectionOptions) -> Result<()> {
    let targets = filtered_targets(builder, &opts.filters, true);
    let settings = builder.settings();

    let mut target_map = serde_json::Map::new();
    for target in &targets {
        let deps = |labels: &[crate::label::Label]| -> Vec<String> {
            labels.iter().map(|l| l.to_string()).collect()
        };
        target_map.insert(
            target.label.to_string(),
            json!({
                "type": target.target_type.as_str(),
                "toolchain": target.toolchain,
                "sources": target.sources.iter().map(|s| s.value()).collect::<Vec<_>>(),
                "inputs": target.inputs.iter().map(|s| s.value()).collect::<Vec<_>>(),
                "public_deps": deps(&target.public_dep_labels),
                "deps": deps(&target.private_dep_labels),
                "data_deps": deps(&target.data_dep_labels),
                "outputs": target.computed_outputs.iter().map(|o| o.value()).collect::<Vec<_>>(),
            }),
        );
    }

    let doc = json!({
        "build_settings": {
            "root_path": settings.source_root().display().to_string(),
            "build_dir": settings.build_dir().value(),
            "default_toolchain": builder.default_toolchain(),
        },
        "targets": target_map,
    });

    let file_name = opts.json_file_name.as_deref().unwrap_or("project.json");
    let path = settings.build_dir_path().join(file_name);
    let mut contents = serde_json::to_string_pretty(&doc)
        .with_context(|| "serializing project JSON")?;
    contents.push('\n');
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;

    if let Some(script) = &opts.json_ide_script {
        let script_path = if let Some(abs) = script.strip_prefix("//") {
            settings.source_root().join(abs)
        } else {
            settings.build_dir_path().join(script)
        };
        let mut cmd = Command::new(&script_path);
        cmd.arg(&path);
        if let Some(extra) = &opts.json_ide_script_args {
            cmd.arg(extra);
        }
        let status = cmd
            .status()
            .with_context(|| format!("running {}", script_path.display()))?;
        if !status.success() {
            return Err(anyhow!(
                "JSON IDE script {} exited with {status}",
                script_path.display()
            )
            .into());
        }
    }
    Ok(())
}
