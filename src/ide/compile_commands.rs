// src/ide/compile_commands.rs

//! `compile_commands.json`: one command object per compiled translation
//! unit, for Clang-based tooling.

use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use serde_json::json;

use crate::errors::Result;
use crate::graph::builder::Builder;
use crate::graph::target::Target;
use crate::label::Label;

/// `label_filter` is the raw `--export-compile-commands` value: empty means
/// every target, otherwise a comma-separated label list whose dependency
/// closures bound the output.
pub fn write(builder: &Builder, label_filter: &str, quiet: bool) -> Result<()> {
    let timer = Instant::now();
    let targets = selected_targets(builder, label_filter)?;
    let settings = builder.settings();
    let build_dir = settings.build_dir_path().display().to_string();

    let mut entries = Vec::new();
    for target in &targets {
        if !target.is_binary() {
            continue;
        }
        let Some(toolchain) = builder.toolchains().get(&target.toolchain) else {
            continue;
        };
        let mut flags = toolchain.cflags.clone();
        flags.extend(crate::ninja::target_writer::compile_flags(target));
        for source in &target.sources {
            let file = source.rebase_to(settings.build_dir());
            let compiler = if source.value().ends_with(".c") {
                &toolchain.cc
            } else {
                &toolchain.cxx
            };
            let mut command = vec![compiler.clone()];
            command.extend(flags.iter().cloned());
            command.push("-c".to_string());
            command.push(file.clone());
            entries.push(json!({
                "directory": build_dir,
                "file": file,
                "command": command.join(" "),
            }));
        }
    }

    let path = settings.build_dir_path().join("compile_commands.json");
    let mut contents = serde_json::to_string_pretty(&entries)
        .with_context(|| "serializing compile commands")?;
    contents.push('\n');
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;

    if !quiet {
        println!(
            "Generating compile_commands took {}ms",
            timer.elapsed().as_millis()
        );
    }
    Ok(())
}

fn selected_targets(builder: &Builder, label_filter: &str) -> Result<Vec<Arc<Target>>> {
    if label_filter.trim().is_empty() {
        return Ok(builder.all_resolved_targets());
    }

    let mut visited: BTreeSet<Label> = BTreeSet::new();
    let mut out: Vec<Arc<Target>> = Vec::new();
    let mut stack: Vec<Arc<Target>> = Vec::new();

    for raw in label_filter.split(',').filter(|s| !s.trim().is_empty()) {
        let label = Label::parse(raw.trim(), "")?;
        if let Some(target) = builder.target(&label) {
            if visited.insert(label) {
                out.push(Arc::clone(target));
                stack.push(Arc::clone(target));
            }
        }
    }
    while let Some(current) = stack.pop() {
        for edge in &current.resolved_deps {
            if visited.insert(edge.label.clone()) {
                out.push(Arc::clone(&edge.target));
                stack.push(Arc::clone(&edge.target));
            }
        }
    }
    out.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(out)
}
