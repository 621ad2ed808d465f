// src/ninja/runtime_deps.rs

//! Runtime-deps files: for every target that asks for one, the transitive
//! set of files its artifacts need at runtime, one build-dir-relative path
//! per line. Unlike the generated-input check, the runtime closure follows
//! data_deps - that is what they are for.

use std::collections::BTreeSet;
use std::fs;

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::graph::builder::Builder;
use crate::graph::target::Target;
use crate::label::Label;

pub fn write_runtime_deps_files(builder: &Builder) -> Result<usize> {
    let mut written = 0;
    for target in builder.all_resolved_targets() {
        let Some(output) = &target.write_runtime_deps else {
            continue;
        };
        let lines = runtime_deps_of(&target);
        let path = output.to_disk_path(builder.settings().build_dir_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        debug!(label = %target.label, file = %output, "wrote runtime deps");
        written += 1;
    }
    Ok(written)
}

/// The runtime closure of one target: its own outputs and data, then every
/// dependency's, over all three edge kinds. First occurrence wins, so the
/// result is deterministic in traversal order.
fn runtime_deps_of(target: &Target) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut visited: BTreeSet<Label> = BTreeSet::new();
    let mut lines = Vec::new();
    let mut stack: Vec<&Target> = vec![target];
    visited.insert(target.label.clone());

    while let Some(current) = stack.pop() {
        for output in &current.computed_outputs {
            if seen.insert(output.value().to_string()) {
                lines.push(output.value().to_string());
            }
        }
        for data in &current.data {
            if seen.insert(data.clone()) {
                lines.push(data.clone());
            }
        }
        for edge in &current.resolved_deps {
            if visited.insert(edge.label.clone()) {
                stack.push(&edge.target);
            }
        }
    }
    lines
}
