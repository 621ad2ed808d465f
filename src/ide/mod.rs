// src/ide/mod.rs

//! Auxiliary projection writers: IDE project files, compile_commands.json,
//! and rust-project.json. Each writer is a pure function from the resolved
//! graph and its options to files under the build directory; they run
//! sequentially after generation, and the first failure aborts the rest.

pub mod compile_commands;
pub mod eclipse;
pub mod json;
pub mod qtcreator;
pub mod rust_project;
pub mod vs;
pub mod xcode;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{GenError, Result};
use crate::graph::builder::Builder;
use crate::graph::target::Target;
use crate::label::{matches_any, Label, LabelPattern};

/// Options shared by the auxiliary writers, straight from the command line.
#[derive(Debug, Clone, Default)]
pub struct ProjectionOptions {
    pub filters: Vec<LabelPattern>,
    pub quiet: bool,
    pub sln_name: Option<String>,
    pub winsdk: Option<String>,
    pub no_deps: bool,
    pub ninja_executable: Option<String>,
    pub ninja_extra_args: Option<String>,
    pub xcode_project: Option<String>,
    /// Raw `--xcode-build-system` value; validated by the Xcode writer.
    pub xcode_build_system: Option<String>,
    pub root_target: Option<String>,
    pub json_file_name: Option<String>,
    pub json_ide_script: Option<String>,
    pub json_ide_script_args: Option<String>,
}

/// Dispatch `--ide=<name>`. Unknown names are a hard error.
pub fn run_ide_writer(name: &str, builder: &Builder, opts: &ProjectionOptions) -> Result<()> {
    let timer = Instant::now();
    let what = match name {
        "eclipse" => {
            eclipse::write(builder, opts)?;
            "Eclipse settings"
        }
        "vs" | "vs2013" | "vs2015" | "vs2017" | "vs2019" => {
            vs::write(builder, opts, vs::Version::from_ide_name(name))?;
            "Visual Studio projects"
        }
        "xcode" => {
            xcode::write(builder, opts)?;
            "Xcode projects"
        }
        "qtcreator" => {
            qtcreator::write(builder, opts)?;
            "QtCreator projects"
        }
        "json" => {
            json::write(builder, opts)?;
            "JSON projects"
        }
        other => return Err(GenError::UnknownIde(other.to_string())),
    };

    if !opts.quiet {
        println!("Generating {what} took {}ms", timer.elapsed().as_millis());
    }
    Ok(())
}

/// Targets selected by the filter patterns (all targets when no filters are
/// given), optionally widened to their dependency closure. Returned in
/// label order.
pub(crate) fn filtered_targets(
    builder: &Builder,
    filters: &[LabelPattern],
    include_deps: bool,
) -> Vec<Arc<Target>> {
    let all = builder.all_resolved_targets();
    let mut selected: Vec<Arc<Target>> = all
        .iter()
        .filter(|t| matches_any(filters, &t.label))
        .cloned()
        .collect();

    if include_deps && !filters.is_empty() {
        let mut visited: BTreeSet<Label> =
            selected.iter().map(|t| t.label.clone()).collect();
        let mut stack = selected.clone();
        while let Some(current) = stack.pop() {
            for edge in &current.resolved_deps {
                if visited.insert(edge.label.clone()) {
                    selected.push(Arc::clone(&edge.target));
                    stack.push(Arc::clone(&edge.target));
                }
            }
        }
        selected.sort_by(|a, b| a.label.cmp(&b.label));
    }
    selected
}

/// Closure from a `--root-target` label, or every target when unset.
pub(crate) fn scoped_targets(builder: &Builder, root_target: Option<&str>) -> Result<Vec<Arc<Target>>> {
    let Some(raw) = root_target else {
        return Ok(builder.all_resolved_targets());
    };
    let label = Label::parse(raw, "")?;
    let root = builder.target(&label).ok_or_else(|| GenError::MissingTarget {
        label: label.to_string(),
        referenced_from: "the command line".to_string(),
    })?;

    let mut visited: BTreeSet<Label> = BTreeSet::from([label]);
    let mut out = vec![Arc::clone(root)];
    let mut stack = vec![Arc::clone(root)];
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
