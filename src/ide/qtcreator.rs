// src/ide/qtcreator.rs

//! QtCreator generic project: flat `.files` and `.includes` lists covering
//! the scoped targets.

use std::collections::BTreeSet;
use std::fs;

use anyhow::Context;

use crate::errors::Result;
use crate::graph::builder::Builder;
use crate::ide::{scoped_targets, ProjectionOptions};

const PROJECT_NAME: &str = "qtcreator_project";

pub fn write(builder: &Builder, opts: &ProjectionOptions) -> Result<()> {
    let targets = scoped_targets(builder, opts.root_target.as_deref())?;
    let source_root = builder.settings().source_root();

    let mut files: BTreeSet<String> = BTreeSet::new();
    let mut includes: BTreeSet<String> = BTreeSet::new();
    for target in &targets {
        for file in target.sources.iter().chain(&target.inputs).chain(&target.public_headers) {
            files.insert(file.to_disk_path(source_root).display().to_string());
        }
        for config in &target.resolved_configs {
            for dir in &config.include_dirs {
                includes.insert(dir.to_disk_path(source_root).display().to_string());
            }
        }
    }

    let project_dir = builder.settings().build_dir_path().join(PROJECT_NAME);
    fs::create_dir_all(&project_dir)
        .with_context(|| format!("creating {}", project_dir.display()))?;

    let mut files_out: String = files.into_iter().collect::<Vec<_>>().join("\n");
    files_out.push('\n');
    let files_path = project_dir.join(format!("{PROJECT_NAME}.files"));
    fs::write(&files_path, files_out)
        .with_context(|| format!("writing {}", files_path.display()))?;

    let mut includes_out: String = includes.into_iter().collect::<Vec<_>>().join("\n");
    includes_out.push('\n');
    let includes_path = project_dir.join(format!("{PROJECT_NAME}.includes"));
    fs::write(&includes_path, includes_out)
        .with_context(|| format!("writing {}", includes_path.display()))?;
    Ok(())
}
