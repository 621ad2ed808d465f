// src/ide/rust_project.rs

//! `rust-project.json` for rust-analyzer. The target type set here has no
//! Rust variants, so the crate list is always empty; the file still lets
//! tooling probe the build directory uniformly.

use std::fs;
use std::time::Instant;

use anyhow::Context;
use serde_json::json;

use crate::errors::Result;
use crate::graph::builder::Builder;

pub fn write(builder: &Builder, quiet: bool) -> Result<()> {
    let timer = Instant::now();

    let doc = json!({
        "sysroot_src": serde_json::Value::Null,
        "crates": [],
    });

    let path = builder.settings().build_dir_path().join("rust-project.json");
    let mut contents =
        serde_json::to_string_pretty(&doc).with_context(|| "serializing rust-project")?;
    contents.push('\n');
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;

    if !quiet {
        println!(
            "Generating rust-project.json took {}ms",
            timer.elapsed().as_millis()
        );
    }
    Ok(())
}
