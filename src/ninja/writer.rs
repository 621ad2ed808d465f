// src/ninja/writer.rs

//! Rule collection and aggregate file emission.
//!
//! Workers deposit `(target, rule text)` pairs into `TargetWriteInfo` under
//! one mutex. After the scheduler drains, the driver sorts each toolchain's
//! pairs by target label - the sole guarantor of byte-deterministic output -
//! and writes the per-toolchain files plus the root `build.ninja`.

use std::collections::BTreeMap;
use std::fs;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use tracing::{debug, warn};

use crate::errors::{GenError, Result};
use crate::graph::builder::Builder;
use crate::graph::target::{Target, TargetType, Toolchain};

pub type TargetRulePair = (Arc<Target>, String);

/// Collects rule text for each toolchain. The lock protects the rules.
pub struct TargetWriteInfo {
    rules: Mutex<BTreeMap<String, Vec<TargetRulePair>>>,
}

impl TargetWriteInfo {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(BTreeMap::new()),
        }
    }

    /// Called on worker threads; the lock is held only for the append.
    pub fn deposit(&self, target: Arc<Target>, rule: String) {
        self.lock_rules()
            .entry(target.toolchain.clone())
            .or_default()
            .push((target, rule));
    }

    /// Move the collected rules out and sort each toolchain's pairs by
    /// target label. Call only after the scheduler has drained.
    pub fn take_sorted(&self) -> BTreeMap<String, Vec<TargetRulePair>> {
        let mut rules = mem::take(&mut *self.lock_rules());
        for pairs in rules.values_mut() {
            pairs.sort_by(|a, b| a.0.label.cmp(&b.0.label));
        }
        rules
    }

    /// Deposits are single appends, so the collection behind a poisoned
    /// lock is still consistent; recover and keep going.
    fn lock_rules(&self) -> MutexGuard<'_, BTreeMap<String, Vec<TargetRulePair>>> {
        match self.rules.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("rule collection poisoned; continuing with deposited rules");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for TargetWriteInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Rule writing must not fail silently: every non-group target's rule text
/// is required to be non-empty. Checked on the main thread after the drain.
pub fn check_rules(rules: &BTreeMap<String, Vec<TargetRulePair>>) -> Result<()> {
    for pairs in rules.values() {
        for (target, rule) in pairs {
            if target.target_type != TargetType::Group && rule.trim().is_empty() {
                return Err(GenError::EmptyRule(target.label.to_string()));
            }
        }
    }
    Ok(())
}

/// Write the root aggregate file and one subordinate file per toolchain.
pub fn write_files(
    builder: &Builder,
    rules: &BTreeMap<String, Vec<TargetRulePair>>,
) -> Result<()> {
    let settings = builder.settings();
    let build_dir = settings.build_dir_path();
    fs::create_dir_all(build_dir)
        .with_context(|| format!("creating build directory {}", build_dir.display()))?;

    for (toolchain_name, pairs) in rules {
        let toolchain = builder.toolchains().get(toolchain_name).ok_or_else(|| {
            GenError::Setup(format!("rules deposited for unknown toolchain '{toolchain_name}'"))
        })?;
        let contents = toolchain_file_contents(toolchain, pairs);
        let path = build_dir.join(format!("toolchain_{toolchain_name}.ninja"));
        fs::write(&path, contents)
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(toolchain = %toolchain_name, targets = pairs.len(), "wrote toolchain file");
    }

    let root = root_file_contents(rules);
    let path = build_dir.join("build.ninja");
    fs::write(&path, root).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn toolchain_file_contents(toolchain: &Toolchain, pairs: &[TargetRulePair]) -> String {
    let mut out = String::new();
    out.push_str("# Generated by buildgen. Do not edit.\n\n");
    out.push_str(&format!("cc = {}\n", toolchain.cc));
    out.push_str(&format!("cxx = {}\n", toolchain.cxx));
    out.push_str(&format!("ar = {}\n", toolchain.ar));
    out.push_str(&format!("link = {}\n", toolchain.link));
    out.push_str(&format!("cflags = {}\n", toolchain.cflags.join(" ")));
    out.push('\n');
    out.push_str(RULE_PREAMBLE);
    out.push('\n');

    for (_, rule) in pairs {
        out.push_str(rule);
        out.push('\n');
    }
    out
}

fn root_file_contents(rules: &BTreeMap<String, Vec<TargetRulePair>>) -> String {
    let mut out = String::new();
    out.push_str("# Generated by buildgen. Do not edit.\n\n");
    out.push_str("ninja_required_version = 1.7.2\n\n");

    for toolchain_name in rules.keys() {
        out.push_str(&format!("subninja toolchain_{toolchain_name}.ninja\n"));
    }
    if !rules.is_empty() {
        out.push('\n');
    }

    let entries: Vec<String> = rules
        .values()
        .flatten()
        .map(|(target, _)| target.dependency_output())
        .collect();
    if entries.is_empty() {
        out.push_str("build all: phony\n");
    } else {
        out.push_str(&format!("build all: phony {}\n", entries.join(" ")));
    }
    out.push_str("default all\n");
    out
}

const RULE_PREAMBLE: &str = "\
rule cc
  command = $cc $cflags -c $in -o $out
  description = CC $out
rule cxx
  command = $cxx $cflags -c $in -o $out
  description = CXX $out
rule alink
  command = rm -f $out && $ar rcs $out $in
  description = AR $out
rule solink
  command = $link -shared $in -o $out
  description = SOLINK $out
rule link
  command = $link $in -o $out
  description = LINK $out
rule copy
  command = cp -af $in $out
  description = COPY $out
rule action
  command = $cmd
  description = $desc
rule stamp
  command = touch $out
  description = STAMP $out
";
