// src/lib.rs

pub mod check;
pub mod cli;
pub mod desc;
pub mod errors;
pub mod graph;
pub mod ide;
pub mod label;
pub mod logging;
pub mod ninja;
pub mod path;
pub mod scheduler;
pub mod settings;
pub mod setup;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::cli::{CliArgs, Command, GenArgs};
use crate::errors::{GenError, Result};
use crate::ide::ProjectionOptions;
use crate::label::LabelPattern;
use crate::ninja::{TargetRulePair, TargetWriteInfo};
use crate::setup::{Setup, SetupOptions};

/// High-level entry point used by `main.rs`.
pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Gen(gen) => run_gen(&gen),
    }
}

/// The whole generation pipeline, in order: setup, resolution with rule
/// writing fanned out to workers, the drain barrier, deterministic
/// aggregate emission, runtime-deps files, the generated-input check, and
/// finally the requested auxiliary projections.
pub fn run_gen(args: &GenArgs) -> Result<()> {
    let timer = Instant::now();

    let (check_public_headers, check_system_includes) = parse_check(args.check.as_deref())?;
    let filters = match &args.filters {
        Some(raw) => LabelPattern::parse_list(raw)
            .map_err(|e| GenError::Argument(format!("bad --filters value: {e}")))?,
        None => Vec::new(),
    };

    let source_root = match &args.root {
        Some(root) => PathBuf::from(root),
        None => std::env::current_dir()?,
    };

    let mut setup = Setup::new(
        source_root,
        &args.out_dir,
        SetupOptions {
            check_public_headers,
            check_system_includes,
            build_args: args.args.clone(),
            gen_empty_args: args.args.is_none(),
            threads: args.threads,
        },
    )?;

    // Cause resolution to also write the rule for each target: the resolved
    // callback forwards every target to the scheduler, and workers deposit
    // rule text into the shared collection.
    let write_info = Arc::new(TargetWriteInfo::new());
    {
        let write_info = Arc::clone(&write_info);
        let scheduler = Arc::clone(setup.scheduler());
        setup
            .builder_mut()
            .set_resolved_and_generated_callback(Box::new(move |record| {
                if let Some(target) = record.target() {
                    let target = Arc::clone(target);
                    let write_info = Arc::clone(&write_info);
                    scheduler.schedule(move || {
                        let rule = ninja::target_writer::write_rule(&target);
                        write_info.deposit(target, rule);
                    });
                }
            }));
    }

    // Load, define, resolve; this drives the callbacks above.
    setup.run()?;

    // Barrier: every rule task has deposited before we sort and write.
    setup.scheduler().wait_for_all_work();

    let rules = write_info.take_sorted();
    ninja::writer::check_rules(&rules)?;
    ninja::writer::write_files(setup.builder(), &rules)?;
    ninja::runtime_deps::write_runtime_deps_files(setup.builder())?;

    check::check_generated_inputs(setup.scheduler(), setup.builder())?;

    let projection = projection_options(args, filters);
    if let Some(ide_name) = &args.ide {
        ide::run_ide_writer(ide_name, setup.builder(), &projection)?;
    }
    if let Some(label_filter) = &args.export_compile_commands {
        ide::compile_commands::write(setup.builder(), label_filter, args.quiet)?;
    }
    if args.export_rust_project {
        ide::rust_project::write(setup.builder(), args.quiet)?;
    }

    let targets_collected: usize = rules.values().map(Vec::len).sum();
    info!(
        targets = targets_collected,
        files = setup.scheduler().input_file_cache().input_file_count(),
        "generation finished"
    );

    if !args.quiet {
        if args.unity_stats {
            print_unity_stats(&rules);
        }
        println!(
            "Done. Made {targets_collected} targets from {} files in {}ms",
            setup.scheduler().input_file_cache().input_file_count(),
            timer.elapsed().as_millis()
        );
    }

    Ok(())
}

fn parse_check(check: Option<&str>) -> Result<(bool, bool)> {
    match check {
        None => Ok((false, false)),
        Some("") => Ok((true, false)),
        Some("system") => Ok((true, true)),
        Some(other) => Err(GenError::Argument(format!(
            "unknown --check value '{other}'; expected no value or 'system'"
        ))),
    }
}

fn projection_options(args: &GenArgs, filters: Vec<LabelPattern>) -> ProjectionOptions {
    ProjectionOptions {
        filters,
        quiet: args.quiet,
        sln_name: args.sln.clone(),
        winsdk: args.winsdk.clone(),
        no_deps: args.no_deps,
        ninja_executable: args.ninja_executable.clone(),
        ninja_extra_args: args.ninja_extra_args.clone(),
        xcode_project: args.xcode_project.clone(),
        xcode_build_system: args.xcode_build_system.clone(),
        root_target: args.root_target.clone(),
        json_file_name: args.json_file_name.clone(),
        json_ide_script: args.json_ide_script.clone(),
        json_ide_script_args: args.json_ide_script_args.clone(),
    }
}

/// Unity-build statistics over the collected rules, mirroring the shape of
/// the final summary: which binary targets have unity configured and how
/// many allow it.
fn print_unity_stats(rules: &BTreeMap<String, Vec<TargetRulePair>>) {
    let mut allowed = 0usize;
    let mut disallowed = 0usize;
    let mut not_configured: Vec<&TargetRulePair> = Vec::new();

    for pair in rules.values().flatten() {
        let target = &pair.0;
        if target.is_unity_configured() {
            if target.is_unity_allowed() {
                allowed += 1;
            } else {
                disallowed += 1;
            }
        } else if target.is_binary() {
            not_configured.push(pair);
        }
    }
    not_configured.sort_by_key(|pair| pair.0.sources.len());

    println!("Unity build is not configured in the following targets:");
    for (target, _) in &not_configured {
        println!("  {} ({} sources)", target.label, target.sources.len());
    }
    println!(
        "\nUnity build is not configured in {} targets.",
        not_configured.len()
    );
    println!("Unity build is allowed in {allowed} targets.");
    println!("Unity build is disallowed in {disallowed} targets.\n");
}
