// src/check.rs

//! Post-resolution validation of the generated-input invariant.
//!
//! During resolution the builder records every file that is claimed as a
//! source or input, lies inside the build directory, and is not produced by
//! any target reachable over public/private dependency edges. Once the
//! scheduler drains, this module turns those records into diagnostics. All
//! violations are reported in one batch so users see the full set at once.

use std::sync::Arc;

use crate::errors::{GenError, Result};
use crate::graph::builder::Builder;
use crate::graph::target::Target;
use crate::path::{OutputFile, SourceFile};
use crate::scheduler::Scheduler;

pub fn check_generated_inputs(scheduler: &Scheduler, builder: &Builder) -> Result<()> {
    let unknown = scheduler.unknown_generated_inputs();
    if unknown.is_empty() {
        return Ok(());
    }

    let all_targets = builder.all_resolved_targets();
    let mut report = String::new();
    let mut errors_found = 0;

    for (file, claimants) in &unknown {
        errors_found += 1;
        let generator = find_target_that_generates(&all_targets, builder, file);
        report.push_str(&format_invalid_generated_input(file, claimants, generator));
        report.push('\n');
    }

    report.push_str(
        "If you have generated inputs, there needs to be a dependency path between the\n\
         two targets in addition to just listing the files. For indirect dependencies,\n\
         the intermediate ones should be public_deps. data_deps don't count since\n\
         they're only runtime dependencies.\n",
    );
    if errors_found > 1 {
        report.push_str(&format!("\n{errors_found} generated input errors found.\n"));
    }
    eprint!("{report}");

    Err(GenError::GeneratedInputs {
        count: errors_found,
    })
}

/// The target generating `file`, or `None` if nothing in the build does.
/// Brute force: this only runs on the error path, so performance does not
/// matter. At most one generator is expected; the first match suffices.
fn find_target_that_generates<'a>(
    targets: &'a [Arc<Target>],
    builder: &Builder,
    file: &SourceFile,
) -> Option<&'a Arc<Target>> {
    let output = OutputFile::from_source_file(builder.settings().build_dir(), file)?;
    targets
        .iter()
        .find(|t| t.computed_outputs.contains(&output))
}

fn format_invalid_generated_input(
    file: &SourceFile,
    claimants: &[Arc<Target>],
    generator: Option<&Arc<Target>>,
) -> String {
    // Toolchain suffixes are confusing; only show them when something
    // involved is outside the default toolchain.
    let show_toolchains = claimants
        .iter()
        .any(|t| !t.in_default_toolchain)
        || generator.is_some_and(|t| !t.in_default_toolchain);

    let target_str = if claimants.len() > 1 {
        "targets"
    } else {
        "target"
    };

    let mut err = format!("ERROR: Input to {target_str} not generated by a dependency.\n");
    err.push_str("The file:\n");
    err.push_str(&format!("  {file}\n"));
    err.push_str(&format!(
        "is listed as an input or source for the {target_str}:\n"
    ));
    for target in claimants {
        err.push_str(&format!(
            "  {}\n",
            target.label.to_user_string(show_toolchains, &target.toolchain)
        ));
    }

    match generator {
        Some(generator) => {
            err.push_str(&format!(
                "but this file was not generated by any dependencies of the {target_str}. \
                 The target\nthat generates the file is:\n  {}\n",
                generator
                    .label
                    .to_user_string(show_toolchains, &generator.toolchain)
            ));
        }
        None => {
            err.push_str("but no targets in the build generate that file.\n");
        }
    }
    err
}
