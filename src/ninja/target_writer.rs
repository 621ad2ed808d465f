// src/ninja/target_writer.rs

//! Per-target rule synthesis.
//!
//! `write_rule` is a pure function from a resolved target to its rule text.
//! It runs on worker threads and reads only data finalized before the
//! resolved callback fired, so it takes no locks. The post-condition is
//! non-empty rule text for every target type; meta targets (groups, bundles)
//! get a phony rule rather than nothing.

use crate::graph::target::{DepKind, Target, TargetType};
use crate::path::SourceFile;

pub fn write_rule(target: &Target) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n", target.label));

    match target.target_type {
        TargetType::Executable => write_binary(&mut out, target, "link"),
        TargetType::SharedLibrary => write_binary(&mut out, target, "solink"),
        TargetType::StaticLibrary => write_binary(&mut out, target, "alink"),
        TargetType::SourceSet => write_source_set(&mut out, target),
        TargetType::Group | TargetType::BundleData | TargetType::CreateBundle => {
            write_phony(&mut out, target)
        }
        TargetType::Action => write_action(&mut out, target),
        TargetType::ActionForeach => write_action_foreach(&mut out, target),
        TargetType::Copy => write_copy(&mut out, target),
        TargetType::GeneratedFile => write_generated_file(&mut out, target),
    }

    out
}

/// Rebase a source file to the build directory.
fn src(target: &Target, file: &SourceFile) -> String {
    file.rebase_to(target.settings.build_dir())
}

/// Object file path for one source of a binary target.
fn object_path(target: &Target, source: &SourceFile) -> String {
    let dir = target.label.dir();
    let name = target.label.name();
    if dir.is_empty() {
        format!("obj/{name}.{}.o", source.stem())
    } else {
        format!("obj/{dir}/{name}.{}.o", source.stem())
    }
}

/// Compile flags from the target's effective configs: cflags, then defines,
/// then include dirs, each list in config order. Also used by tooling
/// projections that cannot reference ninja variables.
pub fn compile_flags(target: &Target) -> Vec<String> {
    let mut flags = Vec::new();
    for config in &target.resolved_configs {
        flags.extend(config.cflags.iter().cloned());
        flags.extend(config.defines.iter().map(|d| format!("-D{d}")));
        for dir in &config.include_dirs {
            flags.push(format!("-I{}", dir.rebase_to(target.settings.build_dir())));
        }
    }
    flags
}

fn config_flags(target: &Target) -> String {
    compile_flags(target).join(" ")
}

/// Order-only inputs: the dependency output of every non-runtime dep. These
/// sequence generated inputs without rebuilding on every dep change.
fn order_only_deps(target: &Target) -> String {
    let deps: Vec<String> = target
        .deps_of_kind(&[DepKind::Public, DepKind::Private])
        .map(|edge| edge.target.dependency_output())
        .collect();
    if deps.is_empty() {
        String::new()
    } else {
        format!(" || {}", deps.join(" "))
    }
}

fn compile_rule_for(source: &SourceFile) -> &'static str {
    if source.value().ends_with(".c") {
        "cc"
    } else {
        "cxx"
    }
}

fn write_compiles(out: &mut String, target: &Target) -> Vec<String> {
    let extra = config_flags(target);
    let order = order_only_deps(target);
    let mut objects = Vec::new();

    for source in &target.sources {
        let object = object_path(target, source);
        out.push_str(&format!(
            "build {object}: {} {}{order}\n",
            compile_rule_for(source),
            src(target, source)
        ));
        if !extra.is_empty() {
            out.push_str(&format!("  cflags = $cflags {extra}\n"));
        }
        objects.push(object);
    }
    objects
}

fn write_binary(out: &mut String, target: &Target, link_rule: &str) {
    let objects = write_compiles(out, target);

    let mut inputs = objects;
    if link_rule != "alink" {
        // Static archives hold only this target's objects; linked outputs
        // pull in their linkable deps directly.
        for edge in target.deps_of_kind(&[DepKind::Public, DepKind::Private]) {
            if edge.target.target_type.is_linkable() {
                inputs.push(edge.target.dependency_output());
            }
        }
    }

    let output = target
        .computed_outputs
        .first()
        .map(|o| o.value().to_string())
        .unwrap_or_else(|| target.phony_name());
    out.push_str(&format!(
        "build {output}: {link_rule} {}{}\n",
        inputs.join(" "),
        order_only_deps(target)
    ));
}

fn write_source_set(out: &mut String, target: &Target) {
    let objects = write_compiles(out, target);
    let mut inputs = objects;
    for edge in target.deps_of_kind(&[DepKind::Public, DepKind::Private]) {
        inputs.push(edge.target.dependency_output());
    }
    out.push_str(&format!(
        "build {}: phony {}\n",
        target.phony_name(),
        inputs.join(" ")
    ));
}

fn write_phony(out: &mut String, target: &Target) {
    let inputs: Vec<String> = target
        .deps_of_kind(&[DepKind::Public, DepKind::Private])
        .map(|edge| edge.target.dependency_output())
        .collect();
    if inputs.is_empty() {
        out.push_str(&format!("build {}: phony\n", target.phony_name()));
    } else {
        out.push_str(&format!(
            "build {}: phony {}\n",
            target.phony_name(),
            inputs.join(" ")
        ));
    }
}

fn action_cmd(target: &Target, source: Option<&SourceFile>) -> String {
    let script = target
        .script
        .as_ref()
        .map(|s| src(target, s))
        .unwrap_or_else(|| "true".to_string());
    let mut cmd = format!("python3 {script}");
    for arg in &target.script_args {
        let arg = match source {
            Some(source) => arg
                .replace("{{source}}", &src(target, source))
                .replace("{{source_name_part}}", source.stem()),
            None => arg.clone(),
        };
        cmd.push(' ');
        cmd.push_str(&arg);
    }
    cmd
}

/// ` | a b c` when the list is non-empty, nothing otherwise.
fn implicit_section(paths: &[String]) -> String {
    if paths.is_empty() {
        String::new()
    } else {
        format!(" | {}", paths.join(" "))
    }
}

fn write_action(out: &mut String, target: &Target) {
    if target.computed_outputs.is_empty() {
        write_phony(out, target);
        return;
    }

    let outputs: Vec<&str> = target.computed_outputs.iter().map(|o| o.value()).collect();
    let mut implicit: Vec<String> = Vec::new();
    if let Some(script) = &target.script {
        implicit.push(src(target, script));
    }
    implicit.extend(target.sources.iter().map(|s| src(target, s)));
    implicit.extend(target.inputs.iter().map(|s| src(target, s)));

    out.push_str(&format!(
        "build {}: action{}{}\n",
        outputs.join(" "),
        implicit_section(&implicit),
        order_only_deps(target)
    ));
    out.push_str(&format!("  cmd = {}\n", action_cmd(target, None)));
    out.push_str(&format!("  desc = ACTION {}\n", target.label));
}

fn write_action_foreach(out: &mut String, target: &Target) {
    let order = order_only_deps(target);
    for source in &target.sources {
        let outputs: Vec<String> = target
            .declared_outputs
            .iter()
            .map(|p| p.replace("{{source_name_part}}", source.stem()))
            .collect();
        if outputs.is_empty() {
            continue;
        }
        let mut implicit: Vec<String> = Vec::new();
        if let Some(script) = &target.script {
            implicit.push(src(target, script));
        }
        implicit.extend(target.inputs.iter().map(|s| src(target, s)));

        out.push_str(&format!(
            "build {}: action {}{}{order}\n",
            outputs.join(" "),
            src(target, source),
            implicit_section(&implicit)
        ));
        out.push_str(&format!(
            "  cmd = {}\n",
            action_cmd(target, Some(source))
        ));
        out.push_str(&format!("  desc = ACTION {}\n", target.label));
    }
    if target.sources.is_empty() || target.declared_outputs.is_empty() {
        write_phony(out, target);
    }
}

fn write_copy(out: &mut String, target: &Target) {
    let order = order_only_deps(target);
    for source in &target.sources {
        for pattern in &target.declared_outputs {
            let output = pattern.replace("{{source_name_part}}", source.stem());
            out.push_str(&format!(
                "build {output}: copy {}{order}\n",
                src(target, source)
            ));
        }
    }
    if target.sources.is_empty() {
        write_phony(out, target);
    }
}

fn write_generated_file(out: &mut String, target: &Target) {
    let order = order_only_deps(target);
    for output in &target.computed_outputs {
        out.push_str(&format!("build {}: stamp{order}\n", output.value()));
    }
    if target.computed_outputs.is_empty() {
        write_phony(out, target);
    }
}
