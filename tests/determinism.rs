use std::fs;
use std::path::Path;

use buildgen::run_gen;
use buildgen_test_utils::{default_gen_args, TargetDecl, TreeBuilder};

/// A tree with several directories, configs, an action, and a second
/// toolchain, so the aggregate exercises every emission path.
fn sample_tree() -> TreeBuilder {
    TreeBuilder::new()
        .raw(
            "",
            r#"
[toolchain.default]
cc = "clang"
cxx = "clang++"
cflags = ["-fcolor-diagnostics"]
default = true

[toolchain.alt]
cc = "gcc"
cxx = "g++"
"#,
        )
        .raw(
            "",
            r#"
[config.warnings]
cflags = ["-Wall", "-Wextra"]
defines = ["STRICT"]
include_dirs = ["//include"]
"#,
        )
        .target(
            "base",
            TargetDecl::new("base", "static_library")
                .source("one.cc")
                .source("two.cc")
                .config("//:warnings"),
        )
        .target(
            "base",
            TargetDecl::new("gen_version", "action")
                .script("make_version.py")
                .output("gen/version.h"),
        )
        .target(
            "app",
            TargetDecl::new("app", "executable")
                .source("main.cc")
                .source("//out/gen/version.h")
                .public_dep("//base:base")
                .dep("//base:gen_version"),
        )
        .target(
            "app",
            TargetDecl::new("app_alt", "executable")
                .source("main.cc")
                .toolchain("alt"),
        )
        .target(
            "",
            TargetDecl::new("everything", "group")
                .dep("//app:app")
                .dep("//app:app_alt"),
        )
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
}

#[test]
fn aggregate_files_are_identical_across_worker_counts() {
    let root = sample_tree().build();

    let mut first = default_gen_args(root.path(), "out_a");
    first.threads = Some(1);
    run_gen(&first).unwrap();

    let mut second = default_gen_args(root.path(), "out_b");
    second.threads = Some(8);
    run_gen(&second).unwrap();

    for file in [
        "build.ninja",
        "toolchain_default.ninja",
        "toolchain_alt.ninja",
    ] {
        let a = read(root.path(), &format!("out_a/{file}"));
        let b = read(root.path(), &format!("out_b/{file}"));
        assert_eq!(a, b, "{file} differs between worker counts");
    }
}

#[test]
fn repeated_runs_are_byte_identical() {
    let root = sample_tree().build();

    let args = default_gen_args(root.path(), "out");
    run_gen(&args).unwrap();
    let first = read(root.path(), "out/toolchain_default.ninja");

    run_gen(&args).unwrap();
    let second = read(root.path(), "out/toolchain_default.ninja");
    assert_eq!(first, second);
}

#[test]
fn aggregate_references_every_resolved_target() {
    let root = sample_tree().build();
    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let default_rules = read(root.path(), "out/toolchain_default.ninja");
    let alt_rules = read(root.path(), "out/toolchain_alt.ninja");

    for label in [
        "//:everything",
        "//app:app",
        "//base:base",
        "//base:gen_version",
    ] {
        assert!(
            default_rules.contains(&format!("# {label}\n")),
            "missing rule for {label}"
        );
    }
    assert!(alt_rules.contains("# //app:app_alt\n"));

    // No extras: five targets, five rule headers.
    let headers =
        default_rules.matches("# //").count() + alt_rules.matches("# //").count();
    assert_eq!(headers, 5);
}

#[test]
fn config_flags_reach_compile_lines() {
    let root = sample_tree().build();
    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let rules = read(root.path(), "out/toolchain_default.ninja");
    assert!(
        rules.contains("cflags = $cflags -Wall -Wextra -DSTRICT -I../include"),
        "config flags missing from compile lines:\n{rules}"
    );
}
