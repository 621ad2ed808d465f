use std::fs;

use buildgen::errors::GenError;
use buildgen::run_gen;
use buildgen_test_utils::{default_gen_args, TargetDecl, TreeBuilder};

#[test]
fn two_targets_one_dep_emits_rules_in_label_order() {
    let root = TreeBuilder::new()
        .target("", TargetDecl::new("a", "static_library").source("a.cc"))
        .target(
            "",
            TargetDecl::new("b", "executable")
                .source("b.cc")
                .public_dep(":a"),
        )
        .build();

    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let toolchain = fs::read_to_string(root.path().join("out/toolchain_default.ninja")).unwrap();
    let pos_a = toolchain.find("# //:a").expect("rule for //:a");
    let pos_b = toolchain.find("# //:b").expect("rule for //:b");
    assert!(pos_a < pos_b, "rules must be sorted by label");

    let build_ninja = fs::read_to_string(root.path().join("out/build.ninja")).unwrap();
    assert!(build_ninja.contains("subninja toolchain_default.ninja"));
    assert!(build_ninja.contains("default all"));
}

#[test]
fn generated_input_with_private_dep_is_satisfied() {
    let root = TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("gen", "action")
                .script("gen.py")
                .output("gen/out.h"),
        )
        .target(
            "",
            TargetDecl::new("user", "executable")
                .source("main.cc")
                .source("//out/gen/out.h")
                .dep(":gen"),
        )
        .build();

    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let toolchain = fs::read_to_string(root.path().join("out/toolchain_default.ninja")).unwrap();
    assert!(toolchain.contains("build gen/out.h: action"));
}

#[test]
fn generated_input_through_data_deps_only_fails() {
    let root = TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("gen", "action")
                .script("gen.py")
                .output("gen/out.h"),
        )
        .target(
            "",
            TargetDecl::new("user", "executable")
                .source("main.cc")
                .source("//out/gen/out.h")
                .data_dep(":gen"),
        )
        .build();

    match run_gen(&default_gen_args(root.path(), "out")) {
        Err(GenError::GeneratedInputs { count }) => assert_eq!(count, 1),
        other => panic!("expected generated-input failure, got {other:?}"),
    }
}

#[test]
fn generated_input_with_no_generator_fails() {
    let root = TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("user", "executable")
                .source("main.cc")
                .source("//out/gen/out.h"),
        )
        .build();

    match run_gen(&default_gen_args(root.path(), "out")) {
        Err(GenError::GeneratedInputs { count }) => assert_eq!(count, 1),
        other => panic!("expected generated-input failure, got {other:?}"),
    }
}

#[test]
fn dependency_cycle_names_both_labels() {
    let root = TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("a", "static_library")
                .source("a.cc")
                .public_dep(":b"),
        )
        .target(
            "",
            TargetDecl::new("b", "static_library")
                .source("b.cc")
                .public_dep(":a"),
        )
        .build();

    match run_gen(&default_gen_args(root.path(), "out")) {
        Err(GenError::Cycle { labels }) => {
            assert!(labels.contains(&"//:a".to_string()), "{labels:?}");
            assert!(labels.contains(&"//:b".to_string()), "{labels:?}");
        }
        other => panic!("expected cycle error, got {other:?}"),
    }
}

#[test]
fn missing_dependency_names_the_label() {
    let root = TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("b", "executable")
                .source("b.cc")
                .dep("//lib:missing"),
        )
        .target("lib", TargetDecl::new("other", "static_library").source("o.cc"))
        .build();

    match run_gen(&default_gen_args(root.path(), "out")) {
        Err(GenError::MissingTarget {
            label,
            referenced_from,
        }) => {
            assert_eq!(label, "//lib:missing");
            assert_eq!(referenced_from, "//:b");
        }
        other => panic!("expected missing-target error, got {other:?}"),
    }
}

#[test]
fn unknown_ide_is_a_hard_error() {
    let root = TreeBuilder::new()
        .target("", TargetDecl::new("a", "group"))
        .build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("foo".to_string());

    let err = run_gen(&args).unwrap_err();
    assert_eq!(err.to_string(), "Unknown IDE: foo");
}

#[test]
fn empty_build_writes_a_well_formed_aggregate() {
    let root = TreeBuilder::new().build();

    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let build_ninja = fs::read_to_string(root.path().join("out/build.ninja")).unwrap();
    assert!(build_ninja.contains("build all: phony\n"));
    assert!(build_ninja.contains("default all\n"));
    assert!(!root.path().join("out/toolchain_default.ninja").exists());
}

#[test]
fn single_target_build_contains_exactly_that_rule() {
    let root = TreeBuilder::new()
        .target("", TargetDecl::new("only", "executable").source("main.cc"))
        .build();

    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let toolchain = fs::read_to_string(root.path().join("out/toolchain_default.ninja")).unwrap();
    assert_eq!(toolchain.matches("# //").count(), 1);
    assert!(toolchain.contains("# //:only"));
    assert!(toolchain.contains("build only: link obj/only.main.o"));
}

#[test]
fn executable_in_deps_of_binary_is_rejected() {
    let root = TreeBuilder::new()
        .target("", TargetDecl::new("tool", "executable").source("t.cc"))
        .target(
            "",
            TargetDecl::new("lib", "static_library")
                .source("l.cc")
                .dep(":tool"),
        )
        .build();

    match run_gen(&default_gen_args(root.path(), "out")) {
        Err(GenError::DepKind { target, dep, .. }) => {
            assert_eq!(target, "//:lib");
            assert_eq!(dep, "//:tool");
        }
        other => panic!("expected dep-kind error, got {other:?}"),
    }
}

#[test]
fn args_file_defaults_to_empty_and_honors_override() {
    let root = TreeBuilder::new()
        .target("", TargetDecl::new("a", "group"))
        .build();

    run_gen(&default_gen_args(root.path(), "out")).unwrap();
    let args_file = fs::read_to_string(root.path().join("out/args.toml")).unwrap();
    assert!(args_file.starts_with("# Build arguments"));

    let mut args = default_gen_args(root.path(), "out");
    args.args = Some("debug = true".to_string());
    run_gen(&args).unwrap();
    let args_file = fs::read_to_string(root.path().join("out/args.toml")).unwrap();
    assert_eq!(args_file, "debug = true\n");
}

#[test]
fn public_header_check_flags_headers_outside_the_target_dir() {
    let tree = TreeBuilder::new()
        .target(
            "lib",
            TargetDecl::new("util", "static_library")
                .source("util.cc")
                .public_header("//other/util.h"),
        )
        .target("", TargetDecl::new("all", "group").dep("//lib:util"));
    let root = tree.build();

    // Without --check the declaration is accepted.
    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let mut args = default_gen_args(root.path(), "out2");
    args.check = Some(String::new());
    match run_gen(&args) {
        Err(GenError::PublicHeader { target, header }) => {
            assert_eq!(target, "//lib:util");
            assert_eq!(header, "//other/util.h");
        }
        other => panic!("expected public-header error, got {other:?}"),
    }
}

#[test]
fn system_include_check_requires_include_dirs_to_exist() {
    let tree = TreeBuilder::new()
        .raw(
            "",
            r#"
[config.sys]
include_dirs = ["does_not_exist"]
"#,
        )
        .target(
            "",
            TargetDecl::new("app", "executable")
                .source("main.cc")
                .config(":sys"),
        );
    let root = tree.build();

    let mut args = default_gen_args(root.path(), "out");
    args.check = Some("system".to_string());
    match run_gen(&args) {
        Err(GenError::SystemInclude { config, .. }) => assert_eq!(config, "//:sys"),
        other => panic!("expected system-include error, got {other:?}"),
    }
}

#[test]
fn runtime_deps_file_follows_data_deps() {
    let root = TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("assets", "copy")
                .source("logo.png")
                .output("assets/{{source_name_part}}.png"),
        )
        .target(
            "",
            TargetDecl::new("app", "executable")
                .source("main.cc")
                .data_dep(":assets")
                .data("//testdata/fixture.json")
                .write_runtime_deps("app.runtime_deps"),
        )
        .build();

    run_gen(&default_gen_args(root.path(), "out")).unwrap();

    let contents = fs::read_to_string(root.path().join("out/app.runtime_deps")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "app", "own output comes first");
    assert!(lines.contains(&"assets/logo.png"), "{lines:?}");
    assert!(lines.contains(&"//testdata/fixture.json"), "{lines:?}");
}
