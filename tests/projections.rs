use std::fs;

use buildgen::errors::GenError;
use buildgen::run_gen;
use buildgen_test_utils::{default_gen_args, TargetDecl, TreeBuilder};

fn app_tree() -> TreeBuilder {
    TreeBuilder::new()
        .target(
            "app",
            TargetDecl::new("app", "executable")
                .source("main.cc")
                .dep("//lib:util"),
        )
        .target(
            "lib",
            TargetDecl::new("util", "static_library").source("util.cc"),
        )
        .target(
            "tools",
            TargetDecl::new("helper", "executable").source("helper.cc"),
        )
        .target(
            "",
            TargetDecl::new("everything", "group")
                .dep("//app:app")
                .dep("//tools:helper"),
        )
}

#[test]
fn json_projection_lists_targets_and_honors_filters() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("json".to_string());
    args.filters = Some("//app:*".to_string());
    run_gen(&args).unwrap();

    let json = fs::read_to_string(root.path().join("out/project.json")).unwrap();
    assert!(json.contains("\"//app:app\""));
    // The filter's dependency closure is included...
    assert!(json.contains("\"//lib:util\""));
    // ...but unrelated targets are not.
    assert!(!json.contains("\"//tools:helper\""));
}

#[test]
fn json_file_name_override_is_honored() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("json".to_string());
    args.json_file_name = Some("graph.json".to_string());
    run_gen(&args).unwrap();

    assert!(root.path().join("out/graph.json").is_file());
    assert!(!root.path().join("out/project.json").exists());
}

#[test]
fn compile_commands_cover_binary_sources() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.export_compile_commands = Some(String::new());
    run_gen(&args).unwrap();

    let db = fs::read_to_string(root.path().join("out/compile_commands.json")).unwrap();
    assert!(db.contains("../app/main.cc"));
    assert!(db.contains("../lib/util.cc"));
    assert!(db.contains("-c ../app/main.cc"));
}

#[test]
fn compile_commands_label_list_restricts_scope() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.export_compile_commands = Some("//lib:util".to_string());
    run_gen(&args).unwrap();

    let db = fs::read_to_string(root.path().join("out/compile_commands.json")).unwrap();
    assert!(db.contains("../lib/util.cc"));
    assert!(!db.contains("../app/main.cc"));
}

#[test]
fn vs_projection_writes_solution_and_projects() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("vs2019".to_string());
    args.sln = Some("mybuild".to_string());
    run_gen(&args).unwrap();

    let sln = fs::read_to_string(root.path().join("out/mybuild.sln")).unwrap();
    assert!(sln.contains("\"app\""));
    assert!(root.path().join("out/obj/app/app.vcxproj").is_file());
}

#[test]
fn xcode_rejects_unknown_build_system() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("xcode".to_string());
    args.xcode_build_system = Some("bogus".to_string());

    let err = run_gen(&args).unwrap_err();
    assert_eq!(err.to_string(), "Unknown build system: bogus");
}

#[test]
fn xcode_project_name_defaults_to_all() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("xcode".to_string());
    run_gen(&args).unwrap();

    assert!(root
        .path()
        .join("out/all.xcodeproj/project.pbxproj")
        .is_file());
}

#[test]
fn qtcreator_projection_scopes_to_root_target() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("qtcreator".to_string());
    args.root_target = Some("//app:app".to_string());
    run_gen(&args).unwrap();

    let files = fs::read_to_string(
        root.path()
            .join("out/qtcreator_project/qtcreator_project.files"),
    )
    .unwrap();
    assert!(files.contains("app/main.cc"));
    assert!(files.contains("lib/util.cc"));
    assert!(!files.contains("helper.cc"));
}

#[test]
fn rust_project_is_written_on_request() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.export_rust_project = true;
    run_gen(&args).unwrap();

    let contents = fs::read_to_string(root.path().join("out/rust-project.json")).unwrap();
    assert!(contents.contains("\"crates\""));
}

#[test]
fn eclipse_projection_collects_defines() {
    let root = TreeBuilder::new()
        .raw(
            "",
            r#"
[config.defs]
defines = ["ENABLE_FOO=1"]
include_dirs = ["include"]
"#,
        )
        .target(
            "",
            TargetDecl::new("app", "executable")
                .source("main.cc")
                .config(":defs"),
        )
        .build();

    let mut args = default_gen_args(root.path(), "out");
    args.ide = Some("eclipse".to_string());
    run_gen(&args).unwrap();

    let xml = fs::read_to_string(root.path().join("out/eclipse-cdt-settings.xml")).unwrap();
    assert!(xml.contains("<name>ENABLE_FOO</name><value>1</value>"));
    assert!(xml.contains("includepath"));
}

#[test]
fn bad_check_value_is_an_argument_error() {
    let root = app_tree().build();

    let mut args = default_gen_args(root.path(), "out");
    args.check = Some("everything".to_string());

    match run_gen(&args) {
        Err(GenError::Argument(msg)) => assert!(msg.contains("everything")),
        other => panic!("expected argument error, got {other:?}"),
    }
}
