use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use buildgen::setup::{Setup, SetupOptions};
use buildgen_test_utils::{TargetDecl, TreeBuilder};

fn three_dir_tree() -> TreeBuilder {
    TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("app", "executable")
                .source("main.cc")
                .dep("//lib:util"),
        )
        .target(
            "lib",
            TargetDecl::new("util", "static_library")
                .source("util.cc")
                .public_dep("//third_party:z"),
        )
        .target(
            "third_party",
            TargetDecl::new("z", "static_library").source("z.cc"),
        )
}

fn make_setup(root: &std::path::Path) -> Setup {
    Setup::new(
        root.to_path_buf(),
        "out",
        SetupOptions {
            threads: Some(2),
            ..Default::default()
        },
    )
    .unwrap()
}

#[test]
fn callback_fires_exactly_once_per_record() {
    let root = three_dir_tree().build();
    let mut setup = make_setup(root.path());

    let counts: Rc<RefCell<BTreeMap<String, usize>>> = Rc::new(RefCell::new(BTreeMap::new()));
    {
        let counts = Rc::clone(&counts);
        setup
            .builder_mut()
            .set_resolved_and_generated_callback(Box::new(move |record| {
                *counts
                    .borrow_mut()
                    .entry(record.label.to_string())
                    .or_default() += 1;
            }));
    }

    setup.run().unwrap();

    let counts = counts.borrow();
    assert_eq!(counts.len(), 3, "{counts:?}");
    assert!(counts.values().all(|&c| c == 1), "{counts:?}");
}

#[test]
fn outputs_are_computed_before_the_callback_fires() {
    let root = TreeBuilder::new()
        .target(
            "",
            TargetDecl::new("gen", "action")
                .script("gen.py")
                .output("gen/out.h"),
        )
        .build();
    let mut setup = make_setup(root.path());

    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        setup
            .builder_mut()
            .set_resolved_and_generated_callback(Box::new(move |record| {
                if let Some(target) = record.target() {
                    seen.borrow_mut().extend(
                        target
                            .computed_outputs
                            .iter()
                            .map(|o| o.value().to_string()),
                    );
                }
            }));
    }

    setup.run().unwrap();
    assert_eq!(seen.borrow().as_slice(), ["gen/out.h"]);
}

#[test]
fn each_description_file_is_parsed_once() {
    // `//lib:util` is referenced from two places and `third_party` from one;
    // each file must still be parsed exactly once.
    let root = three_dir_tree()
        .target(
            "",
            TargetDecl::new("tests", "group").dep("//lib:util"),
        )
        .build();
    let mut setup = make_setup(root.path());

    setup.run().unwrap();
    assert_eq!(
        setup.scheduler().input_file_cache().input_file_count(),
        3,
        "root, lib, third_party"
    );
}

#[test]
fn resolved_targets_are_sorted_and_complete() {
    let root = three_dir_tree().build();
    let mut setup = make_setup(root.path());
    setup.run().unwrap();

    let labels: Vec<String> = setup
        .builder()
        .all_resolved_targets()
        .iter()
        .map(|t| t.label.to_string())
        .collect();
    assert_eq!(labels, ["//:app", "//lib:util", "//third_party:z"]);
}

#[test]
fn dep_edges_carry_frozen_targets() {
    let root = three_dir_tree().build();
    let mut setup = make_setup(root.path());
    setup.run().unwrap();

    let app = setup
        .builder()
        .target(&buildgen::label::Label::new("", "app"))
        .unwrap();
    assert_eq!(app.resolved_deps.len(), 1);
    let util = &app.resolved_deps[0].target;
    assert_eq!(util.label.to_string(), "//lib:util");
    // The dep's own resolution is visible through the edge.
    assert_eq!(util.computed_outputs.len(), 1);
    assert_eq!(util.computed_outputs[0].value(), "obj/lib/libutil.a");
}
