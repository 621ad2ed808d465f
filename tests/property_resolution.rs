use std::collections::HashSet;
use std::fs;

use proptest::prelude::*;

use buildgen::run_gen;
use buildgen_test_utils::{default_gen_args, TargetDecl, TreeBuilder};

// Strategy for a valid description tree: target N may only depend on
// targets 0..N-1, so the graph is always acyclic.
fn tree_strategy(max_targets: usize) -> impl Strategy<Value = (usize, TreeBuilder)> {
    (1..=max_targets).prop_flat_map(|num_targets| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_targets),
            num_targets,
        );

        deps_strat.prop_map(move |raw_deps| {
            let mut builder = TreeBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let mut decl = TargetDecl::new(&format!("target_{i}"), "static_library")
                    .source(&format!("src_{i}.cc"));

                let mut valid_deps = HashSet::new();
                for dep_idx in potential_deps {
                    if i > 0 {
                        valid_deps.insert(dep_idx % i);
                    }
                }
                let mut valid_deps: Vec<usize> = valid_deps.into_iter().collect();
                valid_deps.sort_unstable();
                for dep_idx in valid_deps {
                    decl = decl.public_dep(&format!(":target_{dep_idx}"));
                }
                builder = builder.target("", decl);
            }
            (num_targets, builder)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    #[ignore]
    fn generation_is_deterministic_for_arbitrary_dags(
        (num_targets, tree) in tree_strategy(10)
    ) {
        let root = tree.build();

        let mut first = default_gen_args(root.path(), "out_a");
        first.threads = Some(1);
        prop_assert!(run_gen(&first).is_ok());

        let mut second = default_gen_args(root.path(), "out_b");
        second.threads = Some(8);
        prop_assert!(run_gen(&second).is_ok());

        let a = fs::read_to_string(root.path().join("out_a/toolchain_default.ninja")).unwrap();
        let b = fs::read_to_string(root.path().join("out_b/toolchain_default.ninja")).unwrap();
        prop_assert_eq!(&a, &b);

        // Every target is represented exactly once, whatever the schedule.
        prop_assert_eq!(a.matches("# //").count(), num_targets);
    }
}
