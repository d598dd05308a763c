// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use picomark_config::{Algorithms, RunConfig, Seeds};
use std::path::PathBuf;

fn run_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs/runs")
        .join(name)
}

#[test]
fn test_bundled_run_files_resolve() {
    let cases = [
        ("performance.yaml", Seeds::PERFORMANCE, 6000),
        ("validation.yaml", Seeds::VALIDATION, 6000),
        ("profile.yaml", Seeds::PROFILE, 1200),
    ];
    for (name, seeds, data_size) in cases {
        let params = RunConfig::from_file(run_file(name))
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(params.seeds, seeds, "{}", name);
        assert_eq!(params.data_size, data_size, "{}", name);
        assert_eq!(params.algorithms, Algorithms::all(), "{}", name);
        assert_eq!(params.iterations, 0, "{}", name);
        assert_eq!(params.contexts, 1, "{}", name);
    }
}

#[test]
fn test_shorthand_seeds_in_run_file() {
    let yaml = r#"
seeds:
  seed1: 1
data_size: "6 kB"
"#;
    let params = RunConfig::from_yaml(yaml).unwrap().resolve().unwrap();
    assert_eq!(params.seeds, Seeds::VALIDATION);
    assert_eq!(params.data_size, 6000);
}

#[test]
fn test_partial_timing_keeps_defaults() {
    let yaml = r#"
timing:
  min_valid_ms: 0
"#;
    let params = RunConfig::from_yaml(yaml).unwrap().resolve().unwrap();
    assert_eq!(params.timing.unit_ms, 1000);
    assert_eq!(params.timing.target_units, 10);
    assert_eq!(params.timing.min_valid_ms, 0);
}

#[test]
fn test_unknown_seed_field_is_rejected() {
    let yaml = r#"
seeds:
  seed4: 1
"#;
    assert!(RunConfig::from_yaml(yaml).is_err());
}
