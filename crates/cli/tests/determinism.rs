// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::process::Command;

fn get_picomark_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_picomark"))
}

#[test]
fn test_determinism_smoke() {
    let runs = 3;
    let temp_dir = std::env::temp_dir().join("picomark-determinism-smoke");
    let _ = std::fs::remove_dir_all(&temp_dir); // clean start
    std::fs::create_dir_all(&temp_dir).unwrap();

    let mut results: Vec<serde_json::Value> = Vec::new();

    for i in 0..runs {
        let json_path = temp_dir.join(format!("run_{}.json", i));
        let output = Command::new(get_picomark_bin())
            .args(["--seed1", "0x1234", "--seed2", "-3", "--seed3", "40"])
            .args(["--data-size", "4500", "--iterations", "3", "--min-valid-ms", "0"])
            .arg("--json")
            .arg(&json_path)
            .output()
            .expect("Failed to run picomark");

        assert!(
            output.status.success(),
            "Run {} failed. Exit: {:?}\nStdout: {}\nStderr: {}",
            i,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        let content = std::fs::read_to_string(&json_path).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&content).unwrap();

        // Timing varies between runs; checksums must not.
        let obj = json.as_object_mut().unwrap();
        for key in ["total_ms", "total_secs", "iterations_per_sec"] {
            obj.remove(key);
        }
        results.push(json);
    }

    let first = &results[0];
    assert_eq!(first["verdict"], "unverifiable");
    for (i, res) in results.iter().enumerate().skip(1) {
        assert_eq!(first, res, "Run {} differs from run 0", i);
    }
}
