// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::known::KnownConfig;
use crate::LineSink;
use picomark_config::{Algorithm, Algorithms, Seeds};
use serde::{Serialize, Serializer};

pub const RESULT_SCHEMA_VERSION: &str = "1.0";

/// Version printed on the score line.
pub const BENCHMARK_VERSION: &str = "1.0";

fn hex16<S: Serializer>(value: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{:04x}", value))
}

/// Per-instance results aggregate. Every field is owned by exactly one
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Results {
    pub seeds: Seeds,
    pub block_size: usize,
    #[serde(skip)]
    pub algorithms: Algorithms,
    pub iterations: u32,
    #[serde(rename = "crcfinal", serialize_with = "hex16")]
    pub crc: u16,
    #[serde(serialize_with = "hex16")]
    pub crclist: u16,
    #[serde(serialize_with = "hex16")]
    pub crcmatrix: u16,
    #[serde(serialize_with = "hex16")]
    pub crcstate: u16,
    pub err: u16,
}

impl Results {
    pub fn new(seeds: Seeds, block_size: usize, algorithms: Algorithms) -> Self {
        Self {
            seeds,
            block_size,
            algorithms,
            iterations: 0,
            crc: 0,
            crclist: 0,
            crcmatrix: 0,
            crcstate: 0,
            err: 0,
        }
    }

    pub fn checksum(&self, algorithm: Algorithm) -> u16 {
        match algorithm {
            Algorithm::List => self.crclist,
            Algorithm::Matrix => self.crcmatrix,
            Algorithm::State => self.crcstate,
        }
    }

    pub(crate) fn clear_checksums(&mut self) {
        self.crc = 0;
        self.crclist = 0;
        self.crcmatrix = 0;
        self.crcstate = 0;
    }

    /// Compares the checksums of enabled algorithms against `known`, bumping
    /// `err` once per mismatch.
    pub fn check(&mut self, context: usize, known: &KnownConfig) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();
        for algorithm in self.algorithms.members() {
            let expected = match algorithm {
                Algorithm::List => known.list,
                Algorithm::Matrix => known.matrix,
                Algorithm::State => known.state,
            };
            let computed = self.checksum(algorithm);
            if computed != expected {
                self.err = self.err.saturating_add(1);
                mismatches.push(Mismatch {
                    context,
                    algorithm,
                    computed,
                    expected,
                });
            }
        }
        mismatches
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub context: usize,
    pub algorithm: Algorithm,
    #[serde(serialize_with = "hex16")]
    pub computed: u16,
    #[serde(serialize_with = "hex16")]
    pub expected: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Validated,
    ErrorsDetected,
    Unverifiable,
}

impl Verdict {
    /// Errors win over an unknown configuration.
    pub fn decide(errors: u32, known: bool) -> Self {
        if errors > 0 {
            Verdict::ErrorsDetected
        } else if !known {
            Verdict::Unverifiable
        } else {
            Verdict::Validated
        }
    }
}

/// Final outcome of one controller run, across every context.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: &'static str,
    #[serde(serialize_with = "hex16")]
    pub seed_crc: u16,
    pub known_config: Option<&'static str>,
    /// The known configuration publishes a score for validated runs.
    pub scored: bool,
    pub block_size: usize,
    pub algorithms: Vec<Algorithm>,
    pub contexts: usize,
    pub iterations: u32,
    pub total_ms: u64,
    pub total_secs: f64,
    pub iterations_per_sec: f64,
    pub min_valid_ms: u64,
    pub insufficient_duration: bool,
    pub results: Vec<Results>,
    pub mismatches: Vec<Mismatch>,
    pub errors: u32,
    pub verdict: Verdict,
}

impl Report {
    /// Writes the human-readable report, one line per call.
    pub fn emit(&self, sink: &mut dyn LineSink) {
        match self.known_config {
            Some(label) => sink.emit_line(&format!("{} parameters for picomark.", label)),
            None => sink.emit_line("Unknown parameters for picomark."),
        }
        sink.emit_line(&format!("Size per algorithm : {}", self.block_size));
        sink.emit_line(&format!("Total time (ms)    : {}", self.total_ms));
        sink.emit_line(&format!("Total time (secs)  : {:.6}", self.total_secs));
        sink.emit_line(&format!("Iterations/Sec     : {:.6}", self.iterations_per_sec));
        sink.emit_line(&format!(
            "Iterations         : {}",
            self.iterations as u64 * self.contexts as u64
        ));
        if self.insufficient_duration {
            sink.emit_line(&format!(
                "ERROR! Must execute for at least {} ms for a valid result!",
                self.min_valid_ms
            ));
        }
        sink.emit_line(&format!("seedcrc            : 0x{:04x}", self.seed_crc));

        for (ctx, results) in self.results.iter().enumerate() {
            for algorithm in results.algorithms.members() {
                sink.emit_line(&format!(
                    "[{}]crc{:<15}: 0x{:04x}",
                    ctx,
                    algorithm.name(),
                    results.checksum(algorithm)
                ));
            }
            sink.emit_line(&format!("[{}]crc{:<15}: 0x{:04x}", ctx, "final", results.crc));
        }

        for m in &self.mismatches {
            sink.emit_line(&format!(
                "[{}]ERROR! {} crc 0x{:04x} - should be 0x{:04x}",
                m.context, m.algorithm, m.computed, m.expected
            ));
        }

        match self.verdict {
            Verdict::Validated => {
                sink.emit_line("Correct operation validated.");
                if self.scored {
                    sink.emit_line(&format!(
                        "PicoMark {} : {:.6} / {} context(s)",
                        BENCHMARK_VERSION, self.iterations_per_sec, self.contexts
                    ));
                }
            }
            Verdict::ErrorsDetected => sink.emit_line("Errors detected"),
            Verdict::Unverifiable => sink.emit_line(
                "Cannot validate operation for these seed values, please compare with results on a known platform.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::known::lookup;

    fn sample(algorithms: Algorithms) -> Results {
        let mut r = Results::new(Seeds::VALIDATION, 2000, algorithms);
        r.crclist = 0x3340;
        r.crcmatrix = 0x1199;
        r.crcstate = 0x39bf;
        r.crc = 0x9e66;
        r
    }

    #[test]
    fn test_check_counts_only_enabled_mismatches() {
        let known = lookup(0x7b05).unwrap();
        let mut ok = sample(Algorithms::all());
        assert!(ok.check(0, known).is_empty());
        assert_eq!(ok.err, 0);

        let mut bad = sample(Algorithms::LIST | Algorithms::STATE);
        bad.crcstate = 0x0001;
        bad.crcmatrix = 0xdead;
        let mismatches = bad.check(1, known);
        assert_eq!(
            mismatches,
            vec![Mismatch {
                context: 1,
                algorithm: Algorithm::State,
                computed: 0x0001,
                expected: 0x39bf,
            }]
        );
        assert_eq!(bad.err, 1);
    }

    #[test]
    fn test_verdict() {
        assert_eq!(Verdict::decide(0, true), Verdict::Validated);
        assert_eq!(Verdict::decide(0, false), Verdict::Unverifiable);
        assert_eq!(Verdict::decide(2, true), Verdict::ErrorsDetected);
        assert_eq!(Verdict::decide(1, false), Verdict::ErrorsDetected);
    }

    #[test]
    fn test_report_serializes_checksums_as_hex() {
        let report = Report {
            schema_version: RESULT_SCHEMA_VERSION,
            seed_crc: 0x7b05,
            known_config: Some("6k validation run"),
            scored: false,
            block_size: 2000,
            algorithms: Algorithm::ALL.to_vec(),
            contexts: 1,
            iterations: 10,
            total_ms: 12,
            total_secs: 0.012,
            iterations_per_sec: 833.3,
            min_valid_ms: 0,
            insufficient_duration: false,
            results: vec![sample(Algorithms::all())],
            mismatches: Vec::new(),
            errors: 0,
            verdict: Verdict::Validated,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["seed_crc"], "0x7b05");
        assert_eq!(json["verdict"], "validated");
        assert_eq!(json["results"][0]["crcfinal"], "0x9e66");
        assert_eq!(json["results"][0]["crclist"], "0x3340");
        assert_eq!(json["algorithms"][1], "matrix");

        let mut lines: Vec<String> = Vec::new();
        report.emit(&mut lines);
        assert_eq!(lines[0], "6k validation run parameters for picomark.");
        assert!(lines.contains(&"[0]crclist           : 0x3340".to_string()));
        assert!(lines.contains(&"[0]crcfinal          : 0x9e66".to_string()));
        assert_eq!(lines.last().unwrap(), "Correct operation validated.");

        let scored = Report {
            known_config: Some("2k performance run"),
            scored: true,
            ..report
        };
        let mut lines: Vec<String> = Vec::new();
        scored.emit(&mut lines);
        assert_eq!(lines.last().unwrap(), "PicoMark 1.0 : 833.300000 / 1 context(s)");
    }
}
