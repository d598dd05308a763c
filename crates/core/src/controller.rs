// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Iteration controller: calibrate, measure, validate, report.

use crate::known::{lookup, seed_crc};
use crate::results::{Report, Verdict, RESULT_SCHEMA_VERSION};
use crate::workload::Iterate;
use crate::{CoreError, CoreResult};
use picomark_config::TimingConfig;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Monotonic time source. Only differences between readings are used.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Append-only report output.
pub trait LineSink {
    fn emit_line(&mut self, line: &str);
}

impl LineSink for Vec<String> {
    fn emit_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn emit_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Uncalibrated,
    Calibrating,
    Measuring,
    Validating,
    Reported,
}

impl Phase {
    fn successor(self) -> Option<Phase> {
        match self {
            Phase::Uncalibrated => Some(Phase::Calibrating),
            Phase::Calibrating => Some(Phase::Measuring),
            Phase::Measuring => Some(Phase::Validating),
            Phase::Validating => Some(Phase::Reported),
            Phase::Reported => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uncalibrated => "uncalibrated",
            Phase::Calibrating => "calibrating",
            Phase::Measuring => "measuring",
            Phase::Validating => "validating",
            Phase::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// Scales a calibrated count towards `target_units`. A zero measurement is
/// treated as one unit.
pub fn scale_iterations(iterations: u32, units: u64, target_units: u64) -> u32 {
    let factor = 1 + target_units / units.max(1);
    let scaled = u64::from(iterations).saturating_mul(factor);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

fn elapsed_ms(start: Instant, end: Instant) -> u64 {
    u64::try_from(end.saturating_duration_since(start).as_millis()).unwrap_or(u64::MAX)
}

/// Drives one or more identical instances through a timed run.
///
/// Calibration probes on the first instance only. The measurement runs every
/// instance at once, one thread each, and times the whole batch.
pub struct Controller<W, C> {
    workloads: Vec<W>,
    clock: C,
    timing: TimingConfig,
    iterations: u32,
    phase: Phase,
    elapsed_ms: u64,
}

impl<W: Iterate, C: Clock> Controller<W, C> {
    /// `iterations == 0` asks for calibration.
    pub fn new(workloads: Vec<W>, clock: C, timing: TimingConfig, iterations: u32) -> Self {
        Self {
            workloads,
            clock,
            timing,
            iterations,
            phase: Phase::Uncalibrated,
            elapsed_ms: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn workloads(&self) -> &[W] {
        &self.workloads
    }

    fn advance(&mut self, to: Phase) -> CoreResult<()> {
        if self.phase.successor() != Some(to) {
            return Err(CoreError::InvalidPhase {
                from: self.phase,
                to,
            });
        }
        tracing::info!(from = %self.phase, %to, "controller phase");
        self.phase = to;
        Ok(())
    }

    fn timed(&mut self, iterations: u32) -> u64 {
        let start = self.clock.now();
        run_all(&mut self.workloads, iterations);
        elapsed_ms(start, self.clock.now())
    }

    fn timed_first(&mut self, iterations: u32) -> u64 {
        let start = self.clock.now();
        if let Some(first) = self.workloads.first_mut() {
            first.iterate(iterations);
        }
        elapsed_ms(start, self.clock.now())
    }

    /// Multiplies the count by ten until one probe lasts a full time unit,
    /// then scales it towards the target.
    pub fn calibrate(&mut self) -> CoreResult<u32> {
        self.advance(Phase::Calibrating)?;
        if self.iterations > 0 {
            return Ok(self.iterations);
        }

        let mut iterations: u32 = 1;
        let mut units = 0;
        while units < 1 {
            let next = iterations.saturating_mul(10);
            let saturated = next == iterations;
            iterations = next;

            let ms = self.timed_first(iterations);
            units = ms / self.timing.unit_ms.max(1);
            tracing::debug!(iterations, ms, units, "calibration probe");
            if saturated {
                break;
            }
        }

        self.iterations = scale_iterations(iterations, units, self.timing.target_units);
        tracing::debug!(iterations = self.iterations, "calibrated");
        Ok(self.iterations)
    }

    /// One timed run of every instance.
    pub fn measure(&mut self) -> CoreResult<u64> {
        self.advance(Phase::Measuring)?;
        self.elapsed_ms = self.timed(self.iterations);
        Ok(self.elapsed_ms)
    }

    /// Checks the measured checksums against the known table and builds the
    /// report.
    pub fn validate(&mut self) -> CoreResult<Report> {
        self.advance(Phase::Validating)?;

        let Some(first) = self.workloads.first() else {
            return Err(CoreError::NoContexts);
        };
        let base = *first.results();
        let seed_crc = seed_crc(&base.seeds, base.block_size);
        let known = lookup(seed_crc);

        let mut mismatches = Vec::new();
        match known {
            Some(known) => {
                for (ctx, w) in self.workloads.iter_mut().enumerate() {
                    mismatches.extend(w.results_mut().check(ctx, known));
                }
            }
            None => tracing::warn!(
                seed_crc = %format!("{:#06x}", seed_crc),
                "unknown configuration, checksums cannot be validated"
            ),
        }

        let insufficient_duration = self.elapsed_ms < self.timing.min_valid_ms;
        if insufficient_duration {
            tracing::warn!(
                elapsed_ms = self.elapsed_ms,
                min_valid_ms = self.timing.min_valid_ms,
                "run too short for a valid result"
            );
            if let Some(first) = self.workloads.first_mut() {
                let results = first.results_mut();
                results.err = results.err.saturating_add(1);
            }
        }

        let results: Vec<_> = self.workloads.iter().map(|w| *w.results()).collect();
        let errors = results.iter().map(|r| u32::from(r.err)).sum();
        let contexts = results.len();
        let total_secs = self.elapsed_ms as f64 / 1000.0;
        let iterations_per_sec = if total_secs > 0.0 {
            (contexts as f64 * f64::from(self.iterations)) / total_secs
        } else {
            0.0
        };

        let report = Report {
            schema_version: RESULT_SCHEMA_VERSION,
            seed_crc,
            known_config: known.map(|k| k.name),
            scored: known.is_some_and(|k| k.scored),
            block_size: base.block_size,
            algorithms: base.algorithms.members(),
            contexts,
            iterations: self.iterations,
            total_ms: self.elapsed_ms,
            total_secs,
            iterations_per_sec,
            min_valid_ms: self.timing.min_valid_ms,
            insufficient_duration,
            results,
            mismatches,
            errors,
            verdict: Verdict::decide(errors, known.is_some()),
        };

        self.advance(Phase::Reported)?;
        Ok(report)
    }

    pub fn run(&mut self) -> CoreResult<Report> {
        self.calibrate()?;
        self.measure()?;
        self.validate()
    }
}

fn run_all<W: Iterate>(workloads: &mut [W], iterations: u32) {
    if let [only] = workloads {
        only.iterate(iterations);
        return;
    }
    std::thread::scope(|s| {
        for w in workloads.iter_mut() {
            s.spawn(move || w.iterate(iterations));
        }
    });
}
