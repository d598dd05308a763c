// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod controller;
pub mod crc;
pub mod dispatch;
pub mod known;
pub mod list;
pub mod matrix;
pub mod memory;
pub mod platform;
pub mod results;
pub mod state;
pub mod workload;

pub use controller::{Clock, Controller, LineSink, MonotonicClock, Phase, StdoutSink};
pub use results::{Report, Results, Verdict, BENCHMARK_VERSION, RESULT_SCHEMA_VERSION};
pub use workload::{Iterate, Workload};

use picomark_config::Algorithm;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{arena} arena exhausted ({capacity} slots)")]
    ArenaExhausted {
        arena: &'static str,
        capacity: usize,
    },
    #[error("{algorithm} region of {size} bytes is too small")]
    RegionTooSmall { algorithm: Algorithm, size: usize },
    #[error("no algorithms enabled")]
    NoAlgorithms,
    #[error("the list algorithm drives every iteration and cannot be disabled")]
    ListRequired,
    #[error("no benchmark instances to run")]
    NoContexts,
    #[error("unexpected data type widths: {0}")]
    DataTypes(String),
    #[error("controller cannot move from {from} to {to}")]
    InvalidPhase { from: Phase, to: Phase },
}

pub type CoreResult<T> = Result<T, CoreError>;
