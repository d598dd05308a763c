// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! One benchmark instance: its kernels and its results.

use crate::crc::crc_u16;
use crate::dispatch::Evaluator;
use crate::known::seed_crc;
use crate::list::ListBench;
use crate::matrix::MatrixBench;
use crate::memory::{Arena, MemoryPlan};
use crate::results::Results;
use crate::state::{bench_state, init_state};
use crate::{CoreError, CoreResult};
use picomark_config::{Algorithm, Algorithms, RunParams};

/// Anything the controller can time.
pub trait Iterate: Send {
    /// Resets the checksums and runs `iterations` list passes.
    fn iterate(&mut self, iterations: u32);
    fn results(&self) -> &Results;
    fn results_mut(&mut self) -> &mut Results;
}

/// Sub-benchmarks reachable from the list kernel, plus the results they
/// write into.
struct Kernels {
    state: Option<Arena>,
    matrix: Option<MatrixBench>,
    results: Results,
}

impl Evaluator for Kernels {
    fn state(&mut self, step: i16) -> Option<u16> {
        let buf = self.state.as_mut()?.as_mut_slice();
        let seeds = self.results.seeds;
        let crc = bench_state(buf, seeds.seed1, seeds.seed2, step, self.results.crc);
        if self.results.crcstate == 0 {
            self.results.crcstate = crc;
        }
        Some(crc)
    }

    fn matrix(&mut self, scalar: i16) -> Option<u16> {
        let matrix = self.matrix.as_mut()?;
        let crc = matrix.bench(scalar, self.results.crc);
        if self.results.crcmatrix == 0 {
            self.results.crcmatrix = crc;
        }
        Some(crc)
    }

    fn fold(&mut self, value: u16) {
        self.results.crc = crc_u16(value, self.results.crc);
    }
}

pub struct Workload {
    plan: MemoryPlan,
    list: ListBench,
    kernels: Kernels,
}

impl Workload {
    pub fn new(params: &RunParams) -> CoreResult<Self> {
        let plan = MemoryPlan::new(params.data_size, params.algorithms)?;
        if !params.algorithms.contains(Algorithms::LIST) {
            return Err(CoreError::ListRequired);
        }
        let seeds = params.seeds;

        let list = ListBench::init(plan.block_size, seeds.seed1)?;
        let matrix = plan
            .region(Algorithm::Matrix)
            .map(|r| MatrixBench::init(r.len, MatrixBench::mixed_seed(seeds.seed1, seeds.seed2)))
            .transpose()?;
        let state = plan.region(Algorithm::State).map(|r| {
            let mut arena = Arena::new(r.len);
            init_state(arena.as_mut_slice(), seeds.seed1);
            arena
        });

        tracing::debug!(
            block_size = plan.block_size,
            algorithms = ?params.algorithms,
            "workload initialized"
        );
        Ok(Self {
            plan,
            list,
            kernels: Kernels {
                state,
                matrix,
                results: Results::new(seeds, plan.block_size, params.algorithms),
            },
        })
    }

    pub fn seed_crc(&self) -> u16 {
        seed_crc(&self.kernels.results.seeds, self.plan.block_size)
    }

    /// One list pass. Sub-benchmarks run only for a positive `finder_idx`.
    pub fn bench_list(&mut self, finder_idx: i16) -> u16 {
        let find_num = self.kernels.results.seeds.seed3;
        self.list.bench(finder_idx, find_num, &mut self.kernels)
    }

    pub fn list(&self) -> &ListBench {
        &self.list
    }
}

impl Iterate for Workload {
    fn iterate(&mut self, iterations: u32) {
        self.kernels.results.clear_checksums();
        self.kernels.results.iterations = iterations;

        for i in 0..iterations {
            let crc = self.bench_list(1);
            self.kernels.fold(crc);
            let crc = self.bench_list(-1);
            self.kernels.fold(crc);
            if i == 0 {
                self.kernels.results.crclist = self.kernels.results.crc;
            }
        }
    }

    fn results(&self) -> &Results {
        &self.kernels.results
    }

    fn results_mut(&mut self) -> &mut Results {
        &mut self.kernels.results
    }
}
