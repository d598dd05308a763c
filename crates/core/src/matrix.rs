// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Matrix kernel over 16-bit inputs with 32-bit accumulators.
//!
//! All arithmetic wraps: inputs are `i16`, products and sums are `i32`.

use crate::crc::{crc_i16, crc_u16};
use crate::{CoreError, CoreResult};
use picomark_config::Algorithm;

/// Bytes one cell costs across A, B and C.
pub const CELL_FOOTPRINT: usize = 8;

/// Largest `n` with `n * n * CELL_FOOTPRINT < block_size`.
pub fn matrix_dimension(block_size: usize) -> usize {
    let mut i = 0usize;
    let mut j = 0usize;
    while j < block_size {
        i += 1;
        j = i * i * CELL_FOOTPRINT;
    }
    i.saturating_sub(1)
}

fn extract(value: i32, from: u32, bits: u32) -> i32 {
    (value >> from) & !(-1i32 << bits)
}

/// Square matrices A and B plus the result buffer C, all `n * n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixBench {
    n: usize,
    a: Vec<i16>,
    b: Vec<i16>,
    c: Vec<i32>,
}

impl MatrixBench {
    /// Fills A and B from a linear-congruential sequence. A zero seed is
    /// replaced by 1.
    pub fn init(block_size: usize, seed: i32) -> CoreResult<Self> {
        let n = matrix_dimension(block_size);
        if n == 0 {
            return Err(CoreError::RegionTooSmall {
                algorithm: Algorithm::Matrix,
                size: block_size,
            });
        }

        let cells = n * n;
        let mut a = Vec::with_capacity(cells);
        let mut b = Vec::with_capacity(cells);
        let mut seed = if seed == 0 { 1 } else { seed };
        let mut order: i32 = 1;
        for _ in 0..cells {
            seed = order.wrapping_mul(seed) % 65536;
            let val = seed.wrapping_add(order) as i16;
            b.push(val);
            a.push((i32::from(val).wrapping_add(order) & 0xff) as i16);
            order += 1;
        }

        tracing::debug!(n, "matrix initialized");
        Ok(Self {
            n,
            a,
            b,
            c: vec![0; cells],
        })
    }

    /// Seed mixing used by the engine: `seed1` in the low half, `seed2`
    /// shifted into the high half.
    pub fn mixed_seed(seed1: i16, seed2: i16) -> i32 {
        i32::from(seed1) | (i32::from(seed2) << 16)
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn a(&self) -> &[i16] {
        &self.a
    }

    pub fn b(&self) -> &[i16] {
        &self.b
    }

    pub fn add_const(&mut self, val: i16) {
        for x in self.a.iter_mut() {
            *x = x.wrapping_add(val);
        }
    }

    pub fn mul_const(&mut self, val: i16) {
        for (c, &a) in self.c.iter_mut().zip(&self.a) {
            *c = i32::from(a).wrapping_mul(i32::from(val));
        }
    }

    /// Writes `C[i] = sum_j A[i][j] * B[j]` for the first `n` entries only.
    pub fn mul_vect(&mut self) {
        let n = self.n;
        for i in 0..n {
            self.c[i] = (0..n).fold(0i32, |acc, j| {
                acc.wrapping_add(i32::from(self.a[i * n + j]).wrapping_mul(i32::from(self.b[j])))
            });
        }
    }

    pub fn mul_matrix(&mut self) {
        self.product(|a, b| a.wrapping_mul(b));
    }

    /// Matrix product where each term is replaced by two bit fields of the
    /// raw product multiplied together.
    pub fn mul_matrix_bitextract(&mut self) {
        self.product(|a, b| {
            let tmp = a.wrapping_mul(b);
            extract(tmp, 2, 4).wrapping_mul(extract(tmp, 5, 7))
        });
    }

    fn product(&mut self, term: impl Fn(i32, i32) -> i32) {
        let n = self.n;
        for i in 0..n {
            for j in 0..n {
                self.c[i * n + j] = (0..n).fold(0i32, |acc, k| {
                    acc.wrapping_add(term(
                        i32::from(self.a[i * n + k]),
                        i32::from(self.b[k * n + j]),
                    ))
                });
            }
        }
    }

    /// Reduces C to a 16-bit signature: each entry adds one when it is larger
    /// than its predecessor, and each time the running total exceeds `clip`
    /// it adds ten and the total restarts.
    pub fn sum(&self, clip: i16) -> i16 {
        let clip = i32::from(clip);
        let mut tmp: i32 = 0;
        let mut prev: i32 = 0;
        let mut ret: i16 = 0;
        for &cur in &self.c {
            tmp = tmp.wrapping_add(cur);
            if tmp > clip {
                ret = ret.wrapping_add(10);
                tmp = 0;
            } else {
                ret = ret.wrapping_add(i16::from(cur > prev));
            }
            prev = cur;
        }
        ret
    }

    /// Runs every operation with scalar `val` and CRCs the intermediate
    /// sums. A is restored on return.
    pub fn test(&mut self, val: i16) -> u16 {
        let clip = (0xf000u16 as i16) | val;
        let mut crc = 0;

        self.add_const(val);
        self.mul_const(val);
        crc = crc_i16(self.sum(clip), crc);

        self.mul_vect();
        crc = crc_i16(self.sum(clip), crc);

        self.mul_matrix();
        crc = crc_i16(self.sum(clip), crc);

        self.mul_matrix_bitextract();
        crc = crc_i16(self.sum(clip), crc);

        self.add_const(val.wrapping_neg());
        crc
    }

    pub fn bench(&mut self, seed: i16, crc: u16) -> u16 {
        crc_u16(self.test(seed), crc)
    }
}
