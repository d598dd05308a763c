// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{CoreError, CoreResult};
use std::mem::size_of;

// Fixed-width integers the kernels' wrapping arithmetic is written against.
const _: () = assert!(size_of::<u8>() == 1);
const _: () = assert!(size_of::<u16>() == 2 && size_of::<i16>() == 2);
const _: () = assert!(size_of::<u32>() == 4 && size_of::<i32>() == 4);

/// Smallest pointer width that can index a full-sized arena.
pub const MIN_POINTER_BYTES: usize = 4;

/// Confirms the host can address the arenas. Only a 16-bit pointer target
/// fails; the fixed-width types are checked at compile time.
pub fn check_data_types() -> CoreResult<()> {
    check_pointer_width(size_of::<usize>())
}

fn check_pointer_width(bytes: usize) -> CoreResult<()> {
    if bytes < MIN_POINTER_BYTES {
        return Err(CoreError::DataTypes(format!(
            "usize is {} bytes, expected at least {}",
            bytes, MIN_POINTER_BYTES
        )));
    }
    tracing::debug!(pointer_bytes = bytes, "data type widths confirmed");
    Ok(())
}
