// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Bit-serial CRC-16 accumulator (reflected, polynomial constant 0x4002).
//!
//! Every checksum reported by the engine is folded through these functions.
//! Wider values are folded low byte first.

const POLY: u16 = 0x4002;

/// Folds one byte into `crc`, one bit at a time.
pub fn crc_u8(data: u8, crc: u16) -> u16 {
    let mut data = data;
    let mut crc = crc;
    for _ in 0..8 {
        let x16 = (data & 1) ^ (crc as u8 & 1);
        data >>= 1;

        if x16 == 1 {
            crc ^= POLY;
            crc = (crc >> 1) | 0x8000;
        } else {
            crc = (crc >> 1) & 0x7fff;
        }
    }
    crc
}

pub fn crc_u16(value: u16, crc: u16) -> u16 {
    let crc = crc_u8(value as u8, crc);
    crc_u8((value >> 8) as u8, crc)
}

pub fn crc_i16(value: i16, crc: u16) -> u16 {
    crc_u16(value as u16, crc)
}

pub fn crc_u32(value: u32, crc: u16) -> u16 {
    let crc = crc_i16(value as i16, crc);
    crc_i16((value >> 16) as i16, crc)
}
