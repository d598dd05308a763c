// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Numeric-token state machine kernel.
//!
//! The input is a comma-separated run of integer, decimal, scientific and
//! malformed tokens, terminated by zero bytes. Scanning classifies each
//! token and tallies both final states and transitions.

use crate::crc::crc_u32;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(usize)]
pub enum ScanState {
    Start = 0,
    Invalid = 1,
    S1 = 2,
    S2 = 3,
    Int = 4,
    Float = 5,
    Exponent = 6,
    Scientific = 7,
}

pub const NUM_STATES: usize = 8;

const INT_PATTERNS: [&[u8]; 4] = [b"5012", b"1234", b"-874", b"+122"];
const FLOAT_PATTERNS: [&[u8]; 4] = [b"35.54400", b".1234500", b"-110.700", b"+0.64400"];
const SCI_PATTERNS: [&[u8]; 4] = [b"5.500e+3", b"-.123e-2", b"-87e+832", b"+0.6e-12"];
const ERR_PATTERNS: [&[u8]; 4] = [b"T0.3e-1F", b"-T.T++Tq", b"1T3.4e4z", b"34.0e-T^"];

/// Final-state and transition counters for one or more scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateTally {
    pub finals: [u32; NUM_STATES],
    pub transitions: [u32; NUM_STATES],
}

impl StateTally {
    /// Classifies every token up to the first zero byte.
    pub fn scan(&mut self, buf: &[u8]) {
        let mut pos = 0;
        while byte_at(buf, pos) != 0 {
            let state = next_token(buf, &mut pos, &mut self.transitions);
            self.finals[state as usize] += 1;
        }
    }

    /// Folds finals and transitions pairwise, in state order.
    pub fn fold(&self, crc: u16) -> u16 {
        self.finals
            .iter()
            .zip(&self.transitions)
            .fold(crc, |crc, (&f, &t)| crc_u32(t, crc_u32(f, crc)))
    }
}

/// Positions past the end read as a terminator.
fn byte_at(buf: &[u8], pos: usize) -> u8 {
    buf.get(pos).copied().unwrap_or(0)
}

/// Classifies one token starting at `*pos` and advances past it.
///
/// A comma ends the token and is consumed. Scanning also stops on a zero
/// byte, or right after the byte that made the token invalid.
pub fn next_token(buf: &[u8], pos: &mut usize, transitions: &mut [u32; NUM_STATES]) -> ScanState {
    use ScanState::*;

    let mut state = Start;
    loop {
        let symbol = byte_at(buf, *pos);
        if symbol == 0 || state == Invalid {
            break;
        }
        *pos += 1;
        if symbol == b',' {
            break;
        }

        let digit = symbol.is_ascii_digit();
        match state {
            Start => {
                state = if digit {
                    Int
                } else if symbol == b'+' || symbol == b'-' {
                    S1
                } else if symbol == b'.' {
                    Float
                } else {
                    transitions[Invalid as usize] += 1;
                    Invalid
                };
                transitions[Start as usize] += 1;
            }
            S1 => {
                state = if digit {
                    Int
                } else if symbol == b'.' {
                    Float
                } else {
                    Invalid
                };
                transitions[S1 as usize] += 1;
            }
            Int => {
                if symbol == b'.' {
                    state = Float;
                    transitions[Int as usize] += 1;
                } else if !digit {
                    state = Invalid;
                    transitions[Int as usize] += 1;
                }
            }
            Float => {
                if symbol == b'E' || symbol == b'e' {
                    state = S2;
                    transitions[Float as usize] += 1;
                } else if !digit {
                    state = Invalid;
                    transitions[Float as usize] += 1;
                }
            }
            S2 => {
                state = if symbol == b'+' || symbol == b'-' {
                    Exponent
                } else {
                    Invalid
                };
                transitions[S2 as usize] += 1;
            }
            Exponent => {
                state = if digit { Scientific } else { Invalid };
                transitions[Exponent as usize] += 1;
            }
            Scientific => {
                if !digit {
                    state = Invalid;
                    transitions[Invalid as usize] += 1;
                }
            }
            Invalid => {}
        }
    }
    state
}

/// Fills `buf` with seeded tokens separated by commas, zero-padded to the
/// end. A token is only written when it fits with its comma and at least one
/// terminator byte.
pub fn init_state(buf: &mut [u8], seed: i16) {
    let Some(limit) = buf.len().checked_sub(1) else {
        return;
    };

    let mut seed = seed;
    let mut total = 0usize;
    let mut pattern: &[u8] = &[];
    while total + pattern.len() + 1 < limit {
        if !pattern.is_empty() {
            let end = total + pattern.len();
            buf[total..end].copy_from_slice(pattern);
            buf[end] = b',';
            total = end + 1;
        }
        seed = seed.wrapping_add(1);
        let row = ((seed >> 3) & 0x3) as usize;
        pattern = match seed & 0x7 {
            0..=2 => INT_PATTERNS[row],
            3 | 4 => FLOAT_PATTERNS[row],
            5 | 6 => SCI_PATTERNS[row],
            _ => ERR_PATTERNS[row],
        };
    }
    buf[total..].fill(0);
}

/// XORs every `step`-th byte with `mask`, leaving commas alone.
pub fn xor_stride(buf: &mut [u8], step: usize, mask: u8) {
    for byte in buf.iter_mut().step_by(step.max(1)) {
        if *byte != b',' {
            *byte ^= mask;
        }
    }
}

/// Scans, corrupts with `seed1`, scans again and XORs with `seed2`.
///
/// The second scan accumulates onto the first. The buffer is only restored
/// when both seeds share a low byte.
pub fn bench_state(buf: &mut [u8], seed1: i16, seed2: i16, step: i16, crc: u16) -> u16 {
    let step = usize::try_from(step).unwrap_or(1);
    let mut tally = StateTally::default();

    tally.scan(buf);
    xor_stride(buf, step, seed1 as u8);
    tally.scan(buf);
    xor_stride(buf, step, seed2 as u8);

    tally.fold(crc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &[u8] = b"T0.3e-1F,1234,1234,1234,.1234500,.1234500,-.123e-2,-.123e-2,";

    fn token(input: &[u8]) -> (ScanState, usize, [u32; NUM_STATES]) {
        let mut pos = 0;
        let mut transitions = [0; NUM_STATES];
        let state = next_token(input, &mut pos, &mut transitions);
        (state, pos, transitions)
    }

    #[test]
    fn test_token_table() {
        use ScanState::*;
        let cases: &[(&[u8], ScanState, usize, [u32; 8])] = &[
            (&b"5012"[..], Int, 4, [1, 0, 0, 0, 0, 0, 0, 0]),
            (&b"-874"[..], Int, 4, [1, 0, 1, 0, 0, 0, 0, 0]),
            (&b"35.54400"[..], Float, 8, [1, 0, 0, 0, 1, 0, 0, 0]),
            (&b".1234500"[..], Float, 8, [1, 0, 0, 0, 0, 0, 0, 0]),
            (&b"5.500e+3"[..], Scientific, 8, [1, 0, 0, 1, 1, 1, 1, 0]),
            (&b"+0.6e-12"[..], Scientific, 8, [1, 0, 1, 1, 1, 1, 1, 0]),
            (&b"T0.3e-1F"[..], Invalid, 1, [1, 1, 0, 0, 0, 0, 0, 0]),
            (&b"1T3.4e4z"[..], Invalid, 2, [1, 0, 0, 0, 1, 0, 0, 0]),
            (&b"34.0e-T^"[..], Invalid, 7, [1, 0, 0, 1, 1, 1, 1, 0]),
            (&b"-T.T++Tq"[..], Invalid, 2, [1, 0, 1, 0, 0, 0, 0, 0]),
        ];
        for (input, state, consumed, transitions) in cases {
            let got = token(input);
            assert_eq!(
                got,
                (*state, *consumed, *transitions),
                "token {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_comma_is_consumed() {
        let (state, pos, _) = token(b"12,34");
        assert_eq!(state, ScanState::Int);
        assert_eq!(pos, 3);

        // An empty token still lands in Start.
        let (state, pos, transitions) = token(b",5");
        assert_eq!(state, ScanState::Start);
        assert_eq!(pos, 1);
        assert_eq!(transitions, [0; NUM_STATES]);
    }

    #[test]
    fn test_init_fixture() {
        let mut buf = [0xAAu8; 64];
        init_state(&mut buf, 0x66);
        assert_eq!(&buf[..FIXTURE.len()], FIXTURE);
        assert!(buf[FIXTURE.len()..].iter().all(|&b| b == 0));
        assert_eq!(FIXTURE.len(), 60);
    }

    #[test]
    fn test_init_tiny_buffers() {
        let mut empty: [u8; 0] = [];
        init_state(&mut empty, 0);

        let mut small = [0xffu8; 5];
        init_state(&mut small, 0);
        assert_eq!(small, [0; 5]);
    }

    #[test]
    fn test_scan_fixture() {
        let mut buf = [0u8; 64];
        init_state(&mut buf, 0x66);
        let mut tally = StateTally::default();
        tally.scan(&buf);
        assert_eq!(tally.finals, [1, 2, 0, 0, 3, 2, 0, 2]);
        assert_eq!(tally.transitions, [9, 2, 2, 3, 1, 3, 3, 0]);
    }

    #[test]
    fn test_scan_stops_at_buffer_end() {
        let mut tally = StateTally::default();
        tally.scan(b"12,3.5");
        assert_eq!(tally.finals[ScanState::Int as usize], 1);
        assert_eq!(tally.finals[ScanState::Float as usize], 1);
    }

    #[test]
    fn test_bench_fixture_restores_buffer() {
        let mut buf = [0u8; 64];
        init_state(&mut buf, 0x66);
        let before = buf;

        assert_eq!(bench_state(&mut buf, 0x12, 0x12, 0x22, 0), 0x3f6c);
        assert_eq!(buf, before);
        assert_eq!(bench_state(&mut buf, 0x12, 0x12, 0x22, 0), 0x3f6c);
    }

    #[test]
    fn test_second_scan_accumulates() {
        // A zero mask leaves the buffer alone, so the tally is the single
        // scan doubled.
        let mut buf = [0u8; 64];
        init_state(&mut buf, 0x66);
        let mut single = StateTally::default();
        single.scan(&buf);
        let mut doubled = single;
        for (d, s) in doubled.finals.iter_mut().zip(single.finals) {
            *d += s;
        }
        for (d, s) in doubled.transitions.iter_mut().zip(single.transitions) {
            *d += s;
        }
        assert_eq!(bench_state(&mut buf, 0, 0, 1, 0x55), doubled.fold(0x55));
    }

    #[test]
    fn test_xor_stride_skips_commas() {
        let mut buf = *b"ab,cd,";
        xor_stride(&mut buf, 2, 0x20);
        assert_eq!(&buf, b"Ab,cD,");
        xor_stride(&mut buf, 0, 0x01);
        assert_eq!(&buf, b"@c,bE,");
    }
}
