// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{CoreError, CoreResult};
use picomark_config::{Algorithm, Algorithms};
use serde::Serialize;

/// Byte range of one algorithm within the configured data size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
}

/// Flat byte storage for the state kernel of one engine instance.
///
/// Sized once from the state region of the [`MemoryPlan`] and never grows.
/// The list and matrix kernels keep their own typed storage; their regions
/// only fix how many nodes and cells they hold.
#[derive(Debug, Clone)]
pub struct Arena {
    data: Vec<u8>,
}

impl Arena {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Splits the configured data size evenly between the enabled algorithms.
///
/// Regions are laid out back to back in list, matrix, state order; each gets
/// `total / enabled` bytes and any remainder stays unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryPlan {
    pub block_size: usize,
    pub list: Option<Region>,
    pub matrix: Option<Region>,
    pub state: Option<Region>,
}

impl MemoryPlan {
    pub fn new(total: usize, algorithms: Algorithms) -> CoreResult<Self> {
        let enabled = algorithms.members();
        if enabled.is_empty() {
            return Err(CoreError::NoAlgorithms);
        }
        let block_size = total / enabled.len();

        let mut plan = Self {
            block_size,
            list: None,
            matrix: None,
            state: None,
        };
        for (slot, algorithm) in enabled.into_iter().enumerate() {
            let region = Some(Region {
                offset: slot * block_size,
                len: block_size,
            });
            match algorithm {
                Algorithm::List => plan.list = region,
                Algorithm::Matrix => plan.matrix = region,
                Algorithm::State => plan.state = region,
            }
        }
        Ok(plan)
    }

    pub fn region(&self, algorithm: Algorithm) -> Option<Region> {
        match algorithm {
            Algorithm::List => self.list,
            Algorithm::Matrix => self.matrix,
            Algorithm::State => self.state,
        }
    }
}

/// Bump-allocated slots addressed by index.
///
/// Slots are handed out by advancing a cursor and never freed. One slot is
/// held back: an allocation fails once the cursor would reach the last one.
#[derive(Debug, Clone)]
pub struct SlotArena<T> {
    slots: Vec<T>,
    capacity: usize,
}

impl<T> SlotArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn alloc(&mut self, value: T) -> Option<usize> {
        if self.slots.len() + 1 >= self.capacity {
            return None;
        }
        self.slots.push(value);
        Some(self.slots.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Two distinct slots at once.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut T, &mut T)> {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return None;
        }
        if a < b {
            let (lo, hi) = self.slots.split_at_mut(b);
            Some((&mut lo[a], &mut hi[0]))
        } else {
            let (lo, hi) = self.slots.split_at_mut(a);
            Some((&mut hi[0], &mut lo[b]))
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_splits_evenly_in_region_order() {
        let plan = MemoryPlan::new(6000, Algorithms::all()).unwrap();
        assert_eq!(plan.block_size, 2000);
        assert_eq!(plan.list, Some(Region { offset: 0, len: 2000 }));
        assert_eq!(
            plan.matrix,
            Some(Region {
                offset: 2000,
                len: 2000
            })
        );
        assert_eq!(
            plan.state,
            Some(Region {
                offset: 4000,
                len: 2000
            })
        );
    }

    #[test]
    fn test_plan_skips_disabled_algorithms() {
        let plan = MemoryPlan::new(2001, Algorithms::LIST | Algorithms::STATE).unwrap();
        assert_eq!(plan.block_size, 1000);
        assert_eq!(plan.matrix, None);
        assert_eq!(
            plan.region(Algorithm::State),
            Some(Region {
                offset: 1000,
                len: 1000
            })
        );

        assert!(matches!(
            MemoryPlan::new(100, Algorithms::empty()),
            Err(CoreError::NoAlgorithms)
        ));
    }

    #[test]
    fn test_arena_is_zeroed_and_fixed() {
        let mut arena = Arena::new(64);
        assert_eq!(arena.len(), 64);
        assert!(arena.as_mut_slice().iter().all(|&b| b == 0));

        arena.as_mut_slice()[60..].copy_from_slice(b"abcd");
        assert_eq!(&arena.as_mut_slice()[60..], b"abcd");
        assert_eq!(arena.len(), 64);
        assert!(Arena::new(0).is_empty());
    }

    #[test]
    fn test_slot_arena_holds_back_last_slot() {
        let mut slots = SlotArena::with_capacity(4);
        assert_eq!(slots.alloc('a'), Some(0));
        assert_eq!(slots.alloc('b'), Some(1));
        assert_eq!(slots.alloc('c'), Some(2));
        assert_eq!(slots.alloc('d'), None);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.capacity(), 4);
    }

    #[test]
    fn test_pair_mut() {
        let mut slots = SlotArena::with_capacity(8);
        for v in 0..4 {
            slots.alloc(v);
        }
        {
            let (a, b) = slots.pair_mut(3, 1).unwrap();
            std::mem::swap(a, b);
        }
        assert_eq!(slots.get(1), Some(&3));
        assert_eq!(slots.get(3), Some(&1));
        assert!(slots.pair_mut(2, 2).is_none());
        assert!(slots.pair_mut(0, 9).is_none());
    }
}
