// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Linked-list kernel.
//!
//! Nodes and payloads live in two separate [`SlotArena`]s and refer to each
//! other by index. A node owns its `next` link; payloads are only referenced,
//! and `remove`/`undo_remove` swap those references instead of copying data.

use crate::crc::crc_i16;
use crate::dispatch::{ComplexOrder, Evaluator};
use crate::memory::SlotArena;
use crate::{CoreError, CoreResult};
use picomark_config::Algorithm;

/// Abstract footprint of one item: a 16-byte node plus a 4-byte payload.
/// Kept fixed so every host builds a list of the same length.
pub const ITEM_FOOTPRINT: usize = 20;

/// Head, tail and the held-back slot, plus at least one real item.
const MIN_SLOTS: usize = 4;

/// One list payload.
///
/// `idx >= 0` is the original position. `data16` packs several fields:
/// bits 0-6 hold a cached sub-benchmark result, bit 7 flags the cache as
/// valid, bits 0-2 double as the operation selector and the high byte keeps
/// the pattern used to rebuild the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListData {
    pub data16: i16,
    pub idx: i16,
}

impl ListData {
    pub const fn new(data16: i16, idx: i16) -> Self {
        Self { data16, idx }
    }

    /// Copies the high byte of `data16` over the low byte.
    pub fn restore_low_byte(&mut self) {
        let raw = self.data16 as u16;
        self.data16 = ((raw & 0xff00) | (raw >> 8)) as i16;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DataId(usize);

#[derive(Debug, Clone, Copy)]
struct Node {
    next: Option<NodeId>,
    info: DataId,
}

/// Three-way comparison used by [`ListArena::mergesort`].
///
/// Both payloads are passed mutably; comparators are allowed to rewrite them.
pub trait ListComparator {
    fn compare(&mut self, a: &mut ListData, b: &mut ListData) -> i32;
}

/// Orders payloads by `idx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOrder {
    restore: bool,
}

impl IndexOrder {
    /// Compares only.
    pub const fn plain() -> Self {
        Self { restore: false }
    }

    /// Also rebuilds each compared payload's low byte from its high byte,
    /// undoing any cached results.
    pub const fn restoring() -> Self {
        Self { restore: true }
    }
}

impl ListComparator for IndexOrder {
    fn compare(&mut self, a: &mut ListData, b: &mut ListData) -> i32 {
        if self.restore {
            a.restore_low_byte();
            b.restore_low_byte();
        }
        i32::from(a.idx) - i32::from(b.idx)
    }
}

/// Node and payload storage for one list.
#[derive(Debug, Clone)]
pub struct ListArena {
    nodes: SlotArena<Node>,
    payloads: SlotArena<ListData>,
}

impl ListArena {
    pub fn new(slots: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(slots),
            payloads: SlotArena::with_capacity(slots),
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> Node {
        // Handles only come from this arena.
        self.nodes.get(id.0).copied().unwrap_or(Node {
            next: None,
            info: DataId(usize::MAX),
        })
    }

    fn set_next(&mut self, id: NodeId, next: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.next = next;
        }
    }

    fn set_info(&mut self, id: NodeId, info: DataId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.info = info;
        }
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next
    }

    pub fn info(&self, id: NodeId) -> ListData {
        self.payloads
            .get(self.node(id).info.0)
            .copied()
            .unwrap_or_default()
    }

    pub fn info_mut(&mut self, id: NodeId) -> Option<&mut ListData> {
        let info = self.node(id).info;
        self.payloads.get_mut(info.0)
    }

    fn alloc(&mut self, info: ListData) -> CoreResult<NodeId> {
        let capacity = self.capacity();
        let exhausted = |arena| CoreError::ArenaExhausted { arena, capacity };

        if self.nodes.len() + 1 >= capacity {
            return Err(exhausted("list nodes"));
        }
        let data = self
            .payloads
            .alloc(info)
            .ok_or_else(|| exhausted("list payloads"))?;
        let node = self
            .nodes
            .alloc(Node {
                next: None,
                info: DataId(data),
            })
            .ok_or_else(|| exhausted("list nodes"))?;
        Ok(NodeId(node))
    }

    /// Allocates a detached node that starts a new list.
    pub fn push_head(&mut self, info: ListData) -> CoreResult<NodeId> {
        self.alloc(info)
    }

    /// Allocates a node holding a copy of `info` and links it right after
    /// `point`.
    pub fn insert_after(&mut self, point: NodeId, info: ListData) -> CoreResult<NodeId> {
        let item = self.alloc(info)?;
        self.set_next(item, self.next(point));
        self.set_next(point, Some(item));
        Ok(item)
    }

    /// Linear scan from `list`. A non-negative `key.idx` matches on `idx`,
    /// a negative one on the low byte of `data16`.
    pub fn find(&self, list: NodeId, key: &ListData) -> Option<NodeId> {
        let mut cursor = Some(list);
        while let Some(node) = cursor {
            let info = self.info(node);
            let hit = if key.idx >= 0 {
                info.idx == key.idx
            } else {
                (info.data16 & 0xff) == key.data16
            };
            if hit {
                return Some(node);
            }
            cursor = self.next(node);
        }
        None
    }

    /// Reverses the list in place and returns the new first node.
    pub fn reverse(&mut self, list: NodeId) -> NodeId {
        let mut cursor = Some(list);
        let mut reversed = None;
        while let Some(node) = cursor {
            cursor = self.next(node);
            self.set_next(node, reversed);
            reversed = Some(node);
        }
        reversed.unwrap_or(list)
    }

    /// Unlinks the successor of `item` after swapping payloads with it, so
    /// `item` keeps its place but carries the successor's data.
    ///
    /// Returns the unlinked node, or `None` when `item` is the last node.
    pub fn remove(&mut self, item: NodeId) -> Option<NodeId> {
        let removed = self.next(item)?;
        let (kept, taken) = (self.node(item), self.node(removed));
        self.set_info(item, taken.info);
        self.set_info(removed, kept.info);

        self.set_next(item, taken.next);
        self.set_next(removed, None);
        Some(removed)
    }

    /// Exact inverse of [`ListArena::remove`] for the pair it returned.
    pub fn undo_remove(&mut self, removed: NodeId, modified: NodeId) -> NodeId {
        let (gone, kept) = (self.node(removed), self.node(modified));
        self.set_info(removed, kept.info);
        self.set_info(modified, gone.info);

        self.set_next(removed, kept.next);
        self.set_next(modified, Some(removed));
        removed
    }

    fn compare<C: ListComparator + ?Sized>(&mut self, a: NodeId, b: NodeId, cmp: &mut C) -> i32 {
        let (ia, ib) = (self.node(a).info, self.node(b).info);
        match self.payloads.pair_mut(ia.0, ib.0) {
            Some((x, y)) => cmp.compare(x, y),
            None => 0,
        }
    }

    /// Bottom-up merge sort over the links.
    ///
    /// Runs double each pass until a pass performs a single merge. Ties go
    /// to the left run, so the sort is stable.
    pub fn mergesort<C: ListComparator + ?Sized>(&mut self, list: NodeId, cmp: &mut C) -> NodeId {
        let mut head = list;
        let mut insize = 1usize;

        loop {
            let mut p = Some(head);
            let mut merged: Option<NodeId> = None;
            let mut tail: Option<NodeId> = None;
            let mut nmerges = 0;

            while let Some(start) = p {
                nmerges += 1;

                let mut q = Some(start);
                let mut psize = 0usize;
                for _ in 0..insize {
                    psize += 1;
                    q = q.and_then(|n| self.next(n));
                    if q.is_none() {
                        break;
                    }
                }
                let mut qsize = insize;

                loop {
                    let left = p.filter(|_| psize > 0);
                    let right = q.filter(|_| qsize > 0);
                    let take_left = match (left, right) {
                        (Some(l), Some(r)) => self.compare(l, r, cmp) <= 0,
                        (Some(_), None) => true,
                        (None, Some(_)) => false,
                        (None, None) => break,
                    };

                    let e = if take_left {
                        let Some(e) = left else { break };
                        p = self.next(e);
                        psize -= 1;
                        e
                    } else {
                        let Some(e) = right else { break };
                        q = self.next(e);
                        qsize -= 1;
                        e
                    };

                    match tail {
                        Some(t) => self.set_next(t, Some(e)),
                        None => merged = Some(e),
                    }
                    tail = Some(e);
                }

                p = q;
            }

            if let Some(t) = tail {
                self.set_next(t, None);
            }
            head = merged.unwrap_or(head);

            if nmerges <= 1 {
                return head;
            }
            insize *= 2;
        }
    }

    /// Nodes reachable from `list`, in link order.
    pub fn iter(&self, list: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(list), move |&n| self.next(n))
    }

    /// Payloads reachable from `list`, in link order.
    pub fn values(&self, list: NodeId) -> Vec<ListData> {
        self.iter(list).map(|n| self.info(n)).collect()
    }
}

/// Payload of item `i` for a list seeded with `seed`: a 4-bit rebuild
/// pattern and the low three bits of `i`, replicated into both bytes.
pub fn item_data(seed: i16, i: usize) -> i16 {
    let datpat = ((seed as u16) ^ (i as u16)) & 0xf;
    let dat = (datpat << 3) | (i as u16 & 0x7);
    ((dat << 8) | dat) as i16
}

/// Index assigned to the item at position `i` (1-based). The first fifth
/// of the list stays in order; later items get a mixed index whose top bits
/// keep them behind the ordered prefix.
pub fn item_index(seed: i16, i: u32, slots: usize) -> i16 {
    if (i as usize) < slots / 5 {
        i as i16
    } else {
        let pat = (i as u16) ^ (seed as u16);
        let next = i.wrapping_add(1);
        (0x3fff & ((((next & 0x07) << 8) as u16) | pat)) as i16
    }
}

/// A seeded list plus the node every iteration starts from.
#[derive(Debug, Clone)]
pub struct ListBench {
    arena: ListArena,
    head: NodeId,
}

impl ListBench {
    /// Builds the list in a region of `block_size` bytes.
    pub fn init(block_size: usize, seed: i16) -> CoreResult<Self> {
        let slots = (block_size / ITEM_FOOTPRINT)
            .checked_sub(2)
            .filter(|&s| s >= MIN_SLOTS)
            .ok_or(CoreError::RegionTooSmall {
                algorithm: Algorithm::List,
                size: block_size,
            })?;

        let mut arena = ListArena::new(slots);
        let head = arena.push_head(ListData::new(0x8080u16 as i16, 0))?;
        arena.insert_after(head, ListData::new(-1, 0x7fff))?;

        for i in 0..slots - 3 {
            arena.insert_after(head, ListData::new(item_data(seed, i), 0x7fff))?;
        }

        let mut finder = arena.next(head);
        let mut i: u32 = 1;
        while let Some(node) = finder {
            let Some(next) = arena.next(node) else { break };
            if let Some(info) = arena.info_mut(node) {
                info.idx = item_index(seed, i, slots);
            }
            i += 1;
            finder = Some(next);
        }

        let head = arena.mergesort(head, &mut IndexOrder::restoring());
        tracing::debug!(slots, items = slots - 3, "list initialized");
        Ok(Self { arena, head })
    }

    /// One pass of the list benchmark.
    ///
    /// `finder_idx >= 0` looks items up by index, a negative value by data.
    /// The complex sort, and with it every sub-benchmark call, only runs for
    /// a positive `finder_idx`. The list is sorted back by index before
    /// returning.
    pub fn bench<E: Evaluator + ?Sized>(
        &mut self,
        finder_idx: i16,
        find_num: i16,
        eval: &mut E,
    ) -> u16 {
        let arena = &mut self.arena;
        let mut retval: u16 = 0;
        let mut found: u16 = 0;
        let mut missed: u16 = 0;
        let mut list = self.head;
        let mut key = ListData::new(0, finder_idx);

        for i in 0..find_num.max(0) {
            key.data16 = i & 0xff;
            let this_find = arena.find(list, &key);
            list = arena.reverse(list);
            match this_find {
                None => {
                    missed = missed.wrapping_add(1);
                    let second = arena.next(list).map_or(0, |n| arena.info(n).data16);
                    retval = retval.wrapping_add(((second >> 8) & 1) as u16);
                }
                Some(hit) => {
                    found = found.wrapping_add(1);
                    let data = arena.info(hit).data16;
                    if data & 0x1 != 0 {
                        retval = retval.wrapping_add(((data >> 9) & 1) as u16);
                    }
                    // Move the successor of the hit up front.
                    if let Some(finder) = arena.next(hit) {
                        arena.set_next(hit, arena.next(finder));
                        arena.set_next(finder, arena.next(list));
                        arena.set_next(list, Some(finder));
                    }
                }
            }
            if key.idx >= 0 {
                key.idx = key.idx.wrapping_add(1);
            }
        }
        retval = retval.wrapping_add(found.wrapping_mul(4).wrapping_sub(missed));

        if finder_idx > 0 {
            list = arena.mergesort(list, &mut ComplexOrder::new(eval));
        }

        // The list always holds both sentinels and at least one item.
        if let Some(second) = arena.next(list) {
            if let Some(remover) = arena.remove(second) {
                let mut finder = arena.find(list, &key).or_else(|| arena.next(list));
                while let Some(node) = finder {
                    retval = crc_i16(arena.info(list).data16, retval);
                    finder = arena.next(node);
                }
                arena.undo_remove(remover, second);
            }
        }

        list = arena.mergesort(list, &mut IndexOrder::restoring());
        let mut finder = arena.next(list);
        while let Some(node) = finder {
            retval = crc_i16(arena.info(list).data16, retval);
            finder = arena.next(node);
        }
        retval
    }
}
