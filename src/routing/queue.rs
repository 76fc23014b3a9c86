// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
pub(super) struct QueueItem {
    pub(super) at: i64,
    pub(super) cost: f64,
    score: f64,
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores (and earlier insertions) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue of nodes to expand, popping the lowest score first
/// and breaking ties by insertion order.
#[derive(Debug, Default)]
pub(super) struct Frontier {
    heap: BinaryHeap<QueueItem>,
    pushed: u64,
}

impl Frontier {
    pub(super) fn push(&mut self, at: i64, cost: f64, score: f64) {
        self.heap.push(QueueItem {
            at,
            cost,
            score,
            seq: self.pushed,
        });
        self.pushed += 1;
    }

    pub(super) fn pop(&mut self) -> Option<QueueItem> {
        self.heap.pop()
    }
}
