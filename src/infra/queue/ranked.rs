//! Priority-ordered queue with stable ties.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::task_queue::{WorkItem, WorkQueue};

/// Heap entry carrying the insertion sequence used as the tie-break.
struct Ranked {
    item: WorkItem,
    inserted: u64,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.item.priority == other.item.priority && self.inserted == other.inserted
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; among equals the earlier insertion wins
        // (reversed for the max-heap).
        self.item
            .priority
            .cmp(&other.item.priority)
            .then_with(|| other.inserted.cmp(&self.inserted))
    }
}

/// Queue that pops the maximum-priority item present; equal priorities
/// resolve by insertion sequence, so ordering is stable regardless of
/// which thread pushed.
pub struct RankedQueue {
    heap: BinaryHeap<Ranked>,
    next_insert: u64,
}

impl RankedQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_insert: 0,
        }
    }
}

impl Default for RankedQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue for RankedQueue {
    fn push(&mut self, item: WorkItem) {
        let inserted = self.next_insert;
        self.next_insert += 1;
        self.heap.push(Ranked { item, inserted });
    }

    fn pop(&mut self) -> Option<WorkItem> {
        self.heap.pop().map(|ranked| ranked.item)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(source: u32, seq: u32, priority: u8) -> WorkItem {
        WorkItem::new(source, seq, priority)
    }

    #[test]
    fn higher_priority_pops_first() {
        let mut q = RankedQueue::new();
        q.push(item(1, 1, 1));
        q.push(item(1, 2, 2));
        q.push(item(1, 3, 0));

        assert_eq!(q.pop().unwrap().priority, 2);
        assert_eq!(q.pop().unwrap().priority, 1);
        assert_eq!(q.pop().unwrap().priority, 0);
        assert!(q.pop().is_none());
    }

    #[test]
    fn equal_priorities_resolve_by_insertion() {
        let mut q = RankedQueue::new();
        // Same priority from different sources, interleaved.
        q.push(item(1, 1, 1));
        q.push(item(2, 1, 1));
        q.push(item(1, 2, 1));

        let order: Vec<(u32, u32)> = std::iter::from_fn(|| q.pop())
            .map(|w| (w.source, w.seq))
            .collect();
        assert_eq!(order, vec![(1, 1), (2, 1), (1, 2)]);
    }

    #[test]
    fn priority_beats_insertion_age() {
        let mut q = RankedQueue::new();
        q.push(item(1, 1, 1));
        q.push(item(1, 2, 1));
        q.push(item(2, 1, 2));

        // The late high-priority arrival jumps the whole backlog.
        let first = q.pop().unwrap();
        assert_eq!((first.source, first.priority), (2, 2));
    }

    #[test]
    fn popped_items_are_gone() {
        let mut q = RankedQueue::new();
        q.push(item(1, 1, 1));
        assert_eq!(q.len(), 1);
        let _ = q.pop();
        assert_eq!(q.len(), 0);
        assert!(q.pop().is_none());
    }
}
