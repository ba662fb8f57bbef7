//! Five-level priority queue set feeding the scheduler
//!
//! Critical through Low are always eligible; Idle is only scanned while the
//! idle detector reports a quiet user. Within a level, strict FIFO.

use std::collections::VecDeque;
use std::time::Instant;

use crate::asset::{AssetDescriptor, Priority};

/// A pending load request.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub descriptor: AssetDescriptor,
    pub priority: Priority,
    pub enqueued_at: Instant,
}

impl QueueEntry {
    pub fn new(descriptor: AssetDescriptor, priority: Priority) -> Self {
        Self {
            descriptor,
            priority,
            enqueued_at: Instant::now(),
        }
    }
}

/// One FIFO queue per priority level.
#[derive(Debug, Default)]
pub struct PriorityQueueSet {
    queues: [VecDeque<QueueEntry>; 5],
}

impl PriorityQueueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to its level's queue.
    pub fn push(&mut self, entry: QueueEntry) {
        self.queues[entry.priority.index()].push_back(entry);
    }

    /// Pop the next entry in strict priority order.
    ///
    /// The Idle queue is only considered when `idle` is true; idle work waits
    /// indefinitely otherwise. That starvation is intentional.
    pub fn pop_next(&mut self, idle: bool) -> Option<QueueEntry> {
        for priority in Priority::LEVELS {
            if priority == Priority::Idle && !idle {
                continue;
            }
            if let Some(entry) = self.queues[priority.index()].pop_front() {
                return Some(entry);
            }
        }
        None
    }

    /// Whether any queue holds an entry for the given asset id.
    pub fn contains(&self, asset_id: &str) -> bool {
        self.queues
            .iter()
            .any(|q| q.iter().any(|e| e.descriptor.id == asset_id))
    }

    /// Per-level lengths, Critical first.
    pub fn len_by_priority(&self) -> [usize; 5] {
        [
            self.queues[0].len(),
            self.queues[1].len(),
            self.queues[2].len(),
            self.queues[3].len(),
            self.queues[4].len(),
        ]
    }

    pub fn total_len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    pub fn clear(&mut self) {
        for q in &mut self.queues {
            q.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetCategory;

    fn entry(id: &str, priority: Priority) -> QueueEntry {
        QueueEntry::new(
            AssetDescriptor::new(id, AssetCategory::Other, format!("{id}.bin"), "bin"),
            priority,
        )
    }

    #[test]
    fn test_fifo_within_level() {
        let mut set = PriorityQueueSet::new();
        set.push(entry("a", Priority::Medium));
        set.push(entry("b", Priority::Medium));

        assert_eq!(set.pop_next(false).unwrap().descriptor.id, "a");
        assert_eq!(set.pop_next(false).unwrap().descriptor.id, "b");
        assert!(set.pop_next(false).is_none());
    }

    #[test]
    fn test_priority_preempts_enqueue_order() {
        let mut set = PriorityQueueSet::new();
        set.push(entry("tex1", Priority::Medium));
        set.push(entry("modelA", Priority::Critical));

        assert_eq!(set.pop_next(false).unwrap().descriptor.id, "modelA");
        assert_eq!(set.pop_next(false).unwrap().descriptor.id, "tex1");
    }

    #[test]
    fn test_idle_queue_gated() {
        let mut set = PriorityQueueSet::new();
        set.push(entry("bg", Priority::Idle));

        assert!(set.pop_next(false).is_none());
        assert_eq!(set.pop_next(true).unwrap().descriptor.id, "bg");
    }

    #[test]
    fn test_contains_and_lengths() {
        let mut set = PriorityQueueSet::new();
        set.push(entry("a", Priority::High));
        set.push(entry("b", Priority::Idle));

        assert!(set.contains("a"));
        assert!(!set.contains("c"));
        assert_eq!(set.len_by_priority(), [0, 1, 0, 0, 1]);
        assert_eq!(set.total_len(), 2);

        set.clear();
        assert!(set.is_empty());
    }
}
