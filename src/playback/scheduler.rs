use std::{cmp::Reverse, collections::BinaryHeap};

/// Logical-clock task queue measured in milliseconds.
///
/// Items come out in non-decreasing due time, and items due at the same instant
/// come out in the order they were scheduled. Time only moves when the owner
/// pops or advances, so tests can drive it deterministically.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: u64,
    /// Tie-breaker preserving insertion order among equal due times
    seq: u64,
    queue: BinaryHeap<Reverse<Entry<T>>>,
}

#[derive(Debug)]
struct Entry<T> {
    due: u64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.seq) == (other.due, other.seq)
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current logical time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules `item` to come due `delay_ms` after the current time.
    pub fn schedule(&mut self, delay_ms: u64, item: T) {
        let entry = Entry {
            due: self.now.saturating_add(delay_ms),
            seq: self.seq,
            item,
        };
        self.seq += 1;
        self.queue.push(Reverse(entry));
    }

    /// Due time of the earliest pending item.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pops the earliest item if it is due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: u64) -> Option<(u64, T)> {
        if self.next_due()? > until {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some((entry.due, entry.item))
    }

    /// Moves the clock forward to `time`. The clock never runs backward.
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_come_out_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(5, 'c');
        scheduler.schedule(1, 'a');
        scheduler.schedule(3, 'b');

        assert_eq!(scheduler.pop_due(10), Some((1, 'a')));
        assert_eq!(scheduler.now(), 1);
        assert_eq!(scheduler.pop_due(10), Some((3, 'b')));
        assert_eq!(scheduler.pop_due(10), Some((5, 'c')));
        assert_eq!(scheduler.pop_due(10), None);
    }

    #[test]
    fn test_equal_delays_keep_insertion_order() {
        let mut scheduler = Scheduler::new();
        for i in 0..50 {
            scheduler.schedule(7, i);
        }
        let popped = std::iter::from_fn(|| scheduler.pop_due(7).map(|(_, i)| i)).collect::<Vec<_>>();
        assert_eq!(popped, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_items_wait_until_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(4, ());
        assert_eq!(scheduler.pop_due(3), None);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_due(), Some(4));
        assert!(scheduler.pop_due(4).is_some());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_delays_are_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(100);
        scheduler.advance_to(50);
        assert_eq!(scheduler.now(), 100);
        scheduler.schedule(2, ());
        assert_eq!(scheduler.next_due(), Some(102));
    }
}
