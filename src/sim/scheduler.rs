//! Virtual-clock task scheduler
//!
//! Replaces ambient platform timers. Tasks are plain values queued at a due
//! time; the owner advances the clock and receives the tasks that came due,
//! in (due time, insertion order). A `TaskHandle` is the cancellation token:
//! a cancelled task is never returned.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Cancellation token for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    due_ms: u64,
    handle: TaskHandle,
    task: T,
}

// Ordered by (due, handle); handles are issued in insertion order
impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.due_ms, self.handle) == (other.due_ms, other.handle)
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
        (self.due_ms, self.handle).cmp(&(other.due_ms, other.handle))
    }
}

/// Deterministic single-threaded timer queue
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    queue: BinaryHeap<Reverse<Entry<T>>>,
    cancelled: HashSet<TaskHandle>,
    next_handle: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> Scheduler<T> {
    /// Create a scheduler whose clock starts at `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_handle: 1,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queue `task` to fire `delay_ms` after the current time
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.push(Reverse(Entry {
            due_ms: self.now_ms.saturating_add(delay_ms),
            handle,
            task,
        }));
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.is_pending(handle) && self.cancelled.insert(handle)
    }

    /// True while the task is queued and not cancelled
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        !self.cancelled.contains(&handle) && self.queue.iter().any(|Reverse(e)| e.handle == handle)
    }

    /// Drop every pending task
    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.cancelled.clear();
    }

    /// Number of tasks still due to fire
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|Reverse(e)| !self.cancelled.contains(&e.handle))
            .count()
    }

    /// Pop the next task due at or before `until_ms`, moving the clock to its
    /// due time so follow-up tasks scheduled while firing it keep exact cadence.
    /// Once nothing else is due the clock settles at `until_ms`.
    /// The clock never moves backwards.
    pub fn pop_until(&mut self, until_ms: u64) -> Option<(u64, T)> {
        loop {
            let due_ms = match self.queue.peek() {
                Some(Reverse(next)) if next.due_ms <= until_ms => next.due_ms,
                _ => {
                    self.now_ms = self.now_ms.max(until_ms);
                    return None;
                }
            };
            let Reverse(entry) = self.queue.pop()?;
            if self.cancelled.remove(&entry.handle) {
                continue;
            }
            self.now_ms = self.now_ms.max(due_ms);
            return Some((entry.due_ms, entry.task));
        }
    }

    /// Move the clock forward and return every task that came due, oldest first
    pub fn advance_to(&mut self, until_ms: u64) -> Vec<(u64, T)> {
        let mut due = Vec::new();
        while let Some(fired) = self.pop_until(until_ms) {
            due.push(fired);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_then_insertion_order() {
        let mut s = Scheduler::new(0);
        s.schedule(100, "b");
        s.schedule(50, "a");
        s.schedule(100, "c");
        s.schedule(200, "d");

        assert!(s.advance_to(49).is_empty());
        let fired: Vec<_> = s.advance_to(100).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new(0);
        let a = s.schedule(10, 1);
        let _b = s.schedule(10, 2);
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(s.pending(), 1);

        let fired: Vec<_> = s.advance_to(10).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec![2]);
        // Already fired
        assert!(!s.cancel(a));
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut s = Scheduler::new(1000);
        s.advance_to(500);
        assert_eq!(s.now_ms(), 1000);
        s.schedule(10, ());
        assert_eq!(s.advance_to(1010).len(), 1);
    }

    #[test]
    fn test_follow_up_tasks_keep_cadence() {
        let mut s = Scheduler::new(0);
        s.schedule(100, 0u32);

        // Re-arm a 100 ms repeating task while jumping the clock by 350 ms
        let mut fired = Vec::new();
        while let Some((due, n)) = s.pop_until(350) {
            assert_eq!(s.now_ms(), due);
            fired.push(due);
            s.schedule(100, n + 1);
        }
        assert_eq!(fired, vec![100, 200, 300]);
        assert_eq!(s.now_ms(), 350);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut s = Scheduler::new(0);
        s.schedule(1, ());
        s.schedule(2, ());
        s.cancel_all();
        assert_eq!(s.pending(), 0);
        assert!(s.advance_to(10).is_empty());
    }
}
