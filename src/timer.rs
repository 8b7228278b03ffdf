//! Per-line timer set
//!
//! The driver keeps one ordered set of absolute expiry times, at most one
//! per line, for the VMIN/VTIME read timers. The dispatcher programs the
//! single kernel alarm for the earliest deadline and, when it fires, pops
//! every timer that has come due.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::message::Ticks;

/// Ordered set of (deadline, line) pairs with per-line replacement
#[derive(Default)]
pub struct TimerQueue {
    deadlines: BTreeSet<(Ticks, usize)>,
    armed: BTreeMap<usize, Ticks>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer for a line
    pub fn set(&mut self, line: usize, at: Ticks) {
        if let Some(old) = self.armed.insert(line, at) {
            self.deadlines.remove(&(old, line));
        }
        self.deadlines.insert((at, line));
    }

    /// Disarm the timer for a line, if armed
    pub fn clear(&mut self, line: usize) {
        if let Some(old) = self.armed.remove(&line) {
            self.deadlines.remove(&(old, line));
        }
    }

    /// Earliest armed deadline
    pub fn next_deadline(&self) -> Option<Ticks> {
        self.deadlines.iter().next().map(|&(t, _)| t)
    }

    /// Pop every line whose deadline is at or before `now`, earliest first
    pub fn expire(&mut self, now: Ticks) -> Vec<usize> {
        let mut fired = Vec::new();
        while let Some(&(t, line)) = self.deadlines.iter().next() {
            if t > now {
                break;
            }
            self.deadlines.remove(&(t, line));
            self.armed.remove(&line);
            fired.push(line);
        }
        fired
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_expire_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.set(2, 30);
        q.set(0, 10);
        q.set(1, 20);

        assert_eq!(q.next_deadline(), Some(10));
        assert_eq!(q.expire(25), &[0, 1]);
        assert_eq!(q.next_deadline(), Some(30));
        assert_eq!(q.expire(30), &[2]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_expire_before_any_deadline_fires_nothing() {
        let mut q = TimerQueue::new();
        q.set(0, 100);
        assert!(q.expire(99).is_empty());
        assert_eq!(q.next_deadline(), Some(100));
    }

    #[test]
    fn test_rearming_replaces_the_old_deadline() {
        let mut q = TimerQueue::new();
        q.set(0, 10);
        q.set(0, 50);

        // The old deadline is gone; nothing fires at 10.
        assert!(q.expire(10).is_empty());
        assert_eq!(q.expire(50), &[0]);
    }

    #[test]
    fn test_clear_disarms() {
        let mut q = TimerQueue::new();
        q.set(0, 10);
        q.set(1, 20);
        q.clear(0);

        assert_eq!(q.next_deadline(), Some(20));
        assert_eq!(q.expire(100), &[1]);
    }

    #[test]
    fn test_clear_unarmed_line_is_harmless() {
        let mut q = TimerQueue::new();
        q.clear(5);
        assert!(q.is_empty());
    }
}
