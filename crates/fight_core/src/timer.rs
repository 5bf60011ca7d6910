//! Cooperative one-shot timers.
//!
//! The duel's only deferred work is stun expiry. Rather than handing out
//! callbacks, timers carry a plain payload that the owner dispatches when
//! [`Scheduler::advance`] reports it due. Handles let the owner cancel and
//! replace a pending timer, so a fighter never has two stun expiries queued.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Cancellation handle for a scheduled timer.
///
/// Ordered by due time, then by scheduling order, so timers due at the
/// same instant fire in the order they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle {
    #[serde(with = "fixed_serde")]
    due: Fixed,
    seq: u64,
}

impl TimerHandle {
    /// Clock time at which the timer fires.
    #[must_use]
    pub const fn due(&self) -> Fixed {
        self.due
    }
}

/// Monotonic clock plus a queue of pending one-shot timers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scheduler<T> {
    #[serde(with = "fixed_serde")]
    now: Fixed,
    next_seq: u64,
    pending: BTreeMap<TimerHandle, T>,
}

impl<T> Scheduler<T> {
    /// Create a scheduler with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Fixed::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current clock time in seconds.
    #[must_use]
    pub const fn now(&self) -> Fixed {
        self.now
    }

    /// Schedule `payload` to fire `duration` seconds from now.
    ///
    /// Negative durations fire on the next advance.
    pub fn schedule(&mut self, duration: Fixed, payload: T) -> TimerHandle {
        let handle = TimerHandle {
            due: self.now.saturating_add(duration.max(Fixed::ZERO)),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(handle, payload);
        handle
    }

    /// Cancel a pending timer, returning its payload if it had not fired.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        self.pending.remove(&handle)
    }

    /// Check whether a timer is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Seconds until a pending timer fires.
    #[must_use]
    pub fn remaining(&self, handle: TimerHandle) -> Option<Fixed> {
        self.is_pending(handle)
            .then(|| handle.due.saturating_sub(self.now).max(Fixed::ZERO))
    }

    /// Advance the clock by `dt` seconds and drain every timer now due.
    ///
    /// Negative `dt` is treated as zero; the clock never runs backwards.
    pub fn advance(&mut self, dt: Fixed) -> Vec<(TimerHandle, T)> {
        self.now = self.now.saturating_add(dt.max(Fixed::ZERO));

        let mut fired = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().due > self.now {
                break;
            }
            let handle = *entry.key();
            fired.push((handle, entry.remove()));
        }
        fired
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending timer. The clock keeps its value.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: f64) -> Fixed {
        Fixed::from_num(value)
    }

    #[test]
    fn test_fires_when_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(secs(0.5), "exit");

        assert!(scheduler.advance(secs(0.25)).is_empty());
        let fired = scheduler.advance(secs(0.25));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, "exit");
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(secs(0.5), 1u8);
        assert_eq!(scheduler.cancel(handle), Some(1));
        assert!(scheduler.advance(secs(10.0)).is_empty());
        assert_eq!(scheduler.cancel(handle), None);
    }

    #[test]
    fn test_same_due_time_fires_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(secs(1.0), "first");
        scheduler.schedule(secs(1.0), "second");
        scheduler.schedule(secs(0.5), "earliest");

        let order: Vec<&str> = scheduler
            .advance(secs(1.0))
            .into_iter()
            .map(|(_, payload)| payload)
            .collect();
        assert_eq!(order, vec!["earliest", "first", "second"]);
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(secs(1.0), ());
        scheduler.advance(secs(0.25));
        assert_eq!(scheduler.remaining(handle), Some(secs(0.75)));
        scheduler.advance(secs(1.0));
        assert_eq!(scheduler.remaining(handle), None);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.advance(secs(2.0));
        scheduler.advance(secs(-5.0));
        assert_eq!(scheduler.now(), secs(2.0));
    }
}
