//! Timestamped input history.
//!
//! The host's input layer translates device events into abstract tokens
//! and pushes them here. The buffer keeps them in arrival order and forgets
//! anything older than its window, so command recognition only ever sees
//! recent intent.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FightError, Result};
use crate::math::{fixed_serde, Fixed};

/// Token names recorded by the built-in control actions.
pub mod tokens {
    /// Jump pressed.
    pub const JUMP: &str = "Jump";
    /// Crouch pressed.
    pub const CROUCH: &str = "Crouch";
    /// Block pressed.
    pub const BLOCK: &str = "Block";
    /// Light attack.
    pub const ATTACK_1: &str = "Attack1";
    /// Medium attack.
    pub const ATTACK_2: &str = "Attack2";
    /// Heavy attack.
    pub const ATTACK_3: &str = "Attack3";
    /// Super attack.
    pub const ATTACK_4: &str = "Attack4";
    /// Exceptional follow-up.
    pub const EXCEPTIONAL_ATTACK: &str = "ExceptionalAttack";
    /// Horizontal input toward the opponent.
    pub const FORWARD: &str = "Forward";
    /// Horizontal input away from the opponent.
    pub const BACK: &str = "Back";
}

/// An abstract input symbol, already translated from a device binding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputToken(String);

impl InputToken {
    /// Create a token from any string-like symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// The symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InputToken {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<String> for InputToken {
    fn from(symbol: String) -> Self {
        Self(symbol)
    }
}

impl fmt::Display for InputToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recorded input. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEvent {
    /// The input symbol.
    pub token: InputToken,
    /// Host clock time the input was received, in seconds.
    #[serde(with = "fixed_serde")]
    pub timestamp: Fixed,
    /// Arrival number within the owning buffer. Never reused, even after a clear.
    pub seq: u64,
}

impl InputEvent {
    /// Create a new input event.
    #[must_use]
    pub fn new(token: impl Into<InputToken>, timestamp: Fixed, seq: u64) -> Self {
        Self {
            token: token.into(),
            timestamp,
            seq,
        }
    }
}

/// Ordered, bounded history of recent inputs.
///
/// Two bounds apply at once: entries older than `window` seconds relative
/// to the newest input are evicted, and the buffer never holds more than
/// `capacity` entries (oldest go first).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputBuffer {
    events: VecDeque<InputEvent>,
    #[serde(with = "fixed_serde")]
    window: Fixed,
    capacity: usize,
    next_seq: u64,
}

impl InputBuffer {
    /// Create an empty buffer.
    ///
    /// A zero capacity is raised to one and a negative window to zero.
    /// Storage grows with use; `capacity` is only an upper bound.
    #[must_use]
    pub fn new(window: Fixed, capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            window: window.max(Fixed::ZERO),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    /// Append an input.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::NonMonotonicTimestamp`] if `timestamp` is older
    /// than the newest buffered input. The buffer is left unchanged.
    pub fn push(&mut self, token: impl Into<InputToken>, timestamp: Fixed) -> Result<()> {
        if let Some(previous) = self.newest_timestamp() {
            if timestamp < previous {
                tracing::warn!(
                    "Rejected input with timestamp {} (newest is {})",
                    timestamp,
                    previous
                );
                return Err(FightError::NonMonotonicTimestamp {
                    previous,
                    received: timestamp,
                });
            }
        }

        self.events
            .push_back(InputEvent::new(token, timestamp, self.next_seq));
        self.next_seq = self.next_seq.saturating_add(1);
        self.evict(timestamp);
        Ok(())
    }

    /// Drop entries that are too old relative to `now` or over capacity.
    ///
    /// Returns the number of entries removed.
    pub fn evict(&mut self, now: Fixed) -> usize {
        let before = self.events.len();
        let cutoff = now.saturating_sub(self.window);

        while self
            .events
            .front()
            .is_some_and(|event| event.timestamp < cutoff)
        {
            self.events.pop_front();
        }
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }

        before - self.events.len()
    }

    /// Find the earliest position where `sequence` occurs as a contiguous run.
    ///
    /// An empty sequence never matches.
    #[must_use]
    pub fn find_sequence(&self, sequence: &[InputToken]) -> Option<usize> {
        self.find_sequence_after(sequence, None)
    }

    /// Like [`InputBuffer::find_sequence`], but only runs whose first input
    /// arrived after the input numbered `after` count.
    #[must_use]
    pub fn find_sequence_after(&self, sequence: &[InputToken], after: Option<u64>) -> Option<usize> {
        if sequence.is_empty() {
            return None;
        }

        let events: Vec<&InputEvent> = self.events.iter().collect();
        events.windows(sequence.len()).position(|run| {
            let fresh = after.map_or(true, |seq| run[0].seq > seq);
            fresh && run.iter().zip(sequence).all(|(event, want)| event.token == *want)
        })
    }

    /// The input at `index`, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&InputEvent> {
        self.events.get(index)
    }

    /// Timestamp of the newest input, if any.
    #[must_use]
    pub fn newest_timestamp(&self) -> Option<Fixed> {
        self.events.back().map(|event| event.timestamp)
    }

    /// Iterate over buffered inputs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Number of buffered inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Age window in seconds.
    #[must_use]
    pub const fn window(&self) -> Fixed {
        self.window
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget all inputs. Arrival numbering carries on.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: f64) -> Fixed {
        Fixed::from_num(value)
    }

    fn buffer_of(entries: &[(&str, f64)]) -> InputBuffer {
        let mut buffer = InputBuffer::new(secs(10.0), 64);
        for (token, at) in entries {
            buffer.push(*token, secs(*at)).unwrap();
        }
        buffer
    }

    fn seq(symbols: &[&str]) -> Vec<InputToken> {
        symbols.iter().map(|s| InputToken::from(*s)).collect()
    }

    #[test]
    fn test_push_preserves_order() {
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("C", 0.2)]);
        let order: Vec<&str> = buffer.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(buffer.newest_timestamp(), Some(secs(0.2)));
    }

    #[test]
    fn test_rejects_non_monotonic_timestamp() {
        let mut buffer = buffer_of(&[("A", 1.0)]);
        let err = buffer.push("B", secs(0.5)).unwrap_err();
        assert_eq!(
            err,
            FightError::NonMonotonicTimestamp {
                previous: secs(1.0),
                received: secs(0.5),
            }
        );
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_equal_timestamps_are_accepted() {
        let buffer = buffer_of(&[("A", 1.0), ("B", 1.0)]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_age_eviction_relative_to_newest() {
        let mut buffer = InputBuffer::new(secs(1.0), 64);
        buffer.push("A", secs(0.0)).unwrap();
        buffer.push("B", secs(0.5)).unwrap();
        buffer.push("C", secs(1.2)).unwrap();

        let order: Vec<&str> = buffer.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(order, vec!["B", "C"]);
    }

    #[test]
    fn test_evict_without_new_input() {
        let mut buffer = InputBuffer::new(secs(1.0), 64);
        buffer.push("A", secs(0.0)).unwrap();
        assert_eq!(buffer.evict(secs(0.9)), 0);
        assert_eq!(buffer.evict(secs(1.5)), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_capacity_eviction() {
        let mut buffer = InputBuffer::new(secs(100.0), 3);
        for (i, token) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            buffer.push(*token, secs(i as f64)).unwrap();
        }
        let order: Vec<&str> = buffer.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(order, vec!["C", "D", "E"]);
    }

    #[test]
    fn test_find_sequence_contiguous() {
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("C", 0.2)]);
        assert_eq!(buffer.find_sequence(&seq(&["A", "B", "C"])), Some(0));
        assert_eq!(buffer.find_sequence(&seq(&["B", "C"])), Some(1));
    }

    #[test]
    fn test_find_sequence_requires_contiguity() {
        let buffer = buffer_of(&[("A", 0.0), ("X", 0.1), ("B", 0.2), ("C", 0.3)]);
        assert_eq!(buffer.find_sequence(&seq(&["A", "B", "C"])), None);
    }

    #[test]
    fn test_find_sequence_earliest_occurrence() {
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("A", 0.2), ("B", 0.3)]);
        assert_eq!(buffer.find_sequence(&seq(&["A", "B"])), Some(0));
    }

    #[test]
    fn test_find_sequence_edge_cases() {
        let buffer = buffer_of(&[("A", 0.0)]);
        assert_eq!(buffer.find_sequence(&[]), None);
        assert_eq!(buffer.find_sequence(&seq(&["A", "B"])), None);
    }

    #[test]
    fn test_find_sequence_after_skips_consumed_runs() {
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("A", 0.2), ("B", 0.3)]);
        let ab = seq(&["A", "B"]);

        assert_eq!(buffer.find_sequence_after(&ab, None), Some(0));
        assert_eq!(buffer.find_sequence_after(&ab, Some(1)), Some(2));
        assert_eq!(buffer.find_sequence_after(&ab, Some(3)), None);
    }

    #[test]
    fn test_arrival_numbers_survive_clear_and_eviction() {
        let mut buffer = InputBuffer::new(secs(1.0), 2);
        for (i, token) in ["A", "B", "C"].iter().enumerate() {
            buffer.push(*token, secs(i as f64 / 10.0)).unwrap();
        }
        let numbers: Vec<u64> = buffer.iter().map(|e| e.seq).collect();
        assert_eq!(numbers, vec![1, 2]);

        buffer.clear();
        buffer.push("D", secs(5.0)).unwrap();
        assert_eq!(buffer.get(0).map(|e| e.seq), Some(3));
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut buffer = InputBuffer::new(secs(1.0), usize::MAX);
        buffer.push("A", secs(0.0)).unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.capacity(), usize::MAX);
    }
}
