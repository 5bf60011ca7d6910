//! Maximum-separation rule for walking.
//!
//! Fighters may always close distance, but walking may not open the gap
//! past a configured cap. Only positions on the fight axis matter; facing
//! plays no part.

use serde::{Deserialize, Serialize};

use crate::math::{axis_distance, decimal_serde, Fixed};

/// Clamp on how far apart walking can take the fighters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeparationPolicy {
    #[serde(with = "decimal_serde")]
    max_separation: Fixed,
}

impl SeparationPolicy {
    /// Create a policy. Negative caps are treated as zero.
    #[must_use]
    pub fn new(max_separation: Fixed) -> Self {
        Self {
            max_separation: max_separation.max(Fixed::ZERO),
        }
    }

    /// The configured cap.
    #[must_use]
    pub const fn max_separation(&self) -> Fixed {
        self.max_separation
    }

    /// The part of a requested step that may actually be applied.
    ///
    /// * Steps that do not increase separation pass through unchanged.
    /// * Steps that stay within the cap pass through unchanged.
    /// * Steps that would open the gap past the cap stop exactly at it.
    /// * At or beyond the cap, steps that widen the gap are dropped.
    #[must_use]
    pub fn permitted_step(&self, mover: Fixed, anchor: Fixed, step: Fixed) -> Fixed {
        let current = axis_distance(mover, anchor);
        let target = mover.saturating_add(step);
        let next = axis_distance(target, anchor);

        if next <= current || next <= self.max_separation {
            return step;
        }
        if current >= self.max_separation {
            return Fixed::ZERO;
        }

        let limit_low = anchor.saturating_sub(self.max_separation);
        let limit_high = anchor.saturating_add(self.max_separation);
        target.clamp(limit_low, limit_high).saturating_sub(mover)
    }
}

impl Default for SeparationPolicy {
    fn default() -> Self {
        Self::new(Fixed::from_num(800))
    }
}
