//! Attack tiers, usage flags, hit parameters, and meter tuning.
//!
//! Each fighter has three base attack tiers plus a meter-gated super.
//! Using a base tier unlocks one meter-spending exceptional follow-up of
//! the same tier.

use serde::{Deserialize, Serialize};

use crate::error::{FightError, Result};
use crate::input::tokens;
use crate::math::{decimal_serde, non_negative, Fixed};

/// Attack tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackTier {
    /// Light attack (Attack1).
    Light,
    /// Medium attack (Attack2).
    Medium,
    /// Heavy attack (Attack3).
    Heavy,
    /// Super attack (Attack4), needs a full meter.
    Super,
}

impl AttackTier {
    /// Tiers that have an exceptional follow-up, in priority order.
    pub const EXCEPTIONAL: [Self; 3] = [Self::Light, Self::Medium, Self::Heavy];

    /// Input token recorded when this attack is pressed.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Light => tokens::ATTACK_1,
            Self::Medium => tokens::ATTACK_2,
            Self::Heavy => tokens::ATTACK_3,
            Self::Super => tokens::ATTACK_4,
        }
    }
}

/// Which attacks have been used since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AttackFlags {
    /// Light attack used.
    pub light: bool,
    /// Medium attack used.
    pub medium: bool,
    /// Heavy attack used.
    pub heavy: bool,
    /// Super attack used.
    pub special: bool,
    /// Light exceptional used.
    pub ex_light: bool,
    /// Medium exceptional used.
    pub ex_medium: bool,
    /// Heavy exceptional used.
    pub ex_heavy: bool,
}

impl AttackFlags {
    /// Whether the base attack of `tier` is flagged.
    #[must_use]
    pub const fn is_used(&self, tier: AttackTier) -> bool {
        match tier {
            AttackTier::Light => self.light,
            AttackTier::Medium => self.medium,
            AttackTier::Heavy => self.heavy,
            AttackTier::Super => self.special,
        }
    }

    /// Whether the exceptional follow-up of `tier` is flagged.
    ///
    /// Supers have no follow-up and always report `false`.
    #[must_use]
    pub const fn is_ex_used(&self, tier: AttackTier) -> bool {
        match tier {
            AttackTier::Light => self.ex_light,
            AttackTier::Medium => self.ex_medium,
            AttackTier::Heavy => self.ex_heavy,
            AttackTier::Super => false,
        }
    }

    /// Set or clear the base flag of `tier`.
    pub fn set_used(&mut self, tier: AttackTier, used: bool) {
        match tier {
            AttackTier::Light => self.light = used,
            AttackTier::Medium => self.medium = used,
            AttackTier::Heavy => self.heavy = used,
            AttackTier::Super => self.special = used,
        }
    }

    /// Flag the exceptional follow-up of `tier`.
    pub fn mark_ex_used(&mut self, tier: AttackTier) {
        match tier {
            AttackTier::Light => self.ex_light = true,
            AttackTier::Medium => self.ex_medium = true,
            AttackTier::Heavy => self.ex_heavy = true,
            AttackTier::Super => {}
        }
    }

    /// First base tier that can be followed up, in light, medium, heavy order.
    #[must_use]
    pub fn exceptional_candidate(&self) -> Option<AttackTier> {
        AttackTier::EXCEPTIONAL
            .into_iter()
            .find(|tier| self.is_used(*tier))
    }

    /// Clear every flag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Parameters of a single connecting attack.
///
/// Built by the hit-detection collaborator at the moment of impact and
/// never stored. Negative fields are treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackSpec {
    /// Health removed from the defender (1.0 = full bar).
    #[serde(with = "decimal_serde")]
    pub damage: Fixed,
    /// Stun seconds on an unblocked hit.
    #[serde(with = "decimal_serde", default)]
    pub hitstun: Fixed,
    /// Stun seconds on a blocked hit.
    #[serde(with = "decimal_serde", default)]
    pub blockstun: Fixed,
    /// Displacement away from the attacker.
    #[serde(with = "decimal_serde", default)]
    pub pushback: Fixed,
    /// Vertical knock-up magnitude.
    #[serde(with = "decimal_serde", default)]
    pub launch: Fixed,
}

impl AttackSpec {
    /// Create a spec with no pushback or launch.
    #[must_use]
    pub const fn new(damage: Fixed, hitstun: Fixed, blockstun: Fixed) -> Self {
        Self {
            damage,
            hitstun,
            blockstun,
            pushback: Fixed::ZERO,
            launch: Fixed::ZERO,
        }
    }

    /// Builder method to set pushback.
    #[must_use]
    pub const fn with_pushback(mut self, pushback: Fixed) -> Self {
        self.pushback = pushback;
        self
    }

    /// Builder method to set launch.
    #[must_use]
    pub const fn with_launch(mut self, launch: Fixed) -> Self {
        self.launch = launch;
        self
    }

    /// Copy with every negative field raised to zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            damage: non_negative(self.damage),
            hitstun: non_negative(self.hitstun),
            blockstun: non_negative(self.blockstun),
            pushback: non_negative(self.pushback),
            launch: non_negative(self.launch),
        }
    }
}

/// Meter gains, costs, and block modifiers.
///
/// # Example RON
///
/// ```ron
/// MeterTuning(
///     hit_gain: 0.85,
///     opponent_hit_bonus: 0.30,
///     ex_light_cost: 0.20,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterTuning {
    /// Attacker meter gained per unit of unblocked damage.
    #[serde(with = "decimal_serde")]
    pub hit_gain: Fixed,
    /// Extra attacker meter per unit of damage while the defender has not used its light exceptional.
    #[serde(with = "decimal_serde")]
    pub opponent_hit_bonus: Fixed,
    /// Fraction of damage that gets through a block.
    #[serde(with = "decimal_serde")]
    pub block_damage_factor: Fixed,
    /// Pushback multiplier on a blocked hit.
    #[serde(with = "decimal_serde")]
    pub block_pushback_factor: Fixed,
    /// Health level below which the damaged cosmetic kicks in.
    #[serde(with = "decimal_serde")]
    pub damaged_threshold: Fixed,
    /// Meter cost of the light exceptional.
    #[serde(with = "decimal_serde")]
    pub ex_light_cost: Fixed,
    /// Meter cost of the medium exceptional.
    #[serde(with = "decimal_serde")]
    pub ex_medium_cost: Fixed,
    /// Meter cost of the heavy exceptional.
    #[serde(with = "decimal_serde")]
    pub ex_heavy_cost: Fixed,
    /// Meter needed to activate a super.
    #[serde(with = "decimal_serde")]
    pub super_threshold: Fixed,
}

impl MeterTuning {
    /// Meter cost of the exceptional follow-up of `tier`.
    #[must_use]
    pub const fn exceptional_cost(&self, tier: AttackTier) -> Fixed {
        match tier {
            AttackTier::Light => self.ex_light_cost,
            AttackTier::Medium => self.ex_medium_cost,
            AttackTier::Heavy => self.ex_heavy_cost,
            AttackTier::Super => Fixed::ZERO,
        }
    }

    /// Reject negative gains, factors, and costs.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::InvalidConfig`] naming the first negative field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("hit_gain", self.hit_gain),
            ("opponent_hit_bonus", self.opponent_hit_bonus),
            ("block_damage_factor", self.block_damage_factor),
            ("block_pushback_factor", self.block_pushback_factor),
            ("damaged_threshold", self.damaged_threshold),
            ("ex_light_cost", self.ex_light_cost),
            ("ex_medium_cost", self.ex_medium_cost),
            ("ex_heavy_cost", self.ex_heavy_cost),
            ("super_threshold", self.super_threshold),
        ];
        match fields.into_iter().find(|(_, value)| *value < Fixed::ZERO) {
            Some((name, value)) => Err(FightError::InvalidConfig(format!(
                "meter.{name} must not be negative, got {value}"
            ))),
            None => Ok(()),
        }
    }
}

impl Default for MeterTuning {
    fn default() -> Self {
        Self {
            hit_gain: Fixed::from_num(0.85),
            opponent_hit_bonus: Fixed::from_num(0.30),
            block_damage_factor: Fixed::from_num(0.5),
            block_pushback_factor: Fixed::from_num(2),
            damaged_threshold: Fixed::from_num(0.5),
            ex_light_cost: Fixed::from_num(0.20),
            ex_medium_cost: Fixed::from_num(0.35),
            ex_heavy_cost: Fixed::from_num(0.50),
            super_threshold: Fixed::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceptional_candidate_priority() {
        let mut flags = AttackFlags::default();
        assert_eq!(flags.exceptional_candidate(), None);

        flags.set_used(AttackTier::Heavy, true);
        assert_eq!(flags.exceptional_candidate(), Some(AttackTier::Heavy));

        flags.set_used(AttackTier::Light, true);
        assert_eq!(flags.exceptional_candidate(), Some(AttackTier::Light));

        // Supers never qualify
        let mut only_super = AttackFlags::default();
        only_super.set_used(AttackTier::Super, true);
        assert_eq!(only_super.exceptional_candidate(), None);
    }

    #[test]
    fn test_sanitized_clamps_negatives() {
        let spec = AttackSpec::new(Fixed::from_num(-1), Fixed::from_num(0.3), Fixed::from_num(-0.1))
            .with_pushback(Fixed::from_num(-50))
            .with_launch(Fixed::from_num(10));
        let clean = spec.sanitized();
        assert_eq!(clean.damage, Fixed::ZERO);
        assert_eq!(clean.hitstun, Fixed::from_num(0.3));
        assert_eq!(clean.blockstun, Fixed::ZERO);
        assert_eq!(clean.pushback, Fixed::ZERO);
        assert_eq!(clean.launch, Fixed::from_num(10));
    }

    #[test]
    fn test_attack_spec_from_ron_defaults() {
        let spec: AttackSpec = ron::from_str("(damage: 0.1, hitstun: 0.25)").unwrap();
        assert_eq!(spec.damage, Fixed::from_num(0.1));
        assert_eq!(spec.hitstun, Fixed::from_num(0.25));
        assert_eq!(spec.blockstun, Fixed::ZERO);
        assert_eq!(spec.launch, Fixed::ZERO);
    }

    #[test]
    fn test_meter_tuning_partial_ron() {
        let tuning: MeterTuning = ron::from_str("(ex_heavy_cost: 0.6)").unwrap();
        assert_eq!(tuning.ex_heavy_cost, Fixed::from_num(0.6));
        assert_eq!(tuning.hit_gain, Fixed::from_num(0.85));
        assert_eq!(tuning.exceptional_cost(AttackTier::Super), Fixed::ZERO);
    }

    #[test]
    fn test_flags_reset() {
        let mut flags = AttackFlags::default();
        flags.set_used(AttackTier::Medium, true);
        flags.mark_ex_used(AttackTier::Medium);
        assert!(flags.is_ex_used(AttackTier::Medium));
        flags.reset();
        assert_eq!(flags, AttackFlags::default());
    }
}
