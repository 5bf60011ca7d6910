//! Plain-data duel configuration.
//!
//! Everything tunable about a fighter lives here and is loaded from RON.
//! This module contains no IO; callers hand in the file contents.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::attack::MeterTuning;
use crate::bindings::InputBindings;
use crate::command::Command;
use crate::error::{FightError, Result};
use crate::fighter::FighterId;
use crate::math::{decimal_serde, Fixed};
use crate::roster::CharacterClass;

/// Largest `input_capacity` a fighter may be configured with.
pub const MAX_INPUT_CAPACITY: usize = 1024;

/// Per-fighter configuration.
///
/// # Example RON
///
/// ```ron
/// FighterConfig(
///     class: YBot,
///     max_separation: 800.0,
///     commands: [
///         Command(name: "Temp Command", sequence: ["A", "B", "C"]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    /// Character model.
    pub class: CharacterClass,
    /// Largest distance walking may open up between the fighters.
    #[serde(with = "decimal_serde")]
    pub max_separation: Fixed,
    /// Walk speed in units per second at full axis deflection.
    #[serde(with = "decimal_serde")]
    pub walk_speed: Fixed,
    /// Gravity scale while not launched.
    #[serde(with = "decimal_serde")]
    pub base_gravity_scale: Fixed,
    /// Gravity multiplier while launched.
    #[serde(with = "decimal_serde")]
    pub launch_gravity_factor: Fixed,
    /// Seconds an input stays in the buffer.
    #[serde(with = "decimal_serde")]
    pub input_window: Fixed,
    /// Maximum buffered inputs, at most [`MAX_INPUT_CAPACITY`].
    pub input_capacity: usize,
    /// Meter gains and costs.
    pub meter: MeterTuning,
    /// Recognized command sequences.
    pub commands: Vec<Command>,
    /// Device bindings. `None` uses the default table for the fighter's slot.
    pub bindings: Option<InputBindings>,
}

impl FighterConfig {
    /// Bindings for this fighter, falling back to the slot default.
    #[must_use]
    pub fn bindings_for(&self, id: FighterId) -> InputBindings {
        self.bindings.clone().unwrap_or_else(|| match id {
            FighterId::One => InputBindings::player_one(),
            FighterId::Two => InputBindings::player_two(),
        })
    }

    /// Check the configuration for values the core cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.max_separation <= Fixed::ZERO {
            return Err(FightError::InvalidConfig(format!(
                "max_separation must be positive, got {}",
                self.max_separation
            )));
        }
        if self.walk_speed < Fixed::ZERO {
            return Err(FightError::InvalidConfig(format!(
                "walk_speed must not be negative, got {}",
                self.walk_speed
            )));
        }
        if self.base_gravity_scale <= Fixed::ZERO {
            return Err(FightError::InvalidConfig(format!(
                "base_gravity_scale must be positive, got {}",
                self.base_gravity_scale
            )));
        }
        if self.launch_gravity_factor <= Fixed::ZERO {
            return Err(FightError::InvalidConfig(format!(
                "launch_gravity_factor must be positive, got {}",
                self.launch_gravity_factor
            )));
        }
        if self.input_window < Fixed::ZERO {
            return Err(FightError::InvalidConfig(format!(
                "input_window must not be negative, got {}",
                self.input_window
            )));
        }
        if self.input_capacity == 0 || self.input_capacity > MAX_INPUT_CAPACITY {
            return Err(FightError::InvalidConfig(format!(
                "input_capacity must be between 1 and {MAX_INPUT_CAPACITY}, got {}",
                self.input_capacity
            )));
        }
        self.meter.validate()?;

        let mut names = BTreeSet::new();
        for command in &self.commands {
            if command.sequence.is_empty() {
                return Err(FightError::InvalidConfig(format!(
                    "command '{}' has an empty sequence",
                    command.name
                )));
            }
            if command.sequence.len() > self.input_capacity {
                return Err(FightError::InvalidConfig(format!(
                    "command '{}' is longer than input_capacity ({})",
                    command.name, self.input_capacity
                )));
            }
            if !names.insert(command.name.as_str()) {
                return Err(FightError::InvalidConfig(format!(
                    "duplicate command name '{}'",
                    command.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            class: CharacterClass::default(),
            max_separation: Fixed::from_num(800),
            walk_speed: Fixed::from_num(600),
            base_gravity_scale: Fixed::from_num(2),
            launch_gravity_factor: Fixed::from_num(0.7),
            input_window: Fixed::ONE,
            input_capacity: 32,
            meter: MeterTuning::default(),
            commands: Vec::new(),
            bindings: None,
        }
    }
}

/// Configuration for both fighters of a duel.
///
/// # Example RON
///
/// ```ron
/// DuelConfig(
///     player_one: FighterConfig(class: Mannequin),
///     player_two: FighterConfig(class: YBot),
///     spawn_one: -200.0,
///     spawn_two: 200.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// First fighter.
    pub player_one: FighterConfig,
    /// Second fighter.
    pub player_two: FighterConfig,
    /// Starting position of the first fighter on the fight axis.
    #[serde(with = "decimal_serde")]
    pub spawn_one: Fixed,
    /// Starting position of the second fighter on the fight axis.
    #[serde(with = "decimal_serde")]
    pub spawn_two: Fixed,
}

impl DuelConfig {
    /// Parse a configuration from RON text and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::ConfigParse`] if the text is not valid RON for
    /// this structure, or [`FightError::InvalidConfig`] if it fails validation.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| FightError::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::InvalidState`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| FightError::InvalidState(format!("Failed to serialize config: {e}")))
    }

    /// Configuration for one slot.
    #[must_use]
    pub const fn fighter(&self, id: FighterId) -> &FighterConfig {
        match id {
            FighterId::One => &self.player_one,
            FighterId::Two => &self.player_two,
        }
    }

    /// Spawn position for one slot.
    #[must_use]
    pub const fn spawn(&self, id: FighterId) -> Fixed {
        match id {
            FighterId::One => self.spawn_one,
            FighterId::Two => self.spawn_two,
        }
    }

    /// Validate both fighters and their bindings.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.player_one.validate()?;
        self.player_two.validate()?;

        let conflicts = self
            .player_one
            .bindings_for(FighterId::One)
            .conflicts_with(&self.player_two.bindings_for(FighterId::Two));
        if !conflicts.is_empty() {
            return Err(FightError::InvalidConfig(format!(
                "device actions bound to both fighters: {}",
                conflicts.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            player_one: FighterConfig::default(),
            player_two: FighterConfig::default(),
            spawn_one: Fixed::from_num(-200),
            spawn_two: Fixed::from_num(200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DuelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_partial_ron() {
        let text = r#"
            DuelConfig(
                player_one: FighterConfig(
                    class: YBot,
                    max_separation: 650.0,
                    commands: [
                        Command(name: "Temp Command", sequence: ["A", "B", "C"]),
                    ],
                ),
                spawn_two: 150.0,
            )
        "#;
        let config = DuelConfig::from_ron_str(text).unwrap();

        assert_eq!(config.player_one.class, CharacterClass::YBot);
        assert_eq!(config.player_one.max_separation, Fixed::from_num(650));
        assert_eq!(config.player_one.commands.len(), 1);
        assert_eq!(config.player_two.class, CharacterClass::Mannequin);
        assert_eq!(config.spawn_one, Fixed::from_num(-200));
        assert_eq!(config.spawn_two, Fixed::from_num(150));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = DuelConfig::from_ron_str("DuelConfig(player_one: 7)").unwrap_err();
        assert!(matches!(err, FightError::ConfigParse { .. }));
    }

    #[test]
    fn test_rejects_empty_sequence() {
        let mut config = DuelConfig::default();
        config.player_two.commands.push(Command::new("Empty", Vec::<&str>::new()));
        assert!(matches!(config.validate(), Err(FightError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_duplicate_command_names() {
        let mut config = DuelConfig::default();
        config.player_one.commands.push(Command::new("Dup", ["A"]));
        config.player_one.commands.push(Command::new("Dup", ["B"]));
        assert!(matches!(config.validate(), Err(FightError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_shared_bindings() {
        let mut config = DuelConfig::default();
        config.player_two.bindings = Some(InputBindings::player_one());
        assert!(matches!(config.validate(), Err(FightError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_separation() {
        let mut config = DuelConfig::default();
        config.player_one.max_separation = Fixed::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_input_capacity_bounds() {
        let mut config = DuelConfig::default();
        config.player_one.input_capacity = MAX_INPUT_CAPACITY;
        assert!(config.validate().is_ok());

        for capacity in [0, MAX_INPUT_CAPACITY + 1, 1_000_000_000, usize::MAX] {
            config.player_one.input_capacity = capacity;
            assert!(
                matches!(config.validate(), Err(FightError::InvalidConfig(_))),
                "capacity {capacity} accepted"
            );
        }
    }

    #[test]
    fn test_oversized_capacity_rejected_before_duel_is_built() {
        let text = "DuelConfig(player_two: FighterConfig(input_capacity: 1000000000))";
        assert!(matches!(
            DuelConfig::from_ron_str(text),
            Err(FightError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_negative_meter_tuning() {
        let negative = Fixed::from_num(-1);
        let setters: [fn(&mut MeterTuning, Fixed); 9] = [
            |m, v| m.hit_gain = v,
            |m, v| m.opponent_hit_bonus = v,
            |m, v| m.block_damage_factor = v,
            |m, v| m.block_pushback_factor = v,
            |m, v| m.damaged_threshold = v,
            |m, v| m.ex_light_cost = v,
            |m, v| m.ex_medium_cost = v,
            |m, v| m.ex_heavy_cost = v,
            |m, v| m.super_threshold = v,
        ];
        for (index, set) in setters.into_iter().enumerate() {
            let mut config = DuelConfig::default();
            set(&mut config.player_two.meter, negative);
            assert!(
                matches!(config.validate(), Err(FightError::InvalidConfig(_))),
                "meter field {index} accepted a negative value"
            );
        }
    }

    #[test]
    fn test_zero_meter_tuning_is_allowed() {
        let mut config = DuelConfig::default();
        config.player_one.meter.ex_light_cost = Fixed::ZERO;
        config.player_one.meter.opponent_hit_bonus = Fixed::ZERO;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_gravity() {
        for value in [Fixed::ZERO, Fixed::from_num(-2)] {
            let mut config = DuelConfig::default();
            config.player_one.base_gravity_scale = value;
            assert!(matches!(config.validate(), Err(FightError::InvalidConfig(_))));

            let mut config = DuelConfig::default();
            config.player_one.launch_gravity_factor = value;
            assert!(matches!(config.validate(), Err(FightError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_ron_round_trip_keeps_commands() {
        let mut config = DuelConfig::default();
        config.player_two.commands.push(Command::new("Hadoken", ["Back", "Forward", "Attack1"]));
        let text = config.to_ron_string().unwrap();
        let parsed = DuelConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed.player_two.commands, config.player_two.commands);
    }
}
