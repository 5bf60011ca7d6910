//! Test fixtures and helpers.
//!
//! Pre-built duels and hit parameters for consistent testing.

use fight_core::prelude::*;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Check that two fixed-point values are within 1e-6 of each other.
#[must_use]
pub fn approx_eq(a: I32F32, b: I32F32) -> bool {
    a.saturating_sub(b).saturating_abs() <= fixed_f(0.000_001)
}

/// A duel with default configuration: fighters at -200 and 200, no commands.
///
/// # Panics
///
/// Panics if the default configuration is rejected, which would be a bug.
#[must_use]
pub fn standard_duel() -> Duel {
    Duel::new(&DuelConfig::default()).expect("default duel config must be valid")
}

/// A duel where player one knows the given commands.
///
/// # Panics
///
/// Panics if the commands make the configuration invalid.
#[must_use]
pub fn duel_with_commands(commands: Vec<Command>) -> Duel {
    let mut config = DuelConfig::default();
    config.player_one.commands = commands;
    Duel::new(&config).expect("command config must be valid")
}

/// A standard duel with `defender` already holding block.
#[must_use]
pub fn blocking_duel(defender: FighterId) -> Duel {
    let mut duel = standard_duel();
    duel.press(defender, ControlAction::Block);
    duel
}

/// The canonical `{damage: 0.4, hitstun: 0.3, blockstun: 0.1}` hit.
#[must_use]
pub fn block_test_spec() -> AttackSpec {
    AttackSpec::new(fixed_f(0.4), fixed_f(0.3), fixed_f(0.1))
}

/// A light jab with a short stun and a little pushback.
#[must_use]
pub fn jab() -> AttackSpec {
    AttackSpec::new(fixed_f(0.0625), fixed_f(0.125), fixed_f(0.0625)).with_pushback(fixed(10))
}

/// A launcher that knocks the defender airborne.
#[must_use]
pub fn launcher() -> AttackSpec {
    AttackSpec::new(fixed_f(0.1), fixed_f(0.5), fixed_f(0.25))
        .with_pushback(fixed(40))
        .with_launch(fixed(600))
}
