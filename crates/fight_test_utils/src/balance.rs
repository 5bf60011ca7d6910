//! Balance testing utilities for headless duels.
//!
//! Runs hit exchanges through a real [`Duel`] to check how attack tuning
//! plays out: hits to defeat, meter build-up, and who wins a straight trade.

use fight_core::prelude::*;

use crate::determinism::frame;

/// Result of a simulated exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeResult {
    /// The surviving fighter (None if both still stand when the exchange ends).
    pub winner: Option<FighterId>,
    /// Hits resolved.
    pub hits: u32,
    /// Remaining health, player one first.
    pub remaining_health: [Fixed; 2],
    /// Final super meter, player one first.
    pub meter: [Fixed; 2],
}

/// Statistics for a set of exchanges.
#[derive(Debug, Clone, Default)]
pub struct ExchangeStats {
    /// Total exchanges run.
    pub total: u32,
    /// Wins for player one.
    pub wins_one: u32,
    /// Wins for player two.
    pub wins_two: u32,
    /// Exchanges with no winner.
    pub draws: u32,
}

impl ExchangeStats {
    /// Fold one result in.
    pub fn record(&mut self, result: &ExchangeResult) {
        self.total += 1;
        match result.winner {
            Some(FighterId::One) => self.wins_one += 1,
            Some(FighterId::Two) => self.wins_two += 1,
            None => self.draws += 1,
        }
    }

    /// Win rate for player one (0.0 to 1.0).
    pub fn win_rate_one(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_one) / f64::from(self.total)
    }

    /// Win rate for player two (0.0 to 1.0).
    pub fn win_rate_two(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_two) / f64::from(self.total)
    }

    /// Check if player one's win rate falls within range.
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_one();
        rate >= min_rate && rate <= max_rate
    }
}

/// Tick until neither fighter is stunned, up to `limit` frames.
fn wait_out_stun(duel: &mut Duel, limit: u32) {
    for _ in 0..limit {
        if duel.fighters().all(Fighter::can_move) {
            break;
        }
        duel.tick(frame());
    }
}

/// Count hits of `spec` needed to defeat an idle (or guarding) defender.
///
/// Returns `None` if `max_hits` is not enough, for example when the
/// attack does no damage.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub fn hits_to_defeat(config: &DuelConfig, spec: AttackSpec, guarding: bool, max_hits: u32) -> Option<u32> {
    let mut duel = Duel::new(config).expect("balance config must be valid");

    for hit in 1..=max_hits {
        if guarding && duel.fighter(FighterId::Two).state() != FighterState::Blocking {
            duel.press(FighterId::Two, ControlAction::Block);
        }
        let _ = duel.resolve_hit(FighterId::One, spec);
        if duel.fighter(FighterId::Two).is_defeated() {
            return Some(hit);
        }
        wait_out_stun(&mut duel, 600);
    }
    None
}

/// Meter player one builds from a single hit of `spec` on a fresh duel.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub fn meter_per_hit(config: &DuelConfig, spec: AttackSpec) -> Fixed {
    let mut duel = Duel::new(config).expect("balance config must be valid");
    duel.resolve_hit(FighterId::One, spec)
        .map(|report| report.meter_gained)
        .unwrap_or(Fixed::ZERO)
}

/// Alternate hits between the fighters until one falls or `max_hits` pass.
///
/// Player one swings first. Stun is allowed to expire between hits.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub fn run_trade(
    config: &DuelConfig,
    spec_one: AttackSpec,
    spec_two: AttackSpec,
    max_hits: u32,
) -> ExchangeResult {
    let mut duel = Duel::new(config).expect("balance config must be valid");
    let mut hits = 0;

    while hits < max_hits && duel.winner().is_none() {
        let (attacker, spec) = if hits % 2 == 0 {
            (FighterId::One, spec_one)
        } else {
            (FighterId::Two, spec_two)
        };
        let _ = duel.resolve_hit(attacker, spec);
        hits += 1;
        wait_out_stun(&mut duel, 600);
    }

    let one = duel.fighter(FighterId::One);
    let two = duel.fighter(FighterId::Two);
    ExchangeResult {
        winner: duel.winner(),
        hits,
        remaining_health: [one.health(), two.health()],
        meter: [one.super_meter(), two.super_meter()],
    }
}

/// Hits to defeat for each named attack, unguarded and guarded.
pub fn generate_ttk_table(config: &DuelConfig, attacks: &[(&str, AttackSpec)]) -> Vec<(String, Option<u32>, Option<u32>)> {
    attacks
        .iter()
        .map(|(name, spec)| {
            (
                (*name).to_string(),
                hits_to_defeat(config, *spec, false, 200),
                hits_to_defeat(config, *spec, true, 200),
            )
        })
        .collect()
}
