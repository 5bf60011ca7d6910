//! Headless scripted duels.
//!
//! A scenario script is a RON list of host calls executed in order against
//! a fresh [`Duel`]. Every event the duel emits is recorded together with
//! the step that caused it, ready to print as JSON lines.
//!
//! # Example RON
//!
//! ```ron
//! Scenario(
//!     steps: [
//!         Press(One, Attack(Light)),
//!         Hit(One, (damage: 0.2, hitstun: 0.3)),
//!         Tick(0.5),
//!         Device("JumpP2", true),
//!     ],
//! )
//! ```

use fight_core::prelude::*;
use fight_core::math::saturating_from_f64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// One host call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Advance the duel clock by this many seconds.
    Tick(f64),
    /// Press a control for a fighter.
    Press(FighterId, ControlAction),
    /// Release a control for a fighter.
    Release(FighterId, ControlAction),
    /// Hold the axis at a value for a duration.
    Axis(FighterId, f64, f64),
    /// Press or release a device action by binding name.
    Device(String, bool),
    /// Hold a device axis at a value for a duration.
    DeviceAxis(String, f64, f64),
    /// Record a raw token at an explicit timestamp.
    Token(FighterId, String, f64),
    /// Resolve a hit from this attacker.
    Hit(FighterId, AttackSpec),
    /// Report a collision volume overlap.
    Overlap(FighterId, Hitbox),
    /// Report a landing.
    Land(FighterId),
    /// Report a physics position.
    Position(FighterId, f64),
    /// Re-arm every command of a fighter.
    ResetCommands(FighterId),
    /// Start the next round.
    ResetRound,
}

/// A scenario script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Steps in execution order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse a script from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Script`] if the text is not a valid script.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| ToolError::Script(e.to_string()))
    }
}

/// An event tagged with the step that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Index of the step in the script.
    pub step: usize,
    /// Duel clock when the event was emitted.
    pub time: f64,
    /// The event itself.
    #[serde(flatten)]
    pub event: DuelEvent,
}

/// Final state of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Round reached.
    pub round: u32,
    /// Surviving fighter, if the duel was decided.
    pub winner: Option<FighterId>,
    /// Health, player one first.
    pub health: [f64; 2],
    /// Super meter, player one first.
    pub meter: [f64; 2],
    /// Combat state, player one first.
    pub state: [FighterState; 2],
    /// Determinism hash of the final duel.
    pub state_hash: u64,
}

/// Everything a scenario produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Emitted events in order.
    pub records: Vec<EventRecord>,
    /// Steps the core rejected, with the reason.
    pub rejected: Vec<(usize, String)>,
    /// Final state.
    pub summary: Summary,
}

impl Outcome {
    /// Render the records and summary as JSON lines.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Encode`] if a record cannot be encoded.
    pub fn to_json_lines(&self) -> Result<Vec<String>> {
        let mut lines = self
            .records
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        lines.push(serde_json::to_string(&self.summary)?);
        Ok(lines)
    }
}

fn apply_step(duel: &mut Duel, step: &Step) -> fight_core::error::Result<Vec<DuelEvent>> {
    let events = match step {
        Step::Tick(seconds) => duel.tick(saturating_from_f64(*seconds)),
        Step::Press(id, action) => duel.press(*id, *action),
        Step::Release(id, action) => duel.release(*id, *action),
        Step::Axis(id, value, seconds) => {
            duel.move_axis(*id, saturating_from_f64(*value), saturating_from_f64(*seconds))
        }
        Step::Device(name, pressed) => duel.device_action(name, *pressed),
        Step::DeviceAxis(name, value, seconds) => {
            duel.device_axis(name, saturating_from_f64(*value), saturating_from_f64(*seconds))
        }
        Step::Token(id, token, timestamp) => {
            duel.record_input(*id, token.as_str(), saturating_from_f64(*timestamp))?
        }
        Step::Hit(id, spec) => duel.resolve_hit(*id, *spec)?.events,
        Step::Overlap(id, hitbox) => duel.hitbox_overlap(*id, hitbox)?,
        Step::Land(id) => duel.landed(*id),
        Step::Position(id, x) => {
            duel.set_position(*id, saturating_from_f64(*x));
            Vec::new()
        }
        Step::ResetCommands(id) => {
            duel.reset_commands(*id);
            Vec::new()
        }
        Step::ResetRound => duel.reset_round(),
    };
    Ok(events)
}

/// Run a scenario against a fresh duel built from `config`.
///
/// Steps the core rejects (hits on a defeated fighter, out-of-order
/// timestamps) are logged and listed in the outcome; the run continues.
///
/// # Errors
///
/// Returns an error if `config` is invalid.
pub fn run(config: &DuelConfig, scenario: &Scenario) -> Result<Outcome> {
    let mut duel = Duel::new(config)?;
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (index, step) in scenario.steps.iter().enumerate() {
        match apply_step(&mut duel, step) {
            Ok(events) => {
                let time = duel.now().to_num::<f64>();
                records.extend(events.into_iter().map(|event| EventRecord {
                    step: index,
                    time,
                    event,
                }));
            }
            Err(e) => {
                tracing::warn!("Step {index} rejected: {e}");
                rejected.push((index, e.to_string()));
            }
        }
    }

    let one = duel.fighter(FighterId::One);
    let two = duel.fighter(FighterId::Two);
    let summary = Summary {
        round: duel.round(),
        winner: duel.winner(),
        health: [one.health().to_num(), two.health().to_num()],
        meter: [one.super_meter().to_num(), two.super_meter().to_num()],
        state: [one.state(), two.state()],
        state_hash: duel.state_hash(),
    };

    Ok(Outcome {
        records,
        rejected,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        Scenario(
            steps: [
                Press(Two, Block),
                Hit(One, (damage: 0.4, hitstun: 0.3, blockstun: 0.1)),
                Tick(0.25),
                Device("JumpP2", true),
                Token(One, "A", 0.0),
                Token(One, "B", -1.0),
            ],
        )
    "#;

    #[test]
    fn test_parse_and_run_script() {
        let scenario = Scenario::from_ron_str(SCRIPT).unwrap();
        assert_eq!(scenario.steps.len(), 6);

        let outcome = run(&DuelConfig::default(), &scenario).unwrap();

        assert!(outcome.records.iter().any(|r| r.step == 1
            && matches!(r.event, DuelEvent::HitLanded { blocked: true, .. })));
        assert!(outcome
            .records
            .iter()
            .any(|r| r.step == 2 && r.event == DuelEvent::StunEnded { fighter: FighterId::Two }));
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].0, 5);
        assert!((outcome.summary.health[1] - 0.8).abs() < 1e-6);
        assert_eq!(outcome.summary.state[1], FighterState::Jumping);
    }

    #[test]
    fn test_json_lines_are_tagged() {
        let scenario = Scenario {
            steps: vec![Step::Hit(
                FighterId::Two,
                AttackSpec::new(Fixed::from_num(0.25), Fixed::ZERO, Fixed::ZERO),
            )],
        };
        let outcome = run(&DuelConfig::default(), &scenario).unwrap();
        let lines = outcome.to_json_lines().unwrap();

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["event"], "HitLanded");
        assert_eq!(first["step"], 0);
        assert_eq!(first["attacker"], "Two");

        let summary: serde_json::Value = serde_json::from_str(lines.last().unwrap()).unwrap();
        assert_eq!(summary["round"], 1);
        assert_eq!(summary["health"][0], 0.75);
    }

    #[test]
    fn test_block_case_summary() {
        let scenario = Scenario {
            steps: vec![
                Step::Press(FighterId::Two, ControlAction::Block),
                Step::Hit(FighterId::One, fight_test_utils::fixtures::block_test_spec()),
            ],
        };
        let outcome = run(&DuelConfig::default(), &scenario).unwrap();

        assert!((outcome.summary.health[1] - 0.8).abs() < 1e-6);
        assert!(outcome.summary.meter[0].abs() < f64::EPSILON);
        assert_eq!(outcome.summary.state[1], FighterState::Stunned);
        assert_eq!(outcome.summary.winner, None);
    }

    #[test]
    fn test_bad_script_is_reported() {
        assert!(matches!(
            Scenario::from_ron_str("Scenario(steps: [Dance])"),
            Err(ToolError::Script(_))
        ));
    }
}
