//! Hit resolution.
//!
//! [`resolve`] is the single entry point the hit-detection collaborator
//! reaches (through [`Duel::resolve_hit`](crate::duel::Duel::resolve_hit))
//! when an attack's hitbox overlaps a hurtbox. It mutates both fighters:
//!
//! - **Unblocked**: full damage, hitstun, meter for the attacker, optional
//!   launch.
//! - **Blocked**: damage scaled by the block factor, blockstun instead of
//!   hitstun, no meter for either side, doubled pushback.
//!
//! Every numeric input is sanitized and every result clamped, so hostile
//! specs (negative, huge) can never push health or meter outside `[0, 1]`.

use crate::attack::{AttackSpec, AttackTier};
use crate::error::{FightError, Result};
use crate::events::DuelEvent;
use crate::fighter::{Attackable, DuelTimers, Fighter, FighterId, Movable};
use crate::math::Fixed;
use crate::state::{FighterState, StateTrigger};

/// Outcome of one resolved hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitReport {
    /// Fighter that attacked.
    pub attacker: FighterId,
    /// Fighter that was hit.
    pub defender: FighterId,
    /// Whether the defender was guarding.
    pub blocked: bool,
    /// Health removed before clamping.
    pub damage: Fixed,
    /// Meter the attacker gained.
    pub meter_gained: Fixed,
    /// Everything observable the hit caused, in order.
    pub events: Vec<DuelEvent>,
}

/// Sign of "away from `from`" along the fight axis for `target`.
///
/// Coincident fighters fall back to the attacker's facing.
fn away_from(from: &Fighter, target: &Fighter) -> Fixed {
    if target.position() > from.position() {
        Fixed::ONE
    } else if target.position() < from.position() {
        -Fixed::ONE
    } else if from.facing_flipped() {
        Fixed::ONE
    } else {
        -Fixed::ONE
    }
}

/// Resolve `spec` from `attacker` against `defender`.
///
/// # Errors
///
/// Returns [`FightError::AlreadyDefeated`] if the defender has no health
/// left. Neither fighter is touched in that case.
pub fn resolve(
    attacker: &mut Fighter,
    defender: &mut Fighter,
    spec: AttackSpec,
    timers: &mut DuelTimers,
) -> Result<HitReport> {
    if defender.is_defeated() {
        tracing::warn!(
            "Ignoring hit from {:?} on already defeated {:?}",
            attacker.id(),
            defender.id()
        );
        return Err(FightError::AlreadyDefeated(defender.id()));
    }

    let spec = spec.sanitized();
    let blocked = defender.is_guarding();
    let damage = if blocked {
        spec.damage.saturating_mul(defender.tuning().block_damage_factor)
    } else {
        spec.damage
    };

    let mut events = vec![DuelEvent::HitLanded {
        attacker: attacker.id(),
        defender: defender.id(),
        damage,
        blocked,
    }];
    events.extend(defender.apply_damage(damage));

    let mut meter_gained = Fixed::ZERO;
    let defender_push;

    if blocked {
        if spec.blockstun > Fixed::ZERO {
            events.extend(defender.stun(spec.blockstun, timers));
        } else if defender.state() != FighterState::Launched {
            events.extend(defender.apply(StateTrigger::GuardRecovered));
        }
        defender_push = spec
            .pushback
            .saturating_mul(defender.tuning().block_pushback_factor);
    } else {
        let tuning = *attacker.tuning();
        meter_gained = damage.saturating_mul(tuning.hit_gain);
        if !defender.attacks().is_ex_used(AttackTier::Light) {
            meter_gained = meter_gained.saturating_add(damage.saturating_mul(tuning.opponent_hit_bonus));
        }
        attacker.gain_meter(meter_gained);
        attacker.mark_landed_hit();

        if spec.hitstun > Fixed::ZERO {
            events.extend(defender.stun(spec.hitstun, timers));
        }
        if spec.launch > Fixed::ZERO {
            events.extend(defender.launch());
        }
        defender_push = spec.pushback;
    }

    if spec.pushback > Fixed::ZERO {
        let away = away_from(attacker, defender);
        events.push(DuelEvent::Pushback {
            fighter: defender.id(),
            impulse: defender_push.saturating_mul(away),
        });
        events.push(DuelEvent::Pushback {
            fighter: attacker.id(),
            impulse: spec.pushback.saturating_mul(-away),
        });
    }

    tracing::debug!(
        "{:?} hit {:?} for {} (blocked: {}, meter +{})",
        attacker.id(),
        defender.id(),
        damage,
        blocked,
        meter_gained
    );

    Ok(HitReport {
        attacker: attacker.id(),
        defender: defender.id(),
        blocked,
        damage,
        meter_gained,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FighterConfig;
    use proptest::prelude::*;

    fn f(value: f64) -> Fixed {
        Fixed::from_num(value)
    }

    fn tolerance() -> Fixed {
        f(0.000_001)
    }

    fn pair() -> (Fighter, Fighter) {
        let config = FighterConfig::default();
        let mut one = Fighter::new(FighterId::One, &config, f(-100.0));
        let mut two = Fighter::new(FighterId::Two, &config, f(100.0));
        one.update_facing(two.position());
        two.update_facing(one.position());
        (one, two)
    }

    #[test]
    fn test_blocked_hit_halves_damage_and_uses_blockstun() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();
        b.apply(StateTrigger::BlockPressed);

        let spec = AttackSpec::new(f(0.4), f(0.3), f(0.1));
        let report = resolve(&mut a, &mut b, spec, &mut timers).unwrap();

        assert!(report.blocked);
        assert!((b.health() - f(0.8)).abs() <= tolerance());
        assert_eq!(b.stun_remaining(), f(0.1));
        assert_eq!(a.super_meter(), Fixed::ZERO);
        assert!(!a.landed_hit());
    }

    #[test]
    fn test_unblocked_hit_grants_meter() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();

        let spec = AttackSpec::new(f(0.2), f(0.3), Fixed::ZERO);
        let report = resolve(&mut a, &mut b, spec, &mut timers).unwrap();

        assert!(!report.blocked);
        assert!((a.super_meter() - f(0.23)).abs() <= tolerance());
        assert_eq!(b.state(), FighterState::Stunned);
        assert!(!b.can_move());
        assert!(a.landed_hit());
    }

    #[test]
    fn test_light_exceptional_removes_bonus() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();
        b.start_attack(AttackTier::Light);
        b.start_exceptional_attack();

        resolve(&mut a, &mut b, AttackSpec::new(f(0.2), Fixed::ZERO, Fixed::ZERO), &mut timers)
            .unwrap();

        assert!((a.super_meter() - f(0.17)).abs() <= tolerance());
    }

    #[test]
    fn test_blocked_without_blockstun_returns_to_idle() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();
        b.apply(StateTrigger::BlockPressed);

        resolve(&mut a, &mut b, AttackSpec::new(f(0.1), f(0.3), Fixed::ZERO), &mut timers)
            .unwrap();

        assert_eq!(b.state(), FighterState::Idle);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_launch_scales_gravity() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();
        let baseline = b.gravity_scale();

        let spec = AttackSpec::new(f(0.1), Fixed::ZERO, Fixed::ZERO).with_launch(f(500.0));
        resolve(&mut a, &mut b, spec, &mut timers).unwrap();

        assert_eq!(b.state(), FighterState::Launched);
        assert_eq!(b.gravity_scale(), baseline * f(0.7));

        b.landed();
        assert_eq!(b.state(), FighterState::Idle);
        assert_eq!(b.gravity_scale(), baseline);
    }

    #[test]
    fn test_pushback_directions() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();

        let spec = AttackSpec::new(f(0.1), Fixed::ZERO, Fixed::ZERO).with_pushback(f(30.0));
        let report = resolve(&mut a, &mut b, spec, &mut timers).unwrap();
        assert!(report.events.contains(&DuelEvent::Pushback {
            fighter: FighterId::Two,
            impulse: f(30.0),
        }));
        assert!(report.events.contains(&DuelEvent::Pushback {
            fighter: FighterId::One,
            impulse: f(-30.0),
        }));

        b.apply(StateTrigger::BlockPressed);
        let report = resolve(&mut a, &mut b, spec, &mut timers).unwrap();
        assert!(report.events.contains(&DuelEvent::Pushback {
            fighter: FighterId::Two,
            impulse: f(60.0),
        }));
    }

    #[test]
    fn test_defeated_defender_is_untouched() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();
        resolve(&mut a, &mut b, AttackSpec::new(f(2.0), Fixed::ZERO, Fixed::ZERO), &mut timers)
            .unwrap();
        let meter = a.super_meter();

        let err = resolve(&mut a, &mut b, AttackSpec::new(f(0.5), f(1.0), Fixed::ZERO), &mut timers)
            .unwrap_err();

        assert_eq!(err, FightError::AlreadyDefeated(FighterId::Two));
        assert_eq!(b.health(), Fixed::ZERO);
        assert_eq!(a.super_meter(), meter);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_damaged_threshold_event() {
        let (mut a, mut b) = pair();
        let mut timers = DuelTimers::new();
        let report = resolve(&mut a, &mut b, AttackSpec::new(f(0.6), Fixed::ZERO, Fixed::ZERO), &mut timers)
            .unwrap();
        assert!(report
            .events
            .contains(&DuelEvent::DamagedThreshold { fighter: FighterId::Two }));
    }

    fn arb_scalar() -> impl Strategy<Value = Fixed> {
        prop_oneof![
            (-1_000_000i64..1_000_000).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(1000)),
            Just(Fixed::MAX),
            Just(Fixed::MIN),
        ]
    }

    proptest! {
        #[test]
        fn prop_resources_stay_in_unit_interval(
            hits in proptest::collection::vec(
                (arb_scalar(), arb_scalar(), arb_scalar(), arb_scalar(), arb_scalar(), any::<bool>(), any::<bool>()),
                1..40,
            ),
        ) {
            let (mut a, mut b) = pair();
            let mut timers = DuelTimers::new();

            for (damage, hitstun, blockstun, pushback, launch, guard, exceptional) in hits {
                if guard {
                    b.apply(StateTrigger::BlockPressed);
                }
                let spec = AttackSpec { damage, hitstun, blockstun, pushback, launch };
                let _ = resolve(&mut a, &mut b, spec, &mut timers);
                timers.advance(Fixed::ONE);

                if exceptional {
                    a.start_attack(AttackTier::Heavy);
                    a.start_exceptional_attack();
                    a.gain_meter(damage);
                }

                for fighter in [&a, &b] {
                    prop_assert!(fighter.health() >= Fixed::ZERO && fighter.health() <= Fixed::ONE);
                    prop_assert!(fighter.super_meter() >= Fixed::ZERO && fighter.super_meter() <= Fixed::ONE);
                    prop_assert!(fighter.stun_remaining() >= Fixed::ZERO);
                }
            }
        }
    }
}
